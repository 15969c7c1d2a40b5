//! Beam extinction coefficient for an ellipsoidal leaf angle distribution.
//!
//! Campbell & Norman (1998), An Introduction to Environmental Biophysics,
//! Eq. 15.4.

/// Spherical leaf angle distribution.
pub const SPHERICAL_X_LAD: f64 = 1.0;

/// Beam extinction coefficient `K_be` at zenith angle `theta_deg`.
///
/// `x_lad` is the ratio of horizontal to vertical semi-axes of the
/// ellipsoid (1 for spherical). No validation is done on either input.
#[inline]
pub fn beam_extinction_coefficient(x_lad: f64, theta_deg: f64) -> f64 {
    let tan_theta = theta_deg.to_radians().tan();
    (x_lad * x_lad + tan_theta * tan_theta).sqrt()
        / (x_lad + 1.774 * (x_lad + 1.182).powf(-0.733))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spherical_at_nadir() {
        let k = beam_extinction_coefficient(SPHERICAL_X_LAD, 0.0);
        assert_relative_eq!(k, 0.499670104944067, max_relative = 1e-12);
    }

    #[test]
    fn test_nadir_reduces_to_ratio() {
        for x_lad in [0.5, 1.0, 2.0, 3.0] {
            let expected = x_lad / (x_lad + 1.774 * (x_lad + 1.182_f64).powf(-0.733));
            assert_relative_eq!(
                beam_extinction_coefficient(x_lad, 0.0),
                expected,
                max_relative = 1e-14
            );
        }
    }

    #[test]
    fn test_grows_off_nadir() {
        let nadir = beam_extinction_coefficient(1.0, 0.0);
        let mid = beam_extinction_coefficient(1.0, 45.0);
        let low = beam_extinction_coefficient(1.0, 75.0);
        assert!(nadir < mid && mid < low);
    }
}

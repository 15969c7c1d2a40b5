//! Canopy clumping index after Kustas & Norman (1999).
//!
//! Two closed-form factors are evaluated here: the nadir clumping index,
//! which forces the gap fraction of a clumped canopy to match that of an
//! equivalent homogeneous canopy, and its extension to an arbitrary view or
//! incidence zenith angle for randomly placed canopies.
//!
//! Inputs are not validated. Zero fractional cover or a zero width-to-height
//! ratio yield whatever IEEE arithmetic gives (zero, inf or NaN) rather than
//! an error; the only guard is the transmittance floor applied before the
//! logarithm.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{ArrayD, ArrayViewD, Zip};
use tracing::debug;

use crate::broadcast::{broadcast_shape, broadcast_to};
use crate::error::Result;
use crate::extinction::{beam_extinction_coefficient, SPHERICAL_X_LAD};

/// Lower bound substituted for non-positive canopy transmittance.
pub const TRANSMITTANCE_FLOOR: f64 = 1e-36;

/// Scalar parameters shared by every element of a grid evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClumpingParams {
    /// Ellipsoidal leaf angle distribution parameter (1 = spherical)
    pub x_lad: f64,
    /// Canopy width-to-height ratio
    pub wc: f64,
    /// True when LAI is the effective (field-averaged) LAI, false for local LAI
    pub lai_is_effective: bool,
}

impl Default for ClumpingParams {
    fn default() -> Self {
        Self {
            x_lad: SPHERICAL_X_LAD,
            wc: 1.0,
            lai_is_effective: true,
        }
    }
}

/// Returns the nadir clumping index and whether the transmittance floor was hit.
#[inline]
fn nadir_kernel(lai: f64, f_c: f64, k_be: f64, lai_is_effective: bool) -> (f64, bool) {
    let local_lai = if lai_is_effective { lai / f_c } else { lai };

    // Gap fraction of the clumped canopy
    let trans = f_c * (-k_be * local_lai).exp() + (1.0 - f_c);
    let floored = trans <= 0.0;
    let trans = if floored { TRANSMITTANCE_FLOOR } else { trans };

    (-trans.ln() / (local_lai * k_be), floored)
}

/// Nadir clumping index `omega0` for a single point.
///
/// Parameters:
/// - lai: Leaf area index, effective or local depending on `lai_is_effective`
/// - f_c: Apparent fractional cover (0-1]
/// - x_lad: Ellipsoidal leaf angle distribution parameter
/// - lai_is_effective: Whether `lai` is effective LAI
#[inline]
pub fn nadir_clumping_factor(lai: f64, f_c: f64, x_lad: f64, lai_is_effective: bool) -> f64 {
    let k_be = beam_extinction_coefficient(x_lad, 0.0);
    nadir_kernel(lai, f_c, k_be, lai_is_effective).0
}

/// Clumping index at zenith angle `theta` (degrees) given the nadir index.
///
/// Reduces to `omega0` at nadir and tends to 1 towards the horizon.
/// `wc` is the canopy width-to-height ratio.
#[inline]
pub fn angular_clumping_factor(omega0: f64, theta: f64, wc: f64) -> f64 {
    let wc_inv = 1.0 / wc;
    let gap_term = (-2.2 * theta.to_radians().powf(3.8 - 0.46 * wc_inv)).exp();
    omega0 / (omega0 + (1.0 - omega0) * gap_term)
}

/// Nadir clumping index over broadcast-compatible `lai` and `f_c` arrays.
///
/// Uses `params.x_lad` and `params.lai_is_effective`; `params.wc` is ignored.
pub fn nadir_clumping_grid(
    lai: ArrayViewD<f64>,
    f_c: ArrayViewD<f64>,
    params: &ClumpingParams,
) -> Result<ArrayD<f64>> {
    let shape = broadcast_shape(lai.shape(), f_c.shape())?;
    let lai = broadcast_to(&lai, &shape)?;
    let f_c = broadcast_to(&f_c, &shape)?;
    debug!(shape = ?shape, x_lad = params.x_lad, "nadir clumping grid");

    let k_be = beam_extinction_coefficient(params.x_lad, 0.0);
    let lai_is_effective = params.lai_is_effective;
    let floored = AtomicUsize::new(0);

    let omega0 = Zip::from(lai).and(f_c).par_map_collect(|&lai, &f_c| {
        let (value, hit_floor) = nadir_kernel(lai, f_c, k_be, lai_is_effective);
        if hit_floor {
            floored.fetch_add(1, Ordering::Relaxed);
        }
        value
    });

    let floored = floored.into_inner();
    if floored > 0 {
        debug!(floored, "transmittance clamped to floor");
    }

    Ok(omega0)
}

/// Angular clumping index over broadcast-compatible `omega0` and `theta` arrays.
pub fn angular_clumping_grid(
    omega0: ArrayViewD<f64>,
    theta: ArrayViewD<f64>,
    wc: f64,
) -> Result<ArrayD<f64>> {
    let shape = broadcast_shape(omega0.shape(), theta.shape())?;
    let omega0 = broadcast_to(&omega0, &shape)?;
    let theta = broadcast_to(&theta, &shape)?;
    debug!(shape = ?shape, wc, "angular clumping grid");

    Ok(Zip::from(omega0)
        .and(theta)
        .par_map_collect(|&omega0, &theta| angular_clumping_factor(omega0, theta, wc)))
}

/// Clumping index at `theta` straight from canopy structure.
///
/// Equivalent to [`nadir_clumping_grid`] followed by [`angular_clumping_grid`]
/// but traverses the grid once without an intermediate `omega0` array.
pub fn clumping_index_grid(
    lai: ArrayViewD<f64>,
    f_c: ArrayViewD<f64>,
    theta: ArrayViewD<f64>,
    params: &ClumpingParams,
) -> Result<ArrayD<f64>> {
    let shape = broadcast_shape(&broadcast_shape(lai.shape(), f_c.shape())?, theta.shape())?;
    let lai = broadcast_to(&lai, &shape)?;
    let f_c = broadcast_to(&f_c, &shape)?;
    let theta = broadcast_to(&theta, &shape)?;
    debug!(shape = ?shape, ?params, "clumping index grid");

    let k_be = beam_extinction_coefficient(params.x_lad, 0.0);
    let ClumpingParams {
        wc,
        lai_is_effective,
        ..
    } = *params;

    Ok(Zip::from(lai)
        .and(f_c)
        .and(theta)
        .par_map_collect(|&lai, &f_c, &theta| {
            let (omega0, _) = nadir_kernel(lai, f_c, k_be, lai_is_effective);
            angular_clumping_factor(omega0, theta, wc)
        }))
}

// ── PyO3 wrappers ───────────────────────────────────────────────────────────

#[cfg(feature = "python")]
pub(crate) mod python {
    use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use super::{
        angular_clumping_factor, angular_clumping_grid, clumping_index_grid,
        nadir_clumping_factor, nadir_clumping_grid, ClumpingParams,
    };
    use crate::extinction::beam_extinction_coefficient;

    /// Clumping parameters exposed to Python.
    #[pyclass(name = "ClumpingParams")]
    #[derive(Clone)]
    pub struct PyClumpingParams {
        /// Leaf angle distribution parameter (1.0 = spherical)
        #[pyo3(get, set)]
        pub x_lad: f64,
        /// Canopy width-to-height ratio
        #[pyo3(get, set)]
        pub wc: f64,
        /// Whether input LAI is effective LAI
        #[pyo3(get, set)]
        pub lai_is_effective: bool,
    }

    #[pymethods]
    impl PyClumpingParams {
        #[new]
        #[pyo3(signature = (x_lad=1.0, wc=1.0, lai_is_effective=true))]
        pub fn new(x_lad: f64, wc: f64, lai_is_effective: bool) -> Self {
            Self {
                x_lad,
                wc,
                lai_is_effective,
            }
        }
    }

    impl From<&PyClumpingParams> for ClumpingParams {
        fn from(p: &PyClumpingParams) -> Self {
            Self {
                x_lad: p.x_lad,
                wc: p.wc,
                lai_is_effective: p.lai_is_effective,
            }
        }
    }

    /// Nadir clumping index for a single point.
    #[pyfunction]
    #[pyo3(signature = (lai, f_c, x_lad=1.0, is_lai_eff=true))]
    pub fn nadir_clumping_single(lai: f64, f_c: f64, x_lad: f64, is_lai_eff: bool) -> f64 {
        nadir_clumping_factor(lai, f_c, x_lad, is_lai_eff)
    }

    /// Clumping index at an incidence angle (degrees) for a single point.
    #[pyfunction]
    #[pyo3(signature = (omega0, theta, wc=1.0))]
    pub fn angular_clumping_single(omega0: f64, theta: f64, wc: f64) -> f64 {
        angular_clumping_factor(omega0, theta, wc)
    }

    /// Nadir clumping index over arrays (any dimensionality, broadcast).
    ///
    /// Args:
    ///     lai: Leaf area index array (float64).
    ///     f_c: Fractional cover array (float64), broadcastable with `lai`.
    ///     x_lad: Leaf angle distribution parameter.
    ///     is_lai_eff: Whether `lai` is effective LAI.
    ///
    /// Returns:
    ///     Nadir clumping index with the broadcast shape.
    #[pyfunction]
    #[pyo3(signature = (lai, f_c, x_lad=1.0, is_lai_eff=true))]
    pub fn nadir_clumping<'py>(
        py: Python<'py>,
        lai: PyReadonlyArrayDyn<'py, f64>,
        f_c: PyReadonlyArrayDyn<'py, f64>,
        x_lad: f64,
        is_lai_eff: bool,
    ) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        let params = ClumpingParams {
            x_lad,
            lai_is_effective: is_lai_eff,
            ..ClumpingParams::default()
        };
        let result = nadir_clumping_grid(lai.as_array(), f_c.as_array(), &params)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Clumping index at incidence angles (degrees) over arrays.
    #[pyfunction]
    #[pyo3(signature = (omega0, theta, wc=1.0))]
    pub fn angular_clumping<'py>(
        py: Python<'py>,
        omega0: PyReadonlyArrayDyn<'py, f64>,
        theta: PyReadonlyArrayDyn<'py, f64>,
        wc: f64,
    ) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        let result = angular_clumping_grid(omega0.as_array(), theta.as_array(), wc)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Fused nadir + angular clumping index over arrays.
    #[pyfunction]
    #[pyo3(signature = (lai, f_c, theta, params=None))]
    pub fn clumping_index<'py>(
        py: Python<'py>,
        lai: PyReadonlyArrayDyn<'py, f64>,
        f_c: PyReadonlyArrayDyn<'py, f64>,
        theta: PyReadonlyArrayDyn<'py, f64>,
        params: Option<PyRef<'py, PyClumpingParams>>,
    ) -> PyResult<Bound<'py, PyArrayDyn<f64>>> {
        let params = params
            .map(|p| ClumpingParams::from(&*p))
            .unwrap_or_default();
        let result =
            clumping_index_grid(lai.as_array(), f_c.as_array(), theta.as_array(), &params)
                .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Beam extinction coefficient for an ellipsoidal leaf angle distribution.
    #[pyfunction]
    #[pyo3(signature = (x_lad=1.0, theta=0.0))]
    pub fn beam_extinction(x_lad: f64, theta: f64) -> f64 {
        beam_extinction_coefficient(x_lad, theta)
    }
}

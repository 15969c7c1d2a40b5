//! NumPy-style broadcasting for dynamic-dimension array views.

use ndarray::{ArrayViewD, IxDyn};

use crate::error::{ClumpingError, Result};

/// Broadcast shape of two operands.
///
/// Shapes are aligned on their trailing axes; each pair of axes must be
/// equal or one of them must be 1. Missing leading axes count as 1.
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut shape = vec![1; ndim];

    for (i, out) in shape.iter_mut().rev().enumerate() {
        let a = lhs.len().checked_sub(i + 1).map_or(1, |k| lhs[k]);
        let b = rhs.len().checked_sub(i + 1).map_or(1, |k| rhs[k]);
        *out = match (a, b) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(ClumpingError::Broadcast {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                })
            }
        };
    }

    Ok(shape)
}

/// Stretch `view` to `shape` without copying.
pub(crate) fn broadcast_to<'a>(
    view: &'a ArrayViewD<'_, f64>,
    shape: &[usize],
) -> Result<ArrayViewD<'a, f64>> {
    view.broadcast(IxDyn(shape))
        .ok_or_else(|| ClumpingError::Broadcast {
            lhs: view.shape().to_vec(),
            rhs: shape.to_vec(),
        })
}

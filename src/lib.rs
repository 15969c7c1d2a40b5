//! Canopy clumping index for two-source energy balance models.
//!
//! The kernels and grid operations are plain Rust over `ndarray`. Building
//! with the `python` feature adds the `tsebclump` extension module.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod broadcast;
pub mod clumping;
pub mod error;
pub mod extinction;

pub use clumping::{
    angular_clumping_factor, angular_clumping_grid, clumping_index_grid, nadir_clumping_factor,
    nadir_clumping_grid, ClumpingParams, TRANSMITTANCE_FLOOR,
};
pub use error::{ClumpingError, Result};
pub use extinction::beam_extinction_coefficient;

#[cfg(feature = "python")]
#[pymodule]
fn tsebclump(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    register_clumping_module(py_module)?;

    py_module.add("__doc__", "TSEB canopy clumping index implemented in Rust.")?;

    Ok(())
}

#[cfg(feature = "python")]
fn register_clumping_module(py_module: &Bound<'_, PyModule>) -> PyResult<()> {
    use clumping::python;

    let submodule = PyModule::new(py_module.py(), "clumping")?;
    submodule.add("__doc__", "Nadir and angular canopy clumping index.")?;
    submodule.add_class::<python::PyClumpingParams>()?;
    submodule.add_function(wrap_pyfunction!(python::nadir_clumping_single, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(python::angular_clumping_single, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(python::nadir_clumping, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(python::angular_clumping, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(python::clumping_index, &submodule)?)?;
    submodule.add_function(wrap_pyfunction!(python::beam_extinction, &submodule)?)?;
    py_module.add_submodule(&submodule)?;
    Ok(())
}

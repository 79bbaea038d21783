//! utils — conversion helpers for the PyO3 surface.
//!
//! Everything here is compiled only with the `python-bindings` feature and
//! exists to turn loosely typed Python arguments into validated Rust
//! configuration. Validation itself stays in the core modules; errors flow
//! back through the `From<…> for PyErr` impls.

#[cfg(feature = "python-bindings")]
use std::str::FromStr;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::least_squares::{LineSearcher, LsqOptions, Tolerances},
    peaks::options::{LagRangePolicy, PeakFitOptions, RefineStrategy},
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned copy of a 1-D float input; `name` is used in the error message.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

#[cfg(feature = "python-bindings")]
pub fn extract_lsq_opts(
    tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<LsqOptions> {
    let tols = Tolerances::new(tol_grad, tol_cost, max_iter)?;
    let ls = match line_searcher {
        Some(name) => LineSearcher::from_str(name)?,
        None => LineSearcher::MoreThuente,
    };
    Ok(LsqOptions::new(tols, ls, lbfgs_mem)?)
}

/// Keyword arguments of the Python `estimate_peak`, gathered before
/// validation.
#[cfg(feature = "python-bindings")]
pub struct PyFitArgs<'a> {
    pub edge_buffer_fraction: f64,
    pub thresh_val: f64,
    pub uthresh_val: f64,
    pub tweak_edges: bool,
    pub zero_on_reject: bool,
    pub refine: bool,
    pub lag_guess: Option<f64>,
    pub search_fraction: f64,
    pub bipolar: bool,
    pub lag_modulus: f64,
    pub enforce_threshold: bool,
    pub hard_limit: bool,
    pub abs_max_sigma: f64,
    pub refine_strategies: Option<Vec<String>>,
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
    pub line_searcher: Option<&'a str>,
    pub lbfgs_mem: Option<usize>,
}

#[cfg(feature = "python-bindings")]
pub fn build_fit_options(args: PyFitArgs<'_>) -> PyResult<PeakFitOptions> {
    let refine_strategies = match args.refine_strategies {
        Some(names) => names
            .iter()
            .map(|name| RefineStrategy::from_str(name))
            .collect::<Result<Vec<_>, _>>()?,
        None => vec![RefineStrategy::LeastSquares],
    };
    let solver = extract_lsq_opts(
        args.tol_grad,
        args.tol_cost,
        args.max_iter,
        args.line_searcher,
        args.lbfgs_mem,
    )?;
    let lag_range_policy =
        if args.hard_limit { LagRangePolicy::Hard } else { LagRangePolicy::Soft };

    let opts = PeakFitOptions {
        edge_buffer_fraction: args.edge_buffer_fraction,
        thresh_val: args.thresh_val,
        uthresh_val: args.uthresh_val,
        tweak_edges: args.tweak_edges,
        zero_on_reject: args.zero_on_reject,
        refine: args.refine,
        lag_guess: args.lag_guess,
        search_fraction: args.search_fraction,
        bipolar: args.bipolar,
        lag_modulus: args.lag_modulus,
        enforce_threshold: args.enforce_threshold,
        lag_range_policy,
        abs_max_sigma: args.abs_max_sigma,
        refine_strategies,
        solver,
    };
    opts.validate()?;
    Ok(opts)
}

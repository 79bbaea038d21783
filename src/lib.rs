//! rust_peakfit — peak/lag estimation for sampled correlation functions.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the peak engine to Python via the `_rust_peakfit` extension
//! module. When the `python-bindings` feature is enabled, this module
//! defines the Python-facing class and functions used by the `rust_peakfit`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`peaks`, `signal`, `optimization`) as
//!   the public crate surface.
//! - Define the `PeakFit` `#[pyclass]`, the `estimate_peak`,
//!   `locate_recent_peak` and `detect_extrema` functions, and the
//!   `#[pymodule]` initializer.
//! - Register the `peaks` and `extrema` submodules under `rust_peakfit` so
//!   dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument conversion and error mapping.
//! - A rejected fit is a normal return (`PeakFit.is_valid == False`), never
//!   a Python exception. Exceptions mean malformed input or options.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are rich enums internally and become
//!   `ValueError` at the PyO3 boundary.
//! - The failure mask is exposed both as an integer and as its symbolic
//!   names.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`peaks`] and [`signal`] directly and
//!   can ignore the items guarded by `python-bindings`.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_peak_pipeline.rs`.

pub mod optimization;
pub mod peaks;
pub mod signal;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::str::FromStr;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    peaks::{
        estimator::{FitResult, PeakEstimator},
        options::SearchLimits,
        streaming::RecentPeakOptions,
    },
    utils::{PyFitArgs, build_fit_options, extract_f64_vec},
};

/// PeakFit — Python-facing view of one peak estimate.
///
/// Purpose
/// -------
/// Carry a [`FitResult`] back to Python together with the estimator that
/// produced it.
///
/// Fields
/// ------
/// - `inner`: [`FitResult`]
///   The estimate, its validity flag and failure mask.
/// - `method`: [`PeakEstimator`]
///   Variant that produced `inner`.
///
/// Notes
/// -----
/// - Instances are created by `estimate_peak`; user code does not
///   construct them.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_peakfit.peaks")]
pub struct PeakFit {
    inner: FitResult,
    method: PeakEstimator,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PeakFit {
    #[getter]
    pub fn index(&self) -> usize {
        self.inner.index
    }

    #[getter]
    pub fn lag(&self) -> f64 {
        self.inner.lag
    }

    #[getter]
    pub fn amplitude(&self) -> f64 {
        self.inner.amplitude
    }

    #[getter]
    pub fn width(&self) -> f64 {
        self.inner.width
    }

    #[getter]
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid
    }

    /// Failure mask as a 16-bit integer; `0` when accepted.
    #[getter]
    pub fn failure(&self) -> u16 {
        self.inner.failure.bits()
    }

    /// Symbolic names of the set failure bits, lowest bit first.
    #[getter]
    pub fn failure_names(&self) -> Vec<String> {
        self.inner.failure.names().into_iter().map(str::to_string).collect()
    }

    #[getter]
    pub fn window_start(&self) -> usize {
        self.inner.window_start
    }

    #[getter]
    pub fn window_end(&self) -> usize {
        self.inner.window_end
    }

    #[getter]
    pub fn method(&self) -> &'static str {
        self.method.name()
    }

    fn __repr__(&self) -> String {
        format!(
            "PeakFit(method='{}', lag={}, amplitude={}, width={}, is_valid={}, failure={})",
            self.method,
            self.inner.lag,
            self.inner.amplitude,
            self.inner.width,
            if self.inner.is_valid { "True" } else { "False" },
            self.inner.failure,
        )
    }
}

/// Estimate the dominant peak of a sampled correlation function.
///
/// `method` is one of `'forward'`, `'gradient'` or `'quadratic'`; the
/// remaining keywords mirror `PeakFitOptions` (`hard_limit=False` selects
/// the soft lag-range policy).
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        x,
        y,
        lag_min,
        lag_max,
        width_limit,
        method = "forward",
        edge_buffer_fraction = 0.0,
        thresh_val = 0.0,
        uthresh_val = 1.0,
        tweak_edges = true,
        zero_on_reject = true,
        refine = false,
        lag_guess = None,
        search_fraction = 0.5,
        bipolar = false,
        lag_modulus = 1000.0,
        enforce_threshold = true,
        hard_limit = true,
        abs_max_sigma = 1000.0,
        refine_strategies = None,
        tol_grad = None,
        tol_cost = None,
        max_iter = None,
        line_searcher = None,
        lbfgs_mem = None,
    ),
    text_signature = "(x, y, lag_min, lag_max, width_limit, /, method='forward', \
                      edge_buffer_fraction=0.0, thresh_val=0.0, uthresh_val=1.0, \
                      tweak_edges=True, zero_on_reject=True, refine=False, lag_guess=None, \
                      search_fraction=0.5, bipolar=False, lag_modulus=1000.0, \
                      enforce_threshold=True, hard_limit=True, abs_max_sigma=1000.0, \
                      refine_strategies=None, tol_grad=None, tol_cost=None, max_iter=None, \
                      line_searcher=None, lbfgs_mem=None)"
)]
#[allow(clippy::too_many_arguments)]
pub fn estimate_peak<'py>(
    py: Python<'py>, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, lag_min: f64, lag_max: f64,
    width_limit: f64, method: &str, edge_buffer_fraction: f64, thresh_val: f64,
    uthresh_val: f64, tweak_edges: bool, zero_on_reject: bool, refine: bool,
    lag_guess: Option<f64>, search_fraction: f64, bipolar: bool, lag_modulus: f64,
    enforce_threshold: bool, hard_limit: bool, abs_max_sigma: f64,
    refine_strategies: Option<Vec<String>>, tol_grad: Option<f64>, tol_cost: Option<f64>,
    max_iter: Option<usize>, line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<PeakFit> {
    let x = extract_f64_vec(py, x, "x")?;
    let y = extract_f64_vec(py, y, "y")?;
    let method = PeakEstimator::from_str(method)?;
    let limits = SearchLimits::new(lag_min, lag_max, width_limit)?;
    let opts = build_fit_options(PyFitArgs {
        edge_buffer_fraction,
        thresh_val,
        uthresh_val,
        tweak_edges,
        zero_on_reject,
        refine,
        lag_guess,
        search_fraction,
        bipolar,
        lag_modulus,
        enforce_threshold,
        hard_limit,
        abs_max_sigma,
        refine_strategies,
        tol_grad,
        tol_cost,
        max_iter,
        line_searcher,
        lbfgs_mem,
    })?;

    let inner = peaks::estimator::estimate_peak(method, &x, &y, &limits, &opts)?;
    Ok(PeakFit { inner, method })
}

/// Time of a pulse peak the streaming signal has just passed, or `None`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (data, sample_rate, last_peak_time, window_secs = 5.0, thresh = 0.75,
                 hysteresis_secs = 0.4),
    text_signature = "(data, sample_rate, last_peak_time, /, window_secs=5.0, thresh=0.75, \
                      hysteresis_secs=0.4)"
)]
pub fn locate_recent_peak<'py>(
    py: Python<'py>, data: &Bound<'py, PyAny>, sample_rate: f64, last_peak_time: f64,
    window_secs: f64, thresh: f64, hysteresis_secs: f64,
) -> PyResult<Option<f64>> {
    let data = extract_f64_vec(py, data, "data")?;
    let opts = RecentPeakOptions { window_secs, thresh, hysteresis_secs };
    Ok(peaks::streaming::locate_recent_peak(&data, sample_rate, last_peak_time, &opts)?)
}

/// Local maxima and minima as two lists of `(position, value)` pairs.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (values, coords = None, lookahead = 200, delta = 0.0),
    text_signature = "(values, /, coords=None, lookahead=200, delta=0.0)"
)]
pub fn detect_extrema<'py>(
    py: Python<'py>, values: &Bound<'py, PyAny>, coords: Option<&Bound<'py, PyAny>>,
    lookahead: usize, delta: f64,
) -> PyResult<(Vec<(f64, f64)>, Vec<(f64, f64)>)> {
    let values = extract_f64_vec(py, values, "values")?;
    let coords = coords.map(|c| extract_f64_vec(py, c, "coords")).transpose()?;

    let list = peaks::extrema::detect_extrema(&values, coords.as_deref(), lookahead, delta)?;
    let pairs = |v: &[peaks::extrema::Extremum]| -> Vec<(f64, f64)> {
        v.iter().map(|e| (e.position, e.value)).collect()
    };
    Ok((pairs(&list.maxima), pairs(&list.minima)))
}

/// _rust_peakfit — PyO3 module initializer for the Python extension.
///
/// Purpose
/// -------
/// Define the `_rust_peakfit` Python module and register the `peaks` and
/// `extrema` submodules used by the public `rust_peakfit` package.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating submodules or manipulating `sys.modules` fails.
///
/// Notes
/// -----
/// - Invoked automatically by Python when importing the compiled extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_peakfit<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let peaks_mod = PyModule::new(_py, "peaks")?;
    let extrema_mod = PyModule::new(_py, "extrema")?;
    peaks_module(_py, m, &peaks_mod)?;
    extrema_module(_py, m, &extrema_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_peakfit.peaks", peaks_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("rust_peakfit.extrema", extrema_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn peaks_module<'py>(
    _py: Python, rust_peakfit: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PeakFit>()?;
    m.add_function(wrap_pyfunction!(estimate_peak, m)?)?;
    m.add_function(wrap_pyfunction!(locate_recent_peak, m)?)?;
    rust_peakfit.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn extrema_module<'py>(
    _py: Python, rust_peakfit: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(detect_extrema, m)?)?;
    rust_peakfit.add_submodule(m)?;
    Ok(())
}

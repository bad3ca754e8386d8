//! Python exception formatting and reporting

use pynode::Error;
use pyo3::prelude::*;

/// Format a Python error with full traceback for better debugging
pub(crate) fn format_python_error(py: Python<'_>, err: &PyErr) -> String {
    if let Some(tb) = err.traceback(py) {
        if let Ok(traceback_mod) = py.import("traceback") {
            if let Ok(lines) = traceback_mod
                .call_method1("format_exception", (err.get_type(py), err.value(py), tb))
            {
                if let Ok(iter) = lines.try_iter() {
                    let formatted: Vec<String> = iter
                        .filter_map(|line| line.ok())
                        .filter_map(|line| line.extract::<String>().ok())
                        .collect();
                    if !formatted.is_empty() {
                        return formatted.join("").trim_end().to_string();
                    }
                }
            }
        }
    }
    format!("{}", err)
}

/// Print the error through Python's own handler (stderr), then convert it.
pub(crate) fn report(py: Python<'_>, err: &PyErr) -> String {
    let message = format_python_error(py, err);
    err.print(py);
    message
}

/// Convert a Python error that is not reported to the user's stderr.
pub(crate) fn python_error(py: Python<'_>, err: PyErr) -> Error {
    Error::Python(format_python_error(py, &err))
}

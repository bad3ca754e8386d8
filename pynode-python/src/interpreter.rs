//! Interpreter startup and module search path handling
//!
//! PyO3 starts the interpreter on first use with default settings. A search
//! path override has to be applied before that happens, so `start` drives
//! CPython's `PyConfig` initialization directly in that case and then hands
//! the thread state back so PyO3 can acquire the GIL normally.
//!
//! Every other entry point in this crate goes through [`with_gil`], which
//! performs the default startup under the same lock, so a first use on one
//! thread cannot slip in between `start`'s check and its initialization.

use crate::config::InterpreterConfig;
use crate::error::python_error;
use parking_lot::Mutex;
use pynode::{Error, Result};
use pyo3::ffi;
use pyo3::prelude::*;
use pyo3::types::PyList;
use std::ffi::CStr;
use std::mem::MaybeUninit;

/// Serializes startup so two threads cannot both initialize CPython.
static START_LOCK: Mutex<()> = Mutex::new(());

/// Whether the embedded interpreter is running.
pub fn is_running() -> bool {
    unsafe { ffi::Py_IsInitialized() != 0 }
}

/// Run `f` with the GIL held, starting the interpreter with default settings
/// if nothing has started it yet.
///
/// `START_LOCK` is only taken while the interpreter is not running.
pub(crate) fn with_gil<F, R>(f: F) -> R
where
    F: for<'py> FnOnce(Python<'py>) -> R,
{
    if !is_running() {
        let _guard = START_LOCK.lock();
        if !is_running() {
            pyo3::prepare_freethreaded_python();
            tracing::info!("python interpreter started with default settings");
        }
    }
    Python::with_gil(f)
}

/// Start the interpreter.
///
/// A no-op when the interpreter is already running; an ignored search path
/// override is logged. `config.sys_paths` are appended either way.
pub fn start(config: &InterpreterConfig) -> Result<()> {
    {
        let _guard = START_LOCK.lock();

        if is_running() {
            if let Some(search_path) = &config.search_path {
                tracing::warn!(
                    search_path = %search_path,
                    "python interpreter already running, search path override ignored"
                );
            }
        } else {
            match &config.search_path {
                Some(search_path) => {
                    let entries = search_path_entries(search_path)?;
                    tracing::debug!(entries = entries.len(), "starting python with search path override");
                    unsafe { start_with_search_path(&entries)? };
                }
                None => pyo3::prepare_freethreaded_python(),
            }
            tracing::info!(version = %python_version(), "python interpreter started");
        }
    }

    for path in &config.sys_paths {
        append_sys_path(path)?;
    }

    Ok(())
}

/// Append a directory to the interpreter's `sys.path`.
pub fn append_sys_path(path: &str) -> Result<()> {
    with_gil(|py| {
        let sys_path = sys_path(py).map_err(|e| python_error(py, e))?;
        sys_path.append(path).map_err(|e| python_error(py, e))?;
        tracing::debug!(path, "appended to sys.path");
        Ok(())
    })
}

/// Current `sys.path` entries that are strings.
pub fn sys_path_entries() -> Result<Vec<String>> {
    with_gil(|py| {
        let sys_path = sys_path(py).map_err(|e| python_error(py, e))?;
        Ok(sys_path
            .iter()
            .filter_map(|entry| entry.extract::<String>().ok())
            .collect())
    })
}

/// Get Python version info
pub fn python_version() -> String {
    with_gil(|py| {
        let sys = py.import("sys").ok();
        sys.and_then(|s| s.getattr("version").ok())
            .and_then(|v| v.extract().ok())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

fn sys_path(py: Python<'_>) -> PyResult<Bound<'_, PyList>> {
    Ok(py.import("sys")?.getattr("path")?.downcast_into::<PyList>()?)
}

/// Split a search path on the platform separator and encode each entry as a
/// NUL-terminated wide string.
fn search_path_entries(search_path: &str) -> Result<Vec<Vec<libc::wchar_t>>> {
    std::env::split_paths(search_path)
        .map(|entry| {
            let entry = entry.to_str().ok_or_else(|| {
                Error::InvalidPath(format!("'{}' is not valid unicode", entry.display()))
            })?;
            if entry.contains('\0') {
                return Err(Error::InvalidPath(format!("'{}' contains a NUL byte", entry.escape_debug())));
            }
            Ok(to_wide(entry))
        })
        .collect()
}

#[cfg(windows)]
fn to_wide(s: &str) -> Vec<libc::wchar_t> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(not(windows))]
fn to_wide(s: &str) -> Vec<libc::wchar_t> {
    s.chars()
        .map(|c| c as u32 as libc::wchar_t)
        .chain(std::iter::once(0))
        .collect()
}

/// Initialize CPython with an explicit module search path.
///
/// # Safety
/// The interpreter must not be running and the caller must hold `START_LOCK`.
unsafe fn start_with_search_path(entries: &[Vec<libc::wchar_t>]) -> Result<()> {
    let mut config = MaybeUninit::<ffi::PyConfig>::uninit();
    unsafe { ffi::PyConfig_InitPythonConfig(config.as_mut_ptr()) };
    let mut config = unsafe { config.assume_init() };

    let result = unsafe { initialize_from_config(&mut config, entries) };
    unsafe { ffi::PyConfig_Clear(&mut config) };
    result?;

    // Py_InitializeFromConfig leaves this thread holding the GIL
    unsafe { ffi::PyEval_SaveThread() };
    Ok(())
}

unsafe fn initialize_from_config(
    config: &mut ffi::PyConfig,
    entries: &[Vec<libc::wchar_t>],
) -> Result<()> {
    for entry in entries {
        let status = unsafe { ffi::PyWideStringList_Append(&mut config.module_search_paths, entry.as_ptr()) };
        unsafe { check_status(status, "failed to add search path entry")? };
    }
    config.module_search_paths_set = 1;
    // The host process owns SIGINT
    config.install_signal_handlers = 0;

    let status = unsafe { ffi::Py_InitializeFromConfig(config) };
    unsafe { check_status(status, "Py_InitializeFromConfig failed") }
}

unsafe fn check_status(status: ffi::PyStatus, context: &str) -> Result<()> {
    let err_msg = status.err_msg;
    if unsafe { ffi::PyStatus_Exception(status) } == 0 {
        return Ok(());
    }
    let detail = if err_msg.is_null() {
        "unknown error".to_string()
    } else {
        unsafe { CStr::from_ptr(err_msg) }.to_string_lossy().into_owned()
    };
    Err(Error::Init(format!("{}: {}", context, detail)))
}

//! Loaded module handle and call dispatch
//!
//! A `Session` holds at most one imported module. Calls resolve a name on
//! that module, check the argument count against the callable's declared
//! parameters, and marshal arguments and the result through `pynode::Value`.

use crate::error::{python_error, report};
use crate::interpreter::with_gil;
use crate::marshal::{self, type_name};
use parking_lot::Mutex;
use pynode::{Error, Result, Value};
use pyo3::intern;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyString, PyTuple};

struct LoadedModule {
    name: String,
    module: Py<PyModule>,
}

/// A Python module session
///
/// The lock is only taken with the GIL held and is released before any
/// Python code runs, including finalizers of a replaced module.
pub struct Session {
    module: Mutex<Option<LoadedModule>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            module: Mutex::new(None),
        }
    }

    /// Import `name` and make it the session's module.
    ///
    /// On failure the previously loaded module stays in place.
    pub fn open_file(&self, name: &str) -> Result<()> {
        with_gil(|py| {
            let module = import_fs_name(py, name).map_err(|err| {
                let message = report(py, &err);
                tracing::error!(module = name, "Failed to load module: {}", name);
                Error::Import {
                    module: name.to_string(),
                    message,
                }
            })?;

            let previous = self.module.lock().replace(LoadedModule {
                name: name.to_string(),
                module: module.unbind(),
            });
            // The old module drops at the end of this closure, outside the lock
            match &previous {
                Some(prev) => tracing::info!(module = name, replaced = %prev.name, "loaded python module"),
                None => tracing::info!(module = name, "loaded python module"),
            }
            Ok(())
        })
    }

    /// Call `function` on the loaded module with positional `args`.
    ///
    /// The argument count must equal the callable's declared parameter
    /// count; otherwise nothing is called. Results of an unsupported type
    /// come back as `Value::None`.
    pub fn call(&self, function: &str, args: &[Value]) -> Result<Value> {
        with_gil(|py| {
            let module = self
                .module
                .lock()
                .as_ref()
                .map(|loaded| loaded.module.clone_ref(py))
                .ok_or(Error::NoModuleLoaded)?;
            let module = module.bind(py);

            let target = module.getattr(function).map_err(|err| {
                report(py, &err);
                tracing::error!(function, "Function call failed: name not found in module");
                Error::Unresolved(function.to_string())
            })?;
            if !target.is_callable() {
                tracing::error!(function, type_name = %type_name(&target), "Function call failed: not callable");
                return Err(Error::NotCallable(function.to_string()));
            }

            let expected = declared_arity(py, &target)
                .map_err(|e| python_error(py, e))?
                .ok_or_else(|| Error::UnknownArity(function.to_string()))?;
            if expected != args.len() {
                return Err(Error::Arity {
                    function: function.to_string(),
                    expected,
                    passed: args.len(),
                });
            }

            let py_args = args
                .iter()
                .map(|arg| marshal::to_python(py, arg))
                .collect::<PyResult<Vec<_>>>()
                .and_then(|items| PyTuple::new(py, items))
                .map_err(|e| python_error(py, e))?;

            tracing::debug!(
                function,
                args = ?args.iter().map(pynode::Value::kind).collect::<Vec<_>>(),
                "calling python function"
            );
            let result = target.call1(py_args).map_err(|err| Error::Python(report(py, &err)))?;

            let value = marshal::from_python(&result).map_err(|e| python_error(py, e))?;
            tracing::debug!(function, result = %value.to_json(), "python function returned");
            Ok(value)
        })
    }

    /// Drop the loaded module, if any.
    pub fn close(&self) {
        with_gil(|_| {
            let previous = self.module.lock().take();
            if let Some(prev) = previous {
                tracing::debug!(module = %prev.name, "closed python module");
            }
        });
    }

    pub fn is_loaded(&self) -> bool {
        self.module.lock().is_some()
    }

    /// Name the loaded module was opened with.
    pub fn module_name(&self) -> Option<String> {
        self.module.lock().as_ref().map(|loaded| loaded.name.clone())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Import a module whose name is decoded with the filesystem encoding.
fn import_fs_name<'py>(py: Python<'py>, name: &str) -> PyResult<Bound<'py, PyModule>> {
    let decoded = py
        .import("os")?
        .call_method1("fsdecode", (PyBytes::new(py, name.as_bytes()),))?
        .downcast_into::<PyString>()?;
    PyModule::import(py, decoded)
}

/// Number of positional parameters `target` declares.
///
/// Plain functions report `co_argcount`, which counts parameters with
/// defaults too. Bound methods drop the bound `self`. Anything else falls
/// back to `inspect.signature`; `None` when that fails too.
fn declared_arity(py: Python<'_>, target: &Bound<'_, PyAny>) -> PyResult<Option<usize>> {
    if target.hasattr(intern!(py, "__self__"))? {
        if let Ok(func) = target.getattr(intern!(py, "__func__")) {
            if let Some(count) = code_argcount(py, &func)? {
                return Ok(Some(count.saturating_sub(1)));
            }
        }
    } else if let Some(count) = code_argcount(py, target)? {
        return Ok(Some(count));
    }

    let inspect = py.import("inspect")?;
    let signature = match inspect.call_method1("signature", (target,)) {
        Ok(signature) => signature,
        Err(_) => return Ok(None),
    };
    let parameter = inspect.getattr("Parameter")?;
    let positional = [
        parameter.getattr("POSITIONAL_ONLY")?,
        parameter.getattr("POSITIONAL_OR_KEYWORD")?,
    ];

    let mut count = 0;
    for param in signature.getattr("parameters")?.call_method0("values")?.try_iter()? {
        let kind = param?.getattr("kind")?;
        if positional.iter().any(|k| kind.is(k)) {
            count += 1;
        }
    }
    Ok(Some(count))
}

fn code_argcount(py: Python<'_>, func: &Bound<'_, PyAny>) -> PyResult<Option<usize>> {
    match func.getattr(intern!(py, "__code__")) {
        Ok(code) => Ok(Some(code.getattr(intern!(py, "co_argcount"))?.extract()?)),
        Err(_) => Ok(None),
    }
}

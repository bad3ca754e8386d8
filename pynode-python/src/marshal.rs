//! Conversion between Python objects and `pynode::Value`
//!
//! Return values are classified by their exact Python type. Subclasses and
//! every other type are unsupported and come back as `Value::None`, which the
//! host sees as `undefined`.

use pynode::value::MAX_DEPTH;
use pynode::Value;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::IntoPyObject;
use pyo3::types::{PyBool, PyBytes, PyDict, PyFloat, PyInt, PyList, PyString};

/// Exact Python type of a returned object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyKind {
    Int,
    Float,
    Bytes,
    Text,
    Bool,
    List,
    Dict,
    Unsupported,
}

impl PyKind {
    pub fn of(obj: &Bound<'_, PyAny>) -> Self {
        if obj.is_exact_instance_of::<PyBool>() {
            PyKind::Bool
        } else if obj.is_exact_instance_of::<PyInt>() {
            PyKind::Int
        } else if obj.is_exact_instance_of::<PyFloat>() {
            PyKind::Float
        } else if obj.is_exact_instance_of::<PyBytes>() {
            PyKind::Bytes
        } else if obj.is_exact_instance_of::<PyString>() {
            PyKind::Text
        } else if obj.is_exact_instance_of::<PyList>() {
            PyKind::List
        } else if obj.is_exact_instance_of::<PyDict>() {
            PyKind::Dict
        } else {
            PyKind::Unsupported
        }
    }
}

/// Convert a Python object into a `Value`.
///
/// Lists and dicts that contain themselves, or nest deeper than
/// `MAX_DEPTH`, raise `ValueError`.
pub fn from_python(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    convert(obj, &mut Vec::new())
}

/// `parents` holds the identities of the containers enclosing `obj`.
fn convert(obj: &Bound<'_, PyAny>, parents: &mut Vec<usize>) -> PyResult<Value> {
    let kind = PyKind::of(obj);
    if matches!(kind, PyKind::List | PyKind::Dict) {
        enter(obj, parents)?;
    }

    let value = match kind {
        PyKind::Int => match obj.extract::<i64>() {
            Ok(i) => Value::Int(i),
            // Outside i64: JavaScript only has doubles anyway
            Err(_) => Value::Float(obj.extract::<f64>()?),
        },
        PyKind::Float => Value::Float(obj.downcast::<PyFloat>()?.value()),
        PyKind::Bytes => Value::Bytes(obj.downcast::<PyBytes>()?.as_bytes().to_vec()),
        PyKind::Text => Value::Text(obj.downcast::<PyString>()?.to_string_lossy().into_owned()),
        PyKind::Bool => Value::Bool(obj.is_truthy()?),
        PyKind::List => Value::List(
            obj.downcast::<PyList>()?
                .iter()
                .map(|item| convert(&item, parents))
                .collect::<PyResult<_>>()?,
        ),
        PyKind::Dict => Value::Map(
            obj.downcast::<PyDict>()?
                .iter()
                .map(|(key, value)| Ok((key_string(&key)?, convert(&value, parents)?)))
                .collect::<PyResult<_>>()?,
        ),
        PyKind::Unsupported => {
            tracing::debug!(
                type_name = %type_name(obj),
                "unsupported python type, no value returned"
            );
            Value::None
        }
    };

    if matches!(kind, PyKind::List | PyKind::Dict) {
        parents.pop();
    }
    Ok(value)
}

fn enter(obj: &Bound<'_, PyAny>, parents: &mut Vec<usize>) -> PyResult<()> {
    let id = obj.as_ptr() as usize;
    if parents.contains(&id) {
        return Err(PyValueError::new_err(format!(
            "cannot convert a {} that contains itself",
            type_name(obj)
        )));
    }
    if parents.len() >= MAX_DEPTH {
        return Err(PyValueError::new_err(format!(
            "cannot convert values nested deeper than {} levels",
            MAX_DEPTH
        )));
    }
    parents.push(id);
    Ok(())
}

/// Convert a `Value` into a new Python object.
pub fn to_python<'py>(py: Python<'py>, value: &Value) -> PyResult<Bound<'py, PyAny>> {
    let obj = match value {
        Value::None => py.None().into_bound(py),
        Value::Int(i) => (*i).into_pyobject(py)?.into_any(),
        Value::Float(f) => PyFloat::new(py, *f).into_any(),
        Value::Bytes(b) => PyBytes::new(py, b).into_any(),
        Value::Text(s) => PyString::new(py, s).into_any(),
        Value::Bool(b) => PyBool::new(py, *b).to_owned().into_any(),
        Value::List(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(to_python(py, item)?)?;
            }
            list.into_any()
        }
        Value::Map(entries) => {
            let dict = PyDict::new(py);
            for (key, item) in entries {
                dict.set_item(key, to_python(py, item)?)?;
            }
            dict.into_any()
        }
    };
    Ok(obj)
}

/// Dict keys become object keys; non-`str` keys use `str(key)`.
fn key_string(key: &Bound<'_, PyAny>) -> PyResult<String> {
    match key.downcast::<PyString>() {
        Ok(s) => Ok(s.to_string_lossy().into_owned()),
        Err(_) => Ok(key.str()?.to_string_lossy().into_owned()),
    }
}

pub(crate) fn type_name(obj: &Bound<'_, PyAny>) -> String {
    obj.get_type()
        .name()
        .map(|name| name.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::ffi::CString;

    fn eval(expr: &str) -> Value {
        Python::with_gil(|py| {
            let code = CString::new(expr).unwrap();
            let obj = py.eval(&code, None, None).unwrap();
            from_python(&obj).unwrap()
        })
    }

    #[test]
    fn test_scalars() {
        assert_eq!(eval("42"), Value::Int(42));
        assert_eq!(eval("-1.5"), Value::Float(-1.5));
        assert_eq!(eval("b'raw'"), Value::Bytes(b"raw".to_vec()));
        assert_eq!(eval("'héllo'"), Value::Text("héllo".to_string()));
        assert_eq!(eval("True"), Value::Bool(true));
        assert_eq!(eval("False"), Value::Bool(false));
    }

    #[test]
    fn test_big_int_becomes_float() {
        assert_eq!(eval("2 ** 70"), Value::Float(2f64.powi(70)));
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            eval("[1, 'a', [True]]"),
            Value::List(vec![
                Value::Int(1),
                Value::Text("a".into()),
                Value::List(vec![Value::Bool(true)]),
            ])
        );
        assert_eq!(
            eval("{'z': 1, 'a': 2.5, 3: None}"),
            Value::Map(vec![
                ("z".to_string(), Value::Int(1)),
                ("a".to_string(), Value::Float(2.5)),
                ("3".to_string(), Value::None),
            ])
        );
    }

    #[test]
    fn test_unsupported_types() {
        assert_eq!(eval("None"), Value::None);
        assert_eq!(eval("{1, 2}"), Value::None);
        assert_eq!(eval("(1, 2)"), Value::None);
        assert_eq!(eval("[object()]"), Value::List(vec![Value::None]));
    }

    fn eval_err(expr: &str) -> String {
        Python::with_gil(|py| {
            let code = CString::new(expr).unwrap();
            let obj = py.eval(&code, None, None).unwrap();
            from_python(&obj).unwrap_err().to_string()
        })
    }

    #[test]
    fn test_self_referencing_containers_rejected() {
        let list = eval_err("(lambda l: (l.append(l), l)[1])([])");
        assert!(list.contains("list that contains itself"), "{}", list);

        let dict = eval_err("(lambda d: (d.__setitem__('me', d), d)[1])({})");
        assert!(dict.contains("dict that contains itself"), "{}", dict);
    }

    #[test]
    fn test_shared_values_are_not_cycles() {
        assert_eq!(
            eval("(lambda x: [x, {'again': x}])([1])"),
            Value::List(vec![
                Value::List(vec![Value::Int(1)]),
                Value::Map(vec![("again".to_string(), Value::List(vec![Value::Int(1)]))]),
            ])
        );
    }

    #[test]
    fn test_nesting_limit() {
        let at_limit = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(matches!(eval(&at_limit), Value::List(_)));

        let too_deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(eval_err(&too_deep).contains("nested deeper than 64 levels"));
    }

    #[test]
    fn test_kind_is_exact() {
        Python::with_gil(|py| {
            let code = CString::new("type('MyList', (list,), {})()").unwrap();
            let subclassed = py.eval(&code, None, None).unwrap();
            assert_eq!(PyKind::of(&subclassed), PyKind::Unsupported);

            let flag = PyBool::new(py, true).to_owned().into_any();
            assert_eq!(PyKind::of(&flag), PyKind::Bool);
        });
    }

    #[test]
    fn test_to_python_types() {
        Python::with_gil(|py| {
            let cases = [
                (Value::Int(3), "int"),
                (Value::Float(0.25), "float"),
                (Value::Bytes(vec![0, 1]), "bytes"),
                (Value::Text("t".into()), "str"),
                (Value::Bool(false), "bool"),
                (Value::None, "NoneType"),
                (Value::List(vec![]), "list"),
                (Value::Map(vec![]), "dict"),
            ];
            for (value, expected) in cases {
                let obj = to_python(py, &value).unwrap();
                assert_eq!(type_name(&obj), expected);
            }
        });
    }

    #[test]
    fn test_nested_values_survive_python() {
        let value = Value::Map(vec![
            ("name".to_string(), Value::Text("pynode".into())),
            (
                "tags".to_string(),
                Value::List(vec![Value::Int(1), Value::Bytes(b"x".to_vec())]),
            ),
        ]);
        let back = Python::with_gil(|py| from_python(&to_python(py, &value).unwrap()).unwrap());
        assert_eq!(back, value);
    }
}

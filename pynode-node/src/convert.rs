//! Conversion between JavaScript values and `pynode::Value`

use napi::{
    sys, Env, JsBoolean, JsBuffer, JsNumber, JsObject, JsString, JsUnknown, NapiRaw, NapiValue,
    Result, ValueType,
};
use pynode::args::{HostKind, Shape};
use pynode::value::MAX_DEPTH;
use pynode::{Error, Value};

/// Map a bridge error onto a thrown JavaScript `Error`.
pub fn to_napi(err: Error) -> napi::Error {
    napi::Error::from_reason(err.to_string())
}

/// Read an optional argument as a string, `None` when it is absent or not a string.
pub fn string_arg(value: Option<JsUnknown>) -> Result<Option<String>> {
    match value {
        Some(value) if value.get_type()? == ValueType::String => {
            let s = unsafe { value.cast::<JsString>() };
            Ok(Some(s.into_utf8()?.into_owned()?))
        }
        _ => Ok(None),
    }
}

/// Convert a JavaScript value into a `Value`.
///
/// Arrays and objects that contain themselves, or nest deeper than
/// `MAX_DEPTH`, are rejected.
pub fn from_js(env: &Env, value: JsUnknown) -> Result<Value> {
    convert(env, value, &mut Vec::new())
}

fn host_kind(value: &JsUnknown) -> Result<HostKind> {
    let kind = match value.get_type()? {
        ValueType::Undefined => HostKind::Undefined,
        ValueType::Null => HostKind::Null,
        ValueType::Boolean => HostKind::Boolean,
        ValueType::Number => HostKind::Number,
        ValueType::String => HostKind::String,
        ValueType::Object if value.is_buffer()? => HostKind::Buffer,
        ValueType::Object if value.is_array()? => HostKind::Array,
        ValueType::Object => HostKind::Object,
        ValueType::Function => HostKind::Function,
        ValueType::Symbol => HostKind::Symbol,
        ValueType::External => HostKind::External,
        _ => HostKind::Other,
    };
    Ok(kind)
}

/// `parents` holds the arrays and objects enclosing `value`.
fn convert(env: &Env, value: JsUnknown, parents: &mut Vec<sys::napi_value>) -> Result<Value> {
    let shape = host_kind(&value)?.shape().map_err(to_napi)?;
    let converted = match shape {
        Shape::None => Value::None,
        Shape::Bool => Value::Bool(unsafe { value.cast::<JsBoolean>() }.get_value()?),
        Shape::Number => Value::from_number(unsafe { value.cast::<JsNumber>() }.get_double()?),
        Shape::Text => Value::Text(unsafe { value.cast::<JsString>() }.into_utf8()?.into_owned()?),
        Shape::Bytes => {
            let buffer = unsafe { value.cast::<JsBuffer>() }.into_value()?;
            Value::Bytes(buffer.to_vec())
        }
        Shape::List => {
            let array = unsafe { value.cast::<JsObject>() };
            enter(env, &array, parents)?;
            let len = array.get_array_length()?;
            let mut items = Vec::with_capacity(len as usize);
            for i in 0..len {
                items.push(convert(env, array.get_element::<JsUnknown>(i)?, parents)?);
            }
            parents.pop();
            Value::List(items)
        }
        Shape::Map => {
            let object = unsafe { value.cast::<JsObject>() };
            enter(env, &object, parents)?;
            let keys = object.get_property_names()?;
            let len = keys.get_array_length()?;
            let mut entries = Vec::with_capacity(len as usize);
            for i in 0..len {
                let key = keys.get_element::<JsString>(i)?.into_utf8()?.into_owned()?;
                let item = object.get_named_property::<JsUnknown>(&key)?;
                entries.push((key, convert(env, item, parents)?));
            }
            parents.pop();
            Value::Map(entries)
        }
    };
    Ok(converted)
}

fn enter(env: &Env, object: &JsObject, parents: &mut Vec<sys::napi_value>) -> Result<()> {
    let raw = unsafe { object.raw() };
    for &parent in parents.iter() {
        let (parent, current) = unsafe {
            (
                JsObject::from_raw_unchecked(env.raw(), parent),
                JsObject::from_raw_unchecked(env.raw(), raw),
            )
        };
        if env.strict_equals(parent, current)? {
            return Err(to_napi(Error::UnsupportedArgument(
                "an object that contains itself cannot be passed to python".to_string(),
            )));
        }
    }
    if parents.len() >= MAX_DEPTH {
        return Err(to_napi(Error::UnsupportedArgument(format!(
            "values nested deeper than {} levels cannot be passed to python",
            MAX_DEPTH
        ))));
    }
    parents.push(raw);
    Ok(())
}

/// Convert a `Value` into a JavaScript value.
///
/// `Value::None` becomes `undefined`; bytes become a string.
pub fn to_js(env: &Env, value: &Value) -> Result<JsUnknown> {
    let js = match value {
        Value::None => env.get_undefined()?.into_unknown(),
        Value::Int(i) => env.create_double(*i as f64)?.into_unknown(),
        Value::Float(f) => env.create_double(*f)?.into_unknown(),
        Value::Bytes(b) => env
            .create_string_from_std(String::from_utf8_lossy(b).into_owned())?
            .into_unknown(),
        Value::Text(s) => env.create_string(s)?.into_unknown(),
        Value::Bool(b) => env.get_boolean(*b)?.into_unknown(),
        Value::List(items) => {
            let mut array = env.create_array_with_length(items.len())?;
            for (i, item) in items.iter().enumerate() {
                array.set_element(i as u32, to_js(env, item)?)?;
            }
            array.into_unknown()
        }
        Value::Map(entries) => {
            let mut object = env.create_object()?;
            for (key, item) in entries {
                object.set_named_property(key, to_js(env, item)?)?;
            }
            object.into_unknown()
        }
    };
    Ok(js)
}

//! # pynode Node.js addon
//!
//! Exposes an embedded Python interpreter to JavaScript:
//!
//! ```js
//! const pynode = require('./pynode.node');
//!
//! pynode.startInterpreter();
//! pynode.appendSysPath('./python');
//! pynode.openFile('handlers');       // imports handlers.py
//! pynode.call('add', 1, 2);          // 3
//! ```
//!
//! `call` checks the argument count against the Python function's declared
//! parameters before calling it. All calls run synchronously on the calling
//! thread.
//!
//! The free functions share one process-wide [`Session`], so `call` always
//! targets the module most recently opened with `openFile`.

mod convert;

use convert::{from_js, string_arg, to_js, to_napi};
use napi::{CallContext, JsObject, JsUndefined, JsUnknown, Result, ValueType};
use napi_derive::{js_function, module_exports};
use pynode::args::call_target;
use pynode::Error;
use pynode_python::{interpreter, InterpreterConfig, Session};
use std::sync::OnceLock;

fn session() -> &'static Session {
    static SESSION: OnceLock<Session> = OnceLock::new();
    SESSION.get_or_init(Session::new)
}

/// First argument if the callback received at least one.
fn first_arg(ctx: &CallContext) -> Result<Option<JsUnknown>> {
    if ctx.length == 0 {
        return Ok(None);
    }
    ctx.get::<JsUnknown>(0).map(Some)
}

#[module_exports]
fn init(mut exports: JsObject) -> Result<()> {
    pynode::tracing::init();

    exports.create_named_method("call", call)?;
    exports.create_named_method("startInterpreter", start_interpreter)?;
    exports.create_named_method("appendSysPath", append_sys_path)?;
    exports.create_named_method("openFile", open_file)?;
    Ok(())
}

/// `startInterpreter(path?: string | { searchPath?: string, sysPaths?: string[] })`
///
/// A single string argument replaces the interpreter's module search path.
/// An options object may also list directories to append to `sys.path`.
#[js_function(1)]
fn start_interpreter(ctx: CallContext) -> Result<JsUndefined> {
    let config = match first_arg(&ctx)? {
        Some(arg) if ctx.length == 1 && arg.get_type()? == ValueType::String => {
            let path = string_arg(Some(arg))?.unwrap_or_default();
            InterpreterConfig::with_search_path(path)
        }
        Some(arg) if ctx.length == 1 && arg.get_type()? == ValueType::Object && !arg.is_array()? => {
            ctx.env.from_js_value::<InterpreterConfig, _>(arg)?
        }
        _ => InterpreterConfig::default(),
    };

    interpreter::start(&config).map_err(to_napi)?;
    ctx.env.get_undefined()
}

/// `appendSysPath(path: string)`
#[js_function(1)]
fn append_sys_path(ctx: CallContext) -> Result<JsUndefined> {
    let path = string_arg(first_arg(&ctx)?)?
        .ok_or_else(|| to_napi(Error::MissingArgument("appendSysPath")))?;

    interpreter::append_sys_path(&path).map_err(to_napi)?;
    ctx.env.get_undefined()
}

/// `openFile(moduleName: string)`
#[js_function(1)]
fn open_file(ctx: CallContext) -> Result<JsUndefined> {
    let name = string_arg(first_arg(&ctx)?)?
        .ok_or_else(|| to_napi(Error::MissingArgument("openFile")))?;

    session().open_file(&name).map_err(to_napi)?;
    ctx.env.get_undefined()
}

/// `call(functionName: string, ...args)`
// One slot for the name plus MAX_CALL_ARGS
#[js_function(33)]
fn call(ctx: CallContext) -> Result<JsUnknown> {
    let name = string_arg(first_arg(&ctx)?)?;
    let function = call_target(name, ctx.length.saturating_sub(1)).map_err(to_napi)?;

    let mut args = Vec::with_capacity(ctx.length - 1);
    for i in 1..ctx.length {
        args.push(from_js(ctx.env, ctx.get::<JsUnknown>(i)?)?);
    }

    let result = session().call(&function, &args).map_err(to_napi)?;
    to_js(ctx.env, &result)
}

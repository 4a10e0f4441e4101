// Raw context pointers are accepted by safe constructors; callers keep them valid.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

//! RAII wrappers for the JavaScriptCore C API.
//!
//! Each engine handle is owned by a Rust value: [`JsContext`] releases its
//! global context, [`JsValue`] and [`JsObject`] keep their referent
//! GC-protected, and [`JsString`] releases its string. Every engine call
//! that can throw returns a [`JsResult`]; the thrown value is copied into a
//! [`JsException`] so the error message carries the JavaScript text.
//!
//! # Example
//!
//! ```
//! use jscbind::JsContext;
//!
//! let ctx = JsContext::new().unwrap();
//! let add = ctx.eval("(function (a, b) { return { sum: a + b }; })").unwrap();
//! let result = add
//!     .into_object()
//!     .unwrap()
//!     .call_as_function(&[&ctx.number(2.0), &ctx.number(3.0)])
//!     .unwrap();
//! assert_eq!(result.to_json_string(0).unwrap(), r#"{"sum":5}"#);
//! ```
//!
//! # Thread Safety
//!
//! All types are `!Send` and `!Sync`.
//!
//! ```compile_fail
//! use jscbind::JsContext;
//!
//! let ctx = JsContext::new().unwrap();
//! std::thread::spawn(move || {
//!     let _ = ctx.eval("1 + 1");
//! });
//! ```
//!
//! ```compile_fail
//! use jscbind::JsContext;
//!
//! let ctx = JsContext::new().unwrap();
//! let value = ctx.eval("42").unwrap();
//! std::thread::spawn(move || {
//!     let _ = value.to_number();
//! });
//! ```

mod context;
mod error;
mod exception;
mod object;
mod string;
mod value;

pub use context::JsContext;
pub use error::{JsError, JsResult, Operation};
pub use exception::JsException;
pub use object::JsObject;
pub use string::{JsString, js_string_to_rust};
pub use value::{JsType, JsValue};

pub use jscbind_sys;

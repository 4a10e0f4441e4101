//! Capture of values thrown by the engine
//!
//! JSC reports failures through an `exception` out-parameter. The helpers
//! here read that value while it is still reachable and copy out everything
//! a host error needs, so the resulting [`JsException`] owns no engine
//! handles and can outlive the context.

use jscbind_sys::*;
use std::fmt;
use std::ptr;

use tracing::debug;

use crate::error::{JsError, JsResult, Operation};
use crate::string::{JsString, js_string_to_rust};

/// A thrown JavaScript value, copied into host memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsException {
    /// `String(value)` of the thrown value, as the engine printed it
    pub text: String,
    /// `name` of a thrown Error ("TypeError", ...); `None` for other values
    pub error_type: Option<String>,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub stack: Option<String>,
}

impl fmt::Display for JsException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.text.is_empty() {
            return f.write_str(&self.text);
        }
        match &self.error_type {
            Some(error_type) if self.message.is_empty() => f.write_str(error_type),
            Some(error_type) => write!(f, "{}: {}", error_type, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl JsException {
    /// Copy the details of a thrown value
    ///
    /// # Safety
    /// - `ctx` must be a valid JSContextRef
    /// - `exception` must be a value of that context or null
    pub unsafe fn from_raw(ctx: JSContextRef, exception: JSValueRef) -> Self {
        if exception.is_null() {
            return Self {
                message: "Unknown exception".into(),
                ..Default::default()
            };
        }

        // SAFETY: ctx and exception are valid per caller contract
        unsafe {
            let text = value_to_string(ctx, exception);

            if !is_error(ctx, exception) {
                // throw "string", throw { code: 7 }, throw function () {}, ...
                let text = text.unwrap_or_else(|| "Unknown exception".into());
                return Self {
                    message: text.clone(),
                    text,
                    ..Default::default()
                };
            }

            let obj = exception as JSObjectRef;
            Self {
                text: text.unwrap_or_default(),
                error_type: string_property(ctx, obj, "name").filter(|name| !name.is_empty()),
                message: string_property(ctx, obj, "message").unwrap_or_default(),
                file: string_property(ctx, obj, "sourceURL")
                    .or_else(|| string_property(ctx, obj, "fileName")),
                line: number_property(ctx, obj, "line")
                    .or_else(|| number_property(ctx, obj, "lineNumber"))
                    .map(|n| n as u32),
                column: number_property(ctx, obj, "column")
                    .or_else(|| number_property(ctx, obj, "columnNumber"))
                    .map(|n| n as u32),
                stack: string_property(ctx, obj, "stack"),
            }
        }
    }
}

/// Convert the `exception` out-parameter of an engine call into a result
///
/// # Safety
/// Same contract as [`JsException::from_raw`].
pub(crate) unsafe fn check(
    ctx: JSContextRef,
    operation: Operation,
    exception: JSValueRef,
) -> JsResult<()> {
    if exception.is_null() {
        return Ok(());
    }

    // SAFETY: forwarded caller contract
    let exception = unsafe { JsException::from_raw(ctx, exception) };
    debug!(
        %operation,
        error_type = exception.error_type.as_deref().unwrap_or("<value>"),
        "engine threw"
    );
    Err(JsError::execution(operation, exception))
}

/// `value instanceof Error` against the context's own `Error` constructor
unsafe fn is_error(ctx: JSContextRef, value: JSValueRef) -> bool {
    let Ok(name) = JsString::new("Error") else {
        return false;
    };
    // SAFETY: ctx and value are valid per caller contract
    unsafe {
        if !JSValueIsObject(ctx, value) {
            return false;
        }

        let global = JSContextGetGlobalObject(ctx);
        let mut exception: JSValueRef = ptr::null_mut();
        let constructor = JSObjectGetProperty(ctx, global, name.raw(), &mut exception);
        if !exception.is_null() || constructor.is_null() || !JSValueIsObject(ctx, constructor) {
            return false;
        }

        let is_error =
            JSValueIsInstanceOfConstructor(ctx, value, constructor as JSObjectRef, &mut exception);
        exception.is_null() && is_error
    }
}

unsafe fn string_property(ctx: JSContextRef, obj: JSObjectRef, name: &str) -> Option<String> {
    let name = JsString::new(name).ok()?;
    // SAFETY: ctx and obj are valid per caller contract
    unsafe {
        let mut exception: JSValueRef = ptr::null_mut();
        let value = JSObjectGetProperty(ctx, obj, name.raw(), &mut exception);

        if exception.is_null() && !value.is_null() && !JSValueIsUndefined(ctx, value) {
            value_to_string(ctx, value)
        } else {
            None
        }
    }
}

unsafe fn number_property(ctx: JSContextRef, obj: JSObjectRef, name: &str) -> Option<f64> {
    let name = JsString::new(name).ok()?;
    // SAFETY: ctx and obj are valid per caller contract
    unsafe {
        let mut exception: JSValueRef = ptr::null_mut();
        let value = JSObjectGetProperty(ctx, obj, name.raw(), &mut exception);

        if !exception.is_null() || value.is_null() || !JSValueIsNumber(ctx, value) {
            return None;
        }

        let number = JSValueToNumber(ctx, value, &mut exception);
        (exception.is_null() && !number.is_nan()).then_some(number)
    }
}

/// `String(value)` without raising; `None` if the conversion itself throws
pub(crate) unsafe fn value_to_string(ctx: JSContextRef, value: JSValueRef) -> Option<String> {
    // SAFETY: ctx and value are valid per caller contract
    unsafe {
        let mut exception: JSValueRef = ptr::null_mut();
        let js_str = JSValueToStringCopy(ctx, value, &mut exception);

        if js_str.is_null() || !exception.is_null() {
            return None;
        }

        let text = js_string_to_rust(js_str);
        JSStringRelease(js_str);
        Some(text)
    }
}

//! Owned JavaScript values with automatic GC protection

use jscbind_sys::*;
use std::marker::PhantomData;
use std::ptr;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{JsError, JsResult, Operation};
use crate::exception::{check, value_to_string};
use crate::object::JsObject;
use crate::string::JsString;

/// Engine-level type of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
    Symbol,
}

/// A JavaScript value bound to its context
///
/// The value is protected from garbage collection while this handle lives
/// and unprotected on drop. Moving the handle moves the protection with it.
///
/// A `JsValue` must not outlive the [`JsContext`](crate::JsContext) it was
/// created in.
///
/// # Thread Safety
///
/// `!Send` and `!Sync`: values are tied to their context's thread.
pub struct JsValue {
    value: JSValueRef,
    ctx: JSContextRef,
    _not_send: PhantomData<*mut ()>,
}

impl JsValue {
    /// Wrap and protect a raw value
    ///
    /// # Safety
    /// `value` must be a valid, non-null value of `ctx`.
    pub unsafe fn new(ctx: JSContextRef, value: JSValueRef) -> Self {
        // SAFETY: ctx and value are valid per caller contract
        unsafe { JSValueProtect(ctx, value) };
        Self {
            value,
            ctx,
            _not_send: PhantomData,
        }
    }

    /// Wrap the result of an engine call that reports failure as null
    pub(crate) unsafe fn from_result(
        ctx: JSContextRef,
        value: JSValueRef,
        operation: &str,
    ) -> JsResult<Self> {
        if value.is_null() {
            return Err(JsError::null_pointer(operation));
        }
        // SAFETY: non-null value returned by the engine for ctx
        Ok(unsafe { Self::new(ctx, value) })
    }

    pub fn undefined(ctx: JSContextRef) -> Self {
        // SAFETY: JSValueMakeUndefined never fails
        unsafe { Self::new(ctx, JSValueMakeUndefined(ctx)) }
    }

    pub fn null(ctx: JSContextRef) -> Self {
        // SAFETY: JSValueMakeNull never fails
        unsafe { Self::new(ctx, JSValueMakeNull(ctx)) }
    }

    pub fn boolean(ctx: JSContextRef, b: bool) -> Self {
        // SAFETY: JSValueMakeBoolean never fails
        unsafe { Self::new(ctx, JSValueMakeBoolean(ctx, b)) }
    }

    pub fn number(ctx: JSContextRef, n: f64) -> Self {
        // SAFETY: JSValueMakeNumber never fails
        unsafe { Self::new(ctx, JSValueMakeNumber(ctx, n)) }
    }

    pub fn string(ctx: JSContextRef, s: &str) -> JsResult<Self> {
        let js_str = JsString::new(s)?;
        // SAFETY: js_str is valid; the engine copies it
        unsafe {
            let value = JSValueMakeString(ctx, js_str.raw());
            Self::from_result(ctx, value, "JSValueMakeString")
        }
    }

    /// Parse JSON text into a value using the engine's parser
    pub fn from_json(ctx: JSContextRef, json: &str) -> JsResult<Self> {
        // a raw NUL is never valid JSON
        let js_str = JsString::new(json).map_err(|_| JsError::InvalidJson)?;
        // SAFETY: js_str is valid for the duration of the call
        let value = unsafe { JSValueMakeFromJSONString(ctx, js_str.raw()) };
        if value.is_null() {
            return Err(JsError::InvalidJson);
        }
        // SAFETY: non-null value from the engine
        Ok(unsafe { Self::new(ctx, value) })
    }

    /// Serialize a Rust value and parse it into the context
    pub fn from_serializable<T: Serialize + ?Sized>(ctx: JSContextRef, value: &T) -> JsResult<Self> {
        let json = serde_json::to_string(value)?;
        Self::from_json(ctx, &json)
    }

    pub fn raw(&self) -> JSValueRef {
        self.value
    }

    pub fn context(&self) -> JSContextRef {
        self.ctx
    }

    pub fn value_type(&self) -> JsType {
        // SAFETY: self.ctx and self.value are valid
        match unsafe { JSValueGetType(self.ctx, self.value) } {
            K_JS_TYPE_UNDEFINED => JsType::Undefined,
            K_JS_TYPE_NULL => JsType::Null,
            K_JS_TYPE_BOOLEAN => JsType::Boolean,
            K_JS_TYPE_NUMBER => JsType::Number,
            K_JS_TYPE_STRING => JsType::String,
            K_JS_TYPE_SYMBOL => JsType::Symbol,
            _ => JsType::Object,
        }
    }

    pub fn is_undefined(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsUndefined(self.ctx, self.value) }
    }

    pub fn is_null(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsNull(self.ctx, self.value) }
    }

    pub fn is_boolean(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsBoolean(self.ctx, self.value) }
    }

    pub fn is_number(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsNumber(self.ctx, self.value) }
    }

    pub fn is_string(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsString(self.ctx, self.value) }
    }

    pub fn is_object(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsObject(self.ctx, self.value) }
    }

    pub fn is_array(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueIsArray(self.ctx, self.value) }
    }

    /// JavaScript truthiness
    pub fn to_bool(&self) -> bool {
        // SAFETY: self.ctx and self.value are valid
        unsafe { JSValueToBoolean(self.ctx, self.value) }
    }

    pub fn to_number(&self) -> JsResult<f64> {
        // SAFETY: self.ctx and self.value are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let n = JSValueToNumber(self.ctx, self.value, &mut exception);
            check(self.ctx, Operation::ToNumber, exception)?;
            Ok(n)
        }
    }

    /// `String(value)`, running `toString` if the value is an object
    pub fn to_string(&self) -> JsResult<String> {
        // SAFETY: self.ctx and self.value are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let js_str = JSValueToStringCopy(self.ctx, self.value, &mut exception);
            check(self.ctx, Operation::ToString, exception)?;
            Ok(JsString::adopt(js_str)?.to_string())
        }
    }

    /// Serialize with `JSON.stringify` semantics, indenting by `indent` spaces
    ///
    /// Values with no JSON form (`undefined`, functions, symbols) yield
    /// [`JsError::NotSerializable`]; a throw during serialization (cycles,
    /// a throwing `toJSON`) yields an [`Operation::JsonStringify`] error.
    pub fn to_json_string(&self, indent: u32) -> JsResult<String> {
        // SAFETY: self.ctx and self.value are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let js_str = JSValueCreateJSONString(self.ctx, self.value, indent, &mut exception);
            check(self.ctx, Operation::JsonStringify, exception)?;
            let js_str = JsString::adopt(js_str).map_err(|_| JsError::NotSerializable)?;
            Ok(js_str.to_string())
        }
    }

    /// Compact JSON
    pub fn to_json(&self) -> JsResult<String> {
        self.to_json_string(0)
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> JsResult<T> {
        Ok(serde_json::from_str(&self.to_json()?)?)
    }

    /// Coerce to an object (`ToObject`), consuming the value
    ///
    /// Primitives are boxed (`5` becomes a `Number` object); `null` and
    /// `undefined` make the engine throw a `TypeError`.
    pub fn into_object(self) -> JsResult<JsObject> {
        // SAFETY: self.ctx and self.value are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let object = JSValueToObject(self.ctx, self.value, &mut exception);
            check(self.ctx, Operation::ToObject, exception)?;
            if object.is_null() {
                return Err(JsError::null_pointer("JSValueToObject"));
            }
            Ok(JsObject::new(self.ctx, object))
        }
    }
}

impl Clone for JsValue {
    fn clone(&self) -> Self {
        // SAFETY: the value is alive; protection is reference counted
        unsafe { Self::new(self.ctx, self.value) }
    }
}

impl Drop for JsValue {
    fn drop(&mut self) {
        // SAFETY: value was protected in new()
        unsafe { JSValueUnprotect(self.ctx, self.value) };
    }
}

impl std::fmt::Debug for JsValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // SAFETY: self.ctx and self.value are valid
        match unsafe { value_to_string(self.ctx, self.value) } {
            Some(s) => write!(f, "JsValue({})", s),
            None => write!(f, "JsValue(<opaque>)"),
        }
    }
}

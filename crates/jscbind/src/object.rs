//! Owned JavaScript objects: property access and calls

use jscbind_sys::*;
use std::marker::PhantomData;
use std::ptr;

use crate::error::{JsError, JsResult, Operation};
use crate::exception::check;
use crate::string::JsString;
use crate::value::JsValue;

/// A JavaScript object with automatic GC protection
///
/// # Thread Safety
///
/// `!Send` and `!Sync`: objects are tied to their context's thread.
pub struct JsObject {
    object: JSObjectRef,
    ctx: JSContextRef,
    _not_send: PhantomData<*mut ()>,
}

impl JsObject {
    /// Wrap and protect a raw object
    ///
    /// # Safety
    /// `object` must be a valid, non-null object of `ctx`.
    pub unsafe fn new(ctx: JSContextRef, object: JSObjectRef) -> Self {
        // SAFETY: ctx and object are valid per caller contract
        unsafe { JSValueProtect(ctx, object as JSValueRef) };
        Self {
            object,
            ctx,
            _not_send: PhantomData,
        }
    }

    /// A fresh `{}`
    pub fn empty(ctx: JSContextRef) -> Self {
        // SAFETY: a null class creates a plain object
        unsafe {
            let object = JSObjectMake(ctx, ptr::null_mut(), ptr::null_mut());
            Self::new(ctx, object)
        }
    }

    pub fn raw(&self) -> JSObjectRef {
        self.object
    }

    pub fn context(&self) -> JSContextRef {
        self.ctx
    }

    pub fn to_value(&self) -> JsValue {
        // SAFETY: objects are values
        unsafe { JsValue::new(self.ctx, self.object as JSValueRef) }
    }

    pub fn is_function(&self) -> bool {
        // SAFETY: self.ctx and self.object are valid
        unsafe { JSObjectIsFunction(self.ctx, self.object) }
    }

    pub fn is_array(&self) -> bool {
        // SAFETY: self.ctx and self.object are valid
        unsafe { JSValueIsArray(self.ctx, self.object as JSValueRef) }
    }

    /// Read a property, running getters and walking the prototype chain
    ///
    /// A missing property is `undefined`, not an error.
    pub fn get_property(&self, name: &str) -> JsResult<JsValue> {
        self.get_property_named(&JsString::new(name)?)
    }

    pub fn get_property_named(&self, name: &JsString) -> JsResult<JsValue> {
        // SAFETY: name is a live string, ctx and object are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let value = JSObjectGetProperty(self.ctx, self.object, name.raw(), &mut exception);
            check(self.ctx, Operation::GetProperty, exception)?;
            JsValue::from_result(self.ctx, value, "JSObjectGetProperty")
        }
    }

    pub fn set_property(&self, name: &str, value: &JsValue) -> JsResult<()> {
        let name = JsString::new(name)?;
        // SAFETY: name is a live string, ctx and object are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            JSObjectSetProperty(
                self.ctx,
                self.object,
                name.raw(),
                value.raw(),
                K_JS_PROPERTY_ATTRIBUTE_NONE,
                &mut exception,
            );
            check(self.ctx, Operation::SetProperty, exception)
        }
    }

    /// `name in object`
    pub fn has_property(&self, name: &str) -> JsResult<bool> {
        let name = JsString::new(name)?;
        // SAFETY: name is a live string, ctx and object are valid
        Ok(unsafe { JSObjectHasProperty(self.ctx, self.object, name.raw()) })
    }

    pub fn delete_property(&self, name: &str) -> JsResult<bool> {
        let name = JsString::new(name)?;
        // SAFETY: name is a live string, ctx and object are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let deleted = JSObjectDeleteProperty(self.ctx, self.object, name.raw(), &mut exception);
            check(self.ctx, Operation::DeleteProperty, exception)?;
            Ok(deleted)
        }
    }

    pub fn get_index(&self, index: u32) -> JsResult<JsValue> {
        // SAFETY: ctx and object are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let value = JSObjectGetPropertyAtIndex(self.ctx, self.object, index, &mut exception);
            check(self.ctx, Operation::GetProperty, exception)?;
            JsValue::from_result(self.ctx, value, "JSObjectGetPropertyAtIndex")
        }
    }

    pub fn set_index(&self, index: u32, value: &JsValue) -> JsResult<()> {
        // SAFETY: ctx and object are valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            JSObjectSetPropertyAtIndex(self.ctx, self.object, index, value.raw(), &mut exception);
            check(self.ctx, Operation::SetProperty, exception)
        }
    }

    /// `length` coerced to an integer
    pub fn length(&self) -> JsResult<u32> {
        Ok(self.get_property("length")?.to_number()? as u32)
    }

    /// Call with no explicit receiver; the engine binds `this` to the
    /// global object
    pub fn call_as_function(&self, args: &[&JsValue]) -> JsResult<JsValue> {
        self.call_with_this(None, args)
    }

    pub fn call_with_this(&self, this: Option<&JsObject>, args: &[&JsValue]) -> JsResult<JsValue> {
        // the engine returns null without an exception for non-callables
        if !self.is_function() {
            return Err(JsError::type_error("function", "object"));
        }

        let this_obj = this.map_or(ptr::null_mut(), |o| o.object);
        let raw_args: Vec<JSValueRef> = args.iter().map(|v| v.raw()).collect();

        // SAFETY: ctx and object are valid; args outlive the call
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let result = JSObjectCallAsFunction(
                self.ctx,
                self.object,
                this_obj,
                raw_args.len(),
                if raw_args.is_empty() {
                    ptr::null()
                } else {
                    raw_args.as_ptr()
                },
                &mut exception,
            );
            check(self.ctx, Operation::Call, exception)?;
            JsValue::from_result(self.ctx, result, "JSObjectCallAsFunction")
        }
    }
}

impl Drop for JsObject {
    fn drop(&mut self) {
        // SAFETY: object was protected in new()
        unsafe { JSValueUnprotect(self.ctx, self.object as JSValueRef) };
    }
}

impl std::fmt::Debug for JsObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsObject({:?})", self.object)
    }
}

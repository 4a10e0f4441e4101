//! Owned JSC global context

use jscbind_sys::*;
use std::marker::PhantomData;
use std::ptr;

use tracing::trace;

use crate::error::{JsError, JsResult, Operation};
use crate::exception::check;
use crate::object::JsObject;
use crate::string::JsString;
use crate::value::JsValue;

/// A JavaScript execution context
///
/// Owns a `JSGlobalContextRef` and releases it on drop. Values and objects
/// created from it hold the raw context pointer, so they must be dropped
/// before the context.
///
/// # Thread Safety
///
/// `!Send` and `!Sync`: JSC contexts are not thread-safe.
pub struct JsContext {
    ctx: JSGlobalContextRef,
    _not_send: PhantomData<*mut ()>,
}

impl JsContext {
    pub fn new() -> JsResult<Self> {
        // SAFETY: a null class creates a default global object
        let ctx = unsafe { JSGlobalContextCreate(ptr::null_mut()) };
        if ctx.is_null() {
            return Err(JsError::ContextCreation {
                message: "JSGlobalContextCreate returned null".into(),
            });
        }
        trace!(?ctx, "created context");

        Ok(Self {
            ctx,
            _not_send: PhantomData,
        })
    }

    pub fn raw(&self) -> JSContextRef {
        self.ctx as JSContextRef
    }

    pub fn global_object(&self) -> JsObject {
        // SAFETY: self.ctx is valid and always has a global object
        unsafe { JsObject::new(self.raw(), JSContextGetGlobalObject(self.raw())) }
    }

    pub fn eval(&self, script: &str) -> JsResult<JsValue> {
        self.eval_with_source(script, "<eval>")
    }

    /// Evaluate with a source URL that shows up in exception locations
    pub fn eval_with_source(&self, script: &str, source_url: &str) -> JsResult<JsValue> {
        let script = JsString::new(script)?;
        let source = JsString::new(source_url)?;

        // SAFETY: strings are live for the call, ctx is valid
        unsafe {
            let mut exception: JSValueRef = ptr::null_mut();
            let result = JSEvaluateScript(
                self.raw(),
                script.raw(),
                ptr::null_mut(),
                source.raw(),
                1,
                &mut exception,
            );
            check(self.raw(), Operation::Evaluate, exception)?;
            JsValue::from_result(self.raw(), result, "JSEvaluateScript")
        }
    }

    pub fn get_global(&self, name: &str) -> JsResult<JsValue> {
        self.global_object().get_property(name)
    }

    pub fn set_global(&self, name: &str, value: &JsValue) -> JsResult<()> {
        self.global_object().set_property(name, value)
    }

    pub fn from_json(&self, json: &str) -> JsResult<JsValue> {
        JsValue::from_json(self.raw(), json)
    }

    pub fn string(&self, s: &str) -> JsResult<JsValue> {
        JsValue::string(self.raw(), s)
    }

    pub fn number(&self, n: f64) -> JsValue {
        JsValue::number(self.raw(), n)
    }

    pub fn boolean(&self, b: bool) -> JsValue {
        JsValue::boolean(self.raw(), b)
    }

    pub fn undefined(&self) -> JsValue {
        JsValue::undefined(self.raw())
    }

    pub fn null(&self) -> JsValue {
        JsValue::null(self.raw())
    }

    /// Force a garbage collection
    pub fn gc(&self) {
        trace!("forcing garbage collection");
        // SAFETY: ctx is valid
        unsafe { JSGarbageCollect(self.raw()) };
    }
}

impl Drop for JsContext {
    fn drop(&mut self) {
        trace!(ctx = ?self.ctx, "releasing context");
        // SAFETY: ctx was created by JSGlobalContextCreate
        unsafe { JSGlobalContextRelease(self.ctx) };
    }
}

impl std::fmt::Debug for JsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JsContext({:?})", self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = JsContext::new().unwrap();
        drop(ctx);
    }

    #[test]
    fn test_eval() {
        let ctx = JsContext::new().unwrap();
        assert_eq!(ctx.eval("1 + 1").unwrap().to_number().unwrap(), 2.0);
        assert_eq!(ctx.eval("'hi'").unwrap().to_string().unwrap(), "hi");
    }

    #[test]
    fn test_eval_error() {
        let ctx = JsContext::new().unwrap();
        let err = ctx
            .eval_with_source("\n\nnotDefined()", "app.js")
            .unwrap_err();

        assert_eq!(err.operation(), Some(Operation::Evaluate));
        assert_eq!(err.error_type(), "ReferenceError");
        let (file, line, _) = err.location().unwrap();
        assert_eq!(file, Some("app.js"));
        assert_eq!(line, Some(3));
    }

    #[test]
    fn test_eval_syntax_error() {
        let ctx = JsContext::new().unwrap();
        let err = ctx.eval("let = ;").unwrap_err();
        assert_eq!(err.error_type(), "SyntaxError");
    }

    #[test]
    fn test_globals() {
        let ctx = JsContext::new().unwrap();
        ctx.set_global("myVar", &ctx.number(21.0)).unwrap();
        assert_eq!(ctx.eval("myVar * 2").unwrap().to_number().unwrap(), 42.0);

        ctx.eval("var fromScript = 'yes'").unwrap();
        assert_eq!(ctx.get_global("fromScript").unwrap().to_string().unwrap(), "yes");
    }

    #[test]
    fn test_inject_json() {
        let ctx = JsContext::new().unwrap();
        let config = ctx.from_json(r#"{"name": "test", "value": 123}"#).unwrap();
        ctx.set_global("config", &config).unwrap();

        assert_eq!(ctx.eval("config.name").unwrap().to_string().unwrap(), "test");
        assert_eq!(ctx.eval("config.value").unwrap().to_number().unwrap(), 123.0);
    }

    #[test]
    fn test_independent_contexts() {
        let a = JsContext::new().unwrap();
        let b = JsContext::new().unwrap();
        a.eval("var shared = 1").unwrap();
        assert!(b.get_global("shared").unwrap().is_undefined());
    }
}

//! RAII wrapper for JSC strings

use jscbind_sys::*;
use std::ffi::{CString, c_char};
use std::fmt;
use std::marker::PhantomData;

use crate::error::{JsError, JsResult};

/// Owned `JSStringRef`, released on drop
///
/// # Thread Safety
///
/// `!Send` and `!Sync`: JSC strings must stay on the thread that made them.
pub struct JsString {
    raw: JSStringRef,
    _not_send: PhantomData<*mut ()>,
}

impl JsString {
    /// Create an engine string from UTF-8 text
    pub fn new(s: &str) -> JsResult<Self> {
        let c_str = CString::new(s).map_err(|e| JsError::StringEncoding(e.to_string()))?;
        // SAFETY: c_str is a valid null-terminated UTF-8 buffer
        let raw = unsafe { JSStringCreateWithUTF8CString(c_str.as_ptr()) };
        if raw.is_null() {
            return Err(JsError::null_pointer("JSStringCreateWithUTF8CString"));
        }
        Ok(Self {
            raw,
            _not_send: PhantomData,
        })
    }

    /// Take ownership of a string returned by a `Create`/`Copy` engine call
    ///
    /// The reference is not retained again; it is released when the
    /// `JsString` drops.
    ///
    /// # Safety
    /// `raw` must be an unowned-elsewhere JSStringRef or null.
    pub unsafe fn adopt(raw: JSStringRef) -> JsResult<Self> {
        if raw.is_null() {
            return Err(JsError::null_pointer("JSStringRef"));
        }
        Ok(Self {
            raw,
            _not_send: PhantomData,
        })
    }

    pub fn raw(&self) -> JSStringRef {
        self.raw
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        // SAFETY: self.raw is non-null and owned
        unsafe { JSStringGetLength(self.raw) }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for JsString {
    fn drop(&mut self) {
        // SAFETY: self.raw is owned and released exactly once
        unsafe { JSStringRelease(self.raw) };
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        // SAFETY: both strings are valid
        unsafe { JSStringIsEqual(self.raw, other.raw) }
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SAFETY: self.raw is valid
        f.write_str(&unsafe { js_string_to_rust(self.raw) })
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsString({:?})", self.to_string())
    }
}

/// Copy a JSStringRef into a Rust `String` without taking ownership
///
/// # Safety
/// `js_str` must be a valid JSStringRef or null.
pub unsafe fn js_string_to_rust(js_str: JSStringRef) -> String {
    if js_str.is_null() {
        return String::new();
    }

    // SAFETY: js_str is valid per caller contract
    unsafe {
        let max_size = JSStringGetMaximumUTF8CStringSize(js_str);
        let mut buffer = vec![0u8; max_size];
        let written = JSStringGetUTF8CString(js_str, buffer.as_mut_ptr() as *mut c_char, max_size);

        // written includes the terminating NUL
        buffer.truncate(written.saturating_sub(1));
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        let s = JsString::new("hello").unwrap();
        assert_eq!(s.to_string(), "hello");
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_utf16_length() {
        let s = JsString::new("héllo 😀").unwrap();
        assert_eq!(s.to_string(), "héllo 😀");
        // the emoji is a surrogate pair
        assert_eq!(s.len(), 8);
    }

    #[test]
    fn test_empty_string() {
        let s = JsString::new("").unwrap();
        assert!(s.is_empty());
        assert_eq!(s.to_string(), "");
    }

    #[test]
    fn test_interior_nul_rejected() {
        let err = JsString::new("a\0b").unwrap_err();
        assert!(matches!(err, JsError::StringEncoding(_)));
    }

    #[test]
    fn test_equality() {
        assert_eq!(JsString::new("key").unwrap(), JsString::new("key").unwrap());
        assert_ne!(JsString::new("key").unwrap(), JsString::new("other").unwrap());
    }

    #[test]
    fn test_adopt_null() {
        let err = unsafe { JsString::adopt(std::ptr::null_mut()) }.unwrap_err();
        assert!(matches!(err, JsError::NullPointer { .. }));
    }
}

//! Error types for engine calls
//!
//! Every fallible wrapper returns [`JsResult`]. When the engine throws, the
//! thrown value is captured as a [`JsException`] and paired with the
//! [`Operation`] that was running, so the message reads like
//! `Failed to get property: TypeError: boom`.

use std::fmt;

use thiserror::Error;

use crate::exception::JsException;

/// Result type alias for engine operations
pub type JsResult<T> = Result<T, JsError>;

/// The wrapper operation during which the engine threw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    JsonStringify,
    ToObject,
    Call,
    GetProperty,
    SetProperty,
    DeleteProperty,
    ToNumber,
    ToString,
    Evaluate,
}

impl Operation {
    fn describe(self) -> &'static str {
        match self {
            Self::JsonStringify => "Exception creating JSON string",
            Self::ToObject => "Failed to convert to object",
            Self::Call => "Exception calling JS function",
            Self::GetProperty => "Failed to get property",
            Self::SetProperty => "Failed to set property",
            Self::DeleteProperty => "Failed to delete property",
            Self::ToNumber => "Failed to convert to number",
            Self::ToString => "Failed to convert to string",
            Self::Evaluate => "Exception evaluating script",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Errors raised by the wrappers
#[derive(Debug, Error)]
pub enum JsError {
    /// `JSGlobalContextCreate` failed
    #[error("Context creation failed: {message}")]
    ContextCreation { message: String },

    /// The engine threw while running `operation`
    #[error("{operation}: {exception}")]
    Execution {
        operation: Operation,
        exception: JsException,
    },

    /// The engine rejected the JSON text
    #[error("Failed to create String from JSON")]
    InvalidJson,

    /// `undefined`, functions and symbols have no JSON form
    #[error("Value cannot be serialized to JSON")]
    NotSerializable,

    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    /// Host string could not be handed to the engine
    #[error("String encoding error: {0}")]
    StringEncoding(String),

    /// An engine call returned null without reporting an exception
    #[error("Internal JSC error: {operation} returned null")]
    NullPointer { operation: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JsError {
    pub fn execution(operation: Operation, exception: JsException) -> Self {
        Self::Execution {
            operation,
            exception,
        }
    }

    pub fn type_error(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeError {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn null_pointer(operation: impl Into<String>) -> Self {
        Self::NullPointer {
            operation: operation.into(),
        }
    }

    /// True when the error came from a JavaScript `throw`
    pub fn is_script_error(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// The thrown exception, if any
    pub fn exception(&self) -> Option<&JsException> {
        match self {
            Self::Execution { exception, .. } => Some(exception),
            _ => None,
        }
    }

    /// The operation that was running when the engine threw
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Execution { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    pub fn stack_trace(&self) -> Option<&str> {
        self.exception().and_then(|e| e.stack.as_deref())
    }

    pub fn location(&self) -> Option<(Option<&str>, Option<u32>, Option<u32>)> {
        self.exception()
            .filter(|e| e.file.is_some() || e.line.is_some())
            .map(|e| (e.file.as_deref(), e.line, e.column))
    }

    /// Error class name, e.g. "TypeError" for thrown errors
    pub fn error_type(&self) -> &str {
        match self {
            Self::Execution { exception, .. } => exception.error_type.as_deref().unwrap_or("Error"),
            Self::ContextCreation { .. } => "ContextError",
            Self::InvalidJson | Self::NotSerializable | Self::Json(_) => "JsonError",
            Self::TypeError { .. } => "TypeError",
            Self::StringEncoding(_) => "EncodingError",
            Self::NullPointer { .. } => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thrown(error_type: Option<&str>, message: &str) -> JsException {
        JsException {
            error_type: error_type.map(String::from),
            message: message.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_execution_messages() {
        let err = JsError::execution(
            Operation::JsonStringify,
            thrown(Some("TypeError"), "JSON.stringify cannot serialize cyclic structures."),
        );
        assert_eq!(
            err.to_string(),
            "Exception creating JSON string: TypeError: JSON.stringify cannot serialize cyclic structures."
        );

        let err = JsError::execution(Operation::Call, thrown(None, "boom"));
        assert_eq!(err.to_string(), "Exception calling JS function: boom");
        assert_eq!(err.error_type(), "Error");
        assert!(err.is_script_error());
    }

    #[test]
    fn test_operation_prefixes() {
        assert_eq!(Operation::ToObject.to_string(), "Failed to convert to object");
        assert_eq!(Operation::GetProperty.to_string(), "Failed to get property");
    }

    #[test]
    fn test_location() {
        let exception = JsException {
            error_type: Some("ReferenceError".into()),
            message: "x is not defined".into(),
            file: Some("script.js".into()),
            line: Some(10),
            column: Some(5),
            stack: Some("global code@script.js:10:5".into()),
            ..Default::default()
        };
        let err = JsError::execution(Operation::Evaluate, exception);

        assert_eq!(err.error_type(), "ReferenceError");
        assert_eq!(err.stack_trace(), Some("global code@script.js:10:5"));
        assert_eq!(err.location(), Some((Some("script.js"), Some(10), Some(5))));
        assert_eq!(err.operation(), Some(Operation::Evaluate));
    }

    #[test]
    fn test_non_script_errors() {
        assert_eq!(
            JsError::InvalidJson.to_string(),
            "Failed to create value from JSON"
        );
        let err = JsError::type_error("function", "object");
        assert_eq!(err.to_string(), "Type error: expected function, got object");
        assert!(!err.is_script_error());
        assert!(err.location().is_none());
        assert!(err.stack_trace().is_none());
        assert!(
            JsError::null_pointer("JSValueToObject")
                .to_string()
                .contains("JSValueToObject returned null")
        );
    }
}

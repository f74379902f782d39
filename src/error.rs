//! # Error Types
//!
//! Unified error type for all JNI convenience operations.
//!
//! Lookup failures that the underlying `jni` crate reports generically are
//! remapped onto dedicated variants (`ClassNotFound`, `MethodNotFound`,
//! `FieldNotFound`) so callers can match on them for graceful degradation.
//! Nothing in this crate terminates the process on a failed Java call.

use thiserror::Error;

/// Result type for JNI convenience operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering VM bootstrap, class lookup and call dispatch.
#[derive(Debug, Error)]
pub enum Error {
    /// No process-wide `JavaVM` has been installed yet.
    #[error("JavaVM not set; call vm::set_java_vm() from JNI_OnLoad before using other threads")]
    VmNotSet,

    /// A class could not be resolved, neither from the preload table nor
    /// from the current thread's classloader.
    #[error("class not found: {0}")]
    ClassNotFound(String),

    /// A method name/signature pair could not be resolved on the wrapped
    /// class.
    #[error("method not found: {name}{sig}")]
    MethodNotFound { name: String, sig: String },

    /// A field name could not be resolved on the wrapped class.
    #[error("field not found: {name} ({sig})")]
    FieldNotFound { name: String, sig: String },

    /// An instance operation was attempted on a class-only wrapper.
    #[error("wrapper holds a class but no object instance")]
    NoInstance,

    /// The Java side threw during a call. The pending exception has already
    /// been described and cleared by the time this is returned.
    #[error("java exception thrown by {0}")]
    JavaException(String),

    /// Any other error from the underlying `jni` crate.
    #[error(transparent)]
    Jni(jni::errors::Error),
}

impl From<jni::errors::Error> for Error {
    fn from(err: jni::errors::Error) -> Self {
        use jni::errors::Error as JniError;
        match err {
            JniError::MethodNotFound { name, sig } => Error::MethodNotFound { name, sig },
            JniError::FieldNotFound { name, sig } => Error::FieldNotFound { name, sig },
            other => Error::Jni(other),
        }
    }
}

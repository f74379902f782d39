//! # Environment Access
//!
//! Per-thread environment acquisition plus the conversion and
//! exception-clearing helpers every other module builds on.
//!
//! Threads spawned by the host runtime arrive with an environment already
//! attached; threads spawned from native code are attached on first use and
//! stay attached for their lifetime. A natively-spawned thread cannot
//! resolve application classes through `FindClass`, so those must be
//! preloaded from a runtime-created thread first (see [`crate::registry`]).

use jni::objects::{JClass, JString};
use jni::JNIEnv;

use crate::error::Result;
use crate::registry;

/// Returns the environment valid for the calling thread, attaching the
/// thread to the process-wide VM on first use.
///
/// The attachment is permanent: it is released when the thread exits, not
/// when the returned env goes out of scope.
pub fn attach_current_thread() -> Result<JNIEnv<'static>> {
    let vm = crate::vm::java_vm()?;
    Ok(vm.attach_current_thread_permanently()?)
}

/// Runs a closure against the environment of the current thread.
///
/// This is the acquisition form used internally by every [`crate::object::JavaObject`]
/// call; code that already holds a `JNIEnv` (e.g. inside a `native` method)
/// should pass it to the helpers directly instead of re-attaching.
pub fn with_env<T, F>(f: F) -> Result<T>
where
    F: FnOnce(&mut JNIEnv<'static>) -> Result<T>,
{
    let mut env = attach_current_thread()?;
    f(&mut env)
}

/// Converts a Rust string into a Java string.
///
/// The returned value is a new local reference; release it with
/// `delete_local_ref` (or let the enclosing native-call frame release it)
/// once done. On permanently attached native threads there is no enclosing
/// frame, so explicit release is required to avoid accumulating references.
pub fn new_jstring<'local>(env: &mut JNIEnv<'local>, s: &str) -> Result<JString<'local>> {
    Ok(env.new_string(s)?)
}

/// Copies a Java string into a Rust `String` without retaining the source
/// reference. Round-trips non-ASCII content (the modified-UTF-8 details are
/// handled by the `jni` crate).
pub fn rust_string(env: &mut JNIEnv, s: &JString) -> Result<String> {
    Ok(env.get_string(s)?.into())
}

/// Clears a pending Java exception, if any.
///
/// Returns `true` exactly when an exception was pending at call time; the
/// environment is guaranteed usable afterwards either way. With `describe`
/// set, the exception and its stack trace are printed to the log stream
/// before being cleared.
pub fn clear_exception(env: &mut JNIEnv, describe: bool) -> bool {
    match env.exception_check() {
        Ok(true) => {
            if describe {
                let _ = env.exception_describe();
            }
            let _ = env.exception_clear();
            true
        }
        Ok(false) => false,
        Err(e) => {
            log::warn!("exception_check failed: {e}");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Preload table conveniences, backed by the process-wide registry.
// ---------------------------------------------------------------------------

/// Preloads a class into the process-wide table. See [`registry::ClassRegistry::preload`].
pub fn preload_class(env: &mut JNIEnv, name: &str) -> Result<()> {
    registry::global().preload(env, name)
}

/// Preloads several classes; returns how many were resolved.
pub fn preload_classes(env: &mut JNIEnv, names: &[&str]) -> usize {
    registry::global().preload_all(env, names)
}

/// Whether a class has been preloaded. Pure lookup, no side effects.
pub fn is_class_preloaded(name: &str) -> bool {
    registry::global().contains(name)
}

/// Resolves a class, consulting the preload table first.
pub fn find_class<'local>(env: &mut JNIEnv<'local>, name: &str) -> Result<JClass<'local>> {
    registry::global().find_class(env, name)
}

/// Releases every entry of the process-wide preload table.
pub fn unload_classes() {
    registry::global().clear();
}

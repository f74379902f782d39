//! # VM Bootstrap
//!
//! Process-wide `JavaVM` slot. Exactly one VM per process is supported; the
//! slot is written once (normally from `JNI_OnLoad`) and read by every
//! environment acquisition afterwards.
//!
//! The single-writer contract is enforced rather than documented: a second
//! [`set_java_vm`] call is rejected with a logged warning instead of
//! silently overwriting the handle.

use jni::sys::{jint, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

static JAVA_VM: OnceCell<JavaVM> = OnceCell::new();

/// Install the process-wide VM handle.
///
/// Returns `false` (and leaves the existing handle untouched) if a VM has
/// already been installed.
pub fn set_java_vm(vm: JavaVM) -> bool {
    match JAVA_VM.set(vm) {
        Ok(()) => {
            log::info!("JavaVM installed for this process");
            true
        }
        Err(_) => {
            log::warn!("set_java_vm called twice; keeping the existing JavaVM");
            false
        }
    }
}

/// Install the process-wide VM handle from an already-valid environment.
///
/// Convenient inside a `native` method implementation, where only a
/// `JNIEnv` is at hand.
pub fn set_java_vm_from_env(env: &JNIEnv) -> bool {
    match env.get_java_vm() {
        Ok(vm) => set_java_vm(vm),
        Err(e) => {
            log::error!("failed to obtain JavaVM from JNIEnv: {e}");
            false
        }
    }
}

/// The process-wide VM handle, or [`Error::VmNotSet`] before installation.
pub fn java_vm() -> Result<&'static JavaVM> {
    JAVA_VM.get().ok_or(Error::VmNotSet)
}

/// Whether a VM has been installed.
pub fn is_vm_set() -> bool {
    JAVA_VM.get().is_some()
}

/// `JNI_OnLoad` body helper: installs the VM, initializes logging and
/// returns the JNI version this crate targets.
///
/// ```rust,ignore
/// #[no_mangle]
/// pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
///     jnikit::vm::on_load(vm)
/// }
/// ```
pub fn on_load(vm: JavaVM) -> jint {
    crate::init_logging();
    set_java_vm(vm);
    JNI_VERSION_1_6
}

/// `JNI_OnUnload` body helper: releases every preloaded class reference.
///
/// Callers must ensure no thread keeps using the library afterwards.
pub fn on_unload() {
    crate::registry::global().clear();
    log::info!("preloaded class table released");
}

#[cfg(test)]
mod tests {
    use super::*;

    // The unit-test binary never installs a VM; the JVM-backed paths are
    // exercised in tests/jvm.rs behind the `invocation` feature.
    #[test]
    fn vm_is_absent_until_installed() {
        assert!(!is_vm_set());
        assert!(matches!(java_vm(), Err(Error::VmNotSet)));
    }
}

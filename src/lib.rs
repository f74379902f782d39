//! # jnikit - JNI Convenience Layer
//!
//! Thin, thread-friendly helpers for Rust code embedded in a JVM process
//! (typically an Android app loading a `cdylib`).
//!
//! ## Modules
//!
//! - **vm**: process-wide `JavaVM` slot, installed once from `JNI_OnLoad`
//! - **env**: per-thread `JNIEnv` attachment and string/exception helpers
//! - **registry**: preloaded-class table usable from natively-spawned threads
//! - **object**: [`JavaObject`] global-reference handle with typed call wrappers
//! - **sig**: method descriptor builders for runtime-arity calls
//! - **error**: the crate-wide [`Error`] taxonomy
//!
//! ## Entry point
//!
//! ```rust,ignore
//! use jni::{sys::jint, JavaVM};
//! use std::os::raw::c_void;
//!
//! #[no_mangle]
//! pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
//!     let version = jnikit::vm::on_load(vm);
//!     jnikit::with_env(|env| {
//!         jnikit::preload_class(env, "com/example/app/NativeBridge")
//!     })
//!     .ok();
//!     version
//! }
//! ```

pub mod env;
pub mod error;
pub mod object;
pub mod registry;
pub mod sig;
pub mod vm;

// Re-exports
pub use env::{
    attach_current_thread, clear_exception, find_class, is_class_preloaded, new_jstring,
    preload_class, preload_classes, rust_string, unload_classes, with_env,
};
pub use error::{Error, Result};
pub use object::{Arg, JavaObject};
pub use registry::ClassRegistry;
pub use sig::{method_sig, JavaType};
pub use vm::{is_vm_set, java_vm, on_load, on_unload, set_java_vm, set_java_vm_from_env};

use std::sync::Once;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logger initialization guard
static LOG_INIT: Once = Once::new();

/// Installs the platform logger. Called from [`vm::on_load`]; safe to call
/// again, later calls are no-ops.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Debug)
                    .with_tag("jnikit"),
            );
        }
        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::builder().is_test(false).try_init();
        }
        log::debug!("jnikit {VERSION} logging ready");
    });
}

//! # Class Registry
//!
//! Preloaded-class table mapping fully-qualified names (slash-separated,
//! e.g. `"com/example/app/NativeBridge"`) to global class references.
//!
//! On Android, `FindClass` resolves application classes only on threads
//! created by the runtime; a thread spawned with `std::thread` gets the
//! system classloader and sees nothing from the APK. Preloading from a
//! runtime-created thread (typically `JNI_OnLoad`) pins a global reference
//! that any thread can use afterwards.
//!
//! A single mutex guards the table for all readers and writers; the lock is
//! never held across a JNI call.

use std::collections::HashMap;

use jni::objects::{GlobalRef, JClass};
use jni::JNIEnv;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{Error, Result};

/// Mutex-guarded class table with an explicit lifecycle.
///
/// Entries persist until [`clear`](Self::clear); dropping a `GlobalRef`
/// releases the underlying JNI global reference, so clearing the table is
/// all the teardown there is.
pub struct ClassRegistry {
    classes: Mutex<HashMap<String, GlobalRef>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self {
            classes: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves `name` with the current thread's classloader and stores a
    /// global reference under that name.
    ///
    /// Idempotent for names already in the table. A failed lookup clears
    /// the pending `ClassNotFoundException` and reports
    /// [`Error::ClassNotFound`]; it is not fatal.
    pub fn preload(&self, env: &mut JNIEnv, name: &str) -> Result<()> {
        if self.contains(name) {
            return Ok(());
        }
        match env.find_class(name) {
            Ok(class) => {
                let global = env.new_global_ref(&class)?;
                env.delete_local_ref(class)?;
                self.classes.lock().insert(name.to_owned(), global);
                log::debug!("preloaded class {name}");
                Ok(())
            }
            Err(_) => {
                crate::env::clear_exception(env, false);
                log::warn!("failed to preload class {name}");
                Err(Error::ClassNotFound(name.to_owned()))
            }
        }
    }

    /// Preloads every name in `names`; returns the number that resolved.
    /// Partial failure is tolerated, per-entry errors are only logged.
    pub fn preload_all(&self, env: &mut JNIEnv, names: &[&str]) -> usize {
        names
            .iter()
            .filter(|name| self.preload(env, name).is_ok())
            .count()
    }

    /// Whether `name` is in the table. Pure lookup.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.lock().contains_key(name)
    }

    /// The stored global reference for `name`, if preloaded.
    pub fn get(&self, name: &str) -> Option<GlobalRef> {
        self.classes.lock().get(name).cloned()
    }

    /// Resolves a class as a fresh local reference.
    ///
    /// Preloaded entries are served from the table and work from any
    /// thread. Otherwise this falls back to a direct `FindClass`, which
    /// succeeds only where the runtime's classloader rules permit (not on
    /// natively-spawned threads); the fallback result is not cached.
    pub fn find_class<'local>(&self, env: &mut JNIEnv<'local>, name: &str) -> Result<JClass<'local>> {
        if let Some(global) = self.get(name) {
            let local = env.new_local_ref(global.as_obj())?;
            return Ok(JClass::from(local));
        }
        match env.find_class(name) {
            Ok(class) => Ok(class),
            Err(_) => {
                crate::env::clear_exception(env, false);
                Err(Error::ClassNotFound(name.to_owned()))
            }
        }
    }

    /// Releases all stored references and empties the table.
    ///
    /// Intended for teardown (`JNI_OnUnload`); callers must ensure no
    /// concurrent use afterwards.
    pub fn clear(&self) {
        let count = {
            let mut classes = self.classes.lock();
            let count = classes.len();
            classes.clear();
            count
        };
        if count > 0 {
            log::debug!("released {count} preloaded classes");
        }
    }

    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<ClassRegistry> = Lazy::new(ClassRegistry::new);

/// The process-wide registry backing [`crate::env::preload_class`] and
/// [`crate::object::JavaObject`] name lookups.
pub fn global() -> &'static ClassRegistry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_registry_is_empty() {
        let registry = ClassRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(!registry.contains("java/lang/String"));
        assert!(registry.get("java/lang/String").is_none());
    }

    #[test]
    fn clear_on_empty_registry_is_a_no_op() {
        let registry = ClassRegistry::new();
        registry.clear();
        assert!(registry.is_empty());
    }
}

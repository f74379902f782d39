//! # Java Object Handle
//!
//! [`JavaObject`] pins a Java instance (and its class) behind global
//! references so any attached thread can call into it. Typed wrappers
//! cover the common primitive and string shapes; [`JavaObject::call_with`]
//! takes an explicit signature for everything else.
//!
//! Every call acquires the thread's `JNIEnv` internally, so a handle can
//! be stashed in a `static` and used from worker threads without plumbing
//! an environment through.

use std::fmt;
use std::os::raw::c_void;

use jni::objects::{AutoLocal, GlobalRef, JClass, JObject, JString, JValue};
use jni::signature::{Primitive, ReturnType, TypeSignature};
use jni::sys::jvalue;
use jni::{JNIEnv, NativeMethod};

use crate::env::{self, with_env};
use crate::error::{Error, Result};
use crate::registry;

// ===== ARGUMENT MARSHALLING =====

/// Argument for the signature-explicit call paths
/// ([`JavaObject::call_with`] and [`JavaObject::call_static_with`]).
///
/// `Str` is marshalled to a fresh `java.lang.String` local; `Object`
/// borrows a caller-held global reference.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(&'a str),
    Object(&'a GlobalRef),
}

impl Arg<'_> {
    /// The descriptor type this argument occupies in a method signature.
    ///
    /// `Object` erases to `java/lang/Object`; calls whose parameter is a
    /// narrower reference type need an explicit signature
    /// ([`JavaObject::call_with`]) instead of a built one.
    pub fn java_type(&self) -> crate::sig::JavaType {
        use crate::sig::JavaType;
        match self {
            Arg::Bool(_) => JavaType::Boolean,
            Arg::Int(_) => JavaType::Int,
            Arg::Long(_) => JavaType::Long,
            Arg::Float(_) => JavaType::Float,
            Arg::Double(_) => JavaType::Double,
            Arg::Str(_) => JavaType::string(),
            Arg::Object(_) => JavaType::Object("java/lang/Object".to_owned()),
        }
    }
}

// ===== OBJECT HANDLE =====

/// Global-reference handle to a Java instance and its class.
///
/// The instance slot is optional: class-only handles support static calls,
/// and [`take_jobject`](Self::take_jobject) moves the instance out for
/// hand-off to Java code. The class reference is always present.
///
/// Dropping the handle releases both global references.
pub struct JavaObject {
    obj: Option<GlobalRef>,
    class: GlobalRef,
}

impl JavaObject {
    // ===== CONSTRUCTORS =====

    /// Wraps a borrowed instance, leaving the caller's reference alone.
    pub fn wrap(env: &mut JNIEnv, obj: &JObject) -> Result<Self> {
        let global = env.new_global_ref(obj)?;
        let class = env.get_object_class(obj)?;
        let class_global = env.new_global_ref(&class)?;
        env.delete_local_ref(class)?;
        Ok(Self {
            obj: Some(global),
            class: class_global,
        })
    }

    /// Wraps an instance and consumes the caller's local reference.
    pub fn adopt(env: &mut JNIEnv, obj: JObject) -> Result<Self> {
        let wrapped = Self::wrap(env, &obj)?;
        env.delete_local_ref(obj)?;
        Ok(wrapped)
    }

    /// Instantiates `class` via its no-argument constructor.
    pub fn from_class(env: &mut JNIEnv, class: &JClass) -> Result<Self> {
        let ctor = match env.get_method_id(class, "<init>", "()V") {
            Ok(id) => id,
            Err(_) => {
                env::clear_exception(env, false);
                return Err(Error::MethodNotFound {
                    name: "<init>".to_owned(),
                    sig: "()V".to_owned(),
                });
            }
        };
        let res = unsafe { env.new_object_unchecked(class, ctor, &[]) };
        let obj = checked(env, res, "<init>")?;
        Self::adopt(env, obj)
    }

    /// Resolves `class_name` (preloaded classes first) and instantiates it
    /// via its no-argument constructor.
    pub fn new_instance(env: &mut JNIEnv, class_name: &str) -> Result<Self> {
        let class = registry::global().find_class(env, class_name)?;
        let handle = Self::from_class(env, &class)?;
        env.delete_local_ref(class)?;
        Ok(handle)
    }

    /// Class-only handle for static calls; no instance is created.
    pub fn class_only(env: &mut JNIEnv, class_name: &str) -> Result<Self> {
        let class = registry::global().find_class(env, class_name)?;
        let class_global = env.new_global_ref(&class)?;
        env.delete_local_ref(class)?;
        Ok(Self {
            obj: None,
            class: class_global,
        })
    }

    // ===== ACCESSORS =====

    /// The held instance, if any.
    pub fn object(&self) -> Option<&GlobalRef> {
        self.obj.as_ref()
    }

    /// The held class reference.
    pub fn class(&self) -> &GlobalRef {
        &self.class
    }

    pub fn has_instance(&self) -> bool {
        self.obj.is_some()
    }

    /// Moves the instance out of the handle.
    ///
    /// Afterwards instance calls report [`Error::NoInstance`]; static
    /// calls keep working. The returned global reference lives until the
    /// caller drops it.
    pub fn take_jobject(&mut self) -> Option<GlobalRef> {
        self.obj.take()
    }

    // ===== CORE DISPATCH =====

    fn instance(&self) -> Result<&GlobalRef> {
        self.obj.as_ref().ok_or(Error::NoInstance)
    }

    fn borrowed_class(&self) -> &JClass<'static> {
        <&JClass>::from(self.class.as_obj())
    }

    /// Resolves and invokes an instance method; any pending exception is
    /// cleared and surfaced as an error.
    fn invoke<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        name: &str,
        sig: &str,
        args: &[JValue],
    ) -> Result<jni::objects::JValueOwned<'local>> {
        let obj = self.instance()?;
        let method = match env.get_method_id(self.borrowed_class(), name, sig) {
            Ok(id) => id,
            Err(_) => {
                env::clear_exception(env, false);
                return Err(Error::MethodNotFound {
                    name: name.to_owned(),
                    sig: sig.to_owned(),
                });
            }
        };
        let parsed = TypeSignature::from_str(sig)?;
        let raw: Vec<jvalue> = args.iter().map(|v| v.as_jni()).collect();
        let res = unsafe { env.call_method_unchecked(obj.as_obj(), method, parsed.ret, &raw) };
        checked(env, res, name)
    }

    /// Static-method counterpart of [`invoke`](Self::invoke).
    fn invoke_static<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        name: &str,
        sig: &str,
        args: &[JValue],
    ) -> Result<jni::objects::JValueOwned<'local>> {
        let method = match env.get_static_method_id(self.borrowed_class(), name, sig) {
            Ok(id) => id,
            Err(_) => {
                env::clear_exception(env, false);
                return Err(Error::MethodNotFound {
                    name: name.to_owned(),
                    sig: sig.to_owned(),
                });
            }
        };
        let parsed = TypeSignature::from_str(sig)?;
        let raw: Vec<jvalue> = args.iter().map(|v| v.as_jni()).collect();
        let res = unsafe {
            env.call_static_method_unchecked(self.borrowed_class(), method, parsed.ret, &raw)
        };
        checked(env, res, name)
    }

    // ===== TYPED INSTANCE CALLS =====

    /// Calls `void name()`.
    pub fn call_void(&self, name: &str) -> Result<()> {
        with_env(|env| {
            self.invoke(env, name, "()V", &[])?;
            Ok(())
        })
    }

    /// Calls `boolean name()`.
    pub fn call_bool(&self, name: &str) -> Result<bool> {
        with_env(|env| Ok(self.invoke(env, name, "()Z", &[])?.z()?))
    }

    /// Calls `int name()`.
    pub fn call_int(&self, name: &str) -> Result<i32> {
        with_env(|env| Ok(self.invoke(env, name, "()I", &[])?.i()?))
    }

    /// Calls `long name()`.
    pub fn call_long(&self, name: &str) -> Result<i64> {
        with_env(|env| Ok(self.invoke(env, name, "()J", &[])?.j()?))
    }

    /// Calls `float name()`.
    pub fn call_float(&self, name: &str) -> Result<f32> {
        with_env(|env| Ok(self.invoke(env, name, "()F", &[])?.f()?))
    }

    /// Calls `double name()`.
    pub fn call_double(&self, name: &str) -> Result<f64> {
        with_env(|env| Ok(self.invoke(env, name, "()D", &[])?.d()?))
    }

    /// Calls `String name()`. A `null` result maps to an empty string.
    pub fn call_string(&self, name: &str) -> Result<String> {
        with_env(|env| {
            let out = self.invoke(env, name, "()Ljava/lang/String;", &[])?.l()?;
            local_to_string(env, out)
        })
    }

    /// Calls a method returning `return_class` and wraps the result.
    /// A `null` result is an error.
    pub fn call_object(&self, name: &str, return_class: &str) -> Result<JavaObject> {
        let sig = format!("()L{return_class};");
        with_env(|env| {
            let out = self.invoke(env, name, &sig, &[])?.l()?;
            if out.is_null() {
                return Err(jni::errors::Error::NullPtr("object method returned null").into());
            }
            JavaObject::adopt(env, out)
        })
    }

    /// Calls `void name(int)`.
    pub fn call_void_int(&self, name: &str, value: i32) -> Result<()> {
        with_env(|env| {
            self.invoke(env, name, "(I)V", &[JValue::Int(value)])?;
            Ok(())
        })
    }

    /// Calls `void name(long)`.
    pub fn call_void_long(&self, name: &str, value: i64) -> Result<()> {
        with_env(|env| {
            self.invoke(env, name, "(J)V", &[JValue::Long(value)])?;
            Ok(())
        })
    }

    /// Calls `void name(boolean)`.
    pub fn call_void_bool(&self, name: &str, value: bool) -> Result<()> {
        with_env(|env| {
            self.invoke(env, name, "(Z)V", &[JValue::Bool(value as u8)])?;
            Ok(())
        })
    }

    /// Calls `boolean name(boolean)`.
    pub fn call_bool_arg(&self, name: &str, value: bool) -> Result<bool> {
        with_env(|env| {
            Ok(self
                .invoke(env, name, "(Z)Z", &[JValue::Bool(value as u8)])?
                .z()?)
        })
    }

    /// Calls `float name(int)`.
    pub fn call_float_int(&self, name: &str, value: i32) -> Result<f32> {
        with_env(|env| Ok(self.invoke(env, name, "(I)F", &[JValue::Int(value)])?.f()?))
    }

    /// Calls `void name(String, String, ...)` with one parameter per
    /// element of `args`.
    pub fn call_void_strings(&self, name: &str, args: &[&str]) -> Result<()> {
        let sig = crate::sig::method_sig(
            &vec![crate::sig::JavaType::string(); args.len()],
            &crate::sig::JavaType::Void,
        );
        with_env(|env| {
            let mut locals = Vec::with_capacity(args.len());
            for s in args {
                let js = env::new_jstring(env, s)?;
                locals.push(env.auto_local(JObject::from(js)));
            }
            let jargs: Vec<JValue> = locals.iter().map(|l| JValue::Object(&**l)).collect();
            self.invoke(env, name, &sig, &jargs)?;
            Ok(())
        })
    }

    /// Explicit-signature instance call for shapes the typed wrappers do
    /// not cover. The return value is discarded.
    pub fn call_with(&self, name: &str, sig: &str, args: &[Arg]) -> Result<()> {
        with_env(|env| {
            let (locals, slots) = marshal_locals(env, args)?;
            let jargs = build_jvalues(args, &locals, &slots);
            self.invoke(env, name, sig, &jargs)?;
            Ok(())
        })
    }

    // ===== TYPED STATIC CALLS =====

    /// Calls `static void name()`.
    pub fn call_static_void(&self, name: &str) -> Result<()> {
        with_env(|env| {
            self.invoke_static(env, name, "()V", &[])?;
            Ok(())
        })
    }

    /// Calls `static String name()`. A `null` result maps to an empty
    /// string.
    pub fn call_static_string(&self, name: &str) -> Result<String> {
        with_env(|env| {
            let out = self
                .invoke_static(env, name, "()Ljava/lang/String;", &[])?
                .l()?;
            local_to_string(env, out)
        })
    }

    /// Calls a static method returning `return_class` and wraps the
    /// result. A `null` result is an error.
    pub fn call_static_object(&self, name: &str, return_class: &str) -> Result<JavaObject> {
        let sig = format!("()L{return_class};");
        with_env(|env| {
            let out = self.invoke_static(env, name, &sig, &[])?.l()?;
            if out.is_null() {
                return Err(jni::errors::Error::NullPtr("static method returned null").into());
            }
            JavaObject::adopt(env, out)
        })
    }

    /// Calls `static void name(String, String, ...)`.
    pub fn call_static_void_strings(&self, name: &str, args: &[&str]) -> Result<()> {
        let sig = crate::sig::method_sig(
            &vec![crate::sig::JavaType::string(); args.len()],
            &crate::sig::JavaType::Void,
        );
        with_env(|env| {
            let mut locals = Vec::with_capacity(args.len());
            for s in args {
                let js = env::new_jstring(env, s)?;
                locals.push(env.auto_local(JObject::from(js)));
            }
            let jargs: Vec<JValue> = locals.iter().map(|l| JValue::Object(&**l)).collect();
            self.invoke_static(env, name, &sig, &jargs)?;
            Ok(())
        })
    }

    /// Explicit-signature static call; the return value is discarded.
    pub fn call_static_with(&self, name: &str, sig: &str, args: &[Arg]) -> Result<()> {
        with_env(|env| {
            let (locals, slots) = marshal_locals(env, args)?;
            let jargs = build_jvalues(args, &locals, &slots);
            self.invoke_static(env, name, sig, &jargs)?;
            Ok(())
        })
    }

    // ===== FIELDS =====

    /// Reads an `int` instance field.
    pub fn get_int(&self, name: &str) -> Result<i32> {
        with_env(|env| {
            let obj = self.instance()?;
            let field = match env.get_field_id(self.borrowed_class(), name, "I") {
                Ok(id) => id,
                Err(_) => {
                    env::clear_exception(env, false);
                    return Err(Error::FieldNotFound {
                        name: name.to_owned(),
                        sig: "I".to_owned(),
                    });
                }
            };
            let value = env.get_field_unchecked(
                obj.as_obj(),
                field,
                ReturnType::Primitive(Primitive::Int),
            )?;
            Ok(value.i()?)
        })
    }

    /// Reads a `String` instance field. A `null` value maps to an empty
    /// string.
    pub fn get_string(&self, name: &str) -> Result<String> {
        with_env(|env| {
            let obj = self.instance()?;
            let field = match env.get_field_id(self.borrowed_class(), name, "Ljava/lang/String;") {
                Ok(id) => id,
                Err(_) => {
                    env::clear_exception(env, false);
                    return Err(Error::FieldNotFound {
                        name: name.to_owned(),
                        sig: "Ljava/lang/String;".to_owned(),
                    });
                }
            };
            let value = env.get_field_unchecked(obj.as_obj(), field, ReturnType::Object)?;
            local_to_string(env, value.l()?)
        })
    }

    // ===== NATIVE METHOD REGISTRATION =====

    /// Registers one native method on the held class. Returns whether
    /// registration succeeded; failure is logged, not fatal.
    ///
    /// `fn_ptr` must point to an `extern "system"` function whose
    /// parameters match `sig` after the implicit `JNIEnv` and receiver.
    pub fn register_native_method(&self, name: &str, sig: &str, fn_ptr: *mut c_void) -> bool {
        let method = NativeMethod {
            name: name.into(),
            sig: sig.into(),
            fn_ptr,
        };
        self.register_native_methods(&[method])
    }

    /// Registers a batch of native methods on the held class. Returns
    /// whether registration succeeded; failure is logged, not fatal.
    #[allow(unused_unsafe)]
    pub fn register_native_methods(&self, methods: &[NativeMethod]) -> bool {
        let res: Result<()> = with_env(|env| {
            let res =
                unsafe { env.register_native_methods(self.borrowed_class(), methods) };
            checked(env, res, "RegisterNatives")
        });
        match res {
            Ok(()) => true,
            Err(err) => {
                log::warn!("native method registration failed: {err}");
                false
            }
        }
    }
}

// Raw reference values are opaque; instance presence is the only state
// worth printing.
impl fmt::Debug for JavaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JavaObject")
            .field("has_instance", &self.obj.is_some())
            .finish_non_exhaustive()
    }
}

// ===== HELPERS =====

/// Maps `Err(JavaException)` to [`Error::JavaException`], describing and
/// clearing the pending throwable first.
fn checked<T>(env: &mut JNIEnv, res: jni::errors::Result<T>, what: &str) -> Result<T> {
    match res {
        Ok(value) => Ok(value),
        Err(jni::errors::Error::JavaException) => {
            env::clear_exception(env, true);
            Err(Error::JavaException(what.to_owned()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Consumes a local string reference, mapping `null` to an empty string.
fn local_to_string(env: &mut JNIEnv, obj: JObject) -> Result<String> {
    if obj.is_null() {
        return Ok(String::new());
    }
    let js = JString::from(obj);
    let s = env::rust_string(env, &js)?;
    env.delete_local_ref(js)?;
    Ok(s)
}

/// Creates the local references an [`Arg`] slice needs: fresh string
/// locals for `Str`, promoted local references for `Object` (so every
/// reference argument shares the current frame's lifetime). The slot map
/// records which local, if any, backs each argument.
fn marshal_locals<'local>(
    env: &mut JNIEnv<'local>,
    args: &[Arg],
) -> Result<(Vec<AutoLocal<'local, JObject<'local>>>, Vec<Option<usize>>)> {
    let mut locals = Vec::new();
    let mut slots = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Arg::Str(s) => {
                let js = env::new_jstring(env, s)?;
                locals.push(env.auto_local(JObject::from(js)));
                slots.push(Some(locals.len() - 1));
            }
            Arg::Object(global) => {
                let local = env.new_local_ref(global.as_obj())?;
                locals.push(env.auto_local(local));
                slots.push(Some(locals.len() - 1));
            }
            _ => slots.push(None),
        }
    }
    Ok((locals, slots))
}

/// Pairs each [`Arg`] with its `JValue`, borrowing reference arguments
/// from the marshalled locals.
fn build_jvalues<'obj, 'local>(
    args: &[Arg],
    locals: &'obj [AutoLocal<'local, JObject<'local>>],
    slots: &[Option<usize>],
) -> Vec<JValue<'local, 'obj>> {
    args.iter()
        .zip(slots)
        .map(|(arg, slot)| match arg {
            Arg::Bool(v) => JValue::Bool(*v as u8),
            Arg::Int(v) => JValue::Int(*v),
            Arg::Long(v) => JValue::Long(*v),
            Arg::Float(v) => JValue::Float(*v),
            Arg::Double(v) => JValue::Double(*v),
            Arg::Str(_) | Arg::Object(_) => {
                JValue::Object(&*locals[slot.unwrap_or_default()])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig::{method_sig, JavaType};

    #[test]
    fn arg_descriptor_types() {
        assert_eq!(Arg::Bool(true).java_type(), JavaType::Boolean);
        assert_eq!(Arg::Int(1).java_type(), JavaType::Int);
        assert_eq!(Arg::Long(1).java_type(), JavaType::Long);
        assert_eq!(Arg::Float(1.0).java_type(), JavaType::Float);
        assert_eq!(Arg::Double(1.0).java_type(), JavaType::Double);
        assert_eq!(Arg::Str("x").java_type(), JavaType::string());
    }

    #[test]
    fn arg_list_builds_a_signature() {
        let args = [Arg::Str("name"), Arg::Int(3)];
        let params: Vec<JavaType> = args.iter().map(Arg::java_type).collect();
        assert_eq!(
            method_sig(&params, &JavaType::Void),
            "(Ljava/lang/String;I)V"
        );
    }
}

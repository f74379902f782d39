//! # Signature Builders
//!
//! Programmatic construction of JNI method descriptors, for call sites
//! whose arity is only known at runtime (variadic string helpers and the
//! like). Hand-written literals remain the norm for fixed signatures.

use std::fmt;

/// The subset of Java types the typed call helpers traffic in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Void,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    /// Reference type named by its slash-separated binary name,
    /// e.g. `"java/lang/String"`.
    Object(String),
}

impl JavaType {
    /// Shorthand for the ubiquitous `java/lang/String`.
    pub fn string() -> Self {
        JavaType::Object("java/lang/String".to_owned())
    }

    /// The JVM type descriptor, e.g. `I` or `Ljava/lang/String;`.
    pub fn descriptor(&self) -> String {
        match self {
            JavaType::Void => "V".to_owned(),
            JavaType::Boolean => "Z".to_owned(),
            JavaType::Int => "I".to_owned(),
            JavaType::Long => "J".to_owned(),
            JavaType::Float => "F".to_owned(),
            JavaType::Double => "D".to_owned(),
            JavaType::Object(name) => format!("L{name};"),
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// Builds a method descriptor from parameter and return types:
/// `(<params...>)<ret>`.
pub fn method_sig(params: &[JavaType], ret: &JavaType) -> String {
    let mut sig = String::from("(");
    for param in params {
        sig.push_str(&param.descriptor());
    }
    sig.push(')');
    sig.push_str(&ret.descriptor());
    sig
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_descriptors() {
        assert_eq!(JavaType::Void.descriptor(), "V");
        assert_eq!(JavaType::Boolean.descriptor(), "Z");
        assert_eq!(JavaType::Int.descriptor(), "I");
        assert_eq!(JavaType::Long.descriptor(), "J");
        assert_eq!(JavaType::Float.descriptor(), "F");
        assert_eq!(JavaType::Double.descriptor(), "D");
    }

    #[test]
    fn object_descriptor_is_wrapped() {
        assert_eq!(JavaType::string().descriptor(), "Ljava/lang/String;");
        assert_eq!(
            JavaType::Object("java/util/List".to_owned()).descriptor(),
            "Ljava/util/List;"
        );
    }

    #[test]
    fn builds_method_signatures() {
        assert_eq!(method_sig(&[], &JavaType::Void), "()V");
        assert_eq!(
            method_sig(&[JavaType::Int, JavaType::Long], &JavaType::Boolean),
            "(IJ)Z"
        );
        assert_eq!(
            method_sig(&[JavaType::string(), JavaType::string()], &JavaType::Void),
            "(Ljava/lang/String;Ljava/lang/String;)V"
        );
        assert_eq!(
            method_sig(&[JavaType::Int], &JavaType::string()),
            "(I)Ljava/lang/String;"
        );
    }

    #[test]
    fn display_matches_descriptor() {
        assert_eq!(JavaType::Long.to_string(), "J");
        assert_eq!(JavaType::string().to_string(), "Ljava/lang/String;");
    }
}

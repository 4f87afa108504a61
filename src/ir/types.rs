//! The IR type algebra.
//!
//! Types are immutable values with structural equality, except that named
//! structures (and their opaque forward declarations) compare and hash by
//! name: once a name is bound, every reference to it denotes the same
//! structure. The [`StructRegistry`] interns named definitions and rejects
//! conflicting redefinition.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use crate::error::{Error, Result};

/// A low-level IR type.
#[derive(Debug, Clone)]
pub enum Type {
    Void,
    /// Fixed-width integer; widths 1, 8, 16, 32 and 64 are layout-mapped.
    Integer(u32),
    Float,
    Double,
    Pointer(Box<Type>),
    /// Declared but not defined structure, referenced by name.
    Opaque(String),
    Structure(StructType),
    Array(Box<Type>, u64),
    Function(Box<FunctionType>),
}

/// Body of a structure type.
#[derive(Debug, Clone)]
pub struct StructType {
    pub name: Option<String>,
    pub fields: Vec<Type>,
    /// Packed structures get no automatic inter-field padding.
    pub packed: bool,
}

/// A function signature type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub ret: Type,
    pub params: Vec<Type>,
    pub varargs: bool,
}

impl FunctionType {
    #[must_use]
    pub fn new(ret: Type, params: Vec<Type>) -> Self {
        Self {
            ret,
            params,
            varargs: false,
        }
    }
}

impl Type {
    pub const I1: Type = Type::Integer(1);
    pub const I8: Type = Type::Integer(8);
    pub const I16: Type = Type::Integer(16);
    pub const I32: Type = Type::Integer(32);
    pub const I64: Type = Type::Integer(64);

    #[must_use]
    pub fn pointer(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    #[must_use]
    pub fn i8_ptr() -> Type {
        Type::pointer(Type::I8)
    }

    #[must_use]
    pub fn opaque(name: impl Into<String>) -> Type {
        Type::Opaque(name.into())
    }

    #[must_use]
    pub fn anon_struct(fields: Vec<Type>) -> Type {
        Type::Structure(StructType {
            name: None,
            fields,
            packed: false,
        })
    }

    #[must_use]
    pub fn packed_struct(fields: Vec<Type>) -> Type {
        Type::Structure(StructType {
            name: None,
            fields,
            packed: true,
        })
    }

    #[must_use]
    pub fn named_struct(name: impl Into<String>, fields: Vec<Type>) -> Type {
        Type::Structure(StructType {
            name: Some(name.into()),
            fields,
            packed: false,
        })
    }

    #[must_use]
    pub fn array(elem: Type, count: u64) -> Type {
        Type::Array(Box::new(elem), count)
    }

    #[must_use]
    pub fn function(ret: Type, params: Vec<Type>) -> Type {
        Type::Function(Box::new(FunctionType::new(ret, params)))
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer(_))
    }

    #[must_use]
    pub fn is_floating_point(&self) -> bool {
        matches!(self, Type::Float | Type::Double)
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Type::Structure(_) | Type::Array(..))
    }

    /// Integer bit width, or `None` for non-integers.
    #[must_use]
    pub fn bits(&self) -> Option<u32> {
        match self {
            Type::Integer(bits) => Some(*bits),
            _ => None,
        }
    }

    /// Pointee of a pointer type, or `None` for non-pointers.
    #[must_use]
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// Name of a named structure or opaque declaration.
    #[must_use]
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Type::Opaque(name) => Some(name),
            Type::Structure(body) => body.name.as_deref(),
            _ => None,
        }
    }

    /// Definition line for a named structure (`%Name = type {...}`).
    #[must_use]
    pub fn definition(&self) -> Option<String> {
        match self {
            Type::Structure(body) => {
                let name = body.name.as_deref()?;
                Some(format!("%{name} = type {}", body.render_body()))
            }
            _ => None,
        }
    }
}

impl StructType {
    fn render_body(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if self.packed {
            format!("<{{{fields}}}>")
        } else {
            format!("{{{fields}}}")
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Void, Type::Void)
            | (Type::Float, Type::Float)
            | (Type::Double, Type::Double) => true,
            (Type::Integer(a), Type::Integer(b)) => a == b,
            (Type::Pointer(a), Type::Pointer(b)) => a == b,
            (Type::Array(a, n), Type::Array(b, m)) => n == m && a == b,
            (Type::Function(a), Type::Function(b)) => a == b,
            (Type::Opaque(a), Type::Opaque(b)) => a == b,
            (Type::Opaque(a), Type::Structure(s)) | (Type::Structure(s), Type::Opaque(a)) => {
                s.name.as_deref() == Some(a.as_str())
            }
            (Type::Structure(a), Type::Structure(b)) => match (&a.name, &b.name) {
                (Some(x), Some(y)) => x == y,
                (None, None) => a.packed == b.packed && a.fields == b.fields,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Opaque declarations and named structures hash alike so that
        // name-equal values land in the same bucket.
        match self {
            Type::Void => state.write_u8(0),
            Type::Integer(bits) => {
                state.write_u8(1);
                bits.hash(state);
            }
            Type::Float => state.write_u8(2),
            Type::Double => state.write_u8(3),
            Type::Pointer(pointee) => {
                state.write_u8(4);
                pointee.hash(state);
            }
            Type::Opaque(name) => {
                state.write_u8(5);
                name.hash(state);
            }
            Type::Structure(body) => match &body.name {
                Some(name) => {
                    state.write_u8(5);
                    name.hash(state);
                }
                None => {
                    state.write_u8(6);
                    body.packed.hash(state);
                    body.fields.hash(state);
                }
            },
            Type::Array(elem, count) => {
                state.write_u8(7);
                elem.hash(state);
                count.hash(state);
            }
            Type::Function(func) => {
                state.write_u8(8);
                func.hash(state);
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Integer(bits) => write!(f, "i{bits}"),
            Type::Float => f.write_str("float"),
            Type::Double => f.write_str("double"),
            Type::Pointer(pointee) => write!(f, "{pointee}*"),
            Type::Opaque(name) => write!(f, "%{name}"),
            Type::Structure(body) => match &body.name {
                Some(name) => write!(f, "%{name}"),
                None => f.write_str(&body.render_body()),
            },
            Type::Array(elem, count) => write!(f, "[{count} x {elem}]"),
            Type::Function(func) => {
                let params = func
                    .params
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                let mut params = params.join(", ");
                if func.varargs {
                    if !params.is_empty() {
                        params.push_str(", ");
                    }
                    params.push_str("...");
                }
                write!(f, "{} ({params})", func.ret)
            }
        }
    }
}

/// Interned set of named structure definitions for one compilation.
///
/// The registry is the one piece of state shared across classes when the
/// driver compiles them in parallel, so it is lock-guarded internally and
/// safe to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct StructRegistry {
    inner: RwLock<HashMap<String, StructBody>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StructBody {
    fields: Vec<Type>,
    packed: bool,
}

impl StructRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward-declare a name, yielding its opaque reference type.
    #[must_use]
    pub fn declare(&self, name: &str) -> Type {
        Type::opaque(name)
    }

    /// Bind a definition to `name`.
    ///
    /// Defining the same body twice is idempotent; a conflicting body for
    /// an already-bound name is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] on conflicting redefinition.
    pub fn define(&self, name: &str, fields: Vec<Type>, packed: bool) -> Result<Type> {
        let body = StructBody { fields, packed };
        let mut inner = self
            .inner
            .write()
            .map_err(|_| Error::internal("named-structure registry poisoned"))?;
        if let Some(existing) = inner.get(name) {
            if *existing != body {
                return Err(Error::codegen(format!(
                    "named structure `{name}` redefined with a different body"
                )));
            }
        } else {
            inner.insert(name.to_string(), body.clone());
        }
        Ok(Type::Structure(StructType {
            name: Some(name.to_string()),
            fields: body.fields,
            packed: body.packed,
        }))
    }

    /// Look up the full type bound to `name`, if defined.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Type> {
        let inner = self.inner.read().ok()?;
        let body = inner.get(name)?;
        Some(Type::Structure(StructType {
            name: Some(name.to_string()),
            fields: body.fields.clone(),
            packed: body.packed,
        }))
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.inner
            .read()
            .map(|inner| inner.contains_key(name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(ty: &Type) -> u64 {
        let mut hasher = DefaultHasher::new();
        ty.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn structural_equality_for_unnamed_types() {
        assert_eq!(Type::I32, Type::Integer(32));
        assert_ne!(Type::I32, Type::I64);
        assert_eq!(Type::pointer(Type::I8), Type::i8_ptr());
        assert_eq!(
            Type::anon_struct(vec![Type::I8, Type::I32]),
            Type::anon_struct(vec![Type::I8, Type::I32])
        );
        assert_ne!(
            Type::anon_struct(vec![Type::I8]),
            Type::packed_struct(vec![Type::I8])
        );
    }

    #[test]
    fn named_structures_compare_by_name() {
        let defined = Type::named_struct("Env", vec![Type::i8_ptr()]);
        let also_defined = Type::named_struct("Env", vec![Type::i8_ptr(), Type::I32]);
        let declared = Type::opaque("Env");

        assert_eq!(defined, also_defined);
        assert_eq!(defined, declared);
        assert_eq!(hash_of(&defined), hash_of(&declared));
        assert_ne!(defined, Type::opaque("Class"));
    }

    #[test]
    fn named_and_unnamed_structures_are_distinct() {
        let named = Type::named_struct("Env", vec![Type::I32]);
        let anon = Type::anon_struct(vec![Type::I32]);
        assert_ne!(named, anon);
    }

    #[test]
    fn renders_llvm_flavoured_spellings() {
        assert_eq!(Type::I32.to_string(), "i32");
        assert_eq!(Type::i8_ptr().to_string(), "i8*");
        assert_eq!(Type::opaque("Method").to_string(), "%Method");
        assert_eq!(
            Type::anon_struct(vec![Type::I8, Type::I32]).to_string(),
            "{i8, i32}"
        );
        assert_eq!(
            Type::packed_struct(vec![Type::I8, Type::I64]).to_string(),
            "<{i8, i64}>"
        );
        assert_eq!(Type::array(Type::I8, 3).to_string(), "[3 x i8]");
        assert_eq!(
            Type::function(Type::Void, vec![Type::i8_ptr(), Type::I32]).to_string(),
            "void (i8*, i32)"
        );
    }

    #[test]
    fn named_structure_definitions_render_with_their_body() {
        let env = Type::named_struct("Env", vec![Type::i8_ptr(), Type::I32]);
        assert_eq!(env.to_string(), "%Env");
        assert_eq!(
            env.definition().expect("definition"),
            "%Env = type {i8*, i32}"
        );
        assert!(Type::I32.definition().is_none());
    }

    #[test]
    fn registry_interns_definitions() {
        let registry = StructRegistry::new();
        let declared = registry.declare("Frame");
        assert!(matches!(declared, Type::Opaque(_)));
        assert!(!registry.is_defined("Frame"));

        let defined = registry
            .define("Frame", vec![Type::i8_ptr(), Type::i8_ptr()], false)
            .expect("define Frame");
        assert_eq!(defined, declared);
        assert!(registry.is_defined("Frame"));

        // Identical redefinition is accepted.
        assert!(registry
            .define("Frame", vec![Type::i8_ptr(), Type::i8_ptr()], false)
            .is_ok());

        // Conflicting redefinition is rejected.
        let conflict = registry.define("Frame", vec![Type::I32], false);
        assert!(conflict.is_err());

        let looked_up = registry.lookup("Frame").expect("lookup Frame");
        assert_eq!(looked_up, defined);
    }
}

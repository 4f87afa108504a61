//! IR constants and values.
//!
//! Only the slice the layout helpers need is modelled: typed nulls,
//! integer literals and the constant-expression forms used by the
//! null-pointer size/offset trick. Rendering follows the IR's textual
//! syntax.

use std::fmt;

use crate::ir::types::Type;

/// A constant expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Typed null pointer; the payload is the pointer type itself.
    Null(Type),
    Int { ty: Type, value: i64 },
    /// Constant `getelementptr` over a constant base.
    Getelementptr {
        base: Box<Constant>,
        indices: Vec<i64>,
    },
    /// Constant pointer-to-integer conversion.
    Ptrtoint { value: Box<Constant>, to: Type },
}

impl Constant {
    #[must_use]
    pub fn null(pointer_ty: Type) -> Self {
        Constant::Null(pointer_ty)
    }

    #[must_use]
    pub fn i32(value: i64) -> Self {
        Constant::Int {
            ty: Type::I32,
            value,
        }
    }

    #[must_use]
    pub fn getelementptr(base: Constant, indices: Vec<i64>) -> Self {
        Constant::Getelementptr {
            base: Box::new(base),
            indices,
        }
    }

    #[must_use]
    pub fn ptrtoint(value: Constant, to: Type) -> Self {
        Constant::Ptrtoint {
            value: Box::new(value),
            to,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null(ty) => write!(f, "{ty} null"),
            Constant::Int { ty, value } => write!(f, "{ty} {value}"),
            Constant::Getelementptr { base, indices } => {
                write!(f, "getelementptr({base}")?;
                for index in indices {
                    write!(f, ", i32 {index}")?;
                }
                f.write_str(")")
            }
            Constant::Ptrtoint { value, to } => {
                write!(f, "ptrtoint({value} to {to})")
            }
        }
    }
}

/// A value an instruction can consume: a local variable reference or a
/// constant expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Local { name: String, ty: Type },
    Const(Constant),
}

impl Value {
    #[must_use]
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Value::Local { ty, .. } => Some(ty),
            Value::Const(Constant::Null(ty) | Constant::Int { ty, .. }) => Some(ty),
            Value::Const(Constant::Ptrtoint { to, .. }) => Some(to),
            Value::Const(Constant::Getelementptr { .. }) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Local { name, ty } => write!(f, "{ty} %{name}"),
            Value::Const(constant) => write!(f, "{constant}"),
        }
    }
}

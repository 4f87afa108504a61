//! Function bodies under construction.
//!
//! [`FunctionBuilder`] allocates numbered local variables and appends the
//! instructions layout helpers synthesize. Instruction coverage is limited
//! to what those helpers emit (`bitcast` and byte-offset `getelementptr`).

use std::fmt;

use crate::ir::types::{FunctionType, Type};
use crate::ir::value::Value;

/// A numbered local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    ty: Type,
}

impl Variable {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// A [`Value`] referencing this variable.
    #[must_use]
    pub fn reference(&self) -> Value {
        Value::Local {
            name: self.name.clone(),
            ty: self.ty.clone(),
        }
    }
}

/// An IR instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Bitcast {
        dst: Variable,
        value: Value,
        to: Type,
    },
    Getelementptr {
        dst: Variable,
        base: Value,
        offsets: Vec<Value>,
    },
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Bitcast { dst, value, to } => {
                write!(f, "%{} = bitcast {value} to {to}", dst.name())
            }
            Inst::Getelementptr { dst, base, offsets } => {
                write!(f, "%{} = getelementptr {base}", dst.name())?;
                for offset in offsets {
                    write!(f, ", {offset}")?;
                }
                Ok(())
            }
        }
    }
}

/// A function body being emitted.
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    ty: FunctionType,
    next_var: u64,
    insts: Vec<Inst>,
}

impl FunctionBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Self {
            name: name.into(),
            ty,
            next_var: 0,
            insts: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &FunctionType {
        &self.ty
    }

    /// Allocate a fresh numbered variable of type `ty`.
    pub fn new_variable(&mut self, ty: Type) -> Variable {
        let name = format!("v{}", self.next_var);
        self.next_var += 1;
        Variable { name, ty }
    }

    pub fn push(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    #[must_use]
    pub fn instructions(&self) -> &[Inst] {
        &self.insts
    }
}

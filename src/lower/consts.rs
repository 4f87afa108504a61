//! Link-time size and offset constants.
//!
//! Sizes and offsets of layout structures are emitted as IR constant
//! expressions rather than host-side numbers: indexing off a typed null
//! pointer and converting the result to an integer makes the code
//! generator's own data layout the single source of truth.

use crate::error::{Error, Result};
use crate::ir::function::{FunctionBuilder, Inst};
use crate::ir::types::Type;
use crate::ir::value::{Constant, Value};

/// Link-time constant for the alloc size of aggregate `ty`:
/// `ptrtoint(getelementptr(null, 1) to i32)`.
///
/// # Errors
///
/// Returns [`Error::Codegen`] when `ty` is not an aggregate.
pub fn size_of(ty: &Type) -> Result<Constant> {
    require_aggregate(ty)?;
    Ok(Constant::ptrtoint(
        Constant::getelementptr(Constant::null(Type::pointer(ty.clone())), vec![1]),
        Type::I32,
    ))
}

/// Link-time constant for the byte offset of the member reached by `idx`
/// inside aggregate `ty`: `ptrtoint(getelementptr(null, 0, idx...) to i32)`.
///
/// # Errors
///
/// Returns [`Error::Codegen`] when `ty` is not an aggregate.
pub fn offset_of(ty: &Type, idx: &[i64]) -> Result<Constant> {
    require_aggregate(ty)?;
    let mut indices = Vec::with_capacity(idx.len() + 1);
    indices.push(0);
    indices.extend_from_slice(idx);
    Ok(Constant::ptrtoint(
        Constant::getelementptr(Constant::null(Type::pointer(ty.clone())), indices),
        Type::I32,
    ))
}

/// Reference to a field at `offset` bytes from `base`, typed `field_ty*`.
///
/// Emits `bitcast base to i8*; getelementptr by offset; bitcast to
/// field_ty*` into `f` and returns a reference to the final variable.
pub fn field_ptr(
    f: &mut FunctionBuilder,
    base: Value,
    offset: Constant,
    field_ty: Type,
) -> Value {
    let base_i8 = f.new_variable(Type::i8_ptr());
    f.push(Inst::Bitcast {
        dst: base_i8.clone(),
        value: base,
        to: Type::i8_ptr(),
    });
    let field_i8 = f.new_variable(Type::i8_ptr());
    f.push(Inst::Getelementptr {
        dst: field_i8.clone(),
        base: base_i8.reference(),
        offsets: vec![Value::Const(offset)],
    });
    let field = f.new_variable(Type::pointer(field_ty));
    f.push(Inst::Bitcast {
        dst: field.clone(),
        value: field_i8.reference(),
        to: field.ty().clone(),
    });
    field.reference()
}

fn require_aggregate(ty: &Type) -> Result<()> {
    if ty.is_aggregate() {
        Ok(())
    } else {
        Err(Error::codegen(format!(
            "size/offset constants require an aggregate type, found `{ty}`"
        )))
    }
}

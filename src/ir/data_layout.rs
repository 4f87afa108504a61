//! Target data layout queries.
//!
//! [`DataLayout`] encapsulates the ABI layout rules for one target triple
//! and answers three questions about any sized IR type: the bytes a plain
//! load/store moves (`store_size`), the bytes an allocated value occupies
//! (`alloc_size`, the store size rounded up to alignment) and the boundary
//! the value must start on (`alignment`).

use crate::error::{Error, Result};
use crate::ir::types::{StructType, Type};
use crate::target::Target;

/// Round `value` up to a multiple of `align`.
#[must_use]
pub fn align_to(value: u64, align: u64) -> u64 {
    if align <= 1 {
        value
    } else {
        value.div_ceil(align) * align
    }
}

/// ABI layout rules for one target triple.
///
/// All queries are pure functions of the type and the target fixed at
/// construction; a `DataLayout` is freely sharable across threads.
#[derive(Debug, Clone)]
pub struct DataLayout {
    target: Target,
}

impl DataLayout {
    #[must_use]
    pub fn new(target: &Target) -> Self {
        Self {
            target: target.clone(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Memory footprint of an allocated value of `ty`: the store size
    /// rounded up to the type's alignment. Also the spacing between
    /// consecutive array elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] for types without an in-memory size.
    pub fn alloc_size(&self, ty: &Type) -> Result<u64> {
        Ok(align_to(self.store_size(ty)?, self.alignment(ty)?))
    }

    /// Bytes moved by a naive load or store of `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] for types without an in-memory size.
    pub fn store_size(&self, ty: &Type) -> Result<u64> {
        match ty {
            Type::Integer(bits) => integer_bytes(*bits),
            Type::Float => Ok(4),
            Type::Double => Ok(8),
            Type::Pointer(_) => Ok(self.target.pointer_bytes()),
            Type::Array(elem, count) => Ok(self.alloc_size(elem)? * count),
            Type::Structure(body) => self.struct_size(body),
            Type::Void | Type::Opaque(_) | Type::Function(_) => Err(unsized_type(ty)),
        }
    }

    /// Required alignment boundary for `ty`, in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codegen`] for types without an in-memory size.
    pub fn alignment(&self, ty: &Type) -> Result<u64> {
        match ty {
            Type::Integer(bits) => {
                let bytes = integer_bytes(*bits)?;
                Ok(self.clamp_wide_alignment(bytes))
            }
            Type::Float => Ok(4),
            Type::Double => Ok(self.clamp_wide_alignment(8)),
            Type::Pointer(_) => Ok(self.target.pointer_bytes()),
            Type::Array(elem, _) => self.alignment(elem),
            Type::Structure(body) => {
                if body.packed {
                    return Ok(1);
                }
                let mut align = 1;
                for field in &body.fields {
                    align = align.max(self.alignment(field)?);
                }
                Ok(align)
            }
            Type::Void | Type::Opaque(_) | Type::Function(_) => Err(unsized_type(ty)),
        }
    }

    fn struct_size(&self, body: &StructType) -> Result<u64> {
        let mut offset = 0;
        if body.packed {
            for field in &body.fields {
                offset += self.alloc_size(field)?;
            }
            return Ok(offset);
        }
        let mut align = 1;
        for field in &body.fields {
            let field_align = self.alignment(field)?;
            align = align.max(field_align);
            offset = align_to(offset, field_align) + self.alloc_size(field)?;
        }
        // Trailing pad so consecutive elements stay aligned.
        Ok(align_to(offset, align))
    }

    /// 8-byte scalars align to 4 on 32-bit targets, 8 on 64-bit targets.
    fn clamp_wide_alignment(&self, natural: u64) -> u64 {
        if natural == 8 && self.target.is_32bit() {
            4
        } else {
            natural
        }
    }
}

fn integer_bytes(bits: u32) -> Result<u64> {
    match bits {
        1 | 8 => Ok(1),
        16 => Ok(2),
        32 => Ok(4),
        64 => Ok(8),
        other => Err(Error::codegen(format!(
            "unsupported integer width i{other}"
        ))),
    }
}

fn unsized_type(ty: &Type) -> Error {
    Error::codegen(format!("type `{ty}` has no in-memory size"))
}

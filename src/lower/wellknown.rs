//! Well-known runtime structure types.
//!
//! These mirror the headers the runtime lays down in front of every
//! managed value. Bodies here are models for size/offset arithmetic; the
//! authoritative definitions live in the runtime's target headers.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::ir::types::{StructRegistry, Type};

fn i8_ptrs(count: usize) -> Vec<Type> {
    std::iter::repeat_with(Type::i8_ptr).take(count).collect()
}

/// Intern every well-known structure into `registry`.
///
/// The emitter calls this once per translation unit before writing type
/// definitions, so a module that also defines one of these names with a
/// different body is rejected instead of silently forking the ABI.
///
/// # Errors
///
/// Returns [`crate::error::Error::Codegen`] when a name is already bound
/// to a conflicting body.
pub fn register_all(registry: &StructRegistry) -> Result<()> {
    for ty in [
        &*ENV,
        &*CLASS,
        &*OBJECT,
        &*DATA_OBJECT,
        &*VITABLE,
        &*GATEWAY_FRAME,
        &*TRYCATCH_CONTEXT,
        &*BC_TRYCATCH_CONTEXT,
    ] {
        let Type::Structure(body) = ty else {
            continue;
        };
        if let Some(name) = body.name.as_deref() {
            registry.define(name, body.fields.clone(), body.packed)?;
        }
    }
    Ok(())
}

/// Per-thread execution environment: eight pointer-sized slots plus one
/// 32-bit status slot.
pub static ENV: Lazy<Type> = Lazy::new(|| {
    let mut fields = i8_ptrs(8);
    fields.push(Type::I32);
    Type::named_struct("Env", fields)
});

/// `%Env*`, the hidden first parameter of every compiled method.
pub static ENV_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(ENV.clone()));

/// Class object header.
pub static CLASS: Lazy<Type> = Lazy::new(|| Type::named_struct("Class", vec![Type::i8_ptr()]));

pub static CLASS_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(CLASS.clone()));

/// Object header: every managed instance starts with its class pointer.
pub static OBJECT: Lazy<Type> =
    Lazy::new(|| Type::named_struct("Object", vec![CLASS_PTR.clone()]));

pub static OBJECT_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(OBJECT.clone()));

/// Header of instances with user data following the object header.
pub static DATA_OBJECT: Lazy<Type> =
    Lazy::new(|| Type::named_struct("DataObject", vec![OBJECT.clone()]));

/// Virtual/interface dispatch table header.
pub static VITABLE: Lazy<Type> =
    Lazy::new(|| Type::named_struct("VITable", vec![Type::i8_ptr()]));

pub static VITABLE_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(VITABLE.clone()));

/// Stack frame pushed around calls that leave managed code.
pub static GATEWAY_FRAME: Lazy<Type> =
    Lazy::new(|| Type::named_struct("GatewayFrame", i8_ptrs(3)));

pub static GATEWAY_FRAME_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(GATEWAY_FRAME.clone()));

/// Unwind context pushed by try regions.
pub static TRYCATCH_CONTEXT: Lazy<Type> =
    Lazy::new(|| Type::named_struct("TrycatchContext", vec![Type::i8_ptr()]));

pub static TRYCATCH_CONTEXT_PTR: Lazy<Type> =
    Lazy::new(|| Type::pointer(TRYCATCH_CONTEXT.clone()));

/// Unwind context extended with the landing-pad selector slot.
pub static BC_TRYCATCH_CONTEXT: Lazy<Type> = Lazy::new(|| {
    Type::named_struct(
        "BcTrycatchContext",
        vec![TRYCATCH_CONTEXT.clone(), Type::i8_ptr()],
    )
});

pub static BC_TRYCATCH_CONTEXT_PTR: Lazy<Type> =
    Lazy::new(|| Type::pointer(BC_TRYCATCH_CONTEXT.clone()));

/// Opaque handle to runtime method metadata.
pub static METHOD_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(Type::opaque("Method")));

/// Opaque handle to runtime field metadata.
pub static FIELD_PTR: Lazy<Type> = Lazy::new(|| Type::pointer(Type::opaque("Field")));

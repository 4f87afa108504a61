//! Function signatures for compiled methods.
//!
//! Every compiled method takes the execution environment as its hidden
//! first parameter. Instance methods add the receiver; static *native*
//! methods add the class handle in the receiver slot, because the native
//! calling convention resolves static fields through it.
//!
//! Parameters and returns use the narrow storage mapping; the front end
//! widens sub-word values to locals after the call boundary.

use crate::descriptor::MethodDesc;
use crate::error::Result;
use crate::ir::types::FunctionType;
use crate::lower::types::storage_type;
use crate::lower::wellknown;

/// Signature of a compiled managed method.
///
/// # Errors
///
/// Returns [`crate::error::Error::Descriptor`] when `method_desc` is
/// malformed.
pub fn function_type(method_desc: &str, is_static: bool) -> Result<FunctionType> {
    build(method_desc, is_static, false)
}

/// Signature of a native (bridge) method. The receiver slot is always
/// present: for static natives it carries the class reference.
///
/// # Errors
///
/// Returns [`crate::error::Error::Descriptor`] when `method_desc` is
/// malformed.
pub fn native_function_type(method_desc: &str, is_static: bool) -> Result<FunctionType> {
    build(method_desc, is_static, true)
}

fn build(method_desc: &str, is_static: bool, is_native: bool) -> Result<FunctionType> {
    let parsed = MethodDesc::parse(method_desc)?;
    let mut params = Vec::with_capacity(parsed.params().len() + 2);
    params.push(wellknown::ENV_PTR.clone());
    if !is_static || is_native {
        params.push(wellknown::OBJECT_PTR.clone());
    }
    for param in parsed.params() {
        params.push(storage_type(param));
    }
    Ok(FunctionType::new(storage_type(parsed.return_type()), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::Type;

    #[test]
    fn instance_methods_take_env_and_receiver() {
        let sig = function_type("(II)V", false).expect("signature");
        assert_eq!(
            sig.params,
            vec![
                wellknown::ENV_PTR.clone(),
                wellknown::OBJECT_PTR.clone(),
                Type::I32,
                Type::I32,
            ]
        );
        assert_eq!(sig.ret, Type::Void);
    }

    #[test]
    fn static_methods_take_env_only() {
        let sig = function_type("(II)V", true).expect("signature");
        assert_eq!(
            sig.params,
            vec![wellknown::ENV_PTR.clone(), Type::I32, Type::I32]
        );
    }

    #[test]
    fn static_native_methods_carry_the_class_handle() {
        let sig = native_function_type("(II)V", true).expect("signature");
        assert_eq!(
            sig.params,
            vec![
                wellknown::ENV_PTR.clone(),
                wellknown::OBJECT_PTR.clone(),
                Type::I32,
                Type::I32,
            ]
        );
    }

    #[test]
    fn parameters_keep_their_narrow_storage_types() {
        let sig = function_type("(ZCSLjava/lang/String;)J", true).expect("signature");
        assert_eq!(
            sig.params,
            vec![
                wellknown::ENV_PTR.clone(),
                Type::I8,
                Type::I16,
                Type::I16,
                wellknown::OBJECT_PTR.clone(),
            ]
        );
        assert_eq!(sig.ret, Type::I64);
    }

    #[test]
    fn sub_word_returns_stay_narrow() {
        let sig = function_type("()Z", false).expect("signature");
        assert_eq!(sig.ret, Type::I8);
        let sig = native_function_type("()C", true).expect("signature");
        assert_eq!(sig.ret, Type::I16);
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        assert!(function_type("(I", false).is_err());
        assert!(native_function_type("IV", true).is_err());
    }
}

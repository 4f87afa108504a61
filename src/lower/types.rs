//! Descriptor-to-IR type mapping.
//!
//! Two flavours are exposed: [`storage_type`] gives the narrow form a
//! field occupies in memory, [`local_type`] widens sub-word integers to 32
//! bits for stack slots and locals. The front end emits the extension when
//! loading and the truncation when storing; `char` is the only unsigned
//! primitive, so extensions select zero-extension for it and
//! sign-extension for `byte`/`short`.

use crate::descriptor::Desc;
use crate::ir::types::Type;
use crate::lower::wellknown;
use crate::target::Target;

/// IR type a value of `desc` has when stored in a field or array element.
#[must_use]
pub fn storage_type(desc: &Desc) -> Type {
    match desc {
        Desc::Boolean | Desc::Byte => Type::I8,
        Desc::Short | Desc::Char => Type::I16,
        Desc::Int => Type::I32,
        Desc::Long => Type::I64,
        Desc::Float => Type::Float,
        Desc::Double => Type::Double,
        Desc::Void => Type::Void,
        Desc::Reference(_) | Desc::Array(_) => wellknown::OBJECT_PTR.clone(),
    }
}

/// IR type a value of `desc` has in a local or on the evaluation stack:
/// sub-word integers widen to `i32`.
#[must_use]
pub fn local_type(desc: &Desc) -> Type {
    match storage_type(desc) {
        Type::Integer(bits) if bits < 32 => Type::I32,
        other => other,
    }
}

/// True for the one unsigned managed primitive, `char`.
#[must_use]
pub fn is_unsigned(desc: &Desc) -> bool {
    matches!(desc, Desc::Char)
}

/// Descriptor character for a primitive IR type. Pointers collapse to `J`:
/// the native bridge passes them through long slots.
///
/// # Errors
///
/// Returns [`crate::error::Error::Codegen`] for types with no descriptor
/// form.
pub fn descriptor_of(ty: &Type) -> crate::error::Result<&'static str> {
    match ty {
        Type::Pointer(_) => Ok("J"),
        Type::Integer(8) => Ok("B"),
        Type::Integer(16) => Ok("S"),
        Type::Integer(32) => Ok("I"),
        Type::Integer(64) => Ok("J"),
        Type::Float => Ok("F"),
        Type::Double => Ok("D"),
        other => Err(crate::error::Error::codegen(format!(
            "type `{other}` has no descriptor form"
        ))),
    }
}

/// Bytes a field of `desc` occupies in an object.
#[must_use]
pub fn field_size(target: &Target, desc: &Desc) -> u64 {
    match desc {
        Desc::Long | Desc::Double => 8,
        Desc::Int | Desc::Float => 4,
        Desc::Reference(_) | Desc::Array(_) => target.pointer_bytes(),
        Desc::Short | Desc::Char => 2,
        Desc::Byte | Desc::Boolean => 1,
        Desc::Void => 0,
    }
}

/// Alignment of a field of `desc` inside an object layout.
///
/// All longs are 8-byte aligned on 32-bit ARM, not just volatile/final
/// ones: unsafe-memory accessors can touch any long field with atomic
/// semantics, so the conservative alignment applies across the board.
#[must_use]
pub fn field_alignment(target: &Target, desc: &Desc) -> u64 {
    if target.requires_wide_long_alignment() && matches!(desc, Desc::Long) {
        return 8;
    }
    if matches!(desc, Desc::Long | Desc::Double) {
        return if target.is_32bit() { 4 } else { 8 };
    }
    field_size(target, desc)
}

/// Stable token naming the storage IR type of `desc`, used as a sort
/// tiebreaker. Derived from the IR tag spelling, never from a host type
/// name.
#[must_use]
pub fn tag_token(desc: &Desc) -> &'static str {
    match desc {
        Desc::Reference(_) | Desc::Array(_) => "ptr",
        Desc::Long => "i64",
        Desc::Double => "double",
        Desc::Int => "i32",
        Desc::Float => "float",
        Desc::Short | Desc::Char => "i16",
        Desc::Byte | Desc::Boolean => "i8",
        Desc::Void => "void",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;

    fn linux32() -> Target {
        Target::parse("i386-unknown-linux").expect("triple")
    }

    fn arm32() -> Target {
        Target::parse("arm-apple-ios").expect("triple")
    }

    #[test]
    fn storage_types_follow_the_descriptor_table() {
        assert_eq!(storage_type(&Desc::Boolean), Type::I8);
        assert_eq!(storage_type(&Desc::Byte), Type::I8);
        assert_eq!(storage_type(&Desc::Short), Type::I16);
        assert_eq!(storage_type(&Desc::Char), Type::I16);
        assert_eq!(storage_type(&Desc::Int), Type::I32);
        assert_eq!(storage_type(&Desc::Long), Type::I64);
        assert_eq!(storage_type(&Desc::Float), Type::Float);
        assert_eq!(storage_type(&Desc::Double), Type::Double);
        assert_eq!(storage_type(&Desc::Void), Type::Void);
        assert_eq!(
            storage_type(&Desc::Reference("java/lang/String".to_string())),
            *wellknown::OBJECT_PTR
        );
        assert_eq!(
            storage_type(&Desc::Array(Box::new(Desc::Int))),
            *wellknown::OBJECT_PTR
        );
    }

    #[test]
    fn locals_widen_sub_word_integers() {
        assert_eq!(local_type(&Desc::Boolean), Type::I32);
        assert_eq!(local_type(&Desc::Short), Type::I32);
        assert_eq!(local_type(&Desc::Char), Type::I32);
        assert_eq!(local_type(&Desc::Int), Type::I32);
        assert_eq!(local_type(&Desc::Long), Type::I64);
        assert_eq!(local_type(&Desc::Float), Type::Float);
        assert_eq!(
            local_type(&Desc::Reference("java/lang/Object".to_string())),
            *wellknown::OBJECT_PTR
        );
    }

    #[test]
    fn char_is_the_only_unsigned_primitive() {
        assert!(is_unsigned(&Desc::Char));
        assert!(!is_unsigned(&Desc::Byte));
        assert!(!is_unsigned(&Desc::Short));
        assert!(!is_unsigned(&Desc::Int));
    }

    #[test]
    fn primitive_descriptors_round_trip() {
        for desc in [Desc::Byte, Desc::Short, Desc::Int, Desc::Long, Desc::Float, Desc::Double] {
            let ty = storage_type(&desc);
            let rendered = descriptor_of(&ty).expect("descriptor");
            assert_eq!(rendered, desc.descriptor());
        }
        // Pointers collapse to long-sized handles.
        assert_eq!(descriptor_of(&wellknown::OBJECT_PTR.clone()).expect("descriptor"), "J");
        assert!(descriptor_of(&Type::Void).is_err());
    }

    #[test]
    fn field_sizes_follow_the_target_pointer_width() {
        let t32 = linux32();
        let t64 = Target::parse("x86_64-unknown-linux").expect("triple");
        let object = Desc::Reference("java/lang/Object".to_string());
        assert_eq!(field_size(&t32, &object), 4);
        assert_eq!(field_size(&t64, &object), 8);
        assert_eq!(field_size(&t32, &Desc::Long), 8);
        assert_eq!(field_size(&t32, &Desc::Char), 2);
    }

    #[test]
    fn long_fields_align_wide_on_32bit_arm() {
        let arm = arm32();
        let x86 = linux32();
        assert_eq!(field_alignment(&arm, &Desc::Long), 8);
        assert_eq!(field_alignment(&x86, &Desc::Long), 4);
        // Doubles keep the generic 32-bit rule even on ARM.
        assert_eq!(field_alignment(&arm, &Desc::Double), 4);
        let t64 = Target::parse("arm64-apple-ios").expect("triple");
        assert_eq!(field_alignment(&t64, &Desc::Long), 8);
    }

    #[test]
    fn tag_tokens_are_stable_ir_spellings() {
        assert_eq!(tag_token(&Desc::Reference("a/B".to_string())), "ptr");
        assert_eq!(tag_token(&Desc::Double), "double");
        assert_eq!(tag_token(&Desc::Long), "i64");
        assert_eq!(tag_token(&Desc::Boolean), "i8");
    }
}

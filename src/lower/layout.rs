//! Physical layout of managed classes.
//!
//! Fields are emitted in a canonical order independent of declaration
//! order: references first (so a precise walker can scan the prefix), then
//! by descending alignment and size to minimize padding holes, with the
//! stable IR-tag token and the field name as final tiebreakers.
//!
//! Instance layouts are packed structures with every byte of padding
//! spliced in explicitly; automatic padding would double-count. Each
//! subclass nests its parent's layout, tail-padded so the subclass's
//! strictest field lands on its boundary.

use std::cmp::Ordering;

use tracing::trace;

use crate::classes::{Class, ClassTable, Field};
use crate::descriptor::Desc;
use crate::error::{Error, Result};
use crate::ir::types::Type;
use crate::lower::types::{field_alignment, field_size, storage_type, tag_token};
use crate::lower::wellknown;
use crate::target::Target;

/// A field paired with its parsed descriptor, in canonical layout order.
#[derive(Debug, Clone)]
pub struct SortedField<'a> {
    pub field: &'a Field,
    pub desc: Desc,
}

/// Instance fields of `class` in canonical layout order.
///
/// # Errors
///
/// Returns [`Error::Descriptor`] when a field descriptor is malformed.
pub fn instance_fields<'a>(target: &Target, class: &'a Class) -> Result<Vec<SortedField<'a>>> {
    sorted_fields(target, class, false)
}

/// Static fields of `class` in canonical layout order.
///
/// # Errors
///
/// Returns [`Error::Descriptor`] when a field descriptor is malformed.
pub fn static_fields<'a>(target: &Target, class: &'a Class) -> Result<Vec<SortedField<'a>>> {
    sorted_fields(target, class, true)
}

fn sorted_fields<'a>(
    target: &Target,
    class: &'a Class,
    statics: bool,
) -> Result<Vec<SortedField<'a>>> {
    let mut fields = Vec::new();
    for field in class.fields() {
        if field.is_static != statics {
            continue;
        }
        let desc = Desc::parse(&field.desc)?;
        fields.push(SortedField { field, desc });
    }
    fields.sort_by(|a, b| compare_fields(target, a, b));
    Ok(fields)
}

fn compare_fields(target: &Target, a: &SortedField<'_>, b: &SortedField<'_>) -> Ordering {
    // References precede all primitives.
    match (a.desc.is_reference_like(), b.desc.is_reference_like()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    // Higher alignment first, then larger size.
    let align_a = field_alignment(target, &a.desc);
    let align_b = field_alignment(target, &b.desc);
    align_b
        .cmp(&align_a)
        .then_with(|| field_size(target, &b.desc).cmp(&field_size(target, &a.desc)))
        .then_with(|| tag_token(&a.desc).cmp(tag_token(&b.desc)))
        .then_with(|| a.field.name.cmp(&b.field.name))
}

/// `ty` preceded by `padding` explicit bytes:
/// `pad_type(i64, 3)` => `<{<{i8, i8, i8}>, i64}>`.
fn pad_type(ty: Type, padding: u64) -> Type {
    let pad = usize::try_from(padding).unwrap_or(0);
    Type::packed_struct(vec![Type::packed_struct(vec![Type::I8; pad]), ty])
}

fn padding_for(offset: u64, align: u64) -> u64 {
    if align <= 1 {
        return 0;
    }
    let rem = offset & (align - 1);
    if rem == 0 { 0 } else { align - rem }
}

/// Full instance layout of `class`: the `DataObject` header followed by
/// the packed per-class field chain.
///
/// # Errors
///
/// Returns [`Error::Codegen`] when a superclass is missing from the class
/// view and [`Error::Descriptor`] on malformed field descriptors.
pub fn instance_type(table: &ClassTable, target: &Target, class: &Class) -> Result<Type> {
    let mut offset = 0;
    let chain = instance_chain(table, target, class, 1, &mut offset)?;
    trace!(class = class.name(), size = offset, "computed instance layout");
    Ok(Type::anon_struct(vec![
        wellknown::DATA_OBJECT.clone(),
        chain,
    ]))
}

fn instance_chain(
    table: &ClassTable,
    target: &Target,
    class: &Class,
    subclass_align: u64,
    offset: &mut u64,
) -> Result<Type> {
    let fields = instance_fields(target, class)?;
    // The parent layout is tail-padded so our strictest (first) field
    // starts aligned.
    let own_align = fields
        .first()
        .map_or(1, |entry| field_alignment(target, &entry.desc));

    let mut members = Vec::new();
    if let Some(super_name) = class.superclass() {
        let superclass = table.get(super_name).ok_or_else(|| {
            Error::codegen(format!(
                "superclass `{super_name}` of `{}` is not in the class view",
                class.name()
            ))
        })?;
        members.push(instance_chain(table, target, superclass, own_align, offset)?);
    }

    for entry in &fields {
        let align = field_alignment(target, &entry.desc);
        let padding = padding_for(*offset, align);
        members.push(pad_type(storage_type(&entry.desc), padding));
        *offset += padding + field_size(target, &entry.desc);
    }

    let tail = padding_for(*offset, subclass_align);
    for _ in 0..tail {
        members.push(Type::I8);
        *offset += 1;
    }

    Ok(Type::packed_struct(members))
}

/// Class-side (static) layout of `class`: the shared `Class` header
/// followed by the padded static fields. No parent chain is involved;
/// statics are not inherited into the layout.
///
/// # Errors
///
/// Returns [`Error::Descriptor`] on malformed field descriptors.
pub fn class_type(target: &Target, class: &Class) -> Result<Type> {
    let mut members = Vec::new();
    let mut offset = 0;
    for entry in static_fields(target, class)? {
        let align = field_alignment(target, &entry.desc);
        let padding = padding_for(offset, align);
        members.push(pad_type(storage_type(&entry.desc), padding));
        offset += padding + field_size(target, &entry.desc);
    }
    trace!(class = class.name(), size = offset, "computed static layout");
    Ok(Type::anon_struct(vec![
        wellknown::CLASS.clone(),
        Type::anon_struct(members),
    ]))
}

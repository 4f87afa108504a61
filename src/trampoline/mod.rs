//! Cross-translation-unit linkage records.
//!
//! Every action that crosses a translation unit boundary (a call, a field
//! access, a class reference, a native entry) is represented as a
//! [`Trampoline`] value. The emitter materializes each distinct value as
//! one private stub that resolves its target on first use; the value's
//! mangled symbol is the linkage name shared by all units.
//!
//! Trampolines are plain data with a total order; the per-compilation
//! [`TrampolineSet`] is the linkage contract handed to the emitter.

pub mod symbols;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::trace;

use crate::descriptor::Desc;
use crate::error::{Error, Result};
use crate::ir::types::{FunctionType, Type};
use crate::lower::types::storage_type;
use crate::lower::{signatures, wellknown};

/// Discriminant of a trampoline variant. The declaration order is the
/// major key of the serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrampolineKind {
    Invokevirtual,
    Invokespecial,
    Invokestatic,
    Invokeinterface,
    GetField,
    PutField,
    GetStatic,
    PutStatic,
    LdcClass,
    Checkcast,
    Instanceof,
    New,
    NewArray,
    BridgeCall,
    NativeCall,
}

impl TrampolineKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrampolineKind::Invokevirtual => "invokevirtual",
            TrampolineKind::Invokespecial => "invokespecial",
            TrampolineKind::Invokestatic => "invokestatic",
            TrampolineKind::Invokeinterface => "invokeinterface",
            TrampolineKind::GetField => "getfield",
            TrampolineKind::PutField => "putfield",
            TrampolineKind::GetStatic => "getstatic",
            TrampolineKind::PutStatic => "putstatic",
            TrampolineKind::LdcClass => "ldcclass",
            TrampolineKind::Checkcast => "checkcast",
            TrampolineKind::Instanceof => "instanceof",
            TrampolineKind::New => "new",
            TrampolineKind::NewArray => "newarray",
            TrampolineKind::BridgeCall => "bridgecall",
            TrampolineKind::NativeCall => "nativecall",
        }
    }
}

/// Shared payload of every trampoline: who references, and what.
///
/// For array-typed targets (`NewArray`, `Checkcast`, `Instanceof`) the
/// target carries the array descriptor instead of a plain internal name.
#[derive(Debug, Clone)]
pub struct ClassRef {
    calling_class: String,
    target_class: String,
}

impl ClassRef {
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when either class name is empty; an
    /// empty tuple field is a compiler bug, not bad input.
    pub fn new(calling_class: impl Into<String>, target_class: impl Into<String>) -> Result<Self> {
        let calling_class = calling_class.into();
        let target_class = target_class.into();
        if calling_class.is_empty() || target_class.is_empty() {
            return Err(Error::internal(
                "trampoline constructed with an empty class name",
            ));
        }
        Ok(Self {
            calling_class,
            target_class,
        })
    }

    #[must_use]
    pub fn calling_class(&self) -> &str {
        &self.calling_class
    }

    #[must_use]
    pub fn target_class(&self) -> &str {
        &self.target_class
    }
}

/// Payload of member-addressed trampolines: a method or field of the
/// target class.
#[derive(Debug, Clone)]
pub struct MemberRef {
    link: ClassRef,
    name: String,
    desc: String,
}

impl MemberRef {
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when any tuple field is empty.
    pub fn new(
        calling_class: impl Into<String>,
        target_class: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
    ) -> Result<Self> {
        let link = ClassRef::new(calling_class, target_class)?;
        let name = name.into();
        let desc = desc.into();
        if name.is_empty() || desc.is_empty() {
            return Err(Error::internal(
                "trampoline constructed with an empty member name or descriptor",
            ));
        }
        Ok(Self { link, name, desc })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }
}

/// Payload of native-bridge trampolines. `is_static` shapes the stub's
/// signature but is not part of the trampoline's identity.
#[derive(Debug, Clone)]
pub struct NativeRef {
    member: MemberRef,
    is_static: bool,
}

impl NativeRef {
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when any tuple field is empty.
    pub fn new(
        calling_class: impl Into<String>,
        target_class: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
        is_static: bool,
    ) -> Result<Self> {
        Ok(Self {
            member: MemberRef::new(calling_class, target_class, name, desc)?,
            is_static,
        })
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

/// One cross-translation-unit action.
#[derive(Debug, Clone)]
pub enum Trampoline {
    Invokevirtual(MemberRef),
    Invokespecial(MemberRef),
    Invokestatic(MemberRef),
    Invokeinterface(MemberRef),
    GetField(MemberRef),
    PutField(MemberRef),
    GetStatic(MemberRef),
    PutStatic(MemberRef),
    LdcClass(ClassRef),
    Checkcast(ClassRef),
    Instanceof(ClassRef),
    New(ClassRef),
    NewArray(ClassRef),
    BridgeCall(NativeRef),
    NativeCall(NativeRef),
}

impl Trampoline {
    #[must_use]
    pub fn kind(&self) -> TrampolineKind {
        match self {
            Trampoline::Invokevirtual(_) => TrampolineKind::Invokevirtual,
            Trampoline::Invokespecial(_) => TrampolineKind::Invokespecial,
            Trampoline::Invokestatic(_) => TrampolineKind::Invokestatic,
            Trampoline::Invokeinterface(_) => TrampolineKind::Invokeinterface,
            Trampoline::GetField(_) => TrampolineKind::GetField,
            Trampoline::PutField(_) => TrampolineKind::PutField,
            Trampoline::GetStatic(_) => TrampolineKind::GetStatic,
            Trampoline::PutStatic(_) => TrampolineKind::PutStatic,
            Trampoline::LdcClass(_) => TrampolineKind::LdcClass,
            Trampoline::Checkcast(_) => TrampolineKind::Checkcast,
            Trampoline::Instanceof(_) => TrampolineKind::Instanceof,
            Trampoline::New(_) => TrampolineKind::New,
            Trampoline::NewArray(_) => TrampolineKind::NewArray,
            Trampoline::BridgeCall(_) => TrampolineKind::BridgeCall,
            Trampoline::NativeCall(_) => TrampolineKind::NativeCall,
        }
    }

    fn link(&self) -> &ClassRef {
        match self {
            Trampoline::Invokevirtual(m)
            | Trampoline::Invokespecial(m)
            | Trampoline::Invokestatic(m)
            | Trampoline::Invokeinterface(m)
            | Trampoline::GetField(m)
            | Trampoline::PutField(m)
            | Trampoline::GetStatic(m)
            | Trampoline::PutStatic(m) => &m.link,
            Trampoline::LdcClass(c)
            | Trampoline::Checkcast(c)
            | Trampoline::Instanceof(c)
            | Trampoline::New(c)
            | Trampoline::NewArray(c) => c,
            Trampoline::BridgeCall(n) | Trampoline::NativeCall(n) => &n.member.link,
        }
    }

    fn member(&self) -> Option<&MemberRef> {
        match self {
            Trampoline::Invokevirtual(m)
            | Trampoline::Invokespecial(m)
            | Trampoline::Invokestatic(m)
            | Trampoline::Invokeinterface(m)
            | Trampoline::GetField(m)
            | Trampoline::PutField(m)
            | Trampoline::GetStatic(m)
            | Trampoline::PutStatic(m) => Some(m),
            Trampoline::BridgeCall(n) | Trampoline::NativeCall(n) => Some(&n.member),
            _ => None,
        }
    }

    #[must_use]
    pub fn calling_class(&self) -> &str {
        self.link().calling_class()
    }

    #[must_use]
    pub fn target_class(&self) -> &str {
        self.link().target_class()
    }

    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        self.member().map(MemberRef::name)
    }

    #[must_use]
    pub fn member_desc(&self) -> Option<&str> {
        self.member().map(MemberRef::desc)
    }

    fn key(&self) -> (TrampolineKind, &str, &str, Option<&str>, Option<&str>) {
        (
            self.kind(),
            self.calling_class(),
            self.target_class(),
            self.member_name(),
            self.member_desc(),
        )
    }

    /// IR function type of the emitted stub.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Descriptor`] when the member descriptor is
    /// malformed.
    pub fn function_type(&self) -> Result<FunctionType> {
        let env = wellknown::ENV_PTR.clone();
        let object = wellknown::OBJECT_PTR.clone();
        match self {
            Trampoline::Invokestatic(m) => signatures::function_type(&m.desc, true),
            Trampoline::Invokevirtual(m)
            | Trampoline::Invokespecial(m)
            | Trampoline::Invokeinterface(m) => signatures::function_type(&m.desc, false),
            Trampoline::GetField(m) => {
                let field = storage_type(&Desc::parse(&m.desc)?);
                Ok(FunctionType::new(field, vec![env, object]))
            }
            Trampoline::PutField(m) => {
                let field = storage_type(&Desc::parse(&m.desc)?);
                Ok(FunctionType::new(Type::Void, vec![env, object, field]))
            }
            Trampoline::GetStatic(m) => {
                let field = storage_type(&Desc::parse(&m.desc)?);
                Ok(FunctionType::new(field, vec![env]))
            }
            Trampoline::PutStatic(m) => {
                let field = storage_type(&Desc::parse(&m.desc)?);
                Ok(FunctionType::new(Type::Void, vec![env, field]))
            }
            Trampoline::LdcClass(_) | Trampoline::New(_) => {
                Ok(FunctionType::new(object, vec![env]))
            }
            Trampoline::Checkcast(_) => Ok(FunctionType::new(object.clone(), vec![env, object])),
            Trampoline::Instanceof(_) => Ok(FunctionType::new(Type::I32, vec![env, object])),
            Trampoline::NewArray(_) => Ok(FunctionType::new(object, vec![env, Type::I32])),
            Trampoline::BridgeCall(n) | Trampoline::NativeCall(n) => {
                signatures::native_function_type(&n.member.desc, n.is_static)
            }
        }
    }

    /// Mangled linkage symbol of this trampoline.
    #[must_use]
    pub fn symbol(&self) -> String {
        symbols::trampoline_symbol(self)
    }
}

impl PartialEq for Trampoline {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Trampoline {}

impl Hash for Trampoline {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Trampoline {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Trampoline {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Trampoline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol())
    }
}

/// Ordered, de-duplicated set of trampolines for one compilation.
///
/// Per-class sets merge by union, which commutes and associates; the
/// iteration order is always the total order of [`Trampoline`], never the
/// merge order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrampolineSet {
    inner: BTreeSet<Trampoline>,
}

impl TrampolineSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trampoline. Returns `false` when an equal value was
    /// already present.
    pub fn insert(&mut self, trampoline: Trampoline) -> bool {
        if self.inner.contains(&trampoline) {
            return false;
        }
        trace!(symbol = %trampoline, "recorded trampoline");
        self.inner.insert(trampoline)
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: TrampolineSet) {
        self.inner.extend(other.inner);
    }

    #[must_use]
    pub fn contains(&self, trampoline: &Trampoline) -> bool {
        self.inner.contains(trampoline)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Trampolines in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = &Trampoline> {
        self.inner.iter()
    }
}

impl FromIterator<Trampoline> for TrampolineSet {
    fn from_iter<I: IntoIterator<Item = Trampoline>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<Trampoline> for TrampolineSet {
    fn extend<I: IntoIterator<Item = Trampoline>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

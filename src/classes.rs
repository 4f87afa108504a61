//! Read-only view of the front end's class table.
//!
//! The front end hands the core a snapshot of each class it compiles:
//! internal name, direct superclass and the declared fields with their
//! access flags. Hierarchy predicates resolve superclass chains against
//! the table.

use std::collections::HashMap;

/// Internal name of the enum root class.
pub const ENUM_CLASS: &str = "java/lang/Enum";
/// Marker class extended by types backed by a raw native handle.
pub const NATIVE_OBJECT_CLASS: &str = "kiln/rt/NativeObject";
/// Marker class extended by value types mapped onto native structures.
pub const STRUCT_CLASS: &str = "kiln/rt/Struct";

/// A declared field of a managed class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub desc: String,
    pub is_static: bool,
    pub is_final: bool,
    pub is_volatile: bool,
}

impl Field {
    #[must_use]
    pub fn instance(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            is_static: false,
            is_final: false,
            is_volatile: false,
        }
    }

    #[must_use]
    pub fn statik(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::instance(name, desc)
        }
    }
}

/// A managed class as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    name: String,
    superclass: Option<String>,
    fields: Vec<Field>,
}

impl Class {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        superclass: Option<String>,
        fields: Vec<Field>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass,
            fields,
        }
    }

    /// Internal name (`java/lang/String`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Internal name of the direct superclass, `None` for the root.
    #[must_use]
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Declared fields in source order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// The front end's class table, exposed read-only to the core.
#[derive(Debug, Default, Clone)]
pub struct ClassTable {
    classes: HashMap<String, Class>,
}

impl ClassTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: Class) {
        self.classes.insert(class.name.clone(), class);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    #[must_use]
    pub fn superclass_of(&self, class: &Class) -> Option<&Class> {
        class.superclass().and_then(|name| self.get(name))
    }

    /// True when some strict ancestor of `class` is named `ancestor`.
    ///
    /// Classes missing from the table terminate the walk; an unknown
    /// superclass never matches.
    #[must_use]
    pub fn is_subclass(&self, class: &Class, ancestor: &str) -> bool {
        let mut current = class.superclass();
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.get(name).and_then(Class::superclass);
        }
        false
    }

    /// True when `class` is named `name` or has an ancestor named `name`.
    #[must_use]
    pub fn is_instance_of_class(&self, class: &Class, name: &str) -> bool {
        class.name() == name || self.is_subclass(class, name)
    }

    /// True iff the direct superclass is the enum root. The test is one
    /// level deep; subclasses of concrete enums are not enums by this rule.
    #[must_use]
    pub fn is_enum(&self, class: &Class) -> bool {
        class.superclass() == Some(ENUM_CLASS)
    }

    /// True when `class` transitively extends the native-object marker.
    #[must_use]
    pub fn is_native_object(&self, class: &Class) -> bool {
        self.is_subclass(class, NATIVE_OBJECT_CLASS)
    }

    /// True when `class` transitively extends the struct marker.
    #[must_use]
    pub fn is_struct(&self, class: &Class) -> bool {
        self.is_subclass(class, STRUCT_CLASS)
    }
}

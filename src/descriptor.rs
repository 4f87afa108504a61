//! Class-file descriptor grammar.
//!
//! Descriptors encode managed types as compact strings: `Z B S C I J F D V`
//! for primitives and void, `Lpkg/Name;` for references and `[` prefixes for
//! arrays. Method descriptors are `(<params>)<ret>`. Internal names use `/`
//! as the package separator.
//!
//! Parsing preserves the reference class name so downstream consumers can
//! resolve the class without re-scanning the descriptor string.

use std::fmt;

/// A parsed managed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Desc {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Void,
    /// Reference to a class, carrying the internal name (`java/lang/String`).
    Reference(String),
    Array(Box<Desc>),
}

impl Desc {
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Desc::Reference(_) | Desc::Array(_))
    }

    #[must_use]
    pub fn is_reference_like(&self) -> bool {
        matches!(self, Desc::Reference(_) | Desc::Array(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Desc::Array(_))
    }

    /// Element type of an array descriptor, or `None` for non-arrays.
    #[must_use]
    pub fn element(&self) -> Option<&Desc> {
        match self {
            Desc::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Render the canonical descriptor string.
    #[must_use]
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    /// Internal name of a reference-like descriptor: the class name for a
    /// plain reference, the descriptor itself for an array (arrays have no
    /// internal name of their own). `None` for primitives and void.
    #[must_use]
    pub fn internal_name(&self) -> Option<String> {
        match self {
            Desc::Reference(name) => Some(name.clone()),
            Desc::Array(_) => Some(self.descriptor()),
            _ => None,
        }
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            Desc::Boolean => out.push('Z'),
            Desc::Byte => out.push('B'),
            Desc::Short => out.push('S'),
            Desc::Char => out.push('C'),
            Desc::Int => out.push('I'),
            Desc::Long => out.push('J'),
            Desc::Float => out.push('F'),
            Desc::Double => out.push('D'),
            Desc::Void => out.push('V'),
            Desc::Reference(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            Desc::Array(elem) => {
                out.push('[');
                elem.write_descriptor(out);
            }
        }
    }

    /// Parse a single type descriptor, requiring the whole input to be
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] on malformed input or trailing garbage.
    pub fn parse(desc: &str) -> Result<Self, DescriptorError> {
        let mut cursor = Cursor::new(desc);
        let parsed = cursor.next_type()?;
        cursor.expect_end()?;
        Ok(parsed)
    }
}

impl fmt::Display for Desc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// A parsed method descriptor `(<params>)<ret>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDesc {
    params: Vec<Desc>,
    ret: Desc,
}

impl MethodDesc {
    /// Assemble a method descriptor from parsed components.
    #[must_use]
    pub fn new(params: Vec<Desc>, ret: Desc) -> Self {
        Self { params, ret }
    }

    /// Parse a method descriptor string.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when the parameter list is unterminated,
    /// a component descriptor is malformed, or input trails the return type.
    pub fn parse(desc: &str) -> Result<Self, DescriptorError> {
        let mut cursor = Cursor::new(desc);
        cursor.expect('(')?;
        let mut params = Vec::new();
        while !cursor.consume(')') {
            if cursor.at_end() {
                return Err(cursor.error("unterminated parameter list"));
            }
            params.push(cursor.next_type()?);
        }
        let ret = cursor.next_type()?;
        cursor.expect_end()?;
        Ok(Self { params, ret })
    }

    #[must_use]
    pub fn params(&self) -> &[Desc] {
        &self.params
    }

    #[must_use]
    pub fn return_type(&self) -> &Desc {
        &self.ret
    }

    /// Render the canonical descriptor string.
    #[must_use]
    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            param.write_descriptor(&mut out);
        }
        out.push(')');
        self.ret.write_descriptor(&mut out);
        out
    }
}

impl fmt::Display for MethodDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// The return-type slice of a raw method descriptor.
///
/// # Errors
///
/// Returns [`DescriptorError`] when the descriptor has no `)`.
pub fn return_type_descriptor(method_desc: &str) -> Result<&str, DescriptorError> {
    method_desc
        .find(')')
        .map(|idx| &method_desc[idx + 1..])
        .ok_or_else(|| DescriptorError::new(method_desc, "method descriptor has no ')'"))
}

/// Parameter descriptors of a raw method descriptor, as sub-slices.
///
/// # Errors
///
/// Returns [`DescriptorError`] on malformed input.
pub fn parameter_descriptors(method_desc: &str) -> Result<Vec<&str>, DescriptorError> {
    let mut cursor = Cursor::new(method_desc);
    cursor.expect('(')?;
    let mut result = Vec::new();
    while !cursor.consume(')') {
        if cursor.at_end() {
            return Err(cursor.error("unterminated parameter list"));
        }
        let start = cursor.pos;
        cursor.skip_type()?;
        result.push(&method_desc[start..cursor.pos]);
    }
    Ok(result)
}

/// True for single-character (primitive or void) descriptors.
#[must_use]
pub fn is_primitive(descriptor: &str) -> bool {
    descriptor.len() == 1
}

/// True for array descriptors.
#[must_use]
pub fn is_array(descriptor: &str) -> bool {
    descriptor.starts_with('[')
}

/// True for one-dimensional arrays of primitives (`[I`, `[B`, ...).
///
/// # Errors
///
/// Returns [`DescriptorError`] when the input is not an array descriptor.
pub fn is_primitive_component_type(descriptor: &str) -> Result<bool, DescriptorError> {
    if !is_array(descriptor) {
        return Err(DescriptorError::new(descriptor, "not an array descriptor"));
    }
    Ok(descriptor.len() == 2)
}

/// True when the innermost element type of an array descriptor is primitive.
///
/// # Errors
///
/// Returns [`DescriptorError`] when the input is not an array descriptor.
pub fn is_primitive_base_type(descriptor: &str) -> Result<bool, DescriptorError> {
    if !is_array(descriptor) {
        return Err(DescriptorError::new(descriptor, "not an array descriptor"));
    }
    Ok(!descriptor.ends_with(';'))
}

/// Internal name of the base type for an array of references
/// (`[[Ljava/lang/String;` => `java/lang/String`) or a plain reference
/// (`Ljava/lang/String;` => `java/lang/String`).
///
/// # Errors
///
/// Returns [`DescriptorError`] when the base type is primitive or the
/// descriptor is malformed.
pub fn base_type_name(descriptor: &str) -> Result<&str, DescriptorError> {
    if !descriptor.ends_with(';') {
        return Err(DescriptorError::new(
            descriptor,
            "base type is primitive or descriptor is malformed",
        ));
    }
    let start = descriptor.rfind('[').map_or(0, |idx| idx + 1);
    let rest = &descriptor[start..];
    if !rest.starts_with('L') || rest.len() < 3 {
        return Err(DescriptorError::new(descriptor, "invalid reference descriptor"));
    }
    Ok(&rest[1..rest.len() - 1])
}

/// Internal name of a plain class descriptor (`Ljava/lang/String;` =>
/// `java/lang/String`).
///
/// # Errors
///
/// Returns [`DescriptorError`] when the input is not a class descriptor.
pub fn internal_name_from_descriptor(descriptor: &str) -> Result<&str, DescriptorError> {
    if !descriptor.starts_with('L') || !descriptor.ends_with(';') || descriptor.len() < 3 {
        return Err(DescriptorError::new(descriptor, "not a class descriptor"));
    }
    Ok(&descriptor[1..descriptor.len() - 1])
}

/// Class descriptor of an internal name (`java/lang/String` =>
/// `Ljava/lang/String;`).
#[must_use]
pub fn descriptor_of_class(internal_name: &str) -> String {
    format!("L{internal_name};")
}

/// A descriptor string that does not follow the class-file grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    descriptor: String,
    message: String,
}

impl DescriptorError {
    pub fn new(descriptor: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed descriptor `{}`: {}", self.descriptor, self.message)
    }
}

impl std::error::Error for DescriptorError {}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> DescriptorError {
        DescriptorError::new(self.input, message)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, expected: char) -> Result<(), DescriptorError> {
        match self.bump() {
            Some(byte) if byte == expected as u8 => Ok(()),
            _ => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn consume(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected as u8) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_end(&self) -> Result<(), DescriptorError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("trailing input after descriptor"))
        }
    }

    fn next_type(&mut self) -> Result<Desc, DescriptorError> {
        match self.bump() {
            Some(b'Z') => Ok(Desc::Boolean),
            Some(b'B') => Ok(Desc::Byte),
            Some(b'S') => Ok(Desc::Short),
            Some(b'C') => Ok(Desc::Char),
            Some(b'I') => Ok(Desc::Int),
            Some(b'J') => Ok(Desc::Long),
            Some(b'F') => Ok(Desc::Float),
            Some(b'D') => Ok(Desc::Double),
            Some(b'V') => Ok(Desc::Void),
            Some(b'L') => {
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(b';') => break,
                        Some(_) => {}
                        None => return Err(self.error("unterminated class descriptor")),
                    }
                }
                let name = &self.input[start..self.pos - 1];
                if name.is_empty() {
                    return Err(self.error("empty class name"));
                }
                Ok(Desc::Reference(name.to_string()))
            }
            Some(b'[') => Ok(Desc::Array(Box::new(self.next_type()?))),
            Some(other) => Err(self.error(format!("unexpected character '{}'", other as char))),
            None => Err(self.error("unexpected end of descriptor")),
        }
    }

    fn skip_type(&mut self) -> Result<(), DescriptorError> {
        match self.bump() {
            Some(b'Z' | b'B' | b'S' | b'C' | b'I' | b'J' | b'F' | b'D' | b'V') => Ok(()),
            Some(b'L') => {
                loop {
                    match self.bump() {
                        Some(b';') => break,
                        Some(_) => {}
                        None => return Err(self.error("unterminated class descriptor")),
                    }
                }
                Ok(())
            }
            Some(b'[') => self.skip_type(),
            Some(other) => Err(self.error(format!("unexpected character '{}'", other as char))),
            None => Err(self.error("unexpected end of descriptor")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitives_and_void() {
        assert_eq!(Desc::parse("Z"), Ok(Desc::Boolean));
        assert_eq!(Desc::parse("J"), Ok(Desc::Long));
        assert_eq!(Desc::parse("V"), Ok(Desc::Void));
    }

    #[test]
    fn parses_references_preserving_the_class_name() {
        let desc = Desc::parse("Ljava/lang/String;").expect("parse reference");
        assert_eq!(desc, Desc::Reference("java/lang/String".to_string()));
        assert_eq!(desc.descriptor(), "Ljava/lang/String;");
    }

    #[test]
    fn parses_nested_arrays() {
        let desc = Desc::parse("[[I").expect("parse array");
        assert_eq!(
            desc,
            Desc::Array(Box::new(Desc::Array(Box::new(Desc::Int))))
        );
        assert_eq!(desc.descriptor(), "[[I");
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert!(Desc::parse("Q").is_err());
        assert!(Desc::parse("Ljava/lang/String").is_err());
        assert!(Desc::parse("L;").is_err());
        assert!(Desc::parse("II").is_err());
        assert!(Desc::parse("[").is_err());
    }

    #[test]
    fn parses_method_descriptors() {
        let method = MethodDesc::parse("(ILjava/lang/String;[J)V").expect("parse method");
        assert_eq!(
            method.params(),
            &[
                Desc::Int,
                Desc::Reference("java/lang/String".to_string()),
                Desc::Array(Box::new(Desc::Long)),
            ]
        );
        assert_eq!(method.return_type(), &Desc::Void);
        assert_eq!(method.descriptor(), "(ILjava/lang/String;[J)V");
    }

    #[test]
    fn rejects_malformed_method_descriptors() {
        assert!(MethodDesc::parse("(I").is_err());
        assert!(MethodDesc::parse("I)V").is_err());
        assert!(MethodDesc::parse("(I)VV").is_err());
    }

    #[test]
    fn slices_raw_parameter_descriptors() {
        let params = parameter_descriptors("(ILjava/lang/String;[J)V").expect("slice params");
        assert_eq!(params, vec!["I", "Ljava/lang/String;", "[J"]);
        assert_eq!(return_type_descriptor("(ILjava/lang/String;[J)V"), Ok("V"));
    }

    #[test]
    fn classifies_array_descriptors() {
        assert!(is_array("[I"));
        assert!(!is_array("I"));
        assert_eq!(is_primitive_component_type("[I"), Ok(true));
        assert_eq!(is_primitive_component_type("[[I"), Ok(false));
        assert_eq!(is_primitive_base_type("[[I"), Ok(true));
        assert_eq!(is_primitive_base_type("[Ljava/lang/String;"), Ok(false));
        assert!(is_primitive_component_type("I").is_err());
    }

    #[test]
    fn extracts_base_type_names() {
        assert_eq!(
            base_type_name("[[Ljava/lang/String;"),
            Ok("java/lang/String")
        );
        assert_eq!(base_type_name("Ljava/lang/String;"), Ok("java/lang/String"));
        assert!(base_type_name("[[I").is_err());
    }

    #[test]
    fn converts_between_internal_names_and_descriptors() {
        assert_eq!(
            internal_name_from_descriptor("Ljava/lang/String;"),
            Ok("java/lang/String")
        );
        assert!(internal_name_from_descriptor("I").is_err());
        assert_eq!(descriptor_of_class("java/lang/String"), "Ljava/lang/String;");
    }

    #[test]
    fn internal_names_of_references_and_arrays() {
        let reference = Desc::parse("Ljava/lang/String;").expect("parse");
        assert_eq!(
            reference.internal_name().as_deref(),
            Some("java/lang/String")
        );
        let array = Desc::parse("[[I").expect("parse");
        assert_eq!(array.internal_name().as_deref(), Some("[[I"));
        assert_eq!(Desc::Int.internal_name(), None);
    }

    #[test]
    fn assembled_method_descriptors_render_canonically() {
        let method = MethodDesc::new(
            vec![Desc::Int, Desc::Reference("java/lang/Object".to_string())],
            Desc::Boolean,
        );
        assert_eq!(method.descriptor(), "(ILjava/lang/Object;)Z");
        assert_eq!(
            MethodDesc::parse(&method.descriptor()).expect("reparse"),
            method
        );
    }
}

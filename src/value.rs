//! # String values
//!
//! Field values are trees: a [`StringComponent`] is a quoted or braced group holding a sequence
//! of [`StringDatum`]s, each of which is literal text, a number, a macro reference, or another
//! nested component.
//!
//! The component produced directly from a field's raw value is the *outer* component, with
//! `brace_depth == 0`. Every nested braced group has a brace depth one greater than the component
//! containing it. Quoted components do not increase the depth.
use crate::error::{Error, ErrorCode, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ComponentKind {
    Quoted,
    Braced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StringDatum {
    Text(String),
    Number(u64),
    MacroRef(String),
    Component(StringComponent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StringComponent {
    pub kind: ComponentKind,
    pub brace_depth: usize,
    pub data: Vec<StringDatum>,
}

/// The value of a field or macro: either a bare number, or an outer string component.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldValue {
    Number(u64),
    String(StringComponent),
}

impl StringDatum {
    pub fn text_from(s: &str) -> Self {
        StringDatum::Text(s.to_string())
    }

    pub fn macro_from(s: &str) -> Self {
        StringDatum::MacroRef(s.to_string())
    }
}

impl StringComponent {
    pub fn new(kind: ComponentKind, brace_depth: usize, data: Vec<StringDatum>) -> Self {
        Self {
            kind,
            brace_depth,
            data,
        }
    }

    /// An outer quoted component.
    pub fn quoted(data: Vec<StringDatum>) -> Self {
        Self::new(ComponentKind::Quoted, 0, data)
    }

    /// An outer braced component.
    pub fn braced(data: Vec<StringDatum>) -> Self {
        Self::new(ComponentKind::Braced, 0, data)
    }

    #[inline]
    pub fn is_outer(&self) -> bool {
        self.brace_depth == 0
    }

    /// Whether any macro reference remains anywhere in the tree.
    pub fn has_macro_refs(&self) -> bool {
        self.data.iter().any(|datum| match datum {
            StringDatum::MacroRef(_) => true,
            StringDatum::Component(inner) => inner.has_macro_refs(),
            StringDatum::Text(_) | StringDatum::Number(_) => false,
        })
    }

    /// Flatten the tree into plain text. Delimiters are not included: the text of every datum is
    /// concatenated in order, with numbers in decimal form.
    ///
    /// Fails if a macro reference is still present, since references cannot be resolved at this
    /// layer.
    pub fn stringify(&self) -> Result<String> {
        let mut buf = String::new();
        self.stringify_into(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn stringify_into(&self, buf: &mut String) -> Result<()> {
        for datum in &self.data {
            match datum {
                StringDatum::Text(s) => buf.push_str(s),
                StringDatum::Number(n) => buf.push_str(&n.to_string()),
                StringDatum::MacroRef(name) => {
                    return Err(Error::new(ErrorCode::UnresolvedReference(name.clone())));
                }
                StringDatum::Component(inner) => inner.stringify_into(buf)?,
            }
        }
        Ok(())
    }
}

impl FieldValue {
    pub fn stringify(&self) -> Result<String> {
        match self {
            FieldValue::Number(n) => Ok(n.to_string()),
            FieldValue::String(component) => component.stringify(),
        }
    }

    pub fn has_macro_refs(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::String(component) => component.has_macro_refs(),
        }
    }

    /// Convert into a nested datum, as when substituting this value for a macro reference.
    ///
    /// The outer delimiters of a string value are not grouping braces, so the result is always a
    /// quoted component.
    pub(crate) fn into_datum(self) -> StringDatum {
        match self {
            FieldValue::Number(n) => StringDatum::Number(n),
            FieldValue::String(component) => StringDatum::Component(StringComponent::new(
                ComponentKind::Quoted,
                0,
                component.data,
            )),
        }
    }
}

impl From<StringComponent> for FieldValue {
    fn from(component: StringComponent) -> Self {
        FieldValue::String(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringify() {
        let value = StringComponent::braced(vec![
            StringDatum::text_from("On "),
            StringDatum::Component(StringComponent::new(
                ComponentKind::Braced,
                1,
                vec![
                    StringDatum::text_from("Computable"),
                    StringDatum::Component(StringComponent::new(
                        ComponentKind::Braced,
                        2,
                        vec![StringDatum::text_from(" Numbers")],
                    )),
                ],
            )),
            StringDatum::text_from(", "),
            StringDatum::Number(1936),
        ]);
        assert_eq!(value.stringify(), Ok("On Computable Numbers, 1936".to_string()));
        assert!(value.is_outer());
        assert!(!value.has_macro_refs());
    }

    #[test]
    fn test_stringify_unresolved() {
        let value = StringComponent::quoted(vec![
            StringDatum::text_from("a"),
            StringDatum::Component(StringComponent::quoted(vec![StringDatum::macro_from("b")])),
        ]);
        assert!(value.has_macro_refs());
        assert_eq!(
            value.stringify(),
            Err(Error::new(ErrorCode::UnresolvedReference("b".to_string())))
        );
    }

    #[test]
    fn test_into_datum() {
        assert_eq!(FieldValue::Number(7).into_datum(), StringDatum::Number(7));
        assert_eq!(
            FieldValue::String(StringComponent::braced(vec![StringDatum::text_from("x")]))
                .into_datum(),
            StringDatum::Component(StringComponent::quoted(vec![StringDatum::text_from("x")]))
        );
        assert_eq!(FieldValue::Number(7).stringify(), Ok("7".to_string()));
    }
}

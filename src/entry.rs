//! # Assembled entries
//!
//! An [`Entry`] is a publication record whose field values have been fully resolved: no macro
//! references remain, and name fields have been decomposed into an [`AuthorList`].
use std::fmt;

use unicase::UniCase;

use crate::author::AuthorList;
use crate::value::{ComponentKind, FieldValue, StringComponent, StringDatum};

/// A resolved field value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Field {
    Number(u64),
    Text(StringComponent),
    /// A name field, such as `author`.
    Authors(AuthorList),
}

impl From<FieldValue> for Field {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Number(n) => Field::Number(n),
            FieldValue::String(component) => Field::Text(component),
        }
    }
}

/// Write the text of `component`. Nested braced groups keep their braces with `keep_braces`; an
/// outer component nested by concatenation or substitution never does.
fn write_component(buf: &mut String, component: &StringComponent, keep_braces: bool) {
    for datum in &component.data {
        match datum {
            StringDatum::Text(s) => buf.push_str(s),
            StringDatum::Number(n) => buf.push_str(&n.to_string()),
            StringDatum::MacroRef(name) => buf.push_str(name),
            StringDatum::Component(inner) => {
                let braced =
                    keep_braces && inner.kind == ComponentKind::Braced && !inner.is_outer();
                if braced {
                    buf.push('{');
                }
                write_component(buf, inner, keep_braces);
                if braced {
                    buf.push('}');
                }
            }
        }
    }
}

fn write_value(buf: &mut String, value: &FieldValue, keep_braces: bool) {
    match value {
        FieldValue::Number(n) => buf.push_str(&n.to_string()),
        FieldValue::String(component) => write_component(buf, component, keep_braces),
    }
}

impl Field {
    /// The field flattened to plain text, with grouping braces removed.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        match self {
            Field::Number(n) => buf.push_str(&n.to_string()),
            Field::Text(component) => write_component(&mut buf, component, false),
            Field::Authors(list) => write_value(&mut buf, &list.value, false),
        }
        buf
    }

    /// The plain text with runs of whitespace collapsed to a single space, and trimmed.
    pub fn normalized(&self) -> String {
        self.text().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            Field::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_authors(&self) -> Option<&AuthorList> {
        match self {
            Field::Authors(list) => Some(list),
            _ => None,
        }
    }

    /// The field in BibTeX value syntax: numbers are bare, everything else is braced.
    fn write_bibtex(&self, buf: &mut String) {
        match self {
            Field::Number(n) => buf.push_str(&n.to_string()),
            Field::Text(component) => {
                buf.push('{');
                write_component(buf, component, true);
                buf.push('}');
            }
            Field::Authors(list) => {
                buf.push('{');
                write_value(buf, &list.value, true);
                buf.push('}');
            }
        }
    }
}

/// A publication record with resolved fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry {
    /// Lower-cased entry type, such as `article`.
    pub entry_type: String,
    /// The id, exactly as written.
    pub id: String,
    fields: Vec<(String, Field)>,
}

impl Entry {
    /// Field names are lower-cased on storage.
    pub fn new(entry_type: String, id: String, fields: Vec<(String, Field)>) -> Self {
        Self {
            entry_type,
            id,
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.to_lowercase(), field))
                .collect(),
        }
    }

    /// Look up a field by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        let name = UniCase::new(name);
        self.fields
            .iter()
            .find(|(key, _)| UniCase::new(key.as_str()) == name)
            .map(|(_, field)| field)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The fields in source order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The decomposed `author` field, if present.
    pub fn authors(&self) -> Option<&AuthorList> {
        self.get("author").and_then(Field::as_authors)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}{{{},", self.entry_type, self.id)?;
        let mut buf = String::new();
        for (name, field) in &self.fields {
            buf.clear();
            field.write_bibtex(&mut buf);
            write!(f, "\n  {name} = {buf},")?;
        }
        f.write_str("\n}")
    }
}

//! # Field requirements
//!
//! The fields which the standard BibTeX styles expect for each entry type. Requirements are
//! groups of alternatives: a group is satisfied when any one of its fields is present, so
//! `&["author", "editor"]` requires an author or an editor.
//!
//! Validation is advisory. [`validate`] reports each unsatisfied group as a [`MissingField`]
//! warning and never fails.
use std::fmt;

use crate::entry::Entry;

pub type FieldGroup = &'static [&'static str];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub required: &'static [FieldGroup],
    pub optional: &'static [FieldGroup],
}

macro_rules! requirements {
    ($( $name:ident: [$($req:expr),*] [$($opt:expr),*] );* $(;)?) => {
        $(
            static $name: Requirements = Requirements {
                required: &[$($req),*],
                optional: &[$($opt),*],
            };
        )*
    };
}

requirements! {
    ARTICLE: [&["author"], &["title"], &["journal"], &["year"]]
        [&["volume"], &["number"], &["pages"], &["month"], &["note"]];
    BOOK: [&["author", "editor"], &["title"], &["publisher"], &["year"]]
        [&["volume", "number"], &["series"], &["address"], &["edition"], &["month"], &["note"]];
    BOOKLET: [&["title"]]
        [&["author"], &["howpublished"], &["address"], &["month"], &["year"], &["note"]];
    INBOOK: [&["author", "editor"], &["title"], &["chapter", "pages"], &["publisher"], &["year"]]
        [&["volume", "number"], &["series"], &["type"], &["address"], &["edition"], &["month"],
         &["note"]];
    INCOLLECTION: [&["author"], &["title"], &["booktitle"], &["publisher"], &["year"]]
        [&["editor"], &["volume", "number"], &["series"], &["type"], &["chapter"], &["pages"],
         &["address"], &["edition"], &["month"], &["note"]];
    INPROCEEDINGS: [&["author"], &["title"], &["booktitle"], &["year"]]
        [&["editor"], &["volume", "number"], &["series"], &["pages"], &["address"], &["month"],
         &["organization"], &["publisher"], &["note"]];
    MANUAL: [&["title"]]
        [&["author"], &["organization"], &["address"], &["edition"], &["month"], &["year"],
         &["note"]];
    THESIS: [&["author"], &["title"], &["school"], &["year"]]
        [&["type"], &["address"], &["month"], &["note"]];
    MISC: []
        [&["author"], &["title"], &["howpublished"], &["month"], &["year"], &["note"]];
    PROCEEDINGS: [&["title"], &["year"]]
        [&["editor"], &["volume", "number"], &["series"], &["address"], &["month"],
         &["organization"], &["publisher"], &["note"]];
    TECHREPORT: [&["author"], &["title"], &["institution"], &["year"]]
        [&["type"], &["number"], &["address"], &["month"], &["note"]];
    UNPUBLISHED: [&["author"], &["title"], &["note"]]
        [&["month"], &["year"]];
}

/// The requirements for a (lower-case) entry type, or `None` for a non-standard type.
pub fn requirements(entry_type: &str) -> Option<&'static Requirements> {
    Some(match entry_type {
        "article" => &ARTICLE,
        "book" => &BOOK,
        "booklet" => &BOOKLET,
        "inbook" => &INBOOK,
        "incollection" => &INCOLLECTION,
        "conference" | "inproceedings" => &INPROCEEDINGS,
        "manual" => &MANUAL,
        "mastersthesis" | "phdthesis" => &THESIS,
        "misc" => &MISC,
        "proceedings" => &PROCEEDINGS,
        "techreport" => &TECHREPORT,
        "unpublished" => &UNPUBLISHED,
        _ => return None,
    })
}

/// A warning: an entry has none of the fields of a required group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub entry_id: String,
    pub entry_type: String,
    pub alternatives: FieldGroup,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} entry '{}' is missing ", self.entry_type, self.entry_id)?;
        match self.alternatives {
            [field] => write!(f, "required field '{field}'"),
            fields => {
                f.write_str("one of the fields ")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{field}'")?;
                }
                Ok(())
            }
        }
    }
}

/// Check `entry` against the requirements of its type.
pub fn validate(entry: &Entry) -> Vec<MissingField> {
    let Some(table) = requirements(&entry.entry_type) else {
        return Vec::new();
    };
    table
        .required
        .iter()
        .copied()
        .filter(|group| !group.iter().any(|field| entry.contains(field)))
        .map(|group| MissingField {
            entry_id: entry.id.clone(),
            entry_type: entry.entry_type.clone(),
            alternatives: group,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Field;

    fn entry(entry_type: &str, fields: &[&str]) -> Entry {
        Entry::new(
            entry_type.to_string(),
            "k".to_string(),
            fields
                .iter()
                .map(|name| (name.to_string(), Field::Number(1)))
                .collect(),
        )
    }

    #[test]
    fn test_article() {
        let warnings = validate(&entry("article", &["Author", "title"]));
        assert_eq!(
            warnings
                .iter()
                .map(|warning| warning.alternatives)
                .collect::<Vec<_>>(),
            vec![&["journal"], &["year"]]
        );
        assert_eq!(
            warnings[0].to_string(),
            "article entry 'k' is missing required field 'journal'"
        );
        assert!(validate(&entry("article", &["author", "title", "journal", "year"])).is_empty());
    }

    #[test]
    fn test_alternatives() {
        let warnings = validate(&entry("book", &["title", "publisher", "year"]));
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].to_string(),
            "book entry 'k' is missing one of the fields 'author', 'editor'"
        );
        assert!(validate(&entry("book", &["editor", "title", "publisher", "year"])).is_empty());
    }

    #[test]
    fn test_unknown_types() {
        assert!(validate(&entry("software", &[])).is_empty());
        assert!(validate(&entry("misc", &[])).is_empty());
        assert_eq!(requirements("phdthesis"), requirements("mastersthesis"));
        assert_eq!(validate(&entry("unpublished", &["author"])).len(), 2);
    }
}

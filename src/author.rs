//! # Author names
//!
//! Decomposes a resolved name field, such as `author`, into individual [`AuthorName`]s using the
//! BibTeX conventions. Names are separated by the word `and`, and each name is written in one of
//! three forms:
//!
//! | Form                 | Example                          |
//! |----------------------|----------------------------------|
//! | `First von Last`     | `Jean de La Fontaine`            |
//! | `von Last, First`    | `von Neumann, John`              |
//! | `von Last, Jr, First`| `King, Jr, Martin Luther`        |
//!
//! The `von` part is recognized by words starting with a lower-case letter. Braced groups are
//! opaque: they are never split on `and`, commas or whitespace, and their case is never
//! inspected, so `{Barnes and Noble}` is a single name and `{de} Gaulle` is not a `von`.
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, ErrorCode, Result};
use crate::value::{ComponentKind, FieldValue, StringComponent, StringDatum};

static AND_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+and\s+").unwrap());

/// A single decomposed name. Each slot holds the words of that part of the name, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuthorName {
    pub first_names: Vec<String>,
    pub vons: Vec<String>,
    pub last_names: Vec<String>,
    pub jrs: Vec<String>,
    /// The first character of each first name.
    pub initials: Vec<String>,
}

impl AuthorName {
    pub fn new(
        first_names: Vec<String>,
        vons: Vec<String>,
        last_names: Vec<String>,
        jrs: Vec<String>,
    ) -> Self {
        let initials = first_names
            .iter()
            .filter_map(|name| name.chars().next())
            .map(String::from)
            .collect();
        Self {
            first_names,
            vons,
            last_names,
            jrs,
            initials,
        }
    }

    /// A key identifying this name, used to detect the same person written the same way.
    pub fn identity_key(&self) -> String {
        [&self.first_names, &self.vons, &self.last_names, &self.jrs]
            .map(|slot| slot.join(" "))
            .join("|")
    }
}

impl fmt::Display for AuthorName {
    /// Formats as `First von Last, Jr`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = self
            .first_names
            .iter()
            .chain(&self.vons)
            .chain(&self.last_names);
        if let Some(word) = words.next() {
            f.write_str(word)?;
        }
        for word in words {
            write!(f, " {word}")?;
        }
        if !self.jrs.is_empty() {
            write!(f, ", {}", self.jrs.join(" "))?;
        }
        Ok(())
    }
}

/// A decomposed name field, together with the resolved value it was decomposed from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuthorList {
    pub value: FieldValue,
    pub names: Vec<AuthorName>,
}

impl AuthorList {
    pub fn parse(value: FieldValue) -> Result<Self> {
        let names = parse_author_list(&value)?;
        Ok(Self { value, names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuthorName> {
        self.names.iter()
    }
}

impl fmt::Display for AuthorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, name) in self.names.iter().enumerate() {
            if idx > 0 {
                f.write_str(" and ")?;
            }
            name.fmt(f)?;
        }
        Ok(())
    }
}

/// Flattened text, or a braced group which is kept whole.
#[derive(Debug, Clone, PartialEq)]
enum Piece<'a> {
    Text(String),
    Group(&'a StringComponent),
}

impl Piece<'_> {
    fn is_blank(&self) -> bool {
        matches!(self, Piece::Text(text) if text.trim().is_empty())
    }

    fn render_into(&self, buf: &mut String) -> Result<()> {
        match self {
            Piece::Text(text) => buf.push_str(text),
            Piece::Group(group) => group.stringify_into(buf)?,
        }
        Ok(())
    }
}

fn push_text(pieces: &mut Vec<Piece<'_>>, text: &str) {
    match pieces.last_mut() {
        Some(Piece::Text(last)) => last.push_str(text),
        _ => pieces.push(Piece::Text(text.to_string())),
    }
}

/// Inline quoted components and glue adjacent text, keeping braced groups whole.
fn flatten<'a>(component: &'a StringComponent, pieces: &mut Vec<Piece<'a>>) -> Result<()> {
    for datum in &component.data {
        match datum {
            StringDatum::Text(text) => push_text(pieces, text),
            StringDatum::Number(n) => push_text(pieces, &n.to_string()),
            StringDatum::MacroRef(name) => {
                return Err(Error::new(ErrorCode::UnresolvedReference(name.clone())));
            }
            StringDatum::Component(inner) => match inner.kind {
                ComponentKind::Quoted => flatten(inner, pieces)?,
                ComponentKind::Braced => pieces.push(Piece::Group(inner)),
            },
        }
    }
    Ok(())
}

/// Split a piece sequence into chunks, applying `split` to text pieces only.
fn split_pieces<'a, F>(pieces: &[Piece<'a>], split: F) -> Vec<Vec<Piece<'a>>>
where
    F: Fn(&str) -> Vec<&str>,
{
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => {
                for (idx, fragment) in split(text).into_iter().enumerate() {
                    if idx > 0 {
                        chunks.push(std::mem::take(&mut current));
                    }
                    if !fragment.is_empty() {
                        current.push(Piece::Text(fragment.to_string()));
                    }
                }
            }
            Piece::Group(_) => current.push(piece.clone()),
        }
    }
    chunks.push(current);
    chunks
}

type Word<'a> = Vec<Piece<'a>>;

fn words<'a>(part: &[Piece<'a>]) -> Vec<Word<'a>> {
    split_pieces(part, |text| text.split(char::is_whitespace).collect())
        .into_iter()
        .filter(|word| !word.is_empty())
        .collect()
}

/// Only a word starting with plain text can be lower-case.
fn is_lowercase(word: &Word) -> bool {
    matches!(
        word.first(),
        Some(Piece::Text(text)) if text.chars().next().is_some_and(char::is_lowercase)
    )
}

fn render_word(word: &[Piece]) -> Result<String> {
    let mut buf = String::new();
    for piece in word {
        piece.render_into(&mut buf)?;
    }
    Ok(buf)
}

fn render(words: &[Word]) -> Result<Vec<String>> {
    words.iter().map(|word| render_word(word)).collect()
}

/// Split `von Last`: the `von` part runs up to the last lower-case word.
fn von_last<'w, 'a>(words: &'w [Word<'a>]) -> (&'w [Word<'a>], &'w [Word<'a>]) {
    match words.iter().rposition(is_lowercase) {
        Some(end) => words.split_at(end + 1),
        None => (&[], words),
    }
}

fn parse_author(pieces: &[Piece<'_>]) -> Result<AuthorName> {
    let parts = split_pieces(pieces, |text| text.split(',').collect());
    let part_words: Vec<Vec<Word>> = parts.iter().map(|part| words(part)).collect();

    let (first, von, last, jr): (&[Word], &[Word], &[Word], &[Word]) =
        match part_words.as_slice() {
            blank if blank.iter().all(Vec::is_empty) => (&[], &[], &[], &[]),
            [words] => {
                let (init, tail) = words.split_at(words.len() - 1);
                match (
                    init.iter().position(is_lowercase),
                    init.iter().rposition(is_lowercase),
                ) {
                    (Some(start), Some(end)) => {
                        (&words[..start], &words[start..=end], &words[end + 1..], &[])
                    }
                    _ => (init, &[], tail, &[]),
                }
            }
            [von_last_part, first] => {
                let (von, last) = von_last(von_last_part);
                (first.as_slice(), von, last, &[])
            }
            [von_last_part, jr, first] => {
                let (von, last) = von_last(von_last_part);
                (first.as_slice(), von, last, jr.as_slice())
            }
            _ => (&[], &[], &[], &[]),
        };

    if first.is_empty() && von.is_empty() && last.is_empty() && jr.is_empty() {
        let parts = parts
            .iter()
            .map(|part| render_word(part).map(|text| text.trim().to_string()))
            .collect::<Result<Vec<String>>>()?;
        return Err(Error::new(ErrorCode::MalformedAuthorPartition { parts }));
    }

    Ok(AuthorName::new(
        render(first)?,
        render(von)?,
        render(last)?,
        render(jr)?,
    ))
}

/// Decompose a resolved name field into the names it lists.
///
/// An empty or blank field lists no names. Fails if a macro reference remains in the value, or if
/// a name has more than two commas or no words at all.
pub fn parse_author_list(value: &FieldValue) -> Result<Vec<AuthorName>> {
    let mut pieces = Vec::new();
    match value {
        FieldValue::Number(n) => pieces.push(Piece::Text(n.to_string())),
        FieldValue::String(component) => flatten(component, &mut pieces)?,
    }
    if pieces.iter().all(Piece::is_blank) {
        return Ok(Vec::new());
    }

    split_pieces(&pieces, |text| AND_SEPARATOR.split(text).collect())
        .iter()
        .map(|author| parse_author(author))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Node, RawEntry, parse};
    use crate::token::tokenize;

    /// Parse `input` as the value of a field.
    fn field_value(input: &str) -> FieldValue {
        let source = format!("@misc{{k, author = {input}}}");
        match parse(&tokenize(&source)).unwrap().remove(0) {
            Node::Entry(RawEntry::Bib(mut entry)) => entry.fields.remove(0).value,
            other => panic!("unexpected node {other:?}"),
        }
    }

    fn authors(input: &str) -> Result<Vec<AuthorName>> {
        parse_author_list(&field_value(input))
    }

    fn name(first: &[&str], von: &[&str], last: &[&str], jr: &[&str]) -> AuthorName {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        AuthorName::new(owned(first), owned(von), owned(last), owned(jr))
    }

    #[test]
    fn test_first_last() {
        assert_eq!(
            authors("\"Alan Turing\""),
            Ok(vec![name(&["Alan"], &[], &["Turing"], &[])])
        );
        assert_eq!(authors("{Turing}"), Ok(vec![name(&[], &[], &["Turing"], &[])]));
        assert_eq!(
            authors("{Jean de La Fontaine}"),
            Ok(vec![name(&["Jean"], &["de"], &["La", "Fontaine"], &[])])
        );
        assert_eq!(
            authors("{Ludwig van der Beethoven}"),
            Ok(vec![name(&["Ludwig"], &["van", "der"], &["Beethoven"], &[])])
        );
        // the last word is never part of the von
        assert_eq!(
            authors("{Alan turing}"),
            Ok(vec![name(&["Alan"], &[], &["turing"], &[])])
        );
    }

    #[test]
    fn test_commas() {
        assert_eq!(
            authors("\"von Neumann, John\""),
            Ok(vec![name(&["John"], &["von"], &["Neumann"], &[])])
        );
        assert_eq!(
            authors("{King, Jr, Martin Luther}"),
            Ok(vec![name(&["Martin", "Luther"], &[], &["King"], &["Jr"])])
        );
        assert_eq!(
            authors("{a, b, c, d}"),
            Err(Error::new(ErrorCode::MalformedAuthorPartition {
                parts: vec![
                    "a".to_string(),
                    "b".to_string(),
                    "c".to_string(),
                    "d".to_string()
                ]
            }))
        );
    }

    #[test]
    fn test_multiple() {
        let names = authors("\"Smith, J. and Doe, A.\"").unwrap();
        assert_eq!(
            names,
            vec![
                name(&["J."], &[], &["Smith"], &[]),
                name(&["A."], &[], &["Doe"], &[]),
            ]
        );
        assert_eq!(names[0].initials, vec!["J"]);
        // only whole, lower-case words separate names
        assert_eq!(authors("{Alexander Andrews And Sandy}").unwrap().len(), 1);
        assert!(matches!(
            authors("{ and B}"),
            Err(Error {
                code: ErrorCode::MalformedAuthorPartition { .. },
                ..
            })
        ));
        let err = authors("{A and , and B}").unwrap_err();
        assert_eq!(
            err,
            Error::new(ErrorCode::MalformedAuthorPartition {
                parts: vec![String::new(), String::new()]
            })
        );
        assert_eq!(err.to_string(), "author name has no words: [\"\", \"\"]");
        assert_eq!(authors("{  }"), Ok(vec![]));
        assert_eq!(authors("\"\""), Ok(vec![]));
    }

    #[test]
    fn test_braced_groups() {
        // groups are not split and their case is not inspected
        assert_eq!(
            authors("{{Barnes and Noble, Inc.}}"),
            Ok(vec![name(&[], &[], &["Barnes and Noble, Inc."], &[])])
        );
        assert_eq!(
            authors("{Charles {de} Gaulle}"),
            Ok(vec![name(&["Charles", "de"], &[], &["Gaulle"], &[])])
        );
        assert_eq!(
            authors("{{\\'E}mile Zola}"),
            Ok(vec![name(&["\\'Emile"], &[], &["Zola"], &[])])
        );
        // quoted macro values are inlined
        assert_eq!(
            parse_author_list(&FieldValue::String(StringComponent::quoted(vec![
                StringDatum::Component(StringComponent::quoted(vec![StringDatum::text_from(
                    "Ada "
                )])),
                StringDatum::text_from("Lovelace and Charles Babbage"),
            ]))),
            Ok(vec![
                name(&["Ada"], &[], &["Lovelace"], &[]),
                name(&["Charles"], &[], &["Babbage"], &[]),
            ])
        );
    }

    #[test]
    fn test_display() {
        let names = authors("{von Neumann, John and King, Jr, Martin}").unwrap();
        assert_eq!(names[0].to_string(), "John von Neumann");
        assert_eq!(names[1].to_string(), "Martin King, Jr");
        assert_eq!(names[0].identity_key(), "John|von|Neumann|");

        let list = AuthorList::parse(field_value("{Ada Lovelace and Alan Turing}")).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.to_string(), "Ada Lovelace and Alan Turing");
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(
            parse_author_list(&field_value("me")),
            Err(Error::new(ErrorCode::UnresolvedReference("me".to_string())))
        );
    }
}

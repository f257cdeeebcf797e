//! # Bibliography
//!
//! Assembles the top-level nodes of a file into a [`Bibliography`]: macros are collected and
//! resolved, preambles are joined, and every publication record is resolved into an [`Entry`].
//!
//! ```
//! use bibfile::Bibliography;
//!
//! let bibliography = Bibliography::parse(
//!     r#"@string{me = "Alan Turing"}
//!     @article{t1, author = me, title = "On Computable Numbers", year = 1936}"#,
//! )
//! .unwrap();
//!
//! let entry = bibliography.get_entry("T1").unwrap();
//! assert_eq!(entry.get("title").unwrap().text(), "On Computable Numbers");
//! assert_eq!(entry.authors().unwrap().names[0].last_names, vec!["Turing"]);
//! ```
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use log::debug;
use unicase::UniCase;

use crate::author::AuthorList;
use crate::entry::{Entry, Field};
use crate::error::{Error, ErrorCode, Result};
use crate::macros::{MacroResolver, MacroTable};
use crate::parse::{Node, RawBibEntry, RawEntry, parse_with_limit};
use crate::token::tokenize;
use crate::value::FieldValue;

/// Options for assembling a bibliography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    /// Predefine the month macros `jan` to `dec`.
    pub month_macros: bool,
    /// Fields decomposed into author names. Matched case-insensitively.
    pub name_fields: Vec<String>,
    /// Limit on brace nesting, and on the length of macro reference chains.
    pub max_depth: Option<usize>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            month_macros: false,
            name_fields: vec!["author".to_string()],
            max_depth: None,
        }
    }
}

impl ParseConfig {
    fn is_name_field(&self, name: &str) -> bool {
        let name = UniCase::new(name);
        self.name_fields
            .iter()
            .any(|field| UniCase::new(field.as_str()) == name)
    }
}

/// Free text which is not part of any entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Comment {
    /// Text between entries.
    NonEntry(String),
    /// The body of a `@comment` block.
    Block(String),
}

impl Comment {
    pub fn text(&self) -> &str {
        match self {
            Comment::NonEntry(text) | Comment::Block(text) => text,
        }
    }
}

/// A fully assembled file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bibliography {
    content: Vec<Node>,
    comments: Vec<Comment>,
    entries: Vec<Entry>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<UniCase<String>, usize>,
    macros: MacroTable,
    resolved_macros: MacroTable,
    preamble: String,
}

impl Bibliography {
    /// Parse and assemble `input` with the default configuration.
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with(input, &ParseConfig::default())
    }

    pub fn parse_with(input: &str, config: &ParseConfig) -> Result<Self> {
        let tokens = tokenize(input);
        let nodes = parse_with_limit(&tokens, config.max_depth)?;
        Self::from_nodes(nodes, config)
    }

    /// Assemble parsed nodes.
    ///
    /// Fails if two macros share a name, if two publication records share an id (ignoring
    /// case), or if any macro or field value cannot be resolved.
    pub fn from_nodes(nodes: Vec<Node>, config: &ParseConfig) -> Result<Self> {
        let mut macros = MacroTable::default();
        let mut comments = Vec::new();
        let mut preambles = Vec::new();
        let mut records = Vec::new();

        for node in &nodes {
            match node {
                Node::NonEntry(text) => comments.push(Comment::NonEntry(text.clone())),
                Node::Entry(RawEntry::Comment(text)) => comments.push(Comment::Block(text.clone())),
                Node::Entry(RawEntry::Preamble(text)) => preambles.push(text.as_str()),
                Node::Entry(RawEntry::Macro(fields)) => {
                    for field in fields {
                        macros.insert(field.key.clone(), field.value.clone())?;
                    }
                }
                Node::Entry(RawEntry::Bib(record)) => records.push(record),
            }
        }
        if config.month_macros {
            macros.set_month_macros();
        }
        let preamble = preambles.join("\n");

        let mut resolver = MacroResolver::new(&macros).with_max_depth(config.max_depth);
        resolver.resolve_all()?;

        let mut entries = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            match index.entry(UniCase::new(record.id.clone())) {
                MapEntry::Occupied(_) => {
                    return Err(Error::new(ErrorCode::DuplicateEntry(record.id.clone())));
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(entries.len());
                }
            }
            entries.push(assemble_entry(record, &mut resolver, config)?);
        }
        let resolved_macros = resolver.finish();

        debug!(
            "assembled {} entries, {} macros, {} comments and {} preambles",
            entries.len(),
            macros.len(),
            comments.len(),
            preambles.len()
        );

        Ok(Self {
            content: nodes,
            comments,
            entries,
            index,
            macros,
            resolved_macros,
            preamble,
        })
    }

    /// The top-level nodes, in source order.
    pub fn content(&self) -> &[Node] {
        &self.content
    }

    /// Free text between entries and `@comment` bodies, in source order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Publication records, in source order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Look up a publication record by case-insensitive id.
    pub fn get_entry(&self, id: &str) -> Option<&Entry> {
        self.index
            .get(&UniCase::new(id.to_string()))
            .map(|idx| &self.entries[*idx])
    }

    /// All preamble texts, joined with newlines.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Macros as defined, before resolution.
    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn resolved_macros(&self) -> &MacroTable {
        &self.resolved_macros
    }

    pub fn resolved_macro(&self, name: &str) -> Option<&FieldValue> {
        self.resolved_macros.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Bibliography {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Resolve every field of a publication record.
fn assemble_entry(
    record: &RawBibEntry,
    resolver: &mut MacroResolver,
    config: &ParseConfig,
) -> Result<Entry> {
    let mut fields = Vec::with_capacity(record.fields.len());
    for raw in &record.fields {
        let value = resolver.resolve_value(&raw.value)?;
        let field = if config.is_name_field(&raw.key) {
            Field::Authors(AuthorList::parse(value)?)
        } else {
            Field::from(value)
        };
        fields.push((raw.key.clone(), field));
    }
    Ok(Entry::new(
        record.entry_type.clone(),
        record.id.clone(),
        fields,
    ))
}

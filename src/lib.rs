//! # bibfile
//!
//! A parser for BibTeX databases. Parsing runs in stages, each of which is also available on its
//! own:
//!
//! 1. [`tokenize`] splits the source text into [`Token`]s.
//! 2. [`parse::parse`] matches the tokens against the grammar, producing the top-level
//!    [`Node`]s of the file. See the [`syntax`] module for the grammar.
//! 3. [`macros::resolve_all`] resolves the `@string` macros of the file.
//! 4. [`Bibliography::from_nodes`] assembles the nodes, resolving every field of every entry and
//!    decomposing name fields with [`author::parse_author_list`].
//!
//! [`Bibliography::parse`] runs the whole pipeline.
//! ```
//! use bibfile::Bibliography;
//!
//! let bibliography = Bibliography::parse(
//!     r#"@article{neumann, author = "von Neumann, John", year = 1945}"#,
//! )
//! .unwrap();
//!
//! let author = &bibliography.entries()[0].authors().unwrap().names[0];
//! assert_eq!(author.vons, vec!["von"]);
//! assert_eq!(author.to_string(), "John von Neumann");
//! ```
//!
//! Field requirements of the standard entry types can be checked with
//! [`requirements::validate`].
pub mod author;
pub mod bibliography;
pub mod entry;
pub mod macros;
pub mod parse;
pub mod requirements;
pub mod syntax;
pub mod token;
pub mod value;

/// Error types for parsing and assembly.
pub mod error;

// re-exports
pub use author::{AuthorList, AuthorName};
pub use bibliography::{Bibliography, Comment, ParseConfig};
pub use entry::{Entry, Field};
pub use error::{Error, ErrorCode, Result};
pub use macros::MacroTable;
pub use parse::Node;
pub use token::{Token, tokenize};
pub use value::{ComponentKind, FieldValue, StringComponent, StringDatum};

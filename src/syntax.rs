//! # Description of the bibliography syntax
//! The goal of this module is to give an explicit description of the grammar accepted by this
//! crate. For other grammars, see for example the [btparse
//! documentation](https://metacpan.org/dist/Text-BibTeX/view/btparse/doc/btparse.pod).
//!
//! The grammar is given in [pest](https://pest.rs) notation. With the `syntax` feature enabled,
//! the same grammar is available as [`BibfileParser`], which can be used to check whether a file
//! is accepted without building any values.
//!
//! ## Structure of a bibliography
//! ### Whitespace and special characters
//! 1. Whitespace is any Unicode whitespace character.
//!    ```ignore
//!    ign = _{ WHITE_SPACE* }
//!    ```
//! 2. The special characters are `@(){}#=,\"`. Each special character is a token of its own.
//!    ```ignore
//!    special = _{ "@" | "(" | ")" | "{" | "}" | "#" | "=" | "," | "\\" | "\"" }
//!    ```
//!
//! ### Identifiers
//! 1. An identifier is a run of characters which are neither special characters, ASCII digits,
//!    nor whitespace. A number is a run of ASCII digits.
//!    ```ignore
//!    identifier = @{ (!(special | ASCII_DIGIT | WHITE_SPACE) ~ ANY)+ }
//!    number = @{ ASCII_DIGIT+ }
//!    ```
//! 2. Entry ids and field keys are any run of identifiers and numbers. A variable, used to
//!    reference a macro, must not begin with a digit, so that it can be distinguished from a
//!    number.
//!    ```ignore
//!    key = @{ (identifier | number)+ }
//!    variable = @{ identifier ~ (identifier | number)* }
//!    ```
//! 3. An entry type is any non-empty run of characters which are neither special characters nor
//!    whitespace. Entry types are case-insensitive.
//!    ```ignore
//!    entry_type = @{ (!(special | WHITE_SPACE) ~ ANY)+ }
//!    ```
//!
//! ### Field values
//! 1. A braced token is a sequence of characters such that the brackets `{}` are balanced.
//!    ```ignore
//!    balanced = _{ "{" ~ balanced* ~ "}" | (!("{" | "}") ~ ANY) }
//!    token_curly = @{ balanced* }
//!    ```
//! 2. A quoted token is a sequence of characters delimited by `"`, such that the brackets `{}` are
//!    balanced. The closing `"` must not be captured within any brackets `{}`. `\"` is an
//!    escaped quote and `\\` an escaped backslash, so `"C:\\"` ends at its last quote.
//!    ```ignore
//!    quoted = _{ "\\\\" | "\\\"" | "{" ~ balanced* ~ "}" | (!("{" | "}" | "\"") ~ ANY) }
//!    token_quoted = @{ quoted* }
//!    ```
//! 3. A segment is a number, a braced or quoted token, or a variable.
//!    ```ignore
//!    segment = _{ number | "{" ~ token_curly ~ "}" | "\"" ~ token_quoted ~ "\"" | variable }
//!    ```
//! 4. A value is a sequence of segments delimited by `#`, separated possibly by whitespace.
//!    ```ignore
//!    value = { segment ~ (ign ~ "#" ~ ign ~ segment)* }
//!    field = { key ~ ign ~ "=" ~ ign ~ value }
//!    ```
//!
//! ### Comment and preamble entries
//! 1. The body of a comment or preamble entry is balanced text. A body delimited by round brackets
//!    is terminated by the first `)` which closes it, counting both kinds of brackets; a `}` with no
//!    matching `{` is an error.
//!    ```ignore
//!    round = _{ "{" ~ balanced* ~ "}" | "(" ~ round* ~ ")" | (!("{" | "}" | "(" | ")") ~ ANY) }
//!    token_round = @{ round* }
//!    text_body = _{ "{" ~ token_curly ~ "}" | "(" ~ token_round ~ ")" }
//!    entry_comment = { ^"comment" ~ ign ~ text_body }
//!    entry_preamble = { ^"preamble" ~ ign ~ text_body }
//!    ```
//!
//! ### Macro entry
//! 1. A macro entry consists of one or more fields, separated by commas, with an optional
//!    trailing comma.
//!    ```ignore
//!    string_contents = _{ ign ~ field ~ ign ~ ("," ~ ign ~ field ~ ign)* ~ ("," ~ ign)? }
//!    entry_macro = { ^"string" ~ ign ~ ("{" ~ string_contents ~ "}" | "(" ~ string_contents ~ ")") }
//!    ```
//!
//! ### Regular entry
//! 1. A regular entry consists of an entry id, followed by a list of fields (possibly none), each
//!    preceded by a comma, followed by an optional trailing comma.
//!    ```ignore
//!    bib_contents = _{ ign ~ key ~ ign ~ ("," ~ ign ~ field ~ ign)* ~ ("," ~ ign)? }
//!    entry_regular = { entry_type ~ ign ~ ("{" ~ bib_contents ~ "}" | "(" ~ bib_contents ~ ")") }
//!    ```
//!
//! ### Bibliography
//! 1. An entry is any one of the above cases (comment, preamble, macro, or regular) preceded by an
//!    `@` symbol.
//!    ```ignore
//!    entry = { "@" ~ ign ~ (entry_comment | entry_preamble | entry_macro | entry_regular) }
//!    ```
//! 2. Text outside of entries is kept as free text. Within free text, `\\` is an escaped backslash,
//!    and a backslash before an entry makes the whole entry free text.
//!    ```ignore
//!    entry_start = _{ "@" ~ ign ~ entry_type ~ ign ~ ("{" | "(") }
//!    escaped_entry = _{ "\\" ~ "@" ~ ign ~ entry_type ~ ign ~ text_body }
//!    junk = _{ ("\\\\" | escaped_entry | !entry_start ~ ANY)* }
//!    ```
//! 3. A bibliography is a possibly empty list of entries, separated by free text.
//!    ```ignore
//!    bib = _{ SOI ~ junk ~ (entry ~ junk)* ~ EOI }
//!    ```
//!
//! ## Grammar comparisons
//!
//! ### Differences from bibtex
//! 1. Bibtex does not capture `@comment` bodies: upon reading an `@comment` entry, it immediately
//!    resets and applies junk parsing. Here the body of a comment is balanced text, so
//!    ```bib
//!    @comment{@article}
//!    ```
//!    is a single comment rather than a parse error.
//! 2. Bibtex has no escape for `@` in free text.
//! 3. A braced token may appear in a `#` concatenation, as in `{Text} # var`.
//!
//! ### Differences from biber
//! 1. `%` does not begin a comment.
//! 2. A closing `)` inside braces does not terminate a comment delimited by round brackets.
//! 3. The entry type of an escaped entry may itself contain backslash escapes, which are not
//!    described by the grammar above.
#[cfg(feature = "syntax")]
use pest_derive::Parser;

/// A simple automatically derived pest parser.
#[cfg(feature = "syntax")]
#[derive(Parser)]
#[grammar = "syntax/bibfile.pest"] // relative to src
pub struct BibfileParser;

#[cfg(all(test, feature = "syntax"))]
mod tests {
    use super::*;
    use pest::Parser;

    #[test]
    fn test_parse() {
        let input = r#"
            Junk text with mail@host and \@book{escaped} and \\.
            @article (2:k,
               et= { Text} #
                1234,
            )
            @article {??,1={T} # var,}
            @article {??,1={T} # var,title = "{"}"}
            @a{k}
            @string{k=1234}
            @string{k=1 # {Text} # var,}
            @comment{{bal}{anced@@@}}
            @comment(a (b) {)} c)
            @preamble{ {Text} # expand # {"}}
        "#;

        assert!(BibfileParser::parse(Rule::bib, input).is_ok());
    }

    #[test]
    fn test_reject() {
        for input in [
            "@article{k, title = {x}",
            "@string{}",
            "@article{k, title {x}}",
            "@article{k, title = \"a } b\"}",
            "@comment(a})",
        ] {
            assert!(BibfileParser::parse(Rule::bib, input).is_err(), "{input}");
        }
    }

    #[test]
    fn test_agrees_with_parser() {
        let inputs = [
            "@misc{k, year = 1936 # jan2}",
            "@misc(k, a = \"G\\\"odel\",)",
            "@ STRING { a = {A} }",
            "no entries at all",
            r#"@misc{k, path = "C:\\", title = {x}}"#,
        ];
        for input in inputs {
            let parsed = crate::parse::parse(&crate::token::tokenize(input));
            assert_eq!(
                BibfileParser::parse(Rule::bib, input).is_ok(),
                parsed.is_ok(),
                "{input}"
            );
        }
    }
}

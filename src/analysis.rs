//! Auxiliary symbol-location analysis.
//!
//! Computes hover metadata for the presentation layer: where each
//! identifier occurs in the visualized source. This is a lexical pass, not
//! an interpretation of the program: comment text and string-literal
//! contents are excluded, while attribute positions (`d1.status`) are
//! included because they are exactly what hover highlighting lights up.
//!
//! The analyzer receives source text only. It never sees or mutates
//! [`crate::state::ProgramState`].

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

fn ident_regex() -> &'static Regex {
    IDENT_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern is valid")
    })
}

/// Python keywords, excluded from the index.
const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield", "None", "True", "False",
];

/// String-literal prefixes; an identifier directly followed by a quote is
/// one of these, not a name.
const STRING_PREFIXES: &[&str] = &["f", "r", "b", "u", "rb", "br", "fr", "rf"];

/// One occurrence of a symbol in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolLocation {
    /// 1-based source line.
    pub line: usize,
    /// 0-based byte column of the first character.
    pub column: usize,
    /// Length of the occurrence in bytes.
    pub length: usize,
}

/// Symbol-occurrence index over a source listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolIndex {
    locations: HashMap<String, Vec<SymbolLocation>>,
}

impl SymbolIndex {
    /// Scans the text and records every identifier occurrence outside
    /// comments and string literals.
    #[must_use]
    pub fn scan(text: &str) -> Self {
        let mut locations: HashMap<String, Vec<SymbolLocation>> = HashMap::new();

        for (line_idx, line) in text.lines().enumerate() {
            let code = code_portion(line);
            for m in ident_regex().find_iter(code) {
                let name = m.as_str();
                if KEYWORDS.contains(&name) {
                    continue;
                }
                if skip_match(name, code, m.end()) {
                    continue;
                }
                locations.entry(name.to_string()).or_default().push(SymbolLocation {
                    line: line_idx + 1,
                    column: m.start(),
                    length: m.len(),
                });
            }
        }

        Self { locations }
    }

    /// Every recorded occurrence of a symbol, in source order.
    #[must_use]
    pub fn locations_for(&self, name: &str) -> &[SymbolLocation] {
        self.locations.get(name).map_or(&[], Vec::as_slice)
    }

    /// True when the symbol occurs at least once.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Number of distinct symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.locations.len()
    }

    /// The distinct symbol names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }
}

/// The code part of one line: everything up to a `#` that is not inside a
/// string literal. Matches that land inside string literals are filtered
/// out separately by [`in_string_at`].
fn code_portion(line: &str) -> &str {
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        match in_string {
            Some(quote) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    in_string = None;
                }
            }
            None => match ch {
                '#' => return &line[..idx],
                '"' | '\'' => in_string = Some(ch),
                _ => {}
            },
        }
    }
    line
}

/// True for matches to skip: occurrences inside string literals, and
/// identifiers that are really string prefixes (`f"..."`).
fn skip_match(name: &str, code: &str, match_end: usize) -> bool {
    if !STRING_PREFIXES.contains(&name) {
        return in_string_at(code, match_end);
    }
    matches!(code.as_bytes().get(match_end), Some(b'"' | b'\''))
        || in_string_at(code, match_end)
}

/// True when the byte offset falls inside a string literal of `code`.
fn in_string_at(code: &str, offset: usize) -> bool {
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in code.char_indices() {
        if idx >= offset {
            break;
        }
        match in_string {
            Some(quote) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == quote {
                    in_string = None;
                }
            }
            None => {
                if ch == '"' || ch == '\'' {
                    in_string = Some(ch);
                }
            }
        }
    }
    in_string.is_some()
}

//! Per-language comment syntax for cell-option lines

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a language writes the comments that carry cell options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentSyntax {
    /// Line comments; options look like `#| key: value`
    Line(String),
    /// Block comments; options look like `/*| key: value */` and must carry
    /// the closing token on every line
    Block { prefix: String, suffix: String },
}

impl CommentSyntax {
    pub fn line(prefix: impl Into<String>) -> Self {
        CommentSyntax::Line(prefix.into())
    }

    pub fn block(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        CommentSyntax::Block {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// The marker an option line must start with, e.g. `#| `
    pub fn option_prefix(&self) -> String {
        let comment = match self {
            CommentSyntax::Line(prefix) => prefix,
            CommentSyntax::Block { prefix, .. } => prefix,
        };
        format!("{comment}| ")
    }

    /// The closing token an option line must end with, if any
    pub fn option_suffix(&self) -> Option<&str> {
        match self {
            CommentSyntax::Line(_) => None,
            CommentSyntax::Block { suffix, .. } => Some(suffix),
        }
    }
}

/// Comment syntax by language identifier.
///
/// `Default` carries the stock table below; callers may register additional
/// languages with [`CommentSyntaxTable::insert`]. Lookups for unknown
/// languages fall back to `#` line comments with no diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSyntaxTable {
    languages: HashMap<String, CommentSyntax>,
}

const LINE_COMMENT_LANGUAGES: &[(&str, &str)] = &[
    ("r", "#"),
    ("python", "#"),
    ("julia", "#"),
    ("scala", "//"),
    ("matlab", "%"),
    ("csharp", "//"),
    ("fsharp", "//"),
    ("powershell", "#"),
    ("bash", "#"),
    ("sql", "--"),
    ("mysql", "--"),
    ("psql", "--"),
    ("lua", "--"),
    ("cpp", "//"),
    ("cc", "//"),
    ("stan", "#"),
    ("octave", "#"),
    ("fortran", "!"),
    ("fortran95", "!"),
    ("awk", "#"),
    ("gawk", "#"),
    ("stata", "*"),
    ("java", "//"),
    ("groovy", "//"),
    ("sed", "#"),
    ("perl", "#"),
    ("ruby", "#"),
    ("tikz", "%"),
    ("js", "//"),
    ("d3", "//"),
    ("node", "//"),
    ("sass", "//"),
    ("coffee", "#"),
    ("go", "//"),
    ("asy", "//"),
    ("haskell", "--"),
    ("dot", "//"),
    ("ojs", "//"),
];

const BLOCK_COMMENT_LANGUAGES: &[(&str, &str, &str)] =
    &[("c", "/*", "*/"), ("css", "/*", "*/"), ("sas", "*", ";")];

impl Default for CommentSyntaxTable {
    fn default() -> Self {
        let mut table = CommentSyntaxTable {
            languages: HashMap::new(),
        };
        for (language, prefix) in LINE_COMMENT_LANGUAGES {
            table.insert(*language, CommentSyntax::line(*prefix));
        }
        for (language, prefix, suffix) in BLOCK_COMMENT_LANGUAGES {
            table.insert(*language, CommentSyntax::block(*prefix, *suffix));
        }
        table
    }
}

impl CommentSyntaxTable {
    /// A table with no languages registered; everything falls back to `#`
    pub fn empty() -> Self {
        CommentSyntaxTable {
            languages: HashMap::new(),
        }
    }

    /// Register (or replace) the comment syntax for a language
    pub fn insert(&mut self, language: impl Into<String>, syntax: CommentSyntax) {
        self.languages.insert(language.into(), syntax);
    }

    /// Comment syntax for `language`, defaulting unknown languages to `#`
    /// line comments
    pub fn lookup(&self, language: &str) -> CommentSyntax {
        self.languages
            .get(language)
            .cloned()
            .unwrap_or_else(|| CommentSyntax::line("#"))
    }
}

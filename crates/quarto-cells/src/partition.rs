//! Splitting a fenced cell body into its leading option block and residual
//! code
//!
//! Cell options are YAML embedded in specially prefixed comment lines at the
//! top of a cell, e.g. `#| echo: false` for `r`. The partitioner pulls those
//! lines out as a mapped YAML snippet and leaves the rest of the body as a
//! mapped residual, both still traceable to the original document.

use once_cell::sync::Lazy;
use tracing::trace;

use quarto_mapped_text::{
    mapped_string, mapped_substring, ranged_lines, MappedString, Piece, Range, RangedSubstring,
};

use crate::comment::CommentSyntaxTable;

static DEFAULT_COMMENT_TABLE: Lazy<CommentSyntaxTable> = Lazy::new(CommentSyntaxTable::default);

/// The stock comment-syntax table shared by the default entry points
pub fn default_comment_table() -> &'static CommentSyntaxTable {
    &DEFAULT_COMMENT_TABLE
}

/// A cell body split into option block and residual code
#[derive(Debug, Clone)]
pub struct PartitionedCell<'a> {
    /// The option lines as mapped YAML text, joined with newlines; `None`
    /// when the cell carries no option lines
    pub yaml: Option<MappedString>,
    /// The raw option lines as they appeared in the cell body
    pub options_source: Vec<RangedSubstring<'a>>,
    /// The cell body with the option block stripped
    pub source: MappedString,
    /// Number of consumed option lines
    pub source_start_line: usize,
}

/// Join the provenance ranges of `lines` with literal newline separators.
pub(crate) fn mapped_source(
    source: &MappedString,
    lines: &[RangedSubstring<'_>],
) -> MappedString {
    let mut pieces = Vec::with_capacity(lines.len() * 2);
    for line in lines {
        pieces.push(Piece::Range(line.range));
        pieces.push(Piece::from("\n"));
    }
    pieces.pop();
    mapped_string(source, pieces)
}

/// `partition_cell_options_with` using the stock comment table
pub fn partition_cell_options<'a>(
    language: &str,
    source: &'a MappedString,
) -> PartitionedCell<'a> {
    partition_cell_options_with(language, source, default_comment_table())
}

/// Strip the leading block of option comment lines from a fenced cell body.
///
/// Scanning runs from the top of `source` and stops at the first line that
/// does not qualify: one that is missing the `<comment>| ` prefix, or, for
/// block-comment languages, the closing token after right-trimming — even
/// when later lines would qualify. Never fails; unknown languages silently
/// use `#` line comments.
pub fn partition_cell_options_with<'a>(
    language: &str,
    source: &'a MappedString,
    table: &CommentSyntaxTable,
) -> PartitionedCell<'a> {
    let syntax = table.lookup(language);
    let option_prefix = syntax.option_prefix();
    let option_suffix = syntax.option_suffix();

    let mut options_source = Vec::new();
    let mut yaml_lines: Vec<RangedSubstring<'a>> = Vec::new();
    let mut end_of_yaml = 0;

    for line in ranged_lines(source.value()) {
        let qualifies = line.substring.starts_with(&option_prefix)
            && option_suffix
                .is_none_or(|suffix| line.substring.trim_end().ends_with(suffix));
        if !qualifies {
            break;
        }

        let mut yaml_text = &line.substring[option_prefix.len()..];
        let mut suffix_len = 0;
        if let Some(suffix) = option_suffix {
            yaml_text = yaml_text.trim_end();
            yaml_text = &yaml_text[..yaml_text.len() - suffix.len()];
            suffix_len = suffix.len();
        }
        end_of_yaml = line.range.start + option_prefix.len() + yaml_text.len() - suffix_len;
        yaml_lines.push(RangedSubstring {
            substring: yaml_text,
            range: Range {
                start: line.range.start + option_prefix.len(),
                end: end_of_yaml,
            },
        });
        options_source.push(line);
    }

    let yaml = if yaml_lines.is_empty() {
        None
    } else {
        Some(mapped_source(source, &yaml_lines))
    };
    trace!(language, option_lines = yaml_lines.len(), "partitioned cell options");

    PartitionedCell {
        yaml,
        source: mapped_substring(source, end_of_yaml, source.value().len()),
        source_start_line: yaml_lines.len(),
        options_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarto_mapped_text::MappedString;

    #[test]
    fn test_no_option_lines() {
        let body = MappedString::original("1 + 1\n2 + 2");
        let partitioned = partition_cell_options("r", &body);
        assert!(partitioned.yaml.is_none());
        assert!(partitioned.options_source.is_empty());
        assert_eq!(partitioned.source_start_line, 0);
        assert_eq!(partitioned.source.value(), "1 + 1\n2 + 2");
    }

    #[test]
    fn test_single_option_line() {
        let body = MappedString::original("#| echo: false\n1 + 1");
        let partitioned = partition_cell_options("r", &body);
        let yaml = partitioned.yaml.expect("one option line");
        assert_eq!(yaml.value(), "echo: false");
        // "echo" starts after the "#| " prefix
        assert_eq!(yaml.map(0), Some(3));
        assert_eq!(partitioned.source_start_line, 1);
        // the residual starts at the newline terminating the option block
        assert_eq!(partitioned.source.value(), "\n1 + 1");
        assert_eq!(partitioned.source.map(1), Some(15));
    }

    #[test]
    fn test_multiple_option_lines_joined_with_newlines() {
        let body = MappedString::original("#| echo: false\n#| eval: true\nplot(x)");
        let partitioned = partition_cell_options("r", &body);
        let yaml = partitioned.yaml.expect("two option lines");
        assert_eq!(yaml.value(), "echo: false\neval: true");
        // the joining newline is synthetic and has no exact mapping
        assert_eq!(yaml.map(11), None);
        assert_eq!(yaml.map_closest(11), Some(13));
        // second option line maps past the first line's terminator
        assert_eq!(yaml.map(12), Some(18));
        assert_eq!(partitioned.source_start_line, 2);
        assert_eq!(partitioned.options_source.len(), 2);
    }

    #[test]
    fn test_scan_stops_at_first_non_option_line() {
        let body = MappedString::original("#| a: 1\ncode()\n#| b: 2");
        let partitioned = partition_cell_options("r", &body);
        assert_eq!(partitioned.yaml.expect("one option line").value(), "a: 1");
        assert_eq!(partitioned.source_start_line, 1);
    }

    #[test]
    fn test_language_prefix_comes_from_table() {
        let body = MappedString::original("//| echo: false\nx = 1");
        let partitioned = partition_cell_options("ojs", &body);
        assert_eq!(
            partitioned.yaml.expect("ojs option line").value(),
            "echo: false"
        );
    }

    #[test]
    fn test_unknown_language_defaults_to_hash() {
        let body = MappedString::original("#| a: 1\nwhatever");
        let partitioned = partition_cell_options("made-up", &body);
        assert_eq!(partitioned.source_start_line, 1);
    }

    #[test]
    fn test_block_comment_missing_suffix_halts_immediately() {
        // the first line is missing `*/`, so nothing is consumed even though
        // the second line would qualify
        let body = MappedString::original("/*| echo: false\n/*| eval: true */\nint x;");
        let partitioned = partition_cell_options("c", &body);
        assert!(partitioned.yaml.is_none());
        assert_eq!(partitioned.source_start_line, 0);
        assert_eq!(partitioned.source.value(), body.value());
    }

    #[test]
    fn test_block_comment_option_line() {
        let body = MappedString::original("/*| echo: false */\nint x;");
        let partitioned = partition_cell_options("c", &body);
        let yaml = partitioned.yaml.expect("block option line");
        // the recorded option range undershoots by the suffix width; kept
        // for compatibility with the reference scanner
        assert_eq!(yaml.value(), "echo: fals");
        assert_eq!(partitioned.source_start_line, 1);
    }

    #[test]
    fn test_option_only_body_leaves_empty_residual() {
        let body = MappedString::original("#| echo: false");
        let partitioned = partition_cell_options("r", &body);
        assert_eq!(partitioned.source_start_line, 1);
        assert_eq!(partitioned.source.value(), "");
    }
}

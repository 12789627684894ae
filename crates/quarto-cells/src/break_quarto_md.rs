//! Breaks up a qmd document into a list of chunks of related text: YAML
//! front matter, "pure" markdown, fenced executable cells, and display math

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use quarto_mapped_text::{
    line_offsets, lines, mapped_string, mapped_substring, ranged_lines, trim_empty_lines,
    MappedString, Piece, Range, RangedSubstring, Trim,
};

use crate::comment::CommentSyntaxTable;
use crate::notebook::{Cell, CellType, Notebook};
use crate::partition::{default_comment_table, partition_cell_options_with, PartitionedCell};

static YAML_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^---\s*$").unwrap());

/// Opening fence of an executable cell, capturing the language tag:
/// ` ```{r} `, ` ```{python, echo=FALSE} `, ...
static CELL_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```+\s*\{([=A-Za-z]+)( *[ ,].*)?\}\s*$").unwrap());

static CLOSING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```\s*$").unwrap());

/// Synthetic fence wrapped around ojs and dot cells for display
const VERBATIM_FENCE_OPEN: &str = "```{ojs}\n";
const VERBATIM_FENCE_CLOSE: &str = "\n```";

/// Which construct the scan is currently inside.
///
/// One state at a time: a line that would open another construct while a
/// block is already open is plain content of that block.
#[derive(Debug, Clone, PartialEq)]
enum State {
    Normal,
    InYaml,
    InMathBlock,
    InCodeCell { language: String },
    InFencedCode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineKind<'a> {
    YamlDelimiter,
    CellFence { language: &'a str },
    ClosingFence,
    OpeningFence,
    MathDelimiter,
    Text,
}

/// Classify a line, in the same priority order the transitions consume them.
///
/// A bare ` ``` ` is a `ClosingFence` even though it also opens a generic
/// fenced block from `Normal`; the transition table resolves that.
fn classify(line: &str) -> LineKind<'_> {
    if YAML_DELIMITER.is_match(line) {
        LineKind::YamlDelimiter
    } else if let Some(captures) = CELL_FENCE.captures(line) {
        LineKind::CellFence {
            language: captures.get(1).unwrap().as_str(),
        }
    } else if CLOSING_FENCE.is_match(line) {
        LineKind::ClosingFence
    } else if line.starts_with("```") {
        LineKind::OpeningFence
    } else if line.starts_with("$$") {
        LineKind::MathDelimiter
    } else {
        LineKind::Text
    }
}

struct CellBreaker<'a> {
    src: &'a MappedString,
    comments: &'a CommentSyntaxTable,
    line_buffer: Vec<RangedSubstring<'a>>,
    cells: Vec<Cell>,
}

impl<'a> CellBreaker<'a> {
    fn new(src: &'a MappedString, comments: &'a CommentSyntaxTable) -> Self {
        CellBreaker {
            src,
            comments,
            line_buffer: Vec::new(),
            cells: Vec::new(),
        }
    }

    fn run(mut self) -> Notebook {
        let mut state = State::Normal;
        for line in ranged_lines(self.src.value()) {
            state = self.step(state, line);
        }
        self.flush(CellType::Markdown);
        debug!(cells = self.cells.len(), "broke document into cells");
        Notebook { cells: self.cells }
    }

    fn step(&mut self, state: State, line: RangedSubstring<'a>) -> State {
        match (state, classify(line.substring)) {
            (State::Normal, LineKind::YamlDelimiter) => {
                self.flush(CellType::Markdown);
                self.line_buffer.push(line);
                State::InYaml
            }
            (State::InYaml, LineKind::YamlDelimiter) => {
                // the raw cell includes both delimiter lines
                self.line_buffer.push(line);
                self.flush(CellType::Raw);
                State::Normal
            }
            (State::Normal, LineKind::CellFence { language }) => {
                self.flush(CellType::Markdown);
                State::InCodeCell {
                    language: language.to_string(),
                }
            }
            (State::InCodeCell { language }, LineKind::ClosingFence) => {
                self.flush(CellType::Code { language });
                State::Normal
            }
            (State::Normal, LineKind::ClosingFence | LineKind::OpeningFence) => {
                self.line_buffer.push(line);
                State::InFencedCode
            }
            (State::InFencedCode, LineKind::ClosingFence) => {
                self.line_buffer.push(line);
                State::Normal
            }
            (State::Normal, LineKind::MathDelimiter) => {
                self.flush(CellType::Markdown);
                self.line_buffer.push(line);
                State::InMathBlock
            }
            (State::InMathBlock, LineKind::MathDelimiter) => {
                // flushed before the delimiter is buffered: the closing line
                // lands in the next cell's buffer
                self.flush(CellType::Math);
                self.line_buffer.push(line);
                State::Normal
            }
            (state, _) => {
                self.line_buffer.push(line);
                state
            }
        }
    }

    /// Turn the buffered lines into a cell of the given type and append it to
    /// the notebook, unless the buffer trims away to nothing.
    fn flush(&mut self, cell_type: CellType) {
        if self.line_buffer.is_empty() {
            return;
        }
        if self
            .line_buffer
            .last()
            .is_some_and(|line| line.substring.is_empty())
        {
            self.line_buffer.pop();
        }

        let mut pieces = Vec::with_capacity(self.line_buffer.len() * 2);
        for line in &self.line_buffer {
            pieces.push(Piece::Range(line.range));
            pieces.push(Piece::from("\n"));
        }
        pieces.pop();
        let source = mapped_string(self.src, pieces);

        let mut cell = Cell {
            cell_type,
            source: source.clone(),
            source_offset: 0,
            source_start_line: 0,
            source_verbatim: source,
            options: None,
        };
        if let CellType::Code { language } = cell.cell_type.clone() {
            self.attach_cell_options(&language, &mut cell);
        }

        let keep = {
            let cell_lines = lines(cell.source.value());
            !trim_empty_lines(&cell_lines, Trim::All).is_empty()
        };
        if keep {
            trace!(cell_type = ?cell.cell_type, "flushed cell");
            self.cells.push(cell);
        }
        self.line_buffer.clear();
    }

    /// Pull the leading option block out of a code cell: `options` and
    /// `source_start_line` are set from the partitioner, the option lines are
    /// stripped from `source`, and ojs/dot cells additionally get their
    /// display fence and `source_offset`.
    fn attach_cell_options(&self, language: &str, cell: &mut Cell) {
        let PartitionedCell {
            yaml,
            source_start_line,
            ..
        } = partition_cell_options_with(language, &cell.source, self.comments);

        let stripped = if source_start_line > 0 {
            let body_lines = ranged_lines(cell.source.value());
            if source_start_line < body_lines.len() {
                let start = body_lines[source_start_line].range.start;
                mapped_substring(&cell.source, start, cell.source.len())
            } else {
                // every line was an option line
                mapped_substring(&cell.source, cell.source.len(), cell.source.len())
            }
        } else {
            cell.source.clone()
        };

        if language == "ojs" || language == "dot" {
            let value = cell.source.value();
            let offsets = line_offsets(value);
            let breaks = &offsets[1..];
            let mut up_to_last_break = "";
            if source_start_line > 0 {
                if breaks.is_empty() {
                    up_to_last_break = value;
                } else {
                    let last = breaks[(source_start_line - 1).min(breaks.len() - 1)];
                    up_to_last_break = &value[..last];
                }
            }
            cell.source_offset = up_to_last_break.len() + VERBATIM_FENCE_OPEN.len();
            cell.source_verbatim = mapped_string(
                &cell.source,
                [
                    Piece::from(VERBATIM_FENCE_OPEN),
                    Piece::Range(Range::new(0, value.len())),
                    Piece::from(VERBATIM_FENCE_CLOSE),
                ],
            );
        }

        cell.options = yaml;
        cell.source_start_line = source_start_line;
        cell.source = stripped;
    }
}

/// Break a mapped qmd document into typed cells, using the stock
/// comment-syntax table for cell options.
///
/// Malformed structure never fails: anything unclassifiable falls back to
/// markdown.
pub fn break_quarto_md(src: &MappedString) -> Notebook {
    break_quarto_md_with(src, default_comment_table())
}

/// `break_quarto_md` with a caller-supplied comment-syntax table
pub fn break_quarto_md_with(src: &MappedString, comments: &CommentSyntaxTable) -> Notebook {
    CellBreaker::new(src, comments).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn break_str(text: &str) -> Notebook {
        break_quarto_md(&MappedString::original(text))
    }

    #[test]
    fn test_empty_document() {
        assert!(break_str("").cells.is_empty());
        assert!(break_str("\n\n\n").cells.is_empty());
    }

    #[test]
    fn test_plain_markdown() {
        let notebook = break_str("Some text\nmore text\n");
        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(notebook.cells[0].cell_type, CellType::Markdown);
        assert_eq!(notebook.cells[0].source.value(), "Some text\nmore text");
    }

    #[test]
    fn test_front_matter_becomes_raw_cell() {
        let notebook = break_str("---\ntitle: x\n---\nbody\n");
        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0].cell_type, CellType::Raw);
        assert_eq!(notebook.cells[0].source.value(), "---\ntitle: x\n---");
        assert_eq!(notebook.cells[1].cell_type, CellType::Markdown);
    }

    #[test]
    fn test_code_cell_language_captured() {
        let notebook = break_str("```{python}\nx = 1\n```\n");
        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(
            notebook.cells[0].cell_type,
            CellType::Code {
                language: "python".to_string()
            }
        );
        assert_eq!(notebook.cells[0].source.value(), "x = 1");
    }

    #[test]
    fn test_fence_lines_excluded_from_code_cell() {
        let notebook = break_str("before\n```{r}\n1+1\n```\nafter\n");
        assert_eq!(notebook.cells.len(), 3);
        assert_eq!(notebook.cells[0].source.value(), "before");
        assert_eq!(notebook.cells[1].source.value(), "1+1");
        assert_eq!(notebook.cells[2].source.value(), "after");
    }

    #[test]
    fn test_generic_fenced_code_stays_markdown() {
        let notebook = break_str("```\nnot a cell\n```\n");
        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(notebook.cells[0].cell_type, CellType::Markdown);
        assert_eq!(notebook.cells[0].source.value(), "```\nnot a cell\n```");
    }

    #[test]
    fn test_cell_fence_inside_fenced_block_is_content() {
        let notebook = break_str("```\n```{r}\n```\n");
        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(notebook.cells[0].cell_type, CellType::Markdown);
        assert_eq!(notebook.cells[0].source.value(), "```\n```{r}\n```");
    }

    #[test]
    fn test_yaml_delimiter_inside_math_is_content() {
        let notebook = break_str("$$\n---\n$$\n");
        assert_eq!(notebook.cells[0].cell_type, CellType::Math);
        assert_eq!(notebook.cells[0].source.value(), "$$\n---");
    }

    #[test]
    fn test_math_delimiter_inside_yaml_is_content() {
        let notebook = break_str("---\n$$\n---\n");
        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(notebook.cells[0].cell_type, CellType::Raw);
        assert_eq!(notebook.cells[0].source.value(), "---\n$$\n---");
    }

    #[test]
    fn test_math_block() {
        let notebook = break_str("before\n$$\nx^2\n$$\n");
        assert_eq!(notebook.cells.len(), 3);
        assert_eq!(notebook.cells[0].cell_type, CellType::Markdown);
        assert_eq!(notebook.cells[1].cell_type, CellType::Math);
        // the opening delimiter is part of the math cell; the closing
        // delimiter lands in the following cell
        assert_eq!(notebook.cells[1].source.value(), "$$\nx^2");
        assert_eq!(notebook.cells[2].cell_type, CellType::Markdown);
        assert_eq!(notebook.cells[2].source.value(), "$$");
    }

    #[test]
    fn test_no_empty_markdown_cell_between_code_cells() {
        let notebook = break_str("```{r}\n1\n```\n\n\n```{r}\n2\n```\n");
        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0].source.value(), "1");
        assert_eq!(notebook.cells[1].source.value(), "2");
    }

    #[test]
    fn test_unterminated_code_cell_flushes_as_markdown() {
        let notebook = break_str("```{r}\n1+1\n");
        // the cell fence never closed; the buffered body flushes as markdown
        assert_eq!(notebook.cells.len(), 1);
        assert_eq!(notebook.cells[0].cell_type, CellType::Markdown);
        assert_eq!(notebook.cells[0].source.value(), "1+1");
    }

    #[test]
    fn test_code_cell_options_partitioned() {
        let notebook = break_str("```{r}\n#| echo: false\n1+1\n```\n");
        assert_eq!(notebook.cells.len(), 1);
        let cell = &notebook.cells[0];
        assert_eq!(cell.options.as_ref().expect("options").value(), "echo: false");
        assert_eq!(cell.source.value(), "1+1");
        assert_eq!(cell.source_start_line, 1);
    }

    #[test]
    fn test_option_only_code_cell_is_discarded() {
        let notebook = break_str("```{r}\n#| echo: false\n```\n");
        assert!(notebook.cells.is_empty());
    }

    #[test]
    fn test_empty_code_cell_is_discarded() {
        let notebook = break_str("```{r}\n```\n");
        assert!(notebook.cells.is_empty());
    }

    #[test]
    fn test_ojs_cell_verbatim_and_offset() {
        let notebook = break_str("```{ojs}\n//| echo: false\n1 + 1\n```\n");
        assert_eq!(notebook.cells.len(), 1);
        let cell = &notebook.cells[0];
        assert_eq!(cell.source.value(), "1 + 1");
        assert_eq!(
            cell.source_verbatim.value(),
            "```{ojs}\n//| echo: false\n1 + 1\n```"
        );
        // fence prefix (9) + option line up to its terminating newline (15)
        assert_eq!(cell.source_offset, 24);
        assert_eq!(cell.source_start_line, 1);
        assert_eq!(cell.options.as_ref().expect("options").value(), "echo: false");
        // the verbatim fence is synthetic; the body inside it maps to the doc
        assert_eq!(cell.source_verbatim.map(0), None);
        assert_eq!(cell.source_verbatim.map(9), Some(9));
    }

    #[test]
    fn test_ojs_cell_without_options() {
        let notebook = break_str("```{ojs}\n1 + 1\n```\n");
        let cell = &notebook.cells[0];
        assert_eq!(cell.source_offset, VERBATIM_FENCE_OPEN.len());
        assert_eq!(cell.source_verbatim.value(), "```{ojs}\n1 + 1\n```");
        assert!(cell.options.is_none());
    }

    #[test]
    fn test_dot_cell_uses_ojs_display_fence() {
        let notebook = break_str("```{dot}\ndigraph {}\n```\n");
        let cell = &notebook.cells[0];
        assert_eq!(
            cell.cell_type,
            CellType::Code {
                language: "dot".to_string()
            }
        );
        assert_eq!(cell.source_verbatim.value(), "```{ojs}\ndigraph {}\n```");
    }

    #[test]
    fn test_custom_comment_table() {
        let mut table = CommentSyntaxTable::default();
        table.insert("mylang", crate::comment::CommentSyntax::line(";;"));
        let src = MappedString::original("```{mylang}\n;;| a: 1\nbody\n```\n");
        let notebook = break_quarto_md_with(&src, &table);
        let cell = &notebook.cells[0];
        assert_eq!(cell.options.as_ref().expect("options").value(), "a: 1");
        assert_eq!(cell.source.value(), "body");
    }
}

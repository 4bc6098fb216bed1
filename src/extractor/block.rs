//! Positional block extraction.
//!
//! A block is located by a trigger line and read as a fixed grid of
//! whitespace-delimited tokens starting a fixed number of lines below it.
//! Tokens are copied verbatim; nothing is parsed as a number.

use crate::error::{OutOfRangeReason, Result, SdfError};
use std::io::Write;

/// Shape of the region read after each trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Lines between the trigger and the first data row.
    pub row_offset: usize,
    /// Rows read per trigger, including the final short row.
    pub row_count: usize,
    /// Tokens taken from every row except the last.
    pub cols_per_row: usize,
    /// Tokens taken from the last row.
    pub last_row_cols: usize,
}

impl Grid {
    pub const fn new(
        row_offset: usize,
        row_count: usize,
        cols_per_row: usize,
        last_row_cols: usize,
    ) -> Self {
        Self {
            row_offset,
            row_count,
            cols_per_row,
            last_row_cols,
        }
    }

    /// Number of records a single trigger produces, saturating at `usize::MAX`.
    pub fn records_per_match(&self) -> usize {
        match self.row_count {
            0 => 0,
            rows => self
                .cols_per_row
                .saturating_mul(rows - 1)
                .saturating_add(self.last_row_cols),
        }
    }

    fn columns_for_row(&self, row: usize) -> usize {
        if row + 1 == self.row_count {
            self.last_row_cols
        } else {
            self.cols_per_row
        }
    }
}

/// Decides whether line `index` starts a block.
pub trait Trigger {
    fn matches(&self, lines: &[&str], index: usize) -> bool;
}

impl<F> Trigger for F
where
    F: Fn(&[&str], usize) -> bool,
{
    fn matches(&self, lines: &[&str], index: usize) -> bool {
        self(lines, index)
    }
}

/// Substring trigger: every `line_contains` needle must occur on the line,
/// and `next_line_contains` (when set) must occur on the following line.
///
/// Needles are matched literally, whitespace included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTrigger {
    pub line_contains: Vec<String>,
    pub next_line_contains: Option<String>,
}

impl MarkerTrigger {
    pub fn new<I, S>(line_contains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line_contains: line_contains.into_iter().map(Into::into).collect(),
            next_line_contains: None,
        }
    }

    pub fn with_next_line<S: Into<String>>(mut self, needle: S) -> Self {
        self.next_line_contains = Some(needle.into());
        self
    }
}

impl Trigger for MarkerTrigger {
    fn matches(&self, lines: &[&str], index: usize) -> bool {
        let Some(line) = lines.get(index) else {
            return false;
        };

        if !self.line_contains.iter().all(|needle| line.contains(needle.as_str())) {
            return false;
        }

        match &self.next_line_contains {
            // A trigger on the last line has no lookahead and cannot match.
            Some(needle) => lines
                .get(index + 1)
                .is_some_and(|next| next.contains(needle.as_str())),
            None => true,
        }
    }
}

/// Records produced by one extraction pass over a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction<'a> {
    /// Tokens in emission order, borrowed from the document.
    pub records: Vec<&'a str>,
    /// Zero-based indices of the lines that triggered a block.
    pub triggers: Vec<usize>,
}

impl<'a> Extraction<'a> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Write every record on its own line.
    pub fn write_records<W: Write>(&self, sink: &mut W) -> Result<u64> {
        let mut bytes = 0u64;
        for record in &self.records {
            sink.write_all(record.as_bytes())?;
            sink.write_all(b"\n")?;
            bytes += record.len() as u64 + 1;
        }
        Ok(bytes)
    }
}

/// Scan `lines` for triggers and copy the grid following each one.
///
/// Triggers are visited in document order and their records concatenated.
/// A block that runs past the end of the document, or a row with too few
/// tokens, fails the whole pass.
pub fn extract<'a, T>(lines: &[&'a str], trigger: &T, grid: Grid) -> Result<Extraction<'a>>
where
    T: Trigger + ?Sized,
{
    let mut extraction = Extraction::default();

    for index in 0..lines.len() {
        if !trigger.matches(lines, index) {
            continue;
        }

        tracing::debug!(line = index + 1, "block trigger matched");
        extraction.triggers.push(index);
        read_block(lines, index, grid, &mut extraction.records)?;
    }

    Ok(extraction)
}

fn read_block<'a>(
    lines: &[&'a str],
    trigger_index: usize,
    grid: Grid,
    records: &mut Vec<&'a str>,
) -> Result<()> {
    // Saturating indices land past the end and surface as RowPastEnd.
    let first_row = trigger_index.saturating_add(grid.row_offset);

    for row in 0..grid.row_count {
        let line_index = first_row.saturating_add(row);
        let line = lines.get(line_index).copied().ok_or_else(|| SdfError::OutOfRange {
            line: line_index.saturating_add(1),
            reason: OutOfRangeReason::RowPastEnd {
                document_lines: lines.len(),
            },
        })?;

        let needed = grid.columns_for_row(row);
        let before = records.len();
        records.extend(line.split_whitespace().take(needed));

        let found = records.len() - before;
        if found < needed {
            return Err(SdfError::OutOfRange {
                line: line_index + 1,
                reason: OutOfRangeReason::MissingTokens { needed, found },
            });
        }
    }

    Ok(())
}

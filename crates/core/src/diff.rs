//! Line-oriented comparison of two program texts
//!
//! Alignment is Myers' minimal edit script over lines (split after each
//! `\n`), so equal blocks form a longest common subsequence. Alignment is
//! bounded by a deadline; past it the remaining region is reported as a
//! plain delete and insert. The aligned result is exposed as an iterator of
//! blocks so a renderer can stream it, and as a unified diff for plain-text
//! output.

use serde::Serialize;
use similar::{Algorithm, DiffOp as Op, TextDiff};
use std::ops::Range;
use std::time::{Duration, Instant};

/// Alignment budget used by [`LineDiff::new`]
pub const DEFAULT_DIFF_TIMEOUT: Duration = Duration::from_secs(1);

/// Kind of an aligned block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    Equal,
    Insert,
    Delete,
}

/// A run of lines sharing one [`DiffOp`]
///
/// Lines are reported without their terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffBlock<'a> {
    pub op: DiffOp,
    pub lines: Vec<&'a str>,
}

/// Line counts of a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub equal: usize,
    pub inserted: usize,
    pub deleted: usize,
}

/// Aligned comparison of two texts
#[derive(Debug, Clone)]
pub struct LineDiff {
    old: String,
    new: String,
    old_lines: Vec<Range<usize>>,
    new_lines: Vec<Range<usize>>,
    ops: Vec<Op>,
    timeout: Duration,
}

impl LineDiff {
    /// Align `old` against `new` within [`DEFAULT_DIFF_TIMEOUT`]
    pub fn new(old: String, new: String) -> Self {
        Self::with_timeout(old, new, DEFAULT_DIFF_TIMEOUT)
    }

    /// Align `old` against `new`, giving up on minimality after `timeout`
    pub fn with_timeout(old: String, new: String, timeout: Duration) -> Self {
        let old_lines = line_ranges(&old);
        let new_lines = line_ranges(&new);

        let ops = {
            let old_slices: Vec<&str> = old_lines.iter().map(|r| &old[r.clone()]).collect();
            let new_slices: Vec<&str> = new_lines.iter().map(|r| &new[r.clone()]).collect();
            let deadline = Instant::now().checked_add(timeout);
            similar::capture_diff_slices_deadline(
                Algorithm::Myers,
                &old_slices,
                &new_slices,
                deadline,
            )
        };

        Self {
            old,
            new,
            old_lines,
            new_lines,
            ops,
            timeout,
        }
    }

    /// Aligned blocks in document order
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            diff: self,
            next_op: 0,
            pending: None,
        }
    }

    /// True when both sides have identical lines
    pub fn is_identical(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, Op::Equal { .. }))
    }

    pub fn stats(&self) -> DiffStats {
        self.blocks().fold(DiffStats::default(), |mut stats, block| {
            match block.op {
                DiffOp::Equal => stats.equal += block.lines.len(),
                DiffOp::Insert => stats.inserted += block.lines.len(),
                DiffOp::Delete => stats.deleted += block.lines.len(),
            }
            stats
        })
    }

    /// Render as a unified diff with the given context radius
    pub fn unified(&self, context: usize, from_label: &str, to_label: &str) -> String {
        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .timeout(self.timeout)
            .diff_lines(self.old.as_str(), self.new.as_str());
        let mut unified = diff.unified_diff();
        unified.context_radius(context).header(from_label, to_label);
        unified.to_string()
    }

    fn old_block(&self, range: Range<usize>) -> Vec<&str> {
        self.old_lines[range]
            .iter()
            .map(|r| trim_terminator(&self.old[r.clone()]))
            .collect()
    }

    fn new_block(&self, range: Range<usize>) -> Vec<&str> {
        self.new_lines[range]
            .iter()
            .map(|r| trim_terminator(&self.new[r.clone()]))
            .collect()
    }
}

/// Lazy iterator over the blocks of a [`LineDiff`]
pub struct Blocks<'a> {
    diff: &'a LineDiff,
    next_op: usize,
    /// Insert half of a replacement, emitted after its delete half
    pending: Option<DiffBlock<'a>>,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = DiffBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(block) = self.pending.take() {
            return Some(block);
        }

        let op = self.diff.ops.get(self.next_op)?;
        self.next_op += 1;

        let block = match *op {
            Op::Equal { old_index, len, .. } => DiffBlock {
                op: DiffOp::Equal,
                lines: self.diff.old_block(old_index..old_index + len),
            },
            Op::Delete { old_index, old_len, .. } => DiffBlock {
                op: DiffOp::Delete,
                lines: self.diff.old_block(old_index..old_index + old_len),
            },
            Op::Insert { new_index, new_len, .. } => DiffBlock {
                op: DiffOp::Insert,
                lines: self.diff.new_block(new_index..new_index + new_len),
            },
            Op::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                self.pending = Some(DiffBlock {
                    op: DiffOp::Insert,
                    lines: self.diff.new_block(new_index..new_index + new_len),
                });
                DiffBlock {
                    op: DiffOp::Delete,
                    lines: self.diff.old_block(old_index..old_index + old_len),
                }
            }
        };

        Some(block)
    }
}

/// Byte ranges of each line, terminator included
fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let mut start = 0;
    text.split_inclusive('\n')
        .map(|line| {
            let range = start..start + line.len();
            start = range.end;
            range
        })
        .collect()
}

fn trim_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

//! Approximate substring scoring.
//!
//! A value is scored by the best alignment of the query against any of its
//! substrings, counting Damerau (optimal string alignment) edits. The score
//! combines the edit ratio with how far into the value the substring starts:
//!
//! ```text
//! score = edits / query_len + offset / distance
//! ```
//!
//! Lower is better; 0.0 is an exact match at the start of the value.
//!
//! All substrings are covered by one dynamic-programming pass with a free
//! start row, so a value costs `O(query_len * value_len)`.

use super::config::MatchConfig;

/// Lowercase a string into the character form the matcher works on.
pub(crate) fn normalize(text: &str) -> Box<[char]> {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Penalty for a match starting `offset` characters into a value.
fn proximity(offset: usize, distance: usize) -> f64 {
    if distance == 0 {
        return if offset == 0 { 0.0 } else { 1.0 };
    }
    offset as f64 / distance as f64
}

/// Best partial alignment ending at one cell: edits so far and where in the
/// value it started.
#[derive(Debug, Clone, Copy)]
struct Cell {
    edits: u32,
    start: u32,
}

impl Cell {
    /// A start offset already past the threshold.
    const UNREACHABLE: Cell = Cell {
        edits: u32::MAX,
        start: 0,
    };

    fn plus(self, edits: u32) -> Cell {
        Cell {
            edits: self.edits.saturating_add(edits),
            start: self.start,
        }
    }
}

/// Reusable row buffers for [`score`].
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    before: Vec<Cell>,
    prev: Vec<Cell>,
    cur: Vec<Cell>,
}

/// Best score of `pattern` against `value`, or `None` if no substring
/// scores within the threshold.
///
/// Both inputs must already be normalized.
pub(crate) fn score(
    pattern: &[char],
    value: &[char],
    config: &MatchConfig,
    scratch: &mut Scratch,
) -> Option<f64> {
    let m = pattern.len();
    let n = value.len();
    if m == 0 || n == 0 {
        return None;
    }

    let cost = |cell: Cell| -> f64 {
        if cell.edits == u32::MAX {
            return f64::INFINITY;
        }
        cell.edits as f64 / m as f64 + proximity(cell.start as usize, config.distance)
    };
    let better = |a: Cell, b: Cell| if cost(b) < cost(a) { b } else { a };

    let Scratch { before, prev, cur } = scratch;
    for row in [&mut *before, &mut *prev, &mut *cur] {
        row.clear();
        row.resize(n + 1, Cell::UNREACHABLE);
    }

    // Row 0: an empty prefix of the pattern may start anywhere.
    for (j, cell) in prev.iter_mut().enumerate() {
        if proximity(j, config.distance) <= config.threshold {
            *cell = Cell {
                edits: 0,
                start: j as u32,
            };
        }
    }

    for i in 1..=m {
        cur[0] = Cell {
            edits: i as u32,
            start: 0,
        };
        for j in 1..=n {
            let substitution = u32::from(pattern[i - 1] != value[j - 1]);
            let mut best = prev[j - 1].plus(substitution);
            best = better(best, prev[j].plus(1));
            best = better(best, cur[j - 1].plus(1));
            if i > 1 && j > 1 && pattern[i - 1] == value[j - 2] && pattern[i - 2] == value[j - 1]
            {
                best = better(best, before[j - 2].plus(1));
            }
            cur[j] = best;
        }
        std::mem::swap(before, prev);
        std::mem::swap(prev, cur);
    }

    let best = prev
        .iter()
        .map(|&cell| cost(cell))
        .fold(f64::INFINITY, f64::min);

    (best <= config.threshold).then_some(best)
}

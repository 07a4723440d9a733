//! Label patterns for in-turn lines.
//!
//! A pattern is a short label sequence such as `[0, 1, 1]`.  Repeated
//! cyclically across a line, positions sharing a label share a pivot
//! phoneme, so a single line can weave several pivots together.
//!
//! Sequences are restricted-growth strings: the first label is `0` and each
//! later label either repeats one already used or introduces the next unused
//! one.  That enumerates every way of partitioning the positions exactly once.

/// One candidate pattern and its number of distinct labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub labels: Vec<usize>,
    pub distinct: usize,
}

impl Pattern {
    pub fn period(&self) -> usize {
        self.labels.len()
    }

    /// The labels repeated cyclically to `len` positions.
    pub fn expand(&self, len: usize) -> Vec<usize> {
        self.labels.iter().copied().cycle().take(len).collect()
    }

    /// Occurrences of each label in a line of `len` positions.
    pub fn demand(&self, len: usize) -> Vec<usize> {
        let mut counts = vec![0; self.distinct];
        for label in self.expand(len) {
            counts[label] += 1;
        }
        counts
    }

    /// Whether the expanded line holds three equal labels in a row.
    pub fn has_triple_run(&self, len: usize) -> bool {
        self.expand(len)
            .windows(3)
            .any(|w| w[0] == w[1] && w[1] == w[2])
    }
}

/// Enumerate every pattern whose period `r` lies in `[2, max_period]` and
/// divides `divisor_target`, dropping single-label sequences.
///
/// The result is stably sorted by distinct-label count, so for equal counts
/// the order is period ascending and then lexicographic.
pub fn enumerate_patterns(max_period: usize, divisor_target: usize) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    for period in 2..=max_period {
        if divisor_target % period != 0 {
            continue;
        }

        // (labels so far, highest label used)
        let mut stack: Vec<(Vec<usize>, usize)> = vec![(vec![0], 0)];
        while let Some((labels, max_label)) = stack.pop() {
            if labels.len() == period {
                if max_label >= 1 {
                    patterns.push(Pattern { labels, distinct: max_label + 1 });
                }
                continue;
            }
            // Pushed in reverse so the smallest label is explored first.
            for label in (0..=max_label + 1).rev() {
                let mut next = labels.clone();
                next.push(label);
                stack.push((next, max_label.max(label)));
            }
        }
    }

    patterns.sort_by_key(|p| p.distinct);
    patterns
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Three-tier line construction.
//!
//! 1. **Perfect-fluent** — lines of `max_length` syllables that all share one
//!    pivot phoneme, taken first by right pivot and then by left pivot.
//! 2. **In-turn-fluent** — lines whose pivot rotates according to a label
//!    [`Pattern`]; small leftover groups of several pivots are woven into one
//!    line, padded with already-recorded syllables when a group runs short.
//! 3. **Not-fluent** — everything still uncombined, recorded as isolated
//!    syllables batched `max_length` to a line.
//!
//! All run state (pair inventory, usage sets, counters) lives in the
//! [`LineBuilder`] and is consumed by [`LineBuilder::run`], so nothing leaks
//! between two generations.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::Result,
    pairs::{Orientation, PhonemePairIndex},
    pattern::{enumerate_patterns, Pattern},
    table::SyllableIndex,
};

/// Separator between syllables in a line name.
pub const LINE_SEPARATOR: &str = "_";

/// Orientation tried first by the fluent tiers.
const PRIMARY_ORIENTATION: Orientation = Orientation::ByRight;

// ─────────────────────────────────────────────────────────────────────────────
// Public types
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the in-turn tier runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Policy {
    #[default]
    Default,
    /// Skip tier 2; leftovers of tier 1 go straight to the fallback.
    NoInTurn,
}

/// How a line was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fluency {
    Perfect,
    InTurn,
    NotFluent,
}

/// One recorded unit of a line, in recording order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Syllable sung out of silence (`- ka`).
    Head(String),
    /// Boundary between the previous right and the next left (`a k`).
    Transition { right: String, left: String },
    /// Syllable reached from the previous syllable (`ka`).
    Body(String),
    /// Right phoneme released into silence (`a -`).
    Tail(String),
    /// A silent beat with nothing to label.
    Rest,
}

/// A syllable position in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub syllable: String,
    /// Re-recorded only to complete an in-turn pattern.
    pub padding: bool,
}

impl Slot {
    fn real(syllable: &str) -> Self {
        Self { syllable: syllable.to_string(), padding: false }
    }

    fn pad(syllable: &str) -> Self {
        Self { syllable: syllable.to_string(), padding: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub slots: Vec<Slot>,
    pub segments: Vec<Segment>,
    pub fluency: Fluency,
}

impl Line {
    /// Recording-script name, e.g. `ka_ta_sa`.
    pub fn name(&self) -> String {
        self.slots
            .iter()
            .map(|s| s.syllable.as_str())
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }

    /// Syllables this line is responsible for covering (padding excluded).
    pub fn syllables(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter(|s| !s.padding).map(|s| s.syllable.as_str())
    }

    pub fn padding(&self) -> usize {
        self.slots.iter().filter(|s| s.padding).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Per-generation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub perfect_fluent: usize,
    pub in_turn_fluent: usize,
    /// Syllables placed by the fallback tier.
    pub not_fluent: usize,
    /// Padding slots introduced by the in-turn tier.
    pub redundancy: usize,
}

/// Structural roles already claimed by earlier lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub syllables_as_start: HashSet<String>,
    pub rights_as_end: HashSet<String>,
    pub syllables_as_nonstart: HashSet<String>,
}

/// Knobs for a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParams {
    pub max_length: usize,
    pub policy: Policy,
    pub sss_first: bool,
    pub iter_depth: usize,
    pub max_redundancy: usize,
}

/// What a build produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub lines: Vec<Line>,
    pub stats: GenerationStats,
    pub usage: Usage,
}

// ─────────────────────────────────────────────────────────────────────────────
// In-turn planning
// ─────────────────────────────────────────────────────────────────────────────

/// Which pivot fills one label and how.
#[derive(Debug, Clone)]
struct LabelFill {
    pivot: String,
    take: usize,
    padding: Vec<String>,
}

#[derive(Debug, Clone)]
struct InTurnPlan {
    layout: Vec<usize>,
    fills: Vec<LabelFill>,
    padding: usize,
}

/// Candidate patterns for in-turn lines of exactly `params.max_length` slots,
/// in evaluation order.
///
/// With `sss_first`, patterns whose expanded line contains three equal labels
/// in a row move to the front of their distinct-count group.
pub fn in_turn_candidates(params: &BuildParams) -> Vec<Pattern> {
    let len = params.max_length;
    let mut patterns = enumerate_patterns(len, len);
    if params.sss_first {
        // Stable: keeps the distinct-count order, SSS first within each count.
        patterns.sort_by_key(|p| (p.distinct, !p.has_triple_run(len)));
    }
    patterns.truncate(params.iter_depth);
    patterns
}

// ─────────────────────────────────────────────────────────────────────────────
// LineBuilder
// ─────────────────────────────────────────────────────────────────────────────

pub struct LineBuilder<'t> {
    table: &'t SyllableIndex,
    pairs: PhonemePairIndex,
    params: BuildParams,
    lines: Vec<Line>,
    stats: GenerationStats,
    usage: Usage,
}

impl<'t> LineBuilder<'t> {
    /// Fresh run state over the full inventory of `table`.
    pub fn new(table: &'t SyllableIndex, params: BuildParams) -> Self {
        Self {
            table,
            pairs: PhonemePairIndex::new(table),
            params,
            lines: Vec::new(),
            stats: GenerationStats::default(),
            usage: Usage::default(),
        }
    }

    /// Run all three tiers and hand back the result.
    pub fn run(mut self) -> Result<BuildOutput> {
        for orientation in [PRIMARY_ORIENTATION, PRIMARY_ORIENTATION.flipped()] {
            let made = self.perfect_fluent(orientation)?;
            debug!(?orientation, lines = made, "perfect-fluent tier");
        }

        if self.params.policy == Policy::Default {
            let candidates = in_turn_candidates(&self.params);
            for orientation in [PRIMARY_ORIENTATION, PRIMARY_ORIENTATION.flipped()] {
                let made = self.in_turn_fluent(orientation, &candidates)?;
                debug!(?orientation, lines = made, "in-turn tier");
            }
        }

        let placed = self.not_fluent()?;
        debug!(syllables = placed, "not-fluent tier");

        Ok(BuildOutput { lines: self.lines, stats: self.stats, usage: self.usage })
    }

    // ── Shared helpers ────────────────────────────────────────────────────────

    fn syllable_for(&self, orientation: Orientation, pivot: &str, partner: &str) -> Result<&'t str> {
        let table = self.table;
        let (left, right) = orientation.pair(pivot, partner);
        table.reverse_lookup(left, right)
    }

    /// Emit a chained line: every neighbour pair gets an explicit transition.
    fn push_fluent_line(&mut self, slots: Vec<Slot>, fluency: Fluency) -> Result<()> {
        let table = self.table;
        let mut segments = Vec::with_capacity(slots.len() * 2 + 1);
        let mut prev_right: Option<&str> = None;

        for slot in &slots {
            let pair = table.pair_of(&slot.syllable)?;
            match prev_right {
                None => segments.push(Segment::Head(slot.syllable.clone())),
                Some(right) => {
                    segments.push(Segment::Transition {
                        right: right.to_string(),
                        left: pair.left.clone(),
                    });
                    segments.push(Segment::Body(slot.syllable.clone()));
                }
            }
            prev_right = Some(&pair.right);
        }
        if let Some(right) = prev_right {
            segments.push(Segment::Tail(right.to_string()));
            self.usage.rights_as_end.insert(right.to_string());
        }

        if let Some((first, rest)) = slots.split_first() {
            self.usage.syllables_as_start.insert(first.syllable.clone());
            for slot in rest {
                self.usage.syllables_as_nonstart.insert(slot.syllable.clone());
            }
        }

        self.lines.push(Line { slots, segments, fluency });
        Ok(())
    }

    // ── Tier 1 ───────────────────────────────────────────────────────────────

    fn perfect_fluent(&mut self, orientation: Orientation) -> Result<usize> {
        let max_length = self.params.max_length;
        let mut made = 0;

        for pivot in self.pairs.pivots(orientation) {
            while self.pairs.partner_count(orientation, &pivot) >= max_length {
                let chunk = self.pairs.consume(orientation, &pivot, max_length);
                let slots = chunk
                    .iter()
                    .map(|partner| self.syllable_for(orientation, &pivot, partner).map(Slot::real))
                    .collect::<Result<Vec<_>>>()?;
                self.push_fluent_line(slots, Fluency::Perfect)?;
                made += 1;
            }
        }

        self.stats.perfect_fluent += made;
        Ok(made)
    }

    // ── Tier 2 ───────────────────────────────────────────────────────────────

    fn in_turn_fluent(&mut self, orientation: Orientation, candidates: &[Pattern]) -> Result<usize> {
        let mut made = 0;
        while let Some(plan) = self.best_plan(orientation, candidates)? {
            self.apply_plan(orientation, plan)?;
            made += 1;
        }
        self.stats.in_turn_fluent += made;
        Ok(made)
    }

    /// Lowest-padding feasible plan; ties go to the earlier candidate.
    fn best_plan(&self, orientation: Orientation, candidates: &[Pattern]) -> Result<Option<InTurnPlan>> {
        let pivots: Vec<(String, usize)> = self
            .pairs
            .pivots(orientation)
            .into_iter()
            .map(|p| {
                let count = self.pairs.partner_count(orientation, &p);
                (p, count)
            })
            .collect();
        let budget = self.params.max_redundancy.saturating_sub(self.stats.redundancy);

        let mut best: Option<InTurnPlan> = None;
        for pattern in candidates {
            if pattern.distinct > pivots.len() {
                continue;
            }
            let Some(plan) = self.plan_for(orientation, pattern, &pivots, budget)? else {
                continue;
            };
            let better = best.as_ref().map_or(true, |b| plan.padding < b.padding);
            if better {
                let done = plan.padding == 0;
                best = Some(plan);
                if done {
                    break;
                }
            }
        }
        Ok(best)
    }

    fn plan_for(
        &self,
        orientation: Orientation,
        pattern: &Pattern,
        pivots: &[(String, usize)],
        budget: usize,
    ) -> Result<Option<InTurnPlan>> {
        let len = self.params.max_length;
        let demand = pattern.demand(len);

        // Labels with the largest demand pick first.
        let mut order: Vec<usize> = (0..pattern.distinct).collect();
        order.sort_by(|&a, &b| demand[b].cmp(&demand[a]));

        let mut free = vec![true; pivots.len()];
        let mut fills: Vec<Option<LabelFill>> = vec![None; pattern.distinct];
        let mut padding_total = 0;
        let mut real_total = 0;

        for label in order {
            // Largest remaining inventory; ties go to the earlier pivot.
            let Some(idx) = (0..pivots.len())
                .filter(|&i| free[i])
                .max_by(|&a, &b| pivots[a].1.cmp(&pivots[b].1).then(b.cmp(&a)))
            else {
                return Ok(None);
            };
            free[idx] = false;

            let (pivot, count) = &pivots[idx];
            let need = demand[label];
            let take = need.min(*count);
            let short = need - take;

            padding_total += short;
            real_total += take;
            if padding_total > budget {
                return Ok(None);
            }

            let padding = if short > 0 {
                match self.padding_for(orientation, pivot, short)? {
                    Some(p) => p,
                    None => return Ok(None),
                }
            } else {
                Vec::new()
            };

            fills[label] = Some(LabelFill { pivot: pivot.clone(), take, padding });
        }

        // A line carries at least as much new material as re-recorded material.
        if padding_total > real_total {
            return Ok(None);
        }

        Ok(Some(InTurnPlan {
            layout: pattern.expand(len),
            fills: fills.into_iter().flatten().collect(),
            padding: padding_total,
        }))
    }

    /// `count` distinct, already-placed syllables of `pivot`'s group.
    ///
    /// Syllables so far only recorded out of silence come first, since
    /// re-recording them mid-line adds a transition they do not have yet.
    fn padding_for(&self, orientation: Orientation, pivot: &str, count: usize) -> Result<Option<Vec<String>>> {
        let group = match orientation {
            Orientation::ByRight => self.table.syllables_by_right().get(pivot),
            Orientation::ByLeft => self.table.syllables_by_left().get(pivot),
        };

        let mut start_only = Vec::new();
        let mut others = Vec::new();
        for syllable in group {
            let pair = self.table.pair_of(syllable)?;
            if self.pairs.contains(&pair.left, &pair.right) {
                continue;
            }
            if self.usage.syllables_as_start.contains(syllable)
                && !self.usage.syllables_as_nonstart.contains(syllable)
            {
                start_only.push(syllable.clone());
            } else {
                others.push(syllable.clone());
            }
        }

        let picked: Vec<String> = start_only.into_iter().chain(others).take(count).collect();
        Ok((picked.len() == count).then_some(picked))
    }

    fn apply_plan(&mut self, orientation: Orientation, plan: InTurnPlan) -> Result<()> {
        let mut queues: Vec<VecDeque<Slot>> = Vec::with_capacity(plan.fills.len());
        for fill in &plan.fills {
            let partners = self.pairs.consume(orientation, &fill.pivot, fill.take);
            let mut queue = partners
                .iter()
                .map(|partner| self.syllable_for(orientation, &fill.pivot, partner).map(Slot::real))
                .collect::<Result<VecDeque<_>>>()?;
            queue.extend(fill.padding.iter().map(|s| Slot::pad(s)));
            queues.push(queue);
        }

        // Demand was computed from this layout, so every queue has enough.
        let slots: Vec<Slot> = plan
            .layout
            .iter()
            .filter_map(|&label| queues[label].pop_front())
            .collect();

        self.stats.redundancy += plan.padding;
        self.push_fluent_line(slots, Fluency::InTurn)
    }

    // ── Tier 3 ───────────────────────────────────────────────────────────────

    fn not_fluent(&mut self) -> Result<usize> {
        let table = self.table;
        let remaining: Vec<(&'t str, &'t str)> = table
            .iter()
            .filter(|(_, pair)| self.pairs.contains(&pair.left, &pair.right))
            .map(|(s, pair)| (s, pair.right.as_str()))
            .collect();

        for (syllable, _) in &remaining {
            let pair = table.pair_of(syllable)?;
            self.pairs.remove_pair(&pair.left, &pair.right);
        }

        for chunk in remaining.chunks(self.params.max_length) {
            let mut slots = Vec::with_capacity(chunk.len());
            let mut segments = Vec::with_capacity(chunk.len() * 2);
            for &(syllable, right) in chunk {
                slots.push(Slot::real(syllable));
                segments.push(Segment::Head(syllable.to_string()));
                if self.usage.rights_as_end.insert(right.to_string()) {
                    segments.push(Segment::Tail(right.to_string()));
                } else {
                    segments.push(Segment::Rest);
                }
                self.usage.syllables_as_start.insert(syllable.to_string());
            }
            self.lines.push(Line { slots, segments, fluency: Fluency::NotFluent });
        }

        self.stats.not_fluent += remaining.len();
        Ok(remaining.len())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Backtracking search with forward checking.
//!
//! The search tree is an explicit stack of [`ChoicePoint`] records. Each
//! record owns the ordered values of one variable, the next value to try,
//! and the trail mark to rewind to before trying it.

use super::domain::Domains;
use crate::eligibility::{Candidate, EligibilityIndex};
use crate::scheduler::{Placement, SearchBudget, Termination};

/// One level of the search tree.
#[derive(Debug, Clone)]
struct ChoicePoint {
    var: usize,
    values: Vec<usize>,
    next: usize,
    trail_mark: usize,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub(crate) struct SearchResult {
    /// Placement with the most requirements assigned.
    pub best: Placement,
    /// Values tried.
    pub nodes: u64,
    /// Deepest point reached.
    pub max_depth: usize,
    /// Backtracks performed.
    pub backtracks: u64,
    pub termination: Termination,
}

/// Mutable search state: domains, partial placement, teacher load.
struct SearchState<'i, 'a> {
    index: &'i EligibilityIndex<'a>,
    domains: Domains,
    placement: Placement,
    minutes: Vec<u32>,
    caps: Vec<u32>,
    active: Vec<bool>,
}

impl<'i, 'a> SearchState<'i, 'a> {
    fn new(index: &'i EligibilityIndex<'a>) -> Self {
        let caps: Vec<u32> = index
            .snapshot()
            .teachers()
            .iter()
            .map(|t| t.max_minutes())
            .collect();
        let mut domains = Domains::new(index);
        // A single session longer than the teacher's weekly ceiling never fits.
        for req in 0..index.len() {
            for (value, c) in index.candidates(req).iter().enumerate() {
                if index.slot_minutes(c.slot) > caps[c.teacher] {
                    domains.remove(req, value);
                }
            }
        }
        let active = (0..index.len()).map(|req| domains.size(req) > 0).collect();
        Self {
            index,
            domains,
            placement: Placement::empty(index.len()),
            minutes: vec![0; caps.len()],
            caps,
            active,
        }
    }

    fn is_open(&self, req: usize) -> bool {
        self.active[req] && self.placement.get(req).is_none()
    }

    /// MRV, then highest dynamic degree, then lowest index.
    fn select_variable(&self) -> Option<usize> {
        (0..self.index.len())
            .filter(|&req| self.is_open(req))
            .min_by_key(|&req| {
                let open_neighbors = self
                    .index
                    .neighbors(req)
                    .iter()
                    .filter(|&&n| self.is_open(n))
                    .count();
                (self.domains.size(req), std::cmp::Reverse(open_neighbors), req)
            })
    }

    /// Whether placing `chosen` makes `other` infeasible.
    fn excludes(&self, chosen: Candidate, other: Candidate) -> bool {
        self.index.clashes(chosen, other)
            || (other.teacher == chosen.teacher
                && self.minutes[chosen.teacher]
                    + self.index.slot_minutes(chosen.slot)
                    + self.index.slot_minutes(other.slot)
                    > self.caps[chosen.teacher])
    }

    /// Live values of `var`, least constraining first.
    fn order_values(&self, var: usize) -> Vec<usize> {
        let candidates = self.index.candidates(var);
        let mut scored: Vec<(usize, usize)> = self
            .domains
            .values(var)
            .map(|value| {
                let chosen = candidates[value];
                let removed: usize = self
                    .index
                    .neighbors(var)
                    .iter()
                    .filter(|&&n| self.is_open(n))
                    .map(|&n| {
                        let others = self.index.candidates(n);
                        self.domains
                            .values(n)
                            .filter(|&v| self.excludes(chosen, others[v]))
                            .count()
                    })
                    .sum();
                (removed, value)
            })
            .collect();
        scored.sort_unstable();
        scored.into_iter().map(|(_, value)| value).collect()
    }

    /// Assigns and forward-checks. Returns `false` on a domain wipe-out;
    /// the caller rewinds the trail either way.
    fn assign(&mut self, var: usize, value: usize) -> bool {
        let index = self.index;
        let chosen = index.candidates(var)[value];
        let mut consistent = true;
        for &n in index.neighbors(var) {
            if !self.is_open(n) {
                continue;
            }
            let others = index.candidates(n);
            let doomed: Vec<usize> = self
                .domains
                .values(n)
                .filter(|&v| self.excludes(chosen, others[v]))
                .collect();
            for v in doomed {
                self.domains.remove(n, v);
            }
            if self.domains.size(n) == 0 {
                consistent = false;
                break;
            }
        }
        self.placement.set(var, Some(value));
        self.minutes[chosen.teacher] += index.slot_minutes(chosen.slot);
        consistent
    }

    fn unassign(&mut self, var: usize) {
        if let Some(value) = self.placement.get(var) {
            let c = self.index.candidates(var)[value];
            self.minutes[c.teacher] -= self.index.slot_minutes(c.slot);
            self.placement.set(var, None);
        }
    }
}

/// Runs the search until the tree is exhausted, a full placement is
/// found, or `node_limit`/`budget` stops it.
///
/// `on_improve` sees every partial placement that assigns more
/// requirements than any before it, in search order.
pub(crate) fn backtrack(
    index: &EligibilityIndex<'_>,
    node_limit: u64,
    budget: &SearchBudget,
    mut on_improve: impl FnMut(&Placement),
) -> SearchResult {
    let mut state = SearchState::new(index);
    let mut best = state.placement.clone();
    let mut best_count = 0;
    let mut stack: Vec<ChoicePoint> = Vec::new();
    let mut nodes = 0u64;
    let mut backtracks = 0u64;
    let mut max_depth = 0usize;

    let termination = 'search: loop {
        let Some(var) = state.select_variable() else {
            break 'search Termination::Completed;
        };
        let values = state.order_values(var);
        stack.push(ChoicePoint {
            var,
            values,
            next: 0,
            trail_mark: state.domains.mark(),
        });
        max_depth = max_depth.max(stack.len());

        loop {
            let Some(top) = stack.last_mut() else {
                // Tree exhausted without a full placement.
                break 'search Termination::Completed;
            };
            let (var, mark) = (top.var, top.trail_mark);
            state.unassign(var);
            state.domains.undo_to(mark);

            let Some(&value) = top.values.get(top.next) else {
                stack.pop();
                backtracks += 1;
                continue;
            };
            top.next += 1;

            if let Some(reason) = budget.exhausted(nodes) {
                break 'search reason;
            }
            if budget.max_iterations().is_none() && nodes >= node_limit {
                break 'search Termination::IterationLimit;
            }
            nodes += 1;

            // The placement stays clash-free even when a neighbor is wiped
            // out, so it still counts as a partial result.
            let consistent = state.assign(var, value);
            let assigned = state.placement.assigned_count();
            if assigned > best_count {
                best_count = assigned;
                best = state.placement.clone();
                on_improve(&best);
            }
            if consistent {
                break;
            }
        }
    };

    SearchResult {
        best,
        nodes,
        max_depth,
        backtracks,
        termination,
    }
}

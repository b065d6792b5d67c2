//! Candidate domains with an undo trail.

use crate::eligibility::EligibilityIndex;

/// Live candidate indices per requirement.
///
/// Removals are recorded on a trail so a choice point can restore every
/// domain it pruned by rewinding to its mark.
#[derive(Debug, Clone)]
pub(crate) struct Domains {
    alive: Vec<Vec<bool>>,
    size: Vec<usize>,
    trail: Vec<(usize, usize)>,
}

impl Domains {
    /// Full domains: every candidate of every requirement.
    pub fn new(index: &EligibilityIndex<'_>) -> Self {
        let alive: Vec<Vec<bool>> = (0..index.len())
            .map(|req| vec![true; index.scarcity(req)])
            .collect();
        let size = alive.iter().map(Vec::len).collect();
        Self {
            alive,
            size,
            trail: Vec::new(),
        }
    }

    #[inline]
    pub fn size(&self, req: usize) -> usize {
        self.size[req]
    }

    #[inline]
    pub fn is_alive(&self, req: usize, value: usize) -> bool {
        self.alive[req][value]
    }

    /// Live values of a requirement, ascending.
    pub fn values(&self, req: usize) -> impl Iterator<Item = usize> + '_ {
        self.alive[req]
            .iter()
            .enumerate()
            .filter(|(_, &alive)| alive)
            .map(|(v, _)| v)
    }

    /// Removes a value. Returns `false` if it was already gone.
    pub fn remove(&mut self, req: usize, value: usize) -> bool {
        if !self.alive[req][value] {
            return false;
        }
        self.alive[req][value] = false;
        self.size[req] -= 1;
        self.trail.push((req, value));
        true
    }

    /// Current trail position.
    #[inline]
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Restores every removal made after `mark`.
    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((req, value)) = self.trail.pop() {
                self.alive[req][value] = true;
                self.size[req] += 1;
            }
        }
    }
}

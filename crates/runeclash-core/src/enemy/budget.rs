//! Per-enemy, per-skill usage budget.
//!
//! Remaining uses are reset to their maxima at the start of every enemy turn
//! and consumed by selection. Between turns, external effects may raise or
//! lower either the remaining uses or the maxima.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::skill::Combination;

/// Remaining and maximum uses for one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEntry {
    /// Skill key
    pub combination: Combination,
    /// Uses restored on reset
    pub max_uses: u32,
    /// Uses left this turn
    pub remaining: u32,
}

/// Usage budget for one enemy, in skill-list order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageBudget {
    entries: Vec<BudgetEntry>,
    misconfigured: bool,
}

impl UsageBudget {
    /// Pairs each skill with its maximum uses.
    ///
    /// A length mismatch is logged and yields a misconfigured, empty budget:
    /// the enemy then has no usable skills.
    #[must_use]
    pub fn new(owner: &str, skills: &[Combination], max_uses: &[u32]) -> Self {
        if skills.len() != max_uses.len() {
            warn!(
                enemy = owner,
                skills = skills.len(),
                max_uses = max_uses.len(),
                "usage budget does not match skill list, enemy will select nothing"
            );
            return Self {
                entries: Vec::new(),
                misconfigured: true,
            };
        }
        let entries = skills
            .iter()
            .zip(max_uses)
            .map(|(combination, &max)| BudgetEntry {
                combination: combination.clone(),
                max_uses: max,
                remaining: max,
            })
            .collect();
        Self {
            entries,
            misconfigured: false,
        }
    }

    /// Returns true if construction detected a length mismatch.
    #[must_use]
    pub const fn is_misconfigured(&self) -> bool {
        self.misconfigured
    }

    /// Entries in skill-list order.
    #[must_use]
    pub fn entries(&self) -> &[BudgetEntry] {
        &self.entries
    }

    /// Restores every skill's remaining uses to its maximum.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.remaining = entry.max_uses;
        }
    }

    /// Remaining uses for a skill; 0 when unknown.
    #[must_use]
    pub fn remaining(&self, combination: &Combination) -> u32 {
        self.entry(combination).map_or(0, |e| e.remaining)
    }

    /// Maximum uses for a skill; 0 when unknown.
    #[must_use]
    pub fn max_uses(&self, combination: &Combination) -> u32 {
        self.entry(combination).map_or(0, |e| e.max_uses)
    }

    /// Consumes one use, floored at zero.
    pub fn consume(&mut self, combination: &Combination) {
        self.decrease_remaining(combination, 1);
    }

    /// Raises remaining uses, clamped to the maximum.
    pub fn increase_remaining(&mut self, combination: &Combination, amount: u32) {
        if let Some(entry) = self.entry_mut(combination) {
            entry.remaining = entry.remaining.saturating_add(amount).min(entry.max_uses);
        }
    }

    /// Lowers remaining uses, floored at zero.
    pub fn decrease_remaining(&mut self, combination: &Combination, amount: u32) {
        if let Some(entry) = self.entry_mut(combination) {
            entry.remaining = entry.remaining.saturating_sub(amount);
        }
    }

    /// Raises a skill's maximum uses.
    pub fn increase_max(&mut self, combination: &Combination, amount: u32) {
        if let Some(entry) = self.entry_mut(combination) {
            entry.max_uses = entry.max_uses.saturating_add(amount);
            debug!(%combination, max = entry.max_uses, "max uses increased");
        }
    }

    /// Lowers a skill's maximum uses, floored at zero.
    ///
    /// Remaining uses above the new maximum are clamped down.
    pub fn decrease_max(&mut self, combination: &Combination, amount: u32) {
        if let Some(entry) = self.entry_mut(combination) {
            entry.max_uses = entry.max_uses.saturating_sub(amount);
            entry.remaining = entry.remaining.min(entry.max_uses);
            debug!(%combination, max = entry.max_uses, "max uses decreased");
        }
    }

    fn entry(&self, combination: &Combination) -> Option<&BudgetEntry> {
        self.entries.iter().find(|e| &e.combination == combination)
    }

    fn entry_mut(&mut self, combination: &Combination) -> Option<&mut BudgetEntry> {
        let entry = self.entries.iter_mut().find(|e| &e.combination == combination);
        if entry.is_none() {
            warn!(%combination, "skill not in usage budget");
        }
        entry
    }
}

//! Player input buffering.
//!
//! [`InputSurface`] turns direction tokens into chains:
//! - `submit_direction` appends to the pending combination, up to the cap
//! - `link` closes the pending combination into an open chain
//! - `confirm` closes the pending combination and the open chain together
//! - `clear` drops the pending combination
//!
//! # Example
//!
//! ```
//! use runeclash_core::combatant::CombatantId;
//! use runeclash_core::input::InputSurface;
//! use runeclash_core::skill::Direction;
//!
//! let mut input = InputSurface::new(4);
//! input.submit_direction(Direction::Up);
//! input.submit_direction(Direction::Left);
//! input.link();
//! input.submit_direction(Direction::Down);
//!
//! let chain = input.confirm(CombatantId::PLAYER).unwrap();
//! assert_eq!(chain.to_string(), "[WA, S]");
//! ```

use tracing::trace;

use crate::chain::ActionChain;
use crate::combatant::CombatantId;
use crate::skill::{Combination, Direction};

/// Pending input buffer for the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSurface {
    cap: usize,
    pending: Vec<Direction>,
    open_chain: Vec<Combination>,
}

impl InputSurface {
    /// Creates a surface accepting at most `cap` directions per combination.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            pending: Vec::with_capacity(cap),
            open_chain: Vec::new(),
        }
    }

    /// Maximum directions per combination.
    #[must_use]
    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Directions entered since the last link, confirm or clear.
    #[must_use]
    pub fn pending(&self) -> &[Direction] {
        &self.pending
    }

    /// The pending directions as a combination.
    #[must_use]
    pub fn pending_combination(&self) -> Combination {
        Combination::from_directions(&self.pending)
    }

    /// Combinations linked into the chain being built.
    #[must_use]
    pub fn open_chain(&self) -> &[Combination] {
        &self.open_chain
    }

    /// Appends a direction. Returns false if the cap is reached.
    pub fn submit_direction(&mut self, direction: Direction) -> bool {
        if self.pending.len() >= self.cap {
            trace!(%direction, cap = self.cap, "input cap reached");
            return false;
        }
        self.pending.push(direction);
        true
    }

    /// Moves the pending combination into the open chain.
    ///
    /// Returns false if nothing was pending.
    pub fn link(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let combo = self.pending_combination();
        self.pending.clear();
        self.open_chain.push(combo);
        true
    }

    /// Closes the open chain, including any pending combination.
    ///
    /// Returns `None` when there was nothing to submit.
    pub fn confirm(&mut self, submitter: CombatantId) -> Option<ActionChain> {
        self.link();
        if self.open_chain.is_empty() {
            return None;
        }
        let combinations = std::mem::take(&mut self.open_chain);
        Some(ActionChain::new(combinations, submitter))
    }

    /// Drops the pending combination. Linked combinations stay open.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Turns whatever is uncommitted into a final chain.
    pub fn finalize(&mut self, submitter: CombatantId) -> Option<ActionChain> {
        self.confirm(submitter)
    }

    /// Drops all buffered input.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.open_chain.clear();
    }
}

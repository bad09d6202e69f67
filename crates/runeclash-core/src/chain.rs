//! Action chains and per-side queues.
//!
//! An [`ActionChain`] is one submitted play: an ordered list of combinations.
//! An [`ActionQueue`] is the FIFO of chains one side submitted during its
//! turn. The clash resolver works on a clone, so the live queue is never
//! consumed in place.
//!
//! # Example
//!
//! ```
//! use runeclash_core::chain::{ActionChain, ActionQueue};
//! use runeclash_core::combatant::{CombatantId, Side};
//!
//! let mut queue = ActionQueue::new(Side::Player);
//! queue.push(ActionChain::new(["WA", "WASD"], CombatantId::PLAYER));
//! queue.push(ActionChain::single("S", CombatantId::PLAYER));
//!
//! let snapshot = queue.snapshot();
//! assert_eq!(snapshot.chains, vec![vec!["WA", "WASD"], vec!["S"]]);
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, Side};
use crate::skill::Combination;

// =============================================================================
// Action Chain
// =============================================================================

/// Ordered combinations submitted as one unit for clash comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChain {
    combinations: Vec<Combination>,
    submitted_by: CombatantId,
}

impl ActionChain {
    /// Creates a chain from combinations in submission order.
    pub fn new<I, C>(combinations: I, submitted_by: CombatantId) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Combination>,
    {
        Self {
            combinations: combinations.into_iter().map(Into::into).collect(),
            submitted_by,
        }
    }

    /// Creates a one-entry chain.
    pub fn single(combination: impl Into<Combination>, submitted_by: CombatantId) -> Self {
        Self {
            combinations: vec![combination.into()],
            submitted_by,
        }
    }

    /// Combinations in submission order.
    #[must_use]
    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    /// First combination, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Combination> {
        self.combinations.first()
    }

    /// Combatant that submitted the chain.
    #[must_use]
    pub const fn submitted_by(&self) -> CombatantId {
        self.submitted_by
    }

    /// Number of combinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    /// Returns true if the chain has no combinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

impl fmt::Display for ActionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, combo) in self.combinations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{combo}")?;
        }
        write!(f, "]")
    }
}

// =============================================================================
// Action Queue
// =============================================================================

/// Display-ready copy of a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Side owning the queue
    pub side: Side,
    /// Each chain as its combination strings
    pub chains: Vec<Vec<String>>,
}

/// FIFO of chains submitted by one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionQueue {
    side: Side,
    chains: VecDeque<ActionChain>,
}

impl ActionQueue {
    /// Creates an empty queue for `side`.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            chains: VecDeque::new(),
        }
    }

    /// Side owning the queue.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Appends a chain. Empty chains are dropped.
    pub fn push(&mut self, chain: ActionChain) {
        if !chain.is_empty() {
            self.chains.push_back(chain);
        }
    }

    /// Removes and returns the oldest chain.
    pub fn pop(&mut self) -> Option<ActionChain> {
        self.chains.pop_front()
    }

    /// Returns the oldest chain without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&ActionChain> {
        self.chains.front()
    }

    /// Empties the queue.
    pub fn clear(&mut self) {
        self.chains.clear();
    }

    /// Number of queued chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Iterates over queued chains, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActionChain> {
        self.chains.iter()
    }

    /// Builds a display snapshot.
    #[must_use]
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            side: self.side,
            chains: self
                .chains
                .iter()
                .map(|c| c.combinations().iter().map(ToString::to_string).collect())
                .collect(),
        }
    }
}

impl Extend<ActionChain> for ActionQueue {
    fn extend<I: IntoIterator<Item = ActionChain>>(&mut self, iter: I) {
        for chain in iter {
            self.push(chain);
        }
    }
}

//! Combatant identity and sides.
//!
//! - [`CombatantId`]: unique identifier for a participant in an encounter
//! - [`Side`]: which half of the two-sided fight a combatant belongs to
//! - [`Combatant`]: the seam through which skills read and mutate a
//!   participant's [`StatSheet`]
//!
//! # Example
//!
//! ```
//! use runeclash_core::combatant::{CombatantId, Side};
//!
//! let id = CombatantId::new(3);
//! assert_eq!(id.as_u64(), 3);
//! assert_eq!(Side::Player.opponent(), Side::Enemy);
//! ```

use runestat::StatSheet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a combatant.
///
/// The player is always [`CombatantId::PLAYER`]; enemies are numbered from 1
/// in encounter order. Ordering follows the numeric value so iteration over
/// combatants is deterministic.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// Identifier reserved for the player.
    pub const PLAYER: Self = Self(0);

    /// Creates a new `CombatantId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CombatantId({})", self.0)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CombatantId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<CombatantId> for u64 {
    fn from(id: CombatantId) -> Self {
        id.0
    }
}

/// One half of the fight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The single player-controlled combatant
    Player,
    /// The enemy group
    Enemy,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
        }
    }
}

/// Anything that can cast or receive a skill.
pub trait Combatant {
    /// Returns the combatant's identifier.
    fn id(&self) -> CombatantId;

    /// Returns the side the combatant fights on.
    fn side(&self) -> Side;

    /// Returns the combatant's stat sheet.
    fn sheet(&self) -> &StatSheet;

    /// Returns the combatant's stat sheet for mutation.
    fn sheet_mut(&mut self) -> &mut StatSheet;

    /// Returns true once the combatant's health is at or below zero.
    fn is_defeated(&self) -> bool {
        self.sheet().is_defeated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_numerically() {
        assert!(CombatantId::PLAYER < CombatantId::new(1));
        assert!(CombatantId::new(2) < CombatantId::new(10));
    }

    #[test]
    fn id_formatting() {
        let id = CombatantId::new(7);
        assert_eq!(format!("{id}"), "7");
        assert_eq!(format!("{id:?}"), "CombatantId(7)");
        assert_eq!(u64::from(id), 7);
    }

    #[test]
    fn side_opponent_is_involution() {
        for side in [Side::Player, Side::Enemy] {
            assert_eq!(side.opponent().opponent(), side);
        }
    }
}

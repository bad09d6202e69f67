//! # Runeclash Core
//!
//! Turn-based clash combat rules engine.
//!
//! A fight is one player against a group of enemies, played in repeating
//! rounds of three phases:
//!
//! 1. **Enemy turn**: every living enemy draws skills from a health-gated,
//!    usage-budgeted pool and queues them
//! 2. **Player turn**: the player enters direction combinations against a
//!    countdown sized by the speed differential
//! 3. **Clash turn**: both queues are paired chain by chain; each pairing is
//!    a Win, Tie or Lose deciding whose skills land
//!
//! ## Modules
//!
//! - [`skill`]: directions, combinations, skill definitions, catalog
//! - [`effect`]: the damage/healing formula
//! - [`executor`]: applying effects to combatants
//! - [`chain`] and [`input`]: chains, queues, the player input buffer
//! - [`enemy`]: profiles, phases, usage budgets, action selection
//! - [`clash`]: pairing and arbitration
//! - [`orchestrator`]: the phase state machine
//! - [`observer`]: notifications for display and playback
//!
//! Stats and health live in the [`runestat`] crate.
//!
//! ## Usage
//!
//! ```
//! use runeclash_core::prelude::*;
//! use runestat::{SheetConfig, StatDefinition};
//!
//! let catalog = SkillCatalog::from_skills([
//!     SkillDefinition::damage("Rune Strike", "WA", 30.0),
//!     SkillDefinition::damage("Claw", "S", 12.0),
//! ])?;
//! let player = PlayerProfile {
//!     name: "Hero".to_string(),
//!     stats: vec![StatDefinition::new("VIGOR", 1.0), StatDefinition::new("SPD", 15.0)],
//!     sheet: SheetConfig::default(),
//!     loadout: vec!["WA".into()],
//! };
//! let slime = EnemyProfile::new("Slime", vec![StatDefinition::new("VIGOR", 0.5)], &["S"]);
//!
//! let encounter = Encounter::new(catalog, &player, &[slime])?;
//! let config = CombatConfig::default().with_auto_start(true);
//! let mut combat = TurnOrchestrator::new(encounter, config, 42)?;
//!
//! combat.start();
//! combat.step(5.0); // enemy turn over, countdown running
//! combat.submit_direction(Direction::Up);
//! combat.submit_direction(Direction::Left);
//! combat.confirm();
//! # Ok::<(), runeclash_core::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chain;
pub mod clash;
pub mod combatant;
pub mod config;
pub mod effect;
pub mod encounter;
pub mod enemy;
pub mod error;
pub mod executor;
pub mod input;
pub mod observer;
pub mod orchestrator;
pub mod skill;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use config::CombatConfig;
pub use error::ConfigError;
pub use orchestrator::{GameOutcome, TurnOrchestrator, TurnPhase};

/// Commonly used types.
pub mod prelude {
    pub use crate::chain::{ActionChain, ActionQueue, QueueSnapshot};
    pub use crate::clash::{ClashOutcome, ClashReport, ClashResolver, ClashRule, MultisetRule};
    pub use crate::combatant::{Combatant, CombatantId, Side};
    pub use crate::config::CombatConfig;
    pub use crate::effect::EffectCalculator;
    pub use crate::encounter::{Encounter, Player, PlayerProfile};
    pub use crate::enemy::{Enemy, EnemyActionSelector, EnemyProfile, PhaseGates, SkillPhase};
    pub use crate::error::ConfigError;
    pub use crate::executor::{SkillExecution, SkillExecutor};
    pub use crate::input::InputSurface;
    pub use crate::observer::{CombatEvent, CombatObserver, EventLog};
    pub use crate::orchestrator::{GameOutcome, Suspension, TurnOrchestrator, TurnPhase};
    pub use crate::skill::{
        Combination, Direction, EffectKind, KnownSkills, SkillCatalog, SkillDefinition,
    };
}

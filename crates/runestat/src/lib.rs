//! # Runestat
//!
//! Stat and modifier engine for Runeclash combatants.
//!
//! Runestat models a combatant's numbers and nothing else. It knows nothing
//! about skills, turns or clashes:
//!
//! - **[`Modifier`]**: an immutable flat or percentage transformation
//! - **[`Stat`]**: a base value plus modifiers, evaluated flat-first then
//!   percentage in insertion order
//! - **[`StatDefinition`]**: a template that clamps stat values
//! - **[`StatSheet`]**: every stat of one combatant, with health derived from
//!   a designated stat and an explicit, drainable event record
//!
//! ## Quick Start
//!
//! ```
//! use runestat::{Modifier, StatDefinition, StatSheet};
//!
//! let mut sheet = StatSheet::new(
//!     "hero",
//!     &[
//!         StatDefinition::new("VIGOR", 1.0),
//!         StatDefinition::new("ATK", 10.0),
//!     ],
//! )?;
//!
//! sheet.apply_modifier("ATK", Modifier::flat(5.0, "sword"));
//! sheet.apply_modifier("ATK", Modifier::percentage(50.0, "rage"));
//! assert!((sheet.stat_value_or_zero("ATK") - 22.5).abs() < 1e-4);
//! # Ok::<(), runestat::SheetError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod definition;
pub mod error;
pub mod modifier;
pub mod sheet;
pub mod stat;

// Re-exports for convenience
pub use definition::StatDefinition;
pub use error::SheetError;
pub use modifier::{Modifier, ModifierKind, ModifierSource};
pub use sheet::{SheetConfig, SheetEvent, StatSheet};
pub use stat::Stat;

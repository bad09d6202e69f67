//! Skill reference data.
//!
//! - [`Direction`]: one input token (`W`, `A`, `S`, `D`)
//! - [`Combination`]: the direction string that identifies a skill
//! - [`SkillDefinition`]: immutable description of a skill's effect
//! - [`SkillCatalog`]: read-only `combination -> skill` lookup, populated
//!   before combat starts
//! - [`KnownSkills`]: the combinations one combatant is able to resolve
//!
//! # Example
//!
//! ```
//! use runeclash_core::skill::{Combination, KnownSkills, SkillCatalog, SkillDefinition};
//!
//! let catalog = SkillCatalog::from_skills([
//!     SkillDefinition::damage("Rune Strike", "WA", 20.0).with_scaling("ATK", 2.0),
//!     SkillDefinition::healing("Mend", "SS", 15.0),
//! ])
//! .unwrap();
//!
//! let known: KnownSkills = [Combination::from("WA")].into_iter().collect();
//! assert!(known.resolve(&Combination::from("WA"), &catalog).is_some());
//! assert!(known.resolve(&Combination::from("SS"), &catalog).is_none());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use runestat::Modifier;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Nominal playback duration used when a skill does not declare one.
pub const DEFAULT_NOMINAL_DURATION: f32 = 1.0;

// =============================================================================
// Direction
// =============================================================================

/// A single directional input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `W`
    Up,
    /// `A`
    Left,
    /// `S`
    Down,
    /// `D`
    Right,
}

impl Direction {
    /// Returns the token character for this direction.
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Up => 'W',
            Self::Left => 'A',
            Self::Down => 'S',
            Self::Right => 'D',
        }
    }

    /// Parses a token character (case-insensitive).
    #[must_use]
    pub fn from_token(token: char) -> Option<Self> {
        match token.to_ascii_uppercase() {
            'W' => Some(Self::Up),
            'A' => Some(Self::Left),
            'S' => Some(Self::Down),
            'D' => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Error returned when parsing a [`Direction`] from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a direction token: {:?}", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_token(c).ok_or_else(|| ParseDirectionError(s.into())),
            _ => Err(ParseDirectionError(s.into())),
        }
    }
}

// =============================================================================
// Combination
// =============================================================================

/// The direction string that identifies a skill (e.g. `"WA"`).
///
/// Combinations are the canonical skill key everywhere in the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination(String);

impl Combination {
    /// Creates a combination from a raw string.
    #[must_use]
    pub fn new(combination: &str) -> Self {
        Self(combination.to_string())
    }

    /// Concatenates direction tokens into a combination.
    #[must_use]
    pub fn from_directions(directions: &[Direction]) -> Self {
        Self(directions.iter().map(|d| d.token()).collect())
    }

    /// Returns the combination as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the combination has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Combination {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Combination {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Skill Definition
// =============================================================================

/// Whether a skill removes or restores health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reduces the target's health; mitigated by defense.
    Damage,
    /// Restores the target's health; never mitigated.
    Healing,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Damage => write!(f, "Damage"),
            Self::Healing => write!(f, "Healing"),
        }
    }
}

/// Adds `attacker.stat(stat).final_value() * multiplier` to a skill's effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingFactor {
    /// Attacker stat to read
    pub stat: String,
    /// Multiplier applied to the stat's final value
    pub multiplier: f32,
}

/// Immutable description of a skill.
///
/// Shared by every combatant able to use it (via `Arc` in the catalog).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Display name
    pub name: String,
    /// Input combination; the catalog key
    pub combination: Combination,
    /// Damage or healing
    pub effect: EffectKind,
    /// Value before scaling
    pub base_value: f32,
    /// Stat-based additions, applied in order
    #[serde(default)]
    pub scaling: Vec<ScalingFactor>,
    /// Applied to the scaled value strictly in declaration order
    #[serde(default)]
    pub post_modifiers: Vec<Modifier>,
    /// Seconds of playback before the execution reports completion
    #[serde(default = "default_nominal_duration")]
    pub nominal_duration: f32,
}

fn default_nominal_duration() -> f32 {
    DEFAULT_NOMINAL_DURATION
}

impl SkillDefinition {
    /// Creates a skill with no scaling or post-modifiers.
    #[must_use]
    pub fn new(name: &str, combination: &str, effect: EffectKind, base_value: f32) -> Self {
        Self {
            name: name.to_string(),
            combination: Combination::new(combination),
            effect,
            base_value,
            scaling: Vec::new(),
            post_modifiers: Vec::new(),
            nominal_duration: DEFAULT_NOMINAL_DURATION,
        }
    }

    /// Creates a damage skill.
    #[must_use]
    pub fn damage(name: &str, combination: &str, base_value: f32) -> Self {
        Self::new(name, combination, EffectKind::Damage, base_value)
    }

    /// Creates a healing skill.
    #[must_use]
    pub fn healing(name: &str, combination: &str, base_value: f32) -> Self {
        Self::new(name, combination, EffectKind::Healing, base_value)
    }

    /// Appends a scaling factor.
    #[must_use]
    pub fn with_scaling(mut self, stat: &str, multiplier: f32) -> Self {
        self.scaling.push(ScalingFactor {
            stat: stat.to_string(),
            multiplier,
        });
        self
    }

    /// Appends a post-scaling modifier.
    #[must_use]
    pub fn with_post_modifier(mut self, modifier: Modifier) -> Self {
        self.post_modifiers.push(modifier);
        self
    }

    /// Sets the nominal playback duration in seconds.
    #[must_use]
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.nominal_duration = seconds;
        self
    }
}

// =============================================================================
// Skill Catalog
// =============================================================================

/// Read-only lookup from combination to skill.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: BTreeMap<Combination, Arc<SkillDefinition>>,
}

impl SkillCatalog {
    /// Builds a catalog, rejecting empty or duplicate combinations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCombination`] or
    /// [`ConfigError::DuplicateCombination`].
    pub fn from_skills(
        skills: impl IntoIterator<Item = SkillDefinition>,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for skill in skills {
            if skill.combination.is_empty() {
                return Err(ConfigError::EmptyCombination(skill.name));
            }
            if map.contains_key(&skill.combination) {
                return Err(ConfigError::DuplicateCombination(
                    skill.combination.to_string(),
                ));
            }
            map.insert(skill.combination.clone(), Arc::new(skill));
        }
        Ok(Self { skills: map })
    }

    /// Looks up a skill by combination.
    #[must_use]
    pub fn get(&self, combination: &Combination) -> Option<&Arc<SkillDefinition>> {
        self.skills.get(combination)
    }

    /// Looks up a skill by display name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Arc<SkillDefinition>> {
        self.skills.values().find(|s| s.name == name)
    }

    /// Returns true if the combination is catalogued.
    #[must_use]
    pub fn contains(&self, combination: &Combination) -> bool {
        self.skills.contains_key(combination)
    }

    /// Iterates over the skills in combination order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SkillDefinition>> {
        self.skills.values()
    }

    /// Number of catalogued skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

// =============================================================================
// Known Skills
// =============================================================================

/// The set of combinations a combatant can resolve into skills.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSkills(BTreeSet<Combination>);

impl KnownSkills {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combination. Returns false if it was already known.
    pub fn insert(&mut self, combination: Combination) -> bool {
        self.0.insert(combination)
    }

    /// Forgets every combination.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns true if the combination is known.
    #[must_use]
    pub fn contains(&self, combination: &Combination) -> bool {
        self.0.contains(combination)
    }

    /// Number of known combinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over known combinations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Combination> {
        self.0.iter()
    }

    /// Resolves a combination through this set and the catalog.
    ///
    /// Unknown or uncatalogued combinations are logged and yield `None`.
    #[must_use]
    pub fn resolve(
        &self,
        combination: &Combination,
        catalog: &SkillCatalog,
    ) -> Option<Arc<SkillDefinition>> {
        if !self.contains(combination) {
            warn!(%combination, "combination not known by caster");
            return None;
        }
        let skill = catalog.get(combination).cloned();
        if skill.is_none() {
            warn!(%combination, "combination missing from skill catalog");
        }
        skill
    }
}

impl FromIterator<Combination> for KnownSkills {
    fn from_iter<I: IntoIterator<Item = Combination>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Combination> for KnownSkills {
    fn extend<I: IntoIterator<Item = Combination>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

//! Enemies: profiles, health-gated skill phases, usage budgets and action
//! selection.
//!
//! An [`EnemyProfile`] is the serialisable description of one enemy. Building
//! an [`Enemy`] from it validates the profile against the skill catalog.
//!
//! # Phases
//!
//! The enemy's skill list is split into three contiguous index ranges. Which
//! range is available depends on health, using strict comparisons:
//!
//! | Condition                              | Pool    |
//! |----------------------------------------|---------|
//! | `current > max * phase2_threshold`     | Phase 1 |
//! | `current > max * phase3_threshold`     | Phase 2 |
//! | otherwise                              | Phase 3 |
//!
//! Ranges that run past the end of the skill list are clamped.

mod budget;
mod selector;

pub use budget::{BudgetEntry, UsageBudget};
pub use selector::EnemyActionSelector;

use std::fmt;
use std::sync::Arc;

use runestat::{SheetConfig, StatDefinition, StatSheet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combatant::{Combatant, CombatantId, Side};
use crate::error::ConfigError;
use crate::skill::{Combination, KnownSkills, SkillCatalog, SkillDefinition};

// =============================================================================
// Phases
// =============================================================================

/// Health-gated skill pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillPhase {
    /// Healthy
    Phase1,
    /// Wounded
    Phase2,
    /// Critical
    Phase3,
}

impl SkillPhase {
    const fn index(self) -> usize {
        match self {
            Self::Phase1 => 0,
            Self::Phase2 => 1,
            Self::Phase3 => 2,
        }
    }
}

impl fmt::Display for SkillPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase {}", self.index() + 1)
    }
}

/// Contiguous slice of the skill list, as `start` plus `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRange {
    /// First index
    pub start: usize,
    /// Number of skills
    pub count: usize,
}

impl PhaseRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// Returns the clamped sub-slice of `items`.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start.min(items.len());
        let end = self.start.saturating_add(self.count).min(items.len());
        &items[start..end]
    }
}

/// Thresholds and ranges deciding which skills an enemy can use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseGates {
    /// Fraction of max health at or below which Phase 2 begins.
    pub phase2_threshold: f32,
    /// Fraction of max health at or below which Phase 3 begins.
    pub phase3_threshold: f32,
    /// Skill ranges for phases 1, 2 and 3.
    pub ranges: [PhaseRange; 3],
}

impl Default for PhaseGates {
    fn default() -> Self {
        Self {
            phase2_threshold: 0.66,
            phase3_threshold: 0.33,
            ranges: [
                PhaseRange::new(0, 3),
                PhaseRange::new(3, 3),
                PhaseRange::new(6, 3),
            ],
        }
    }
}

impl PhaseGates {
    /// Phase for the given health.
    #[must_use]
    pub fn phase_for(&self, current: f32, max: f32) -> SkillPhase {
        if current > max * self.phase2_threshold {
            SkillPhase::Phase1
        } else if current > max * self.phase3_threshold {
            SkillPhase::Phase2
        } else {
            SkillPhase::Phase3
        }
    }

    /// Returns true once health is strictly below the Phase-2 threshold.
    #[must_use]
    pub fn is_enraged(&self, current: f32, max: f32) -> bool {
        current < max * self.phase2_threshold
    }

    /// Range configured for `phase`.
    #[must_use]
    pub const fn range(&self, phase: SkillPhase) -> PhaseRange {
        self.ranges[phase.index()]
    }

    fn validate(&self, enemy: &str) -> Result<(), ConfigError> {
        let in_unit = |t: f32| (0.0..=1.0).contains(&t);
        if !in_unit(self.phase2_threshold)
            || !in_unit(self.phase3_threshold)
            || self.phase3_threshold > self.phase2_threshold
        {
            return Err(ConfigError::InvalidThresholds {
                enemy: enemy.to_string(),
                phase2: self.phase2_threshold,
                phase3: self.phase3_threshold,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Enemy Profile
// =============================================================================

fn default_max_skills_per_turn() -> usize {
    2
}

/// Serialisable description of one enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    /// Display name
    pub name: String,
    /// Stat definitions for the enemy's sheet
    pub stats: Vec<StatDefinition>,
    /// Health derivation
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Skill list, by combination, in phase-range order
    pub skills: Vec<Combination>,
    /// Maximum uses per turn, parallel to `skills`
    pub max_uses: Vec<u32>,
    /// Skills selected per turn before the enrage bonus
    #[serde(default = "default_max_skills_per_turn")]
    pub max_skills_per_turn: usize,
    /// Phase thresholds and ranges
    #[serde(default)]
    pub phases: PhaseGates,
}

impl EnemyProfile {
    /// Creates a profile with default phases and every skill at one use.
    #[must_use]
    pub fn new(name: &str, stats: Vec<StatDefinition>, skills: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            stats,
            sheet: SheetConfig::default(),
            skills: skills.iter().map(|s| Combination::from(*s)).collect(),
            max_uses: vec![1; skills.len()],
            max_skills_per_turn: default_max_skills_per_turn(),
            phases: PhaseGates::default(),
        }
    }

    /// Replaces the per-skill maximum uses.
    #[must_use]
    pub fn with_max_uses(mut self, max_uses: Vec<u32>) -> Self {
        self.max_uses = max_uses;
        self
    }

    /// Replaces the phase configuration.
    #[must_use]
    pub fn with_phases(mut self, phases: PhaseGates) -> Self {
        self.phases = phases;
        self
    }

    /// Sets the base number of skills selected per turn.
    #[must_use]
    pub fn with_max_skills_per_turn(mut self, count: usize) -> Self {
        self.max_skills_per_turn = count;
        self
    }
}

// =============================================================================
// Enemy
// =============================================================================

/// An enemy combatant.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: CombatantId,
    name: String,
    sheet: StatSheet,
    skills: Vec<Arc<SkillDefinition>>,
    known: KnownSkills,
    budget: UsageBudget,
    max_skills_per_turn: usize,
    gates: PhaseGates,
}

impl Enemy {
    /// Builds an enemy from its profile.
    ///
    /// A `max_uses` list that does not match the skill list is not an error:
    /// it is logged and the enemy selects nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid thresholds, invalid stats, or a
    /// skill missing from the catalog.
    pub fn new(
        id: CombatantId,
        profile: &EnemyProfile,
        catalog: &SkillCatalog,
    ) -> Result<Self, ConfigError> {
        profile.phases.validate(&profile.name)?;
        let sheet = StatSheet::with_config(&profile.name, &profile.stats, profile.sheet.clone())?;

        let skills = profile
            .skills
            .iter()
            .map(|combo| {
                catalog
                    .get(combo)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnknownSkill {
                        owner: profile.name.clone(),
                        combination: combo.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            name: profile.name.clone(),
            sheet,
            known: profile.skills.iter().cloned().collect(),
            budget: UsageBudget::new(&profile.name, &profile.skills, &profile.max_uses),
            skills,
            max_skills_per_turn: profile.max_skills_per_turn,
            gates: profile.phases.clone(),
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full configured skill list.
    #[must_use]
    pub fn skills(&self) -> &[Arc<SkillDefinition>] {
        &self.skills
    }

    /// Combinations this enemy can resolve.
    #[must_use]
    pub const fn known_skills(&self) -> &KnownSkills {
        &self.known
    }

    /// Usage budget.
    #[must_use]
    pub const fn budget(&self) -> &UsageBudget {
        &self.budget
    }

    /// Usage budget, for buffs and debuffs between turns.
    pub fn budget_mut(&mut self) -> &mut UsageBudget {
        &mut self.budget
    }

    /// Phase configuration.
    #[must_use]
    pub const fn gates(&self) -> &PhaseGates {
        &self.gates
    }

    /// Current health-gated phase.
    #[must_use]
    pub fn phase(&self) -> SkillPhase {
        self.gates
            .phase_for(self.sheet.current_health(), self.sheet.max_health())
    }

    /// Skills in the current phase's pool.
    ///
    /// A misconfigured enemy has none.
    #[must_use]
    pub fn available_skills(&self) -> &[Arc<SkillDefinition>] {
        if self.budget.is_misconfigured() {
            return &[];
        }
        self.gates.range(self.phase()).slice(&self.skills)
    }

    /// Skills to select this turn, including the enrage bonus.
    #[must_use]
    pub fn max_skills_this_turn(&self) -> usize {
        let bonus = usize::from(
            self.gates
                .is_enraged(self.sheet.current_health(), self.sheet.max_health()),
        );
        self.max_skills_per_turn + bonus
    }

    /// Looks up one of this enemy's skills by combination.
    #[must_use]
    pub fn skill_by_combination(&self, combination: &Combination) -> Option<&Arc<SkillDefinition>> {
        let skill = self.skills.iter().find(|s| &s.combination == combination);
        if skill.is_none() {
            warn!(enemy = %self.name, %combination, "no skill for combination");
        }
        skill
    }
}

impl Combatant for Enemy {
    fn id(&self) -> CombatantId {
        self.id
    }

    fn side(&self) -> Side {
        Side::Enemy
    }

    fn sheet(&self) -> &StatSheet {
        &self.sheet
    }

    fn sheet_mut(&mut self) -> &mut StatSheet {
        &mut self.sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(combos: &[&str]) -> SkillCatalog {
        SkillCatalog::from_skills(
            combos
                .iter()
                .map(|c| SkillDefinition::damage(&format!("skill-{c}"), c, 5.0)),
        )
        .unwrap()
    }

    const NINE: [&str; 9] = ["W", "A", "S", "D", "WA", "WS", "WD", "AS", "AD"];

    fn golem() -> Enemy {
        let profile = EnemyProfile::new("Golem", vec![StatDefinition::new("VIGOR", 1.0)], &NINE);
        Enemy::new(CombatantId::new(1), &profile, &catalog(&NINE)).unwrap()
    }

    fn combos(skills: &[Arc<SkillDefinition>]) -> Vec<&str> {
        skills.iter().map(|s| s.combination.as_str()).collect()
    }

    mod phase_tests {
        use super::*;

        #[test]
        fn full_health_is_phase_one() {
            let enemy = golem();
            assert_eq!(enemy.phase(), SkillPhase::Phase1);
            assert_eq!(combos(enemy.available_skills()), vec!["W", "A", "S"]);
        }

        #[test]
        fn exact_phase2_threshold_is_not_phase_one() {
            let gates = PhaseGates::default();
            let max = 150.0;
            let current = max * gates.phase2_threshold;
            assert_eq!(gates.phase_for(current, max), SkillPhase::Phase2);
        }

        #[test]
        fn exact_phase3_threshold_is_phase_three() {
            let gates = PhaseGates::default();
            assert_eq!(gates.phase_for(150.0 * 0.33, 150.0), SkillPhase::Phase3);
        }

        #[test]
        fn wounded_enemy_uses_phase_two_pool() {
            let mut enemy = golem();
            enemy.sheet_mut().set_current_health(75.0);
            assert_eq!(enemy.phase(), SkillPhase::Phase2);
            assert_eq!(combos(enemy.available_skills()), vec!["D", "WA", "WS"]);
        }

        #[test]
        fn ranges_clamp_to_skill_list() {
            let profile = EnemyProfile::new("Imp", vec![], &["W", "A", "S", "D", "WA"]);
            let mut enemy =
                Enemy::new(CombatantId::new(2), &profile, &catalog(&NINE)).unwrap();
            // Fallback max health 1000; 100 is Phase 3 whose range starts past the end
            enemy.sheet_mut().set_current_health(100.0);
            assert!(enemy.available_skills().is_empty());
            enemy.sheet_mut().set_current_health(500.0);
            assert_eq!(combos(enemy.available_skills()), vec!["D", "WA"]);
        }

        #[test]
        fn enrage_adds_one_skill() {
            let mut enemy = golem();
            assert_eq!(enemy.max_skills_this_turn(), 2);
            enemy.sheet_mut().set_current_health(90.0);
            assert_eq!(enemy.max_skills_this_turn(), 3);
        }
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn unknown_skill_is_rejected() {
            let profile = EnemyProfile::new("Golem", vec![], &["WASD"]);
            let err = Enemy::new(CombatantId::new(1), &profile, &catalog(&["W"])).unwrap_err();
            assert!(matches!(err, ConfigError::UnknownSkill { .. }));
        }

        #[test]
        fn inverted_thresholds_are_rejected() {
            let phases = PhaseGates {
                phase2_threshold: 0.2,
                phase3_threshold: 0.5,
                ..PhaseGates::default()
            };
            let profile = EnemyProfile::new("Golem", vec![], &["W"]).with_phases(phases);
            let err = Enemy::new(CombatantId::new(1), &profile, &catalog(&["W"])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidThresholds { .. }));
        }

        #[test]
        fn budget_mismatch_means_no_skills() {
            let profile =
                EnemyProfile::new("Golem", vec![], &["W", "A"]).with_max_uses(vec![1]);
            let enemy = Enemy::new(CombatantId::new(1), &profile, &catalog(&["W", "A"])).unwrap();
            assert!(enemy.budget().is_misconfigured());
            assert!(enemy.available_skills().is_empty());
        }

        #[test]
        fn profile_json_defaults() {
            let profile: EnemyProfile = serde_json::from_str(
                r#"{
                    "name": "Slime",
                    "stats": [{"name": "VIGOR", "default_value": 2.0}],
                    "skills": ["W"],
                    "max_uses": [3]
                }"#,
            )
            .unwrap();
            assert_eq!(profile.max_skills_per_turn, 2);
            assert_eq!(profile.phases, PhaseGates::default());
            assert_eq!(profile.sheet.health_stat, "VIGOR");
        }
    }
}

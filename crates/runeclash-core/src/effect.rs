//! Damage and healing formula.
//!
//! [`EffectCalculator::calculate`] is pure: it reads the attacker's and
//! defender's sheets and never mutates either.
//!
//! The calculation runs in this order:
//! 1. Start from the skill's base value
//! 2. Add `stat.final_value() * multiplier` for each scaling factor the
//!    attacker has (missing stats are logged and skipped)
//! 3. Apply post-modifiers strictly in declaration order
//! 4. Clamp to `>= 0`
//! 5. For damage against a defender, subtract `DEF * mitigation` and clamp
//!    to `>= 0` again
//!
//! # Example
//!
//! ```
//! use runeclash_core::effect::EffectCalculator;
//! use runeclash_core::skill::SkillDefinition;
//! use runestat::{StatDefinition, StatSheet};
//!
//! let attacker = StatSheet::new("hero", &[StatDefinition::new("ATK", 10.0)])?;
//! let defender = StatSheet::new("slime", &[StatDefinition::new("DEF", 0.1)])?;
//! let skill = SkillDefinition::damage("Rune Strike", "WA", 20.0).with_scaling("ATK", 2.0);
//!
//! let calc = EffectCalculator::new("DEF", 100.0);
//! assert!((calc.calculate(&skill, &attacker, None) - 40.0).abs() < 1e-4);
//! assert!((calc.calculate(&skill, &attacker, Some(&defender)) - 30.0).abs() < 1e-3);
//! # Ok::<(), runestat::SheetError>(())
//! ```

use runestat::StatSheet;
use tracing::{trace, warn};

use crate::config::CombatConfig;
use crate::skill::{EffectKind, SkillDefinition};

/// Turns a skill plus sheets into a final effect value.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectCalculator {
    defense_stat: String,
    mitigation: f32,
}

impl Default for EffectCalculator {
    fn default() -> Self {
        Self::from_config(&CombatConfig::default())
    }
}

impl EffectCalculator {
    /// Creates a calculator reading `defense_stat` and removing `mitigation`
    /// damage per defense point.
    #[must_use]
    pub fn new(defense_stat: &str, mitigation: f32) -> Self {
        Self {
            defense_stat: defense_stat.to_string(),
            mitigation,
        }
    }

    /// Creates a calculator from the encounter configuration.
    #[must_use]
    pub fn from_config(config: &CombatConfig) -> Self {
        Self::new(&config.defense_stat, config.defense_mitigation)
    }

    /// Name of the stat read for mitigation.
    #[must_use]
    pub fn defense_stat(&self) -> &str {
        &self.defense_stat
    }

    /// Damage removed per defense point.
    #[must_use]
    pub const fn mitigation(&self) -> f32 {
        self.mitigation
    }

    /// Computes the effect value before mitigation (steps 1-4).
    #[must_use]
    pub fn raw_effect(&self, skill: &SkillDefinition, attacker: &StatSheet) -> f32 {
        let mut effect = skill.base_value;

        for factor in &skill.scaling {
            match attacker.stat_value(&factor.stat) {
                Some(value) => effect += value * factor.multiplier,
                None => warn!(
                    skill = %skill.name,
                    attacker = attacker.name(),
                    stat = %factor.stat,
                    "scaling stat missing, skipped"
                ),
            }
        }

        for modifier in &skill.post_modifiers {
            effect = modifier.apply(effect);
        }

        effect.max(0.0)
    }

    /// Computes the final effect value.
    ///
    /// Mitigation applies only to [`EffectKind::Damage`] with a defender. A
    /// defender without the defense stat is not mitigated.
    #[must_use]
    pub fn calculate(
        &self,
        skill: &SkillDefinition,
        attacker: &StatSheet,
        defender: Option<&StatSheet>,
    ) -> f32 {
        let raw = self.raw_effect(skill, attacker);
        let effect = match (skill.effect, defender) {
            (EffectKind::Damage, Some(defender)) => {
                let defense = defender.stat_value_or_zero(&self.defense_stat);
                (raw - defense * self.mitigation).max(0.0)
            }
            _ => raw,
        };
        trace!(skill = %skill.name, raw, effect, "effect calculated");
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runestat::{Modifier, StatDefinition};

    fn sheet(name: &str, stats: &[(&str, f32)]) -> StatSheet {
        let defs: Vec<StatDefinition> = stats
            .iter()
            .map(|(n, v)| StatDefinition::new(n, *v))
            .collect();
        StatSheet::new(name, &defs).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    mod scaling_tests {
        use super::*;

        #[test]
        fn base_value_only() {
            let attacker = sheet("a", &[]);
            let skill = SkillDefinition::damage("Jab", "W", 12.0);
            let calc = EffectCalculator::default();
            assert!(approx(calc.calculate(&skill, &attacker, None), 12.0));
        }

        #[test]
        fn scaling_adds_stat_times_multiplier() {
            let attacker = sheet("a", &[("ATK", 10.0), ("INT", 4.0)]);
            let skill = SkillDefinition::damage("Combo", "WA", 20.0)
                .with_scaling("ATK", 2.0)
                .with_scaling("INT", 0.5);
            let calc = EffectCalculator::default();
            assert!(approx(calc.raw_effect(&skill, &attacker), 42.0));
        }

        #[test]
        fn missing_scaling_stat_is_skipped() {
            let attacker = sheet("a", &[("ATK", 10.0)]);
            let skill = SkillDefinition::damage("Combo", "WA", 20.0)
                .with_scaling("LUCK", 3.0)
                .with_scaling("ATK", 1.0);
            let calc = EffectCalculator::default();
            assert!(approx(calc.raw_effect(&skill, &attacker), 30.0));
        }
    }

    mod post_modifier_tests {
        use super::*;

        #[test]
        fn post_modifiers_apply_in_declaration_order() {
            let attacker = sheet("a", &[]);
            // (10 * 2) + 5 = 25, whereas flat-first grouping would give 30
            let skill = SkillDefinition::damage("Surge", "D", 10.0)
                .with_post_modifier(Modifier::percentage(100.0, "surge"))
                .with_post_modifier(Modifier::flat(5.0, "edge"));
            let calc = EffectCalculator::default();
            assert!(approx(calc.raw_effect(&skill, &attacker), 25.0));
        }

        #[test]
        fn raw_effect_is_clamped_at_zero() {
            let attacker = sheet("a", &[]);
            let skill = SkillDefinition::damage("Fizzle", "S", 5.0)
                .with_post_modifier(Modifier::flat(-50.0, "curse"));
            let calc = EffectCalculator::default();
            assert!(approx(calc.raw_effect(&skill, &attacker), 0.0));
        }
    }

    mod mitigation_tests {
        use super::*;

        #[test]
        fn defense_dominates_with_default_constant() {
            let attacker = sheet("a", &[("ATK", 10.0)]);
            let defender = sheet("d", &[("DEF", 3.0)]);
            let skill = SkillDefinition::damage("Strike", "WA", 20.0).with_scaling("ATK", 2.0);
            let calc = EffectCalculator::new("DEF", 100.0);
            assert!(approx(calc.calculate(&skill, &attacker, Some(&defender)), 0.0));
        }

        #[test]
        fn small_mitigation_leaves_positive_damage() {
            let attacker = sheet("a", &[("ATK", 10.0)]);
            let defender = sheet("d", &[("DEF", 3.0)]);
            let skill = SkillDefinition::damage("Strike", "WA", 20.0).with_scaling("ATK", 2.0);
            let calc = EffectCalculator::new("DEF", 5.0);
            assert!(approx(calc.calculate(&skill, &attacker, Some(&defender)), 25.0));
        }

        #[test]
        fn missing_defense_means_no_mitigation() {
            let attacker = sheet("a", &[]);
            let defender = sheet("d", &[]);
            let skill = SkillDefinition::damage("Strike", "WA", 20.0);
            let calc = EffectCalculator::default();
            assert!(approx(calc.calculate(&skill, &attacker, Some(&defender)), 20.0));
        }

        #[test]
        fn healing_is_never_mitigated() {
            let attacker = sheet("a", &[]);
            let defender = sheet("d", &[("DEF", 50.0)]);
            let skill = SkillDefinition::healing("Mend", "SS", 15.0);
            let calc = EffectCalculator::default();
            assert!(approx(calc.calculate(&skill, &attacker, Some(&defender)), 15.0));
        }

        #[test]
        fn calculation_does_not_mutate_sheets() {
            let mut attacker = sheet("a", &[("ATK", 10.0)]);
            let mut defender = sheet("d", &[("DEF", 0.1)]);
            attacker.drain_events();
            defender.drain_events();
            let before = (attacker.clone(), defender.clone());

            let skill = SkillDefinition::damage("Strike", "WA", 20.0).with_scaling("ATK", 2.0);
            let _ = EffectCalculator::default().calculate(&skill, &attacker, Some(&defender));

            assert_eq!((attacker, defender), before);
        }
    }
}

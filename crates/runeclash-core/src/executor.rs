//! Skill execution.
//!
//! [`SkillExecutor`] computes a skill's effect with an [`EffectCalculator`]
//! and applies it to the target's sheet. The returned [`SkillExecution`]
//! carries the nominal duration after which the orchestrator reports
//! completion; nothing here waits.

use runestat::StatSheet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::{Combatant, CombatantId};
use crate::effect::EffectCalculator;
use crate::skill::{Combination, EffectKind, SkillDefinition};

/// Record of one skill applied to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillExecution {
    /// Display name of the skill
    pub skill_name: String,
    /// Combination that resolved to the skill
    pub combination: Combination,
    /// Damage or healing
    pub effect: EffectKind,
    /// Caster
    pub attacker: CombatantId,
    /// Receiver
    pub target: CombatantId,
    /// Value produced by the effect calculator
    pub value: f32,
    /// Health actually removed or restored after clamping
    pub applied: f32,
    /// Seconds until the execution reports completion
    pub completes_after: f32,
}

/// Applies skills to combatants.
#[derive(Debug, Clone, Default)]
pub struct SkillExecutor {
    calculator: EffectCalculator,
}

impl SkillExecutor {
    /// Creates an executor around a calculator.
    #[must_use]
    pub const fn new(calculator: EffectCalculator) -> Self {
        Self { calculator }
    }

    /// Returns the calculator used for effect values.
    #[must_use]
    pub const fn calculator(&self) -> &EffectCalculator {
        &self.calculator
    }

    /// Executes `skill` from `attacker` against `target`.
    ///
    /// Returns `None` without touching the target if it is already defeated.
    pub fn execute<A, T>(
        &self,
        skill: &SkillDefinition,
        attacker: &A,
        target: &mut T,
    ) -> Option<SkillExecution>
    where
        A: Combatant + ?Sized,
        T: Combatant + ?Sized,
    {
        if target.is_defeated() {
            debug!(skill = %skill.name, target = %target.id(), "target already defeated");
            return None;
        }

        let value = self
            .calculator
            .calculate(skill, attacker.sheet(), Some(target.sheet()));
        let applied = Self::apply(skill.effect, value, target.sheet_mut());

        debug!(
            skill = %skill.name,
            attacker = %attacker.id(),
            side = %attacker.side(),
            target = %target.id(),
            value,
            applied,
            "skill executed"
        );

        Some(SkillExecution {
            skill_name: skill.name.clone(),
            combination: skill.combination.clone(),
            effect: skill.effect,
            attacker: attacker.id(),
            target: target.id(),
            value,
            applied,
            completes_after: skill.nominal_duration.max(0.0),
        })
    }

    fn apply(effect: EffectKind, value: f32, sheet: &mut StatSheet) -> f32 {
        match effect {
            EffectKind::Damage => sheet.take_damage(value),
            EffectKind::Healing => sheet.heal(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Side;
    use runestat::{SheetEvent, StatDefinition};

    struct Dummy {
        id: CombatantId,
        sheet: StatSheet,
    }

    impl Dummy {
        fn new(id: u64, stats: &[(&str, f32)]) -> Self {
            let defs: Vec<StatDefinition> = stats
                .iter()
                .map(|(n, v)| StatDefinition::new(n, *v))
                .collect();
            Self {
                id: CombatantId::new(id),
                sheet: StatSheet::new("dummy", &defs).unwrap(),
            }
        }
    }

    impl Combatant for Dummy {
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

    #[test]
    fn damage_reduces_target_health() {
        let attacker = Dummy::new(0, &[("ATK", 10.0)]);
        // VIGOR 1 -> 150 max health
        let mut target = Dummy::new(1, &[("VIGOR", 1.0)]);
        let skill = SkillDefinition::damage("Strike", "WA", 20.0).with_scaling("ATK", 2.0);

        let exec = SkillExecutor::default()
            .execute(&skill, &attacker, &mut target)
            .unwrap();

        assert!((exec.value - 40.0).abs() < 1e-4);
        assert!((target.sheet.current_health() - 110.0).abs() < 1e-4);
        assert_eq!(exec.target, CombatantId::new(1));
        assert!((exec.completes_after - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn healing_restores_up_to_max() {
        let attacker = Dummy::new(0, &[]);
        let mut target = Dummy::new(1, &[("VIGOR", 1.0)]);
        target.sheet.take_damage(10.0);
        let skill = SkillDefinition::healing("Mend", "SS", 25.0);

        let exec = SkillExecutor::default()
            .execute(&skill, &attacker, &mut target)
            .unwrap();

        assert!((exec.value - 25.0).abs() < 1e-4);
        assert!((exec.applied - 10.0).abs() < 1e-4);
        assert!((target.sheet.current_health() - 150.0).abs() < 1e-4);
    }

    #[test]
    fn defeated_target_is_a_noop() {
        let attacker = Dummy::new(0, &[]);
        let mut target = Dummy::new(1, &[("VIGOR", 1.0)]);
        target.sheet.take_damage(1000.0);
        target.sheet.drain_events();

        let skill = SkillDefinition::damage("Strike", "WA", 20.0);
        assert!(SkillExecutor::default()
            .execute(&skill, &attacker, &mut target)
            .is_none());
        assert!(target.sheet.drain_events().is_empty());
    }

    #[test]
    fn lethal_damage_records_death_once() {
        let attacker = Dummy::new(0, &[]);
        let mut target = Dummy::new(1, &[("VIGOR", 1.0)]);
        let skill = SkillDefinition::damage("Execute", "WASD", 500.0);
        let executor = SkillExecutor::default();

        executor.execute(&skill, &attacker, &mut target).unwrap();
        assert!(executor.execute(&skill, &attacker, &mut target).is_none());

        let deaths = target
            .sheet
            .drain_events()
            .into_iter()
            .filter(|e| *e == SheetEvent::Died)
            .count();
        assert_eq!(deaths, 1);
        assert!(target.sheet.current_health().abs() < f32::EPSILON);
    }
}

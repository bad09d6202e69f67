//! Clash arbitration between the two sides' queued chains.
//!
//! The resolver drains a copy of the player queue chain by chain, pairing
//! each player chain with the next enemy chain (if any). A [`ClashRule`]
//! decides each pairing:
//!
//! - **Win**: every combination of the player chain executes against the
//!   enemy side
//! - **Tie**: nothing executes
//! - **Lose**: only the first combination of the enemy chain executes
//!   against the player, and the pass ends
//!
//! When the player queued nothing but the enemies did, the enemy head chain
//! is resolved as a single forced Lose.
//!
//! # Example
//!
//! ```
//! use runeclash_core::chain::ActionChain;
//! use runeclash_core::clash::{ClashOutcome, ClashRule, MultisetRule};
//! use runeclash_core::combatant::CombatantId;
//!
//! let player = ActionChain::new(["WA", "WASD"], CombatantId::PLAYER);
//! let enemy = ActionChain::new(["WASD", "WA"], CombatantId::new(1));
//!
//! let rule = MultisetRule;
//! assert_eq!(rule.evaluate(&player, Some(&enemy)), ClashOutcome::Tie);
//! assert_eq!(rule.evaluate(&player, None), ClashOutcome::Win);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::chain::{ActionChain, ActionQueue};
use crate::combatant::{Combatant, CombatantId};
use crate::encounter::Encounter;
use crate::executor::{SkillExecution, SkillExecutor};
use crate::skill::{Combination, SkillCatalog};

// =============================================================================
// Outcome and Rule
// =============================================================================

/// Result of one pairing, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClashOutcome {
    /// The player chain executes
    Win,
    /// Nothing executes
    Tie,
    /// The enemy chain's first combination executes
    Lose,
}

impl fmt::Display for ClashOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "Win"),
            Self::Tie => write!(f, "Tie"),
            Self::Lose => write!(f, "Lose"),
        }
    }
}

/// Decides the outcome of one player chain against one (optional) enemy
/// chain.
///
/// Implementations must be pure: the same pair always yields the same
/// outcome.
pub trait ClashRule: Send + Sync + fmt::Debug {
    /// Evaluates a pairing.
    fn evaluate(&self, player: &ActionChain, enemy: Option<&ActionChain>) -> ClashOutcome;
}

/// Order-insensitive comparison of chain contents.
///
/// - no enemy chain: Win
/// - different lengths: Lose
/// - same multiset of combinations: Tie
/// - otherwise: Lose
#[derive(Debug, Clone, Copy, Default)]
pub struct MultisetRule;

impl ClashRule for MultisetRule {
    fn evaluate(&self, player: &ActionChain, enemy: Option<&ActionChain>) -> ClashOutcome {
        let Some(enemy) = enemy else {
            return ClashOutcome::Win;
        };
        if player.len() != enemy.len() {
            return ClashOutcome::Lose;
        }

        let mut remaining: Vec<&Combination> = enemy.combinations().iter().collect();
        for combo in player.combinations() {
            match remaining.iter().position(|c| *c == combo) {
                Some(index) => {
                    remaining.swap_remove(index);
                }
                None => return ClashOutcome::Lose,
            }
        }

        if remaining.is_empty() {
            ClashOutcome::Tie
        } else {
            ClashOutcome::Lose
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// One evaluated pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClashPairing {
    /// Player chain; `None` for the forced Lose
    pub player: Option<ActionChain>,
    /// Enemy chain, if one was dequeued
    pub enemy: Option<ActionChain>,
    /// Outcome
    pub outcome: ClashOutcome,
}

/// Everything a resolution pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClashReport {
    /// Pairings in evaluation order
    pub pairings: Vec<ClashPairing>,
    /// Skills applied, in order
    pub executions: Vec<SkillExecution>,
    /// Combinations that could not be resolved to a skill
    pub unresolved: Vec<Combination>,
}

impl ClashReport {
    /// Outcomes in evaluation order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<ClashOutcome> {
        self.pairings.iter().map(|p| p.outcome).collect()
    }

    /// Returns true if nothing was paired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Runs resolution passes.
#[derive(Debug)]
pub struct ClashResolver {
    rule: Box<dyn ClashRule>,
}

impl Default for ClashResolver {
    fn default() -> Self {
        Self::new(Box::new(MultisetRule))
    }
}

impl ClashResolver {
    /// Creates a resolver using `rule`.
    #[must_use]
    pub fn new(rule: Box<dyn ClashRule>) -> Self {
        Self { rule }
    }

    /// The rule deciding each pairing.
    #[must_use]
    pub fn rule(&self) -> &dyn ClashRule {
        self.rule.as_ref()
    }

    /// Resolves both queues against the encounter.
    ///
    /// The queues are copied before being consumed; the caller's queues are
    /// left untouched.
    pub fn resolve(
        &self,
        player_queue: &ActionQueue,
        enemy_queue: &ActionQueue,
        encounter: &mut Encounter,
        executor: &SkillExecutor,
    ) -> ClashReport {
        let mut players = player_queue.clone();
        let mut enemies = enemy_queue.clone();
        let mut report = ClashReport::default();

        if players.is_empty() {
            if let Some(head) = enemies.peek() {
                debug!(enemy_chain = %head, "player queue empty, forced lose");
                Self::execute_counter(head, encounter, executor, &mut report);
                report.pairings.push(ClashPairing {
                    player: None,
                    enemy: Some(head.clone()),
                    outcome: ClashOutcome::Lose,
                });
            }
            return report;
        }

        while let Some(player_chain) = players.pop() {
            let enemy_chain = enemies.pop();
            let outcome = self.rule.evaluate(&player_chain, enemy_chain.as_ref());
            debug!(
                player_chain = %player_chain,
                enemy_chain = ?enemy_chain.as_ref().map(ToString::to_string),
                %outcome,
                "clash pairing"
            );

            match outcome {
                ClashOutcome::Win => Self::execute_player_chain(
                    &player_chain,
                    enemy_chain.as_ref().map(ActionChain::submitted_by),
                    encounter,
                    executor,
                    &mut report,
                ),
                ClashOutcome::Tie => {}
                ClashOutcome::Lose => {
                    if let Some(chain) = &enemy_chain {
                        Self::execute_counter(chain, encounter, executor, &mut report);
                    }
                }
            }

            report.pairings.push(ClashPairing {
                player: Some(player_chain),
                enemy: enemy_chain,
                outcome,
            });

            if outcome == ClashOutcome::Lose {
                break;
            }
        }

        report
    }

    /// Executes every combination of a winning player chain.
    ///
    /// Each combination targets the paired enemy while it stands, otherwise
    /// the first living enemy.
    fn execute_player_chain(
        chain: &ActionChain,
        paired_enemy: Option<CombatantId>,
        encounter: &mut Encounter,
        executor: &SkillExecutor,
        report: &mut ClashReport,
    ) {
        let catalog: Arc<SkillCatalog> = Arc::clone(encounter.catalog());

        for combo in chain.combinations() {
            let Some(skill) = encounter.player.known_skills().resolve(combo, &catalog) else {
                report.unresolved.push(combo.clone());
                continue;
            };

            let target = paired_enemy
                .filter(|id| encounter.enemy(*id).is_some_and(|e| !e.is_defeated()))
                .or_else(|| encounter.living_enemies().next().map(Combatant::id));
            let Some(target) = target else {
                trace!(%combo, "no living enemy to target");
                continue;
            };

            let Encounter {
                player, enemies, ..
            } = &mut *encounter;
            if let Some(enemy) = enemies.iter_mut().find(|e| e.id() == target) {
                if let Some(execution) = executor.execute(&skill, player, enemy) {
                    report.executions.push(execution);
                }
            }
        }
    }

    /// Executes the first combination of an enemy chain against the player.
    fn execute_counter(
        chain: &ActionChain,
        encounter: &mut Encounter,
        executor: &SkillExecutor,
        report: &mut ClashReport,
    ) {
        let Some(combo) = chain.first() else {
            return;
        };

        let Encounter {
            player, enemies, ..
        } = encounter;
        let Some(caster) = enemies.iter().find(|e| e.id() == chain.submitted_by()) else {
            debug!(caster = %chain.submitted_by(), "counter caster not in encounter");
            return;
        };
        if caster.is_defeated() {
            debug!(caster = %caster.id(), "counter caster defeated, skipped");
            return;
        }

        let Some(skill) = caster.skill_by_combination(combo) else {
            report.unresolved.push(combo.clone());
            return;
        };
        if let Some(execution) = executor.execute(skill, caster, player) {
            report.executions.push(execution);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Side;
    use crate::encounter::PlayerProfile;
    use crate::enemy::EnemyProfile;
    use crate::skill::SkillDefinition;
    use proptest::prelude::*;
    use runestat::{SheetConfig, StatDefinition};

    fn chain(combos: &[&str], by: u64) -> ActionChain {
        ActionChain::new(combos.iter().copied(), CombatantId::new(by))
    }

    fn queue(side: Side, chains: Vec<ActionChain>) -> ActionQueue {
        let mut q = ActionQueue::new(side);
        q.extend(chains);
        q
    }

    /// Player (150 hp) against two enemies (150 hp each). Every skill deals
    /// a flat 10 damage.
    fn encounter() -> Encounter {
        let catalog = SkillCatalog::from_skills(
            ["W", "A", "S", "D", "WA", "WASD"]
                .iter()
                .map(|c| SkillDefinition::damage(&format!("skill-{c}"), c, 10.0)),
        )
        .unwrap();
        let player = PlayerProfile {
            name: "Hero".to_string(),
            stats: vec![StatDefinition::new("VIGOR", 1.0)],
            sheet: SheetConfig::default(),
            loadout: ["W", "A", "S", "D", "WA", "WASD"]
                .iter()
                .map(|c| Combination::from(*c))
                .collect(),
        };
        let vigor = vec![StatDefinition::new("VIGOR", 1.0)];
        let enemies = [
            EnemyProfile::new("Rat", vigor.clone(), &["W", "A", "WA", "WASD"]),
            EnemyProfile::new("Bat", vigor, &["S", "D"]),
        ];
        Encounter::new(catalog, &player, &enemies).unwrap()
    }

    fn hp(encounter: &Encounter, id: u64) -> f32 {
        encounter
            .sheet(CombatantId::new(id))
            .unwrap()
            .current_health()
    }

    mod rule_tests {
        use super::*;

        #[test]
        fn same_multiset_different_order_ties() {
            let outcome = MultisetRule.evaluate(
                &chain(&["WA", "WASD"], 0),
                Some(&chain(&["WASD", "WA"], 1)),
            );
            assert_eq!(outcome, ClashOutcome::Tie);
        }

        #[test]
        fn length_mismatch_loses() {
            let outcome = MultisetRule.evaluate(&chain(&["W"], 0), Some(&chain(&["W", "A"], 1)));
            assert_eq!(outcome, ClashOutcome::Lose);
        }

        #[test]
        fn duplicates_are_counted() {
            let outcome = MultisetRule.evaluate(
                &chain(&["W", "W"], 0),
                Some(&chain(&["W", "A"], 1)),
            );
            assert_eq!(outcome, ClashOutcome::Lose);
        }

        #[test]
        fn absent_enemy_chain_wins() {
            assert_eq!(
                MultisetRule.evaluate(&chain(&["S"], 0), None),
                ClashOutcome::Win
            );
        }

        proptest! {
            #[test]
            fn permutations_tie(
                combos in proptest::collection::vec("[WASD]{1,4}", 1..6),
                seed in any::<u64>(),
            ) {
                use rand::seq::SliceRandom;
                use rand::SeedableRng;

                let mut shuffled = combos.clone();
                shuffled.shuffle(&mut rand_chacha::ChaCha8Rng::seed_from_u64(seed));

                let player = ActionChain::new(combos, CombatantId::PLAYER);
                let enemy = ActionChain::new(shuffled, CombatantId::new(1));
                prop_assert_eq!(MultisetRule.evaluate(&player, Some(&enemy)), ClashOutcome::Tie);
            }

            #[test]
            fn outcome_is_symmetric_for_present_chains(
                a in proptest::collection::vec("[WASD]{1,2}", 1..4),
                b in proptest::collection::vec("[WASD]{1,2}", 1..4),
            ) {
                let left = ActionChain::new(a, CombatantId::PLAYER);
                let right = ActionChain::new(b, CombatantId::new(1));
                prop_assert_eq!(
                    MultisetRule.evaluate(&left, Some(&right)),
                    MultisetRule.evaluate(&right, Some(&left))
                );
            }
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn tie_exchanges_no_damage() {
            let mut enc = encounter();
            let player_q = queue(Side::Player, vec![chain(&["WA", "WASD"], 0)]);
            let enemy_q = queue(Side::Enemy, vec![chain(&["WASD", "WA"], 1)]);

            let report = ClashResolver::default().resolve(
                &player_q,
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );

            assert_eq!(report.outcomes(), vec![ClashOutcome::Tie]);
            assert!(report.executions.is_empty());
            assert!((hp(&enc, 0) - 150.0).abs() < 1e-4);
            assert!((hp(&enc, 1) - 150.0).abs() < 1e-4);
        }

        #[test]
        fn lose_executes_only_first_enemy_entry() {
            let mut enc = encounter();
            let player_q = queue(Side::Player, vec![chain(&["W"], 0), chain(&["A"], 0)]);
            let enemy_q = queue(Side::Enemy, vec![chain(&["W", "A"], 1)]);

            let report = ClashResolver::default().resolve(
                &player_q,
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );

            // The second player chain is never evaluated
            assert_eq!(report.outcomes(), vec![ClashOutcome::Lose]);
            assert_eq!(report.executions.len(), 1);
            let exec = &report.executions[0];
            assert_eq!(exec.combination.as_str(), "W");
            assert_eq!(exec.attacker, CombatantId::new(1));
            assert_eq!(exec.target, CombatantId::PLAYER);
            assert!((hp(&enc, 0) - 140.0).abs() < 1e-4);
        }

        #[test]
        fn empty_enemy_queue_means_every_chain_wins() {
            let mut enc = encounter();
            let player_q = queue(
                Side::Player,
                vec![chain(&["W"], 0), chain(&["A", "S"], 0), chain(&["D"], 0)],
            );
            let enemy_q = ActionQueue::new(Side::Enemy);

            let report = ClashResolver::default().resolve(
                &player_q,
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );

            assert_eq!(report.outcomes(), vec![ClashOutcome::Win; 3]);
            assert_eq!(report.executions.len(), 4);
            // Unpaired wins land on the first living enemy
            assert!((hp(&enc, 1) - 110.0).abs() < 1e-4);
            assert!((hp(&enc, 2) - 150.0).abs() < 1e-4);
        }

        #[derive(Debug)]
        struct AlwaysWin;

        impl ClashRule for AlwaysWin {
            fn evaluate(&self, _: &ActionChain, _: Option<&ActionChain>) -> ClashOutcome {
                ClashOutcome::Win
            }
        }

        #[test]
        fn win_targets_paired_enemy() {
            let mut enc = encounter();
            let player_q = queue(Side::Player, vec![chain(&["W"], 0)]);
            let enemy_q = queue(Side::Enemy, vec![chain(&["S"], 2)]);

            let resolver = ClashResolver::new(Box::new(AlwaysWin));
            let report = resolver.resolve(&player_q, &enemy_q, &mut enc, &SkillExecutor::default());

            assert_eq!(report.outcomes(), vec![ClashOutcome::Win]);
            assert!((hp(&enc, 1) - 150.0).abs() < 1e-4);
            assert!((hp(&enc, 2) - 140.0).abs() < 1e-4);
        }

        #[test]
        fn win_against_defeated_partner_retargets() {
            let mut enc = encounter();
            enc.enemies[1].sheet_mut().take_damage(1.0e6);
            let player_q = queue(Side::Player, vec![chain(&["W"], 0)]);
            let enemy_q = queue(Side::Enemy, vec![chain(&["S"], 2)]);

            let resolver = ClashResolver::new(Box::new(AlwaysWin));
            let report = resolver.resolve(&player_q, &enemy_q, &mut enc, &SkillExecutor::default());

            assert_eq!(report.executions[0].target, CombatantId::new(1));
            assert!((hp(&enc, 1) - 140.0).abs() < 1e-4);
        }

        #[test]
        fn empty_player_queue_is_forced_lose() {
            let mut enc = encounter();
            let player_q = ActionQueue::new(Side::Player);
            let enemy_q = queue(Side::Enemy, vec![chain(&["D"], 2), chain(&["W"], 1)]);

            let report = ClashResolver::default().resolve(
                &player_q,
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );

            assert_eq!(report.outcomes(), vec![ClashOutcome::Lose]);
            assert!(report.pairings[0].player.is_none());
            assert_eq!(report.executions.len(), 1);
            assert!((hp(&enc, 0) - 140.0).abs() < 1e-4);
        }

        #[test]
        fn counter_outside_caster_skills_is_unresolved() {
            let mut enc = encounter();
            // "W" is in the catalog but the Bat only knows S and D
            let enemy_q = queue(Side::Enemy, vec![chain(&["W"], 2)]);

            let report = ClashResolver::default().resolve(
                &ActionQueue::new(Side::Player),
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );

            assert_eq!(report.outcomes(), vec![ClashOutcome::Lose]);
            assert_eq!(report.unresolved, vec![Combination::from("W")]);
            assert!(report.executions.is_empty());
            assert!((hp(&enc, 0) - 150.0).abs() < 1e-4);
        }

        #[test]
        fn both_empty_is_noop() {
            let mut enc = encounter();
            let report = ClashResolver::default().resolve(
                &ActionQueue::new(Side::Player),
                &ActionQueue::new(Side::Enemy),
                &mut enc,
                &SkillExecutor::default(),
            );
            assert!(report.is_empty());
        }

        #[test]
        fn unresolvable_combination_is_skipped() {
            let mut enc = encounter();
            let player_q = queue(Side::Player, vec![chain(&["SSSS", "W"], 0)]);

            let report = ClashResolver::default().resolve(
                &player_q,
                &ActionQueue::new(Side::Enemy),
                &mut enc,
                &SkillExecutor::default(),
            );

            assert_eq!(report.unresolved, vec![Combination::from("SSSS")]);
            assert_eq!(report.executions.len(), 1);
        }

        #[test]
        fn defeated_counter_caster_does_nothing() {
            let mut enc = encounter();
            enc.enemies[0].sheet_mut().take_damage(1.0e6);
            let player_q = queue(Side::Player, vec![chain(&["W"], 0)]);
            let enemy_q = queue(Side::Enemy, vec![chain(&["W", "A"], 1)]);

            let report = ClashResolver::default().resolve(
                &player_q,
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );

            assert_eq!(report.outcomes(), vec![ClashOutcome::Lose]);
            assert!(report.executions.is_empty());
            assert!((hp(&enc, 0) - 150.0).abs() < 1e-4);
        }

        #[test]
        fn caller_queues_are_not_consumed() {
            let mut enc = encounter();
            let player_q = queue(Side::Player, vec![chain(&["W"], 0)]);
            let enemy_q = queue(Side::Enemy, vec![chain(&["A"], 1)]);
            let _ = ClashResolver::default().resolve(
                &player_q,
                &enemy_q,
                &mut enc,
                &SkillExecutor::default(),
            );
            assert_eq!(player_q.len(), 1);
            assert_eq!(enemy_q.len(), 1);
        }
    }
}

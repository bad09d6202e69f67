//! Budget-constrained random skill selection.
//!
//! Each skill in the enemy's phase pool is entered into a flat pool once per
//! remaining use. Skills are drawn uniformly without replacement, so a skill
//! with `n` remaining uses is picked at most `n` times per pass.

use rand::Rng;
use tracing::{debug, trace};

use super::Enemy;
use crate::chain::{ActionChain, ActionQueue};
use crate::combatant::Combatant;

/// Chooses which skills enemies queue each enemy turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyActionSelector;

impl EnemyActionSelector {
    /// Creates a selector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs one selection pass for `enemy`.
    ///
    /// Resets the budget, then draws until the turn's skill count is reached
    /// or the pool is exhausted. Every chosen skill becomes a single-entry
    /// chain, in draw order.
    pub fn select<R>(&self, enemy: &mut Enemy, rng: &mut R) -> Vec<ActionChain>
    where
        R: Rng + ?Sized,
    {
        enemy.budget_mut().reset();

        let wanted = enemy.max_skills_this_turn();
        let mut pool: Vec<_> = enemy
            .available_skills()
            .iter()
            .flat_map(|skill| {
                let uses = enemy.budget().remaining(&skill.combination);
                std::iter::repeat(skill.combination.clone()).take(uses as usize)
            })
            .collect();

        trace!(enemy = %enemy.id(), pool = pool.len(), wanted, "weighted pool built");

        let mut chosen = Vec::with_capacity(wanted);
        while chosen.len() < wanted && !pool.is_empty() {
            let index = rng.gen_range(0..pool.len());
            let combination = pool.swap_remove(index);
            enemy.budget_mut().consume(&combination);
            trace!(enemy = %enemy.id(), %combination, "skill drawn");
            chosen.push(ActionChain::single(combination, enemy.id()));
        }

        debug!(
            enemy = %enemy.id(),
            phase = %enemy.phase(),
            selected = chosen.len(),
            "enemy actions selected"
        );
        chosen
    }

    /// Runs a pass for every living enemy, in order, appending to `queue`.
    pub fn select_all<R>(&self, enemies: &mut [Enemy], rng: &mut R, queue: &mut ActionQueue)
    where
        R: Rng + ?Sized,
    {
        for enemy in enemies.iter_mut().filter(|e| !e.is_defeated()) {
            queue.extend(self.select(enemy, rng));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatantId, Side};
    use crate::enemy::EnemyProfile;
    use crate::skill::{Combination, SkillCatalog, SkillDefinition};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use runestat::StatDefinition;

    const SKILLS: [&str; 3] = ["W", "A", "S"];

    fn enemy(max_uses: Vec<u32>, per_turn: usize) -> Enemy {
        let catalog = SkillCatalog::from_skills(
            SKILLS
                .iter()
                .map(|c| SkillDefinition::damage(&format!("skill-{c}"), c, 5.0)),
        )
        .unwrap();
        let profile = EnemyProfile::new("Golem", vec![StatDefinition::new("VIGOR", 1.0)], &SKILLS)
            .with_max_uses(max_uses)
            .with_max_skills_per_turn(per_turn);
        Enemy::new(CombatantId::new(1), &profile, &catalog).unwrap()
    }

    fn count(chains: &[ActionChain], combo: &str) -> usize {
        chains
            .iter()
            .filter(|c| c.first().map(Combination::as_str) == Some(combo))
            .count()
    }

    #[test]
    fn stops_early_when_pool_exhausted() {
        let mut golem = enemy(vec![1, 0, 1], 10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let chains = EnemyActionSelector::new().select(&mut golem, &mut rng);
        assert_eq!(chains.len(), 2);
        assert_eq!(count(&chains, "A"), 0);
    }

    #[test]
    fn draws_consume_budget_once_each() {
        let mut golem = enemy(vec![2, 2, 2], 2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chains = EnemyActionSelector::new().select(&mut golem, &mut rng);
        let used: u32 = golem
            .budget()
            .entries()
            .iter()
            .map(|e| e.max_uses - e.remaining)
            .sum();
        assert_eq!(chains.len(), 2);
        assert_eq!(used, 2);
    }

    #[test]
    fn budget_resets_between_passes() {
        let mut golem = enemy(vec![1, 1, 1], 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let selector = EnemyActionSelector::new();
        assert_eq!(selector.select(&mut golem, &mut rng).len(), 3);
        assert_eq!(selector.select(&mut golem, &mut rng).len(), 3);
    }

    #[test]
    fn chains_are_single_entry_and_attributed() {
        let mut golem = enemy(vec![1, 1, 1], 2);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for chain in EnemyActionSelector::new().select(&mut golem, &mut rng) {
            assert_eq!(chain.len(), 1);
            assert_eq!(chain.submitted_by(), CombatantId::new(1));
        }
    }

    #[test]
    fn defeated_enemies_are_skipped() {
        let mut enemies = vec![enemy(vec![1, 1, 1], 2)];
        enemies[0].sheet_mut().take_damage(10_000.0);
        let mut queue = ActionQueue::new(Side::Enemy);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        EnemyActionSelector::new().select_all(&mut enemies, &mut rng, &mut queue);
        assert!(queue.is_empty());
    }

    proptest! {
        #[test]
        fn never_exceeds_remaining_uses(
            uses in proptest::collection::vec(0u32..4, 3),
            per_turn in 0usize..8,
            seed in any::<u64>(),
        ) {
            let mut golem = enemy(uses.clone(), per_turn);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chains = EnemyActionSelector::new().select(&mut golem, &mut rng);

            prop_assert!(chains.len() <= per_turn);
            for (&combo, max) in SKILLS.iter().zip(&uses) {
                prop_assert!(count(&chains, combo) <= *max as usize);
            }
            let total: u32 = uses.iter().sum();
            prop_assert_eq!(chains.len(), per_turn.min(total as usize));
        }
    }
}

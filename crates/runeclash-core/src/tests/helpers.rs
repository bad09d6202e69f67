//! Encounter factories and orchestrator drivers for tests.

use runestat::{SheetConfig, StatDefinition};

use crate::config::CombatConfig;
use crate::encounter::{Encounter, PlayerProfile};
use crate::enemy::EnemyProfile;
use crate::orchestrator::{Suspension, TurnOrchestrator, TurnPhase};
use crate::skill::{Direction, SkillCatalog, SkillDefinition};

/// Upper bound on steps taken by the drivers before giving up.
pub const STEP_LIMIT: usize = 10_000;

// =============================================================================
// Factories
// =============================================================================

/// The catalog shared by every test encounter.
///
/// | Combination | Skill      | Effect                 |
/// |-------------|------------|------------------------|
/// | `W`         | Jab        | 10 + ATK damage        |
/// | `A`         | Kick       | 12 damage              |
/// | `S`         | Claw       | 8 damage               |
/// | `D`         | Dash       | 6 damage               |
/// | `WA`        | Rune Strike| 20 + 2 * ATK damage    |
/// | `WASD`      | Cataclysm  | 40 damage              |
/// | `SS`        | Mend       | 15 healing             |
/// | `AD`        | Gnaw       | 9 damage               |
/// | `DD`        | Howl       | 7 damage               |
pub fn catalog() -> SkillCatalog {
    SkillCatalog::from_skills([
        SkillDefinition::damage("Jab", "W", 10.0).with_scaling("ATK", 1.0),
        SkillDefinition::damage("Kick", "A", 12.0),
        SkillDefinition::damage("Claw", "S", 8.0),
        SkillDefinition::damage("Dash", "D", 6.0).with_duration(0.5),
        SkillDefinition::damage("Rune Strike", "WA", 20.0).with_scaling("ATK", 2.0),
        SkillDefinition::damage("Cataclysm", "WASD", 40.0).with_duration(2.0),
        SkillDefinition::healing("Mend", "SS", 15.0),
        SkillDefinition::damage("Gnaw", "AD", 9.0),
        SkillDefinition::damage("Howl", "DD", 7.0),
    ])
    .expect("test catalog is valid")
}

/// Player with 150 health, ATK 5, SPD 15 and a four-skill loadout.
pub fn player_profile() -> PlayerProfile {
    PlayerProfile {
        name: "Hero".to_string(),
        stats: vec![
            StatDefinition::new("VIGOR", 1.0),
            StatDefinition::new("ATK", 5.0),
            StatDefinition::new("SPD", 15.0),
        ],
        sheet: SheetConfig::default(),
        loadout: ["W", "A", "WA", "WASD"].iter().map(|c| (*c).into()).collect(),
    }
}

/// Enemy with `vigor * 150` health, SPD 5, and the given skills and uses.
pub fn enemy_profile(name: &str, vigor: f32, skills: &[&str], uses: Vec<u32>) -> EnemyProfile {
    EnemyProfile::new(
        name,
        vec![
            StatDefinition::new("VIGOR", vigor),
            StatDefinition::new("SPD", 5.0),
        ],
        skills,
    )
    .with_max_uses(uses)
}

/// Player against a Goblin (three phases of skills) and a Rat.
pub fn standard_encounter() -> Encounter {
    let enemies = [
        enemy_profile(
            "Goblin",
            1.0,
            &["W", "A", "S", "D", "AD", "DD", "WASD", "SS", "WA"],
            vec![2; 9],
        ),
        enemy_profile("Rat", 0.5, &["S", "D"], vec![1, 1]),
    ];
    Encounter::new(catalog(), &player_profile(), &enemies).expect("standard encounter is valid")
}

/// Player against enemies that never act.
pub fn passive_encounter(enemy_count: usize) -> Encounter {
    let enemies: Vec<EnemyProfile> = (0..enemy_count)
        .map(|i| enemy_profile(&format!("Dummy {i}"), 0.5, &["S"], vec![0]))
        .collect();
    Encounter::new(catalog(), &player_profile(), &enemies).expect("passive encounter is valid")
}

/// Auto-starting orchestrator over `encounter`.
pub fn orchestrator(encounter: Encounter, seed: u64) -> TurnOrchestrator {
    TurnOrchestrator::new(encounter, CombatConfig::default().with_auto_start(true), seed)
        .expect("default config is valid")
}

// =============================================================================
// Drivers
// =============================================================================

/// Steps one second at a time until `phase` is active or the game ends.
pub fn advance_to(o: &mut TurnOrchestrator, phase: TurnPhase) {
    o.start();
    for _ in 0..STEP_LIMIT {
        if o.is_over() || o.phase() == phase {
            return;
        }
        o.step(1.0);
    }
    panic!("never reached {phase}");
}

/// Steps until the player countdown is running.
pub fn advance_to_countdown(o: &mut TurnOrchestrator) {
    advance_to(o, TurnPhase::PlayerTurn);
    if o.suspension() == Suspension::AwaitingStart {
        o.signal_turn_start();
    }
}

/// Types one combination.
pub fn type_combination(o: &mut TurnOrchestrator, combination: &str) {
    for token in combination.chars() {
        let direction = Direction::from_token(token).expect("test combination uses WASD");
        o.submit_direction(direction);
    }
}

/// Types every combination of a chain, linking between them, and confirms.
pub fn enter_chain(o: &mut TurnOrchestrator, chain: &[&str]) {
    for (i, combination) in chain.iter().enumerate() {
        if i > 0 {
            o.link();
        }
        type_combination(o, combination);
    }
    o.confirm();
}

/// Plays one round: enters `chains` during the player countdown, then steps
/// through the clash into the next enemy turn (or game over).
pub fn play_round(o: &mut TurnOrchestrator, chains: &[&[&str]]) {
    advance_to_countdown(o);
    if o.is_over() {
        return;
    }
    for chain in chains {
        enter_chain(o, chain);
    }
    advance_to(o, TurnPhase::ClashTurn);
    advance_to(o, TurnPhase::EnemyTurn);
}

/// Plays rounds with the same input until the encounter ends.
pub fn play_until_over(o: &mut TurnOrchestrator, chains: &[&[&str]], max_rounds: usize) {
    for _ in 0..max_rounds {
        if o.is_over() {
            return;
        }
        play_round(o, chains);
    }
}

//! Fixed-step driver and run summary.

use std::collections::BTreeMap;
use std::fmt;

use runeclash_core::prelude::*;
use runestat::StatSheet;
use tracing::{debug, info, warn};

use crate::scenario::Scenario;

/// Steps taken before a run is abandoned regardless of the turn limit.
const STEP_LIMIT: u64 = 1_000_000;

/// Final health of one combatant.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub id: CombatantId,
    pub name: String,
    pub current: f32,
    pub max: f32,
}

impl Standing {
    fn from_sheet(id: CombatantId, sheet: &StatSheet) -> Self {
        Self {
            id,
            name: sheet.name().to_string(),
            current: sheet.current_health(),
            max: sheet.max_health(),
        }
    }
}

/// What happened during a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub seed: u64,
    pub turns: u32,
    pub outcome: Option<GameOutcome>,
    pub clashes: BTreeMap<String, usize>,
    pub skills_executed: usize,
    pub deaths: Vec<CombatantId>,
    pub standings: Vec<Standing>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Some(outcome) => writeln!(f, "Outcome: {outcome} after {} turns", self.turns)?,
            None => writeln!(f, "Outcome: undecided after {} turns", self.turns)?,
        }
        writeln!(f, "Seed: {}", self.seed)?;
        let clashes: Vec<String> = self
            .clashes
            .iter()
            .map(|(outcome, count)| format!("{outcome} {count}"))
            .collect();
        writeln!(f, "Clashes: {}", clashes.join(", "))?;
        writeln!(f, "Skills executed: {}", self.skills_executed)?;
        if !self.deaths.is_empty() {
            let deaths: Vec<String> = self.deaths.iter().map(ToString::to_string).collect();
            writeln!(f, "Defeated: {}", deaths.join(", "))?;
        }
        for standing in &self.standings {
            writeln!(
                f,
                "  {:>3} {:<16} {:>8.1} / {:.1}",
                standing.id.to_string(),
                standing.name,
                standing.current,
                standing.max
            )?;
        }
        Ok(())
    }
}

/// A finished run: the summary plus every recorded notification.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub events: Vec<CombatEvent>,
}

/// Runs `scenario` until game over or `max_turns` enemy turns have passed.
///
/// Player input comes from the scenario script and is entered as soon as
/// each player countdown starts.
pub fn run(
    scenario: &Scenario,
    mut combat: TurnOrchestrator,
    dt: f32,
    max_turns: u32,
) -> RunReport {
    let log = EventLog::new();
    combat.add_observer(Box::new(log.clone()));
    combat.start();

    let mut scripted_turn = 0;
    for _ in 0..STEP_LIMIT {
        if combat.is_over() || combat.turn() > max_turns {
            break;
        }

        if combat.phase() == TurnPhase::PlayerTurn {
            match combat.suspension() {
                Suspension::AwaitingStart => {
                    combat.signal_turn_start();
                }
                Suspension::Countdown { .. } if scripted_turn != combat.turn() => {
                    scripted_turn = combat.turn();
                    enter_script(&mut combat, scenario.turn_script(scripted_turn));
                }
                _ => {}
            }
        }

        combat.step(dt);
    }

    if !combat.is_over() {
        warn!(turns = combat.turn(), max_turns, "run stopped before game over");
    }
    info!(outcome = ?combat.outcome(), turns = combat.turn(), "run finished");

    let events = log.take_events();
    RunReport {
        summary: summarize(&combat, &events),
        events,
    }
}

fn enter_script(combat: &mut TurnOrchestrator, chains: &[Vec<Combination>]) {
    for chain in chains {
        for (i, combination) in chain.iter().enumerate() {
            if i > 0 {
                combat.link();
            }
            for direction in combination.as_str().chars().filter_map(Direction::from_token) {
                combat.submit_direction(direction);
            }
        }
        if combat.confirm() {
            debug!(turn = combat.turn(), chain = ?chain, "scripted chain entered");
        }
    }
}

fn summarize(combat: &TurnOrchestrator, events: &[CombatEvent]) -> RunSummary {
    let mut summary = RunSummary {
        seed: combat.seed(),
        turns: combat.turn(),
        outcome: combat.outcome(),
        ..RunSummary::default()
    };

    for event in events {
        match event {
            CombatEvent::ClashOutcome(outcome) => {
                *summary.clashes.entry(outcome.to_string()).or_default() += 1;
            }
            CombatEvent::SkillExecuted { .. } => summary.skills_executed += 1,
            CombatEvent::Death(id) => summary.deaths.push(*id),
            _ => {}
        }
    }

    let encounter = combat.encounter();
    summary
        .standings
        .push(Standing::from_sheet(encounter.player.id(), encounter.player.sheet()));
    summary.standings.extend(
        encounter
            .enemies
            .iter()
            .map(|enemy| Standing::from_sheet(enemy.id(), enemy.sheet())),
    );
    summary
}

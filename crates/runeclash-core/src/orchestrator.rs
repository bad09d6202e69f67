//! Turn orchestration state machine.
//!
//! The [`TurnOrchestrator`] sequences the encounter as
//! `EnemyTurn -> PlayerTurn -> ClashTurn -> EnemyTurn -> ...` starting from
//! `EnemyTurn`. Every wait is an explicit [`Suspension`] advanced by
//! [`TurnOrchestrator::step`]; nothing blocks and nothing runs in the
//! background.
//!
//! # Phases
//!
//! | Phase        | On entry                                   | Suspends on            |
//! |--------------|--------------------------------------------|------------------------|
//! | `EnemyTurn`  | enemies select skills into the enemy queue | enemy turn interval    |
//! | `PlayerTurn` | player queue and input reset               | start signal, countdown|
//! | `ClashTurn`  | queues resolved against each other         | resolution buffer      |
//!
//! After a phase's suspension completes the terminal check runs: if every
//! combatant on one side is down, the machine halts with a [`GameOutcome`].
//!
//! # Determinism
//!
//! Enemy selection draws from a `ChaCha8Rng` seeded at construction. The same
//! seed, encounter, time steps and inputs replay identically.
//!
//! # Example
//!
//! ```
//! use runeclash_core::config::CombatConfig;
//! use runeclash_core::encounter::{Encounter, PlayerProfile};
//! use runeclash_core::orchestrator::{TurnOrchestrator, TurnPhase};
//! use runeclash_core::skill::SkillCatalog;
//! use runestat::{SheetConfig, StatDefinition};
//!
//! let player = PlayerProfile {
//!     name: "Hero".to_string(),
//!     stats: vec![StatDefinition::new("VIGOR", 1.0)],
//!     sheet: SheetConfig::default(),
//!     loadout: vec![],
//! };
//! let encounter = Encounter::new(SkillCatalog::default(), &player, &[]).unwrap();
//! let mut orchestrator = TurnOrchestrator::new(encounter, CombatConfig::default(), 42).unwrap();
//!
//! orchestrator.start();
//! assert_eq!(orchestrator.phase(), TurnPhase::EnemyTurn);
//!
//! // No enemies: the first completed phase ends the encounter
//! orchestrator.step(5.0);
//! assert!(orchestrator.is_over());
//! ```

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use runestat::SheetEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::ActionQueue;
use crate::clash::{ClashReport, ClashResolver};
use crate::combatant::{Combatant, CombatantId, Side};
use crate::config::CombatConfig;
use crate::effect::EffectCalculator;
use crate::encounter::Encounter;
use crate::enemy::EnemyActionSelector;
use crate::error::ConfigError;
use crate::executor::SkillExecutor;
use crate::input::InputSurface;
use crate::observer::CombatObserver;
use crate::skill::Direction;

// =============================================================================
// States
// =============================================================================

/// The three repeating phases of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Enemies choose their actions
    EnemyTurn,
    /// The player enters chains against a countdown
    PlayerTurn,
    /// Both queues are resolved
    ClashTurn,
}

impl TurnPhase {
    /// Phase that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::EnemyTurn => Self::PlayerTurn,
            Self::PlayerTurn => Self::ClashTurn,
            Self::ClashTurn => Self::EnemyTurn,
        }
    }

    /// Label shown to the player on entry.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EnemyTurn => "Enemy Turn",
            Self::PlayerTurn => "Player Turn",
            Self::ClashTurn => "Clash",
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What the current phase is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Suspension {
    /// `start` has not been called
    NotStarted,
    /// Waiting for time to pass
    Delay {
        /// Seconds left
        remaining: f32,
    },
    /// Waiting for [`TurnOrchestrator::signal_turn_start`]
    AwaitingStart,
    /// Player countdown running; input accepted
    Countdown {
        /// Seconds left
        remaining: f32,
    },
    /// Game over
    Halted,
}

/// How the encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every enemy is down
    PlayerVictory,
    /// The player is down
    PlayerDefeat,
    /// Both sides went down in the same phase
    MutualDefeat,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerVictory => write!(f, "Player victory"),
            Self::PlayerDefeat => write!(f, "Player defeat"),
            Self::MutualDefeat => write!(f, "Mutual defeat"),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingCompletion {
    skill_name: String,
    attacker: CombatantId,
    remaining: f32,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Owns an encounter and drives it phase by phase.
pub struct TurnOrchestrator {
    encounter: Encounter,
    config: CombatConfig,
    seed: u64,
    rng: ChaCha8Rng,
    selector: EnemyActionSelector,
    resolver: ClashResolver,
    executor: SkillExecutor,
    input: InputSurface,
    player_queue: ActionQueue,
    enemy_queue: ActionQueue,
    phase: TurnPhase,
    suspension: Suspension,
    turn: u32,
    turn_duration: f32,
    outcome: Option<GameOutcome>,
    completions: Vec<PendingCompletion>,
    last_clash: Option<ClashReport>,
    observers: Vec<Box<dyn CombatObserver>>,
}

impl fmt::Debug for TurnOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnOrchestrator")
            .field("seed", &self.seed)
            .field("phase", &self.phase)
            .field("suspension", &self.suspension)
            .field("turn", &self.turn)
            .field("outcome", &self.outcome)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl TurnOrchestrator {
    /// Creates an orchestrator. Call [`start`](Self::start) (or
    /// [`step`](Self::step)) to enter the first enemy turn.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(encounter: Encounter, config: CombatConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            executor: SkillExecutor::new(EffectCalculator::from_config(&config)),
            input: InputSurface::new(config.input_cap),
            encounter,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            selector: EnemyActionSelector::new(),
            resolver: ClashResolver::default(),
            player_queue: ActionQueue::new(Side::Player),
            enemy_queue: ActionQueue::new(Side::Enemy),
            phase: TurnPhase::EnemyTurn,
            suspension: Suspension::NotStarted,
            turn: 0,
            turn_duration: config.max_turn_duration,
            outcome: None,
            completions: Vec::new(),
            last_clash: None,
            observers: Vec::new(),
            config,
        })
    }

    /// Replaces the clash resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ClashResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Registers an observer.
    pub fn add_observer(&mut self, observer: Box<dyn CombatObserver>) {
        self.observers.push(observer);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// What the current phase waits on.
    #[must_use]
    pub const fn suspension(&self) -> Suspension {
        self.suspension
    }

    /// Number of enemy turns entered so far.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Outcome, once the encounter is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Returns true once the machine has halted.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Seed of the selection RNG.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// The encounter.
    #[must_use]
    pub const fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// The encounter, for external effects between phases (buffs, debuffs,
    /// budget changes).
    pub fn encounter_mut(&mut self) -> &mut Encounter {
        &mut self.encounter
    }

    /// Chains the player has confirmed this turn.
    #[must_use]
    pub const fn player_queue(&self) -> &ActionQueue {
        &self.player_queue
    }

    /// Chains the enemies selected this turn.
    #[must_use]
    pub const fn enemy_queue(&self) -> &ActionQueue {
        &self.enemy_queue
    }

    /// Pending player input.
    #[must_use]
    pub const fn input(&self) -> &InputSurface {
        &self.input
    }

    /// Report of the most recent clash.
    #[must_use]
    pub const fn last_clash(&self) -> Option<&ClashReport> {
        self.last_clash.as_ref()
    }

    /// Skill executions still inside their nominal duration.
    #[must_use]
    pub fn pending_completions(&self) -> usize {
        self.completions.len()
    }

    /// Countdown length computed for the current (or last) player turn.
    #[must_use]
    pub const fn current_turn_duration(&self) -> f32 {
        self.turn_duration
    }

    /// Player turn length from the speed differential.
    ///
    /// `trunc(player_speed - mean_enemy_speed)` clamped to the configured
    /// bounds. With no living enemies the maximum duration is used.
    #[must_use]
    pub fn player_turn_duration(&self) -> f32 {
        let speed = &self.config.speed_stat;
        let (total, count) = self
            .encounter
            .living_enemies()
            .fold((0.0_f32, 0_u16), |(total, count), enemy| {
                (total + enemy.sheet().stat_value_or_zero(speed), count + 1)
            });
        if count == 0 {
            return self.config.max_turn_duration;
        }
        let average = total / f32::from(count);
        let player = self.encounter.player.sheet().stat_value_or_zero(speed);
        (player - average)
            .trunc()
            .max(self.config.min_turn_duration)
            .min(self.config.max_turn_duration)
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Enters the first enemy turn. Calling it again does nothing.
    pub fn start(&mut self) {
        if self.suspension != Suspension::NotStarted {
            return;
        }
        info!(seed = self.seed, enemies = self.encounter.enemies.len(), "encounter started");
        self.forward_sheet_events();
        self.enter(TurnPhase::EnemyTurn);
    }

    /// Advances time by `dt` seconds.
    ///
    /// Completes at most one phase per call. Starts the encounter if needed.
    pub fn step(&mut self, dt: f32) {
        if self.suspension == Suspension::NotStarted {
            self.start();
            return;
        }
        let dt = dt.max(0.0);
        self.advance_completions(dt);

        match self.suspension {
            Suspension::NotStarted | Suspension::Halted | Suspension::AwaitingStart => {}
            Suspension::Delay { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.complete_phase();
                } else {
                    self.suspension = Suspension::Delay { remaining };
                }
            }
            Suspension::Countdown { remaining } => {
                let remaining = (remaining - dt).max(0.0);
                self.notify(|o| o.on_timer_tick(remaining));
                if remaining <= 0.0 {
                    self.finalize_player_input();
                    self.complete_phase();
                } else {
                    self.suspension = Suspension::Countdown { remaining };
                }
            }
        }
    }

    /// Starts the player countdown if the player turn is waiting for it.
    ///
    /// Returns false in any other state.
    pub fn signal_turn_start(&mut self) -> bool {
        if self.suspension != Suspension::AwaitingStart {
            return false;
        }
        debug!(duration = self.turn_duration, "player countdown started");
        self.suspension = Suspension::Countdown {
            remaining: self.turn_duration,
        };
        true
    }

    // -------------------------------------------------------------------------
    // Player input
    // -------------------------------------------------------------------------

    fn accepting_input(&self, action: &str) -> bool {
        let accepting = matches!(self.suspension, Suspension::Countdown { .. });
        if !accepting {
            debug!(action, phase = %self.phase, "input outside player countdown ignored");
        }
        accepting
    }

    /// Appends a direction to the pending combination.
    pub fn submit_direction(&mut self, direction: Direction) -> bool {
        self.accepting_input("submit") && self.input.submit_direction(direction)
    }

    /// Links the pending combination into the open chain.
    pub fn link(&mut self) -> bool {
        self.accepting_input("link") && self.input.link()
    }

    /// Confirms the open chain into the player queue.
    pub fn confirm(&mut self) -> bool {
        if !self.accepting_input("confirm") {
            return false;
        }
        match self.input.confirm(CombatantId::PLAYER) {
            Some(chain) => {
                debug!(%chain, "player chain confirmed");
                self.player_queue.push(chain);
                let snapshot = self.player_queue.snapshot();
                self.notify(|o| o.on_queue_changed(&snapshot));
                true
            }
            None => false,
        }
    }

    /// Drops the pending combination.
    pub fn clear(&mut self) -> bool {
        if !self.accepting_input("clear") {
            return false;
        }
        self.input.clear();
        true
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn notify(&mut self, mut f: impl FnMut(&mut dyn CombatObserver)) {
        for observer in &mut self.observers {
            f(observer.as_mut());
        }
    }

    fn enter(&mut self, phase: TurnPhase) {
        self.phase = phase;
        if phase == TurnPhase::EnemyTurn {
            self.turn += 1;
        }
        let turn = self.turn;
        info!(turn, %phase, "phase entered");
        self.notify(|o| {
            o.on_phase_changed(phase, turn);
            o.on_turn_label(phase.label());
        });

        match phase {
            TurnPhase::EnemyTurn => self.enter_enemy_turn(),
            TurnPhase::PlayerTurn => self.enter_player_turn(),
            TurnPhase::ClashTurn => self.enter_clash_turn(),
        }
    }

    fn enter_enemy_turn(&mut self) {
        self.enemy_queue.clear();
        self.selector
            .select_all(&mut self.encounter.enemies, &mut self.rng, &mut self.enemy_queue);
        let snapshot = self.enemy_queue.snapshot();
        self.notify(|o| o.on_queue_changed(&snapshot));
        self.suspension = Suspension::Delay {
            remaining: self.config.enemy_turn_interval,
        };
    }

    fn enter_player_turn(&mut self) {
        self.player_queue.clear();
        self.input.reset();
        let Encounter {
            player, enemies, ..
        } = &mut self.encounter;
        player.refresh_known_skills(enemies);

        let snapshot = self.player_queue.snapshot();
        self.notify(|o| o.on_queue_changed(&snapshot));

        self.turn_duration = self.player_turn_duration();
        debug!(duration = self.turn_duration, "player turn duration");
        if self.config.auto_start_player_turn {
            self.suspension = Suspension::Countdown {
                remaining: self.turn_duration,
            };
        } else {
            self.suspension = Suspension::AwaitingStart;
        }
    }

    fn enter_clash_turn(&mut self) {
        let report = self.resolver.resolve(
            &self.player_queue,
            &self.enemy_queue,
            &mut self.encounter,
            &self.executor,
        );

        for pairing in &report.pairings {
            let outcome = pairing.outcome;
            for observer in &mut self.observers {
                observer.on_clash_outcome(outcome);
            }
        }
        for execution in &report.executions {
            for observer in &mut self.observers {
                observer.on_skill_executed(
                    &execution.skill_name,
                    execution.attacker,
                    execution.target,
                    execution.value,
                );
            }
            self.completions.push(PendingCompletion {
                skill_name: execution.skill_name.clone(),
                attacker: execution.attacker,
                remaining: execution.completes_after,
            });
        }
        info!(
            pairings = report.pairings.len(),
            executions = report.executions.len(),
            unresolved = report.unresolved.len(),
            "clash resolved"
        );

        self.forward_sheet_events();
        self.last_clash = Some(report);
        self.suspension = Suspension::Delay {
            remaining: self.config.resolution_buffer,
        };
    }

    fn finalize_player_input(&mut self) {
        if let Some(chain) = self.input.finalize(CombatantId::PLAYER) {
            debug!(%chain, "partial input finalized");
            self.player_queue.push(chain);
            let snapshot = self.player_queue.snapshot();
            self.notify(|o| o.on_queue_changed(&snapshot));
        }
    }

    fn complete_phase(&mut self) {
        // Changes made through `encounter_mut` land in the phase they happened in
        self.forward_sheet_events();
        if let Some(outcome) = self.terminal_outcome() {
            info!(%outcome, turn = self.turn, "encounter over");
            self.outcome = Some(outcome);
            self.suspension = Suspension::Halted;
            self.notify(|o| o.on_game_over(outcome));
            return;
        }
        self.enter(self.phase.next());
    }

    fn terminal_outcome(&self) -> Option<GameOutcome> {
        match (
            self.encounter.player_defeated(),
            self.encounter.enemies_defeated(),
        ) {
            (true, true) => Some(GameOutcome::MutualDefeat),
            (true, false) => Some(GameOutcome::PlayerDefeat),
            (false, true) => Some(GameOutcome::PlayerVictory),
            (false, false) => None,
        }
    }

    fn advance_completions(&mut self, dt: f32) {
        if self.completions.is_empty() {
            return;
        }
        for pending in &mut self.completions {
            pending.remaining -= dt;
        }
        let (done, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.completions)
            .into_iter()
            .partition(|p| p.remaining <= 0.0);
        self.completions = waiting;
        for pending in done {
            self.notify(|o| o.on_skill_completed(&pending.skill_name, pending.attacker));
        }
    }

    fn forward_sheet_events(&mut self) {
        let mut drained = vec![(
            CombatantId::PLAYER,
            self.encounter.player.sheet_mut().drain_events(),
        )];
        for enemy in &mut self.encounter.enemies {
            drained.push((enemy.id(), enemy.sheet_mut().drain_events()));
        }

        for (id, events) in drained {
            for event in events {
                match event {
                    SheetEvent::HealthChanged { current, max } => {
                        self.notify(|o| o.on_health_changed(id, current, max));
                    }
                    SheetEvent::Died => {
                        info!(combatant = %id, "combatant died");
                        self.notify(|o| o.on_death(id));
                    }
                    SheetEvent::StatChanged { .. } => {}
                }
            }
        }
    }
}

//! Notifications to display and playback collaborators.
//!
//! The orchestrator calls every registered [`CombatObserver`] synchronously.
//! Observers are sinks: they return nothing and cannot influence combat.
//!
//! [`EventLog`] is an observer that records every notification as a
//! [`CombatEvent`]. It is cheap to clone; clones share one log, so a caller
//! can keep a handle after registering a clone with the orchestrator.
//!
//! # Example
//!
//! ```
//! use runeclash_core::observer::{CombatEvent, CombatObserver, EventLog};
//!
//! let log = EventLog::new();
//! let mut sink = log.clone();
//! sink.on_turn_label("Enemy Turn");
//!
//! assert_eq!(log.take_events(), vec![CombatEvent::TurnLabel("Enemy Turn".to_string())]);
//! assert!(log.is_empty());
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::chain::QueueSnapshot;
use crate::clash::ClashOutcome;
use crate::combatant::CombatantId;
use crate::orchestrator::{GameOutcome, TurnPhase};

/// Receiver of combat notifications. Every method defaults to doing nothing.
pub trait CombatObserver: Send {
    /// A new turn label should be shown.
    fn on_turn_label(&mut self, _text: &str) {}

    /// The player countdown advanced.
    fn on_timer_tick(&mut self, _remaining: f32) {}

    /// A side's queue changed.
    fn on_queue_changed(&mut self, _snapshot: &QueueSnapshot) {}

    /// A clash pairing was decided.
    fn on_clash_outcome(&mut self, _outcome: ClashOutcome) {}

    /// A skill was applied.
    fn on_skill_executed(
        &mut self,
        _skill_name: &str,
        _attacker: CombatantId,
        _defender: CombatantId,
        _effect_value: f32,
    ) {
    }

    /// A skill's nominal duration elapsed.
    fn on_skill_completed(&mut self, _skill_name: &str, _attacker: CombatantId) {}

    /// A combatant's health changed.
    fn on_health_changed(&mut self, _id: CombatantId, _current: f32, _max: f32) {}

    /// A combatant died.
    fn on_death(&mut self, _id: CombatantId) {}

    /// The orchestrator entered a phase.
    fn on_phase_changed(&mut self, _phase: TurnPhase, _turn: u32) {}

    /// The encounter ended.
    fn on_game_over(&mut self, _outcome: GameOutcome) {}
}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// See [`CombatObserver::on_turn_label`]
    TurnLabel(String),
    /// See [`CombatObserver::on_timer_tick`]
    TimerTick(f32),
    /// See [`CombatObserver::on_queue_changed`]
    QueueChanged(QueueSnapshot),
    /// See [`CombatObserver::on_clash_outcome`]
    ClashOutcome(ClashOutcome),
    /// See [`CombatObserver::on_skill_executed`]
    SkillExecuted {
        /// Skill display name
        skill_name: String,
        /// Caster
        attacker: CombatantId,
        /// Receiver
        defender: CombatantId,
        /// Computed effect value
        effect_value: f32,
    },
    /// See [`CombatObserver::on_skill_completed`]
    SkillCompleted {
        /// Skill display name
        skill_name: String,
        /// Caster
        attacker: CombatantId,
    },
    /// See [`CombatObserver::on_health_changed`]
    HealthChanged {
        /// Combatant
        id: CombatantId,
        /// Current health
        current: f32,
        /// Maximum health
        max: f32,
    },
    /// See [`CombatObserver::on_death`]
    Death(CombatantId),
    /// See [`CombatObserver::on_phase_changed`]
    PhaseChanged {
        /// Phase entered
        phase: TurnPhase,
        /// Turn counter
        turn: u32,
    },
    /// See [`CombatObserver::on_game_over`]
    GameOver(GameOutcome),
}

/// Observer recording every notification.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<CombatEvent>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: CombatEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Drains and returns every recorded event.
    pub fn take_events(&self) -> Vec<CombatEvent> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *events)
    }

    /// Copies the recorded events without draining them.
    #[must_use]
    pub fn events(&self) -> Vec<CombatEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CombatObserver for EventLog {
    fn on_turn_label(&mut self, text: &str) {
        self.record(CombatEvent::TurnLabel(text.to_string()));
    }

    fn on_timer_tick(&mut self, remaining: f32) {
        self.record(CombatEvent::TimerTick(remaining));
    }

    fn on_queue_changed(&mut self, snapshot: &QueueSnapshot) {
        self.record(CombatEvent::QueueChanged(snapshot.clone()));
    }

    fn on_clash_outcome(&mut self, outcome: ClashOutcome) {
        self.record(CombatEvent::ClashOutcome(outcome));
    }

    fn on_skill_executed(
        &mut self,
        skill_name: &str,
        attacker: CombatantId,
        defender: CombatantId,
        effect_value: f32,
    ) {
        self.record(CombatEvent::SkillExecuted {
            skill_name: skill_name.to_string(),
            attacker,
            defender,
            effect_value,
        });
    }

    fn on_skill_completed(&mut self, skill_name: &str, attacker: CombatantId) {
        self.record(CombatEvent::SkillCompleted {
            skill_name: skill_name.to_string(),
            attacker,
        });
    }

    fn on_health_changed(&mut self, id: CombatantId, current: f32, max: f32) {
        self.record(CombatEvent::HealthChanged { id, current, max });
    }

    fn on_death(&mut self, id: CombatantId) {
        self.record(CombatEvent::Death(id));
    }

    fn on_phase_changed(&mut self, phase: TurnPhase, turn: u32) {
        self.record(CombatEvent::PhaseChanged { phase, turn });
    }

    fn on_game_over(&mut self, outcome: GameOutcome) {
        self.record(CombatEvent::GameOver(outcome));
    }
}

//! Game events: the ordered, append-only record every action emits.
//!
//! Sub-resolvers append to a shared [`EventLog`] accumulator threaded
//! through their calls rather than reaching for global state (Design Note
//! "Event collection during resolution").

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The fixed tag vocabulary from spec §3. `Display` renders the
/// `string_tag` an external `GameLogger` persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Move,
    Dodge,
    Gfi,
    Pickup,
    Catch,
    Pass,
    Block,
    KnockedDown,
    Armour,
    Injury,
    Bounce,
    Reroll,
    Turnover,
    Touchdown,
    BloodlustBite,
    BloodlustFail,
    EndTurn,
    Kickoff,
    WeatherChange,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            EventKind::Move => "move",
            EventKind::Dodge => "dodge",
            EventKind::Gfi => "gfi",
            EventKind::Pickup => "pickup",
            EventKind::Catch => "catch",
            EventKind::Pass => "pass",
            EventKind::Block => "block",
            EventKind::KnockedDown => "knocked_down",
            EventKind::Armour => "armour",
            EventKind::Injury => "injury",
            EventKind::Bounce => "bounce",
            EventKind::Reroll => "reroll",
            EventKind::Turnover => "turnover",
            EventKind::Touchdown => "touchdown",
            EventKind::BloodlustBite => "bloodlust_bite",
            EventKind::BloodlustFail => "bloodlust_fail",
            EventKind::EndTurn => "end_turn",
            EventKind::Kickoff => "kickoff",
            EventKind::WeatherChange => "weather_change",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub description: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl GameEvent {
    pub fn new(kind: EventKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into(), data: Map::new() }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Shared accumulator threaded through sub-resolver calls. A plain `Vec`
/// wrapped behind a thin append API keeps every call site's events ordered
/// and keeps resolvers from needing a callback trait object for the common
/// case.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Vec<GameEvent>);

impl EventLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, event: GameEvent) {
        self.0.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.0.extend(events);
    }

    pub fn into_vec(self) -> Vec<GameEvent> {
        self.0
    }

    pub fn as_slice(&self) -> &[GameEvent] {
        &self.0
    }
}

/// External collaborator: receives per-turn state snapshots and, at match
/// end, a final result. The engine drives this; it never reads it back.
pub trait GameLogger {
    fn on_turn(&mut self, state: &crate::state::GameState, active_team: crate::geometry::Side);
    fn on_event(&mut self, event: &GameEvent);
    fn on_match_end(&mut self, result: &MatchResult);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub home_score: u8,
    pub away_score: u8,
}

/// A `GameLogger` that discards everything — the default for headless runs
/// that only care about the final `MatchResult` from the driver.
#[derive(Debug, Default)]
pub struct NullLogger;

impl GameLogger for NullLogger {
    fn on_turn(&mut self, _state: &crate::state::GameState, _active_team: crate::geometry::Side) {}
    fn on_event(&mut self, _event: &GameEvent) {}
    fn on_match_end(&mut self, _result: &MatchResult) {}
}

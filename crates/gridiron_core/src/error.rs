//! Engine error taxonomy (spec §7).
//!
//! `IllegalAction` is recoverable — the caller resubmits a legal action — and
//! is surfaced as a failed [`crate::engine::action_resolver::ActionResult`],
//! never a panic. `InvalidInvariant` and `BrokenDiceStream` mean the engine
//! (or a test) has a bug and panic at the boundary; see
//! [`crate::state::GameState::assert_invariants`].

use thiserror::Error;

use crate::geometry::Position;
use crate::model::player::PlayerId;

/// Recoverable, caller-facing errors. A failed [`crate::resolve`] call with
/// one of these never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("player {0:?} is not on the active team")]
    NotActiveTeam(PlayerId),

    #[error("player {0:?} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {0:?} is not on the pitch")]
    PlayerNotOnPitch(PlayerId),

    #[error("player {0:?} has already acted this turn")]
    AlreadyActed(PlayerId),

    #[error("player {0:?} has already moved this turn")]
    AlreadyMoved(PlayerId),

    #[error("destination {0:?} is off the pitch")]
    OffPitch(Position),

    #[error("destination {0:?} is occupied")]
    SquareOccupied(Position),

    #[error("no legal path from {from:?} to {to:?}")]
    NoPath { from: Position, to: Position },

    #[error("target {0:?} is not adjacent to the acting player")]
    NotAdjacent(PlayerId),

    #[error("target {0:?} is not a standing enemy")]
    TargetNotStandingEnemy(PlayerId),

    #[error("action requires the {0} skill")]
    MissingSkill(&'static str),

    #[error("team has already used its blitz this turn")]
    BlitzAlreadyUsed,

    #[error("team has already used its pass action this turn")]
    PassAlreadyUsed,

    #[error("team has already used its foul this turn")]
    FoulAlreadyUsed,

    #[error("action is not legal in phase {0:?}")]
    WrongPhase(crate::state::Phase),

    #[error("invalid action parameters: {0}")]
    InvalidParams(String),

    #[error("setup formation illegal: {0}")]
    InvalidFormation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Panics with a uniform `InvalidInvariant` message. Called only from
/// [`crate::state::GameState::assert_invariants`] and friends — this is the
/// engine-bug path, not the caller-facing one.
#[track_caller]
pub fn invariant_violation(message: impl AsRef<str>) -> ! {
    panic!("InvalidInvariant: {}", message.as_ref());
}

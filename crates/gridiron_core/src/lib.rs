//! # gridiron_core — Deterministic Tactical Match Simulation Engine
//!
//! This library is the authoritative rules arbiter for a turn-based tactical
//! match on a 26x15 grid. Given an immutable [`state::GameState`] and a
//! requested action, [`engine::action_resolver::resolve`] produces a new
//! state, a turnover flag, and an ordered list of [`model::event::GameEvent`]s.
//!
//! ## Determinism
//! Every sub-resolver reads randomness only through a [`dice::DiceSource`].
//! Given a fixed seed (or a fixed scripted sequence) and a fixed action
//! sequence, the resulting state is byte-for-byte reproducible.
//!
//! ## Concurrency
//! The engine is single-threaded per match. [`state::GameState`] is a value;
//! sub-resolvers never mutate their input, they return a new state plus
//! events. Running many matches in parallel is the embedder's job (one
//! engine instance per thread/task).

#![allow(clippy::too_many_arguments)]
#![allow(clippy::large_enum_variant)]

pub mod coach;
pub mod dice;
pub mod driver;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod model;
pub mod state;

pub use dice::{BlockDie, DiceSource, PrngDice, ScriptedDice};
pub use engine::action_resolver::{resolve, ActionResult};
pub use error::{EngineError, Result};
pub use geometry::Position;
pub use model::event::GameEvent;
pub use model::player::{Player, PlayerId, PlayerState, PlayerStats};
pub use model::team::TeamState;
pub use state::{GameState, Phase, Weather};

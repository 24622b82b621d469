//! The `Coach` collaborator (spec §6) — the AI boundary the engine drives
//! during headless simulation. The engine never reaches into a coach's
//! internal state; it only calls `decide_action`/`setup_formation` and acts
//! on the returned value. The reinforcement-learning weight file referenced
//! in spec §1/§6 lives entirely outside this crate — `RandomCoach` is the
//! deterministic stand-in the spec says to implement only the interface
//! boundary for.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::engine::rules::{self, Action};
use crate::geometry::{Position, Side, LOS_X_HIGH, LOS_X_LOW};
use crate::model::player::PlayerState;
use crate::state::GameState;

/// Chooses the next action and places reserves during setup. Implementors
/// must not retain a reference to a `GameState` past the call that handed
/// it to them (spec §5) — every method here takes state by reference and
/// returns an owned decision/state instead of a handle into the input.
pub trait Coach {
    /// Picks one of `legal_actions` (as produced by
    /// [`rules::available_actions`]) to submit next.
    fn decide_action(&mut self, state: &GameState, legal_actions: &[Action]) -> Action;

    /// Places up to 11 reserves belonging to `side` onto its own half,
    /// respecting the line-of-scrimmage and wide-zone constraints (§6).
    /// The default implementation is a naive but always-legal formation:
    /// three players on the line of scrimmage, the rest packed inward from
    /// the sideline, capped at two per wide zone.
    fn setup_formation(&mut self, state: &GameState, side: Side) -> GameState {
        default_formation(state, side)
    }
}

fn default_formation(state: &GameState, side: Side) -> GameState {
    let mut working = state.clone();
    let reserves: Vec<crate::model::player::PlayerId> = working
        .players_on_side(side)
        .filter(|p| p.state == PlayerState::OffPitch)
        .map(|p| p.id)
        .take(11)
        .collect();

    let los_x = match side {
        Side::Home => LOS_X_LOW,
        Side::Away => LOS_X_HIGH,
    };
    let inner_x = match side {
        Side::Home => LOS_X_LOW - 1,
        Side::Away => LOS_X_HIGH + 1,
    };

    for (i, id) in reserves.into_iter().enumerate() {
        let pos = if i < 3 {
            Position::new(los_x, 5 + i as i32)
        } else {
            let row = 4 + (i - 3) as i32;
            Position::new(inner_x, row.min(13))
        };
        let movement = working.player(id).map(|p| p.stats.movement).unwrap_or(6);
        if let Some(p) = working.player_mut(id) {
            p.state = PlayerState::Standing;
            p.position = Some(pos);
            p.flags.movement_remaining = movement;
        }
    }
    working
}

/// Seeded-RNG coach that picks uniformly among legal actions, with a small
/// epsilon-greedy bias toward ending the turn early once actions start
/// repeating — the CLI's `weights`/`epsilon` flags thread through to this
/// coach as the stand-in for the unshipped learned policy (spec §1, §6).
pub struct RandomCoach {
    rng: ChaCha8Rng,
    epsilon: f64,
}

impl RandomCoach {
    pub fn new(seed: u64, epsilon: f64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), epsilon: epsilon.clamp(0.0, 1.0) }
    }
}

impl Coach for RandomCoach {
    fn decide_action(&mut self, _state: &GameState, legal_actions: &[Action]) -> Action {
        if legal_actions.is_empty() {
            return Action::EndTurn;
        }
        if legal_actions.len() > 1 && self.rng.gen_bool(self.epsilon) {
            if let Some(end_turn) = legal_actions.iter().find(|a| matches!(a, Action::EndTurn)) {
                return *end_turn;
            }
        }
        let idx = self.rng.gen_range(0..legal_actions.len());
        legal_actions[idx]
    }

    fn setup_formation(&mut self, state: &GameState, side: Side) -> GameState {
        default_formation(state, side)
    }
}

/// Dequeues a fixed, predetermined sequence of decisions — the coach
/// counterpart to [`crate::dice::ScriptedDice`] for the literal end-to-end
/// scenarios in spec §8. Falls back to `END_TURN` once exhausted rather
/// than panicking: an exhausted script is a test's signal that the scenario
/// is over, not an engine bug like `BrokenDiceStream`.
#[derive(Default)]
pub struct ScriptedCoach {
    actions: VecDeque<Action>,
    formations: VecDeque<GameState>,
}

impl ScriptedCoach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push_back(action);
    }
}

impl Coach for ScriptedCoach {
    fn decide_action(&mut self, _state: &GameState, _legal_actions: &[Action]) -> Action {
        self.actions.pop_front().unwrap_or(Action::EndTurn)
    }

    fn setup_formation(&mut self, state: &GameState, side: Side) -> GameState {
        self.formations.pop_front().unwrap_or_else(|| default_formation(state, side))
    }
}

/// Convenience used by [`crate::driver`] to convert a `GameState` and
/// `Coach` pair into the action the engine should try next.
pub fn next_action(coach: &mut dyn Coach, state: &GameState) -> Action {
    let legal = rules::available_actions(state);
    coach.decide_action(state, &legal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_coach_is_deterministic_for_a_fixed_seed() {
        let legal = vec![Action::EndTurn, Action::EndSetup];
        let state = GameState::new(
            crate::model::team::TeamState::new("home", "Home", "humans", Side::Home),
            crate::model::team::TeamState::new("away", "Away", "orcs", Side::Away),
            Side::Home,
        );
        let mut a = RandomCoach::new(7, 0.0);
        let mut b = RandomCoach::new(7, 0.0);
        let picks_a: Vec<Action> = (0..10).map(|_| a.decide_action(&state, &legal)).collect();
        let picks_b: Vec<Action> = (0..10).map(|_| b.decide_action(&state, &legal)).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn scripted_coach_falls_back_to_end_turn_when_exhausted() {
        let state = GameState::new(
            crate::model::team::TeamState::new("home", "Home", "humans", Side::Home),
            crate::model::team::TeamState::new("away", "Away", "orcs", Side::Away),
            Side::Home,
        );
        let mut coach = ScriptedCoach::new();
        assert_eq!(coach.decide_action(&state, &[]), Action::EndTurn);
    }
}

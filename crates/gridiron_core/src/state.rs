//! The immutable match state and its invariants (spec §3).
//!
//! `GameState` is a value. Sub-resolvers never mutate an existing instance
//! in place; they call one of the `with_*` builder methods, each of which
//! clones the handful of fields that change and returns a new `GameState`
//! (Design Note "Immutability with with-* update methods"). Fields are
//! private so every mutation path funnels through those methods and through
//! [`GameState::assert_invariants`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::invariant_violation;
use crate::geometry::{Position, Side};
use crate::model::ball::Ball;
use crate::model::player::{Player, PlayerId, PlayerState};
use crate::model::team::TeamState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    CoinToss,
    Setup,
    Kickoff,
    Play,
    Touchdown,
    HalfTime,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Nice,
    Sweltering,
    VerySunny,
    PouringRain,
    Blizzard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) match_id: Uuid,
    pub(crate) half: u8,
    pub(crate) phase: Phase,
    pub(crate) active_team: Side,
    pub(crate) home_team: TeamState,
    pub(crate) away_team: TeamState,
    pub(crate) players: HashMap<PlayerId, Player>,
    pub(crate) ball: Ball,
    pub(crate) turnover_pending: bool,
    pub(crate) kicking_team: Side,
    pub(crate) ai_team: Option<Side>,
    pub(crate) weather: Weather,
}

impl GameState {
    pub fn new(home_team: TeamState, away_team: TeamState, kicking_team: Side) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            half: 1,
            phase: Phase::CoinToss,
            active_team: kicking_team.opponent(),
            home_team,
            away_team,
            players: HashMap::new(),
            ball: Ball::OffPitch,
            turnover_pending: false,
            kicking_team,
            ai_team: None,
            weather: Weather::Nice,
        }
    }

    pub fn team(&self, side: Side) -> &TeamState {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut TeamState {
        match side {
            Side::Home => &mut self.home_team,
            Side::Away => &mut self.away_team,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players_on_side(&self, side: Side) -> impl Iterator<Item = &Player> {
        self.players.values().filter(move |p| p.team_side == side)
    }

    pub fn players_on_pitch(&self, side: Side) -> impl Iterator<Item = &Player> {
        self.players_on_side(side).filter(|p| p.is_on_pitch())
    }

    pub fn player_at(&self, position: Position) -> Option<&Player> {
        self.players.values().find(|p| p.position == Some(position))
    }

    pub fn active_team_state(&self) -> &TeamState {
        self.team(self.active_team)
    }

    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    pub fn half(&self) -> u8 {
        self.half
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_team(&self) -> Side {
        self.active_team
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    pub fn turnover_pending(&self) -> bool {
        self.turnover_pending
    }

    pub fn kicking_team(&self) -> Side {
        self.kicking_team
    }

    pub fn ai_team(&self) -> Option<Side> {
        self.ai_team
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    // ---- engine-internal mutation ----
    //
    // `with_*` builders below are the public, value-semantics transition API.
    // Inside the crate, sub-resolvers work against an owned, mutable working
    // copy of `GameState` rather than threading a fresh clone through every
    // single-field change (Design Note "Event collection during resolution"
    // pairs this with a shared `EventLog`); these accessors exist so that
    // code can mutate the working copy in place without reaching into
    // private fields directly.

    pub(crate) fn set_ball(&mut self, ball: Ball) {
        self.ball = ball;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_turnover_pending(&mut self, pending: bool) {
        self.turnover_pending = pending;
    }

    pub(crate) fn set_active_team(&mut self, side: Side) {
        self.active_team = side;
    }

    pub(crate) fn set_half(&mut self, half: u8) {
        self.half = half;
    }

    pub(crate) fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    pub(crate) fn set_kicking_team(&mut self, side: Side) {
        self.kicking_team = side;
    }

    // ---- with_* builders ----

    pub fn with_player(mut self, id: PlayerId, f: impl FnOnce(&mut Player)) -> Self {
        if let Some(p) = self.players.get_mut(&id) {
            f(p);
        }
        self
    }

    /// Adds (or replaces) a player in the roster, keyed by its `id`. The
    /// entry point external callers use to build a match's starting roster,
    /// since `players` itself is private.
    pub fn with_player_added(mut self, player: Player) -> Self {
        self.players.insert(player.id, player);
        self
    }

    pub fn with_team(mut self, side: Side, f: impl FnOnce(&mut TeamState)) -> Self {
        f(self.team_mut(side));
        self
    }

    pub fn with_ball(mut self, ball: Ball) -> Self {
        self.ball = ball;
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_turnover_pending(mut self, pending: bool) -> Self {
        self.turnover_pending = pending;
        self
    }

    pub fn with_active_team(mut self, side: Side) -> Self {
        self.active_team = side;
        self
    }

    pub fn with_half(mut self, half: u8) -> Self {
        self.half = half;
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_kicking_team(mut self, side: Side) -> Self {
        self.kicking_team = side;
        self
    }

    /// Checks the five structural invariants from spec §3/§8. Panics
    /// (`InvalidInvariant`) rather than returning a `Result` — a violation
    /// here means the engine has a bug, not that the caller submitted an
    /// illegal action. Compiled out with `debug_assertions` off, per §7.
    pub fn assert_invariants(&self) {
        if cfg!(debug_assertions) {
            self.check_invariants();
        }
    }

    fn check_invariants(&self) {
        for side in [Side::Home, Side::Away] {
            let on_pitch = self.players_on_pitch(side).count();
            if self.phase == Phase::Play && on_pitch > 11 {
                invariant_violation(format!(
                    "{side:?} has {on_pitch} on-pitch players during play, max is 11"
                ));
            }
        }

        let mut seen = HashMap::new();
        for p in self.players.values().filter(|p| p.is_on_pitch()) {
            let pos = p.position.expect("on-pitch player without a position");
            if let Some(prev) = seen.insert(pos, p.id) {
                invariant_violation(format!(
                    "positions not pairwise distinct: {:?} and {:?} both at {pos:?}",
                    prev, p.id
                ));
            }
        }

        if let Ball::Held(carrier_id) = self.ball {
            match self.players.get(&carrier_id) {
                Some(p) if p.state == PlayerState::Standing && p.is_on_pitch() => {}
                _ => invariant_violation(format!(
                    "ball held by {carrier_id:?} who is not a standing on-pitch player"
                )),
            }
        }

        if let Ball::OnGround(pos) = self.ball {
            if !pos.is_on_pitch() {
                invariant_violation(format!("ball on ground at off-pitch square {pos:?}"));
            }
        }

        for side in [Side::Home, Side::Away] {
            if self.team(side).turn_number > 8 && self.phase == Phase::Play {
                invariant_violation(format!(
                    "{side:?} turnNumber exceeds 8 while still in phase Play"
                ));
            }
        }

        if !matches!(self.half, 1 | 2) {
            invariant_violation(format!("half must be 1 or 2, got {}", self.half));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::{PlayerStats, TurnFlags};
    use crate::model::skills::SkillSet;

    fn sample_state() -> GameState {
        GameState::new(
            TeamState::new("home", "Home FC", "humans", Side::Home),
            TeamState::new("away", "Away FC", "orcs", Side::Away),
            Side::Home,
        )
    }

    #[test]
    fn new_state_has_no_ball_and_coin_toss_phase() {
        let s = sample_state();
        assert_eq!(s.phase, Phase::CoinToss);
        assert_eq!(s.ball, Ball::OffPitch);
        s.assert_invariants();
    }

    #[test]
    #[should_panic(expected = "InvalidInvariant")]
    fn duplicate_on_pitch_positions_panics() {
        let mut s = sample_state();
        s.phase = Phase::Play;
        let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
        let mut a = Player::new(PlayerId(1), Side::Home, "A", 1, "Lineman", stats, SkillSet::new());
        a.state = PlayerState::Standing;
        a.position = Some(Position::new(5, 5));
        a.flags = TurnFlags { movement_remaining: 6, ..Default::default() };
        let mut b = Player::new(PlayerId(2), Side::Away, "B", 2, "Lineman", stats, SkillSet::new());
        b.state = PlayerState::Standing;
        b.position = Some(Position::new(5, 5));
        s.players.insert(a.id, a);
        s.players.insert(b.id, b);
        s.assert_invariants();
    }

    #[test]
    #[should_panic(expected = "InvalidInvariant")]
    fn held_ball_by_non_standing_player_panics() {
        let mut s = sample_state();
        let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
        let mut a = Player::new(PlayerId(1), Side::Home, "A", 1, "Lineman", stats, SkillSet::new());
        a.state = PlayerState::Prone;
        a.position = Some(Position::new(5, 5));
        s.players.insert(a.id, a);
        s.ball = Ball::Held(PlayerId(1));
        s.assert_invariants();
    }
}

//! Headless driver (spec §6, §9): drives two [`Coach`]s against the action
//! resolver in a loop to completion. Mirrors the teacher's split between
//! library-owned business logic and a thin CLI binary — `gridiron_cli` only
//! parses flags and prints the summary this module produces.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info};

use crate::coach::{next_action, Coach};
use crate::dice::{DiceSource, PrngDice};
use crate::engine::action_resolver::resolve;
use crate::engine::game_flow::resolve_half_time;
use crate::engine::rules::Action;
use crate::geometry::Side;
use crate::model::event::{GameLogger, MatchResult, NullLogger};
use crate::model::player::{Player, PlayerId, PlayerStats};
use crate::model::skills::SkillSet;
use crate::model::team::TeamState;
use crate::state::{GameState, Phase};

/// Driver-level safety valves (spec §5) — not engine contracts. A match
/// that blows through either cap is a coach bug, not an engine one; the
/// driver degrades gracefully rather than looping forever.
pub const MAX_ACTIONS_PER_MATCH: u32 = 2000;
pub const MAX_ACTIONS_PER_TURN: u32 = 50;

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub seed: u64,
    pub home_race: String,
    pub away_race: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { seed: 0, home_race: "humans".to_string(), away_race: "humans".to_string() }
    }
}

/// Builds an 11-lineman roster for `side`/`race`. The spec treats roster
/// composition (positionals, skill packages) as belonging to the
/// out-of-scope persistence layer; this is the minimal in-scope stand-in
/// that lets the driver field a legal 11-a-side team without one.
pub fn build_roster(side: Side, race: &str, id_offset: u32) -> Vec<Player> {
    let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
    (1..=11u32)
        .map(|number| {
            Player::new(
                PlayerId(id_offset + number),
                side,
                format!("{race} Lineman {number}"),
                number as u8,
                "Lineman",
                stats,
                SkillSet::new(),
            )
        })
        .collect()
}

fn new_match_state(config: &MatchConfig, dice: &mut dyn DiceSource) -> GameState {
    let kicking = if dice.roll_d6() <= 3 { Side::Home } else { Side::Away };
    let mut state = GameState::new(
        TeamState::new("home", "Home", &config.home_race, Side::Home),
        TeamState::new("away", "Away", &config.away_race, Side::Away),
        kicking,
    );
    for p in build_roster(Side::Home, &config.home_race, 0) {
        state.players.insert(p.id, p);
    }
    for p in build_roster(Side::Away, &config.away_race, 100) {
        state.players.insert(p.id, p);
    }
    state.set_phase(Phase::Setup);
    state
}

/// Invokes `coach.decide_action`/`setup_formation` behind `catch_unwind` —
/// a panicking `Coach` is the spec's `CoachError` (§7): caught, logged, and
/// treated as "no decision", which the caller folds into a forced
/// `END_TURN`.
fn safe_decide_action(coach: &mut dyn Coach, state: &GameState) -> Option<Action> {
    match panic::catch_unwind(AssertUnwindSafe(|| next_action(coach, state))) {
        Ok(action) => Some(action),
        Err(_) => {
            error!("coach panicked while deciding an action; forcing END_TURN");
            None
        }
    }
}

fn safe_setup_formation(coach: &mut dyn Coach, state: &GameState, side: Side) -> GameState {
    match panic::catch_unwind(AssertUnwindSafe(|| coach.setup_formation(state, side))) {
        Ok(new_state) => new_state,
        Err(_) => {
            error!("coach panicked during setup_formation; leaving formation unchanged");
            state.clone()
        }
    }
}

/// Runs one match to completion, driving `home_coach`/`away_coach` in a
/// loop and reporting through `logger`. Dice are PRNG-backed and seeded
/// from `config.seed` — the `(seed, home decisions, away decisions)` triple
/// fully determines the outcome (spec §6).
pub fn run_match(
    home_coach: &mut dyn Coach,
    away_coach: &mut dyn Coach,
    config: MatchConfig,
    logger: &mut dyn GameLogger,
) -> MatchResult {
    let mut dice = PrngDice::new(config.seed);
    let mut state = new_match_state(&config, &mut dice);

    let mut total_actions: u32 = 0;
    let mut actions_this_turn: u32 = 0;
    let mut last_turn_marker = (state.active_team(), state.team(state.active_team()).turn_number);

    loop {
        if state.phase() == Phase::GameOver {
            break;
        }
        if total_actions >= MAX_ACTIONS_PER_MATCH {
            info!("match hit the {MAX_ACTIONS_PER_MATCH}-action safety valve; ending early");
            break;
        }

        match state.phase() {
            Phase::CoinToss => {
                state.set_phase(Phase::Setup);
                continue;
            }
            Phase::Setup => {
                let side = state.active_team();
                let coach = coach_for(side, home_coach, away_coach);
                state = safe_setup_formation(coach, &state, side);
                let result = resolve(&state, Action::EndSetup, &mut dice, || true, |_| false);
                total_actions += 1;
                if result.success {
                    for event in &result.events {
                        logger.on_event(event);
                    }
                    state = result.new_state;
                } else {
                    error!("EndSetup was rejected: {:?}", result.error);
                    break;
                }
            }
            Phase::HalfTime => {
                let mut events = crate::model::event::EventLog::new();
                resolve_half_time(&mut state, &mut dice, &mut events);
                for event in events.as_slice() {
                    logger.on_event(event);
                }
            }
            Phase::Play => {
                let active = state.active_team();
                if (active, state.team(active).turn_number) != last_turn_marker {
                    last_turn_marker = (active, state.team(active).turn_number);
                    actions_this_turn = 0;
                    logger.on_turn(&state, active);
                }

                let action = if actions_this_turn >= MAX_ACTIONS_PER_TURN {
                    Action::EndTurn
                } else {
                    let coach = coach_for(active, home_coach, away_coach);
                    safe_decide_action(coach, &state).unwrap_or(Action::EndTurn)
                };

                let result = resolve(&state, action, &mut dice, || true, |o| matches!(o, crate::engine::injury::InjuryOutcome::Casualty(_)));
                total_actions += 1;
                actions_this_turn += 1;
                if result.success {
                    for event in &result.events {
                        logger.on_event(event);
                    }
                    state = result.new_state;
                } else {
                    // An illegal action from a coach does not mutate state
                    // (§7); force the turn to end rather than looping on it.
                    error!("coach submitted an illegal action: {:?}", result.error);
                    let result = resolve(&state, Action::EndTurn, &mut dice, || true, |_| false);
                    if result.success {
                        state = result.new_state;
                    }
                }
            }
            Phase::Kickoff | Phase::Touchdown | Phase::GameOver => unreachable!(
                "Kickoff/Touchdown are folded into Setup/Play transitions by the action resolver"
            ),
        }
    }

    let result = MatchResult { home_score: state.team(Side::Home).score, away_score: state.team(Side::Away).score };
    logger.on_match_end(&result);
    result
}

fn coach_for<'a>(side: Side, home: &'a mut dyn Coach, away: &'a mut dyn Coach) -> &'a mut dyn Coach {
    match side {
        Side::Home => home,
        Side::Away => away,
    }
}

/// Runs `matches` independent matches (each with seed `base_seed + i`) and
/// aggregates win/loss/draw counts — the data the CLI's summary JSON
/// reports (spec §6).
pub fn run_matches(
    home_coach_factory: impl Fn() -> Box<dyn Coach>,
    away_coach_factory: impl Fn() -> Box<dyn Coach>,
    base_config: MatchConfig,
    matches: u32,
) -> Summary {
    let mut summary = Summary::default();
    for i in 0..matches {
        let mut home = home_coach_factory();
        let mut away = away_coach_factory();
        let config = MatchConfig { seed: base_config.seed.wrapping_add(i as u64), ..base_config.clone() };
        let mut logger = NullLogger;
        let result = run_match(home.as_mut(), away.as_mut(), config, &mut logger);
        summary.record(&result);
    }
    summary
}

#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct Summary {
    pub matches: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub draws: u32,
    pub results: Vec<MatchResult>,
}

impl Summary {
    fn record(&mut self, result: &MatchResult) {
        self.matches += 1;
        match result.home_score.cmp(&result.away_score) {
            std::cmp::Ordering::Greater => self.home_wins += 1,
            std::cmp::Ordering::Less => self.away_wins += 1,
            std::cmp::Ordering::Equal => self.draws += 1,
        }
        self.results.push(result.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::RandomCoach;

    #[test]
    fn a_full_match_reaches_game_over_within_the_action_cap() {
        let mut home = RandomCoach::new(1, 0.1);
        let mut away = RandomCoach::new(2, 0.1);
        let config = MatchConfig { seed: 42, ..Default::default() };
        let mut logger = NullLogger;
        let result = run_match(&mut home, &mut away, config, &mut logger);
        assert!(result.home_score < 20 && result.away_score < 20);
    }

    #[test]
    fn same_seed_and_coaches_reproduce_the_same_result() {
        let config = MatchConfig { seed: 99, ..Default::default() };
        let mut logger_a = NullLogger;
        let mut home_a = RandomCoach::new(5, 0.1);
        let mut away_a = RandomCoach::new(6, 0.1);
        let result_a = run_match(&mut home_a, &mut away_a, config.clone(), &mut logger_a);

        let mut logger_b = NullLogger;
        let mut home_b = RandomCoach::new(5, 0.1);
        let mut away_b = RandomCoach::new(6, 0.1);
        let result_b = run_match(&mut home_b, &mut away_b, config, &mut logger_b);

        assert_eq!(result_a, result_b);
    }
}

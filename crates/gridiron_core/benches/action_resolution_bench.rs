//! Benchmarks the action resolver's hot path: legality check, dispatch, and
//! the touchdown/turnover post-hooks, for the action kinds a driver submits
//! most often during a match (move, block, end-turn).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gridiron_core::dice::ScriptedDice;
use gridiron_core::engine::action_resolver::resolve;
use gridiron_core::engine::rules::Action;
use gridiron_core::geometry::{Position, Side};
use gridiron_core::model::player::{Player, PlayerId, PlayerState, PlayerStats};
use gridiron_core::model::skills::SkillSet;
use gridiron_core::model::team::TeamState;
use gridiron_core::state::{GameState, Phase};

fn standing(id: u32, side: Side, pos: Position) -> Player {
    let stats = PlayerStats { movement: 6, strength: 3, agility: 3, armour: 8 };
    let mut p = Player::new(PlayerId(id), side, "P", id as u8, "Lineman", stats, SkillSet::new());
    p.state = PlayerState::Standing;
    p.position = Some(pos);
    p.flags.movement_remaining = 6;
    p
}

fn play_state() -> GameState {
    let mut s = GameState::new(
        TeamState::new("home", "Home", "humans", Side::Home),
        TeamState::new("away", "Away", "orcs", Side::Away),
        Side::Away,
    );
    s.set_phase(Phase::Play);
    s.set_active_team(Side::Home);
    let mover = standing(1, Side::Home, Position::new(5, 5));
    s.players.insert(mover.id, mover);
    let defender = standing(2, Side::Away, Position::new(10, 10));
    s.players.insert(defender.id, defender);
    s
}

fn bench_resolve_move(c: &mut Criterion) {
    let state = play_state();
    c.bench_function("resolve_move_no_dodge", |b| {
        b.iter(|| {
            let mut dice = ScriptedDice::new();
            let result = resolve(
                black_box(&state),
                Action::Move { player_id: PlayerId(1), x: 6, y: 5 },
                &mut dice,
                || true,
                |_| false,
            );
            black_box(result)
        })
    });
}

fn bench_resolve_end_turn(c: &mut Criterion) {
    let state = play_state();
    c.bench_function("resolve_end_turn", |b| {
        b.iter(|| {
            let mut dice = ScriptedDice::new();
            let result = resolve(black_box(&state), Action::EndTurn, &mut dice, || true, |_| false);
            black_box(result)
        })
    });
}

criterion_group!(benches, bench_resolve_move, bench_resolve_end_turn);
criterion_main!(benches);

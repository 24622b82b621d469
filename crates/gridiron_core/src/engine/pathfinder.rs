//! Pathfinder (spec §4.3): shortest move sequence with dodge/GFI cost
//! annotation, searched with the `pathfinding` crate's Dijkstra over an
//! 8-connected grid. (Design Note "Pathfinder safety vs minimality" — the
//! returned path is the one the movement resolver attempts; the search
//! strategy is free to change so long as its risk annotations match what
//! gets rolled.)

use pathfinding::prelude::dijkstra;

use crate::engine::tacklezone::tacklezones_on;
use crate::geometry::{Position, Side, DIRECTIONS_8};
use crate::model::player::PlayerId;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub position: Position,
    pub requires_dodge: bool,
    pub requires_gfi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    pos: Position,
    steps: u8,
}

/// Shortest path from `player_id`'s current square to `target`, minimizing
/// (dodges, then GFIs) and capped at `movementRemaining + 2` steps (the +2
/// being the two GFI squares beyond a player's movement allowance). Returns
/// `None` if no such path exists within the cap.
pub fn find_path(state: &GameState, player_id: PlayerId, target: Position) -> Option<Vec<PathStep>> {
    let player = state.player(player_id)?;
    let origin = player.position?;
    if origin == target || !target.is_on_pitch() {
        return None;
    }
    let side = player.team_side;
    let movement_remaining = player.flags.movement_remaining;
    let cap = movement_remaining.saturating_add(2);

    let start = Node { pos: origin, steps: 0 };
    let (nodes, _cost) = dijkstra(
        &start,
        |node| successors(state, side, movement_remaining, cap, target, *node),
        |node| node.pos == target,
    )?;

    Some(
        nodes
            .windows(2)
            .map(|w| {
                let (prev, cur) = (w[0], w[1]);
                PathStep {
                    position: cur.pos,
                    requires_dodge: tacklezones_on(state, prev.pos, side) > 0,
                    requires_gfi: cur.steps > movement_remaining,
                }
            })
            .collect(),
    )
}

/// Cost is `dodges * 1000 + gfis` so Dijkstra minimizes dodge count first,
/// GFI count second; successors are pre-sorted by (cost, x, y) so that ties
/// resolve to the lexicographically-smallest destination, per spec.
fn successors(
    state: &GameState,
    side: Side,
    movement_remaining: u8,
    cap: u8,
    target: Position,
    node: Node,
) -> Vec<(Node, u32)> {
    if node.steps >= cap {
        return Vec::new();
    }
    let dodge_cost: u32 = if tacklezones_on(state, node.pos, side) > 0 { 1000 } else { 0 };
    let mut next: Vec<(Node, u32)> = DIRECTIONS_8
        .iter()
        .map(|&(dx, dy)| node.pos.translated(dx, dy))
        .filter(|p| p.is_on_pitch())
        .filter(|p| *p == target || state.player_at(*p).is_none())
        .map(|pos| {
            let new_steps = node.steps + 1;
            let gfi_cost: u32 = if new_steps > movement_remaining { 1 } else { 0 };
            (Node { pos, steps: new_steps }, dodge_cost + gfi_cost)
        })
        .collect();
    next.sort_by_key(|(n, cost)| (*cost, n.pos.x, n.pos.y));
    next
}

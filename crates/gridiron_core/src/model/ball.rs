//! The single match ball (spec §3). Exactly one exists per match; it is
//! always in exactly one of these three states.

use serde::{Deserialize, Serialize};

use crate::geometry::Position;
use crate::model::player::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ball {
    OffPitch,
    OnGround(Position),
    Held(PlayerId),
}

impl Ball {
    pub fn position_if_on_ground(&self) -> Option<Position> {
        match self {
            Ball::OnGround(p) => Some(*p),
            _ => None,
        }
    }

    pub fn carrier(&self) -> Option<PlayerId> {
        match self {
            Ball::Held(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_loose(&self) -> bool {
        matches!(self, Ball::OnGround(_))
    }
}

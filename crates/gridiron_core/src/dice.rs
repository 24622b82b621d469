//! Dice sources: the engine's sole channel to randomness.
//!
//! Every sub-resolver reads dice exclusively through [`DiceSource`], never
//! through a bare `rand::thread_rng()` call, so a scripted sequence can
//! replace the PRNG byte-for-byte in tests (see the `(seed, decisions)`
//! determinism contract in the spec).

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Outcome face of the block die (one of the five Blood Bowl-style block
/// results). `rollBlockDie` must be called once per die in a multi-die
/// block so that results are independent per die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockDie {
    AttackerDown,
    BothDown,
    Push,
    DefenderStumbles,
    DefenderDown,
}

/// Contract every sub-resolver consumes randomness through.
pub trait DiceSource {
    fn roll_d6(&mut self) -> u8;
    fn roll_d8(&mut self) -> u8;
    fn roll_block_die(&mut self) -> BlockDie;

    /// Convenience: roll `n` independent block dice.
    fn roll_block_dice(&mut self, n: u8) -> Vec<BlockDie> {
        (0..n).map(|_| self.roll_block_die()).collect()
    }

    /// Convenience: 2d6, as used by armour and injury rolls.
    fn roll_2d6(&mut self) -> (u8, u8) {
        (self.roll_d6(), self.roll_d6())
    }

    /// Convenience: d3, derived from a d6 per the classic halving rule.
    fn roll_d3(&mut self) -> u8 {
        (self.roll_d6() + 1) / 2
    }
}

const BLOCK_DIE_FACES: [BlockDie; 6] = [
    BlockDie::AttackerDown,
    BlockDie::BothDown,
    BlockDie::Push,
    BlockDie::Push,
    BlockDie::DefenderStumbles,
    BlockDie::DefenderDown,
];

/// PRNG-backed dice source, seedable for reproducibility.
///
/// Uses `ChaCha8Rng` (the same generator the teacher engine seeds its
/// Monte-Carlo execution-error sampling with) so a given seed always
/// produces the same roll sequence across platforms and Rust versions.
pub struct PrngDice {
    rng: ChaCha8Rng,
}

impl PrngDice {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl DiceSource for PrngDice {
    fn roll_d6(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn roll_d8(&mut self) -> u8 {
        self.rng.gen_range(1..=8)
    }

    fn roll_block_die(&mut self) -> BlockDie {
        BLOCK_DIE_FACES[self.rng.gen_range(0..BLOCK_DIE_FACES.len())]
    }
}

/// Scripted dice source: dequeues from a predetermined list per die kind.
/// Exhausting any queue is a test bug — it panics (`BrokenDiceStream`, §7),
/// it is never recovered from inside the engine.
#[derive(Default)]
pub struct ScriptedDice {
    d6: VecDeque<u8>,
    d8: VecDeque<u8>,
    block: VecDeque<BlockDie>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_d6(mut self, rolls: impl IntoIterator<Item = u8>) -> Self {
        self.d6.extend(rolls);
        self
    }

    pub fn with_d8(mut self, rolls: impl IntoIterator<Item = u8>) -> Self {
        self.d8.extend(rolls);
        self
    }

    pub fn with_block(mut self, rolls: impl IntoIterator<Item = BlockDie>) -> Self {
        self.block.extend(rolls);
        self
    }

    pub fn push_d6(&mut self, roll: u8) {
        self.d6.push_back(roll);
    }

    pub fn push_d8(&mut self, roll: u8) {
        self.d8.push_back(roll);
    }

    pub fn push_block(&mut self, roll: BlockDie) {
        self.block.push_back(roll);
    }
}

impl DiceSource for ScriptedDice {
    fn roll_d6(&mut self) -> u8 {
        self.d6.pop_front().expect("BrokenDiceStream: scripted d6 queue exhausted")
    }

    fn roll_d8(&mut self) -> u8 {
        self.d8.pop_front().expect("BrokenDiceStream: scripted d8 queue exhausted")
    }

    fn roll_block_die(&mut self) -> BlockDie {
        self.block.pop_front().expect("BrokenDiceStream: scripted block-die queue exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prng_dice_is_deterministic_for_a_fixed_seed() {
        let mut a = PrngDice::new(42);
        let mut b = PrngDice::new(42);
        let seq_a: Vec<u8> = (0..20).map(|_| a.roll_d6()).collect();
        let seq_b: Vec<u8> = (0..20).map(|_| b.roll_d6()).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|&r| (1..=6).contains(&r)));
    }

    #[test]
    fn scripted_dice_dequeues_in_order() {
        let mut dice = ScriptedDice::new().with_d6([2, 4]).with_d8([3]);
        assert_eq!(dice.roll_d6(), 2);
        assert_eq!(dice.roll_d6(), 4);
        assert_eq!(dice.roll_d8(), 3);
    }

    #[test]
    #[should_panic(expected = "BrokenDiceStream")]
    fn scripted_dice_panics_when_exhausted() {
        let mut dice = ScriptedDice::new();
        dice.roll_d6();
    }

    #[test]
    fn multi_die_block_rolls_are_independent_draws() {
        let mut dice =
            ScriptedDice::new().with_block([BlockDie::Push, BlockDie::AttackerDown]);
        let rolls = dice.roll_block_dice(2);
        assert_eq!(rolls, vec![BlockDie::Push, BlockDie::AttackerDown]);
    }
}

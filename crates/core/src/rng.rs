//! RNG module - 7-bag random piece generation
//!
//! Implements the "7-bag" randomization algorithm. Each bag contains one of
//! each piece (I, O, T, S, Z, J, L) in a uniformly random order. Pieces are
//! drawn from the front until the bag is empty, then a new permutation is
//! appended.
//!
//! The bag owns its RNG, so games can be seeded for deterministic tests or
//! seeded from OS entropy for normal play.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::pieces::Piece;
use crate::types::PieceKind;

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceBag {
    /// Pieces still to be drawn, front first
    bag: VecDeque<PieceKind>,
    /// RNG for shuffling
    rng: StdRng,
}

impl PieceBag {
    /// Create a bag with a fixed seed (same seed, same sequence)
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a bag seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            bag: VecDeque::with_capacity(PieceKind::ALL.len() * 2),
            rng,
        }
    }

    /// Append a fresh permutation of all seven kinds (Fisher-Yates)
    fn refill_bag(&mut self) {
        let mut kinds = PieceKind::ALL;
        kinds.shuffle(&mut self.rng);
        self.bag.extend(kinds);
    }

    /// Draw the next kind from the queue, refilling first if empty
    pub fn draw_kind(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.refill_bag();
        }
        // Refill always leaves seven entries.
        self.bag.pop_front().unwrap_or(PieceKind::I)
    }

    /// Draw the next piece: an independent copy of the catalog piece
    pub fn draw(&mut self) -> Piece {
        Piece::new(self.draw_kind())
    }

    /// Peek at the next kind, refilling if needed so the answer matches `draw`
    pub fn peek(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            self.refill_bag();
        }
        self.bag.front().copied().unwrap_or(PieceKind::I)
    }

    /// Number of kinds left before the next refill
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new(1)
    }
}

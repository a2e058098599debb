use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng,
    SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{PieceKind, Shape};

/// Supplies piece shapes using the 7-bag randomization algorithm.
///
/// A "bag" holding one of each of the seven piece kinds is shuffled and drawn
/// from in order; a fresh shuffled bag is appended whenever 7 or fewer pieces
/// remain queued. Every run of 7 draws aligned to a bag boundary therefore
/// contains each kind exactly once, which keeps the distribution uniform
/// while bounding droughts of any one piece.
///
/// # Example
///
/// ```
/// use blockfall_engine::PieceBag;
///
/// let mut bag = PieceBag::new();
///
/// let shape = bag.next_shape();
/// let upcoming: Vec<_> = bag.next_pieces().take(5).collect();
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece sequencing.
///
/// A 16-byte seed for the bag's random number generator. Two bags built from
/// the same seed draw identical piece sequences, which enables replays and
/// deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct BagSeed([u8; 16]);

impl Serialize for BagSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: 32-character lowercase hex, big-endian
        let num = u128::from_be_bytes(self.0);
        let mut hex = String::with_capacity(2 * self.0.len());
        write!(&mut hex, "{num:032x}").unwrap();
        serializer.serialize_str(&hex)
    }
}

impl<'de> Deserialize<'de> for BagSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid seed: expected 32 hex characters, got {}",
                hex.len()
            )));
        }
        let num = u128::from_str_radix(&hex, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid seed: {hex:?} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating a random `BagSeed` with `rng.random()`.
impl Distribution<BagSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BagSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        BagSeed(seed)
    }
}

impl PieceBag {
    /// Creates a piece bag seeded from the OS.
    ///
    /// The queue is immediately filled with the first shuffled bag. For a
    /// deterministic sequence, use [`Self::with_seed`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic draws.
    #[must_use]
    pub fn with_seed(seed: BagSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self { rng, bag };
        this.fill_bag();
        this
    }

    /// Appends shuffled bags until more than 7 pieces are queued.
    ///
    /// Keeps at least 8 pieces queued, so 7 remain after the next draw.
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece kind from the bag.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (cannot happen with the refill logic).
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_bag();
        self.bag
            .pop_front()
            .expect("piece queue should never be empty")
    }

    /// Draws the next piece and returns its shape in the unrotated spawn
    /// orientation.
    pub fn next_shape(&mut self) -> Shape {
        self.pop_next().spawn_shape()
    }

    /// Returns an iterator over the upcoming pieces in the queue.
    ///
    /// Always yields at least 8 pieces due to the refill strategy.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

//! Piece sequencing layered on top of the core data structures.
//!
//! An external game loop draws spawn shapes from a [`PieceBag`], moves and
//! rotates them against a [`Board`](crate::Board), and commits landed cells
//! back to the board before clearing completed rows.

pub use self::piece_bag::*;

mod piece_bag;

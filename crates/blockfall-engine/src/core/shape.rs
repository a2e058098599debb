use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

/// Allows drawing a uniformly random piece kind with `rng.random()`.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    /// All piece kinds, in table order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the shape of this piece in its unrotated spawn orientation.
    #[must_use]
    pub const fn spawn_shape(self) -> Shape {
        Shape(SHAPE_STATES[self as usize][0])
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// A piece shape as a 16-bit mask over a 4x4 frame.
///
/// # Bit Layout
///
/// The mask holds 4 nibbles from top row to bottom row; within a nibble the
/// bits run from the leftmost column to the rightmost. The bit for frame
/// position `(row, col)` is therefore `0x8000 >> (4 * row + col)`, and a set
/// bit means the cell is occupied.
///
/// The four rotation states of the T-piece illustrate the encoding:
///
/// ```text
/// ....     .#..     .#..     .#..
/// ###.     ##..     ###.     .##.
/// .#..     .#..     ....     .#..
/// ....     ....     ....     ....
/// 0x0E40   0x4C40   0x4E00   0x4640
/// ```
///
/// # Rotation
///
/// [`Shape::rotated_right`] rotates 90 degrees clockwise within the piece's
/// bounding box (4x4 for I, 2x2 for O, 3x3 for the rest), which keeps the
/// O-piece invariant and cycles every piece back to its original mask after
/// four rotations. All 4 states per piece are precomputed at compile time;
/// rotation is a pure table lookup.
///
/// A `Shape` always holds one of the canonical rotation states: values are
/// produced by [`PieceKind::spawn_shape`], by rotating another `Shape`, or by
/// the validating [`Shape::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape(u16);

impl Serialize for Shape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: 4-digit lowercase hex (e.g., "0e40")
        serializer.serialize_str(&format!("{:04x}", self.0))
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() != 4 {
            return Err(serde::de::Error::custom(format!(
                "expected 4 hex characters, got {} in {s:?}",
                s.len()
            )));
        }
        let bits = u16::from_str_radix(&s, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {s:?} ({e})")))?;
        Shape::from_bits(bits).ok_or_else(|| {
            serde::de::Error::custom(format!("0x{bits:04X} is not a canonical piece shape"))
        })
    }
}

impl Shape {
    /// Returns the raw 16-bit mask.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Builds a shape from a raw mask, validating that it is one of the
    /// canonical rotation states.
    ///
    /// Returns `None` for any other mask, including `0x0000`.
    #[must_use]
    pub fn from_bits(bits: u16) -> Option<Self> {
        SHAPE_STATES
            .iter()
            .any(|states| states.contains(&bits))
            .then_some(Self(bits))
    }

    /// Returns the kind of piece this shape belongs to.
    #[must_use]
    pub fn kind(self) -> PieceKind {
        let index = SHAPE_STATES
            .iter()
            .position(|states| states.contains(&self.0))
            .expect("a Shape always holds a canonical rotation state");
        PieceKind::ALL[index]
    }

    /// Returns this shape rotated 90 degrees clockwise.
    ///
    /// Rotating four times returns the original shape.
    #[must_use]
    pub fn rotated_right(self) -> Self {
        Self(successor(self.0, 1))
    }

    /// Returns this shape rotated 90 degrees counter-clockwise.
    ///
    /// Inverse of [`Self::rotated_right`].
    #[must_use]
    pub fn rotated_left(self) -> Self {
        Self(successor(self.0, 3))
    }

    /// Iterates over the occupied `(row, col)` positions within the 4x4 frame.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (0..4).flat_map(move |row| {
            (0..4).filter_map(move |col| ((self.0 & cell_bit(row, col)) != 0).then_some((row, col)))
        })
    }

    /// Returns the four row nibbles, top to bottom.
    ///
    /// Within a nibble, bit 3 is the leftmost column.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn row_nibbles(self) -> [u8; 4] {
        std::array::from_fn(|row| ((self.0 >> (12 - 4 * row)) & 0xF) as u8)
    }
}

/// Mask bit for frame position `(row, col)`.
const fn cell_bit(row: usize, col: usize) -> u16 {
    0x8000 >> (4 * row + col)
}

/// Advances `bits` by `step` rotation states in its piece's cycle.
fn successor(bits: u16, step: usize) -> u16 {
    SHAPE_STATES
        .iter()
        .find_map(|states| {
            let index = states.iter().position(|&s| s == bits)?;
            Some(states[(index + step) % 4])
        })
        .expect("a Shape always holds a canonical rotation state")
}

/// Generates all 4 rotation states of a shape by rotating 90 degrees
/// clockwise within the top-left `size`x`size` box.
///
/// # Arguments
///
/// * `size` - Bounding box of the piece (4 for I, 2 for O, 3 for the rest)
/// * `spawn` - Mask of the unrotated spawn orientation
const fn rotations(size: usize, spawn: u16) -> [u16; 4] {
    let mut states = [spawn; 4];
    let mut i = 1;
    while i < 4 {
        let mut next = 0;
        let mut row = 0;
        while row < size {
            let mut col = 0;
            while col < size {
                // Rotated cell (row, col) comes from (size - 1 - col, row).
                if (states[i - 1] & cell_bit(size - 1 - col, row)) != 0 {
                    next |= cell_bit(row, col);
                }
                col += 1;
            }
            row += 1;
        }
        states[i] = next;
        i += 1;
    }
    states
}

const SHAPE_STATES: [[u16; 4]; PieceKind::LEN] = {
    // One nibble per row, top to bottom; within a nibble the high bit is the
    // leftmost column, so the binary literals read like the piece pictures.
    const fn m(rows: [u16; 4]) -> u16 {
        (rows[0] << 12) | (rows[1] << 8) | (rows[2] << 4) | rows[3]
    }

    [
        // I-piece
        rotations(4, m([0b0000, 0b1111, 0b0000, 0b0000])),
        // O-piece
        rotations(2, m([0b1100, 0b1100, 0b0000, 0b0000])),
        // S-piece
        rotations(3, m([0b0000, 0b0110, 0b1100, 0b0000])),
        // Z-piece
        rotations(3, m([0b0000, 0b1100, 0b0110, 0b0000])),
        // J-piece
        rotations(3, m([0b0100, 0b0100, 0b1100, 0b0000])),
        // L-piece
        rotations(3, m([0b0100, 0b0100, 0b0110, 0b0000])),
        // T-piece
        rotations(3, m([0b0000, 0b1110, 0b0100, 0b0000])),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> impl Iterator<Item = Shape> {
        PieceKind::ALL.into_iter().flat_map(|kind| {
            let mut shape = kind.spawn_shape();
            std::array::from_fn::<_, 4, _>(|_| {
                let state = shape;
                shape = shape.rotated_right();
                state
            })
            .into_iter()
        })
    }

    #[test]
    fn test_t_piece_rotation_sequence() {
        let mut shape = PieceKind::T.spawn_shape();
        let mut sequence = Vec::new();
        for _ in 0..4 {
            sequence.push(shape.bits());
            shape = shape.rotated_right();
        }
        assert_eq!(sequence, [0x0E40, 0x4C40, 0x4E00, 0x4640]);
        assert_eq!(shape.bits(), 0x0E40);
    }

    #[test]
    fn test_rotation_tables() {
        assert_eq!(SHAPE_STATES[PieceKind::I as usize], [0x0F00, 0x2222, 0x00F0, 0x4444]);
        assert_eq!(SHAPE_STATES[PieceKind::O as usize], [0xCC00, 0xCC00, 0xCC00, 0xCC00]);
        assert_eq!(SHAPE_STATES[PieceKind::S as usize], [0x06C0, 0x8C40, 0x6C00, 0x4620]);
        assert_eq!(SHAPE_STATES[PieceKind::Z as usize], [0x0C60, 0x4C80, 0xC600, 0x2640]);
        assert_eq!(SHAPE_STATES[PieceKind::J as usize], [0x44C0, 0x8E00, 0x6440, 0x0E20]);
        assert_eq!(SHAPE_STATES[PieceKind::L as usize], [0x4460, 0x0E80, 0xC440, 0x2E00]);
        assert_eq!(SHAPE_STATES[PieceKind::T as usize], [0x0E40, 0x4C40, 0x4E00, 0x4640]);
    }

    #[test]
    fn test_rotation_has_period_four() {
        for shape in all_states() {
            let rotated = shape
                .rotated_right()
                .rotated_right()
                .rotated_right()
                .rotated_right();
            assert_eq!(rotated, shape, "period broken for 0x{:04X}", shape.bits());
        }
    }

    #[test]
    fn test_rotated_left_inverts_rotated_right() {
        for shape in all_states() {
            assert_eq!(shape.rotated_right().rotated_left(), shape);
            assert_eq!(shape.rotated_left().rotated_right(), shape);
        }
    }

    #[test]
    fn test_o_piece_rotation_is_identity() {
        let shape = PieceKind::O.spawn_shape();
        assert_eq!(shape.rotated_right(), shape);
        assert_eq!(shape.rotated_left(), shape);
    }

    #[test]
    fn test_every_state_has_four_cells() {
        for shape in all_states() {
            assert_eq!(
                shape.cells().count(),
                4,
                "0x{:04X} should have 4 cells",
                shape.bits()
            );
            assert_ne!(shape.bits(), 0x0000);
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in PieceKind::ALL {
            let mut shape = kind.spawn_shape();
            for _ in 0..4 {
                assert_eq!(shape.kind(), kind);
                shape = shape.rotated_right();
            }
        }
    }

    #[test]
    fn test_from_bits_accepts_canonical_states() {
        for shape in all_states() {
            assert_eq!(Shape::from_bits(shape.bits()), Some(shape));
        }
    }

    #[test]
    fn test_from_bits_rejects_malformed_masks() {
        assert_eq!(Shape::from_bits(0x0000), None);
        assert_eq!(Shape::from_bits(0xFFFF), None);
        assert_eq!(Shape::from_bits(0x0001), None);
        // A single rotation off from canonical by one bit
        assert_eq!(Shape::from_bits(0x0E41), None);
    }

    #[test]
    fn test_t_spawn_cells() {
        let cells: Vec<_> = PieceKind::T.spawn_shape().cells().collect();
        assert_eq!(cells, [(1, 0), (1, 1), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_row_nibbles() {
        assert_eq!(PieceKind::T.spawn_shape().row_nibbles(), [0x0, 0xE, 0x4, 0x0]);
        assert_eq!(PieceKind::I.spawn_shape().row_nibbles(), [0x0, 0xF, 0x0, 0x0]);
    }

    #[test]
    fn test_shape_serialization() {
        let shape = PieceKind::T.spawn_shape();
        let serialized = serde_json::to_string(&shape).unwrap();
        assert_eq!(serialized, "\"0e40\"");

        let deserialized: Shape = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, shape);
    }

    #[test]
    fn test_shape_deserialization_error_cases() {
        // Wrong length
        assert!(serde_json::from_str::<Shape>("\"e40\"").is_err());
        assert!(serde_json::from_str::<Shape>("\"00e40\"").is_err());
        // Not hex
        assert!(serde_json::from_str::<Shape>("\"zzzz\"").is_err());
        // Valid hex, but not a canonical shape
        assert!(serde_json::from_str::<Shape>("\"0000\"").is_err());
        assert!(serde_json::from_str::<Shape>("\"ffff\"").is_err());
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('X'), None);
        assert_eq!(PieceKind::from_char('t'), None);
    }

    #[test]
    fn test_uniform_draw_returns_valid_kind() {
        use rand::SeedableRng as _;

        let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let kind: PieceKind = rng.random();
            assert!(PieceKind::ALL.contains(&kind));
        }
    }
}

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::InvalidDimensionError;

/// Occupancy grid for the playing field.
///
/// Tracks which cells of a fixed `width` x `height` grid are occupied and
/// collapses completed rows. Cells are addressed as `(row, col)` with row 0
/// at the top and column 0 on the left; both dimensions are fixed at
/// construction.
///
/// Storage is a flat row-major `Vec<bool>`, so row moves during clearing are
/// plain `copy_within` calls.
///
/// Coordinates outside the grid are a contract violation: `occupy` and
/// `is_occupied` panic rather than clamp, since clamping would silently
/// corrupt the caller's game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "<width>x<height>:<row>,<row>,..." with '#'/'.' cells
        let mut s = String::with_capacity(self.height * (self.width + 1) + 8);
        write!(&mut s, "{}x{}:", self.width, self.height).unwrap();
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                s.push(',');
            }
            for &occupied in row {
                s.push(if occupied { '#' } else { '.' });
            }
        }
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (header, body) = s.split_once(':').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "expected '<width>x<height>:<rows>', got {s:?}"
            ))
        })?;
        let (width_str, height_str) = header.split_once('x').ok_or_else(|| {
            serde::de::Error::custom(format!("invalid dimension header: {header:?}"))
        })?;
        let width: usize = width_str.parse().map_err(|e| {
            serde::de::Error::custom(format!("invalid width: {width_str:?} ({e})"))
        })?;
        let height: usize = height_str.parse().map_err(|e| {
            serde::de::Error::custom(format!("invalid height: {height_str:?} ({e})"))
        })?;

        let mut board = Board::new(width, height).map_err(serde::de::Error::custom)?;

        let rows: Vec<&str> = body.split(',').collect();
        if rows.len() != height {
            return Err(serde::de::Error::custom(format!(
                "expected {height} rows, got {}",
                rows.len()
            )));
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(serde::de::Error::custom(format!(
                    "expected {width} cells at row {row}, got {}",
                    cells.len()
                )));
            }
            for (col, ch) in cells.chars().enumerate() {
                match ch {
                    '#' => board.occupy(row, col),
                    '.' => {}
                    _ => {
                        return Err(serde::de::Error::custom(format!(
                            "invalid cell character {ch:?} at row {row}"
                        )));
                    }
                }
            }
        }

        Ok(board)
    }
}

impl Board {
    /// Creates a board of the given dimensions with every cell unoccupied.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDimensionError`] if `width` or `height` is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidDimensionError> {
        if width == 0 || height == 0 {
            return Err(InvalidDimensionError { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![false; width * height],
        })
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height,
            "row {row} out of bounds for board height {}",
            self.height
        );
        assert!(
            col < self.width,
            "column {col} out of bounds for board width {}",
            self.width
        );
        row * self.width + col
    }

    /// Marks the cell at `(row, col)` as occupied.
    ///
    /// Occupying an already-occupied cell is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn occupy(&mut self, row: usize, col: usize) {
        let index = self.index(row, col);
        self.cells[index] = true;
    }

    /// Returns whether the cell at `(row, col)` is occupied.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.cells[self.index(row, col)]
    }

    /// Returns whether every cell in the given row is occupied.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn is_row_complete(&self, row: usize) -> bool {
        let start = self.index(row, 0);
        self.cells[start..start + self.width].iter().all(|&c| c)
    }

    /// Removes every complete row and returns how many were removed.
    ///
    /// Surviving rows keep their relative order and shift down into the
    /// vacated space; the same number of unoccupied rows appears at the top.
    /// Completeness is judged against the pre-clear grid: the bottom-up scan
    /// only ever copies a surviving row downward into rows it has already
    /// passed, so no row is tested after being moved.
    pub fn clear_complete_rows(&mut self) -> usize {
        let mut cleared = 0;
        for row in (0..self.height).rev() {
            if self.is_row_complete(row) {
                cleared += 1;
                continue;
            }
            if cleared > 0 {
                let src = row * self.width;
                let dst = (row + cleared) * self.width;
                self.cells.copy_within(src..src + self.width, dst);
            }
        }
        self.cells[..cleared * self.width].fill(false);
        cleared
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(self.width)
    }

    /// Creates a `Board` from an ASCII picture, for tests and debugging.
    ///
    /// `'#'` marks an occupied cell and `'.'` an empty one; other characters
    /// (indentation, decorations) are ignored. Rows are listed top to bottom
    /// and must all have the same width.
    ///
    /// # Panics
    ///
    /// Panics if the picture is empty or its rows have uneven widths.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<Vec<char>> = art
            .lines()
            .map(|line| line.chars().filter(|c| *c == '#' || *c == '.').collect())
            .filter(|cells: &Vec<char>| !cells.is_empty())
            .collect();
        assert!(!rows.is_empty(), "board picture must contain at least one row");

        let width = rows[0].len();
        let mut board =
            Self::new(width, rows.len()).expect("board picture dimensions are non-zero");
        for (row, cells) in rows.iter().enumerate() {
            assert_eq!(
                cells.len(),
                width,
                "row {row} has {} cells, expected {width}",
                cells.len()
            );
            for (col, &ch) in cells.iter().enumerate() {
                if ch == '#' {
                    board.occupy(row, col);
                }
            }
        }
        board
    }
}

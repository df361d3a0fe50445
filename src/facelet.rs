//! The cube on the facelet level.
//!
//! The 54 facelets are numbered face by face in the order U, R, F, D, L, B. Each face is read
//! row by row, so the facelets of face U are U1..U9 with U5 the center:
//!
//! ```text
//!              |************|
//!              |*U1**U2**U3*|
//!              |************|
//!              |*U4**U5**U6*|
//!              |************|
//!              |*U7**U8**U9*|
//!              |************|
//! |************|************|************|************|
//! |*L1**L2**L3*|*F1**F2**F3*|*R1**R2**R3*|*B1**B2**B3*|
//! |************|************|************|************|
//! |*L4**L5**L6*|*F4**F5**F6*|*R4**R5**R6*|*B4**B5**B6*|
//! |************|************|************|************|
//! |*L7**L8**L9*|*F7**F8**F9*|*R7**R8**R9*|*B7**B8**B9*|
//! |************|************|************|************|
//!              |************|
//!              |*D1**D2**D3*|
//!              |************|
//!              |*D4**D5**D6*|
//!              |************|
//!              |*D7**D8**D9*|
//!              |************|
//! ```
use std::fmt;

use crate::constants::*;
use crate::cubie::CubieCube;
use crate::error::Error;

/// Colors are named after the face whose center carries them.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    U,
    R,
    F,
    D,
    L,
    B,
}

pub const ALL_COLORS: [Color; 6] = [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B];

impl TryFrom<char> for Color {
    type Error = Error;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'U' => Ok(Color::U),
            'R' => Ok(Color::R),
            'F' => Ok(Color::F),
            'D' => Ok(Color::D),
            'L' => Ok(Color::L),
            'B' => Ok(Color::B),
            _ => Err(Error::InvalidFaceletString),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Map the corner positions to facelet positions.
///
/// `CORNER_FACELET[URF][0]` is the facelet of the URF corner position which defines the
/// orientation, the other two follow clockwise.
#[rustfmt::skip]
pub const CORNER_FACELET: [[usize; 3]; N_CORNERS] = [
    [8, 9, 20],   // U9, R1, F3
    [6, 18, 38],  // U7, F1, L3
    [0, 36, 47],  // U1, L1, B3
    [2, 45, 11],  // U3, B1, R3
    [29, 26, 15], // D3, F9, R7
    [27, 44, 24], // D1, L9, F7
    [33, 53, 42], // D7, B9, L7
    [35, 17, 51], // D9, R9, B7
];

/// Map the edge positions to facelet positions, the first one defines the orientation.
#[rustfmt::skip]
pub const EDGE_FACELET: [[usize; 2]; N_EDGES] = [
    [5, 10],  // U6, R2
    [7, 19],  // U8, F2
    [3, 37],  // U4, L2
    [1, 46],  // U2, B2
    [32, 16], // D6, R8
    [28, 25], // D2, F8
    [30, 43], // D4, L8
    [34, 52], // D8, B8
    [23, 12], // F6, R4
    [21, 41], // F4, L6
    [50, 39], // B6, L4
    [48, 14], // B4, R6
];

/// Map the corner pieces to their colors, starting with the U/D color.
#[rustfmt::skip]
pub const CORNER_COLOR: [[Color; 3]; N_CORNERS] = [
    [Color::U, Color::R, Color::F],
    [Color::U, Color::F, Color::L],
    [Color::U, Color::L, Color::B],
    [Color::U, Color::B, Color::R],
    [Color::D, Color::F, Color::R],
    [Color::D, Color::L, Color::F],
    [Color::D, Color::B, Color::L],
    [Color::D, Color::R, Color::B],
];

/// Map the edge pieces to their colors.
#[rustfmt::skip]
pub const EDGE_COLOR: [[Color; 2]; N_EDGES] = [
    [Color::U, Color::R],
    [Color::U, Color::F],
    [Color::U, Color::L],
    [Color::U, Color::B],
    [Color::D, Color::R],
    [Color::D, Color::F],
    [Color::D, Color::L],
    [Color::D, Color::B],
    [Color::F, Color::R],
    [Color::F, Color::L],
    [Color::B, Color::L],
    [Color::B, Color::R],
];

/// Cube on the facelet level.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FaceCube {
    pub f: [Color; N_FACELETS],
}

impl Default for FaceCube {
    fn default() -> Self {
        let mut f = [Color::U; N_FACELETS];
        for (i, color) in ALL_COLORS.into_iter().enumerate() {
            f[9 * i..9 * (i + 1)].fill(color);
        }
        Self { f }
    }
}

impl FaceCube {
    /// Number of facelets of every color.
    pub fn color_counts(&self) -> [usize; 6] {
        let mut count = [0; 6];
        for c in self.f {
            count[c as usize] += 1;
        }
        count
    }

    pub fn is_solved(&self) -> bool {
        *self == FaceCube::default()
    }
}

/// Parse a facelet string. Checks the length, the alphabet and that every color appears 9 times.
impl TryFrom<&str> for FaceCube {
    type Error = Error;

    fn try_from(cube_string: &str) -> Result<Self, Self::Error> {
        if cube_string.chars().count() != N_FACELETS {
            return Err(Error::InvalidFaceletString);
        }
        let mut f = [Color::U; N_FACELETS];
        for (i, c) in cube_string.chars().enumerate() {
            f[i] = Color::try_from(c)?;
        }
        let fc = Self { f };
        if fc.color_counts().iter().any(|&n| n != 9) {
            return Err(Error::InvalidFaceletString);
        }
        Ok(fc)
    }
}

/// Gives the facelet representation of a cubie cube.
impl From<&CubieCube> for FaceCube {
    fn from(cc: &CubieCube) -> Self {
        let mut fc = FaceCube::default();
        for i in 0..N_CORNERS {
            let j = cc.cp[i] as usize;
            let ori = cc.co[i] as usize;
            for n in 0..3 {
                fc.f[CORNER_FACELET[i][(n + ori) % 3]] = CORNER_COLOR[j][n];
            }
        }
        for i in 0..N_EDGES {
            let j = cc.ep[i] as usize;
            let ori = cc.eo[i] as usize;
            for n in 0..2 {
                fc.f[EDGE_FACELET[i][(n + ori) % 2]] = EDGE_COLOR[j][n];
            }
        }
        fc
    }
}

impl fmt::Display for FaceCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.f {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_solved_roundtrip() {
        let fc = FaceCube::try_from(SOLVED_FACELETS).unwrap();
        assert!(fc.is_solved());
        assert_eq!(fc.to_string(), SOLVED_FACELETS);
    }

    #[test]
    fn test_invalid_strings() {
        assert!(matches!(
            FaceCube::try_from("UUU"),
            Err(Error::InvalidFaceletString)
        ));
        let bad_char = SOLVED_FACELETS.replacen('B', "X", 1);
        assert!(matches!(
            FaceCube::try_from(bad_char.as_str()),
            Err(Error::InvalidFaceletString)
        ));
        let bad_count = SOLVED_FACELETS.replacen('B', "U", 1);
        assert!(matches!(
            FaceCube::try_from(bad_count.as_str()),
            Err(Error::InvalidFaceletString)
        ));
    }

    #[test]
    fn test_facelet_maps_cover_every_non_center() {
        let mut seen = [0; N_FACELETS];
        for corner in CORNER_FACELET {
            for i in corner {
                seen[i] += 1;
            }
        }
        for edge in EDGE_FACELET {
            for i in edge {
                seen[i] += 1;
            }
        }
        for (i, n) in seen.into_iter().enumerate() {
            assert_eq!(n, if i % 9 == 4 { 0 } else { 1 }, "facelet {}", i);
        }
    }
}

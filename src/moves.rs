use std::time::Instant;
use std::{fmt, str::FromStr};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use self::Move::*;
use crate::constants::*;
use crate::cubie::{self, Corner::*, CubieCube, Edge::*};
use crate::{error::Error, facelet::Color};

/// Layer moves, Up, Right, Front, Down, Left, Back.
///
/// $ clockwise, $2 double, $3 counter-clockwise.
///
/// The discriminant is the move table index `3 * face + quarter_turns - 1`.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Move {
    U, U2, U3,
    R, R2, R3,
    F, F2, F3,
    D, D2, D3,
    L, L2, L3,
    B, B2, B3,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            U3 => write!(f, "U'"),
            D3 => write!(f, "D'"),
            R3 => write!(f, "R'"),
            L3 => write!(f, "L'"),
            F3 => write!(f, "F'"),
            B3 => write!(f, "B'"),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R" | "R1" => Ok(R),
            "R'" | "R3" => Ok(R3),
            "R2" => Ok(R2),
            "L" | "L1" => Ok(L),
            "L'" | "L3" => Ok(L3),
            "L2" => Ok(L2),
            "U" | "U1" => Ok(U),
            "U'" | "U3" => Ok(U3),
            "U2" => Ok(U2),
            "D" | "D1" => Ok(D),
            "D'" | "D3" => Ok(D3),
            "D2" => Ok(D2),
            "F" | "F1" => Ok(F),
            "F'" | "F3" => Ok(F3),
            "F2" => Ok(F2),
            "B" | "B1" => Ok(B),
            "B'" | "B3" => Ok(B3),
            "B2" => Ok(B2),
            _ => Err(Error::InvalidMove(s.to_string())),
        }
    }
}

impl Move {
    pub fn get_inverse(self) -> Self {
        match self {
            U => U3,
            U3 => U,
            D => D3,
            D3 => D,
            R => R3,
            R3 => R,
            L => L3,
            L3 => L,
            F => F3,
            F3 => F,
            B => B3,
            B3 => B,
            _ => self,
        }
    }

    /// The face turned by this move.
    pub fn face(self) -> Color {
        match self {
            U | U2 | U3 => Color::U,
            R | R2 | R3 => Color::R,
            F | F2 | F3 => Color::F,
            D | D2 | D3 => Color::D,
            L | L2 | L3 => Color::L,
            B | B2 | B3 => Color::B,
        }
    }

    /// Number of clockwise quarter turns, 1..=3.
    pub fn quarter_turns(self) -> u8 {
        self as u8 % 3 + 1
    }

    /// True for the moves which keep a cube in the subgroup H.
    pub fn is_phase2(self) -> bool {
        matches!(self.face(), Color::U | Color::D) || self.quarter_turns() == 2
    }

    /// True if `self` must not follow `prev`: same face, or the opposite face in the wrong
    /// order (U before D, R before L, F before B).
    pub fn is_redundant_after(self, prev: Move) -> bool {
        let diff = prev.face() as i8 - self.face() as i8;
        diff == 0 || diff == 3
    }
}

/// The basic six cube moves described by permutations and changes in orientation.
///
/// U_MOVE
pub const U_MOVE: CubieCube = CubieCube {
    cp: [UBR, URF, UFL, ULB, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UB, UR, UF, UL, DR, DF, DL, DB, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// R_MOVE
pub const R_MOVE: CubieCube = CubieCube {
    cp: [DFR, UFL, ULB, URF, DRB, DLF, DBL, UBR], //permutation of the corners
    co: [2, 0, 0, 1, 1, 0, 0, 2],                 //changes of the orientations of the corners
    ep: [FR, UF, UL, UB, BR, DF, DL, DB, DR, FL, BL, UR], //permutation of the edges
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],     //changes of the orientations of the edges
};

/// F_MOVE
pub const F_MOVE: CubieCube = CubieCube {
    cp: [UFL, DLF, ULB, UBR, URF, DFR, DBL, DRB],
    co: [1, 2, 0, 0, 2, 1, 0, 0],
    ep: [UR, FL, UL, UB, DR, FR, DL, DB, UF, DF, BL, BR],
    eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
};

/// D_MOVE
pub const D_MOVE: CubieCube = CubieCube {
    cp: [URF, UFL, ULB, UBR, DLF, DBL, DRB, DFR],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UF, UL, UB, DF, DL, DB, DR, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// L_MOVE
pub const L_MOVE: CubieCube = CubieCube {
    cp: [URF, ULB, DBL, UBR, DFR, UFL, DLF, DRB],
    co: [0, 1, 2, 0, 0, 2, 1, 0],
    ep: [UR, UF, BL, UB, DR, DF, FL, DB, FR, UL, DL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// B_MOVE
pub const B_MOVE: CubieCube = CubieCube {
    cp: [URF, UFL, UBR, DRB, DFR, DLF, ULB, DBL],
    co: [0, 0, 1, 2, 0, 0, 2, 1],
    ep: [UR, UF, UL, BR, DR, DF, DL, BL, FR, FL, UB, DB],
    eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
};

/// Parity of the corner permutation, which equals the parity of the edge permutation of a
/// valid cube. Quarter turns change it, half turns keep it.
#[rustfmt::skip]
pub const PARITY_MOVE: [[u8; N_MOVE]; N_PARITY] = [
    [1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1],
    [0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0],
];

/// Entry of the edge merge table for two coordinates that collide.
pub const MERGE_COLLISION: u16 = u16::MAX;

/// All move tables. Each table is stored row-major: the entry for coordinate `c` and move
/// `m` is at `N_MOVE * c + m as usize`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MoveTables {
    pub twist_move: Vec<u16>,
    pub flip_move: Vec<u16>,
    pub fr_to_br_move: Vec<u16>,
    pub urf_to_dlf_move: Vec<u16>,
    pub ur_to_df_move: Vec<u16>,
    pub ur_to_ul_move: Vec<u16>,
    pub ub_to_df_move: Vec<u16>,
    /// `merge_ur_to_df[N_MERGE * ur_to_ul + ub_to_df]` gives the initial phase 2 `ur_to_df`.
    pub merge_ur_to_df: Vec<u16>,
}

impl MoveTables {
    /// Build all move tables, the independent tables in parallel.
    pub fn new() -> Self {
        let start = Instant::now();
        let (
            ((twist_move, flip_move), (fr_to_br_move, urf_to_dlf_move)),
            ((ur_to_df_move, ur_to_ul_move), (ub_to_df_move, merge_ur_to_df)),
        ) = rayon::join(
            || {
                rayon::join(
                    || rayon::join(move_twist, move_flip),
                    || rayon::join(move_fr_to_br, move_urf_to_dlf),
                )
            },
            || {
                rayon::join(
                    || rayon::join(move_ur_to_df, move_ur_to_ul),
                    || rayon::join(move_ub_to_df, merge_ur_to_df_table),
                )
            },
        );
        info!("move tables built in {:?}", start.elapsed());
        Self {
            twist_move,
            flip_move,
            fr_to_br_move,
            urf_to_dlf_move,
            ur_to_df_move,
            ur_to_ul_move,
            ub_to_df_move,
            merge_ur_to_df,
        }
    }
}

impl Default for MoveTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply all 18 moves to every representative of a coordinate.
///
/// `multiply` is [CubieCube::corner_multiply] or [CubieCube::edge_multiply], depending on
/// which pieces the coordinate describes. Only moves accepted by `record` are stored, the
/// other entries stay 0.
fn build_move_table(
    name: &str,
    size: usize,
    multiply: fn(&mut CubieCube, CubieCube),
    set: impl Fn(&mut CubieCube, usize),
    get: impl Fn(&CubieCube) -> u16,
    record: impl Fn(Move) -> bool,
) -> Vec<u16> {
    let start = Instant::now();
    let bmc = cubie::basic_move_cubes();
    let mut a = CubieCube::default();
    let mut table = vec![0; size * N_MOVE];
    for i in 0..size {
        set(&mut a, i);
        // six faces U, R, F, D, L, B
        for j in 0..6 {
            // three moves for each face, for example U, U2, U3 = U'
            for k in 0..3 {
                multiply(&mut a, bmc[j]);
                let m = ALL_MOVES[3 * j + k];
                if record(m) {
                    table[N_MOVE * i + m as usize] = get(&a);
                }
            }
            multiply(&mut a, bmc[j]); // 4. move restores face
        }
    }
    debug!("{} move table: {} entries in {:?}", name, table.len(), start.elapsed());
    table
}

/// Move table for the twists of the corners.
///
/// The twist coordinate describes the 3^7 = 2187 possible orientations of the 8 corners
///
/// 0 <= twist < 2187 in phase 1, twist = 0 in phase 2
pub fn move_twist() -> Vec<u16> {
    build_move_table(
        "twist",
        N_TWIST,
        CubieCube::corner_multiply,
        |a, i| a.set_twist(i as u16),
        CubieCube::get_twist,
        |_| true,
    )
}

/// Move table for the flip of the edges.
///
/// The flip coordinate describes the 2^11 = 2048 possible orientations of the 12 edges
///
/// 0 <= flip < 2048 in phase 1, flip = 0 in phase 2
pub fn move_flip() -> Vec<u16> {
    build_move_table(
        "flip",
        N_FLIP,
        CubieCube::edge_multiply,
        |a, i| a.set_flip(i as u16),
        CubieCube::get_flip,
        |_| true,
    )
}

/// Move table for the four UD-slice edges FR, FL, BL and BR.
///
/// The fr_to_br coordinate describes the 12!/8! = 11880 possible positions of the FR, FL, BL and BR edges.
///
/// Though for phase 1 only the "unsorted" slice coordinate with Binomial(12,4) = 495 positions is relevant, using the
/// fr_to_br coordinate gives us the permutation of the FR, FL, BL and BR edges at the beginning of phase 2 for free.
///
/// 0 <= fr_to_br < 11880 in phase 1, 0 <= fr_to_br < 24 in phase 2, fr_to_br = 0 for solved cube
pub fn move_fr_to_br() -> Vec<u16> {
    build_move_table(
        "fr_to_br",
        N_FR_TO_BR,
        CubieCube::edge_multiply,
        |a, i| a.set_fr_to_br(i as u16),
        CubieCube::get_fr_to_br,
        |_| true,
    )
}

/// Move table for the permutation of six corners. The positions of the DBL and DRB corners are determined by the parity.
///
/// 0 <= urf_to_dlf < 20160 in phase 1 and phase 2, urf_to_dlf = 0 for solved cube.
pub fn move_urf_to_dlf() -> Vec<u16> {
    build_move_table(
        "urf_to_dlf",
        N_URF_TO_DLF,
        CubieCube::corner_multiply,
        |a, i| a.set_urf_to_dlf(i as u16),
        CubieCube::get_urf_to_dlf,
        |_| true,
    )
}

/// Move table for the permutation of the six U-face and D-face edges UR, UF, UL, UB, DR and DF in
/// phase 2. The positions of the DL and DB edges are determined by the parity.
///
/// Only the entries of the phase 2 moves are valid: the other moves take these edges into the
/// UD-slice where the coordinate leaves the table range, those entries stay 0.
///
/// ur_to_df < 20160 in phase 2, ur_to_df = 0 for solved cube.
pub fn move_ur_to_df() -> Vec<u16> {
    build_move_table(
        "ur_to_df",
        N_UR_TO_DF,
        CubieCube::edge_multiply,
        |a, i| a.set_ur_to_df(i as u32),
        |a| a.get_ur_to_df() as u16,
        Move::is_phase2,
    )
}

/// Move table for the three edges UR, UF and UL, needed at the end of phase 1 to set up ur_to_df.
pub fn move_ur_to_ul() -> Vec<u16> {
    build_move_table(
        "ur_to_ul",
        N_UR_TO_UL,
        CubieCube::edge_multiply,
        |a, i| a.set_ur_to_ul(i as u16),
        CubieCube::get_ur_to_ul,
        |_| true,
    )
}

/// Move table for the three edges UB, DR and DF, needed at the end of phase 1 to set up ur_to_df.
pub fn move_ub_to_df() -> Vec<u16> {
    build_move_table(
        "ub_to_df",
        N_UB_TO_DF,
        CubieCube::edge_multiply,
        |a, i| a.set_ub_to_df(i as u16),
        CubieCube::get_ub_to_df,
        |_| true,
    )
}

/// Table to merge the coordinates of the UR, UF, UL and UB, DR, DF edges at the beginning of phase 2.
///
/// For ur_to_ul, ub_to_df < 336 the six edges are not in the UD-slice and the merged index is < 20160.
pub fn merge_ur_to_df_table() -> Vec<u16> {
    let start = Instant::now();
    let mut table = vec![MERGE_COLLISION; N_MERGE * N_MERGE];
    for ur_to_ul in 0..N_MERGE {
        for ub_to_df in 0..N_MERGE {
            if let Some(ur_to_df) = CubieCube::merge_ur_to_df(ur_to_ul as u16, ub_to_df as u16) {
                table[N_MERGE * ur_to_ul + ub_to_df] = ur_to_df;
            }
        }
    }
    debug!("merge table: {} entries in {:?}", table.len(), start.elapsed());
    table
}

#[cfg(test)]
mod test {
    use lazy_static::lazy_static;

    use crate::moves::*;

    lazy_static! {
        static ref MOVE_TABLES: MoveTables = MoveTables::new();
    }

    const QUARTER_TURNS: [Move; 6] = [U, R, F, D, L, B];

    /// Apply every quarter turn four times, and every quarter turn followed by its inverse.
    fn check_quarter_turns(table: &[u16], size: usize, moves: &[Move]) {
        assert_eq!(table.len(), size * N_MOVE);
        for v in 0..size {
            for &m in moves {
                let mut c = v;
                for _ in 0..4 {
                    c = table[N_MOVE * c + m as usize] as usize;
                    assert!(c < size);
                }
                assert_eq!(c, v, "{:?} four times", m);
                let c = table[N_MOVE * v + m as usize] as usize;
                let c = table[N_MOVE * c + m.get_inverse() as usize] as usize;
                assert_eq!(c, v, "{:?} then inverse", m);
            }
        }
    }

    #[test]
    fn test_move_parse_and_display() {
        for m in ALL_MOVES {
            assert_eq!(m.to_string().parse::<Move>().unwrap(), m);
        }
        assert_eq!("R3".parse::<Move>().unwrap(), R3);
        assert!(matches!("X2".parse::<Move>(), Err(Error::InvalidMove(_))));
        assert_eq!(R3.to_string(), "R'");
    }

    #[test]
    fn test_move_index() {
        for (i, m) in ALL_MOVES.into_iter().enumerate() {
            assert_eq!(m as usize, 3 * m.face() as usize + m.quarter_turns() as usize - 1);
            assert_eq!(m as usize, i);
        }
        let phase2: Vec<Move> = ALL_MOVES.into_iter().filter(|m| m.is_phase2()).collect();
        assert_eq!(phase2.len(), 10);
        for m in PHASE2_MOVES {
            assert!(phase2.contains(&m));
        }
    }

    #[test]
    fn test_redundant_moves() {
        assert!(R2.is_redundant_after(R));
        assert!(U.is_redundant_after(D3));
        assert!(!D.is_redundant_after(U));
        assert!(!F.is_redundant_after(R));
    }

    #[test]
    fn test_parity_move() {
        let mut cc = CubieCube::default();
        let mut parity = 0;
        for m in [R, U2, F3, D, L2, B, U3, R2] {
            cc.move_by(m);
            parity = PARITY_MOVE[parity as usize][m as usize];
            assert_eq!(parity, cc.corner_parity());
        }
    }

    #[test]
    fn test_move_twist() {
        check_quarter_turns(&MOVE_TABLES.twist_move, N_TWIST, &QUARTER_TURNS);
        assert_eq!(MOVE_TABLES.twist_move[U as usize], 0);
        assert_ne!(MOVE_TABLES.twist_move[R as usize], 0);
    }

    #[test]
    fn test_move_flip() {
        check_quarter_turns(&MOVE_TABLES.flip_move, N_FLIP, &QUARTER_TURNS);
        assert_eq!(MOVE_TABLES.flip_move[R as usize], 0);
        assert_ne!(MOVE_TABLES.flip_move[F as usize], 0);
    }

    #[test]
    fn test_move_fr_to_br() {
        check_quarter_turns(&MOVE_TABLES.fr_to_br_move, N_FR_TO_BR, &QUARTER_TURNS);
        // phase 2 moves keep the slice edges in the slice
        for c in 0..N_SLICE2 {
            for m in PHASE2_MOVES {
                assert!((MOVE_TABLES.fr_to_br_move[N_MOVE * c + m as usize] as usize) < N_SLICE2);
            }
        }
    }

    #[test]
    fn test_move_urf_to_dlf() {
        check_quarter_turns(&MOVE_TABLES.urf_to_dlf_move, N_URF_TO_DLF, &QUARTER_TURNS);
    }

    #[test]
    fn test_move_ur_to_ul_ub_to_df() {
        check_quarter_turns(&MOVE_TABLES.ur_to_ul_move, N_UR_TO_UL, &QUARTER_TURNS);
        check_quarter_turns(&MOVE_TABLES.ub_to_df_move, N_UB_TO_DF, &QUARTER_TURNS);
    }

    #[test]
    fn test_move_ur_to_df() {
        // only the phase 2 moves are tabulated
        check_quarter_turns(&MOVE_TABLES.ur_to_df_move, N_UR_TO_DF, &[U, D]);
        for v in 0..N_UR_TO_DF {
            for m in [R2, F2, L2, B2] {
                let c = MOVE_TABLES.ur_to_df_move[N_MOVE * v + m as usize] as usize;
                assert!(c < N_UR_TO_DF);
                assert_eq!(MOVE_TABLES.ur_to_df_move[N_MOVE * c + m as usize] as usize, v);
            }
        }
    }

    #[test]
    fn test_tables_agree_with_cubie_level() {
        let scramble = [R, U3, F2, L, D, B3, U2, R2, F];
        let mut cc = CubieCube::default();
        let mut twist = 0;
        let mut flip = 0;
        let mut fr_to_br = 0;
        let mut urf_to_dlf = 0;
        let mut ur_to_ul = 0;
        let mut ub_to_df = SOLVED_UB_TO_DF;
        let mv = &*MOVE_TABLES;
        for m in scramble {
            cc.move_by(m);
            let m = m as usize;
            twist = mv.twist_move[N_MOVE * twist as usize + m];
            flip = mv.flip_move[N_MOVE * flip as usize + m];
            fr_to_br = mv.fr_to_br_move[N_MOVE * fr_to_br as usize + m];
            urf_to_dlf = mv.urf_to_dlf_move[N_MOVE * urf_to_dlf as usize + m];
            ur_to_ul = mv.ur_to_ul_move[N_MOVE * ur_to_ul as usize + m];
            ub_to_df = mv.ub_to_df_move[N_MOVE * ub_to_df as usize + m];
        }
        assert_eq!(twist, cc.get_twist());
        assert_eq!(flip, cc.get_flip());
        assert_eq!(fr_to_br, cc.get_fr_to_br());
        assert_eq!(urf_to_dlf, cc.get_urf_to_dlf());
        assert_eq!(ur_to_ul, cc.get_ur_to_ul());
        assert_eq!(ub_to_df, cc.get_ub_to_df());
    }

    #[test]
    fn test_merge_table() {
        let merge = &MOVE_TABLES.merge_ur_to_df;
        assert_eq!(merge.len(), N_MERGE * N_MERGE);
        assert_eq!(merge[SOLVED_UB_TO_DF as usize], 0);
        assert_eq!(merge[0], MERGE_COLLISION);
        assert!(merge
            .iter()
            .all(|&v| v == MERGE_COLLISION || (v as usize) < N_UR_TO_DF));
    }
}

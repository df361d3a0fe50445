use std::fmt;

use crate::constants::*;
use crate::cubie::CubieCube;
use crate::moves::{Move, MoveTables, MERGE_COLLISION, PARITY_MOVE};

/// Represent a cube on the coordinate level.
///
/// In phase 1 a state is determined by the three coordinates twist, flip and
/// slice = fr_to_br / 24.
///
/// In phase 2 a state is determined by urf_to_dlf, ur_to_df, parity and slice2 = fr_to_br % 24.
/// ur_to_df does not fit the phase 2 tables outside of H, there it is assembled from
/// ur_to_ul and ub_to_df with the merge table as soon as both are below 336.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CoordCube {
    pub twist: u16,      // twist of corners
    pub flip: u16,       // flip of edges
    pub parity: u8,      // corner parity, equal to the edge parity
    pub fr_to_br: u16,   // position and permutation of FR, FL, BL, BR. < 24 in phase 2
    pub urf_to_dlf: u16, // permutation of six corners
    pub ur_to_ul: u16,   // permutation of UR, UF, UL
    pub ub_to_df: u16,   // permutation of UB, DR, DF
    /// Permutation of UR, UF, UL, UB, DR, DF. `None` while one of these edges is in the UD-slice.
    pub ur_to_df: Option<u16>,
}

impl Default for CoordCube {
    fn default() -> Self {
        Self {
            twist: 0,
            flip: 0,
            parity: 0,
            fr_to_br: 0,
            urf_to_dlf: 0,
            ur_to_ul: 0,
            ub_to_df: SOLVED_UB_TO_DF,
            ur_to_df: Some(0),
        }
    }
}

impl fmt::Display for CoordCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(twist: {}, flip: {}, parity: {}, slice: {}, FR-BR: {}, URF-DLF: {}, UR-UL: {}, UB-DF: {}, UR-DF: {:?})",
            self.twist,
            self.flip,
            self.parity,
            self.slice(),
            self.fr_to_br,
            self.urf_to_dlf,
            self.ur_to_ul,
            self.ub_to_df,
            self.ur_to_df
        )
    }
}

impl From<&CubieCube> for CoordCube {
    fn from(cc: &CubieCube) -> Self {
        let ur_to_df = cc.get_ur_to_df();
        Self {
            twist: cc.get_twist(),
            flip: cc.get_flip(),
            parity: cc.corner_parity(),
            fr_to_br: cc.get_fr_to_br(),
            urf_to_dlf: cc.get_urf_to_dlf(),
            ur_to_ul: cc.get_ur_to_ul(),
            ub_to_df: cc.get_ub_to_df(),
            ur_to_df: (ur_to_df < N_UR_TO_DF as u32).then_some(ur_to_df as u16),
        }
    }
}

impl CoordCube {
    /// The phase 1 slice coordinate, 0 <= slice < 495.
    pub fn slice(&self) -> u16 {
        self.fr_to_br / N_SLICE2 as u16
    }

    /// The phase 2 slice coordinate, 0 <= slice2 < 24.
    pub fn slice2(&self) -> u16 {
        self.fr_to_br % N_SLICE2 as u16
    }

    /// True if the cube is in the subgroup H, the goal of phase 1.
    pub fn in_subgroup(&self) -> bool {
        self.twist == 0 && self.flip == 0 && self.slice() == 0
    }

    /// Update all coordinates by move `m`, one table lookup per coordinate.
    pub fn apply_move(&mut self, m: Move, mv: &MoveTables) {
        let m = m as usize;
        self.twist = mv.twist_move[N_MOVE * self.twist as usize + m];
        self.flip = mv.flip_move[N_MOVE * self.flip as usize + m];
        self.parity = PARITY_MOVE[self.parity as usize][m];
        self.fr_to_br = mv.fr_to_br_move[N_MOVE * self.fr_to_br as usize + m];
        self.urf_to_dlf = mv.urf_to_dlf_move[N_MOVE * self.urf_to_dlf as usize + m];
        self.ur_to_ul = mv.ur_to_ul_move[N_MOVE * self.ur_to_ul as usize + m];
        self.ub_to_df = mv.ub_to_df_move[N_MOVE * self.ub_to_df as usize + m];
        self.ur_to_df = merge_ur_to_df(mv, self.ur_to_ul, self.ub_to_df);
    }

    /// Copy of the cube with move `m` applied.
    pub fn moved(&self, m: Move, mv: &MoveTables) -> Self {
        let mut c = *self;
        c.apply_move(m, mv);
        c
    }
}

/// Look up ur_to_df in the merge table, `None` unless both coordinates are below 336.
pub fn merge_ur_to_df(mv: &MoveTables, ur_to_ul: u16, ub_to_df: u16) -> Option<u16> {
    if ur_to_ul as usize >= N_MERGE || ub_to_df as usize >= N_MERGE {
        return None;
    }
    match mv.merge_ur_to_df[N_MERGE * ur_to_ul as usize + ub_to_df as usize] {
        MERGE_COLLISION => None,
        v => Some(v),
    }
}

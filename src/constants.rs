use crate::moves::Move::{self, *};

/// 3^7 possible corner orientations.
pub const N_TWIST: usize = 2187;
/// 2^11 possible edge flips.
pub const N_FLIP: usize = 2048;
/// 12 choose 4 possible positions of the FR, FL, BL and BR edges.
pub const N_SLICE1: usize = 495;
/// 4! permutations of the FR, FL, BL and BR edges in phase 2.
pub const N_SLICE2: usize = 24;
/// 2 possible corner parities.
pub const N_PARITY: usize = 2;
/// 8!/(8-6)! permutations of the URF, UFL, ULB, UBR, DFR and DLF corners.
pub const N_URF_TO_DLF: usize = 20160;
/// 12!/(12-4)! permutations of the FR, FL, BL and BR edges.
pub const N_FR_TO_BR: usize = 11880;
/// 12!/(12-3)! permutations of the UR, UF and UL edges.
pub const N_UR_TO_UL: usize = 1320;
/// 12!/(12-3)! permutations of the UB, DR and DF edges.
pub const N_UB_TO_DF: usize = 1320;
/// 8!/(8-6)! permutations of the UR, UF, UL, UB, DR and DF edges in phase 2.
pub const N_UR_TO_DF: usize = 20160;
/// Below this value the three edges of `ur_to_ul` or `ub_to_df` are all out of the UD-slice.
pub const N_MERGE: usize = 336;

pub const N_MOVE: usize = 18;
pub const N_FACELETS: usize = 54;
pub const N_CORNERS: usize = 8;
pub const N_EDGES: usize = 12;

/// `ub_to_df` of the solved cube, the only helper coordinate that is not 0 when solved.
pub const SOLVED_UB_TO_DF: u16 = 114;

pub const SOLVED_FACELETS: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

pub const DEFAULT_MAX_LENGTH: usize = 24;
pub const DEFAULT_MAX_PHASE2_LENGTH: usize = 10;

/// Phase 1 positions in H with fewer moves than this left do not try H-preserving moves.
pub const PHASE1_TAIL: usize = 5;

#[rustfmt::skip]
pub const ALL_MOVES: [Move; N_MOVE] = [
    U, U2, U3,
    R, R2, R3,
    F, F2, F3,
    D, D2, D3,
    L, L2, L3,
    B, B2, B3,
];

/// The moves that keep a cube inside the subgroup H.
pub const PHASE2_MOVES: [Move; 10] = [U, U2, U3, R2, F2, D, D2, D3, L2, B2];

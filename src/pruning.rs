use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::moves::{Move, MoveTables, PARITY_MOVE};

/// Fixed size array of 4 bit values, two entries per byte.
///
/// Entry `i` lives in byte `i / 2`, even indices in the low nibble. A fresh array holds
/// [NibbleArray::EMPTY] everywhere.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct NibbleArray {
    len: usize,
    data: Vec<u8>,
}

impl NibbleArray {
    /// Value of an entry which has not been set.
    pub const EMPTY: u8 = 0x0f;

    pub fn new(len: usize) -> Self {
        Self {
            len,
            data: vec![0xff; (len + 1) / 2],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> u8 {
        let b = self.data[i / 2];
        if i % 2 == 0 {
            b & 0x0f
        } else {
            b >> 4
        }
    }

    /// Store the low 4 bits of `value` at `i`.
    pub fn set(&mut self, i: usize, value: u8) {
        let b = &mut self.data[i / 2];
        if i % 2 == 0 {
            *b = (*b & 0xf0) | (value & 0x0f);
        } else {
            *b = (*b & 0x0f) | (value << 4);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// True if the byte buffer has exactly the size needed for `len` entries.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == (self.len + 1) / 2
    }

    /// Number of entries still holding [NibbleArray::EMPTY].
    pub fn count_empty(&self) -> usize {
        (0..self.len).filter(|&i| self.get(i) == Self::EMPTY).count()
    }
}

/// The pruning tables give a lower bound for the number of moves needed to reach the goal of
/// a phase. They hold the exact distance in a projection of the cube state, so they never
/// overestimate.
///
/// * `slice_urf_to_dlf_parity`: phase 2, index `(N_SLICE2 * urf_to_dlf + slice2) * 2 + parity`
/// * `slice_ur_to_df_parity`: phase 2, index `(N_SLICE2 * ur_to_df + slice2) * 2 + parity`
/// * `slice_twist`: phase 1, index `N_SLICE1 * twist + slice`
/// * `slice_flip`: phase 1, index `N_SLICE1 * flip + slice`
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PruningTables {
    pub slice_urf_to_dlf_parity: NibbleArray,
    pub slice_ur_to_df_parity: NibbleArray,
    pub slice_twist: NibbleArray,
    pub slice_flip: NibbleArray,
}

impl PruningTables {
    /// Build the four tables in parallel, they only read the move tables.
    pub fn new(mv: &MoveTables) -> Self {
        let start = Instant::now();
        let ((slice_urf_to_dlf_parity, slice_ur_to_df_parity), (slice_twist, slice_flip)) =
            rayon::join(
                || {
                    rayon::join(
                        || prun_slice_urf_to_dlf_parity(mv),
                        || prun_slice_ur_to_df_parity(mv),
                    )
                },
                || rayon::join(|| prun_slice_twist(mv), || prun_slice_flip(mv)),
            );
        info!("pruning tables built in {:?}", start.elapsed());
        Self {
            slice_urf_to_dlf_parity,
            slice_ur_to_df_parity,
            slice_twist,
            slice_flip,
        }
    }

    /// Lower bound for the number of moves to reach the subgroup H.
    pub fn phase1_bound(&self, slice: u16, twist: u16, flip: u16) -> u8 {
        let slice = slice as usize;
        self.slice_twist
            .get(N_SLICE1 * twist as usize + slice)
            .max(self.slice_flip.get(N_SLICE1 * flip as usize + slice))
    }

    /// Lower bound for the number of phase 2 moves to solve a cube in H.
    pub fn phase2_bound(&self, slice2: u16, urf_to_dlf: u16, ur_to_df: u16, parity: u8) -> u8 {
        self.slice_urf_to_dlf_parity
            .get(phase2_index(slice2, urf_to_dlf, parity))
            .max(
                self.slice_ur_to_df_parity
                    .get(phase2_index(slice2, ur_to_df, parity)),
            )
    }
}

/// Index into the phase 2 tables for a permutation coordinate `perm` < 20160.
pub fn phase2_index(slice2: u16, perm: u16, parity: u8) -> usize {
    (N_SLICE2 * perm as usize + slice2 as usize) * N_PARITY + parity as usize
}

/// Breadth first search from the solved index 0, one layer per depth.
///
/// `next(i, m)` is the index reached from index `i` by move `m`.
fn build_pruning_table(
    name: &str,
    size: usize,
    moves: &[Move],
    next: impl Fn(usize, Move) -> usize,
) -> NibbleArray {
    let start = Instant::now();
    let mut table = NibbleArray::new(size);
    table.set(0, 0);
    let mut done = 1;
    let mut depth = 0;
    while done < size {
        let mut added = 0;
        for i in 0..size {
            if table.get(i) != depth {
                continue;
            }
            for &m in moves {
                let j = next(i, m);
                if table.get(j) == NibbleArray::EMPTY {
                    table.set(j, depth + 1);
                    added += 1;
                }
            }
        }
        if added == 0 {
            break;
        }
        done += added;
        depth += 1;
        debug!("{} depth {}: {}/{}", name, depth, done, size);
    }
    info!(
        "{} pruning table: {} entries, max depth {} in {:?}",
        name,
        size,
        depth,
        start.elapsed()
    );
    table
}

/// Phase 2 pruning table for the slice edge permutation, the six corner permutation and the
/// parity.
pub fn prun_slice_urf_to_dlf_parity(mv: &MoveTables) -> NibbleArray {
    build_pruning_table(
        "slice_urf_to_dlf_parity",
        N_SLICE2 * N_URF_TO_DLF * N_PARITY,
        &PHASE2_MOVES,
        |i, m| {
            let parity = i % N_PARITY;
            let slice2 = (i / N_PARITY) % N_SLICE2;
            let urf_to_dlf = (i / N_PARITY) / N_SLICE2;
            let m = m as usize;
            let new_slice = mv.fr_to_br_move[N_MOVE * slice2 + m];
            let new_urf_to_dlf = mv.urf_to_dlf_move[N_MOVE * urf_to_dlf + m];
            let new_parity = PARITY_MOVE[parity][m];
            phase2_index(new_slice, new_urf_to_dlf, new_parity)
        },
    )
}

/// Phase 2 pruning table for the slice edge permutation, the six UD edge permutation and the
/// parity.
pub fn prun_slice_ur_to_df_parity(mv: &MoveTables) -> NibbleArray {
    build_pruning_table(
        "slice_ur_to_df_parity",
        N_SLICE2 * N_UR_TO_DF * N_PARITY,
        &PHASE2_MOVES,
        |i, m| {
            let parity = i % N_PARITY;
            let slice2 = (i / N_PARITY) % N_SLICE2;
            let ur_to_df = (i / N_PARITY) / N_SLICE2;
            let m = m as usize;
            let new_slice = mv.fr_to_br_move[N_MOVE * slice2 + m];
            let new_ur_to_df = mv.ur_to_df_move[N_MOVE * ur_to_df + m];
            let new_parity = PARITY_MOVE[parity][m];
            phase2_index(new_slice, new_ur_to_df, new_parity)
        },
    )
}

/// Phase 1 pruning table for the slice position and the corner twist.
pub fn prun_slice_twist(mv: &MoveTables) -> NibbleArray {
    build_pruning_table("slice_twist", N_SLICE1 * N_TWIST, &ALL_MOVES, |i, m| {
        let slice = i % N_SLICE1;
        let twist = i / N_SLICE1;
        let m = m as usize;
        let new_slice = mv.fr_to_br_move[N_MOVE * slice * N_SLICE2 + m] as usize / N_SLICE2;
        let new_twist = mv.twist_move[N_MOVE * twist + m] as usize;
        N_SLICE1 * new_twist + new_slice
    })
}

/// Phase 1 pruning table for the slice position and the edge flip.
pub fn prun_slice_flip(mv: &MoveTables) -> NibbleArray {
    build_pruning_table("slice_flip", N_SLICE1 * N_FLIP, &ALL_MOVES, |i, m| {
        let slice = i % N_SLICE1;
        let flip = i / N_SLICE1;
        let m = m as usize;
        let new_slice = mv.fr_to_br_move[N_MOVE * slice * N_SLICE2 + m] as usize / N_SLICE2;
        let new_flip = mv.flip_move[N_MOVE * flip + m] as usize;
        N_SLICE1 * new_flip + new_slice
    })
}

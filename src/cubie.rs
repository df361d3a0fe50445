//! The cube on the cubie level.
//!
//! A [CubieCube] stores for every corner and edge position which piece sits there and how it
//! is oriented. All coordinates of the two phase algorithm are computed from this
//! representation, and every coordinate can be expanded back into a representative cube.
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::*;
use crate::error::Error;
use crate::facelet::{Color, FaceCube, CORNER_COLOR, CORNER_FACELET, EDGE_COLOR, EDGE_FACELET};
use crate::moves::{self, Move};

use self::Corner::*;
use self::Edge::*;

/// The names of the corner positions of the cube. Corner URF e.g. has an U(p), a R(ight) and a F(ront) facelet.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Corner {
    URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB,
}

pub const ALL_CORNERS: [Corner; N_CORNERS] = [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB];

/// The names of the edge positions of the cube. Edge UR e.g. has an U(p) and R(ight) facelet.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub enum Edge {
    UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR,
}

pub const ALL_EDGES: [Edge; N_EDGES] = [UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR];

/// Binomial coefficient, 0 if `n < k`.
pub fn cnk(n: usize, k: usize) -> usize {
    if n < k {
        return 0;
    }
    let k = k.min(n - k);
    let mut s = 1;
    for i in 0..k {
        s = s * (n - i) / (i + 1);
    }
    s
}

/// Rank of the order of the pieces `base..base + K` stored in `pieces`, `0 <= rank < K!`.
fn rank_order<const K: usize>(mut pieces: [u8; K], base: u8) -> usize {
    let mut b = 0;
    for j in (1..K).rev() {
        let mut k = 0;
        while pieces[j] != base + j as u8 {
            pieces[..=j].rotate_left(1);
            k += 1;
        }
        b = (j + 1) * b + k;
    }
    b
}

/// Inverse of [rank_order].
fn unrank_order<const K: usize>(mut b: usize, base: u8) -> [u8; K] {
    let mut pieces: [u8; K] = std::array::from_fn(|i| base + i as u8);
    for j in 1..K {
        let k = b % (j + 1);
        b /= j + 1;
        for _ in 0..k {
            pieces[..=j].rotate_right(1);
        }
    }
    pieces
}

/// Represent a cube on the cubie level.
///
/// * `cp`: corner permutation, `cp[i]` is the corner sitting at position i
/// * `co`: corner orientation, 0..3
/// * `ep`: edge permutation
/// * `eo`: edge orientation, 0..2
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CubieCube {
    pub cp: [Corner; N_CORNERS],
    pub co: [u8; N_CORNERS],
    pub ep: [Edge; N_EDGES],
    pub eo: [u8; N_EDGES],
}

impl Default for CubieCube {
    fn default() -> Self {
        Self {
            cp: ALL_CORNERS,
            co: [0; N_CORNERS],
            ep: ALL_EDGES,
            eo: [0; N_EDGES],
        }
    }
}

impl fmt::Display for CubieCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", FaceCube::from(self))
    }
}

/// Gives the cubie representation of a facelet cube.
///
/// Fails with [Error::InvalidCorners] or [Error::InvalidEdges] if some corner or edge facelets
/// do not belong to any piece. Uniqueness and parities are checked by [CubieCube::verify].
impl TryFrom<&FaceCube> for CubieCube {
    type Error = Error;

    fn try_from(fc: &FaceCube) -> Result<Self, Self::Error> {
        let mut cc = CubieCube::default();
        for i in 0..N_CORNERS {
            let fac = CORNER_FACELET[i];
            // get the colors of the cubie at corner i, starting with U/D
            let ori = (0..3)
                .find(|&o| matches!(fc.f[fac[o]], Color::U | Color::D))
                .ok_or(Error::InvalidCorners)?;
            let col0 = fc.f[fac[ori]];
            let col1 = fc.f[fac[(ori + 1) % 3]];
            let col2 = fc.f[fac[(ori + 2) % 3]];
            let j = CORNER_COLOR
                .iter()
                .position(|c| c[0] == col0 && c[1] == col1 && c[2] == col2)
                .ok_or(Error::InvalidCorners)?;
            cc.cp[i] = ALL_CORNERS[j];
            cc.co[i] = ori as u8;
        }
        for i in 0..N_EDGES {
            let col0 = fc.f[EDGE_FACELET[i][0]];
            let col1 = fc.f[EDGE_FACELET[i][1]];
            let (j, ori) = EDGE_COLOR
                .iter()
                .enumerate()
                .find_map(|(j, c)| {
                    if c[0] == col0 && c[1] == col1 {
                        Some((j, 0))
                    } else if c[0] == col1 && c[1] == col0 {
                        Some((j, 1))
                    } else {
                        None
                    }
                })
                .ok_or(Error::InvalidEdges)?;
            cc.ep[i] = ALL_EDGES[j];
            cc.eo[i] = ori;
        }
        Ok(cc)
    }
}

impl TryFrom<&str> for CubieCube {
    type Error = Error;

    fn try_from(cube_string: &str) -> Result<Self, Self::Error> {
        CubieCube::try_from(&FaceCube::try_from(cube_string)?)
    }
}

/// The six basic face turns U, R, F, D, L and B as cubie cubes.
pub fn basic_move_cubes() -> [CubieCube; 6] {
    [
        moves::U_MOVE,
        moves::R_MOVE,
        moves::F_MOVE,
        moves::D_MOVE,
        moves::L_MOVE,
        moves::B_MOVE,
    ]
}

impl CubieCube {
    /// Multiply this cubie cube with another cubie cube b, restricted to the corners.
    pub fn corner_multiply(&mut self, b: CubieCube) {
        let mut cp = [URF; N_CORNERS];
        let mut co = [0; N_CORNERS];
        for c in 0..N_CORNERS {
            let from = b.cp[c] as usize;
            cp[c] = self.cp[from];
            co[c] = (self.co[from] + b.co[c]) % 3;
        }
        self.cp = cp;
        self.co = co;
    }

    /// Multiply this cubie cube with another cubie cube b, restricted to the edges.
    pub fn edge_multiply(&mut self, b: CubieCube) {
        let mut ep = [UR; N_EDGES];
        let mut eo = [0; N_EDGES];
        for e in 0..N_EDGES {
            let from = b.ep[e] as usize;
            ep[e] = self.ep[from];
            eo[e] = (self.eo[from] + b.eo[e]) % 2;
        }
        self.ep = ep;
        self.eo = eo;
    }

    pub fn multiply(&mut self, b: CubieCube) {
        self.corner_multiply(b);
        self.edge_multiply(b);
    }

    pub fn inverse_cubie_cube(&self) -> CubieCube {
        let mut inv = CubieCube::default();
        for e in 0..N_EDGES {
            inv.ep[self.ep[e] as usize] = ALL_EDGES[e];
        }
        for e in 0..N_EDGES {
            inv.eo[e] = self.eo[inv.ep[e] as usize];
        }
        for c in 0..N_CORNERS {
            inv.cp[self.cp[c] as usize] = ALL_CORNERS[c];
        }
        for c in 0..N_CORNERS {
            inv.co[c] = (3 - self.co[inv.cp[c] as usize]) % 3;
        }
        inv
    }

    /// Apply a single move in place.
    pub fn move_by(&mut self, m: Move) {
        let mc = basic_move_cubes()[m.face() as usize];
        for _ in 0..m.quarter_turns() {
            self.multiply(mc);
        }
    }

    /// Apply a move sequence in place.
    pub fn multiply_moves(&mut self, moves: &[Move]) {
        for &m in moves {
            self.move_by(m);
        }
    }

    /// Return the cube reached by applying a move sequence.
    pub fn apply_moves(&self, moves: &[Move]) -> CubieCube {
        let mut cc = *self;
        cc.multiply_moves(moves);
        cc
    }

    pub fn is_solved(&self) -> bool {
        *self == CubieCube::default()
    }

    /// The twist of the 8 corners. 0 <= twist < 2187.
    pub fn get_twist(&self) -> u16 {
        self.co[..N_CORNERS - 1]
            .iter()
            .fold(0, |ret, &o| 3 * ret + o as u16)
    }

    pub fn set_twist(&mut self, twist: u16) {
        let mut twist = twist;
        let mut parity = 0;
        for i in (0..N_CORNERS - 1).rev() {
            self.co[i] = (twist % 3) as u8;
            parity += self.co[i];
            twist /= 3;
        }
        self.co[N_CORNERS - 1] = (3 - parity % 3) % 3;
    }

    /// The flip of the 12 edges. 0 <= flip < 2048.
    pub fn get_flip(&self) -> u16 {
        self.eo[..N_EDGES - 1]
            .iter()
            .fold(0, |ret, &o| 2 * ret + o as u16)
    }

    pub fn set_flip(&mut self, flip: u16) {
        let mut flip = flip;
        let mut parity = 0;
        for i in (0..N_EDGES - 1).rev() {
            self.eo[i] = (flip % 2) as u8;
            parity += self.eo[i];
            flip /= 2;
        }
        self.eo[N_EDGES - 1] = (2 - parity % 2) % 2;
    }

    /// Parity of the corner permutation.
    pub fn corner_parity(&self) -> u8 {
        let mut s = 0;
        for i in (1..N_CORNERS).rev() {
            for j in (0..i).rev() {
                if self.cp[j] > self.cp[i] {
                    s += 1;
                }
            }
        }
        s % 2
    }

    /// Parity of the edges permutation. Parity of corners and edges are the same if the cube is solvable.
    pub fn edge_parity(&self) -> u8 {
        let mut s = 0;
        for i in (1..N_EDGES).rev() {
            for j in (0..i).rev() {
                if self.ep[j] > self.ep[i] {
                    s += 1;
                }
            }
        }
        s % 2
    }

    /// Permutation of the UD-slice edges FR, FL, BL and BR. 0 <= fr_to_br < 11880.
    ///
    /// `fr_to_br / 24` is the phase 1 slice coordinate, 0 iff the four edges are in the slice.
    pub fn get_fr_to_br(&self) -> u16 {
        let mut a = 0;
        let mut x = 0;
        let mut edge4 = [0u8; 4];
        // compute the index a < (12 choose 4) and the permutation array
        for j in (0..N_EDGES).rev() {
            if self.ep[j] >= FR {
                a += cnk(11 - j, x + 1);
                edge4[3 - x] = self.ep[j] as u8;
                x += 1;
            }
        }
        (24 * a + rank_order(edge4, FR as u8)) as u16
    }

    pub fn set_fr_to_br(&mut self, idx: u16) {
        let slice_edge = unrank_order::<4>(idx as usize % 24, FR as u8);
        let mut other_edge = [UR, UF, UL, UB, DR, DF, DL, DB].into_iter();
        let mut a = idx as usize / 24;
        let mut slot = [None; N_EDGES];
        let mut remaining = 4;
        for (j, s) in slot.iter_mut().enumerate() {
            if remaining > 0 && a >= cnk(11 - j, remaining) {
                *s = Some(ALL_EDGES[slice_edge[4 - remaining] as usize]);
                a -= cnk(11 - j, remaining);
                remaining -= 1;
            }
        }
        for (j, s) in slot.into_iter().enumerate() {
            self.ep[j] = s.or_else(|| other_edge.next()).unwrap_or(DB);
        }
    }

    /// Permutation of the six corners URF, UFL, ULB, UBR, DFR and DLF. 0 <= urf_to_dlf < 20160.
    pub fn get_urf_to_dlf(&self) -> u16 {
        let mut a = 0;
        let mut x = 0;
        let mut corner6 = [0u8; 6];
        for j in 0..N_CORNERS {
            if self.cp[j] <= DLF {
                a += cnk(j, x + 1);
                corner6[x] = self.cp[j] as u8;
                x += 1;
            }
        }
        (720 * a + rank_order(corner6, URF as u8)) as u16
    }

    /// The positions of DBL and DRB are not determined by the coordinate, they are filled in order.
    pub fn set_urf_to_dlf(&mut self, idx: u16) {
        let corner6 = unrank_order::<6>(idx as usize % 720, URF as u8);
        let mut other_corner = [DBL, DRB].into_iter();
        let mut a = idx as usize / 720;
        let mut slot = [None; N_CORNERS];
        let mut remaining = 6;
        for j in (0..N_CORNERS).rev() {
            if remaining > 0 && a >= cnk(j, remaining) {
                slot[j] = Some(ALL_CORNERS[corner6[remaining - 1] as usize]);
                a -= cnk(j, remaining);
                remaining -= 1;
            }
        }
        for (j, s) in slot.into_iter().enumerate() {
            self.cp[j] = s.or_else(|| other_corner.next()).unwrap_or(DRB);
        }
    }

    /// Permutation of the six edges UR, UF, UL, UB, DR and DF.
    ///
    /// 0 <= ur_to_df < 665280 in general, < 20160 once the UD-slice edges are in the slice.
    pub fn get_ur_to_df(&self) -> u32 {
        let mut a = 0;
        let mut x = 0;
        let mut edge6 = [0u8; 6];
        for j in 0..N_EDGES {
            if self.ep[j] <= DF {
                a += cnk(j, x + 1);
                edge6[x] = self.ep[j] as u8;
                x += 1;
            }
        }
        (720 * a + rank_order(edge6, UR as u8)) as u32
    }

    pub fn set_ur_to_df(&mut self, idx: u32) {
        let edge6 = unrank_order::<6>(idx as usize % 720, UR as u8);
        let mut other_edge = [DL, DB, FR, FL, BL, BR].into_iter();
        let mut a = idx as usize / 720;
        let mut slot = [None; N_EDGES];
        let mut remaining = 6;
        for j in (0..N_EDGES).rev() {
            if remaining > 0 && a >= cnk(j, remaining) {
                slot[j] = Some(ALL_EDGES[edge6[remaining - 1] as usize]);
                a -= cnk(j, remaining);
                remaining -= 1;
            }
        }
        for (j, s) in slot.into_iter().enumerate() {
            self.ep[j] = s.or_else(|| other_edge.next()).unwrap_or(BR);
        }
    }

    /// Permutation of the three edges `first..first + 3`, 0 <= idx < 1320.
    fn get_three_edges(&self, first: Edge) -> u16 {
        let mut a = 0;
        let mut x = 0;
        let mut edge3 = [0u8; 3];
        for j in 0..N_EDGES {
            let e = self.ep[j] as u8;
            if first as u8 <= e && e < first as u8 + 3 {
                a += cnk(j, x + 1);
                edge3[x] = e;
                x += 1;
            }
        }
        (6 * a + rank_order(edge3, first as u8)) as u16
    }

    /// Place the three edges `first..first + 3`, all other positions get BR.
    fn set_three_edges(&mut self, first: Edge, idx: u16) {
        let edge3 = unrank_order::<3>(idx as usize % 6, first as u8);
        let mut a = idx as usize / 6;
        self.ep = [BR; N_EDGES];
        let mut remaining = 3;
        for j in (0..N_EDGES).rev() {
            if remaining > 0 && a >= cnk(j, remaining) {
                self.ep[j] = ALL_EDGES[edge3[remaining - 1] as usize];
                a -= cnk(j, remaining);
                remaining -= 1;
            }
        }
    }

    /// Permutation of the edges UR, UF and UL. 0 <= ur_to_ul < 1320, < 336 in phase 2.
    pub fn get_ur_to_ul(&self) -> u16 {
        self.get_three_edges(UR)
    }

    /// Only the edges UR, UF and UL are placed, the others are set to BR.
    pub fn set_ur_to_ul(&mut self, idx: u16) {
        self.set_three_edges(UR, idx)
    }

    /// Permutation of the edges UB, DR and DF. 0 <= ub_to_df < 1320, < 336 in phase 2, 114 if solved.
    pub fn get_ub_to_df(&self) -> u16 {
        self.get_three_edges(UB)
    }

    /// Only the edges UB, DR and DF are placed, the others are set to BR.
    pub fn set_ub_to_df(&mut self, idx: u16) {
        self.set_three_edges(UB, idx)
    }

    /// Merge `ur_to_ul` and `ub_to_df` into `ur_to_df`. Both must be < 336.
    ///
    /// Returns `None` if the two coordinates put two edges into the same position.
    pub fn merge_ur_to_df(ur_to_ul: u16, ub_to_df: u16) -> Option<u16> {
        let mut a = CubieCube::default();
        let mut b = CubieCube::default();
        a.set_ur_to_ul(ur_to_ul);
        b.set_ub_to_df(ub_to_df);
        for i in 0..8 {
            if a.ep[i] != BR {
                if b.ep[i] != BR {
                    return None;
                }
                b.ep[i] = a.ep[i];
            }
        }
        Some(b.get_ur_to_df() as u16)
    }

    /// Check if the cubie cube is a valid cube position.
    pub fn verify(&self) -> Result<(), Error> {
        let mut edge_count = [0; N_EDGES];
        for e in self.ep {
            edge_count[e as usize] += 1;
        }
        if edge_count.iter().any(|&n| n != 1) {
            return Err(Error::InvalidEdges);
        }
        if self.eo.iter().map(|&o| o as u32).sum::<u32>() % 2 != 0 {
            return Err(Error::FlipError);
        }
        let mut corner_count = [0; N_CORNERS];
        for c in self.cp {
            corner_count[c as usize] += 1;
        }
        if corner_count.iter().any(|&n| n != 1) {
            return Err(Error::InvalidCorners);
        }
        if self.co.iter().map(|&o| o as u32).sum::<u32>() % 3 != 0 {
            return Err(Error::TwistError);
        }
        if self.edge_parity() != self.corner_parity() {
            return Err(Error::ParityError);
        }
        Ok(())
    }

    /// Turn this cube into a uniformly random solvable cube.
    pub fn randomize(&mut self) {
        self.randomize_with(&mut rand::thread_rng());
    }

    pub fn randomize_with<R: Rng>(&mut self, rng: &mut R) {
        self.cp.shuffle(rng);
        self.ep.shuffle(rng);
        if self.corner_parity() != self.edge_parity() {
            self.ep.swap(N_EDGES - 2, N_EDGES - 1);
        }
        self.set_twist(rng.gen_range(0..N_TWIST) as u16);
        self.set_flip(rng.gen_range(0..N_FLIP) as u16);
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::moves::Move::*;

    #[test]
    fn test_cnk() {
        assert_eq!(cnk(12, 4), 495);
        assert_eq!(cnk(8, 6), 28);
        assert_eq!(cnk(3, 4), 0);
        assert_eq!(cnk(5, 0), 1);
    }

    #[test]
    fn test_solved_coordinates() {
        let cc = CubieCube::default();
        assert_eq!(cc.get_twist(), 0);
        assert_eq!(cc.get_flip(), 0);
        assert_eq!(cc.corner_parity(), 0);
        assert_eq!(cc.get_fr_to_br(), 0);
        assert_eq!(cc.get_urf_to_dlf(), 0);
        assert_eq!(cc.get_ur_to_df(), 0);
        assert_eq!(cc.get_ur_to_ul(), 0);
        assert_eq!(cc.get_ub_to_df(), SOLVED_UB_TO_DF);
        assert!(cc.verify().is_ok());
    }

    #[test]
    fn test_four_quarter_turns() {
        for m in [U, R, F, D, L, B] {
            let cc = CubieCube::default().apply_moves(&[m, m, m, m]);
            assert!(cc.is_solved(), "{:?}", m);
            let cc = CubieCube::default().apply_moves(&[m, m.get_inverse()]);
            assert!(cc.is_solved(), "{:?}", m);
        }
    }

    #[test]
    fn test_sexy_move_order() {
        let mut cc = CubieCube::default();
        for _ in 0..6 {
            cc.multiply_moves(&[R, U, R3, U3]);
        }
        assert!(cc.is_solved());
    }

    #[test]
    fn test_coordinate_roundtrip() {
        let mut cc = CubieCube::default();
        for i in (0..N_TWIST as u16).step_by(7) {
            cc.set_twist(i);
            assert_eq!(cc.get_twist(), i);
        }
        for i in (0..N_FLIP as u16).step_by(5) {
            cc.set_flip(i);
            assert_eq!(cc.get_flip(), i);
        }
        for i in (0..N_FR_TO_BR as u16).step_by(13) {
            cc.set_fr_to_br(i);
            assert_eq!(cc.get_fr_to_br(), i);
        }
        for i in (0..N_URF_TO_DLF as u16).step_by(11) {
            cc.set_urf_to_dlf(i);
            assert_eq!(cc.get_urf_to_dlf(), i);
        }
        for i in (0..665280u32).step_by(97) {
            cc.set_ur_to_df(i);
            assert_eq!(cc.get_ur_to_df(), i);
        }
        for i in 0..N_UR_TO_UL as u16 {
            cc.set_ur_to_ul(i);
            assert_eq!(cc.get_ur_to_ul(), i);
            cc.set_ub_to_df(i);
            assert_eq!(cc.get_ub_to_df(), i);
        }
    }

    #[test]
    fn test_merge_ur_to_df() {
        let cc = CubieCube::default().apply_moves(&[U, R2, D3, F2, L2, U2]);
        let merged = CubieCube::merge_ur_to_df(cc.get_ur_to_ul(), cc.get_ub_to_df());
        assert_eq!(merged, Some(cc.get_ur_to_df() as u16));
        // UR, UF, UL and UB, DR, DF can not share position 0
        let mut a = CubieCube::default();
        a.set_ub_to_df(0);
        assert_eq!(CubieCube::merge_ur_to_df(0, a.get_ub_to_df()), None);
    }

    #[test]
    fn test_inverse() {
        let cc = CubieCube::default().apply_moves(&[R, U, F2, D3, L, B2]);
        let mut prod = cc;
        prod.multiply(cc.inverse_cubie_cube());
        assert!(prod.is_solved());
    }

    #[test]
    fn test_verify_errors() {
        let mut cc = CubieCube::default();
        cc.eo[0] = 1;
        assert!(matches!(cc.verify(), Err(Error::FlipError)));

        let mut cc = CubieCube::default();
        cc.co[0] = 1;
        assert!(matches!(cc.verify(), Err(Error::TwistError)));

        let mut cc = CubieCube::default();
        cc.ep.swap(0, 1);
        assert!(matches!(cc.verify(), Err(Error::ParityError)));

        let mut cc = CubieCube::default();
        cc.ep[0] = UF;
        assert!(matches!(cc.verify(), Err(Error::InvalidEdges)));

        let mut cc = CubieCube::default();
        cc.cp[0] = UFL;
        assert!(matches!(cc.verify(), Err(Error::InvalidCorners)));
    }

    #[test]
    fn test_random_cubes_roundtrip_through_facelets() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut cc = CubieCube::default();
            cc.randomize_with(&mut rng);
            assert!(cc.verify().is_ok());
            let s = cc.to_string();
            let fc = FaceCube::try_from(s.as_str()).unwrap();
            assert_eq!(fc.to_string(), s);
            assert_eq!(CubieCube::try_from(&fc).unwrap(), cc);
        }
    }

    #[test]
    fn test_unknown_pieces_are_rejected() {
        // swap two stickers of the URF corner: the triple U, F, R is no corner
        let mut fc = FaceCube::default();
        fc.f.swap(CORNER_FACELET[0][1], CORNER_FACELET[0][2]);
        assert!(matches!(
            CubieCube::try_from(&fc),
            Err(Error::InvalidCorners)
        ));

        // an edge showing R and L can not exist
        let mut fc = FaceCube::default();
        fc.f[EDGE_FACELET[0][0]] = Color::L;
        fc.f[EDGE_FACELET[2][1]] = Color::U;
        assert!(matches!(CubieCube::try_from(&fc), Err(Error::InvalidEdges)));
    }
}

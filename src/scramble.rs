use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::constants::ALL_MOVES;
use crate::cubie::CubieCube;
use crate::{error::Error, moves::Move};

/// Parse a move sequence like `"R U R' U2"`, also accepting `R1` and `R3`.
pub fn scramble_from_str(s: &str) -> Result<Vec<Move>, Error> {
    s.split_whitespace().map(Move::from_str).collect()
}

pub fn scramble_to_str(s: &[Move]) -> String {
    s.iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Facelet string of the cube reached from the solved cube by `moves`.
pub fn scramble_to_facelets(moves: &[Move]) -> String {
    CubieCube::default().apply_moves(moves).to_string()
}

/// Random move sequence without two moves of the same face in a row, and without the
/// opposite face pairs the solver never generates (D before U, L before R, B before F).
pub fn gen_scramble(length: usize) -> Vec<Move> {
    gen_scramble_with(length, &mut rand::thread_rng())
}

pub fn gen_scramble_with<R: Rng>(length: usize, rng: &mut R) -> Vec<Move> {
    let mut scramble: Vec<Move> = Vec::with_capacity(length);
    while scramble.len() < length {
        let m = ALL_MOVES.choose(rng).copied().unwrap_or(Move::U);
        if let Some(&prev) = scramble.last() {
            if m.is_redundant_after(prev) {
                continue;
            }
        }
        scramble.push(m);
    }
    scramble
}

/// Facelet string of a uniformly random solvable cube.
pub fn random_cube() -> String {
    let mut cc = CubieCube::default();
    cc.randomize();
    cc.to_string()
}

pub fn random_cube_with<R: Rng>(rng: &mut R) -> String {
    let mut cc = CubieCube::default();
    cc.randomize_with(rng);
    cc.to_string()
}

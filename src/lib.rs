//! A crate for solving the 3x3 Rubik's cube with [Kociemba's two phase algorithm](http://kociemba.org/cube.htm).
//!
//! A cube is given as a facelet string (see [facelet]) and solved with [solver::solve], or with
//! [solver::solve_with] against explicitly owned [solver::Tables]. The move and pruning tables
//! are built on first use and kept in a cache file (see [cache]).
//!
//! ```rust,no_run
//! use twophase::solver::solution;
//!
//! let moves = solution("DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD", 24, false);
//! println!("{}", moves);
//! ```

/// Module containing 3x3 cube constants.
pub mod constants;
pub mod error;

pub mod cache;
pub mod coord;
pub mod cubie;
pub mod facelet;
pub mod moves;
pub mod pruning;
/// Module containing functions for scrambling the cube.
pub mod scramble;
pub mod solver;

pub use crate::error::Error;
pub use crate::moves::Move;
pub use crate::solver::{solution, solve, SearchPolicy, Solution, SolverConfig, Tables};

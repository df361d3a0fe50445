use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cache;
use crate::constants::*;
use crate::coord::CoordCube;
use crate::cubie::CubieCube;
use crate::error::Error;
use crate::facelet::FaceCube;
use crate::moves::{Move, MoveTables, PARITY_MOVE};
use crate::pruning::PruningTables;

/// All data tables.
///
/// * `mv`: [MoveTables]
/// * `pr`: [PruningTables]
///
/// Immutable once built, shared by reference between any number of searches.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Tables {
    pub mv: MoveTables,
    pub pr: PruningTables,
}

impl Tables {
    /// Build all tables in memory.
    pub fn build() -> Self {
        let start = Instant::now();
        let mv = MoveTables::new();
        let pr = PruningTables::new(&mv);
        info!("tables built in {:?}", start.elapsed());
        Self { mv, pr }
    }

    /// Load the tables from the cache file at `path`, or build them and write the cache.
    ///
    /// Never fails: a missing or unreadable cache only costs a rebuild.
    pub fn load_or_build<P: AsRef<Path>>(path: P) -> Self {
        cache::load_or_build(path.as_ref())
    }

    /// Process wide tables, loaded from (or built into) the default cache path on first use.
    pub fn shared() -> &'static Tables {
        lazy_static! {
            static ref SHARED_TABLES: Tables = Tables::load_or_build(cache::cache_path(None));
        }
        &SHARED_TABLES
    }
}

/// How long the search goes on once a first solution is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchPolicy {
    /// Return the first solution.
    FirstSolution,
    /// Finish the phase 1 depth which gave the first solution, return the shortest one.
    #[default]
    FinishDepth,
    /// Try longer phase 1 solutions until the total has at most this many moves.
    Target(usize),
}

/// Search parameters.
///
/// * `max_length`: no solution longer than this is returned.
/// * `timeout`: the search returns the best solution found so far once this has elapsed,
///   [Error::Timeout] if there is none.
/// * `policy`: [SearchPolicy]
/// * `max_phase2_length`: phase 2 never uses more moves than this.
/// * `separator`: put a `.` between the phase 1 and phase 2 moves in the text output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_length: usize,
    pub timeout: Option<Duration>,
    pub policy: SearchPolicy,
    pub max_phase2_length: usize,
    pub separator: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            timeout: None,
            policy: SearchPolicy::default(),
            max_phase2_length: DEFAULT_MAX_PHASE2_LENGTH,
            separator: false,
        }
    }
}

impl SolverConfig {
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_phase2_length(mut self, max_phase2_length: usize) -> Self {
        self.max_phase2_length = max_phase2_length;
        self
    }

    pub fn separator(mut self, separator: bool) -> Self {
        self.separator = separator;
        self
    }
}

/// Solution result:
/// * solution: a Move vector, the phase 1 moves followed by the phase 2 moves.
/// * phase1_length: number of phase 1 moves.
/// * solve_time: time to get the solution, not including loading the tables.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Solution {
    pub solution: Vec<Move>,
    pub phase1_length: usize,
    pub solve_time: Duration,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.solution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }

    pub fn phase1(&self) -> &[Move] {
        &self.solution[..self.phase1_length]
    }

    pub fn phase2(&self) -> &[Move] {
        &self.solution[self.phase1_length..]
    }

    /// Moves separated by spaces. With `separator` set a `.` follows the phase 1 moves, if
    /// there are any.
    pub fn to_string_with_separator(&self, separator: bool) -> String {
        let mut parts: Vec<String> = self.phase1().iter().map(|m| m.to_string()).collect();
        if separator && self.phase1_length > 0 {
            parts.push(".".to_string());
        }
        parts.extend(self.phase2().iter().map(|m| m.to_string()));
        parts.join(" ")
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_separator(false))
    }
}

/// Solve a cube given by its facelet string with the process wide [Tables::shared].
///
/// # Parameters
/// * `facelets`: The format of the string is given in the [crate::facelet] module.
/// * `max_length`: The maximal number of moves of the solution.
/// * `timeout`: If the function times out, the best solution found so far is returned.
///
/// # Examples
/// ```rust,no_run
/// use twophase::solver::solve;
///
/// let result = solve(
///     "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD",
///     24,
///     None,
/// )
/// .unwrap();
/// println!("{} ({}), {:?}", result, result.len(), result.solve_time);
/// ```
pub fn solve(
    facelets: &str,
    max_length: usize,
    timeout: Option<Duration>,
) -> Result<Solution, Error> {
    let config = SolverConfig::default()
        .max_length(max_length)
        .timeout(timeout);
    solve_with(Tables::shared(), facelets, &config)
}

/// Solve a cube given by its facelet string.
pub fn solve_with(
    tables: &Tables,
    facelets: &str,
    config: &SolverConfig,
) -> Result<Solution, Error> {
    let fc = FaceCube::try_from(facelets)?;
    let cc = CubieCube::try_from(&fc)?;
    solve_cubie(tables, &cc, config)
}

/// Solve a cube given on the cubie level. The cube is verified before the search starts.
pub fn solve_cubie(
    tables: &Tables,
    cc: &CubieCube,
    config: &SolverConfig,
) -> Result<Solution, Error> {
    cc.verify()?;
    let start = Instant::now();
    let mut search = Search::new(tables, config, start);
    search.run(CoordCube::from(cc));
    debug!(
        "search finished after {} nodes in {:?}",
        search.nodes,
        start.elapsed()
    );
    match search.best {
        Some(solution) => Ok(Solution {
            solve_time: start.elapsed(),
            ..solution
        }),
        None if search.timed_out => Err(Error::Timeout),
        None => Err(Error::NoSolution {
            max_length: config.max_length,
        }),
    }
}

/// Text interface of the solver: the solution as move string, or the error message starting
/// with its `Error N` marker.
pub fn solution(facelets: &str, max_length: usize, separator: bool) -> String {
    let config = SolverConfig::default()
        .max_length(max_length)
        .separator(separator);
    solution_with(Tables::shared(), facelets, &config)
}

pub fn solution_with(tables: &Tables, facelets: &str, config: &SolverConfig) -> String {
    match solve_with(tables, facelets, config) {
        Ok(solution) => solution.to_string_with_separator(config.separator),
        Err(e) => e.to_string(),
    }
}

/// The coordinates phase 2 works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Phase2Cube {
    slice2: u16,
    urf_to_dlf: u16,
    ur_to_df: u16,
    parity: u8,
}

impl Phase2Cube {
    fn moved(self, m: Move, mv: &MoveTables) -> Self {
        let m = m as usize;
        Self {
            slice2: mv.fr_to_br_move[N_MOVE * self.slice2 as usize + m],
            urf_to_dlf: mv.urf_to_dlf_move[N_MOVE * self.urf_to_dlf as usize + m],
            ur_to_df: mv.ur_to_df_move[N_MOVE * self.ur_to_df as usize + m],
            parity: PARITY_MOVE[self.parity as usize][m],
        }
    }

    fn bound(&self, pr: &PruningTables) -> usize {
        pr.phase2_bound(self.slice2, self.urf_to_dlf, self.ur_to_df, self.parity) as usize
    }

    fn is_solved(&self) -> bool {
        self.slice2 == 0 && self.urf_to_dlf == 0 && self.ur_to_df == 0 && self.parity == 0
    }
}

/// State of one solve: the moves so far, the coordinates after each phase 1 move and the best
/// solution found. Owned by a single call, only the tables are shared.
struct Search<'a> {
    tables: &'a Tables,
    config: &'a SolverConfig,
    deadline: Option<Instant>,
    sofar_phase1: Vec<Move>,
    sofar_phase2: Vec<Move>,
    // trail[n] holds the coordinates after the first n phase 1 moves
    trail: Vec<CoordCube>,
    best: Option<Solution>,
    nodes: u64,
    timed_out: bool,
}

impl<'a> Search<'a> {
    fn new(tables: &'a Tables, config: &'a SolverConfig, start: Instant) -> Self {
        Self {
            tables,
            config,
            deadline: config.timeout.map(|t| start + t),
            sofar_phase1: Vec::with_capacity(config.max_length),
            sofar_phase2: Vec::with_capacity(config.max_phase2_length),
            trail: Vec::with_capacity(config.max_length + 1),
            best: None,
            nodes: 0,
            timed_out: false,
        }
    }

    fn expired(&mut self) -> bool {
        if !self.timed_out {
            if let Some(deadline) = self.deadline {
                self.timed_out = Instant::now() >= deadline;
            }
        }
        self.timed_out
    }

    /// Iterative deepening over the phase 1 length.
    fn run(&mut self, start: CoordCube) {
        let min_depth = self
            .tables
            .pr
            .phase1_bound(start.slice(), start.twist, start.flip) as usize;
        self.trail.push(start);
        for depth1 in min_depth..=self.config.max_length {
            if let Some(best) = &self.best {
                let go_on = matches!(self.config.policy, SearchPolicy::Target(_));
                if !go_on || best.len() <= depth1 {
                    break;
                }
            }
            let stop = if depth1 == 0 {
                self.phase2_start(0)
            } else {
                self.phase1_search(depth1)
            };
            debug!("phase 1 depth {} done, {} nodes", depth1, self.nodes);
            if stop || self.timed_out {
                break;
            }
        }
    }

    /// Depth first search for phase 1 solutions of exactly `depth1` moves. Returns true if
    /// the whole search has to stop.
    fn phase1_search(&mut self, depth1: usize) -> bool {
        let tables = self.tables;
        let n = self.sofar_phase1.len();
        let cube = self.trail[n];
        for m in ALL_MOVES {
            if let Some(&prev) = self.sofar_phase1.last() {
                if m.is_redundant_after(prev) {
                    continue;
                }
            }
            if self.expired() {
                return true;
            }
            self.nodes += 1;
            let next = cube.moved(m, &tables.mv);
            let dist = tables.pr.phase1_bound(next.slice(), next.twist, next.flip) as usize;
            let n1 = n + 1;
            let stop = if dist == 0 && n1 + PHASE1_TAIL > depth1 {
                // H close to the end of phase 1, the remaining moves are left to phase 2
                n1 == depth1 && self.descend(m, next, |s| s.phase2_start(depth1))
            } else if n1 + dist <= depth1 {
                self.descend(m, next, |s| s.phase1_search(depth1))
            } else {
                false
            };
            if stop {
                return true;
            }
        }
        false
    }

    fn descend(&mut self, m: Move, next: CoordCube, f: impl FnOnce(&mut Self) -> bool) -> bool {
        self.sofar_phase1.push(m);
        self.trail.push(next);
        let stop = f(self);
        self.sofar_phase1.pop();
        self.trail.pop();
        stop
    }

    /// Phase 1 is done after `depth1` moves. Search phase 2 and record a solution if one is
    /// found. Returns true if the whole search has to stop.
    fn phase2_start(&mut self, depth1: usize) -> bool {
        let tables = self.tables;
        let cube = self.trail[depth1];
        let Some(ur_to_df) = cube.ur_to_df else {
            return false;
        };
        let mut max_depth2 = self
            .config
            .max_phase2_length
            .min(self.config.max_length - depth1);
        if let Some(best) = &self.best {
            // only strictly shorter solutions are of interest
            match best.len().checked_sub(depth1 + 1) {
                Some(d) => max_depth2 = max_depth2.min(d),
                None => return false,
            }
        }
        let start = Phase2Cube {
            slice2: cube.slice2(),
            urf_to_dlf: cube.urf_to_dlf,
            ur_to_df,
            parity: cube.parity,
        };
        let min_depth2 = start.bound(&tables.pr);
        if min_depth2 > max_depth2 {
            return false;
        }
        let mut found = false;
        for depth2 in min_depth2..=max_depth2 {
            if self.phase2_search(start, depth2) {
                found = true;
                break;
            }
            if self.timed_out {
                return true;
            }
        }
        if !found {
            return false;
        }

        let phase2 = std::mem::take(&mut self.sofar_phase2);
        let solution = Solution {
            solution: self.sofar_phase1.iter().chain(&phase2).copied().collect(),
            phase1_length: depth1,
            solve_time: Duration::ZERO,
        };
        let total = solution.len();
        debug!(
            "solution with {} moves ({} + {}) after {} nodes",
            total,
            depth1,
            phase2.len(),
            self.nodes
        );
        self.best = Some(solution);
        match self.config.policy {
            SearchPolicy::FirstSolution => true,
            SearchPolicy::FinishDepth => total <= depth1,
            SearchPolicy::Target(target) => total <= target || total <= depth1,
        }
    }

    /// Depth first search for a phase 2 solution of exactly `togo` moves. On success the
    /// moves are left in `sofar_phase2`.
    fn phase2_search(&mut self, cube: Phase2Cube, togo: usize) -> bool {
        if togo == 0 {
            return cube.is_solved();
        }
        let tables = self.tables;
        for m in PHASE2_MOVES {
            // the first phase 2 move also has to fit the last phase 1 move
            let prev = self.sofar_phase2.last().or(self.sofar_phase1.last());
            if prev.is_some_and(|&p| m.is_redundant_after(p)) {
                continue;
            }
            if self.expired() {
                return false;
            }
            self.nodes += 1;
            let next = cube.moved(m, &tables.mv);
            if next.bound(&tables.pr) >= togo {
                continue;
            }
            self.sofar_phase2.push(m);
            if self.phase2_search(next, togo - 1) {
                return true;
            }
            self.sofar_phase2.pop();
        }
        false
    }
}

#[cfg(test)]
mod test {
    use lazy_static::lazy_static;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::moves::Move::*;
    use crate::solver::*;

    lazy_static! {
        static ref TABLES: Tables = Tables::build();
    }

    fn facelets_after(moves: &[Move]) -> String {
        CubieCube::default().apply_moves(moves).to_string()
    }

    fn assert_solves(facelets: &str, solution: &Solution) {
        let cc = CubieCube::try_from(facelets).unwrap();
        assert!(
            cc.apply_moves(&solution.solution).is_solved(),
            "{} does not solve {}",
            solution,
            facelets
        );
    }

    #[test]
    fn test_solved_cube() {
        let result = solve_with(&TABLES, SOLVED_FACELETS, &SolverConfig::default()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.to_string(), "");
        let result = solve_with(
            &TABLES,
            SOLVED_FACELETS,
            &SolverConfig::default().max_length(0),
        )
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_move() {
        let facelets = facelets_after(&[R]);
        let result = solve_with(&TABLES, &facelets, &SolverConfig::default()).unwrap();
        assert_eq!(result.solution, vec![R3]);
        assert_eq!(result.to_string(), "R'");
        let config = SolverConfig::default()
            .max_length(1)
            .policy(SearchPolicy::FirstSolution);
        let result = solve_with(&TABLES, &facelets, &config).unwrap();
        assert_eq!(result.solution, vec![R3]);
    }

    #[test]
    fn test_phase2_only() {
        let scramble = [U, R2, D3, F2];
        let facelets = facelets_after(&scramble);
        let result = solve_with(&TABLES, &facelets, &SolverConfig::default()).unwrap();
        assert_eq!(result.phase1_length, 0);
        assert!(result.len() <= scramble.len());
        assert_solves(&facelets, &result);
    }

    #[test]
    fn test_no_solution_within_bound() {
        let facelets = facelets_after(&[R, U]);
        let config = SolverConfig::default().max_length(1);
        let err = solve_with(&TABLES, &facelets, &config).unwrap_err();
        assert!(matches!(err, Error::NoSolution { max_length: 1 }));
        assert!(solution_with(&TABLES, &facelets, &config).starts_with("Error 7"));
        let result = solve_with(&TABLES, &facelets, &config.max_length(2)).unwrap();
        assert_eq!(result.solution, vec![U3, R3]);
    }

    #[test]
    fn test_random_cubes() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..3 {
            let mut cc = CubieCube::default();
            cc.randomize_with(&mut rng);
            let facelets = cc.to_string();
            let result = solve_with(&TABLES, &facelets, &SolverConfig::default()).unwrap();
            assert!(result.len() <= DEFAULT_MAX_LENGTH);
            assert!(result.phase2().len() <= DEFAULT_MAX_PHASE2_LENGTH);
            assert_solves(&facelets, &result);
        }
    }

    #[test]
    fn test_target_policy() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cc = CubieCube::default();
        cc.randomize_with(&mut rng);
        let facelets = &cc.to_string();
        let first = solve_with(
            &TABLES,
            facelets,
            &SolverConfig::default().policy(SearchPolicy::FirstSolution),
        )
        .unwrap();
        let config = SolverConfig::default()
            .policy(SearchPolicy::Target(20))
            .timeout(Some(Duration::from_secs(10)));
        let target = solve_with(&TABLES, facelets, &config).unwrap();
        assert!(target.len() <= first.len());
        assert_solves(facelets, &first);
        assert_solves(facelets, &target);
    }

    #[test]
    fn test_timeout_without_solution() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut cc = CubieCube::default();
        cc.randomize_with(&mut rng);
        let config = SolverConfig::default().timeout(Some(Duration::ZERO));
        let err = solve_cubie(&TABLES, &cc, &config).unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert_eq!(err.code(), Some(8));
    }

    #[test]
    fn test_separator() {
        let facelets = facelets_after(&[F, U2]);
        let config = SolverConfig::default().separator(true);
        let result = solve_with(&TABLES, &facelets, &config).unwrap();
        assert_eq!(result.solution, vec![U2, F3]);
        assert_eq!(result.phase1_length, 2);
        assert_eq!(result.to_string_with_separator(true), "U2 F' .");
        assert_eq!(solution_with(&TABLES, &facelets, &config), "U2 F' .");

        // no dot without phase 1 moves
        let facelets = facelets_after(&[U]);
        let result = solve_with(&TABLES, &facelets, &config).unwrap();
        assert_eq!(result.phase1_length, 0);
        assert_eq!(solution_with(&TABLES, &facelets, &config), "U'");
        let phase2_only = Solution {
            solution: vec![U2, R2],
            ..Default::default()
        };
        assert_eq!(phase2_only.to_string_with_separator(true), "U2 R2");
        assert_eq!(Solution::default().to_string_with_separator(true), "");
    }

    #[test]
    fn test_invalid_cubes() {
        let config = SolverConfig::default();
        let code = |facelets: &str| {
            solve_with(&TABLES, facelets, &config)
                .unwrap_err()
                .code()
                .unwrap()
        };
        let swap = |i: usize, j: usize| {
            let mut f: Vec<char> = SOLVED_FACELETS.chars().collect();
            f.swap(i, j);
            f.into_iter().collect::<String>()
        };
        assert_eq!(code("UUUUUUUUURRRRRRRRR"), 1);
        // U2 and D2 exchanged: two DB and two UF edges
        assert_eq!(code(&swap(1, 28)), 2);
        // UR flipped
        assert_eq!(code(&swap(5, 10)), 3);
        // U9 and D3 exchanged: the URF corner has colors D, R, F
        assert_eq!(code(&swap(8, 29)), 4);
        // URF twisted
        let mut f: Vec<char> = SOLVED_FACELETS.chars().collect();
        (f[8], f[9], f[20]) = ('F', 'U', 'R');
        assert_eq!(code(&f.into_iter().collect::<String>()), 5);
        // UR and UF exchanged
        assert_eq!(code(&swap(10, 19)), 6);
        assert!(solution_with(&TABLES, &swap(10, 19), &config).starts_with("Error 6"));
    }
}

//! Persist all tables in one binary file.
//!
//! The file holds a magic tag, a format version and a 64 bit FxHash of the payload. The payload
//! holds the seven move tables in the order twist, flip, fr_to_br, urf_to_dlf, ur_to_df,
//! ur_to_ul, ub_to_df, the edge merge table and the four pruning tables
//! slice_urf_to_dlf_parity, slice_ur_to_df_parity, slice_twist, slice_flip.
//! All integers are little endian with fixed width, every table is prefixed by its length.
use std::env;
use std::ffi::OsString;
use std::fs;
use std::hash::Hasher;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use bincode::config::{self, Config};
use fxhash::FxHasher64;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::Error;
use crate::moves::{MoveTables, MERGE_COLLISION};
use crate::pruning::{NibbleArray, PruningTables};
use crate::solver::Tables;

const MAGIC: [u8; 8] = *b"TWOPHASE";
const VERSION: u32 = 2;

/// Environment variable overriding the default cache location.
pub const CACHE_ENV: &str = "TWOPHASE_CACHE";

fn bincode_config() -> impl Config {
    config::standard().with_fixed_int_encoding()
}

#[derive(Serialize, Deserialize)]
struct Header {
    magic: [u8; 8],
    version: u32,
    checksum: u64,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    twist_move: &'a [u16],
    flip_move: &'a [u16],
    fr_to_br_move: &'a [u16],
    urf_to_dlf_move: &'a [u16],
    ur_to_df_move: &'a [u16],
    ur_to_ul_move: &'a [u16],
    ub_to_df_move: &'a [u16],
    merge_ur_to_df: &'a [u16],
    slice_urf_to_dlf_parity: &'a NibbleArray,
    slice_ur_to_df_parity: &'a NibbleArray,
    slice_twist: &'a NibbleArray,
    slice_flip: &'a NibbleArray,
}

/// Owned counterpart of [SnapshotRef], same field order.
#[derive(Deserialize)]
struct Snapshot {
    twist_move: Vec<u16>,
    flip_move: Vec<u16>,
    fr_to_br_move: Vec<u16>,
    urf_to_dlf_move: Vec<u16>,
    ur_to_df_move: Vec<u16>,
    ur_to_ul_move: Vec<u16>,
    ub_to_df_move: Vec<u16>,
    merge_ur_to_df: Vec<u16>,
    slice_urf_to_dlf_parity: NibbleArray,
    slice_ur_to_df_parity: NibbleArray,
    slice_twist: NibbleArray,
    slice_flip: NibbleArray,
}

/// Resolve the cache file: `explicit` if given, then `$TWOPHASE_CACHE`, then
/// `<cache dir>/twophase/tables.bin`, then `twophase_tables.bin` in the working directory.
pub fn cache_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env::var_os(CACHE_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    match dirs::cache_dir() {
        Some(dir) => dir.join("twophase").join("tables.bin"),
        None => PathBuf::from("twophase_tables.bin"),
    }
}

pub fn encode(tables: &Tables) -> Result<Vec<u8>, Error> {
    let (mv, pr) = (&tables.mv, &tables.pr);
    let snapshot = SnapshotRef {
        twist_move: &mv.twist_move,
        flip_move: &mv.flip_move,
        fr_to_br_move: &mv.fr_to_br_move,
        urf_to_dlf_move: &mv.urf_to_dlf_move,
        ur_to_df_move: &mv.ur_to_df_move,
        ur_to_ul_move: &mv.ur_to_ul_move,
        ub_to_df_move: &mv.ub_to_df_move,
        merge_ur_to_df: &mv.merge_ur_to_df,
        slice_urf_to_dlf_parity: &pr.slice_urf_to_dlf_parity,
        slice_ur_to_df_parity: &pr.slice_ur_to_df_parity,
        slice_twist: &pr.slice_twist,
        slice_flip: &pr.slice_flip,
    };
    let payload = bincode::serde::encode_to_vec(&snapshot, bincode_config())?;
    let header = Header {
        magic: MAGIC,
        version: VERSION,
        checksum: checksum(&payload),
    };
    let mut bytes = bincode::serde::encode_to_vec(&header, bincode_config())?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn checksum(payload: &[u8]) -> u64 {
    let mut hasher = FxHasher64::default();
    hasher.write(payload);
    hasher.finish()
}

/// Decode and validate a snapshot. Any deviation from the layout is an error.
pub fn decode(bytes: &[u8]) -> Result<Tables, Error> {
    let (header, read): (Header, usize) =
        bincode::serde::decode_from_slice(bytes, bincode_config())?;
    if header.magic != MAGIC {
        return Err(Error::CorruptCache("bad magic"));
    }
    if header.version != VERSION {
        return Err(Error::CorruptCache("unsupported version"));
    }
    let payload = &bytes[read..];
    if checksum(payload) != header.checksum {
        return Err(Error::CorruptCache("checksum"));
    }
    let (snapshot, read): (Snapshot, usize) =
        bincode::serde::decode_from_slice(payload, bincode_config())?;
    if read != payload.len() {
        return Err(Error::CorruptCache("trailing bytes"));
    }
    check_move_table(&snapshot.twist_move, N_TWIST)?;
    check_move_table(&snapshot.flip_move, N_FLIP)?;
    check_move_table(&snapshot.fr_to_br_move, N_FR_TO_BR)?;
    check_move_table(&snapshot.urf_to_dlf_move, N_URF_TO_DLF)?;
    check_move_table(&snapshot.ur_to_df_move, N_UR_TO_DF)?;
    check_move_table(&snapshot.ur_to_ul_move, N_UR_TO_UL)?;
    check_move_table(&snapshot.ub_to_df_move, N_UB_TO_DF)?;
    if snapshot.merge_ur_to_df.len() != N_MERGE * N_MERGE
        || snapshot
            .merge_ur_to_df
            .iter()
            .any(|&v| v != MERGE_COLLISION && v as usize >= N_UR_TO_DF)
    {
        return Err(Error::CorruptCache("merge table"));
    }
    check_pruning_table(
        &snapshot.slice_urf_to_dlf_parity,
        N_SLICE2 * N_URF_TO_DLF * N_PARITY,
    )?;
    check_pruning_table(
        &snapshot.slice_ur_to_df_parity,
        N_SLICE2 * N_UR_TO_DF * N_PARITY,
    )?;
    check_pruning_table(&snapshot.slice_twist, N_SLICE1 * N_TWIST)?;
    check_pruning_table(&snapshot.slice_flip, N_SLICE1 * N_FLIP)?;

    Ok(Tables {
        mv: MoveTables {
            twist_move: snapshot.twist_move,
            flip_move: snapshot.flip_move,
            fr_to_br_move: snapshot.fr_to_br_move,
            urf_to_dlf_move: snapshot.urf_to_dlf_move,
            ur_to_df_move: snapshot.ur_to_df_move,
            ur_to_ul_move: snapshot.ur_to_ul_move,
            ub_to_df_move: snapshot.ub_to_df_move,
            merge_ur_to_df: snapshot.merge_ur_to_df,
        },
        pr: PruningTables {
            slice_urf_to_dlf_parity: snapshot.slice_urf_to_dlf_parity,
            slice_ur_to_df_parity: snapshot.slice_ur_to_df_parity,
            slice_twist: snapshot.slice_twist,
            slice_flip: snapshot.slice_flip,
        },
    })
}

fn check_move_table(table: &[u16], size: usize) -> Result<(), Error> {
    if table.len() != size * N_MOVE || table.iter().any(|&v| v as usize >= size) {
        return Err(Error::CorruptCache("move table"));
    }
    Ok(())
}

fn check_pruning_table(table: &NibbleArray, size: usize) -> Result<(), Error> {
    if table.len() != size || !table.is_consistent() {
        return Err(Error::CorruptCache("pruning table"));
    }
    Ok(())
}

/// Write the tables to `path`. The data goes to a temporary sibling first and is then renamed,
/// so a reader never sees a partial file.
pub fn store(path: &Path, tables: &Tables) -> Result<(), Error> {
    let encoded = encode(tables)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    if let Err(e) = fs::write(&tmp, encoded).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

pub fn load(path: &Path) -> Result<Tables, Error> {
    let bytes = fs::read(path)?;
    decode(&bytes)
}

/// Load the tables from `path`. If that fails for any reason the tables are built and written
/// back to `path`.
pub fn load_or_build(path: &Path) -> Tables {
    let start = Instant::now();
    match load(path) {
        Ok(tables) => {
            info!("tables loaded from {} in {:?}", path.display(), start.elapsed());
            return tables;
        }
        Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
            info!("no table cache at {}, building tables", path.display());
        }
        Err(e) => {
            warn!("ignoring table cache {}: {}", path.display(), e);
        }
    }
    let tables = Tables::build();
    match store(path, &tables) {
        Ok(()) => info!("tables written to {}", path.display()),
        Err(e) => warn!("cannot write table cache {}: {}", path.display(), e),
    }
    tables
}

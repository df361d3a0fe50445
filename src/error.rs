use thiserror::Error;

/// Everything that can go wrong between a facelet string and a solution.
///
/// The first eight variants carry the classic numeric markers of the two phase solver,
/// see [Error::code].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error 1: there is not exactly one facelet of each colour")]
    InvalidFaceletString,
    #[error("Error 2: not all 12 edges exist exactly once")]
    InvalidEdges,
    #[error("Error 3: flip error, one edge has to be flipped")]
    FlipError,
    #[error("Error 4: not all corners exist exactly once")]
    InvalidCorners,
    #[error("Error 5: twist error, one corner has to be twisted")]
    TwistError,
    #[error("Error 6: parity error, two corners or two edges have to be exchanged")]
    ParityError,
    #[error("Error 7: no solution exists for the given maximum move number {max_length}")]
    NoSolution { max_length: usize },
    #[error("Error 8: timeout, no solution within given time")]
    Timeout,
    #[error("invalid move `{0}`")]
    InvalidMove(String),
    #[error("table cache is corrupt: {0}")]
    CorruptCache(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),
    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),
}

impl Error {
    /// The numeric marker of the error, `None` for errors a solve never reports.
    pub fn code(&self) -> Option<u8> {
        match self {
            Error::InvalidFaceletString => Some(1),
            Error::InvalidEdges => Some(2),
            Error::FlipError => Some(3),
            Error::InvalidCorners => Some(4),
            Error::TwistError => Some(5),
            Error::ParityError => Some(6),
            Error::NoSolution { .. } => Some(7),
            Error::Timeout => Some(8),
            _ => None,
        }
    }

    /// True for errors caused by a malformed or physically impossible cube.
    pub fn is_invalid_cube(&self) -> bool {
        matches!(self.code(), Some(1..=6))
    }
}

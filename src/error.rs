use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Board needs at least one row and one column")]
    InvalidDimensions,
    #[error("Mine count must stay below the cell count")]
    TooManyMines,
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Round already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = std::result::Result<T, BoardError>;

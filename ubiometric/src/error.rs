use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    //
    // 1st party
    //
    #[error("Home directory not found")]
    HomeDirNotFound,
    #[error("Helper not found: {0}")]
    HelperNotFound(String),
    #[error("Helper failed: {} exited with {status}", path.display())]
    HelperFailure { path: PathBuf, status: std::process::ExitStatus },
    #[error("Main queue closed")]
    MainQueueClosed,

    //
    // 2d party
    //
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),
}

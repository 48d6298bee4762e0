use block_dev::BlockError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no volume is mounted")]
    NotMounted,
    #[error("invalid volume: {0}")]
    InvalidVolume(&'static str),
    #[error("invalid argument")]
    InvalidArgument,
    #[error("file not found")]
    NotFound,
    #[error("conflicting file state")]
    Conflict,
    #[error("volume has open file descriptors")]
    Busy,
    #[error("resource exhausted")]
    ResourceExhausted,
    #[error("block device error: {0}")]
    Io(#[from] BlockError),
}

pub type Result<T> = core::result::Result<T, Error>;

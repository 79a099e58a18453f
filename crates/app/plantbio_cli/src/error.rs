use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Auth(#[from] plantbio_core::auth::AuthError),

    #[error("Storage: {}", .0)]
    Storage(#[from] plantbio_core::storage::StorageError),
}

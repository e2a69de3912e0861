use netris_client::{ClientError, Endpoint};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to fetch {endpoint}: {source}")]
    Fetch {
        endpoint: Endpoint,
        #[source]
        source: ClientError,
    },
}

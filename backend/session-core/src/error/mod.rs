pub mod api;
pub mod config;
pub mod router;
pub mod storage;

pub use api::ApiError;
pub use config::ConfigError;
pub use router::RouterError;
pub use storage::StorageError;

use models::ModelError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] api::ApiError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Router(#[from] router::RouterError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

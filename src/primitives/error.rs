use thiserror::Error;

#[derive(Error, Debug)]
pub enum InternalError {
    #[error("InternalError - JoinError: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("InternalError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("InternalError - Migrate: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("InternalError - Io: {0}")]
    Io(#[from] std::io::Error),
}

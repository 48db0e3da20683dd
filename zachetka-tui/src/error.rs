use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

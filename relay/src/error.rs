use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("chain error: {0}")]
    Chain(#[from] coldlink_evm::EvmError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

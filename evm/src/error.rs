use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvmError {
    #[error("failed to connect to node at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("timed out connecting to node at {0}")]
    ConnectTimeout(String),

    #[error("transport closed")]
    TransportClosed,

    #[error("request {0} timed out")]
    RequestTimeout(String),

    #[error("node rejected {method}: {message} (code {code})")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("unexpected response shape for {method}: {detail}")]
    Response { method: String, detail: String },

    #[error("failed to decode log: {0}")]
    Decode(String),

    #[error("invalid contract or signer address: {0}")]
    InvalidAddress(String),
}

//! Production [`ChainLink`] backed by `coldlink-evm`.

use async_trait::async_trait;

use coldlink_evm::{establish, EvmControl, EvmEndpoint};

use crate::error::RelayError;
use crate::supervisor::{ChainControl, ChainLink, ChainSession};

/// Connects the supervisor to a real Ethereum node.
pub struct EvmChainLink {
    endpoint: EvmEndpoint,
}

impl EvmChainLink {
    pub fn new(endpoint: EvmEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ChainLink for EvmChainLink {
    async fn connect(&self) -> Result<ChainSession, RelayError> {
        let (control, events) = establish(&self.endpoint).await?;
        Ok(ChainSession {
            control: Box::new(EvmChainControl { inner: control }),
            events,
        })
    }
}

struct EvmChainControl {
    inner: EvmControl,
}

#[async_trait]
impl ChainControl for EvmChainControl {
    async fn probe(&self) -> Result<(), RelayError> {
        self.inner.probe().await.map_err(RelayError::from)
    }

    fn disconnect(&self) {
        self.inner.disconnect();
    }
}

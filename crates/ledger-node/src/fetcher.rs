use crate::constants::CHAIN_PATH;
use async_trait::async_trait;
use ledger_core::{ChainFetcher, FetchError, PeerChain};
use reqwest::Client;
use std::time::Duration;

/// Pulls `{length, chain}` from `http://{peer}/get_chain`.
#[derive(Clone, Debug)]
pub struct HttpChainFetcher {
    client: Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        // Peers are dialled directly, never through a proxy.
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError> {
        let url = format!("http://{peer}{CHAIN_PATH}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Malformed(format!("{url} answered {status}")));
        }
        response.json::<PeerChain>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Malformed(e.to_string())
            } else {
                FetchError::Unreachable(e.to_string())
            }
        })
    }
}

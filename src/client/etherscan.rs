use serde::Deserialize;

use super::{build_url, HttpFetcher, QueryParams, RequestTarget};
use crate::error::FetchError;
use crate::models::RawTransaction;
use crate::retry::RetryPolicy;

pub const ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/api";

const DEFAULT_START_BLOCK: &str = "0";
const DEFAULT_END_BLOCK: &str = "99999999";

#[derive(Debug, Deserialize)]
struct EtherscanEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Client for the Etherscan account API. Authenticates with an API key
/// passed as a query parameter.
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    fetcher: HttpFetcher,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanClient {
    pub fn new(api_key: Option<String>) -> Result<Self, FetchError> {
        Self::with_options(ETHERSCAN_BASE_URL, api_key, RetryPolicy::default())
    }

    pub fn with_options(
        base_url: &str,
        api_key: Option<String>,
        policy: RetryPolicy,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: HttpFetcher::new(policy)?,
            base_url: base_url.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Latest transactions of `address`, newest first.
    pub async fn account_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<RawTransaction>, FetchError> {
        self.fetch_transactions(address, DEFAULT_START_BLOCK, DEFAULT_END_BLOCK)
            .await
    }

    pub async fn fetch_transactions(
        &self,
        address: &str,
        start_block: &str,
        end_block: &str,
    ) -> Result<Vec<RawTransaction>, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::validation("Etherscan API key is required"))?;
        if address.trim().is_empty() {
            return Err(FetchError::validation("Wallet address is required"));
        }

        let mut params = QueryParams::new();
        params
            .push("module", "account")
            .push("action", "txlist")
            .push("address", address)
            .push("startblock", start_block)
            .push("endblock", end_block)
            .push("sort", "desc");

        // `params` is what gets logged; only the request url carries the key.
        let mut authed = params.clone();
        authed.push("apikey", api_key);
        let url = build_url(&self.base_url, "", &authed)?;

        let body = self
            .fetcher
            .get_body(
                RequestTarget {
                    network: "etherscan",
                    base_url: &self.base_url,
                    endpoint: "txlist",
                    params: &params,
                },
                &url,
            )
            .await?;

        let envelope: EtherscanEnvelope = serde_json::from_str(&body)?;
        if envelope.status != "1" {
            let message = if envelope.message.is_empty() {
                format!("Etherscan API error: {}", envelope.result)
            } else {
                envelope.message
            };
            return Err(FetchError::Api(message));
        }

        Ok(serde_json::from_value(envelope.result)?)
    }
}

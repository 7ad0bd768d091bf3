//! HTTP plumbing shared by the explorer clients: query building, status
//! mapping, and the retry loop.

mod etherscan;
mod zksync;

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;
use crate::retry::{execute_with_retry, RetryPolicy};

pub use etherscan::{EtherscanClient, ETHERSCAN_BASE_URL};
pub use zksync::{ClientRegistry, ExplorerClient};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Flat query parameters; unset values never reach the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Pagination {
    pub fn query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub page: Pagination,
    pub from: Option<String>,
    pub to: Option<String>,
    pub tx_type: Option<String>,
    pub status: Option<String>,
}

impl TransactionFilter {
    pub fn query(&self) -> QueryParams {
        let mut params = self.page.query();
        params
            .push_opt("from", self.from.as_deref())
            .push_opt("to", self.to.as_deref())
            .push_opt("type", self.tx_type.as_deref())
            .push_opt("status", self.status.as_deref());
        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockRange {
    pub page: Pagination,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl BlockRange {
    pub fn query(&self) -> QueryParams {
        let mut params = self.page.query();
        params.push_opt("from", self.from).push_opt("to", self.to);
        params
    }
}

/// Joins `base` and `endpoint` and appends `params` as the query string.
pub fn build_url(base: &str, endpoint: &str, params: &QueryParams) -> Result<Url, FetchError> {
    let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), endpoint))?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.0.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

/// Where a request is going, for logs. Never carries credentials.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestTarget<'a> {
    pub network: &'a str,
    pub base_url: &'a str,
    pub endpoint: &'a str,
    pub params: &'a QueryParams,
}

#[derive(Debug, Clone)]
pub(crate) struct HttpFetcher {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(policy: RetryPolicy) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GETs `url` with retries and returns the body of the 2xx response.
    pub async fn get_body(&self, target: RequestTarget<'_>, url: &Url) -> Result<String, FetchError> {
        execute_with_retry(&self.policy, |retry| async move {
            debug!(
                network = target.network,
                endpoint = target.endpoint,
                params = ?target.params,
                retry_count = retry,
                "fetching {}{}",
                target.base_url,
                target.endpoint
            );
            let result = self.get_once(target.endpoint, url).await;
            if let Err(err) = &result {
                warn!(
                    network = target.network,
                    endpoint = target.endpoint,
                    params = ?target.params,
                    retry_count = retry,
                    url = %format!("{}{}", target.base_url, target.endpoint),
                    "API error: {}",
                    err
                );
            }
            result
        })
        .await
    }

    async fn get_once(&self, endpoint: &str, url: &Url) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), endpoint, body));
        }
        Ok(body)
    }
}

/// Response wrappings the zkSync-style explorers are seen to use.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped {
        data: T,
        #[serde(default)]
        error: Option<String>,
    },
    Result {
        result: T,
    },
    Failed {
        error: String,
    },
    Bare(T),
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    match serde_json::from_str::<Envelope<T>>(body)? {
        Envelope::Wrapped {
            error: Some(error), ..
        }
        | Envelope::Failed { error } => Err(FetchError::Api(error)),
        Envelope::Wrapped { data, error: None } => Ok(data),
        Envelope::Result { result } => Ok(result),
        Envelope::Bare(value) => Ok(value),
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::de::DeserializeOwned;

use super::{
    build_url, decode_envelope, BlockRange, HttpFetcher, Pagination, QueryParams, RequestTarget,
    TransactionFilter,
};
use crate::error::FetchError;
use crate::models::{
    Account, Batch, Block, NetworkStats, NetworkStatus, Proof, Token, Transfer, ZkSyncTransaction,
};
use crate::network::{Endpoint, Network, NetworkUrls};
use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
struct Target {
    network: Network,
    base_url: String,
}

/// Client for the zkSync-style explorer REST API.
///
/// The selected network can be switched at runtime with [`set_network`];
/// each request snapshots the base URL when it starts, so requests already
/// in flight keep their original target.
///
/// [`set_network`]: ExplorerClient::set_network
#[derive(Debug)]
pub struct ExplorerClient {
    fetcher: HttpFetcher,
    urls: NetworkUrls,
    target: RwLock<Target>,
    pinned: bool,
}

impl ExplorerClient {
    pub fn new(network: Network) -> Result<Self, FetchError> {
        Self::with_options(network, NetworkUrls::default(), RetryPolicy::default())
    }

    pub fn with_options(
        network: Network,
        urls: NetworkUrls,
        policy: RetryPolicy,
    ) -> Result<Self, FetchError> {
        let target = Target {
            network,
            base_url: urls.base_url(network).to_string(),
        };
        Ok(Self {
            fetcher: HttpFetcher::new(policy)?,
            urls,
            target: RwLock::new(target),
            pinned: false,
        })
    }

    fn pin(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Whether the client is locked to its initial network, as registry clients are.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn network(&self) -> Network {
        self.snapshot().network
    }

    pub fn base_url(&self) -> String {
        self.snapshot().base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.fetcher.policy()
    }

    /// Points subsequent requests at `network`. Last writer wins.
    /// Pinned clients keep their network and only log the attempt.
    pub fn set_network(&self, network: Network) {
        let mut target = self.target.write().unwrap_or_else(PoisonError::into_inner);
        if target.network != network && self.pinned {
            tracing::warn!(
                "explorer client is pinned to {}; ignoring switch to {}",
                target.network,
                network
            );
            return;
        }
        if target.network != network {
            tracing::info!("switching explorer client {} -> {}", target.network, network);
            target.network = network;
            target.base_url = self.urls.base_url(network).to_string();
        }
    }

    fn snapshot(&self) -> Target {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// GETs `endpoint` on the current network and decodes the payload.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams,
    ) -> Result<T, FetchError> {
        let target = self.snapshot();
        let url = build_url(&target.base_url, endpoint, params)?;
        let network = target.network.to_string();
        let body = self
            .fetcher
            .get_body(
                RequestTarget {
                    network: &network,
                    base_url: &target.base_url,
                    endpoint,
                    params,
                },
                &url,
            )
            .await?;
        decode_envelope(&body)
    }

    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<ZkSyncTransaction>, FetchError> {
        self.request(&Endpoint::Transactions.path(), &filter.query())
            .await
    }

    pub async fn transaction(&self, hash: &str) -> Result<ZkSyncTransaction, FetchError> {
        self.request(&Endpoint::Transaction.path_with(hash)?, &QueryParams::new())
            .await
    }

    pub async fn blocks(&self, range: &BlockRange) -> Result<Vec<Block>, FetchError> {
        self.request(&Endpoint::Blocks.path(), &range.query()).await
    }

    pub async fn block(&self, number: u64) -> Result<Block, FetchError> {
        self.request(
            &Endpoint::Block.path_with(&number.to_string())?,
            &QueryParams::new(),
        )
        .await
    }

    pub async fn accounts(&self, page: &Pagination) -> Result<Vec<Account>, FetchError> {
        self.request(&Endpoint::Accounts.path(), &page.query()).await
    }

    pub async fn account(&self, address: &str) -> Result<Account, FetchError> {
        self.request(&Endpoint::Account.path_with(address)?, &QueryParams::new())
            .await
    }

    pub async fn account_transactions(
        &self,
        address: &str,
        page: &Pagination,
    ) -> Result<Vec<ZkSyncTransaction>, FetchError> {
        if address.trim().is_empty() {
            return Err(FetchError::validation("Account address is required"));
        }
        self.request(
            &Endpoint::AccountTransactions.path_with(address)?,
            &page.query(),
        )
        .await
    }

    pub async fn account_transfers(
        &self,
        address: &str,
        page: &Pagination,
    ) -> Result<Vec<Transfer>, FetchError> {
        self.request(&Endpoint::AccountTransfers.path_with(address)?, &page.query())
            .await
    }

    pub async fn tokens(&self, page: &Pagination) -> Result<Vec<Token>, FetchError> {
        self.request(&Endpoint::Tokens.path(), &page.query()).await
    }

    pub async fn token(&self, address: &str) -> Result<Token, FetchError> {
        self.request(&Endpoint::Token.path_with(address)?, &QueryParams::new())
            .await
    }

    pub async fn transfers(&self, page: &Pagination) -> Result<Vec<Transfer>, FetchError> {
        self.request(&Endpoint::Transfers.path(), &page.query()).await
    }

    pub async fn transfer(&self, hash: &str) -> Result<Transfer, FetchError> {
        self.request(&Endpoint::Transfer.path_with(hash)?, &QueryParams::new())
            .await
    }

    pub async fn batches(&self, page: &Pagination) -> Result<Vec<Batch>, FetchError> {
        self.request(&Endpoint::Batches.path(), &page.query()).await
    }

    pub async fn batch(&self, number: u64) -> Result<Batch, FetchError> {
        self.request(
            &Endpoint::Batch.path_with(&number.to_string())?,
            &QueryParams::new(),
        )
        .await
    }

    pub async fn proofs(&self, page: &Pagination) -> Result<Vec<Proof>, FetchError> {
        self.request(&Endpoint::Proofs.path(), &page.query()).await
    }

    pub async fn proof(&self, id: &str) -> Result<Proof, FetchError> {
        self.request(&Endpoint::Proof.path_with(id)?, &QueryParams::new())
            .await
    }

    pub async fn network_stats(&self) -> Result<NetworkStats, FetchError> {
        self.request(&Endpoint::NetworkStats.path(), &QueryParams::new())
            .await
    }

    pub async fn network_status(&self) -> Result<NetworkStatus, FetchError> {
        self.request(&Endpoint::NetworkStatus.path(), &QueryParams::new())
            .await
    }
}

/// Shared clients keyed by network. Clients handed out here are pinned to
/// their key's network.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    urls: NetworkUrls,
    policy: RetryPolicy,
    clients: Mutex<HashMap<Network, Arc<ExplorerClient>>>,
}

impl ClientRegistry {
    pub fn new(urls: NetworkUrls, policy: RetryPolicy) -> Self {
        Self {
            urls,
            policy,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, network: Network) -> Result<Arc<ExplorerClient>, FetchError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&network) {
            return Ok(client.clone());
        }
        let client = Arc::new(
            ExplorerClient::with_options(network, self.urls.clone(), self.policy.clone())?.pin(),
        );
        clients.insert(network, client.clone());
        Ok(client)
    }
}

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::classify::classify_all;
use crate::client::{EtherscanClient, ExplorerClient, Pagination};
use crate::error::FetchError;
use crate::models::{
    ChartPoint, ClassifiedTransaction, DisplayTransaction, NetworkStat, SummaryStats, TxSource,
};
use crate::network::{DataType, Network, NetworkUrls};
use crate::retry::RetryPolicy;
use crate::placeholder;
use crate::poller::{fetcher, Fetcher, HookHandle, HookState, PollingHook};
use crate::transform;

/// Where dashboard transactions come from.
#[derive(Debug, Clone)]
pub enum DashboardSource {
    Etherscan(Arc<EtherscanClient>),
    ZkSync(Arc<ExplorerClient>),
}

impl DashboardSource {
    /// zkSync source against the Era node APIs for `network`.
    pub fn zksync(network: Network) -> Result<Self, FetchError> {
        let client =
            ExplorerClient::with_options(network, NetworkUrls::era(), RetryPolicy::default())?;
        Ok(DashboardSource::ZkSync(Arc::new(client)))
    }

    pub fn tx_source(&self) -> TxSource {
        match self {
            DashboardSource::Etherscan(_) => TxSource::Etherscan,
            DashboardSource::ZkSync(_) => TxSource::ZkSync,
        }
    }

    pub async fn fetch_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<ClassifiedTransaction>, FetchError> {
        match self {
            DashboardSource::Etherscan(client) => {
                let txs = client.account_transactions(address).await?;
                Ok(classify_all(&txs))
            }
            DashboardSource::ZkSync(client) => {
                let txs = client
                    .account_transactions(address, &Pagination::default())
                    .await?;
                Ok(classify_all(&txs))
            }
        }
    }
}

/// All panels derived from a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub source: TxSource,
    pub transaction_count: usize,
    pub chart: Vec<ChartPoint>,
    pub networks: Vec<NetworkStat>,
    pub recent: Vec<DisplayTransaction>,
    pub stats: SummaryStats,
    pub fetched_at: DateTime<Utc>,
}

pub fn build_dashboard<R: Rng + ?Sized>(
    source: TxSource,
    txs: &[ClassifiedTransaction],
    rng: &mut R,
    now: DateTime<Utc>,
) -> DashboardData {
    DashboardData {
        source,
        transaction_count: txs.len(),
        chart: transform::chart_series(txs),
        networks: transform::aggregate_network_stats(source, txs, rng),
        recent: transform::format_for_display(txs),
        stats: transform::summary_stats(source, txs),
        fetched_at: now,
    }
}

pub async fn fetch_dashboard(
    source: &DashboardSource,
    address: &str,
) -> Result<DashboardData, FetchError> {
    let txs = source.fetch_transactions(address).await?;
    tracing::info!(
        source = ?source.tx_source(),
        address,
        "fetched {} transactions",
        txs.len()
    );
    Ok(build_dashboard(
        source.tx_source(),
        &txs,
        &mut rand::rng(),
        Utc::now(),
    ))
}

/// What a consumer renders: live panels when the last fetch succeeded,
/// otherwise placeholder panels plus a notice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub live: bool,
    pub loading: bool,
    pub notice: Option<String>,
    pub source: TxSource,
    pub chart: Vec<ChartPoint>,
    pub networks: Vec<NetworkStat>,
    pub recent: Vec<DisplayTransaction>,
    pub stats: SummaryStats,
    pub updated_at: DateTime<Utc>,
}

pub fn resolve_snapshot(source: TxSource, state: &HookState<DashboardData>) -> DashboardSnapshot {
    match (&state.data, &state.error) {
        (Some(data), None) => DashboardSnapshot {
            live: true,
            loading: state.loading,
            notice: None,
            source: data.source,
            chart: data.chart.clone(),
            networks: data.networks.clone(),
            recent: data.recent.clone(),
            stats: data.stats.clone(),
            updated_at: data.fetched_at,
        },
        _ => {
            let now = Utc::now();
            let mut rng = rand::rng();
            DashboardSnapshot {
                live: false,
                loading: state.loading,
                notice: state.error.clone(),
                source,
                chart: placeholder::chart_history(now, &mut rng),
                networks: placeholder::network_stats(),
                recent: placeholder::recent_transactions(now, &mut rng),
                stats: placeholder::summary_stats(),
                updated_at: now,
            }
        }
    }
}

/// Polls the dashboard for one wallet address.
pub struct DashboardHook {
    source: DashboardSource,
    address: String,
    hook: PollingHook<DashboardData>,
}

impl DashboardHook {
    pub fn start(source: DashboardSource, address: impl Into<String>) -> Self {
        Self::start_with_period(source, address, DataType::Transactions.polling_interval())
    }

    pub fn start_with_period(
        source: DashboardSource,
        address: impl Into<String>,
        period: Duration,
    ) -> Self {
        let address = address.into();
        let hook = PollingHook::start(
            format!("dashboard:{:?}", source.tx_source()),
            period,
            bind(source.clone(), address.clone()),
        );
        Self {
            source,
            address,
            hook,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn source(&self) -> TxSource {
        self.source.tx_source()
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        let address = address.into();
        if address == self.address {
            return;
        }
        self.address = address;
        self.rebind();
    }

    /// Moves a zkSync source to `network` and fetches again right away.
    /// Etherscan sources have no network to switch.
    pub fn set_network(&mut self, network: Network) {
        let DashboardSource::ZkSync(client) = &self.source else {
            tracing::debug!("dashboard source has no network; ignoring switch to {}", network);
            return;
        };
        if client.network() == network {
            return;
        }
        client.set_network(network);
        self.rebind();
    }

    /// Swaps the transaction source, e.g. when the zkSync toggle flips.
    pub fn set_source(&mut self, source: DashboardSource) {
        tracing::info!(
            "dashboard source {:?} -> {:?}",
            self.source.tx_source(),
            source.tx_source()
        );
        self.source = source;
        self.rebind();
    }

    fn rebind(&mut self) {
        let period = self.hook.period();
        self.hook
            .reconfigure(period, bind(self.source.clone(), self.address.clone()));
    }

    pub fn refetch(&self) -> tokio::task::JoinHandle<()> {
        self.hook.refetch()
    }

    pub fn handle(&self) -> HookHandle<DashboardData> {
        self.hook.handle()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.hook.snapshot();
        if let Some(notice) = &state.error {
            tracing::warn!("showing placeholder dashboard: {}", notice);
        }
        resolve_snapshot(self.source(), &state)
    }
}

fn bind(source: DashboardSource, address: String) -> Fetcher<DashboardData> {
    let address = Arc::new(address);
    fetcher(move || {
        let source = source.clone();
        let address = address.clone();
        async move { fetch_dashboard(&source, &address).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TxKind, TxStatus};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classified(n: usize) -> Vec<ClassifiedTransaction> {
        (0..n)
            .map(|i| ClassifiedTransaction {
                source: TxSource::ZkSync,
                hash: format!("0x{:x}", i),
                value_wei: "1000000000000000000".into(),
                timestamp: Some(1_700_000_000 + i as i64 * 3_600),
                kind: TxKind::Zk,
                status: TxStatus::Confirmed,
            })
            .collect()
    }

    #[test]
    fn panels_come_from_one_transaction_set() {
        let txs = classified(30);
        let data = build_dashboard(
            TxSource::ZkSync,
            &txs,
            &mut StdRng::seed_from_u64(0),
            Utc::now(),
        );
        assert_eq!(data.transaction_count, 30);
        assert_eq!(data.recent.len(), 10);
        assert_eq!(data.networks.len(), 1);
        assert_eq!(data.stats.total_zk, 30);
        assert_eq!(data.stats.daily_avg_zk, 1);
        assert_eq!(data.stats.zk_percentage, "100.0%");
        assert_eq!(
            data.chart.iter().map(|p| p.zk_count).sum::<u64>(),
            30
        );
    }

    #[test]
    fn error_state_resolves_to_placeholder_with_notice() {
        let state: HookState<DashboardData> = HookState {
            data: None,
            loading: false,
            error: Some("Etherscan API key is required".into()),
        };
        let snapshot = resolve_snapshot(TxSource::Etherscan, &state);
        assert!(!snapshot.live);
        assert_eq!(snapshot.notice.as_deref(), Some("Etherscan API key is required"));
        assert_eq!(snapshot.networks.len(), 4);
        assert_eq!(snapshot.recent.len(), 10);
        assert_eq!(snapshot.chart.len(), 31);
    }

    #[test]
    fn successful_state_resolves_to_live_panels() {
        let data = build_dashboard(
            TxSource::ZkSync,
            &classified(3),
            &mut StdRng::seed_from_u64(0),
            Utc::now(),
        );
        let state = HookState {
            data: Some(data.clone()),
            loading: false,
            error: None,
        };
        let snapshot = resolve_snapshot(TxSource::ZkSync, &state);
        assert!(snapshot.live);
        assert_eq!(snapshot.notice, None);
        assert_eq!(snapshot.recent, data.recent);
        assert_eq!(snapshot.updated_at, data.fetched_at);
    }

    #[test]
    fn zksync_source_targets_era_api() {
        let source = DashboardSource::zksync(Network::Mainnet).unwrap();
        let DashboardSource::ZkSync(client) = &source else {
            panic!("expected a zkSync source");
        };
        assert_eq!(client.base_url(), "https://mainnet.era.zksync.io/api/v1");

        let path = crate::network::Endpoint::AccountTransactions
            .path_with("0xa")
            .unwrap();
        let url = crate::client::build_url(
            &client.base_url(),
            &path,
            &crate::client::QueryParams::new(),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://mainnet.era.zksync.io/api/v1/accounts/0xa/transactions"
        );

        client.set_network(Network::Testnet);
        assert_eq!(client.base_url(), "https://testnet.era.zksync.io/api/v1");
    }

    #[test]
    fn zksync_records_without_timestamp_stay_off_the_chart() {
        let txs = vec![
            crate::models::ZkSyncTransaction {
                hash: "0x1".into(),
                status: "verified".into(),
                timestamp: Some(1_700_000_000),
                ..Default::default()
            },
            crate::models::ZkSyncTransaction {
                hash: "0x2".into(),
                status: "verified".into(),
                ..Default::default()
            },
        ];
        let data = build_dashboard(
            TxSource::ZkSync,
            &classify_all(&txs),
            &mut StdRng::seed_from_u64(0),
            Utc::now(),
        );
        assert_eq!(data.chart.len(), 1);
        assert_eq!(data.chart[0].zk_count, 1);
        assert_eq!(data.chart[0].day.to_string(), "2023-11-14");
        assert_eq!(data.stats.total_zk, 2);
    }

    #[tokio::test]
    async fn missing_key_hook_falls_back_to_placeholder() {
        let client = Arc::new(EtherscanClient::new(None).unwrap());
        let hook = DashboardHook::start(DashboardSource::Etherscan(client), "0xabc");
        tokio::time::sleep(Duration::from_millis(20)).await;

        let snapshot = hook.snapshot();
        assert!(!snapshot.live);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.notice.as_deref(), Some("Etherscan API key is required"));
    }
}

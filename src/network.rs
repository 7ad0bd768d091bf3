use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;

/// Fallback polling interval for data types without an entry in the table.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn config(&self) -> &'static NetworkConfig {
        match self {
            Network::Mainnet => &MAINNET,
            Network::Testnet => &TESTNET,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown network {0:?} (expected mainnet or testnet)")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub base_url: &'static str,
    pub ws_url: &'static str,
}

static MAINNET: NetworkConfig = NetworkConfig {
    base_url: "https://api.zksync.io/api/v0.2",
    ws_url: "wss://api.zksync.io/ws",
};

static TESTNET: NetworkConfig = NetworkConfig {
    base_url: "https://testnet.era.zksync.io/api/v1",
    ws_url: "wss://testnet.era.zksync.io/ws",
};

const ERA_MAINNET_API: &str = "https://mainnet.era.zksync.io/api/v1";
const ERA_TESTNET_API: &str = "https://testnet.era.zksync.io/api/v1";

/// Base URLs a client resolves per network. Defaults to the static table;
/// tests and self-hosted explorers override it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUrls {
    pub mainnet: String,
    pub testnet: String,
}

impl Default for NetworkUrls {
    fn default() -> Self {
        Self {
            mainnet: MAINNET.base_url.to_string(),
            testnet: TESTNET.base_url.to_string(),
        }
    }
}

impl NetworkUrls {
    /// zkSync Era node APIs, which serve per-account transaction history.
    pub fn era() -> Self {
        Self {
            mainnet: ERA_MAINNET_API.to_string(),
            testnet: ERA_TESTNET_API.to_string(),
        }
    }

    pub fn base_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Testnet => &self.testnet,
        }
    }
}

const PATH_ROOT: &str = "http://explorer.invalid/";

/// REST endpoint templates of the zkSync-style explorer API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Transactions,
    Transaction,
    AccountTransactions,
    Blocks,
    Block,
    Accounts,
    Account,
    AccountTransfers,
    Tokens,
    Token,
    Transfers,
    Transfer,
    Batches,
    Batch,
    Proofs,
    Proof,
    NetworkStats,
    NetworkStatus,
}

impl Endpoint {
    pub fn template(&self) -> &'static str {
        match self {
            Endpoint::Transactions => "/transactions",
            Endpoint::Transaction => "/transactions/:hash",
            Endpoint::AccountTransactions => "/accounts/:address/transactions",
            Endpoint::Blocks => "/blocks",
            Endpoint::Block => "/blocks/:number",
            Endpoint::Accounts => "/accounts",
            Endpoint::Account => "/accounts/:address",
            Endpoint::AccountTransfers => "/accounts/:address/transfers",
            Endpoint::Tokens => "/tokens",
            Endpoint::Token => "/tokens/:address",
            Endpoint::Transfers => "/transfers",
            Endpoint::Transfer => "/transfers/:hash",
            Endpoint::Batches => "/batches",
            Endpoint::Batch => "/batches/:number",
            Endpoint::Proofs => "/proofs",
            Endpoint::Proof => "/proofs/:id",
            Endpoint::NetworkStats => "/network/stats",
            Endpoint::NetworkStatus => "/network/status",
        }
    }

    /// Path for a parameterless endpoint.
    pub fn path(&self) -> String {
        self.template().to_string()
    }

    /// Substitutes the single `:param` segment of the template with `value`,
    /// percent-encoded so it always stays one path segment.
    pub fn path_with(&self, value: &str) -> Result<String, FetchError> {
        let value = value.trim();
        if value.is_empty() || value == "." || value == ".." {
            return Err(FetchError::validation(format!(
                "invalid path parameter {:?} for {}",
                value,
                self.template()
            )));
        }
        let mut url = Url::parse(PATH_ROOT)?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear();
            for segment in self.template().split('/').skip(1) {
                if segment.starts_with(':') {
                    segments.push(value);
                } else {
                    segments.push(segment);
                }
            }
        }
        Ok(url.path().to_string())
    }
}

/// Kinds of explorer data a polling hook can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Transactions,
    Blocks,
    Accounts,
    Tokens,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Transactions => "transactions",
            DataType::Blocks => "blocks",
            DataType::Accounts => "accounts",
            DataType::Tokens => "tokens",
        }
    }

    pub fn polling_interval(&self) -> Duration {
        polling_interval_for(self.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const POLLING_INTERVALS_MS: &[(&str, u64)] = &[
    ("transactions", 10_000),
    ("blocks", 10_000),
    ("accounts", 15_000),
    ("tokens", 20_000),
];

/// Looks up the polling interval for a data type name.
pub fn polling_interval_for(data_type: &str) -> Duration {
    let ms = POLLING_INTERVALS_MS
        .iter()
        .find(|(name, _)| *name == data_type)
        .map(|(_, ms)| *ms)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_table_resolves_urls() {
        assert_eq!(
            Network::Mainnet.config().base_url,
            "https://api.zksync.io/api/v0.2"
        );
        assert_eq!(
            Network::Testnet.config().ws_url,
            "wss://testnet.era.zksync.io/ws"
        );
        let urls = NetworkUrls::default();
        assert_eq!(
            urls.base_url(Network::Testnet),
            "https://testnet.era.zksync.io/api/v1"
        );
        assert_eq!(
            NetworkUrls::era().base_url(Network::Mainnet),
            "https://mainnet.era.zksync.io/api/v1"
        );
    }

    #[test]
    fn parses_network_names() {
        assert_eq!("mainnet".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!(" Testnet ".parse::<Network>(), Ok(Network::Testnet));
        assert!("goerli".parse::<Network>().is_err());
    }

    #[test]
    fn endpoint_templates_substitute_parameter() {
        assert_eq!(
            Endpoint::Transaction.path_with("0xabc").unwrap(),
            "/transactions/0xabc"
        );
        assert_eq!(
            Endpoint::AccountTransfers.path_with("0x01").unwrap(),
            "/accounts/0x01/transfers"
        );
        assert_eq!(Endpoint::Block.path_with("42").unwrap(), "/blocks/42");
        assert_eq!(Endpoint::NetworkStats.path(), "/network/stats");
    }

    #[test]
    fn path_parameters_cannot_escape_their_segment() {
        let path = Endpoint::Transaction.path_with("../network/stats").unwrap();
        assert_eq!(path, "/transactions/..%2Fnetwork%2Fstats");

        let path = Endpoint::Account.path_with("0x01?limit=1#frag").unwrap();
        assert!(path.starts_with("/accounts/0x01%3Flimit=1%23frag"));
        assert!(!path.contains('?'));

        for bad in ["", " ", ".", ".."] {
            assert!(matches!(
                Endpoint::Proof.path_with(bad),
                Err(FetchError::Validation(_))
            ));
        }
    }

    #[test]
    fn polling_intervals_follow_table_with_default() {
        assert_eq!(DataType::Transactions.polling_interval(), Duration::from_secs(10));
        assert_eq!(DataType::Accounts.polling_interval(), Duration::from_secs(15));
        assert_eq!(DataType::Tokens.polling_interval(), Duration::from_secs(20));
        assert_eq!(polling_interval_for("proofs"), Duration::from_millis(10_000));
    }
}

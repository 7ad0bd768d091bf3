use std::env;

use crate::client::ETHERSCAN_BASE_URL;
use crate::network::{Network, UnknownNetwork};

pub const DEFAULT_WALLET_ADDRESS: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

#[derive(Debug, Clone)]
pub struct Config {
    pub etherscan_api_key: Option<String>,
    pub etherscan_base_url: String,
    pub wallet_address: String,
    pub use_zksync: bool,
    pub zksync_network: Network,
    pub http_bind_addr: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid ZKSYNC_NETWORK: {0}")]
    InvalidNetwork(#[from] UnknownNetwork),
    #[error("invalid USE_ZKSYNC value {0:?} (expected true/false)")]
    InvalidFlag(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let etherscan_api_key = lookup("ETHERSCAN_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let etherscan_base_url =
            lookup("ETHERSCAN_BASE_URL").unwrap_or_else(|| ETHERSCAN_BASE_URL.to_string());
        let wallet_address =
            lookup("WALLET_ADDRESS").unwrap_or_else(|| DEFAULT_WALLET_ADDRESS.to_string());
        let use_zksync = lookup("USE_ZKSYNC")
            .map(|raw| parse_flag(&raw))
            .transpose()?
            .unwrap_or(false);
        let zksync_network = lookup("ZKSYNC_NETWORK")
            .map(|raw| raw.parse::<Network>())
            .transpose()?
            .unwrap_or_default();
        let http_bind_addr =
            lookup("HTTP_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        Ok(Self {
            etherscan_api_key,
            etherscan_base_url,
            wallet_address,
            use_zksync,
            zksync_network,
            http_bind_addr,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag(raw.to_string())),
    }
}

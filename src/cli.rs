use clap::{Args, Parser, Subcommand};

use zk_tx_monitor::network::{DataType, Network};

#[derive(Parser, Debug)]
#[command(name = "zk-tx-monitor", version, about = "ZK transaction explorer dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Wallet address; defaults to WALLET_ADDRESS
    #[arg(long)]
    pub address: Option<String>,
    /// Read from the zkSync explorer instead of Etherscan
    #[arg(long)]
    pub zksync: bool,
    /// zkSync network; defaults to ZKSYNC_NETWORK
    #[arg(long)]
    pub network: Option<Network>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch once and print the dashboard panels as JSON
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Poll the dashboard and log every refresh until interrupted
    Watch {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Query the zkSync explorer REST API
    Explore {
        #[arg(value_enum)]
        data_type: DataType,
        #[arg(long, default_value = "mainnet")]
        network: Network,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        hash: Option<String>,
        #[arg(long)]
        number: Option<u64>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Run the HTTP API server
    Serve {
        /// Override bind address, e.g. 0.0.0.0:8080
        #[arg(long)]
        addr: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
}

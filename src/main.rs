mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use zk_tx_monitor::api::{self, AppState};
use zk_tx_monitor::client::{EtherscanClient, ExplorerClient};
use zk_tx_monitor::config::Config;
use zk_tx_monitor::dashboard::{fetch_dashboard, resolve_snapshot, DashboardHook, DashboardSource};
use zk_tx_monitor::hooks::{fetch_explorer_data, DataOptions};
use zk_tx_monitor::poller::HookState;

use crate::cli::{Cli, Commands, SourceArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::Dashboard { source } => {
            let (dashboard_source, address) = build_source(&config, &source)?;
            let state = match fetch_dashboard(&dashboard_source, &address).await {
                Ok(data) => HookState {
                    data: Some(data),
                    loading: false,
                    error: None,
                },
                Err(err) => {
                    tracing::warn!("falling back to placeholder data: {}", err);
                    HookState {
                        data: None,
                        loading: false,
                        error: Some(err.to_string()),
                    }
                }
            };
            let snapshot = resolve_snapshot(dashboard_source.tx_source(), &state);
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Watch { source } => {
            let (dashboard_source, address) = build_source(&config, &source)?;
            let hook = DashboardHook::start(dashboard_source, address);
            let mut ticker = tokio::time::interval(
                zk_tx_monitor::network::DataType::Transactions.polling_interval(),
            );
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("interrupted, stopping watch");
                        break;
                    }
                    _ = ticker.tick() => {
                        let snapshot = hook.snapshot();
                        tracing::info!(
                            live = snapshot.live,
                            total_zk = snapshot.stats.total_zk,
                            zk_percentage = %snapshot.stats.zk_percentage,
                            "dashboard refreshed for {}",
                            hook.address()
                        );
                    }
                }
            }
        }
        Commands::Explore {
            data_type,
            network,
            address,
            hash,
            number,
            limit,
            offset,
            from,
            to,
            status,
        } => {
            let client = ExplorerClient::new(network).context("failed to build explorer client")?;
            let options = DataOptions {
                data_type,
                network,
                address,
                hash,
                number,
                limit,
                offset,
                from,
                to,
                status,
            };
            let data = fetch_explorer_data(&client, &options)
                .await
                .with_context(|| format!("failed to fetch {}", data_type))?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Commands::Serve { addr, source } => {
            let bind = addr.unwrap_or_else(|| config.http_bind_addr.clone());
            let (dashboard_source, address) = build_source(&config, &source)?;
            let hook = DashboardHook::start(dashboard_source, address);
            let state = AppState {
                source: hook.source(),
                dashboard: hook.handle(),
            };
            api::run_http_server(&bind, state).await?;
        }
    }

    Ok(())
}

fn build_source(config: &Config, args: &SourceArgs) -> anyhow::Result<(DashboardSource, String)> {
    let address = args
        .address
        .clone()
        .unwrap_or_else(|| config.wallet_address.clone());

    let source = if args.zksync || config.use_zksync {
        let network = args.network.unwrap_or(config.zksync_network);
        DashboardSource::zksync(network).context("failed to build explorer client")?
    } else {
        let client = EtherscanClient::with_options(
            &config.etherscan_base_url,
            config.etherscan_api_key.clone(),
            Default::default(),
        )
        .context("failed to build Etherscan client")?;
        if !client.has_api_key() {
            tracing::warn!("ETHERSCAN_API_KEY is not set; the dashboard will show placeholder data");
        }
        DashboardSource::Etherscan(Arc::new(client))
    };

    Ok((source, address))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

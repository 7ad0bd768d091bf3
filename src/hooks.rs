use std::sync::Arc;

use serde::Serialize;

use crate::client::{BlockRange, ClientRegistry, ExplorerClient, Pagination, TransactionFilter};
use crate::error::FetchError;
use crate::models::{Account, Block, Token, ZkSyncTransaction};
use crate::network::{DataType, Network};
use crate::poller::{fetcher, HookState, PollingHook};

/// Parameters a data hook is bound to. Changing any of them restarts polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataOptions {
    pub data_type: DataType,
    pub network: Network,
    pub address: Option<String>,
    pub hash: Option<String>,
    pub number: Option<u64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
}

impl DataOptions {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            network: Network::default(),
            address: None,
            hash: None,
            number: None,
            limit: None,
            offset: None,
            from: None,
            to: None,
            status: None,
        }
    }

    fn page(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum ExplorerData {
    Transactions(Vec<ZkSyncTransaction>),
    Transaction(ZkSyncTransaction),
    Blocks(Vec<Block>),
    Block(Block),
    Account(Account),
    Tokens(Vec<Token>),
    Token(Token),
}

fn parse_block_bound(raw: Option<&str>) -> Result<Option<u64>, FetchError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| FetchError::validation(format!("invalid block number {:?}", value)))
    })
    .transpose()
}

/// One fetch for `options`, dispatched on the data type.
pub async fn fetch_explorer_data(
    client: &ExplorerClient,
    options: &DataOptions,
) -> Result<ExplorerData, FetchError> {
    tracing::debug!(
        data_type = %options.data_type,
        network = %options.network,
        params = ?options,
        "fetching explorer data"
    );

    let data = match options.data_type {
        DataType::Transactions => match options.hash.as_deref() {
            Some(hash) => ExplorerData::Transaction(client.transaction(hash).await?),
            None => {
                let filter = TransactionFilter {
                    page: options.page(),
                    from: options.from.clone(),
                    to: options.to.clone(),
                    tx_type: None,
                    status: options.status.clone(),
                };
                ExplorerData::Transactions(client.transactions(&filter).await?)
            }
        },
        DataType::Blocks => match options.number {
            Some(number) => ExplorerData::Block(client.block(number).await?),
            None => {
                let range = BlockRange {
                    page: options.page(),
                    from: parse_block_bound(options.from.as_deref())?,
                    to: parse_block_bound(options.to.as_deref())?,
                };
                ExplorerData::Blocks(client.blocks(&range).await?)
            }
        },
        DataType::Accounts => {
            let address = options
                .address
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .ok_or_else(|| FetchError::validation("Account address is required"))?;
            ExplorerData::Account(client.account(address).await?)
        }
        DataType::Tokens => match options.address.as_deref() {
            Some(address) => ExplorerData::Token(client.token(address).await?),
            None => ExplorerData::Tokens(client.tokens(&options.page()).await?),
        },
    };

    Ok(data)
}

/// Where a hook gets its explorer client from.
#[derive(Debug, Clone)]
enum ClientSource {
    /// One client the hook retargets with `set_network`.
    Shared(Arc<ExplorerClient>),
    /// A client per network, left on the network it was issued for.
    Registry(Arc<ClientRegistry>),
}

impl ClientSource {
    fn select(&self, network: Network) {
        if let ClientSource::Shared(client) = self {
            client.set_network(network);
        }
    }

    fn client_for(&self, network: Network) -> Result<Arc<ExplorerClient>, FetchError> {
        match self {
            ClientSource::Shared(client) => {
                if client.network() != network && client.is_pinned() {
                    return Err(FetchError::validation(format!(
                        "explorer client is pinned to {}; cannot fetch from {}",
                        client.network(),
                        network
                    )));
                }
                Ok(client.clone())
            }
            ClientSource::Registry(registry) => registry.get(network),
        }
    }
}

/// Polls explorer data for a set of [`DataOptions`].
pub struct ExplorerDataHook {
    source: ClientSource,
    options: DataOptions,
    hook: PollingHook<ExplorerData>,
}

impl ExplorerDataHook {
    /// Binds to a single client, switching its network to match the options.
    pub fn start(client: Arc<ExplorerClient>, options: DataOptions) -> Self {
        Self::start_on(ClientSource::Shared(client), options)
    }

    /// Binds to a registry; each fetch uses the registry's client for the
    /// options' network and never retargets it.
    pub fn with_registry(registry: Arc<ClientRegistry>, options: DataOptions) -> Self {
        Self::start_on(ClientSource::Registry(registry), options)
    }

    fn start_on(source: ClientSource, options: DataOptions) -> Self {
        source.select(options.network);
        let hook = PollingHook::start(
            format!("explorer:{}", options.data_type),
            options.data_type.polling_interval(),
            bind(source.clone(), options.clone()),
        );
        Self {
            source,
            options,
            hook,
        }
    }

    pub fn options(&self) -> &DataOptions {
        &self.options
    }

    /// Rebinds to new options. Identical options leave polling untouched.
    pub fn set_options(&mut self, options: DataOptions) {
        if options == self.options {
            return;
        }
        self.source.select(options.network);
        self.hook.reconfigure(
            options.data_type.polling_interval(),
            bind(self.source.clone(), options.clone()),
        );
        self.options = options;
    }

    pub fn refetch(&self) -> tokio::task::JoinHandle<()> {
        self.hook.refetch()
    }

    pub fn state(&self) -> HookState<ExplorerData> {
        self.hook.snapshot()
    }
}

fn bind(source: ClientSource, options: DataOptions) -> crate::poller::Fetcher<ExplorerData> {
    let options = Arc::new(options);
    fetcher(move || {
        let source = source.clone();
        let options = options.clone();
        async move {
            let client = source.client_for(options.network)?;
            fetch_explorer_data(&client, &options).await
        }
    })
}

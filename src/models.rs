use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A `txlist` record as Etherscan returns it; every field is a string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    pub is_error: String,
    #[serde(rename = "txreceipt_status")]
    pub txreceipt_status: String,
    pub input: String,
    pub contract_address: String,
    pub confirmations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZkSyncTransaction {
    pub hash: String,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub fee: Option<String>,
    pub gas_limit: Option<String>,
    pub gas_used: Option<String>,
    pub status: String,
    pub timestamp: Option<i64>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    pub number: u64,
    pub hash: String,
    pub parent_hash: Option<String>,
    pub timestamp: i64,
    pub l1_batch_number: Option<u64>,
    pub transactions: Vec<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub address: String,
    pub balance: String,
    pub nonce: u64,
    #[serde(rename = "type")]
    pub account_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transfer {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub token: String,
    pub amount: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Batch {
    pub number: u64,
    pub hash: String,
    pub transactions: Vec<String>,
    pub timestamp: i64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Proof {
    pub id: String,
    pub batch_number: u64,
    pub status: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkStats {
    pub total_transactions: u64,
    pub total_blocks: u64,
    pub total_accounts: u64,
    pub total_contracts: u64,
    pub average_block_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkStatus {
    pub status: String,
    pub last_block: u64,
    pub last_batch: u64,
    pub last_proof: u64,
}

/// Which explorer a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxSource {
    Etherscan,
    ZkSync,
}

impl TxSource {
    pub fn network_label(&self) -> &'static str {
        match self {
            TxSource::Etherscan => "Ethereum",
            TxSource::ZkSync => "zkSync Era",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Zk,
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Confirmed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedTransaction {
    pub source: TxSource,
    pub hash: String,
    pub value_wei: String,
    /// UNIX seconds; `None` when the record carried no parseable timestamp.
    pub timestamp: Option<i64>,
    pub kind: TxKind,
    pub status: TxStatus,
}

impl ClassifiedTransaction {
    pub fn is_zk(&self) -> bool {
        self.kind == TxKind::Zk
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Short label such as `"Jan 05"`.
    pub date: String,
    pub day: NaiveDate,
    pub zk_count: u64,
    pub regular_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStat {
    pub id: String,
    pub name: String,
    pub zk_count: u64,
    pub total_count: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTransaction {
    pub id: String,
    pub hash: String,
    pub network: String,
    pub amount: String,
    pub timestamp: String,
    pub status: TxStatus,
    #[serde(rename = "type")]
    pub kind: TxKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_zk: u64,
    pub daily_avg_zk: u64,
    pub zk_percentage: String,
    pub avg_confirmation_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etherscan_record_deserializes_from_wire_names() {
        let raw: RawTransaction = serde_json::from_value(serde_json::json!({
            "blockNumber": "19000000",
            "timeStamp": "1700000000",
            "hash": "0xabc",
            "from": "0x01",
            "to": "0x02",
            "value": "1000000000000000000",
            "gas": "21000",
            "gasPrice": "1000",
            "isError": "0",
            "txreceipt_status": "1",
            "input": "0x",
            "contractAddress": "",
            "confirmations": "25"
        }))
        .unwrap();
        assert_eq!(raw.time_stamp, "1700000000");
        assert_eq!(raw.txreceipt_status, "1");
        assert_eq!(raw.confirmations, "25");
    }

    #[test]
    fn zksync_record_tolerates_missing_fields() {
        let tx: ZkSyncTransaction = serde_json::from_value(serde_json::json!({
            "hash": "0xdef",
            "from": "0x01",
            "value": "5",
            "status": "pending",
            "timestamp": 1700000000
        }))
        .unwrap();
        assert_eq!(tx.block_number, None);
        assert_eq!(tx.status, "pending");
        assert_eq!(tx.timestamp, Some(1_700_000_000));
    }

    #[test]
    fn zksync_record_without_timestamp_keeps_it_unset() {
        let tx: ZkSyncTransaction = serde_json::from_value(serde_json::json!({
            "hash": "0xdef",
            "status": "verified"
        }))
        .unwrap();
        assert_eq!(tx.timestamp, None);
    }
}

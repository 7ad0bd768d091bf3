use crate::models::{
    ClassifiedTransaction, RawTransaction, TxKind, TxSource, TxStatus, ZkSyncTransaction,
};

/// Input payloads longer than this are treated as carrying a ZK proof.
pub const ZK_INPUT_THRESHOLD: usize = 1000;

/// Etherscan transactions need this many confirmations to count as confirmed.
pub const CONFIRMATION_DEPTH: u64 = 12;

/// Common view over the transaction records of both explorers.
pub trait ExplorerTransaction {
    const SOURCE: TxSource;

    fn hash(&self) -> &str;
    fn value_wei(&self) -> &str;
    fn timestamp_secs(&self) -> Option<i64>;
    fn is_zk(&self) -> bool;
    fn status(&self) -> TxStatus;

    fn classify(&self) -> ClassifiedTransaction {
        ClassifiedTransaction {
            source: Self::SOURCE,
            hash: self.hash().to_string(),
            value_wei: self.value_wei().to_string(),
            timestamp: self.timestamp_secs(),
            kind: if self.is_zk() { TxKind::Zk } else { TxKind::Regular },
            status: self.status(),
        }
    }
}

/// Heuristic used for Etherscan data: long input payloads look like proofs.
pub fn is_zk_transaction(tx: &RawTransaction) -> bool {
    tx.input.len() > ZK_INPUT_THRESHOLD
}

impl ExplorerTransaction for RawTransaction {
    const SOURCE: TxSource = TxSource::Etherscan;

    fn hash(&self) -> &str {
        &self.hash
    }

    fn value_wei(&self) -> &str {
        &self.value
    }

    fn timestamp_secs(&self) -> Option<i64> {
        self.time_stamp.trim().parse().ok()
    }

    fn is_zk(&self) -> bool {
        is_zk_transaction(self)
    }

    fn status(&self) -> TxStatus {
        let confirmations: u64 = self.confirmations.trim().parse().unwrap_or(0);
        if confirmations > CONFIRMATION_DEPTH {
            TxStatus::Confirmed
        } else {
            TxStatus::Pending
        }
    }
}

impl ExplorerTransaction for ZkSyncTransaction {
    const SOURCE: TxSource = TxSource::ZkSync;

    fn hash(&self) -> &str {
        &self.hash
    }

    fn value_wei(&self) -> &str {
        &self.value
    }

    fn timestamp_secs(&self) -> Option<i64> {
        self.timestamp
    }

    // Everything settled on zkSync is a ZK transaction.
    fn is_zk(&self) -> bool {
        true
    }

    fn status(&self) -> TxStatus {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "confirmed" | "verified" | "included" => TxStatus::Confirmed,
            "failed" | "rejected" => TxStatus::Failed,
            _ => TxStatus::Pending,
        }
    }
}

pub fn classify_all<T: ExplorerTransaction>(txs: &[T]) -> Vec<ClassifiedTransaction> {
    txs.iter().map(ExplorerTransaction::classify).collect()
}

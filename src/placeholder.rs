//! Synthetic panels shown while live data is unavailable.

use chrono::{DateTime, Duration, Local, Utc};
use rand::Rng;

use crate::models::{ChartPoint, DisplayTransaction, NetworkStat, SummaryStats, TxKind, TxStatus};
use crate::transform::ETHERSCAN_BUCKETS;

const HISTORY_POINTS: i64 = 31;
const HISTORY_STEP_HOURS: i64 = 8;

const BUCKET_COUNTS: [(u64, u64); 4] = [
    (25_647, 152_034),
    (43_210, 178_542),
    (18_327, 67_293),
    (31_895, 89_745),
];

/// 31 points, eight hours apart, ending at `now`.
pub fn chart_history<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<ChartPoint> {
    (0..HISTORY_POINTS)
        .rev()
        .map(|i| {
            let at = now - Duration::hours(i * HISTORY_STEP_HOURS);
            ChartPoint {
                date: at.format("%b %d %H:%M").to_string(),
                day: at.date_naive(),
                zk_count: rng.random_range(1_000..3_000),
                regular_count: rng.random_range(3_000..8_000),
            }
        })
        .collect()
}

pub fn network_stats() -> Vec<NetworkStat> {
    ETHERSCAN_BUCKETS
        .iter()
        .zip(BUCKET_COUNTS)
        .map(|((id, name, color), (zk_count, total_count))| NetworkStat {
            id: id.to_string(),
            name: name.to_string(),
            zk_count,
            total_count,
            color: color.to_string(),
        })
        .collect()
}

pub fn recent_transactions<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DisplayTransaction> {
    (0..10)
        .map(|i| {
            let at = now - Duration::hours(rng.random_range(0..24));
            let network = ETHERSCAN_BUCKETS[rng.random_range(0..ETHERSCAN_BUCKETS.len())].1;
            DisplayTransaction {
                id: format!("tx-{}", i),
                hash: format!("0x{:016x}", rng.random::<u64>()),
                network: network.to_string(),
                amount: format!("{:.4} ETH", rng.random_range(0.0..10.0)),
                timestamp: at.with_timezone(&Local).format("%H:%M:%S").to_string(),
                status: if rng.random_bool(0.2) {
                    TxStatus::Pending
                } else {
                    TxStatus::Confirmed
                },
                kind: if rng.random_bool(0.6) {
                    TxKind::Zk
                } else {
                    TxKind::Regular
                },
            }
        })
        .collect()
}

pub fn summary_stats() -> SummaryStats {
    SummaryStats {
        total_zk: 289_547,
        daily_avg_zk: 12_483,
        zk_percentage: "37.2%".to_string(),
        avg_confirmation_time: "2.4s".to_string(),
    }
}

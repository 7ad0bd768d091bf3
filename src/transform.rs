//! Pure transformations from classified transactions to dashboard panels.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use ethers_core::types::U256;
use ethers_core::utils::format_ether;
use rand::Rng;

use crate::models::{
    ChartPoint, ClassifiedTransaction, DisplayTransaction, NetworkStat, SummaryStats, TxSource,
};

pub const RECENT_ROWS: usize = 10;

/// Summary stats assume the fetched history covers this many days.
pub const SUMMARY_WINDOW_DAYS: f64 = 30.0;

pub(crate) const ETHERSCAN_BUCKETS: [(&str, &str, &str); 4] = [
    ("1", "Ethereum", "zkpurple"),
    ("2", "Polygon", "zkteal"),
    ("3", "Optimism", "rose-500"),
    ("4", "Arbitrum", "blue-500"),
];

const ZKSYNC_BUCKET: (&str, &str, &str) = ("zksync-era", "zkSync Era", "zkpurple");

/// Chart label for a day, e.g. `"Jan 05"`.
pub fn day_label(day: NaiveDate) -> String {
    day.format("%b %d").to_string()
}

fn utc_day(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Per-day ZK and regular counts, oldest day first. Transactions without a
/// usable timestamp are left out.
pub fn chart_series(txs: &[ClassifiedTransaction]) -> Vec<ChartPoint> {
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for tx in txs {
        let Some(day) = tx.timestamp.and_then(utc_day) else {
            tracing::debug!("skipping tx {} without timestamp in chart series", tx.hash);
            continue;
        };
        let counts = days.entry(day).or_default();
        if tx.is_zk() {
            counts.0 += 1;
        } else {
            counts.1 += 1;
        }
    }

    days.into_iter()
        .map(|(day, (zk_count, regular_count))| ChartPoint {
            date: day_label(day),
            day,
            zk_count,
            regular_count,
        })
        .collect()
}

/// Per-network buckets.
///
/// Etherscan data carries no chain information, so each transaction lands in
/// one of four fixed buckets uniformly at random; the output differs between
/// calls unless `rng` is seeded. zkSync data always forms a single bucket.
pub fn aggregate_network_stats<R: Rng + ?Sized>(
    source: TxSource,
    txs: &[ClassifiedTransaction],
    rng: &mut R,
) -> Vec<NetworkStat> {
    match source {
        TxSource::ZkSync => {
            let (id, name, color) = ZKSYNC_BUCKET;
            let total = txs.len() as u64;
            vec![NetworkStat {
                id: id.to_string(),
                name: name.to_string(),
                zk_count: txs.iter().filter(|tx| tx.is_zk()).count() as u64,
                total_count: total,
                color: color.to_string(),
            }]
        }
        TxSource::Etherscan => {
            let mut buckets: Vec<NetworkStat> = ETHERSCAN_BUCKETS
                .iter()
                .map(|(id, name, color)| NetworkStat {
                    id: id.to_string(),
                    name: name.to_string(),
                    zk_count: 0,
                    total_count: 0,
                    color: color.to_string(),
                })
                .collect();
            for tx in txs {
                let bucket = &mut buckets[rng.random_range(0..ETHERSCAN_BUCKETS.len())];
                bucket.total_count += 1;
                if tx.is_zk() {
                    bucket.zk_count += 1;
                }
            }
            buckets
        }
    }
}

/// Wei amount as an ETH string without trailing zeros; unparseable values read as `0`.
pub fn format_eth_amount(wei: &str) -> String {
    let Ok(value) = U256::from_dec_str(wei.trim()) else {
        return "0".to_string();
    };
    let ether = format_ether(value);
    if ether.contains('.') {
        ether
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        ether
    }
}

fn local_time_of_day(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Rows for the recent-transactions panel. Expects `txs` newest first.
pub fn format_for_display(txs: &[ClassifiedTransaction]) -> Vec<DisplayTransaction> {
    txs.iter()
        .take(RECENT_ROWS)
        .map(|tx| DisplayTransaction {
            id: tx.hash.clone(),
            hash: tx.hash.clone(),
            network: tx.source.network_label().to_string(),
            amount: format!("{} ETH", format_eth_amount(&tx.value_wei)),
            timestamp: local_time_of_day(tx.timestamp),
            status: tx.status,
            kind: tx.kind,
        })
        .collect()
}

// TODO: derive this from block timestamps once the explorers expose inclusion times.
fn avg_confirmation_time(source: TxSource) -> &'static str {
    match source {
        TxSource::Etherscan => "2.1s",
        TxSource::ZkSync => "0.5s",
    }
}

pub fn summary_stats(source: TxSource, txs: &[ClassifiedTransaction]) -> SummaryStats {
    let total_zk = txs.iter().filter(|tx| tx.is_zk()).count() as u64;
    let percentage = if txs.is_empty() {
        0.0
    } else {
        total_zk as f64 * 100.0 / txs.len() as f64
    };

    SummaryStats {
        total_zk,
        daily_avg_zk: (total_zk as f64 / SUMMARY_WINDOW_DAYS).round() as u64,
        zk_percentage: format!("{:.1}%", percentage),
        avg_confirmation_time: avg_confirmation_time(source).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TxKind, TxStatus};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DAY: i64 = 86_400;
    // 2023-11-14T22:13:20Z
    const T0: i64 = 1_700_000_000;

    fn tx(hash: &str, timestamp: Option<i64>, zk: bool) -> ClassifiedTransaction {
        ClassifiedTransaction {
            source: TxSource::Etherscan,
            hash: hash.to_string(),
            value_wei: "1500000000000000000".to_string(),
            timestamp,
            kind: if zk { TxKind::Zk } else { TxKind::Regular },
            status: TxStatus::Confirmed,
        }
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(chart_series(&[]).is_empty());
    }

    #[test]
    fn one_point_per_distinct_day_with_matching_totals() {
        let txs = vec![
            tx("a", Some(T0 + 2 * DAY), true),
            tx("b", Some(T0), false),
            tx("c", Some(T0 + 2 * DAY), false),
            tx("d", Some(T0 + 60), true),
            tx("e", Some(T0 + DAY), false),
            tx("f", None, true),
        ];
        let series = chart_series(&txs);
        assert_eq!(series.len(), 3);

        let totals: Vec<u64> = series
            .iter()
            .map(|p| p.zk_count + p.regular_count)
            .collect();
        assert_eq!(totals, vec![2, 1, 2]);
        assert_eq!(series[0].zk_count, 1);
        assert_eq!(series[0].date, "Nov 14");
        assert!(series.windows(2).all(|w| w[0].day < w[1].day));
    }

    #[test]
    fn grouping_uses_utc_midnight() {
        // 23:59:59 and 00:00:00 UTC on consecutive days.
        let midnight = 1_700_006_400;
        let series = chart_series(&[tx("a", Some(midnight - 1), true), tx("b", Some(midnight), true)]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn display_rows_are_capped_at_ten() {
        let txs: Vec<_> = (0..50)
            .map(|i| tx(&format!("0x{:02x}", i), Some(T0 - i), i % 2 == 0))
            .collect();
        let rows = format_for_display(&txs);
        assert_eq!(rows.len(), RECENT_ROWS);
        assert_eq!(rows[0].hash, "0x00");
        assert_eq!(rows[0].amount, "1.5 ETH");
        assert_eq!(rows[0].network, "Ethereum");
        assert_eq!(rows[1].kind, TxKind::Regular);
    }

    #[test]
    fn eth_amounts_drop_trailing_zeros() {
        assert_eq!(format_eth_amount("1000000000000000000"), "1");
        assert_eq!(format_eth_amount("0"), "0");
        assert_eq!(format_eth_amount("123400000000000"), "0.0001234");
        assert_eq!(format_eth_amount("not-a-number"), "0");
    }

    #[test]
    fn summary_of_empty_set_is_defined() {
        let stats = summary_stats(TxSource::Etherscan, &[]);
        assert_eq!(stats.total_zk, 0);
        assert_eq!(stats.daily_avg_zk, 0);
        assert_eq!(stats.zk_percentage, "0.0%");
        assert_eq!(stats.avg_confirmation_time, "2.1s");
    }

    #[test]
    fn summary_counts_and_rounds() {
        let mut txs: Vec<_> = (0..45).map(|i| tx(&i.to_string(), Some(T0), true)).collect();
        txs.extend((0..55).map(|i| tx(&format!("r{}", i), Some(T0), false)));
        let stats = summary_stats(TxSource::Etherscan, &txs);
        assert_eq!(stats.total_zk, 45);
        // 45 / 30 = 1.5 rounds up
        assert_eq!(stats.daily_avg_zk, 2);
        assert_eq!(stats.zk_percentage, "45.0%");
    }

    #[test]
    fn zksync_source_has_single_bucket() {
        let txs: Vec<_> = (0..7).map(|i| tx(&i.to_string(), Some(T0), true)).collect();
        let stats = aggregate_network_stats(TxSource::ZkSync, &txs, &mut StdRng::seed_from_u64(1));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].id, "zksync-era");
        assert_eq!(stats[0].name, "zkSync Era");
        assert_eq!(stats[0].total_count, 7);
        assert_eq!(stats[0].zk_count, 7);
    }

    #[test]
    fn etherscan_buckets_partition_every_transaction() {
        let txs: Vec<_> = (0..200)
            .map(|i| tx(&i.to_string(), Some(T0), i % 4 == 0))
            .collect();
        let stats =
            aggregate_network_stats(TxSource::Etherscan, &txs, &mut StdRng::seed_from_u64(7));
        let names: Vec<_> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ethereum", "Polygon", "Optimism", "Arbitrum"]);
        assert_eq!(stats.iter().map(|s| s.total_count).sum::<u64>(), 200);
        assert_eq!(stats.iter().map(|s| s.zk_count).sum::<u64>(), 50);
        assert!(stats.iter().all(|s| s.zk_count <= s.total_count));
    }

    #[test]
    fn seeded_bucket_assignment_is_reproducible() {
        let txs: Vec<_> = (0..30).map(|i| tx(&i.to_string(), Some(T0), true)).collect();
        let a = aggregate_network_stats(TxSource::Etherscan, &txs, &mut StdRng::seed_from_u64(42));
        let b = aggregate_network_stats(TxSource::Etherscan, &txs, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}

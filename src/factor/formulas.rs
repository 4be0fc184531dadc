use super::tick::{PrevTick, Tick, LEVELS};

pub const FACTOR_COUNT: usize = 20;
/// Additive stabilizer in every factor denominator.
pub const EPSILON: f64 = 1e-7;

/// `alpha_1 ..= alpha_20` for one tick, `factors[i - 1]` holding `alpha_i`.
pub type Factors = [f64; FACTOR_COUNT];

// ---------------------------------------------------------------------------
// Book aggregates
// ---------------------------------------------------------------------------

fn sum(values: &[i64; LEVELS]) -> f64 {
    values.iter().map(|&v| v as f64).sum()
}

/// Σ price·volume over the levels.
fn notional(prices: &[i64; LEVELS], volumes: &[i64; LEVELS]) -> f64 {
    prices
        .iter()
        .zip(volumes)
        .map(|(&p, &v)| p as f64 * v as f64)
        .sum()
}

/// Σ volume / level, level counted from 1.
fn decayed(volumes: &[i64; LEVELS]) -> f64 {
    volumes
        .iter()
        .enumerate()
        .map(|(k, &v)| v as f64 / (k + 1) as f64)
        .sum()
}

fn imbalance(bid: f64, ask: f64) -> f64 {
    (bid - ask) / (bid + ask + EPSILON)
}

fn depth_ratio(bid_volume: &[i64; LEVELS], ask_volume: &[i64; LEVELS]) -> f64 {
    sum(bid_volume) / (sum(ask_volume) + EPSILON)
}

fn mid(ask1: i64, bid1: i64) -> f64 {
    (ask1 as f64 + bid1 as f64) / 2.0
}

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

/// Compute every factor for `tick`. `prev` is the previous in-session tick
/// of the same stock on the same day; the change factors (17, 18, 19) are
/// 0 without one.
pub fn compute(tick: &Tick, prev: Option<&PrevTick>) -> Factors {
    let ask1 = tick.ask1() as f64;
    let bid1 = tick.bid1() as f64;
    let spread = ask1 - bid1;
    let mid_price = mid(tick.ask1(), tick.bid1());

    let bid_depth = sum(&tick.bid_volume);
    let ask_depth = sum(&tick.ask_volume);
    let bid_notional = notional(&tick.bid_price, &tick.bid_volume);
    let ask_notional = notional(&tick.ask_price, &tick.ask_volume);
    let bid_vwap = bid_notional / (bid_depth + EPSILON);
    let ask_vwap = ask_notional / (ask_depth + EPSILON);
    let depth_ratio_now = depth_ratio(&tick.bid_volume, &tick.ask_volume);

    let (ask1_change, mid_change, ratio_change) = match prev {
        Some(prev) => (
            ask1 - prev.ask1 as f64,
            mid_price - mid(prev.ask1, prev.bid1),
            depth_ratio_now - depth_ratio(&prev.bid_volume, &prev.ask_volume),
        ),
        None => (0.0, 0.0, 0.0),
    };

    [
        // 1: best spread
        spread,
        // 2: relative spread
        spread / (mid_price + EPSILON),
        // 3: mid price
        mid_price,
        // 4: top-of-book volume imbalance
        imbalance(tick.bid_volume[0] as f64, tick.ask_volume[0] as f64),
        // 5: five-level volume imbalance
        imbalance(bid_depth, ask_depth),
        // 6, 7: bid and ask depth
        bid_depth,
        ask_depth,
        // 8: depth difference
        bid_depth - ask_depth,
        // 9: depth ratio
        depth_ratio_now,
        // 10: total bid/ask volume imbalance
        imbalance(tick.total_bid_volume as f64, tick.total_ask_volume as f64),
        // 11, 12: volume-weighted bid and ask price
        bid_vwap,
        ask_vwap,
        // 13: volume-weighted mid across both sides
        (bid_notional + ask_notional) / (bid_depth + ask_depth + EPSILON),
        // 14: weighted spread
        ask_vwap - bid_vwap,
        // 15: mean per-level depth difference
        (bid_depth - ask_depth) / LEVELS as f64,
        // 16: level-decayed imbalance
        imbalance(decayed(&tick.bid_volume), decayed(&tick.ask_volume)),
        // 17: ask1 change
        ask1_change,
        // 18: mid change
        mid_change,
        // 19: depth ratio change
        ratio_change,
        // 20: spread per unit of total depth
        spread / (bid_depth + ask_depth + EPSILON),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0)
    }

    macro_rules! assert_close {
        ($actual:expr, $expected:expr) => {{
            let (a, e) = ($actual, $expected);
            assert!(close(a, e), "{} = {a}, expected {e}", stringify!($actual));
        }};
    }

    /// Bid levels 100, 99, .. with volumes 10, 20, ..; ask levels 101, 102, ..
    /// with volumes 5, 5, ..; totals 600 / 400.
    fn book() -> Tick {
        Tick {
            trading_day: "20240102".into(),
            trade_time: 93000,
            stock: "600000".into(),
            total_bid_volume: 600,
            total_ask_volume: 400,
            bid_price: [100, 99, 98, 97, 96],
            bid_volume: [10, 20, 30, 40, 50],
            ask_price: [101, 102, 103, 104, 105],
            ask_volume: [5, 5, 5, 5, 5],
        }
    }

    fn prev() -> PrevTick {
        PrevTick {
            ask1: 100,
            bid1: 98,
            bid_volume: [10, 10, 10, 10, 10],
            ask_volume: [25, 25, 25, 25, 25],
        }
    }

    fn alpha(i: usize, prev: Option<&PrevTick>) -> f64 {
        compute(&book(), prev)[i - 1]
    }

    // Bid depth 150, ask depth 25 for `book()`.
    const BID_DEPTH: f64 = 150.0;
    const ASK_DEPTH: f64 = 25.0;

    #[test]
    fn alpha_1_spread() {
        assert_close!(alpha(1, None), 1.0);
    }

    #[test]
    fn alpha_2_relative_spread() {
        assert_close!(alpha(2, None), 1.0 / (100.5 + EPSILON));
    }

    #[test]
    fn alpha_3_mid() {
        assert_close!(alpha(3, None), 100.5);
    }

    #[test]
    fn alpha_4_top_imbalance() {
        assert_close!(alpha(4, None), 5.0 / (15.0 + EPSILON));
    }

    #[test]
    fn alpha_5_depth_imbalance() {
        assert_close!(alpha(5, None), 125.0 / (175.0 + EPSILON));
    }

    #[test]
    fn alpha_6_bid_depth() {
        assert_close!(alpha(6, None), BID_DEPTH);
    }

    #[test]
    fn alpha_7_ask_depth() {
        assert_close!(alpha(7, None), ASK_DEPTH);
    }

    #[test]
    fn alpha_8_depth_difference() {
        assert_close!(alpha(8, None), 125.0);
    }

    #[test]
    fn alpha_9_depth_ratio() {
        assert_close!(alpha(9, None), BID_DEPTH / (ASK_DEPTH + EPSILON));
    }

    #[test]
    fn alpha_10_total_volume_imbalance() {
        assert_close!(alpha(10, None), 200.0 / (1000.0 + EPSILON));
    }

    #[test]
    fn alpha_11_bid_vwap() {
        // 100·10 + 99·20 + 98·30 + 97·40 + 96·50
        let notional = 14_600.0;
        assert_close!(alpha(11, None), notional / (BID_DEPTH + EPSILON));
    }

    #[test]
    fn alpha_12_ask_vwap() {
        assert_close!(alpha(12, None), 2_575.0 / (ASK_DEPTH + EPSILON));
    }

    #[test]
    fn alpha_13_weighted_mid() {
        assert_close!(alpha(13, None), (14_600.0 + 2_575.0) / (175.0 + EPSILON));
    }

    #[test]
    fn alpha_14_weighted_spread() {
        let expected = 2_575.0 / (ASK_DEPTH + EPSILON) - 14_600.0 / (BID_DEPTH + EPSILON);
        assert_close!(alpha(14, None), expected);
        assert!((alpha(14, None) - (103.0 - 14_600.0 / 150.0)).abs() < 1e-5);
    }

    #[test]
    fn alpha_15_mean_level_difference() {
        assert_close!(alpha(15, None), 25.0);
    }

    #[test]
    fn alpha_16_decayed_imbalance() {
        // bid: 10 + 10 + 10 + 10 + 10; ask: 5 (1 + 1/2 + 1/3 + 1/4 + 1/5)
        let bid = 50.0;
        let ask = 5.0 * (1.0 + 0.5 + 1.0 / 3.0 + 0.25 + 0.2);
        assert_close!(alpha(16, None), (bid - ask) / (bid + ask + EPSILON));
    }

    #[test]
    fn alpha_17_ask1_change() {
        assert_eq!(alpha(17, None), 0.0);
        assert_close!(alpha(17, Some(&prev())), 1.0);
    }

    #[test]
    fn alpha_18_mid_change() {
        assert_eq!(alpha(18, None), 0.0);
        assert_close!(alpha(18, Some(&prev())), 100.5 - 99.0);
    }

    #[test]
    fn alpha_19_depth_ratio_change() {
        assert_eq!(alpha(19, None), 0.0);
        let expected = BID_DEPTH / (ASK_DEPTH + EPSILON) - 50.0 / (125.0 + EPSILON);
        assert_close!(alpha(19, Some(&prev())), expected);
    }

    #[test]
    fn alpha_20_spread_per_depth() {
        assert_close!(alpha(20, None), 1.0 / (175.0 + EPSILON));
    }

    #[test]
    fn empty_book_stays_finite() {
        let empty = Tick {
            bid_price: [0; LEVELS],
            bid_volume: [0; LEVELS],
            ask_price: [0; LEVELS],
            ask_volume: [0; LEVELS],
            total_bid_volume: 0,
            total_ask_volume: 0,
            ..book()
        };
        let factors = compute(&empty, Some(&prev()));
        assert!(factors.iter().all(|f| f.is_finite()), "{factors:?}");
        assert_eq!(factors[0], 0.0);
    }

    #[test]
    fn only_change_factors_depend_on_prev() {
        let without = compute(&book(), None);
        let with = compute(&book(), Some(&prev()));
        for i in 0..FACTOR_COUNT {
            if (16..19).contains(&i) {
                assert_ne!(without[i], with[i], "alpha_{}", i + 1);
            } else {
                assert_eq!(without[i], with[i], "alpha_{}", i + 1);
            }
        }
    }
}

//! One order-book snapshot per record.
//!
//! Record layout (comma separated, at least [`MIN_FIELDS`] fields):
//!
//! | field | content |
//! |---|---|
//! | 0 | trading day |
//! | 1 | trade time, `HHMMSS` as an integer |
//! | 4 | stock code |
//! | 12, 13 | total bid / ask volume |
//! | 17 + 4·k .. 20 + 4·k | level k+1: bid price, bid volume, ask price, ask volume |

/// Depth levels read from each record.
pub const LEVELS: usize = 5;
/// Records shorter than this are skipped.
pub const MIN_FIELDS: usize = 37;

const TRADING_DAY: usize = 0;
const TRADE_TIME: usize = 1;
const STOCK: usize = 4;
const TOTAL_BID_VOLUME: usize = 12;
const TOTAL_ASK_VOLUME: usize = 13;
const FIRST_LEVEL: usize = 17;
const LEVEL_STRIDE: usize = 4;

/// Why a record produced no tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Header line or blank line.
    Header,
    /// Fewer than [`MIN_FIELDS`] fields; carries the count.
    Short(usize),
    /// Trade time is not an integer.
    BadTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub trading_day: String,
    pub trade_time: i64,
    pub stock: String,
    pub total_bid_volume: i64,
    pub total_ask_volume: i64,
    pub bid_price: [i64; LEVELS],
    pub bid_volume: [i64; LEVELS],
    pub ask_price: [i64; LEVELS],
    pub ask_volume: [i64; LEVELS],
}

impl Tick {
    /// Parse one record. Numeric book fields that do not parse count as 0.
    pub fn from_fields(fields: &[&str]) -> Result<Tick, Skip> {
        let first = fields.first().map_or("", |f| f.trim());
        if first.is_empty() || first.starts_with("tradingDay") || first.starts_with("tradeTime") {
            return Err(Skip::Header);
        }
        if fields.len() < MIN_FIELDS {
            return Err(Skip::Short(fields.len()));
        }

        let trade_time = fields[TRADE_TIME]
            .trim()
            .parse::<i64>()
            .map_err(|_| Skip::BadTime)?;

        let mut tick = Tick {
            trading_day: fields[TRADING_DAY].trim().to_string(),
            trade_time,
            stock: fields[STOCK].trim().to_string(),
            total_bid_volume: int_or_zero(fields[TOTAL_BID_VOLUME]),
            total_ask_volume: int_or_zero(fields[TOTAL_ASK_VOLUME]),
            bid_price: [0; LEVELS],
            bid_volume: [0; LEVELS],
            ask_price: [0; LEVELS],
            ask_volume: [0; LEVELS],
        };
        for k in 0..LEVELS {
            let base = FIRST_LEVEL + k * LEVEL_STRIDE;
            tick.bid_price[k] = int_or_zero(fields[base]);
            tick.bid_volume[k] = int_or_zero(fields[base + 1]);
            tick.ask_price[k] = int_or_zero(fields[base + 2]);
            tick.ask_volume[k] = int_or_zero(fields[base + 3]);
        }
        Ok(tick)
    }

    pub fn ask1(&self) -> i64 {
        self.ask_price[0]
    }

    pub fn bid1(&self) -> i64 {
        self.bid_price[0]
    }

    /// Key of the previous-tick state: one stream per stock and trading day.
    pub fn stream_key(&self) -> (String, String) {
        (self.stock.clone(), self.trading_day.clone())
    }
}

fn int_or_zero(field: &str) -> i64 {
    field.trim().parse().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Previous tick of a stream
// ---------------------------------------------------------------------------

/// The part of a tick the change factors need on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrevTick {
    pub ask1: i64,
    pub bid1: i64,
    pub bid_volume: [i64; LEVELS],
    pub ask_volume: [i64; LEVELS],
}

impl From<&Tick> for PrevTick {
    fn from(tick: &Tick) -> Self {
        PrevTick {
            ask1: tick.ask1(),
            bid1: tick.bid1(),
            bid_volume: tick.bid_volume,
            ask_volume: tick.ask_volume,
        }
    }
}

// ---------------------------------------------------------------------------
// Trading session
// ---------------------------------------------------------------------------

const MORNING: (i64, i64) = (9 * 3600 + 30 * 60, 11 * 3600 + 30 * 60);
const AFTERNOON: (i64, i64) = (13 * 3600, 15 * 3600);

/// True for `HHMMSS` times in 09:30:00..=11:30:00 or 13:00:00..=15:00:00.
///
/// Values that do not fit six digits are never trading time.
pub fn is_trading_time(trade_time: i64) -> bool {
    if !(0..=999_999).contains(&trade_time) {
        return false;
    }
    let hours = trade_time / 10_000;
    let minutes = trade_time / 100 % 100;
    let seconds = trade_time % 100;
    let total = hours * 3600 + minutes * 60 + seconds;

    (MORNING.0..=MORNING.1).contains(&total) || (AFTERNOON.0..=AFTERNOON.1).contains(&total)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A full record; `levels[k]` is (bid price, bid volume, ask price, ask volume).
    pub(crate) fn record(
        day: &str,
        time: &str,
        stock: &str,
        totals: (i64, i64),
        levels: [(i64, i64, i64, i64); LEVELS],
    ) -> Vec<String> {
        let mut fields = vec!["0".to_string(); MIN_FIELDS];
        fields[TRADING_DAY] = day.to_string();
        fields[TRADE_TIME] = time.to_string();
        fields[STOCK] = stock.to_string();
        fields[TOTAL_BID_VOLUME] = totals.0.to_string();
        fields[TOTAL_ASK_VOLUME] = totals.1.to_string();
        for (k, (bp, bv, ap, av)) in levels.iter().enumerate() {
            let base = FIRST_LEVEL + k * LEVEL_STRIDE;
            fields[base] = bp.to_string();
            fields[base + 1] = bv.to_string();
            fields[base + 2] = ap.to_string();
            fields[base + 3] = av.to_string();
        }
        fields
    }

    fn parse(fields: &[String]) -> Result<Tick, Skip> {
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        Tick::from_fields(&refs)
    }

    #[test]
    fn reads_book_levels() {
        let levels = [
            (1000, 1, 1010, 2),
            (990, 3, 1020, 4),
            (980, 5, 1030, 6),
            (970, 7, 1040, 8),
            (960, 9, 1050, 10),
        ];
        let tick = parse(&record("20240102", "93000", "600000", (500, 400), levels)).unwrap();
        assert_eq!(tick.trading_day, "20240102");
        assert_eq!(tick.trade_time, 93000);
        assert_eq!(tick.stock, "600000");
        assert_eq!((tick.total_bid_volume, tick.total_ask_volume), (500, 400));
        assert_eq!(tick.bid_price, [1000, 990, 980, 970, 960]);
        assert_eq!(tick.bid_volume, [1, 3, 5, 7, 9]);
        assert_eq!(tick.ask_price, [1010, 1020, 1030, 1040, 1050]);
        assert_eq!(tick.ask_volume, [2, 4, 6, 8, 10]);
        assert_eq!((tick.bid1(), tick.ask1()), (1000, 1010));
    }

    #[test]
    fn skips_headers_and_short_lines() {
        let mut header = vec!["tradingDay".to_string(); MIN_FIELDS];
        header[1] = "tradeTime".into();
        assert_eq!(parse(&header), Err(Skip::Header));
        assert_eq!(Tick::from_fields(&["tradeTime", "x"]), Err(Skip::Header));
        assert_eq!(Tick::from_fields(&[""]), Err(Skip::Header));
        assert_eq!(Tick::from_fields(&["20240102", "93000", "x"]), Err(Skip::Short(3)));
    }

    #[test]
    fn bad_time_skips_and_bad_book_field_is_zero() {
        let levels = [(1000, 1, 1010, 2); LEVELS];
        let mut fields = record("20240102", "9:30", "600000", (1, 1), levels);
        assert_eq!(parse(&fields), Err(Skip::BadTime));

        fields[TRADE_TIME] = "93000".into();
        fields[FIRST_LEVEL + 1] = "n/a".into();
        let tick = parse(&fields).unwrap();
        assert_eq!(tick.bid_volume[0], 0);
        assert_eq!(tick.bid_price[0], 1000);
    }

    #[test]
    fn trading_session_bounds() {
        for t in [93000, 100000, 113000, 130000, 145700, 150000] {
            assert!(is_trading_time(t), "{t} rejected");
        }
        for t in [92959, 113001, 125959, 150001, 0, -1, 1_000_000] {
            assert!(!is_trading_time(t), "{t} accepted");
        }
    }

    #[test]
    fn prev_tick_keeps_top_of_book_and_depth() {
        let levels = [(1000, 1, 1010, 2), (990, 3, 1020, 4), (0, 0, 0, 0), (0, 0, 0, 0), (0, 0, 0, 0)];
        let tick = parse(&record("20240102", "93000", "600000", (1, 1), levels)).unwrap();
        let prev = PrevTick::from(&tick);
        assert_eq!((prev.ask1, prev.bid1), (1010, 1000));
        assert_eq!(prev.bid_volume, [1, 3, 0, 0, 0]);
        assert_eq!(prev.ask_volume, [2, 4, 0, 0, 0]);
    }
}

#![allow(missing_docs)]
//! Market data types: quotes, historical candles, instrument dumps.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{KiteError, Result};
use crate::types::time::{Timestamp, csv_timestamp};

// ---------------------------------------------------------------------------
// Shared snapshots
// ---------------------------------------------------------------------------

/// Open, high, low, close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// One level of market depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DepthItem {
    pub price: f64,
    pub quantity: u32,
    pub orders: u32,
}

/// Five levels of bids and offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Depth {
    pub buy: [DepthItem; 5],
    pub sell: [DepthItem; 5],
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Full market quote of one instrument.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QuoteData {
    pub instrument_token: u32,
    pub timestamp: Timestamp,
    pub last_price: f64,
    pub last_quantity: u32,
    pub last_trade_time: Timestamp,
    pub average_price: f64,
    pub volume: u64,
    pub buy_quantity: u64,
    pub sell_quantity: u64,
    pub ohlc: Ohlc,
    pub net_change: f64,
    pub oi: f64,
    pub oi_day_high: f64,
    pub oi_day_low: f64,
    pub lower_circuit_limit: f64,
    pub upper_circuit_limit: f64,
    pub depth: Depth,
}

/// OHLC quote of one instrument.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QuoteOhlcData {
    pub instrument_token: u32,
    pub last_price: f64,
    pub ohlc: Ohlc,
}

/// Last traded price of one instrument.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QuoteLtpData {
    pub instrument_token: u32,
    pub last_price: f64,
}

/// Full quotes keyed by `exchange:tradingsymbol`.
pub type Quote = HashMap<String, QuoteData>;
/// OHLC quotes keyed by `exchange:tradingsymbol`.
pub type QuoteOhlc = HashMap<String, QuoteOhlcData>;
/// LTP quotes keyed by `exchange:tradingsymbol`.
pub type QuoteLtp = HashMap<String, QuoteLtpData>;

/// Permitted trigger band of one instrument for cover orders.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TriggerRangeData {
    pub instrument_token: u32,
    pub lower: f64,
    pub upper: f64,
}

/// Trigger ranges keyed by `exchange:tradingsymbol`.
pub type TriggerRange = HashMap<String, TriggerRangeData>;

// ---------------------------------------------------------------------------
// Historical candles
// ---------------------------------------------------------------------------

/// One historical candle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalData {
    pub date: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub oi: i64,
}

/// Wire shape of the historical endpoint: positional arrays.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HistoricalCandles {
    pub candles: Vec<Vec<Value>>,
}

impl HistoricalCandles {
    pub(crate) fn into_records(self) -> Result<Vec<HistoricalData>> {
        self.candles
            .iter()
            .map(|c| HistoricalData::from_candle(c))
            .collect()
    }
}

impl HistoricalData {
    /// Decode `[date, open, high, low, close, volume, (oi)?]`, checking the
    /// type of every element.
    pub fn from_candle(candle: &[Value]) -> Result<Self> {
        if candle.len() < 6 {
            return Err(KiteError::data(format!(
                "Error decoding candle: expected at least 6 fields, got {}",
                candle.len()
            )));
        }

        let date = candle[0]
            .as_str()
            .ok_or_else(|| field_error("date", &candle[0]))?;
        let number = |idx: usize, name: &str| {
            candle[idx]
                .as_f64()
                .ok_or_else(|| field_error(name, &candle[idx]))
        };

        let open = number(1, "open")?;
        let high = number(2, "high")?;
        let low = number(3, "low")?;
        let close = number(4, "close")?;
        let volume = number(5, "volume")? as i64;
        let oi = match candle.get(6) {
            Some(_) => number(6, "oi")? as i64,
            None => 0,
        };

        Ok(Self {
            date: Timestamp::parse(date)?,
            open,
            high,
            low,
            close,
            volume,
            oi,
        })
    }
}

fn field_error(name: &str, value: &Value) -> KiteError {
    KiteError::data(format!("Error decoding response `{name}`: {value}"))
}

// ---------------------------------------------------------------------------
// Instrument dumps (CSV)
// ---------------------------------------------------------------------------

/// A row of the instruments dump.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Instrument {
    #[serde(deserialize_with = "csv_u32")]
    pub instrument_token: u32,
    #[serde(deserialize_with = "csv_u32")]
    pub exchange_token: u32,
    pub tradingsymbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "csv_f64")]
    pub last_price: f64,
    #[serde(default, deserialize_with = "csv_timestamp")]
    pub expiry: Timestamp,
    #[serde(rename = "strike", default, deserialize_with = "csv_f64")]
    pub strike_price: f64,
    #[serde(default, deserialize_with = "csv_f64")]
    pub tick_size: f64,
    #[serde(default, deserialize_with = "csv_f64")]
    pub lot_size: f64,
    #[serde(default)]
    pub instrument_type: String,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub exchange: String,
}

/// A row of the mutual fund instruments dump.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MFInstrument {
    pub tradingsymbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "csv_f64")]
    pub last_price: f64,
    #[serde(default)]
    pub amc: String,

    #[serde(default, deserialize_with = "csv_bool")]
    pub purchase_allowed: bool,
    #[serde(default, deserialize_with = "csv_bool")]
    pub redemption_allowed: bool,
    #[serde(default, deserialize_with = "csv_f64")]
    pub minimum_purchase_amount: f64,
    #[serde(default, deserialize_with = "csv_f64")]
    pub purchase_amount_multiplier: f64,
    #[serde(rename = "additional_purchase_multiple", default, deserialize_with = "csv_f64")]
    pub minimum_additional_purchase_amount: f64,
    #[serde(default, deserialize_with = "csv_f64")]
    pub minimum_redemption_quantity: f64,
    #[serde(default, deserialize_with = "csv_f64")]
    pub redemption_quantity_multiplier: f64,
    #[serde(default)]
    pub dividend_type: String,
    #[serde(default)]
    pub scheme_type: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub settlement_type: String,
    #[serde(default, deserialize_with = "csv_timestamp")]
    pub last_price_date: Timestamp,
}

fn csv_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse().map_err(serde::de::Error::custom)
}

fn csv_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse().map_err(serde::de::Error::custom)
}

fn csv_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" | "true" | "TRUE" | "True" => Ok(true),
        "" | "0" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid bool {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::decode_csv;
    use crate::types::time::IST_OFFSET_SECS;

    #[test]
    fn candle_with_implicit_oi() {
        let candle: Vec<Value> =
            serde_json::from_str(r#"["2020-01-02T09:15:00+0530",100.0,101.0,99.5,100.5,1234]"#).unwrap();
        let rec = HistoricalData::from_candle(&candle).unwrap();
        let dt = rec.date.as_datetime().unwrap();
        assert_eq!(dt.offset().local_minus_utc(), IST_OFFSET_SECS);
        assert_eq!(rec.date.to_string(), "2020-01-02T09:15:00+0530");
        assert_eq!((rec.open, rec.high, rec.low, rec.close), (100.0, 101.0, 99.5, 100.5));
        assert_eq!(rec.volume, 1234);
        assert_eq!(rec.oi, 0);
    }

    #[test]
    fn candle_with_oi() {
        let candle: Vec<Value> =
            serde_json::from_str(r#"["2020-01-02T09:15:00+0530",1,2,0.5,1.5,10,13667775]"#).unwrap();
        assert_eq!(HistoricalData::from_candle(&candle).unwrap().oi, 13667775);
    }

    #[test]
    fn candle_type_mismatch_names_the_field() {
        let candle: Vec<Value> =
            serde_json::from_str(r#"["2020-01-02T09:15:00+0530",1,"2",0.5,1.5,10]"#).unwrap();
        let err = HistoricalData::from_candle(&candle).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.message().contains("`high`"));

        let candle: Vec<Value> = serde_json::from_str(r#"[20200102,1,2,0.5,1.5,10]"#).unwrap();
        let err = HistoricalData::from_candle(&candle).unwrap_err();
        assert!(err.message().contains("`date`"));

        let short: Vec<Value> = serde_json::from_str(r#"["2020-01-02T09:15:00+0530",1,2]"#).unwrap();
        assert_eq!(HistoricalData::from_candle(&short).unwrap_err().kind(), ErrorKind::Data);
    }

    #[test]
    fn candles_envelope_decodes() {
        let json = r#"{"candles":[["2020-01-02T09:15:00+0530",100.0,101.0,99.5,100.5,1234]]}"#;
        let raw: HistoricalCandles = serde_json::from_str(json).unwrap();
        let records = raw.into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].volume, 1234);
    }

    #[test]
    fn instruments_csv_decodes() {
        let body = "instrument_token,exchange_token,tradingsymbol,name,last_price,expiry,strike,tick_size,lot_size,instrument_type,segment,exchange\n\
3813889,14898,CENTRALBK-BE,CENTRAL BANK OF INDIA,0,,0,0.05,1,EQ,NSE,NSE\n\
12073986,47164,BANKNIFTY21JUNFUT,\"BANKNIFTY\",0,2021-06-24,0,0.05,25,FUT,NFO-FUT,NFO\n";
        let rows: Vec<Instrument> = decode_csv(200, body.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].expiry.is_zero());
        assert_eq!(rows[1].name, "BANKNIFTY");
        assert_eq!(rows[1].lot_size, 25.0);
        assert_eq!(rows[1].expiry.to_string(), "2021-06-24T00:00:00+0530");
    }

    #[test]
    fn mf_instruments_csv_decodes() {
        let body = "tradingsymbol,amc,name,purchase_allowed,redemption_allowed,minimum_purchase_amount,purchase_amount_multiplier,additional_purchase_multiple,minimum_redemption_quantity,redemption_quantity_multiplier,dividend_type,scheme_type,plan,settlement_type,last_price,last_price_date\n\
INF209K01157,BirlaSunLifeMutualFund_MF,Aditya Birla Sun Life Advantage Fund,1,1,1000,1,1000,0.001,0.001,payout,equity,regular,T3,106.8,2021-06-25\n";
        let rows: Vec<MFInstrument> = decode_csv(200, body.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].purchase_allowed);
        assert_eq!(rows[0].minimum_additional_purchase_amount, 1000.0);
        assert!(!rows[0].last_price_date.is_zero());
    }
}

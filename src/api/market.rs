//! Market data endpoints: quotes, historical candles, instrument dumps,
//! trigger ranges.

use chrono::NaiveDateTime;

use crate::client::{KiteClient, endpoint};
use crate::constants::{PathArg, endpoints};
use crate::error::Result;
use crate::types::enums::{Exchange, Interval};
use crate::types::market::*;

/// Wall-clock layout of the `from`/`to` parameters (interpreted as IST).
const HISTORICAL_PARAM_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

fn instrument_params(instruments: &[&str]) -> Vec<(String, String)> {
    instruments
        .iter()
        .map(|i| ("i".to_owned(), (*i).to_owned()))
        .collect()
}

fn flag(b: bool) -> String {
    if b { "1" } else { "0" }.to_owned()
}

impl KiteClient {
    // -----------------------------------------------------------------------
    // Quotes
    // -----------------------------------------------------------------------

    /// Full market quotes for instruments given as `exchange:tradingsymbol`.
    ///
    /// **Endpoint:** `GET /quote`
    pub async fn get_quote(&self, instruments: &[&str]) -> Result<Quote> {
        self.get(endpoints::GET_QUOTE, &instrument_params(instruments))
            .await
    }

    /// Last traded prices for instruments given as `exchange:tradingsymbol`.
    ///
    /// **Endpoint:** `GET /quote/ltp`
    pub async fn get_ltp(&self, instruments: &[&str]) -> Result<QuoteLtp> {
        self.get(endpoints::GET_LTP, &instrument_params(instruments))
            .await
    }

    /// OHLC quotes for instruments given as `exchange:tradingsymbol`.
    ///
    /// **Endpoint:** `GET /quote/ohlc`
    pub async fn get_ohlc(&self, instruments: &[&str]) -> Result<QuoteOhlc> {
        self.get(endpoints::GET_OHLC, &instrument_params(instruments))
            .await
    }

    /// Permitted trigger band for cover orders on one instrument.
    ///
    /// **Endpoint:** `GET /instruments/{exchange}/{tradingsymbol}/trigger_range`
    pub async fn get_trigger_range(&self, exchange: Exchange, tradingsymbol: &str) -> Result<TriggerRange> {
        let path = endpoint(
            endpoints::GET_TRIGGER_RANGE,
            &[exchange.as_str().into(), tradingsymbol.into()],
        )?;
        self.get(&path, &[]).await
    }

    // -----------------------------------------------------------------------
    // Historical
    // -----------------------------------------------------------------------

    /// Historical candles for an instrument between `from` and `to`
    /// (wall-clock IST).
    ///
    /// `continuous` stitches expired futures contracts together; `oi` adds
    /// open interest to each candle.
    ///
    /// **Endpoint:** `GET /instruments/historical/{instrument_token}/{interval}`
    pub async fn get_historical_data(
        &self,
        instrument_token: u32,
        interval: Interval,
        from: NaiveDateTime,
        to: NaiveDateTime,
        continuous: bool,
        oi: bool,
    ) -> Result<Vec<HistoricalData>> {
        let path = endpoint(
            endpoints::GET_HISTORICAL,
            &[PathArg::from(instrument_token), interval.as_str().into()],
        )?;
        let params = vec![
            ("from".to_owned(), from.format(HISTORICAL_PARAM_LAYOUT).to_string()),
            ("to".to_owned(), to.format(HISTORICAL_PARAM_LAYOUT).to_string()),
            ("continuous".to_owned(), flag(continuous)),
            ("oi".to_owned(), flag(oi)),
        ];

        let raw: HistoricalCandles = self.get(&path, &params).await?;
        raw.into_records()
    }

    // -----------------------------------------------------------------------
    // Instrument dumps
    // -----------------------------------------------------------------------

    /// Every tradable instrument across exchanges. The dump is large (tens of
    /// megabytes); fetch it once a day.
    ///
    /// **Endpoint:** `GET /instruments`
    pub async fn get_instruments(&self) -> Result<Vec<Instrument>> {
        self.get_csv(endpoints::GET_INSTRUMENTS).await
    }

    /// Tradable instruments of one exchange.
    ///
    /// **Endpoint:** `GET /instruments/{exchange}`
    pub async fn get_instruments_by_exchange(&self, exchange: Exchange) -> Result<Vec<Instrument>> {
        let path = endpoint(endpoints::GET_INSTRUMENTS_EXCHANGE, &[exchange.as_str().into()])?;
        self.get_csv(&path).await
    }

    /// Every mutual fund scheme available for investment.
    ///
    /// **Endpoint:** `GET /mf/instruments`
    pub async fn get_mf_instruments(&self) -> Result<Vec<MFInstrument>> {
        self.get_csv(endpoints::GET_MF_INSTRUMENTS).await
    }
}

#![allow(missing_docs)]
//! Binary tick decoding for the Kite ticker.
//!
//! Every binary frame from `wss://ws.kite.trade` carries one or more packets:
//!
//! ```text
//! +--------+--------+-----------+--------+-----------+----
//! | n: u16 | l1: u16| packet 1  | l2: u16| packet 2  | ...
//! +--------+--------+-----------+--------+-----------+----
//! ```
//!
//! All integers are big-endian. The packet length selects the layout:
//!
//! | length | layout |
//! |---|---|
//! | 8   | LTP |
//! | 28  | index quote |
//! | 32  | index full (quote + exchange timestamp) |
//! | 44  | quote |
//! | 184 | full (quote + OI + timestamps + 5-level depth) |
//!
//! Frames shorter than two bytes are heartbeats and decode to no ticks.
//!
//! # Example
//!
//! ```
//! use kite_rs::ws::market_feed::{Mode, parse_binary};
//!
//! let frame = [
//!     0x00, 0x01, // one packet
//!     0x00, 0x08, // eight bytes long
//!     0x00, 0x06, 0x3A, 0xC1, // token 408257
//!     0x00, 0x18, 0x05, 0x7C, // last price 1574268 paise
//! ];
//! let ticks = parse_binary(&frame).unwrap();
//! assert_eq!(ticks[0].mode, Mode::Ltp);
//! assert_eq!(ticks[0].last_price, 15742.68);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{KiteError, Result};
use crate::types::market::{Depth, DepthItem, Ohlc};
use crate::types::time::Timestamp;

// ---------------------------------------------------------------------------
// Exchange segments (low byte of the instrument token)
// ---------------------------------------------------------------------------

pub const NSE_CM: u32 = 1;
pub const NSE_FO: u32 = 2;
pub const NSE_CD: u32 = 3;
pub const BSE_CM: u32 = 4;
pub const BSE_FO: u32 = 5;
pub const BSE_CD: u32 = 6;
pub const MCX_FO: u32 = 7;
pub const MCX_SX: u32 = 8;
pub const INDICES: u32 = 9;

const LTP_PACKET_LEN: usize = 8;
const INDEX_QUOTE_PACKET_LEN: usize = 28;
const INDEX_FULL_PACKET_LEN: usize = 32;
const QUOTE_PACKET_LEN: usize = 44;
const FULL_PACKET_LEN: usize = 184;

const DEPTH_BUY_OFFSET: usize = 64;
const DEPTH_SELL_OFFSET: usize = 124;
const DEPTH_ENTRY_LEN: usize = 12;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Streaming mode of a subscription, and of the tick that it produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Last traded price only.
    #[default]
    Ltp,
    /// LTP, OHLC, volume and buy/sell totals.
    Quote,
    /// Quote plus OI, timestamps and market depth.
    Full,
}

impl Mode {
    /// Wire name used in `mode` control frames.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ltp => "ltp",
            Mode::Quote => "quote",
            Mode::Full => "full",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One decoded market data packet.
///
/// Fields absent from the packet's layout keep their default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tick {
    pub mode: Mode,
    pub instrument_token: u32,
    pub is_tradable: bool,
    pub is_index: bool,

    /// Exchange timestamp (full modes only).
    pub timestamp: Timestamp,
    pub last_trade_time: Timestamp,
    pub last_price: f64,
    pub last_traded_quantity: u32,
    pub total_buy_quantity: u32,
    pub total_sell_quantity: u32,
    pub volume_traded: u32,
    pub average_trade_price: f64,
    pub oi: u32,
    pub oi_day_high: u32,
    pub oi_day_low: u32,
    /// `last_price - ohlc.close`.
    pub net_change: f64,

    pub ohlc: Ohlc,
    pub depth: Depth,
}

// ---------------------------------------------------------------------------
// Big-endian readers
// ---------------------------------------------------------------------------
//
// Callers check the packet length before reading, so offsets are always in
// bounds.

#[inline(always)]
fn read_u16_be(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

#[inline(always)]
fn read_u32_be(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

#[inline(always)]
fn read_price(data: &[u8], at: usize, divisor: f64) -> f64 {
    f64::from(read_u32_be(data, at)) / divisor
}

#[inline(always)]
fn read_time(data: &[u8], at: usize) -> Timestamp {
    match read_u32_be(data, at) {
        0 => Timestamp::ZERO,
        secs => Timestamp::from_unix(i64::from(secs)),
    }
}

/// Divisor that turns a wire price of the given segment into rupees.
pub fn price_divisor(segment: u32) -> f64 {
    if segment == NSE_CD { 10_000_000.0 } else { 100.0 }
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Split a binary frame into its packets.
///
/// A frame shorter than two bytes is a heartbeat and yields no packets.
/// A missing length prefix, or a length that runs past the end of the
/// frame, is a `Data` error.
pub fn split_packets(frame: &[u8]) -> Result<Vec<&[u8]>> {
    let (packets, err) = split_partial(frame);
    match err {
        Some(e) => Err(e),
        None => Ok(packets),
    }
}

fn split_partial(frame: &[u8]) -> (Vec<&[u8]>, Option<KiteError>) {
    if frame.len() < 2 {
        return (Vec::new(), None);
    }

    let count = read_u16_be(frame, 0) as usize;
    let mut packets = Vec::with_capacity(count);
    let mut offset = 2;

    for i in 0..count {
        if offset + 2 > frame.len() {
            let err = KiteError::data(format!(
                "truncated frame: packet {} of {count} has no length prefix",
                i + 1
            ));
            return (packets, Some(err));
        }
        let len = read_u16_be(frame, offset) as usize;
        offset += 2;

        if offset + len > frame.len() {
            let err = KiteError::data(format!(
                "truncated frame: packet {} declares {len} bytes, {} remain",
                i + 1,
                frame.len() - offset
            ));
            return (packets, Some(err));
        }
        packets.push(&frame[offset..offset + len]);
        offset += len;
    }

    (packets, None)
}

// ---------------------------------------------------------------------------
// Packet decoding
// ---------------------------------------------------------------------------

/// Decode a single packet (without its length prefix).
pub fn parse_packet(data: &[u8]) -> Result<Tick> {
    if data.len() < 4 {
        return Err(KiteError::data(format!(
            "unknown packet length {}",
            data.len()
        )));
    }

    let instrument_token = read_u32_be(data, 0);
    let segment = instrument_token & 0xFF;
    let is_index = segment == INDICES;
    let div = price_divisor(segment);

    let mut tick = Tick {
        instrument_token,
        is_index,
        is_tradable: !is_index,
        ..Tick::default()
    };

    match data.len() {
        LTP_PACKET_LEN => {
            tick.mode = Mode::Ltp;
            tick.last_price = read_price(data, 4, div);
        }

        INDEX_QUOTE_PACKET_LEN | INDEX_FULL_PACKET_LEN => {
            tick.mode = if data.len() == INDEX_FULL_PACKET_LEN {
                Mode::Full
            } else {
                Mode::Quote
            };
            tick.last_price = read_price(data, 4, div);
            tick.ohlc = Ohlc {
                high: read_price(data, 8, div),
                low: read_price(data, 12, div),
                open: read_price(data, 16, div),
                close: read_price(data, 20, div),
            };
            tick.net_change = tick.last_price - tick.ohlc.close;

            if data.len() == INDEX_FULL_PACKET_LEN {
                tick.timestamp = read_time(data, 28);
            }
        }

        QUOTE_PACKET_LEN | FULL_PACKET_LEN => {
            tick.mode = if data.len() == FULL_PACKET_LEN {
                Mode::Full
            } else {
                Mode::Quote
            };
            tick.last_price = read_price(data, 4, div);
            tick.last_traded_quantity = read_u32_be(data, 8);
            tick.average_trade_price = read_price(data, 12, div);
            tick.volume_traded = read_u32_be(data, 16);
            tick.total_buy_quantity = read_u32_be(data, 20);
            tick.total_sell_quantity = read_u32_be(data, 24);
            tick.ohlc = Ohlc {
                open: read_price(data, 28, div),
                high: read_price(data, 32, div),
                low: read_price(data, 36, div),
                close: read_price(data, 40, div),
            };
            tick.net_change = tick.last_price - tick.ohlc.close;

            if data.len() == FULL_PACKET_LEN {
                tick.last_trade_time = read_time(data, 44);
                tick.oi = read_u32_be(data, 48);
                tick.oi_day_high = read_u32_be(data, 52);
                tick.oi_day_low = read_u32_be(data, 56);
                tick.timestamp = read_time(data, 60);

                for level in 0..5 {
                    tick.depth.buy[level] =
                        read_depth_item(data, DEPTH_BUY_OFFSET + level * DEPTH_ENTRY_LEN, div);
                    tick.depth.sell[level] =
                        read_depth_item(data, DEPTH_SELL_OFFSET + level * DEPTH_ENTRY_LEN, div);
                }
            }
        }

        other => {
            return Err(KiteError::data(format!(
                "unknown packet length {other} for instrument {instrument_token}"
            )));
        }
    }

    Ok(tick)
}

#[inline(always)]
fn read_depth_item(data: &[u8], at: usize, div: f64) -> DepthItem {
    DepthItem {
        quantity: read_u32_be(data, at),
        price: read_price(data, at + 4, div),
        orders: u32::from(read_u16_be(data, at + 8)),
    }
}

/// Decode every tick in a binary frame. Fails on the first bad packet.
pub fn parse_binary(frame: &[u8]) -> Result<Vec<Tick>> {
    let (ticks, err) = decode_frame(frame);
    match err {
        Some(e) => Err(e),
        None => Ok(ticks),
    }
}

/// Decode a binary frame, keeping the ticks that precede a bad packet.
///
/// Returns the ticks decoded in order and, if decoding stopped early, the
/// error that stopped it.
pub fn decode_frame(frame: &[u8]) -> (Vec<Tick>, Option<KiteError>) {
    let (packets, split_err) = split_partial(frame);
    let mut ticks = Vec::with_capacity(packets.len());

    for packet in packets {
        match parse_packet(packet) {
            Ok(tick) => ticks.push(tick),
            Err(e) => return (ticks, Some(e)),
        }
    }

    (ticks, split_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn frame(packets: &[Vec<u8>]) -> Vec<u8> {
        let mut out = (packets.len() as u16).to_be_bytes().to_vec();
        for p in packets {
            out.extend_from_slice(&(p.len() as u16).to_be_bytes());
            out.extend_from_slice(p);
        }
        out
    }

    fn put_u32(buf: &mut [u8], at: usize, v: u32) {
        buf[at..at + 4].copy_from_slice(&v.to_be_bytes());
    }

    fn ltp_packet(token: u32, price: u32) -> Vec<u8> {
        let mut p = vec![0u8; LTP_PACKET_LEN];
        put_u32(&mut p, 0, token);
        put_u32(&mut p, 4, price);
        p
    }

    #[test]
    fn ltp_tick_then_truncated_slot() {
        let data = [
            0x00, 0x02, 0x00, 0x08, 0x00, 0x06, 0x3A, 0xC1, 0x00, 0x18, 0x05, 0x7C,
        ];

        let (ticks, err) = decode_frame(&data);
        assert_eq!(ticks.len(), 1);
        let t = &ticks[0];
        assert_eq!(t.mode, Mode::Ltp);
        assert_eq!(t.instrument_token, 408257);
        assert!(!t.is_index);
        assert!(t.is_tradable);
        assert!((t.last_price - 15742.68).abs() < 1e-9);

        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::Data));
        assert!(parse_binary(&data).is_err());
    }

    #[test]
    fn two_ltp_packets() {
        let data = frame(&[ltp_packet(408257, 1574268), ltp_packet(256265, 2_000_000)]);
        let ticks = parse_binary(&data).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].instrument_token, 408257);
        assert_eq!(ticks[1].instrument_token, 256265);
        assert!(ticks[1].is_index);
        assert_eq!(ticks[1].last_price, 20000.0);
    }

    #[test]
    fn declared_length_past_end_is_data_error() {
        let mut data = frame(&[ltp_packet(408257, 100)]);
        data.truncate(data.len() - 3);
        let err = split_packets(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn short_frames_are_heartbeats() {
        assert!(parse_binary(&[]).unwrap().is_empty());
        assert!(parse_binary(&[0x01]).unwrap().is_empty());
        assert!(parse_binary(&[0x00, 0x00]).unwrap().is_empty());
    }

    #[test]
    fn index_quote_net_change() {
        let mut p = vec![0u8; INDEX_QUOTE_PACKET_LEN];
        put_u32(&mut p, 0, 0x0000_0109);
        put_u32(&mut p, 4, 15_000_000);
        put_u32(&mut p, 8, 15_200_000);
        put_u32(&mut p, 12, 14_900_000);
        put_u32(&mut p, 16, 14_950_000);
        put_u32(&mut p, 20, 14_980_000);

        let t = parse_packet(&p).unwrap();
        assert_eq!(t.mode, Mode::Quote);
        assert!(t.is_index);
        assert!(!t.is_tradable);
        assert_eq!(t.last_price, 150000.0);
        assert_eq!(
            t.ohlc,
            Ohlc { open: 149500.0, high: 152000.0, low: 149000.0, close: 149800.0 }
        );
        assert!((t.net_change - 200.0).abs() < 1e-9);
        assert!(t.timestamp.is_zero());
    }

    #[test]
    fn index_full_carries_timestamp() {
        let mut p = vec![0u8; INDEX_FULL_PACKET_LEN];
        put_u32(&mut p, 0, 0x0000_0109);
        put_u32(&mut p, 28, 1_577_936_700);

        let t = parse_packet(&p).unwrap();
        assert_eq!(t.mode, Mode::Full);
        assert_eq!(t.timestamp.unix(), Some(1_577_936_700));
    }

    #[test]
    fn segment_scaling() {
        let cd = parse_packet(&ltp_packet(0x0000_0A03, 10_000_000)).unwrap();
        assert_eq!(cd.last_price, 1.0);

        let cm = parse_packet(&ltp_packet(0x0000_0A01, 15_731_500)).unwrap();
        assert_eq!(cm.last_price, 157315.0);
    }

    #[test]
    fn quote_layout() {
        let mut p = vec![0u8; QUOTE_PACKET_LEN];
        put_u32(&mut p, 0, 408065);
        put_u32(&mut p, 4, 157_340);
        put_u32(&mut p, 8, 10);
        put_u32(&mut p, 12, 157_000);
        put_u32(&mut p, 16, 123_456);
        put_u32(&mut p, 20, 700);
        put_u32(&mut p, 24, 800);
        put_u32(&mut p, 28, 156_000);
        put_u32(&mut p, 32, 158_000);
        put_u32(&mut p, 36, 155_000);
        put_u32(&mut p, 40, 156_340);

        let t = parse_packet(&p).unwrap();
        assert_eq!(t.mode, Mode::Quote);
        assert_eq!(t.last_traded_quantity, 10);
        assert_eq!(t.average_trade_price, 1570.0);
        assert_eq!(t.volume_traded, 123_456);
        assert_eq!(t.total_buy_quantity, 700);
        assert_eq!(t.total_sell_quantity, 800);
        assert_eq!(t.ohlc.open, 1560.0);
        assert_eq!(t.ohlc.close, 1563.4);
        assert!((t.net_change - 10.0).abs() < 1e-9);
        assert!(t.last_trade_time.is_zero());
    }

    #[test]
    fn full_tick_depth() {
        let mut p = vec![0u8; FULL_PACKET_LEN];
        put_u32(&mut p, 0, 408065);
        put_u32(&mut p, 4, 157_340);
        put_u32(&mut p, 44, 1_577_936_700);
        put_u32(&mut p, 48, 1_000);
        put_u32(&mut p, 52, 1_200);
        put_u32(&mut p, 56, 900);
        put_u32(&mut p, 60, 1_577_936_701);

        put_u32(&mut p, DEPTH_BUY_OFFSET, 5);
        put_u32(&mut p, DEPTH_BUY_OFFSET + 4, 157_340);
        p[DEPTH_BUY_OFFSET + 8..DEPTH_BUY_OFFSET + 10].copy_from_slice(&1u16.to_be_bytes());

        let sell = DEPTH_SELL_OFFSET + 4 * DEPTH_ENTRY_LEN;
        put_u32(&mut p, sell, 7);
        put_u32(&mut p, sell + 4, 157_500);
        p[sell + 8..sell + 10].copy_from_slice(&3u16.to_be_bytes());

        let t = parse_packet(&p).unwrap();
        assert_eq!(t.mode, Mode::Full);
        assert_eq!(t.oi, 1_000);
        assert_eq!(t.oi_day_high, 1_200);
        assert_eq!(t.oi_day_low, 900);
        assert_eq!(t.last_trade_time.unix(), Some(1_577_936_700));
        assert_eq!(t.timestamp.unix(), Some(1_577_936_701));

        assert_eq!(
            t.depth.buy[0],
            DepthItem { price: 1573.40, quantity: 5, orders: 1 }
        );
        assert_eq!(
            t.depth.sell[4],
            DepthItem { price: 1575.0, quantity: 7, orders: 3 }
        );
        assert_eq!(t.depth.buy[1], DepthItem::default());
    }

    #[test]
    fn unknown_packet_length_is_data_error() {
        let err = parse_packet(&[0u8; 12]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);

        let data = frame(&[ltp_packet(408257, 100), vec![0u8; 12]]);
        let (ticks, err) = decode_frame(&data);
        assert_eq!(ticks.len(), 1);
        assert!(err.is_some());
    }

    #[test]
    fn mode_wire_names() {
        assert_eq!(serde_json::to_string(&Mode::Full).unwrap(), "\"full\"");
        assert_eq!(Mode::Quote.as_str(), "quote");
        assert_eq!(Mode::Ltp.to_string(), "ltp");
    }
}

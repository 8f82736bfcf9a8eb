//! Shared enum types that map directly to Kite Connect string values.
//!
//! Each enum serializes to the exact wire string and exposes it through
//! `as_str()` for URL path segments. Response records keep these fields as
//! plain `String`s so that values added server-side never fail a decode.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// The wire string.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

wire_enum! {
    /// Order variety; the path segment of order placement endpoints.
    pub enum Variety {
        Regular => "regular",
        /// After-market order.
        Amo => "amo",
        /// Cover order.
        Co => "co",
        Iceberg => "iceberg",
        Auction => "auction",
    }
}

wire_enum! {
    /// Margin product.
    pub enum Product {
        /// Cash & Carry for equity deliveries.
        Cnc => "CNC",
        /// Normal margin for futures and options.
        Nrml => "NRML",
        /// Intraday.
        Mis => "MIS",
        /// Margin Trading Facility.
        Mtf => "MTF",
    }
}

wire_enum! {
    /// Order type.
    pub enum OrderType {
        Market => "MARKET",
        Limit => "LIMIT",
        /// Stop-loss limit.
        Sl => "SL",
        /// Stop-loss market.
        SlM => "SL-M",
    }
}

wire_enum! {
    /// Order validity.
    pub enum Validity {
        Day => "DAY",
        /// Immediate or cancel.
        Ioc => "IOC",
        /// Time to live, in minutes (`validity_ttl`).
        Ttl => "TTL",
    }
}

wire_enum! {
    /// Buy or sell side of a transaction.
    pub enum TransactionType {
        Buy => "BUY",
        Sell => "SELL",
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

wire_enum! {
    /// Exchange identifier.
    pub enum Exchange {
        Nse => "NSE",
        Bse => "BSE",
        /// NSE futures & options.
        Nfo => "NFO",
        /// NSE currency derivatives.
        Cds => "CDS",
        /// BSE futures & options.
        Bfo => "BFO",
        /// BSE currency derivatives.
        Bcd => "BCD",
        Mcx => "MCX",
    }
}

wire_enum! {
    /// Candle interval for historical data.
    pub enum Interval {
        Minute => "minute",
        ThreeMinute => "3minute",
        FiveMinute => "5minute",
        TenMinute => "10minute",
        FifteenMinute => "15minute",
        ThirtyMinute => "30minute",
        SixtyMinute => "60minute",
        Day => "day",
    }
}

wire_enum! {
    /// Segment of the funds & margins statement.
    pub enum MarginSegment {
        Equity => "equity",
        Commodity => "commodity",
    }
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

wire_enum! {
    /// Position bucket used by position conversion.
    pub enum PositionType {
        Day => "day",
        Overnight => "overnight",
    }
}

wire_enum! {
    /// What a holdings authorisation covers.
    pub enum HoldingAuthType {
        MutualFund => "mf",
        Equity => "equity",
    }
}

wire_enum! {
    /// Transfer type of a holdings authorisation.
    pub enum HoldingAuthTransferType {
        PreTrade => "pre",
        PostTrade => "post",
        OffMarket => "off",
        Gift => "gift",
    }
}

/// Order status strings reported in [`Order::status`](crate::types::orders::Order::status).
pub mod order_status {
    pub const COMPLETE: &str = "COMPLETE";
    pub const REJECTED: &str = "REJECTED";
    pub const CANCELLED: &str = "CANCELLED";
    pub const OPEN: &str = "OPEN";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_strings() {
        assert_eq!(serde_json::to_string(&OrderType::SlM).unwrap(), "\"SL-M\"");
        assert_eq!(serde_json::to_string(&Interval::ThreeMinute).unwrap(), "\"3minute\"");
        let v: Variety = serde_json::from_str("\"amo\"").unwrap();
        assert_eq!(v, Variety::Amo);
        assert_eq!(Exchange::Nfo.to_string(), "NFO");
    }
}

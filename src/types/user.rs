#![allow(missing_docs)]
//! Session, profile and funds & margins types.

use serde::{Deserialize, Serialize};

use crate::types::time::Timestamp;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Response of the request-token exchange.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserSession {
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "user_shortname")]
    pub user_short_name: String,
    pub avatar_url: Option<String>,
    pub user_type: String,
    pub email: String,
    pub broker: String,
    pub meta: UserMeta,
    pub products: Vec<String>,
    pub order_types: Vec<String>,
    pub exchanges: Vec<String>,

    pub api_key: String,
    pub access_token: String,
    pub refresh_token: String,
    pub public_token: String,
    pub login_time: Timestamp,
}

impl UserSession {
    /// The token part of the session.
    pub fn tokens(&self) -> UserSessionTokens {
        UserSessionTokens {
            user_id: self.user_id.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Response of an access token renewal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserSessionTokens {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Extra account flags.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserMeta {
    pub demat_consent: String,
}

/// A bank account on the user's file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Bank {
    pub name: String,
    pub branch: String,
    pub account: String,
}

/// The user's profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "user_shortname")]
    pub user_short_name: String,
    pub avatar_url: Option<String>,
    pub user_type: String,
    pub email: String,
    pub broker: String,
    pub meta: UserMeta,
    pub products: Vec<String>,
    pub order_types: Vec<String>,
    pub exchanges: Vec<String>,
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

/// Funds and margins for one segment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Margins {
    pub enabled: bool,
    pub net: f64,
    pub available: AvailableMargins,
    #[serde(rename = "utilised")]
    pub used: UsedMargins,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AvailableMargins {
    pub adhoc_margin: f64,
    pub cash: f64,
    pub collateral: f64,
    pub intraday_payin: f64,
    pub live_balance: f64,
    pub opening_balance: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UsedMargins {
    pub debits: f64,
    pub exposure: f64,
    pub m2m_realised: f64,
    pub m2m_unrealised: f64,
    pub option_premium: f64,
    pub payout: f64,
    pub span: f64,
    pub holding_sales: f64,
    pub turnover: f64,
    pub liquid_collateral: f64,
    pub stock_collateral: f64,
    pub delivery: f64,
}

/// Equity and commodity margins together.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AllMargins {
    pub equity: Margins,
    pub commodity: Margins,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_decodes_profile_and_tokens() {
        let json = r#"{
            "user_id": "XX0000",
            "user_name": "Kite Connect",
            "user_shortname": "Connect",
            "email": "kite@kite.trade",
            "user_type": "investor",
            "broker": "ZERODHA",
            "exchanges": ["NSE", "BSE"],
            "products": ["CNC", "MIS"],
            "order_types": ["MARKET", "LIMIT"],
            "api_key": "xxx",
            "access_token": "yyy",
            "public_token": "zzz",
            "refresh_token": "",
            "login_time": "2018-01-01 16:15:14",
            "avatar_url": null
        }"#;
        let session: UserSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.user_short_name, "Connect");
        assert_eq!(session.tokens().access_token, "yyy");
        assert!(!session.login_time.is_zero());
        assert!(session.avatar_url.is_none());
    }

    #[test]
    fn margins_use_the_utilised_key() {
        let json = r#"{"enabled":true,"net":99725.05,"available":{"cash":245431.6},"utilised":{"debits":145706.55}}"#;
        let m: Margins = serde_json::from_str(json).unwrap();
        assert!(m.enabled);
        assert_eq!(m.used.debits, 145706.55);
        assert_eq!(m.available.cash, 245431.6);
    }
}

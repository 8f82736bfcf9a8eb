//! Portfolio endpoints: holdings, positions, position conversion, holdings
//! authorisation.

use serde::de::IgnoredAny;

use crate::client::KiteClient;
use crate::constants::{KITE_BASE_URL, endpoints};
use crate::error::Result;
use crate::http::form_params;
use crate::types::portfolio::*;

/// Page the user is sent to for authorising the holdings of `request_id`.
pub fn holdings_auth_url(api_key: &str, request_id: &str) -> String {
    format!("{KITE_BASE_URL}/connect/portfolio/authorize/holdings/{api_key}/{request_id}")
}

impl KiteClient {
    /// Retrieve long-term equity holdings.
    ///
    /// **Endpoint:** `GET /portfolio/holdings`
    pub async fn get_holdings(&self) -> Result<Vec<Holding>> {
        self.get(endpoints::GET_HOLDINGS, &[]).await
    }

    /// Retrieve net and day positions.
    ///
    /// **Endpoint:** `GET /portfolio/positions`
    pub async fn get_positions(&self) -> Result<Positions> {
        self.get(endpoints::GET_POSITIONS, &[]).await
    }

    /// Convert a position's product (e.g. intraday to delivery). Returns
    /// `true` on success.
    ///
    /// **Endpoint:** `PUT /portfolio/positions`
    pub async fn convert_position(&self, params: &ConvertPositionParams) -> Result<bool> {
        self.put::<IgnoredAny>(endpoints::CONVERT_POSITION, &form_params(params)?)
            .await?;
        Ok(true)
    }

    /// Start a holdings authorisation (CDSL TPIN) flow. The response carries
    /// the URL to open in a browser for the user to complete it.
    ///
    /// **Endpoint:** `POST /portfolio/holdings/authorise`
    pub async fn initiate_holdings_auth(&self, params: &HoldingAuthParams) -> Result<HoldingsAuthResponse> {
        let mut resp: HoldingsAuthResponse = self
            .post(endpoints::INIT_HOLDINGS_AUTH, &params.to_params())
            .await?;
        resp.redirect_url = holdings_auth_url(self.api_key(), &resp.request_id);
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_url_layout() {
        assert_eq!(
            holdings_auth_url("key", "req-1"),
            "https://kite.zerodha.com/connect/portfolio/authorize/holdings/key/req-1"
        );
    }
}

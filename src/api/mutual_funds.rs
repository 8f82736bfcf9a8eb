//! Mutual fund endpoints: orders, SIPs, holdings, allotments.

use crate::client::{KiteClient, endpoint};
use crate::constants::endpoints;
use crate::error::Result;
use crate::http::form_params;
use crate::types::mutual_funds::*;

impl KiteClient {
    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    /// Retrieve mutual fund orders.
    ///
    /// **Endpoint:** `GET /mf/orders`
    pub async fn get_mf_orders(&self) -> Result<Vec<MFOrder>> {
        self.get(endpoints::GET_MF_ORDERS, &[]).await
    }

    /// Retrieve one mutual fund order.
    ///
    /// **Endpoint:** `GET /mf/orders/{order_id}`
    pub async fn get_mf_order_info(&self, order_id: &str) -> Result<MFOrder> {
        let path = endpoint(endpoints::GET_MF_ORDER_INFO, &[order_id.into()])?;
        self.get(&path, &[]).await
    }

    /// Place a mutual fund order.
    ///
    /// **Endpoint:** `POST /mf/orders`
    pub async fn place_mf_order(&self, params: &MFOrderParams) -> Result<MFOrderResponse> {
        self.post(endpoints::PLACE_MF_ORDER, &form_params(params)?)
            .await
    }

    /// Cancel a pending mutual fund order.
    ///
    /// **Endpoint:** `DELETE /mf/orders/{order_id}`
    pub async fn cancel_mf_order(&self, order_id: &str) -> Result<MFOrderResponse> {
        let path = endpoint(endpoints::CANCEL_MF_ORDER, &[order_id.into()])?;
        self.delete(&path, &[]).await
    }

    // -----------------------------------------------------------------------
    // SIPs
    // -----------------------------------------------------------------------

    /// Retrieve SIPs.
    ///
    /// **Endpoint:** `GET /mf/sips`
    pub async fn get_mf_sips(&self) -> Result<Vec<MFSIP>> {
        self.get(endpoints::GET_MF_SIPS, &[]).await
    }

    /// Retrieve one SIP.
    ///
    /// **Endpoint:** `GET /mf/sips/{sip_id}`
    pub async fn get_mf_sip_info(&self, sip_id: &str) -> Result<MFSIP> {
        let path = endpoint(endpoints::GET_MF_SIP_INFO, &[sip_id.into()])?;
        self.get(&path, &[]).await
    }

    /// Start a SIP.
    ///
    /// **Endpoint:** `POST /mf/sips`
    pub async fn place_mf_sip(&self, params: &MFSIPParams) -> Result<MFSIPResponse> {
        self.post(endpoints::PLACE_MF_SIP, &form_params(params)?)
            .await
    }

    /// Modify a SIP.
    ///
    /// **Endpoint:** `PUT /mf/sips/{sip_id}`
    pub async fn modify_mf_sip(&self, sip_id: &str, params: &MFSIPModifyParams) -> Result<MFSIPResponse> {
        let path = endpoint(endpoints::MODIFY_MF_SIP, &[sip_id.into()])?;
        self.put(&path, &form_params(params)?).await
    }

    /// Cancel a SIP.
    ///
    /// **Endpoint:** `DELETE /mf/sips/{sip_id}`
    pub async fn cancel_mf_sip(&self, sip_id: &str) -> Result<MFSIPResponse> {
        let path = endpoint(endpoints::CANCEL_MF_SIP, &[sip_id.into()])?;
        self.delete(&path, &[]).await
    }

    // -----------------------------------------------------------------------
    // Holdings
    // -----------------------------------------------------------------------

    /// Retrieve mutual fund holdings.
    ///
    /// **Endpoint:** `GET /mf/holdings`
    pub async fn get_mf_holdings(&self) -> Result<Vec<MFHolding>> {
        self.get(endpoints::GET_MF_HOLDINGS, &[]).await
    }

    /// Retrieve the allotments behind one holding.
    ///
    /// **Endpoint:** `GET /mf/holdings/{isin}`
    pub async fn get_mf_holding_info(&self, isin: &str) -> Result<Vec<MFTrade>> {
        let path = endpoint(endpoints::GET_MF_HOLDING_INFO, &[isin.into()])?;
        self.get(&path, &[]).await
    }

    /// ISINs in which at least one allotment is present.
    ///
    /// **Endpoint:** `GET /mf/allotments`
    pub async fn get_mf_allotted_isins(&self) -> Result<Vec<String>> {
        self.get(endpoints::GET_ALLOTTED_ISINS, &[]).await
    }
}

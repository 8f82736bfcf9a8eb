//! GTT endpoints: place, modify, list, fetch, delete.

use crate::client::{KiteClient, endpoint};
use crate::constants::{PathArg, endpoints};
use crate::error::Result;
use crate::types::gtt::*;

impl KiteClient {
    /// Place a GTT.
    ///
    /// **Endpoint:** `POST /gtt/triggers`
    pub async fn place_gtt(&self, params: &GttParams) -> Result<GttResponse> {
        self.post(endpoints::PLACE_GTT, &params.to_params()?).await
    }

    /// Replace the condition and orders of an active GTT.
    ///
    /// **Endpoint:** `PUT /gtt/triggers/{trigger_id}`
    pub async fn modify_gtt(&self, trigger_id: i64, params: &GttParams) -> Result<GttResponse> {
        let path = endpoint(endpoints::MODIFY_GTT, &[PathArg::Int(trigger_id)])?;
        self.put(&path, &params.to_params()?).await
    }

    /// List GTTs.
    ///
    /// **Endpoint:** `GET /gtt/triggers`
    pub async fn get_gtts(&self) -> Result<Vec<Gtt>> {
        self.get(endpoints::GET_GTTS, &[]).await
    }

    /// Retrieve one GTT.
    ///
    /// **Endpoint:** `GET /gtt/triggers/{trigger_id}`
    pub async fn get_gtt(&self, trigger_id: i64) -> Result<Gtt> {
        let path = endpoint(endpoints::GET_GTT, &[PathArg::Int(trigger_id)])?;
        self.get(&path, &[]).await
    }

    /// Delete a GTT.
    ///
    /// **Endpoint:** `DELETE /gtt/triggers/{trigger_id}`
    pub async fn delete_gtt(&self, trigger_id: i64) -> Result<GttResponse> {
        let path = endpoint(endpoints::DELETE_GTT, &[PathArg::Int(trigger_id)])?;
        self.delete(&path, &[]).await
    }
}

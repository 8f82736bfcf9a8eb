//! Order endpoints: place, modify, cancel, order book, trades.

use crate::client::{KiteClient, endpoint};
use crate::constants::endpoints;
use crate::error::Result;
use crate::http::form_params;
use crate::types::enums::Variety;
use crate::types::orders::*;

impl KiteClient {
    /// Retrieve the day's order book.
    ///
    /// **Endpoint:** `GET /orders`
    pub async fn get_orders(&self) -> Result<Vec<Order>> {
        self.get(endpoints::GET_ORDERS, &[]).await
    }

    /// Retrieve the day's trades.
    ///
    /// **Endpoint:** `GET /trades`
    pub async fn get_trades(&self) -> Result<Vec<Trade>> {
        self.get(endpoints::GET_TRADES, &[]).await
    }

    /// Retrieve every state transition of an order.
    ///
    /// **Endpoint:** `GET /orders/{order_id}`
    pub async fn get_order_history(&self, order_id: &str) -> Result<Vec<Order>> {
        let path = endpoint(endpoints::GET_ORDER_HISTORY, &[order_id.into()])?;
        self.get(&path, &[]).await
    }

    /// Retrieve the trades generated by an order.
    ///
    /// **Endpoint:** `GET /orders/{order_id}/trades`
    pub async fn get_order_trades(&self, order_id: &str) -> Result<Vec<Trade>> {
        let path = endpoint(endpoints::GET_ORDER_TRADES, &[order_id.into()])?;
        self.get(&path, &[]).await
    }

    /// Place an order.
    ///
    /// **Endpoint:** `POST /orders/{variety}`
    pub async fn place_order(&self, variety: Variety, params: &OrderParams) -> Result<OrderResponse> {
        let path = endpoint(endpoints::PLACE_ORDER, &[variety.as_str().into()])?;
        self.post(&path, &form_params(params)?).await
    }

    /// Modify a pending order. Only the fields set in `params` are changed.
    ///
    /// **Endpoint:** `PUT /orders/{variety}/{order_id}`
    pub async fn modify_order(
        &self,
        variety: Variety,
        order_id: &str,
        params: &OrderParams,
    ) -> Result<OrderResponse> {
        let path = endpoint(endpoints::MODIFY_ORDER, &[variety.as_str().into(), order_id.into()])?;
        self.put(&path, &form_params(params)?).await
    }

    /// Cancel a pending order. `parent_order_id` is required for second-leg
    /// cover orders.
    ///
    /// **Endpoint:** `DELETE /orders/{variety}/{order_id}`
    pub async fn cancel_order(
        &self,
        variety: Variety,
        order_id: &str,
        parent_order_id: Option<&str>,
    ) -> Result<OrderResponse> {
        let path = endpoint(endpoints::CANCEL_ORDER, &[variety.as_str().into(), order_id.into()])?;
        let params: Vec<(String, String)> = parent_order_id
            .map(|id| ("parent_order_id".to_owned(), id.to_owned()))
            .into_iter()
            .collect();
        self.delete(&path, &params).await
    }

    /// Exit an order; same as [`cancel_order`](Self::cancel_order).
    ///
    /// **Endpoint:** `DELETE /orders/{variety}/{order_id}`
    pub async fn exit_order(
        &self,
        variety: Variety,
        order_id: &str,
        parent_order_id: Option<&str>,
    ) -> Result<OrderResponse> {
        self.cancel_order(variety, order_id, parent_order_id).await
    }
}

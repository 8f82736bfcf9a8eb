//! Margin calculator endpoints. Both take a JSON array body rather than form
//! fields.

use crate::client::KiteClient;
use crate::constants::endpoints;
use crate::error::Result;
use crate::http::encode_form;
use crate::types::margins::*;

fn with_query(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{}", encode_form(query))
    }
}

impl KiteClient {
    /// Margins required for each of a list of orders.
    ///
    /// **Endpoint:** `POST /margins/orders`
    pub async fn get_order_margins(&self, params: &GetMarginParams) -> Result<Vec<OrderMargins>> {
        let mut query = Vec::new();
        if params.compact {
            query.push(("mode".to_owned(), "compact".to_owned()));
        }
        self.post_json(&with_query(endpoints::ORDER_MARGINS, &query), &params.orders)
            .await
    }

    /// Margins for a basket of orders taken together.
    ///
    /// **Endpoint:** `POST /margins/basket`
    pub async fn get_basket_margins(&self, params: &GetBasketParams) -> Result<BasketMargins> {
        let mut query = Vec::new();
        if params.compact {
            query.push(("mode".to_owned(), "compact".to_owned()));
        }
        if params.consider_positions {
            query.push(("consider_positions".to_owned(), "true".to_owned()));
        }
        self.post_json(&with_query(endpoints::BASKET_MARGINS, &query), &params.orders)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_appended_only_when_present() {
        assert_eq!(with_query("/margins/basket", &[]), "/margins/basket");
        let q = vec![
            ("mode".to_owned(), "compact".to_owned()),
            ("consider_positions".to_owned(), "true".to_owned()),
        ];
        assert_eq!(
            with_query("/margins/basket", &q),
            "/margins/basket?mode=compact&consider_positions=true"
        );
    }
}

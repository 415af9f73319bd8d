//! FILENAME: core/dataset/src/record.rs
//! Typed form of a single order line item.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::value::{Attribute, Value};

/// One row of the order table: a single line item of an order.
///
/// Several records may share an order id (multi-item orders) or a customer id
/// (repeat customers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub order_status: String,
    pub purchased_at: Option<NaiveDateTime>,
    pub payment_value: Option<f64>,
    pub product_category: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
}

impl OrderRecord {
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        purchased_at: NaiveDateTime,
    ) -> Self {
        OrderRecord {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            order_status: "delivered".to_string(),
            purchased_at: Some(purchased_at),
            payment_value: None,
            product_category: None,
            customer_city: None,
            customer_state: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.order_status = status.into();
        self
    }

    pub fn with_payment(mut self, value: f64) -> Self {
        self.payment_value = Some(value);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.product_category = Some(category.into());
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.customer_city = Some(city.into());
        self.customer_state = Some(state.into());
        self
    }

    /// The value this record holds for an attribute.
    pub fn value(&self, attribute: Attribute) -> Value {
        match attribute {
            Attribute::OrderId => Value::text(self.order_id.as_str()),
            Attribute::CustomerId => Value::text(self.customer_id.as_str()),
            Attribute::OrderStatus => Value::text(self.order_status.as_str()),
            Attribute::PurchaseTimestamp => self.purchased_at.into(),
            Attribute::PaymentValue => self.payment_value.into(),
            Attribute::ProductCategory => self.product_category.clone().into(),
            Attribute::CustomerCity => self.customer_city.clone().into(),
            Attribute::CustomerState => self.customer_state.clone().into(),
        }
    }
}

use serde_json::{json, Value};

use super::order::OrderView;

pub const ORDER_CREATED: &str = "order_created";

/// Raised once an order has been committed.
#[derive(Debug, Clone)]
pub struct OrderCreated {
    pub order: OrderView,
}

impl OrderCreated {
    pub fn name(&self) -> &'static str {
        ORDER_CREATED
    }

    pub fn order_id(&self) -> i64 {
        self.order.order.id
    }

    /// JSON body handed to downstream consumers; mirrors the order resource.
    pub fn payload(&self) -> Value {
        let view = &self.order;
        let items: Vec<Value> = view
            .lines
            .iter()
            .map(|l| {
                json!({
                    "id": l.item.id,
                    "quantity": l.item.quantity,
                    "product": {
                        "id": l.product.id,
                        "title": l.product.title,
                        "unitPrice": l.product.unit_price.to_string(),
                    },
                    "unitPrice": l.item.unit_price.to_string(),
                    "totalPrice": l.total_price().to_string(),
                })
            })
            .collect();

        json!({
            "event": ORDER_CREATED,
            "order": {
                "id": view.order.id,
                "customer": {
                    "id": view.customer.id,
                    "firstName": view.customer.first_name,
                    "lastName": view.customer.last_name,
                },
                "placedAt": view.order.placed_at.to_rfc3339(),
                "paymentStatus": view.order.payment_status.code(),
                "items": items,
                "totalOrderPrice": view.total_order_price().to_string(),
            }
        })
    }
}

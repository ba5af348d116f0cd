//! Order status snapshot.

use serde::{Deserialize, Serialize};

/// Result of an order query.
///
/// `status` is the exchange's own enumeration (`"New"`, `"Filled"`,
/// `"CANCELED"`, ...) and is deliberately not validated — the set differs
/// per exchange and changes without notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub status: String,
    pub avg_price: f64,
}

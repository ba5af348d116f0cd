//! Account margin snapshot.

use serde::{Deserialize, Serialize};

/// A point-in-time account margin snapshot.
///
/// Created on demand from a margin/account response; never persisted or
/// merged with prior snapshots. All amounts are in the exchange's native
/// unit for the currency — no conversion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub initial_margin: f64,
    pub maintenance_margin: f64,
    pub margin_balance: f64,
    pub wallet_balance: f64,
    pub unrealized_pnl: f64,
}

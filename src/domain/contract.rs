//! Tradable instrument descriptor.

use serde::{Deserialize, Serialize};

/// A tradable instrument.
///
/// Created in bulk from the exchange's instrument list at client startup,
/// immutable afterwards, discarded with the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub price_precision: u32,
    pub quantity_precision: u32,
}

impl std::fmt::Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.symbol, self.base_asset, self.quote_asset)
    }
}

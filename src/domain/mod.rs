//! Passive data models.
//!
//! Four value objects constructed from exchange payloads and never mutated:
//! no entity owns another, and no invariant is enforced beyond successful
//! decoding. Conversion from wire types lives with each exchange module;
//! a malformed field fails the whole decode with a typed error, never a
//! partial result.

mod balance;
mod candle;
mod contract;
mod order;

pub use balance::Balance;
pub use candle::Candle;
pub use contract::Contract;
pub use order::OrderStatus;

//! Products

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a product in the caller's catalogue.
///
/// Product ids are assigned by whoever builds carts and coupons; the engine
/// only ever compares them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

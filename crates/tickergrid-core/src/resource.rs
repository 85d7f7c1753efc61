//! Resource identity used for error messages and cache addressing.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The resource classes served by the API.
///
/// Cache keys and invalidation rules are addressed per class. `Stock` and
/// `StockPrice` keys are deliberately NOT nested under a common prefix;
/// their coupling is expressed through [`ResourceClass::invalidates_with`]
/// instead, so invalidating one class walks its linked classes explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Exchange,
    Sector,
    Stock,
    StockPrice,
}

impl ResourceClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exchange => "exchange",
            Self::Sector => "sector",
            Self::Stock => "stock",
            Self::StockPrice => "stock_price",
        }
    }

    /// Human-readable label used in `Problem` detail messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exchange => "Exchange",
            Self::Sector => "Sector",
            Self::Stock => "Stock",
            Self::StockPrice => "StockPrice",
        }
    }

    /// Classes whose cached entries depend on this class.
    ///
    /// A successful mutation on a resource of this class must also
    /// invalidate every linked class for the same resource id.
    pub const fn invalidates_with(self) -> &'static [ResourceClass] {
        match self {
            Self::Stock => &[Self::StockPrice],
            Self::Exchange | Self::Sector | Self::StockPrice => &[],
        }
    }
}

impl Display for ResourceClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_mutations_cascade_to_prices() {
        assert_eq!(
            ResourceClass::Stock.invalidates_with(),
            &[ResourceClass::StockPrice]
        );
    }

    #[test]
    fn price_class_does_not_cascade_back() {
        assert!(ResourceClass::StockPrice.invalidates_with().is_empty());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ResourceClass::StockPrice).expect("serializes");
        assert_eq!(json, "\"stock_price\"");
    }
}

//! Domain models: symbols, venues, sectors, instruments, prices.

mod models;
mod symbol;

pub use models::{Exchange, PricePoint, PriceRange, Sector, Stock};
pub use symbol::Symbol;

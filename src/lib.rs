// Home Ledger - Core Library
// Exposes the store, the aggregator and the HTTP layer for the server binary and tests

pub mod aggregate;
pub mod config;
pub mod error;
pub mod movement;
pub mod page;
pub mod store;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use aggregate::{balances, compute, round_cents, sort_newest_first, Balances};
pub use config::Config;
pub use error::{LedgerError, Result};
pub use movement::{Account, Movement, NewMovement, TIPO_BANCO, TIPO_CASH};
pub use store::{ImportMode, LedgerStore};

#[cfg(feature = "server")]
pub use api::{build_router, AppState, ImportResponse, LedgerView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

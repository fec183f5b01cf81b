//! # Cinder Token Ledgers
//!
//! The rebasing supply token (scaled-units ledger whose conversion factor
//! moves on rebase, keeping holder proportions invariant) and the
//! non-rebasing wrapper token (a fixed linear view over the rebasing
//! asset).

pub mod supply_token;
pub mod wrapper;

pub use supply_token::SupplyToken;
pub use wrapper::WrapperToken;

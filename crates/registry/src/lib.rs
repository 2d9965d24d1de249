//! Atlas Account Registry
//!
//! Read-mostly store of institutional clients and their prime brokerage
//! accounts. Clients are immutable after onboarding except through
//! [`AccountRegistry::update_client`].

mod error;
mod registry;

pub use error::{Error, Result};
pub use registry::AccountRegistry;

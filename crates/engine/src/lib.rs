//! Atlas Engine
//!
//! The explicitly constructed service context for the institutional
//! order execution and rebalancing engine. Built once at process start
//! and passed to request handlers by reference - no process-wide mutable
//! state.
//!
//! ```text
//! client request ──► validation ──► Gating Pipeline ──► Lifecycle (NEW)
//!                                        │ rejected            │
//!                                        ▼                     ▼
//!                               audit order (CANCELLED)   algorithmic?
//!                                                     ┌────┴─────┐
//!                                                  direct      slicer +
//!                                                  venue       dispatcher
//!                                                     └────┬─────┘
//!                                                        fills
//!                                                          │
//!                                          Custody Ledger ◄┴─ OTC Settlement
//!                                                 ▲
//!                                        Portfolio Rebalancer ──► (back to gating)
//! ```

mod bus;
mod config;
mod engine;
mod error;
mod requests;
mod venue;

pub use bus::BroadcastEventBus;
pub use config::EngineConfig;
pub use engine::InstitutionalEngine;
pub use error::{EngineError, Result};
pub use requests::{ExecutionInstruction, OnboardClient, PlaceOrder, Rebalance, SetupCustody};
pub use venue::SimulatedVenue;

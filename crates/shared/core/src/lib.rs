//! Atlas Core Domain
//!
//! Pure domain types for the Atlas institutional trading engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod events;

// Re-export commonly used types at crate root
pub use entities::{
    AccountId,
    AccountType,
    AllocationDelta,
    ChildSlice,
    // Client & account entities
    Client,
    ClientId,
    CustodyHolding,
    CustodyType,
    EncumbranceStatus,
    HoldingId,
    InstitutionType,
    // Core trading entities
    Order,
    OrderId,
    OrderStatus,
    OrderType,
    OtcTrade,
    // Portfolio entities
    PortfolioAllocation,
    PrimeBrokerageAccount,
    SegregationType,
    ServiceTier,
    Side,
    SliceId,
    SliceState,
    TimeInForce,
    TradeId,
    TradeType,
};
pub use events::EngineEvent;

/// Canonical timestamp type used across the engine
pub type Timestamp = chrono::DateTime<chrono::Utc>;

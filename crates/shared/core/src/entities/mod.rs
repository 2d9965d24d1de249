mod account;
mod allocation;
mod client;
mod custody;
mod order;
mod order_status;
mod order_type;
mod otc_trade;
mod side;
mod slice;
mod time_in_force;

pub use account::{AccountId, AccountType, PrimeBrokerageAccount};
pub use allocation::{AllocationDelta, PortfolioAllocation};
pub use client::{Client, ClientId, InstitutionType, ServiceTier};
pub use custody::{
    CustodyHolding, CustodyType, EncumbranceStatus, HoldingId, SegregationType,
};
pub use order::{Order, OrderId};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use otc_trade::{OtcTrade, TradeId, TradeType};
pub use side::Side;
pub use slice::{ChildSlice, SliceId, SliceState};
pub use time_in_force::TimeInForce;

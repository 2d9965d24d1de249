//! Atlas Gating Pipeline
//!
//! Gates order admission behind two independent predicates: a compliance
//! check and a risk check. Both must affirmatively pass; an error or
//! timeout from either one is fail-closed and yields a rejection. The
//! pipeline has no side effects - order creation happens downstream, and
//! rejections never mutate ledger state.

mod pipeline;
mod predicates;

pub use pipeline::{Admission, GatingPipeline, RejectReason};
pub use predicates::PermitAll;

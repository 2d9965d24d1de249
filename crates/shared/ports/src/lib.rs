//! Atlas Ports
//!
//! Port definitions (traits) for the Atlas institutional trading engine.
//! These define the boundaries between the engine core and its external
//! collaborators: compliance and risk services, execution venues, volume
//! curve providers, the event bus, and time.

mod clock;
mod compliance;
mod error;
mod event_publisher;
mod venue;
mod volume_curve;

pub use clock::{Clock, SystemClock};
pub use compliance::{Compliance, Risk};
pub use error::{PortError, PortResult};
pub use event_publisher::EventPublisher;
pub use venue::{ExecutionRequest, ExecutionVenue, VenueFill};
pub use volume_curve::VolumeCurve;

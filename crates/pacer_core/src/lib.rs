//!This is the core library for the pacer project. It holds the `Reading` data model,
//!the telemetry emitter actor, and the publisher seam the broker crate plugs into.

pub mod emitter;
pub mod error;
pub mod publish;
pub mod reading;

pub use emitter::{Emitter, EmitterConfig, EmitterHandle};
pub use publish::{PublishError, PublishFailure, ReadingPublisher};
pub use reading::{Anomalies, GeoLocation, PacingMode, Reading};

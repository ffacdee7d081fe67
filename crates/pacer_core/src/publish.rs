//!The publisher seam between the emitter and a durable topic.

use crate::reading::Reading;
use futures::future::BoxFuture;
use std::fmt;

///Error from a single publish attempt.
#[derive(Debug, Clone)]
pub struct PublishError {
    message: String,
}

impl PublishError {
    pub fn from_string(message: String) -> Self {
        PublishError { message }
    }
    pub fn message(msg: &str) -> Self {
        PublishError {
            message: msg.to_string(),
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

///Event emitted when the detached publish of one tick's reading fails.
///
///Delivery is still fire-and-forget (no retry, emission continues), but the
///failure is observable here instead of disappearing into a log line.
#[derive(Debug, Clone)]
pub struct PublishFailure {
    pub tick: u64,
    pub error: PublishError,
}

///A destination that accepts one reading per tick.
///
///The emitter dispatches `publish` as a detached task and never awaits it
///before scheduling the next tick, so implementations must be self-contained.
pub trait ReadingPublisher: Send + Sync {
    fn publish(&self, reading: Reading) -> BoxFuture<'static, Result<(), PublishError>>;
}

//! Test support for `linkwire`.
//!
//! [`RecordingCore`] stands in for the router core and records every call
//! the adaptor makes into it. The [`harness`] helpers drive an adaptor
//! through startup and reply-address learning without spawning an actor.
//!
//! ```rust
//! use linkwire::AdaptorConfig;
//! use linkwire_testing::{REPLY_ADDRESS, attached};
//!
//! let (adaptor, _core) = attached(AdaptorConfig::default());
//! assert_eq!(adaptor.reply_to(), Some(REPLY_ADDRESS));
//! ```

mod recording;
pub mod harness;
pub mod logging;
pub mod metrics;

pub use recording::{CoreCall, RecordingCore};

pub use harness::{REPLY_ADDRESS, attached, run_ready, started};
pub use logging::{LoggerHandle, logger};

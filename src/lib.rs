//! herald - announce MQTT messages through a text-to-speech command
//!
//! A long-running subscriber that connects to an MQTT broker, filters
//! inbound messages against a topic filter, and speaks each matching
//! payload through an external command, one announcement at a time.
//!
//! # Overview
//!
//! - [`topic`]: pure hierarchical topic-filter matching (`+`, `#`, `$`-topics)
//! - [`announce`]: the serialized external speech command invocation
//! - [`session`]: broker connection lifecycle and event dispatch
//! - [`shutdown`]: SIGINT/SIGTERM coordination
//!
//! # Quick start
//!
//! ```no_run
//! use herald::announce::Announcer;
//! use herald::config::AnnouncerConfig;
//! use herald::session::Session;
//! use herald::shutdown;
//!
//! # async fn run() -> Result<(), herald::HeraldError> {
//! let config = AnnouncerConfig {
//!     topic: "home/+/alert".to_string(),
//!     ..Default::default()
//! };
//! config.validate()?;
//!
//! let (shutdown_tx, shutdown_rx) = shutdown::shutdown_channel();
//! tokio::spawn(shutdown::watch_signals(shutdown_tx));
//!
//! let session = Session::new(config.clone(), Announcer::new(config.script), shutdown_rx);
//! let rc = session.run().await?;
//! # let _ = rc;
//! # Ok(())
//! # }
//! ```

pub mod announce;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod shutdown;
pub mod topic;

pub use announce::{AnnounceOutcome, Announcer, Speak};
pub use config::AnnouncerConfig;
pub use error::{HeraldError, SessionError};
pub use session::{Session, SessionState};
pub use topic::topic_matches;

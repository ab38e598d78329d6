//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → spans carrying a request id per prepare/send call
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, filtered)
//! ```

pub mod logging;

pub use logging::init_logging;

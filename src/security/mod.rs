//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /api request:
//!     → rate_limit.rs (per-caller fixed window, 429 when exceeded)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Caller keys are unauthenticated; the limiter deters abuse only
//! - The limiter is an owned component held in application state
//! - Time is injected through `Clock` so windows can be tested

pub mod clock;
pub mod rate_limit;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limit::{rate_limit_middleware, RateLimiter};

//! smo-core: shared numeric foundation for smoflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - format (display formatting policy for engineering values)
//! - error (shared error types)

pub mod error;
pub mod format;
pub mod numeric;

pub use error::{SmoError, SmoResult};
pub use format::format_number;
pub use numeric::*;

//! # lldpmap-error
//!
//! Unified error handling for lldpmap.
//!
//! ## Design
//!
//! - **ErrorKind**: what went wrong (e.g. `LayoutFailed`, `MapUpdateFailed`)
//! - **ErrorStatus**: whether retrying makes sense (Permanent or Temporary)
//! - **Error Context**: key/value pairs that help locate the cause
//! - **Error Source**: the wrapped underlying error, without leaking its type
//!
//! ## Usage
//!
//! ```rust
//! use lldpmap_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::MapLookupFailed, "map.get returned an error")
//!         .with_operation("zabbix::find_map")
//!         .with_context("map", "LLDP Devices"))
//! }
//! ```
//!
//! ## Principles
//!
//! - Boundary functions return `Result<T, lldpmap_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Data-quality problems never become errors; they are dropped or defaulted
//!   where they are found

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using lldpmap Error
pub type Result<T> = std::result::Result<T, Error>;

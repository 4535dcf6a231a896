//! Utility functions shared by the built-in extensions.
//!
//! - **Date-time handling**: lenient parsing of the date formats found in
//!   feeds, and canonical RFC 3339 output
//!
//! # Examples
//!
//! ```
//! use synext::util::{format_datetime, parse_datetime};
//!
//! let dt = parse_datetime("Sun, 19 May 2002 15:21:36 GMT").unwrap();
//! assert_eq!(format_datetime(&dt), "2002-05-19T15:21:36+00:00");
//! ```

mod datetime;

pub use datetime::{format_datetime, parse_datetime};

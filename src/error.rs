//! Error type for unpacking
//!
//! Every decoder reports failures as [`SqzError`]. A caller that wants to
//! retry with [`crate::LzwMode::Alternate`] matches on
//! [`SqzError::LengthMismatch`].

pub use crate::common::{Result, SqzError};

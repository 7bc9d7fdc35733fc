//! Typed lookup helpers.
//!
//! The methods in this module sit on top of [`Client::query`] and take
//! care of the routine parts of common lookups: building the query name,
//! picking the record type, and filtering the answer section down to the
//! typed payloads the caller is after.
//!
//! [`Client::query`]: crate::net::client::Client::query

pub mod addr;
pub mod host;
pub mod records;

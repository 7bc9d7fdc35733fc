//! An asynchronous DNS client.
//!
//! This crate sends DNS queries over UDP, TCP, or multicast UDP and
//! decodes the responses into typed records. It is a stub client: it
//! talks to a resolving name server and leaves recursion, caching, and
//! DNSSEC validation to it.
//!
//! The crate is organized in four layers:
//!
//! * [`base`] holds the wire format: messages, names, records, and the
//!   parsing and composing machinery including name compression.
//! * [`resolv`] extracts name server addresses from the system's
//!   `resolv.conf`.
//! * [`net::client`] provides the [`Client`], which owns one transport
//!   channel and correlates queries with responses, and the [`Pool`],
//!   which shares clients keyed by server address and protocol.
//! * [`lookup`] adds typed helpers to the client for the common lookups:
//!   host addresses, service locations, mail exchangers, text records,
//!   and reverse lookups.
//!
//! # Example
//!
//! ```no_run
//! use querist::Client;
//!
//! # async fn example() -> Result<(), querist::QueryError> {
//! let client = Client::connect().await?;
//! for addr in client.lookup_a("example.com", 443).await? {
//!     println!("{}", addr);
//! }
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod lookup;
pub mod net;
pub mod resolv;

pub use self::base::{
    Class, Header, Label, Message, Name, Opcode, Question, Rcode, Record,
    RecordData, Rtype,
};
pub use self::net::client::{
    Client, ConnectionRequirements, Pool, Protocol, QueryError,
    QueryOptions, Sourcing,
};
pub use self::resolv::ResolvConf;

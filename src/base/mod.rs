//! The DNS wire format.
//!
//! This module contains everything needed to convert DNS messages between
//! their typed representation and the binary format defined in
//! [RFC 1035]: domain names and their labels, the message header, the
//! question and record types, typed record data, and the low-level
//! parsing and composing machinery including name compression.
//!
//! The codec is pure: nothing here performs I/O.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod question;
pub mod rdata;
pub mod record;
pub mod wire;

pub use self::header::Header;
pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::message::Message;
pub use self::name::{Label, Name};
pub use self::question::Question;
pub use self::rdata::RecordData;
pub use self::record::Record;

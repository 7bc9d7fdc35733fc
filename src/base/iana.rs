//! IANA-registered parameter values.
//!
//! The DNS header and records carry a number of small integer fields whose
//! values are maintained in IANA registries: record types, classes, the
//! opcode, and the response code. Each gets an enum here that keeps
//! unknown values around in an `Int` variant instead of failing, since a
//! client has to be able to pass through whatever a server sends.

use std::fmt;

//------------ Rtype ---------------------------------------------------------

/// Resource record types.
///
/// Every record has a 16 bit type deciding how its data is interpreted.
/// The variants cover the types this crate parses into typed data plus the
/// query-only types from [RFC 1035]. Everything else is carried in the
/// `Int` variant and surfaces as opaque record data.
///
/// [RFC 1035]: https://tools.ietf.org/html/rfc1035
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rtype {
    /// A host address.
    A,

    /// An authoritative name server.
    Ns,

    /// The canonical name for an alias.
    Cname,

    /// The start of a zone of authority.
    Soa,

    /// A domain name pointer.
    Ptr,

    /// Mail exchange.
    Mx,

    /// Text strings.
    Txt,

    /// An IPv6 host address.
    Aaaa,

    /// Service location.
    Srv,

    /// Transfer of an entire zone. Query type only.
    Axfr,

    /// Mailbox-related records. Query type only.
    Mailb,

    /// Mail agent records. Query type only.
    Maila,

    /// All records. Query type only.
    Any,

    /// A type not otherwise listed.
    Int(u16),
}

impl Rtype {
    /// Returns the type for the given integer value.
    pub fn from_int(value: u16) -> Self {
        use self::Rtype::*;

        match value {
            1 => A,
            2 => Ns,
            5 => Cname,
            6 => Soa,
            12 => Ptr,
            15 => Mx,
            16 => Txt,
            28 => Aaaa,
            33 => Srv,
            252 => Axfr,
            253 => Mailb,
            254 => Maila,
            255 => Any,
            _ => Int(value),
        }
    }

    /// Returns the integer value for this type.
    pub fn to_int(self) -> u16 {
        use self::Rtype::*;

        match self {
            A => 1,
            Ns => 2,
            Cname => 5,
            Soa => 6,
            Ptr => 12,
            Mx => 15,
            Txt => 16,
            Aaaa => 28,
            Srv => 33,
            Axfr => 252,
            Mailb => 253,
            Maila => 254,
            Any => 255,
            Int(value) => value,
        }
    }
}

//--- From

impl From<u16> for Rtype {
    fn from(value: u16) -> Self {
        Rtype::from_int(value)
    }
}

impl From<Rtype> for u16 {
    fn from(value: Rtype) -> Self {
        value.to_int()
    }
}

//--- Display

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Rtype::*;

        match *self {
            A => f.write_str("A"),
            Ns => f.write_str("NS"),
            Cname => f.write_str("CNAME"),
            Soa => f.write_str("SOA"),
            Ptr => f.write_str("PTR"),
            Mx => f.write_str("MX"),
            Txt => f.write_str("TXT"),
            Aaaa => f.write_str("AAAA"),
            Srv => f.write_str("SRV"),
            Axfr => f.write_str("AXFR"),
            Mailb => f.write_str("MAILB"),
            Maila => f.write_str("MAILA"),
            Any => f.write_str("ANY"),
            Int(value) => write!(f, "TYPE{}", value),
        }
    }
}

//------------ Class ---------------------------------------------------------

/// DNS classes.
///
/// Practically everything lives in the Internet class. CH and HS are
/// defined but unused here.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    /// The Internet.
    In,

    /// Chaosnet.
    Ch,

    /// Hesiod.
    Hs,

    /// Any class. Query class only.
    Any,

    /// A class not otherwise listed.
    Int(u16),
}

impl Class {
    /// Returns the class for the given integer value.
    pub fn from_int(value: u16) -> Self {
        use self::Class::*;

        match value {
            1 => In,
            3 => Ch,
            4 => Hs,
            255 => Any,
            _ => Int(value),
        }
    }

    /// Returns the integer value for this class.
    pub fn to_int(self) -> u16 {
        use self::Class::*;

        match self {
            In => 1,
            Ch => 3,
            Hs => 4,
            Any => 255,
            Int(value) => value,
        }
    }
}

impl Default for Class {
    fn default() -> Self {
        Class::In
    }
}

//--- From

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        Class::from_int(value)
    }
}

impl From<Class> for u16 {
    fn from(value: Class) -> Self {
        value.to_int()
    }
}

//--- Display

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Class::*;

        match *self {
            In => f.write_str("IN"),
            Ch => f.write_str("CH"),
            Hs => f.write_str("HS"),
            Any => f.write_str("ANY"),
            Int(value) => write!(f, "CLASS{}", value),
        }
    }
}

//------------ Opcode --------------------------------------------------------

/// The kind of query carried by a message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
    /// A standard query.
    Query,

    /// An inverse query. Obsolete.
    IQuery,

    /// A server status request.
    Status,

    /// A zone change notification.
    Notify,

    /// A dynamic update.
    Update,

    /// An opcode not otherwise listed.
    Int(u8),
}

impl Opcode {
    /// Returns the opcode for the given integer value.
    ///
    /// Only the lower four bits of `value` are considered.
    pub fn from_int(value: u8) -> Self {
        use self::Opcode::*;

        match value & 0x0F {
            0 => Query,
            1 => IQuery,
            2 => Status,
            4 => Notify,
            5 => Update,
            value => Int(value),
        }
    }

    /// Returns the integer value for this opcode.
    pub fn to_int(self) -> u8 {
        use self::Opcode::*;

        match self {
            Query => 0,
            IQuery => 1,
            Status => 2,
            Notify => 4,
            Update => 5,
            Int(value) => value & 0x0F,
        }
    }
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

//--- Display

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Opcode::*;

        match *self {
            Query => f.write_str("QUERY"),
            IQuery => f.write_str("IQUERY"),
            Status => f.write_str("STATUS"),
            Notify => f.write_str("NOTIFY"),
            Update => f.write_str("UPDATE"),
            Int(value) => write!(f, "OPCODE{}", value),
        }
    }
}

//------------ Rcode ---------------------------------------------------------

/// The response code of a message.
///
/// Only the basic four bit code from the header is covered; the extended
/// code from EDNS is out of scope for this crate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rcode {
    /// No error condition.
    NoError,

    /// The server was unable to interpret the query.
    FormErr,

    /// The server had an internal problem.
    ServFail,

    /// The queried domain name does not exist.
    NXDomain,

    /// The server does not support the requested kind of query.
    NotImp,

    /// The server refused to answer for policy reasons.
    Refused,

    /// A response code not otherwise listed.
    Int(u8),
}

impl Rcode {
    /// Returns the response code for the given integer value.
    ///
    /// Only the lower four bits of `value` are considered.
    pub fn from_int(value: u8) -> Self {
        use self::Rcode::*;

        match value & 0x0F {
            0 => NoError,
            1 => FormErr,
            2 => ServFail,
            3 => NXDomain,
            4 => NotImp,
            5 => Refused,
            value => Int(value),
        }
    }

    /// Returns the integer value for this response code.
    pub fn to_int(self) -> u8 {
        use self::Rcode::*;

        match self {
            NoError => 0,
            FormErr => 1,
            ServFail => 2,
            NXDomain => 3,
            NotImp => 4,
            Refused => 5,
            Int(value) => value & 0x0F,
        }
    }
}

impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

//--- Display

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Rcode::*;

        match *self {
            NoError => f.write_str("NOERROR"),
            FormErr => f.write_str("FORMERR"),
            ServFail => f.write_str("SERVFAIL"),
            NXDomain => f.write_str("NXDOMAIN"),
            NotImp => f.write_str("NOTIMP"),
            Refused => f.write_str("REFUSED"),
            Int(value) => write!(f, "RCODE{}", value),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rtype_round_trip() {
        for value in 0..=300u16 {
            assert_eq!(Rtype::from_int(value).to_int(), value);
        }
        assert_eq!(Rtype::from_int(33), Rtype::Srv);
        assert_eq!(Rtype::from_int(99), Rtype::Int(99));
    }

    #[test]
    fn class_round_trip() {
        assert_eq!(Class::from_int(1), Class::In);
        assert_eq!(Class::from_int(3), Class::Ch);
        assert_eq!(Class::from_int(4), Class::Hs);
        assert_eq!(Class::from_int(2).to_int(), 2);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Rtype::Aaaa), "AAAA");
        assert_eq!(format!("{}", Rtype::Int(4711)), "TYPE4711");
        assert_eq!(format!("{}", Rcode::NXDomain), "NXDOMAIN");
    }
}

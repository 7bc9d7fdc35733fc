//! Resource records.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::rdata::RecordData;
use super::wire::{Composer, ParseError, Parser};
use std::fmt;

//------------ Record --------------------------------------------------------

/// A resource record.
///
/// A record associates a domain name, its owner, with type-dependent data
/// and a time-to-live stating how long the record may be kept around. The
/// record type lives inside the data; see [`RecordData`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Record {
    /// The owner of the record.
    owner: Name,

    /// The class of the record.
    class: Class,

    /// The time this record may be cached, in seconds.
    ttl: u32,

    /// The data of the record.
    data: RecordData,
}

impl Record {
    /// Creates a new record.
    pub fn new(owner: Name, class: Class, ttl: u32, data: RecordData) -> Self {
        Record {
            owner,
            class,
            ttl,
            data,
        }
    }

    /// Returns the owner of the record.
    pub fn owner(&self) -> &Name {
        &self.owner
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the TTL of the record in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns a reference to the data of the record.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Trades the record for its data.
    pub fn into_data(self) -> RecordData {
        self.data
    }

    /// Takes a record from the current position of `parser`.
    ///
    /// The record data must fill its RDLENGTH exactly; data that stops
    /// short of it or runs past it makes the packet malformed.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let owner = Name::parse(parser)?;
        let rtype = Rtype::from_int(parser.parse_u16()?);
        let class = Class::from_int(parser.parse_u16()?);
        let ttl = parser.parse_u32()?;
        let rdlen = usize::from(parser.parse_u16()?);
        if rdlen > parser.remaining() {
            return Err(ParseError::ShortInput);
        }
        let end = parser.pos() + rdlen;
        let data = RecordData::parse(rtype, parser, rdlen)?;
        if parser.pos() != end {
            return Err(ParseError::form_error(
                "record data of invalid length",
            ));
        }
        Ok(Record {
            owner,
            class,
            ttl,
            data,
        })
    }

    /// Appends the record to `target`.
    ///
    /// A placeholder RDLENGTH is written first and patched once the data
    /// is in place, since compression can shrink names inside the data.
    pub fn compose(&self, target: &mut Composer) {
        self.owner.compose(target);
        target.append_u16(self.rtype().into());
        target.append_u16(self.class.into());
        target.append_u32(self.ttl);
        let rdlen_pos = target.pos();
        target.append_u16(0);
        self.data.compose(target);
        let rdlen = target.pos() - rdlen_pos - 2;
        target.patch_u16(rdlen_pos, rdlen as u16);
    }
}

//--- Display

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.owner,
            self.ttl,
            self.class,
            self.rtype(),
            self.data
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::rdata::{Mx, A};
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn wire_round_trip() {
        let record = Record::new(
            name("example.com"),
            Class::In,
            3600,
            RecordData::Mx(Mx::new(10, name("mail.example.com"))),
        );
        let mut target = Composer::new();
        record.compose(&mut target);
        let bytes = target.freeze();
        let mut parser = Parser::from_octets(bytes.as_ref());
        assert_eq!(Record::parse(&mut parser).unwrap(), record);
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn rdlength_reflects_compression() {
        let mut target = Composer::new();
        let record = Record::new(
            name("example.com"),
            Class::In,
            3600,
            RecordData::Mx(Mx::new(10, name("example.com"))),
        );
        record.compose(&mut target);
        let bytes = target.freeze();
        // Owner takes 13 octets, the fixed record head 10. The data is
        // the preference plus a pointer to position zero.
        assert_eq!(bytes.len(), 13 + 10 + 4);
        assert_eq!(&bytes[21..23], b"\x00\x04");
        assert_eq!(&bytes[25..27], b"\xc0\x00");
    }

    #[test]
    fn rejects_rdlength_past_buffer() {
        // An A record whose RDLENGTH claims six octets with only four
        // present.
        let mut target = Composer::new();
        name("a.example").compose(&mut target);
        target.append_u16(Rtype::A.into());
        target.append_u16(Class::In.into());
        target.append_u32(30);
        target.append_u16(6);
        target.append_slice(&[127, 0, 0, 1]);
        let bytes = target.freeze();
        let mut parser = Parser::from_octets(bytes.as_ref());
        assert_eq!(
            Record::parse(&mut parser),
            Err(ParseError::ShortInput)
        );
    }

    #[test]
    fn rejects_short_rdlength() {
        // RDLENGTH zero on a type with a fixed four octet payload.
        let mut target = Composer::new();
        name("a.example").compose(&mut target);
        target.append_u16(Rtype::A.into());
        target.append_u16(Class::In.into());
        target.append_u32(30);
        target.append_u16(0);
        // Trailing octets that must not be mistaken for record data.
        target.append_slice(&[127, 0, 0, 1]);
        let bytes = target.freeze();
        let mut parser = Parser::from_octets(bytes.as_ref());
        assert!(Record::parse(&mut parser).is_err());
    }

    #[test]
    fn zero_rdlength_unknown_type_is_empty() {
        let mut target = Composer::new();
        name("a.example").compose(&mut target);
        target.append_u16(0xff00);
        target.append_u16(Class::In.into());
        target.append_u32(30);
        target.append_u16(0);
        let bytes = target.freeze();
        let mut parser = Parser::from_octets(bytes.as_ref());
        let record = Record::parse(&mut parser).unwrap();
        match record.data() {
            RecordData::Other(other) => assert!(other.data().is_empty()),
            _ => panic!("expected Other"),
        }
    }

    #[test]
    fn display() {
        let record = Record::new(
            name("example.com"),
            Class::In,
            3600,
            RecordData::A(A::new(Ipv4Addr::new(192, 0, 2, 1))),
        );
        assert_eq!(record.to_string(), "example.com 3600 IN A 192.0.2.1");
    }
}

//! Record data.
//!
//! Every resource record carries a type-dependent payload. This module
//! defines one type per payload this crate understands, mostly from
//! [RFC 1035], with AAAA from [RFC 3596] and SRV from [RFC 2782], and the
//! [`RecordData`] sum type that picks the right one off the wire based on
//! the record type code. Types not covered end up as [`Other`] keeping the
//! raw octets.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035
//! [RFC 2782]: https://tools.ietf.org/html/rfc2782
//! [RFC 3596]: https://tools.ietf.org/html/rfc3596

use super::iana::Rtype;
use super::name::Name;
use super::wire::{Composer, ParseError, Parser};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

//------------ A -------------------------------------------------------------

/// A record data: a single IPv4 address.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct A {
    /// The address.
    addr: Ipv4Addr,
}

impl A {
    /// Creates new record data from an address.
    pub fn new(addr: Ipv4Addr) -> Self {
        A { addr }
    }

    /// Returns the address.
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let slice = parser.parse_slice(4)?;
        Ok(A::new(Ipv4Addr::new(slice[0], slice[1], slice[2], slice[3])))
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_slice(&self.addr.octets())
    }
}

impl From<Ipv4Addr> for A {
    fn from(addr: Ipv4Addr) -> Self {
        A::new(addr)
    }
}

impl fmt::Display for A {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.addr.fmt(f)
    }
}

//------------ Aaaa ----------------------------------------------------------

/// AAAA record data: a single IPv6 address.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Aaaa {
    /// The address.
    addr: Ipv6Addr,
}

impl Aaaa {
    /// Creates new record data from an address.
    pub fn new(addr: Ipv6Addr) -> Self {
        Aaaa { addr }
    }

    /// Returns the address.
    pub fn addr(&self) -> Ipv6Addr {
        self.addr
    }

    /// Returns the address in full, non-elided hex notation.
    ///
    /// Unlike the `Display` impl of [`Ipv6Addr`], all eight groups appear
    /// zero-padded, e.g. `2a00:1450:4001:0809:0000:0000:0000:200e`. This
    /// is also the form the `Display` impl of `Aaaa` itself emits.
    pub fn expanded(&self) -> String {
        let segments = self.addr.segments();
        let mut res = String::with_capacity(39);
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                res.push(':');
            }
            res.push_str(&format!("{:04x}", segment));
        }
        res
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let slice = parser.parse_slice(16)?;
        let mut octets = [0u8; 16];
        octets.copy_from_slice(slice);
        Ok(Aaaa::new(octets.into()))
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_slice(&self.addr.octets())
    }
}

impl From<Ipv6Addr> for Aaaa {
    fn from(addr: Ipv6Addr) -> Self {
        Aaaa::new(addr)
    }
}

impl fmt::Display for Aaaa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.expanded())
    }
}

//------------ Cname, Ns, Ptr ------------------------------------------------

/// CNAME record data: the canonical name of an alias.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Cname {
    /// The canonical name.
    cname: Name,
}

impl Cname {
    /// Creates new record data from a name.
    pub fn new(cname: Name) -> Self {
        Cname { cname }
    }

    /// Returns the canonical name.
    pub fn cname(&self) -> &Name {
        &self.cname
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Name::parse(parser).map(Self::new)
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        self.cname.compose(target)
    }
}

impl fmt::Display for Cname {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.cname.fmt(f)
    }
}

/// NS record data: an authoritative name server.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ns {
    /// The name of the name server.
    nsdname: Name,
}

impl Ns {
    /// Creates new record data from a name.
    pub fn new(nsdname: Name) -> Self {
        Ns { nsdname }
    }

    /// Returns the name of the name server.
    pub fn nsdname(&self) -> &Name {
        &self.nsdname
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Name::parse(parser).map(Self::new)
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        self.nsdname.compose(target)
    }
}

impl fmt::Display for Ns {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.nsdname.fmt(f)
    }
}

/// PTR record data: a domain name pointer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ptr {
    /// The name the record points to.
    ptrdname: Name,
}

impl Ptr {
    /// Creates new record data from a name.
    pub fn new(ptrdname: Name) -> Self {
        Ptr { ptrdname }
    }

    /// Returns the name the record points to.
    pub fn ptrdname(&self) -> &Name {
        &self.ptrdname
    }

    /// Trades the record data for the name it points to.
    pub fn into_ptrdname(self) -> Name {
        self.ptrdname
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Name::parse(parser).map(Self::new)
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        self.ptrdname.compose(target)
    }
}

impl fmt::Display for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PTRRecord: {}", self.ptrdname)
    }
}

//------------ Mx ------------------------------------------------------------

/// MX record data: a mail exchanger and its preference.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Mx {
    /// The preference of this exchanger. Lower is better.
    preference: u16,

    /// The name of the mail exchanger.
    exchange: Name,
}

impl Mx {
    /// Creates new record data from preference and exchanger name.
    pub fn new(preference: u16, exchange: Name) -> Self {
        Mx {
            preference,
            exchange,
        }
    }

    /// Returns the preference. Lower values are preferred.
    pub fn preference(&self) -> u16 {
        self.preference
    }

    /// Returns the name of the mail exchanger.
    pub fn exchange(&self) -> &Name {
        &self.exchange
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Mx {
            preference: parser.parse_u16()?,
            exchange: Name::parse(parser)?,
        })
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_u16(self.preference);
        self.exchange.compose(target);
    }
}

impl fmt::Display for Mx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.preference, self.exchange)
    }
}

//------------ Srv -----------------------------------------------------------

/// SRV record data: the location of a service.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Srv {
    /// The priority of this target. Lower is tried first.
    priority: u16,

    /// The weight for selection among targets of equal priority.
    weight: u16,

    /// The port the service runs on.
    port: u16,

    /// The host providing the service.
    target: Name,
}

impl Srv {
    /// Creates new record data from its four fields.
    pub fn new(priority: u16, weight: u16, port: u16, target: Name) -> Self {
        Srv {
            priority,
            weight,
            port,
            target,
        }
    }

    /// Returns the priority. Lower values are tried first.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Returns the weight among targets of equal priority.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Returns the port the service runs on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the host providing the service.
    pub fn target(&self) -> &Name {
        &self.target
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Srv {
            priority: parser.parse_u16()?,
            weight: parser.parse_u16()?,
            port: parser.parse_u16()?,
            target: Name::parse(parser)?,
        })
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_u16(self.priority);
        target.append_u16(self.weight);
        target.append_u16(self.port);
        self.target.compose(target);
    }
}

impl fmt::Display for Srv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.priority, self.weight, self.port, self.target
        )
    }
}

//------------ Txt -----------------------------------------------------------

/// TXT record data: a sequence of character strings.
///
/// On the wire the data is a run of character strings, each preceded by
/// its length as a single octet. The raw strings are kept in order. Many
/// deployments additionally treat the strings as `key=value` attributes;
/// the [`attributes`][Self::attributes] view provides that reading.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Txt {
    /// The character strings in wire order.
    entries: Vec<Vec<u8>>,
}

impl Txt {
    /// Creates new record data from a sequence of character strings.
    ///
    /// Fails if any string is longer than 255 octets.
    pub fn from_entries(
        entries: impl IntoIterator<Item = Vec<u8>>,
    ) -> Result<Self, CharStrError> {
        let entries: Vec<Vec<u8>> = entries.into_iter().collect();
        if entries.iter().any(|e| e.len() > 255) {
            return Err(CharStrError);
        }
        Ok(Txt { entries })
    }

    /// Returns the character strings in wire order.
    pub fn entries(&self) -> &[Vec<u8>] {
        &self.entries
    }

    /// Returns the key/value view of the record.
    ///
    /// Each entry is split at its first `=`; anything after that octet,
    /// further equals signs included, becomes part of the value. Entries
    /// without an `=` don't appear in the map at all, only in
    /// [`entries`][Self::entries]. Both halves are converted lossily from
    /// UTF-8.
    pub fn attributes(&self) -> HashMap<String, String> {
        let mut res = HashMap::new();
        for entry in &self.entries {
            if let Some(at) = entry.iter().position(|&b| b == b'=') {
                res.insert(
                    String::from_utf8_lossy(&entry[..at]).into_owned(),
                    String::from_utf8_lossy(&entry[at + 1..]).into_owned(),
                );
            }
        }
        res
    }

    /// Takes `rdlen` octets of record data from `parser`.
    pub fn parse(
        parser: &mut Parser,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        let end = parser.pos() + rdlen;
        let mut entries = Vec::new();
        while parser.pos() < end {
            let len = usize::from(parser.parse_u8()?);
            if parser.pos() + len > end {
                return Err(ParseError::form_error(
                    "character string crosses record data boundary",
                ));
            }
            entries.push(parser.parse_slice(len)?.to_vec());
        }
        Ok(Txt { entries })
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        for entry in &self.entries {
            target.append_u8(entry.len() as u8);
            target.append_slice(entry);
        }
    }
}

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "\"{}\"", String::from_utf8_lossy(entry))?;
        }
        Ok(())
    }
}

//------------ Soa -----------------------------------------------------------

/// SOA record data: the start of a zone of authority.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Soa {
    /// The name of the primary name server of the zone.
    mname: Name,

    /// The mailbox of the person responsible for the zone.
    rname: Name,

    /// The serial number of this version of the zone.
    serial: u32,

    /// The refresh interval for secondaries in seconds.
    refresh: u32,

    /// The retry interval after a failed refresh in seconds.
    retry: u32,

    /// How long the zone stays valid without refresh in seconds.
    expire: u32,

    /// The minimum TTL, also used for negative caching.
    minimum: u32,
}

impl Soa {
    /// Creates new record data from its seven fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Returns the name of the primary name server.
    pub fn mname(&self) -> &Name {
        &self.mname
    }

    /// Returns the mailbox of the person responsible for the zone.
    pub fn rname(&self) -> &Name {
        &self.rname
    }

    /// Returns the serial number of the zone.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the refresh interval in seconds.
    pub fn refresh(&self) -> u32 {
        self.refresh
    }

    /// Returns the retry interval in seconds.
    pub fn retry(&self) -> u32 {
        self.retry
    }

    /// Returns the expiry time in seconds.
    pub fn expire(&self) -> u32 {
        self.expire
    }

    /// Returns the minimum TTL.
    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Takes the record data from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Soa {
            mname: Name::parse(parser)?,
            rname: Name::parse(parser)?,
            serial: parser.parse_u32()?,
            refresh: parser.parse_u32()?,
            retry: parser.parse_u32()?,
            expire: parser.parse_u32()?,
            minimum: parser.parse_u32()?,
        })
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        self.mname.compose(target);
        self.rname.compose(target);
        target.append_u32(self.serial);
        target.append_u32(self.refresh);
        target.append_u32(self.retry);
        target.append_u32(self.expire);
        target.append_u32(self.minimum);
    }
}

impl fmt::Display for Soa {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}

//------------ Other ---------------------------------------------------------

/// Record data of a type this crate has no typed representation for.
///
/// The raw octets are kept along with the type code. Since the meaning of
/// the octets is unknown, no compression pointers are resolved; records
/// of unknown types containing pointers will not survive re-encoding
/// meaningfully, which matches how [RFC 3597] asks unknown types to be
/// treated.
///
/// [RFC 3597]: https://tools.ietf.org/html/rfc3597
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Other {
    /// The record type.
    rtype: Rtype,

    /// The raw record data.
    data: Bytes,
}

impl Other {
    /// Creates new record data from a type code and raw octets.
    pub fn new(rtype: Rtype, data: Bytes) -> Self {
        Other { rtype, data }
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the raw record data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Takes `rdlen` octets of record data from `parser`.
    pub fn parse(
        rtype: Rtype,
        parser: &mut Parser,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        Ok(Other {
            rtype,
            data: Bytes::copy_from_slice(parser.parse_slice(rdlen)?),
        })
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_slice(&self.data)
    }
}

impl fmt::Display for Other {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // The generic representation from RFC 3597.
        write!(f, "\\# {}", self.data.len())?;
        for octet in self.data.iter() {
            write!(f, " {:02x}", octet)?;
        }
        Ok(())
    }
}

//------------ RecordData ----------------------------------------------------

/// The data of a resource record.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RecordData {
    /// A host address.
    A(A),

    /// An IPv6 host address.
    Aaaa(Aaaa),

    /// The canonical name for an alias.
    Cname(Cname),

    /// An authoritative name server.
    Ns(Ns),

    /// A domain name pointer.
    Ptr(Ptr),

    /// A mail exchanger.
    Mx(Mx),

    /// The location of a service.
    Srv(Srv),

    /// Text strings.
    Txt(Txt),

    /// The start of a zone of authority.
    Soa(Soa),

    /// Data of any other type.
    Other(Other),
}

impl RecordData {
    /// Returns the record type of the data.
    pub fn rtype(&self) -> Rtype {
        match *self {
            RecordData::A(_) => Rtype::A,
            RecordData::Aaaa(_) => Rtype::Aaaa,
            RecordData::Cname(_) => Rtype::Cname,
            RecordData::Ns(_) => Rtype::Ns,
            RecordData::Ptr(_) => Rtype::Ptr,
            RecordData::Mx(_) => Rtype::Mx,
            RecordData::Srv(_) => Rtype::Srv,
            RecordData::Txt(_) => Rtype::Txt,
            RecordData::Soa(_) => Rtype::Soa,
            RecordData::Other(ref data) => data.rtype(),
        }
    }

    /// Takes `rdlen` octets of record data of type `rtype` from `parser`.
    ///
    /// Types without a variant of their own are kept raw in
    /// [`RecordData::Other`].
    pub fn parse(
        rtype: Rtype,
        parser: &mut Parser,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        match rtype {
            Rtype::A => A::parse(parser).map(RecordData::A),
            Rtype::Aaaa => Aaaa::parse(parser).map(RecordData::Aaaa),
            Rtype::Cname => Cname::parse(parser).map(RecordData::Cname),
            Rtype::Ns => Ns::parse(parser).map(RecordData::Ns),
            Rtype::Ptr => Ptr::parse(parser).map(RecordData::Ptr),
            Rtype::Mx => Mx::parse(parser).map(RecordData::Mx),
            Rtype::Srv => Srv::parse(parser).map(RecordData::Srv),
            Rtype::Txt => Txt::parse(parser, rdlen).map(RecordData::Txt),
            Rtype::Soa => Soa::parse(parser).map(RecordData::Soa),
            _ => Other::parse(rtype, parser, rdlen).map(RecordData::Other),
        }
    }

    /// Appends the record data to `target`.
    pub fn compose(&self, target: &mut Composer) {
        match *self {
            RecordData::A(ref data) => data.compose(target),
            RecordData::Aaaa(ref data) => data.compose(target),
            RecordData::Cname(ref data) => data.compose(target),
            RecordData::Ns(ref data) => data.compose(target),
            RecordData::Ptr(ref data) => data.compose(target),
            RecordData::Mx(ref data) => data.compose(target),
            RecordData::Srv(ref data) => data.compose(target),
            RecordData::Txt(ref data) => data.compose(target),
            RecordData::Soa(ref data) => data.compose(target),
            RecordData::Other(ref data) => data.compose(target),
        }
    }
}

//--- Display

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecordData::A(ref data) => data.fmt(f),
            RecordData::Aaaa(ref data) => data.fmt(f),
            RecordData::Cname(ref data) => data.fmt(f),
            RecordData::Ns(ref data) => data.fmt(f),
            // The record-level presentation wants the bare target name;
            // the type-qualified form is Ptr's own Display.
            RecordData::Ptr(ref data) => data.ptrdname().fmt(f),
            RecordData::Mx(ref data) => data.fmt(f),
            RecordData::Srv(ref data) => data.fmt(f),
            RecordData::Txt(ref data) => data.fmt(f),
            RecordData::Soa(ref data) => data.fmt(f),
            RecordData::Other(ref data) => data.fmt(f),
        }
    }
}

//============ Error Types ===================================================

//------------ CharStrError --------------------------------------------------

/// A character string was longer than 255 octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CharStrError;

impl fmt::Display for CharStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("character string too long")
    }
}

impl std::error::Error for CharStrError {}

//============ Testing =======================================================

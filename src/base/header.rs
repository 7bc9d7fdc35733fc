//! The header of a DNS message.
//!
//! Each DNS message starts with a twelve octet header: four octets with
//! the message ID and the flags, followed by four 16 bit counts giving the
//! number of entries in each of the message's sections. Content and format
//! are defined in section 4.1.1 of [RFC 1035].
//!
//! Since the counts are derived from the sections themselves when a
//! message is composed, the header is split into two types: [`Header`]
//! holds the freely settable first four octets while [`HeaderCounts`]
//! holds the counts.
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use super::iana::{Opcode, Rcode};
use super::wire::{Composer, ParseError, Parser};
use std::fmt;

//------------ Header --------------------------------------------------------

/// The first part of the header of a DNS message.
///
/// This type covers the message ID, the opcode and response code, and the
/// boolean flags. It keeps all of them in wire representation, i.e., in
/// network byte order, laid out like this:
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|Z |AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The basic structure and most of the fields are defined in [RFC 1035],
/// except for the AD and CD flags, which are defined in [RFC 4035].
///
/// [RFC 1035]: https://tools.ietf.org/html/rfc1035
/// [RFC 4035]: https://tools.ietf.org/html/rfc4035
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    /// The first four header octets in wire format.
    inner: [u8; 4],
}

/// # Creation and Conversion
///
impl Header {
    /// Creates a new header.
    ///
    /// The new header has all fields as either zero or false. Thus, the
    /// opcode will be [`Opcode::Query`] and the response code will be
    /// [`Rcode::NoError`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the underlying octets.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }
}

/// # Field Access
///
impl Header {
    /// Returns the value of the ID field.
    ///
    /// The ID is chosen by whoever creates a query and is copied into the
    /// response by the server, allowing responses to be matched to their
    /// queries.
    pub fn id(self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    /// Sets the value of the ID field.
    pub fn set_id(&mut self, value: u16) {
        self.inner[..2].copy_from_slice(&value.to_be_bytes())
    }

    /// Sets the ID field to a random value.
    pub fn set_random_id(&mut self) {
        self.set_id(rand::random())
    }

    /// Returns whether the QR bit is set.
    ///
    /// The bit specifies whether the message is a query (`false`) or a
    /// response (`true`).
    pub fn qr(self) -> bool {
        self.get_bit(2, 7)
    }

    /// Sets the value of the QR bit.
    pub fn set_qr(&mut self, set: bool) {
        self.set_bit(2, 7, set)
    }

    /// Returns the value of the Opcode field.
    ///
    /// This field specifies the kind of query the message contains. For a
    /// client that is pretty much always [`Opcode::Query`].
    pub fn opcode(self) -> Opcode {
        Opcode::from_int((self.inner[2] >> 3) & 0x0F)
    }

    /// Sets the value of the Opcode field.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.inner[2] = (self.inner[2] & 0x87) | (opcode.to_int() << 3);
    }

    /// Returns whether the AA bit is set.
    ///
    /// In a response, the bit states that the server is authoritative for
    /// the queried domain.
    pub fn aa(self) -> bool {
        self.get_bit(2, 2)
    }

    /// Sets the value of the AA bit.
    pub fn set_aa(&mut self, set: bool) {
        self.set_bit(2, 2, set)
    }

    /// Returns whether the TC bit is set.
    ///
    /// The bit states that the message was truncated in transport. A
    /// caller seeing this on a UDP response may want to retry over TCP.
    pub fn tc(self) -> bool {
        self.get_bit(2, 1)
    }

    /// Sets the value of the TC bit.
    pub fn set_tc(&mut self, set: bool) {
        self.set_bit(2, 1, set)
    }

    /// Returns whether the RD bit is set.
    ///
    /// The `recursion desired' bit asks the server to answer the query
    /// recursively. It is copied into the response.
    pub fn rd(self) -> bool {
        self.get_bit(2, 0)
    }

    /// Sets the value of the RD bit.
    pub fn set_rd(&mut self, set: bool) {
        self.set_bit(2, 0, set)
    }

    /// Returns whether the RA bit is set.
    ///
    /// In a response, the `recursion available' bit states whether the
    /// server supports recursive queries.
    pub fn ra(self) -> bool {
        self.get_bit(3, 7)
    }

    /// Sets the value of the RA bit.
    pub fn set_ra(&mut self, set: bool) {
        self.set_bit(3, 7, set)
    }

    /// Returns whether the reserved Z bit is set.
    ///
    /// The bit must be zero in all messages.
    pub fn z(self) -> bool {
        self.get_bit(3, 6)
    }

    /// Returns whether the AD bit is set.
    pub fn ad(self) -> bool {
        self.get_bit(3, 5)
    }

    /// Sets the value of the AD bit.
    pub fn set_ad(&mut self, set: bool) {
        self.set_bit(3, 5, set)
    }

    /// Returns whether the CD bit is set.
    pub fn cd(self) -> bool {
        self.get_bit(3, 4)
    }

    /// Sets the value of the CD bit.
    pub fn set_cd(&mut self, set: bool) {
        self.set_bit(3, 4, set)
    }

    /// Returns the value of the RCODE field.
    pub fn rcode(self) -> Rcode {
        Rcode::from_int(self.inner[3] & 0x0F)
    }

    /// Sets the value of the RCODE field.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.inner[3] = (self.inner[3] & 0xF0) | (rcode.to_int() & 0x0F);
    }

    //--- Internal helpers

    /// Returns the value of the bit at `bit` of the octet at `offset`.
    ///
    /// Bits are numbered with the most significant bit being seven.
    fn get_bit(self, offset: usize, bit: u8) -> bool {
        self.inner[offset] & (1 << bit) != 0
    }

    /// Sets or resets the given bit.
    fn set_bit(&mut self, offset: usize, bit: u8, set: bool) {
        if set {
            self.inner[offset] |= 1 << bit
        } else {
            self.inner[offset] &= !(1 << bit)
        }
    }
}

/// # Parsing and Composing
///
impl Header {
    /// Takes a header from the beginning of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let slice = parser.parse_slice(4)?;
        let mut inner = [0u8; 4];
        inner.copy_from_slice(slice);
        Ok(Header { inner })
    }

    /// Appends the header to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_slice(&self.inner)
    }
}

//--- Display

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id {} opcode {} rcode {} qr {} aa {} tc {} rd {} ra {} \
             ad {} cd {}",
            self.id(),
            self.opcode(),
            self.rcode(),
            self.qr(),
            self.aa(),
            self.tc(),
            self.rd(),
            self.ra(),
            self.ad(),
            self.cd()
        )
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The section counts of a DNS message header.
///
/// These are the four 16 bit integers following the flags that state the
/// number of entries in the question, answer, authority, and additional
/// sections.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderCounts {
    /// The number of entries in the question section.
    pub qdcount: u16,

    /// The number of entries in the answer section.
    pub ancount: u16,

    /// The number of entries in the authority section.
    pub nscount: u16,

    /// The number of entries in the additional section.
    pub arcount: u16,
}

impl HeaderCounts {
    /// Takes the counts from the beginning of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(HeaderCounts {
            qdcount: parser.parse_u16()?,
            ancount: parser.parse_u16()?,
            nscount: parser.parse_u16()?,
            arcount: parser.parse_u16()?,
        })
    }

    /// Appends the counts to `target`.
    pub fn compose(&self, target: &mut Composer) {
        target.append_u16(self.qdcount);
        target.append_u16(self.ancount);
        target.append_u16(self.nscount);
        target.append_u16(self.arcount);
    }
}

//============ Testing =======================================================

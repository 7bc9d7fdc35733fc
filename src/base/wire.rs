//! Creating and consuming data in wire format.
//!
//! DNS messages are laid out as a sequence of big-endian integers, octet
//! runs, and domain names. This module provides the two halves of that
//! conversion: [`Parser`], a bounds-checked cursor over the octets of a
//! received packet, and [`Composer`], an append-only builder that also
//! keeps the per-message state needed for domain name compression.
//!
//! All multi-octet reads and writes are big-endian as required by
//! [RFC 1035].
//!
//! [RFC 1035]: https://tools.ietf.org/html/rfc1035

use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;
use std::fmt;

/// The highest packet position a compression pointer can refer to.
///
/// Pointers are 14 bits wide, so positions beyond this value are never
/// recorded as compression targets.
pub(crate) const POINTER_MAX: usize = 0x3FFF;

//------------ Parser --------------------------------------------------------

/// A cursor over the octets of a DNS packet.
///
/// The parser remembers the whole packet, not just the unread remainder,
/// because domain name compression needs to jump to earlier positions.
/// Every read checks against the end of the packet first; no operation can
/// advance past it.
#[derive(Clone, Copy, Debug)]
pub struct Parser<'a> {
    /// The full packet.
    octets: &'a [u8],

    /// The position of the next octet to be read.
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at the beginning of `octets`.
    pub fn from_octets(octets: &'a [u8]) -> Self {
        Parser { octets, pos: 0 }
    }

    /// Returns the current read position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.octets.len() - self.pos
    }

    /// Moves the read position to `pos`.
    ///
    /// Seeking to the position right after the last octet is fine, any
    /// further is an error.
    pub fn seek(&mut self, pos: usize) -> Result<(), ParseError> {
        if pos > self.octets.len() {
            return Err(ParseError::ShortInput);
        }
        self.pos = pos;
        Ok(())
    }

    /// Takes a single octet from the parser.
    pub fn parse_u8(&mut self) -> Result<u8, ParseError> {
        let res = *self.octets.get(self.pos).ok_or(ParseError::ShortInput)?;
        self.pos += 1;
        Ok(res)
    }

    /// Takes a big-endian `u16` from the parser.
    pub fn parse_u16(&mut self) -> Result<u16, ParseError> {
        let slice = self.parse_slice(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    /// Takes a big-endian `u32` from the parser.
    pub fn parse_u32(&mut self) -> Result<u32, ParseError> {
        let slice = self.parse_slice(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    /// Takes the next `len` octets from the parser.
    pub fn parse_slice(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(ParseError::ShortInput)?;
        if end > self.octets.len() {
            return Err(ParseError::ShortInput);
        }
        let res = &self.octets[self.pos..end];
        self.pos = end;
        Ok(res)
    }
}

//------------ Composer ------------------------------------------------------

/// A builder for the wire format of one DNS message.
///
/// Apart from appending octets, the composer owns the compression map of
/// the message under construction: for every domain name suffix already
/// written it remembers the packet position of its first occurrence, keyed
/// by the lowercased dotted representation of the suffix. A single map
/// lives for exactly one message; starting a new message means starting a
/// new composer.
#[derive(Clone, Debug, Default)]
pub struct Composer {
    /// The octets written so far.
    target: BytesMut,

    /// Positions of previously written name suffixes.
    compress: HashMap<String, u16>,
}

impl Composer {
    /// Creates a new, empty composer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a composer with `capacity` octets pre-allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Composer {
            target: BytesMut::with_capacity(capacity),
            compress: HashMap::new(),
        }
    }

    /// Returns the position the next octet will be written at.
    pub fn pos(&self) -> usize {
        self.target.len()
    }

    /// Appends a slice of octets.
    pub fn append_slice(&mut self, slice: &[u8]) {
        self.target.put_slice(slice);
    }

    /// Appends a single octet.
    pub fn append_u8(&mut self, value: u8) {
        self.target.put_u8(value);
    }

    /// Appends a `u16` in big-endian order.
    pub fn append_u16(&mut self, value: u16) {
        self.target.put_u16(value);
    }

    /// Appends a `u32` in big-endian order.
    pub fn append_u32(&mut self, value: u32) {
        self.target.put_u32(value);
    }

    /// Overwrites the two octets at `pos` with `value` in big-endian order.
    ///
    /// Used to patch in an RDLENGTH once the record data has been written.
    ///
    /// # Panics
    ///
    /// Panics if `pos + 2` exceeds the current length.
    pub fn patch_u16(&mut self, pos: usize, value: u16) {
        self.target[pos..pos + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Returns the recorded position of a name suffix, if any.
    ///
    /// The key is the lowercased dotted representation of the suffix.
    pub(crate) fn compress_target(&self, key: &str) -> Option<u16> {
        self.compress.get(key).copied()
    }

    /// Records the current position as the location of a name suffix.
    ///
    /// Positions beyond the 14-bit pointer range are not recorded since
    /// no pointer could ever refer to them.
    pub(crate) fn note_suffix(&mut self, key: String) {
        let pos = self.pos();
        if pos <= POINTER_MAX {
            self.compress.entry(key).or_insert(pos as u16);
        }
    }

    /// Takes the composed octets out of the composer.
    pub fn freeze(self) -> Bytes {
        self.target.freeze()
    }
}

//============ Error Types ===================================================

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing wire data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An attempt was made to read beyond the end of the packet.
    ShortInput,

    /// The data did not conform to the wire format.
    Form(FormError),
}

impl ParseError {
    /// Creates a parse error as a form error with the given message.
    pub fn form_error(msg: &'static str) -> Self {
        FormError::new(msg).into()
    }
}

//--- From

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

//--- Display and Error

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// A formatting error occurred.
///
/// This is a generic error for all kinds of cases where data is being
/// rejected. The static string is for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error with the given diagnostics string.
    pub fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

//--- Display and Error

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FormError {}

//============ Testing =======================================================

//! Domain names and labels.
//!
//! A domain name is a sequence of labels. On the wire each label is
//! preceded by its length as a single octet, and the name is terminated
//! by a label of length zero. The total wire length of a name is limited
//! to 255 octets, a single label to 63.
//!
//! Within a message, a name may end in a compression pointer: a two octet
//! value with the top two bits set whose remaining fourteen bits give the
//! packet position of a previously written suffix. Parsing follows these
//! pointers; composing consults the compression map kept by the
//! [`Composer`].
//!
//! Label octets are arbitrary on the wire. Names built from presentation
//! strings are restricted to ASCII, and all comparisons ignore ASCII
//! case as required by section 2.3.3 of [RFC 4343].
//!
//! [RFC 4343]: https://tools.ietf.org/html/rfc4343

use super::wire::{Composer, ParseError, Parser};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// The maximum length of a label in octets.
const MAX_LABEL_LEN: usize = 63;

/// The maximum wire length of a name in octets.
const MAX_NAME_LEN: usize = 255;

//------------ Label ---------------------------------------------------------

/// One component of a domain name.
///
/// A label carries between 1 and 63 octets. The empty root label is not
/// represented explicitly; [`Name`] keeps it implicit.
#[derive(Clone, Debug, Eq)]
pub struct Label {
    /// The octets of the label.
    octets: Vec<u8>,
}

impl Label {
    /// Creates a label, checking length and ASCII-ness.
    ///
    /// This is the constructor for labels coming from presentation data.
    /// Labels parsed off the wire may carry arbitrary octets instead.
    pub fn new(octets: impl Into<Vec<u8>>) -> Result<Self, LabelError> {
        let octets = octets.into();
        if octets.is_empty() {
            return Err(LabelError::Empty);
        }
        if octets.len() > MAX_LABEL_LEN {
            return Err(LabelError::LongLabel);
        }
        if !octets.is_ascii() {
            return Err(LabelError::NonAscii);
        }
        Ok(Label { octets })
    }

    /// Creates a label from octets already read off the wire.
    ///
    /// The caller guarantees the length to be between 1 and 63.
    fn from_wire(octets: &[u8]) -> Self {
        debug_assert!(!octets.is_empty() && octets.len() <= MAX_LABEL_LEN);
        Label {
            octets: octets.into(),
        }
    }

    /// Returns the octets of the label.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the length of the label in octets.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Appends the label in presentation format to `target`.
    ///
    /// Dots and backslashes are escaped with a backslash, octets outside
    /// the printable ASCII range as a backslash followed by three decimal
    /// digits. `lowercase` folds ASCII uppercase first, which is what the
    /// compression map keys need.
    fn push_presentation(&self, target: &mut String, lowercase: bool) {
        for &octet in &self.octets {
            let octet = if lowercase {
                octet.to_ascii_lowercase()
            } else {
                octet
            };
            if octet == b'.' || octet == b'\\' {
                target.push('\\');
                target.push(octet as char);
            } else if (0x20..0x7F).contains(&octet) {
                target.push(octet as char);
            } else {
                target.push('\\');
                target.push_str(&format!("{:03}", octet));
            }
        }
    }
}

//--- PartialEq and Hash

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.octets.eq_ignore_ascii_case(&other.octets)
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for octet in &self.octets {
            octet.to_ascii_lowercase().hash(state)
        }
    }
}

//--- Display

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = String::with_capacity(self.octets.len());
        self.push_presentation(&mut res, false);
        f.write_str(&res)
    }
}

//------------ Name ----------------------------------------------------------

/// A domain name.
///
/// The name owns its sequence of labels; the terminating root label is
/// implicit. All names here are absolute. Comparison and hashing ignore
/// ASCII case.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Name {
    /// The labels of the name, without the root label.
    labels: Vec<Label>,
}

/// # Creation
///
impl Name {
    /// Returns the root name.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a name from a sequence of labels.
    pub fn from_labels(
        labels: impl IntoIterator<Item = Label>,
    ) -> Result<Self, NameError> {
        let labels: Vec<Label> = labels.into_iter().collect();
        let res = Name { labels };
        if res.wire_len() > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        Ok(res)
    }

    /// Appends a label to the name.
    pub fn push(&mut self, label: Label) -> Result<(), NameError> {
        if self.wire_len() + label.len() + 1 > MAX_NAME_LEN {
            return Err(NameError::LongName);
        }
        self.labels.push(label);
        Ok(())
    }
}

/// # Access
///
impl Name {
    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the labels of the name.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Returns the length of the name on the wire, uncompressed.
    ///
    /// This includes each label's length octet and the terminating root
    /// label.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Returns the compression map key for the suffix starting at `index`.
    fn suffix_key(&self, index: usize) -> String {
        let mut res = String::new();
        for (i, label) in self.labels[index..].iter().enumerate() {
            if i > 0 {
                res.push('.');
            }
            label.push_presentation(&mut res, true);
        }
        res
    }
}

/// # Parsing and Composing
///
impl Name {
    /// Takes a name from the current position of `parser`.
    ///
    /// Compression pointers are followed. Each pointer must refer to a
    /// position strictly before the octet it is read from, and no position
    /// may be visited twice; violating either makes the packet malformed.
    /// After a pointer has been followed, the parser is left positioned
    /// right behind the first pointer.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut labels = Vec::new();
        let mut wire_len = 1;
        let mut visited: Vec<usize> = Vec::new();
        let mut return_pos = None;

        loop {
            let at = parser.pos();
            let octet = parser.parse_u8()?;
            match octet {
                0 => break,
                len @ 1..=0x3F => {
                    let len = len as usize;
                    wire_len += len + 1;
                    if wire_len > MAX_NAME_LEN {
                        return Err(ParseError::form_error(
                            "long domain name",
                        ));
                    }
                    labels.push(Label::from_wire(parser.parse_slice(len)?));
                }
                octet if octet & 0xC0 == 0xC0 => {
                    let target = usize::from(octet & 0x3F) << 8
                        | usize::from(parser.parse_u8()?);
                    if target >= at {
                        return Err(ParseError::form_error(
                            "forward compression pointer",
                        ));
                    }
                    if visited.contains(&target) {
                        return Err(ParseError::form_error(
                            "compression pointer loop",
                        ));
                    }
                    visited.push(target);
                    if return_pos.is_none() {
                        return_pos = Some(parser.pos());
                    }
                    parser.seek(target)?;
                }
                _ => {
                    return Err(ParseError::form_error(
                        "reserved label type",
                    ));
                }
            }
        }

        if let Some(pos) = return_pos {
            parser.seek(pos)?;
        }
        Ok(Name { labels })
    }

    /// Appends the name to `target`, compressing where possible.
    ///
    /// Suffixes are probed longest first. The first suffix already present
    /// in the composer's map is replaced by a pointer; every label written
    /// out records its position for later names.
    pub fn compose(&self, target: &mut Composer) {
        for index in 0..self.labels.len() {
            let key = self.suffix_key(index);
            if let Some(pos) = target.compress_target(&key) {
                target.append_u16(0xC000 | pos);
                return;
            }
            target.note_suffix(key);
            let label = &self.labels[index];
            target.append_u8(label.len() as u8);
            target.append_slice(label.as_slice());
        }
        target.append_u8(0);
    }

    /// Appends the name to `target` without compressing.
    ///
    /// The name still does not record its suffixes, so later names cannot
    /// point into it either.
    pub fn compose_uncompressed(&self, target: &mut Composer) {
        for label in &self.labels {
            target.append_u8(label.len() as u8);
            target.append_slice(label.as_slice());
        }
        target.append_u8(0);
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = NameError;

    /// Parses a name in presentation format.
    ///
    /// A trailing dot is accepted and ignored; escapes are not supported.
    /// The empty string and `"."` both produce the root name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Ok(Name::root());
        }
        let mut res = Name::root();
        for part in s.split('.') {
            res.push(Label::new(part.as_bytes().to_vec())?)?;
        }
        Ok(res)
    }
}

//--- Display

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.labels.is_empty() {
            return f.write_str(".");
        }
        let mut res = String::new();
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                res.push('.');
            }
            label.push_presentation(&mut res, false);
        }
        f.write_str(&res)
    }
}

//============ Error Types ===================================================

//------------ LabelError ----------------------------------------------------

/// A label could not be constructed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LabelError {
    /// The label was empty.
    Empty,

    /// The label was longer than 63 octets.
    LongLabel,

    /// The label contained non-ASCII octets.
    NonAscii,
}

//--- Display and Error

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LabelError::Empty => f.write_str("empty label"),
            LabelError::LongLabel => f.write_str("label too long"),
            LabelError::NonAscii => f.write_str("non-ASCII label"),
        }
    }
}

impl std::error::Error for LabelError {}

//------------ NameError -----------------------------------------------------

/// A name could not be constructed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The name would exceed 255 octets on the wire.
    LongName,

    /// One of the labels was unacceptable.
    BadLabel(LabelError),
}

//--- From

impl From<LabelError> for NameError {
    fn from(err: LabelError) -> Self {
        NameError::BadLabel(err)
    }
}

//--- Display and Error

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NameError::LongName => f.write_str("domain name too long"),
            NameError::BadLabel(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for NameError {}

//============ Testing =======================================================

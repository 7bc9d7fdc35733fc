//! A single question of a DNS message.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::wire::{Composer, ParseError, Parser};
use std::fmt;

//------------ Question ------------------------------------------------------

/// A question of a DNS message.
///
/// A question carries the name to be looked up, the requested record type,
/// and the class. Queries carry exactly one; servers copy it into the
/// response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    /// The name of the question.
    qname: Name,

    /// The requested record type.
    qtype: Rtype,

    /// The class of the question.
    qclass: Class,
}

impl Question {
    /// Creates a new question.
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates a new question in the Internet class.
    pub fn new_in(qname: Name, qtype: Rtype) -> Self {
        Self::new(qname, qtype, Class::In)
    }

    /// Returns the name of the question.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the requested record type.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the class of the question.
    pub fn qclass(&self) -> Class {
        self.qclass
    }

    /// Takes a question from the current position of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Question {
            qname: Name::parse(parser)?,
            qtype: parser.parse_u16()?.into(),
            qclass: parser.parse_u16()?.into(),
        })
    }

    /// Appends the question to `target`.
    pub fn compose(&self, target: &mut Composer) {
        self.qname.compose(target);
        target.append_u16(self.qtype.into());
        target.append_u16(self.qclass.into());
    }
}

//--- Display

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}

//============ Testing =======================================================

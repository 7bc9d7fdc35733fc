//! Whole DNS messages.

use super::header::{Header, HeaderCounts};
use super::question::Question;
use super::record::Record;
use super::wire::{Composer, ParseError, Parser};
use bytes::Bytes;
use std::fmt;

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// A message consists of a header and four sections: the questions, the
/// answers, the authority records, and the additional records. This type
/// owns all of them in decoded form; the section counts of the wire
/// format are derived from the section lengths when composing and are
/// therefore always consistent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Message {
    /// The message header.
    header: Header,

    /// The question section.
    questions: Vec<Question>,

    /// The answer section.
    answers: Vec<Record>,

    /// The authority section.
    authorities: Vec<Record>,

    /// The additional section.
    additionals: Vec<Record>,
}

/// # Creation
///
impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query message for the given question.
    ///
    /// The header is left at its defaults apart from the ID and flags the
    /// sender is expected to fill in.
    pub fn query(question: Question) -> Self {
        let mut res = Self::new();
        res.questions.push(question);
        res
    }
}

/// # Access
///
impl Message {
    /// Returns a reference to the message header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the message header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the question section.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the answer section.
    pub fn answers(&self) -> &[Record] {
        &self.answers
    }

    /// Returns the authority section.
    pub fn authorities(&self) -> &[Record] {
        &self.authorities
    }

    /// Returns the additional section.
    pub fn additionals(&self) -> &[Record] {
        &self.additionals
    }

    /// Returns the first question, if there is one.
    pub fn first_question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Appends a question to the question section.
    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question)
    }

    /// Appends a record to the answer section.
    pub fn push_answer(&mut self, record: Record) {
        self.answers.push(record)
    }

    /// Appends a record to the authority section.
    pub fn push_authority(&mut self, record: Record) {
        self.authorities.push(record)
    }

    /// Appends a record to the additional section.
    pub fn push_additional(&mut self, record: Record) {
        self.additionals.push(record)
    }

    /// Returns whether this message answers `query`.
    ///
    /// The message has to be a response carrying the query's ID and an
    /// equal question section.
    pub fn is_answer(&self, query: &Message) -> bool {
        self.header.qr()
            && self.header.id() == query.header.id()
            && self.questions == query.questions
    }
}

/// # Parsing and Composing
///
impl Message {
    /// Parses a message from its wire format.
    ///
    /// Octets past the end of the message proper are ignored; some
    /// servers pad their responses.
    pub fn parse(octets: &[u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::from_octets(octets);
        let header = Header::parse(&mut parser)?;
        let counts = HeaderCounts::parse(&mut parser)?;
        let mut res = Message {
            header,
            ..Default::default()
        };
        for _ in 0..counts.qdcount {
            res.questions.push(Question::parse(&mut parser)?);
        }
        for _ in 0..counts.ancount {
            res.answers.push(Record::parse(&mut parser)?);
        }
        for _ in 0..counts.nscount {
            res.authorities.push(Record::parse(&mut parser)?);
        }
        for _ in 0..counts.arcount {
            res.additionals.push(Record::parse(&mut parser)?);
        }
        Ok(res)
    }

    /// Composes the wire format of the message.
    ///
    /// Name compression is applied across the entire message. Fails only
    /// if a section holds more entries than its 16 bit count can state.
    pub fn compose(&self) -> Result<Bytes, ParseError> {
        let counts = HeaderCounts {
            qdcount: section_count(&self.questions)?,
            ancount: section_count(&self.answers)?,
            nscount: section_count(&self.authorities)?,
            arcount: section_count(&self.additionals)?,
        };
        let mut target = Composer::with_capacity(512);
        self.header.compose(&mut target);
        counts.compose(&mut target);
        for question in &self.questions {
            question.compose(&mut target);
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additionals)
        {
            record.compose(&mut target);
        }
        Ok(target.freeze())
    }
}

/// Returns the length of a section as a count field value.
fn section_count<T>(section: &[T]) -> Result<u16, ParseError> {
    u16::try_from(section.len())
        .map_err(|_| ParseError::form_error("section too long"))
}

//--- Display

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, ";; {}", self.header)?;
        for question in &self.questions {
            writeln!(f, ";{}", question)?;
        }
        for record in &self.answers {
            writeln!(f, "{}", record)?;
        }
        for record in &self.authorities {
            writeln!(f, "{}", record)?;
        }
        for record in &self.additionals {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::iana::{Class, Rcode, Rtype};
    use crate::base::name::Name;
    use crate::base::rdata::{Cname, Mx, RecordData, A};
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn sample_response() -> Message {
        let mut msg = Message::query(Question::new_in(
            name("foo.example.com"),
            Rtype::A,
        ));
        msg.header_mut().set_id(0x2912);
        msg.header_mut().set_qr(true);
        msg.header_mut().set_rd(true);
        msg.header_mut().set_ra(true);
        msg.push_answer(Record::new(
            name("foo.example.com"),
            Class::In,
            600,
            RecordData::Cname(Cname::new(name("bar.example.com"))),
        ));
        msg.push_answer(Record::new(
            name("bar.example.com"),
            Class::In,
            600,
            RecordData::A(A::new(Ipv4Addr::new(192, 0, 2, 13))),
        ));
        msg.push_authority(Record::new(
            name("example.com"),
            Class::In,
            86400,
            RecordData::Mx(Mx::new(10, name("mail.example.com"))),
        ));
        msg
    }

    #[test]
    fn compose_parse_round_trip() {
        let msg = sample_response();
        let bytes = msg.compose().unwrap();
        assert_eq!(Message::parse(&bytes).unwrap(), msg);
    }

    #[test]
    fn compose_compresses_across_sections() {
        let msg = sample_response();
        let bytes = msg.compose().unwrap();
        // The uncompressed rendition takes three full copies of
        // "example.com" more than the compressed one.
        assert!(bytes.len() < 120);
        // Counts match the sections.
        assert_eq!(&bytes[4..12], b"\x00\x01\x00\x02\x00\x01\x00\x00");
    }

    #[test]
    fn parse_rejects_missing_records() {
        let msg = sample_response();
        let bytes = msg.compose().unwrap();
        // Claim three answers but deliver two.
        let mut broken = bytes.to_vec();
        broken[7] = 3;
        assert!(Message::parse(&broken).is_err());
    }

    #[test]
    fn parse_ignores_trailing_octets() {
        let msg = sample_response();
        let mut bytes = msg.compose().unwrap().to_vec();
        bytes.extend_from_slice(b"\0\0padding");
        assert_eq!(Message::parse(&bytes).unwrap(), msg);
    }

    #[test]
    fn short_message() {
        assert!(Message::parse(&[0u8; 11]).is_err());
        assert!(Message::parse(&[0u8; 12]).is_ok());
    }

    #[test]
    fn is_answer() {
        let mut query = Message::query(Question::new_in(
            name("foo.example.com"),
            Rtype::A,
        ));
        query.header_mut().set_id(0x2912);
        let response = sample_response();
        assert!(response.is_answer(&query));

        // Wrong ID.
        query.header_mut().set_id(0x2913);
        assert!(!response.is_answer(&query));

        // A query never answers anything.
        query.header_mut().set_id(0x2912);
        assert!(!query.is_answer(&query.clone()));
    }

    #[test]
    fn rcode_surfaces() {
        let mut msg = Message::new();
        msg.header_mut().set_qr(true);
        msg.header_mut().set_rcode(Rcode::NXDomain);
        let bytes = msg.compose().unwrap();
        let parsed = Message::parse(&bytes).unwrap();
        assert_eq!(parsed.header().rcode(), Rcode::NXDomain);
    }
}

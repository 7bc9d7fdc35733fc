//! The error type for queries.

use crate::base::name::NameError;
use crate::base::wire::ParseError;
use crate::resolv::conf::ConfError;
use std::sync::Arc;
use std::{error, fmt, io};

//------------ QueryError ----------------------------------------------------

/// An error happened while performing a DNS query.
///
/// The same error value may be handed to several pending queries at once,
/// which is why the payload-carrying variants keep their causes behind an
/// [`Arc`].
#[derive(Clone, Debug)]
pub enum QueryError {
    /// A packet could not be decoded or a message not be encoded.
    MalformedPacket(ParseError),

    /// No response arrived within the query's time budget.
    Timeout,

    /// The query was cancelled or the client torn down.
    Cancelled,

    /// No usable name server address was available.
    NoNameservers,

    /// The resolver configuration could not be read.
    ConfigParse(Arc<ConfError>),

    /// An IP address passed to a lookup helper did not parse.
    InvalidIp,

    /// A host name passed to a lookup helper was not a valid domain name.
    InvalidName(NameError),

    /// The connection pool has been disconnected.
    PoolClosed,

    /// The client's channel was gone before the query could be sent.
    ConnectionClosed,

    /// The underlying transport failed.
    Io(Arc<io::Error>),
}

//--- From

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        QueryError::MalformedPacket(err)
    }
}

impl From<NameError> for QueryError {
    fn from(err: NameError) -> Self {
        QueryError::InvalidName(err)
    }
}

impl From<ConfError> for QueryError {
    fn from(err: ConfError) -> Self {
        QueryError::ConfigParse(Arc::new(err))
    }
}

impl From<io::Error> for QueryError {
    fn from(err: io::Error) -> Self {
        QueryError::Io(Arc::new(err))
    }
}

//--- Display and Error

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QueryError::MalformedPacket(ref err) => {
                write!(f, "malformed packet: {}", err)
            }
            QueryError::Timeout => f.write_str("query timed out"),
            QueryError::Cancelled => f.write_str("query cancelled"),
            QueryError::NoNameservers => {
                f.write_str("no name servers configured")
            }
            QueryError::ConfigParse(ref err) => err.fmt(f),
            QueryError::InvalidIp => f.write_str("invalid IP address"),
            QueryError::InvalidName(ref err) => {
                write!(f, "invalid domain name: {}", err)
            }
            QueryError::PoolClosed => {
                f.write_str("connection pool disconnected")
            }
            QueryError::ConnectionClosed => {
                f.write_str("connection closed")
            }
            QueryError::Io(ref err) => write!(f, "transport error: {}", err),
        }
    }
}

impl error::Error for QueryError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            QueryError::MalformedPacket(ref err) => Some(err),
            QueryError::ConfigParse(ref err) => Some(err.as_ref()),
            QueryError::InvalidName(ref err) => Some(err),
            QueryError::Io(ref err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

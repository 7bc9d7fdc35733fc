//! Reading the system resolver configuration.
//!
//! The file commonly known as `/etc/resolv.conf` tells a stub resolver
//! which name servers to talk to. This module extracts exactly that: the
//! `nameserver` entries. All other directives are ignored; this crate
//! does not implement search lists or resolver options.

use std::io::{self, BufRead, Read};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::{fmt, fs};
use tracing::warn;

/// The port name servers listen on.
const DNS_PORT: u16 = 53;

/// Where the system keeps its resolver configuration.
const SYSTEM_CONF_PATH: &str = "/etc/resolv.conf";

//------------ ResolvConf ----------------------------------------------------

/// The name servers extracted from a resolver configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvConf {
    /// The addresses of the configured name servers, in file order.
    servers: Vec<SocketAddr>,
}

impl ResolvConf {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration from the system's `/etc/resolv.conf`.
    pub fn system() -> Result<Self, ConfError> {
        Self::parse_file(SYSTEM_CONF_PATH)
    }

    /// Reads the configuration from a file.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ConfError> {
        let mut file = fs::File::open(path)?;
        Self::parse(&mut file)
    }

    /// Reads the configuration from a reader.
    ///
    /// Only `nameserver` lines are considered. A `nameserver` line whose
    /// address does not parse is skipped with a warning rather than
    /// failing the whole file; callers that end up with an empty server
    /// list treat that as their own error.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, ConfError> {
        let mut res = Self::new();
        for line in io::BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty()
                || line.starts_with(';')
                || line.starts_with('#')
            {
                continue;
            }

            let mut words = line.split_whitespace();
            if words.next() != Some("nameserver") {
                continue;
            }
            let addr = match words.next() {
                Some(word) => word,
                None => {
                    warn!("nameserver line without an address, skipping");
                    continue;
                }
            };
            match addr.parse::<IpAddr>() {
                Ok(addr) => {
                    res.servers.push(SocketAddr::new(addr, DNS_PORT))
                }
                Err(_) => {
                    warn!(
                        address = addr,
                        "unparseable nameserver address, skipping"
                    );
                }
            }
        }
        Ok(res)
    }

    /// Returns the configured servers in file order.
    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    /// Returns whether no usable server was found.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Returns the server to use by preference.
    ///
    /// That is the first IPv4 server or, if there is none, the first
    /// server of any family.
    pub fn preferred(&self) -> Option<SocketAddr> {
        self.servers
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| self.servers.first())
            .copied()
    }
}

//============ Error Types ===================================================

//------------ ConfError -----------------------------------------------------

/// The resolver configuration could not be read.
#[derive(Debug)]
pub struct ConfError {
    /// The underlying I/O error.
    err: io::Error,
}

//--- From

impl From<io::Error> for ConfError {
    fn from(err: io::Error) -> Self {
        ConfError { err }
    }
}

//--- Display and Error

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot read resolver configuration: {}", self.err)
    }
}

impl std::error::Error for ConfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

//============ Testing =======================================================

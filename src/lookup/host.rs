//! Looking up host addresses.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::RecordData;
use crate::net::client::{Client, QueryError};
use std::net::SocketAddr;
use std::str::FromStr;

/// # Host Lookups
///
impl Client {
    /// Looks up the IPv4 addresses of a host.
    ///
    /// Sends an A query for `host` and returns one socket address per A
    /// record in the answer, each using the given `port`.
    pub async fn lookup_a(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Vec<SocketAddr>, QueryError> {
        let name = Name::from_str(host)?;
        let answer = self.query(name, Rtype::A).await?;
        Ok(answer
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RecordData::A(a) => {
                    Some(SocketAddr::from((a.addr(), port)))
                }
                _ => None,
            })
            .collect())
    }

    /// Looks up the IPv6 addresses of a host.
    ///
    /// Sends an AAAA query for `host` and returns one socket address per
    /// AAAA record in the answer, each using the given `port`.
    pub async fn lookup_aaaa(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Vec<SocketAddr>, QueryError> {
        let name = Name::from_str(host)?;
        let answer = self.query(name, Rtype::Aaaa).await?;
        Ok(answer
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RecordData::Aaaa(aaaa) => {
                    Some(SocketAddr::from((aaaa.addr(), port)))
                }
                _ => None,
            })
            .collect())
    }

    /// Looks up all addresses of a host.
    ///
    /// Queries A and AAAA concurrently and returns the combined socket
    /// addresses, IPv4 first. Both queries have to succeed.
    pub async fn lookup_host(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Vec<SocketAddr>, QueryError> {
        let (v4, v6) =
            tokio::join!(self.lookup_a(host, port), self.lookup_aaaa(host, port));
        let mut res = v4?;
        res.extend(v6?);
        Ok(res)
    }
}

//! Looking up records of specific types.

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::rdata::{Cname, Mx, Ns, RecordData, Soa, Srv, Txt};
use crate::net::client::{Client, QueryError};
use std::str::FromStr;

/// # Record Lookups
///
impl Client {
    /// Looks up the service locations for a name.
    ///
    /// The name follows the usual `_service._proto.host` convention of
    /// [RFC 2782], e.g. `_mongodb._tcp.db.example.com`.
    ///
    /// [RFC 2782]: https://tools.ietf.org/html/rfc2782
    pub async fn lookup_srv(
        &self,
        host: &str,
    ) -> Result<Vec<Srv>, QueryError> {
        self.lookup_data(host, Rtype::Srv, |data| match data {
            RecordData::Srv(srv) => Some(srv.clone()),
            _ => None,
        })
        .await
    }

    /// Looks up the mail exchangers for a name.
    pub async fn lookup_mx(
        &self,
        host: &str,
    ) -> Result<Vec<Mx>, QueryError> {
        self.lookup_data(host, Rtype::Mx, |data| match data {
            RecordData::Mx(mx) => Some(mx.clone()),
            _ => None,
        })
        .await
    }

    /// Looks up the text records for a name.
    pub async fn lookup_txt(
        &self,
        host: &str,
    ) -> Result<Vec<Txt>, QueryError> {
        self.lookup_data(host, Rtype::Txt, |data| match data {
            RecordData::Txt(txt) => Some(txt.clone()),
            _ => None,
        })
        .await
    }

    /// Looks up the canonical name records for a name.
    pub async fn lookup_cname(
        &self,
        host: &str,
    ) -> Result<Vec<Cname>, QueryError> {
        self.lookup_data(host, Rtype::Cname, |data| match data {
            RecordData::Cname(cname) => Some(cname.clone()),
            _ => None,
        })
        .await
    }

    /// Looks up the name server records for a name.
    pub async fn lookup_ns(
        &self,
        host: &str,
    ) -> Result<Vec<Ns>, QueryError> {
        self.lookup_data(host, Rtype::Ns, |data| match data {
            RecordData::Ns(ns) => Some(ns.clone()),
            _ => None,
        })
        .await
    }

    /// Looks up the start of authority records for a name.
    pub async fn lookup_soa(
        &self,
        host: &str,
    ) -> Result<Vec<Soa>, QueryError> {
        self.lookup_data(host, Rtype::Soa, |data| match data {
            RecordData::Soa(soa) => Some(soa.clone()),
            _ => None,
        })
        .await
    }

    /// Queries for `rtype` and maps the matching answers through `f`.
    async fn lookup_data<T>(
        &self,
        host: &str,
        rtype: Rtype,
        f: impl Fn(&RecordData) -> Option<T>,
    ) -> Result<Vec<T>, QueryError> {
        let name = Name::from_str(host)?;
        let answer = self.query(name, rtype).await?;
        Ok(answer
            .answers()
            .iter()
            .filter_map(|record| f(record.data()))
            .collect())
    }
}

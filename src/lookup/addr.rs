//! Looking up host names for addresses.

use crate::base::iana::Rtype;
use crate::base::name::{Label, Name};
use crate::base::rdata::RecordData;
use crate::net::client::{Client, QueryError};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// # Reverse Lookups
///
impl Client {
    /// Looks up the host names for an address given in text form.
    ///
    /// The address is parsed first; anything that is not an IPv4 or IPv6
    /// address fails with [`QueryError::InvalidIp`] without a query ever
    /// being sent.
    pub async fn inverse_lookup(
        &self,
        addr: &str,
    ) -> Result<Vec<Name>, QueryError> {
        match addr.trim().parse::<IpAddr>() {
            Ok(IpAddr::V4(addr)) => self.inverse_lookup_v4(addr).await,
            Ok(IpAddr::V6(addr)) => self.inverse_lookup_v6(addr).await,
            Err(_) => Err(QueryError::InvalidIp),
        }
    }

    /// Looks up the host names for an IPv4 address.
    ///
    /// Issues a PTR query for the address's name under `in-addr.arpa.`
    /// and returns the names of all PTR records in the answer.
    pub async fn inverse_lookup_v4(
        &self,
        addr: Ipv4Addr,
    ) -> Result<Vec<Name>, QueryError> {
        self.ptr_query(name_from_v4(addr)).await
    }

    /// Looks up the host names for an IPv6 address.
    ///
    /// Issues a PTR query for the address's name under `ip6.arpa.` and
    /// returns the names of all PTR records in the answer.
    pub async fn inverse_lookup_v6(
        &self,
        addr: Ipv6Addr,
    ) -> Result<Vec<Name>, QueryError> {
        self.ptr_query(name_from_v6(addr)).await
    }

    /// Sends a PTR query and collects the pointed-to names.
    async fn ptr_query(
        &self,
        name: Name,
    ) -> Result<Vec<Name>, QueryError> {
        let answer = self.query(name, Rtype::Ptr).await?;
        Ok(answer
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RecordData::Ptr(ptr) => Some(ptr.ptrdname().clone()),
                _ => None,
            })
            .collect())
    }
}

//------------ Helper Functions ----------------------------------------------

/// Translates an IPv4 address into its reverse lookup name.
///
/// The octets appear in reverse order under `in-addr.arpa.`, so
/// `8.8.4.4` becomes `4.4.8.8.in-addr.arpa.`
fn name_from_v4(addr: Ipv4Addr) -> Name {
    let octets = addr.octets();
    Name::from_str(&format!(
        "{}.{}.{}.{}.in-addr.arpa",
        octets[3], octets[2], octets[1], octets[0]
    ))
    .expect("a reverse lookup name is always valid")
}

/// Translates an IPv6 address into its reverse lookup name.
///
/// Per [RFC 3596], the name is the sequence of the address's nibbles in
/// reverse order, each as one hex digit label, under `ip6.arpa.` Note
/// that the unit is the nibble, not the octet: within each octet the low
/// nibble comes first.
///
/// [RFC 3596]: https://tools.ietf.org/html/rfc3596
fn name_from_v6(addr: Ipv6Addr) -> Name {
    let mut res = Name::root();
    for &octet in addr.octets().iter().rev() {
        for nibble in [octet & 0x0F, octet >> 4] {
            res.push(Label::new(vec![hex_digit(nibble)]).expect(
                "a single hex digit is always a valid label",
            ))
            .expect("a reverse lookup name is always short enough");
        }
    }
    for tail in ["ip6", "arpa"] {
        res.push(
            Label::new(tail.as_bytes().to_vec())
                .expect("a static label is always valid"),
        )
        .expect("a reverse lookup name is always short enough");
    }
    res
}

/// Returns the lowercase hex digit for a nibble.
fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        _ => b'a' + nibble - 10,
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn v4_reverse_name() {
        assert_eq!(
            name_from_v4(Ipv4Addr::new(8, 8, 4, 4)).to_string(),
            "4.4.8.8.in-addr.arpa"
        );
        assert_eq!(
            name_from_v4(Ipv4Addr::new(192, 0, 2, 5)).to_string(),
            "5.2.0.192.in-addr.arpa"
        );
    }

    #[test]
    fn v6_reverse_name() {
        // The example from RFC 3596, section 2.5.
        let addr: Ipv6Addr = "4321:0:1:2:3:4:567:89ab".parse().unwrap();
        assert_eq!(
            name_from_v6(addr).to_string(),
            "b.a.9.8.7.6.5.0.4.0.0.0.3.0.0.0.2.0.0.0.1.0.0.0.0.0.0.0.\
             1.2.3.4.ip6.arpa"
        );
    }
}

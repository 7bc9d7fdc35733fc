//! Multicast DNS.
//!
//! Multicast DNS ([RFC 6762]) runs plain DNS messages over UDP to the
//! link-local group `224.0.0.251`, port 5353. A multicast client differs
//! from a unicast one in three ways: it sends to the group instead of a
//! server, it never asks for recursion, and it sees queries from other
//! hosts on the link. Those unsolicited queries are handed to a handler
//! the caller supplies at connect time; whatever message the handler
//! returns is sent back onto the group.
//!
//! [RFC 6762]: https://tools.ietf.org/html/rfc6762

use super::error::QueryError;
use super::transport::Command;
use super::{Client, Transactions};
use crate::base::Message;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// The IPv4 multicast DNS group.
pub const MDNS_GROUP_V4: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// The multicast DNS port.
pub const MDNS_PORT: u16 = 5353;

/// Size of the buffer datagrams are received into.
///
/// Multicast DNS allows larger messages than traditional DNS over UDP,
/// up to the 9000 octets of [RFC 6762] section 17.
const RECV_BUF_LEN: usize = 9000;

/// A handler for queries other hosts send to the group.
///
/// Returning a message answers the query onto the group; returning
/// `None` stays silent.
pub type QueryHandler =
    Box<dyn FnMut(&Message) -> Option<Message> + Send + 'static>;

/// # Multicast
///
impl Client {
    /// Creates a multicast DNS client.
    ///
    /// The client joins the group `224.0.0.251` on port 5353 on all
    /// interfaces. Queries sent through the client go to the group with
    /// the RD flag off. Queries from other hosts on the link are passed
    /// to `handler`, which may return an answer to publish.
    pub async fn connect_multicast<F>(
        handler: F,
    ) -> Result<Self, QueryError>
    where
        F: FnMut(&Message) -> Option<Message> + Send + 'static,
    {
        let sock =
            UdpSocket::bind((Ipv4Addr::UNSPECIFIED, MDNS_PORT)).await?;
        sock.join_multicast_v4(MDNS_GROUP_V4, Ipv4Addr::UNSPECIFIED)?;
        let (client, commands, transactions, closed) = Self::new(true);
        tokio::spawn(run_multicast(
            sock,
            commands,
            transactions,
            closed,
            Box::new(handler),
        ));
        Ok(client)
    }
}

/// Drives a multicast UDP channel.
///
/// Like the unicast UDP driver, except that traffic flows to and from
/// the group address and inbound queries feed the handler instead of
/// being dropped.
async fn run_multicast(
    sock: UdpSocket,
    mut commands: mpsc::Receiver<Command>,
    transactions: Arc<Transactions>,
    closed: watch::Sender<bool>,
    mut handler: QueryHandler,
) {
    let group = SocketAddr::from((MDNS_GROUP_V4, MDNS_PORT));
    let mut buf = vec![0u8; RECV_BUF_LEN];
    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(Command::Send(octets)) => {
                    if let Err(err) = sock.send_to(&octets, group).await {
                        debug!(%err, "multicast send failed");
                        transactions.drain(QueryError::Io(Arc::new(err)));
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    transactions.drain(QueryError::Cancelled);
                    break;
                }
            },
            res = sock.recv_from(&mut buf) => match res {
                Ok((len, from)) => {
                    dispatch_group_datagram(
                        &buf[..len], from, &transactions, &mut handler,
                        &sock, group,
                    ).await
                }
                Err(err) => {
                    debug!(%err, "multicast receive failed");
                    transactions.drain(QueryError::Io(Arc::new(err)));
                    break;
                }
            },
        }
    }
    let _ = closed.send(true);
}

/// Decodes and routes one datagram from the group.
async fn dispatch_group_datagram(
    octets: &[u8],
    from: SocketAddr,
    transactions: &Transactions,
    handler: &mut QueryHandler,
    sock: &UdpSocket,
    group: SocketAddr,
) {
    let msg = match Message::parse(octets) {
        Ok(msg) => msg,
        Err(err) => {
            warn!(%err, %from, "undecodable multicast datagram");
            transactions.drain(QueryError::MalformedPacket(err));
            return;
        }
    };
    if msg.header().qr() {
        transactions.resolve(msg);
        return;
    }
    if let Some(reply) = handler(&msg) {
        match reply.compose() {
            Ok(octets) => {
                if let Err(err) = sock.send_to(&octets, group).await {
                    debug!(%err, "multicast reply send failed");
                }
            }
            Err(err) => warn!(%err, "uncomposable multicast reply"),
        }
    }
}

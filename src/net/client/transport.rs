//! The transport driver tasks.
//!
//! Each client spawns exactly one driver task owning its socket. The
//! driver receives outbound messages through a command channel, writes
//! them in the transport's framing, and decodes whatever arrives on the
//! socket. Decoded responses are handed to the client's transaction
//! table.
//!
//! Error handling follows a simple rule: an undecodable inbound message
//! fails everything currently in flight but leaves the channel running,
//! while a transport error additionally terminates the driver. Closing
//! the command channel, either explicitly or by dropping the last client
//! handle, drains the in-flight table and terminates the driver, too.

use super::error::QueryError;
use super::Transactions;
use crate::base::wire::ParseError;
use crate::base::Message;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

/// How many times to retry binding to a fresh random port.
const RETRY_RANDOM_PORT: usize = 10;

/// Size of the buffer datagrams are received into.
const RECV_BUF_LEN: usize = 2000;

/// Capacity of the channel passing decoded messages out of the stream
/// reader.
const REPLY_QUEUE_LEN: usize = 8;

//------------ Command -------------------------------------------------------

/// A command from a client handle to its driver task.
#[derive(Debug)]
pub(super) enum Command {
    /// Transmit the given encoded message.
    Send(Bytes),

    /// Drain all in-flight queries and shut the channel down.
    Close,
}

//------------ UDP -----------------------------------------------------------

/// Creates a UDP socket connected to the given server.
///
/// The socket is bound to an unspecified address and a random ephemeral
/// port, retrying a few times should the chosen port be in use.
pub(super) async fn connect_udp(
    addr: SocketAddr,
) -> Result<UdpSocket, io::Error> {
    let mut retries = 0;
    let sock = loop {
        let local: SocketAddr = if addr.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        match UdpSocket::bind(&local).await {
            Ok(sock) => break sock,
            Err(err) => {
                if retries == RETRY_RANDOM_PORT {
                    return Err(err);
                }
                retries += 1;
            }
        }
    };
    sock.connect(addr).await?;
    Ok(sock)
}

/// Drives a unicast UDP channel.
pub(super) async fn run_udp(
    sock: UdpSocket,
    mut commands: mpsc::Receiver<Command>,
    transactions: Arc<Transactions>,
    closed: watch::Sender<bool>,
) {
    let mut buf = vec![0u8; RECV_BUF_LEN];
    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(Command::Send(octets)) => {
                    if let Err(err) = sock.send(&octets).await {
                        debug!(%err, "datagram send failed");
                        transactions.drain(QueryError::Io(Arc::new(err)));
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    transactions.drain(QueryError::Cancelled);
                    break;
                }
            },
            res = sock.recv(&mut buf) => match res {
                Ok(len) => dispatch_datagram(&buf[..len], &transactions),
                Err(err) => {
                    debug!(%err, "datagram receive failed");
                    transactions.drain(QueryError::Io(Arc::new(err)));
                    break;
                }
            },
        }
    }
    let _ = closed.send(true);
}

/// Decodes one inbound datagram and routes it.
///
/// Responses go to the transaction table. Queries arriving on a unicast
/// socket are somebody else's problem and dropped. An undecodable
/// datagram fails everything in flight but keeps the channel alive.
fn dispatch_datagram(octets: &[u8], transactions: &Transactions) {
    match Message::parse(octets) {
        Ok(msg) => {
            if msg.header().qr() {
                transactions.resolve(msg);
            } else {
                trace!("query received on unicast channel, dropping");
            }
        }
        Err(err) => {
            warn!(%err, "undecodable datagram");
            transactions.drain(QueryError::MalformedPacket(err));
        }
    }
}

//------------ TCP -----------------------------------------------------------

/// Drives a TCP channel.
///
/// The stream is split; a reader future accumulates length-prefixed
/// frames while the main loop serves the command channel and routes
/// decoded messages. The reader only returns on a transport-level
/// failure, which takes the whole channel down.
pub(super) async fn run_tcp(
    stream: TcpStream,
    mut commands: mpsc::Receiver<Command>,
    transactions: Arc<Transactions>,
    closed: watch::Sender<bool>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let (reply_tx, mut replies) = mpsc::channel(REPLY_QUEUE_LEN);
    let reader = read_stream(read_half, reply_tx);
    tokio::pin!(reader);

    loop {
        tokio::select! {
            biased;
            err = &mut reader => {
                debug!(%err, "stream reader terminated");
                transactions.drain(err);
                break;
            }
            reply = replies.recv() => match reply {
                Some(Ok(msg)) => {
                    if msg.header().qr() {
                        transactions.resolve(msg);
                    } else {
                        trace!("query received on stream channel, dropping");
                    }
                }
                Some(Err(err)) => {
                    warn!(%err, "undecodable message on stream");
                    transactions.drain(QueryError::MalformedPacket(err));
                }
                None => break,
            },
            cmd = commands.recv() => match cmd {
                Some(Command::Send(octets)) => {
                    if let Err(err) =
                        write_frame(&mut write_half, &octets).await
                    {
                        debug!(%err, "stream write failed");
                        transactions.drain(err);
                        break;
                    }
                }
                Some(Command::Close) | None => {
                    transactions.drain(QueryError::Cancelled);
                    break;
                }
            },
        }
    }

    let _ = write_half.shutdown().await;
    let _ = closed.send(true);
}

/// Writes one message in stream framing: a 16 bit length, then the body.
async fn write_frame(
    write_half: &mut (impl AsyncWriteExt + Unpin),
    octets: &[u8],
) -> Result<(), QueryError> {
    let len = u16::try_from(octets.len()).map_err(|_| {
        QueryError::Io(Arc::new(io::Error::new(
            io::ErrorKind::InvalidInput,
            "message too long for stream transport",
        )))
    })?;
    write_half.write_all(&len.to_be_bytes()).await?;
    write_half.write_all(octets).await?;
    Ok(())
}

/// Reads length-prefixed messages off a stream until the transport fails.
///
/// Each frame is decoded right here; decode failures are passed along as
/// items so the driver can fail the in-flight queries without giving up
/// on the intact framing. Only I/O errors end the loop.
async fn read_stream(
    mut sock: OwnedReadHalf,
    replies: mpsc::Sender<Result<Message, ParseError>>,
) -> QueryError {
    loop {
        let len = match sock.read_u16().await {
            Ok(len) => usize::from(len),
            Err(err) => return QueryError::Io(Arc::new(err)),
        };
        let mut buf = vec![0u8; len];
        if let Err(err) = sock.read_exact(&mut buf).await {
            return QueryError::Io(Arc::new(err));
        }
        if replies.send(Message::parse(&buf)).await.is_err() {
            // The driver is gone; no point in reading on.
            return QueryError::Cancelled;
        }
    }
}

//! Client behavior against local mock servers.

use querist::base::rdata::{RecordData, A};
use querist::base::{Class, Message, Name, Record, Rtype};
use querist::{
    Client, ConnectionRequirements, Pool, Protocol, QueryError,
    QueryOptions, Sourcing,
};
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

/// Builds a response answering `query` with a single A record.
fn answer_a(query: &Message, addr: Ipv4Addr) -> Message {
    let mut reply = Message::new();
    reply.header_mut().set_id(query.header().id());
    reply.header_mut().set_qr(true);
    reply.header_mut().set_rd(query.header().rd());
    reply.header_mut().set_ra(true);
    let question = query.first_question().unwrap().clone();
    let owner = question.qname().clone();
    reply.push_question(question);
    reply.push_answer(Record::new(
        owner,
        Class::In,
        300,
        RecordData::A(A::new(addr)),
    ));
    reply
}

/// Spawns a UDP server answering each query through `handle`.
///
/// Returning `None` from the handler leaves the query unanswered.
async fn spawn_udp_server<F>(mut handle: F) -> SocketAddr
where
    F: FnMut(&Message) -> Option<Message> + Send + 'static,
{
    let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = sock.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let (len, from) = match sock.recv_from(&mut buf).await {
                Ok(res) => res,
                Err(_) => break,
            };
            let query = match Message::parse(&buf[..len]) {
                Ok(query) => query,
                Err(_) => continue,
            };
            if let Some(reply) = handle(&query) {
                let octets = reply.compose().unwrap();
                let _ = sock.send_to(&octets, from).await;
            }
        }
    });
    addr
}

/// Spawns a TCP server answering each query with an A record.
///
/// `preamble` is written once, before the first real response, to let
/// tests inject broken frames.
async fn spawn_tcp_server(
    addr4: Ipv4Addr,
    preamble: &'static [u8],
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(res) => res,
                Err(_) => break,
            };
            tokio::spawn(async move {
                let mut sent_preamble = false;
                loop {
                    let len = match stream.read_u16().await {
                        Ok(len) => usize::from(len),
                        Err(_) => break,
                    };
                    let mut buf = vec![0u8; len];
                    if stream.read_exact(&mut buf).await.is_err() {
                        break;
                    }
                    let query = match Message::parse(&buf) {
                        Ok(query) => query,
                        Err(_) => continue,
                    };
                    if !sent_preamble && !preamble.is_empty() {
                        sent_preamble = true;
                        if stream.write_all(preamble).await.is_err() {
                            break;
                        }
                        continue;
                    }
                    let octets =
                        answer_a(&query, addr4).compose().unwrap();
                    let mut frame =
                        Vec::with_capacity(2 + octets.len());
                    frame.extend_from_slice(
                        &(octets.len() as u16).to_be_bytes(),
                    );
                    frame.extend_from_slice(&octets);
                    if stream.write_all(&frame).await.is_err() {
                        break;
                    }
                }
            });
        }
    });
    addr
}

/// A TCP server that accepts connections and keeps them open without
/// ever answering. Used by the pool tests.
async fn spawn_tcp_sink() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut streams = Vec::new();
        loop {
            match listener.accept().await {
                Ok((stream, _)) => streams.push(stream),
                Err(_) => break,
            }
        }
    });
    addr
}

#[tokio::test]
async fn udp_lookup_resolves() {
    let server = spawn_udp_server(|query| {
        Some(answer_a(query, Ipv4Addr::new(192, 0, 2, 1)))
    })
    .await;
    let client = Client::connect_udp(server).await.unwrap();
    let addrs = client.lookup_a("example.com", 8080).await.unwrap();
    assert_eq!(addrs, ["192.0.2.1:8080".parse().unwrap()]);
}

#[tokio::test]
async fn tcp_lookup_resolves() {
    let server =
        spawn_tcp_server(Ipv4Addr::new(192, 0, 2, 2), b"").await;
    let client = Client::connect_tcp(server).await.unwrap();
    let addrs = client.lookup_a("example.com", 53).await.unwrap();
    assert_eq!(addrs, ["192.0.2.2:53".parse().unwrap()]);
}

#[tokio::test]
async fn query_times_out() {
    let server = spawn_udp_server(|_| None).await;
    let client = Client::connect_udp(server).await.unwrap();
    let options = QueryOptions {
        timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let res = client
        .query_with(name("example.com"), Rtype::A, options)
        .await;
    assert!(matches!(res, Err(QueryError::Timeout)));
}

#[tokio::test]
async fn response_with_wrong_id_is_dropped() {
    let server = spawn_udp_server(|query| {
        let mut reply = answer_a(query, Ipv4Addr::new(192, 0, 2, 3));
        reply.header_mut().set_id(query.header().id().wrapping_add(1));
        Some(reply)
    })
    .await;
    let client = Client::connect_udp(server).await.unwrap();
    let options = QueryOptions {
        timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let res = client
        .query_with(name("example.com"), Rtype::A, options)
        .await;
    assert!(matches!(res, Err(QueryError::Timeout)));
}

#[tokio::test]
async fn cancel_queries_resolves_inflight() {
    let server = spawn_udp_server(|_| None).await;
    let client = Client::connect_udp(server).await.unwrap();
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.query(name("example.com"), Rtype::A).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.cancel_queries();
    let res = pending.await.unwrap();
    assert!(matches!(res, Err(QueryError::Cancelled)));

    // The client stays usable after cancellation.
    let options = QueryOptions {
        timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let res = client
        .query_with(name("example.com"), Rtype::A, options)
        .await;
    assert!(matches!(res, Err(QueryError::Timeout)));
}

#[tokio::test]
async fn close_cancels_and_rejects() {
    let server = spawn_udp_server(|_| None).await;
    let client = Client::connect_udp(server).await.unwrap();
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.query(name("example.com"), Rtype::A).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.close().await;
    let res = pending.await.unwrap();
    assert!(matches!(res, Err(QueryError::Cancelled)));

    client.closed().await;
    let res = client.query(name("example.com"), Rtype::A).await;
    assert!(matches!(res, Err(QueryError::ConnectionClosed)));
}

#[tokio::test]
async fn concurrent_queries_use_distinct_ids() {
    let seen = Arc::new(Mutex::new(HashSet::new()));
    let server = spawn_udp_server({
        let seen = seen.clone();
        move |query| {
            seen.lock().unwrap().insert(query.header().id());
            Some(answer_a(query, Ipv4Addr::new(192, 0, 2, 4)))
        }
    })
    .await;
    let client = Client::connect_udp(server).await.unwrap();

    let queries: Vec<_> = (0..32)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client.query(name("example.com"), Rtype::A).await
            })
        })
        .collect();
    for query in queries {
        assert!(query.await.unwrap().is_ok());
    }
    assert_eq!(seen.lock().unwrap().len(), 32);
}

#[tokio::test]
async fn broken_frame_fails_queries_but_not_channel() {
    // The server answers the first query with a zero length frame. That
    // fails everything in flight as malformed, but the framing is still
    // intact and the next query succeeds.
    let server =
        spawn_tcp_server(Ipv4Addr::new(192, 0, 2, 5), b"\x00\x00").await;
    let client = Client::connect_tcp(server).await.unwrap();

    let res = client.query(name("example.com"), Rtype::A).await;
    assert!(matches!(res, Err(QueryError::MalformedPacket(_))));

    let addrs = client.lookup_a("example.com", 53).await.unwrap();
    assert_eq!(addrs, ["192.0.2.5:53".parse().unwrap()]);
}

#[tokio::test]
async fn pool_sourcing() {
    let udp_server = spawn_udp_server(|_| None).await;
    let tcp_server = spawn_tcp_sink().await;
    let pool = Pool::new();

    // Asking for an existing client twice creates a single entry.
    let req = ConnectionRequirements::new(
        udp_server.ip(),
        udp_server.port(),
        Protocol::Udp,
    );
    let first = pool.next(req).await.unwrap();
    let _second = pool.next(req).await.unwrap();
    assert_eq!(pool.len(), 1);

    // TCP to the same host is a separate entry.
    let tcp_req = ConnectionRequirements::new(
        tcp_server.ip(),
        tcp_server.port(),
        Protocol::Tcp,
    );
    pool.next(tcp_req).await.unwrap();
    assert_eq!(pool.len(), 2);

    // Unpooled clients leave no trace.
    pool.next(req.with_sourcing(Sourcing::Unpooled)).await.unwrap();
    assert_eq!(pool.len(), 2);

    // New always adds another entry.
    pool.next(req.with_sourcing(Sourcing::New)).await.unwrap();
    pool.next(req.with_sourcing(Sourcing::New)).await.unwrap();
    assert_eq!(pool.len(), 4);

    drop(first);
    pool.disconnect().await;
    assert_eq!(pool.len(), 0);
    let res = pool.next(req).await;
    assert!(matches!(res, Err(QueryError::PoolClosed)));
}

#[tokio::test]
async fn pool_drops_closed_clients() {
    let udp_server = spawn_udp_server(|_| None).await;
    let pool = Pool::new();
    let req = ConnectionRequirements::new(
        udp_server.ip(),
        udp_server.port(),
        Protocol::Udp,
    );
    let client = pool.next(req).await.unwrap();
    assert_eq!(pool.len(), 1);

    client.close().await;
    client.closed().await;
    // Give the close watcher a moment to prune the entry.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(pool.len(), 0);
}

#[tokio::test]
async fn connect_servers_prefers_v4() {
    let server = spawn_udp_server(|query| {
        Some(answer_a(query, Ipv4Addr::new(192, 0, 2, 6)))
    })
    .await;
    let servers = ["[2001:db8::53]:53".parse().unwrap(), server];
    let client = Client::connect_servers(&servers).await.unwrap();
    let addrs = client.lookup_a("example.com", 80).await.unwrap();
    assert_eq!(addrs, ["192.0.2.6:80".parse().unwrap()]);

    let res = Client::connect_servers(&[]).await;
    assert!(matches!(res, Err(QueryError::NoNameservers)));
}

//! A pool of DNS clients.
//!
//! The pool hands out clients keyed by server address and transport
//! protocol. Callers state through [`Sourcing`] whether they want to
//! share an existing channel, force a fresh pooled one, or get a channel
//! the pool will not keep. Pooled clients are removed again once their
//! channel closes, so a transport failure never leaves a dead entry
//! behind.

use super::error::QueryError;
use super::Client;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, trace};

/// How often to attempt connecting before giving up.
const CONNECT_ATTEMPTS: usize = 3;

//------------ Protocol ------------------------------------------------------

/// The transport protocol of a pooled channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Protocol {
    /// DNS over UDP datagrams.
    Udp,

    /// DNS over a TCP stream.
    Tcp,
}

//------------ Sourcing ------------------------------------------------------

/// Where a requested client should come from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sourcing {
    /// Reuse a pooled client for the address if there is one, create and
    /// pool one otherwise.
    Existing,

    /// Always create a new client and pool it.
    New,

    /// Create a new client the pool will not keep.
    Unpooled,
}

//------------ ConnectionRequirements ----------------------------------------

/// What a caller asks of [`Pool::next`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectionRequirements {
    /// The address of the server.
    pub host: IpAddr,

    /// The port of the server.
    pub port: u16,

    /// The transport protocol to use.
    pub protocol: Protocol,

    /// Where the client should come from.
    pub sourcing: Sourcing,
}

impl ConnectionRequirements {
    /// Creates requirements with [`Sourcing::Existing`].
    pub fn new(host: IpAddr, port: u16, protocol: Protocol) -> Self {
        ConnectionRequirements {
            host,
            port,
            protocol,
            sourcing: Sourcing::Existing,
        }
    }

    /// Replaces the sourcing policy.
    pub fn with_sourcing(mut self, sourcing: Sourcing) -> Self {
        self.sourcing = sourcing;
        self
    }

    /// Returns the server's socket address.
    fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

//------------ Pool ----------------------------------------------------------

/// A pool of DNS clients keyed by server address and protocol.
#[derive(Clone, Debug, Default)]
pub struct Pool {
    /// The shared pool state.
    state: Arc<Mutex<PoolState>>,
}

/// The mutable state of a pool.
#[derive(Debug, Default)]
struct PoolState {
    /// Whether the pool has been disconnected.
    closed: bool,

    /// The identifier for the next pooled entry.
    next_entry: u64,

    /// The pooled clients.
    entries: Vec<PooledClient>,
}

/// A client held by the pool.
#[derive(Debug)]
struct PooledClient {
    /// The identifier of this entry, used by its close watcher.
    entry: u64,

    /// The address of the server the client talks to.
    addr: SocketAddr,

    /// The transport protocol of the channel.
    protocol: Protocol,

    /// The client itself.
    client: Client,
}

impl Pool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a client satisfying the given requirements.
    ///
    /// Connecting is attempted up to three times; only the last error is
    /// propagated. After [`disconnect`][Self::disconnect] the method
    /// fails with [`QueryError::PoolClosed`].
    pub async fn next(
        &self,
        req: ConnectionRequirements,
    ) -> Result<Client, QueryError> {
        {
            let state = self.state.lock().expect("poisoned lock");
            if state.closed {
                return Err(QueryError::PoolClosed);
            }
            if req.sourcing == Sourcing::Existing {
                if let Some(pooled) = state.entries.iter().find(|entry| {
                    entry.addr == req.addr()
                        && entry.protocol == req.protocol
                }) {
                    trace!(addr = %pooled.addr, "reusing pooled client");
                    return Ok(pooled.client.clone());
                }
            }
        }

        let client = Self::connect(req.addr(), req.protocol).await?;
        if req.sourcing == Sourcing::Unpooled {
            return Ok(client);
        }
        self.store(req, client.clone()).await;
        Ok(client)
    }

    /// Connects a client, retrying failed attempts.
    async fn connect(
        addr: SocketAddr,
        protocol: Protocol,
    ) -> Result<Client, QueryError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let res = match protocol {
                Protocol::Udp => Client::connect_udp(addr).await,
                Protocol::Tcp => Client::connect_tcp(addr).await,
            };
            match res {
                Ok(client) => return Ok(client),
                Err(err) if attempt < CONNECT_ATTEMPTS => {
                    debug!(%addr, attempt, %err, "connect failed, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Stores a client in the pool and watches for its channel closing.
    ///
    /// If the pool got disconnected while the client was connecting, the
    /// client is closed again instead of stored.
    async fn store(&self, req: ConnectionRequirements, client: Client) {
        let entry = {
            let mut state = self.state.lock().expect("poisoned lock");
            if state.closed {
                None
            } else {
                let entry = state.next_entry;
                state.next_entry += 1;
                state.entries.push(PooledClient {
                    entry,
                    addr: req.addr(),
                    protocol: req.protocol,
                    client: client.clone(),
                });
                Some(entry)
            }
        };
        let entry = match entry {
            Some(entry) => entry,
            None => {
                // Disconnected while we were connecting.
                client.close().await;
                return;
            }
        };

        // The watcher holds only a weak reference so that an otherwise
        // dropped pool is not kept alive by its own clients.
        let weak = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            client.closed().await;
            remove_entry(&weak, entry);
        });
    }

    /// Returns the number of clients currently pooled.
    pub fn len(&self) -> usize {
        self.state.lock().expect("poisoned lock").entries.len()
    }

    /// Returns whether the pool currently holds no clients.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disconnects the pool.
    ///
    /// Every pooled client is closed, which cancels its in-flight
    /// queries. Afterwards [`next`][Self::next] fails with
    /// [`QueryError::PoolClosed`].
    pub async fn disconnect(&self) {
        let entries = {
            let mut state = self.state.lock().expect("poisoned lock");
            state.closed = true;
            std::mem::take(&mut state.entries)
        };
        for pooled in entries {
            pooled.client.close().await;
        }
    }
}

/// Removes a pooled entry on behalf of its close watcher.
fn remove_entry(state: &Weak<Mutex<PoolState>>, entry: u64) {
    if let Some(state) = state.upgrade() {
        let mut state = state.lock().expect("poisoned lock");
        if let Some(pos) =
            state.entries.iter().position(|e| e.entry == entry)
        {
            let pooled = state.entries.swap_remove(pos);
            trace!(addr = %pooled.addr, "dropping closed pooled client");
        }
    }
}

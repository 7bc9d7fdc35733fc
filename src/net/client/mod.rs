//! The DNS client.
//!
//! A [`Client`] owns exactly one channel to a server: a connected UDP
//! socket, a TCP stream, or a multicast UDP socket. The handle is cheap
//! to clone; all clones share the channel. The transport itself is driven
//! by a task spawned when the client is created, which terminates when
//! the last handle goes away, the client is explicitly closed, or the
//! transport fails.
//!
//! Queries are correlated with responses through the 16 bit message ID.
//! The client keeps a table of in-flight transactions shared between
//! callers, the driver task, and one timeout task per query. Every
//! transaction is resolved exactly once: by the matching response, by its
//! timeout, or by cancellation.

pub mod error;
pub mod multicast;
pub mod pool;
mod transport;

pub use self::error::QueryError;
pub use self::multicast::{MDNS_GROUP_V4, MDNS_PORT};
pub use self::pool::{ConnectionRequirements, Pool, Protocol, Sourcing};

use self::transport::Command;
use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::{Message, Question};
use crate::resolv::ResolvConf;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;
use tokio::time::sleep;
use tracing::trace;

/// The default amount of time to wait for a response.
const DEF_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the channel passing commands to the driver task.
const COMMAND_QUEUE_LEN: usize = 8;

//------------ QueryOptions --------------------------------------------------

/// Options modifying a single query.
#[derive(Clone, Copy, Debug)]
pub struct QueryOptions {
    /// The class to query in. Nearly always the Internet class.
    pub class: Class,

    /// How long to wait for the response.
    pub timeout: Duration,

    /// Whether to set the AD bit, asking for authenticated data.
    pub authentic_data: bool,

    /// Whether to set the CD bit, disabling upstream DNSSEC checking.
    pub checking_disabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            class: Class::In,
            timeout: DEF_QUERY_TIMEOUT,
            authentic_data: false,
            checking_disabled: false,
        }
    }
}

//------------ Client --------------------------------------------------------

/// A handle to one DNS transport channel.
#[derive(Clone, Debug)]
pub struct Client {
    /// The shared client state.
    inner: Arc<InnerClient>,
}

/// The state shared by all clones of a client handle.
#[derive(Debug)]
struct InnerClient {
    /// Sends commands to the driver task.
    commands: mpsc::Sender<Command>,

    /// The in-flight transaction table.
    transactions: Arc<Transactions>,

    /// Becomes `true` once the driver task has terminated.
    closed: watch::Receiver<bool>,

    /// Whether this client speaks multicast DNS.
    ///
    /// Multicast queries must not ask for recursion.
    multicast: bool,
}

/// # Connecting
///
impl Client {
    /// Creates a client using the system's resolver configuration.
    ///
    /// Reads `/etc/resolv.conf` and connects to the preferred name server
    /// over UDP. Fails with [`QueryError::NoNameservers`] if the file
    /// contains no usable server.
    pub async fn connect() -> Result<Self, QueryError> {
        let conf = ResolvConf::system()?;
        Self::connect_conf(&conf).await
    }

    /// Creates a client for the preferred server of a configuration.
    pub async fn connect_conf(conf: &ResolvConf) -> Result<Self, QueryError> {
        match conf.preferred() {
            Some(addr) => Self::connect_udp(addr).await,
            None => Err(QueryError::NoNameservers),
        }
    }

    /// Creates a client for the first usable of the given servers.
    ///
    /// The preference order is that of [`ResolvConf::preferred`]: the
    /// first IPv4 address wins, then the first address of any family.
    pub async fn connect_servers(
        servers: &[SocketAddr],
    ) -> Result<Self, QueryError> {
        let addr = servers
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| servers.first())
            .copied()
            .ok_or(QueryError::NoNameservers)?;
        Self::connect_udp(addr).await
    }

    /// Creates a client talking UDP to the given server.
    pub async fn connect_udp(addr: SocketAddr) -> Result<Self, QueryError> {
        let sock = transport::connect_udp(addr).await?;
        let (client, commands, transactions, closed) = Self::new(false);
        tokio::spawn(transport::run_udp(
            sock,
            commands,
            transactions,
            closed,
        ));
        Ok(client)
    }

    /// Creates a client talking TCP to the given server.
    pub async fn connect_tcp(addr: SocketAddr) -> Result<Self, QueryError> {
        let stream = tokio::net::TcpStream::connect(addr).await?;
        let (client, commands, transactions, closed) = Self::new(false);
        tokio::spawn(transport::run_tcp(
            stream,
            commands,
            transactions,
            closed,
        ));
        Ok(client)
    }

    /// Creates the handle and the channels the driver task needs.
    fn new(
        multicast: bool,
    ) -> (
        Self,
        mpsc::Receiver<Command>,
        Arc<Transactions>,
        watch::Sender<bool>,
    ) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_LEN);
        let (closed_tx, closed_rx) = watch::channel(false);
        let transactions = Arc::new(Transactions::new());
        let client = Client {
            inner: Arc::new(InnerClient {
                commands: commands_tx,
                transactions: transactions.clone(),
                closed: closed_rx,
                multicast,
            }),
        };
        (client, commands_rx, transactions, closed_tx)
    }
}

/// # Querying
///
impl Client {
    /// Sends a query and waits for the response.
    ///
    /// Equivalent to [`query_with`][Self::query_with] with default
    /// options: Internet class, recursion desired, a 30 second timeout.
    pub async fn query(
        &self,
        qname: Name,
        qtype: Rtype,
    ) -> Result<Message, QueryError> {
        self.query_with(qname, qtype, QueryOptions::default()).await
    }

    /// Sends a query with the given options and waits for the response.
    ///
    /// The message is built as a standard query. Recursion is requested
    /// unless the client is a multicast client. The returned future
    /// resolves with the server's response, with
    /// [`QueryError::Timeout`] once the time budget is spent, or with
    /// [`QueryError::Cancelled`] if the client goes away first.
    pub async fn query_with(
        &self,
        qname: Name,
        qtype: Rtype,
        options: QueryOptions,
    ) -> Result<Message, QueryError> {
        let mut msg =
            Message::query(Question::new(qname, qtype, options.class));
        let header = msg.header_mut();
        header.set_rd(!self.inner.multicast);
        header.set_ad(options.authentic_data);
        header.set_cd(options.checking_disabled);
        self.request(msg, options.timeout).await
    }

    /// Registers, transmits, and awaits a prebuilt query message.
    ///
    /// The message's ID is overwritten with a fresh one. The transaction
    /// is inserted into the in-flight table before any octet reaches the
    /// transport, so a response can never race its own registration.
    async fn request(
        &self,
        mut msg: Message,
        timeout: Duration,
    ) -> Result<Message, QueryError> {
        let transactions = &self.inner.transactions;
        let (tx, rx) = oneshot::channel();
        let id = transactions.register(tx);
        msg.header_mut().set_id(id);

        let octets = match msg.compose() {
            Ok(octets) => octets,
            Err(err) => {
                transactions.forget(id);
                return Err(err.into());
            }
        };

        let timer = tokio::spawn({
            let transactions = transactions.clone();
            async move {
                sleep(timeout).await;
                transactions.expire(id);
            }
        });
        transactions.arm_timer(id, timer.abort_handle());

        if self
            .inner
            .commands
            .send(Command::Send(octets))
            .await
            .is_err()
        {
            transactions.forget(id);
            return Err(QueryError::ConnectionClosed);
        }

        match rx.await {
            Ok(res) => res,
            Err(_) => Err(QueryError::Cancelled),
        }
    }

    /// Cancels all in-flight queries.
    ///
    /// Every pending query resolves with [`QueryError::Cancelled`]. The
    /// client stays usable for new queries.
    pub fn cancel_queries(&self) {
        self.inner.transactions.drain(QueryError::Cancelled);
    }

    /// Closes the client's channel.
    ///
    /// In-flight queries resolve with [`QueryError::Cancelled`]; queries
    /// sent afterwards fail with [`QueryError::ConnectionClosed`].
    pub async fn close(&self) {
        let _ = self.inner.commands.send(Command::Close).await;
    }

    /// Waits until the client's channel has closed.
    pub async fn closed(&self) {
        let mut closed = self.inner.closed.clone();
        while !*closed.borrow() {
            if closed.changed().await.is_err() {
                break;
            }
        }
    }
}

//------------ Transactions --------------------------------------------------

/// The table of in-flight queries of one client.
///
/// The table is the single synchronization point between caller tasks,
/// the driver task, and the per-query timeout tasks. Whoever removes an
/// entry first owns its resolution; everybody else finds the entry gone
/// and does nothing.
#[derive(Debug)]
pub(crate) struct Transactions {
    /// The in-flight queries keyed by message ID.
    pending: Mutex<HashMap<u16, SentQuery>>,

    /// The ID for the next query.
    ///
    /// Starts at a random value and wraps. With at most a handful of
    /// queries in flight in a space of 65 536, collisions are resolved by
    /// simply picking the next value.
    next_id: AtomicU16,
}

/// A query awaiting its response.
#[derive(Debug)]
struct SentQuery {
    /// Resolves the caller's future.
    sender: oneshot::Sender<Result<Message, QueryError>>,

    /// Cancels the query's timeout task.
    ///
    /// `None` for the short window between registration and the timer
    /// being armed.
    timer: Option<AbortHandle>,
}

impl SentQuery {
    /// Cancels the timeout task, if armed.
    fn abort_timer(&self) {
        if let Some(ref timer) = self.timer {
            timer.abort();
        }
    }
}

impl Transactions {
    /// Creates an empty table.
    fn new() -> Self {
        Transactions {
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU16::new(rand::random()),
        }
    }

    /// Inserts a new transaction and returns its ID.
    fn register(
        &self,
        sender: oneshot::Sender<Result<Message, QueryError>>,
    ) -> u16 {
        let mut pending = self.pending.lock().expect("poisoned lock");
        let id = loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if !pending.contains_key(&id) {
                break id;
            }
        };
        pending.insert(
            id,
            SentQuery {
                sender,
                timer: None,
            },
        );
        id
    }

    /// Attaches the timeout task's abort handle to a transaction.
    ///
    /// If the transaction is already gone, the timer is cancelled right
    /// away.
    fn arm_timer(&self, id: u16, timer: AbortHandle) {
        match self.pending.lock().expect("poisoned lock").get_mut(&id) {
            Some(query) => query.timer = Some(timer),
            None => timer.abort(),
        }
    }

    /// Looks up and removes a transaction.
    fn take(&self, id: u16) -> Option<SentQuery> {
        self.pending.lock().expect("poisoned lock").remove(&id)
    }

    /// Removes a transaction without resolving it.
    ///
    /// Used when registration has happened but the query can no longer
    /// be transmitted; the caller still holds the receiving end and
    /// reports the error itself.
    fn forget(&self, id: u16) {
        if let Some(query) = self.take(id) {
            query.abort_timer();
        }
    }

    /// Resolves the transaction matching a response, if any.
    ///
    /// Responses that match nothing are dropped; they are usually late
    /// arrivals for queries that have already timed out.
    pub(crate) fn resolve(&self, answer: Message) {
        let id = answer.header().id();
        match self.take(id) {
            Some(query) => {
                query.abort_timer();
                let _ = query.sender.send(Ok(answer));
            }
            None => {
                trace!(id, "response for unknown transaction, dropping");
            }
        }
    }

    /// Resolves a transaction with a timeout.
    fn expire(&self, id: u16) {
        if let Some(query) = self.take(id) {
            let _ = query.sender.send(Err(QueryError::Timeout));
        }
    }

    /// Removes every transaction, resolving each with `error`.
    pub(crate) fn drain(&self, error: QueryError) {
        let drained: Vec<SentQuery> = {
            let mut pending = self.pending.lock().expect("poisoned lock");
            pending.drain().map(|(_, query)| query).collect()
        };
        for query in drained {
            query.abort_timer();
            let _ = query.sender.send(Err(error.clone()));
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn response(id: u16) -> Message {
        let mut msg = Message::new();
        msg.header_mut().set_id(id);
        msg.header_mut().set_qr(true);
        msg
    }

    #[test]
    fn register_and_resolve() {
        let transactions = Transactions::new();
        let (tx, mut rx) = oneshot::channel();
        let id = transactions.register(tx);
        transactions.resolve(response(id));
        match rx.try_recv() {
            Ok(Ok(msg)) => assert_eq!(msg.header().id(), id),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_response_is_dropped() {
        let transactions = Transactions::new();
        let (tx, mut rx) = oneshot::channel();
        let id = transactions.register(tx);
        transactions.resolve(response(id.wrapping_add(1)));
        assert!(rx.try_recv().is_err());
        // The original transaction is still pending.
        transactions.resolve(response(id));
        assert!(matches!(rx.try_recv(), Ok(Ok(_))));
    }

    #[test]
    fn each_transaction_resolves_once() {
        let transactions = Transactions::new();
        let (tx, mut rx) = oneshot::channel();
        let id = transactions.register(tx);
        transactions.resolve(response(id));
        // A duplicate response finds the entry gone.
        transactions.resolve(response(id));
        assert!(matches!(rx.try_recv(), Ok(Ok(_))));
        // Same for a late timeout.
        transactions.expire(id);
    }

    #[test]
    fn expire_reports_timeout() {
        let transactions = Transactions::new();
        let (tx, mut rx) = oneshot::channel();
        let id = transactions.register(tx);
        transactions.expire(id);
        assert!(matches!(
            rx.try_recv(),
            Ok(Err(QueryError::Timeout))
        ));
    }

    #[test]
    fn drain_resolves_everything() {
        let transactions = Transactions::new();
        let mut receivers = Vec::new();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..16 {
            let (tx, rx) = oneshot::channel();
            ids.insert(transactions.register(tx));
            receivers.push(rx);
        }
        assert_eq!(ids.len(), 16);
        transactions.drain(QueryError::Cancelled);
        for mut rx in receivers {
            assert!(matches!(
                rx.try_recv(),
                Ok(Err(QueryError::Cancelled))
            ));
        }
    }
}

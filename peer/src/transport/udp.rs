use std::{
    collections::{HashMap, VecDeque},
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info, warn};

use lockstep_shared::{ConnectionId, MessageType, DEFAULT_PORT};

use super::{ChannelKind, ConnectError, SendError, Transport, TransportEvent, TransportEventKind};

const MAX_DATAGRAM_SIZE: usize = 65_507;
/// Past this many queued events, newer Input and AcknowledgeInput payloads
/// replace the queued ones of the same kind from the same connection
const QUEUE_SOFT_LIMIT: usize = 1024;
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// A transport over a single UDP socket. Every remote address is one
/// connection, created by the first datagram seen from it. Reliable sends
/// are not retried.
pub struct UdpTransport {
    socket: UdpSocket,
    shared: Arc<Mutex<UdpShared>>,
    shutdown: Arc<AtomicBool>,
    receive_thread: Option<JoinHandle<()>>,
}

impl UdpTransport {
    /// Binds every interface on `port` and starts receiving
    pub fn bind(port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        let receive_socket = socket.try_clone()?;
        receive_socket.set_read_timeout(Some(READ_TIMEOUT))?;

        let shared = Arc::new(Mutex::new(UdpShared::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_shared = shared.clone();
        let thread_shutdown = shutdown.clone();
        let receive_thread = thread::Builder::new()
            .name("lockstep-udp".to_string())
            .spawn(move || receive_loop(receive_socket, thread_shared, thread_shutdown))?;

        info!("udp transport listening on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            shared,
            shutdown,
            receive_thread: Some(receive_thread),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for UdpTransport {
    fn send(
        &mut self,
        connection_id: ConnectionId,
        _channel: ChannelKind,
        payload: &[u8],
    ) -> Result<(), SendError> {
        let address = lock(&self.shared)
            .addresses
            .get(&connection_id)
            .copied()
            .ok_or(SendError::UnknownConnection { connection_id })?;
        self.socket
            .send_to(payload, address)
            .map(|_| ())
            .map_err(|error| SendError::Failed {
                connection_id,
                length: payload.len(),
                reason: error.to_string(),
            })
    }

    fn connect(&mut self, hostname: &str) -> Result<ConnectionId, ConnectError> {
        let target = if hostname.contains(':') {
            hostname.to_string()
        } else {
            format!("{}:{}", hostname, DEFAULT_PORT)
        };
        let address = target
            .to_socket_addrs()
            .ok()
            .and_then(|mut addresses| addresses.next())
            .ok_or_else(|| ConnectError::UnresolvedHost {
                hostname: hostname.to_string(),
            })?;

        let connection_id = {
            let mut shared = lock(&self.shared);
            let (connection_id, is_new) = shared.connection_id(address);
            if is_new {
                shared.events.push_back(TransportEvent::connect(connection_id));
            }
            connection_id
        };

        // an empty datagram makes us known to the remote side
        self.socket
            .send_to(&[], address)
            .map_err(|error| ConnectError::Failed {
                hostname: hostname.to_string(),
                reason: error.to_string(),
            })?;
        Ok(connection_id)
    }

    fn receive(&mut self) -> Option<TransportEvent> {
        lock(&self.shared).events.pop_front()
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(receive_thread) = self.receive_thread.take() {
            if receive_thread.join().is_err() {
                warn!("udp receive thread panicked");
            }
        }
    }
}

struct UdpShared {
    events: VecDeque<TransportEvent>,
    connections: HashMap<SocketAddr, ConnectionId>,
    addresses: HashMap<ConnectionId, SocketAddr>,
    next_connection_id: ConnectionId,
}

impl UdpShared {
    fn new() -> Self {
        Self {
            events: VecDeque::new(),
            connections: HashMap::new(),
            addresses: HashMap::new(),
            next_connection_id: 0,
        }
    }

    /// The connection for `address`, and whether it was just created
    fn connection_id(&mut self, address: SocketAddr) -> (ConnectionId, bool) {
        if let Some(connection_id) = self.connections.get(&address) {
            return (*connection_id, false);
        }
        let connection_id = self.next_connection_id;
        self.next_connection_id += 1;
        self.connections.insert(address, connection_id);
        self.addresses.insert(connection_id, address);
        (connection_id, true)
    }

    fn push_data(&mut self, connection_id: ConnectionId, payload: Box<[u8]>) {
        if self.events.len() >= QUEUE_SOFT_LIMIT {
            if let Some(message_type) = superseded_type(&payload) {
                let before = self.events.len();
                self.events.retain(|event| match &event.kind {
                    TransportEventKind::Data { payload, .. } => {
                        event.connection_id != connection_id
                            || superseded_type(payload) != Some(message_type)
                    }
                    _ => true,
                });
                debug!(
                    "dropped {} stale {:?} payload(s) from connection {}",
                    before - self.events.len(),
                    message_type,
                    connection_id
                );
            }
        }
        self.events.push_back(TransportEvent::data(
            connection_id,
            ChannelKind::Unreliable,
            payload,
        ));
    }
}

/// Message types whose newest payload carries everything older ones did
fn superseded_type(payload: &[u8]) -> Option<MessageType> {
    match MessageType::from_byte(*payload.first()?) {
        Ok(message_type @ (MessageType::Input | MessageType::AcknowledgeInput)) => Some(message_type),
        _ => None,
    }
}

fn receive_loop(socket: UdpSocket, shared: Arc<Mutex<UdpShared>>, shutdown: Arc<AtomicBool>) {
    let mut buffer = vec![0; MAX_DATAGRAM_SIZE];
    while !shutdown.load(Ordering::Relaxed) {
        match socket.recv_from(&mut buffer) {
            Ok((length, address)) => {
                let mut shared = lock(&shared);
                let (connection_id, is_new) = shared.connection_id(address);
                if is_new {
                    info!("connection {} opened by {}", connection_id, address);
                    shared.events.push_back(TransportEvent::connect(connection_id));
                }
                if length > 0 {
                    shared.push_data(connection_id, buffer[..length].into());
                }
            }
            Err(error)
                if matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(error) => warn!("udp receive failed: {}", error),
        }
    }
}

fn lock(shared: &Mutex<UdpShared>) -> MutexGuard<'_, UdpShared> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

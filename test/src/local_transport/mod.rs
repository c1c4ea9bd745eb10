/// In-memory transport for integration testing.
/// Every endpoint registered on a hub gets an inbox; sends are delivered
/// straight into the target's inbox without any network I/O.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;

use lockstep_peer::{
    ChannelKind, ConnectError, SendError, Transport, TransportEvent,
};
use lockstep_shared::ConnectionId;

struct Endpoint {
    hostname: String,
    inbox: VecDeque<TransportEvent>,
    // endpoints this one has already seen a Connect from, or connected to
    known: HashSet<ConnectionId>,
    drop_unreliable: usize,
    fail_sends: usize,
}

#[derive(Default)]
struct HubInner {
    endpoints: Vec<Endpoint>,
    by_hostname: HashMap<String, ConnectionId>,
}

/// Routes payloads between every transport created from it. A connection id
/// is the id of the remote endpoint, so both sides of a link agree on
/// which endpoint is which.
#[derive(Clone, Default)]
pub struct LocalHub {
    inner: Arc<Mutex<HubInner>>,
}

impl LocalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new endpoint under `hostname`. Registering a hostname
    /// again creates a fresh endpoint, which is how tests model a peer
    /// reconnecting.
    pub fn transport(&self, hostname: &str) -> LocalTransport {
        let mut inner = self.lock();
        let id = inner.endpoints.len() as ConnectionId;
        inner.endpoints.push(Endpoint {
            hostname: hostname.to_string(),
            inbox: VecDeque::new(),
            known: HashSet::new(),
            drop_unreliable: 0,
            fail_sends: 0,
        });
        inner.by_hostname.insert(hostname.to_string(), id);
        LocalTransport {
            hub: self.clone(),
            id,
        }
    }

    /// Silently loses the next `count` unreliable sends from `hostname`
    pub fn drop_next_unreliable(&self, hostname: &str, count: usize) {
        if let Some(endpoint) = self.lock().endpoint_mut(hostname) {
            endpoint.drop_unreliable += count;
        }
    }

    /// Makes the next `count` sends from `hostname` return an error
    pub fn fail_next_send(&self, hostname: &str, count: usize) {
        if let Some(endpoint) = self.lock().endpoint_mut(hostname) {
            endpoint.fail_sends += count;
        }
    }

    /// Events waiting in the inbox of `hostname`
    pub fn pending(&self, hostname: &str) -> usize {
        let inner = self.lock();
        inner
            .by_hostname
            .get(hostname)
            .and_then(|id| inner.endpoints.get(*id as usize))
            .map_or(0, |endpoint| endpoint.inbox.len())
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HubInner {
    fn endpoint_mut(&mut self, hostname: &str) -> Option<&mut Endpoint> {
        let id = *self.by_hostname.get(hostname)?;
        self.endpoints.get_mut(id as usize)
    }
}

/// One endpoint of a LocalHub
pub struct LocalTransport {
    hub: LocalHub,
    id: ConnectionId,
}

impl LocalTransport {
    /// The connection id other endpoints know this one by
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Transport for LocalTransport {
    fn send(
        &mut self,
        connection_id: ConnectionId,
        channel: ChannelKind,
        payload: &[u8],
    ) -> Result<(), SendError> {
        let mut inner = self.hub.lock();
        if inner.endpoints.get(connection_id as usize).is_none() {
            return Err(SendError::UnknownConnection { connection_id });
        }

        let sender = &mut inner.endpoints[self.id as usize];
        if sender.fail_sends > 0 {
            sender.fail_sends -= 1;
            return Err(SendError::Failed {
                connection_id,
                length: payload.len(),
                reason: "simulated failure".to_string(),
            });
        }
        if channel == ChannelKind::Unreliable && sender.drop_unreliable > 0 {
            sender.drop_unreliable -= 1;
            trace!("{} lost {} byte(s) to {}", sender.hostname, payload.len(), connection_id);
            return Ok(());
        }

        let target = &mut inner.endpoints[connection_id as usize];
        if target.known.insert(self.id) {
            target.inbox.push_back(TransportEvent::connect(self.id));
        }
        target
            .inbox
            .push_back(TransportEvent::data(self.id, channel, payload.into()));
        Ok(())
    }

    fn connect(&mut self, hostname: &str) -> Result<ConnectionId, ConnectError> {
        let mut inner = self.hub.lock();
        let target = *inner
            .by_hostname
            .get(hostname)
            .ok_or_else(|| ConnectError::UnresolvedHost {
                hostname: hostname.to_string(),
            })?;

        let local = &mut inner.endpoints[self.id as usize];
        if local.known.insert(target) {
            local.inbox.push_back(TransportEvent::connect(target));
        }
        Ok(target)
    }

    fn receive(&mut self) -> Option<TransportEvent> {
        self.hub.lock().endpoints[self.id as usize].inbox.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use lockstep_peer::TransportEventKind;

    use super::*;

    #[test]
    fn first_send_announces_the_sender() {
        let hub = LocalHub::new();
        let mut a = hub.transport("a");
        let mut b = hub.transport("b");

        a.send(b.id(), ChannelKind::Reliable, &[7]).unwrap();
        a.send(b.id(), ChannelKind::Reliable, &[8]).unwrap();

        assert_eq!(b.receive(), Some(TransportEvent::connect(a.id())));
        assert_eq!(
            b.receive(),
            Some(TransportEvent::data(a.id(), ChannelKind::Reliable, vec![7].into()))
        );
        assert!(matches!(
            b.receive().map(|event| event.kind),
            Some(TransportEventKind::Data { .. })
        ));
        assert_eq!(b.receive(), None);
    }

    #[test]
    fn connect_raises_a_local_connect() {
        let hub = LocalHub::new();
        let mut a = hub.transport("a");
        let b = hub.transport("b");

        assert_eq!(a.connect("b"), Ok(b.id()));
        assert_eq!(a.receive(), Some(TransportEvent::connect(b.id())));
        assert_eq!(
            a.connect("nowhere"),
            Err(ConnectError::UnresolvedHost {
                hostname: "nowhere".to_string()
            })
        );
    }

    #[test]
    fn drops_only_unreliable_sends() {
        let hub = LocalHub::new();
        let mut a = hub.transport("a");
        let b = hub.transport("b");
        hub.drop_next_unreliable("a", 1);

        a.send(b.id(), ChannelKind::Unreliable, &[1]).unwrap();
        assert_eq!(hub.pending("b"), 0);
        a.send(b.id(), ChannelKind::Reliable, &[2]).unwrap();
        assert_eq!(hub.pending("b"), 2);
    }

    #[test]
    fn failed_sends_report_an_error() {
        let hub = LocalHub::new();
        let mut a = hub.transport("a");
        let b = hub.transport("b");
        hub.fail_next_send("a", 1);

        assert!(matches!(
            a.send(b.id(), ChannelKind::Unreliable, &[1]),
            Err(SendError::Failed { length: 1, .. })
        ));
        assert!(a.send(b.id(), ChannelKind::Unreliable, &[1]).is_ok());
        assert_eq!(
            a.send(99, ChannelKind::Unreliable, &[1]),
            Err(SendError::UnknownConnection { connection_id: 99 })
        );
    }
}

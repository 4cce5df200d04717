//! Connection hub: the single owner of every live client.
//!
//! The hub is an actor. One task owns the client map and processes
//! commands in arrival order; everything else talks to it through a
//! cloneable [`HubHandle`].
//!
//! ```text
//!   reader loops ─┐                         ┌─▶ client A queue ─▶ writer A
//!   router ───────┼─▶ HubCommand channel ─▶ Hub ─▶ client B queue ─▶ writer B
//!   CRUD layer ───┘    (unbounded, FIFO)    └─▶ client C queue ─▶ writer C
//! ```
//!
//! # Backpressure
//!
//! Each client has a bounded outbound queue. Broadcasts use `try_send`; a
//! full queue means the client cannot keep up, so the event is dropped for
//! it and the client is unregistered. The hub itself never waits on a
//! client.
//!
//! # Disconnects
//!
//! Unregistering drops the queue sender, which ends the client's writer.
//! Visit archival runs on a separate task so persistence latency never
//! stalls the command loop; when it finishes, the task broadcasts the new
//! visitor count to the admin room through the handle. The hub owns those
//! tasks and waits for every one of them before [`Hub::run`] returns.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};

use crate::domain::analytics::{ArchiveOutcome, VisitAggregator};
use crate::domain::foundation::ClientId;
use crate::domain::realtime::{Event, Room, RoomFilter};
use crate::ports::LiveUpdates;

/// What the hub keeps for each registered client.
#[derive(Debug)]
pub struct ClientEntry {
    pub room: Room,
    outbound: mpsc::Sender<Event>,
}

enum HubCommand {
    Register {
        id: ClientId,
        outbound: mpsc::Sender<Event>,
    },
    Unregister {
        id: ClientId,
    },
    Broadcast {
        event: Event,
        filter: RoomFilter,
    },
    Promote {
        id: ClientId,
    },
    ClientCount {
        reply: oneshot::Sender<usize>,
    },
    RoomOf {
        id: ClientId,
        reply: oneshot::Sender<Option<Room>>,
    },
}

/// Cloneable entry point to the hub.
///
/// Commands are fire-and-forget and processed in send order. Once the hub
/// has stopped, commands are silently discarded and queries return their
/// empty answer.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Add a client to the `Base` room.
    pub fn register(&self, id: ClientId, outbound: mpsc::Sender<Event>) {
        self.send(HubCommand::Register { id, outbound });
    }

    /// Remove a client. Unknown ids are ignored.
    pub fn unregister(&self, id: ClientId) {
        self.send(HubCommand::Unregister { id });
    }

    /// Enqueue an event on every client whose room matches.
    pub fn broadcast(&self, event: Event, filter: RoomFilter) {
        self.send(HubCommand::Broadcast { event, filter });
    }

    /// Move a client from `Base` to `Admin`.
    pub fn promote(&self, id: ClientId) {
        self.send(HubCommand::Promote { id });
    }

    /// Number of registered clients.
    pub async fn client_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::ClientCount { reply });
        rx.await.unwrap_or(0)
    }

    /// Current room of a client, `None` if it is not registered.
    pub async fn room_of(&self, id: ClientId) -> Option<Room> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::RoomOf { id, reply });
        rx.await.ok().flatten()
    }

    fn send(&self, command: HubCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("Hub stopped, command discarded");
        }
    }
}

impl LiveUpdates for HubHandle {
    fn publish(&self, event: Event) {
        match event.kind.relay_audience() {
            Some(filter) => self.broadcast(event, filter),
            None => tracing::warn!(event_type = %event.kind, "Refusing to publish non-relay event"),
        }
    }
}

/// The actor owning the client registry.
pub struct Hub {
    clients: HashMap<ClientId, ClientEntry>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
    handle: HubHandle,
    aggregator: Arc<VisitAggregator>,
    archivals: JoinSet<()>,
}

impl Hub {
    /// Create the hub and a handle to it. Nothing runs until [`Hub::run`].
    pub fn new(aggregator: Arc<VisitAggregator>) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = HubHandle { commands: tx };
        let hub = Self {
            clients: HashMap::new(),
            commands: rx,
            handle: handle.clone(),
            aggregator,
            archivals: JoinSet::new(),
        };
        (hub, handle)
    }

    /// Process commands until `shutdown` flips to `true`.
    ///
    /// Commands queued before the signal are still applied. On shutdown
    /// every client is unregistered, which closes all queues, and the
    /// resulting visit archivals are awaited.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Hub started");

        loop {
            tokio::select! {
                biased;
                Some(command) = self.commands.recv() => self.handle_command(command),
                Some(finished) = self.archivals.join_next() => log_archival(finished),
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let remaining: Vec<ClientId> = self.clients.keys().copied().collect();
        for id in remaining {
            self.remove_client(id);
        }
        if !self.archivals.is_empty() {
            tracing::info!(pending = self.archivals.len(), "Waiting for visit archival");
        }
        while let Some(finished) = self.archivals.join_next().await {
            log_archival(finished);
        }
        tracing::info!("Hub shut down");
    }

    fn handle_command(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { id, outbound } => {
                if self.clients.contains_key(&id) {
                    tracing::warn!(client_id = %id, "Duplicate registration ignored");
                    return;
                }
                self.clients.insert(
                    id,
                    ClientEntry {
                        room: Room::Base,
                        outbound,
                    },
                );
                tracing::debug!(client_id = %id, clients = self.clients.len(), "Client registered");
            }
            HubCommand::Unregister { id } => self.remove_client(id),
            HubCommand::Broadcast { event, filter } => self.broadcast(event, filter),
            HubCommand::Promote { id } => match self.clients.get_mut(&id) {
                Some(entry) => {
                    entry.room = Room::Admin;
                    tracing::info!(client_id = %id, "Client promoted to admin room");
                }
                None => tracing::debug!(client_id = %id, "Promote for unknown client ignored"),
            },
            HubCommand::ClientCount { reply } => {
                let _ = reply.send(self.clients.len());
            }
            HubCommand::RoomOf { id, reply } => {
                let _ = reply.send(self.clients.get(&id).map(|entry| entry.room));
            }
        }
    }

    fn broadcast(&mut self, event: Event, filter: RoomFilter) {
        let mut saturated = Vec::new();

        for (id, entry) in &self.clients {
            if !filter.matches(entry.room) {
                continue;
            }
            match entry.outbound.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(client_id = %id, event_type = %event.kind, "Outbound queue full, disconnecting client");
                    saturated.push(*id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => saturated.push(*id),
            }
        }

        for id in saturated {
            self.remove_client(id);
        }
    }

    fn remove_client(&mut self, id: ClientId) {
        // Dropping the entry drops the queue sender, which ends the writer.
        if self.clients.remove(&id).is_none() {
            return;
        }
        tracing::debug!(client_id = %id, clients = self.clients.len(), "Client unregistered");

        let aggregator = self.aggregator.clone();
        let handle = self.handle.clone();
        self.archivals.spawn(async move {
            if aggregator.archive_visit(&id).await == ArchiveOutcome::NotFound {
                return;
            }
            handle.broadcast(
                Event::visitor_count(aggregator.current_count()),
                RoomFilter::AdminOnly,
            );
        });
    }
}

fn log_archival(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        tracing::error!(error = %e, "Visit archival task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{Visit, VisitRecord};
    use crate::domain::foundation::DomainError;
    use crate::domain::realtime::EventType;
    use crate::ports::VisitArchive;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NullArchive;

    /// Archive that takes a while, like a real database write.
    #[derive(Default)]
    struct SlowArchive {
        archived: AtomicUsize,
    }

    #[async_trait]
    impl VisitArchive for SlowArchive {
        async fn archive(&self, _record: &VisitRecord) -> Result<(), DomainError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.archived.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl VisitArchive for NullArchive {
        async fn archive(&self, _record: &VisitRecord) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct Running {
        handle: HubHandle,
        aggregator: Arc<VisitAggregator>,
        shutdown: watch::Sender<bool>,
        task: tokio::task::JoinHandle<()>,
    }

    fn start_hub() -> Running {
        let aggregator = Arc::new(VisitAggregator::new(Arc::new(NullArchive)));
        let (hub, handle) = Hub::new(aggregator.clone());
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(hub.run(rx));
        Running {
            handle,
            aggregator,
            shutdown,
            task,
        }
    }

    fn connect(handle: &HubHandle, capacity: usize) -> (ClientId, mpsc::Receiver<Event>) {
        let id = ClientId::new();
        let (tx, rx) = mpsc::channel(capacity);
        handle.register(id, tx);
        (id, rx)
    }

    fn product_event() -> Event {
        Event::new(EventType::ProductCreated, serde_json::json!({ "id": "rye" }))
    }

    #[tokio::test]
    async fn register_and_unregister_track_count() {
        let hub = start_hub();
        let (a, _rx_a) = connect(&hub.handle, 8);
        let (_b, _rx_b) = connect(&hub.handle, 8);
        assert_eq!(hub.handle.client_count().await, 2);

        hub.handle.unregister(a);
        hub.handle.unregister(a);

        assert_eq!(hub.handle.client_count().await, 1);
    }

    #[tokio::test]
    async fn unregister_closes_the_queue() {
        let hub = start_hub();
        let (a, mut rx) = connect(&hub.handle, 8);

        hub.handle.unregister(a);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn clients_start_in_base_and_promote_once() {
        let hub = start_hub();
        let (a, _rx) = connect(&hub.handle, 8);
        assert_eq!(hub.handle.room_of(a).await, Some(Room::Base));

        hub.handle.promote(a);
        hub.handle.promote(a);

        assert_eq!(hub.handle.room_of(a).await, Some(Room::Admin));
        assert_eq!(hub.handle.room_of(ClientId::new()).await, None);
    }

    #[tokio::test]
    async fn broadcast_respects_room_filter() {
        let hub = start_hub();
        let (admin, mut admin_rx) = connect(&hub.handle, 8);
        let (_shopper, mut shopper_rx) = connect(&hub.handle, 8);
        hub.handle.promote(admin);

        hub.handle.broadcast(product_event(), RoomFilter::NonAdmin);
        hub.handle.broadcast(Event::visitor_count(1), RoomFilter::AdminOnly);
        hub.handle.client_count().await;

        assert_eq!(shopper_rx.try_recv().unwrap().kind, EventType::ProductCreated);
        assert!(shopper_rx.try_recv().is_err());
        assert_eq!(admin_rx.try_recv().unwrap().kind, EventType::VisitorCountUpdate);
        assert!(admin_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_queue_disconnects_only_the_slow_client() {
        let hub = start_hub();
        let (_slow, mut slow_rx) = connect(&hub.handle, 1);
        let (_fast, mut fast_rx) = connect(&hub.handle, 8);

        hub.handle.broadcast(product_event(), RoomFilter::All);
        hub.handle.broadcast(product_event(), RoomFilter::All);

        assert_eq!(hub.handle.client_count().await, 1);
        assert!(fast_rx.recv().await.is_some());
        assert!(fast_rx.recv().await.is_some());
        assert!(slow_rx.recv().await.is_some());
        assert!(slow_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn publish_routes_by_event_type() {
        let hub = start_hub();
        let (admin, mut admin_rx) = connect(&hub.handle, 8);
        let (_shopper, mut shopper_rx) = connect(&hub.handle, 8);
        hub.handle.promote(admin);

        hub.handle
            .publish(Event::new(EventType::OrdersChanged, serde_json::Value::Null));
        hub.handle
            .publish(Event::new(EventType::VisitStart, serde_json::Value::Null));
        hub.handle.client_count().await;

        assert_eq!(admin_rx.try_recv().unwrap().kind, EventType::OrdersChanged);
        assert!(admin_rx.try_recv().is_err());
        assert!(shopper_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_archives_visit_and_updates_admins() {
        let hub = start_hub();
        let (admin, mut admin_rx) = connect(&hub.handle, 8);
        hub.handle.promote(admin);
        let (shopper, _rx) = connect(&hub.handle, 8);
        hub.aggregator
            .add_visit(Visit::start(shopper, "10.0.0.2", "", "Mozilla"));

        hub.handle.unregister(shopper);

        let update = tokio::time::timeout(Duration::from_secs(1), admin_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update, Event::visitor_count(0));
        assert_eq!(hub.aggregator.current_count(), 0);
    }

    #[tokio::test]
    async fn shutdown_closes_every_queue() {
        let hub = start_hub();
        let (_a, mut rx_a) = connect(&hub.handle, 8);
        let (_b, mut rx_b) = connect(&hub.handle, 8);
        hub.handle.client_count().await;

        hub.shutdown.send(true).unwrap();
        hub.task.await.unwrap();

        assert!(rx_a.recv().await.is_none());
        assert!(rx_b.recv().await.is_none());
        assert_eq!(hub.handle.client_count().await, 0);
    }

    #[tokio::test]
    async fn shutdown_waits_for_visit_archival() {
        let archive = Arc::new(SlowArchive::default());
        let aggregator = Arc::new(VisitAggregator::new(archive.clone()));
        let (hub, handle) = Hub::new(aggregator.clone());
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(hub.run(rx));

        let mut queues = Vec::new();
        for n in 0..5 {
            let (id, queue) = connect(&handle, 8);
            aggregator.add_visit(Visit::start(id, format!("10.0.0.{}", n), "", "Mozilla"));
            queues.push(queue);
        }
        assert_eq!(handle.client_count().await, 5);

        shutdown.send(true).unwrap();
        task.await.unwrap();

        assert_eq!(archive.archived.load(Ordering::SeqCst), 5);
        assert_eq!(aggregator.current_count(), 0);
    }
}

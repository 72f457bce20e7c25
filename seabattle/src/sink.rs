//! Delivery of outbound events to connected clients.
use crate::{ids::ConnectionId, protocol::ServerEvent};

/// Receives the events produced while a command runs. Delivery is fire-and-forget:
/// the engine never learns whether an event reached its client.
pub trait NotificationSink {
    /// Deliver an event to a single connection.
    fn send_to(&mut self, conn: ConnectionId, event: &ServerEvent);

    /// Deliver an event to every open connection.
    fn broadcast(&mut self, event: &ServerEvent);
}

/// A single recorded delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    To(ConnectionId, ServerEvent),
    Broadcast(ServerEvent),
}

/// Sink that keeps every delivery in order. Useful for tests and for embedding the
/// engine behind a transport that batches writes.
#[derive(Debug, Default)]
pub struct RecordingSink {
    deliveries: Vec<Delivery>,
}

impl RecordingSink {
    /// Construct an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All deliveries so far, oldest first.
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Remove and return all deliveries so far.
    pub fn take(&mut self) -> Vec<Delivery> {
        std::mem::replace(&mut self.deliveries, Vec::new())
    }

    /// Events sent directly to `conn`, oldest first. Broadcasts are not included.
    pub fn sent_to(&self, conn: ConnectionId) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::To(c, event) if *c == conn => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Broadcast events, oldest first.
    pub fn broadcasts(&self) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Broadcast(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Returns true if nothing has been delivered.
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn send_to(&mut self, conn: ConnectionId, event: &ServerEvent) {
        self.deliveries.push(Delivery::To(conn, event.clone()));
    }

    fn broadcast(&mut self, event: &ServerEvent) {
        self.deliveries.push(Delivery::Broadcast(event.clone()));
    }
}

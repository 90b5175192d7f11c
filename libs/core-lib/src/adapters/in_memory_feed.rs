use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast::{self, Sender};

use crate::domain::records::{ChangeEvent, Table};
use crate::{ChangeFeed, CoreError};

/// In-memory implementation of the ChangeFeed port using Tokio broadcast
/// channels, one per table. Suitable for tests and single-executable mode.
///
/// Note: broadcast channels drop messages for receivers that lag behind.
/// That matches the transport contract the reconciler is written against
/// (at-least-once, possibly lossy under pressure), so no buffering is added.
#[derive(Debug, Clone)]
pub struct InMemoryChangeFeed {
    // Store: Table -> Broadcast Sender. Receivers are created on demand.
    channels: Arc<DashMap<Table, Sender<ChangeEvent>>>,
    // Capacity for each new broadcast channel created.
    channel_capacity: usize,
}

impl InMemoryChangeFeed {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            channel_capacity,
        }
    }

    fn get_or_create_sender(&self, table: Table) -> Sender<ChangeEvent> {
        self.channels
            .entry(table)
            .or_insert_with(|| {
                let (sender, _) = broadcast::channel(self.channel_capacity);
                sender
            })
            .value()
            .clone()
    }

    /// Deliver one change event to every current subscriber of its table.
    /// Publishing with no subscribers is not an error; returns the number of
    /// receivers the event reached.
    pub fn publish(&self, event: ChangeEvent) -> Result<usize, CoreError> {
        let sender = self.get_or_create_sender(event.table);
        Ok(sender.send(event).unwrap_or(0))
    }
}

impl Default for InMemoryChangeFeed {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ChangeFeed for InMemoryChangeFeed {
    fn subscribe(&self, table: Table) -> broadcast::Receiver<ChangeEvent> {
        self.get_or_create_sender(table).subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::Record;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn publish_reaches_every_subscriber_of_the_table() {
        let feed = InMemoryChangeFeed::default();
        let mut rx1 = feed.subscribe(Table::Patients);
        let mut rx2 = feed.subscribe(Table::Patients);

        let event = ChangeEvent::insert(Table::Patients, Record::new("p-1"));
        let reached = feed.publish(event.clone()).unwrap();
        assert_eq!(reached, 2);

        let got1 = timeout(Duration::from_millis(100), rx1.recv()).await.unwrap().unwrap();
        let got2 = timeout(Duration::from_millis(100), rx2.recv()).await.unwrap().unwrap();
        assert_eq!(got1, event);
        assert_eq!(got2, event);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_fine() {
        let feed = InMemoryChangeFeed::default();
        let reached = feed
            .publish(ChangeEvent::insert(Table::Revenue, Record::new("r-1")))
            .unwrap();
        assert_eq!(reached, 0);
    }

    #[tokio::test]
    async fn tables_are_isolated() {
        let feed = InMemoryChangeFeed::default();
        let mut bookings = feed.subscribe(Table::Bookings);
        let mut messages = feed.subscribe(Table::Messages);

        feed.publish(ChangeEvent::insert(Table::Bookings, Record::new("b-1")))
            .unwrap();

        let got = timeout(Duration::from_millis(100), bookings.recv()).await.unwrap().unwrap();
        assert_eq!(got.record.id, "b-1");

        // The messages subscriber must not see the bookings event.
        let nothing = timeout(Duration::from_millis(50), messages.recv()).await;
        assert!(nothing.is_err());
    }
}

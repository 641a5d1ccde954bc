//! The `EventStore` trait and the in-memory backend.
//!
//! The trait is the repository boundary: the check-in protocol and the HTTP
//! layer depend on this abstraction, never on a concrete collection. The
//! bundled [`InMemoryEventStore`] is an explicitly constructed instance passed
//! in at process start; there is no ambient module-level state.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{Result, RollcallError};
use crate::event::{Event, Participant, Property};

/// Abstraction over the event, participant, and property records that the
/// check-in subsystem reads and writes.
///
/// All methods take `&self`; implementations are interior-mutable and safe to
/// share behind an `Arc`.
#[async_trait]
pub trait EventStore: Send + Sync {
    // ── Events ────────────────────────────────────────────────────────────

    /// Persist a new event.
    async fn create_event(&self, event: Event) -> Result<Event>;

    /// Retrieve an event by id. Returns `None` if not found.
    async fn get_event(&self, id: &str) -> Result<Option<Event>>;

    /// List all events, ordered by scheduled start.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// List events whose start falls within `[start, end]`.
    async fn events_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>>;

    /// Replace a stored event with `event` (matched by id).
    ///
    /// # Errors
    ///
    /// Returns [`RollcallError::EventNotFound`] if no event with that id
    /// exists.
    async fn update_event(&self, event: Event) -> Result<Event>;

    /// Delete an event and its attendance ledger.
    ///
    /// # Errors
    ///
    /// Returns [`RollcallError::EventNotFound`] if no event with that id
    /// exists.
    async fn delete_event(&self, id: &str) -> Result<()>;

    // ── Participant directory ─────────────────────────────────────────────

    /// List the participant directory.
    async fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Add a participant to the directory.
    async fn create_participant(&self, participant: Participant) -> Result<Participant>;

    // ── Property directory ────────────────────────────────────────────────

    /// List the property directory.
    async fn list_properties(&self) -> Result<Vec<Property>>;

    /// Retrieve a property by id. Returns `None` if not found.
    async fn get_property(&self, id: &str) -> Result<Option<Property>>;

    /// Add a property to the directory.
    async fn create_property(&self, property: Property) -> Result<Property>;
}

/// In-memory [`EventStore`] backend.
///
/// `RwLock`-guarded collections; suitable for development and tests, and for
/// the single-instance deployments this service targets.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<String, Event>>,
    participants: RwLock<Vec<Participant>>,
    properties: RwLock<Vec<Property>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create_event(&self, event: Event) -> Result<Event> {
        let mut events = self.events.write().await;
        events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.get(id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        let mut all: Vec<Event> = events.values().cloned().collect();
        all.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn events_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let mut all = self.list_events().await?;
        all.retain(|e| e.start >= start && e.start <= end);
        Ok(all)
    }

    async fn update_event(&self, event: Event) -> Result<Event> {
        let mut events = self.events.write().await;
        if !events.contains_key(&event.id) {
            return Err(RollcallError::EventNotFound(event.id));
        }
        events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        let mut events = self.events.write().await;
        events
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RollcallError::EventNotFound(id.to_string()))
    }

    async fn list_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.participants.read().await.clone())
    }

    async fn create_participant(&self, participant: Participant) -> Result<Participant> {
        let mut participants = self.participants.write().await;
        participants.push(participant.clone());
        Ok(participant)
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        Ok(self.properties.read().await.clone())
    }

    async fn get_property(&self, id: &str) -> Result<Option<Property>> {
        let properties = self.properties.read().await;
        Ok(properties.iter().find(|p| p.id == id).cloned())
    }

    async fn create_property(&self, property: Property) -> Result<Property> {
        let mut properties = self.properties.write().await;
        properties.push(property.clone());
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, EventType, ParticipantRole};
    use chrono::{Duration, TimeZone};

    const ORIGIN: &str = "http://localhost:5173";

    fn event_at(title: &str, start: DateTime<Utc>) -> Event {
        Event::create(
            EventDraft {
                title: title.to_string(),
                event_type: EventType::ClientMeeting,
                start,
                end: start + Duration::hours(1),
                location: "Office".to_string(),
                ..EventDraft::default()
            },
            ORIGIN,
        )
        .unwrap()
    }

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(event_at("Meeting", utc(1, 10)))
            .await
            .unwrap();

        let fetched = store.get_event(&event.id).await.unwrap().unwrap();
        assert_eq!(fetched, event);
        assert!(store.get_event("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_start() {
        let store = InMemoryEventStore::new();
        store
            .create_event(event_at("Later", utc(2, 14)))
            .await
            .unwrap();
        store
            .create_event(event_at("Earlier", utc(1, 9)))
            .await
            .unwrap();

        let all = store.list_events().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Earlier");
        assert_eq!(all[1].title, "Later");
    }

    #[tokio::test]
    async fn test_range_filters_on_start() {
        let store = InMemoryEventStore::new();
        store
            .create_event(event_at("In range", utc(2, 10)))
            .await
            .unwrap();
        store
            .create_event(event_at("Out of range", utc(5, 10)))
            .await
            .unwrap();

        let hits = store.events_in_range(utc(1, 0), utc(3, 0)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "In range");
    }

    #[tokio::test]
    async fn test_update_missing_event_fails() {
        let store = InMemoryEventStore::new();
        let event = event_at("Never stored", utc(1, 10));
        let err = store.update_event(event).await.unwrap_err();
        assert!(matches!(err, RollcallError::EventNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_event_and_ledger() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(event_at("Meeting", utc(1, 10)))
            .await
            .unwrap();

        store.delete_event(&event.id).await.unwrap();
        assert!(store.get_event(&event.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_event(&event.id).await.unwrap_err(),
            RollcallError::EventNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_directories() {
        let store = InMemoryEventStore::new();
        store
            .create_participant(Participant::new(
                "user-1",
                "John Smith",
                "john.smith@example.com",
                ParticipantRole::Agent,
            ))
            .await
            .unwrap();
        store
            .create_property(Property {
                id: "prop-1".to_string(),
                address: "123 Main Street".to_string(),
                city: "Los Angeles".to_string(),
                state: "CA".to_string(),
                zip_code: "90001".to_string(),
                price: Some(1_250_000.0),
                property_type: Some("Single Family Home".to_string()),
                coordinates: crate::geo::Coordinates {
                    lat: 34.052235,
                    lng: -118.243683,
                },
            })
            .await
            .unwrap();

        assert_eq!(store.list_participants().await.unwrap().len(), 1);
        assert_eq!(store.list_properties().await.unwrap().len(), 1);
        assert!(store.get_property("prop-1").await.unwrap().is_some());
        assert!(store.get_property("prop-9").await.unwrap().is_none());
    }
}

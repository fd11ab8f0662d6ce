use std::sync::Arc;

use log::debug;

use crate::codec::Codec;
use crate::collection::Collection;
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::event::Event;
use crate::store::KvStore;

/// The append-only incident event collection.
///
/// All events live in one encoded list under a single store key. Appends
/// rewrite the whole list; queries decode it and scan linearly.
pub struct EventLedger<S> {
    events: Collection<S, Event>,
}

impl<S: KvStore> EventLedger<S> {
    pub fn new(store: Arc<S>, config: &LedgerConfig) -> Self {
        EventLedger {
            events: Collection::new(
                store,
                config.event_key.clone(),
                Codec::new(config.naming),
                config.decode_policy,
                config.concurrency,
            ),
        }
    }

    /// Store key holding the collection.
    pub fn key(&self) -> &str {
        self.events.key()
    }

    /// Append `event` after every event already recorded.
    ///
    /// Nothing in the event is validated. The whole collection is read,
    /// extended and written back, so each call costs time proportional to
    /// the number of events already stored.
    ///
    /// # Errors
    ///
    /// [`StoreRead`](crate::LedgerError::StoreRead) or
    /// [`StoreWrite`](crate::LedgerError::StoreWrite) when the store fails,
    /// [`CorruptState`](crate::LedgerError::CorruptState) for unreadable
    /// state under the strict decode policy, and
    /// [`Conflict`](crate::LedgerError::Conflict) when compare-and-swap
    /// detects a concurrent append.
    pub fn append_event(&self, event: Event) -> Result<()> {
        let id = event.id.clone();
        let iot_devices = event.iot_count();
        let len = self.events.append(event)?;
        debug!("appended event '{id}' with {iot_devices} IoT devices; {len} events stored");
        Ok(())
    }

    /// Every stored event, in append order.
    pub fn events(&self) -> Result<Vec<Event>> {
        self.events.load()
    }

    /// Events recorded for `car_id`, in append order.
    ///
    /// A store read failure names `car_id` in its
    /// [`payload`](crate::LedgerError::payload).
    pub fn query_by_car(&self, car_id: &str) -> Result<Vec<Event>> {
        self.events
            .select(|event| event.car_id == car_id)
            .map_err(|err| err.about(car_id))
    }

    /// Like [`EventLedger::query_by_car`], returning the encoded collection.
    pub fn query_by_car_encoded(&self, car_id: &str) -> Result<Vec<u8>> {
        let events = self.query_by_car(car_id)?;
        Ok(self.events.codec().encode(&events)?)
    }

    /// Timeline of a vehicle: its events in the order they were recorded.
    pub fn timeline(&self, car_id: &str) -> Result<Vec<u8>> {
        self.query_by_car_encoded(car_id)
    }

    /// Events relevant to an insurance claim for a vehicle. Currently the
    /// same selection as [`EventLedger::timeline`].
    pub fn insurance_events(&self, car_id: &str) -> Result<Vec<u8>> {
        self.query_by_car_encoded(car_id)
    }

    pub(crate) fn reset(&self) -> Result<()> {
        self.events.reset()
    }
}

use serde::{Deserialize, Serialize};

use crate::codec::Record;

/// Separator between IoT device records inside [`Event::iot`].
pub const IOT_SEPARATOR: char = '|';

/// One recorded vehicle incident.
///
/// Every field is an opaque string. The ledger validates nothing: empty
/// values, free text and encoded blobs are all accepted as given. Events are
/// immutable once appended.
///
/// # Examples
///
/// ```
/// use carledger::Event;
///
/// let event = Event::new("e1", "car1")
///     .with_owner("bob")
///     .with_day_code("2024-01-01")
///     .with_iot_records(["dev1", "dev2"]);
/// assert_eq!(event.car_id, "car1");
/// assert_eq!(event.iot, "dev1|dev2");
/// assert_eq!(event.iot_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Caller-supplied identifier. Uniqueness is not enforced.
    pub id: String,

    /// Vehicle the incident belongs to. Timeline queries filter on this.
    pub car_id: String,

    pub owner: String,

    /// Caller-defined date or shift encoding.
    pub day_code: String,

    /// Free text or coordinates.
    pub location: String,

    /// Image reference or encoded blob.
    pub image: String,

    pub describe: String,

    /// IoT device records joined with [`IOT_SEPARATOR`]. The per-record
    /// format belongs to the callers; see [`Event::iot_records`].
    pub iot: String,
}

impl Event {
    /// Create an event for `car_id` with every other field empty.
    pub fn new(id: impl Into<String>, car_id: impl Into<String>) -> Self {
        Event {
            id: id.into(),
            car_id: car_id.into(),
            ..Event::default()
        }
    }

    /// Build an event from the eight positional arguments of `append_event`:
    /// id, car_id, owner, day_code, location, image, describe, iot.
    pub fn from_args([id, car_id, owner, day_code, location, image, describe, iot]: [String; 8]) -> Self {
        Event {
            id,
            car_id,
            owner,
            day_code,
            location,
            image,
            describe,
            iot,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_day_code(mut self, day_code: impl Into<String>) -> Self {
        self.day_code = day_code.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_describe(mut self, describe: impl Into<String>) -> Self {
        self.describe = describe.into();
        self
    }

    /// Set the raw, already delimited IoT string.
    pub fn with_iot(mut self, iot: impl Into<String>) -> Self {
        self.iot = iot.into();
        self
    }

    /// Set the IoT field from a list of device records, joining them with
    /// [`IOT_SEPARATOR`].
    ///
    /// Records containing the separator themselves cannot be split back
    /// apart by [`Event::iot_records`].
    pub fn with_iot_records<I, R>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<str>,
    {
        let mut iot = String::new();
        for (i, record) in records.into_iter().enumerate() {
            if i > 0 {
                iot.push(IOT_SEPARATOR);
            }
            iot.push_str(record.as_ref());
        }
        self.iot = iot;
        self
    }

    /// The IoT device records in order.
    ///
    /// Splitting is literal: an empty `iot` yields one empty record, and
    /// adjacent separators yield empty records between them.
    ///
    /// ```
    /// use carledger::Event;
    ///
    /// let event = Event::new("e1", "car1").with_iot("dev1|dev2");
    /// assert_eq!(event.iot_records().collect::<Vec<_>>(), ["dev1", "dev2"]);
    /// ```
    pub fn iot_records(&self) -> impl Iterator<Item = &str> {
        self.iot.split(IOT_SEPARATOR)
    }

    /// Number of IoT device records, counted the same way as
    /// [`Event::iot_records`].
    pub fn iot_count(&self) -> usize {
        self.iot_records().count()
    }
}

impl Record for Event {
    const ENVELOPE: (&'static str, &'static str) = ("events", "EVENTS");
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("id", "EVENT_ID"),
        ("car_id", "CAR_ID"),
        ("owner", "OWNER"),
        ("day_code", "DAY_CODE"),
        ("location", "LOCATION"),
        ("image", "IMAGE"),
        ("describe", "DESCRIBE"),
        ("iot", "IOT"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_args_keeps_positional_order() {
        let args = ["e1", "car1", "bob", "d", "loc", "img", "desc", "dev1|dev2"].map(String::from);
        let event = Event::from_args(args);
        assert_eq!(event.id, "e1");
        assert_eq!(event.car_id, "car1");
        assert_eq!(event.owner, "bob");
        assert_eq!(event.day_code, "d");
        assert_eq!(event.location, "loc");
        assert_eq!(event.image, "img");
        assert_eq!(event.describe, "desc");
        assert_eq!(event.iot, "dev1|dev2");
    }

    #[test]
    fn empty_iot_counts_one_record() {
        assert_eq!(Event::new("e", "c").iot_count(), 1);
    }

    #[test]
    fn iot_records_keep_empty_entries() {
        let event = Event::new("e", "c").with_iot("a||b");
        assert_eq!(event.iot_records().collect::<Vec<_>>(), ["a", "", "b"]);
        assert_eq!(event.iot_count(), 3);
    }

    #[test]
    fn with_iot_records_round_trips() {
        let event = Event::new("e", "c").with_iot_records(vec!["x:1".to_string(), "y:2".to_string()]);
        assert_eq!(event.iot, "x:1|y:2");
        assert_eq!(event.iot_records().collect::<Vec<_>>(), ["x:1", "y:2"]);
    }
}

//! Optional identity, anonymity and timestamp fields.
//!
//! Each fragment owns its field(s) and knows how to serialize them. Request
//! types hold the fragments they support and merge their payloads
//! explicitly; the `*Aware` traits only expose the builders.

use crate::filter::filtered;
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};
use std::fmt::Display;

/// Format a point in time as ISO-8601, e.g. `2024-01-28T00:00:00+00:00`.
pub(crate) fn iso8601<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn single(key: &str, value: Option<Value>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.into(), value.unwrap_or(Value::Null));
    filtered(map)
}

// ============================================
// IDENTITY
// ============================================

/// The `userId` field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    user_id: Option<String>,
}

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        single("userId", self.user_id.clone().map(Value::String))
    }
}

// ============================================
// ANONYMITY
// ============================================

/// The `anonymousId` field, together with the [`Identity`] it extends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Anonymity {
    identity: Identity,
    anonymous_id: Option<String>,
}

impl Anonymity {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    pub fn anonymous_id(&self) -> Option<&str> {
        self.anonymous_id.as_deref()
    }

    pub fn set_anonymous_id(&mut self, anonymous_id: Option<String>) {
        self.anonymous_id = anonymous_id;
    }

    /// `userId` first, then `anonymousId`.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = self.identity.to_payload();
        payload.extend(single(
            "anonymousId",
            self.anonymous_id.clone().map(Value::String),
        ));
        payload
    }
}

// ============================================
// TIMESTAMP
// ============================================

/// The `timestamp` field. Defaults to the current UTC time.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    value: Option<DateTime<FixedOffset>>,
}

impl Default for Timestamp {
    fn default() -> Self {
        Self {
            value: Some(Utc::now().fixed_offset()),
        }
    }
}

impl Timestamp {
    pub fn get(&self) -> Option<&DateTime<FixedOffset>> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: Option<DateTime<FixedOffset>>) {
        self.value = value;
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        single(
            "timestamp",
            self.value.as_ref().map(|ts| Value::String(iso8601(ts))),
        )
    }
}

// ============================================
// BUILDER TRAITS
// ============================================

/// Requests that carry a `userId`.
pub trait IdentityAware: Sized {
    fn identity(&self) -> &Identity;

    fn identity_mut(&mut self) -> &mut Identity;

    fn user_id(&self) -> Option<&str> {
        self.identity().user_id()
    }

    /// Unique identifier for the user in your database.
    ///
    /// A userId or an anonymousId is required.
    fn set_user_id(mut self, user_id: Option<String>) -> Self {
        self.identity_mut().set_user_id(user_id);
        self
    }

    fn with_user_id(self, user_id: impl Into<String>) -> Self {
        self.set_user_id(Some(user_id.into()))
    }
}

/// Requests that can be sent with an `anonymousId` instead of a `userId`.
pub trait AnonymousAware: IdentityAware {
    fn anonymity(&self) -> &Anonymity;

    fn anonymity_mut(&mut self) -> &mut Anonymity;

    fn anonymous_id(&self) -> Option<&str> {
        self.anonymity().anonymous_id()
    }

    /// Pseudo-unique substitute for a userId, for when no absolutely unique
    /// identifier is available.
    fn set_anonymous_id(mut self, anonymous_id: Option<String>) -> Self {
        self.anonymity_mut().set_anonymous_id(anonymous_id);
        self
    }

    fn with_anonymous_id(self, anonymous_id: impl Into<String>) -> Self {
        self.set_anonymous_id(Some(anonymous_id.into()))
    }

    /// Store `id` as the anonymousId when `anonymous` is set, as the userId otherwise.
    fn identified_as(self, id: impl Into<String>, anonymous: bool) -> Self {
        if anonymous {
            self.with_anonymous_id(id)
        } else {
            self.with_user_id(id)
        }
    }
}

/// Requests that carry a `timestamp`.
///
/// Set one explicitly when importing historical data.
pub trait TimestampAware: Sized {
    fn timestamp_fragment(&self) -> &Timestamp;

    fn timestamp_fragment_mut(&mut self) -> &mut Timestamp;

    fn timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        self.timestamp_fragment().get()
    }

    /// Replace the timestamp; `None` leaves it to the server.
    fn set_timestamp(mut self, timestamp: Option<DateTime<FixedOffset>>) -> Self {
        self.timestamp_fragment_mut().set(timestamp);
        self
    }

    fn with_timestamp(self, timestamp: impl Into<DateTime<FixedOffset>>) -> Self {
        self.set_timestamp(Some(timestamp.into()))
    }
}

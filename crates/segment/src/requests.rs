//! Single-event request types.
//!
//! Every request serializes as the left-to-right merge of its fragments:
//! identity (or anonymity), timestamp, envelope, then its own fields with
//! blank values dropped.

use crate::envelope::{Envelope, EnvelopeAware};
use crate::filter::filtered;
use crate::fragments::{
    iso8601, Anonymity, AnonymousAware, Identity, IdentityAware, Timestamp, TimestampAware,
};
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt::Display;

/// Merge payload fragments; later keys win on collision.
fn merge<const N: usize>(parts: [Map<String, Value>; N]) -> Map<String, Value> {
    let mut payload = Map::new();
    for part in parts {
        payload.extend(part);
    }
    payload
}

/// A request's own top-level fields, blank ones removed.
fn own_fields<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    filtered(
        fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

macro_rules! impl_request {
    ($($request:ty),+) => {$(
        impl EnvelopeAware for $request {
            fn envelope(&self) -> &Envelope {
                &self.envelope
            }

            fn envelope_mut(&mut self) -> &mut Envelope {
                &mut self.envelope
            }
        }

        impl Serialize for $request {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.to_payload().serialize(serializer)
            }
        }
    )+};
}

macro_rules! impl_anonymous {
    ($($request:ty),+) => {$(
        impl IdentityAware for $request {
            fn identity(&self) -> &Identity {
                self.anonymity.identity()
            }

            fn identity_mut(&mut self) -> &mut Identity {
                self.anonymity.identity_mut()
            }
        }

        impl AnonymousAware for $request {
            fn anonymity(&self) -> &Anonymity {
                &self.anonymity
            }

            fn anonymity_mut(&mut self) -> &mut Anonymity {
                &mut self.anonymity
            }
        }
    )+};
}

macro_rules! impl_timestamp {
    ($($request:ty),+) => {$(
        impl TimestampAware for $request {
            fn timestamp_fragment(&self) -> &Timestamp {
                &self.timestamp
            }

            fn timestamp_fragment_mut(&mut self) -> &mut Timestamp {
                &mut self.timestamp
            }
        }
    )+};
}

impl_request!(Identify, Track, Page, Screen, Group, Alias);
impl_anonymous!(Identify, Track, Page, Screen, Group);
impl_timestamp!(Identify, Track, Page, Screen, Group, Alias);

// ============================================
// IDENTIFY
// ============================================

pub const IDENTIFY_TRAIT_ADDRESS: &str = "address";
pub const IDENTIFY_TRAIT_AGE: &str = "age";
pub const IDENTIFY_TRAIT_AVATAR: &str = "avatar";
pub const IDENTIFY_TRAIT_BIRTHDAY: &str = "birthday";
pub const IDENTIFY_TRAIT_COMPANY: &str = "company";
pub const IDENTIFY_TRAIT_CREATED_AT: &str = "createdAt";
pub const IDENTIFY_TRAIT_DESCRIPTION: &str = "description";
pub const IDENTIFY_TRAIT_EMAIL: &str = "email";
pub const IDENTIFY_TRAIT_FIRST_NAME: &str = "firstName";
pub const IDENTIFY_TRAIT_GENDER: &str = "gender";
pub const IDENTIFY_TRAIT_ID: &str = "id";
pub const IDENTIFY_TRAIT_LAST_NAME: &str = "lastName";
pub const IDENTIFY_TRAIT_NAME: &str = "name";
pub const IDENTIFY_TRAIT_PHONE: &str = "phone";
pub const IDENTIFY_TRAIT_TITLE: &str = "title";
pub const IDENTIFY_TRAIT_USERNAME: &str = "username";
pub const IDENTIFY_TRAIT_WEBSITE: &str = "website";

/// Ties a user to their actions and records traits about them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Identify {
    envelope: Envelope,
    anonymity: Anonymity,
    timestamp: Timestamp,
    traits: Map<String, Value>,
}

impl Identify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_identified(user_id: impl Into<String>) -> Self {
        Self::new().with_user_id(user_id)
    }

    pub fn create_anonymous(anonymous_id: impl Into<String>) -> Self {
        Self::new().with_anonymous_id(anonymous_id)
    }

    pub fn create(id: impl Into<String>, anonymous: bool) -> Self {
        Self::new().identified_as(id, anonymous)
    }

    pub fn traits(&self) -> &Map<String, Value> {
        &self.traits
    }

    /// Free-form trait of the user, like email or name.
    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.traits.insert(name.into(), value.into());
        self
    }

    /// Street address: city, country, postalCode, state or street.
    pub fn with_address_trait(self, address: impl Into<Value>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_ADDRESS, address)
    }

    pub fn with_age_trait(self, age: u32) -> Self {
        self.with_trait(IDENTIFY_TRAIT_AGE, age)
    }

    pub fn with_avatar_trait(self, avatar: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_AVATAR, avatar.into())
    }

    /// Sent as `YYYY-MM-DD`.
    pub fn with_birthday_trait(self, birthday: NaiveDate) -> Self {
        self.with_trait(
            IDENTIFY_TRAIT_BIRTHDAY,
            birthday.format("%Y-%m-%d").to_string(),
        )
    }

    /// Company the user represents: name, id, industry, employee_count or plan.
    pub fn with_company_trait(self, company: impl Into<Value>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_COMPANY, company)
    }

    pub fn with_created_at_trait<Tz>(self, created_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.with_trait(IDENTIFY_TRAIT_CREATED_AT, iso8601(created_at))
    }

    pub fn with_description_trait(self, description: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_DESCRIPTION, description.into())
    }

    pub fn with_email_trait(self, email: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_EMAIL, email.into())
    }

    pub fn with_first_name_trait(self, first_name: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_FIRST_NAME, first_name.into())
    }

    pub fn with_gender_trait(self, gender: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_GENDER, gender.into())
    }

    pub fn with_id_trait(self, id: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_ID, id.into())
    }

    pub fn with_last_name_trait(self, last_name: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_LAST_NAME, last_name.into())
    }

    /// Full name. The API fills it from first and last name when omitted.
    pub fn with_name_trait(self, name: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_NAME, name.into())
    }

    pub fn with_phone_trait(self, phone: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_PHONE, phone.into())
    }

    /// Position at a company, e.g. "VP of Engineering".
    pub fn with_title_trait(self, title: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_TITLE, title.into())
    }

    pub fn with_username_trait(self, username: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_USERNAME, username.into())
    }

    pub fn with_website_trait(self, website: impl Into<String>) -> Self {
        self.with_trait(IDENTIFY_TRAIT_WEBSITE, website.into())
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        merge([
            self.anonymity.to_payload(),
            self.timestamp.to_payload(),
            self.envelope.to_payload(),
            own_fields([("traits", Value::Object(self.traits.clone()))]),
        ])
    }
}

// ============================================
// TRACK
// ============================================

pub const TRACK_PROPERTY_REVENUE: &str = "revenue";
pub const TRACK_PROPERTY_CURRENCY: &str = "currency";
pub const TRACK_PROPERTY_VALUE: &str = "value";

/// Records an action a user performed.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    envelope: Envelope,
    anonymity: Anonymity,
    timestamp: Timestamp,
    event: String,
    properties: Map<String, Value>,
}

impl Track {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            envelope: Envelope::new(),
            anonymity: Anonymity::default(),
            timestamp: Timestamp::default(),
            event: event.into(),
            properties: Map::new(),
        }
    }

    pub fn create_identified(user_id: impl Into<String>, event: impl Into<String>) -> Self {
        Self::new(event).with_user_id(user_id)
    }

    pub fn create_anonymous(anonymous_id: impl Into<String>, event: impl Into<String>) -> Self {
        Self::new(event).with_anonymous_id(anonymous_id)
    }

    pub fn create(id: impl Into<String>, anonymous: bool, event: impl Into<String>) -> Self {
        Self::new(event).identified_as(id, anonymous)
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Free-form property of the event.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Revenue the event resulted in, as a decimal amount (19.99 for $19.99).
    pub fn with_revenue_property(self, revenue: f64) -> Self {
        self.with_property(TRACK_PROPERTY_REVENUE, revenue)
    }

    /// ISO 4217 currency of the revenue. USD is assumed when unset.
    pub fn with_currency_property(self, currency: impl Into<String>) -> Self {
        self.with_property(TRACK_PROPERTY_CURRENCY, currency.into())
    }

    /// Abstract value of an event that does not produce revenue directly.
    pub fn with_value_property(self, value: f64) -> Self {
        self.with_property(TRACK_PROPERTY_VALUE, value)
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        merge([
            self.anonymity.to_payload(),
            self.timestamp.to_payload(),
            self.envelope.to_payload(),
            own_fields([
                ("event", Value::String(self.event.clone())),
                ("properties", Value::Object(self.properties.clone())),
            ]),
        ])
    }
}

// ============================================
// PAGE
// ============================================

pub const PAGE_PROPERTY_NAME: &str = "name";
pub const PAGE_PROPERTY_PATH: &str = "path";
pub const PAGE_PROPERTY_REFERRER: &str = "referrer";
pub const PAGE_PROPERTY_SEARCH: &str = "search";
pub const PAGE_PROPERTY_TITLE: &str = "title";
pub const PAGE_PROPERTY_URL: &str = "url";
pub const PAGE_PROPERTY_KEYWORDS: &str = "keywords";

/// Records a website page view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    envelope: Envelope,
    anonymity: Anonymity,
    timestamp: Timestamp,
    name: Option<String>,
    properties: Map<String, Value>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_identified(user_id: impl Into<String>) -> Self {
        Self::new().with_user_id(user_id)
    }

    pub fn create_anonymous(anonymous_id: impl Into<String>) -> Self {
        Self::new().with_anonymous_id(anonymous_id)
    }

    pub fn create(id: impl Into<String>, anonymous: bool) -> Self {
        Self::new().identified_as(id, anonymous)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name of the page, e.g. "Signup".
    pub fn set_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.set_name(Some(name.into()))
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Free-form property of the page, like url or referrer.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_name_property(self, name: impl Into<String>) -> Self {
        self.with_property(PAGE_PROPERTY_NAME, name.into())
    }

    /// Path portion of the page URL.
    pub fn with_path_property(self, path: impl Into<String>) -> Self {
        self.with_property(PAGE_PROPERTY_PATH, path.into())
    }

    /// Full URL of the previous page.
    pub fn with_referrer_property(self, referrer: impl Into<String>) -> Self {
        self.with_property(PAGE_PROPERTY_REFERRER, referrer.into())
    }

    /// Query string portion of the page URL.
    pub fn with_search_property(self, search: impl Into<String>) -> Self {
        self.with_property(PAGE_PROPERTY_SEARCH, search.into())
    }

    pub fn with_title_property(self, title: impl Into<String>) -> Self {
        self.with_property(PAGE_PROPERTY_TITLE, title.into())
    }

    /// Full (canonical) URL of the page.
    pub fn with_url_property(self, url: impl Into<String>) -> Self {
        self.with_property(PAGE_PROPERTY_URL, url.into())
    }

    /// Add one entry to the `keywords` property, creating it if needed.
    pub fn with_keyword_property(
        mut self,
        keyword: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let mut keywords = match self.properties.get(PAGE_PROPERTY_KEYWORDS) {
            Some(Value::Object(existing)) => existing.clone(),
            _ => Map::new(),
        };
        keywords.insert(keyword.into(), value.into());
        self.properties
            .insert(PAGE_PROPERTY_KEYWORDS.into(), Value::Object(keywords));
        self
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        merge([
            self.anonymity.to_payload(),
            self.timestamp.to_payload(),
            self.envelope.to_payload(),
            own_fields([
                ("name", self.name.clone().map_or(Value::Null, Value::String)),
                ("properties", Value::Object(self.properties.clone())),
            ]),
        ])
    }
}

// ============================================
// SCREEN
// ============================================

pub const SCREEN_PROPERTY_NAME: &str = "name";

/// Records a mobile app screen view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screen {
    envelope: Envelope,
    anonymity: Anonymity,
    timestamp: Timestamp,
    name: Option<String>,
    properties: Map<String, Value>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_identified(user_id: impl Into<String>) -> Self {
        Self::new().with_user_id(user_id)
    }

    pub fn create_anonymous(anonymous_id: impl Into<String>) -> Self {
        Self::new().with_anonymous_id(anonymous_id)
    }

    pub fn create(id: impl Into<String>, anonymous: bool) -> Self {
        Self::new().identified_as(id, anonymous)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.set_name(Some(name.into()))
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_name_property(self, name: impl Into<String>) -> Self {
        self.with_property(SCREEN_PROPERTY_NAME, name.into())
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        merge([
            self.anonymity.to_payload(),
            self.timestamp.to_payload(),
            self.envelope.to_payload(),
            own_fields([
                ("name", self.name.clone().map_or(Value::Null, Value::String)),
                ("properties", Value::Object(self.properties.clone())),
            ]),
        ])
    }
}

// ============================================
// GROUP
// ============================================

pub const GROUP_TRAIT_ADDRESS: &str = "address";
pub const GROUP_TRAIT_AVATAR: &str = "avatar";
pub const GROUP_TRAIT_CREATED_AT: &str = "createdAt";
pub const GROUP_TRAIT_DESCRIPTION: &str = "description";
pub const GROUP_TRAIT_EMAIL: &str = "email";
pub const GROUP_TRAIT_EMPLOYEES: &str = "employees";
pub const GROUP_TRAIT_ID: &str = "id";
pub const GROUP_TRAIT_INDUSTRY: &str = "industry";
pub const GROUP_TRAIT_NAME: &str = "name";
pub const GROUP_TRAIT_PHONE: &str = "phone";
pub const GROUP_TRAIT_WEBSITE: &str = "website";
pub const GROUP_TRAIT_PLAN: &str = "plan";

/// Associates a user with a group such as a company or account.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    envelope: Envelope,
    anonymity: Anonymity,
    timestamp: Timestamp,
    group_id: String,
    traits: Map<String, Value>,
}

impl Group {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            envelope: Envelope::new(),
            anonymity: Anonymity::default(),
            timestamp: Timestamp::default(),
            group_id: group_id.into(),
            traits: Map::new(),
        }
    }

    pub fn create_identified(user_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::new(group_id).with_user_id(user_id)
    }

    pub fn create_anonymous(
        anonymous_id: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        Self::new(group_id).with_anonymous_id(anonymous_id)
    }

    pub fn create(id: impl Into<String>, anonymous: bool, group_id: impl Into<String>) -> Self {
        Self::new(group_id).identified_as(id, anonymous)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn traits(&self) -> &Map<String, Value> {
        &self.traits
    }

    /// Free-form trait of the group, like email or name.
    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.traits.insert(name.into(), value.into());
        self
    }

    /// Street address: city, country, postalCode, state or street.
    pub fn with_address_trait(self, address: impl Into<Value>) -> Self {
        self.with_trait(GROUP_TRAIT_ADDRESS, address)
    }

    pub fn with_avatar_trait(self, avatar: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_AVATAR, avatar.into())
    }

    pub fn with_created_at_trait<Tz>(self, created_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.with_trait(GROUP_TRAIT_CREATED_AT, iso8601(created_at))
    }

    pub fn with_description_trait(self, description: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_DESCRIPTION, description.into())
    }

    pub fn with_email_trait(self, email: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_EMAIL, email.into())
    }

    pub fn with_employees_trait(self, employees: u64) -> Self {
        self.with_trait(GROUP_TRAIT_EMPLOYEES, employees)
    }

    pub fn with_id_trait(self, id: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_ID, id.into())
    }

    pub fn with_industry_trait(self, industry: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_INDUSTRY, industry.into())
    }

    pub fn with_name_trait(self, name: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_NAME, name.into())
    }

    pub fn with_phone_trait(self, phone: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_PHONE, phone.into())
    }

    pub fn with_website_trait(self, website: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_WEBSITE, website.into())
    }

    pub fn with_plan_trait(self, plan: impl Into<String>) -> Self {
        self.with_trait(GROUP_TRAIT_PLAN, plan.into())
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        merge([
            self.anonymity.to_payload(),
            self.timestamp.to_payload(),
            self.envelope.to_payload(),
            own_fields([
                ("groupId", Value::String(self.group_id.clone())),
                ("traits", Value::Object(self.traits.clone())),
            ]),
        ])
    }
}

// ============================================
// ALIAS
// ============================================

/// Merges a previous identity into a user.
///
/// Only identified construction is supported; aliasing from an anonymous id
/// is done by passing that id as `previous_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    envelope: Envelope,
    identity: Identity,
    timestamp: Timestamp,
    previous_id: String,
}

impl IdentityAware for Alias {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

impl Alias {
    pub fn new(previous_id: impl Into<String>) -> Self {
        Self {
            envelope: Envelope::new(),
            identity: Identity::default(),
            timestamp: Timestamp::default(),
            previous_id: previous_id.into(),
        }
    }

    pub fn create_identified(user_id: impl Into<String>, previous_id: impl Into<String>) -> Self {
        Self::new(previous_id).with_user_id(user_id)
    }

    pub fn previous_id(&self) -> &str {
        &self.previous_id
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        merge([
            self.identity.to_payload(),
            self.timestamp.to_payload(),
            self.envelope.to_payload(),
            own_fields([("previousId", Value::String(self.previous_id.clone()))]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn fixed_time() -> DateTime<chrono::FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, 28, 0, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    #[test]
    fn test_identify_create_anonymous_flag() {
        let anonymous = Identify::create("abc", true);
        let identified = Identify::create("abc", false);

        assert_eq!(anonymous.anonymous_id(), Some("abc"));
        assert_eq!(anonymous.user_id(), None);
        assert_eq!(identified.user_id(), Some("abc"));
        assert_eq!(identified.anonymous_id(), None);

        let payload = anonymous.to_payload();
        assert_eq!(payload["anonymousId"], "abc");
        assert!(payload.get("userId").is_none());

        let payload = identified.to_payload();
        assert_eq!(payload["userId"], "abc");
        assert!(payload.get("anonymousId").is_none());
    }

    #[test]
    fn test_identify_payload() {
        let identify = Identify::create_identified("usr_123")
            .with_timestamp(fixed_time())
            .with_email_trait("user@example.com")
            .with_age_trait(42)
            .with_birthday_trait(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());

        let payload = Value::Object(identify.to_payload());

        assert_eq!(
            payload,
            json!({
                "userId": "usr_123",
                "timestamp": "2024-01-28T00:00:00+00:00",
                "context": {
                    "library": {
                        "name": crate::envelope::LIBRARY_NAME,
                        "version": crate::envelope::LIBRARY_VERSION
                    }
                },
                "traits": {
                    "email": "user@example.com",
                    "age": 42,
                    "birthday": "1990-05-17"
                }
            })
        );
    }

    #[test]
    fn test_identify_empty_traits_omitted() {
        let payload = Identify::create_identified("usr_123").to_payload();
        assert!(payload.get("traits").is_none());
    }

    #[test]
    fn test_track_payload() {
        let track = Track::create("u1", false, "Order Completed")
            .with_revenue_property(9.99)
            .with_currency_property("EUR");

        let payload = track.to_payload();

        assert_eq!(payload["userId"], "u1");
        assert_eq!(payload["event"], "Order Completed");
        assert_eq!(
            payload["properties"],
            json!({"revenue": 9.99, "currency": "EUR"})
        );
        assert!(payload.get("anonymousId").is_none());
        assert!(payload.get("timestamp").is_some());
    }

    #[test]
    fn test_track_empty_properties_omitted() {
        let payload = Track::create_anonymous("anon", "Viewed").to_payload();

        assert!(payload.get("properties").is_none());
        assert_eq!(payload["event"], "Viewed");
    }

    #[test]
    fn test_page_keywords_accumulate() {
        let page = Page::create_identified("u1")
            .with_name("Pricing")
            .with_url_property("https://example.com/pricing")
            .with_keyword_property("plan", "pro")
            .with_keyword_property("seats", 5);

        let payload = page.to_payload();

        assert_eq!(payload["name"], "Pricing");
        assert_eq!(
            payload["properties"],
            json!({
                "url": "https://example.com/pricing",
                "keywords": {"plan": "pro", "seats": 5}
            })
        );
    }

    #[test]
    fn test_page_name_optional() {
        let payload = Page::create_anonymous("anon").to_payload();

        assert!(payload.get("name").is_none());
        assert_eq!(payload["anonymousId"], "anon");
    }

    #[test]
    fn test_screen_serializes_anonymous_id_and_timestamp() {
        let screen = Screen::create("anon", true)
            .with_name("Home")
            .with_timestamp(fixed_time());

        let payload = screen.to_payload();

        assert_eq!(payload["anonymousId"], "anon");
        assert_eq!(payload["timestamp"], "2024-01-28T00:00:00+00:00");
        assert_eq!(payload["name"], "Home");
    }

    #[test]
    fn test_group_payload() {
        let group = Group::create("u1", false, "grp_1")
            .with_name_trait("Acme")
            .with_employees_trait(120)
            .with_created_at_trait(&fixed_time());

        let payload = group.to_payload();

        assert_eq!(payload["groupId"], "grp_1");
        assert_eq!(
            payload["traits"],
            json!({
                "name": "Acme",
                "employees": 120,
                "createdAt": "2024-01-28T00:00:00+00:00"
            })
        );
    }

    #[test]
    fn test_alias_payload() {
        let alias = Alias::create_identified("usr_new", "anon_old").set_timestamp(None);

        let payload = Value::Object(alias.to_payload());

        assert_eq!(payload["userId"], "usr_new");
        assert_eq!(payload["previousId"], "anon_old");
        assert!(payload.get("anonymousId").is_none());
        assert!(payload.get("timestamp").is_none());
    }

    #[test]
    fn test_context_cleared_to_blank_is_removed() {
        let track = Track::create_identified("u1", "evt")
            .with_ip_context("10.0.0.1")
            .with_ip_context("");

        let payload = track.to_payload();

        assert!(payload["context"].get("ip").is_none());
        assert!(payload["context"].get("library").is_some());
    }

    #[test]
    fn test_integrations_serialized() {
        let identify = Identify::create_identified("u1")
            .disable_all_integrations()
            .with_integration("Intercom", true);

        let payload = identify.to_payload();

        assert_eq!(payload["integrations"], json!({"All": false, "Intercom": true}));
    }

    #[test]
    fn test_serialization_is_repeatable() {
        let mut batch = crate::batch::Batch::new();
        batch
            .add_request(Track::create_identified("u1", "evt"))
            .unwrap()
            .add_request(Page::create_anonymous("anon").with_name("Home"))
            .unwrap();

        let requests: [crate::types::Request; 7] = [
            Identify::create_identified("u1")
                .with_email_trait("ada@example.com")
                .into(),
            Track::create_identified("u1", "evt")
                .with_property("a", 1)
                .into(),
            Page::create_anonymous("anon")
                .with_name("Home")
                .with_keyword_property("tier", "pro")
                .into(),
            Screen::create_identified("u1").with_name("Settings").into(),
            Group::create_anonymous("anon", "grp")
                .with_plan_trait("pro")
                .into(),
            Alias::create_identified("u1", "anon").into(),
            batch.into(),
        ];

        for request in &requests {
            assert_eq!(request.to_payload(), request.to_payload(), "{}", request.kind());
            assert_eq!(
                serde_json::to_string(request).unwrap(),
                serde_json::to_string(request).unwrap(),
                "{}",
                request.kind()
            );
        }
    }

    #[test]
    fn test_serde_matches_payload() {
        let group = Group::create_anonymous("anon", "grp");

        let json = serde_json::to_value(&group).unwrap();

        assert_eq!(json, Value::Object(group.to_payload()));
    }
}

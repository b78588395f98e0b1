//! Request sum type and API resources.

use crate::batch::Batch;
use crate::envelope::{Envelope, EnvelopeAware};
use crate::requests::{Alias, Group, Identify, Page, Screen, Track};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// API resource a request is posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Identify,
    Track,
    Page,
    Screen,
    Group,
    Alias,
    Batch,
}

impl Resource {
    /// Path segment under `/<version>/`.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Identify => "identify",
            Resource::Track => "track",
            Resource::Page => "page",
            Resource::Screen => "screen",
            Resource::Group => "group",
            Resource::Alias => "alias",
            Resource::Batch => "batch",
        }
    }

    /// `type` value used for batch members. Alias and batch requests cannot
    /// be batched.
    pub fn batch_tag(self) -> Option<&'static str> {
        match self {
            Resource::Alias | Resource::Batch => None,
            other => Some(other.path()),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Any request the API accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Identify(Identify),
    Track(Track),
    Page(Page),
    Screen(Screen),
    Group(Group),
    Alias(Alias),
    Batch(Batch),
}

impl Request {
    pub fn resource(&self) -> Resource {
        match self {
            Request::Identify(_) => Resource::Identify,
            Request::Track(_) => Resource::Track,
            Request::Page(_) => Resource::Page,
            Request::Screen(_) => Resource::Screen,
            Request::Group(_) => Resource::Group,
            Request::Alias(_) => Resource::Alias,
            Request::Batch(_) => Resource::Batch,
        }
    }

    /// Type name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Identify(_) => "Identify",
            Request::Track(_) => "Track",
            Request::Page(_) => "Page",
            Request::Screen(_) => "Screen",
            Request::Group(_) => "Group",
            Request::Alias(_) => "Alias",
            Request::Batch(_) => "Batch",
        }
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        match self {
            Request::Identify(r) => r.to_payload(),
            Request::Track(r) => r.to_payload(),
            Request::Page(r) => r.to_payload(),
            Request::Screen(r) => r.to_payload(),
            Request::Group(r) => r.to_payload(),
            Request::Alias(r) => r.to_payload(),
            Request::Batch(r) => r.to_payload(),
        }
    }
}

impl EnvelopeAware for Request {
    fn envelope(&self) -> &Envelope {
        match self {
            Request::Identify(r) => r.envelope(),
            Request::Track(r) => r.envelope(),
            Request::Page(r) => r.envelope(),
            Request::Screen(r) => r.envelope(),
            Request::Group(r) => r.envelope(),
            Request::Alias(r) => r.envelope(),
            Request::Batch(r) => r.envelope(),
        }
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        match self {
            Request::Identify(r) => r.envelope_mut(),
            Request::Track(r) => r.envelope_mut(),
            Request::Page(r) => r.envelope_mut(),
            Request::Screen(r) => r.envelope_mut(),
            Request::Group(r) => r.envelope_mut(),
            Request::Alias(r) => r.envelope_mut(),
            Request::Batch(r) => r.envelope_mut(),
        }
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

macro_rules! impl_from_request {
    ($($variant:ident),+) => {$(
        impl From<$variant> for Request {
            fn from(request: $variant) -> Self {
                Request::$variant(request)
            }
        }
    )+};
}

impl_from_request!(Identify, Track, Page, Screen, Group, Alias, Batch);

//! Fields shared by every request: `context` and `integrations`.
//!
//! See <https://segment.com/docs/connections/spec/common/>.

use crate::filter::filtered;
use serde_json::{json, Map, Value};

pub const CONTEXT_ACTIVE: &str = "active";
pub const CONTEXT_APP: &str = "app";
pub const CONTEXT_CAMPAIGN: &str = "campaign";
pub const CONTEXT_DEVICE: &str = "device";
pub const CONTEXT_IP: &str = "ip";
pub const CONTEXT_LIBRARY: &str = "library";
pub const CONTEXT_LOCALE: &str = "locale";
pub const CONTEXT_LOCATION: &str = "location";
pub const CONTEXT_NETWORK: &str = "network";
pub const CONTEXT_OS: &str = "os";
pub const CONTEXT_PAGE: &str = "page";
pub const CONTEXT_REFERRER: &str = "referrer";
pub const CONTEXT_SCREEN: &str = "screen";
pub const CONTEXT_TIMEZONE: &str = "timezone";
pub const CONTEXT_GROUP_ID: &str = "groupId";
pub const CONTEXT_TRAITS: &str = "traits";
pub const CONTEXT_USER_AGENT: &str = "userAgent";

/// Integration key applying to every destination not listed explicitly.
pub const INTEGRATION_ALL: &str = "All";

/// Library name reported in `context.library`.
pub const LIBRARY_NAME: &str = "segment-rs";

/// Library version reported in `context.library`.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base envelope carried by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    context: Map<String, Value>,
    integrations: Map<String, Value>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    /// Create an envelope with the library context filled in.
    pub fn new() -> Self {
        let mut envelope = Self {
            context: Map::new(),
            integrations: Map::new(),
        };
        envelope.set_library(LIBRARY_NAME, LIBRARY_VERSION);
        envelope
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn integrations(&self) -> &Map<String, Value> {
        &self.integrations
    }

    /// Store a context value, replacing any previous value for `key`.
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.insert(key.into(), value.into());
    }

    /// Enable or disable a destination.
    pub fn set_integration(&mut self, name: impl Into<String>, enabled: bool) {
        self.integrations.insert(name.into(), Value::Bool(enabled));
    }

    /// Overwrite `context.library` with a name/version pair.
    pub fn set_library(&mut self, name: &str, version: &str) {
        self.set_context(CONTEXT_LIBRARY, json!({ "name": name, "version": version }));
    }

    /// Serialize to `{context, integrations}`, omitting blank entries at both levels.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(
            "context".into(),
            Value::Object(filtered(self.context.clone())),
        );
        payload.insert(
            "integrations".into(),
            Value::Object(filtered(self.integrations.clone())),
        );
        filtered(payload)
    }
}

/// Context and integration builders, available on every request type.
///
/// Each builder stores its value in place and hands the request back so calls
/// can be chained. Setting a blank value (`null`, `""`, `{}`) removes the field
/// from the serialized payload.
pub trait EnvelopeAware: Sized {
    fn envelope(&self) -> &Envelope;

    fn envelope_mut(&mut self) -> &mut Envelope;

    fn context(&self) -> &Map<String, Value> {
        self.envelope().context()
    }

    fn integrations(&self) -> &Map<String, Value> {
        self.envelope().integrations()
    }

    /// Set an arbitrary context field.
    fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.envelope_mut().set_context(key, value);
        self
    }

    /// Whether a user is active.
    ///
    /// Usually used to flag an identify call as a traits update that should
    /// not bump "last seen".
    fn with_active_context(self, active: bool) -> Self {
        self.with_context(CONTEXT_ACTIVE, active)
    }

    /// Current application: name, version and build.
    fn with_app_context(self, app: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_APP, app)
    }

    /// Campaign that resulted in the call: name, source, medium, term and content.
    fn with_campaign_context(self, campaign: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_CAMPAIGN, campaign)
    }

    /// Device details: id, advertisingId, manufacturer, model, name, type and version.
    fn with_device_context(self, device: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_DEVICE, device)
    }

    /// Current user's IP address.
    fn with_ip_context(self, ip: impl Into<String>) -> Self {
        self.with_context(CONTEXT_IP, ip.into())
    }

    /// Library making the request: name and version.
    ///
    /// The client replaces this right before sending.
    fn with_library_context(self, library: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_LIBRARY, library)
    }

    /// Locale of the current user, for example `en-US`.
    fn with_locale_context(self, locale: impl Into<String>) -> Self {
        self.with_context(CONTEXT_LOCALE, locale.into())
    }

    /// User location: city, country, latitude, longitude, region and speed.
    fn with_location_context(self, location: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_LOCATION, location)
    }

    /// Network connection: bluetooth, carrier, cellular and wifi.
    fn with_network_context(self, network: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_NETWORK, network)
    }

    /// Operating system: name and version.
    fn with_os_context(self, os: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_OS, os)
    }

    /// Current browser page: hash, path, referrer, search, title and url.
    fn with_page_context(self, page: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_PAGE, page)
    }

    /// How the user was referred: type, name, url and link.
    fn with_referrer_context(self, referrer: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_REFERRER, referrer)
    }

    /// Device screen: density, height and width.
    fn with_screen_context(self, screen: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_SCREEN, screen)
    }

    /// tzdata timezone name, for example `America/New_York`.
    fn with_timezone_context(self, timezone: impl Into<String>) -> Self {
        self.with_context(CONTEXT_TIMEZONE, timezone.into())
    }

    /// Group or account the call should be attributed to.
    fn with_group_id_context(self, group_id: impl Into<String>) -> Self {
        self.with_context(CONTEXT_GROUP_ID, group_id.into())
    }

    /// Traits of the current user, filled the same way as identify traits.
    fn with_traits_context(self, traits: impl Into<Value>) -> Self {
        self.with_context(CONTEXT_TRAITS, traits)
    }

    /// User agent of the device making the request.
    fn with_user_agent_context(self, user_agent: impl Into<String>) -> Self {
        self.with_context(CONTEXT_USER_AGENT, user_agent.into())
    }

    /// Enable or disable a single destination.
    fn with_integration(mut self, integration: impl Into<String>, enabled: bool) -> Self {
        self.envelope_mut().set_integration(integration, enabled);
        self
    }

    fn enable_all_integrations(self) -> Self {
        self.with_integration(INTEGRATION_ALL, true)
    }

    fn disable_all_integrations(self) -> Self {
        self.with_integration(INTEGRATION_ALL, false)
    }
}

//! Segment client implementation.

use crate::batch::Batch;
use crate::config::{Config, SegmentBuilder, DEFAULT_API_HOST, DEFAULT_VERSION};
use crate::envelope::{EnvelopeAware, LIBRARY_NAME, LIBRARY_VERSION};
use crate::requests::{Alias, Group, Identify, Page, Screen, Track};
use crate::transport::{HttpTransport, Transport, TransportResponse};
use crate::types::{Request, Resource};
use crate::Error;
use serde_json::Value;
use tracing::{debug, instrument};

/// Segment tracking API client.
///
/// Every call builds a request and funnels it through [`SegmentClient::send`],
/// which performs exactly one POST and maps the response status:
/// 200 is success, 5xx a server error, 4xx a client error, anything else an
/// unknown API error.
///
/// # Example
///
/// ```rust,no_run
/// use segment::SegmentClient;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), segment::Error> {
///     let client = SegmentClient::builder("write_key").build()?;
///
///     client
///         .track("usr_123", "Order Completed", [("revenue", json!(9.99))], false)
///         .await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SegmentClient<T = HttpTransport> {
    transport: T,
    api_host: String,
    version: String,
}

impl SegmentClient<HttpTransport> {
    /// Create a new builder with the given write key.
    pub fn builder(write_key: impl Into<String>) -> SegmentBuilder {
        SegmentBuilder::new(write_key)
    }

    /// Create a new client from config.
    pub(crate) fn from_config(config: Config) -> Result<Self, Error> {
        let transport = HttpTransport::new(&config)?;

        Ok(Self {
            transport,
            api_host: config.api_host,
            version: config.version,
        })
    }
}

impl<T: Transport> SegmentClient<T> {
    /// Create a client around a caller-supplied transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            api_host: DEFAULT_API_HOST.into(),
            version: DEFAULT_VERSION.into(),
        }
    }

    /// Override the API version path segment.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Override the API host.
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full URL for a resource, e.g. `https://api.segment.io/v1/track`.
    pub fn url(&self, resource: Resource) -> String {
        format!("{}/{}/{}", self.api_host, self.version, resource.path())
    }

    // ============================================
    // CALLS
    // ============================================

    /// Identify a user and record their traits.
    ///
    /// With `anonymous` set, `user_id` is sent as the anonymousId.
    pub async fn identify<I, K, V>(
        &self,
        user_id: impl Into<String>,
        traits: I,
        anonymous: bool,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let request = traits
            .into_iter()
            .fold(Identify::create(user_id, anonymous), |request, (k, v)| {
                request.with_trait(k, v)
            });

        self.send(request).await
    }

    /// Record an event performed by a user.
    pub async fn track<I, K, V>(
        &self,
        user_id: impl Into<String>,
        event: impl Into<String>,
        properties: I,
        anonymous: bool,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let request = properties.into_iter().fold(
            Track::create(user_id, anonymous, event),
            |request, (k, v)| request.with_property(k, v),
        );

        self.send(request).await
    }

    /// Record a page view.
    pub async fn page(
        &self,
        user_id: impl Into<String>,
        name: impl Into<String>,
        anonymous: bool,
    ) -> Result<(), Error> {
        self.send(Page::create(user_id, anonymous).with_name(name))
            .await
    }

    /// Record a screen view.
    pub async fn screen(
        &self,
        user_id: impl Into<String>,
        name: impl Into<String>,
        anonymous: bool,
    ) -> Result<(), Error> {
        self.send(Screen::create(user_id, anonymous).with_name(name))
            .await
    }

    /// Associate a user with a group and record the group's traits.
    pub async fn group<I, K, V>(
        &self,
        user_id: impl Into<String>,
        group_id: impl Into<String>,
        traits: I,
        anonymous: bool,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let request = traits.into_iter().fold(
            Group::create(user_id, anonymous, group_id),
            |request, (k, v)| request.with_trait(k, v),
        );

        self.send(request).await
    }

    /// Merge `previous_id` into `user_id`.
    pub async fn alias(
        &self,
        user_id: impl Into<String>,
        previous_id: impl Into<String>,
    ) -> Result<(), Error> {
        self.send(Alias::create_identified(user_id, previous_id))
            .await
    }

    /// Send several requests in one call, in the given order.
    pub async fn batch<I>(&self, requests: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: Into<Request>,
    {
        let mut batch = Batch::new();
        for request in requests {
            batch.add_request(request)?;
        }

        self.send(batch).await
    }

    /// Send a request.
    ///
    /// Stamps the library context, posts the payload once and classifies the
    /// response. Nothing is retried.
    #[instrument(skip(self, request))]
    pub async fn send(&self, request: impl Into<Request>) -> Result<(), Error> {
        let mut request = request.into();
        request
            .envelope_mut()
            .set_library(LIBRARY_NAME, LIBRARY_VERSION);

        let resource = request.resource();
        let url = self.url(resource);
        debug!(resource = %resource, url = %url, "sending request");

        let response = self.transport.post(&url, &request.to_payload()).await?;
        debug!(status = response.status, "received response");

        classify(response)
    }
}

/// Map a response to success or a typed failure.
///
/// 5xx is checked before 4xx; 200 is the only success code.
pub(crate) fn classify(response: TransportResponse) -> Result<(), Error> {
    let TransportResponse { status, body } = response;

    if status >= 500 {
        return Err(Error::Server { status });
    }

    if status >= 400 {
        return Err(Error::Client { status, body });
    }

    if status != 200 {
        return Err(Error::UnknownApi { status });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::{AnonymousAware, IdentityAware};
    use serde_json::{json, Map};
    use std::future::Future;
    use std::sync::Mutex;

    /// Records every post and answers with a fixed response.
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
        response: TransportResponse,
    }

    impl RecordingTransport {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                response: TransportResponse {
                    status,
                    body: body.into(),
                },
            }
        }

        fn calls(&self) -> Vec<(String, Map<String, Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn post(
            &self,
            url: &str,
            payload: &Map<String, Value>,
        ) -> impl Future<Output = Result<TransportResponse, Error>> + Send {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), payload.clone()));
            let response = self.response.clone();
            async move { Ok(response) }
        }
    }

    fn client(status: u16, body: &str) -> SegmentClient<RecordingTransport> {
        SegmentClient::with_transport(RecordingTransport::answering(status, body))
    }

    fn response(status: u16) -> TransportResponse {
        TransportResponse {
            status,
            body: "oops".into(),
        }
    }

    #[test]
    fn test_classify_only_200_succeeds() {
        assert!(classify(response(200)).is_ok());
        assert!(matches!(
            classify(response(201)),
            Err(Error::UnknownApi { status: 201 })
        ));
        assert!(matches!(
            classify(response(204)),
            Err(Error::UnknownApi { status: 204 })
        ));
        assert!(matches!(
            classify(response(302)),
            Err(Error::UnknownApi { status: 302 })
        ));
        assert!(matches!(
            classify(response(101)),
            Err(Error::UnknownApi { status: 101 })
        ));
    }

    #[test]
    fn test_classify_server_error() {
        assert!(matches!(
            classify(response(503)),
            Err(Error::Server { status: 503 })
        ));
        assert!(matches!(
            classify(response(500)),
            Err(Error::Server { status: 500 })
        ));
    }

    #[test]
    fn test_classify_client_error_keeps_body() {
        match classify(response(404)) {
            Err(Error::Client { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "oops");
            }
            other => panic!("Expected client error, got {:?}", other),
        }
        assert!(matches!(
            classify(response(499)),
            Err(Error::Client { status: 499, .. })
        ));
    }

    #[test]
    fn test_url_shape() {
        let client = client(200, "");

        assert_eq!(
            client.url(Resource::Track),
            "https://api.segment.io/v1/track"
        );

        let client = client.version("v2").api_host("https://example.com/");
        assert_eq!(client.url(Resource::Batch), "https://example.com/v2/batch");
    }

    #[tokio::test]
    async fn test_track_call() {
        let client = client(200, "");

        client
            .track("u1", "evt", [("revenue", json!(9.99))], false)
            .await
            .unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        let (url, payload) = &calls[0];
        assert_eq!(url, "https://api.segment.io/v1/track");
        assert_eq!(payload["userId"], "u1");
        assert_eq!(payload["event"], "evt");
        assert_eq!(payload["properties"], json!({"revenue": 9.99}));
        assert!(payload.get("anonymousId").is_none());
    }

    #[tokio::test]
    async fn test_identify_anonymous_call() {
        let client = client(200, "");

        client
            .identify("anon_1", [("plan", "pro")], true)
            .await
            .unwrap();

        let calls = client.transport().calls();
        let (url, payload) = &calls[0];
        assert!(url.ends_with("/v1/identify"));
        assert_eq!(payload["anonymousId"], "anon_1");
        assert!(payload.get("userId").is_none());
        assert_eq!(payload["traits"], json!({"plan": "pro"}));
    }

    #[tokio::test]
    async fn test_page_screen_group_alias_paths() {
        let client = client(200, "");

        client.page("u1", "Home", false).await.unwrap();
        client.screen("u1", "Settings", true).await.unwrap();
        client
            .group("u1", "grp_1", [("name", "Acme")], true)
            .await
            .unwrap();
        client.alias("u1", "anon_old").await.unwrap();

        let calls = client.transport().calls();
        let urls: Vec<&str> = calls.iter().map(|(url, _)| url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://api.segment.io/v1/page",
                "https://api.segment.io/v1/screen",
                "https://api.segment.io/v1/group",
                "https://api.segment.io/v1/alias",
            ]
        );
        assert_eq!(calls[0].1["name"], "Home");
        assert_eq!(calls[1].1["anonymousId"], "u1");
        assert_eq!(calls[2].1["groupId"], "grp_1");
        assert_eq!(calls[3].1["previousId"], "anon_old");
        assert_eq!(calls[3].1["userId"], "u1");
    }

    #[tokio::test]
    async fn test_send_overwrites_library_context() {
        let client = client(200, "");
        let identify = Identify::create_identified("u1")
            .with_library_context(json!({"name": "spoofed", "version": "0"}));

        client.send(identify).await.unwrap();

        let calls = client.transport().calls();
        let (_, payload) = &calls[0];
        assert_eq!(
            payload["context"]["library"],
            json!({"name": LIBRARY_NAME, "version": LIBRARY_VERSION})
        );
    }

    #[tokio::test]
    async fn test_batch_call() {
        let client = client(200, "");

        client
            .batch([
                Request::from(Track::create_identified("u1", "evt")),
                Request::from(Identify::create_anonymous("anon")),
            ])
            .await
            .unwrap();

        let calls = client.transport().calls();
        let (url, payload) = &calls[0];
        assert!(url.ends_with("/v1/batch"));
        assert_eq!(payload["batch"][0]["type"], "track");
        assert_eq!(payload["batch"][1]["type"], "identify");
    }

    #[tokio::test]
    async fn test_batch_rejects_nested_batch_without_sending() {
        let client = client(200, "");

        let result = client.batch([Request::from(Batch::new())]).await;

        assert!(matches!(
            result,
            Err(Error::InvalidBatchRequest { kind: "Batch" })
        ));
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_rejects_alias_without_sending() {
        let client = client(200, "");

        let result = client
            .batch([
                Request::from(Track::create_identified("u1", "evt")),
                Request::from(Alias::create_identified("u1", "anon")),
            ])
            .await;

        assert!(matches!(
            result,
            Err(Error::InvalidBatchRequest { kind: "Alias" })
        ));
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_propagates_failures() {
        let client = client(404, "not found");

        let err = client
            .send(Track::create_identified("u1", "evt"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP status 404 not found");
    }

    #[tokio::test]
    async fn test_factory_user_id_reaches_transport() {
        let client = client(200, "");
        let track = Track::create_identified("u1", "evt");
        assert_eq!(track.user_id(), Some("u1"));
        assert_eq!(track.anonymous_id(), None);

        client.send(track).await.unwrap();

        assert_eq!(client.transport().calls()[0].1["userId"], "u1");
    }
}

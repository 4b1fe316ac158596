//! Match types produced by the analyzers and the aggregate result of one run

use crate::syntax::Span;
use serde::{Deserialize, Serialize};

/// Classification of a discovered URL or path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlType {
    /// `https://api.example.com/v1/users` or a bare hostname
    FullUrl,
    /// `/api/v1/users`
    PathOnly,
    /// `./assets/image.png`
    RelativePath,
    /// `api/users`, `/v2/orders`, `/graphql`
    ApiEndpoint,
    /// `static/js/main.js`
    FilePath,
    /// Anything else that passed validation, typically with `EXPR` placeholders
    DynamicUrl,
}

impl UrlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlType::FullUrl => "full-url",
            UrlType::PathOnly => "path-only",
            UrlType::RelativePath => "relative-path",
            UrlType::ApiEndpoint => "api-endpoint",
            UrlType::FilePath => "file-path",
            UrlType::DynamicUrl => "dynamic-url",
        }
    }
}

impl std::fmt::Display for UrlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural details of a URL match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,

    /// Query string without the leading `?`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<String>,

    /// Fragment without the leading `#`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Recognized file extension with leading dot (e.g. `.png`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_api: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_secure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_params: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_fragment: Option<bool>,

    /// Heuristic score in `[0, 1]`
    pub confidence: f64,
}

/// A URL, endpoint or path found in the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMatch {
    pub value: String,
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: UrlType,
    pub metadata: UrlMetadata,
    /// Byte range of the node the value was read from
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphqlType {
    #[serde(rename = "gql-query")]
    Query,
    #[serde(rename = "gql-mutation")]
    Mutation,
    #[serde(rename = "gql-subscription")]
    Subscription,
    #[serde(rename = "gql-schema")]
    Schema,
    #[serde(rename = "gql-other")]
    Other,
}

impl GraphqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphqlType::Query => "gql-query",
            GraphqlType::Mutation => "gql-mutation",
            GraphqlType::Subscription => "gql-subscription",
            GraphqlType::Schema => "gql-schema",
            GraphqlType::Other => "gql-other",
        }
    }
}

impl std::fmt::Display for GraphqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GraphQL operation, fragment or schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlMatch {
    pub value: String,
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: GraphqlType,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomXssType {
    #[serde(rename = "dom-eval")]
    Eval,
    #[serde(rename = "dom-innerHTML")]
    InnerHtml,
    #[serde(rename = "dom-write")]
    Write,
    #[serde(rename = "dom-dangerous-html")]
    DangerousHtml,
    #[serde(rename = "dom-postmessage")]
    PostMessage,
    #[serde(rename = "dom-domain")]
    Domain,
}

impl DomXssType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomXssType::Eval => "dom-eval",
            DomXssType::InnerHtml => "dom-innerHTML",
            DomXssType::Write => "dom-write",
            DomXssType::DangerousHtml => "dom-dangerous-html",
            DomXssType::PostMessage => "dom-postmessage",
            DomXssType::Domain => "dom-domain",
        }
    }
}

impl std::fmt::Display for DomXssType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DOM cross-site-scripting sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomXssMatch {
    /// Source text of the sink expression
    pub value: String,
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: DomXssType,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event-listener")]
    Listener,
    #[serde(rename = "event-onmessage")]
    OnMessage,
    #[serde(rename = "event-onhashchange")]
    OnHashChange,
    #[serde(rename = "event-window-open")]
    WindowOpen,
    #[serde(rename = "event-location")]
    Location,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Listener => "event-listener",
            EventType::OnMessage => "event-onmessage",
            EventType::OnHashChange => "event-onhashchange",
            EventType::WindowOpen => "event-window-open",
            EventType::Location => "event-location",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client-side event or navigation hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMatch {
    pub value: String,
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(skip)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpApiType {
    #[serde(rename = "http-fetch")]
    Fetch,
    #[serde(rename = "http-xhr")]
    Xhr,
    #[serde(rename = "http-axios")]
    Axios,
    #[serde(rename = "http-jquery")]
    Jquery,
    /// `xhr.open("POST", url)`
    #[serde(rename = "http-method")]
    Method,
}

impl HttpApiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpApiType::Fetch => "http-fetch",
            HttpApiType::Xhr => "http-xhr",
            HttpApiType::Axios => "http-axios",
            HttpApiType::Jquery => "http-jquery",
            HttpApiType::Method => "http-method",
        }
    }
}

impl std::fmt::Display for HttpApiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP client call site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpApiMatch {
    pub value: String,
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: HttpApiType,

    /// Upper-case HTTP method when statically known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Request URL when passed as a literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Keys of the options/config object literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(skip)]
    pub span: Span,
}

/// Everything one analysis run found, grouped by category in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub urls: Vec<UrlMatch>,
    pub graphql: Vec<GraphqlMatch>,
    pub domxss: Vec<DomXssMatch>,
    pub events: Vec<EventMatch>,
    pub httpapi: Vec<HttpApiMatch>,
}

impl AnalyzerResult {
    /// Total number of matches across all categories
    pub fn total(&self) -> usize {
        self.urls.len()
            + self.graphql.len()
            + self.domxss.len()
            + self.events.len()
            + self.httpapi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

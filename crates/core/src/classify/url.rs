//! URL/path candidate validation and classification
//!
//! A candidate first has to pass [`UrlClassifier::is_valid_candidate`], a
//! cheap structural gate that rejects prose, code fragments and random
//! tokens. Accepted strings are then classified (first matching rule wins)
//! and scored: a base confidence per type plus additive bonuses, clamped
//! to 1.0.

use crate::config::{AnalysisConfig, HeuristicsConfig, JshunterConfig};
use crate::finding::{UrlMetadata, UrlType};
use crate::resolver::PLACEHOLDER;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// Base used to parse paths that are not absolute URLs
const DUMMY_BASE: &str = "https://example.com";
const DUMMY_HOST: &str = "example.com";

/// Characters that never appear in a URL literal worth reporting
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '(', ')', '!', '<', '>', '\'', '"', '{', '}', '^', '$', ',',
];

/// Known false-positive hosts (standards bodies, documentation domains and placeholders)
const EXCLUDED_HOSTNAMES: &[&str] = &["www.w3.org", "reactjs.org", "example.com", "localhost"];

const FULL_URL_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

const FILE_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".json", ".html", ".css", ".scss", ".less", ".png", ".jpg",
    ".jpeg", ".gif", ".svg", ".ico", ".webp", ".avif", ".mp3", ".mp4", ".wav", ".ogg", ".webm",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".tar", ".gz", ".rar",
    ".md", ".txt", ".csv", ".xml", ".yaml", ".yml", ".env", ".log",
];

const MIME_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "text/html",
    "text/css",
    "text/javascript",
    "text/plain",
    "image/png",
    "image/jpeg",
    "image/svg+xml",
    "image/webp",
    "audio/mpeg",
    "video/mp4",
    "video/webm",
    "application/pdf",
    "application/zip",
    "application/octet-stream",
];

/// Object keys that conventionally hold a URL
pub const URL_PROPERTY_NAMES: &[&str] = &[
    "url", "endpoint", "baseURL", "href", "src", "action", "api", "path", "route", "link", "uri",
    "host", "domain",
];

/// Function names whose first argument is usually a request URL
pub const HTTP_CALL_NAMES: &[&str] = &[
    "fetch", "axios", "request", "get", "post", "put", "delete", "patch",
];

fn api_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)/api/",
            r"(?i)^api/",
            r"(?i)/v\d+/",
            r"(?i)/rest/",
            r"(?i)/graphql",
            r"(?i)/webhook",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.([a-zA-Z0-9]+)(?:\?|#|$)").unwrap())
}

fn common_word_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"^[a-zA-Z]$",
            r"^\d+$",
            r"^/+$",
            r"^\.+$",
            r"(?i)^(true|false|null|undefined)$",
            r"(?i)^(function|class|const|let|var|if|else|for|while|return)$",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn bare_dot_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.\.?/?$").unwrap())
}

/// How a candidate string was reached, for the context bonuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySite {
    /// Literal, template, concatenation, assignment or declarator
    Plain,
    /// Value of an object property with a URL-ish key
    UrlProperty,
    /// First argument of `fetch(...)`, `get(...)`, ...
    HttpCallArgument,
}

/// Result of classifying an accepted candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: UrlType,
    pub metadata: UrlMetadata,
}

/// Shannon entropy in bits per character: `-Σ p·log2(p)`
pub fn shannon_entropy(value: &str) -> f64 {
    let mut freq: HashMap<char, usize> = HashMap::new();
    let mut len = 0usize;
    for c in value.chars() {
        *freq.entry(c).or_insert(0) += 1;
        len += 1;
    }
    if len == 0 {
        return 0.0;
    }

    let len = len as f64;
    freq.values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Recognized file extension (lower-cased, with dot) at the end of the path
pub fn file_extension(value: &str) -> Option<String> {
    let caps = extension_regex().captures(value)?;
    let ext = format!(".{}", caps.get(1)?.as_str().to_lowercase());
    if FILE_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

pub fn is_api_endpoint(value: &str) -> bool {
    api_patterns().iter().any(|re| re.is_match(value))
}

fn contains_mime_type(value: &str) -> bool {
    MIME_TYPES.iter().any(|mime| value.contains(mime))
}

fn is_excluded_host(host: &str) -> bool {
    EXCLUDED_HOSTNAMES.contains(&host)
}

/// Parse an absolute URL, treating `//host/...` as `https://host/...`
fn parse_absolute(value: &str) -> Option<Url> {
    if let Some(rest) = value.strip_prefix("//") {
        Url::parse(&format!("https://{}", rest)).ok()
    } else {
        Url::parse(value).ok()
    }
}

pub fn is_full_url(value: &str) -> bool {
    let Some(url) = parse_absolute(value) else {
        return false;
    };
    if !FULL_URL_SCHEMES.contains(&url.scheme()) {
        return false;
    }
    match url.host_str() {
        Some(host) => host.len() >= 2 && !is_excluded_host(host),
        None => false,
    }
}

/// `cdn.example.org`: has a dot, no slash, 2-4 character TLD
pub fn is_hostname_only(value: &str) -> bool {
    if !value.contains('.') || value.contains('/') {
        return false;
    }
    let Ok(url) = Url::parse(&format!("https://{}", value)) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    if host.len() < 4 || is_excluded_host(host) {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let tld_len = labels.last().map(|tld| tld.len()).unwrap_or(0);
    (2..=4).contains(&tld_len)
}

pub fn is_path_only(value: &str) -> bool {
    value.starts_with('/') && value.split('/').any(|segment| segment.len() > 2)
}

pub fn is_relative_path(value: &str) -> bool {
    let rest = value
        .strip_prefix("./")
        .or_else(|| value.strip_prefix("../"));
    match rest {
        Some(rest) => rest.chars().count() >= 2,
        None => false,
    }
}

pub fn is_file_path(value: &str) -> bool {
    file_extension(value).is_some() && value.contains('/')
}

/// Validator and classifier configured from [`JshunterConfig`]
#[derive(Debug, Clone, Copy)]
pub struct UrlClassifier<'c> {
    analysis: &'c AnalysisConfig,
    heuristics: &'c HeuristicsConfig,
}

impl<'c> UrlClassifier<'c> {
    pub fn new(config: &'c JshunterConfig) -> Self {
        Self {
            analysis: &config.analysis,
            heuristics: &config.heuristics,
        }
    }

    /// Cheap structural gate every candidate must pass
    pub fn is_valid_candidate(&self, value: &str) -> bool {
        let len = value.chars().count();
        if len < self.analysis.min_path_length || len > self.analysis.max_path_length {
            return false;
        }

        // `./` and `../` are let through so relative paths can be classified
        let leading_ok = value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
            || value.starts_with("./")
            || value.starts_with("../");
        if !leading_ok {
            return false;
        }

        if !value.chars().any(|c| c.is_ascii_alphabetic()) {
            return false;
        }

        if value.contains(FORBIDDEN_CHARS) {
            return false;
        }

        if shannon_entropy(value) >= self.heuristics.entropy_threshold {
            return false;
        }

        if !value.contains('/') {
            return false;
        }

        if bare_dot_path_regex().is_match(value) {
            return false;
        }

        let segments: Vec<&str> = value.split('/').filter(|s| !s.is_empty()).collect();
        if !segments.iter().any(|s| s.chars().count() >= 3) {
            return false;
        }
        if segments.iter().all(|s| s.starts_with(PLACEHOLDER)) {
            return false;
        }

        if self.analysis.exclude_common_words
            && common_word_patterns().iter().any(|re| re.is_match(value))
        {
            return false;
        }

        true
    }

    /// Assign a type and confidence; callers must have validated `value` first
    pub fn classify(&self, value: &str, site: DiscoverySite) -> Classification {
        let h = self.heuristics;

        let (kind, base) = if is_full_url(value) {
            (UrlType::FullUrl, 0.9)
        } else if is_hostname_only(value) {
            (UrlType::FullUrl, 0.8)
        } else if is_api_endpoint(value) {
            (UrlType::ApiEndpoint, 0.8)
        } else if is_path_only(value) {
            (UrlType::PathOnly, 0.7)
        } else if is_file_path(value) {
            (UrlType::FilePath, 0.7)
        } else if is_relative_path(value) {
            (UrlType::RelativePath, 0.6)
        } else {
            (UrlType::DynamicUrl, 0.5)
        };

        let mut metadata = self.metadata(value);
        let is_api = metadata.is_api == Some(true);

        let mut confidence: f64 = base;
        if is_api {
            confidence += h.api_bonus;
        }
        if metadata.extension.is_some() {
            confidence += h.extension_bonus;
        }
        if metadata.has_params == Some(true) {
            confidence += h.query_bonus;
        }
        if contains_mime_type(value) {
            confidence += h.mime_bonus;
        }
        match site {
            DiscoverySite::UrlProperty => confidence += h.property_bonus,
            DiscoverySite::HttpCallArgument => confidence += h.http_call_bonus,
            DiscoverySite::Plain => {}
        }
        metadata.confidence = confidence.clamp(0.0, 1.0);

        Classification { kind, metadata }
    }

    /// Structural details; a value that does not parse keeps only `pathname`
    fn metadata(&self, value: &str) -> UrlMetadata {
        let parsed = if is_full_url(value) {
            parse_absolute(value)
        } else if is_hostname_only(value) {
            Url::parse(&format!("https://{}", value)).ok()
        } else {
            Url::parse(DUMMY_BASE)
                .ok()
                .and_then(|base| base.join(value).ok())
        };

        let mut metadata = match parsed {
            Some(url) => UrlMetadata {
                hostname: url
                    .host_str()
                    .filter(|host| *host != DUMMY_HOST)
                    .map(str::to_string),
                port: url.port().map(|p| p.to_string()),
                pathname: Some(url.path())
                    .filter(|path| *path != "/" && !path.is_empty())
                    .map(str::to_string),
                query_params: url
                    .query()
                    .filter(|q| !q.is_empty())
                    .map(str::to_string),
                hash: url
                    .fragment()
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
                is_secure: Some(url.scheme() == "https"),
                has_params: Some(url.query().is_some_and(|q| !q.is_empty())),
                has_fragment: Some(url.fragment().is_some_and(|f| !f.is_empty())),
                ..UrlMetadata::default()
            },
            None => UrlMetadata {
                pathname: Some(value.to_string()),
                ..UrlMetadata::default()
            },
        };

        metadata.is_api = Some(is_api_endpoint(value));
        if self.analysis.include_file_extensions {
            metadata.extension = file_extension(value);
        }
        metadata
    }
}

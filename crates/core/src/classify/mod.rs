//! String heuristics shared by the analyzers: URL/path scoring and GraphQL validation

pub mod graphql;
pub mod url;

pub use self::graphql::GraphqlValidator;
pub use self::url::{Classification, DiscoverySite, UrlClassifier};

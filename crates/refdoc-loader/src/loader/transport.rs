//! Fetching raw document content from disk and over HTTP
//!
//! Requests to private GitHub repositories are authenticated with personal
//! access tokens taken from a credential table (`GITHUB_PRIVATE_REPOS`).
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::location::Location;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable holding the private repository credential table
pub const PRIVATE_REPOS_ENV: &str = "GITHUB_PRIVATE_REPOS";

static GITHUB_URL_REGEX: OnceLock<Regex> = OnceLock::new();
static CREDENTIAL_REGEX: OnceLock<Regex> = OnceLock::new();

fn github_url_regex() -> &'static Regex {
    GITHUB_URL_REGEX.get_or_init(|| {
        Regex::new(
            r"^https://(?P<hostname>github\.com|raw\.githubusercontent\.com|api\.github\.com)/(?P<org>[^/]*)/(?P<repo>[^/?#]*)(?P<predicate>.*)$",
        )
        .expect("valid GitHub URL pattern")
    })
}

fn credential_regex() -> &'static Regex {
    CREDENTIAL_REGEX
        .get_or_init(|| Regex::new(r"^(?P<org>[^/]*)/(?P<repos>[^:]*):(?P<token>.*)$").expect("valid credential pattern"))
}

/// Source of raw document text
///
/// Implementations block until the whole document is available. The loader
/// performs no retries; any failure ends the load.
pub trait Transport: Send + Sync {
    /// Fetch the complete content at `location`
    fn fetch(&self, location: &Location) -> LoaderResult<String>;
}

/// Personal access token for a set of repositories in one organization
#[derive(Clone)]
pub struct RepoCredential {
    pub org: String,
    pub repos: Vec<String>,
    token: String,
}

impl RepoCredential {
    pub fn new(org: impl Into<String>, repos: Vec<String>, token: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repos,
            token: token.into(),
        }
    }

    fn covers(&self, org: &str, repo: &str) -> bool {
        self.org == org && self.repos.iter().any(|r| r == repo)
    }
}

impl fmt::Debug for RepoCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoCredential")
            .field("org", &self.org)
            .field("repos", &self.repos)
            .field("token", &redact_token(&self.token))
            .finish()
    }
}

/// Show the first 3 chars of long tokens, otherwise fully redact
fn redact_token(token: &str) -> String {
    if token.chars().count() > 8 {
        format!("{}***", token.chars().take(3).collect::<String>())
    } else {
        "[REDACTED]".to_string()
    }
}

/// Operator-supplied table of (org, repos, token) entries
#[derive(Debug, Clone, Default)]
pub struct PrivateRepoCredentials {
    entries: Vec<RepoCredential>,
}

impl PrivateRepoCredentials {
    pub fn new(entries: Vec<RepoCredential>) -> Self {
        Self { entries }
    }

    /// Parse `ORG/REPO1,REPO2:TOKEN;ORG2/REPO3:TOKEN2`
    pub fn parse(table: &str) -> LoaderResult<Self> {
        let mut entries = Vec::new();
        for element in table.split(';') {
            let captures = credential_regex()
                .captures(element)
                .ok_or_else(|| LoaderError::invalid_credentials(PRIVATE_REPOS_ENV, element))?;
            entries.push(RepoCredential::new(
                &captures["org"],
                captures["repos"].split(',').map(str::to_string).collect(),
                &captures["token"],
            ));
        }
        Ok(Self { entries })
    }

    /// Read the table from `GITHUB_PRIVATE_REPOS`; unset or empty means no credentials
    pub fn from_env() -> LoaderResult<Self> {
        match std::env::var(PRIVATE_REPOS_ENV) {
            Ok(table) if !table.is_empty() => Self::parse(&table),
            _ => Ok(Self::default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `Authorization` header value for `url`, when it belongs to a listed private repo
    pub fn authorization_for(&self, url: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let captures = github_url_regex().captures(url)?;
        if &captures["hostname"] == "github.com" {
            tracing::warn!(
                url,
                "URL references the main GitHub UI; did you mean to specify a reference to the corresponding content on raw.githubusercontent.com?"
            );
        }
        let credential = self
            .entries
            .iter()
            .find(|c| c.covers(&captures["org"], &captures["repo"]))?;
        Some(format!("Basic {}", STANDARD.encode(credential.token.as_bytes())))
    }
}

/// Configuration for the default transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Private repository tokens
    pub credentials: PrivateRepoCredentials,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            credentials: PrivateRepoCredentials::default(),
        }
    }
}

/// Reads local files with `std::fs` and URLs with a blocking HTTP client
pub struct HttpTransport {
    client: Client,
    credentials: PrivateRepoCredentials,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> LoaderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LoaderError::transport_failure("<client>", None, format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            credentials: config.credentials,
        })
    }

    fn fetch_url(&self, url: &str) -> LoaderResult<String> {
        let mut request = self.client.get(url);
        if let Some(authorization) = self.credentials.authorization_for(url) {
            tracing::debug!(url, "attaching private repository credentials");
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .map_err(|e| LoaderError::transport_failure(url, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::transport_failure(
                url,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        response
            .text()
            .map_err(|e| LoaderError::transport_failure(url, Some(status.as_u16()), e.to_string()))
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, location: &Location) -> LoaderResult<String> {
        tracing::debug!(%location, "fetching document");
        match location {
            Location::File(path) => {
                std::fs::read_to_string(path).map_err(|e| LoaderError::io_error(path.clone(), e))
            }
            Location::Url(url) => self.fetch_url(url.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_credential_table() {
        let table = PrivateRepoCredentials::parse("acme/specs,configs:ghp_abcdefghijkl;other/x:tok").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries[0].org, "acme");
        assert_eq!(table.entries[0].repos, vec!["specs", "configs"]);
        assert_eq!(table.entries[1].repos, vec!["x"]);
    }

    #[test]
    fn test_malformed_credential_table() {
        match PrivateRepoCredentials::parse("acme/specs:tok;missing-separator") {
            Err(LoaderError::InvalidCredentials { variable, element }) => {
                assert_eq!(variable, PRIVATE_REPOS_ENV);
                assert_eq!(element, "missing-separator");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_authorization_header() {
        let table = PrivateRepoCredentials::parse("acme/specs:secret").unwrap();
        // base64("secret") == "c2VjcmV0"
        assert_eq!(
            table.authorization_for("https://raw.githubusercontent.com/acme/specs/main/a.yaml"),
            Some("Basic c2VjcmV0".to_string())
        );
        assert_eq!(
            table.authorization_for("https://api.github.com/acme/specs?ref=main"),
            Some("Basic c2VjcmV0".to_string())
        );
        assert_eq!(
            table.authorization_for("https://raw.githubusercontent.com/acme/public/main/a.yaml"),
            None
        );
        assert_eq!(
            table.authorization_for("https://raw.githubusercontent.com/other/specs/main/a.yaml"),
            None
        );
        assert_eq!(table.authorization_for("https://example.com/acme/specs/a.yaml"), None);
        assert_eq!(
            PrivateRepoCredentials::default()
                .authorization_for("https://raw.githubusercontent.com/acme/specs/main/a.yaml"),
            None
        );
    }

    #[test]
    fn test_tokens_are_redacted_in_debug() {
        let table = PrivateRepoCredentials::parse("acme/specs:ghp_1234567890abcdef;b/c:short").unwrap();
        let debug = format!("{table:?}");
        assert!(debug.contains("ghp***"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("1234567890abcdef"));
        assert!(!debug.contains("short"));
    }

    #[test]
    fn test_multibyte_tokens_are_redacted_by_char() {
        let table = PrivateRepoCredentials::parse("acme/specs:øøøtoken_ßecret;b/c:ééééé").unwrap();
        let debug = format!("{table:?}");
        assert!(debug.contains("øøø***"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("ßecret"));
        assert!(!debug.contains("ééééé"));
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "{\"a\": 1}").unwrap();

        let transport = HttpTransport::new(TransportConfig::default()).unwrap();
        assert_eq!(transport.fetch(&Location::File(path)).unwrap(), "{\"a\": 1}");

        let missing = Location::File(dir.path().join("missing.json"));
        assert!(matches!(
            transport.fetch(&missing),
            Err(LoaderError::IoError { .. })
        ));
    }
}

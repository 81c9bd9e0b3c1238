//! URL acceptance checks.
//!
//! A submitted URL must parse as an absolute `http`/`https` URL and its host
//! must resolve. Resolution is only a cheap signal that the host exists; it
//! says nothing about whether the site is up.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use url::{Host, Url};

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed url")]
    MalformedUrl,
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("host '{0}' does not resolve")]
    UnresolvableHost(String),
}

/// A URL that passed validation, kept exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Name lookup used to check that a hostname exists.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, hostname: &str) -> io::Result<Vec<SocketAddr>>;
}

/// Resolves through the system resolver without blocking the runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, hostname: &str) -> io::Result<Vec<SocketAddr>> {
        let addrs = tokio::net::lookup_host((hostname, 0)).await?;
        Ok(addrs.collect())
    }
}

#[derive(Clone)]
pub struct Validator {
    resolver: Arc<dyn HostResolver>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(DnsResolver))
    }
}

impl Validator {
    pub fn new(resolver: Arc<dyn HostResolver>) -> Self {
        Self { resolver }
    }

    pub async fn validate(&self, candidate: &str) -> Result<NormalizedUrl, ValidationError> {
        // The parser silently drops tabs, newlines and surrounding blanks, but
        // the candidate is stored verbatim and later sent as a Location header.
        if candidate.trim() != candidate || candidate.chars().any(char::is_control) {
            return Err(ValidationError::MalformedUrl);
        }

        let parsed = Url::parse(candidate).map_err(|_| ValidationError::MalformedUrl)?;

        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(ValidationError::UnsupportedScheme(
                parsed.scheme().to_string(),
            ));
        }

        match parsed.host() {
            None => return Err(ValidationError::MalformedUrl),
            // Literal addresses need no lookup.
            Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
            Some(Host::Domain(domain)) => {
                let hostname = lookup_name(domain);
                match self.resolver.resolve(hostname).await {
                    Ok(addrs) if !addrs.is_empty() => {}
                    Ok(_) => {
                        tracing::debug!(hostname, "lookup returned no addresses");
                        return Err(ValidationError::UnresolvableHost(hostname.to_string()));
                    }
                    Err(err) => {
                        tracing::debug!(hostname, error = %err, "lookup failed");
                        return Err(ValidationError::UnresolvableHost(hostname.to_string()));
                    }
                }
            }
        }

        Ok(NormalizedUrl(candidate.to_string()))
    }
}

/// Hostname used for the lookup: a single leading `www.` label is dropped.
fn lookup_name(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Resolves only the names it was given and records every lookup.
    #[derive(Default)]
    struct StubResolver {
        known: HashSet<String>,
        lookups: Mutex<Vec<String>>,
    }

    impl StubResolver {
        fn with_hosts(hosts: &[&str]) -> Self {
            Self {
                known: hosts.iter().map(|h| h.to_string()).collect(),
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HostResolver for StubResolver {
        async fn resolve(&self, hostname: &str) -> io::Result<Vec<SocketAddr>> {
            self.lookups.lock().unwrap().push(hostname.to_string());
            if self.known.contains(hostname) {
                Ok(vec![SocketAddr::from(([93, 184, 216, 34], 0))])
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such host"))
            }
        }
    }

    fn validator(hosts: &[&str]) -> (Validator, Arc<StubResolver>) {
        let resolver = Arc::new(StubResolver::with_hosts(hosts));
        (Validator::new(resolver.clone()), resolver)
    }

    #[tokio::test]
    async fn test_accepts_http_and_https() {
        let (validator, _) = validator(&["example.com"]);

        let http = validator.validate("http://example.com").await.unwrap();
        assert_eq!(http.as_str(), "http://example.com");

        let https = validator
            .validate("https://example.com/path?q=1#frag")
            .await
            .unwrap();
        assert_eq!(https.into_inner(), "https://example.com/path?q=1#frag");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_scheme() {
        let (validator, resolver) = validator(&["example.com"]);

        assert_eq!(
            validator.validate("ftp://example.com").await,
            Err(ValidationError::UnsupportedScheme("ftp".to_string()))
        );
        assert!(resolver.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_malformed() {
        let (validator, _) = validator(&["example.com"]);

        for candidate in ["not a url", "", "example.com", "http://", "/relative/path"] {
            assert_eq!(
                validator.validate(candidate).await,
                Err(ValidationError::MalformedUrl),
                "{candidate:?} should be malformed"
            );
        }
    }

    #[tokio::test]
    async fn test_rejects_control_characters_and_padding() {
        let (validator, resolver) = validator(&["example.com"]);

        for candidate in [
            "https://example.com/a\nb",
            "https://exa\tmple.com/",
            "https://example.com/\r\n",
            "https://example.com/\u{7f}",
            " https://example.com",
            "https://example.com\t",
        ] {
            assert_eq!(
                validator.validate(candidate).await,
                Err(ValidationError::MalformedUrl),
                "{candidate:?} should be malformed"
            );
        }
        assert!(resolver.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accepts_non_ascii_path() {
        let (validator, _) = validator(&["example.com"]);

        assert!(validator.validate("https://example.com/caf\u{e9}").await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_unresolvable_host() {
        let (validator, _) = validator(&["example.com"]);

        assert_eq!(
            validator
                .validate("http://thisdomaindoesnotexist.invalidtld")
                .await,
            Err(ValidationError::UnresolvableHost(
                "thisdomaindoesnotexist.invalidtld".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_strips_www_for_lookup_only() {
        let (validator, resolver) = validator(&["example.com"]);

        let url = validator
            .validate("https://www.example.com/docs")
            .await
            .unwrap();

        assert_eq!(url.as_str(), "https://www.example.com/docs");
        assert_eq!(*resolver.lookups.lock().unwrap(), vec!["example.com"]);
    }

    #[tokio::test]
    async fn test_ip_literals_skip_lookup() {
        let (validator, resolver) = validator(&[]);

        assert!(validator.validate("http://127.0.0.1:8080/x").await.is_ok());
        assert!(validator.validate("http://[::1]/").await.is_ok());
        assert!(resolver.lookups.lock().unwrap().is_empty());
    }

    #[test]
    fn test_lookup_name() {
        assert_eq!(lookup_name("www.example.com"), "example.com");
        assert_eq!(lookup_name("www.www.example.com"), "www.example.com");
        assert_eq!(lookup_name("wwwexample.com"), "wwwexample.com");
        assert_eq!(lookup_name("example.com"), "example.com");
    }
}

//! Resolution of parsed identifiers against a record store.

use std::sync::Arc;

use crate::ark::identifier::ArkIdentifier;
use crate::store::record::{ARKPID_PLACEHOLDER, PID_PLACEHOLDER};
use crate::store::{AuthorityRecord, Placeholder, RecordStore, StoreError};

/// Info markers accepted when none are configured.
pub const DEFAULT_INFO_MARKERS: [&str; 4] = ["?info", "??", "?", "?%3F"];

/// Successful outcome of resolving an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Send the client to this URL.
    Redirect(String),
    /// Return the authority record itself.
    Info(AuthorityRecord),
}

impl Resolution {
    /// Short label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Redirect(_) => "redirect",
            Resolution::Info(_) => "info",
        }
    }
}

/// Errors that end a resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("NAAN {0} not found")]
    UnknownNaan(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolveError::UnknownNaan(_) => "unknown_naan",
            ResolveError::Store(_) => "store_error",
        }
    }
}

/// Maps identifiers to redirects or info payloads.
#[derive(Debug, Clone)]
pub struct Resolver {
    store: Arc<dyn RecordStore>,
    info_markers: Vec<String>,
}

impl Resolver {
    /// Create a resolver using the default info markers.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_info_markers(store, DEFAULT_INFO_MARKERS.iter().map(|m| m.to_string()).collect())
    }

    pub fn with_info_markers(store: Arc<dyn RecordStore>, info_markers: Vec<String>) -> Self {
        Self { store, info_markers }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn info_markers(&self) -> &[String] {
        &self.info_markers
    }

    /// Look up the identifier's NAAN and decide between info and redirect.
    pub async fn resolve(&self, id: &ArkIdentifier) -> Result<Resolution, ResolveError> {
        let record = self
            .store
            .get(id.naan())
            .await?
            .ok_or_else(|| ResolveError::UnknownNaan(id.naan().to_string()))?;

        if id.is_info_request(self.info_markers.as_slice()) {
            return Ok(Resolution::Info(record));
        }

        Ok(Resolution::Redirect(redirect_target(&record, id)))
    }
}

/// Substitute the identifier into the record's target template.
pub fn redirect_target(record: &AuthorityRecord, id: &ArkIdentifier) -> String {
    match record.placeholder() {
        Placeholder::Pid => record.target.replace(PID_PLACEHOLDER, &id.normalized_pid()),
        Placeholder::ArkPid => record.target.replace(ARKPID_PLACEHOLDER, &id.arkpid()),
        Placeholder::None => record.target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;

    fn resolver(records: Vec<AuthorityRecord>) -> Resolver {
        let store = MemoryRecordStore::from_records(records).unwrap();
        Resolver::new(Arc::new(store))
    }

    fn id(s: &str) -> ArkIdentifier {
        ArkIdentifier::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_pid_substitution() {
        let r = resolver(vec![AuthorityRecord::new("12345", "https://example.org/$pid")]);
        let res = r.resolve(&id("ark:/12345/abc")).await.unwrap();
        assert_eq!(res, Resolution::Redirect("https://example.org/ark:/12345/abc".into()));

        let res = r.resolve(&id("ark:12345/abc")).await.unwrap();
        assert_eq!(res, Resolution::Redirect("https://example.org/ark:/12345/abc".into()));
    }

    #[tokio::test]
    async fn test_arkpid_substitution() {
        let r = resolver(vec![AuthorityRecord::new("12345", "https://example.org/$arkpid")]);
        let res = r.resolve(&id("ark:/12345/abc")).await.unwrap();
        assert_eq!(res, Resolution::Redirect("https://example.org/ark:/12345/abc".into()));

        let res = r.resolve(&id("12345/abc?x=1")).await.unwrap();
        assert_eq!(res, Resolution::Redirect("https://example.org/ark:/12345/abc?x=1".into()));
    }

    #[tokio::test]
    async fn test_every_occurrence_replaced() {
        let r = resolver(vec![AuthorityRecord::new("12345", "https://e.org/$arkpid?id=$arkpid")]);
        let res = r.resolve(&id("12345/a")).await.unwrap();
        assert_eq!(
            res,
            Resolution::Redirect("https://e.org/ark:/12345/a?id=ark:/12345/a".into())
        );
    }

    #[tokio::test]
    async fn test_target_without_placeholder() {
        let r = resolver(vec![AuthorityRecord::new("12345", "https://example.org/landing")]);
        let res = r.resolve(&id("ark:/12345/abc")).await.unwrap();
        assert_eq!(res, Resolution::Redirect("https://example.org/landing".into()));
    }

    #[tokio::test]
    async fn test_info_returns_record() {
        let mut record = AuthorityRecord::new("12345", "https://example.org/$pid");
        record.who = Some("Example".into());
        let r = resolver(vec![record.clone()]);

        let res = r.resolve(&id("ark:/12345?info")).await.unwrap();
        assert_eq!(res, Resolution::Info(record));
        assert_eq!(res.outcome(), "info");
    }

    #[tokio::test]
    async fn test_info_marker_ignored_with_remainder() {
        let r = resolver(vec![AuthorityRecord::new("12345", "https://example.org/$pid")]);
        let res = r.resolve(&id("ark:/12345/abc?info")).await.unwrap();
        assert_eq!(res, Resolution::Redirect("https://example.org/ark:/12345/abc?info".into()));
    }

    #[tokio::test]
    async fn test_custom_markers() {
        let store = MemoryRecordStore::from_records([AuthorityRecord::new("12345", "https://e.org/$pid")]).unwrap();
        let r = Resolver::with_info_markers(Arc::new(store), vec!["?info".into()]);
        assert!(matches!(r.resolve(&id("12345?info")).await, Ok(Resolution::Info(_))));
        assert!(matches!(r.resolve(&id("12345??")).await, Ok(Resolution::Redirect(_))));
    }

    #[tokio::test]
    async fn test_unknown_naan() {
        let r = resolver(vec![]);
        let err = r.resolve(&id("ark:/99999/abc")).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnknownNaan(ref n) if n == "99999"));
        assert!(err.to_string().contains("99999"));
        assert_eq!(err.outcome(), "unknown_naan");
    }
}

//! Authority record definition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder replaced with the normalized `ark:/NAAN/remainder` form.
pub const PID_PLACEHOLDER: &str = "$pid";

/// Placeholder replaced with the verbatim `ark:`-prefixed request identifier.
pub const ARKPID_PLACEHOLDER: &str = "$arkpid";

/// Metadata registered for one NAAN.
///
/// Fields other than the ones named here are kept in `extra` so that the
/// info payload can be returned exactly as stored. Only `target` is
/// required; the descriptive fields accept any JSON value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthorityRecord {
    /// Name Assigning Authority Number this record belongs to. Empty when
    /// the stored record omits it; file stores key records by file name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub naan: String,

    /// Redirect template, optionally containing `$pid` or `$arkpid`.
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what: Option<Value>,

    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which substitution a record's target asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Pid,
    ArkPid,
    None,
}

impl AuthorityRecord {
    /// Create a record with only a NAAN and target.
    pub fn new(naan: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            naan: naan.into(),
            target: target.into(),
            who: None,
            what: None,
            where_: None,
            when: None,
            extra: Map::new(),
        }
    }

    /// The placeholder kind present in `target`.
    ///
    /// `$pid` takes precedence; records carrying both are rejected by
    /// [`AuthorityRecord::check`].
    pub fn placeholder(&self) -> Placeholder {
        if self.target.contains(PID_PLACEHOLDER) {
            Placeholder::Pid
        } else if self.target.contains(ARKPID_PLACEHOLDER) {
            Placeholder::ArkPid
        } else {
            Placeholder::None
        }
    }

    /// Verify the record invariants. Returns a description of the first violation.
    pub fn check(&self) -> Result<(), String> {
        if self.target.is_empty() {
            return Err("target is empty".to_string());
        }
        if self.target.contains(PID_PLACEHOLDER) && self.target.contains(ARKPID_PLACEHOLDER) {
            return Err(format!(
                "target {:?} contains both {} and {}",
                self.target, PID_PLACEHOLDER, ARKPID_PLACEHOLDER
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_fields_round_trip() {
        let raw = r#"{
            "naan": "12345",
            "target": "https://example.org/$arkpid",
            "who": "Example Org",
            "where": "https://example.org",
            "alternate": "https://mirror.example.org",
            "na_policy": {"what": "x"}
        }"#;
        let record: AuthorityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.where_, Some(Value::from("https://example.org")));
        assert!(record.what.is_none());
        assert_eq!(record.extra.len(), 2);

        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), original);
    }

    #[test]
    fn test_structured_fields_and_missing_naan() {
        let raw = r#"{
            "target": "https://example.org/$pid",
            "who": {"name": "Example Org", "acronym": "EO"},
            "what": ["archive", "library"],
            "when": 2001
        }"#;
        let record: AuthorityRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.naan, "");
        assert_eq!(record.who.as_ref().unwrap()["acronym"], "EO");
        assert_eq!(record.when, Some(Value::from(2001)));
        assert!(record.check().is_ok());

        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), original);
    }

    #[test]
    fn test_placeholder_detection() {
        assert_eq!(AuthorityRecord::new("12345", "https://x/$pid").placeholder(), Placeholder::Pid);
        assert_eq!(AuthorityRecord::new("12345", "https://x/$arkpid").placeholder(), Placeholder::ArkPid);
        assert_eq!(AuthorityRecord::new("12345", "https://x/").placeholder(), Placeholder::None);
    }

    #[test]
    fn test_check_rejects_both_placeholders() {
        assert!(AuthorityRecord::new("12345", "https://x/$pid?a=$arkpid").check().is_err());
        assert!(AuthorityRecord::new("12345", "").check().is_err());
        assert!(AuthorityRecord::new("12345", "https://x/$arkpid").check().is_ok());
    }
}

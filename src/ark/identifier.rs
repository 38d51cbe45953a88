//! ARK identifier parsing.
//!
//! # Grammar
//! ```text
//! identifier := prefix? naan ( "/" remainder )?
//! prefix     := "ark:/" | "ark:"            (case-insensitive)
//! naan       := DIGIT{4,64}
//! remainder  := any text up to the query
//! ```
//!
//! # Design Decisions
//! - The grammar runs on the percent-decoded path, so `ark%3A/12345` and
//!   `ark:/12345` are the same identifier
//! - `arkpid` and `pid` are cut from the target as received; the NAAN
//!   start is mapped back through any escapes in the prefix
//! - The query string is excluded from the grammar but kept verbatim in
//!   `arkpid` and `pid`
//! - No regex; matching is linear in the input length

use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Canonical scheme prefix of an ARK.
pub const ARK_SCHEME: &str = "ark:/";

/// Minimum number of digits in a NAAN.
pub const NAAN_MIN_DIGITS: usize = 4;

/// Maximum number of digits in a NAAN.
pub const NAAN_MAX_DIGITS: usize = 64;

/// Why a request target is not an ARK.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Nothing left after stripping leading slashes and spaces.
    #[error("empty identifier")]
    Empty,

    /// The path does not match the ARK grammar.
    #[error("not an ARK identifier: {0}")]
    NotAnArk(String),
}

/// An ARK identifier extracted from a raw request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkIdentifier {
    /// The stripped target, path and query, as received.
    raw: String,
    /// Length of the path portion of `raw`.
    raw_path_len: usize,
    /// Offset of the first NAAN byte in `raw`.
    raw_naan_start: usize,
    /// The stripped path, percent-decoded.
    path: String,
    has_prefix: bool,
    naan: String,
    remainder: String,
}

impl ArkIdentifier {
    /// Parse a raw request target such as `ark:/12345/x7?info`.
    ///
    /// Leading `/` and space characters are ignored, escaped or not.
    /// Everything from the first literal `?` on is treated as query and
    /// does not take part in matching.
    pub fn parse(target: &str) -> Result<Self, ParseError> {
        let Target { raw, raw_path_len, path } = split_target(target);
        if path.is_empty() {
            return Err(ParseError::Empty);
        }
        let not_an_ark = || ParseError::NotAnArk(String::from_utf8_lossy(&path).into_owned());

        let prefix_len = prefix_len(&path);
        let digits = path[prefix_len..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if !(NAAN_MIN_DIGITS..=NAAN_MAX_DIGITS).contains(&digits) {
            return Err(not_an_ark());
        }

        let naan_end = prefix_len + digits;
        let remainder: &[u8] = match path.get(naan_end).copied() {
            None => &[],
            Some(b'/') => &path[naan_end + 1..],
            Some(_) => return Err(not_an_ark()),
        };

        Ok(Self {
            raw: raw.to_string(),
            raw_path_len,
            raw_naan_start: raw_offset(raw, prefix_len),
            naan: String::from_utf8_lossy(&path[prefix_len..naan_end]).into_owned(),
            remainder: String::from_utf8_lossy(remainder).into_owned(),
            path: String::from_utf8_lossy(&path).into_owned(),
            has_prefix: prefix_len > 0,
        })
    }

    /// The Name Assigning Authority Number.
    pub fn naan(&self) -> &str {
        &self.naan
    }

    /// Everything after `NAAN/` in the decoded path, possibly empty.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }

    /// The decoded identifier path, without the query.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The query string after `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.raw.get(self.raw_path_len + 1..)
    }

    /// The raw target from the first identifier character on.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True when the identifier carried an `ark:` prefix in any case.
    pub fn has_prefix(&self) -> bool {
        self.has_prefix
    }

    /// The request identifier with an `ark:` prefix, query included.
    ///
    /// A target already starting with `ark:` or `ark:/` (any case, escaped
    /// or not) is returned as received; anything else gets `ark:/` in
    /// front. `ARK:/12345` therefore stays `ARK:/12345` rather than
    /// becoming `ark:/ARK:/12345`.
    pub fn arkpid(&self) -> String {
        if self.has_prefix {
            self.raw.clone()
        } else {
            format!("{ARK_SCHEME}{}", self.raw)
        }
    }

    /// The target from the NAAN on, query included.
    pub fn pid(&self) -> &str {
        &self.raw[self.raw_naan_start..]
    }

    /// `ark:/` followed by [`ArkIdentifier::pid`].
    pub fn normalized_pid(&self) -> String {
        format!("{ARK_SCHEME}{}", self.pid())
    }

    /// True when this is a bare NAAN whose target ends with one of `markers`.
    pub fn is_info_request<S: AsRef<str>>(&self, markers: &[S]) -> bool {
        self.remainder.is_empty() && markers.iter().any(|m| self.raw.ends_with(m.as_ref()))
    }

    /// Snapshot of the parsed fields.
    pub fn parts(&self) -> ParsedParts {
        ParsedParts {
            naan: self.naan().to_string(),
            remainder: self.remainder().to_string(),
            pid: self.pid().to_string(),
            arkpid: self.arkpid(),
            normalized_pid: self.normalized_pid(),
        }
    }
}

impl FromStr for ArkIdentifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArkIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized_pid())
    }
}

/// Owned view of a parsed identifier, for diagnostics and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedParts {
    pub naan: String,
    pub remainder: String,
    pub pid: String,
    pub arkpid: String,
    pub normalized_pid: String,
}

/// A request target split for matching.
struct Target<'a> {
    /// From the first identifier character on, as received.
    raw: &'a str,
    /// Length of the path portion of `raw`.
    raw_path_len: usize,
    /// The path portion of `raw`, percent-decoded.
    path: Vec<u8>,
}

fn split_target(target: &str) -> Target<'_> {
    let path_end = target.find('?').unwrap_or(target.len());
    let decoded: Vec<u8> = percent_decode_str(&target[..path_end]).collect();
    let lead = decoded
        .iter()
        .take_while(|b| matches!(b, b'/' | b' '))
        .count();
    let raw_start = raw_offset(target, lead);
    Target {
        raw: &target[raw_start..],
        raw_path_len: path_end - raw_start,
        path: decoded[lead..].to_vec(),
    }
}

/// The stripped target as received and its decoded path, for diagnostics
/// on targets that may not parse.
pub fn stripped_target(target: &str) -> (&str, String) {
    let Target { raw, path, .. } = split_target(target);
    (raw, String::from_utf8_lossy(&path).into_owned())
}

/// Offset in `raw` of the byte that decodes to position `decoded`.
///
/// `decoded` must not exceed the decoded length of `raw`.
fn raw_offset(raw: &str, decoded: usize) -> usize {
    let bytes = raw.as_bytes();
    let mut pos = 0;
    for _ in 0..decoded {
        pos += if is_escape(&bytes[pos..]) { 3 } else { 1 };
    }
    pos
}

fn is_escape(bytes: &[u8]) -> bool {
    matches!(bytes, [b'%', hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
}

fn prefix_len(path: &[u8]) -> usize {
    let has = |p: &str| path.len() >= p.len() && path[..p.len()].eq_ignore_ascii_case(p.as_bytes());
    if has(ARK_SCHEME) {
        ARK_SCHEME.len()
    } else if has("ark:") {
        "ark:".len()
    } else {
        0
    }
}

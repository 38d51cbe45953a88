//! `Accept` header negotiation for the NAAN listing.

/// Listing representations the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    Json,
    Csv,
    Text,
}

impl ListingFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            ListingFormat::Json => "application/json",
            ListingFormat::Csv => "text/csv",
            ListingFormat::Text => "text/plain",
        }
    }

    /// Label used in metrics.
    pub fn label(self) -> &'static str {
        match self {
            ListingFormat::Json => "json",
            ListingFormat::Csv => "csv",
            ListingFormat::Text => "text",
        }
    }
}

/// Pick a listing format from an `Accept` header value.
///
/// Formats earlier in `supported` win ties. JSON is the fallback when the
/// header is absent or nothing acceptable is offered.
pub fn negotiate(accept: Option<&str>, supported: &[ListingFormat]) -> ListingFormat {
    let Some(accept) = accept else {
        return ListingFormat::Json;
    };
    let ranges: Vec<(&str, f32)> = accept.split(',').filter_map(parse_range).collect();

    let mut best: Option<(ListingFormat, f32)> = None;
    for &format in supported {
        let q = quality(format.media_type(), &ranges);
        if q > 0.0 && best.map_or(true, |(_, best_q)| q > best_q) {
            best = Some((format, q));
        }
    }
    best.map(|(format, _)| format).unwrap_or(ListingFormat::Json)
}

/// Split one media range into its type and `q` parameter.
fn parse_range(range: &str) -> Option<(&str, f32)> {
    let mut parts = range.split(';').map(str::trim);
    let media = parts.next().filter(|m| !m.is_empty())?;
    let q = parts
        .filter_map(|p| p.strip_prefix("q=").or_else(|| p.strip_prefix("Q=")))
        .find_map(|v| v.parse::<f32>().ok())
        .unwrap_or(1.0);
    Some((media, q))
}

/// Quality of `media` under the most specific matching range.
fn quality(media: &str, ranges: &[(&str, f32)]) -> f32 {
    let (kind, _) = media.split_once('/').unwrap_or((media, ""));
    let mut best: Option<(u8, f32)> = None;
    for &(range, q) in ranges {
        let specificity = if range.eq_ignore_ascii_case(media) {
            2
        } else if range
            .strip_suffix("/*")
            .is_some_and(|k| k.eq_ignore_ascii_case(kind))
        {
            1
        } else if range == "*/*" {
            0
        } else {
            continue;
        };
        if best.map_or(true, |(s, _)| specificity > s) {
            best = Some((specificity, q));
        }
    }
    best.map(|(_, q)| q).unwrap_or(0.0)
}

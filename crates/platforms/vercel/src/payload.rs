//! Analytics payload classification.
//!
//! The deployment platform has shipped two incompatible response shapes
//! for the same analytics endpoint across its own API versions: an older
//! one carrying a top-level `pageviews` array of `{date, count}` rows,
//! and a newer one carrying a `data` array whose rows report `views` and
//! `uniques` per bucket. Classification happens once, at the adapter
//! boundary, so the normalizer can branch on an explicit tag instead of
//! re-guessing optional fields in every fold.

use serde_json::Value;
use webhub_core::error::{HubError, HubResult};

/// A raw analytics payload, tagged by the schema it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsPayload<'a> {
    /// The legacy shape: `pageviews` rows with a bare `count` each.
    Legacy(AnalyticsSections<'a>),
    /// The current shape: `data` rows with `views`/`uniques` fields.
    V2(AnalyticsSections<'a>),
}

/// The sections shared by both payload shapes.
///
/// Either shape may carry the country/device/page breakdown arrays next
/// to its series; absent sections are empty slices.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSections<'a> {
    /// The per-bucket series rows.
    pub series: &'a [Value],
    pub countries: &'a [Value],
    pub devices: &'a [Value],
    pub pages: &'a [Value],
}

impl<'a> AnalyticsPayload<'a> {
    /// Classifies a raw payload into one of the two known shapes.
    ///
    /// Returns `MalformedResponse` only when neither series array is
    /// present, i.e. the payload is fundamentally not the expected
    /// shape. Missing optional sections never fail classification.
    pub fn classify(body: &'a Value) -> HubResult<Self> {
        if let Some(series) = body.get("pageviews").and_then(Value::as_array) {
            return Ok(Self::Legacy(AnalyticsSections::new(body, series)));
        }
        if let Some(series) = body.get("data").and_then(Value::as_array) {
            return Ok(Self::V2(AnalyticsSections::new(body, series)));
        }
        Err(HubError::malformed(
            "analytics payload has neither a pageviews nor a data series",
        ))
    }

    /// The sections of whichever shape this is.
    pub fn sections(&self) -> &AnalyticsSections<'a> {
        match self {
            Self::Legacy(sections) | Self::V2(sections) => sections,
        }
    }
}

impl<'a> AnalyticsSections<'a> {
    fn new(body: &'a Value, series: &'a [Value]) -> Self {
        Self {
            series,
            countries: section(body, "countries"),
            devices: section(body, "devices"),
            pages: section(body, "pages"),
        }
    }
}

fn section<'a>(body: &'a Value, key: &str) -> &'a [Value] {
    body.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_legacy() {
        let body = json!({
            "pageviews": [{"date": "2025-01-01", "count": 100}],
            "countries": [{"country": "US", "count": 40}],
        });
        let payload = AnalyticsPayload::classify(&body).unwrap();
        assert!(matches!(payload, AnalyticsPayload::Legacy(_)));
        assert_eq!(payload.sections().series.len(), 1);
        assert_eq!(payload.sections().countries.len(), 1);
        assert!(payload.sections().devices.is_empty());
    }

    #[test]
    fn test_classify_v2() {
        let body = json!({
            "data": [{"date": "2025-01-01", "views": 100, "uniques": 60}],
        });
        let payload = AnalyticsPayload::classify(&body).unwrap();
        assert!(matches!(payload, AnalyticsPayload::V2(_)));
    }

    #[test]
    fn test_legacy_wins_when_both_present() {
        let body = json!({
            "pageviews": [],
            "data": [{"views": 1}],
        });
        let payload = AnalyticsPayload::classify(&body).unwrap();
        assert!(matches!(payload, AnalyticsPayload::Legacy(_)));
    }

    #[test]
    fn test_classify_rejects_foreign_shape() {
        let err = AnalyticsPayload::classify(&json!({"rows": []})).unwrap_err();
        assert!(matches!(err, HubError::MalformedResponse { .. }));

        let err = AnalyticsPayload::classify(&json!("just a string")).unwrap_err();
        assert!(matches!(err, HubError::MalformedResponse { .. }));
    }
}

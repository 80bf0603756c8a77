//! The unified analytics model.
//!
//! Every analytics-capable upstream payload, whatever its version or
//! shape, is folded into `UnifiedAnalyticsResult`. Consumers render this
//! one shape and never see upstream field names.
//!
//! Raw counts stay integers for computation; `AnalyticsTotals` carries the
//! display strings. Totals are always derived by summing the grouped
//! series, never read from a separate upstream total field that may be
//! stale relative to the series.

use serde::{Deserialize, Serialize};

/// Fraction of page views counted as visitors when the upstream provides
/// no genuine unique-visitor figure. A documented heuristic, not a
/// measurement; results produced with it are tagged `Estimated`.
pub const VISITOR_ESTIMATE_FACTOR: f64 = 0.6;

/// Maximum explicit entries in a country breakdown before folding.
pub const MAX_COUNTRY_ENTRIES: usize = 7;

/// Maximum entries in a page breakdown.
pub const MAX_PAGE_ENTRIES: usize = 6;

/// Label of the synthetic entry that absorbs countries beyond the top 7.
pub const OTHERS_LABEL: &str = "Others";

/// Label substituted when the upstream reports no country at all.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// The upstream reports neither bounce rate nor session duration;
/// the dashboard shows fixed placeholders for both.
pub const PLACEHOLDER_BOUNCE_RATE: &str = "42%";
pub const PLACEHOLDER_AVG_SESSION: &str = "3m 24s";

/// A visitor total, tagged by how it was obtained.
///
/// The upstream conflates measured uniques with estimates; keeping the
/// distinction lets consumers and tests tell real data from the 0.6
/// heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum VisitorCount {
    /// A genuine unique-visitor count reported by the upstream.
    Measured { count: u64 },
    /// Visitors approximated as a fixed fraction of page views.
    Estimated { count: u64, factor: f64 },
}

impl VisitorCount {
    /// A measured count.
    pub fn measured(count: u64) -> Self {
        Self::Measured { count }
    }

    /// An estimated count using the standard factor.
    pub fn estimated(count: u64) -> Self {
        Self::Estimated {
            count,
            factor: VISITOR_ESTIMATE_FACTOR,
        }
    }

    /// The visitor count, however obtained.
    pub fn count(&self) -> u64 {
        match self {
            Self::Measured { count } | Self::Estimated { count, .. } => *count,
        }
    }

    /// True when the count came from the estimation heuristic.
    pub fn is_estimated(&self) -> bool {
        matches!(self, Self::Estimated { .. })
    }
}

/// One date bucket of the analytics series.
///
/// Page views ≥ visitors is expected but not enforced; upstream data may
/// violate it and the normalizer keeps the rows as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSeriesPoint {
    /// Calendar-day bucket label, e.g. "Jan 5".
    pub label: String,
    /// Visitors in the bucket.
    pub visitors: u64,
    /// Page views in the bucket.
    pub page_views: u64,
}

/// One country's share of visitors.
///
/// Breakdowns are sorted descending by visitors, hold at most
/// [`MAX_COUNTRY_ENTRIES`] explicit entries, and fold the remainder into a
/// synthetic [`OTHERS_LABEL`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryBreakdown {
    /// Country label as reported upstream.
    pub country: String,
    /// Visitors from this country.
    pub visitors: u64,
    /// Share of total visitors, rounded to the nearest integer.
    pub percentage: u8,
}

/// The fixed device categories the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceCategory {
    /// All categories, in dashboard order.
    pub const ALL: [DeviceCategory; 3] = [
        DeviceCategory::Desktop,
        DeviceCategory::Mobile,
        DeviceCategory::Tablet,
    ];

    /// Maps an upstream device label into a category.
    ///
    /// Upstreams have shipped both "desktop"/"mobile" and
    /// "computer"/"phone" vocabularies for the same data. Unrecognized
    /// labels map to `None` and produce no category row.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "desktop" | "computer" => Some(Self::Desktop),
            "mobile" | "phone" => Some(Self::Mobile),
            "tablet" => Some(Self::Tablet),
            _ => None,
        }
    }

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
        }
    }
}

/// One device category's share of visitors.
///
/// The three percentages are independently rounded and are not guaranteed
/// to sum to exactly 100. Accepted, documented behavior; consumers must
/// not "fix" it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceBreakdown {
    /// The device category.
    pub device: DeviceCategory,
    /// Share of the three category totals, rounded to the nearest integer.
    pub percentage: u8,
}

/// One page's traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreakdown {
    /// Page path, e.g. "/docs".
    pub path: String,
    /// View count.
    pub views: u64,
    /// Bounce-rate estimate as a percentage.
    pub bounce_rate: u8,
}

/// Display-formatted totals for the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsTotals {
    /// Total visitors, thousands-separated.
    pub visitors: String,
    /// Total page views, thousands-separated.
    pub page_views: String,
    /// Bounce rate, formatted percentage.
    pub bounce_rate: String,
    /// Average session duration, formatted.
    pub avg_session: String,
}

impl AnalyticsTotals {
    /// Formats raw totals for display.
    pub fn from_counts(visitors: u64, page_views: u64) -> Self {
        Self {
            visitors: format_count(visitors),
            page_views: format_count(page_views),
            bounce_rate: PLACEHOLDER_BOUNCE_RATE.to_string(),
            avg_session: PLACEHOLDER_AVG_SESSION.to_string(),
        }
    }
}

/// The sole analytics shape returned to consumers, regardless of which
/// upstream API version answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedAnalyticsResult {
    /// Per-day series, in upstream order.
    pub series: Vec<AnalyticsSeriesPoint>,
    /// Country breakdown, top entries plus "Others".
    pub countries: Vec<CountryBreakdown>,
    /// Device breakdown over the fixed categories.
    pub devices: Vec<DeviceBreakdown>,
    /// Top pages by views.
    pub pages: Vec<PageBreakdown>,
    /// Total visitors, tagged measured or estimated.
    pub visitors: VisitorCount,
    /// Display-formatted totals.
    pub total: AnalyticsTotals,
}

/// Formats a count with thousands separators, e.g. `1234567` → `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rounds `part / whole` to a whole percentage, half away from zero.
///
/// Returns 0 when the whole is 0 and clamps to 100 for out-of-range
/// upstream data.
pub fn percentage(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(150), "150");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(50, 200), 25);
    }

    #[test]
    fn test_percentage_degenerate() {
        assert_eq!(percentage(10, 0), 0);
        assert_eq!(percentage(300, 100), 100); // clamped
    }

    #[test]
    fn test_device_label_aliases() {
        assert_eq!(DeviceCategory::from_label("desktop"), Some(DeviceCategory::Desktop));
        assert_eq!(DeviceCategory::from_label("Computer"), Some(DeviceCategory::Desktop));
        assert_eq!(DeviceCategory::from_label("PHONE"), Some(DeviceCategory::Mobile));
        assert_eq!(DeviceCategory::from_label("tablet"), Some(DeviceCategory::Tablet));
        assert_eq!(DeviceCategory::from_label("smartwatch"), None);
    }

    #[test]
    fn test_visitor_count_accessors() {
        let measured = VisitorCount::measured(500);
        assert_eq!(measured.count(), 500);
        assert!(!measured.is_estimated());

        let estimated = VisitorCount::estimated(90);
        assert_eq!(estimated.count(), 90);
        assert!(estimated.is_estimated());
        match estimated {
            VisitorCount::Estimated { factor, .. } => assert_eq!(factor, VISITOR_ESTIMATE_FACTOR),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_totals_formatting() {
        let total = AnalyticsTotals::from_counts(1500, 2500000);
        assert_eq!(total.visitors, "1,500");
        assert_eq!(total.page_views, "2,500,000");
        assert_eq!(total.bounce_rate, "42%");
        assert_eq!(total.avg_session, "3m 24s");
    }
}

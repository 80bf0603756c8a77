//! Normalizers for the deployment platform.
//!
//! Pure functions from raw payloads to the shared internal models. Field
//! access is defensive throughout: the same logical endpoint has shipped
//! incompatible shapes across upstream API versions, so every field is
//! read with a fallback chain and missing values become zero or empty
//! rather than errors. A normalizer fails only when the top-level payload
//! is fundamentally not the expected shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use std::collections::HashMap;
use webhub_core::analytics::{
    percentage, AnalyticsSeriesPoint, AnalyticsTotals, CountryBreakdown, DeviceBreakdown,
    DeviceCategory, PageBreakdown, UnifiedAnalyticsResult, VisitorCount, MAX_COUNTRY_ENTRIES,
    MAX_PAGE_ENTRIES, OTHERS_LABEL, UNKNOWN_COUNTRY, VISITOR_ESTIMATE_FACTOR,
};
use webhub_core::error::{HubError, HubResult};
use webhub_core::fields::{first_count, first_text, first_value, has_field};
use webhub_core::records::{Deployment, Project};

use crate::payload::AnalyticsPayload;

/// Bounce rate carried by the synthetic root-path entry.
const FALLBACK_BOUNCE_RATE: u8 = 42;

/// Folds a raw analytics payload into the unified result.
///
/// Handles both known payload shapes (see [`AnalyticsPayload`]). Totals
/// are derived by summing the grouped series; the visitor total is tagged
/// `Measured` when the upstream reported genuine uniques and `Estimated`
/// when it had to be approximated from page views.
pub fn normalize_analytics(body: &Value) -> HubResult<UnifiedAnalyticsResult> {
    let payload = AnalyticsPayload::classify(body)?;

    let (mut series, visitors) = match &payload {
        AnalyticsPayload::Legacy(sections) => fold_legacy_series(sections.series),
        AnalyticsPayload::V2(sections) => fold_v2_series(sections.series),
    };

    let total_page_views = saturating_sum(series.iter().map(|point| point.page_views));
    let total_visitors = visitors.count();

    // An empty range still renders a chart: one bucket for today.
    if series.is_empty() {
        series.push(AnalyticsSeriesPoint {
            label: today_label(),
            visitors: total_visitors,
            page_views: total_page_views,
        });
    }

    let sections = payload.sections();
    Ok(UnifiedAnalyticsResult {
        countries: fold_countries(sections.countries, total_visitors),
        devices: fold_devices(sections.devices),
        pages: fold_pages(sections.pages, total_page_views),
        total: AnalyticsTotals::from_counts(total_visitors, total_page_views),
        series,
        visitors,
    })
}

// ==================== Series ====================

fn fold_legacy_series(rows: &[Value]) -> (Vec<AnalyticsSeriesPoint>, VisitorCount) {
    let series = group_series(rows.iter().map(|row| {
        let views = first_count(row, &["count"]);
        (bucket_label(row), estimate(views), views)
    }));
    let total = saturating_sum(series.iter().map(|point| point.visitors));
    (series, VisitorCount::estimated(total))
}

fn fold_v2_series(rows: &[Value]) -> (Vec<AnalyticsSeriesPoint>, VisitorCount) {
    let measured = rows
        .iter()
        .any(|row| has_field(row, "uniques") || has_field(row, "visitors"));

    let series = group_series(rows.iter().map(|row| {
        let views = first_count(row, &["views", "count"]);
        let visitors = if measured {
            first_count(row, &["uniques", "visitors"])
        } else {
            estimate(views)
        };
        (bucket_label(row), visitors, views)
    }));

    let total = saturating_sum(series.iter().map(|point| point.visitors));
    let visitors = if measured {
        VisitorCount::measured(total)
    } else {
        VisitorCount::estimated(total)
    };
    (series, visitors)
}

/// Groups `(label, visitors, page_views)` rows by label, summing counts.
/// Buckets keep first-seen order.
fn group_series(rows: impl Iterator<Item = (String, u64, u64)>) -> Vec<AnalyticsSeriesPoint> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, (u64, u64)> = HashMap::new();

    for (label, visitors, page_views) in rows {
        if !buckets.contains_key(&label) {
            order.push(label.clone());
        }
        let entry = buckets.entry(label).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(visitors);
        entry.1 = entry.1.saturating_add(page_views);
    }

    order
        .into_iter()
        .map(|label| {
            let (visitors, page_views) = buckets[&label];
            AnalyticsSeriesPoint {
                label,
                visitors,
                page_views,
            }
        })
        .collect()
}

fn estimate(page_views: u64) -> u64 {
    (page_views as f64 * VISITOR_ESTIMATE_FACTOR).floor() as u64
}

/// Counts come from the wire; sums saturate so a hostile payload cannot
/// overflow a total.
fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

// ==================== Countries ====================

fn fold_countries(rows: &[Value], total_visitors: u64) -> Vec<CountryBreakdown> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, u64> = HashMap::new();

    for row in rows {
        let label = first_text(row, &["country", "name"])
            .unwrap_or(UNKNOWN_COUNTRY)
            .to_string();
        let count = first_count(row, &["count", "visitors"]);
        if !groups.contains_key(&label) {
            order.push(label.clone());
        }
        let entry = groups.entry(label).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    if order.is_empty() {
        return vec![CountryBreakdown {
            country: UNKNOWN_COUNTRY.to_string(),
            visitors: total_visitors,
            percentage: 100,
        }];
    }

    let mut entries: Vec<CountryBreakdown> = order
        .into_iter()
        .map(|country| {
            let visitors = groups[&country];
            CountryBreakdown {
                percentage: percentage(visitors, total_visitors),
                country,
                visitors,
            }
        })
        .collect();

    // Stable sort: ties keep first-seen order, so identical payloads
    // always produce identical breakdowns.
    entries.sort_by(|a, b| b.visitors.cmp(&a.visitors));

    if entries.len() > MAX_COUNTRY_ENTRIES {
        let top_sum = saturating_sum(
            entries[..MAX_COUNTRY_ENTRIES]
                .iter()
                .map(|entry| entry.visitors),
        );
        entries.truncate(MAX_COUNTRY_ENTRIES);

        let others = total_visitors.checked_sub(top_sum).unwrap_or_else(|| {
            tracing::warn!(
                "Country breakdown exceeds the visitor total by {}, clamping Others to 0",
                top_sum - total_visitors
            );
            0
        });
        entries.push(CountryBreakdown {
            country: OTHERS_LABEL.to_string(),
            visitors: others,
            percentage: percentage(others, total_visitors),
        });
    }

    entries
}

// ==================== Devices ====================

fn fold_devices(rows: &[Value]) -> Vec<DeviceBreakdown> {
    let mut totals: HashMap<DeviceCategory, u64> = HashMap::new();

    for row in rows {
        let label = first_text(row, &["device", "name"]).unwrap_or("unknown");
        let count = first_count(row, &["count", "visitors"]);
        // Rows with labels outside the three categories are dropped;
        // shares are of the recognized categories only.
        if let Some(category) = DeviceCategory::from_label(label) {
            let entry = totals.entry(category).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }

    let denominator = saturating_sum(totals.values().copied()).max(1);
    DeviceCategory::ALL
        .iter()
        .map(|&device| DeviceBreakdown {
            device,
            percentage: percentage(totals.get(&device).copied().unwrap_or(0), denominator),
        })
        .collect()
}

// ==================== Pages ====================

fn fold_pages(rows: &[Value], total_page_views: u64) -> Vec<PageBreakdown> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, u64> = HashMap::new();

    for row in rows {
        let path = first_text(row, &["path", "page"]).unwrap_or("/").to_string();
        let views = first_count(row, &["count", "views"]);
        if !groups.contains_key(&path) {
            order.push(path.clone());
        }
        let entry = groups.entry(path).or_insert(0);
        *entry = entry.saturating_add(views);
    }

    if order.is_empty() {
        return vec![PageBreakdown {
            path: "/".to_string(),
            views: total_page_views,
            bounce_rate: FALLBACK_BOUNCE_RATE,
        }];
    }

    let mut entries: Vec<PageBreakdown> = order
        .into_iter()
        .map(|path| {
            let views = groups[&path];
            PageBreakdown {
                bounce_rate: bounce_estimate(&path),
                path,
                views,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.views.cmp(&a.views));
    entries.truncate(MAX_PAGE_ENTRIES);
    entries
}

/// Bounce-rate estimate in 35..=54, derived from the path so that
/// identical payloads yield identical results.
fn bounce_estimate(path: &str) -> u8 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in path.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    35 + (hash % 20) as u8
}

// ==================== Projects & Deployments ====================

/// Maps a project listing payload into project records.
pub fn normalize_projects(body: &Value) -> HubResult<Vec<Project>> {
    let rows = body
        .get("projects")
        .and_then(Value::as_array)
        .or_else(|| body.as_array())
        .ok_or_else(|| HubError::malformed("project listing has no projects array"))?;
    Ok(rows.iter().map(normalize_project).collect())
}

fn normalize_project(row: &Value) -> Project {
    Project {
        id: first_text(row, &["id"]).unwrap_or_default().to_string(),
        name: first_text(row, &["name"]).unwrap_or_default().to_string(),
        framework: first_text(row, &["framework"]).map(str::to_string),
        repo: repo_link(row.get("link")),
        latest_deployment: None,
    }
}

fn repo_link(link: Option<&Value>) -> Option<String> {
    let link = link?;
    let repo = link.get("repo").and_then(Value::as_str)?;
    match link.get("org").and_then(Value::as_str) {
        Some(org) => Some(format!("{org}/{repo}")),
        None => Some(repo.to_string()),
    }
}

/// Maps a deployment listing payload into deployment records.
///
/// A missing or foreign-shaped listing yields no deployments; per-project
/// attachment tolerates that.
pub fn normalize_deployments(body: &Value) -> Vec<Deployment> {
    body.get("deployments")
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(normalize_deployment).collect())
        .unwrap_or_default()
}

/// The newest deployment in a listing payload, if any.
pub fn latest_deployment(body: &Value) -> Option<Deployment> {
    normalize_deployments(body).into_iter().next()
}

fn normalize_deployment(row: &Value) -> Deployment {
    Deployment {
        uid: first_text(row, &["uid", "id"]).unwrap_or_default().to_string(),
        url: first_text(row, &["url"]).map(str::to_string),
        state: first_text(row, &["state", "readyState"]).map(str::to_string),
        created_at: first_value(row, &["createdAt", "created"])
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_millis),
    }
}

// ==================== Day Labels ====================

fn bucket_label(row: &Value) -> String {
    // A null date falls through to the timestamp, like every other
    // fallback chain.
    first_value(row, &["date", "timestamp"])
        .and_then(day_label)
        .unwrap_or_else(today_label)
}

fn day_label(value: &Value) -> Option<String> {
    if let Some(text) = value.as_str() {
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(format_day(date));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
            return Some(format_day(stamp.date_naive()));
        }
        return None;
    }
    value
        .as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .map(|stamp| format_day(stamp.date_naive()))
}

fn format_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

fn today_label() -> String {
    format_day(Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_series_with_no_breakdowns() {
        let body = json!({
            "pageviews": [
                {"date": "2025-01-01", "count": 100},
                {"date": "2025-01-02", "count": 50},
            ],
        });
        let result = normalize_analytics(&body).unwrap();

        assert_eq!(result.series.len(), 2);
        assert_eq!(result.series[0].label, "Jan 1");
        assert_eq!(result.series[0].page_views, 100);
        assert_eq!(result.series[0].visitors, 60);
        assert_eq!(result.series[1].visitors, 30);

        assert_eq!(result.total.page_views, "150");
        assert_eq!(result.visitors, VisitorCount::estimated(90));
        assert_eq!(
            result.countries,
            vec![CountryBreakdown {
                country: "Unknown".to_string(),
                visitors: 90,
                percentage: 100,
            }]
        );
    }

    #[test]
    fn test_series_sum_matches_total() {
        let body = json!({
            "pageviews": [
                {"date": "2025-03-01", "count": 17},
                {"date": "2025-03-02", "count": 23},
                {"date": "2025-03-02", "count": 9},
                {"date": "2025-03-03", "count": 41},
            ],
        });
        let result = normalize_analytics(&body).unwrap();

        let summed: u64 = result.series.iter().map(|point| point.page_views).sum();
        assert_eq!(summed, 90);
        assert_eq!(result.total.page_views, "90");
        // Rows sharing a date collapse into one bucket.
        assert_eq!(result.series.len(), 3);
        assert_eq!(result.series[1].page_views, 32);
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let body = json!({
            "pageviews": [
                {"date": "2025-01-01"},
                {"date": "2025-01-02", "count": null},
                {"count": 10},
            ],
            "countries": [{"name": "Germany"}],
            "pages": [{"path": "/docs"}],
        });
        let result = normalize_analytics(&body).unwrap();

        assert_eq!(result.series.iter().map(|p| p.page_views).sum::<u64>(), 10);
        assert_eq!(result.countries[0].visitors, 0);
        assert_eq!(result.pages[0].views, 0);
    }

    #[test]
    fn test_idempotent_for_same_payload() {
        let body = json!({
            "pageviews": [{"date": "2025-01-05", "count": 320}],
            "countries": [
                {"country": "US", "count": 90},
                {"country": "DE", "count": 90},
            ],
            "pages": [{"path": "/a", "count": 200}, {"path": "/b", "count": 120}],
        });
        let first = normalize_analytics(&body).unwrap();
        let second = normalize_analytics(&body).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_v2_series_with_uniques_is_measured() {
        let body = json!({
            "data": [
                {"date": "2025-02-01", "views": 100, "uniques": 70},
                {"date": "2025-02-02", "views": 80, "uniques": 40},
            ],
        });
        let result = normalize_analytics(&body).unwrap();

        assert_eq!(result.visitors, VisitorCount::measured(110));
        assert_eq!(result.series[0].visitors, 70);
        assert_eq!(result.total.visitors, "110");
    }

    #[test]
    fn test_v2_series_without_uniques_is_estimated() {
        let body = json!({
            "data": [{"date": "2025-02-01", "views": 100}],
        });
        let result = normalize_analytics(&body).unwrap();

        assert!(result.visitors.is_estimated());
        assert_eq!(result.visitors.count(), 60);
    }

    #[test]
    fn test_nine_countries_fold_into_top_seven_plus_others() {
        // Visitor total 176 comes from the series: floor(294 * 0.6) = 176.
        let body = json!({
            "pageviews": [{"date": "2025-01-01", "count": 294}],
            "countries": [
                {"country": "US", "count": 50},
                {"country": "DE", "count": 40},
                {"country": "FR", "count": 30},
                {"country": "GB", "count": 20},
                {"country": "JP", "count": 10},
                {"country": "BR", "count": 8},
                {"country": "IN", "count": 7},
                {"country": "CA", "count": 6},
                {"country": "AU", "count": 5},
            ],
        });
        let result = normalize_analytics(&body).unwrap();

        assert_eq!(result.countries.len(), MAX_COUNTRY_ENTRIES + 1);
        let others = result.countries.last().unwrap();
        assert_eq!(others.country, "Others");
        assert_eq!(others.visitors, 11);

        let sum: i64 = result
            .countries
            .iter()
            .map(|entry| i64::from(entry.percentage))
            .sum();
        assert!((99..=101).contains(&sum), "percentages summed to {sum}");
    }

    #[test]
    fn test_others_clamped_when_top_exceeds_total() {
        let rows: Vec<Value> = (0..8)
            .map(|i| json!({"country": format!("C{i}"), "count": 100}))
            .collect();
        // Total of 10 is far below the 700 the top seven report.
        let entries = fold_countries(&rows, 10);

        assert_eq!(entries.len(), 8);
        assert_eq!(entries.last().unwrap().visitors, 0);
    }

    #[test]
    fn test_country_alias_and_grouping() {
        let body = json!({
            "pageviews": [{"date": "2025-01-01", "count": 10}],
            "countries": [
                {"name": "US", "visitors": 4},
                {"country": "US", "count": 2},
            ],
        });
        let result = normalize_analytics(&body).unwrap();
        assert_eq!(result.countries[0].country, "US");
        assert_eq!(result.countries[0].visitors, 6);
    }

    #[test]
    fn test_device_aliases_and_rounding() {
        let body = json!({
            "pageviews": [{"date": "2025-01-01", "count": 100}],
            "devices": [
                {"name": "Computer", "count": 30},
                {"device": "phone", "count": 50},
                {"name": "tablet", "count": 20},
            ],
        });
        let result = normalize_analytics(&body).unwrap();

        assert_eq!(result.devices.len(), 3);
        assert_eq!(result.devices[0].device, DeviceCategory::Desktop);
        assert_eq!(result.devices[0].percentage, 30);
        assert_eq!(result.devices[1].percentage, 50);
        assert_eq!(result.devices[2].percentage, 20);
    }

    #[test]
    fn test_device_percentages_need_not_sum_to_100() {
        let rows = vec![
            json!({"device": "desktop", "count": 1}),
            json!({"device": "mobile", "count": 1}),
            json!({"device": "tablet", "count": 1}),
        ];
        let devices = fold_devices(&rows);
        let sum: u32 = devices.iter().map(|d| u32::from(d.percentage)).sum();
        assert_eq!(sum, 99); // 33 + 33 + 33, independently rounded
    }

    #[test]
    fn test_unrecognized_device_labels_are_dropped() {
        let rows = vec![
            json!({"device": "desktop", "count": 50}),
            json!({"device": "smart-tv", "count": 50}),
        ];
        let devices = fold_devices(&rows);
        assert_eq!(devices.len(), 3);
        // Half the rows are smart-tv, but shares are of the three
        // recognized categories only.
        assert_eq!(devices[0].device, DeviceCategory::Desktop);
        assert_eq!(devices[0].percentage, 100);
        assert_eq!(devices[1].percentage, 0);
        assert_eq!(devices[2].percentage, 0);
    }

    #[test]
    fn test_pages_group_sort_truncate() {
        let rows: Vec<Value> = (0..7)
            .map(|i| json!({"path": format!("/p{i}"), "count": 10 + i}))
            .chain([json!({"path": "/p0", "views": 100})])
            .collect();
        let pages = fold_pages(&rows, 0);

        assert_eq!(pages.len(), MAX_PAGE_ENTRIES);
        assert_eq!(pages[0].path, "/p0");
        assert_eq!(pages[0].views, 110);
    }

    #[test]
    fn test_bounce_estimate_deterministic_and_in_range() {
        for path in ["/", "/docs", "/pricing", "/blog/post-1"] {
            let rate = bounce_estimate(path);
            assert_eq!(rate, bounce_estimate(path));
            assert!((35..=54).contains(&rate));
        }
    }

    #[test]
    fn test_empty_payload_falls_back_everywhere() {
        let result = normalize_analytics(&json!({"pageviews": []})).unwrap();

        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].page_views, 0);
        assert_eq!(result.countries[0].country, "Unknown");
        assert_eq!(result.countries[0].percentage, 100);
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].path, "/");
        assert_eq!(result.pages[0].bounce_rate, FALLBACK_BOUNCE_RATE);
        assert_eq!(result.total.bounce_rate, "42%");
        assert_eq!(result.total.avg_session, "3m 24s");
    }

    #[test]
    fn test_epoch_millisecond_timestamps() {
        let body = json!({
            "pageviews": [{"timestamp": 1735689600000i64, "count": 5}],
        });
        let result = normalize_analytics(&body).unwrap();
        assert_eq!(result.series[0].label, "Jan 1");
    }

    #[test]
    fn test_null_date_falls_back_to_timestamp() {
        let body = json!({
            "pageviews": [{"date": null, "timestamp": 1735689600000i64, "count": 5}],
        });
        let result = normalize_analytics(&body).unwrap();
        assert_eq!(result.series[0].label, "Jan 1");
    }

    #[test]
    fn test_huge_counts_saturate_instead_of_overflowing() {
        let body = json!({
            "pageviews": [
                {"date": "2025-01-01", "count": u64::MAX},
                {"date": "2025-01-01", "count": u64::MAX},
            ],
            "countries": [
                {"country": "US", "count": u64::MAX},
                {"country": "US", "count": u64::MAX},
            ],
            "devices": [
                {"device": "desktop", "count": u64::MAX},
                {"device": "mobile", "count": u64::MAX},
            ],
            "pages": [
                {"path": "/a", "count": u64::MAX},
                {"path": "/a", "count": u64::MAX},
            ],
        });
        let result = normalize_analytics(&body).unwrap();

        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].page_views, u64::MAX);
        assert_eq!(result.visitors.count(), u64::MAX);
        assert_eq!(result.countries[0].visitors, u64::MAX);
        assert_eq!(result.pages[0].views, u64::MAX);
    }

    #[test]
    fn test_normalize_projects() {
        let body = json!({
            "projects": [
                {
                    "id": "prj_1",
                    "name": "marketing-site",
                    "framework": "nextjs",
                    "link": {"org": "acme", "repo": "site"},
                },
                {"name": "bare"},
            ],
        });
        let projects = normalize_projects(&body).unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].repo.as_deref(), Some("acme/site"));
        assert_eq!(projects[1].id, "");
        assert!(projects[1].latest_deployment.is_none());
    }

    #[test]
    fn test_normalize_projects_rejects_foreign_shape() {
        assert!(normalize_projects(&json!({"items": []})).is_err());
    }

    #[test]
    fn test_latest_deployment_mapping() {
        let body = json!({
            "deployments": [
                {
                    "uid": "dpl_9",
                    "url": "site-abc.vercel.app",
                    "readyState": "READY",
                    "createdAt": 1735689600000i64,
                },
                {"uid": "dpl_8"},
            ],
        });
        let latest = latest_deployment(&body).unwrap();

        assert_eq!(latest.uid, "dpl_9");
        assert_eq!(latest.state.as_deref(), Some("READY"));
        assert!(latest.created_at.is_some());
        assert!(latest_deployment(&json!({})).is_none());
    }
}

//! Published Google Sheet source.
//!
//! Each tab is fetched through the sheet's CSV export endpoint and decoded into
//! [`TableRows`]. The endpoint reports most failures with a success status and
//! an HTML or gviz error body, so payloads are classified before decoding.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::error::{NewsletterError, Result};
use crate::io::rows::{RowSource, TableRows};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

static RE_SHEET_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").unwrap());
static RE_SHEET_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{20,}$").unwrap());

/// Tab names to read from a published sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTabs {
    pub meta: String,
    pub points: String,
    pub distribution: String,
}

impl Default for SheetTabs {
    fn default() -> Self {
        Self {
            meta: "meta".to_string(),
            points: "points".to_string(),
            distribution: "distribution".to_string(),
        }
    }
}

/// Rows fetched for each logical table. A missing distribution tab yields an
/// empty table.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTables {
    pub meta: TableRows,
    pub points: TableRows,
    pub distribution: TableRows,
}

/// Extracts the sheet id from a full sheet URL or validates a bare id.
pub fn extract_sheet_id(reference: &str) -> Result<String> {
    let value = reference.trim();
    if value.is_empty() {
        return Err(NewsletterError::InvalidSheetReference);
    }
    if let Some(captures) = RE_SHEET_URL.captures(value) {
        return Ok(captures[1].to_string());
    }
    if RE_SHEET_ID.is_match(value) {
        return Ok(value.to_string());
    }
    Err(NewsletterError::InvalidSheetReference)
}

/// CSV export endpoint of a sheet, without the tab query parameter.
pub fn export_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{sheet_id}/gviz/tq")
}

/// Fetches the meta, points and distribution tabs of a published sheet.
#[instrument(level = "info", skip_all, fields(sheet_id = %sheet_id))]
pub fn fetch_tables(sheet_id: &str, tabs: &SheetTabs) -> Result<RemoteTables> {
    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(FETCH_TIMEOUT))
        .build()
        .into();

    let meta = fetch_tab(&agent, sheet_id, &tabs.meta, true)?;
    let points = fetch_tab(&agent, sheet_id, &tabs.points, true)?;
    let distribution = fetch_tab(&agent, sheet_id, &tabs.distribution, false)?;
    info!(
        meta_rows = meta.height(),
        point_rows = points.height(),
        distribution_rows = distribution.height(),
        "fetched sheet tabs"
    );

    Ok(RemoteTables {
        meta,
        points,
        distribution,
    })
}

fn fetch_tab(agent: &ureq::Agent, sheet_id: &str, tab: &str, required: bool) -> Result<TableRows> {
    let tab = tab.trim();
    debug!(tab, required, "requesting sheet tab");
    let response = agent
        .get(&export_url(sheet_id))
        .query("tqx", "out:csv")
        .query("sheet", tab)
        .call();

    let response = match response {
        Ok(response) => response,
        Err(ureq::Error::StatusCode(status)) => {
            if !required && matches!(status, 400 | 404) {
                warn!(tab, status, "optional tab unavailable, skipping");
                return Ok(TableRows::default());
            }
            return Err(NewsletterError::SheetAccess {
                tab: tab.to_string(),
                status,
            });
        }
        Err(err) => {
            return Err(NewsletterError::Network {
                tab: tab.to_string(),
                reason: err.to_string(),
            });
        }
    };

    let payload = response
        .into_body()
        .read_to_string()
        .map_err(|err| NewsletterError::Network {
            tab: tab.to_string(),
            reason: err.to_string(),
        })?;
    decode_payload(tab, &payload, required)
}

/// Classifies an export payload and decodes it into padded rows.
///
/// Optional tabs degrade to an empty table where required tabs fail.
pub fn decode_payload(tab: &str, payload: &str, required: bool) -> Result<TableRows> {
    let text = payload.strip_prefix('\u{feff}').unwrap_or(payload).trim();
    let missing = |err: NewsletterError| if required { Err(err) } else { Ok(TableRows::default()) };

    if text.is_empty() {
        return missing(NewsletterError::EmptyTab(tab.to_string()));
    }

    let lowered = text.to_lowercase();
    if lowered.starts_with("<!doctype html") || lowered.starts_with("<html") {
        return missing(NewsletterError::SheetNotShared(tab.to_string()));
    }
    if lowered.contains("google.visualization.query.setresponse")
        && lowered.contains("status\":\"error\"")
    {
        return missing(NewsletterError::SheetQueryFailed(tab.to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let table = TableRows::new(rows);
    if table.is_empty() {
        return missing(NewsletterError::EmptyTab(tab.to_string()));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_id_is_taken_from_full_url() {
        let url = "https://docs.google.com/spreadsheets/d/1AbC_dEf-123/edit#gid=0";
        assert_eq!(extract_sheet_id(url).unwrap(), "1AbC_dEf-123");
    }

    #[test]
    fn bare_sheet_id_needs_twenty_characters() {
        let id = "1AbCdEfGhIjKlMnOpQrStUvWxYz";
        assert_eq!(extract_sheet_id(id).unwrap(), id);
        assert!(matches!(
            extract_sheet_id("short-id"),
            Err(NewsletterError::InvalidSheetReference)
        ));
        assert!(matches!(
            extract_sheet_id("   "),
            Err(NewsletterError::InvalidSheetReference)
        ));
    }

    #[test]
    fn csv_payload_is_decoded_and_padded() {
        let payload = "\u{feff}\"order\",\"title\",\"content\"\n\"1\",\"Hello, world\"\n";
        let table = decode_payload("points", payload, true).unwrap();

        assert_eq!(table.width(), 3);
        assert_eq!(
            table.row(1),
            Some(vec!["1".to_string(), "Hello, world".to_string(), String::new()])
        );
    }

    #[test]
    fn html_payload_means_sheet_is_not_shared() {
        let payload = "<!DOCTYPE html><html><body>Sign in</body></html>";
        assert!(matches!(
            decode_payload("meta", payload, true),
            Err(NewsletterError::SheetNotShared(tab)) if tab == "meta"
        ));
        assert!(decode_payload("distribution", payload, false).unwrap().is_empty());
    }

    #[test]
    fn gviz_error_payload_is_reported() {
        let payload = "google.visualization.Query.setResponse({\"status\":\"error\"});";
        assert!(matches!(
            decode_payload("points", payload, true),
            Err(NewsletterError::SheetQueryFailed(_))
        ));
    }

    #[test]
    fn empty_payload_fails_only_when_required() {
        assert!(matches!(
            decode_payload("points", "  \n", true),
            Err(NewsletterError::EmptyTab(_))
        ));
        assert!(decode_payload("distribution", "", false).unwrap().is_empty());
    }
}

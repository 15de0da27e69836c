use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::distribution;
use crate::error::Result;
use crate::io::google::{self, SheetTabs};
use crate::io::rows::RowSource;
use crate::io::{history, template, workbook};
use crate::model::{DistributionSegment, MAX_POINTS, Meta, Point};
use crate::render::snapshot::DEFAULT_MAX_SUPPLY_BTC;
use crate::render::{DocumentInputs, FsProbe, ImageProbe, render_document};
use crate::schema;

/// Where the issue's tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Local `.xlsx` workbook.
    Workbook(PathBuf),
    /// Published Google Sheet, given as a URL or a bare sheet id.
    GoogleSheet { reference: String, tabs: SheetTabs },
}

/// Options of a single build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub source: SourceSelection,
    pub output: PathBuf,
    /// Keep a timestamped copy of the source under `history/`.
    pub keep_history: bool,
}

/// Validated model of one newsletter issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub meta: Meta,
    pub points: Vec<Point>,
    /// Normalized segments, largest amount first.
    pub distribution: Vec<DistributionSegment>,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub output: PathBuf,
    pub point_count: usize,
    pub snapshot: Option<PathBuf>,
}

impl BuildReport {
    /// Machine-readable form of the report, printed by `--json`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} with {} points (max allowed: {MAX_POINTS}).",
            self.output.display(),
            self.point_count
        )
    }
}

/// Parses and validates the three tables of an issue and normalizes its
/// distribution against the `max_supply_btc` meta value.
pub fn parse_issue(
    meta: &dyn RowSource,
    points: &dyn RowSource,
    distribution: Option<&dyn RowSource>,
) -> Result<Issue> {
    let meta = schema::read_meta(meta);
    let points = schema::read_points(points)?;
    let segments = schema::read_distribution(distribution)?;
    let reference_total = meta.number("max_supply_btc", DEFAULT_MAX_SUPPLY_BTC);
    let distribution = distribution::normalize(segments, reference_total);
    debug!(
        points = points.len(),
        segments = distribution.len(),
        "issue parsed"
    );
    Ok(Issue {
        meta,
        points,
        distribution,
    })
}

/// Renders an issue into the final page, resolving local images against
/// `output_dir`.
pub fn render_issue(issue: &Issue, output_dir: &Path, probe: &dyn ImageProbe) -> String {
    render_document(
        DocumentInputs {
            meta: &issue.meta,
            points: &issue.points,
            distribution: &issue.distribution,
            output_dir,
        },
        probe,
    )
}

/// Loads the issue from a local workbook, archiving the workbook first when
/// requested.
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn load_workbook_issue(path: &Path, keep_history: bool) -> Result<(Issue, Option<PathBuf>)> {
    let tables = workbook::read_tables(path)?;
    let snapshot = if keep_history {
        Some(history::archive_workbook(path)?)
    } else {
        None
    };
    let issue = parse_issue(
        &tables.meta,
        &tables.points,
        tables.distribution.as_ref().map(|rows| rows as &dyn RowSource),
    )?;
    info!(points = issue.points.len(), "read issue from workbook");
    Ok((issue, snapshot))
}

/// Loads the issue from a published Google Sheet. When requested, the fetched
/// rows are saved as a workbook under `history_root/history/`.
#[instrument(level = "info", skip_all, fields(reference = %reference))]
pub fn load_google_issue(
    reference: &str,
    tabs: &SheetTabs,
    history_root: Option<&Path>,
) -> Result<(Issue, Option<PathBuf>)> {
    let sheet_id = google::extract_sheet_id(reference)?;
    let tables = google::fetch_tables(&sheet_id, tabs)?;

    let snapshot = match history_root {
        Some(root) => {
            let path = history::next_snapshot_path(&root.join(history::HISTORY_DIR))?;
            template::write_snapshot_workbook(
                &path,
                tables.meta.as_rows(),
                tables.points.as_rows(),
                tables.distribution.as_rows(),
            )?;
            Some(path)
        }
        None => None,
    };

    let distribution = (!tables.distribution.is_empty()).then_some(&tables.distribution as &dyn RowSource);
    let issue = parse_issue(&tables.meta, &tables.points, distribution)?;
    info!(points = issue.points.len(), "read issue from Google Sheet");
    Ok((issue, snapshot))
}

/// Runs a complete build: load, validate, normalize, render and write.
///
/// Nothing is written to the output path unless every step succeeds.
#[instrument(level = "info", skip_all, fields(output = %options.output.display()))]
pub fn build(options: &BuildOptions) -> Result<BuildReport> {
    let output_dir = options
        .output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (issue, snapshot) = match &options.source {
        SourceSelection::Workbook(path) => load_workbook_issue(path, options.keep_history)?,
        SourceSelection::GoogleSheet { reference, tabs } => {
            let history_root = options.keep_history.then_some(output_dir.as_path());
            load_google_issue(reference, tabs, history_root)?
        }
    };

    fs::create_dir_all(&output_dir)?;
    let html = render_issue(&issue, &output_dir, &FsProbe);
    fs::write(&options.output, html)?;
    info!(points = issue.points.len(), "newsletter written");

    Ok(BuildReport {
        output: options.output.clone(),
        point_count: issue.points.len(),
        snapshot,
    })
}

/// Writes the starter workbook used by `init-template`.
#[instrument(level = "info", skip_all, fields(output = %path.display(), force = force))]
pub fn init_template(path: &Path, force: bool) -> Result<()> {
    template::create_template_workbook(path, force)
}

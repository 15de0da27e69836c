use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::error::{NewsletterError, Result};
use crate::io::workbook::{DISTRIBUTION_SHEET, META_SHEET, POINTS_SHEET};
use crate::model::{DEFAULT_DISTRIBUTION, DEFAULT_META};

/// Header of the points sheet written by the scaffold.
pub const POINTS_HEADER: [&str; 6] = [
    "order",
    "title",
    "content",
    "image_path",
    "image_caption",
    "source",
];

/// Header of the distribution sheet written by the scaffold.
pub const DISTRIBUTION_HEADER: [&str; 4] = ["category", "amount_btc", "percent", "color"];

const EXAMPLE_POINTS: [(u32, &str, &str, &str, &str); 2] = [
    (
        1,
        "Liquidity stopped tightening",
        "QT pace has slowed materially.\n- Funding stress eased\n- Repo usage normalized",
        "Optional image caption",
        "Source: Example Research Desk",
    ),
    (
        2,
        "Market leverage reset",
        "A broad deleveraging event removed excess risk without structural damage.",
        "",
        "",
    ),
];

/// Writes a starter workbook with the default meta table, two example points
/// and the default distribution.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn create_template_workbook(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(NewsletterError::TemplateExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();

    let meta = workbook.add_worksheet();
    meta.set_name(META_SHEET)?;
    write_text_row(meta, 0, &["key", "value"])?;
    for (row_idx, (key, value)) in DEFAULT_META.iter().enumerate() {
        write_text_row(meta, (row_idx + 1) as u32, &[*key, *value])?;
    }

    let points = workbook.add_worksheet();
    points.set_name(POINTS_SHEET)?;
    write_text_row(points, 0, &POINTS_HEADER)?;
    for (row_idx, (order, title, content, caption, source)) in EXAMPLE_POINTS.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        points.write_number(row, 0, f64::from(*order))?;
        write_text_cell(points, row, 1, title)?;
        write_text_cell(points, row, 2, content)?;
        write_text_cell(points, row, 4, caption)?;
        write_text_cell(points, row, 5, source)?;
    }

    let distribution = workbook.add_worksheet();
    distribution.set_name(DISTRIBUTION_SHEET)?;
    write_text_row(distribution, 0, &DISTRIBUTION_HEADER)?;
    for (row_idx, (category, amount, color)) in DEFAULT_DISTRIBUTION.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        write_text_cell(distribution, row, 0, category)?;
        distribution.write_number(row, 1, *amount)?;
        write_text_cell(distribution, row, 3, color)?;
    }

    workbook.save(path)?;
    info!(path = %path.display(), "template workbook written");
    Ok(())
}

/// Materialises rows fetched from a remote source as a local workbook so the
/// issue's inputs are kept alongside local ones.
pub fn write_snapshot_workbook(
    path: &Path,
    meta: &[Vec<String>],
    points: &[Vec<String>],
    distribution: &[Vec<String>],
) -> Result<()> {
    let mut workbook = Workbook::new();

    let mut tables = vec![(META_SHEET, meta), (POINTS_SHEET, points)];
    if !distribution.is_empty() {
        tables.push((DISTRIBUTION_SHEET, distribution));
    }

    for (sheet_name, rows) in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;
        for (row_idx, row) in rows.iter().enumerate() {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            write_text_row(worksheet, row_idx as u32, &cells)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_text_row(worksheet: &mut Worksheet, row: u32, cells: &[&str]) -> Result<()> {
    for (col_idx, cell) in cells.iter().enumerate() {
        write_text_cell(worksheet, row, col_idx as u16, cell)?;
    }
    Ok(())
}

fn write_text_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &str) -> Result<()> {
    if !value.is_empty() {
        worksheet.write_string(row, col, value)?;
    }
    Ok(())
}

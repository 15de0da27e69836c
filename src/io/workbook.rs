use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::error::{NewsletterError, Result};
use crate::io::rows::{RowSource, SheetRows};

/// Sheet holding the key/value meta table.
pub const META_SHEET: &str = "meta";
/// Sheet holding the ordered points.
pub const POINTS_SHEET: &str = "points";
/// Optional sheet holding the distribution segments.
pub const DISTRIBUTION_SHEET: &str = "distribution";

/// The three logical tables of a newsletter workbook.
#[derive(Debug, Clone)]
pub struct WorkbookTables {
    pub meta: SheetRows,
    pub points: SheetRows,
    pub distribution: Option<SheetRows>,
}

/// Opens the workbook at `path` and exposes its tables as row sources.
pub fn read_tables(path: &Path) -> Result<WorkbookTables> {
    if !path.exists() {
        return Err(NewsletterError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let meta = read_required_sheet(&mut workbook, META_SHEET)?;
    let points = read_required_sheet(&mut workbook, POINTS_SHEET)?;
    let distribution = read_optional_sheet(&mut workbook, DISTRIBUTION_SHEET)?;
    debug!(
        meta_rows = meta.height(),
        point_rows = points.height(),
        has_distribution = distribution.is_some(),
        "workbook tables loaded"
    );

    Ok(WorkbookTables {
        meta,
        points,
        distribution,
    })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<SheetRows> {
    read_optional_sheet(workbook, name)?
        .ok_or_else(|| NewsletterError::MissingSheet(name.to_string()))
}

fn read_optional_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Option<SheetRows>> {
    match workbook.worksheet_range(name) {
        Some(range) => {
            let range: calamine::Range<DataType> = range?;
            Ok(Some(SheetRows::new(range)))
        }
        None => Ok(None),
    }
}

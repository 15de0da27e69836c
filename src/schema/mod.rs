//! Decoding and validation of the three logical tables.
//!
//! Each table's header row is mapped to column positions once, up front, and
//! a missing required column fails before any data row is looked at. Row
//! numbers in diagnostics are 1-based sheet rows, so the first data row is 2.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::distribution;
use crate::error::{NewsletterError, Result};
use crate::io::rows::RowSource;
use crate::model::{DEFAULT_SEGMENT_COLOR, DistributionSegment, MAX_POINTS, Meta, Point, parse_number};

/// Columns every points sheet must declare.
pub const POINTS_REQUIRED: [&str; 5] = ["order", "title", "content", "image_path", "image_caption"];
/// Columns every distribution sheet must declare.
pub const DISTRIBUTION_REQUIRED: [&str; 3] = ["category", "amount_btc", "color"];

/// Case-insensitive mapping from header names to column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    /// Maps `header` and checks that every `required` column is present,
    /// naming all missing columns of `table` in a single error.
    pub fn build(table: &str, header: &[String], required: &[&str]) -> Result<Self> {
        let mut columns = HashMap::new();
        for (index, name) in header.iter().enumerate() {
            let key = name.trim().to_lowercase();
            if !key.is_empty() {
                columns.insert(key, index);
            }
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|name| !columns.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(NewsletterError::MissingColumns {
                table: table.to_string(),
                columns: missing,
            });
        }

        Ok(Self { columns })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Returns the trimmed cell of `row` under column `name`, or an empty
    /// string when the column is not mapped.
    pub fn cell<'r>(&self, row: &'r [String], name: &str) -> &'r str {
        self.columns
            .get(name)
            .and_then(|index| row.get(*index))
            .map(|value| value.trim())
            .unwrap_or("")
    }
}

/// Reads `(key, value)` rows after the header into a [`Meta`] table.
///
/// Blank keys are skipped, later keys overwrite earlier ones and documented
/// defaults fill whatever the sheet leaves out.
pub fn read_meta(source: &dyn RowSource) -> Meta {
    let mut entries = BTreeMap::new();
    for row in source.rows(1, None) {
        let key = row.first().map(|value| value.trim()).unwrap_or("");
        if key.is_empty() {
            continue;
        }
        let value = row.get(1).map(|value| value.trim()).unwrap_or("");
        entries.insert(key.to_string(), value.to_string());
    }
    debug!(observed = entries.len(), "meta entries read");
    Meta::with_defaults(entries)
}

/// Reads and validates the points table.
///
/// The result is sorted by order, free of duplicate orders and holds between
/// one and [`MAX_POINTS`] entries.
pub fn read_points(source: &dyn RowSource) -> Result<Vec<Point>> {
    let header = HeaderMap::build("points", &source.header(), &POINTS_REQUIRED)?;
    let mut points = Vec::new();

    for (offset, row) in source.rows(1, None).enumerate() {
        let row_number = offset + 2;
        let order_text = header.cell(&row, "order");
        let title = header.cell(&row, "title");
        let content = header.cell(&row, "content");
        let image_path = header.cell(&row, "image_path");
        let image_caption = header.cell(&row, "image_caption");
        let source_line = header.cell(&row, "source");

        if [order_text, title, content, image_path, image_caption, source_line]
            .iter()
            .all(|field| field.is_empty())
        {
            continue;
        }

        let order = parse_order(order_text, row_number)?;
        if title.is_empty() {
            return Err(NewsletterError::MissingField {
                row: row_number,
                field: "title",
            });
        }
        if content.is_empty() {
            return Err(NewsletterError::MissingField {
                row: row_number,
                field: "content",
            });
        }

        points.push(Point {
            order,
            title: title.to_string(),
            content: content.to_string(),
            image_path: image_path.to_string(),
            image_caption: image_caption.to_string(),
            source: source_line.to_string(),
        });
    }

    if points.is_empty() {
        return Err(NewsletterError::NoPoints);
    }

    points.sort_by_key(|point| point.order);

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for point in &points {
        *counts.entry(point.order).or_default() += 1;
    }
    let duplicates: Vec<u32> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(order, _)| order)
        .collect();
    if !duplicates.is_empty() {
        return Err(NewsletterError::DuplicateOrders(duplicates));
    }

    if points.len() > MAX_POINTS as usize {
        return Err(NewsletterError::TooManyPoints {
            count: points.len(),
        });
    }

    debug!(count = points.len(), "points validated");
    Ok(points)
}

/// Parses an order cell into a whole number in `1..=MAX_POINTS`.
pub fn parse_order(text: &str, row: usize) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NewsletterError::MissingOrder { row });
    }

    let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    if !is_digits(whole) || fraction.is_some_and(|fraction| !is_digits(fraction)) {
        return Err(NewsletterError::InvalidOrder {
            row,
            value: text.to_string(),
        });
    }
    if fraction.is_some_and(|fraction| fraction.bytes().any(|byte| byte != b'0')) {
        return Err(NewsletterError::FractionalOrder { row });
    }

    let value = whole.parse::<u64>().unwrap_or(u64::MAX);
    if value < 1 || value > u64::from(MAX_POINTS) {
        return Err(NewsletterError::OrderOutOfRange { row });
    }
    Ok(value as u32)
}

/// Reads the optional distribution table.
///
/// Raw segments are returned without percentages; an absent table, or one
/// without usable rows, yields the built-in default distribution instead.
pub fn read_distribution(source: Option<&dyn RowSource>) -> Result<Vec<DistributionSegment>> {
    let Some(source) = source.filter(|source| source.height() > 0) else {
        debug!("no distribution table, using defaults");
        return Ok(distribution::default_segments());
    };

    let header = HeaderMap::build("distribution", &source.header(), &DISTRIBUTION_REQUIRED)?;
    let mut segments = Vec::new();

    for row in source.rows(1, None) {
        let category = header.cell(&row, "category");
        let amount_btc = parse_number(header.cell(&row, "amount_btc"), 0.0);
        let color = match header.cell(&row, "color") {
            "" => DEFAULT_SEGMENT_COLOR,
            color => color,
        };
        let percent = if header.contains("percent") {
            parse_number(header.cell(&row, "percent"), 0.0)
        } else {
            0.0
        };

        if category.is_empty() && amount_btc <= 0.0 {
            continue;
        }
        if category.is_empty() {
            return Err(NewsletterError::MissingCategory);
        }
        if amount_btc < 0.0 {
            return Err(NewsletterError::NegativeAmount {
                category: category.to_string(),
            });
        }

        segments.push(DistributionSegment {
            category: category.to_string(),
            amount_btc,
            percent,
            color: color.to_string(),
        });
    }

    if segments.is_empty() {
        debug!("distribution table has no usable rows, using defaults");
        return Ok(distribution::default_segments());
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rows::TableRows;

    fn table(rows: &[&[&str]]) -> TableRows {
        TableRows::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    const POINTS_HEADER: &[&str] = &["order", "title", "content", "image_path", "image_caption"];

    #[test]
    fn header_matching_ignores_case_and_padding() {
        let header = vec![" Order ".to_string(), "TITLE".to_string()];
        let map = HeaderMap::build("points", &header, &["order", "title"]).unwrap();
        let row = vec![" 3 ".to_string(), "Hello".to_string()];

        assert_eq!(map.cell(&row, "order"), "3");
        assert_eq!(map.cell(&row, "title"), "Hello");
        assert_eq!(map.cell(&row, "source"), "");
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let source = table(&[&["order", "title"]]);
        let err = read_points(&source).unwrap_err();

        match err {
            NewsletterError::MissingColumns { table, columns } => {
                assert_eq!(table, "points");
                assert_eq!(columns, vec!["content", "image_path", "image_caption"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn points_are_sorted_and_spacers_skipped() {
        let source = table(&[
            &["order", "title", "content", "image_path", "image_caption", "source"],
            &["3", "Third", "c", "", "", "Desk"],
            &["", "", "", "", "", ""],
            &["1", "First", "a", "", "", ""],
        ]);
        let points = read_points(&source).unwrap();

        assert_eq!(points.iter().map(|p| p.order).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(points[1].source, "Desk");
    }

    #[test]
    fn order_must_be_whole_and_in_range() {
        assert!(matches!(parse_order("0", 2), Err(NewsletterError::OrderOutOfRange { row: 2 })));
        assert!(matches!(parse_order("11", 4), Err(NewsletterError::OrderOutOfRange { row: 4 })));
        assert!(matches!(parse_order("3.5", 5), Err(NewsletterError::FractionalOrder { row: 5 })));
        assert!(matches!(
            parse_order("three", 6),
            Err(NewsletterError::InvalidOrder { row: 6, ref value }) if value == "three"
        ));
        assert!(matches!(parse_order(" ", 7), Err(NewsletterError::MissingOrder { row: 7 })));
        assert_eq!(parse_order("10", 2).unwrap(), 10);
        assert_eq!(parse_order("4.0", 2).unwrap(), 4);
        assert_eq!(parse_order("007", 2).unwrap(), 7);
        assert!(matches!(parse_order("99999999999999999999", 9), Err(NewsletterError::OrderOutOfRange { row: 9 })));
    }

    #[test]
    fn order_accepts_only_plain_decimal_text() {
        for text in ["1e1", ".5e1", "+3", "3.", "-2", ".5", "3.0.0", "0x3", "inf", "NaN"] {
            assert!(
                matches!(parse_order(text, 3), Err(NewsletterError::InvalidOrder { row: 3, ref value }) if value == text),
                "{text:?} should be rejected as invalid"
            );
        }
    }

    #[test]
    fn missing_content_names_the_row() {
        let source = table(&[POINTS_HEADER, &["1", "Title", "", "", ""], &["2", "T", "", "", ""]]);
        let err = read_points(&source).unwrap_err();

        assert!(matches!(err, NewsletterError::MissingField { row: 2, field: "content" }));
        assert_eq!(err.to_string(), "missing content at points row 2");
    }

    #[test]
    fn missing_title_names_the_row() {
        let source = table(&[POINTS_HEADER, &["1", "T", "c", "", ""], &["2", "", "c", "", "cap"]]);
        let err = read_points(&source).unwrap_err();

        assert!(matches!(err, NewsletterError::MissingField { row: 3, field: "title" }));
    }

    #[test]
    fn every_duplicate_order_is_reported() {
        let source = table(&[
            POINTS_HEADER,
            &["2", "A", "a", "", ""],
            &["5", "B", "b", "", ""],
            &["2", "C", "c", "", ""],
            &["5", "D", "d", "", ""],
            &["1", "E", "e", "", ""],
        ]);
        let err = read_points(&source).unwrap_err();

        assert!(matches!(&err, NewsletterError::DuplicateOrders(orders) if orders == &vec![2, 5]));
        assert_eq!(err.to_string(), "duplicate order values found: 2, 5");
    }

    #[test]
    fn only_spacer_rows_means_no_points() {
        let source = table(&[POINTS_HEADER, &["", "", "", "", ""]]);
        assert!(matches!(read_points(&source), Err(NewsletterError::NoPoints)));
    }

    #[test]
    fn meta_skips_blank_keys_and_keeps_last_value() {
        let source = table(&[
            &["key", "value"],
            &["main_title", "First"],
            &["", "ignored"],
            &["main_title", " Second "],
            &["custom"],
        ]);
        let meta = read_meta(&source);

        assert_eq!(meta.text("main_title"), "Second");
        assert_eq!(meta.text("custom"), "");
        assert_eq!(meta.text("eyebrow"), "Globalite Macro Brief");
    }

    #[test]
    fn distribution_rows_are_validated() {
        let blank_category = table(&[&["category", "amount_btc", "color"], &["", "5", ""]]);
        assert!(matches!(
            read_distribution(Some(&blank_category)),
            Err(NewsletterError::MissingCategory)
        ));

        let negative = table(&[&["category", "amount_btc", "color"], &["Miners", "-1", ""]]);
        assert!(matches!(
            read_distribution(Some(&negative)),
            Err(NewsletterError::NegativeAmount { category }) if category == "Miners"
        ));

        let missing = table(&[&["Category", "percent"]]);
        assert!(matches!(
            read_distribution(Some(&missing)),
            Err(NewsletterError::MissingColumns { columns, .. }) if columns == vec!["amount_btc", "color"]
        ));
    }

    #[test]
    fn distribution_rows_keep_supplied_values() {
        let source = table(&[
            &["category", "amount_btc", "percent", "color"],
            &["", "0", "", ""],
            &["Miners", "1,000", "12.5", ""],
            &["Funds", "500", "", "#123456"],
        ]);
        let segments = read_distribution(Some(&source)).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].amount_btc, 1000.0);
        assert_eq!(segments[0].percent, 12.5);
        assert_eq!(segments[0].color, DEFAULT_SEGMENT_COLOR);
        assert_eq!(segments[1].color, "#123456");
    }

    #[test]
    fn absent_or_unusable_distribution_uses_defaults() {
        let defaults = distribution::default_segments();
        assert_eq!(read_distribution(None).unwrap(), defaults);

        let spacers = table(&[&["category", "amount_btc", "color"], &["", "", ""]]);
        assert_eq!(read_distribution(Some(&spacers)).unwrap(), defaults);

        let empty = TableRows::default();
        assert_eq!(read_distribution(Some(&empty)).unwrap(), defaults);
    }
}

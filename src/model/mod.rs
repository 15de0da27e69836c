use std::collections::BTreeMap;

/// Highest order value a point may carry, and the maximum number of points.
pub const MAX_POINTS: u32 = 10;

/// Colour used for a distribution row that leaves its colour cell blank.
pub const DEFAULT_SEGMENT_COLOR: &str = "rgb(255, 66, 2)";

/// Documented meta keys and the values used when a workbook omits them.
pub const DEFAULT_META: &[(&str, &str)] = &[
    ("eyebrow", "Globalite Macro Brief"),
    ("main_title", "WEEKLY TOP 10 ARGUMENTS"),
    (
        "subtitle",
        "A clear weekly macro summary with the key arguments that matter.",
    ),
    ("block_height", "925000"),
    ("max_supply_btc", "21000000"),
    ("circulating_supply_btc", "19960000"),
    ("hashrate_eh_s", "820"),
    ("hashrate_scale_eh_s", "1000"),
    ("snapshot_title", "At The Time Of Writing"),
    (
        "snapshot_intro",
        "At the time of writing, these on-chain supply anchors provide the baseline context.",
    ),
    (
        "snapshot_note",
        "Figures are rounded and updated with each issue.",
    ),
    ("tldr_title", "TL;DR"),
    (
        "tldr_content",
        "Leverage reset first, liquidity expanded next, and structural adoption kept building.",
    ),
    ("conclusion_title", "GLOBALITE CONCLUSION"),
    (
        "conclusion_content",
        "For deeper context on these points, visit globalite.co.\nOur team tracks macro shifts, liquidity, and positioning every week.",
    ),
    ("cta_url", "https://globalite.co"),
    ("cta_label", "globalite.co"),
    (
        "address_line",
        "Globalite, Lugano, Piazza dell'Indipendenza 3, CAP 6901",
    ),
    (
        "footer_line",
        "Globalite Macro Brief - For internal distribution.",
    ),
    ("footer_logo_url", "public/logotosite.png"),
    ("footer_instagram_icon", "public/instagram.png"),
    ("footer_x_icon", "public/x:twitter.png"),
    ("footer_linkedin_icon", "public/linkedin.png"),
    (
        "footer_instagram_url",
        "https://www.instagram.com/globalite.sa/",
    ),
    ("footer_x_url", "https://x.com/globalite_sa"),
    (
        "footer_linkedin_url",
        "https://www.linkedin.com/company/globalite-sa",
    ),
    ("header_logo_url", "brand_orange_bg_transparent@2xSite.svg"),
    ("image_dir", "."),
    ("auto_image_by_order", "true"),
    ("max_extra_images", "10"),
];

/// Built-in ownership breakdown used when the workbook has no distribution rows.
pub const DEFAULT_DISTRIBUTION: &[(&str, f64, &str)] = &[
    ("Individuals", 13_660_000.0, "rgb(255, 66, 2)"),
    ("Lost Bitcoin", 1_570_000.0, "rgb(153, 153, 153)"),
    ("Funds & ETFs", 1_490_000.0, "rgb(255, 140, 90)"),
    ("Businesses", 1_390_000.0, "rgb(255, 107, 61)"),
    ("To Be Mined", 1_040_000.0, "rgb(204, 204, 204)"),
    ("Satoshi / Patoshi", 968_000.0, "rgb(255, 200, 150)"),
    ("Governments", 432_000.0, "rgb(255, 173, 120)"),
    ("Other Entities", 421_000.0, "rgb(255, 227, 180)"),
];

/// Free-form key/value configuration of a newsletter issue.
///
/// Every key listed in [`DEFAULT_META`] is always present; values read from
/// the workbook take precedence over the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    entries: BTreeMap<String, String>,
}

impl Meta {
    /// Builds the meta table from observed entries, filling absent keys from
    /// [`DEFAULT_META`].
    pub fn with_defaults(mut entries: BTreeMap<String, String>) -> Self {
        for (key, value) in DEFAULT_META {
            entries
                .entry((*key).to_string())
                .or_insert_with(|| (*value).to_string());
        }
        Self { entries }
    }

    /// Returns the trimmed value stored for `key`, or an empty string.
    pub fn text(&self, key: &str) -> &str {
        self.entries.get(key).map(|value| value.trim()).unwrap_or("")
    }

    /// Parses the value stored for `key` as a number, falling back on blank or
    /// malformed text.
    pub fn number(&self, key: &str, fallback: f64) -> f64 {
        parse_number(self.text(key), fallback)
    }

    /// Interprets the value stored for `key` as a boolean switch.
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.text(key).to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::with_defaults(BTreeMap::new())
    }
}

/// Parses loosely formatted numeric text such as `21,000,000`.
///
/// Thousands separators are ignored; blank or unparsable text yields `fallback`.
pub fn parse_number(text: &str, fallback: f64) -> f64 {
    let cleaned: String = text.trim().chars().filter(|ch| *ch != ',').collect();
    if cleaned.is_empty() {
        return fallback;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => fallback,
    }
}

/// One ordered content entry of the newsletter.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Position of the entry, unique within an issue and in `1..=MAX_POINTS`.
    pub order: u32,
    pub title: String,
    /// Raw multi-line text, rendered through [`crate::markup`].
    pub content: String,
    pub image_path: String,
    pub image_caption: String,
    pub source: String,
}

/// One category's share of the supply breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSegment {
    pub category: String,
    pub amount_btc: f64,
    /// Share of the whole in percent; values `<= 0` are derived from the amount
    /// during normalization.
    pub percent: f64,
    pub color: String,
}

impl DistributionSegment {
    pub fn new(category: impl Into<String>, amount_btc: f64, color: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            amount_btc,
            percent: 0.0,
            color: color.into(),
        }
    }
}

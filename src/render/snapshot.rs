//! "At the time of writing" section: the ownership breakdown drawn as a donut
//! and a stacked bar, plus the circulating supply and hashrate cards.

use std::f64::consts::PI;

use crate::markup::escape_html;
use crate::model::{DistributionSegment, Meta};

/// Fallback for a missing or non-positive `max_supply_btc`.
pub const DEFAULT_MAX_SUPPLY_BTC: f64 = 21_000_000.0;
/// Fallback for a missing or non-positive `hashrate_scale_eh_s`.
pub const DEFAULT_HASHRATE_SCALE_EH_S: f64 = 1000.0;

const DONUT_RADIUS: f64 = 45.0;

/// Anchors shown next to the distribution, derived from the meta table.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplyFigures {
    pub max_supply_btc: f64,
    pub circulating_btc: f64,
    pub hashrate_eh_s: f64,
    pub hashrate_scale_eh_s: f64,
}

impl SupplyFigures {
    /// Reads the numeric anchors; a non-positive circulating supply is
    /// estimated as the max supply minus the "To Be Mined" segment.
    pub fn from_meta(meta: &Meta, distribution: &[DistributionSegment]) -> Self {
        let max_supply_btc = positive_or(
            meta.number("max_supply_btc", DEFAULT_MAX_SUPPLY_BTC),
            DEFAULT_MAX_SUPPLY_BTC,
        );
        let mut circulating_btc = meta.number("circulating_supply_btc", 0.0);
        if circulating_btc <= 0.0 {
            let unmined: f64 = distribution
                .iter()
                .filter(|segment| segment.category.trim().eq_ignore_ascii_case("to be mined"))
                .map(|segment| segment.amount_btc)
                .sum();
            circulating_btc = (max_supply_btc - unmined).max(0.0);
        }
        Self {
            max_supply_btc,
            circulating_btc,
            hashrate_eh_s: meta.number("hashrate_eh_s", 0.0),
            hashrate_scale_eh_s: positive_or(
                meta.number("hashrate_scale_eh_s", DEFAULT_HASHRATE_SCALE_EH_S),
                DEFAULT_HASHRATE_SCALE_EH_S,
            ),
        }
    }

    pub fn circulation_percent(&self) -> f64 {
        self.circulating_btc / self.max_supply_btc * 100.0
    }

    pub fn hashrate_percent(&self) -> f64 {
        self.hashrate_eh_s / self.hashrate_scale_eh_s * 100.0
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 { value } else { fallback }
}

/// Arc of one donut segment: the dash length and the offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonutArc {
    pub length: f64,
    pub offset: f64,
}

/// Circumference of the donut ring.
pub fn donut_circumference() -> f64 {
    2.0 * PI * DONUT_RADIUS
}

/// Lays the segments end to end around the ring, each taking its percent
/// share of the circumference.
pub fn donut_arcs(distribution: &[DistributionSegment]) -> Vec<DonutArc> {
    let circumference = donut_circumference();
    let mut consumed = 0.0;
    distribution
        .iter()
        .map(|segment| {
            let length = circumference * (segment.percent.max(0.0) / 100.0);
            let arc = DonutArc {
                length,
                offset: -consumed,
            };
            consumed += length;
            arc
        })
        .collect()
}

/// Renders the snapshot section as a table row of the page body.
pub fn render_snapshot_section(meta: &Meta, distribution: &[DistributionSegment]) -> String {
    let figures = SupplyFigures::from_meta(meta, distribution);
    let title = match meta.text("snapshot_title") {
        "" => "At The Time Of Writing",
        title => title,
    };
    let circumference = donut_circumference();
    let max_supply = format_btc_integer(figures.max_supply_btc);

    let mut donut = String::new();
    let mut bar = String::new();
    let mut legend = String::new();
    for (segment, arc) in distribution.iter().zip(donut_arcs(distribution)) {
        let label = format!(
            "{}: {} ({})",
            segment.category,
            format_btc_compact(segment.amount_btc),
            format_percent(segment.percent)
        );
        let color = escape_html(&segment.color);
        donut.push_str(&format!(
            "                      <circle class=\"snapshot-donut-segment\" cx=\"60\" cy=\"60\" r=\"45\" stroke=\"{color}\" stroke-dasharray=\"{:.6} {circumference:.6}\" stroke-dashoffset=\"{:.6}\"><title>{}</title></circle>\n",
            arc.length,
            arc.offset,
            escape_html(&label)
        ));
        bar.push_str(&format!(
            "                    <div class=\"snapshot-bar-segment\" style=\"width:{:.6}%;background:{color};\" title=\"{}\"></div>\n",
            segment.percent.max(0.0),
            escape_html(&label)
        ));
        legend.push_str(&format!(
            "                    <div class=\"snapshot-legend-item\"><span class=\"snapshot-dot\" style=\"background:{color}\"></span><span class=\"snapshot-name\">{}</span><span class=\"snapshot-value\">{} ({})</span></div>\n",
            escape_html(&segment.category),
            escape_html(&format_btc_compact(segment.amount_btc)),
            escape_html(&format_percent(segment.percent))
        ));
    }

    let circulation = progress_card(
        "Bitcoin In Circulation At Write Time",
        &format!("{} BTC", format_btc_integer(figures.circulating_btc)),
        figures.circulation_percent(),
        &format!(
            "{} of {max_supply} BTC max supply",
            format_percent(figures.circulation_percent())
        ),
    );
    let hashrate = progress_card(
        "Network Hashrate (Daily)",
        &format!("{} EH/s", format_btc_integer(figures.hashrate_eh_s)),
        figures.hashrate_percent(),
        &format!(
            "{} of {} EH/s reference scale",
            format_percent(figures.hashrate_percent()),
            format_btc_integer(figures.hashrate_scale_eh_s)
        ),
    );

    format!(
        r##"            <tr>
              <td class="section snapshot">
                <h2>{title}</h2>
                <p class="snapshot-intro">{intro}</p>
                <div class="snapshot-grid">
                  <div class="snapshot-card">
                    <h3>Ownership Distribution</h3>
                    <div class="snapshot-ownership-viz">
                      <svg class="snapshot-donut" viewBox="0 0 120 120" aria-label="Ownership distribution donut chart">
                        <circle cx="60" cy="60" r="45" fill="none" stroke="#ececec" stroke-width="24"></circle>
{donut}                        <circle cx="60" cy="60" r="30" fill="#ffffff"></circle>
                        <text x="60" y="56" text-anchor="middle" class="snapshot-donut-label">Supply</text>
                        <text x="60" y="72" text-anchor="middle" class="snapshot-donut-value">{max_supply}</text>
                      </svg>
                    </div>
                    <div class="snapshot-bar">
{bar}                    </div>
                    <div class="snapshot-legend">
{legend}                    </div>
                  </div>
{circulation}{hashrate}                </div>
                <p class="snapshot-footnote">{note}</p>
              </td>
            </tr>
"##,
        title = escape_html(title),
        intro = escape_html(meta.text("snapshot_intro")),
        max_supply = escape_html(&max_supply),
        note = escape_html(meta.text("snapshot_note")),
    )
}

fn progress_card(heading: &str, value: &str, percent: f64, note: &str) -> String {
    format!(
        r#"                  <div class="snapshot-card">
                    <h3>{}</h3>
                    <p class="snapshot-circ-value">{}</p>
                    <div class="snapshot-progress-track">
                      <div class="snapshot-progress-fill" style="width:{:.6}%;"></div>
                    </div>
                    <p class="snapshot-circ-note">{}</p>
                  </div>
"#,
        escape_html(heading),
        escape_html(value),
        percent.clamp(0.0, 100.0),
        escape_html(note)
    )
}

/// Rounds to a whole number and groups thousands with commas.
pub fn format_btc_integer(value: f64) -> String {
    group_thousands(value.round_ties_even() as i64)
}

/// Short amount label such as `13.66M BTC`, `968K BTC` or `420 BTC`.
pub fn format_btc_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        let millions = format!("{:.2}", value / 1_000_000.0);
        format!("{}M BTC", trim_fraction(&millions))
    } else if magnitude >= 1_000.0 {
        let thousands = (value / 1_000.0).round_ties_even() as i64;
        format!("{}K BTC", group_thousands(thousands))
    } else {
        format!("{} BTC", format_btc_integer(value))
    }
}

/// Percent with at most one decimal, trailing zeros dropped: `65%`, `7.5%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", trim_fraction(&format!("{value:.1}")))
}

/// Formats a block height with thousands separators when numeric, verbatim
/// otherwise, and `n/a` when blank.
pub fn format_block_height(value: &str) -> String {
    let clean = value.trim();
    if clean.is_empty() {
        return "n/a".to_string();
    }
    let numeric = crate::model::parse_number(clean, -1.0);
    if numeric >= 0.0 {
        format_btc_integer(numeric)
    } else {
        clean.to_string()
    }
}

fn trim_fraction(rendered: &str) -> &str {
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::distribution::{default_segments, normalize};

    fn meta(entries: &[(&str, &str)]) -> Meta {
        Meta::with_defaults(
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn amounts_are_formatted_for_humans() {
        assert_eq!(format_btc_integer(21_000_000.0), "21,000,000");
        assert_eq!(format_btc_integer(999.5), "1,000");
        assert_eq!(format_btc_integer(-1234.0), "-1,234");
        assert_eq!(format_btc_compact(13_660_000.0), "13.66M BTC");
        assert_eq!(format_btc_compact(2_000_000.0), "2M BTC");
        assert_eq!(format_btc_compact(968_000.0), "968K BTC");
        assert_eq!(format_btc_compact(1_234_000.0), "1.23M BTC");
        assert_eq!(format_btc_compact(420.0), "420 BTC");
    }

    #[test]
    fn percentages_drop_trailing_zeros() {
        assert_eq!(format_percent(65.0), "65%");
        assert_eq!(format_percent(7.48), "7.5%");
        assert_eq!(format_percent(100.0), "100%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn block_height_falls_back_to_text() {
        assert_eq!(format_block_height("925000"), "925,000");
        assert_eq!(format_block_height(" "), "n/a");
        assert_eq!(format_block_height("pending"), "pending");
    }

    #[test]
    fn donut_arcs_cover_the_ring() {
        let distribution = normalize(default_segments(), 21_000_000.0);
        let arcs = donut_arcs(&distribution);
        let total: f64 = arcs.iter().map(|arc| arc.length).sum();

        assert!((total - donut_circumference()).abs() < 1e-9);
        assert_eq!(arcs[0].offset, 0.0);
        assert!((arcs[1].offset + arcs[0].length).abs() < 1e-12);
    }

    #[test]
    fn circulating_supply_falls_back_to_unmined_remainder() {
        let distribution = normalize(default_segments(), 21_000_000.0);
        let figures = SupplyFigures::from_meta(
            &meta(&[("circulating_supply_btc", "0"), ("max_supply_btc", "-5")]),
            &distribution,
        );

        assert_eq!(figures.max_supply_btc, DEFAULT_MAX_SUPPLY_BTC);
        assert_eq!(figures.circulating_btc, 21_000_000.0 - 1_040_000.0);
    }

    #[test]
    fn section_lists_every_segment() {
        let distribution = normalize(default_segments(), 21_000_000.0);
        let html = render_snapshot_section(&meta(&[]), &distribution);

        assert_eq!(html.matches("snapshot-donut-segment").count(), distribution.len());
        assert_eq!(html.matches("snapshot-bar-segment").count(), distribution.len());
        assert!(html.contains("Funds &amp; ETFs"));
        assert!(html.contains(">21,000,000</text>"));
        assert!(html.contains("19,960,000 BTC"));
    }

    #[test]
    fn segment_markup_is_one_line_per_segment() {
        let distribution = normalize(default_segments(), 21_000_000.0);
        let html = render_snapshot_section(&meta(&[]), &distribution);

        let circles: Vec<&str> = html.lines().filter(|line| line.contains("<circle class=\"snapshot-donut-segment\"")).collect();
        assert_eq!(circles.len(), distribution.len());
        assert!(circles.iter().all(|line| line.trim_end().ends_with("</circle>")));

        let legend: Vec<&str> = html.lines().filter(|line| line.contains("snapshot-legend-item\"")).collect();
        assert_eq!(legend.len(), distribution.len());
        assert!(legend[0].contains("Individuals"));
        assert!(legend.iter().all(|line| line.trim_end().ends_with("</div>")));
    }
}

use std::path::Path;

use tracing::debug;

use crate::markup::{escape_html, render_content_blocks};
use crate::model::{DistributionSegment, Meta, Point};
use crate::render::images::{self, ImageProbe, ImageSettings};
use crate::render::shell::wrap_page;
use crate::render::snapshot::{format_block_height, render_snapshot_section};

/// Everything a page is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInputs<'a> {
    pub meta: &'a Meta,
    pub points: &'a [Point],
    pub distribution: &'a [DistributionSegment],
    /// Directory the page is written to; local image references resolve
    /// against it.
    pub output_dir: &'a Path,
}

/// Assembles the complete newsletter page.
pub fn render_document(inputs: DocumentInputs<'_>, probe: &dyn ImageProbe) -> String {
    let meta = inputs.meta;
    let settings = ImageSettings::from_meta(meta);
    debug!(?settings, points = inputs.points.len(), "assembling document");

    let mut rows = render_header(meta);
    for point in inputs.points {
        rows.push_str(&render_point(point, &settings, probe, inputs.output_dir));
    }
    rows.push_str(&render_text_section("tldr", meta.text("tldr_title"), meta.text("tldr_content")));
    rows.push_str(&render_text_section(
        "conclusion",
        meta.text("conclusion_title"),
        meta.text("conclusion_content"),
    ));
    rows.push_str(&render_snapshot_section(meta, inputs.distribution));
    rows.push_str(&render_footer(meta));

    let title = format!("{} - {}", meta.text("main_title"), meta.text("eyebrow"));
    wrap_page(&escape_html(&title), &rows)
}

fn render_header(meta: &Meta) -> String {
    format!(
        r#"            <tr>
              <td class="header">
                <div class="logo">
                  <img src="{logo}" alt="{brand}">
                </div>
                <p class="eyebrow">{eyebrow}</p>
                <h1>{title}</h1>
                <p class="subtitle">{subtitle}</p>
                <p class="block-height">This article was written at block height: <strong>{block_height}</strong></p>
              </td>
            </tr>
"#,
        logo = escape_html(meta.text("header_logo_url")),
        brand = escape_html(meta.text("cta_label")),
        eyebrow = escape_html(meta.text("eyebrow")),
        title = escape_html(meta.text("main_title")),
        subtitle = escape_html(meta.text("subtitle")),
        block_height = escape_html(&format_block_height(meta.text("block_height"))),
    )
}

/// Renders one point as a section row: heading, primary image, content,
/// source line and extra images.
pub fn render_point(
    point: &Point,
    settings: &ImageSettings,
    probe: &dyn ImageProbe,
    output_dir: &Path,
) -> String {
    let mut parts = vec![
        "            <tr>".to_string(),
        "              <td class=\"section\">".to_string(),
        format!("                <h2>{}. {}</h2>", point.order, escape_html(&point.title)),
    ];

    if let Some(src) = images::resolve_primary(point, settings, probe, output_dir) {
        let caption = if point.image_caption.is_empty() {
            &point.title
        } else {
            &point.image_caption
        };
        let block = format!(
            "<div class=\"image\">\n  <img src=\"{}\" alt=\"{}\">\n  <div class=\"caption\">{}</div>\n</div>",
            escape_html(&src),
            escape_html(&point.title),
            escape_html(caption)
        );
        parts.push(indent_block(&block, 16));
    }

    parts.push(indent_block(&render_content_blocks(&point.content), 16));

    if !point.source.is_empty() {
        parts.push(format!(
            "                <p class=\"point-source\">{}</p>",
            escape_html(&point.source)
        ));
    }

    let extras = images::resolve_extras(point, settings, probe, output_dir);
    if !extras.is_empty() {
        let tags: Vec<String> = extras
            .iter()
            .enumerate()
            .map(|(index, src)| {
                format!(
                    "  <img src=\"{}\" alt=\"{} - extra {}\">",
                    escape_html(src),
                    escape_html(&point.title),
                    index + 1
                )
            })
            .collect();
        let block = format!("<div class=\"extra-images\">\n{}\n</div>", tags.join("\n"));
        parts.push(indent_block(&block, 16));
    }

    parts.push("              </td>".to_string());
    parts.push("            </tr>".to_string());
    parts.join("\n") + "\n"
}

fn render_text_section(class: &str, title: &str, content: &str) -> String {
    format!(
        "            <tr>\n              <td class=\"section {class}\">\n                <h2>{}</h2>\n{}\n              </td>\n            </tr>\n",
        escape_html(title),
        indent_block(&render_content_blocks(content), 16)
    )
}

fn render_footer(meta: &Meta) -> String {
    let social = [
        ("footer_instagram_url", "footer_instagram_icon", "Instagram"),
        ("footer_x_url", "footer_x_icon", "X"),
        ("footer_linkedin_url", "footer_linkedin_icon", "LinkedIn"),
    ]
    .iter()
    .map(|(url, icon, label)| {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\"><img src=\"{}\" alt=\"{label}\"></a>",
            escape_html(meta.text(url)),
            escape_html(meta.text(icon))
        )
    })
    .collect::<Vec<_>>()
    .join("");

    format!(
        r#"            <tr>
              <td class="footer">
                <p>{footer_line}</p>
                <p>{address_line}</p>
                <div class="footer-links">
                  <a class="footer-logo-link" href="{cta_url}" target="_blank" rel="noopener noreferrer">
                    <img src="{logo}" alt="{brand} logo">
                  </a>
                  <div class="footer-social">{social}</div>
                </div>
              </td>
            </tr>
"#,
        footer_line = escape_html(meta.text("footer_line")),
        address_line = escape_html(meta.text("address_line")),
        cta_url = escape_html(meta.text("cta_url")),
        logo = escape_html(meta.text("footer_logo_url")),
        brand = escape_html(meta.text("cta_label")),
    )
}

/// Indents every non-empty line of `text` by `spaces`.
fn indent_block(text: &str, spaces: usize) -> String {
    let prefix = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::distribution::{default_segments, normalize};

    struct NoFiles;

    impl ImageProbe for NoFiles {
        fn exists(&self, _base: &Path, _candidate: &str) -> bool {
            false
        }
    }

    fn point(order: u32, title: &str, content: &str) -> Point {
        Point {
            order,
            title: title.to_string(),
            content: content.to_string(),
            image_path: String::new(),
            image_caption: String::new(),
            source: String::new(),
        }
    }

    #[test]
    fn document_contains_points_in_order_and_escaped_meta() {
        let mut entries = BTreeMap::new();
        entries.insert("main_title".to_string(), "Rates & <Risk>".to_string());
        entries.insert("cta_url".to_string(), "https://example.com/?a=1&b=\"2\"".to_string());
        let meta = Meta::with_defaults(entries);
        let points = vec![point(1, "First", "Up 5%"), point(2, "Second", "- a\n- b")];
        let distribution = normalize(default_segments(), 21_000_000.0);

        let html = render_document(
            DocumentInputs {
                meta: &meta,
                points: &points,
                distribution: &distribution,
                output_dir: Path::new("."),
            },
            &NoFiles,
        );

        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<h1>Rates &amp; &lt;Risk&gt;</h1>"));
        assert!(html.contains("href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\""));
        let first = html.find("<h2>1. First</h2>").expect("first point rendered");
        let second = html.find("<h2>2. Second</h2>").expect("second point rendered");
        assert!(first < second);
        assert!(html.contains("<p>Up <strong>5%</strong></p>"));
        assert!(!html.contains("class=\"image\""));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn point_renders_image_caption_fallback_and_source() {
        struct Everything;
        impl ImageProbe for Everything {
            fn exists(&self, _base: &Path, _candidate: &str) -> bool {
                true
            }
        }

        let mut item = point(3, "Chart \"A\"", "Body");
        item.source = "Source: Desk".to_string();
        let settings = ImageSettings {
            image_dir: "img".to_string(),
            auto_by_order: true,
            max_extra_images: 1,
        };

        let html = render_point(&item, &settings, &Everything, Path::new("."));

        assert!(html.contains("<img src=\"img/3.png\" alt=\"Chart &quot;A&quot;\">"));
        assert!(html.contains("<div class=\"caption\">Chart &quot;A&quot;</div>"));
        assert!(html.contains("<p class=\"point-source\">Source: Desk</p>"));
        assert_eq!(html.matches(" - extra ").count(), 1);
        assert!(html.contains("<img src=\"img/3.1.png\" alt=\"Chart &quot;A&quot; - extra 1\">"));
        assert!(!html.contains("img/3.1.webp"));
    }

    #[test]
    fn indentation_skips_blank_lines() {
        assert_eq!(indent_block("a\n\nb", 2), "  a\n\n  b");
        assert_eq!(indent_block("", 4), "");
    }
}

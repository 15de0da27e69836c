//! Fixed page chrome: document head, stylesheet, print toolbar and the
//! auto-refresh script.

const STYLESHEET: &str = r#"      body {
        margin: 0;
        padding: 0;
        background: #f5f5f5;
        font-family: "Poppins", Arial, sans-serif;
        color: #1f1f1f;
        -webkit-print-color-adjust: exact;
        print-color-adjust: exact;
      }
      table { border-collapse: collapse; }
      img { border: 0; display: block; max-width: 100%; height: auto; }
      a { color: #ff4202; text-decoration: none; }
      .toolbar { width: 100%; max-width: 680px; margin: 0 auto; display: flex; justify-content: flex-end; padding: 12px 0 8px; }
      .download-pdf-btn { border: 1px solid #ff4202; border-radius: 999px; padding: 8px 14px; background: #ffffff; color: #ff4202; font: 600 12px/1 "Poppins", Arial, sans-serif; cursor: pointer; }
      .download-pdf-btn:hover { background: #fff4ef; }
      .wrapper { width: 100%; background: #f5f5f5; padding: 32px 0; }
      .container { width: 680px; max-width: 680px; background: #ffffff; border: 1px solid #e6e6e6; border-radius: 16px; overflow: hidden; }
      .divider { height: 4px; background: #ff4202; line-height: 4px; }
      .header { padding: 28px 32px 18px; }
      .logo { margin: 0 0 16px; text-align: center; }
      .logo img { width: 190px; margin: 0 auto; }
      .eyebrow { color: #ff4202; font-weight: 700; font-size: 12px; letter-spacing: 1px; text-transform: uppercase; margin: 0 0 6px; }
      h1 { margin: 6px 0 6px; font-size: 28px; line-height: 1.2; font-weight: 700; }
      .subtitle { margin: 0; color: #5f5f5f; font-size: 14px; line-height: 1.6; }
      .block-height { margin: 12px 0 0; display: inline-block; font-size: 12px; line-height: 1.4; color: #8f3a1a; background: #fff1eb; border: 1px solid #ffd6c8; border-radius: 999px; padding: 6px 10px; }
      .section { padding: 16px 32px; border-top: 1px solid #f0f0f0; }
      .section h2 { margin: 0 0 20px; font-size: 18px; font-weight: 700; }
      .section p { margin: 0; font-size: 14px; line-height: 1.6; }
      .section p + p { margin-top: 12px; }
      .section ul { margin: 20px 0 20px 18px; padding: 0; font-size: 14px; line-height: 1.6; }
      .section li { margin-bottom: 8px; }
      .section .point-source { margin-top: 14px; font-size: 11px; line-height: 1.5; color: #8a8a8a; }
      .image { margin: 20px 0; }
      .image img { width: 100%; border-radius: 12px; border: 1px solid #e6e6e6; }
      .caption { font-size: 12px; color: #7a7a7a; margin-top: 6px; }
      .extra-images { margin: 14px 0 0; display: grid; gap: 10px; }
      .extra-images img { width: 100%; border-radius: 12px; border: 1px solid #e6e6e6; }
      .snapshot { background: #fcfcfc; }
      .snapshot-intro { margin: 0 0 14px; font-size: 14px; color: #4f4f4f; }
      .snapshot-grid { display: grid; grid-template-columns: 1fr 1fr 1fr; gap: 12px; }
      .snapshot-card { border: 1px solid #ececec; border-radius: 12px; padding: 12px; background: #ffffff; }
      .snapshot-card h3 { margin: 0 0 10px; font-size: 14px; font-weight: 700; color: #1f1f1f; }
      .snapshot-ownership-viz { display: flex; justify-content: center; margin: 0 0 10px; }
      .snapshot-donut { width: 132px; height: 132px; display: block; }
      .snapshot-donut-segment { fill: none; stroke-width: 24; transform: rotate(-90deg); transform-origin: 60px 60px; }
      .snapshot-donut-label { font-size: 10px; fill: #8a8a8a; }
      .snapshot-donut-value { font-size: 10px; fill: #5f5f5f; }
      .snapshot-bar { width: 100%; height: 24px; border: 1px solid #e6e6e6; border-radius: 8px; overflow: hidden; display: flex; }
      .snapshot-bar-segment { height: 100%; min-width: 2px; }
      .snapshot-legend { margin-top: 10px; display: grid; gap: 6px; }
      .snapshot-legend-item { display: grid; grid-template-columns: 12px 1fr auto; align-items: center; gap: 8px; }
      .snapshot-dot { width: 10px; height: 10px; border-radius: 999px; display: inline-block; }
      .snapshot-name { font-size: 12px; color: #3f3f3f; }
      .snapshot-value { font-size: 12px; color: #5f5f5f; white-space: nowrap; }
      .snapshot-circ-value { margin: 0 0 8px; font-size: 22px; font-weight: 700; color: #1f1f1f; }
      .snapshot-progress-track { width: 100%; height: 14px; border: 1px solid #e0e0e0; border-radius: 999px; background: #f0f0f0; overflow: hidden; }
      .snapshot-progress-fill { height: 100%; background: linear-gradient(90deg, #ff4202 0%, #ff8b61 100%); }
      .snapshot-circ-note { margin: 8px 0 0; font-size: 12px; color: #666666; }
      .snapshot-footnote { margin: 12px 0 0; font-size: 12px; color: #7a7a7a; }
      .tldr { background: #fff8ec; border-top: 2px solid #ff4202; }
      .conclusion { background: #fff7f3; border-top: 2px solid #ff4202; }
      .footer { padding: 18px 32px 28px; font-size: 12px; color: #7a7a7a; }
      .footer p { margin: 0; }
      .footer p + p { margin-top: 6px; }
      .footer-links { margin-top: 14px; padding-top: 12px; border-top: 1px solid #ececec; display: flex; align-items: center; justify-content: space-between; gap: 14px; }
      .footer-logo-link { display: inline-flex; }
      .footer-logo-link img { width: 44px; height: 44px; object-fit: cover; border-radius: 20px; border: 1px solid #e0e0e0; }
      .footer-social { display: flex; align-items: center; gap: 10px; }
      .footer-social a { display: inline-flex; }
      .footer-social img { width: 24px; height: 24px; object-fit: contain; border-radius: 6px; }
      @media (max-width: 720px) {
        .toolbar { padding: 10px 16px 6px; box-sizing: border-box; }
        .wrapper { padding: 16px 0; }
        .container { width: 100%; max-width: 100%; border-radius: 0; }
        .header, .section, .footer { padding: 18px 20px; }
        .snapshot-grid { grid-template-columns: 1fr; }
        .footer-links { flex-direction: column; align-items: flex-start; }
        h1 { font-size: 24px; }
      }
      @media print {
        .no-print { display: none !important; }
        body { background: #ffffff; }
        .wrapper { background: #ffffff; padding: 0; }
        .container { border: 0; border-radius: 0; }
      }
"#;

// Reloads the page every `?refresh=<seconds>` (minimum 5) when opened in a browser.
const REFRESH_SCRIPT: &str = r#"    <script>
      (function () {
        var params = new URLSearchParams(window.location.search);
        var refreshSeconds = Number(params.get("refresh"));
        if (!Number.isFinite(refreshSeconds) || refreshSeconds < 5) {
          return;
        }
        window.setInterval(function () {
          window.location.reload();
        }, refreshSeconds * 1000);
      })();
    </script>
"#;

/// Wraps the rendered container rows in the full page. `title` must already
/// be escaped.
pub fn wrap_page(title: &str, rows: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Poppins:wght@400;500;700&display=swap" rel="stylesheet">
    <style>
{STYLESHEET}    </style>
  </head>
  <body>
    <div class="toolbar no-print">
      <button class="download-pdf-btn" type="button" onclick="window.print()">Download PDF</button>
    </div>
    <table class="wrapper" role="presentation" width="100%" cellpadding="0" cellspacing="0">
      <tr>
        <td align="center">
          <table class="container" role="presentation" cellpadding="0" cellspacing="0">
            <tr>
              <td class="divider">&nbsp;</td>
            </tr>
{rows}          </table>
        </td>
      </tr>
    </table>
{REFRESH_SCRIPT}  </body>
</html>
"#
    )
}

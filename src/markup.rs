//! Free-text to markup conversion.
//!
//! Content cells are plain multi-line text. Lines starting with `- ` or `* `
//! become list items, other non-blank lines become paragraphs, and blank lines
//! only separate blocks. Number-like tokens are wrapped in `<strong>` and all
//! remaining text is HTML-escaped.

/// Magnitude and percent suffixes a number token may carry.
const NUMBER_SUFFIXES: &[u8] = b"kKmMbBtT%";

/// Renders a block of raw text into `<p>`, `<ul>` and `<li>` elements, one
/// element per line.
pub fn render_content_blocks(raw: &str) -> String {
    let mut writer = BlockWriter::default();
    for line in raw.replace("\r\n", "\n").split('\n') {
        let line = line.trim();
        if line.is_empty() {
            writer.close_list();
        } else if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            writer.list_item(&emphasize_numbers(item.trim()));
        } else {
            writer.paragraph(&emphasize_numbers(line));
        }
    }
    writer.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ListState {
    #[default]
    NoList,
    OpenList,
}

/// Collects rendered blocks; `<ul>` is emitted only on the transition into
/// [`ListState::OpenList`] and `</ul>` only on the transition out of it.
#[derive(Debug, Default)]
struct BlockWriter {
    blocks: Vec<String>,
    state: ListState,
}

impl BlockWriter {
    fn list_item(&mut self, html: &str) {
        if self.state == ListState::NoList {
            self.blocks.push("<ul>".to_string());
            self.state = ListState::OpenList;
        }
        self.blocks.push(format!("<li>{html}</li>"));
    }

    fn paragraph(&mut self, html: &str) {
        self.close_list();
        self.blocks.push(format!("<p>{html}</p>"));
    }

    fn close_list(&mut self) {
        if self.state == ListState::OpenList {
            self.blocks.push("</ul>".to_string());
            self.state = ListState::NoList;
        }
    }

    fn finish(mut self) -> String {
        self.close_list();
        self.blocks.join("\n")
    }
}

/// Escapes `text` and wraps every number-like token in `<strong>`.
pub fn emphasize_numbers(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in number_tokens(text) {
        output.push_str(&escape_html(&text[last..start]));
        output.push_str("<strong>");
        output.push_str(&escape_html(&text[start..end]));
        output.push_str("</strong>");
        last = end;
    }
    output.push_str(&escape_html(&text[last..]));
    output
}

/// Returns the byte ranges of number-like tokens in `text`.
///
/// A token is an integer, optionally grouped in thousands with commas, with
/// an optional decimal fraction and an optional `k`/`m`/`b`/`t`/`%` suffix. It
/// must not touch a word character on either side, so digits inside words
/// such as `Q4` are left alone. When the longest reading of a token touches a
/// word character, shorter readings are tried in turn: in `1,2M` the `1` and
/// the `2M` are separate tokens.
pub fn number_tokens(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos].is_ascii_digit() && !text[..pos].chars().next_back().is_some_and(is_word_char) {
            if let Some(end) = match_token_at(text, pos) {
                tokens.push((pos, end));
                pos = end;
                continue;
            }
        }
        pos += text[pos..].chars().next().map_or(1, char::len_utf8);
    }
    tokens
}

/// Tries the token readings starting at `start` from longest to shortest and
/// returns the end of the first one not followed by a word character.
fn match_token_at(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let digit_run = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    let run = digit_run(start);

    let mut integer_ends = Vec::new();
    if run <= 3 {
        let mut grouped_ends = Vec::new();
        let mut pos = start + run;
        while bytes.get(pos) == Some(&b',')
            && bytes.len() >= pos + 4
            && bytes[pos + 1..pos + 4].iter().all(u8::is_ascii_digit)
        {
            pos += 4;
            grouped_ends.push(pos);
        }
        integer_ends.extend(grouped_ends.into_iter().rev());
    }
    integer_ends.extend((1..=run).rev().map(|len| start + len));

    for integer_end in integer_ends {
        let mut fraction_ends = Vec::new();
        if bytes.get(integer_end) == Some(&b'.') {
            let fraction = digit_run(integer_end + 1);
            fraction_ends.extend((1..=fraction).rev().map(|len| integer_end + 1 + len));
        }
        fraction_ends.push(integer_end);

        for fraction_end in fraction_ends {
            let mut ends = Vec::with_capacity(2);
            if bytes
                .get(fraction_end)
                .is_some_and(|byte| NUMBER_SUFFIXES.contains(byte))
            {
                ends.push(fraction_end + 1);
            }
            ends.push(fraction_end);

            for end in ends {
                if !text[end..].chars().next().is_some_and(is_word_char) {
                    return Some(end);
                }
            }
        }
    }
    None
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Escapes text for element content and quoted attribute values alike.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        number_tokens(text)
            .into_iter()
            .map(|(start, end)| &text[start..end])
            .collect()
    }

    #[test]
    fn grouped_and_suffixed_numbers_are_emphasized() {
        assert_eq!(
            emphasize_numbers("BTC rose 12,500 this week, +3.2% gain"),
            "BTC rose <strong>12,500</strong> this week, +<strong>3.2%</strong> gain"
        );
    }

    #[test]
    fn digits_inside_words_are_left_alone() {
        assert!(tokens("Q4 results for 2x leverage and abc123").is_empty());
        assert_eq!(emphasize_numbers("Q4"), "Q4");
        assert_eq!(tokens("up_5"), Vec::<&str>::new());
    }

    #[test]
    fn magnitude_suffixes_are_part_of_the_token() {
        assert_eq!(tokens("ETF flows hit 1.5B and 300k, 2T, 40M"), vec!["1.5B", "300k", "2T", "40M"]);
    }

    #[test]
    fn comma_then_suffix_splits_into_two_tokens() {
        assert_eq!(tokens("1,2M"), vec!["1", "2M"]);
        assert_eq!(
            emphasize_numbers("1,2M"),
            "<strong>1</strong>,<strong>2M</strong>"
        );
    }

    #[test]
    fn shorter_reading_is_used_when_longer_touches_a_word() {
        assert_eq!(tokens("12,500x"), vec!["12"]);
        assert_eq!(tokens("5%x"), vec!["5"]);
        assert_eq!(tokens("1,234,56"), vec!["1,234", "56"]);
        assert_eq!(tokens("3.14."), vec!["3.14"]);
    }

    #[test]
    fn surrounding_text_is_escaped() {
        assert_eq!(
            emphasize_numbers("a < b & 10 > 9"),
            "a &lt; b &amp; <strong>10</strong> &gt; <strong>9</strong>"
        );
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        assert_eq!(emphasize_numbers("prix 5€ über"), "prix <strong>5</strong>€ über");
        assert!(tokens("é5").is_empty());
    }

    #[test]
    fn paragraphs_and_list_alternate() {
        let html = render_content_blocks("Intro line\n- item one\n- item two\nClosing line");
        assert_eq!(
            html,
            "<p>Intro line</p>\n<ul>\n<li>item one</li>\n<li>item two</li>\n</ul>\n<p>Closing line</p>"
        );
    }

    #[test]
    fn blank_line_closes_list_and_trailing_list_is_closed() {
        let html = render_content_blocks("* a\r\n\r\n* b");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<ul>\n<li>b</li>\n</ul>");
    }

    #[test]
    fn bare_dash_is_a_paragraph() {
        assert_eq!(render_content_blocks("-\n  -5% drop  "), "<p>-</p>\n<p>-<strong>5%</strong> drop</p>");
        assert_eq!(render_content_blocks("\n\n"), "");
    }

    #[test]
    fn escaping_covers_quotes() {
        assert_eq!(escape_html("a\"b'c&"), "a&quot;b&#x27;c&amp;");
        assert_eq!(escape_html("<b>"), "&lt;b&gt;");
    }

    #[test]
    fn content_text_escapes_quotes() {
        assert_eq!(
            render_content_blocks("Don't \"panic\" at 5%"),
            "<p>Don&#x27;t &quot;panic&quot; at <strong>5%</strong></p>"
        );
    }
}

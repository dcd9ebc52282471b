//! HTML helpers built on `scraper`.
//!
//! `scraper::Html` is not `Send`, so every function here parses and drops the
//! document synchronously; async callers hand over the response body and get
//! plain data back.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::text::normalize_lyrics;

/// Parse a CSS selector, logging and returning `None` if it is invalid.
#[must_use]
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Invalid CSS selector {:?}: {}", css, e);
            None
        }
    }
}

/// First element matching any of `selectors`, tried in order.
#[must_use]
pub fn select_first<'a>(document: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| document.select(&sel).next())
}

/// Text content of an element with whitespace runs collapsed and ends trimmed.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every distinct `href` attribute on the page, in document order.
#[must_use]
pub fn collect_hrefs(body: &str) -> Vec<String> {
    let Some(anchors) = selector("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(body);
    let mut hrefs: Vec<String> = Vec::new();
    for anchor in document.select(&anchors) {
        if let Some(href) = anchor.value().attr("href") {
            let href = href.trim();
            if !href.is_empty() && !hrefs.iter().any(|h| h == href) {
                hrefs.push(href.to_string());
            }
        }
    }
    hrefs
}

/// Locate the lyrics container with the first matching selector and return its
/// text as plain `\n`-separated lines. Empty when no selector matches.
#[must_use]
pub fn extract_lyrics(body: &str, selectors: &[&str]) -> String {
    let document = Html::parse_document(body);
    select_first(&document, selectors).map_or_else(String::new, lyrics_text)
}

/// Plain text of a lyrics container: `<br>` and source newlines become line
/// breaks, block elements end their line, scripts and styles are dropped, markup
/// is stripped.
#[must_use]
pub fn lyrics_text(container: ElementRef<'_>) -> String {
    let mut writer = LyricsWriter::default();
    writer.push_element(container);
    normalize_lyrics(&writer.out)
}

#[derive(Default)]
struct LyricsWriter {
    out: String,
    /// Set after `<br>` or a block end; the next source newline belongs to it.
    after_break: bool,
}

impl LyricsWriter {
    fn push_element(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.push_text(text);
                continue;
            }
            let Some(child) = ElementRef::wrap(child) else {
                continue;
            };
            match child.value().name() {
                "br" => self.line_break(),
                "script" | "style" | "noscript" => {}
                name => {
                    self.push_element(child);
                    if matches!(name, "p" | "div") {
                        self.line_break();
                    }
                }
            }
        }
    }

    fn line_break(&mut self) {
        self.out.push('\n');
        self.after_break = true;
    }

    /// Horizontal whitespace runs collapse to one space; `\n` is a line break
    /// unless it only closes a line already ended by markup.
    fn push_text(&mut self, text: &str) {
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                if self.after_break {
                    self.after_break = false;
                } else {
                    self.out.push('\n');
                }
            }
            self.push_line(line);
        }
    }

    fn push_line(&mut self, line: &str) {
        let mut pending_space = false;
        for c in line.chars() {
            if c.is_whitespace() {
                pending_space = true;
                continue;
            }
            if pending_space && !self.out.is_empty() && !self.out.ends_with('\n') {
                self.out.push(' ');
            }
            pending_space = false;
            self.after_break = false;
            self.out.push(c);
        }
        if pending_space && !self.out.is_empty() && !self.out.ends_with(['\n', ' ']) {
            self.out.push(' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_br_becomes_newline() {
        let body = r#"<html><body><p id="songLyricsDiv">Is this the real life?<br>Is this just fantasy?</p></body></html>"#;
        assert_eq!(
            extract_lyrics(body, &["#songLyricsDiv"]),
            "Is this the real life?\nIs this just fantasy?"
        );
    }

    #[test]
    fn test_source_newlines_and_self_closing_br() {
        let body = "<div id=\"lyric\">\n  Is this the real life?<br />\n  Is this just fantasy?<br/>\n</div>";
        assert_eq!(
            extract_lyrics(body, &["#lyric"]),
            "Is this the real life?\nIs this just fantasy?"
        );
    }

    #[test]
    fn test_source_newlines_are_line_breaks() {
        let body = "<div class=\"js-lyrics\">Mama, just killed a man\nPut a gun against his head\n\nPulled my trigger</div>";
        assert_eq!(
            extract_lyrics(body, &[".js-lyrics"]),
            "Mama, just killed a man\nPut a gun against his head\n\nPulled my trigger"
        );
    }

    #[test]
    fn test_br_followed_by_newline_is_one_break() {
        let body = "<p id=\"l\">one<br>\r\ntwo<br>\n\nthree\t \tfour<br><br>\nfive</p>";
        assert_eq!(extract_lyrics(body, &["#l"]), "one\ntwo\n\nthree four\n\nfive");
    }

    #[test]
    fn test_stanza_breaks_collapse_to_single_blank_line() {
        let body = r#"<div class="js-lyrics">one<br><br><br><br>two<br>three</div>"#;
        assert_eq!(extract_lyrics(body, &[".js-lyrics"]), "one\n\ntwo\nthree");
    }

    #[test]
    fn test_markup_stripped_and_entities_decoded() {
        let body = r#"<div id="c">Rock &amp; <i>roll</i><script>var ad = 1;</script><br>Don&#39;t stop</div>"#;
        assert_eq!(extract_lyrics(body, &["#c"]), "Rock & roll\nDon't stop");
    }

    #[test]
    fn test_selectors_tried_in_order() {
        let body = r#"<div class="js-lyrics">fallback</div><div id="content" class="lyrictxt">primary</div>"#;
        assert_eq!(
            extract_lyrics(body, &["div#content.lyrictxt", ".js-lyrics"]),
            "primary"
        );
        assert_eq!(
            extract_lyrics(body, &["#missing", ".js-lyrics"]),
            "fallback"
        );
    }

    #[test]
    fn test_missing_container_is_empty() {
        assert_eq!(extract_lyrics("<html><body></body></html>", &["#songLyricsDiv"]), "");
    }

    #[test]
    fn test_collect_hrefs_unique_in_order() {
        let body = r#"<a href="/b">b</a><a href=" /a ">a</a><a href="/b">again</a><a>none</a><a href="">empty</a>"#;
        assert_eq!(collect_hrefs(body), vec!["/b".to_string(), "/a".to_string()]);
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let document = Html::parse_fragment("<h3><a>  Bohemian\n   Rhapsody </a></h3>");
        let anchor = select_first(&document, &["a"]).unwrap();
        assert_eq!(element_text(anchor), "Bohemian Rhapsody");
    }
}

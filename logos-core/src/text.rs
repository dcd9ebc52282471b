//! Pure string helpers shared by every provider: slug humanization, dedup-key
//! normalization and lyrics line cleanup.

/// Separators used by provider URL slugs.
pub const DASH: &[char] = &['-'];
pub const UNDERSCORE: &[char] = &['_'];
pub const PLUS_OR_DASH: &[char] = &['+', '-'];

/// Turn a URL path slug into display text.
///
/// Separators become spaces and the first character of every word is upper-cased.
/// Nothing else is normalized (diacritics, acronyms and apostrophes stay as the
/// slug spelled them).
///
/// ```
/// use logos_core::text::{humanize_slug, DASH};
/// assert_eq!(humanize_slug("bohemian-rhapsody", DASH), "Bohemian Rhapsody");
/// ```
#[must_use]
pub fn humanize_slug(slug: &str, separators: &[char]) -> String {
    slug.split(|c: char| separators.contains(&c))
        .flat_map(str::split_whitespace)
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Artist half of the dedup key: trimmed and lower-cased.
#[must_use]
pub fn normalize_artist(artist: &str) -> String {
    artist.trim().to_lowercase()
}

/// Title half of the dedup key: trimmed, lower-cased, trailing "lyrics" word removed.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let title = title.trim().to_lowercase();
    match title.strip_suffix("lyrics") {
        Some(rest) if rest.ends_with(char::is_whitespace) => rest.trim_end().to_string(),
        _ => title,
    }
}

/// Line-level lyrics cleanup.
///
/// Line endings become `\n`, every line is trimmed, runs of blank lines collapse
/// to one and blank lines at either end are dropped.
#[must_use]
pub fn normalize_lyrics(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = Vec::new();
    for line in text.split('\n').map(str::trim) {
        let previous_blank = lines.last().is_none_or(|l| l.is_empty());
        if line.is_empty() && previous_blank {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

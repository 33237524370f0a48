//! Slug derivation.
//!
//! Slugs are the join key between pattern files and stored patterns, so the
//! same function runs at export time (title → file name and `slug` field)
//! and at import time (normalizing whatever the file carries).

/// Turn a title (or an existing slug) into a URL-safe, lowercase slug.
///
/// Markup tags and HTML entities are stripped, common Latin accents are
/// folded to ASCII, whitespace and `.` become `-`, and everything outside
/// `[a-z0-9_-]` is dropped. Dash runs collapse and edge dashes are trimmed,
/// which makes the function idempotent.
///
/// Returns an empty string when nothing slug-worthy remains.
#[must_use]
pub fn slugify(input: &str) -> String {
    let stripped = strip_markup(input);
    let mut raw = String::with_capacity(stripped.len());

    for ch in stripped.chars().flat_map(char::to_lowercase) {
        match ch {
            'a'..='z' | '0'..='9' | '_' => raw.push(ch),
            '-' | '.' => raw.push('-'),
            c if c.is_whitespace() => raw.push('-'),
            c => {
                if let Some(folded) = fold_latin(c) {
                    raw.push_str(folded);
                }
            }
        }
    }

    let mut slug = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(ch);
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Remove `<tag>` spans and `&entity;` references.
fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => {
                if let Some(end) = rest.find('>') {
                    rest = &rest[end + 1..];
                    continue;
                }
            }
            '&' => {
                if let Some(len) = entity_len(rest) {
                    rest = &rest[len..];
                    continue;
                }
            }
            _ => {}
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Byte length of an entity reference at the start of `s`, if there is one.
fn entity_len(s: &str) -> Option<usize> {
    let body = s.get(1..)?;
    let end = body.find(';')?;
    let name = &body[..end];
    let valid = !name.is_empty()
        && name.len() <= 10
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '#');
    valid.then_some(end + 2)
}

/// ASCII replacement for a lowercase Latin letter with diacritics.
fn fold_latin(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' | 'ĺ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' | 'ŕ' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

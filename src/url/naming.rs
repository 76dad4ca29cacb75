//! Staging file names derived from download URLs.

use percent_encoding::percent_decode_str;
use url::Url;

/// Longest base name kept before the index prefix is added
const NAME_MAX: usize = 200;

/// Longest suffix treated as a file extension
const EXTENSION_MAX: usize = 8;

/// Derives the staging file name for the download at `index`
///
/// The base name is the last segment of the URL path, percent-decoded and
/// sanitized for the filesystem. Query strings are never part of it. When
/// nothing usable is left, `file_<index>` is used instead. The result is
/// always prefixed with the zero-padded index, which keeps names unique
/// within one request even when several URLs share a base name.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ringtone_fetcher::url::storage_file_name;
///
/// let url = Url::parse("http://a.example.com/tones/r.mp3?sig=abc").unwrap();
/// assert_eq!(storage_file_name(&url, 3), "0003_r.mp3");
///
/// let url = Url::parse("http://a.example.com/tones/my%20tone.mp3").unwrap();
/// assert_eq!(storage_file_name(&url, 0), "0000_my_tone.mp3");
///
/// let url = Url::parse("http://a.example.com/tones/").unwrap();
/// assert_eq!(storage_file_name(&url, 12), "0012_file_12");
/// ```
pub fn storage_file_name(url: &Url, index: usize) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    let decoded = percent_decode_str(segment).decode_utf8_lossy();

    let base = sanitize_file_name(&decoded);
    let base = if base.is_empty() {
        format!("file_{}", index)
    } else {
        base
    };

    format!("{:04}_{}", index, base)
}

/// Sanitizes a decoded file name
///
/// Letters, digits and `-.()+` are kept; everything else becomes `_`, with
/// runs collapsed and leading/trailing dots and underscores trimmed. Names
/// longer than `NAME_MAX` bytes lose characters from the stem so that a
/// short extension such as `.mp3` survives.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = clean(name);
    if cleaned.len() <= NAME_MAX {
        return cleaned;
    }

    match split_extension(&cleaned) {
        Some((stem, ext)) => {
            let stem = truncate(stem, NAME_MAX - ext.len() - 1);
            let stem = stem.trim_end_matches(|c| c == '.' || c == '_');
            format!("{}.{}", stem, ext)
        }
        None => truncate(&cleaned, NAME_MAX)
            .trim_end_matches(|c| c == '.' || c == '_')
            .to_string(),
    }
}

fn clean(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let kept = c.is_alphanumeric() || matches!(c, '-' | '.' | '(' | ')' | '+');
        if kept {
            out.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    out.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Splits `stem.ext` when `ext` looks like a real extension
fn split_extension(name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    let plausible = !stem.is_empty()
        && (1..=EXTENSION_MAX).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    plausible.then_some((stem, ext))
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}

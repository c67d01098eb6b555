//! Safe names for uploaded files and their storage paths.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_FILE_NAME: &str = "file";
const MAX_NAME_LEN: usize = 255;

const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const DASH_LIKE: &[char] = &['\u{2013}', '\u{2014}', '\u{2212}', '\u{2015}', '\u{2010}'];

static INVALID_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid invalid-chars regex"));
static MULTI_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+").expect("valid underscore regex"));

/// Turn an uploaded file name into `[A-Za-z0-9._-]` only, keeping the
/// extension. Never returns an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() {
        DEFAULT_FILE_NAME
    } else {
        name
    };

    let (base, ext) = split_extension(name);
    let base = if base.is_empty() {
        DEFAULT_FILE_NAME
    } else {
        base
    };
    let mut sanitized = sanitize_part(base, DEFAULT_FILE_NAME);
    let ext = sanitize_part(ext.trim_start_matches('.'), "");
    if !ext.is_empty() {
        sanitized.push('.');
        sanitized.push_str(&ext);
    }

    let leading = sanitized.split('.').next().unwrap_or_default();
    if WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| leading.eq_ignore_ascii_case(reserved))
    {
        sanitized.push_str("_file");
    }

    let sanitized = ensure_safe_length(sanitized);
    if sanitized.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        sanitized
    }
}

/// Sanitize every `/`-separated segment; empty segments are dropped.
pub fn sanitize_storage_path(path: &str) -> String {
    let parts: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize_filename)
        .collect();
    if parts.is_empty() {
        return sanitize_filename("");
    }
    parts.join("/")
}

fn sanitize_part(part: &str, fallback: &str) -> String {
    if part.is_empty() {
        return fallback.to_string();
    }

    let dashed: String = part
        .chars()
        .map(|c| if DASH_LIKE.contains(&c) { '-' } else { c })
        .collect();
    let ascii: String = dashed.nfkd().filter(char::is_ascii).collect();
    let replaced = ascii.replace([' ', '/', '\\'], "_");
    let replaced = INVALID_CHARS.replace_all(&replaced, "_");
    let collapsed = MULTI_UNDERSCORE.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches(['.', '_', '-']);

    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `("archive.tar", ".gz")`; leading dots never start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind('/').map_or(0, |idx| idx + 1);
    if let Some(dot) = name.rfind('.') {
        if dot > file_start && name[file_start..dot].chars().any(|c| c != '.') {
            return (&name[..dot], &name[dot..]);
        }
    }
    (name, "")
}

// Input is ASCII by now, so byte slicing is char slicing.
fn ensure_safe_length(name: String) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name;
    }
    let (base, ext) = split_extension(&name);
    if ext.len() >= MAX_NAME_LEN {
        return name[..MAX_NAME_LEN].to_string();
    }
    let allowed = MAX_NAME_LEN - ext.len();
    format!("{}{ext}", &base[..allowed.min(base.len())])
}

use crate::error::{ExtractError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)(w:[A-Za-z]+)(?:\s[^>]*?)?(/?)>").expect("static regex is valid")
});

/// Paragraph texts of the main document part in document order, joined by
/// `\n`.
pub(crate) fn extract(path: &Path) -> Result<String> {
    let docx_error = |reason: String| ExtractError::Docx {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| docx_error(format!("not a zip archive: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| docx_error(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| docx_error(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    Ok(paragraphs_from_xml(&xml).join("\n"))
}

/// Text of the paragraphs that sit directly in `<w:body>`, in document
/// order. Table cells and text boxes are nested deeper and are not
/// collected. Inside a paragraph only run content counts, either directly or
/// through a `<w:hyperlink>`: `<w:t>` text is concatenated, `<w:tab/>`
/// becomes a tab and `<w:br/>`/`<w:cr/>` a line break. A fragment without a
/// `<w:body>` is treated as body content.
pub(crate) fn paragraphs_from_xml(xml: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut stack: Vec<&str> = Vec::new();
    // Stack depth of the open body paragraph and its text so far.
    let mut current: Option<(usize, String)> = None;
    let mut in_text = false;
    let mut last_end = 0;

    for caps in TAG.captures_iter(xml) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if in_text {
            if let Some((_, text)) = current.as_mut() {
                text.push_str(&unescape(&xml[last_end..whole.start()]));
            }
        }
        last_end = whole.end();

        let name = name.as_str();
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();

        if closing {
            if let Some(pos) = stack.iter().rposition(|open| *open == name) {
                stack.truncate(pos);
            }
            if name == "w:t" {
                in_text = false;
            }
            if matches!(current, Some((depth, _)) if stack.len() <= depth) {
                if let Some((_, text)) = current.take() {
                    paragraphs.push(text);
                }
            }
            continue;
        }

        let at_block_level = stack.last().map_or(true, |parent| *parent == "w:body");
        let in_run = current
            .as_ref()
            .is_some_and(|(depth, _)| is_run_path(&stack[depth + 1..]));

        match name {
            "w:p" if current.is_none() && at_block_level => {
                if self_closing {
                    paragraphs.push(String::new());
                } else {
                    current = Some((stack.len(), String::new()));
                }
            }
            "w:t" if in_run => in_text = !self_closing,
            "w:tab" if in_run => push_char(&mut current, '\t'),
            "w:br" | "w:cr" if in_run => push_char(&mut current, '\n'),
            _ => {}
        }
        if !self_closing {
            stack.push(name);
        }
    }

    // An unterminated paragraph still carries text worth indexing.
    paragraphs.extend(current.map(|(_, text)| text));
    paragraphs
}

/// Element path below a body paragraph that leads into a run.
fn is_run_path(path: &[&str]) -> bool {
    matches!(path, ["w:r"] | ["w:hyperlink", "w:r"])
}

fn push_char(current: &mut Option<(usize, String)>, c: char) {
    if let Some((_, text)) = current.as_mut() {
        text.push(c);
    }
}

fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        match decode_entity(entity) {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

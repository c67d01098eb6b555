use crate::error::{ExtractError, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// Page texts in page order, joined by `\n`. Pages without extractable text
/// contribute an empty string.
pub(crate) fn extract(path: &Path) -> Result<String> {
    // pdf-extract panics on some malformed inputs.
    let pages = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_by_pages(path)))
        .map_err(|panic| ExtractError::Pdf {
            path: path.to_path_buf(),
            reason: panic_message(panic.as_ref()),
        })?
        .map_err(|err| ExtractError::Pdf {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    log::debug!("{}: {} pages", path.display(), pages.len());
    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        return format!("parser panicked: {msg}");
    }
    if let Some(msg) = panic.downcast_ref::<String>() {
        return format!("parser panicked: {msg}");
    }
    "parser panicked".to_string()
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Document formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Txt,
    Docx,
}

impl DocumentFormat {
    pub const ALL: [Self; 3] = [Self::Pdf, Self::Txt, Self::Docx];

    /// Detect the format from the file name suffix. Case-sensitive:
    /// `report.PDF` is not recognized.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|format| name.ends_with(format.suffix()))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Txt => "txt",
            Self::Docx => "docx",
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Txt => ".txt",
            Self::Docx => ".docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_suffixes() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b/report.pdf")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.txt")),
            Some(DocumentFormat::Txt)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("letter.docx")),
            Some(DocumentFormat::Docx)
        );
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(DocumentFormat::from_path(Path::new("REPORT.PDF")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("letter.Docx")), None);
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["a.doc", "a.md", "a.pdf.bak", "pdf", "txt"] {
            assert_eq!(DocumentFormat::from_path(Path::new(name)), None, "{name}");
        }
    }

    #[test]
    fn hidden_file_named_after_suffix_is_recognized() {
        assert_eq!(
            DocumentFormat::from_path(Path::new(".txt")),
            Some(DocumentFormat::Txt)
        );
    }
}

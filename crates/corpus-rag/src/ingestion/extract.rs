//! Text extraction from uploaded files

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::FileType;

/// Text extracted from a file, with a page count when the format has pages
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Full extracted text
    pub text: String,
    /// Total page count (PDFs only)
    pub total_pages: Option<u32>,
}

/// Extract text from a file based on its type
pub fn extract_text(path: &Path, file_type: FileType) -> Result<ExtractedText> {
    match file_type {
        FileType::Pdf => extract_pdf(path),
        FileType::Txt | FileType::Markdown => extract_plain(path),
        FileType::Unknown => Err(Error::UnsupportedFileType(
            path.to_string_lossy().to_string(),
        )),
    }
}

fn extract_plain(path: &Path) -> Result<ExtractedText> {
    let text = std::fs::read_to_string(path)?;
    Ok(ExtractedText {
        text,
        total_pages: None,
    })
}

fn extract_pdf(path: &Path) -> Result<ExtractedText> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let text = pdf_extract::extract_text(path)
        .map_err(|e| Error::file_parse(&filename, e.to_string()))?;

    // pdf-extract does not report page counts; lopdf reads the page tree
    let total_pages = lopdf::Document::load(path)
        .map(|doc| doc.get_pages().len() as u32)
        .ok()
        .filter(|&n| n > 0);

    Ok(ExtractedText { text, total_pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_plain_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "plain body").unwrap();
        let extracted = extract_text(file.path(), FileType::Txt).unwrap();
        assert_eq!(extracted.text, "plain body");
        assert_eq!(extracted.total_pages, None);
    }

    #[test]
    fn rejects_unknown_type() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = extract_text(file.path(), FileType::Unknown);
        assert!(matches!(result, Err(Error::UnsupportedFileType(_))));
    }
}

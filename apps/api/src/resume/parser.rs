//! Uploaded-document text extraction.
//!
//! PDFs go through `pdf_extract`; everything else is treated as text and
//! decoded lossily. Extraction is CPU-bound — handlers run it inside
//! `tokio::task::spawn_blocking`.

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Extractions shorter than this are useless for profiling and rejected.
const MIN_EXTRACTED_CHARS: usize = 50;

/// Extracts plain text from an uploaded resume document.
pub fn extract_text(
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, AppError> {
    let is_pdf =
        content_type == Some("application/pdf") || bytes.starts_with(PDF_MAGIC);

    let text = if is_pdf {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            AppError::UnprocessableEntity(format!("Failed to parse PDF file: {e}"))
        })?
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    let text = normalize_whitespace(&text);
    if text.len() < MIN_EXTRACTED_CHARS {
        return Err(AppError::UnprocessableEntity(
            "Unable to extract text from the document. Please upload a PDF or a plain-text \
            resume."
                .to_string(),
        ));
    }

    Ok(text)
}

/// Collapses runs of blank lines and trailing whitespace left over from PDF
/// text extraction.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

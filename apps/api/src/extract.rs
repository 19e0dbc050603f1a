//! PDF-to-text extraction collaborator. Given file bytes, returns plain text
//! or an extraction error; no analysis logic lives here, and the engine
//! never sees extraction failures.

use pdf_extract::OutputError;

pub fn pdf_to_text(bytes: &[u8]) -> Result<String, OutputError> {
    pdf_extract::extract_text_from_mem(bytes)
}

use crate::document::FileType;
use crate::error::ExtractError;
use unicode_normalization::UnicodeNormalization;

/// Turns the bytes of an uploaded file into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], file_type: FileType) -> Result<String, ExtractError>;
}

/// TXT, PDF and DOCX extraction. Output is NFC-normalised so decomposed
/// characters coming out of PDFs compare equal to typed queries.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor;

impl TextExtractor for DefaultExtractor {
    fn extract(&self, bytes: &[u8], file_type: FileType) -> Result<String, ExtractError> {
        let text = match file_type {
            FileType::Txt => String::from_utf8_lossy(bytes).into_owned(),
            FileType::Pdf => pdf_text(bytes)?,
            FileType::Docx => docx_text(bytes)?,
        };
        Ok(text.nfc().collect())
    }
}

fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(format!("{e:?}"))),
        Err(_) => Err(ExtractError::Pdf("parser panicked".into())),
    }
}

/// Paragraph text of a .docx; runs are concatenated, paragraphs separated by newlines.
fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(format!("{e:?}")))?;
    let mut paragraphs: Vec<String> = Vec::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(para) = child {
            let mut text = String::new();
            for pc in &para.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in &run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            if !text.trim().is_empty() {
                paragraphs.push(text);
            }
        }
    }
    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_is_decoded_and_normalised() {
        // "e" + combining acute accent
        let bytes = "cafe\u{0301} menu".as_bytes();
        let text = DefaultExtractor.extract(bytes, FileType::Txt).unwrap();
        assert_eq!(text, "caf\u{00E9} menu");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = DefaultExtractor.extract(&[b'o', b'k', 0xFF], FileType::Txt).unwrap();
        assert!(text.starts_with("ok"));
    }

    #[test]
    fn garbage_pdf_is_an_error() {
        let err = DefaultExtractor.extract(b"not a pdf", FileType::Pdf).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn garbage_docx_is_an_error() {
        let err = DefaultExtractor.extract(b"not a zip", FileType::Docx).unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }
}

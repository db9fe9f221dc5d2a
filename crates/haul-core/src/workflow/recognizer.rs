//! Text recognition seam.
//!
//! The OCR engine is an external service; the workflow only sees this trait.

use crate::error::RecognitionError;

/// Turns an uploaded image into recognized text.
pub trait TextRecognizer: Send + Sync {
    /// Recognize the full text of `image`.
    fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError>;

    /// Engine name recorded in logs.
    fn name(&self) -> &str {
        "external"
    }
}

/// Recognizer for uploads that already are recognized text (UTF-8 dumps).
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRecognizer;

impl TextRecognizer for PlainTextRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<String, RecognitionError> {
        String::from_utf8(image.to_vec())
            .map_err(|e| RecognitionError::InvalidInput(format!("not UTF-8 text: {}", e)))
    }

    fn name(&self) -> &str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_recognizer() {
        let recognizer = PlainTextRecognizer;
        assert_eq!(recognizer.recognize(b"Ticket 1234").unwrap(), "Ticket 1234");
        assert!(matches!(
            recognizer.recognize(&[0xff, 0xfe, 0x00]),
            Err(RecognitionError::InvalidInput(_))
        ));
    }
}

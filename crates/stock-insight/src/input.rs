//! User input and attachments

use crate::error::{InsightError, Result};
use insight_llm::image::{SUPPORTED_MEDIA_TYPES, media_type_from_bytes};
use std::path::Path;

/// An image attached to a request (normally a price chart)
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    /// Sniffed media type, `None` when the bytes are not a supported image
    pub media_type: Option<&'static str>,
}

impl ImageAttachment {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let media_type = media_type_from_bytes(&bytes);
        Self { bytes, media_type }
    }

    /// Load an image file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            InsightError::InvalidInput(format!("cannot read image {}: {e}", path.display()))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn is_supported(&self) -> bool {
        self.media_type
            .is_some_and(|m| SUPPORTED_MEDIA_TYPES.contains(&m))
    }
}

/// A document whose text has already been extracted
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAttachment {
    pub title: Option<String>,
    pub text: String,
}

impl DocumentAttachment {
    pub fn new(title: Option<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            text: text.into(),
        }
    }

    /// Load a plain text or Markdown file; the first `# ` heading becomes the title
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            InsightError::InvalidInput(format!("cannot read document {}: {e}", path.display()))
        })?;

        let title = text
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("# "))
            .map(str::to_string);

        Ok(Self::new(title, text))
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One incoming request, in whatever modalities the user supplied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInput {
    pub text: Option<String>,
    pub transcript: Option<String>,
    pub image: Option<ImageAttachment>,
    pub document: Option<DocumentAttachment>,
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn transcript(transcript: impl Into<String>) -> Self {
        Self {
            transcript: Some(transcript.into()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_document(mut self, document: DocumentAttachment) -> Self {
        self.document = Some(document);
        self
    }

    /// Typed text or, failing that, the voice transcript
    pub fn utterance(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or(self.transcript.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The modality the Data Collector should resolve a ticker from
    ///
    /// Attachments take precedence: document, then image, then transcript,
    /// then typed text.
    pub fn primary_modality(&self) -> Option<InputModality<'_>> {
        fn non_blank(s: Option<&str>) -> Option<&str> {
            s.filter(|s| !s.trim().is_empty())
        }

        if let Some(document) = &self.document {
            return Some(InputModality::Document(document));
        }
        if let Some(image) = &self.image {
            return Some(InputModality::Image(image));
        }
        if let Some(transcript) = non_blank(self.transcript.as_deref()) {
            return Some(InputModality::Transcript(transcript));
        }
        non_blank(self.text.as_deref()).map(InputModality::Text)
    }
}

/// Borrowed view of one input modality
#[derive(Debug, Clone, Copy)]
pub enum InputModality<'a> {
    Text(&'a str),
    Transcript(&'a str),
    Image(&'a ImageAttachment),
    Document(&'a DocumentAttachment),
}

impl InputModality<'_> {
    /// How the modality is named in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text(_) => "message",
            Self::Transcript(_) => "voice transcript",
            Self::Image(_) => "image",
            Self::Document(_) => "document",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_modality_order() {
        let input = UserInput::text("What about AAPL?")
            .with_document(DocumentAttachment::new(None, "Apple Inc. results"));
        assert!(matches!(input.primary_modality(), Some(InputModality::Document(_))));

        let input = UserInput::text("chart please")
            .with_image(ImageAttachment::from_bytes(b"\x89PNG\r\n\x1a\n".to_vec()));
        assert!(matches!(input.primary_modality(), Some(InputModality::Image(_))));

        let input = UserInput {
            text: Some("  ".to_string()),
            transcript: Some("what is tesla trading at".to_string()),
            ..Default::default()
        };
        assert!(matches!(input.primary_modality(), Some(InputModality::Transcript(_))));

        assert!(UserInput::default().primary_modality().is_none());
        assert!(UserInput::text("   ").primary_modality().is_none());
    }

    #[test]
    fn test_blank_transcript_falls_back_to_text() {
        let input = UserInput::transcript(" \n ").with_text("price of MSFT");
        match input.primary_modality() {
            Some(InputModality::Text(text)) => assert_eq!(text, "price of MSFT"),
            other => panic!("Expected text modality, got {other:?}"),
        }
    }

    #[test]
    fn test_image_sniffing() {
        let png = ImageAttachment::from_bytes(b"\x89PNG\r\n\x1a\n0000".to_vec());
        assert_eq!(png.media_type, Some("image/png"));
        assert!(png.is_supported());

        let text = ImageAttachment::from_bytes(b"hello".to_vec());
        assert!(!text.is_supported());
    }

    #[tokio::test]
    async fn test_document_title_from_heading() {
        let dir = std::env::temp_dir().join(format!("insight-doc-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("report.md");
        tokio::fs::write(&path, "\n# Apple Inc. Q4 2024\n\nRevenue was $94.9 billion.\n")
            .await
            .unwrap();

        let document = DocumentAttachment::from_path(&path).await.unwrap();
        assert_eq!(document.title.as_deref(), Some("Apple Inc. Q4 2024"));
        assert!(document.text.contains("$94.9 billion"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_input() {
        let err = ImageAttachment::from_path("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, InsightError::InvalidInput(_)));
    }
}

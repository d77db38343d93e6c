use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The kind of content a single analysis request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Email,
    Image,
    Video,
    Multimodal,
}

impl ContentType {
    /// Parse a content type from a form field, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "email" | "text" => Some(ContentType::Email),
            "image" => Some(ContentType::Image),
            "video" => Some(ContentType::Video),
            "multimodal" => Some(ContentType::Multimodal),
            _ => None,
        }
    }
}

/// The video perception agent's supported input shapes. See SPEC_FULL.md
/// §4.4 for why this crate does not decode arbitrary video containers.
#[derive(Debug, Clone)]
pub enum VideoInput {
    Path(String),
    Frames(Vec<Vec<u8>>),
}

/// Input record for one analysis. Immutable once built.
#[derive(Debug, Clone)]
pub struct ContentData {
    pub content_type: ContentType,
    pub text_content: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
    pub video_input: Option<VideoInput>,
    pub sender: String,
    pub subject: String,
    pub headers: HashMap<String, String>,
}

impl ContentData {
    pub fn new(content_type: ContentType, sender: impl Into<String>) -> Self {
        Self {
            content_type,
            text_content: None,
            image_bytes: None,
            video_input: None,
            sender: sender.into(),
            subject: String::new(),
            headers: HashMap::new(),
        }
    }

    pub fn has_text(&self) -> bool {
        self.text_content.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image_bytes.as_ref().is_some_and(|b| !b.is_empty())
    }

    pub fn has_video(&self) -> bool {
        self.video_input.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parses_case_insensitively() {
        assert_eq!(ContentType::from_str("EMAIL"), Some(ContentType::Email));
        assert_eq!(ContentType::from_str("Video"), Some(ContentType::Video));
        assert_eq!(ContentType::from_str("bogus"), None);
    }

    #[test]
    fn has_text_is_false_for_whitespace_only() {
        let mut c = ContentData::new(ContentType::Email, "a@b.com");
        c.text_content = Some("   ".to_string());
        assert!(!c.has_text());
    }
}

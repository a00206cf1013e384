//! JSON bodies of the generate-content endpoint.

use serde::{Deserialize, Serialize};

pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl GenerateRequest {
    /// Prompt followed by one inline PNG
    pub fn for_image(prompt: &str, png_base64: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: PNG_MIME.to_string(),
                            data: png_base64,
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
}

/// What a success body says about the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognized {
    Text(String),
    NoText,
    Malformed(String),
}

impl GenerateResponse {
    pub fn recognize(&self) -> Recognized {
        let Some(candidate) = self.candidates.as_ref().and_then(|c| c.first()) else {
            return Recognized::Malformed("response has no candidates".to_string());
        };

        let Some(content) = &candidate.content else {
            return Recognized::Malformed(match &candidate.finish_reason {
                Some(reason) => format!("candidate has no content (finishReason {reason})"),
                None => "candidate has no content".to_string(),
            });
        };

        let texts: Vec<&str> = content
            .parts
            .iter()
            .flatten()
            .filter_map(|p| p.text.as_deref())
            .collect();

        // Only a text part that is present but blank counts as "no text"
        if texts.is_empty() {
            return Recognized::Malformed("candidate content has no text part".to_string());
        }

        let text = texts.concat();
        if text.trim().is_empty() {
            Recognized::NoText
        } else {
            Recognized::Text(text)
        }
    }
}

/// `error.message` from an error body, if it has one
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()?
        .error?
        .message
        .filter(|m| !m.trim().is_empty())
}

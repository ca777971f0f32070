use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::message::ContentKind;

const IMAGE_PREFIX: &str = "IMAGE:";
const PRODUCT_CARD_PREFIX: &str = "PRODUCT_CARD:";

/// What a chat message carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { body: String },
    Image { url: String },
    ProductCard { payload: Value },
}

/// Content as clients send it: either the tagged object or an old-style
/// prefixed string.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentInput {
    Tagged(MessageContent),
    Legacy(String),
}

impl From<ContentInput> for MessageContent {
    fn from(input: ContentInput) -> Self {
        match input {
            ContentInput::Tagged(content) => content,
            ContentInput::Legacy(raw) => MessageContent::parse_legacy(&raw),
        }
    }
}

impl MessageContent {
    /// Reads the prefixed single-string encoding. A product card whose JSON
    /// does not parse is kept as plain text so nothing is lost.
    pub fn parse_legacy(raw: &str) -> Self {
        if let Some(url) = raw.strip_prefix(IMAGE_PREFIX) {
            return Self::Image {
                url: url.trim().to_string(),
            };
        }
        if let Some(json) = raw.strip_prefix(PRODUCT_CARD_PREFIX) {
            if let Ok(payload) = serde_json::from_str::<Value>(json) {
                return Self::ProductCard { payload };
            }
        }
        Self::Text {
            body: raw.to_string(),
        }
    }

    pub fn to_legacy(&self) -> String {
        match self {
            Self::Text { body } => body.clone(),
            Self::Image { url } => format!("{IMAGE_PREFIX}{url}"),
            Self::ProductCard { payload } => format!("{PRODUCT_CARD_PREFIX}{payload}"),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Image { .. } => ContentKind::Image,
            Self::ProductCard { .. } => ContentKind::ProductCard,
        }
    }

    /// Value stored in the `body` column next to [`Self::kind`].
    pub fn to_body(&self) -> String {
        match self {
            Self::Text { body } => body.clone(),
            Self::Image { url } => url.clone(),
            Self::ProductCard { payload } => payload.to_string(),
        }
    }

    /// Rebuilds content from its stored columns.
    pub fn from_columns(kind: ContentKind, body: &str) -> Self {
        match kind {
            ContentKind::Text => Self::Text {
                body: body.to_string(),
            },
            ContentKind::Image => Self::Image {
                url: body.to_string(),
            },
            ContentKind::ProductCard => Self::ProductCard {
                payload: serde_json::from_str(body).unwrap_or(Value::Null),
            },
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Text { body } if body.trim().is_empty() => {
                Err("Message text must not be empty".to_string())
            }
            Self::Image { url } if url.trim().is_empty() => {
                Err("Image URL must not be empty".to_string())
            }
            Self::ProductCard { payload } if !payload.is_object() => {
                Err("Product card payload must be a JSON object".to_string())
            }
            _ => Ok(()),
        }
    }
}

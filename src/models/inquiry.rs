use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Document;

/// Collection holding contact-form inquiries
pub const INQUIRY_COLLECTION: &str = "inquiry";

/// Contact-form submission as received from clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub phone: Option<String>,
    pub topic: Option<String>,
}

/// Persistable inquiry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub message: String,
    pub phone: Option<String>,
    pub topic: Option<String>,
}

/// Acknowledgement returned for every submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryAck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Inquiry {
    pub fn new(request: InquiryRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            message: request.message,
            phone: request.phone,
            topic: request.topic,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("name".to_string(), Value::String(self.name.clone()));
        document.insert("email".to_string(), Value::String(self.email.clone()));
        document.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(ref phone) = self.phone {
            document.insert("phone".to_string(), Value::String(phone.clone()));
        }
        if let Some(ref topic) = self.topic {
            document.insert("topic".to_string(), Value::String(topic.clone()));
        }
        document
    }
}

impl InquiryAck {
    pub fn stored(id: String) -> Self {
        Self {
            status: "ok".to_string(),
            id: Some(id),
        }
    }

    /// Acknowledgement for a submission that was not persisted
    pub fn received() -> Self {
        Self {
            status: "ok".to_string(),
            id: None,
        }
    }
}

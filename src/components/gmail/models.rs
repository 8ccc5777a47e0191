use serde::{Deserialize, Serialize};

/// Message id entry from the Gmail list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A message as returned by `users.messages.get` with `format=full`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub payload: Option<MessagePayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePartBody {
    #[serde(rename = "attachmentId", default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    // base64url encoded
    pub data: Option<String>,
}

/// One node of the MIME tree; parts may nest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "partId", default)]
    pub part_id: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePayload {
    pub headers: Option<Vec<MessageHeader>>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

/// A decoded email, valid for a single workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub body: String,
}

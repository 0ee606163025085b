use serde::Deserialize;

use super::ride::RideId;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    #[serde(alias = "chatId")]
    pub id: i64,
    #[serde(default)]
    pub ride_id: Option<RideId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub author: String,
    pub text: String,
    pub mine: bool,
}

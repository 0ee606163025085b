use serde::{Deserialize, Serialize};

pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: Option<i64>,
    pub text: String,
    pub author: String,
    pub rate: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFeedback {
    #[serde(default)]
    pub feedback_id: Option<i64>,
    pub comment: String,
    pub rate: u8,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub user: Option<WireFeedbackUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFeedbackUser {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<WireFeedback> for Feedback {
    fn from(value: WireFeedback) -> Self {
        let author = non_blank(value.author)
            .or_else(|| non_blank(value.user.and_then(|user| user.name)))
            .unwrap_or_else(|| ANONYMOUS.into());
        Self {
            id: value.feedback_id,
            text: value.comment,
            author,
            rate: value.rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFeedback {
    pub comment: String,
    pub rate: u8,
    pub author: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[test]
fn author_falls_back_to_user_then_anonymous() {
    let with_user: WireFeedback =
        serde_json::from_str(r#"{"comment":"great","rate":5,"author":"  ","user":{"name":"Lea"}}"#)
            .unwrap();
    assert_eq!(Feedback::from(with_user).author, "Lea");

    let bare: WireFeedback = serde_json::from_str(r#"{"comment":"great","rate":4}"#).unwrap();
    assert_eq!(Feedback::from(bare).author, ANONYMOUS);
}

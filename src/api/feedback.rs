use reqwest::Method;

use super::{ApiClient, Error};
use crate::models::{ChatSummary, Feedback, NewFeedback, WireFeedback};

impl ApiClient {
    pub async fn feedbacks(&self) -> Result<Vec<Feedback>, Error> {
        let url = self.url("/api/feedbacks", &[])?;
        let feedbacks: Vec<WireFeedback> = self.get(url).await?;
        Ok(feedbacks.into_iter().map(Feedback::from).collect())
    }

    /// Submits a testimonial and returns it as stored by the backend.
    pub async fn submit_feedback(&self, feedback: &NewFeedback) -> Result<Feedback, Error> {
        let url = self.url("/api/feedbacks", &[])?;
        let body = self.send_json(Method::POST, url, feedback).await?;
        let saved: WireFeedback = serde_json::from_str(&body)?;
        let mut saved = Feedback::from(saved);
        if saved.author == crate::models::ANONYMOUS {
            saved.author = feedback.author.clone();
        }
        Ok(saved)
    }

    pub async fn chats(&self) -> Result<Vec<ChatSummary>, Error> {
        let url = self.url("/api/chats", &[])?;
        self.get(url).await
    }
}

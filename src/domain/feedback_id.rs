#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FeedbackId(String);

const MAX_ID_LENGTH: usize = 256;

impl FeedbackId {
    pub fn parse(s: String) -> Result<FeedbackId, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("feedback_id is required".into());
        }
        if trimmed.chars().count() > MAX_ID_LENGTH {
            return Err("feedback_id is too long".into());
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for FeedbackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

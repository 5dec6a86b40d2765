use unicode_segmentation::UnicodeSegmentation;

/// Identity of a user of the mobile application, as issued by the upstream
/// user system. Opaque to this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(s: String) -> Result<UserId, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("user_id is required".into());
        }
        if trimmed.graphemes(true).count() > 256 {
            return Err("user_id is too long".into());
        }
        if trimmed.chars().any(char::is_control) {
            return Err("user_id must not contain control characters".into());
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

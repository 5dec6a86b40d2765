/// A device registration token issued by the push provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PushToken(String);

const MAX_TOKEN_LENGTH: usize = 4096;

impl PushToken {
    pub fn parse(s: String) -> Result<PushToken, String> {
        if s.is_empty() {
            return Err("fcm_token is required".into());
        }
        if s.chars().count() > MAX_TOKEN_LENGTH {
            return Err("fcm_token is too long".into());
        }
        if s.chars().any(char::is_whitespace) {
            return Err("fcm_token must not contain whitespace".into());
        }
        Ok(Self(s))
    }

    /// Shortened form that is safe to put in logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{}…", prefix)
    }
}

impl AsRef<str> for PushToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

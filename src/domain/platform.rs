#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn parse(s: &str) -> Result<Platform, String> {
        match s {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            _ => Err(r#"platform must be either "ios" or "android""#.into()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

use crate::domain::UserId;
use crate::push::MessageId;

/// What happened for a single recipient.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DispatchOutcome {
    pub user_id: UserId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn sent(user_id: &UserId, message_id: MessageId) -> Self {
        Self {
            user_id: user_id.clone(),
            success: true,
            message_id: Some(message_id),
            error: None,
        }
    }

    pub fn failed(
        user_id: &UserId,
        message_id: Option<MessageId>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.clone(),
            success: false,
            message_id,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DispatchSummary {
    #[serde(rename = "total_users")]
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DispatchReport {
    pub summary: DispatchSummary,
    pub details: Vec<DispatchOutcome>,
}

impl DispatchReport {
    pub fn from_outcomes(outcomes: Vec<DispatchOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.success).count();
        Self {
            summary: DispatchSummary {
                total: outcomes.len(),
                success_count,
                failure_count: outcomes.len() - success_count,
            },
            details: outcomes,
        }
    }

    pub fn has_no_recipients(&self) -> bool {
        self.summary.total == 0
    }
}

/// Why an action failed, for callers that branch on more than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered and said no (4xx/5xx with a body).
    Rejected,
    /// Login refused with 403: the account exists but is not verified yet.
    Unverified,
    /// No response at all: connection failure or timeout.
    Network,
    /// The session expired and could not be refreshed.
    NoSession,
}

/// Result of every [`SessionStore`](super::SessionStore) action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Success {
        message: Option<String>,
    },
    Failure {
        message: String,
        kind: FailureKind,
    },
}

impl ActionResult {
    pub fn success() -> Self {
        ActionResult::Success { message: None }
    }

    pub fn success_with(message: impl Into<String>) -> Self {
        ActionResult::Success {
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>, kind: FailureKind) -> Self {
        ActionResult::Failure {
            message: message.into(),
            kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ActionResult::Success { message } => message.as_deref(),
            ActionResult::Failure { message, .. } => Some(message),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ActionResult::Success { .. } => None,
            ActionResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// True when login was refused because the account still needs verification.
    pub fn is_verification_error(&self) -> bool {
        self.failure_kind() == Some(FailureKind::Unverified)
    }
}

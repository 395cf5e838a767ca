use super::error::{AppError, NameField};

/// Screen that launched the download flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginContext {
    Main,
    User,
}

impl OriginContext {
    /// Parses the launch extra passed by the previous screen.
    ///
    /// Only the exact value `"main"` selects [`OriginContext::Main`]; every
    /// other value, including a missing one, is treated as the user screen.
    pub fn from_extra(extra: Option<&str>) -> Self {
        match extra {
            Some("main") => OriginContext::Main,
            _ => OriginContext::User,
        }
    }

    /// Screen to return to after a successful retrieval.
    pub fn destination(self) -> Screen {
        match self {
            OriginContext::Main => Screen::Main,
            OriginContext::User => Screen::User,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    User,
}

/// What the presentation layer does once the user acknowledges the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterAcknowledge {
    NavigateTo(Screen),
    Stay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDirective {
    pub message: String,
    pub action_label: String,
    pub on_acknowledge: AfterAcknowledge,
}

impl NavigationDirective {
    pub fn acknowledge(&self) -> AfterAcknowledge {
        self.on_acknowledge
    }
}

/// A validated retrieval request. Both names are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    local_name: String,
    remote_name: String,
    origin: OriginContext,
}

impl RetrievalRequest {
    pub fn new(
        local_name: &str,
        remote_name: &str,
        origin: OriginContext,
    ) -> Result<Self, AppError> {
        let local_name = local_name.trim();
        let remote_name = remote_name.trim();

        if local_name.is_empty() {
            return Err(AppError::EmptyName(NameField::Local));
        }
        if remote_name.is_empty() {
            return Err(AppError::EmptyName(NameField::Remote));
        }

        Ok(Self {
            local_name: local_name.to_string(),
            remote_name: remote_name.to_string(),
            origin,
        })
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    pub fn origin(&self) -> OriginContext {
        self.origin
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Success,
    Failure(AppError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Dispatched,
    Succeeded,
    Failed,
}

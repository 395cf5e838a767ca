use crate::domain::{AfterAcknowledge, NavigationDirective, OriginContext};

/// Form state shared by whatever front end collects the two names.
pub struct DownloadForm {
    pub local_name: String,
    pub remote_name: String,
    pub origin: OriginContext,
    pub status_message: String,
    pub is_downloading: bool,
    pending: Option<NavigationDirective>,
}

impl DownloadForm {
    pub fn new(origin: OriginContext) -> Self {
        Self {
            local_name: String::new(),
            remote_name: String::new(),
            origin,
            status_message: "Enter a local and a remote file name".to_string(),
            is_downloading: false,
            pending: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FormMessage {
    LocalNameChanged(String),
    RemoteNameChanged(String),
    DownloadPressed,
    Resolved(NavigationDirective),
    Acknowledged,
}

/// What the front end has to do after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    None,
    /// Run the coordinator with these raw names.
    Submit {
        local_name: String,
        remote_name: String,
        origin: OriginContext,
    },
    /// Show the message with a single acknowledgment button.
    Show(NavigationDirective),
    Navigate(AfterAcknowledge),
}

impl DownloadForm {
    pub fn update(&mut self, message: FormMessage) -> FormAction {
        match message {
            FormMessage::LocalNameChanged(name) => {
                self.local_name = name;
                FormAction::None
            }
            FormMessage::RemoteNameChanged(name) => {
                self.remote_name = name;
                FormAction::None
            }
            FormMessage::DownloadPressed => {
                // One request at a time; the press is ignored until it resolves.
                if self.is_downloading || self.pending.is_some() {
                    return FormAction::None;
                }
                self.is_downloading = true;
                self.status_message = format!("Downloading {}...", self.remote_name.trim());
                FormAction::Submit {
                    local_name: self.local_name.clone(),
                    remote_name: self.remote_name.clone(),
                    origin: self.origin,
                }
            }
            FormMessage::Resolved(directive) => {
                self.is_downloading = false;
                self.status_message = directive.message.clone();
                self.pending = Some(directive.clone());
                FormAction::Show(directive)
            }
            FormMessage::Acknowledged => match self.pending.take() {
                Some(directive) => FormAction::Navigate(directive.acknowledge()),
                None => FormAction::None,
            },
        }
    }
}

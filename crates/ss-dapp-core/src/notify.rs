use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
}

/// Fire-and-forget messages for the modal surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Disconnected,
    CurrentValue(Option<String>),
    Deleted,
    EditSaved,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Disconnected => "Disconnected",
            Notice::CurrentValue(Some(_)) => "Current Contract Value",
            Notice::CurrentValue(None) => "No Value Found",
            Notice::Deleted => "Deleted!",
            Notice::EditSaved => "Updated!",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Disconnected => "Wallet has been disconnected.".to_owned(),
            Notice::CurrentValue(Some(value)) => {
                format!("The latest value in the history is: {value}")
            }
            Notice::CurrentValue(None) => "There is no completed value in the history.".to_owned(),
            Notice::Deleted => "The history item has been deleted.".to_owned(),
            Notice::EditSaved => "The history item has been updated.".to_owned(),
        }
    }

    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::Disconnected | Notice::CurrentValue(_) => NoticeLevel::Info,
            Notice::Deleted | Notice::EditSaved => NoticeLevel::Success,
        }
    }
}

/// Destructive actions that need an explicit accept/cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    DeleteEntry,
}

impl Confirmation {
    pub fn title(&self) -> &'static str {
        match self {
            Confirmation::DeleteEntry => "Are you sure?",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Confirmation::DeleteEntry => "You won't be able to revert this!",
        }
    }

    pub fn accept_label(&self) -> &'static str {
        match self {
            Confirmation::DeleteEntry => "Yes, delete it!",
        }
    }

    pub fn cancel_label(&self) -> &'static str {
        "Cancel"
    }
}

#[async_trait(?Send)]
pub trait Notifier {
    fn notify(&self, notice: Notice);
    /// Returns `true` when the user accepted.
    async fn confirm(&self, request: Confirmation) -> bool;
}

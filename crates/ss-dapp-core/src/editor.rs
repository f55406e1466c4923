use ss_api_types::HistoryEntry;
use tracing::info;

use crate::{Confirmation, DappContext, DappError, Notice};

/// Row currently in inline-edit mode and the uncommitted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCursor {
    pub index: usize,
    pub draft: String,
}

impl EditCursor {
    /// Keep pointing at the same row after `deleted` was removed.
    fn after_delete(self, deleted: usize) -> Option<Self> {
        if self.index == deleted {
            None
        } else if self.index > deleted {
            Some(Self {
                index: self.index - 1,
                ..self
            })
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(HistoryEntry),
    Cancelled,
}

impl DappContext {
    pub fn edit_cursor(&self) -> Option<EditCursor> {
        self.state.borrow().edit.clone()
    }

    pub fn start_edit(&self, index: usize) -> Result<(), DappError> {
        let started = {
            let mut state = self.state.borrow_mut();
            let len = state.history.len();
            match state.history.entries().get(index) {
                Some(entry) => {
                    let draft = entry.input_value.clone();
                    state.edit = Some(EditCursor { index, draft });
                    Ok(())
                }
                None => Err(DappError::IndexOutOfRange { index, len }),
            }
        };
        started.map_err(|err| self.fail(err))?;
        self.changed();
        Ok(())
    }

    /// Change the draft only. Nothing is persisted and no re-render is requested.
    pub fn update_draft(&self, text: &str) -> Result<(), DappError> {
        let mut state = self.state.borrow_mut();
        let cursor = state.edit.as_mut().ok_or(DappError::NoEditInProgress)?;
        cursor.draft = text.to_owned();
        Ok(())
    }

    pub fn save_edit(&self) -> Result<(), DappError> {
        let saved = {
            let mut state = self.state.borrow_mut();
            match state.edit.take() {
                Some(cursor) => state
                    .history
                    .edit_value(cursor.index, &cursor.draft)
                    .map(|()| cursor.index)
                    .map_err(DappError::from),
                None => Err(DappError::NoEditInProgress),
            }
        };
        let index = saved.map_err(|err| self.fail(err))?;

        info!(index, "history entry edited");
        self.notifier.notify(Notice::EditSaved);
        self.changed();
        Ok(())
    }

    pub fn cancel_edit(&self) {
        self.state.borrow_mut().edit = None;
        self.changed();
    }

    /// Delete the row at `index` once the user confirms.
    ///
    /// The row is tracked by id while the prompt is open, so rows appended meanwhile don't
    /// shift the target.
    pub async fn request_delete(&self, index: usize) -> Result<DeleteOutcome, DappError> {
        let target = {
            let state = self.state.borrow();
            let len = state.history.len();
            match (state.history.account(), state.history.entries().get(index)) {
                (Some(account), Some(entry)) => Ok((account.clone(), entry.id)),
                _ => Err(DappError::IndexOutOfRange { index, len }),
            }
        };
        let (account, id) = target.map_err(|err| self.fail(err))?;

        if !self.notifier.confirm(Confirmation::DeleteEntry).await {
            return Ok(DeleteOutcome::Cancelled);
        }

        let deleted = {
            let mut state = self.state.borrow_mut();
            let len = state.history.len();
            let position = if state.history.account() == Some(&account) {
                state.history.position_of(id)
            } else {
                None
            };
            match position {
                Some(position) => match state.history.delete(position) {
                    Ok(entry) => {
                        state.edit = state.edit.take().and_then(|cursor| cursor.after_delete(position));
                        Ok(entry)
                    }
                    Err(err) => Err(DappError::from(err)),
                },
                None => Err(DappError::IndexOutOfRange { index, len }),
            }
        };
        let entry = deleted.map_err(|err| self.fail(err))?;

        info!(entry = %entry.id, "history entry deleted");
        self.notifier.notify(Notice::Deleted);
        self.changed();
        Ok(DeleteOutcome::Deleted(entry))
    }
}

//! Application controller
//!
//! The rendering layer turns user input into [`Action`]s, feeds fragment
//! changes through [`App::on_fragment_change`] and reads back the visible
//! items and the header summary.

use std::fmt;

use crate::filter::{self, Visibility};
use crate::model::{TodoId, TodoItem};
use crate::persistence::{KeyValueStore, TodoStorage};
use crate::route::{FragmentRoute, resolve_fragment};
use crate::settings::Settings;
use crate::store::{EditOutcome, StoreWarning, TodoStore};

/// User-facing actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Submit the new-todo input
    Add(String),
    ToggleDone(TodoId),
    BeginEdit(TodoId),
    /// Edit input changed
    UpdateDraft(TodoId, String),
    /// Enter key or focus loss
    ConfirmEdit(TodoId),
    /// Escape key
    CancelEdit(TodoId),
    Delete(TodoId),
    ArchiveCompleted,
}

/// Header counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub remaining: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "全{}件中残り{}件", self.total, self.remaining)
    }
}

pub struct App<S: KeyValueStore> {
    store: TodoStore<S>,
    visibility: Visibility,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(backend: S, settings: &Settings) -> Self {
        let storage = TodoStorage::new(settings.storage_key.clone());
        Self {
            store: TodoStore::open(backend, storage),
            visibility: Visibility::All,
        }
    }

    /// Apply an action; returns whether the view needs a re-render
    pub fn dispatch(&mut self, action: Action) -> bool {
        log::debug!("Dispatching {:?}", action);
        match action {
            Action::Add(title) => self.store.add(&title).is_some(),
            Action::ToggleDone(id) => self.store.toggle_done(id),
            Action::BeginEdit(id) => self.store.begin_edit(id),
            Action::UpdateDraft(id, text) => self.store.update_draft(id, &text),
            Action::ConfirmEdit(id) => self.confirm_edit(id) != EditOutcome::Ignored,
            Action::CancelEdit(id) => self.store.cancel_edit(id),
            Action::Delete(id) => self.store.remove(id).is_some(),
            Action::ArchiveCompleted => {
                let removed = self.store.archive_completed();
                log::info!("Archived {} completed todos", removed);
                removed > 0
            }
        }
    }

    /// Confirm an edit, reporting whether the item was kept or deleted
    ///
    /// Hosts that patch the row in place instead of re-rendering use this
    /// rather than [`Action::ConfirmEdit`].
    pub fn confirm_edit(&mut self, id: TodoId) -> EditOutcome {
        self.store.commit_edit(id)
    }

    /// Re-derive the visibility from the URL fragment
    pub fn on_fragment_change(&mut self, hash: &str) -> FragmentRoute {
        let route = resolve_fragment(hash);
        self.visibility = route.visibility;
        route
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn visible_todos(&self) -> Vec<&TodoItem> {
        filter::apply(self.visibility, self.store.items())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.store.len(),
            remaining: self.store.remaining_count(),
        }
    }

    /// Pending non-fatal storage warning for display
    pub fn take_warning(&mut self) -> Option<StoreWarning> {
        self.store.take_warning()
    }

    pub fn store(&self) -> &TodoStore<S> {
        &self.store
    }
}

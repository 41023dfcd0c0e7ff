//! Todo store
//!
//! Single owner of the list, the identifier counter and the edit session.
//! Every mutation that changes stored content is followed by a save; reads
//! never write.

use std::collections::HashSet;

use crate::consts::FIRST_ID;
use crate::error::PersistenceError;
use crate::model::{TodoId, TodoItem};
use crate::persistence::{KeyValueStore, TodoStorage};

/// In-progress title edit and its rollback value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: TodoId,
    pub before_edit: String,
}

/// What `commit_edit` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// No edit session for that item
    Ignored,
    /// Trimmed title stored
    Saved,
    /// Title was blank, item deleted
    Removed,
}

/// Non-fatal persistence problem for the rendering layer to show
#[derive(Debug, thiserror::Error)]
pub enum StoreWarning {
    #[error("could not read saved todos: {0}")]
    LoadFailed(PersistenceError),
    #[error("changes are kept for this session only: {0}")]
    SaveFailed(PersistenceError),
}

pub struct TodoStore<S: KeyValueStore> {
    backend: S,
    storage: TodoStorage,
    items: Vec<TodoItem>,
    /// `None` once the counter has run past `u64::MAX`
    next_id: Option<u64>,
    edit: Option<EditSession>,
    warning: Option<StoreWarning>,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Create a store over `backend` and load the saved list
    pub fn open(backend: S, storage: TodoStorage) -> Self {
        let mut store = Self {
            backend,
            storage,
            items: Vec::new(),
            next_id: Some(FIRST_ID),
            edit: None,
            warning: None,
        };
        store.load();
        store
    }

    /// Replace the in-memory list with the stored one
    ///
    /// Missing or malformed data yields an empty list. Blank titles are
    /// dropped and duplicate ids reassigned so the list invariants hold.
    pub fn load(&mut self) -> &[TodoItem] {
        let loaded = match self.storage.fetch(&self.backend) {
            Ok(items) => items,
            Err(PersistenceError::Malformed(err)) => {
                log::warn!("Discarding malformed todos under `{}`: {}", self.storage.key(), err);
                Vec::new()
            }
            Err(err) => {
                log::warn!("Todo storage unavailable, starting empty: {}", err);
                self.warning = Some(StoreWarning::LoadFailed(err));
                Vec::new()
            }
        };

        let highest = loaded.iter().map(|item| item.id.0).max();
        self.next_id = highest.map_or(Some(FIRST_ID), |id| id.checked_add(1));

        // Filled in place so fresh ids are checked against what is kept so far
        self.items = Vec::with_capacity(loaded.len());
        let mut seen = HashSet::with_capacity(loaded.len());
        for mut item in loaded {
            if item.is_blank() {
                log::warn!("Dropping stored todo {} with a blank title", item.id);
                continue;
            }
            if !seen.insert(item.id) {
                let fresh = self.allocate_id();
                log::warn!("Stored todo id {} is duplicated, reassigning to {}", item.id, fresh);
                item.id = fresh;
                seen.insert(fresh);
            }
            self.items.push(item);
        }

        log::info!("Loaded {} todos", self.items.len());
        self.edit = None;
        &self.items
    }

    /// Append a new item; blank titles are ignored
    pub fn add(&mut self, title: &str) -> Option<TodoId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = self.allocate_id();
        self.items.push(TodoItem::new(id, title));
        self.save();
        Some(id)
    }

    pub fn remove(&mut self, id: TodoId) -> Option<TodoItem> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);
        if self.editing() == Some(id) {
            self.edit = None;
        }
        self.save();
        Some(removed)
    }

    pub fn toggle_done(&mut self, id: TodoId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let item = &mut self.items[index];
        item.done = !item.done;
        self.save();
        true
    }

    /// Start editing `id`
    ///
    /// A previous edit is abandoned with its draft kept, unless the draft is
    /// blank, in which case that item is deleted as a blank commit would.
    pub fn begin_edit(&mut self, id: TodoId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        if let Some(previous) = self.edit.take() {
            if self.get(previous.target).is_some_and(TodoItem::is_blank) {
                log::debug!("Abandoned edit of todo {} left it blank, removing", previous.target);
                self.remove(previous.target);
            } else {
                log::debug!("Abandoning edit of todo {}", previous.target);
            }
        }
        let Some(index) = self.position(id) else {
            return false;
        };
        self.edit = Some(EditSession {
            target: id,
            before_edit: self.items[index].title.clone(),
        });
        true
    }

    /// Replace the working title of the item being edited (not saved)
    pub fn update_draft(&mut self, id: TodoId, text: &str) -> bool {
        if self.editing() != Some(id) {
            return false;
        }
        match self.position(id) {
            Some(index) => {
                self.items[index].title = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Finish editing `id`: store the trimmed title, or delete a blank one
    pub fn commit_edit(&mut self, id: TodoId) -> EditOutcome {
        if self.editing() != Some(id) {
            return EditOutcome::Ignored;
        }
        self.edit = None;
        let Some(index) = self.position(id) else {
            return EditOutcome::Ignored;
        };

        let trimmed = self.items[index].title.trim().to_string();
        if trimmed.is_empty() {
            self.remove(id);
            EditOutcome::Removed
        } else {
            self.items[index].title = trimmed;
            self.save();
            EditOutcome::Saved
        }
    }

    /// Abandon editing `id`, restoring its pre-edit title
    ///
    /// Nothing is written: saves during the session already used the
    /// pre-edit title.
    pub fn cancel_edit(&mut self, id: TodoId) -> bool {
        if self.editing() != Some(id) {
            return false;
        }
        let Some(session) = self.edit.take() else {
            return false;
        };
        if let Some(index) = self.position(id) {
            self.items[index].title = session.before_edit;
        }
        true
    }

    /// Delete every completed item, returning how many were removed
    pub fn archive_completed(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.done);
        if let Some(target) = self.editing() {
            if self.position(target).is_none() {
                self.edit = None;
            }
        }
        self.save();
        before - self.items.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|item| !item.done).count()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Item currently being edited
    pub fn editing(&self) -> Option<TodoId> {
        self.edit.as_ref().map(|session| session.target)
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Take the pending persistence warning, if any
    pub fn take_warning(&mut self) -> Option<StoreWarning> {
        self.warning.take()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Write the list to the backend
    ///
    /// Failures are logged and parked as a warning; the in-memory list stays
    /// authoritative.
    pub fn save(&mut self) {
        let snapshot = self.persisted_snapshot();
        if let Err(err) = self.storage.save(&mut self.backend, &snapshot) {
            log::warn!("Failed to save todos: {}", err);
            self.warning = Some(StoreWarning::SaveFailed(err));
        }
    }

    /// Items as they should be stored: the edit target keeps its pre-edit
    /// title and blank titles are left out.
    fn persisted_snapshot(&self) -> Vec<TodoItem> {
        self.items
            .iter()
            .map(|item| match &self.edit {
                Some(session) if session.target == item.id => TodoItem {
                    title: session.before_edit.clone(),
                    ..item.clone()
                },
                _ => item.clone(),
            })
            .filter(|item| {
                let keep = !item.is_blank();
                if !keep {
                    log::warn!("Not saving todo {} with a blank title", item.id);
                }
                keep
            })
            .collect()
    }

    fn allocate_id(&mut self) -> TodoId {
        if let Some(next) = self.next_id {
            self.next_id = next.checked_add(1);
            return TodoId(next);
        }
        // Counter exhausted: hand out the smallest id not in use
        let used: HashSet<u64> = self.items.iter().map(|item| item.id.0).collect();
        let free = (FIRST_ID..=u64::MAX)
            .find(|id| !used.contains(id))
            .unwrap_or(FIRST_ID);
        TodoId(free)
    }

    fn position(&self, id: TodoId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    const KEY: &str = "todos";

    fn open(json: Option<&str>) -> TodoStore<MemoryStorage> {
        let backend = match json {
            Some(json) => MemoryStorage::new().with_item(KEY, json),
            None => MemoryStorage::new(),
        };
        TodoStore::open(backend, TodoStorage::new(KEY))
    }

    fn stored(store: &TodoStore<MemoryStorage>) -> Vec<TodoItem> {
        TodoStorage::new(KEY).fetch(store.backend()).unwrap()
    }

    /// Backend whose every call fails, like disabled LocalStorage
    struct UnavailableStorage;

    impl KeyValueStore for UnavailableStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Unavailable("storage disabled".into()))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn test_load_missing_and_malformed() {
        assert!(open(None).is_empty());
        let mut store = open(Some("not json at all"));
        assert!(store.is_empty());
        assert!(store.take_warning().is_none());
        assert_eq!(store.add("first"), Some(TodoId(FIRST_ID)));
    }

    #[test]
    fn test_next_id_follows_highest_loaded() {
        let mut store = open(Some(
            r#"[{"id":4,"title":"a","done":false},{"id":9,"title":"b","done":true}]"#,
        ));
        assert_eq!(store.len(), 2);
        assert_eq!(store.add("c"), Some(TodoId(10)));
    }

    #[test]
    fn test_load_normalizes_duplicates_and_blanks() {
        let store = open(Some(
            r#"[{"id":3,"title":"a","done":false},{"id":3,"title":"b","done":false},{"id":5,"title":"  ","done":true}]"#,
        ));
        let ids: Vec<u64> = store.items().iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![3, 6]);
        assert_eq!(store.items()[1].title, "b");
    }

    #[test]
    fn test_add_trims_and_persists() {
        let mut store = open(None);
        assert_eq!(store.add("   "), None);
        assert!(store.backend().get_item(KEY).unwrap().is_none());

        let id = store.add("  buy milk ").unwrap();
        let item = store.get(id).unwrap();
        assert_eq!(item.title, "buy milk");
        assert!(!item.done);
        assert_eq!(stored(&store), store.items());
    }

    #[test]
    fn test_ids_stay_unique_after_remove() {
        let mut store = open(None);
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        store.remove(b);
        let c = store.add("c").unwrap();
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_remove_and_toggle_persist() {
        let mut store = open(None);
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();

        assert!(store.toggle_done(a));
        assert!(stored(&store)[0].done);

        assert_eq!(store.remove(b).map(|i| i.title), Some("b".to_string()));
        assert_eq!(stored(&store).len(), 1);
        assert!(store.remove(b).is_none());
        assert!(!store.toggle_done(b));
    }

    #[test]
    fn test_commit_blank_edit_removes_item() {
        let mut store = open(Some(r#"[{"id":1,"title":"buy milk","done":false}]"#));
        let id = TodoId(1);
        assert!(store.begin_edit(id));
        store.update_draft(id, "   ");
        assert_eq!(store.commit_edit(id), EditOutcome::Removed);
        assert!(store.is_empty());
        assert!(stored(&store).is_empty());
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn test_commit_trims_title() {
        let mut store = open(None);
        let id = store.add("foo").unwrap();
        store.begin_edit(id);
        store.update_draft(id, "  bar  ");
        assert_eq!(store.commit_edit(id), EditOutcome::Saved);
        assert_eq!(store.get(id).unwrap().title, "bar");
        assert_eq!(stored(&store)[0].title, "bar");
    }

    #[test]
    fn test_commit_without_session_is_noop() {
        let mut store = open(None);
        let id = store.add("foo").unwrap();
        assert_eq!(store.commit_edit(id), EditOutcome::Ignored);
        store.begin_edit(id);
        assert_eq!(store.commit_edit(id), EditOutcome::Saved);
        // Second confirm (e.g. blur after enter) does nothing
        assert_eq!(store.commit_edit(id), EditOutcome::Ignored);
    }

    #[test]
    fn test_cancel_restores_pre_edit_title() {
        let mut store = open(None);
        let id = store.add("foo").unwrap();
        store.begin_edit(id);
        store.update_draft(id, "bar");
        assert_eq!(store.get(id).unwrap().title, "bar");
        assert!(store.cancel_edit(id));
        assert_eq!(store.get(id).unwrap().title, "foo");
        assert_eq!(store.editing(), None);
        assert!(!store.cancel_edit(id));
    }

    #[test]
    fn test_saves_during_edit_keep_pre_edit_title() {
        let mut store = open(None);
        let a = store.add("foo").unwrap();
        let b = store.add("other").unwrap();
        store.begin_edit(a);
        store.update_draft(a, "");
        store.toggle_done(b);

        let persisted = stored(&store);
        assert_eq!(persisted[0].title, "foo");
        assert!(persisted[1].done);
    }

    #[test]
    fn test_begin_edit_abandons_previous_session() {
        let mut store = open(None);
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        store.begin_edit(a);
        store.update_draft(a, "a2");
        store.begin_edit(b);

        assert_eq!(store.editing(), Some(b));
        assert_eq!(store.get(a).unwrap().title, "a2");
        assert_eq!(store.edit_session().unwrap().before_edit, "b");
        assert!(!store.update_draft(a, "a3"));
        assert_eq!(store.commit_edit(a), EditOutcome::Ignored);
    }

    #[test]
    fn test_blank_abandoned_edit_is_removed() {
        let mut store = open(None);
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        store.begin_edit(a);
        store.update_draft(a, "   ");

        assert!(store.begin_edit(b));
        assert_eq!(store.editing(), Some(b));
        assert_eq!(store.commit_edit(b), EditOutcome::Saved);

        assert!(store.get(a).is_none());
        assert_eq!(store.remaining_count(), 1);
        assert_eq!(stored(&store), store.items());
    }

    #[test]
    fn test_blank_draft_then_begin_same_item_removes_it() {
        let mut store = open(None);
        let a = store.add("a").unwrap();
        store.begin_edit(a);
        store.update_draft(a, "");
        assert!(!store.begin_edit(a));
        assert!(store.is_empty());
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn test_ids_stay_unique_when_counter_is_exhausted() {
        let mut store = open(Some(r#"[{"id":18446744073709551615,"title":"x","done":false}]"#));
        let y = store.add("y").unwrap();
        assert_eq!(y, TodoId(FIRST_ID));
        let z = store.add("z").unwrap();
        assert_eq!(z, TodoId(FIRST_ID + 1));

        let ids: HashSet<TodoId> = store.items().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(store.toggle_done(y));
        assert!(store.get(TodoId(u64::MAX)).is_some_and(|i| !i.done));
    }

    #[test]
    fn test_duplicates_at_max_id_get_free_ids() {
        let store = open(Some(
            r#"[{"id":18446744073709551615,"title":"a","done":false},{"id":18446744073709551615,"title":"b","done":false},{"id":1,"title":"c","done":false}]"#,
        ));
        let ids: HashSet<TodoId> = store.items().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_archive_completed() {
        let mut store = open(None);
        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        store.add("c");
        store.toggle_done(a);
        store.toggle_done(b);
        store.begin_edit(b);

        assert_eq!(store.archive_completed(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.editing(), None);
        assert_eq!(stored(&store), store.items());
        assert_eq!(store.archive_completed(), 0);
    }

    #[test]
    fn test_remaining_count_is_pure() {
        let mut store = open(Some(
            r#"[{"id":1,"title":"a","done":false},{"id":2,"title":"b","done":true},{"id":3,"title":"c","done":false}]"#,
        ));
        store.begin_edit(TodoId(1));
        store.update_draft(TodoId(1), "changed");
        let before = store.backend().get_item(KEY).unwrap();
        assert_eq!(store.remaining_count(), 2);
        assert_eq!(store.backend().get_item(KEY).unwrap(), before);
    }

    #[test]
    fn test_unavailable_storage_degrades_to_memory() {
        let mut store = TodoStore::open(UnavailableStorage, TodoStorage::new(KEY));
        assert!(matches!(store.take_warning(), Some(StoreWarning::LoadFailed(_))));

        let id = store.add("kept in memory").unwrap();
        assert!(matches!(store.take_warning(), Some(StoreWarning::SaveFailed(_))));
        assert!(store.take_warning().is_none());
        assert_eq!(store.get(id).unwrap().title, "kept in memory");
    }
}

//! Application state: goals, tags, layouts and settings, persisted as one
//! versioned snapshot after every mutation.
//!
//! Missing layouts and updates of missing entities are errors. Removing
//! something that is already gone succeeds.

pub mod migrations;
pub mod snapshot;
pub mod storage;

use crate::common::ids::{new_id, new_unique_id};
use crate::dashboard::layout::{self, LayoutChange, Placement};
use crate::dashboard::model::{Layout, Widget, WidgetPatch};
use crate::dashboard::widgets::{WidgetKind, WidgetRegistry};
use crate::goals::{self, Goal, GoalPatch, Tag, TagPatch};
use crate::settings::Settings;
use anyhow::Context;
use chrono::Utc;
use snapshot::{Snapshot, SnapshotError};
use std::fmt;
use storage::{MemoryStorage, SnapshotStorage};

pub use snapshot::{CURRENT_VERSION, STORAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Widget,
    Goal,
    Tag,
    Layout,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Widget => write!(f, "widget"),
            EntityKind::Goal => write!(f, "goal"),
            EntityKind::Tag => write!(f, "tag"),
            EntityKind::Layout => write!(f, "layout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("layout '{0}' not found")]
    LayoutNotFound(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("widget id '{0}' already exists in this layout")]
    DuplicateWidget(String),
    #[error("goal id '{0}' already exists")]
    DuplicateGoal(String),
    #[error("the last layout cannot be removed")]
    LastLayout,
    #[error("goal '{goal}' cannot be placed under '{parent}': that would create a cycle")]
    GoalCycle { goal: String, parent: String },
}

impl StoreError {
    fn not_found(kind: EntityKind, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct Store {
    snapshot: Snapshot,
    storage: Box<dyn SnapshotStorage>,
    registry: WidgetRegistry,
    persist_error: Option<String>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("storage", &self.storage.describe())
            .field("layouts", &self.snapshot.layouts.len())
            .field("goals", &self.snapshot.goals.len())
            .finish()
    }
}

impl Store {
    /// Load state from `storage`.
    ///
    /// * nothing stored: the first-run snapshot is written.
    /// * older version: migrated and written back.
    /// * newer version: error, the stored text is left alone.
    /// * unreadable: moved aside, defaults are used.
    pub fn open(mut storage: Box<dyn SnapshotStorage>) -> anyhow::Result<Self> {
        let text = storage
            .load()
            .with_context(|| format!("loading snapshot from {}", storage.describe()))?;
        let (snapshot, write_back) = match text {
            None => {
                tracing::info!(location = %storage.describe(), "no snapshot found, using starter layout");
                (Snapshot::first_run(), true)
            }
            Some(text) => match Snapshot::parse(&text) {
                Ok(loaded) => {
                    if let Some(from) = loaded.migrated_from {
                        tracing::info!(from, to = CURRENT_VERSION, "snapshot migrated");
                    }
                    if loaded.placed_rows > 0 {
                        tracing::info!(widgets = loaded.placed_rows, "placed widgets on free rows");
                    }
                    let write_back = loaded.needs_write_back();
                    (loaded.snapshot, write_back)
                }
                Err(e @ SnapshotError::UnsupportedVersion { .. }) => {
                    return Err(e).with_context(|| {
                        format!("refusing to load {}", storage.describe())
                    });
                }
                Err(e) => {
                    let backup = storage.quarantine()?;
                    tracing::warn!(error = %e, ?backup, "snapshot unreadable, starting fresh");
                    (Snapshot::first_run(), true)
                }
            },
        };
        let mut store = Self {
            snapshot,
            storage,
            registry: WidgetRegistry::with_defaults(),
            persist_error: None,
        };
        for issue in store.tree_inconsistencies() {
            tracing::warn!("{issue}");
        }
        if write_back {
            store.commit();
            if let Some(err) = store.persist_error.take() {
                anyhow::bail!("saving snapshot failed: {err}");
            }
        }
        Ok(store)
    }

    /// Store backed by memory, starting from an empty default layout.
    pub fn in_memory() -> Self {
        Self::with_snapshot(Snapshot::default(), Box::new(MemoryStorage::new()))
    }

    pub fn with_snapshot(snapshot: Snapshot, storage: Box<dyn SnapshotStorage>) -> Self {
        let mut snapshot = snapshot;
        snapshot.ensure_layout();
        Self {
            snapshot,
            storage,
            registry: WidgetRegistry::with_defaults(),
            persist_error: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn goals(&self) -> &[Goal] {
        &self.snapshot.goals
    }

    pub fn tags(&self) -> &[Tag] {
        &self.snapshot.tags
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.snapshot.layouts
    }

    pub fn settings(&self) -> &Settings {
        &self.snapshot.settings
    }

    /// Last save failure, cleared on read.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.persist_error.take()
    }

    /// Write the snapshot. A failure leaves the in-memory state as is and is
    /// reported through [`Store::take_persist_error`].
    fn commit(&mut self) {
        let result = self
            .snapshot
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|text| self.storage.save(&text));
        match result {
            Ok(()) => tracing::debug!(location = %self.storage.describe(), "snapshot saved"),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to save snapshot");
                self.persist_error = Some(format!("{e:#}"));
            }
        }
    }

    // ------------------------------------------------------------------
    // layouts
    // ------------------------------------------------------------------

    pub fn layout(&self, layout_id: &str) -> StoreResult<&Layout> {
        self.snapshot
            .layouts
            .iter()
            .find(|l| l.id == layout_id)
            .ok_or_else(|| StoreError::LayoutNotFound(layout_id.to_string()))
    }

    fn layout_mut(&mut self, layout_id: &str) -> StoreResult<&mut Layout> {
        self.snapshot
            .layouts
            .iter_mut()
            .find(|l| l.id == layout_id)
            .ok_or_else(|| StoreError::LayoutNotFound(layout_id.to_string()))
    }

    /// The layout named by the settings, or the first one.
    pub fn default_layout(&self) -> Option<&Layout> {
        let id = &self.snapshot.settings.default_layout;
        self.snapshot
            .layouts
            .iter()
            .find(|l| &l.id == id)
            .or_else(|| self.snapshot.layouts.first())
    }

    pub fn add_layout(&mut self, name: &str) -> String {
        let id = new_unique_id(self.snapshot.layouts.iter().map(|l| l.id.as_str()));
        self.snapshot.layouts.push(Layout::new(id.clone(), name.trim()));
        tracing::info!(%id, "layout added");
        self.commit();
        id
    }

    pub fn rename_layout(&mut self, layout_id: &str, name: &str) -> StoreResult<()> {
        self.layout_mut(layout_id)?.name = name.trim().to_string();
        self.commit();
        Ok(())
    }

    pub fn remove_layout(&mut self, layout_id: &str) -> StoreResult<()> {
        if !self.snapshot.layouts.iter().any(|l| l.id == layout_id) {
            return Ok(());
        }
        if self.snapshot.layouts.len() == 1 {
            return Err(StoreError::LastLayout);
        }
        self.snapshot.layouts.retain(|l| l.id != layout_id);
        if self.snapshot.settings.default_layout == layout_id {
            if let Some(first) = self.snapshot.layouts.first() {
                self.snapshot.settings.default_layout = first.id.clone();
            }
        }
        tracing::info!(id = layout_id, "layout removed");
        self.commit();
        Ok(())
    }

    pub fn set_default_layout(&mut self, layout_id: &str) -> StoreResult<()> {
        self.layout(layout_id)?;
        self.snapshot.settings.default_layout = layout_id.to_string();
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // widgets
    // ------------------------------------------------------------------

    /// Fresh id not used by any widget of `layout_id`.
    pub fn new_widget_id(&self, layout_id: &str) -> String {
        match self.layout(layout_id) {
            Ok(layout) => new_unique_id(layout.widgets.iter().map(|w| w.id.as_str())),
            Err(_) => new_id(),
        }
    }

    pub fn add_widget(&mut self, layout_id: &str, widget: Widget) -> StoreResult<&[Widget]> {
        let layout = self.layout_mut(layout_id)?;
        if layout.contains(&widget.id) {
            return Err(StoreError::DuplicateWidget(widget.id));
        }
        tracing::debug!(layout = layout_id, id = %widget.id, kind = widget.type_tag(), "widget added");
        layout.widgets.push(widget);
        self.commit();
        self.widgets(layout_id)
    }

    /// Add a widget of `kind` with its default content and size, placed on
    /// the first free row.
    pub fn append_widget(
        &mut self,
        layout_id: &str,
        kind: WidgetKind,
        title: Option<String>,
    ) -> StoreResult<&[Widget]> {
        let layout = self.layout(layout_id)?;
        let size = self.registry.default_size_for_tag(kind.as_str());
        let rect = layout::resolve_placement(&layout.widgets, Placement::Append, size);
        let id = self.new_widget_id(layout_id);
        let mut widget = Widget::new(
            id,
            self.registry.default_content_for_tag(kind.as_str()),
            rect,
        );
        widget.title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.add_widget(layout_id, widget)
    }

    pub fn widgets(&self, layout_id: &str) -> StoreResult<&[Widget]> {
        Ok(&self.layout(layout_id)?.widgets)
    }

    pub fn update_widget(
        &mut self,
        layout_id: &str,
        widget_id: &str,
        patch: WidgetPatch,
    ) -> StoreResult<&[Widget]> {
        let widget = self
            .layout_mut(layout_id)?
            .widgets
            .iter_mut()
            .find(|w| w.id == widget_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Widget, widget_id))?;
        patch.apply(widget);
        self.commit();
        self.widgets(layout_id)
    }

    pub fn remove_widget(&mut self, layout_id: &str, widget_id: &str) -> StoreResult<&[Widget]> {
        let layout = self.layout_mut(layout_id)?;
        let before = layout.widgets.len();
        layout.widgets.retain(|w| w.id != widget_id);
        if layout.widgets.len() != before {
            tracing::debug!(layout = layout_id, id = widget_id, "widget removed");
            self.commit();
        }
        self.widgets(layout_id)
    }

    /// Merge a grid change list into the widgets of `layout_id`.
    pub fn reposition(
        &mut self,
        layout_id: &str,
        changes: &[LayoutChange],
    ) -> StoreResult<&[Widget]> {
        let layout = self.layout_mut(layout_id)?;
        let moved = layout::apply_layout_changes(&mut layout.widgets, changes);
        if moved > 0 {
            tracing::debug!(layout = layout_id, moved, "layout changed");
            self.commit();
        }
        self.widgets(layout_id)
    }

    pub fn compact_layout(&mut self, layout_id: &str, cols: i32) -> StoreResult<&[Widget]> {
        let layout = self.layout_mut(layout_id)?;
        let before: Vec<_> = layout.widgets.iter().map(|w| w.layout).collect();
        layout::compact(&mut layout.widgets, cols);
        let changed = layout
            .widgets
            .iter()
            .zip(before)
            .any(|(w, old)| w.layout != old);
        if changed {
            self.commit();
        }
        self.widgets(layout_id)
    }

    // ------------------------------------------------------------------
    // goals
    // ------------------------------------------------------------------

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.snapshot.goals.iter().find(|g| g.id == id)
    }

    pub fn new_goal_id(&self) -> String {
        new_unique_id(self.snapshot.goals.iter().map(|g| g.id.as_str()))
    }

    /// Add `goal`, linking it into its parent's `children` when `parent_id`
    /// is set.
    pub fn add_goal(&mut self, mut goal: Goal) -> StoreResult<&[Goal]> {
        if self.goal(&goal.id).is_some() {
            return Err(StoreError::DuplicateGoal(goal.id));
        }
        if let Some(parent_id) = goal.parent_id.clone() {
            let parent = self
                .snapshot
                .goals
                .iter_mut()
                .find(|g| g.id == parent_id)
                .ok_or_else(|| StoreError::not_found(EntityKind::Goal, &parent_id))?;
            if !parent.children.contains(&goal.id) {
                parent.children.push(goal.id.clone());
            }
        }
        goal.children.clear();
        goal.progress = goal.progress.min(100);
        tracing::debug!(id = %goal.id, "goal added");
        self.snapshot.goals.push(goal);
        self.commit();
        Ok(&self.snapshot.goals)
    }

    pub fn update_goal(&mut self, id: &str, patch: GoalPatch) -> StoreResult<&[Goal]> {
        let goal = self
            .snapshot
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Goal, id))?;
        patch.apply(goal);
        goal.updated_at = Utc::now();
        self.commit();
        Ok(&self.snapshot.goals)
    }

    /// Remove a goal. Its children become top-level goals.
    pub fn delete_goal(&mut self, id: &str) -> StoreResult<&[Goal]> {
        if self.goal(id).is_none() {
            return Ok(&self.snapshot.goals);
        }
        self.snapshot.goals.retain(|g| g.id != id);
        for goal in &mut self.snapshot.goals {
            goal.children.retain(|c| c != id);
            if goal.parent_id.as_deref() == Some(id) {
                goal.parent_id = None;
            }
        }
        tracing::debug!(id, "goal deleted");
        self.commit();
        Ok(&self.snapshot.goals)
    }

    /// Move `id` under `parent`, or to the top level with `None`.
    pub fn set_goal_parent(&mut self, id: &str, parent: Option<&str>) -> StoreResult<&[Goal]> {
        if self.goal(id).is_none() {
            return Err(StoreError::not_found(EntityKind::Goal, id));
        }
        if let Some(parent_id) = parent {
            if self.goal(parent_id).is_none() {
                return Err(StoreError::not_found(EntityKind::Goal, parent_id));
            }
            if goals::is_ancestor(&self.snapshot.goals, id, parent_id) {
                return Err(StoreError::GoalCycle {
                    goal: id.to_string(),
                    parent: parent_id.to_string(),
                });
            }
        }
        let now = Utc::now();
        for goal in &mut self.snapshot.goals {
            if goal.id == id {
                goal.parent_id = parent.map(str::to_string);
                goal.updated_at = now;
            } else if Some(goal.id.as_str()) == parent {
                if !goal.children.iter().any(|c| c == id) {
                    goal.children.push(id.to_string());
                }
            } else {
                goal.children.retain(|c| c != id);
            }
        }
        self.commit();
        Ok(&self.snapshot.goals)
    }

    pub fn tree_inconsistencies(&self) -> Vec<String> {
        goals::tree_issues(&self.snapshot.goals)
    }

    // ------------------------------------------------------------------
    // tags
    // ------------------------------------------------------------------

    pub fn add_tag(&mut self, name: &str, color: &str) -> StoreResult<&[Tag]> {
        let id = new_unique_id(self.snapshot.tags.iter().map(|t| t.id.as_str()));
        self.snapshot.tags.push(Tag {
            id,
            name: name.trim().to_string(),
            color: color.to_string(),
        });
        self.commit();
        Ok(&self.snapshot.tags)
    }

    pub fn update_tag(&mut self, id: &str, patch: TagPatch) -> StoreResult<&[Tag]> {
        let tag = self
            .snapshot
            .tags
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Tag, id))?;
        patch.apply(tag);
        self.commit();
        Ok(&self.snapshot.tags)
    }

    /// Remove a tag and every reference to it from goals.
    pub fn delete_tag(&mut self, id: &str) -> StoreResult<&[Tag]> {
        let before = self.snapshot.tags.len();
        self.snapshot.tags.retain(|t| t.id != id);
        if self.snapshot.tags.len() != before {
            for goal in &mut self.snapshot.goals {
                goal.tags.retain(|t| t != id);
            }
            self.commit();
        }
        Ok(&self.snapshot.tags)
    }

    // ------------------------------------------------------------------
    // settings
    // ------------------------------------------------------------------

    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.snapshot.settings);
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::model::GridRect;
    use crate::dashboard::widgets::{default_content, PomodoroContent, WidgetContent};
    use crate::goals::GoalType;
    use crate::settings::DEFAULT_LAYOUT_ID;

    fn store() -> (Store, MemoryStorage) {
        let handle = MemoryStorage::new();
        let store = Store::with_snapshot(Snapshot::default(), Box::new(handle.clone()));
        (store, handle)
    }

    fn pomodoro(id: &str) -> Widget {
        Widget::new(
            id,
            WidgetContent::Pomodoro(PomodoroContent { duration: Some(25.0) }),
            GridRect::new(0, 0, 3, 2),
        )
    }

    #[test]
    fn duplicate_widget_id_is_rejected() {
        let (mut store, _) = store();
        store.add_widget(DEFAULT_LAYOUT_ID, pomodoro("w1")).unwrap();
        let err = store.add_widget(DEFAULT_LAYOUT_ID, pomodoro("w1")).unwrap_err();
        assert_eq!(err, StoreError::DuplicateWidget("w1".into()));
    }

    #[test]
    fn missing_layout_is_an_error() {
        let (mut store, _) = store();
        assert_eq!(
            store.add_widget("nope", pomodoro("w1")).unwrap_err(),
            StoreError::LayoutNotFound("nope".into())
        );
        assert!(store.reposition("nope", &[]).is_err());
    }

    #[test]
    fn update_of_missing_widget_is_not_found() {
        let (mut store, _) = store();
        let err = store
            .update_widget(DEFAULT_LAYOUT_ID, "ghost", WidgetPatch::title(None))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Widget,
                id: "ghost".into()
            }
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let (mut store, _) = store();
        store.add_widget(DEFAULT_LAYOUT_ID, pomodoro("w1")).unwrap();
        assert!(store.remove_widget(DEFAULT_LAYOUT_ID, "w1").unwrap().is_empty());
        assert!(store.remove_widget(DEFAULT_LAYOUT_ID, "w1").unwrap().is_empty());
    }

    #[test]
    fn append_places_below_existing_widgets() {
        let (mut store, _) = store();
        store.add_widget(DEFAULT_LAYOUT_ID, pomodoro("w1")).unwrap();
        let widgets = store
            .append_widget(DEFAULT_LAYOUT_ID, WidgetKind::Chat, Some("Assistant".into()))
            .unwrap();
        let added = &widgets[1];
        assert_eq!(added.layout, GridRect::new(0, 2, 3, 4));
        assert_eq!(added.title.as_deref(), Some("Assistant"));
        assert_eq!(added.content, default_content(WidgetKind::Chat));
    }

    #[test]
    fn mutations_are_persisted() {
        let (mut store, handle) = store();
        store.add_widget(DEFAULT_LAYOUT_ID, pomodoro("w1")).unwrap();
        let saved = Snapshot::parse(&handle.contents().unwrap()).unwrap().snapshot;
        assert!(saved.layouts[0].contains("w1"));
    }

    #[test]
    fn last_layout_cannot_be_removed() {
        let (mut store, _) = store();
        assert_eq!(
            store.remove_layout(DEFAULT_LAYOUT_ID).unwrap_err(),
            StoreError::LastLayout
        );
        assert!(store.remove_layout("absent").is_ok());
    }

    #[test]
    fn removing_default_layout_moves_default() {
        let (mut store, _) = store();
        let id = store.add_layout("Work");
        store.set_default_layout(&id).unwrap();
        store.remove_layout(&id).unwrap();
        assert_eq!(store.settings().default_layout, DEFAULT_LAYOUT_ID);
        assert_eq!(store.default_layout().unwrap().id, DEFAULT_LAYOUT_ID);
    }

    #[test]
    fn default_layout_falls_back_to_first() {
        let (mut store, _) = store();
        store.update_settings(|s| s.default_layout = "gone".into());
        assert_eq!(store.default_layout().unwrap().id, DEFAULT_LAYOUT_ID);
        assert!(store.set_default_layout("gone").is_err());
    }

    #[test]
    fn goal_links_stay_consistent() {
        let (mut store, _) = store();
        store.add_goal(Goal::new("year", "Year", GoalType::Yearly)).unwrap();
        let mut q1 = Goal::new("q1", "Q1", GoalType::Quarterly);
        q1.parent_id = Some("year".into());
        store.add_goal(q1).unwrap();
        assert_eq!(store.goal("year").unwrap().children, vec!["q1".to_string()]);

        store.add_goal(Goal::new("other", "Other", GoalType::Yearly)).unwrap();
        store.set_goal_parent("q1", Some("other")).unwrap();
        assert!(store.goal("year").unwrap().children.is_empty());
        assert_eq!(store.goal("other").unwrap().children, vec!["q1".to_string()]);
        assert!(store.tree_inconsistencies().is_empty());

        store.delete_goal("other").unwrap();
        assert_eq!(store.goal("q1").unwrap().parent_id, None);
        assert!(store.tree_inconsistencies().is_empty());
        assert!(store.delete_goal("other").is_ok());
    }

    #[test]
    fn goal_cycles_are_rejected() {
        let (mut store, _) = store();
        store.add_goal(Goal::new("a", "A", GoalType::Yearly)).unwrap();
        let mut b = Goal::new("b", "B", GoalType::Quarterly);
        b.parent_id = Some("a".into());
        store.add_goal(b).unwrap();
        assert!(matches!(
            store.set_goal_parent("a", Some("b")),
            Err(StoreError::GoalCycle { .. })
        ));
        assert!(matches!(
            store.set_goal_parent("a", Some("a")),
            Err(StoreError::GoalCycle { .. })
        ));
    }

    #[test]
    fn update_goal_touches_timestamp() {
        let (mut store, _) = store();
        let mut goal = Goal::new("g", "Run", GoalType::Weekly);
        goal.updated_at = chrono::DateTime::<Utc>::MIN_UTC;
        store.add_goal(goal).unwrap();
        store
            .update_goal(
                "g",
                GoalPatch {
                    progress: Some(60),
                    ..GoalPatch::default()
                },
            )
            .unwrap();
        let goal = store.goal("g").unwrap();
        assert_eq!(goal.progress, 60);
        assert!(goal.updated_at > chrono::DateTime::<Utc>::MIN_UTC);
        assert!(store.update_goal("zzz", GoalPatch::default()).is_err());
    }

    #[test]
    fn deleting_a_tag_strips_it_from_goals() {
        let (mut store, _) = store();
        let tag_id = store.add_tag("health", "#00ff00").unwrap()[0].id.clone();
        let mut goal = Goal::new("g", "Run", GoalType::Weekly);
        goal.tags = vec![tag_id.clone()];
        store.add_goal(goal).unwrap();
        store.delete_tag(&tag_id).unwrap();
        assert!(store.goal("g").unwrap().tags.is_empty());
        assert!(store.update_tag(&tag_id, TagPatch::default()).is_err());
    }

    #[test]
    fn failed_save_is_reported_and_state_kept() {
        struct Broken;
        impl SnapshotStorage for Broken {
            fn load(&self) -> anyhow::Result<Option<String>> {
                Ok(None)
            }
            fn save(&mut self, _: &str) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }
            fn quarantine(&mut self) -> anyhow::Result<Option<std::path::PathBuf>> {
                Ok(None)
            }
            fn describe(&self) -> String {
                "broken".into()
            }
        }
        let mut store = Store::with_snapshot(Snapshot::default(), Box::new(Broken));
        store.add_widget(DEFAULT_LAYOUT_ID, pomodoro("w1")).unwrap();
        assert!(store.take_persist_error().unwrap().contains("disk full"));
        assert!(store.take_persist_error().is_none());
        assert!(store.layout(DEFAULT_LAYOUT_ID).unwrap().contains("w1"));
    }
}

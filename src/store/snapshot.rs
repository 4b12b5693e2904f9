use super::migrations;
use crate::dashboard::model::{GridRect, Layout, Widget};
use crate::dashboard::widgets::{
    AvatarContent, GoalNode, GoalsContent, PomodoroContent, ScheduleContent, ScheduleEntry,
    WidgetContent, WidgetRegistry,
};
use crate::goals::{Goal, Tag};
use crate::settings::{Settings, DEFAULT_LAYOUT_ID};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the persisted state; the snapshot file is `<key>.json`.
pub const STORAGE_KEY: &str = "okr-kanban-storage";
pub const CURRENT_VERSION: u32 = 2;
pub const DEFAULT_LAYOUT_NAME: &str = "Default Layout";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("migration to version {version} failed: {reason}")]
    Migration { version: u32, reason: String },
}

/// The whole persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default = "default_layouts")]
    pub layouts: Vec<Layout>,
    #[serde(default)]
    pub settings: Settings,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn default_layouts() -> Vec<Layout> {
    vec![Layout::new(DEFAULT_LAYOUT_ID, DEFAULT_LAYOUT_NAME)]
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            goals: Vec::new(),
            tags: Vec::new(),
            layouts: default_layouts(),
            settings: Settings::default(),
        }
    }
}

/// Result of [`Snapshot::parse`].
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    /// Version the text was stored in when it had to be migrated.
    pub migrated_from: Option<u32>,
    /// Widgets whose row was left open and had to be placed.
    pub placed_rows: usize,
}

impl LoadedSnapshot {
    /// Whether the stored text differs from what saving would write.
    pub fn needs_write_back(&self) -> bool {
        self.migrated_from.is_some() || self.placed_rows > 0
    }
}

impl Snapshot {
    /// Parse snapshot text of any known version into the current shape.
    pub fn parse(text: &str) -> Result<LoadedSnapshot, SnapshotError> {
        let value: Value = serde_json::from_str(text)?;
        let found = migrations::detect_version(&value);
        if found > CURRENT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found,
                supported: CURRENT_VERSION,
            });
        }
        let mut value = migrations::migrate(value, found)?;
        let placed_rows =
            migrations::place_open_rows(&mut value, &WidgetRegistry::with_defaults());
        let mut snapshot: Snapshot = serde_json::from_value(value)?;
        snapshot.version = CURRENT_VERSION;
        snapshot.ensure_layout();
        Ok(LoadedSnapshot {
            snapshot,
            migrated_from: (found < CURRENT_VERSION).then_some(found),
            placed_rows,
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A snapshot always holds at least one layout.
    pub fn ensure_layout(&mut self) {
        if self.layouts.is_empty() {
            self.layouts = default_layouts();
        }
    }

    /// State used when no snapshot file exists yet: the default layout with
    /// a starter set of widgets.
    pub fn first_run() -> Self {
        let mut snapshot = Self::default();
        if let Some(layout) = snapshot.layouts.first_mut() {
            layout.widgets = starter_widgets();
        }
        snapshot
    }
}

fn node(title: &str, subgoals: &[&str]) -> GoalNode {
    let mut node = GoalNode::new(title);
    node.subgoals = subgoals.iter().map(|t| GoalNode::new(*t)).collect();
    node
}

fn entry(time: &str, activity: &str, description: Option<&str>) -> ScheduleEntry {
    ScheduleEntry {
        time: time.into(),
        activity: activity.into(),
        description: description.map(str::to_string),
    }
}

fn starter_widgets() -> Vec<Widget> {
    let goals = GoalsContent {
        title: "Yearly Goals".into(),
        description: None,
        goals: vec![
            node(
                "Reading",
                &["Technical books: 12", "Literature: 24", "Business books: 6"],
            ),
            node(
                "Learning",
                &[
                    "Finish 3 online courses",
                    "Attend 2 tech conferences",
                    "Write 50 technical blog posts",
                ],
            ),
        ],
    };
    let schedule = ScheduleContent {
        title: "Workday Schedule".into(),
        description: None,
        schedule: vec![
            entry("06:30 - 07:00", "Morning routine", Some("Meditation, stretching")),
            entry("07:00 - 08:00", "Reading", Some("One focused hour")),
            entry("08:00 - 08:30", "Breakfast", None),
            entry("09:00 - 12:00", "Deep work", Some("Most important tasks first")),
            entry("12:00 - 14:00", "Lunch break", Some("Lunch, short nap")),
            entry("14:00 - 17:00", "Project work", Some("Focused coding")),
            entry("17:00 - 18:30", "Content creation", Some("Writing, recording")),
            entry("18:30 - 19:30", "Dinner", None),
            entry("20:00 - 21:30", "Free time", Some("Exercise, leisure")),
            entry("21:30 - 22:30", "Daily review", Some("Notes and planning")),
        ],
    };
    vec![
        Widget::new(
            "avatar",
            WidgetContent::Avatar(AvatarContent {
                seed: Some("felix".into()),
            }),
            GridRect::new(0, 0, 2, 2),
        )
        .with_title("Avatar"),
        Widget::new(
            "pomodoro",
            WidgetContent::Pomodoro(PomodoroContent { duration: Some(25.0) }),
            GridRect::new(2, 0, 3, 2),
        )
        .with_title("Focus Timer"),
        Widget::new(
            "yearly-goals",
            WidgetContent::Goals(goals),
            GridRect::new(0, 2, 4, 4),
        )
        .with_title("Yearly Goals"),
        Widget::new(
            "schedule",
            WidgetContent::Schedule(schedule),
            GridRect::new(4, 0, 3, 6),
        )
        .with_title("Daily Schedule"),
    ]
}

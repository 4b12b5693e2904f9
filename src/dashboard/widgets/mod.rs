use crate::dashboard::model::{GridSize, Widget};
use crate::goals::Goal;
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use eframe::egui;
use egui_commonmark::CommonMarkCache;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

pub mod avatar;
pub mod chat;
pub mod custom;
pub mod goal_tracker;
pub mod goals;
pub mod pomodoro;
pub mod schedule;
pub mod visualization;

pub use avatar::AvatarContent;
pub use chat::ChatContent;
pub use custom::CustomContent;
pub use goal_tracker::{GoalTrackerContent, TrackerMode};
pub use goals::{GoalNode, GoalsContent};
pub use pomodoro::PomodoroContent;
pub use schedule::{ScheduleContent, ScheduleEntry};
pub use visualization::{ChartKind, ChartSource, VisualizationContent};

/// The widget kinds this build knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Avatar,
    Pomodoro,
    Goals,
    Schedule,
    Chat,
    Custom,
    GoalTracker,
    Visualization,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 8] = [
        WidgetKind::Avatar,
        WidgetKind::Pomodoro,
        WidgetKind::Goals,
        WidgetKind::Schedule,
        WidgetKind::Chat,
        WidgetKind::Custom,
        WidgetKind::GoalTracker,
        WidgetKind::Visualization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::Avatar => "avatar",
            WidgetKind::Pomodoro => "pomodoro",
            WidgetKind::Goals => "goals",
            WidgetKind::Schedule => "schedule",
            WidgetKind::Chat => "chat",
            WidgetKind::Custom => "custom",
            WidgetKind::GoalTracker => "goal_tracker",
            WidgetKind::Visualization => "visualization",
        }
    }

    /// Parse a stored type tag. `custom_content` is accepted for `custom`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "custom_content" => Some(WidgetKind::Custom),
            other => Self::ALL.into_iter().find(|k| k.as_str() == other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WidgetKind::Avatar => "Avatar",
            WidgetKind::Pomodoro => "Pomodoro",
            WidgetKind::Goals => "Goals",
            WidgetKind::Schedule => "Schedule",
            WidgetKind::Chat => "AI Assistant",
            WidgetKind::Custom => "Custom Content",
            WidgetKind::GoalTracker => "Goal Tracker",
            WidgetKind::Visualization => "Visualization",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WidgetKind::Avatar => "Generated avatar from a seed",
            WidgetKind::Pomodoro => "Focus timer with start, pause and reset",
            WidgetKind::Goals => "Nested list of goals with progress",
            WidgetKind::Schedule => "Daily schedule table",
            WidgetKind::Chat => "Chat with an OpenAI-compatible assistant",
            WidgetKind::Custom => "Markdown, image, countdown or stats",
            WidgetKind::GoalTracker => "Track progress of selected goals",
            WidgetKind::Visualization => "Charts of goal distribution",
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed content of a widget, keyed by its type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetContent {
    Avatar(AvatarContent),
    Pomodoro(PomodoroContent),
    Goals(GoalsContent),
    Schedule(ScheduleContent),
    Chat(ChatContent),
    Custom(CustomContent),
    GoalTracker(GoalTrackerContent),
    Visualization(VisualizationContent),
    /// Tag or content shape not understood by this build. Saved back as is.
    Unsupported { type_tag: String, raw: Value },
}

fn parse<C: DeserializeOwned>(raw: &Value) -> Option<C> {
    serde_json::from_value(raw.clone()).ok()
}

fn to_json<C: Serialize>(content: &C) -> Value {
    serde_json::to_value(content).unwrap_or_else(|_| json!({}))
}

impl WidgetContent {
    /// Build content from a stored type tag and content object.
    ///
    /// A missing or `null` content is treated as an empty object.
    pub fn from_parts(type_tag: &str, raw: Value) -> Self {
        let raw = if raw.is_null() { json!({}) } else { raw };
        let parsed = match WidgetKind::from_tag(type_tag) {
            Some(WidgetKind::Avatar) => parse(&raw).map(WidgetContent::Avatar),
            Some(WidgetKind::Pomodoro) => parse(&raw).map(WidgetContent::Pomodoro),
            Some(WidgetKind::Goals) => parse(&raw).map(WidgetContent::Goals),
            Some(WidgetKind::Schedule) => parse(&raw).map(WidgetContent::Schedule),
            Some(WidgetKind::Chat) => parse(&raw).map(WidgetContent::Chat),
            Some(WidgetKind::Custom) => parse(&raw).map(WidgetContent::Custom),
            Some(WidgetKind::GoalTracker) => parse(&raw).map(WidgetContent::GoalTracker),
            Some(WidgetKind::Visualization) => parse(&raw).map(WidgetContent::Visualization),
            None => None,
        };
        parsed.unwrap_or_else(|| {
            tracing::debug!(type_tag, "keeping widget content as unsupported");
            WidgetContent::Unsupported {
                type_tag: type_tag.to_string(),
                raw,
            }
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            WidgetContent::Avatar(c) => to_json(c),
            WidgetContent::Pomodoro(c) => to_json(c),
            WidgetContent::Goals(c) => to_json(c),
            WidgetContent::Schedule(c) => to_json(c),
            WidgetContent::Chat(c) => to_json(c),
            WidgetContent::Custom(c) => to_json(c),
            WidgetContent::GoalTracker(c) => to_json(c),
            WidgetContent::Visualization(c) => to_json(c),
            WidgetContent::Unsupported { raw, .. } => raw.clone(),
        }
    }

    pub fn kind(&self) -> Option<WidgetKind> {
        Some(match self {
            WidgetContent::Avatar(_) => WidgetKind::Avatar,
            WidgetContent::Pomodoro(_) => WidgetKind::Pomodoro,
            WidgetContent::Goals(_) => WidgetKind::Goals,
            WidgetContent::Schedule(_) => WidgetKind::Schedule,
            WidgetContent::Chat(_) => WidgetKind::Chat,
            WidgetContent::Custom(_) => WidgetKind::Custom,
            WidgetContent::GoalTracker(_) => WidgetKind::GoalTracker,
            WidgetContent::Visualization(_) => WidgetKind::Visualization,
            WidgetContent::Unsupported { .. } => return None,
        })
    }

    pub fn type_tag(&self) -> &str {
        match self {
            WidgetContent::Unsupported { type_tag, .. } => type_tag,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Title stored inside the content, for kinds that carry one.
    pub fn inner_title(&self) -> Option<&str> {
        let title = match self {
            WidgetContent::Goals(c) => Some(c.title.as_str()),
            WidgetContent::Schedule(c) => Some(c.title.as_str()),
            WidgetContent::Chat(c) => c.title.as_deref(),
            _ => None,
        };
        title.filter(|t| !t.trim().is_empty())
    }
}

/// Content a freshly added widget of `kind` starts with.
pub fn default_content(kind: WidgetKind) -> WidgetContent {
    match kind {
        WidgetKind::Avatar => WidgetContent::Avatar(AvatarContent::default()),
        WidgetKind::Pomodoro => WidgetContent::Pomodoro(PomodoroContent::default()),
        WidgetKind::Goals => WidgetContent::Goals(GoalsContent::default()),
        WidgetKind::Schedule => WidgetContent::Schedule(ScheduleContent::default()),
        WidgetKind::Chat => WidgetContent::Chat(ChatContent::default()),
        WidgetKind::Custom => WidgetContent::Custom(CustomContent::default()),
        WidgetKind::GoalTracker => WidgetContent::GoalTracker(GoalTrackerContent::default()),
        WidgetKind::Visualization => {
            WidgetContent::Visualization(VisualizationContent::default())
        }
    }
}

pub fn default_size(kind: WidgetKind) -> GridSize {
    match kind {
        WidgetKind::Avatar => GridSize::new(2, 2),
        WidgetKind::Pomodoro => GridSize::new(3, 2),
        WidgetKind::Goals => GridSize::new(4, 4),
        WidgetKind::Schedule => GridSize::new(3, 6),
        WidgetKind::Chat => GridSize::new(3, 4),
        WidgetKind::Custom => GridSize::new(2, 2),
        WidgetKind::GoalTracker => GridSize::new(3, 4),
        WidgetKind::Visualization => GridSize::new(4, 3),
    }
}

/// Something a widget asks the application to do after rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetAction {
    /// Replace the content of the widget with the given id.
    UpdateContent {
        widget_id: String,
        content: WidgetContent,
    },
    Notify {
        kind: NoticeKind,
        text: String,
    },
    OpenUrl(String),
    OpenSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Read-only application state available while rendering widgets.
#[derive(Clone, Copy)]
pub struct DashboardContext<'a> {
    pub goals: &'a [Goal],
    pub settings: &'a Settings,
    pub now: DateTime<Utc>,
}

impl<'a> DashboardContext<'a> {
    pub fn new(goals: &'a [Goal], settings: &'a Settings) -> Self {
        Self {
            goals,
            settings,
            now: Utc::now(),
        }
    }
}

/// Render state that outlives a frame but is never persisted.
#[derive(Default)]
pub struct RenderCaches {
    pub markdown: CommonMarkCache,
}

/// Result of editing widget content in the edit dialog.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct WidgetSettingsUiResult {
    pub changed: bool,
    pub error: Option<String>,
}

impl WidgetSettingsUiResult {
    fn changed(changed: bool) -> Self {
        Self {
            changed,
            error: None,
        }
    }
}

/// Context available to content editors.
#[derive(Clone, Copy)]
pub struct WidgetSettingsContext<'a> {
    pub goals: &'a [Goal],
}

impl<'a> WidgetSettingsContext<'a> {
    pub fn empty() -> Self {
        Self { goals: &[] }
    }
}

/// Handler used to edit the content of one widget kind.
pub type SettingsUiFn =
    fn(&mut egui::Ui, &mut WidgetContent, &WidgetSettingsContext<'_>) -> WidgetSettingsUiResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetMetadata {
    pub name: String,
    pub label: String,
    pub description: String,
    pub has_settings_ui: bool,
}

/// Registry entry for one widget kind.
#[derive(Clone)]
pub struct WidgetDescriptor {
    kind: WidgetKind,
    settings_ui: Option<SettingsUiFn>,
}

impl WidgetDescriptor {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            settings_ui: None,
        }
    }

    pub fn with_settings_ui(mut self, settings_ui: SettingsUiFn) -> Self {
        self.settings_ui = Some(settings_ui);
        self
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn default_content(&self) -> WidgetContent {
        default_content(self.kind)
    }

    pub fn default_size(&self) -> GridSize {
        default_size(self.kind)
    }

    pub fn settings_ui(&self) -> Option<SettingsUiFn> {
        self.settings_ui
    }

    pub fn metadata(&self, name: &str) -> WidgetMetadata {
        WidgetMetadata {
            name: name.to_string(),
            label: self.kind.label().to_string(),
            description: self.kind.description().to_string(),
            has_settings_ui: self.settings_ui.is_some(),
        }
    }
}

/// Lookup of widget kinds by type tag.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<String, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register(
            "avatar",
            WidgetDescriptor::new(WidgetKind::Avatar).with_settings_ui(avatar::settings_ui),
        );
        reg.register(
            "pomodoro",
            WidgetDescriptor::new(WidgetKind::Pomodoro).with_settings_ui(pomodoro::settings_ui),
        );
        reg.register(
            "goals",
            WidgetDescriptor::new(WidgetKind::Goals).with_settings_ui(goals::settings_ui),
        );
        reg.register(
            "schedule",
            WidgetDescriptor::new(WidgetKind::Schedule).with_settings_ui(schedule::settings_ui),
        );
        reg.register(
            "chat",
            WidgetDescriptor::new(WidgetKind::Chat).with_settings_ui(chat::settings_ui),
        );
        reg.register(
            "custom",
            WidgetDescriptor::new(WidgetKind::Custom).with_settings_ui(custom::settings_ui),
        );
        reg.register(
            "goal_tracker",
            WidgetDescriptor::new(WidgetKind::GoalTracker)
                .with_settings_ui(goal_tracker::settings_ui),
        );
        reg.register(
            "visualization",
            WidgetDescriptor::new(WidgetKind::Visualization)
                .with_settings_ui(visualization::settings_ui),
        );
        reg
    }

    pub fn register(&mut self, name: &str, descriptor: WidgetDescriptor) {
        self.map.insert(name.to_string(), descriptor);
    }

    fn lookup(&self, name: &str) -> Option<&WidgetDescriptor> {
        self.map.get(name).or_else(|| {
            WidgetKind::from_tag(name).and_then(|kind| self.map.get(kind.as_str()))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn metadata(&self) -> Vec<WidgetMetadata> {
        let mut meta: Vec<WidgetMetadata> = self
            .map
            .iter()
            .map(|(name, descriptor)| descriptor.metadata(name))
            .collect();
        meta.sort_by(|a, b| a.label.cmp(&b.label));
        meta
    }

    /// Default content for a type tag. Unknown tags get an empty object.
    pub fn default_content_for_tag(&self, name: &str) -> WidgetContent {
        match self.lookup(name) {
            Some(descriptor) => descriptor.default_content(),
            None => WidgetContent::Unsupported {
                type_tag: name.to_string(),
                raw: json!({}),
            },
        }
    }

    /// Default size for a type tag. Unknown tags get a single cell.
    pub fn default_size_for_tag(&self, name: &str) -> GridSize {
        self.lookup(name)
            .map(|d| d.default_size())
            .unwrap_or(GridSize::MIN)
    }

    pub fn render_settings_ui(
        &self,
        ui: &mut egui::Ui,
        content: &mut WidgetContent,
        ctx: &WidgetSettingsContext<'_>,
    ) -> Option<WidgetSettingsUiResult> {
        // Malformed content of a known kind has no typed editor.
        if matches!(content, WidgetContent::Unsupported { .. }) {
            return None;
        }
        let render = self.lookup(content.type_tag())?.settings_ui()?;
        Some(render(ui, content, ctx))
    }
}

/// Render a widget body and return the action it requested, if any.
pub fn render_widget(
    ui: &mut egui::Ui,
    widget: &Widget,
    ctx: &DashboardContext<'_>,
    caches: &mut RenderCaches,
) -> Option<WidgetAction> {
    match &widget.content {
        WidgetContent::Avatar(content) => avatar::render(ui, content),
        WidgetContent::Pomodoro(content) => pomodoro::render(ui, &widget.id, content),
        WidgetContent::Goals(content) => {
            goals::render(ui, content);
            None
        }
        WidgetContent::Schedule(content) => {
            schedule::render(ui, &widget.id, content);
            None
        }
        WidgetContent::Chat(content) => chat::render(ui, &widget.id, content, ctx),
        WidgetContent::Custom(content) => custom::render(ui, &widget.id, content, ctx, caches),
        WidgetContent::GoalTracker(content) => {
            goal_tracker::render(ui, content, ctx);
            None
        }
        WidgetContent::Visualization(content) => {
            visualization::render(ui, content, ctx);
            None
        }
        WidgetContent::Unsupported { type_tag, .. } => {
            unsupported(ui, type_tag);
            None
        }
    }
}

fn unsupported(ui: &mut egui::Ui, type_tag: &str) {
    ui.centered_and_justified(|ui| {
        ui.weak(format!("Unsupported widget type '{type_tag}'"));
    });
}

/// Progress bar with a trailing percentage, shared by the goal views.
pub(crate) fn progress_row(ui: &mut egui::Ui, progress: f32) {
    let fraction = (progress / 100.0).clamp(0.0, 1.0);
    ui.add(egui::ProgressBar::new(fraction).text(format!("{}%", progress.round() as i32)));
}

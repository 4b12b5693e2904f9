use super::{NoticeKind, WidgetAction, WidgetContent, WidgetSettingsContext, WidgetSettingsUiResult};
use eframe::egui;
use serde::{Deserialize, Serialize, Serializer};
use std::time::{Duration, Instant};

pub const DEFAULT_MINUTES: f64 = 25.0;
/// Longest session the timer accepts, one week.
pub const MAX_MINUTES: f64 = 7.0 * 24.0 * 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroContent {
    /// Session length in minutes. Fractions are allowed.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_minutes"
    )]
    pub duration: Option<f64>,
}

/// Whole minutes are written as integers so stored files keep their shape.
fn serialize_minutes<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match *value {
        Some(m) if m.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&m) => {
            s.serialize_some(&(m as u64))
        }
        Some(m) => s.serialize_some(&m),
        None => s.serialize_none(),
    }
}

impl Default for PomodoroContent {
    fn default() -> Self {
        Self {
            duration: Some(DEFAULT_MINUTES),
        }
    }
}

impl PomodoroContent {
    /// Non-positive or non-finite durations fall back to the default.
    pub fn minutes(&self) -> f64 {
        self.duration
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_MINUTES)
            .min(MAX_MINUTES)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { since: Instant, left: Duration },
    Paused { left: Duration },
    Finished,
}

/// Countdown state for one pomodoro widget. Lives in egui temporary memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroTimer {
    total: Duration,
    state: TimerState,
}

impl PomodoroTimer {
    pub fn new(minutes: f64) -> Self {
        let minutes = if minutes.is_finite() && minutes > 0.0 {
            minutes.min(MAX_MINUTES)
        } else {
            DEFAULT_MINUTES
        };
        Self {
            total: Duration::from_secs_f64(minutes * 60.0),
            state: TimerState::Idle,
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state {
            TimerState::Idle => self.total,
            TimerState::Running { since, left } => left.saturating_sub(now.saturating_duration_since(since)),
            TimerState::Paused { left } => left,
            TimerState::Finished => Duration::ZERO,
        }
    }

    /// Start, pause or resume. A finished timer stays finished until reset.
    pub fn toggle(&mut self, now: Instant) {
        self.state = match self.state {
            TimerState::Idle => TimerState::Running {
                since: now,
                left: self.total,
            },
            TimerState::Running { .. } => TimerState::Paused {
                left: self.remaining(now),
            },
            TimerState::Paused { left } => TimerState::Running { since: now, left },
            TimerState::Finished => TimerState::Finished,
        };
    }

    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Advance the timer. Returns true on the tick that reaches zero.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.is_running() && self.remaining(now).is_zero() {
            self.state = TimerState::Finished;
            return true;
        }
        false
    }

    /// Elapsed share of the session in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.total.as_secs_f32();
        if total <= 0.0 {
            return 0.0;
        }
        ((total - self.remaining(now).as_secs_f32()) / total).clamp(0.0, 1.0)
    }
}

pub fn format_remaining(left: Duration) -> String {
    let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn timer_id(widget_id: &str) -> egui::Id {
    egui::Id::new(("pomodoro", widget_id))
}

pub fn render(
    ui: &mut egui::Ui,
    widget_id: &str,
    content: &PomodoroContent,
) -> Option<WidgetAction> {
    let id = timer_id(widget_id);
    let minutes = content.minutes();
    let now = Instant::now();
    let mut timer = ui
        .ctx()
        .data(|d| d.get_temp::<PomodoroTimer>(id))
        .filter(|t| t.total() == PomodoroTimer::new(minutes).total())
        .unwrap_or_else(|| PomodoroTimer::new(minutes));

    let mut action = None;
    if timer.tick(now) {
        tracing::debug!(widget_id, "pomodoro finished");
        action = Some(WidgetAction::Notify {
            kind: NoticeKind::Success,
            text: "Pomodoro finished".into(),
        });
    }

    ui.vertical_centered(|ui| {
        let label = match timer.state() {
            TimerState::Finished => "Done".to_string(),
            _ => format_remaining(timer.remaining(now)),
        };
        ui.heading(egui::RichText::new(label).size(32.0).strong());
        ui.add(egui::ProgressBar::new(timer.progress(now)));
        ui.horizontal(|ui| {
            let toggle = if timer.is_running() { "Pause" } else { "Start" };
            if ui
                .add_enabled(timer.state() != TimerState::Finished, egui::Button::new(toggle))
                .clicked()
            {
                timer.toggle(now);
            }
            if ui.button("Reset").clicked() {
                timer.reset();
            }
        });
    });

    if timer.is_running() {
        ui.ctx().request_repaint_after(Duration::from_millis(250));
    }
    ui.ctx().data_mut(|d| d.insert_temp(id, timer));
    action
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Pomodoro(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut minutes = cfg.minutes();
    let changed = ui
        .horizontal(|ui| {
            ui.label("Duration");
            let resp = ui.add(egui::DragValue::new(&mut minutes)
                    .clamp_range(1.0..=180.0)
                    .speed(0.5));
            ui.label("minutes");
            resp.changed()
        })
        .inner;
    if changed {
        cfg.duration = Some(minutes);
    }
    WidgetSettingsUiResult::changed(changed)
}

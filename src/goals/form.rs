use super::{Goal, GoalPatch, GoalStatus, GoalType};
use crate::common::validation::{require_min_chars, FieldError};
use chrono::{DateTime, NaiveDate, Utc};

/// Editable state of the goal dialog.
///
/// Dates are kept as the text the user typed (`YYYY-MM-DD`) and only parsed
/// during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub kind: GoalType,
    pub status: GoalStatus,
    pub progress: u8,
    pub start_date: String,
    pub end_date: String,
    pub notes: String,
}

impl Default for GoalDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            kind: GoalType::Monthly,
            status: GoalStatus::NotStarted,
            progress: 0,
            start_date: String::new(),
            end_date: String::new(),
            notes: String::new(),
        }
    }
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidGoal {
    pub title: String,
    pub description: String,
    pub kind: GoalType,
    pub status: GoalStatus,
    pub progress: u8,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: String,
}

impl GoalDraft {
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            title: goal.title.clone(),
            description: goal.description.clone(),
            kind: goal.kind,
            status: goal.status,
            progress: goal.progress,
            start_date: format_date(goal.start_date),
            end_date: format_date(goal.end_date),
            notes: goal.notes.clone(),
        }
    }

    pub fn validate(&self) -> Result<ValidGoal, Vec<FieldError>> {
        let mut errors = Vec::new();
        require_min_chars(&mut errors, "title", &self.title, 2);
        if self.progress > 100 {
            errors.push(FieldError::new("progress", "Progress must be between 0 and 100"));
        }
        let start_date = parse_date_field(&mut errors, "start_date", &self.start_date);
        let end_date = parse_date_field(&mut errors, "end_date", &self.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.push(FieldError::new(
                    "end_date",
                    "End date cannot be before the start date",
                ));
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidGoal {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            kind: self.kind,
            status: self.status,
            progress: self.progress,
            start_date,
            end_date,
            notes: self.notes.clone(),
        })
    }
}

impl ValidGoal {
    pub fn into_goal(self, id: impl Into<String>) -> Goal {
        let mut goal = Goal::new(id, self.title, self.kind);
        goal.description = self.description;
        goal.status = self.status;
        goal.progress = self.progress;
        goal.start_date = self.start_date;
        goal.end_date = self.end_date;
        goal.notes = self.notes;
        goal
    }

    pub fn into_patch(self) -> GoalPatch {
        GoalPatch {
            title: Some(self.title),
            description: Some(self.description),
            kind: Some(self.kind),
            status: Some(self.status),
            progress: Some(self.progress),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            tags: None,
            notes: Some(self.notes),
        }
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date_field(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        Err(_) => {
            errors.push(FieldError::new(field, "Use the YYYY-MM-DD format"));
            None
        }
    }
}

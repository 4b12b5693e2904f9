use super::{filter_by_type, Goal, GoalStatus, GoalType};

/// One labelled bucket of a goal distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub value: usize,
}

impl Bucket {
    fn new(label: impl Into<String>, value: usize) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Count of goals per type, including empty types.
pub fn by_type(goals: &[Goal]) -> Vec<Bucket> {
    GoalType::ALL
        .iter()
        .map(|kind| Bucket::new(kind.label(), filter_by_type(goals, *kind).len()))
        .collect()
}

/// Count of goals per status; empty statuses are left out.
pub fn by_status(goals: &[Goal]) -> Vec<Bucket> {
    GoalStatus::ALL
        .iter()
        .map(|status| {
            Bucket::new(
                status.label(),
                goals.iter().filter(|g| g.status == *status).count(),
            )
        })
        .filter(|b| b.value > 0)
        .collect()
}

const PROGRESS_RANGES: [(u8, u8, &str); 5] = [
    (0, 20, "0-20%"),
    (20, 40, "20-40%"),
    (40, 60, "40-60%"),
    (60, 80, "60-80%"),
    (80, 101, "80-100%"),
];

/// Count of goals per 20% progress band; empty bands are left out.
///
/// Bands are half open so a goal lands in exactly one of them.
pub fn by_progress(goals: &[Goal]) -> Vec<Bucket> {
    PROGRESS_RANGES
        .iter()
        .map(|(min, max, label)| {
            Bucket::new(
                *label,
                goals
                    .iter()
                    .filter(|g| g.progress >= *min && g.progress < *max)
                    .count(),
            )
        })
        .filter(|b| b.value > 0)
        .collect()
}

/// Headline numbers shown above the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub active: usize,
    pub weekly: usize,
    pub completed: usize,
    pub overall_progress: u8,
}

pub fn summary(goals: &[Goal]) -> Summary {
    Summary {
        active: goals
            .iter()
            .filter(|g| g.status == GoalStatus::InProgress)
            .count(),
        weekly: filter_by_type(goals, GoalType::Weekly).len(),
        completed: goals
            .iter()
            .filter(|g| g.status == GoalStatus::Completed)
            .count(),
        overall_progress: super::calculate_progress(goals),
    }
}

//! Goals, tags and the helpers the dashboard uses to summarise them.
//!
//! Goals form a tree through `parent_id` / `children`. The [`crate::store::Store`]
//! keeps both sides of that link in sync for every mutation it performs;
//! [`tree_issues`] reports drift found in loaded data.

pub mod form;
pub mod stats;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Yearly,
    Quarterly,
    #[default]
    Monthly,
    Weekly,
    Habit,
}

impl GoalType {
    pub const ALL: [GoalType; 5] = [
        GoalType::Yearly,
        GoalType::Quarterly,
        GoalType::Monthly,
        GoalType::Weekly,
        GoalType::Habit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Yearly => "Yearly goal",
            GoalType::Quarterly => "Quarterly goal",
            GoalType::Monthly => "Monthly goal",
            GoalType::Weekly => "Weekly goal",
            GoalType::Habit => "Daily habit",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Yearly => "yearly",
            GoalType::Quarterly => "quarterly",
            GoalType::Monthly => "monthly",
            GoalType::Weekly => "weekly",
            GoalType::Habit => "habit",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

impl GoalStatus {
    pub const ALL: [GoalStatus; 4] = [
        GoalStatus::NotStarted,
        GoalStatus::InProgress,
        GoalStatus::Completed,
        GoalStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::NotStarted => "Not started",
            GoalStatus::InProgress => "In progress",
            GoalStatus::Completed => "Completed",
            GoalStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: GoalType,
    #[serde(default)]
    pub status: GoalStatus,
    /// Percentage in `0..=100`.
    #[serde(default)]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: GoalType) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            kind,
            status: GoalStatus::NotStarted,
            progress: 0,
            start_date: None,
            end_date: None,
            tags: Vec::new(),
            notes: String::new(),
            parent_id: None,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a goal. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<GoalType>,
    pub status: Option<GoalStatus>,
    pub progress: Option<u8>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl GoalPatch {
    /// Merge the patch into `goal`. Tree links are not part of a patch; the
    /// store changes them through dedicated operations.
    pub fn apply(self, goal: &mut Goal) {
        if let Some(title) = self.title {
            goal.title = title;
        }
        if let Some(description) = self.description {
            goal.description = description;
        }
        if let Some(kind) = self.kind {
            goal.kind = kind;
        }
        if let Some(status) = self.status {
            goal.status = status;
        }
        if let Some(progress) = self.progress {
            goal.progress = progress.min(100);
        }
        if let Some(start) = self.start_date {
            goal.start_date = start;
        }
        if let Some(end) = self.end_date {
            goal.end_date = end;
        }
        if let Some(tags) = self.tags {
            goal.tags = tags;
        }
        if let Some(notes) = self.notes {
            goal.notes = notes;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl TagPatch {
    pub fn apply(self, tag: &mut Tag) {
        if let Some(name) = self.name {
            tag.name = name;
        }
        if let Some(color) = self.color {
            tag.color = color;
        }
    }
}

/// Average progress of `goals`, rounded. Empty input yields `0`.
pub fn calculate_progress<'a>(goals: impl IntoIterator<Item = &'a Goal>) -> u8 {
    let (sum, count) = goals
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), g| (sum + g.progress as u32, count + 1));
    if count == 0 {
        return 0;
    }
    ((sum as f32 / count as f32).round() as u32).min(100) as u8
}

pub fn filter_by_type(goals: &[Goal], kind: GoalType) -> Vec<&Goal> {
    goals.iter().filter(|g| g.kind == kind).collect()
}

pub fn children_of<'a>(goals: &'a [Goal], parent_id: &str) -> Vec<&'a Goal> {
    goals
        .iter()
        .filter(|g| g.parent_id.as_deref() == Some(parent_id))
        .collect()
}

/// A goal with its resolved descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalTreeNode<'a> {
    pub goal: &'a Goal,
    pub children: Vec<GoalTreeNode<'a>>,
}

/// Build the goal forest from `parent_id` links.
///
/// Goals whose parent is missing are treated as roots. Cycles are cut at the
/// first repeated goal.
pub fn build_hierarchy(goals: &[Goal]) -> Vec<GoalTreeNode<'_>> {
    let ids: HashSet<&str> = goals.iter().map(|g| g.id.as_str()).collect();
    let mut visited = HashSet::new();
    goals
        .iter()
        .filter(|g| match g.parent_id.as_deref() {
            None => true,
            Some(parent) => !ids.contains(parent),
        })
        .map(|root| build_node(goals, root, &mut visited))
        .collect()
}

fn build_node<'a>(
    goals: &'a [Goal],
    goal: &'a Goal,
    visited: &mut HashSet<&'a str>,
) -> GoalTreeNode<'a> {
    visited.insert(goal.id.as_str());
    let children = children_of(goals, &goal.id)
        .into_iter()
        .filter(|child| !visited.contains(child.id.as_str()))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|child| build_node(goals, child, visited))
        .collect();
    GoalTreeNode { goal, children }
}

/// Describe every place where `children` lists and `parent_id` links disagree.
pub fn tree_issues(goals: &[Goal]) -> Vec<String> {
    let mut issues = Vec::new();
    for goal in goals {
        if let Some(parent_id) = &goal.parent_id {
            match goals.iter().find(|g| &g.id == parent_id) {
                None => issues.push(format!(
                    "goal '{}' references missing parent '{}'",
                    goal.id, parent_id
                )),
                Some(parent) if !parent.children.contains(&goal.id) => issues.push(format!(
                    "goal '{}' is not listed in children of '{}'",
                    goal.id, parent_id
                )),
                Some(_) => {}
            }
        }
        for child_id in &goal.children {
            match goals.iter().find(|g| &g.id == child_id) {
                None => issues.push(format!(
                    "goal '{}' lists missing child '{}'",
                    goal.id, child_id
                )),
                Some(child) if child.parent_id.as_deref() != Some(goal.id.as_str()) => {
                    issues.push(format!(
                        "goal '{}' lists child '{}' whose parent is {:?}",
                        goal.id, child_id, child.parent_id
                    ))
                }
                Some(_) => {}
            }
        }
    }
    issues
}

/// True when `ancestor` is `goal_id` itself or one of its ancestors.
pub fn is_ancestor(goals: &[Goal], ancestor: &str, goal_id: &str) -> bool {
    let mut current = Some(goal_id.to_string());
    let mut steps = 0;
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        steps += 1;
        if steps > goals.len() {
            return false;
        }
        current = goals
            .iter()
            .find(|g| g.id == id)
            .and_then(|g| g.parent_id.clone());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: &str, progress: u8) -> Goal {
        let mut g = Goal::new(id, id, GoalType::Monthly);
        g.progress = progress;
        g
    }

    #[test]
    fn progress_is_rounded_average() {
        let goals = vec![goal("a", 10), goal("b", 15)];
        assert_eq!(calculate_progress(&goals), 13);
        assert_eq!(calculate_progress(&Vec::<Goal>::new()), 0);
    }

    #[test]
    fn hierarchy_nests_children_and_survives_cycles() {
        let mut root = goal("root", 0);
        let mut child = goal("child", 0);
        let mut grandchild = goal("grandchild", 0);
        child.parent_id = Some("root".into());
        grandchild.parent_id = Some("child".into());
        root.children = vec!["child".into()];
        child.children = vec!["grandchild".into()];
        let goals = vec![root, child, grandchild];
        let tree = build_hierarchy(&goals);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].goal.id, "child");
        assert_eq!(tree[0].children[0].children[0].goal.id, "grandchild");
        assert!(tree_issues(&goals).is_empty());

        let mut a = goal("a", 0);
        let mut b = goal("b", 0);
        a.parent_id = Some("b".into());
        b.parent_id = Some("a".into());
        // Both have an existing parent, so neither is a root.
        assert!(build_hierarchy(&[a, b]).is_empty());
    }

    #[test]
    fn reports_one_sided_links() {
        let mut parent = goal("p", 0);
        let child = goal("c", 0);
        parent.children.push("c".into());
        let issues = tree_issues(&[parent, child]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("lists child 'c'"));
    }

    #[test]
    fn ancestor_walk_detects_self_and_parents() {
        let mut child = goal("c", 0);
        child.parent_id = Some("p".into());
        let goals = vec![goal("p", 0), child];
        assert!(is_ancestor(&goals, "p", "c"));
        assert!(is_ancestor(&goals, "c", "c"));
        assert!(!is_ancestor(&goals, "c", "p"));
    }

    #[test]
    fn goal_json_uses_camel_case_field_names() {
        let g = goal("a", 40);
        let value = serde_json::to_value(&g).unwrap();
        assert_eq!(value["type"], "monthly");
        assert_eq!(value["status"], "not_started");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("parentId").is_none());
    }
}

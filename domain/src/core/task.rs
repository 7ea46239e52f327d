//! Task value object

use serde::{Deserialize, Serialize};

/// The task a panel deliberates on (Value Object)
///
/// Every agent in a panel receives this text as the base of its prompt;
/// agents with upstream dependencies receive it with the combined upstream
/// responses appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    content: String,
}

impl Task {
    /// Create a new task
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Task cannot be empty");
        Self { content }
    }

    /// Try to create a new task, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the task content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Task {
    fn from(s: &str) -> Self {
        Task::new(s)
    }
}

impl From<String> for Task {
    fn from(s: String) -> Self {
        Task::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let t = Task::new("Draft a policy brief on urban transit.");
        assert_eq!(t.content(), "Draft a policy brief on urban transit.");
    }

    #[test]
    fn test_task_from_str() {
        let t: Task = "Summarize the debate.".into();
        assert_eq!(t.content(), "Summarize the debate.");
    }

    #[test]
    #[should_panic]
    fn test_empty_task_panics() {
        Task::new("   ");
    }

    #[test]
    fn test_try_new() {
        assert!(Task::try_new("").is_none());
        assert!(Task::try_new("  \n ").is_none());
        assert!(Task::try_new("ok").is_some());
    }
}

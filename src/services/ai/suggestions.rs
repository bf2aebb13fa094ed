//! 基于任务统计的固定建议

use serde::{Deserialize, Serialize};

/// 生成建议所依据的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionStats {
    pub overdue: i64,
    pub high_priority: i64,
    pub todo: i64,
}

/// 超过这个数量的待办任务会提示拆分
const MANY_TODO_THRESHOLD: i64 = 10;

pub fn build_suggestions(stats: &SuggestionStats) -> Vec<String> {
    let mut suggestions = Vec::new();

    if stats.overdue > 0 {
        suggestions.push(format!(
            "You have {} overdue task(s). Consider prioritizing these first.",
            stats.overdue
        ));
    }
    if stats.high_priority > 0 {
        suggestions.push(format!(
            "Focus on your {} high-priority task(s) today.",
            stats.high_priority
        ));
    }
    if stats.todo > MANY_TODO_THRESHOLD {
        suggestions.push(
            "You have many pending tasks. Consider breaking them down into smaller, manageable chunks."
                .to_string(),
        );
    }
    if suggestions.is_empty() {
        suggestions.push(
            "Great job staying on top of your tasks! Consider planning ahead for upcoming deadlines."
                .to_string(),
        );
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_get_encouragement() {
        let suggestions = build_suggestions(&SuggestionStats::default());
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].starts_with("Great job"));
    }

    #[test]
    fn rules_apply_in_order() {
        let suggestions = build_suggestions(&SuggestionStats {
            overdue: 2,
            high_priority: 3,
            todo: 11,
        });
        assert_eq!(
            suggestions,
            vec![
                "You have 2 overdue task(s). Consider prioritizing these first.".to_string(),
                "Focus on your 3 high-priority task(s) today.".to_string(),
                "You have many pending tasks. Consider breaking them down into smaller, manageable chunks."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn ten_todo_is_not_many() {
        let suggestions = build_suggestions(&SuggestionStats {
            todo: 10,
            ..Default::default()
        });
        assert!(suggestions[0].starts_with("Great job"));
    }

    #[test]
    fn stats_serialize_camel_case() {
        let value = serde_json::to_value(SuggestionStats {
            overdue: 1,
            high_priority: 2,
            todo: 3,
        })
        .unwrap();
        assert_eq!(value["highPriority"], 2);
    }
}

//! 聊天上下文：把当前任务统计和最近任务拼进提示词

use std::fmt::Write;

use crate::db::{StatusCounts, TaskRecord};
use crate::utils::format_date;

use super::types::{ChatMessage, ChatRole};

/// 上下文中列出的最近任务数量
pub const RECENT_TASK_LIMIT: u32 = 5;

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant integrated into a task management application. You can help users with:
1. Creating and organizing tasks
2. Setting priorities and due dates
3. Breaking down complex projects into smaller tasks
4. Providing productivity tips and suggestions
5. Helping with time management
6. Suggesting task categorization
7. Analyzing current workload and providing insights

Be concise, helpful, and focused on productivity and task management. When users ask about creating tasks, provide structured suggestions they can easily implement.";

pub fn build_task_context(counts: &StatusCounts, recent: &[TaskRecord]) -> String {
    let mut context = String::new();
    // 写入 String 不会失败
    let _ = writeln!(context, "Current Task Statistics:");
    let _ = writeln!(context, "- Total Tasks: {}", counts.total());
    let _ = writeln!(context, "- Todo: {}", counts.todo);
    let _ = writeln!(context, "- In Progress: {}", counts.in_progress);
    let _ = writeln!(context, "- Completed: {}", counts.completed);
    context.push('\n');

    let _ = writeln!(context, "Recent Tasks:");
    if recent.is_empty() {
        let _ = writeln!(context, "- No tasks yet");
    }
    for task in recent {
        let _ = write!(
            context,
            "- {} ({}, {} priority",
            task.title, task.status, task.priority
        );
        if let Some(due) = task.due_at() {
            let _ = write!(context, ", due {}", format_date(due));
        }
        context.push_str(")\n");
    }
    context.push('\n');

    context.push_str(SYSTEM_INSTRUCTION);
    context
}

/// 历史记录在前，最后一条用户消息附带上下文
pub fn build_chat_messages(
    context: &str,
    history: Vec<ChatMessage>,
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages = history;
    messages.push(ChatMessage::new(
        ChatRole::User,
        format!("{}\n\nUser: {}", context, message),
    ));
    messages
}

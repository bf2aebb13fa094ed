//! 纯视图模型：不涉及渲染，只描述界面状态和客户端校验

use chrono::{DateTime, NaiveDate, Utc};

use crate::api::{ChatReply, HistoryEntry, TaskStats, TaskView};
use crate::db::{TaskPriority, TaskStatus};
use crate::error::FieldError;
use crate::services::ChatRole;
use crate::utils::{
    ensure_not_past, format_date, format_instant, parse_due_date, parse_instant,
    validate_description, validate_title,
};

use super::types::{TaskDraft, TaskPatch};

// ========== 任务表单 ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// 创建/编辑表单；`due_date` 为日期输入框的 `YYYY-MM-DD`，空串表示无截止日期
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: String,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            due_date: String::new(),
        }
    }

    pub fn edit(task: &TaskView) -> Self {
        let due_date = task
            .due_date
            .as_deref()
            .and_then(parse_instant)
            .map(format_date)
            .unwrap_or_default();
        Self {
            mode: FormMode::Edit {
                id: task.id.clone(),
            },
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            status: task.status,
            due_date,
        }
    }

    /// 日期输入按当天结束时刻提交，当天仍可选
    fn due_instant(&self) -> Option<Result<DateTime<Utc>, FieldError>> {
        let raw = self.due_date.trim();
        if raw.is_empty() {
            return None;
        }
        let end_of_day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
            .map(|naive| naive.and_utc());
        Some(end_of_day.map(Ok).unwrap_or_else(|| parse_due_date(raw)))
    }

    /// 与服务端相同的约束；过去的截止日期只在创建时拒绝
    pub fn validate(&self, now: DateTime<Utc>) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Err(err) = validate_title(&self.title) {
            errors.push(err);
        }
        if let Err(err) = validate_description(&self.description) {
            errors.push(err);
        }
        match self.due_instant() {
            Some(Err(err)) => errors.push(err),
            Some(Ok(due)) if self.mode == FormMode::Create => {
                if let Err(err) = ensure_not_past(due, now) {
                    errors.push(err);
                }
            }
            _ => {}
        }
        errors
    }

    pub fn to_draft(&self, now: DateTime<Utc>) -> Result<TaskDraft, Vec<FieldError>> {
        let errors = self.validate(now);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(TaskDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
            status: self.status,
            due_date: self.due_instant().and_then(Result::ok).map(format_instant),
        })
    }

    /// 编辑时提交全部字段；清空日期会发送 null
    pub fn to_patch(&self, now: DateTime<Utc>) -> Result<TaskPatch, Vec<FieldError>> {
        let errors = self.validate(now);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(TaskPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            priority: Some(self.priority),
            status: Some(self.status),
            due_date: Some(self.due_instant().and_then(Result::ok).map(format_instant)),
        })
    }
}

// ========== 统计卡片 ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatTiles {
    pub total: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub completed: i64,
}

impl From<&TaskStats> for StatTiles {
    fn from(stats: &TaskStats) -> Self {
        Self {
            total: stats.total,
            todo: stats.todo,
            in_progress: stats.in_progress,
            completed: stats.completed,
        }
    }
}

impl StatTiles {
    pub fn tiles(&self) -> [StatTile; 4] {
        [
            StatTile {
                label: "Total Tasks",
                value: self.total,
            },
            StatTile {
                label: "To Do",
                value: self.todo,
            },
            StatTile {
                label: "In Progress",
                value: self.in_progress,
            },
            StatTile {
                label: "Completed",
                value: self.completed,
            },
        ]
    }

    /// 已完成占比（0..=100），按三种状态之和计算
    pub fn completion_percent(&self) -> u8 {
        let all = self.todo + self.in_progress + self.completed;
        if all <= 0 {
            return 0;
        }
        ((self.completed * 100 + all / 2) / all).clamp(0, 100) as u8
    }
}

// ========== 聊天窗口 ==========

pub const QUICK_PROMPTS: [&str; 4] = [
    "Help me prioritize my tasks",
    "Break down a complex project",
    "Suggest a daily routine",
    "Tips for better productivity",
];

const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open,
    Minimized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLogEntry {
    pub id: u64,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    state: WidgetState,
    log: Vec<ChatLogEntry>,
    pending: bool,
    next_id: u64,
}

impl ChatWidget {
    pub fn new(task_count: usize) -> Self {
        let mut widget = Self {
            state: WidgetState::Closed,
            log: Vec::new(),
            pending: false,
            next_id: 0,
        };
        widget.push(ChatRole::Assistant, welcome_message(task_count), None);
        widget
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn open(&mut self) {
        self.state = WidgetState::Open;
    }

    /// 关闭后再打开时保留对话
    pub fn close(&mut self) {
        self.state = WidgetState::Closed;
    }

    pub fn toggle_minimized(&mut self) {
        self.state = match self.state {
            WidgetState::Open => WidgetState::Minimized,
            WidgetState::Minimized => WidgetState::Open,
            WidgetState::Closed => WidgetState::Closed,
        };
    }

    pub fn messages(&self) -> &[ChatLogEntry] {
        &self.log
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// 只有欢迎语时显示快捷提问
    pub fn quick_prompts(&self) -> &'static [&'static str] {
        if self.log.len() == 1 && !self.pending {
            &QUICK_PROMPTS
        } else {
            &[]
        }
    }

    /// 记录用户消息并返回之前的对话历史（不含欢迎语）；
    /// 空消息或上一条仍在等待时返回 `None`
    pub fn begin_send(&mut self, text: &str) -> Option<Vec<HistoryEntry>> {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return None;
        }
        let history = self
            .log
            .iter()
            .skip(1)
            .map(|entry| HistoryEntry {
                role: role_name(entry.role).to_string(),
                content: entry.content.clone(),
            })
            .collect();

        self.state = WidgetState::Open;
        self.push(ChatRole::User, text.to_string(), Some(format_instant(Utc::now())));
        self.pending = true;
        Some(history)
    }

    pub fn receive_reply(&mut self, reply: ChatReply) {
        self.pending = false;
        self.push(ChatRole::Assistant, reply.message, Some(reply.timestamp));
    }

    pub fn receive_error(&mut self) {
        self.pending = false;
        self.push(
            ChatRole::Assistant,
            CHAT_ERROR_REPLY.to_string(),
            Some(format_instant(Utc::now())),
        );
    }

    fn push(&mut self, role: ChatRole, content: String, timestamp: Option<String>) {
        self.next_id += 1;
        self.log.push(ChatLogEntry {
            id: self.next_id,
            role,
            content,
            timestamp,
        });
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::System => "system",
    }
}

pub fn welcome_message(task_count: usize) -> String {
    format!(
        "Hi! I'm your AI task management assistant. I can help you with:\n\n\
         • Creating and organizing tasks\n\
         • Setting priorities and deadlines\n\
         • Breaking down complex projects\n\
         • Productivity tips and suggestions\n\
         • Time management advice\n\n\
         You currently have {} tasks. How can I help you today?",
        task_count
    )
}

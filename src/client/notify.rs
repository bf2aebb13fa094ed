//! 短暂提示（toast）

use std::time::Duration;

use tokio::time::Instant;

pub const SUCCESS_TTL: Duration = Duration::from_secs(3);
pub const ERROR_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        let ttl = match kind {
            NotificationKind::Success => SUCCESS_TTL,
            NotificationKind::Error => ERROR_TTL,
        };
        self.next_id += 1;
        self.items.push(Notification {
            id: self.next_id,
            kind,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|item| item.id != id);
    }

    /// 丢弃已过期的提示并返回剩余的
    pub fn active(&mut self) -> Vec<Notification> {
        let now = Instant::now();
        self.items.retain(|item| item.expires_at > now);
        self.items.clone()
    }
}

//! 会话状态
//!
//! 跨多次"生成"动作共享的状态只有历史记录和手动内容草稿，
//! 都由调用方持有和修改，流程本身不保存任何状态

use chrono::{DateTime, Local};

/// 一次生成的历史记录
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub created_at: DateTime<Local>,
    pub file_name: String,
    pub html: String,
}

/// 会话状态
#[derive(Debug, Default)]
pub struct SessionState {
    history: Vec<HistoryEntry>,
    /// 手动题目草稿
    pub manual_draft: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条历史记录（只追加，不修改已有记录）
    pub fn record(&mut self, file_name: impl Into<String>, html: impl Into<String>) -> &HistoryEntry {
        self.history.push(HistoryEntry {
            created_at: Local::now(),
            file_name: file_name.into(),
            html: html.into(),
        });
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

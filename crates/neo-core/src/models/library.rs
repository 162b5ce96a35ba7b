use chrono::{DateTime, NaiveDate, Utc};

use crate::services::search_filter::Searchable;

/// Past conversation shown on the chats page
#[derive(Clone, Debug, PartialEq)]
pub struct ChatHistoryEntry {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryKind {
    Note,
    Conversation,
    Insight,
}

impl MemoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Conversation => "conversation",
            Self::Insight => "insight",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Memory {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub kind: MemoryKind,
}

impl Searchable for ChatHistoryEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.last_message.as_str()]
    }
}

impl Searchable for Memory {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// Entries shown on the chats page
pub fn sample_chat_history() -> Vec<ChatHistoryEntry> {
    vec![
        ChatHistoryEntry {
            id: "1".to_string(),
            title: "Unified Energy Interface".to_string(),
            last_message: "Last message 1 month ago".to_string(),
            timestamp: utc(2024, 1, 15, 10, 30),
        },
        ChatHistoryEntry {
            id: "2".to_string(),
            title: "SolShare Peer-to-Peer Energy Network".to_string(),
            last_message: "Last message 2 months ago".to_string(),
            timestamp: utc(2024, 1, 14, 15, 45),
        },
    ]
}

/// Entries shown on the memories page
pub fn sample_memories() -> Vec<Memory> {
    vec![
        Memory {
            id: "1".to_string(),
            title: "Project Ideas Discussion".to_string(),
            content: "Discussed potential AI projects including a chatbot, recommendation system, and data analysis tool.".to_string(),
            created_at: utc(2024, 1, 15, 0, 0),
            kind: MemoryKind::Conversation,
        },
        Memory {
            id: "2".to_string(),
            title: "React Best Practices".to_string(),
            content: "Key points about React hooks, component structure, and performance optimization techniques.".to_string(),
            created_at: utc(2024, 1, 14, 0, 0),
            kind: MemoryKind::Note,
        },
        Memory {
            id: "3".to_string(),
            title: "User Experience Insights".to_string(),
            content: "Users prefer clean interfaces with minimal distractions and clear call-to-action buttons.".to_string(),
            created_at: utc(2024, 1, 13, 0, 0),
            kind: MemoryKind::Insight,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_counts() {
        assert_eq!(sample_chat_history().len(), 2);
        assert_eq!(sample_memories().len(), 3);
    }

    #[test]
    fn test_sample_timestamps_are_set() {
        let chats = sample_chat_history();
        assert_eq!(chats[0].timestamp.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");
        assert!(chats[0].timestamp > chats[1].timestamp);
    }
}

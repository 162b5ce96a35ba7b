/// Something the list pages can filter by free text
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Case-insensitive substring match over every searchable field.
/// An empty query matches everything.
pub fn matches_query<T: Searchable>(item: &T, query: &str) -> bool {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_entries<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    items.iter().filter(|item| matches_query(*item, query)).collect()
}

/// "<filtered> / <total>" badge
pub fn count_label(filtered: usize, total: usize) -> String {
    format!("{} / {}", filtered, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::library::{sample_chat_history, sample_memories};

    #[test]
    fn test_empty_query_keeps_everything() {
        let chats = sample_chat_history();
        assert_eq!(filter_entries(&chats, "").len(), chats.len());
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let chats = sample_chat_history();
        let found = filter_entries(&chats, "SOLSHARE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
    }

    #[test]
    fn test_matches_secondary_field() {
        let memories = sample_memories();
        let found = filter_entries(&memories, "call-to-action");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "User Experience Insights");

        let chats = sample_chat_history();
        assert_eq!(filter_entries(&chats, "month").len(), 2);
    }

    #[test]
    fn test_no_match() {
        let memories = sample_memories();
        assert!(filter_entries(&memories, "quantum").is_empty());
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(1, 3), "1 / 3");
    }
}

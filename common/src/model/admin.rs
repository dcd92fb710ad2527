use std::collections::HashSet;

/// User ids allowed to change the guide. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminIdentity {
    ids: HashSet<String>,
}

impl AdminIdentity {
    /// Parses a comma separated list such as `"123, 456"`. Blank entries are skipped.
    pub fn parse(list: &str) -> Self {
        let ids = list
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        AdminIdentity { ids }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Admin ids that are usable as private chat ids.
    pub fn chat_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.ids.iter().filter_map(|id| id.parse().ok()).collect();
        ids.sort_unstable();
        ids
    }
}

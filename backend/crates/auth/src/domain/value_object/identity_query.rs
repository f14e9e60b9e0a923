//! Identity listing query (analytics)

use serde::Deserialize;

/// Column an identity listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentitySort {
    Name,
    Email,
    CreatedAt,
    #[default]
    LastLogin,
}

impl IdentitySort {
    /// Whitelisted column name, safe to splice into SQL
    pub fn column(&self) -> &'static str {
        match self {
            IdentitySort::Name => "display_name",
            IdentitySort::Email => "email",
            IdentitySort::CreatedAt => "created_at",
            IdentitySort::LastLogin => "last_login_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A validated page request over identities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityQuery {
    /// 1-based
    pub page: u32,
    pub limit: u32,
    pub sort_by: IdentitySort,
    pub order: SortOrder,
    /// Case-insensitive substring on display name or email
    pub search: Option<String>,
}

impl IdentityQuery {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for IdentityQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            sort_by: IdentitySort::default(),
            order: SortOrder::default(),
            search: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let query = IdentityQuery {
            page: 3,
            limit: 20,
            ..Default::default()
        };
        assert_eq!(query.offset(), 40);
        assert_eq!(IdentityQuery::default().offset(), 0);
    }

    #[test]
    fn test_sort_deserializes_from_camel_case() {
        let sort: IdentitySort = serde_json::from_str("\"createdAt\"").unwrap();
        assert_eq!(sort, IdentitySort::CreatedAt);
        let order: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(order, SortOrder::Asc);
    }
}

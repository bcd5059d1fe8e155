// Common models - pagination, sorting and generic responses

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Sort direction. Accepts both `ASC`/`DESC` and `asc`/`desc` on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[default]
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }
}

/// A 1-indexed page request with defaults applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Missing or zero values fall back to page 1 / limit 10
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Inclusive row range `[offset, offset + limit - 1]`
    pub fn range(&self) -> (u64, u64) {
        let offset = self.offset();
        (offset, offset + u64::from(self.limit) - 1)
    }

    pub fn total_pages(&self, total: u64) -> u32 {
        let limit = u64::from(self.limit);
        u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the metadata needed to walk the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: PageRequest) -> Self {
        let total_pages = page.total_pages(total);
        Self {
            data,
            total,
            page: page.page,
            limit: page.limit,
            total_pages,
            has_next_page: page.page < total_pages,
            has_prev_page: page.page > 1,
            search: None,
            sort: None,
            sort_direction: None,
        }
    }

    pub fn with_sort(mut self, search: Option<String>, sort: &str, direction: SortDirection) -> Self {
        self.search = search;
        self.sort = Some(sort.to_string());
        self.sort_direction = Some(direction);
        self
    }
}

/// Outcome of a delete; `deleted` is true exactly when a row was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted: bool,
    pub row_count: u64,
}

impl DeleteResult {
    pub fn from_row_count(row_count: u64) -> Self {
        Self {
            deleted: row_count > 0,
            row_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(3), Some(25)).range(), (50, 74));
    }

    #[test]
    fn test_pagination_metadata() {
        for (total, limit, page, pages, next, prev) in [
            (0u64, 10u32, 1u32, 0u32, false, false),
            (1, 10, 1, 1, false, false),
            (10, 10, 1, 1, false, false),
            (11, 10, 1, 2, true, false),
            (11, 10, 2, 2, false, true),
            (25, 10, 5, 3, false, true),
        ] {
            let response: PaginatedResponse<()> =
                PaginatedResponse::new(vec![], total, PageRequest::new(Some(page), Some(limit)));
            assert_eq!(response.total_pages, pages, "total={total} limit={limit}");
            assert_eq!(response.has_next_page, next, "total={total} page={page}");
            assert_eq!(response.has_prev_page, prev, "page={page}");
        }
    }

    #[test]
    fn test_sort_direction_accepts_both_cases() {
        let upper: SortDirection = serde_json::from_str("\"ASC\"").unwrap();
        let lower: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(upper, SortDirection::Asc);
        assert_eq!(lower, SortDirection::Desc);
        assert_eq!(serde_json::to_string(&SortDirection::Desc).unwrap(), "\"DESC\"");
    }

    #[test]
    fn test_delete_result_serializes_camel_case() {
        let value = serde_json::to_value(DeleteResult::from_row_count(1)).unwrap();
        assert_eq!(value, serde_json::json!({"deleted": true, "rowCount": 1}));
        assert!(!DeleteResult::from_row_count(0).deleted);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page-number pagination shared by listing endpoints.

use crate::error::AppError;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest page size any listing accepts.
pub const MAX_LIMIT: u32 = 100;

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total_pages(total, limit);
        Self {
            data,
            page,
            limit,
            total,
            total_pages,
            has_previous_page: page > 1,
            has_next_page: page < total_pages,
        }
    }

    /// Paginate an in-memory list; `total` is the full list length.
    pub fn from_slice(items: &[T], page: u32, limit: u32) -> Self
    where
        T: Clone,
    {
        Self::new(
            paginate_slice(items, page, limit).to_vec(),
            page,
            limit,
            items.len() as u64,
        )
    }
}

/// `ceil(total / limit)`, zero when there is nothing to show.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if total == 0 || limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit)).min(u64::from(u32::MAX)) as u32
}

/// Offset of the first item on `page` (1-indexed).
pub fn page_offset(page: u32, limit: u32) -> usize {
    (page.saturating_sub(1) as usize).saturating_mul(limit as usize)
}

/// Items `[(page-1)*limit, (page-1)*limit + limit)` clamped to the slice.
pub fn paginate_slice<T>(items: &[T], page: u32, limit: u32) -> &[T] {
    let start = page_offset(page, limit);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(limit as usize).min(items.len());
    &items[start..end]
}

/// Check `page >= 1` and `1 <= limit <= MAX_LIMIT`.
pub fn validate_page_params(page: u32, limit: u32) -> Result<(), AppError> {
    let mut problems = Vec::new();
    if page < 1 {
        problems.push("page must be at least 1".to_string());
    }
    if limit < 1 || limit > MAX_LIMIT {
        problems.push(format!("limit must be between 1 and {}", MAX_LIMIT));
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 20), 5);
    }

    #[test]
    fn test_navigation_flags() {
        for total in [0u64, 1, 9, 10, 11, 57] {
            for limit in [1u32, 5, 10, 100] {
                for page in 1..=8u32 {
                    let resp: PaginatedResponse<()> = PaginatedResponse::new(vec![], page, limit, total);
                    assert_eq!(resp.has_next_page, page < resp.total_pages);
                    assert_eq!(resp.has_previous_page, page > 1);
                    assert_eq!(
                        u64::from(resp.total_pages),
                        total.div_ceil(u64::from(limit))
                    );
                }
            }
        }
    }

    #[test]
    fn test_paginate_slice() {
        let items: Vec<u32> = (1..=25).collect();

        assert_eq!(paginate_slice(&items, 1, 10), &items[0..10]);
        assert_eq!(paginate_slice(&items, 3, 10), &[21, 22, 23, 24, 25]);
        assert!(paginate_slice(&items, 4, 10).is_empty());
        assert!(paginate_slice(&items, 1000, 100).is_empty());
    }

    #[test]
    fn test_from_slice_reports_full_total() {
        let items: Vec<u32> = (1..=25).collect();
        let resp = PaginatedResponse::from_slice(&items, 2, 10);
        assert_eq!(resp.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(resp.total, 25);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.has_next_page);
    }

    #[test]
    fn test_validate_page_params() {
        assert!(validate_page_params(1, 1).is_ok());
        assert!(validate_page_params(5, 100).is_ok());
        assert!(matches!(
            validate_page_params(0, 10),
            Err(AppError::Validation(_))
        ));
        assert!(validate_page_params(1, 0).is_err());
        assert!(validate_page_params(1, 101).is_err());
    }
}

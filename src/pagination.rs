//! Page resolution for list endpoints.
//!
//! Two behaviours are exposed. List views are strict: a page that is not a
//! number or lies outside `1..=num_pages` is a 404. The catalog is lenient:
//! a non-numeric page (`last` included) falls back to the first page and an
//! out of range one to the last page. In both cases an empty result set still
//! has one (empty) page.

use thiserror::Error;

use crate::{error::AppError, response::Meta};

pub const PRODUCTS_PER_PAGE: u64 = 2;
pub const CATEGORIES_PER_PAGE: u64 = 2;
pub const TAGS_PER_PAGE: u64 = 2;
pub const ORDERS_PER_PAGE: u64 = 3;
pub const CATALOG_PER_PAGE: u64 = 1;
pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page is not an integer")]
    NotAnInteger,
    #[error("page contains no results")]
    Empty,
}

impl From<PageError> for AppError {
    fn from(_: PageError) -> Self {
        AppError::NotFound
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub per_page: u64,
    pub total: u64,
    pub num_pages: u64,
}

impl Page {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn meta(&self) -> Meta {
        Meta::new(self.number as i64, self.per_page as i64, self.total as i64)
    }
}

pub fn num_pages(total: u64, per_page: u64) -> u64 {
    if total == 0 {
        1
    } else {
        total.div_ceil(per_page)
    }
}

/// Pick the page size: the caller's override clamped to `1..=MAX_PER_PAGE`, or the view default.
pub fn page_size(requested: Option<i64>, default: u64) -> u64 {
    match requested {
        Some(n) => n.clamp(1, MAX_PER_PAGE as i64) as u64,
        None => default,
    }
}

fn parse_number(raw: Option<&str>) -> Result<i64, PageError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse::<i64>().map_err(|_| PageError::NotAnInteger),
        None => Ok(1),
    }
}

/// `last` is understood here only; the lenient paginator treats it as any other non-number.
pub fn resolve_strict(raw: Option<&str>, per_page: u64, total: u64) -> Result<Page, PageError> {
    let per_page = per_page.max(1);
    let num_pages = num_pages(total, per_page);
    let number = match raw.map(str::trim) {
        Some("last") => num_pages as i64,
        _ => parse_number(raw)?,
    };
    if number < 1 || number as u64 > num_pages {
        return Err(PageError::Empty);
    }
    Ok(Page {
        number: number as u64,
        per_page,
        total,
        num_pages,
    })
}

pub fn resolve_lenient(raw: Option<&str>, per_page: u64, total: u64) -> Page {
    let per_page = per_page.max(1);
    let num_pages = num_pages(total, per_page);
    let number = match parse_number(raw) {
        Ok(n) if n >= 1 && n as u64 <= num_pages => n as u64,
        Ok(_) => num_pages,
        Err(_) => 1,
    };
    Page {
        number,
        per_page,
        total,
        num_pages,
    }
}

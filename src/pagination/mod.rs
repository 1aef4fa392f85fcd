//! Paged collection envelope and its navigation links.

use serde::Serialize;

use crate::links::{rel, LinkDto, LinkService, Operation};

pub const DEFAULT_PAGE: u32 = 1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkDto>>,
}

/// What the collection links point at and which query parameters they echo.
pub struct Navigation<'a> {
    pub links: &'a LinkService,
    pub list: Operation,
    pub create: Operation,
    /// Echoed unchanged on every link; `page` and `pageSize` are added here.
    pub query: Vec<(&'static str, Option<String>)>,
}

impl Navigation<'_> {
    fn page_link(&self, rel: &str, page: u32, page_size: u32) -> LinkDto {
        let mut params = Vec::with_capacity(self.query.len() + 2);
        params.push(("page", Some(page.to_string())));
        params.push(("pageSize", Some(page_size.to_string())));
        params.extend(self.query.iter().cloned());
        self.links.create(self.list, rel, &params)
    }
}

/// `ceil(total_count / page_size)`, zero for an empty set or a zero page size.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if total_count == 0 || page_size == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

pub fn compose<T>(
    items: Vec<T>,
    page: u32,
    page_size: u32,
    total_count: u64,
    navigation: Option<&Navigation<'_>>,
) -> PaginationResult<T> {
    let total_pages = total_pages(total_count, page_size);
    let has_previous_page = page > 1;
    let has_next_page = page < total_pages;

    let links = navigation.map(|nav| {
        let mut links = vec![
            nav.page_link(rel::SELF, page, page_size),
            nav.links.create(nav.create, rel::CREATE, &[]),
        ];
        if has_next_page {
            links.push(nav.page_link(rel::NEXT_PAGE, page + 1, page_size));
        }
        if has_previous_page {
            links.push(nav.page_link(rel::PREVIOUS_PAGE, page - 1, page_size));
        }
        links
    });

    PaginationResult {
        items,
        page,
        page_size,
        total_count,
        total_pages,
        has_previous_page,
        has_next_page,
        links,
    }
}

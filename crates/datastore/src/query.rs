use crate::error::{StoreError, StoreResult};
use domain::{UserId, Video};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Largest page a caller can ask for; bigger requests are clamped
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page window. Zero is rejected for both fields and the size is
    /// clamped to [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, page_size: u32) -> StoreResult<Self> {
        if page == 0 {
            return Err(StoreError::Invalid("page must be a positive integer".to_string()));
        }
        if page_size == 0 {
            return Err(StoreError::Invalid("limit must be a positive integer".to_string()));
        }
        Ok(Self {
            page,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    /// Build from optional query parameters, applying defaults
    pub fn from_params(page: Option<u32>, limit: Option<u32>) -> StoreResult<Self> {
        Self::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// Cut one page out of an already filtered and sorted result set
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total_count = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .collect();
        Page {
            items,
            current_page: self.page,
            page_size: self.page_size,
            total_pages: total_count.div_ceil(u64::from(self.page_size)),
            total_count,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the metadata needed to walk the rest
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub total_count: u64,
}

/// Video fields a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Views,
    Duration,
}

impl FromStr for SortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortKey::CreatedAt),
            "updatedAt" => Ok(SortKey::UpdatedAt),
            "title" => Ok(SortKey::Title),
            "views" => Ok(SortKey::Views),
            "duration" => Ok(SortKey::Duration),
            other => Err(StoreError::Invalid(format!(
                "cannot sort by '{other}'; expected one of createdAt, updatedAt, title, views, duration"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Only an explicit `asc` sorts ascending
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl VideoSort {
    pub fn from_params(sort_by: Option<&str>, sort_type: Option<&str>) -> StoreResult<Self> {
        let key = match sort_by {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse()?,
            _ => SortKey::default(),
        };
        Ok(Self {
            key,
            direction: SortDirection::from_param(sort_type),
        })
    }

    pub(crate) fn compare(&self, a: &Video, b: &Video) -> Ordering {
        let ordering = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Views => a.views.cmp(&b.views),
            SortKey::Duration => a.duration.total_cmp(&b.duration),
        }
        .then_with(|| a.id.cmp(&b.id));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Filter, order and window for a video listing
#[derive(Debug, Clone)]
pub struct VideoQuery {
    /// Actor performing the listing; unpublished videos are only visible to their owner
    pub viewer: UserId,
    pub text: Option<String>,
    pub owner: Option<UserId>,
    pub sort: VideoSort,
    pub page: PageRequest,
}

impl VideoQuery {
    pub fn new(viewer: UserId) -> Self {
        Self {
            viewer,
            text: None,
            owner: None,
            sort: VideoSort::default(),
            page: PageRequest::default(),
        }
    }
}

/// Lower-cased search terms of a free-text query
pub(crate) fn search_terms(text: &str) -> Vec<String> {
    words(text).collect()
}

/// Any-term word match over title and description
pub(crate) fn matches_terms(video: &Video, terms: &[String]) -> bool {
    words(&video.title)
        .chain(words(&video.description))
        .any(|word| terms.contains(&word))
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

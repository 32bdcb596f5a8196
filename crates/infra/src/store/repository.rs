use async_trait::async_trait;
use thiserror::Error;

use pizzeria_core::{DomainError, DomainResult, Entity};

/// Store-level failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No aggregate is stored under the requested identifier.
    #[error("not found")]
    NotFound,

    /// The write would leave a dangling reference between aggregates.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing storage failed (lock poisoning, database errors, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// A page of results, zero-based.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    pub const DEFAULT_SIZE: u32 = 10;

    /// `size` must be at least 1.
    pub fn new(page: u32, size: u32) -> DomainResult<Self> {
        if size == 0 {
            return Err(DomainError::validation("page size must be at least 1"));
        }
        Ok(Self { page, size })
    }

    /// Clamp the page size to `max` (never below 1).
    pub fn clamp_size(self, max: u32) -> Self {
        Self {
            page: self.page,
            size: self.size.min(max.max(1)),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Name-filtered, paginated scan over one aggregate type.
///
/// Results are ordered by name, then identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuQuery {
    pub name: Option<String>,
    pub page: PageRequest,
}

impl MenuQuery {
    pub fn new(name: Option<String>, page: PageRequest) -> Self {
        Self { name, page }
    }

    /// Case-sensitive substring match; no filter matches everything.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name {
            Some(filter) => name.contains(filter.as_str()),
            None => true,
        }
    }
}

/// Persistence contract for one aggregate type.
///
/// Implementations must be safe to share across request tasks. Each `save` replaces
/// the stored aggregate as a whole; there is no version check, so concurrent writers
/// to the same identifier resolve as last-writer-wins.
#[async_trait]
pub trait Repository<A>: Send + Sync
where
    A: Entity + Send + Sync + 'static,
{
    /// Insert or replace.
    async fn save(&self, aggregate: &A) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &A::Id) -> Result<Option<A>, StoreError>;

    /// Remove the aggregate. `NotFound` if it is not stored.
    async fn delete(&self, aggregate: &A) -> Result<(), StoreError>;

    async fn query(&self, query: &MenuQuery) -> Result<Vec<A>, StoreError>;

    /// Like [`Repository::find_by_id`], but a missing aggregate is `NotFound`.
    async fn get(&self, id: &A::Id) -> Result<A, StoreError> {
        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }
}

//! Normalizes raw JSON list responses into `Page<T>`.
//!
//! Each list endpoint names its item array differently (`jobs`, `projects`,
//! `orders`, `data`) and not all of them send pagination metadata. The field
//! name is fixed per adapter instead of being guessed per response.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{DataSource, Page, PageParams, Pagination};
use crate::error::FetchError;
use crate::filter::Record;

pub trait PageAdapter<T>: Send + Sync {
    /// `requested_page` fills in a missing `current_page`.
    fn normalize(&self, requested_page: u32, body: Value) -> Result<Page<T>, FetchError>;
}

#[async_trait]
pub trait RawDataSource<S>: Send + Sync {
    async fn fetch_json(&self, params: &PageParams<S>) -> Result<Value, FetchError>;
}

#[async_trait]
impl<S, R> RawDataSource<S> for Arc<R>
where
    S: Sync,
    R: RawDataSource<S> + ?Sized,
{
    async fn fetch_json(&self, params: &PageParams<S>) -> Result<Value, FetchError> {
        (**self).fetch_json(params).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPagination {
    #[serde(default, alias = "currentPage", alias = "page")]
    current_page: Option<u32>,
    #[serde(default, alias = "totalPages")]
    total_pages: Option<u32>,
}

#[derive(Debug)]
pub struct JsonPageAdapter<T> {
    items_field: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonPageAdapter<T> {
    pub fn new(items_field: impl Into<String>) -> Self {
        Self {
            items_field: items_field.into(),
            _marker: PhantomData,
        }
    }

    pub fn items_field(&self) -> &str {
        &self.items_field
    }
}

impl<T: DeserializeOwned> PageAdapter<T> for JsonPageAdapter<T> {
    fn normalize(&self, requested_page: u32, body: Value) -> Result<Page<T>, FetchError> {
        let Value::Object(mut body) = body else {
            return Err(FetchError::server("response body is not a JSON object"));
        };

        let items = body
            .remove(&self.items_field)
            .ok_or_else(|| FetchError::server(format!("response missing '{}'", self.items_field)))?;
        let items: Vec<T> = serde_json::from_value(items).map_err(|e| {
            FetchError::server(format!("malformed '{}': {e}", self.items_field))
        })?;

        // Unreadable metadata is treated like absent metadata.
        let pagination = body
            .remove("pagination")
            .and_then(|raw| serde_json::from_value::<RawPagination>(raw).ok())
            .and_then(|raw| {
                raw.total_pages.map(|total_pages| Pagination {
                    current_page: raw.current_page.unwrap_or(requested_page),
                    total_pages,
                })
            });

        Ok(Page { items, pagination })
    }
}

/// A typed `DataSource` made of a JSON source and an adapter.
#[derive(Debug)]
pub struct Adapted<S, A> {
    source: S,
    adapter: A,
}

impl<S, A> Adapted<S, A> {
    pub fn new(source: S, adapter: A) -> Self {
        Self { source, adapter }
    }
}

#[async_trait]
impl<T, S, A> DataSource<T> for Adapted<S, A>
where
    T: Record,
    S: RawDataSource<T::Status>,
    A: PageAdapter<T>,
{
    async fn fetch_page(&self, params: PageParams<T::Status>) -> Result<Page<T>, FetchError> {
        let body = self.source.fetch_json(&params).await?;
        self.adapter.normalize(params.page, body)
    }
}

//! Repository façade over the transport client.
//!
//! A repository scopes every call to one `(app, index, token)` triple and
//! speaks the protocol crate's wire model: queries out, decoded results
//! back, plus index administration and buffered bulk item writes.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

use strata_search_protocol::{Changes, IndexSettings, Item, ItemUuid, Query, SearchResult};

use crate::client::HttpClient;
use crate::error::{ClientError, Result};
use crate::http::Response;

/// Default bulk size for [`HttpRepository::flush`].
pub const DEFAULT_BULK_NUMBER: usize = 500;

/// Operations a search repository offers.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Execute a query and decode its result.
    async fn query(&self, query: &Query) -> Result<SearchResult>;

    /// Apply changes to every item matching a query.
    async fn update_items(&self, query: &Query, changes: &Changes) -> Result<()>;

    /// Create the index.
    async fn create_index(&self, settings: &IndexSettings) -> Result<()>;

    /// Delete the index.
    async fn delete_index(&self) -> Result<()>;

    /// Reset the index to empty.
    async fn reset_index(&self) -> Result<()>;

    /// True when the index exists and answers.
    async fn check_index(&self) -> Result<bool>;

    /// Reconfigure the index.
    async fn configure_index(&self, settings: &IndexSettings) -> Result<()>;

    /// Write one batch of item updates and deletions.
    async fn flush_items(
        &self,
        items_to_update: &[Item],
        items_to_delete: &[ItemUuid],
    ) -> Result<()>;
}

/// HTTP-backed repository.
pub struct HttpRepository<C: HttpClient> {
    client: C,
    app_id: String,
    index_id: String,
    token: String,
    items_to_update: Mutex<Vec<Item>>,
    items_to_delete: Mutex<Vec<ItemUuid>>,
}

impl<C: HttpClient> HttpRepository<C> {
    /// Create a repository over a transport client.
    pub fn new(
        client: C,
        app_id: impl Into<String>,
        index_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            app_id: app_id.into(),
            index_id: index_id.into(),
            token: token.into(),
            items_to_update: Mutex::new(Vec::new()),
            items_to_delete: Mutex::new(Vec::new()),
        }
    }

    /// The transport client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Buffer one item for the next flush.
    pub fn add_item(&self, item: Item) {
        self.lock_updates().push(item);
    }

    /// Buffer items for the next flush.
    pub fn add_items(&self, items: Vec<Item>) {
        self.lock_updates().extend(items);
    }

    /// Buffer one deletion for the next flush.
    pub fn delete_item(&self, uuid: ItemUuid) {
        self.lock_deletes().push(uuid);
    }

    /// Buffer deletions for the next flush.
    pub fn delete_items(&self, uuids: Vec<ItemUuid>) {
        self.lock_deletes().extend(uuids);
    }

    /// Write the buffered updates in fixed-size chunks, then the buffered
    /// deletions.
    ///
    /// With `skip_if_less`, nothing happens while fewer than `bulk_number`
    /// updates are buffered. The buffers are reset whether the flush
    /// succeeds or fails.
    pub async fn flush(&self, bulk_number: usize, skip_if_less: bool) -> Result<()> {
        let bulk_number = bulk_number.max(1);
        let items_to_update = self.lock_updates().clone();
        if skip_if_less && items_to_update.len() < bulk_number {
            return Ok(());
        }
        let items_to_delete = self.lock_deletes().clone();

        let result = async {
            for chunk in items_to_update.chunks(bulk_number) {
                self.flush_items(chunk, &[]).await?;
            }
            self.flush_items(&[], &items_to_delete).await
        }
        .await;

        self.lock_updates().clear();
        self.lock_deletes().clear();

        result
    }

    fn lock_updates(&self) -> std::sync::MutexGuard<'_, Vec<Item>> {
        self.items_to_update
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_deletes(&self) -> std::sync::MutexGuard<'_, Vec<ItemUuid>> {
        self.items_to_delete
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn credentials(&self) -> Vec<(String, String)> {
        vec![
            ("app_id".to_string(), self.app_id.clone()),
            ("index".to_string(), self.index_id.clone()),
            ("token".to_string(), self.token.clone()),
        ]
    }

    fn ensure_success(response: &Response) -> Result<()> {
        match ClientError::from_response(response) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<C: HttpClient> Repository for HttpRepository<C> {
    async fn query(&self, query: &Query) -> Result<SearchResult> {
        let response = self
            .client
            .get(
                "/",
                "get",
                &self.credentials(),
                json!({"query": query.to_value()}),
                &[],
            )
            .await?;
        Self::ensure_success(&response)?;

        Ok(SearchResult::from_value(response.body())?)
    }

    async fn update_items(&self, query: &Query, changes: &Changes) -> Result<()> {
        let response = self
            .client
            .get(
                "/items",
                "put",
                &self.credentials(),
                json!({
                    "query": query.to_value(),
                    "changes": changes,
                }),
                &[],
            )
            .await?;

        Self::ensure_success(&response)
    }

    async fn create_index(&self, settings: &IndexSettings) -> Result<()> {
        let response = self
            .client
            .get(
                "/index",
                "post",
                &self.credentials(),
                json!({"config": settings}),
                &[],
            )
            .await?;

        Self::ensure_success(&response)
    }

    async fn delete_index(&self) -> Result<()> {
        let response = self
            .client
            .get("/index", "delete", &self.credentials(), json!({}), &[])
            .await?;

        Self::ensure_success(&response)
    }

    async fn reset_index(&self) -> Result<()> {
        let response = self
            .client
            .get("/index/reset", "post", &self.credentials(), json!({}), &[])
            .await?;

        Self::ensure_success(&response)
    }

    async fn check_index(&self) -> Result<bool> {
        let response = self
            .client
            .get("/index", "head", &self.credentials(), json!({}), &[])
            .await?;
        Self::ensure_success(&response)?;

        Ok(response.code() == 200)
    }

    async fn configure_index(&self, settings: &IndexSettings) -> Result<()> {
        let response = self
            .client
            .get(
                "/index/config",
                "post",
                &self.credentials(),
                json!({"config": settings}),
                &[],
            )
            .await?;

        Self::ensure_success(&response)
    }

    async fn flush_items(
        &self,
        items_to_update: &[Item],
        items_to_delete: &[ItemUuid],
    ) -> Result<()> {
        if !items_to_update.is_empty() {
            let response = self
                .client
                .get(
                    "/items",
                    "post",
                    &self.credentials(),
                    json!({"items": items_to_update}),
                    &[],
                )
                .await?;
            Self::ensure_success(&response)?;
        }

        if !items_to_delete.is_empty() {
            let response = self
                .client
                .get(
                    "/items",
                    "delete",
                    &self.credentials(),
                    json!({"items": items_to_delete}),
                    &[],
                )
                .await?;
            Self::ensure_success(&response)?;
        }

        Ok(())
    }
}

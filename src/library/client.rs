use log::info;
use serde::Deserialize;

use crate::error::ImportError;

/// One book as the library reports it in `getAllBooks`.
///
/// `status` is an open-ended tag; `Wanted`, `Open`, `Snatched` and
/// `Skipped` are the ones with defined handling, anything else is treated
/// like an untracked book. Name and author only feed log lines, so they
/// default to empty when the service omits them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    #[serde(rename = "BookID")]
    pub book_id: String,
    #[serde(rename = "BookName", default)]
    pub book_name: String,
    #[serde(rename = "AuthorName", default)]
    pub author_name: String,
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// Body and status of a completed command request.
///
/// Non-2xx statuses are NOT an error at this level: the row annotation
/// records body and status either way. Only transport failures (no
/// response at all) surface as [`ImportError::Api`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOutcome {
    pub code: u16,
    pub body: String,
}

impl ApiOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// The four commands the import run needs.
#[allow(async_fn_in_trait)]
pub trait LibraryApi {
    /// Fetches the full catalog snapshot.
    async fn all_books(&self) -> Result<Vec<CatalogEntry>, ImportError>;

    /// Queues a book the library does not know yet.
    async fn add_book(&self, book_id: &str) -> Result<ApiOutcome, ImportError>;

    /// Re-queues a previously skipped book.
    async fn mark_wanted(&self, book_id: &str) -> Result<ApiOutcome, ImportError>;

    /// Asks the library to re-scan for newly wanted entries.
    async fn force_search(&self) -> Result<ApiOutcome, ImportError>;
}

/// `reqwest`-backed [`LibraryApi`] against `<base_url>/api`.
///
/// Every command is a GET with `apikey` and `cmd` query parameters, plus
/// `id` where a command targets one book. Requests carry no explicit
/// timeout and are never retried; a stalled service stalls the run.
pub struct HttpLibraryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpLibraryClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn command(
        &self,
        cmd: &str,
        book_id: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}/api", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("apikey", &self.api_key), ("cmd", cmd)];
        if let Some(id) = book_id {
            query.push(("id", id));
        }
        self.http.get(url).query(&query).send().await
    }

    async fn outcome(&self, cmd: &str, book_id: Option<&str>) -> Result<ApiOutcome, ImportError> {
        let response = self
            .command(cmd, book_id)
            .await
            .map_err(|error| ImportError::Api(error.to_string()))?;
        let code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| ImportError::Api(error.to_string()))?;
        Ok(ApiOutcome { code, body })
    }
}

impl LibraryApi for HttpLibraryClient {
    async fn all_books(&self) -> Result<Vec<CatalogEntry>, ImportError> {
        let response = self
            .command("getAllBooks", None)
            .await
            .map_err(|error| ImportError::CatalogFetch(error.to_string()))?;

        if !response.status().is_success() {
            return Err(ImportError::CatalogFetch(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let books = response
            .json::<Vec<CatalogEntry>>()
            .await
            .map_err(|error| ImportError::CatalogFetch(error.to_string()))?;
        info!("Done fetching books");
        Ok(books)
    }

    async fn add_book(&self, book_id: &str) -> Result<ApiOutcome, ImportError> {
        self.outcome("addBook", Some(book_id)).await
    }

    async fn mark_wanted(&self, book_id: &str) -> Result<ApiOutcome, ImportError> {
        self.outcome("markWanted", Some(book_id)).await
    }

    async fn force_search(&self) -> Result<ApiOutcome, ImportError> {
        self.outcome("forceBookSearch", None).await
    }
}

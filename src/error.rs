use thiserror::Error;

#[derive(Error, Debug)]
/// Import error
pub enum ImportError {
    /// Missing or unusable process configuration. Fatal before any work.
    #[error("configuration: {0}")]
    Configuration(String),

    /// The one-shot catalog snapshot could not be fetched. Fatal.
    #[error("catalog fetch: {0}")]
    CatalogFetch(String),

    /// The input export could not be read. Fatal.
    #[error("input file: {0}")]
    InputFile(String),

    /// A per-row or force-search request failed at the transport level
    /// (no HTTP response available). Recovered by the caller.
    #[error("api request: {0}")]
    Api(String),

    /// Writing the annotated output failed. Recovered at the top level.
    #[error("csv write: {0}")]
    CsvWrite(String),
}

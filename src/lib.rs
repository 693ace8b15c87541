/*!
 # lazylib-import

 Reconciles a Goodreads reading-list export (CSV) against the book catalog
 of a [LazyLibrarian](https://lazylibrarian.gitlab.io/) instance. Every
 `to-read` row that the library does not already track is queued with an
 `addBook` call; previously skipped books are re-queued with `markWanted`.
 Each API outcome is written back into an annotated copy of the export.

 ## Core concepts

 - **[`csv::Table`]:** the decoded export, one Header Set plus positional
   rows. Goodreads exports quote freely, so decoding uses a hand-rolled
   RFC4180-style tokenizer rather than a strict parser: surrounding
   whitespace is trimmed, short rows are padded, unbalanced quotes degrade
   gracefully instead of failing the file.
 - **[`library::LibraryApi`]:** the four LazyLibrarian commands the tool
   needs (`getAllBooks`, `addBook`, `markWanted`, `forceBookSearch`),
   behind a trait so the engine can be exercised against a fake.
 - **[`reconcile::Reconciler`]:** the single sequential pass. For each
   candidate row it decides between *already tracked* (drop), *mark
   wanted*, and *add book*, annotates the row with `FoundInLibrary`,
   `LibraryStatus`, `Response` and `ResponseCode`, and accumulates the
   rows that belong in the output.

 ## Example

 ```
 use lazylib_import::csv::Table;

 let table = Table::parse("Book Id,Title\n1,\"Dune, Messiah\"\n");
 assert_eq!(table.headers(), ["Book Id", "Title"]);
 assert_eq!(table.rows()[0].get(1), "Dune, Messiah");
 ```

 Configuration comes from the environment (optionally a `.env` file):
 `API_KEY` is required, `BASE_URL`, `INPUT_FILE`, `OUTPUT_FILE`,
 `TARGET_SHELF` and `START_INDEX` are optional. See [`config::Config`].
*/

/// Environment-driven configuration
pub mod config;

/// CSV codec: decode (tokenizer + table) and encode (incremental writer)
pub mod csv;

/// Error types for the import run
pub mod error;

/// Cancellable keep-alive heartbeat task
pub mod keepalive;

/// LazyLibrarian API client and catalog types
pub mod library;

/// Row reconciliation engine
pub mod reconcile;

#[doc(inline)]
pub use error::*;

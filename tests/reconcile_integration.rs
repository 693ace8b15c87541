use std::sync::Mutex;

use lazylib_import::{
    csv::{CsvWriter, Table},
    error::ImportError,
    library::{ApiOutcome, CatalogEntry, LibraryApi},
    reconcile::{ReconcilerBuilder, RunReport},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    AddBook(String),
    MarkWanted(String),
    ForceSearch,
}

/// Scripted stand-in for the LazyLibrarian client: records every command
/// and answers with configurable outcomes.
struct FakeLibrary {
    calls: Mutex<Vec<Call>>,
    add_result: Result<ApiOutcome, String>,
    mark_result: Result<ApiOutcome, String>,
    force_result: Result<ApiOutcome, String>,
}

impl Default for FakeLibrary {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            add_result: Ok(outcome(200, "added")),
            mark_result: Ok(outcome(200, "queued")),
            force_result: Ok(outcome(200, "searching")),
        }
    }
}

impl FakeLibrary {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, result: &Result<ApiOutcome, String>) -> Result<ApiOutcome, ImportError> {
        match result {
            Ok(outcome) => Ok(outcome.clone()),
            Err(message) => Err(ImportError::Api(message.clone())),
        }
    }
}

impl LibraryApi for FakeLibrary {
    async fn all_books(&self) -> Result<Vec<CatalogEntry>, ImportError> {
        Ok(Vec::new())
    }

    async fn add_book(&self, book_id: &str) -> Result<ApiOutcome, ImportError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::AddBook(book_id.to_string()));
        self.answer(&self.add_result)
    }

    async fn mark_wanted(&self, book_id: &str) -> Result<ApiOutcome, ImportError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::MarkWanted(book_id.to_string()));
        self.answer(&self.mark_result)
    }

    async fn force_search(&self) -> Result<ApiOutcome, ImportError> {
        self.calls.lock().unwrap().push(Call::ForceSearch);
        self.answer(&self.force_result)
    }
}

fn outcome(code: u16, body: &str) -> ApiOutcome {
    ApiOutcome {
        code,
        body: body.to_string(),
    }
}

fn book(id: &str, status: &str) -> CatalogEntry {
    CatalogEntry {
        book_id: id.to_string(),
        book_name: format!("Book {id}"),
        author_name: "Some Author".to_string(),
        status: status.to_string(),
    }
}

const EXPORT: &str = "\
Book Id,Title,Author,Exclusive Shelf
1,Dune,Frank Herbert,to-read
2,Emma,Jane Austen,read
3,Hyperion,Dan Simmons,to-read
";

async fn run_default(
    fake: &FakeLibrary,
    text: &str,
    catalog: &[CatalogEntry],
    start_index: usize,
) -> RunReport {
    ReconcilerBuilder::new()
        .name("test-run")
        .start_index(start_index)
        .build(fake)
        .run(Table::parse(text), catalog)
        .await
}

#[tokio::test]
async fn first_data_row_is_skipped_by_default() {
    // Row "1" never examined (start index), row "2" off-shelf, row "3" added
    let fake = FakeLibrary::default();
    let catalog = [book("1", "Open")];

    let report = run_default(&fake, EXPORT, &catalog, 1).await;

    assert_eq!(
        fake.calls(),
        [Call::AddBook("3".to_string()), Call::ForceSearch]
    );
    assert_eq!(report.rows.len(), 1);

    let row = &report.rows[0];
    assert_eq!(
        row.values(),
        [
            "3",
            "Hyperion",
            "Dan Simmons",
            "to-read",
            "No",
            "Not Found",
            "added",
            "200"
        ]
    );
    assert_eq!(report.execution.read_count, 2);
    assert_eq!(report.execution.wrong_shelf_count, 1);
    assert_eq!(report.execution.added_count, 1);
}

#[tokio::test]
async fn start_index_zero_examines_every_row() {
    let fake = FakeLibrary::default();
    let catalog = [book("1", "Open")];

    let report = run_default(&fake, EXPORT, &catalog, 0).await;

    // Row "1" is now examined, found tracked, and left out of the output
    assert_eq!(
        fake.calls(),
        [Call::AddBook("3".to_string()), Call::ForceSearch]
    );
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.execution.read_count, 3);
    assert_eq!(report.execution.already_tracked_count, 1);
}

#[tokio::test]
async fn tracked_statuses_are_excluded_without_calls() {
    for status in ["Wanted", "Open", "Snatched"] {
        let fake = FakeLibrary::default();
        let catalog = [book("3", status)];

        let report = run_default(&fake, EXPORT, &catalog, 1).await;

        assert_eq!(fake.calls(), [Call::ForceSearch], "status {status}");
        assert!(report.rows.is_empty(), "status {status}");
    }
}

#[tokio::test]
async fn skipped_book_gets_exactly_one_mark_wanted() {
    let fake = FakeLibrary::default();
    let catalog = [book("3", "Skipped")];

    let report = run_default(&fake, EXPORT, &catalog, 1).await;

    assert_eq!(
        fake.calls(),
        [Call::MarkWanted("3".to_string()), Call::ForceSearch]
    );
    assert_eq!(report.rows.len(), 1);

    let row = &report.rows[0];
    assert_eq!(row.get(4), "Yes");
    assert_eq!(row.get(5), "Skipped");
    assert_eq!(row.get(6), "queued");
    assert_eq!(row.get(7), "200");
    assert_eq!(report.execution.marked_wanted_count, 1);
}

#[tokio::test]
async fn unhandled_status_still_adds_but_reflects_the_match() {
    let fake = FakeLibrary::default();
    let catalog = [book("3", "Ignored")];

    let report = run_default(&fake, EXPORT, &catalog, 1).await;

    assert_eq!(
        fake.calls(),
        [Call::AddBook("3".to_string()), Call::ForceSearch]
    );
    let row = &report.rows[0];
    assert_eq!(row.get(4), "Yes");
    assert_eq!(row.get(5), "Ignored");
}

#[tokio::test]
async fn missing_book_id_is_excluded_entirely() {
    let text = "\
Book Id,Title,Author,Exclusive Shelf
1,Dune,Frank Herbert,to-read
,Untitled,Nobody,to-read
";
    let fake = FakeLibrary::default();

    let report = run_default(&fake, text, &[], 1).await;

    assert_eq!(fake.calls(), [Call::ForceSearch]);
    assert!(report.rows.is_empty());
    assert_eq!(report.execution.missing_id_count, 1);
}

#[tokio::test]
async fn headers_gain_the_annotation_columns_once() {
    let fake = FakeLibrary::default();

    let report = run_default(&fake, EXPORT, &[book("9", "Wanted")], 1).await;

    assert_eq!(
        report.headers,
        [
            "Book Id",
            "Title",
            "Author",
            "Exclusive Shelf",
            "FoundInLibrary",
            "LibraryStatus",
            "Response",
            "ResponseCode"
        ]
    );
}

#[tokio::test]
async fn transport_failure_annotates_and_continues() {
    let text = "\
Book Id,Title,Author,Exclusive Shelf
0,Header Echo,Nobody,read
3,Hyperion,Dan Simmons,to-read
4,Ilium,Dan Simmons,to-read
";
    let fake = FakeLibrary {
        add_result: Err("connection refused".to_string()),
        ..FakeLibrary::default()
    };

    let report = run_default(&fake, text, &[], 1).await;

    // Both rows attempted despite the first failure, force search still ran
    assert_eq!(
        fake.calls(),
        [
            Call::AddBook("3".to_string()),
            Call::AddBook("4".to_string()),
            Call::ForceSearch
        ]
    );
    assert_eq!(report.rows.len(), 2);
    let row = &report.rows[0];
    assert_eq!(row.get(4), "No");
    assert_eq!(row.get(5), "Not Found");
    assert_eq!(row.get(6), "api request: connection refused");
    assert_eq!(row.get(7), "");
    assert_eq!(report.execution.call_error_count, 2);
}

#[tokio::test]
async fn http_error_statuses_are_recorded_verbatim() {
    let fake = FakeLibrary {
        add_result: Ok(outcome(500, "database locked")),
        ..FakeLibrary::default()
    };

    let report = run_default(&fake, EXPORT, &[], 1).await;

    let row = &report.rows[0];
    assert_eq!(row.get(6), "database locked");
    assert_eq!(row.get(7), "500");
    assert_eq!(report.execution.call_error_count, 1);
}

#[tokio::test]
async fn force_search_failure_does_not_affect_the_report() {
    let fake = FakeLibrary {
        force_result: Err("timed out".to_string()),
        ..FakeLibrary::default()
    };

    let report = run_default(&fake, EXPORT, &[], 1).await;

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].get(6), "added");
}

#[tokio::test]
async fn force_search_runs_even_with_no_data_rows() {
    let fake = FakeLibrary::default();

    let report = run_default(&fake, "Book Id,Exclusive Shelf\n", &[], 1).await;

    assert_eq!(fake.calls(), [Call::ForceSearch]);
    assert!(report.rows.is_empty());
    assert_eq!(report.execution.read_count, 0);
}

#[tokio::test]
async fn annotated_rows_encode_into_the_output_shape() {
    let fake = FakeLibrary::default();
    let catalog = [book("1", "Open")];

    let report = run_default(&fake, EXPORT, &catalog, 1).await;

    let wtr = CsvWriter::from_writer(vec![]);
    wtr.write_header(&report.headers).unwrap();
    for row in &report.rows {
        wtr.write_row(row).unwrap();
    }

    let data = String::from_utf8(wtr.into_inner()).unwrap();
    assert_eq!(
        data,
        "Book Id,Title,Author,Exclusive Shelf,FoundInLibrary,LibraryStatus,Response,ResponseCode\n\
         \"3\",\"Hyperion\",\"Dan Simmons\",\"to-read\",\"No\",\"Not Found\",\"added\",\"200\"\n"
    );
}

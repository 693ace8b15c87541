//! CSV codec for reading-list exports.
//!
//! The decode side lives here: [`tokenize`] splits one physical line into
//! fields, [`Table::parse`] turns a whole export into a Header Set plus
//! positional rows. The encode side is [`writer::CsvWriter`].
//!
//! Goodreads exports are messy: quoted titles with embedded commas,
//! doubled quotes inside quoted fields, stray blank lines, ragged rows.
//! Decoding is therefore deliberately forgiving: surrounding whitespace is
//! trimmed, short rows are padded with empty fields, long rows are
//! truncated, and an unterminated quote degrades into "rest of the line is
//! one field" instead of rejecting the file. A quoted field can NOT span
//! physical lines: the input is split on `\n` before tokenization.

pub mod writer;

pub use writer::CsvWriter;

/// Splits a single physical line into fields.
///
/// A single left-to-right scan with an in-quotes flag:
/// - `"` toggles quoting; a doubled `""` inside quotes emits one literal
///   quote;
/// - `,` outside quotes ends the current field;
/// - everything else (commas inside quotes included) is kept verbatim.
///
/// Every emitted field is trimmed of surrounding whitespace. Unbalanced
/// quotes are not an error; the flag simply stays set, so no separator is
/// honored for the rest of the line.
///
/// # Examples
///
/// ```
/// use lazylib_import::csv::tokenize;
///
/// assert_eq!(tokenize(r#"a,"b,c",d"#), ["a", "b,c", "d"]);
/// assert_eq!(tokenize(r#"a,"b""c",d"#), ["a", "b\"c", "d"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field: one literal quote
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(c),
        }
    }

    fields.push(field.trim().to_string());
    fields
}

/// One data row: field values in Header Set order.
///
/// Rows are positional. [`Table::parse`] pads every row to exactly the
/// header count, and the reconciliation engine appends its annotation
/// values in the same order it appends the annotation headers, so a row's
/// value order and the table's header order never diverge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// Value at `index`, or the empty string when out of range.
    pub fn get(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or_default()
    }

    /// Appends one value at the end of the row.
    pub fn push(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A decoded export: the Header Set and the data rows, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Decodes raw export text.
    ///
    /// Splits on `\n`, trims each physical line and drops lines that are
    /// empty after trimming. The first surviving line is tokenized into
    /// the Header Set; every later line becomes a [`Row`] zipped
    /// positionally against the headers: missing trailing fields default
    /// to the empty string, excess fields are dropped. Empty input yields
    /// an empty table.
    ///
    /// ```
    /// use lazylib_import::csv::Table;
    ///
    /// let table = Table::parse("id,name\n\n1,Ada\n2\n");
    /// assert_eq!(table.headers(), ["id", "name"]);
    /// assert_eq!(table.rows().len(), 2);
    /// assert_eq!(table.rows()[1].get(1), "");
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut lines = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let headers = match lines.next() {
            Some(line) => tokenize(line),
            None => return Self::default(),
        };

        let rows = lines
            .map(|line| {
                let mut values = tokenize(line);
                values.resize(headers.len(), String::new());
                Row::new(values)
            })
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Position of a header by exact name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Consumes the table into `(headers, rows)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.headers, self.rows)
    }
}

// Parser for the annotated CSV returned by the Flux query endpoint
use crate::application::data_api::QueryRow;
use crate::domain::error::RemoteError;

/// Turn a query response into rows, keeping server order.
///
/// Each table starts with `#datatype`/`#group`/`#default` annotation rows
/// followed by a header row. Without annotations the first record is the
/// header. The unnamed leading annotation column is dropped, and a table
/// whose first named column is `error` becomes `RemoteError::Query`.
pub fn parse_query_response(body: &str) -> Result<Vec<QueryRow>, RemoteError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    let mut header: Option<Vec<String>> = None;

    for result in reader.records() {
        let record = result.map_err(|e| RemoteError::Decode(e.to_string()))?;

        if record.get(0).is_some_and(|value| value.starts_with('#')) {
            // annotations announce a new table
            header = None;
            continue;
        }

        let Some(columns) = header.as_ref() else {
            header = Some(record.iter().map(str::to_string).collect());
            continue;
        };

        if let Some(error_idx) = error_column(columns) {
            let message = record.get(error_idx).unwrap_or_default().to_string();
            return Err(RemoteError::Query(message));
        }

        if record.len() != columns.len() {
            return Err(RemoteError::Decode(format!(
                "row has {} values but the table has {} columns",
                record.len(),
                columns.len()
            )));
        }

        let row: QueryRow = columns
            .iter()
            .zip(record.iter())
            .filter(|(column, _)| !column.is_empty())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Index of the `error` column when it is the first named column
fn error_column(columns: &[String]) -> Option<usize> {
    columns
        .iter()
        .position(|column| !column.is_empty())
        .filter(|&idx| columns[idx] == "error")
}

// src/utils/export.rs

use serde::Serialize;

use crate::models::{
    question::Catalog,
    response::ResponseRecord,
    submission::Answer,
};

/// UTF-8 byte-order mark; spreadsheet tools need it to detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Separator between labels in a multi-choice cell.
const MULTI_SEPARATOR: &str = "; ";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flat projection of the stored records, one row per record.
#[derive(Debug, Serialize)]
pub struct ResponseTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell(answer: Option<&Answer>) -> String {
    match answer {
        None => String::new(),
        Some(Answer::Single(label)) => label.clone(),
        Some(Answer::Multi(labels)) => labels
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(MULTI_SEPARATOR),
    }
}

/// Columns: `name`, `submitted_at`, then every question id in catalog order.
pub fn to_table(records: &[ResponseRecord], catalog: &Catalog) -> ResponseTable {
    let mut columns = vec!["name".to_string(), "submitted_at".to_string()];
    columns.extend(catalog.all().iter().map(|q| q.id.clone()));

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![
                record.respondent_name.clone(),
                record.submitted_at.format(TIMESTAMP_FORMAT).to_string(),
            ];
            row.extend(
                catalog
                    .all()
                    .iter()
                    .map(|q| cell(record.answers.get(&q.id))),
            );
            row
        })
        .collect();

    ResponseTable { columns, rows }
}

/// The table as CSV bytes, prefixed with a UTF-8 BOM.
pub fn to_csv(records: &[ResponseRecord], catalog: &Catalog) -> Result<Vec<u8>, csv::Error> {
    let table = to_table(records, catalog);

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

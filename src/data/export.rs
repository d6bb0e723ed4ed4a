use std::borrow::Cow;
use std::io::Write;

use crate::error::{PrepError, Result};
use crate::types::{format_number, RawValue, ScoredRow, SCORE_COLUMNS};

fn cell(value: &RawValue) -> Cow<'_, str> {
    match value {
        RawValue::Number(x) => Cow::Owned(format_number(*x)),
        RawValue::Text(s) => Cow::Borrowed(s.as_str()),
        RawValue::Missing => Cow::Borrowed(""),
    }
}

/// Результаты скоринга в CSV: исходные колонки в заданном порядке, затем probability и prediction.
pub fn write_scored_csv<W: Write>(writer: W, columns: &[String], scored: &[ScoredRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let header = columns.iter().map(String::as_str).chain(SCORE_COLUMNS);
    writer.write_record(header)?;

    for result in scored {
        let mut record: Vec<Cow<'_, str>> = columns
            .iter()
            .map(|column| result.row.get(column).map(cell).unwrap_or(Cow::Borrowed("")))
            .collect();
        record.push(Cow::Owned(result.probability.to_string()));
        record.push(Cow::Borrowed(result.prediction.as_str()));
        writer.write_record(record.iter().map(|c| c.as_bytes()))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn scored_to_csv(columns: &[String], scored: &[ScoredRow]) -> Result<String> {
    let mut buffer = Vec::new();
    write_scored_csv(&mut buffer, columns, scored)?;
    String::from_utf8(buffer).map_err(|e| PrepError::Parse(e.to_string()))
}

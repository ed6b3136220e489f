//! Mapping of column-keyed export records onto raw trade rows.
//!
//! This is the rename step of normalization: a record carries the export's
//! column names, and each configured column is relabeled onto its
//! `RawTradeRow` field without changing the value. A column missing from the
//! record is a schema mismatch; a `null` value is an absent value.

use chrono::{DateTime, NaiveDate};
use flow_core::{config::ColumnMapping, Error, RawTradeRow, Result, TradeDate};
use serde_json::{Map, Value};

/// One export row keyed by column name.
pub type RawRecord = Map<String, Value>;

/// Maps export records onto `RawTradeRow`s using a column mapping.
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    columns: ColumnMapping,
}

impl RecordMapper {
    /// Create a mapper for the given column names.
    pub fn new(columns: ColumnMapping) -> Self {
        Self { columns }
    }

    /// Column names in use.
    pub fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    /// Map a single record. `row` is used for error reporting only.
    pub fn map_record(&self, row: usize, record: &RawRecord) -> Result<RawTradeRow> {
        let c = &self.columns;
        Ok(RawTradeRow {
            trade_date: date_field(&c.trade_date, row, column(record, &c.trade_date, row)?)?,
            sector: text_field(&c.sector, row, column(record, &c.sector, row)?)?,
            sub_sector: text_field(&c.sub_sector, row, column(record, &c.sub_sector, row)?)?,
            segment: text_field(&c.segment, row, column(record, &c.segment, row)?)?,
            account: text_field(&c.account, row, column(record, &c.account, row)?)?,
            buy_amount: amount_field(&c.buy_amount, row, column(record, &c.buy_amount, row)?)?,
            sell_amount: amount_field(&c.sell_amount, row, column(record, &c.sell_amount, row)?)?,
            net_amount: amount_field(&c.net_amount, row, column(record, &c.net_amount, row)?)?,
            total_amount: amount_field(&c.total_amount, row, column(record, &c.total_amount, row)?)?,
        })
    }

    /// Map all records, failing on the first bad one.
    pub fn map_records(&self, records: &[RawRecord]) -> Result<Vec<RawTradeRow>> {
        records
            .iter()
            .enumerate()
            .map(|(row, record)| self.map_record(row, record))
            .collect()
    }
}

fn column<'a>(record: &'a RawRecord, name: &str, row: usize) -> Result<&'a Value> {
    record
        .get(name)
        .ok_or_else(|| Error::schema_mismatch(name, row))
}

/// Text cells, passed through verbatim. Numeric codes are kept as their
/// decimal text; only `null` is absent.
fn text_field(name: &str, row: usize, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(Error::invalid_value(name, row, other.to_string())),
    }
}

fn amount_field(name: &str, row: usize, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| Error::invalid_value(name, row, n.to_string())),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| Error::invalid_value(name, row, s.clone())),
        other => Err(Error::invalid_value(name, row, other.to_string())),
    }
}

/// Dates as `YYYY-MM-DD`, an ISO datetime (date part kept) or epoch millis.
fn date_field(name: &str, row: usize, value: &Value) -> Result<Option<TradeDate>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_date(s.trim())
            .map(Some)
            .ok_or_else(|| Error::invalid_value(name, row, s.clone())),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| Some(dt.date_naive()))
            .ok_or_else(|| Error::invalid_value(name, row, n.to_string())),
        other => Err(Error::invalid_value(name, row, other.to_string())),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // "2024-03-01T00:00:00.000" or "2024-03-01 00:00:00"
    let (date_part, rest) = (s.get(..10)?, s.get(10..)?);
    if rest.starts_with('T') || rest.starts_with(' ') {
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn full_record() -> RawRecord {
        record(json!({
            "DT_NEGOCIO": "2024-03-01",
            "CD_SETOR": "BANK",
            "CD_SUBSETOR": null,
            "CD_SEGMENTO": "NM",
            "CONTA": "GENIAL",
            "VL_COMPRA": 3_000_000.0,
            "VL_VENDA": 1_000_000.0,
            "VL_NET": 2_000_000.0,
            "VL_TOTAL": 4_000_000.0,
            "UNUSED": "ignored"
        }))
    }

    #[test]
    fn test_map_full_record() {
        let mapper = RecordMapper::default();
        let row = mapper.map_record(0, &full_record()).unwrap();

        assert_eq!(row.trade_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(row.sector.as_deref(), Some("BANK"));
        assert_eq!(row.sub_sector, None);
        assert_eq!(row.account.as_deref(), Some("GENIAL"));
        assert_eq!(row.net_amount, Some(2_000_000.0));
        assert_eq!(row.total_amount, Some(4_000_000.0));
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let mapper = RecordMapper::default();
        let mut rec = full_record();
        rec.remove("VL_NET");

        let err = mapper.map_records(&[full_record(), rec]).unwrap_err();
        match err {
            Error::SchemaMismatch { field, row } => {
                assert_eq!(field, "VL_NET");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_column_names() {
        let columns = ColumnMapping {
            account: "TIPO".to_string(),
            ..ColumnMapping::default()
        };
        let mapper = RecordMapper::new(columns);
        let mut rec = full_record();
        let account = rec.remove("CONTA").unwrap();
        rec.insert("TIPO".to_string(), account);

        let row = mapper.map_record(0, &rec).unwrap();
        assert_eq!(row.account.as_deref(), Some("GENIAL"));
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date("2024-03-01"), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(
            parse_date("2024-03-01T00:00:00.000"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parse_date("2024-03-01 13:45:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date("01/03/2024"), None);

        // 2024-03-01T00:00:00Z
        let date = date_field("DT_NEGOCIO", 0, &json!(1_709_251_200_000_i64)).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_numeric_codes_and_strings() {
        assert_eq!(text_field("CD_SETOR", 0, &json!(12)).unwrap().as_deref(), Some("12"));
        assert_eq!(text_field("CD_SETOR", 0, &json!(null)).unwrap(), None);
        assert_eq!(amount_field("VL_NET", 0, &json!("-1500.5")).unwrap(), Some(-1500.5));
        assert!(matches!(
            amount_field("VL_NET", 3, &json!("abc")),
            Err(Error::InvalidValue { row: 3, .. })
        ));
        assert!(text_field("CONTA", 0, &json!(true)).is_err());
    }

    #[test]
    fn test_text_cells_are_not_rewritten() {
        assert_eq!(
            text_field("CONTA", 0, &json!("GENIAL ")).unwrap().as_deref(),
            Some("GENIAL ")
        );
        assert_eq!(text_field("CD_SETOR", 0, &json!(" BANK")).unwrap().as_deref(), Some(" BANK"));
        assert_eq!(text_field("CD_SETOR", 0, &json!("  ")).unwrap().as_deref(), Some("  "));
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        for bad in ["NaN", "inf", "-infinity"] {
            assert!(matches!(
                amount_field("VL_NET", 2, &json!(bad)),
                Err(Error::InvalidValue { row: 2, .. })
            ));
        }

        let mut rec = full_record();
        rec.insert("VL_NET".to_string(), json!("NaN"));
        let err = RecordMapper::default().map_records(&[full_record(), rec]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref field, row: 1, .. } if field == "VL_NET"));
    }
}

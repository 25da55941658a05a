//! Loading a normalized CSV ledger.
//!
//! Expected header: `date,ticker,volume,price,price_inc_brokerage,brokerage`.
//! Disposals carry a negative volume. Dates are `YYYY-MM-DD` or `DD/MM/YYYY`.

use super::{LedgerSource, LedgerSourceError};
use crate::domain::{Decimal, Ticker, TradeDate, Transaction};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CsvLedgerSource {
    path: PathBuf,
}

impl CsvLedgerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_csv(csv_bytes: &[u8]) -> Result<Vec<Transaction>, LedgerSourceError> {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            date: String,
            ticker: String,
            volume: String,
            price: String,
            #[serde(default)]
            price_inc_brokerage: Option<String>,
            #[serde(default)]
            brokerage: Option<String>,
        }

        fn non_blank(field: Option<String>) -> Option<String> {
            field.filter(|s| !s.trim().is_empty())
        }

        fn decimal(line: u64, name: &str, raw: &str) -> Result<Decimal, LedgerSourceError> {
            Decimal::from_str_canonical(raw).map_err(|e| LedgerSourceError::InvalidRow {
                line,
                reason: format!("invalid {}: {}", name, e),
            })
        }

        // csv positions a record where the previous one ended, ahead of any
        // blank lines it skips.
        fn start_line(csv_bytes: &[u8], position: &csv::Position) -> u64 {
            let offset = usize::try_from(position.byte()).unwrap_or(csv_bytes.len());
            let skipped = csv_bytes
                .get(offset..)
                .unwrap_or_default()
                .iter()
                .copied()
                .take_while(|&b| b == b'\n' || b == b'\r')
                .filter(|&b| b == b'\n')
                .count();
            position.line() + skipped as u64
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let headers = reader
            .headers()
            .map_err(|e| LedgerSourceError::Csv(e.to_string()))?
            .clone();

        let mut transactions = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| LedgerSourceError::Csv(e.to_string()))?;
            let line = record
                .position()
                .map(|p| start_line(csv_bytes, p))
                .unwrap_or_default();
            let row: Row = record
                .deserialize(Some(&headers))
                .map_err(|e| LedgerSourceError::InvalidRow {
                    line,
                    reason: e.to_string(),
                })?;

            let date = TradeDate::parse(&row.date).map_err(|e| LedgerSourceError::InvalidRow {
                line,
                reason: format!("invalid date {:?}: {}", row.date, e),
            })?;
            if row.ticker.is_empty() {
                return Err(LedgerSourceError::InvalidRow {
                    line,
                    reason: "missing ticker".to_string(),
                });
            }
            let volume = decimal(line, "volume", &row.volume)?;
            let price = decimal(line, "price", &row.price)?;
            let price_inc_brokerage = match non_blank(row.price_inc_brokerage) {
                Some(raw) => decimal(line, "price_inc_brokerage", &raw)?,
                None => price,
            };
            let brokerage = match non_blank(row.brokerage) {
                Some(raw) => decimal(line, "brokerage", &raw)?,
                None => price
                    .checked_sub(price_inc_brokerage)
                    .and_then(|spread| volume.checked_mul(spread))
                    .map(|total| total.abs().round_cents())
                    .ok_or_else(|| LedgerSourceError::InvalidRow {
                        line,
                        reason: "derived brokerage out of range".to_string(),
                    })?,
            };

            let tx = Transaction::new(
                date,
                Ticker::new(row.ticker),
                volume,
                price,
                price_inc_brokerage,
                brokerage,
            );
            tx.validate().map_err(|e| LedgerSourceError::InvalidRow {
                line,
                reason: e.to_string(),
            })?;
            transactions.push(tx);
        }

        Ok(transactions)
    }
}

#[async_trait]
impl LedgerSource for CsvLedgerSource {
    async fn load_transactions(&self) -> Result<Vec<Transaction>, LedgerSourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LedgerSourceError::Io(format!("{}: {}", self.path.display(), e)))?;
        Self::parse_csv(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "date,ticker,volume,price,price_inc_brokerage,brokerage\n";

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_parses_both_date_formats() {
        let csv = format!(
            "{}2021-01-04,VAS,100,90,90.1,10\n15/02/2021,VAS,-40,95,94.75,10\n",
            HEADER
        );
        let txs = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].date, TradeDate::from_ymd(2021, 1, 4).unwrap());
        assert_eq!(txs[1].date, TradeDate::from_ymd(2021, 2, 15).unwrap());
        assert!(txs[0].is_acquisition());
        assert!(!txs[1].is_acquisition());
        assert_eq!(txs[1].volume(), d("40"));
        assert_eq!(txs[1].unit_price_with_costs, d("94.75"));
    }

    #[test]
    fn test_blank_price_inc_defaults_to_price() {
        let csv = format!("{}2021-03-01,VAS,1.5,91.2,,\n", HEADER);
        let txs = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(txs[0].unit_price_with_costs, d("91.2"));
        assert!(txs[0].brokerage.is_zero());
        assert_eq!(txs[0].volume(), d("1.5"));
    }

    #[test]
    fn test_blank_brokerage_is_derived() {
        let csv = format!(
            "{}2021-01-04,CBA,100,10,10.1,\n2021-06-01,CBA,-50,12,11.8,\n",
            HEADER
        );
        let txs = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(txs[0].brokerage, d("10"));
        assert_eq!(txs[1].brokerage, d("10"));
    }

    #[test]
    fn test_missing_trailing_columns() {
        let csv = format!("{}2021-01-04,CBA,100,10\n", HEADER);
        let txs = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].unit_price_with_costs, d("10"));
    }

    #[test]
    fn test_zero_volume_rejected_with_line() {
        let csv = format!("{}2021-01-04,CBA,100,10,10,0\n2021-01-05,CBA,0,10,10,0\n", HEADER);
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            LedgerSourceError::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("zero volume"));
            }
            other => panic!("Expected InvalidRow, got {:?}", other),
        }
    }

    #[test]
    fn test_row_line_counts_blank_lines() {
        let csv = format!(
            "{}2021-01-04,CBA,100,10,10,0\n\n\n2021-01-05,CBA,0,10,10,0\n",
            HEADER
        );
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            LedgerSourceError::InvalidRow { line, reason } => {
                assert_eq!(line, 5);
                assert!(reason.contains("zero volume"));
            }
            other => panic!("Expected InvalidRow, got {:?}", other),
        }
    }

    #[test]
    fn test_row_line_after_multiline_quoted_field() {
        let csv = format!(
            "{}2021-01-04,\"CBA\nLTD\",100,10,10,0\n2021-01-05,CBA,10,-1,,\n",
            HEADER
        );
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerSourceError::InvalidRow { line: 4, .. }));
    }

    #[test]
    fn test_out_of_range_amounts_rejected() {
        let csv = format!(
            "{}2021-01-04,CBA,10000000000000000000000000000,100,200,\n",
            HEADER
        );
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerSourceError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_negative_brokerage_rejected() {
        let csv = format!("{}2021-01-04,CBA,100,10,10,-1\n", HEADER);
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerSourceError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let csv = format!("{}2021/13/45,CBA,100,10,10,0\n", HEADER);
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerSourceError::InvalidRow { line: 2, .. }));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let csv = format!("{}2021-01-04,CBA,lots,10,10,0\n", HEADER);
        let err = CsvLedgerSource::parse_csv(csv.as_bytes()).unwrap_err();
        match err {
            LedgerSourceError::InvalidRow { reason, .. } => assert!(reason.contains("volume")),
            other => panic!("Expected InvalidRow, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}2021-01-04,VAS,100,90,90.1,10\n", HEADER).unwrap();

        let source = CsvLedgerSource::new(file.path());
        let txs = source.load_transactions().await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].ticker.as_str(), "VAS");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvLedgerSource::new(dir.path().join("absent.csv"));
        let err = source.load_transactions().await.unwrap_err();
        assert!(matches!(err, LedgerSourceError::Io(_)));
    }
}

//! CSV table exporter.
//!
//! Plain RFC 4180 output: header row, one record per line, fields
//! quoted only when they contain a comma, quote or newline.

use crate::domain::subscription::{Account, Payment};
use crate::ports::TableExporter;

/// Renders the export tables as CSV documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableExporter;

impl CsvTableExporter {
    pub fn new() -> Self {
        Self
    }
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record(out: &mut String, fields: &[String]) {
    let escaped: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&escaped.join(","));
    out.push('\n');
}

impl TableExporter for CsvTableExporter {
    fn accounts_table(&self, accounts: &[Account]) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(
            "id,full_name,handle,phone,status,expiry_date,warned_3,warned_1,approved_payments,created_at\n",
        );
        for account in accounts {
            write_record(
                &mut out,
                &[
                    account.id.to_string(),
                    account.full_name.clone(),
                    account.handle.clone().unwrap_or_default(),
                    account.phone.clone().unwrap_or_default(),
                    account.status.to_string(),
                    account
                        .expiry_date
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                    (account.warned_3 as u8).to_string(),
                    (account.warned_1 as u8).to_string(),
                    account.total_approved_payments.to_string(),
                    account.created_at.to_rfc3339(),
                ],
            );
        }
        out.into_bytes()
    }

    fn payments_table(&self, payments: &[Payment]) -> Vec<u8> {
        let mut out = String::new();
        out.push_str("id,account_id,amount,status,submitted_at,evidence_ref\n");
        for payment in payments {
            write_record(
                &mut out,
                &[
                    payment.id.to_string(),
                    payment.account_id.to_string(),
                    payment.amount.to_string(),
                    payment.review_status.to_string(),
                    payment.submitted_at.to_rfc3339(),
                    payment.evidence_ref.clone(),
                ],
            );
        }
        out.into_bytes()
    }

    fn file_extension(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AccountId, PaymentId};
    use chrono::Utc;

    #[test]
    fn escapes_commas_and_quotes() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn accounts_table_has_header_and_rows() {
        let account = Account::register(AccountId::new(7), "Ali Valiyev", None, Utc::now());
        let bytes = CsvTableExporter::new().accounts_table(&[account]);
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,full_name"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("7,Ali Valiyev"));
        assert!(row.contains("inactive"));
    }

    #[test]
    fn payments_table_renders_status() {
        let payment = Payment::submit(
            PaymentId::new(3),
            AccountId::new(7),
            30_000,
            "file-xyz".to_string(),
            Utc::now(),
        );
        let bytes = CsvTableExporter::new().payments_table(&[payment]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("3,7,30000,pending"));
        assert!(text.ends_with("file-xyz\n"));
    }

    #[test]
    fn quoted_name_survives_round_trip_shape() {
        let mut account = Account::register(AccountId::new(1), "Last, First", None, Utc::now());
        account.full_name = "Last, First".to_string();
        let bytes = CsvTableExporter::new().accounts_table(&[account]);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"Last, First\""));
    }
}

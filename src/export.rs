//! Tabular export of payroll lines.
//!
//! [`export_rows`] flattens lines into spreadsheet-shaped rows with raw
//! numbers. [`ExportRow::formatted`] renders the same row for display with
//! grouped thousands. Writing the rows to a file is left to the caller.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PayType, PayrollLine};

/// One export row, numbers unformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    /// Worker display name.
    pub name: String,
    /// Role.
    pub role: String,
    /// Worked days.
    pub total_days: u32,
    /// Worked hours.
    pub total_hours: Decimal,
    /// Pay type.
    pub pay_type: PayType,
    /// Rate.
    pub base_rate: Decimal,
    /// Pay from the rate alone.
    pub base_pay: Decimal,
    /// Meal allowance.
    pub meal: Decimal,
    /// Transportation allowance.
    pub transportation: Decimal,
    /// Accommodation allowance.
    pub accommodation: Decimal,
    /// Bonus.
    pub bonus: Decimal,
    /// Other allowance.
    pub other: Decimal,
    /// Sum of the allowances.
    pub allowance_total: Decimal,
    /// Base pay plus allowances.
    pub grand_total: Decimal,
}

/// An [`ExportRow`] rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedExportRow {
    /// Worker display name.
    pub name: String,
    /// Role.
    pub role: String,
    /// Worked days.
    pub total_days: String,
    /// Worked hours, two decimal places.
    pub total_hours: String,
    /// Pay type.
    pub pay_type: String,
    /// Rate.
    pub base_rate: String,
    /// Pay from the rate alone.
    pub base_pay: String,
    /// Meal allowance.
    pub meal: String,
    /// Transportation allowance.
    pub transportation: String,
    /// Accommodation allowance.
    pub accommodation: String,
    /// Bonus.
    pub bonus: String,
    /// Other allowance.
    pub other: String,
    /// Sum of the allowances.
    pub allowance_total: String,
    /// Base pay plus allowances.
    pub grand_total: String,
}

/// Column headers in row order.
pub const EXPORT_COLUMNS: [&str; 14] = [
    "name",
    "role",
    "totalDays",
    "totalHours",
    "payType",
    "baseRate",
    "basePay",
    "meal",
    "transportation",
    "accommodation",
    "bonus",
    "other",
    "allowanceTotal",
    "grandTotal",
];

impl From<&PayrollLine> for ExportRow {
    fn from(line: &PayrollLine) -> Self {
        Self {
            name: line.worker_name.clone(),
            role: line.role.clone(),
            total_days: line.total_days,
            total_hours: line.total_hours,
            pay_type: line.pay_type,
            base_rate: line.base_rate,
            base_pay: line.base_pay,
            meal: line.allowances.meal,
            transportation: line.allowances.transportation,
            accommodation: line.allowances.accommodation,
            bonus: line.allowances.bonus,
            other: line.allowances.other,
            allowance_total: line.allowance_total,
            grand_total: line.grand_total,
        }
    }
}

impl ExportRow {
    /// Renders the row for display.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::export::ExportRow;
    /// use payroll_engine::models::PayType;
    /// use rust_decimal::Decimal;
    ///
    /// let row = ExportRow {
    ///     name: "Kim".to_string(),
    ///     role: "dealer".to_string(),
    ///     total_days: 2,
    ///     total_hours: Decimal::new(1600, 2),
    ///     pay_type: PayType::Hourly,
    ///     base_rate: Decimal::from(18000),
    ///     base_pay: Decimal::from(288000),
    ///     meal: Decimal::from(9000),
    ///     transportation: Decimal::ZERO,
    ///     accommodation: Decimal::ZERO,
    ///     bonus: Decimal::ZERO,
    ///     other: Decimal::ZERO,
    ///     allowance_total: Decimal::from(9000),
    ///     grand_total: Decimal::from(297000),
    /// };
    ///
    /// let formatted = row.formatted();
    /// assert_eq!(formatted.total_hours, "16.00");
    /// assert_eq!(formatted.grand_total, "297,000");
    /// ```
    pub fn formatted(&self) -> FormattedExportRow {
        FormattedExportRow {
            name: self.name.clone(),
            role: self.role.clone(),
            total_days: self.total_days.to_string(),
            total_hours: format!("{:.2}", self.total_hours),
            pay_type: self.pay_type.to_string(),
            base_rate: group_thousands(self.base_rate),
            base_pay: group_thousands(self.base_pay),
            meal: group_thousands(self.meal),
            transportation: group_thousands(self.transportation),
            accommodation: group_thousands(self.accommodation),
            bonus: group_thousands(self.bonus),
            other: group_thousands(self.other),
            allowance_total: group_thousands(self.allowance_total),
            grand_total: group_thousands(self.grand_total),
        }
    }
}

/// Flattens payroll lines into export rows, preserving order.
pub fn export_rows(lines: &[PayrollLine]) -> Vec<ExportRow> {
    lines.iter().map(ExportRow::from).collect()
}

/// Formats an amount with comma-grouped thousands, dropping trailing zeros.
fn group_thousands(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AllowanceSet;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line() -> PayrollLine {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        PayrollLine {
            worker_id: "A".to_string(),
            worker_name: "Kim".to_string(),
            role: "dealer".to_string(),
            total_hours: dec("16.00"),
            total_days: 2,
            pay_type: PayType::Hourly,
            base_rate: dec("18000"),
            allowances: AllowanceSet {
                meal: dec("9000"),
                transportation: dec("5000"),
                ..AllowanceSet::default()
            },
            base_pay: dec("288000"),
            allowance_total: dec("14000"),
            grand_total: dec("302000"),
            period_start: date,
            period_end: date,
            record_ids: vec!["r1".to_string()],
            rate_source: "role_policy".to_string(),
        }
    }

    #[test]
    fn test_export_rows_copy_line_values() {
        let rows = export_rows(&[line()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Kim");
        assert_eq!(rows[0].meal, dec("9000"));
        assert_eq!(rows[0].grand_total, dec("302000"));
    }

    #[test]
    fn test_export_row_serializes_column_names() {
        let value = serde_json::to_value(ExportRow::from(&line())).unwrap();
        let object = value.as_object().unwrap();
        for column in EXPORT_COLUMNS {
            assert!(object.contains_key(column), "missing column {}", column);
        }
        assert_eq!(object.len(), EXPORT_COLUMNS.len());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(dec("0")), "0");
        assert_eq!(group_thousands(dec("999")), "999");
        assert_eq!(group_thousands(dec("1000")), "1,000");
        assert_eq!(group_thousands(dec("1234567.50")), "1,234,567.5");
        assert_eq!(group_thousands(dec("-288000")), "-288,000");
    }

    #[test]
    fn test_formatted_row() {
        let formatted = ExportRow::from(&line()).formatted();
        assert_eq!(formatted.total_days, "2");
        assert_eq!(formatted.pay_type, "hourly");
        assert_eq!(formatted.base_pay, "288,000");
        assert_eq!(formatted.accommodation, "0");
    }
}

//! Tabular exports of a projection.
//!
//! Both the delimited-text and workbook writers consume the same [`Table`]
//! values, so column order and raw numeric values stay identical across
//! formats.

mod delimited;
mod workbook;

use thiserror::Error;

use crate::core::{MonthRow, PlanParameters, StepType, YearRow};

pub use delimited::{table_to_csv, write_table_csv};
pub use workbook::{build_workbook, save_workbook, workbook_bytes};

pub const YEARLY_CSV_FILENAME: &str = "stepup_sip_yearly.csv";
pub const MONTHLY_CSV_FILENAME: &str = "stepup_sip_monthly.csv";
pub const WORKBOOK_FILENAME: &str = "stepup_sip_calculator.xlsx";

pub const SUMMARY_SHEET: &str = "Summary";
pub const MONTHLY_SHEET: &str = "Monthly";

pub const YEARLY_HEADERS: [&str; 8] = [
    "Year",
    "Start Balance",
    "Contribution",
    "End Balance (Nominal)",
    "Return Earned",
    "Start Contribution",
    "End Contribution",
    "End Balance (Real)",
];

pub const MONTHLY_HEADERS: [&str; 9] = [
    "Month#",
    "Year",
    "Month Label",
    "Contribution",
    "Start Balance",
    "Interest",
    "End Balance (Nominal)",
    "Inflation Index",
    "End Balance (Real)",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn yearly_table(yearly: &[YearRow]) -> Table {
    let rows = yearly
        .iter()
        .map(|y| {
            vec![
                Cell::Number(y.year as f64),
                Cell::Number(y.start_balance),
                Cell::Number(y.contribution),
                Cell::Number(y.end_balance),
                Cell::Number(y.return_earned),
                Cell::Number(y.start_contribution),
                Cell::Number(y.end_contribution),
                Cell::Number(y.end_balance_real),
            ]
        })
        .collect();

    Table {
        headers: YEARLY_HEADERS.to_vec(),
        rows,
    }
}

pub fn monthly_table(schedule: &[MonthRow]) -> Table {
    let rows = schedule
        .iter()
        .map(|r| {
            vec![
                Cell::Number(r.month as f64),
                Cell::Number(r.year as f64),
                Cell::text(r.month_label),
                Cell::Number(r.contribution),
                Cell::Number(r.start_balance),
                Cell::Number(r.interest),
                Cell::Number(r.end_balance),
                Cell::Number(r.inflation_index),
                Cell::Number(r.end_balance_real),
            ]
        })
        .collect();

    Table {
        headers: MONTHLY_HEADERS.to_vec(),
        rows,
    }
}

/// Label/value pairs describing the plan, written above the yearly table.
pub fn parameter_rows(params: &PlanParameters) -> Vec<(&'static str, Cell)> {
    let step_label = match params.step_type {
        StepType::Percent => "Step-up %",
        StepType::Fixed => "Fixed Step-up Amount",
    };

    vec![
        (
            "Start Monthly Contribution",
            Cell::Number(params.start_contribution),
        ),
        (step_label, Cell::Number(params.step_value)),
        (
            "Step-up Interval (months)",
            Cell::Number(params.step_interval_months as f64),
        ),
        ("Annual Return %", Cell::Number(params.annual_return_pct)),
        (
            "Annual Inflation %",
            Cell::Number(params.annual_inflation_pct),
        ),
        ("Contribution Timing", Cell::text(params.timing.label())),
        ("Years", Cell::Number(params.years as f64)),
    ]
}

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use super::{
    Cell, MONTHLY_SHEET, Result, SUMMARY_SHEET, Table, monthly_table, parameter_rows, yearly_table,
};
use crate::core::{PlanParameters, Projection};

/// Builds the two-sheet workbook: `Summary` holds the plan parameters, a
/// blank row, then the yearly table; `Monthly` holds the monthly table.
pub fn build_workbook(params: &PlanParameters, projection: &Projection) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    summary.write_string(0, 0, "Parameter")?;
    summary.write_string(0, 1, "Value")?;
    let mut row = 1;
    for (label, value) in parameter_rows(params) {
        summary.write_string(row, 0, label)?;
        write_cell(summary, row, 1, &value)?;
        row += 1;
    }
    write_table(summary, row + 1, &yearly_table(&projection.yearly))?;

    let monthly = workbook.add_worksheet();
    monthly.set_name(MONTHLY_SHEET)?;
    write_table(monthly, 0, &monthly_table(&projection.schedule))?;

    Ok(workbook)
}

pub fn workbook_bytes(params: &PlanParameters, projection: &Projection) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(params, projection)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn save_workbook(params: &PlanParameters, projection: &Projection, path: &Path) -> Result<()> {
    let mut workbook = build_workbook(params, projection)?;
    workbook.save(path)?;
    Ok(())
}

fn write_table(sheet: &mut Worksheet, first_row: u32, table: &Table) -> Result<()> {
    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(first_row, col as u16, *header)?;
    }
    for (offset, cells) in table.rows.iter().enumerate() {
        let row = first_row + 1 + offset as u32;
        for (col, cell) in cells.iter().enumerate() {
            write_cell(sheet, row, col as u16, cell)?;
        }
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Number(value) => {
            sheet.write_number(row, col, *value)?;
        }
        Cell::Text(text) => {
            sheet.write_string(row, col, text.as_str())?;
        }
    }
    Ok(())
}

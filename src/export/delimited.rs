use std::path::Path;

use csv::{Terminator, Writer, WriterBuilder};

use super::{Cell, Result, Table};

/// Renders a table as comma-separated text, header first, one `\n` per row.
pub fn table_to_csv(table: &Table) -> Result<String> {
    let mut wtr = builder().from_writer(Vec::new());
    write_records(&mut wtr, table)?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn write_table_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr = builder().from_path(path)?;
    write_records(&mut wtr, table)?;
    wtr.flush()?;
    Ok(())
}

fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.terminator(Terminator::Any(b'\n'));
    builder
}

fn write_records<W: std::io::Write>(wtr: &mut Writer<W>, table: &Table) -> Result<()> {
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(cell_field))?;
    }
    Ok(())
}

fn cell_field(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => value.to_string(),
        Cell::Text(text) => text.clone(),
    }
}

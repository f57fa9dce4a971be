use crate::cell::Cell;
use crate::table::Table;
use std::error::Error;

/// Convert the record table to CSV
///
/// The output starts with a UTF-8 byte order mark so that spreadsheet
/// programs pick the right encoding for the Chinese headers. Missing values
/// become empty fields.
///
/// # Arguments
/// * `table` - Table to export, header taken from its columns
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - CSV bytes or an error
pub fn to_csv(table: &Table) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut buffer = "\u{feff}".as_bytes().to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(Cell::to_wire))?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// Convert the record table to XLSX
///
/// Numeric cells are written as numbers, text as strings; missing values
/// leave the cell blank.
///
/// # Arguments
/// * `table` - Table to export
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, Box<dyn Error>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (c, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, name, &header_format)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Cell::Number(n) => {
                    worksheet.write_number(r, c as u16, *n)?;
                }
                Cell::Text(s) if !s.is_empty() => {
                    worksheet.write_string(r, c as u16, s)?;
                }
                _ => {}
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::COLUMNS;

    fn sample() -> Table {
        let mut row = vec![Cell::default(); COLUMNS.len()];
        row[0] = Cell::Number(1.0);
        row[1] = Cell::text("张三, 李四");
        row[5] = Cell::Number(200.0);
        row[10] = Cell::Missing;
        Table::from_rows(vec![row])
    }

    #[test]
    fn csv_has_bom_header_and_quoted_fields() {
        let bytes = to_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with('\u{feff}'));

        let mut lines = text.trim_start_matches('\u{feff}').lines();
        assert_eq!(lines.next().unwrap(), COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "1,\"张三, 李四\",,,,200,,,,,,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn xlsx_is_a_zip_archive() {
        let bytes = to_xlsx(&sample()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}

//! Tabular exports: per-entity CSV and a complete three-sheet XLSX workbook.
//! Headers come from the static column lists in `models`, so an empty table
//! still exports its header row. Whole tables are serialized in memory; there
//! is no pagination.

use std::io::Write;

use serde_json::Value;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::AppError;

/// One worksheet of the complete export.
pub struct Sheet<'a> {
    pub name: &'a str,
    pub columns: &'a [&'a str],
    pub rows: &'a [Value],
}

/// Serialize rows to RFC 4180 CSV with upper-cased column headers.
pub fn to_csv(columns: &[&str], rows: &[Value]) -> String {
    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| csv_escape(&cell_text(row.get(*c))))
            .collect();
        out.push_str(&cells.join(","));
        out.push_str("\r\n");
    }
    out
}

fn cell_text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Build an XLSX workbook, one sheet per table. XLSX is a ZIP container of
/// sheet XML, so the archive writer does the heavy lifting.
pub fn build_workbook(sheets: &[Sheet<'_>]) -> Result<Vec<u8>, AppError> {
    let mut zw = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    for i in 1..=sheets.len() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    content_types.push_str("</Types>");

    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            xml_escape(sheet.name)
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let package_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    let write = |zw: &mut ZipWriter<std::io::Cursor<Vec<u8>>>,
                 name: &str,
                 body: &str|
     -> Result<(), AppError> {
        zw.start_file(name, opts)
            .map_err(|e| AppError::Export(e.to_string()))?;
        zw.write_all(body.as_bytes())
            .map_err(|e| AppError::Export(e.to_string()))?;
        Ok(())
    };

    write(&mut zw, "[Content_Types].xml", &content_types)?;
    write(&mut zw, "_rels/.rels", package_rels)?;
    write(&mut zw, "xl/workbook.xml", &workbook)?;
    write(&mut zw, "xl/_rels/workbook.xml.rels", &workbook_rels)?;
    for (i, sheet) in sheets.iter().enumerate() {
        let name = format!("xl/worksheets/sheet{}.xml", i + 1);
        write(&mut zw, &name, &sheet_xml(sheet))?;
    }

    let cursor = zw.finish().map_err(|e| AppError::Export(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn sheet_xml(sheet: &Sheet<'_>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    xml.push_str(r#"<row r="1">"#);
    for (c, column) in sheet.columns.iter().enumerate() {
        xml.push_str(&inline_str_cell(c, 1, &column.to_uppercase()));
    }
    xml.push_str("</row>");
    for (r, row) in sheet.rows.iter().enumerate() {
        let row_num = r + 2;
        xml.push_str(&format!(r#"<row r="{row_num}">"#));
        for (c, column) in sheet.columns.iter().enumerate() {
            match row.get(*column) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => {
                    xml.push_str(&format!(
                        r#"<c r="{}{row_num}"><v>{n}</v></c>"#,
                        col_ref(c)
                    ));
                }
                Some(Value::String(s)) => xml.push_str(&inline_str_cell(c, row_num, s)),
                Some(other) => xml.push_str(&inline_str_cell(c, row_num, &other.to_string())),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn inline_str_cell(col: usize, row: usize, text: &str) -> String {
    format!(
        r#"<c r="{}{row}" t="inlineStr"><is><t>{}</t></is></c>"#,
        col_ref(col),
        xml_escape(text)
    )
}

/// Zero-based column index to spreadsheet letters (0 = A, 26 = AA).
fn col_ref(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.into_iter().rev().collect()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let rows = vec![
            json!({"id": 1, "name": "Edificio A", "description": null}),
            json!({"id": 2, "name": "Torre Sur", "description": "fase 2"}),
        ];
        let csv = to_csv(&["id", "name", "description"], &rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,NAME,DESCRIPTION");
        assert_eq!(lines[1], "1,Edificio A,");
        assert_eq!(lines[2], "2,Torre Sur,fase 2");
    }

    #[test]
    fn csv_of_empty_table_is_header_only() {
        let csv = to_csv(&["id", "name"], &[]);
        assert_eq!(csv, "ID,NAME\r\n");
    }

    #[test]
    fn csv_quotes_commas_and_doubles_quotes() {
        let rows = vec![json!({"observaciones": "grieta activa, revisar \"ya\""})];
        let csv = to_csv(&["observaciones"], &rows);
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "\"grieta activa, revisar \"\"ya\"\"\""
        );
    }

    #[test]
    fn column_refs_roll_over_at_z() {
        assert_eq!(col_ref(0), "A");
        assert_eq!(col_ref(25), "Z");
        assert_eq!(col_ref(26), "AA");
        assert_eq!(col_ref(33), "AH");
    }

    #[test]
    fn workbook_contains_one_worksheet_per_sheet() {
        let projects = vec![json!({"id": 1, "name": "Edificio A"})];
        let sheets = [
            Sheet { name: "Proyectos", columns: &["id", "name"], rows: &projects },
            Sheet { name: "Grietas", columns: &["id"], rows: &[] },
            Sheet { name: "Registros", columns: &["id"], rows: &[] },
        ];
        let bytes = build_workbook(&sheets).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
            "xl/worksheets/sheet3.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing entry {}", name);
        }

        let mut sheet1 = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("xl/worksheets/sheet1.xml").unwrap(), &mut sheet1)
            .unwrap();
        assert!(sheet1.contains("<t>NAME</t>"));
        assert!(sheet1.contains("<t>Edificio A</t>"));
        assert!(sheet1.contains("<v>1</v>"));
    }

    #[test]
    fn sheet_names_are_xml_escaped() {
        let sheets = [Sheet { name: "A & B", columns: &["id"], rows: &[] }];
        let bytes = build_workbook(&sheets).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut workbook = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("xl/workbook.xml").unwrap(), &mut workbook)
            .unwrap();
        assert!(workbook.contains("A &amp; B"));
    }
}

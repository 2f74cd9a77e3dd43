// src/test_support.rs
//
// Fixtures shared by the unit tests: a minimal .xlsx writer, the retail
// sample in both formats, a canned fetcher and a recording observer.

use crate::cache::CACHE_LAYOUT;
use crate::dataset::{Dataset, REQUIRED_COLUMNS};
use crate::fetch::Fetch;
use crate::observe::LoadObserver;
use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::rc::Rc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;
use zip::write::FileOptions;
use zip::CompressionMethod;

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,retail_data=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// A worksheet cell for [`workbook`].
#[derive(Debug, Clone, PartialEq)]
pub enum XlsxCell {
    Text(String),
    Number(f64),
    /// Serial date rendered with a built-in date/time number format.
    Date(f64),
    Empty,
}

impl XlsxCell {
    pub fn text(s: &str) -> Self {
        XlsxCell::Text(s.to_string())
    }
}

fn column_letters(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Build a single-sheet `.xlsx` workbook in memory. Text goes through the
/// shared strings table; `Date` cells use style 1 (number format 22,
/// `m/d/yy h:mm`).
pub fn workbook(sheet: &str, rows: &[Vec<XlsxCell>]) -> Vec<u8> {
    build_workbook(sheet, rows, false)
}

/// Like [`workbook`], flagged to count serial dates from 1904-01-01.
pub fn workbook_1904(sheet: &str, rows: &[Vec<XlsxCell>]) -> Vec<u8> {
    build_workbook(sheet, rows, true)
}

fn build_workbook(sheet: &str, rows: &[Vec<XlsxCell>], date1904: bool) -> Vec<u8> {
    let mut shared: Vec<String> = Vec::new();
    let mut sheet_rows = String::new();
    let mut width = 1;

    for (r, row) in rows.iter().enumerate() {
        width = width.max(row.len());
        sheet_rows.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let cell_ref = format!("{}{}", column_letters(c), r + 1);
            match cell {
                XlsxCell::Text(s) => {
                    let idx = match shared.iter().position(|x| x == s) {
                        Some(i) => i,
                        None => {
                            shared.push(s.clone());
                            shared.len() - 1
                        }
                    };
                    sheet_rows.push_str(&format!(r#"<c r="{cell_ref}" t="s"><v>{idx}</v></c>"#));
                }
                XlsxCell::Number(n) => {
                    sheet_rows.push_str(&format!(r#"<c r="{cell_ref}"><v>{n}</v></c>"#));
                }
                XlsxCell::Date(n) => {
                    sheet_rows.push_str(&format!(r#"<c r="{cell_ref}" s="1"><v>{n}</v></c>"#));
                }
                XlsxCell::Empty => {}
            }
        }
        sheet_rows.push_str("</row>");
    }

    let dimension = if rows.is_empty() {
        "A1".to_string()
    } else {
        format!("A1:{}{}", column_letters(width - 1), rows.len())
    };
    let sheet_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="{dimension}"/><sheetData>{sheet_rows}</sheetData></worksheet>"#
    );

    let shared_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{n}" uniqueCount="{n}">{items}</sst>"#,
        n = shared.len(),
        items = shared
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", escape(s)))
            .collect::<String>()
    );

    let workbook_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        if date1904 { r#"<workbookPr date1904="1"/>"# } else { "" },
        escape(sheet)
    );

    let files: [(&str, String); 7] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                .to_string(),
        ),
        ("xl/workbook.xml", workbook_xml),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#
                .to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet_xml),
        ("xl/sharedStrings.xml", shared_xml),
        (
            "xl/styles.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font/></fonts><fills count="1"><fill/></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf numFmtId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" xfId="0"/><xf numFmtId="22" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#
                .to_string(),
        ),
    ];

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in files {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

/// Three line items of the 2009-2010 sheet, including a cancellation
/// (`C` invoice) without a customer.
pub fn retail_workbook(sheet: &str) -> Vec<u8> {
    // 2009-12-01 07:45:00 and 10:33:00
    let morning = 40148.322916666664;
    let late = 40148.439583333333;
    let header: Vec<XlsxCell> = REQUIRED_COLUMNS.iter().map(|h| XlsxCell::text(h)).collect();
    let rows = vec![
        header,
        vec![
            XlsxCell::Number(489434.0),
            XlsxCell::Number(85048.0),
            XlsxCell::text("15CM CHRISTMAS GLASS BALL 20 LIGHTS"),
            XlsxCell::Number(12.0),
            XlsxCell::Date(morning),
            XlsxCell::Number(6.95),
            XlsxCell::Number(13085.0),
            XlsxCell::text("United Kingdom"),
        ],
        vec![
            XlsxCell::Number(489434.0),
            XlsxCell::text("79323P"),
            XlsxCell::text("PINK CHERRY LIGHTS"),
            XlsxCell::Number(12.0),
            XlsxCell::Date(morning),
            XlsxCell::Number(6.75),
            XlsxCell::Number(13085.0),
            XlsxCell::text("United Kingdom"),
        ],
        vec![
            XlsxCell::text("C489449"),
            XlsxCell::Number(22087.0),
            XlsxCell::text("PAPER BUNTING, WHITE LACE"),
            XlsxCell::Number(-12.0),
            XlsxCell::Date(late),
            XlsxCell::Number(2.95),
            XlsxCell::Empty,
            XlsxCell::text("Australia"),
        ],
    ];
    workbook(sheet, &rows)
}

/// The same three line items as a cache file.
pub fn retail_csv() -> String {
    r#",Invoice,StockCode,Description,Quantity,InvoiceDate,Price,Customer ID,Country
0,489434,85048,15CM CHRISTMAS GLASS BALL 20 LIGHTS,12,2009-12-01 07:45:00,6.95,13085,United Kingdom
1,489434,79323P,PINK CHERRY LIGHTS,12,2009-12-01 07:45:00,6.75,13085,United Kingdom
2,C489449,22087,"PAPER BUNTING, WHITE LACE",-12,2009-12-01 10:33:00,2.95,,Australia
"#
    .to_string()
}

pub fn retail_dataset() -> Dataset {
    CACHE_LAYOUT
        .decode(Cursor::new(retail_csv()), "retail.csv")
        .unwrap()
}

/// Serves canned bodies by URL and counts calls. Unknown URLs fail.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: Rc<Cell<usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Shared call counter, readable after the fetcher moved into a loader.
    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl Fetch for StaticFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        self.bodies
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("404 Not Found: {}", url))
    }
}

/// Observer that records one line per event.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl LoadObserver for Recorder {
    fn loading(&self, source: &str, sheet: &str) {
        self.events
            .borrow_mut()
            .push(format!("loading {source} [{sheet}]"));
    }

    fn loaded(&self, source: &str, sheet: &str, dataset: &Dataset) {
        self.events
            .borrow_mut()
            .push(format!("loaded {source} [{sheet}] rows={}", dataset.num_rows()));
    }

    fn cache_saved(&self, path: &Path) {
        self.events
            .borrow_mut()
            .push(format!("saved {}", path.display()));
    }
}

#[test]
fn test_column_letters() {
    assert_eq!(column_letters(0), "A");
    assert_eq!(column_letters(7), "H");
    assert_eq!(column_letters(26), "AA");
}

use crate::{
    error::Result,
    formula::is_sum_formula,
    sheet::{
        CellValue, SheetAccess,
        address::{CellRange, CellRef, col_to_name},
    },
};
use log::{debug, warn};
pub const PO_LABELS: &[&str] = &["No.", "Item Number", "Item\nNumber", "Item"];
pub const TS_LABELS: &[&str] = &["월/일", "품명", "DESCRIPTION"];
pub const INVOICE_LABELS: &[&str] = &["No.", "Description", "DESCRIPTION"];
pub const DEFAULT_LABELS: &[&str] = &["No.", "Item Number", "Item\nNumber", "품명", "Item"];
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocator {
    pub labels: &'static [&'static str],
    pub scan_rows: u32,
    pub first_col: u32,
    pub scan_cols: u32,
    pub fallback_row: u32,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch {
    pub header_row: u32,
    pub data_start_row: u32,
    pub fallback: bool,
}
impl HeaderLocator {
    pub const fn new(labels: &'static [&'static str], fallback_row: u32) -> Self {
        Self {
            labels,
            scan_rows: 30,
            first_col: 1,
            scan_cols: 9,
            fallback_row,
        }
    }
    #[must_use]
    pub const fn with_window(mut self, rows: u32, cols: u32) -> Self {
        self.scan_rows = rows;
        self.scan_cols = cols;
        self
    }
    pub fn locate(&self, sheet: &mut dyn SheetAccess) -> Result<HeaderMatch> {
        let window = CellRange::new(
            CellRef::new(self.first_col, 1),
            CellRef::new(self.first_col + self.scan_cols.max(1) - 1, self.scan_rows.max(1)),
        );
        let grid = sheet.get_range(window)?;
        for (row, cells) in (window.start.row..).zip(&grid) {
            if let Some(hit) = cells.iter().find(|v| self.matches(v)) {
                debug!(
                    "헤더 발견: {row}행 '{}' -> 데이터 시작 {}행",
                    hit.display(),
                    row + 1
                );
                return Ok(HeaderMatch {
                    header_row: row,
                    data_start_row: row + 1,
                    fallback: false,
                });
            }
        }
        let data_start_row = self.fallback_row.max(2);
        warn!(
            "헤더 라벨({})을 {window} 범위에서 찾지 못해 기본 시작행 {data_start_row}을 사용합니다.",
            self.labels.join(", ").replace('\n', " ")
        );
        Ok(HeaderMatch {
            header_row: data_start_row - 1,
            data_start_row,
            fallback: true,
        })
    }
    fn matches(&self, value: &CellValue) -> bool {
        let text = value.display();
        !text.is_empty() && self.labels.iter().any(|l| label_matches(&text, l))
    }
}
fn label_matches(text: &str, label: &str) -> bool {
    if label.is_empty() {
        return false;
    }
    // "No." inside "Invoice No." belongs to the document header block.
    if label.ends_with('.') {
        return text.trim() == label;
    }
    text.contains(label)
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsMarker {
    Label {
        column: u32,
        text: &'static str,
        window: u32,
        fallback_offset: u32,
    },
    SumFormula {
        column: u32,
        window: u32,
        fallback_offset: u32,
    },
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerMatch {
    pub row: u32,
    pub fallback: bool,
}
impl TotalsMarker {
    pub const fn column(&self) -> u32 {
        match *self {
            Self::Label { column, .. } | Self::SumFormula { column, .. } => column,
        }
    }
    const fn window(&self) -> u32 {
        match *self {
            Self::Label { window, .. } | Self::SumFormula { window, .. } => window,
        }
    }
    const fn fallback_offset(&self) -> u32 {
        match *self {
            Self::Label {
                fallback_offset, ..
            }
            | Self::SumFormula {
                fallback_offset, ..
            } => fallback_offset,
        }
    }
    fn matches(&self, value: &CellValue) -> bool {
        match *self {
            Self::Label { text, .. } => value.display().contains(text),
            Self::SumFormula { .. } => is_sum_formula(&value.display()),
        }
    }
    pub fn find(&self, sheet: &mut dyn SheetAccess, data_start_row: u32) -> Result<MarkerMatch> {
        let last = data_start_row + self.window().max(1) - 1;
        let column = self.column();
        let values = sheet.get_range(CellRange::column(column, data_start_row, last))?;
        let found = (data_start_row..)
            .zip(&values)
            .find(|(_, row)| row.first().is_some_and(|v| self.matches(v)))
            .map(|(row, _)| row);
        if let Some(row) = found {
            debug!("합계 표식 발견: {}{row}", col_to_name(column));
            return Ok(MarkerMatch {
                row,
                fallback: false,
            });
        }
        let row = data_start_row + self.fallback_offset();
        warn!(
            "{}열 {data_start_row}~{last}행에서 합계 표식을 찾지 못해 {row}행으로 가정합니다.",
            col_to_name(column)
        );
        Ok(MarkerMatch {
            row,
            fallback: true,
        })
    }
}
pub fn find_text_in_column(
    sheet: &mut dyn SheetAccess,
    column: u32,
    needle: &str,
    start_row: u32,
    end_row: u32,
) -> Result<Option<u32>> {
    if needle.is_empty() || end_row < start_row {
        return Ok(None);
    }
    let values = sheet.get_range(CellRange::column(column, start_row, end_row))?;
    Ok((start_row..)
        .zip(&values)
        .find(|(_, row)| row.first().is_some_and(|v| v.display().contains(needle)))
        .map(|(row, _)| row))
}
#[cfg(test)]
mod tests {
    use super::{
        HeaderLocator, INVOICE_LABELS, PO_LABELS, TS_LABELS, TotalsMarker, find_text_in_column,
    };
    use crate::sheet::{address::CellRef, counting::CountingSheet, memory::MemorySheet};
    #[test]
    fn first_matching_row_wins_with_one_read() {
        let sheet = MemorySheet::default()
            .with_text(CellRef::new(1, 12), "Item\nNumber")
            .with_text(CellRef::new(2, 20), "No.");
        let mut sheet = CountingSheet::new(sheet);
        let found = HeaderLocator::new(PO_LABELS, 13).locate(&mut sheet).unwrap();
        assert_eq!(found.header_row, 12);
        assert_eq!(found.data_start_row, 13);
        assert!(!found.fallback);
        assert_eq!(sheet.counts().total(), 1);
    }
    #[test]
    fn missing_label_degrades_to_fallback() {
        let mut sheet = MemorySheet::default().with_text(CellRef::new(1, 3), "Purchase Order");
        let found = HeaderLocator::new(TS_LABELS, 13).locate(&mut sheet).unwrap();
        assert!(found.fallback);
        assert_eq!(found.data_start_row, 13);
        assert_eq!(found.header_row, 12);
    }
    #[test]
    fn labels_outside_scanned_columns_are_ignored() {
        let mut sheet = MemorySheet::default().with_text(CellRef::new(5, 12), "품명");
        let found = HeaderLocator::new(TS_LABELS, 13)
            .with_window(30, 4)
            .locate(&mut sheet)
            .unwrap();
        assert!(found.fallback);
    }
    #[test]
    fn numbered_fields_in_the_document_header_are_not_column_headers() {
        let mut sheet = MemorySheet::default()
            .with_text(CellRef::new(6, 4), "Invoice No.")
            .with_text(CellRef::new(6, 15), "Customer PO No.")
            .with_text(CellRef::new(1, 17), "No.");
        let found = HeaderLocator::new(INVOICE_LABELS, 18).locate(&mut sheet).unwrap();
        assert_eq!((found.header_row, found.fallback), (17, false));
        let mut described = MemorySheet::default()
            .with_text(CellRef::new(6, 4), "Invoice No.")
            .with_text(CellRef::new(2, 13), "Description of Goods");
        let found = HeaderLocator::new(INVOICE_LABELS, 18).locate(&mut described).unwrap();
        assert_eq!(found.data_start_row, 14);
    }
    #[test]
    fn totals_marker_by_label_and_by_sum() {
        let mut sheet = MemorySheet::default()
            .with_text(CellRef::new(1, 21), "Total")
            .with_formula(CellRef::new(5, 16), "=SUM(E13:E15)");
        let label = TotalsMarker::Label {
            column: 1,
            text: "Total",
            window: 20,
            fallback_offset: 10,
        };
        assert_eq!(label.find(&mut sheet, 18).unwrap().row, 21);
        let sum = TotalsMarker::SumFormula {
            column: 5,
            window: 15,
            fallback_offset: 3,
        };
        let hit = sum.find(&mut sheet, 13).unwrap();
        assert_eq!((hit.row, hit.fallback), (16, false));
        let miss = sum.find(&mut sheet, 40).unwrap();
        assert_eq!((miss.row, miss.fallback), (43, true));
    }
    #[test]
    fn text_search_in_column_returns_first_hit() {
        let mut sheet = MemorySheet::default()
            .with_text(CellRef::new(1, 24), "PO No.")
            .with_text(CellRef::new(1, 30), "PO No. (copy)");
        assert_eq!(find_text_in_column(&mut sheet, 1, "PO No", 15, 50).unwrap(), Some(24));
        assert_eq!(find_text_in_column(&mut sheet, 5, "합 계", 15, 50).unwrap(), None);
    }
}

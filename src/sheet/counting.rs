use super::{
    BorderEdge, BorderStyle, CellValue, SheetAccess,
    address::{CellRange, CellRef},
};
use crate::error::Result;
use std::{fmt, path::Path};
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTrips {
    pub get_cell: usize,
    pub get_range: usize,
    pub set_range: usize,
    pub insert_rows: usize,
    pub delete_rows: usize,
    pub copy_row_style: usize,
    pub set_border: usize,
    pub set_formula: usize,
    pub print_area: usize,
    pub save: usize,
}
impl RoundTrips {
    pub const fn total(&self) -> usize {
        self.get_cell
            + self.get_range
            + self.set_range
            + self.insert_rows
            + self.delete_rows
            + self.copy_row_style
            + self.set_border
            + self.set_formula
            + self.print_area
            + self.save
    }
    pub const fn structural(&self) -> usize {
        self.insert_rows + self.delete_rows
    }
    #[must_use]
    pub const fn since(&self, earlier: &Self) -> Self {
        Self {
            get_cell: self.get_cell.saturating_sub(earlier.get_cell),
            get_range: self.get_range.saturating_sub(earlier.get_range),
            set_range: self.set_range.saturating_sub(earlier.set_range),
            insert_rows: self.insert_rows.saturating_sub(earlier.insert_rows),
            delete_rows: self.delete_rows.saturating_sub(earlier.delete_rows),
            copy_row_style: self.copy_row_style.saturating_sub(earlier.copy_row_style),
            set_border: self.set_border.saturating_sub(earlier.set_border),
            set_formula: self.set_formula.saturating_sub(earlier.set_formula),
            print_area: self.print_area.saturating_sub(earlier.print_area),
            save: self.save.saturating_sub(earlier.save),
        }
    }
}
impl fmt::Display for RoundTrips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "총 {}회 (읽기 {}, 범위쓰기 {}, 행삽입 {}, 행삭제 {}, 서식복사 {}, 테두리 {}, 수식 {})",
            self.total(),
            self.get_cell + self.get_range,
            self.set_range,
            self.insert_rows,
            self.delete_rows,
            self.copy_row_style,
            self.set_border,
            self.set_formula
        )
    }
}
#[derive(Debug)]
pub struct CountingSheet<S> {
    inner: S,
    counts: RoundTrips,
}
impl<S: SheetAccess> CountingSheet<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: RoundTrips::default(),
        }
    }
    pub const fn counts(&self) -> RoundTrips {
        self.counts
    }
    pub const fn inner(&self) -> &S {
        &self.inner
    }
    pub fn into_inner(self) -> S {
        self.inner
    }
}
impl<S: SheetAccess> SheetAccess for CountingSheet<S> {
    fn get_cell(&mut self, cell: CellRef) -> Result<CellValue> {
        self.counts.get_cell += 1;
        self.inner.get_cell(cell)
    }
    fn get_range(&mut self, range: CellRange) -> Result<Vec<Vec<CellValue>>> {
        self.counts.get_range += 1;
        self.inner.get_range(range)
    }
    fn set_range(&mut self, range: CellRange, values: &[Vec<CellValue>]) -> Result<()> {
        self.counts.set_range += 1;
        self.inner.set_range(range, values)
    }
    fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.counts.insert_rows += 1;
        self.inner.insert_rows(at, count)
    }
    fn delete_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.counts.delete_rows += 1;
        self.inner.delete_rows(at, count)
    }
    fn copy_row_style(&mut self, src: u32, dst: u32) -> Result<()> {
        self.counts.copy_row_style += 1;
        self.inner.copy_row_style(src, dst)
    }
    fn set_border(&mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) -> Result<()> {
        self.counts.set_border += 1;
        self.inner.set_border(range, edge, style)
    }
    fn set_formula(&mut self, cell: CellRef, expr: &str) -> Result<()> {
        self.counts.set_formula += 1;
        self.inner.set_formula(cell, expr)
    }
    fn print_area(&mut self) -> Result<Option<CellRange>> {
        self.counts.print_area += 1;
        self.inner.print_area()
    }
    fn set_print_area(&mut self, range: CellRange) -> Result<()> {
        self.counts.print_area += 1;
        self.inner.set_print_area(range)
    }
    fn shifts_references(&self) -> bool {
        self.inner.shifts_references()
    }
    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.counts.save += 1;
        self.inner.save_as(path)
    }
    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

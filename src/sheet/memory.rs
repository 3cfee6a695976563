use super::{
    BorderEdge, BorderStyle, CellValue, SheetAccess, SheetEngine, SheetSelector,
    address::{CellRange, CellRef},
    check_block,
};
use crate::{
    error::{FillError, Result},
    formula::shift_formula_references,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
#[derive(Debug, Clone)]
pub struct MemorySheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    borders: BTreeMap<(u32, u32, BorderEdge), BorderStyle>,
    row_styles: BTreeMap<u32, String>,
    merges: Vec<CellRange>,
    print_area: Option<CellRange>,
    shifts_references: bool,
    fail_on: Option<&'static str>,
    closes: Arc<AtomicUsize>,
}
impl Default for MemorySheet {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}
impl MemorySheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            cells: BTreeMap::new(),
            borders: BTreeMap::new(),
            row_styles: BTreeMap::new(),
            merges: Vec::new(),
            print_area: None,
            shifts_references: true,
            fail_on: None,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
    #[must_use]
    pub const fn without_reference_shift(mut self) -> Self {
        self.shifts_references = false;
        self
    }
    #[must_use]
    pub const fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }
    #[must_use]
    pub fn with_value(mut self, cell: CellRef, value: CellValue) -> Self {
        self.put(cell, value);
        self
    }
    #[must_use]
    pub fn with_text(self, cell: CellRef, text: &str) -> Self {
        self.with_value(cell, CellValue::text(text))
    }
    #[must_use]
    pub fn with_formula(self, cell: CellRef, expr: &str) -> Self {
        self.with_value(cell, CellValue::Formula(expr.to_owned()))
    }
    #[must_use]
    pub fn with_row_style(mut self, row: u32, style: &str) -> Self {
        self.row_styles.insert(row, style.to_owned());
        self
    }
    #[must_use]
    pub fn with_border(mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) -> Self {
        self.apply_border(range, edge, style);
        self
    }
    #[must_use]
    pub fn with_merge(mut self, range: CellRange) -> Self {
        self.merges.push(range);
        self
    }
    #[must_use]
    pub const fn with_print_area(mut self, range: CellRange) -> Self {
        self.print_area = Some(range);
        self
    }
    pub fn value(&self, cell: CellRef) -> CellValue {
        self.cells
            .get(&(cell.row, cell.col))
            .cloned()
            .unwrap_or_default()
    }
    pub fn border(&self, cell: CellRef, edge: BorderEdge) -> Option<BorderStyle> {
        self.borders.get(&(cell.row, cell.col, edge)).copied()
    }
    pub fn row_style(&self, row: u32) -> Option<&str> {
        self.row_styles.get(&row).map(String::as_str)
    }
    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }
    pub const fn current_print_area(&self) -> Option<CellRange> {
        self.print_area
    }
    pub fn last_row(&self) -> u32 {
        self.cells.keys().last().map_or(0, |(row, _)| *row)
    }
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
    pub fn load(path: &Path) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(&fs::read(path)?)?;
        let mut sheet = Self::new(&snapshot.name);
        for (cell, value) in snapshot.cells {
            sheet.put(cell, value);
        }
        for (cell, edge, style) in snapshot.borders {
            sheet.borders.insert((cell.row, cell.col, edge), style);
        }
        sheet.row_styles = snapshot.row_styles.into_iter().collect();
        sheet.merges = snapshot.merges;
        sheet.print_area = snapshot.print_area;
        Ok(sheet)
    }
    fn check(&self, op: &'static str) -> Result<()> {
        if self.fail_on == Some(op) {
            return Err(FillError::engine(format!("{op} 호출 중 엔진 연결이 끊어졌습니다.")));
        }
        Ok(())
    }
    fn put(&mut self, cell: CellRef, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(cell.row, cell.col));
        } else {
            self.cells.insert((cell.row, cell.col), value);
        }
    }
    fn apply_border(&mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) {
        for cell in range.cells() {
            if style == BorderStyle::None {
                self.borders.remove(&(cell.row, cell.col, edge));
            } else {
                self.borders.insert((cell.row, cell.col, edge), style);
            }
        }
    }
    fn remap_rows(&mut self, map: &dyn Fn(u32) -> Option<u32>) {
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .filter_map(|((row, col), v)| map(row).map(|r| ((r, col), v)))
            .collect();
        self.borders = std::mem::take(&mut self.borders)
            .into_iter()
            .filter_map(|((row, col, edge), s)| map(row).map(|r| ((r, col, edge), s)))
            .collect();
        self.row_styles = std::mem::take(&mut self.row_styles)
            .into_iter()
            .filter_map(|(row, s)| map(row).map(|r| (r, s)))
            .collect();
    }
    fn shift_all_formulas(&mut self, shift_by: i64, threshold: u32) {
        if !self.shifts_references {
            return;
        }
        for value in self.cells.values_mut() {
            if let CellValue::Formula(f) = value {
                *f = shift_formula_references(f, shift_by, threshold);
            }
        }
    }
}
impl SheetAccess for MemorySheet {
    fn get_cell(&mut self, cell: CellRef) -> Result<CellValue> {
        self.check("get_cell")?;
        Ok(self.value(cell))
    }
    fn get_range(&mut self, range: CellRange) -> Result<Vec<Vec<CellValue>>> {
        self.check("get_range")?;
        Ok((range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.value(CellRef::new(col, row)))
                    .collect()
            })
            .collect())
    }
    fn set_range(&mut self, range: CellRange, values: &[Vec<CellValue>]) -> Result<()> {
        self.check("set_range")?;
        check_block(range, values)?;
        for (row, row_values) in (range.start.row..).zip(values) {
            for (col, value) in (range.start.col..).zip(row_values) {
                self.put(CellRef::new(col, row), value.clone());
            }
        }
        Ok(())
    }
    fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.check("insert_rows")?;
        if count == 0 {
            return Ok(());
        }
        self.remap_rows(&|row| Some(if row >= at { row + count } else { row }));
        self.shift_all_formulas(i64::from(count), at);
        for merge in &mut self.merges {
            if merge.start.row >= at {
                merge.start.row += count;
            }
            if merge.end.row >= at {
                merge.end.row += count;
            }
        }
        if let Some(area) = self.print_area.as_mut()
            && area.end.row >= at
        {
            area.end.row += count;
            if area.start.row >= at {
                area.start.row += count;
            }
        }
        Ok(())
    }
    fn delete_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.check("delete_rows")?;
        if count == 0 {
            return Ok(());
        }
        let end = at + count;
        self.remap_rows(&|row| {
            if row < at {
                Some(row)
            } else if row < end {
                None
            } else {
                Some(row - count)
            }
        });
        self.shift_all_formulas(-i64::from(count), end);
        self.merges
            .retain(|m| !(m.start.row >= at && m.end.row < end));
        for merge in &mut self.merges {
            if merge.start.row >= end {
                merge.start.row -= count;
            }
            if merge.end.row >= end {
                merge.end.row -= count;
            }
        }
        if let Some(area) = self.print_area.as_mut() {
            if area.end.row >= end {
                area.end.row -= count;
            } else if area.end.row >= at {
                area.end.row = at.saturating_sub(1).max(area.start.row);
            }
        }
        Ok(())
    }
    fn copy_row_style(&mut self, src: u32, dst: u32) -> Result<()> {
        self.check("copy_row_style")?;
        match self.row_styles.get(&src).cloned() {
            Some(style) => self.row_styles.insert(dst, style),
            None => self.row_styles.remove(&dst),
        };
        self.borders.retain(|(row, _, _), _| *row != dst);
        let copied: Vec<_> = self
            .borders
            .iter()
            .filter(|((row, _, _), _)| *row == src)
            .map(|((_, col, edge), style)| ((dst, *col, *edge), *style))
            .collect();
        self.borders.extend(copied);
        let merges: Vec<_> = self
            .merges
            .iter()
            .filter(|m| m.start.row == src && m.end.row == src)
            .map(|m| CellRange::row_span(dst, m.start.col, m.end.col))
            .collect();
        for merge in merges {
            if !self.merges.contains(&merge) {
                self.merges.push(merge);
            }
        }
        Ok(())
    }
    fn set_border(&mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) -> Result<()> {
        self.check("set_border")?;
        self.apply_border(range, edge, style);
        Ok(())
    }
    fn set_formula(&mut self, cell: CellRef, expr: &str) -> Result<()> {
        self.check("set_formula")?;
        let expr = if expr.starts_with('=') {
            expr.to_owned()
        } else {
            format!("={expr}")
        };
        self.put(cell, CellValue::Formula(expr));
        Ok(())
    }
    fn print_area(&mut self) -> Result<Option<CellRange>> {
        self.check("print_area")?;
        Ok(self.print_area)
    }
    fn set_print_area(&mut self, range: CellRange) -> Result<()> {
        self.check("set_print_area")?;
        self.print_area = Some(range);
        Ok(())
    }
    fn shifts_references(&self) -> bool {
        self.shifts_references
    }
    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.check("save_as")?;
        let snapshot = Snapshot {
            name: self.name.clone(),
            cells: self
                .cells
                .iter()
                .map(|((row, col), v)| (CellRef::new(*col, *row), v.clone()))
                .collect(),
            borders: self
                .borders
                .iter()
                .map(|((row, col, edge), s)| (CellRef::new(*col, *row), *edge, *s))
                .collect(),
            row_styles: self.row_styles.clone().into_iter().collect(),
            merges: self.merges.clone(),
            print_area: self.print_area,
        };
        fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
        Ok(())
    }
    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    name: String,
    cells: Vec<(CellRef, CellValue)>,
    borders: Vec<(CellRef, BorderEdge, BorderStyle)>,
    row_styles: Vec<(u32, String)>,
    merges: Vec<CellRange>,
    print_area: Option<CellRange>,
}
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    template: MemorySheet,
}
impl MemoryEngine {
    pub const fn new(template: MemorySheet) -> Self {
        Self { template }
    }
    pub fn close_count(&self) -> usize {
        self.template.close_count()
    }
}
impl SheetEngine for MemoryEngine {
    type Sheet = MemorySheet;
    fn open(&self, _template: &Path, selector: &SheetSelector) -> Result<MemorySheet> {
        if let Some(name) = selector.name()
            && name != self.template.name
        {
            return Err(FillError::SheetMissing(name.to_owned()));
        }
        Ok(self.template.clone())
    }
}

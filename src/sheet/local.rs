use super::{
    BorderEdge, BorderStyle, CellValue, SheetAccess, SheetEngine, SheetSelector,
    address::{CellRange, CellRef, ref_with_locks},
    check_block,
};
use crate::error::{FillError, Result};
use log::debug;
use std::path::Path;
use umya_spreadsheet::{Spreadsheet, Worksheet};
const PRINT_AREA_NAME: &str = "_xlnm.Print_Area";
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEngine;
impl SheetEngine for LocalEngine {
    type Sheet = LocalSheet;
    fn open(&self, template: &Path, selector: &SheetSelector) -> Result<LocalSheet> {
        if !template.is_file() {
            return Err(FillError::TemplateMissing(template.to_path_buf()));
        }
        let book = umya_spreadsheet::reader::xlsx::read(template).map_err(|e| {
            FillError::engine(format!("템플릿을 열 수 없습니다: {} ({e})", template.display()))
        })?;
        let sheet_name = match selector.name() {
            Some(name) => book
                .get_sheet_by_name(name)
                .map(|ws| ws.get_name().to_owned())
                .ok_or_else(|| FillError::SheetMissing(name.to_owned()))?,
            None => book
                .get_sheet_collection()
                .first()
                .map(|ws| ws.get_name().to_owned())
                .ok_or_else(|| FillError::SheetMissing("(첫 번째 시트)".to_owned()))?,
        };
        debug!("템플릿 열기: {} [{sheet_name}]", template.display());
        Ok(LocalSheet { book, sheet_name })
    }
}
pub struct LocalSheet {
    book: Spreadsheet,
    sheet_name: String,
}
impl LocalSheet {
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
    fn ws(&self) -> Result<&Worksheet> {
        self.book
            .get_sheet_by_name(&self.sheet_name)
            .ok_or_else(|| FillError::SheetMissing(self.sheet_name.clone()))
    }
    fn ws_mut(&mut self) -> Result<&mut Worksheet> {
        self.book
            .get_sheet_by_name_mut(&self.sheet_name)
            .ok_or_else(|| FillError::SheetMissing(self.sheet_name.clone()))
    }
    fn print_area_address(&self) -> Result<Option<String>> {
        let from_sheet = self
            .ws()?
            .get_defined_names()
            .iter()
            .find(|d| d.get_name() == PRINT_AREA_NAME)
            .map(|d| d.get_address());
        Ok(from_sheet.or_else(|| {
            self.book
                .get_defined_names()
                .iter()
                .find(|d| d.get_name() == PRINT_AREA_NAME && targets_sheet(&d.get_address(), &self.sheet_name))
                .map(|d| d.get_address())
        }))
    }
}
fn targets_sheet(address: &str, sheet: &str) -> bool {
    address
        .split_once('!')
        .is_some_and(|(prefix, _)| prefix.trim_start_matches('=').trim_matches('\'') == sheet)
}
fn print_area_text(sheet: &str, range: CellRange) -> String {
    format!(
        "'{}'!{}:{}",
        sheet.replace('\'', "''"),
        ref_with_locks(range.start.col, range.start.row, true, true),
        ref_with_locks(range.end.col, range.end.row, true, true)
    )
}
fn read_cell(ws: &Worksheet, cell: CellRef) -> CellValue {
    let Some(found) = ws.get_cell((cell.col, cell.row)) else {
        return CellValue::Empty;
    };
    if found.is_formula() {
        return CellValue::Formula(format!("={}", found.get_formula()));
    }
    if let Some(n) = found.get_value_number() {
        return CellValue::Number(n);
    }
    let text = found.get_value();
    if text.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(text.into_owned())
    }
}
fn write_cell(ws: &mut Worksheet, cell: CellRef, value: &CellValue) {
    let target = ws.get_cell_mut((cell.col, cell.row));
    target.get_cell_value_mut().remove_formula();
    match value {
        CellValue::Empty => {
            target.set_value_string(String::new());
        }
        CellValue::Text(s) => {
            target.set_value_string(s.clone());
        }
        CellValue::Number(n) => {
            target.set_value_number(*n);
        }
        CellValue::Bool(b) => {
            target.set_value_bool(*b);
        }
        CellValue::Formula(f) => {
            target.set_formula(f.trim_start_matches('=').to_owned());
            target.set_formula_result_default("");
        }
    }
}
impl SheetAccess for LocalSheet {
    fn get_cell(&mut self, cell: CellRef) -> Result<CellValue> {
        Ok(read_cell(self.ws()?, cell))
    }
    fn get_range(&mut self, range: CellRange) -> Result<Vec<Vec<CellValue>>> {
        let ws = self.ws()?;
        Ok((range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| read_cell(ws, CellRef::new(col, row)))
                    .collect()
            })
            .collect())
    }
    fn set_range(&mut self, range: CellRange, values: &[Vec<CellValue>]) -> Result<()> {
        check_block(range, values)?;
        let ws = self.ws_mut()?;
        for (row, row_values) in (range.start.row..).zip(values) {
            for (col, value) in (range.start.col..).zip(row_values) {
                write_cell(ws, CellRef::new(col, row), value);
            }
        }
        Ok(())
    }
    fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        if count > 0 {
            self.ws_mut()?.insert_new_row(&at, &count);
        }
        Ok(())
    }
    fn delete_rows(&mut self, at: u32, count: u32) -> Result<()> {
        if count > 0 {
            self.ws_mut()?.remove_row(&at, &count);
        }
        Ok(())
    }
    fn copy_row_style(&mut self, src: u32, dst: u32) -> Result<()> {
        let ws = self.ws_mut()?;
        let last_col = ws.get_highest_column();
        for col in 1..=last_col {
            let style = ws
                .get_cell((col, src))
                .map(|c| c.get_style().clone())
                .unwrap_or_default();
            ws.get_cell_mut((col, dst)).set_style(style);
        }
        if let Some(height) = ws.get_row_dimension(&src).map(|r| r.get_height().to_owned()) {
            ws.get_row_dimension_mut(&dst).set_height(height);
        }
        let merges: Vec<CellRange> = ws
            .get_merge_cells()
            .iter()
            .filter_map(|m| CellRange::parse(&m.get_range()).ok())
            .filter(|m| m.start.row == src && m.end.row == src)
            .map(|m| CellRange::row_span(dst, m.start.col, m.end.col))
            .collect();
        for merge in merges {
            ws.add_merge_cells(merge.to_string());
        }
        Ok(())
    }
    fn set_border(&mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) -> Result<()> {
        let ws = self.ws_mut()?;
        for cell in range.cells() {
            let borders = ws.get_cell_mut((cell.col, cell.row)).get_style_mut().get_borders_mut();
            let side = match edge {
                BorderEdge::Top => borders.get_top_mut(),
                BorderEdge::Bottom => borders.get_bottom_mut(),
                BorderEdge::Left => borders.get_left_mut(),
                BorderEdge::Right => borders.get_right_mut(),
            };
            side.set_border_style(style.as_str());
        }
        Ok(())
    }
    fn set_formula(&mut self, cell: CellRef, expr: &str) -> Result<()> {
        let formula = CellValue::Formula(expr.to_owned());
        write_cell(self.ws_mut()?, cell, &formula);
        Ok(())
    }
    fn print_area(&mut self) -> Result<Option<CellRange>> {
        let Some(address) = self.print_area_address()? else {
            return Ok(None);
        };
        let first_area = address.split(',').next().unwrap_or_default();
        Ok(CellRange::parse(first_area.trim_start_matches('=')).ok())
    }
    fn set_print_area(&mut self, range: CellRange) -> Result<()> {
        let sheet_name = self.sheet_name.clone();
        let text = print_area_text(&sheet_name, range);
        if let Some(defined) = self
            .ws_mut()?
            .get_defined_names_mut()
            .iter_mut()
            .find(|d| d.get_name() == PRINT_AREA_NAME)
        {
            defined.set_address(text);
            return Ok(());
        }
        if let Some(defined) = self
            .book
            .get_defined_names_mut()
            .iter_mut()
            .find(|d| d.get_name() == PRINT_AREA_NAME && targets_sheet(&d.get_address(), &sheet_name))
        {
            defined.set_address(text);
            return Ok(());
        }
        debug!("{sheet_name} 시트에 인쇄 영역이 정의되어 있지 않아 건너뜁니다.");
        Ok(())
    }
    fn shifts_references(&self) -> bool {
        true
    }
    fn save_as(&mut self, path: &Path) -> Result<()> {
        umya_spreadsheet::writer::xlsx::write(&self.book, path)
            .map_err(|e| FillError::engine(format!("xlsx 저장 실패: {} ({e})", path.display())))
    }
    fn close(&mut self) -> Result<()> {
        debug!("템플릿 세션 종료: [{}]", self.sheet_name);
        Ok(())
    }
}

pub mod address;
pub mod counting;
pub mod local;
pub mod memory;
pub mod protocol;
pub mod remote;
use crate::error::{FillError, Result};
use address::{CellRange, CellRef};
use serde::{Deserialize, Serialize};
use std::path::Path;
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Formula(String),
}
impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) | Self::Formula(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_owned(),
        }
    }
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
    pub fn formula(&self) -> Option<&str> {
        if let Self::Formula(f) = self {
            Some(f)
        } else {
            None
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderEdge {
    Top,
    Bottom,
    Left,
    Right,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    None,
    Thin,
    Medium,
}
impl BorderStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Thin => "thin",
            Self::Medium => "medium",
        }
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SheetSelector {
    #[default]
    First,
    Named(String),
}
impl SheetSelector {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::First => None,
            Self::Named(n) => Some(n),
        }
    }
}
pub trait SheetAccess {
    fn get_cell(&mut self, cell: CellRef) -> Result<CellValue>;
    fn get_range(&mut self, range: CellRange) -> Result<Vec<Vec<CellValue>>>;
    fn set_range(&mut self, range: CellRange, values: &[Vec<CellValue>]) -> Result<()>;
    fn insert_rows(&mut self, at: u32, count: u32) -> Result<()>;
    fn delete_rows(&mut self, at: u32, count: u32) -> Result<()>;
    fn copy_row_style(&mut self, src: u32, dst: u32) -> Result<()>;
    fn set_border(&mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) -> Result<()>;
    fn set_formula(&mut self, cell: CellRef, expr: &str) -> Result<()>;
    fn print_area(&mut self) -> Result<Option<CellRange>>;
    fn set_print_area(&mut self, range: CellRange) -> Result<()>;
    fn shifts_references(&self) -> bool;
    fn save_as(&mut self, path: &Path) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn set_cell(&mut self, cell: CellRef, value: CellValue) -> Result<()> {
        self.set_range(CellRange::single(cell), &[vec![value]])
    }
}
pub trait SheetEngine {
    type Sheet: SheetAccess;
    fn open(&self, template: &Path, selector: &SheetSelector) -> Result<Self::Sheet>;
}
pub fn check_block(range: CellRange, values: &[Vec<CellValue>]) -> Result<()> {
    let rows_ok = usize::try_from(range.height()).is_ok_and(|h| h == values.len());
    let width = usize::try_from(range.width()).unwrap_or(usize::MAX);
    if rows_ok && values.iter().all(|row| row.len() == width) {
        return Ok(());
    }
    Err(FillError::InvalidReference(format!(
        "{range} 범위와 값 블록 크기가 다릅니다. (행 {}개)",
        values.len()
    )))
}
#[cfg(test)]
mod tests {
    use super::{CellValue, check_block};
    use crate::sheet::address::CellRange;
    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(CellValue::Number(13.0).display(), "13");
        assert_eq!(CellValue::Number(0.5).display(), "0.5");
        assert_eq!(CellValue::Empty.display(), "");
    }
    #[test]
    fn block_shape_must_match_range() {
        let range = CellRange::column(2, 13, 15);
        let ok = vec![vec![CellValue::Empty]; 3];
        assert!(check_block(range, &ok).is_ok());
        assert!(check_block(range, &ok[..2]).is_err());
        let wide = vec![vec![CellValue::Empty, CellValue::Empty]; 3];
        assert!(check_block(range, &wide).is_err());
    }
    #[test]
    fn cell_values_use_tagged_json() {
        let json = serde_json::to_string(&CellValue::Formula("=SUM(J13:J13)".to_owned())).unwrap();
        assert_eq!(json, r#"{"t":"formula","v":"=SUM(J13:J13)"}"#);
        let back: CellValue = serde_json::from_str(r#"{"t":"empty"}"#).unwrap();
        assert!(back.is_empty());
    }
}

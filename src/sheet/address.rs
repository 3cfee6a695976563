use crate::error::{FillError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
pub const MAX_COLUMN: u32 = 16_384;
pub const MAX_ROW: u32 = 1_048_576;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellRef {
    pub col: u32,
    pub row: u32,
}
impl CellRef {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
    pub fn parse(text: &str) -> Result<Self> {
        let (col, row, _, _) = parse_ref_with_locks(text.trim())
            .ok_or_else(|| FillError::InvalidReference(text.to_owned()))?;
        Ok(Self { col, row })
    }
    pub fn at(col_name: &str, row: u32) -> Result<Self> {
        let col = name_to_col(col_name)
            .filter(|c| *c <= MAX_COLUMN)
            .ok_or_else(|| FillError::InvalidReference(format!("{col_name}{row}")))?;
        Ok(Self { col, row })
    }
    #[must_use]
    pub fn with_row(self, row: u32) -> Self {
        Self { row, ..self }
    }
}
impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_name(self.col), self.row)
    }
}
impl From<CellRef> for String {
    fn from(value: CellRef) -> Self {
        value.to_string()
    }
}
impl TryFrom<String> for CellRef {
    type Error = FillError;
    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}
impl CellRange {
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellRef::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }
    pub const fn single(cell: CellRef) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }
    pub fn column(col: u32, first_row: u32, last_row: u32) -> Self {
        Self::new(CellRef::new(col, first_row), CellRef::new(col, last_row))
    }
    pub fn row_span(row: u32, first_col: u32, last_col: u32) -> Self {
        Self::new(CellRef::new(first_col, row), CellRef::new(last_col, row))
    }
    pub const fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }
    pub const fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }
    pub fn contains(&self, cell: CellRef) -> bool {
        (self.start.col..=self.end.col).contains(&cell.col)
            && (self.start.row..=self.end.row).contains(&cell.row)
    }
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let (c0, c1) = (self.start.col, self.end.col);
        (self.start.row..=self.end.row)
            .flat_map(move |row| (c0..=c1).map(move |col| CellRef::new(col, row)))
    }
    pub fn parse(text: &str) -> Result<Self> {
        let cleaned = strip_sheet_prefix(text.trim());
        let (a, b) = cleaned.split_once(':').unwrap_or((cleaned, cleaned));
        Ok(Self::new(CellRef::parse(a)?, CellRef::parse(b)?))
    }
}
impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}
impl From<CellRange> for String {
    fn from(value: CellRange) -> Self {
        value.to_string()
    }
}
impl TryFrom<String> for CellRange {
    type Error = FillError;
    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}
pub fn strip_sheet_prefix(text: &str) -> &str {
    text.rsplit_once('!').map_or(text, |(_, rest)| rest)
}
pub fn col_to_name(mut col: u32) -> String {
    if col == 0 {
        return "A".to_owned();
    }
    let mut rev = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        rev.push(char::from_digit(rem + 10, 36).map_or('A', |c| c.to_ascii_uppercase()));
        col = (col - 1) / 26;
    }
    rev.into_iter().rev().collect()
}
pub fn name_to_col(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }
    let mut out = 0u32;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_digit(36)? - 9;
        out = out.checked_mul(26)?.checked_add(digit)?;
    }
    Some(out)
}
pub fn parse_ref_with_locks(r: &str) -> Option<(u32, u32, bool, bool)> {
    let mut chars = r.chars().peekable();
    let col_lock = chars.next_if_eq(&'$').is_some();
    let mut col_s = String::new();
    while let Some(ch) = chars.next_if(char::is_ascii_alphabetic) {
        col_s.push(ch);
    }
    let row_lock = chars.next_if_eq(&'$').is_some();
    let mut row_s = String::new();
    while let Some(ch) = chars.next_if(char::is_ascii_digit) {
        row_s.push(ch);
    }
    if col_s.is_empty() || row_s.is_empty() || chars.peek().is_some() {
        return None;
    }
    let col = name_to_col(&col_s).filter(|c| *c <= MAX_COLUMN)?;
    let row = row_s.parse::<u32>().ok().filter(|r| (1..=MAX_ROW).contains(r))?;
    Some((col, row, col_lock, row_lock))
}
pub fn ref_with_locks(col: u32, row: u32, col_lock: bool, row_lock: bool) -> String {
    format!(
        "{}{}{}{}",
        if col_lock { "$" } else { "" },
        col_to_name(col),
        if row_lock { "$" } else { "" },
        row
    )
}

use crate::{
    error::Result,
    formula::{shift_formula_references, sum_formula},
    resize::{ResizeDirection, ResizeOutcome},
    sheet::{
        CellValue, SheetAccess,
        address::{CellRange, CellRef, col_to_name},
    },
};
use log::debug;
const TRAILING_SCAN_ROWS: u32 = 40;
pub fn rewrite_sum_totals(
    sheet: &mut dyn SheetAccess,
    outcome: &ResizeOutcome,
    columns: &[u32],
) -> Result<()> {
    let first = outcome.region.data_start_row;
    for &col in columns {
        let cell = CellRef::new(col, outcome.totals_row);
        match outcome.data_end_row() {
            Some(last) => sheet.set_formula(cell, &sum_formula(col, first, last))?,
            None => sheet.set_cell(cell, CellValue::Number(0.0))?,
        }
    }
    debug!(
        "합계 수식 갱신: {}열 @ {}행",
        columns.iter().map(|c| col_to_name(*c)).collect::<Vec<_>>().join(","),
        outcome.totals_row
    );
    Ok(())
}
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaxPolicy {
    Domestic { rate: f64 },
    Export,
}
impl TaxPolicy {
    pub fn tax_cell(&self, column: u32, totals_row: u32) -> CellValue {
        match *self {
            Self::Domestic { rate } => CellValue::Formula(format!(
                "={}{totals_row}*{rate}",
                col_to_name(column)
            )),
            Self::Export => CellValue::Number(0.0),
        }
    }
}
pub fn write_tax_and_grand_total(
    sheet: &mut dyn SheetAccess,
    column: u32,
    totals_row: u32,
    policy: TaxPolicy,
) -> Result<()> {
    let col = col_to_name(column);
    let block = vec![
        vec![policy.tax_cell(column, totals_row)],
        vec![CellValue::Formula(format!(
            "=SUM({col}{totals_row}:{col}{})",
            totals_row + 1
        ))],
    ];
    sheet.set_range(CellRange::column(column, totals_row + 1, totals_row + 2), &block)
}
pub fn plan_print_area(
    before: Option<CellRange>,
    old_totals_row: u32,
    delta: i64,
) -> Option<CellRange> {
    let area = before?;
    if delta == 0 || area.end.row < old_totals_row {
        return None;
    }
    let end = i64::from(area.end.row)
        .saturating_add(delta)
        .max(i64::from(area.start.row));
    let end = u32::try_from(end).ok()?;
    Some(CellRange::new(area.start, area.end.with_row(end)))
}
pub fn repair_print_area(
    sheet: &mut dyn SheetAccess,
    outcome: &ResizeOutcome,
) -> Result<Option<CellRange>> {
    let Some(target) = plan_print_area(
        outcome.print_area,
        outcome.region.totals_marker_row,
        outcome.delta.signed(),
    ) else {
        return Ok(None);
    };
    sheet.set_print_area(target)?;
    debug!("인쇄 영역 조정: {target}");
    Ok(Some(target))
}
pub fn shift_trailing_formulas(
    sheet: &mut dyn SheetAccess,
    outcome: &ResizeOutcome,
    last_col: u32,
) -> Result<usize> {
    if outcome.delta.direction == ResizeDirection::None || sheet.shifts_references() {
        return Ok(0);
    }
    let threshold = match outcome.delta.direction {
        ResizeDirection::Delete => outcome.delta.anchor_row + outcome.delta.row_count,
        _ => outcome.delta.anchor_row,
    };
    let start = outcome.totals_row;
    let end = plan_print_area(
        outcome.print_area,
        outcome.region.totals_marker_row,
        outcome.delta.signed(),
    )
    .map_or(start + TRAILING_SCAN_ROWS, |area| area.end.row.max(start + TRAILING_SCAN_ROWS));
    let block = CellRange::new(CellRef::new(1, start), CellRef::new(last_col.max(1), end));
    let grid = sheet.get_range(block)?;
    let mut shifted = 0;
    for (row, cells) in (start..).zip(&grid) {
        for (col, value) in (1..).zip(cells) {
            let Some(formula) = value.formula() else {
                continue;
            };
            let moved = shift_formula_references(formula, outcome.delta.signed(), threshold);
            if moved != formula {
                sheet.set_formula(CellRef::new(col, row), &moved)?;
                shifted += 1;
            }
        }
    }
    debug!("하단 수식 {shifted}개 참조 이동 ({block})");
    Ok(shifted)
}

use crate::{
    error::Result,
    formula::expand_row_template,
    numeric::{round_f64_to_i64, value_number},
    record::{Record, value_text},
    report::Warning,
    sheet::{
        CellValue, SheetAccess,
        address::{CellRange, col_to_name},
    },
};
use chrono::NaiveDate;
use log::{debug, warn};
#[allow(clippy::cast_precision_loss)]
fn int_cell(v: i64) -> CellValue {
    CellValue::Number(v as f64)
}
#[derive(Debug, Clone, Copy)]
pub enum Formatter {
    Text(&'static str),
    ModelText(&'static str),
    Integer { key: &'static str, default: i64 },
    Decimal { key: &'static str, default: f64 },
    Date {
        key: &'static str,
        pattern: &'static str,
    },
    DocumentDate {
        key: &'static str,
        pattern: &'static str,
    },
    Constant(&'static str),
    Sequence,
    RowFormula(&'static str),
    Custom {
        name: &'static str,
        build: fn(&Record) -> String,
    },
}
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub column: u32,
    pub formatter: Formatter,
}
impl ColumnSpec {
    pub const fn new(column: u32, formatter: Formatter) -> Self {
        Self { column, formatter }
    }
}
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub primary: &'a Record,
    pub today: NaiveDate,
    pub vat_rate: f64,
}
impl<'a> DocumentContext<'a> {
    pub const fn new(primary: &'a Record, today: NaiveDate, vat_rate: f64) -> Self {
        Self {
            primary,
            today,
            vat_rate,
        }
    }
}
pub struct CellContext<'a> {
    pub record: &'a Record,
    pub index: usize,
    pub row: u32,
    pub doc: &'a DocumentContext<'a>,
}
impl Formatter {
    pub const fn field(&self) -> &'static str {
        match *self {
            Self::Text(key) | Self::ModelText(key) => key,
            Self::Integer { key, .. }
            | Self::Decimal { key, .. }
            | Self::Date { key, .. }
            | Self::DocumentDate { key, .. } => key,
            Self::Constant(_) => "constant",
            Self::Sequence => "sequence",
            Self::RowFormula(_) => "formula",
            Self::Custom { name, .. } => name,
        }
    }
    pub fn cell(&self, ctx: &CellContext<'_>, warnings: &mut Vec<Warning>) -> CellValue {
        match *self {
            Self::Text(key) => text_cell(&ctx.record.text(key)),
            Self::ModelText(key) => text_cell(&model_text(ctx.record, key)),
            Self::Integer { key, default } => {
                let parsed = ctx
                    .record
                    .get(key)
                    .map(|v| (v, value_number(v).and_then(round_f64_to_i64)));
                match parsed {
                    None => int_cell(default),
                    Some((_, Some(v))) => int_cell(v),
                    Some((raw, None)) => {
                        coercion(ctx, key, &value_text(raw), &default.to_string(), warnings);
                        int_cell(default)
                    }
                }
            }
            Self::Decimal { key, default } => {
                let parsed = ctx.record.get(key).map(|v| (v, value_number(v)));
                match parsed {
                    None => CellValue::Number(default),
                    Some((_, Some(v))) => CellValue::Number(v),
                    Some((raw, None)) => {
                        coercion(ctx, key, &value_text(raw), &default.to_string(), warnings);
                        CellValue::Number(default)
                    }
                }
            }
            Self::Date { key, pattern } => {
                if let Some(date) = ctx.record.date(key) {
                    return text_cell(&date.format(pattern).to_string());
                }
                let raw = ctx.record.text(key);
                if raw.trim().is_empty() {
                    return CellValue::Empty;
                }
                let head: String = raw.trim().chars().take(10).collect();
                coercion(ctx, key, &raw, &head, warnings);
                text_cell(&head)
            }
            Self::DocumentDate { key, pattern } => {
                let date = ctx.doc.primary.date(key).unwrap_or(ctx.doc.today);
                text_cell(&date.format(pattern).to_string())
            }
            Self::Constant(text) => text_cell(text),
            Self::Sequence => int_cell(i64::try_from(ctx.index).map_or(i64::MAX, |i| i + 1)),
            Self::RowFormula(template) => {
                CellValue::Formula(
                    expand_row_template(template, ctx.row)
                        .replace("{vat}", &ctx.doc.vat_rate.to_string()),
                )
            }
            Self::Custom { build, .. } => text_cell(&build(ctx.record)),
        }
    }
}
fn coercion(
    ctx: &CellContext<'_>,
    field: &'static str,
    raw: &str,
    fallback: &str,
    warnings: &mut Vec<Warning>,
) {
    warn!(
        "{}번째 아이템 {field} 값 '{raw}'을 해석하지 못해 {fallback}(으)로 대체합니다.",
        ctx.index + 1
    );
    warnings.push(Warning::FieldCoercion {
        item: ctx.index + 1,
        field,
        raw: raw.to_owned(),
        fallback: fallback.to_owned(),
    });
}
pub fn escape_formula_text(text: &str) -> String {
    if text.starts_with(['=', '+', '-', '@']) {
        format!("'{text}")
    } else {
        text.to_owned()
    }
}
pub fn text_cell(text: &str) -> CellValue {
    if text.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(escape_formula_text(text))
    }
}
pub fn model_text(record: &Record, key: &str) -> String {
    let text = record.text(key);
    let trimmed = text.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).to_owned()
}
#[derive(Debug, Clone, Copy)]
pub struct BatchWriter<'a> {
    pub columns: &'a [ColumnSpec],
    pub doc: DocumentContext<'a>,
}
impl<'a> BatchWriter<'a> {
    pub const fn new(columns: &'a [ColumnSpec], doc: DocumentContext<'a>) -> Self {
        Self { columns, doc }
    }
    pub fn column_values(
        &self,
        spec: &ColumnSpec,
        items: &[Record],
        start_row: u32,
        warnings: &mut Vec<Warning>,
    ) -> Vec<Vec<CellValue>> {
        items
            .iter()
            .enumerate()
            .zip(start_row..)
            .map(|((index, record), row)| {
                let ctx = CellContext {
                    record,
                    index,
                    row,
                    doc: &self.doc,
                };
                vec![spec.formatter.cell(&ctx, warnings)]
            })
            .collect()
    }
    pub fn write(
        &self,
        sheet: &mut dyn SheetAccess,
        items: &[Record],
        start_row: u32,
    ) -> Result<Vec<Warning>> {
        let mut warnings = Vec::new();
        let Some(count) = u32::try_from(items.len()).ok().filter(|n| *n > 0) else {
            return Ok(warnings);
        };
        let last_row = start_row + count - 1;
        for spec in self.columns {
            let block = self.column_values(spec, items, start_row, &mut warnings);
            sheet.set_range(CellRange::column(spec.column, start_row, last_row), &block)?;
        }
        debug!(
            "{}개 열 일괄 기록 완료 ({}~{last_row}행): {}",
            self.columns.len(),
            start_row,
            self.columns
                .iter()
                .map(|c| col_to_name(c.column))
                .collect::<Vec<_>>()
                .join(",")
        );
        Ok(warnings)
    }
}

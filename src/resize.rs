use crate::{
    error::{FillError, Result},
    locate::{HeaderMatch, MarkerMatch},
    report::Warning,
    sheet::{BorderEdge, BorderStyle, SheetAccess, address::CellRange},
};
use log::{debug, warn};
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateRegion {
    pub header_row: u32,
    pub data_start_row: u32,
    pub template_row_count: u32,
    pub totals_marker_row: u32,
}
impl TemplateRegion {
    pub fn from_scan(header: HeaderMatch, marker: MarkerMatch) -> Self {
        let totals_marker_row = marker.row.max(header.data_start_row);
        Self {
            header_row: header.header_row,
            data_start_row: header.data_start_row,
            template_row_count: totals_marker_row - header.data_start_row,
            totals_marker_row,
        }
    }
    pub const fn template_last_row(&self) -> Option<u32> {
        if self.template_row_count == 0 {
            None
        } else {
            Some(self.data_start_row + self.template_row_count - 1)
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    Insert,
    Delete,
    None,
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDelta {
    pub direction: ResizeDirection,
    pub row_count: u32,
    pub anchor_row: u32,
}
impl ResizeDelta {
    pub fn compute(region: &TemplateRegion, records: u32) -> Self {
        let template = region.template_row_count;
        match records.cmp(&template) {
            std::cmp::Ordering::Greater => Self {
                direction: ResizeDirection::Insert,
                row_count: records - template,
                anchor_row: region.data_start_row + template,
            },
            std::cmp::Ordering::Less => Self {
                direction: ResizeDirection::Delete,
                row_count: template - records,
                anchor_row: region.data_start_row + records,
            },
            std::cmp::Ordering::Equal => Self {
                direction: ResizeDirection::None,
                row_count: 0,
                anchor_row: region.totals_marker_row,
            },
        }
    }
    pub fn signed(&self) -> i64 {
        match self.direction {
            ResizeDirection::Insert => i64::from(self.row_count),
            ResizeDirection::Delete => -i64::from(self.row_count),
            ResizeDirection::None => 0,
        }
    }
}
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    pub region: TemplateRegion,
    pub delta: ResizeDelta,
    pub record_count: u32,
    pub totals_row: u32,
    pub print_area: Option<CellRange>,
    pub warnings: Vec<Warning>,
}
impl ResizeOutcome {
    pub const fn data_end_row(&self) -> Option<u32> {
        if self.record_count == 0 {
            None
        } else {
            Some(self.region.data_start_row + self.record_count - 1)
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionResizer {
    pub last_col: u32,
}
impl RegionResizer {
    pub const fn new(last_col: u32) -> Self {
        Self { last_col }
    }
    pub fn apply(
        &self,
        sheet: &mut dyn SheetAccess,
        region: TemplateRegion,
        records: usize,
    ) -> Result<ResizeOutcome> {
        let record_count = u32::try_from(records)
            .map_err(|_| FillError::RecordSet(format!("레코드 수가 너무 많습니다: {records}")))?;
        let delta = ResizeDelta::compute(&region, record_count);
        let mut warnings = Vec::new();
        let print_area = if delta.direction == ResizeDirection::None {
            None
        } else {
            sheet.print_area()?
        };
        debug!(
            "영역 조정: 시작 {}행, 템플릿 {}행 -> 레코드 {record_count}건 ({:?} {}행 @ {})",
            region.data_start_row,
            region.template_row_count,
            delta.direction,
            delta.row_count,
            delta.anchor_row
        );
        match delta.direction {
            ResizeDirection::None => {}
            ResizeDirection::Delete => {
                sheet.delete_rows(delta.anchor_row, delta.row_count)?;
                self.border(sheet, region.header_row, BorderStyle::Thin, &mut warnings)?;
                if record_count > 0 {
                    let last = region.data_start_row + record_count - 1;
                    self.border(sheet, last, BorderStyle::Thin, &mut warnings)?;
                }
            }
            ResizeDirection::Insert => {
                let style_source = region.template_last_row();
                if let Some(original_last) = style_source {
                    self.border(sheet, original_last, BorderStyle::None, &mut warnings)?;
                }
                sheet.insert_rows(delta.anchor_row, delta.row_count)?;
                if let Some(src) = style_source {
                    for dst in delta.anchor_row..delta.anchor_row + delta.row_count {
                        sheet.copy_row_style(src, dst)?;
                    }
                } else {
                    self.border(sheet, region.header_row, BorderStyle::Thin, &mut warnings)?;
                }
                let last = region.data_start_row + record_count - 1;
                self.border(sheet, last, BorderStyle::Thin, &mut warnings)?;
            }
        }
        Ok(ResizeOutcome {
            region,
            delta,
            record_count,
            totals_row: region.data_start_row + record_count,
            print_area,
            warnings,
        })
    }
    fn border(
        &self,
        sheet: &mut dyn SheetAccess,
        row: u32,
        style: BorderStyle,
        warnings: &mut Vec<Warning>,
    ) -> Result<()> {
        if row == 0 {
            return Ok(());
        }
        let span = CellRange::row_span(row, 1, self.last_col.max(1));
        match sheet.set_border(span, BorderEdge::Bottom, style) {
            Ok(()) => Ok(()),
            Err(e) if e.is_engine_failure() => Err(e),
            Err(e) => {
                warn!("{row}행 하단 테두리 복원 실패: {e}");
                warnings.push(Warning::BorderRepair {
                    row,
                    reason: e.to_string(),
                });
                Ok(())
            }
        }
    }
}

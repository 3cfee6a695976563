use crate::{
    document::DocumentKind,
    resize::{ResizeDelta, TemplateRegion},
    sheet::counting::RoundTrips,
};
use std::{fmt, path::PathBuf};
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    HeaderNotFound { fallback_row: u32 },
    TotalsMarkerNotFound { assumed_row: u32 },
    LabelNotFound {
        label: &'static str,
        assumed_row: u32,
    },
    FieldCoercion {
        item: usize,
        field: &'static str,
        raw: String,
        fallback: String,
    },
    BorderRepair { row: u32, reason: String },
    History { reason: String },
}
impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderNotFound { fallback_row } => {
                write!(f, "헤더 라벨을 찾지 못해 기본 시작행 {fallback_row}을 사용했습니다.")
            }
            Self::TotalsMarkerNotFound { assumed_row } => {
                write!(f, "합계 표식을 찾지 못해 {assumed_row}행을 합계 행으로 가정했습니다.")
            }
            Self::LabelNotFound { label, assumed_row } => {
                write!(f, "'{label}' 라벨을 찾지 못해 {assumed_row}행에 기록했습니다.")
            }
            Self::FieldCoercion {
                item,
                field,
                raw,
                fallback,
            } => write!(
                f,
                "{item}번째 아이템 {field} 값 '{raw}' 변환 실패 -> 기본값 {fallback} 사용"
            ),
            Self::BorderRepair { row, reason } => {
                write!(f, "{row}행 테두리 복원 실패: {reason}")
            }
            Self::History { reason } => write!(f, "이력 기록 실패: {reason}"),
        }
    }
}
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output: PathBuf,
    pub kind: DocumentKind,
    pub region: TemplateRegion,
    pub delta: ResizeDelta,
    pub records: usize,
    pub warnings: Vec<Warning>,
    pub round_trips: RoundTrips,
}
impl GenerationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

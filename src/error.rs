use std::{io, path::PathBuf};
use thiserror::Error;
#[derive(Debug, Error)]
pub enum FillError {
    #[error("템플릿 파일을 찾을 수 없습니다: {}", .0.display())]
    TemplateMissing(PathBuf),
    #[error("템플릿에서 시트를 찾을 수 없습니다: {0}")]
    SheetMissing(String),
    #[error("스프레드시트 엔진을 사용할 수 없습니다: {0}")]
    EngineUnavailable(String),
    #[error("출력 경로가 허용된 폴더를 벗어납니다: {} (허용 폴더: {})", path.display(), allowed.display())]
    OutputPathInvalid { path: PathBuf, allowed: PathBuf },
    #[error("잘못된 셀 참조: {0}")]
    InvalidReference(String),
    #[error("레코드 데이터 오류: {0}")]
    RecordSet(String),
    #[error("엔진 응답 형식 오류: {0}")]
    Protocol(String),
    #[error("파일 입출력 실패: {0}")]
    Io(#[from] io::Error),
    #[error("JSON 처리 실패: {0}")]
    Json(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, FillError>;
impl FillError {
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::EngineUnavailable(msg.into())
    }
    pub const fn is_engine_failure(&self) -> bool {
        matches!(self, Self::EngineUnavailable(_) | Self::Protocol(_))
    }
}

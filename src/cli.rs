use crate::{
    config::{EngineKind, Settings},
    document::DocumentKind,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
const ENV_HELP: &str = "환경 변수(선택):
  TPLFILL_HEADER_SCAN_ROWS
  TPLFILL_HEADER_SCAN_COLS
  TPLFILL_FALLBACK_DATA_ROW
  TPLFILL_VAT_RATE
  TPLFILL_OUTPUT_DIR
  TPLFILL_TEMPLATE_DIR
  TPLFILL_HISTORY_FILE
  RUST_LOG";
#[derive(Debug, Parser)]
#[command(
    name = "tplfill",
    version,
    about = "발주서/거래명세표/인보이스 템플릿 자동 작성 (아이템 수에 맞춰 행 조정)",
    after_help = ENV_HELP
)]
pub struct Cli {
    /// 디버그 로그 출력
    #[arg(long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 레코드 파일로 문서 한 건 생성
    Generate(GenerateArgs),
    /// 표준 입출력으로 엔진 프로토콜 제공 (로컬 엔진 사용)
    Serve,
}
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[arg(long, value_enum)]
    pub kind: DocumentKind,
    /// {"primary": {...}, "items": [...]} 형식의 JSON
    #[arg(long, value_name = "FILE")]
    pub records: PathBuf,
    /// 기본: <템플릿 폴더>/<문서별 템플릿 파일>
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// 해외 건으로 처리 (부가세 0)
    #[arg(long)]
    pub export: bool,
    #[arg(long, value_enum)]
    pub engine: Option<EngineKind>,
    #[arg(long, value_name = "PROG", required_if_eq("engine", "remote"))]
    pub engine_command: Option<PathBuf>,
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,
    /// 이력 파일 기록 안 함
    #[arg(long)]
    pub no_history: bool,
}
impl GenerateArgs {
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            if settings.history_file == settings.output_dir.join("history.jsonl") {
                settings.history_file = dir.join("history.jsonl");
            }
            settings.output_dir.clone_from(dir);
        }
        if let Some(engine) = self.engine {
            settings.engine = engine;
        }
    }
    pub fn template_path(&self, settings: &Settings, file_name: &str) -> PathBuf {
        self.template
            .clone()
            .unwrap_or_else(|| settings.template_dir.join(file_name))
    }
}

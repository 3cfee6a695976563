use chrono::Local;
use clap::Parser;
use log::error;
use std::{io, process::ExitCode};
use tplfill::{
    cli::{Cli, Command, GenerateArgs},
    config::{EngineKind, Settings},
    document::{
        generator::{GenerationRequest, Generator},
        layouts::DocumentLayout,
    },
    error::{FillError, Result},
    history::{HistorySink, JsonlHistory, NoHistory},
    logging,
    path_policy::{discard_output, output_file_name, reserve_output},
    record::RecordSet,
    report::GenerationReport,
    sheet::{
        SheetEngine,
        local::LocalEngine,
        remote::{self, RemoteEngine},
    },
    summary::print_summary,
};
fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let outcome = match cli.command {
        Command::Generate(args) => run_generate(&args).map(|report| print_summary(&report)),
        Command::Serve => remote::serve(&LocalEngine, io::stdin().lock(), io::stdout().lock()),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("실패: {e}");
            ExitCode::FAILURE
        }
    }
}
fn run_generate(args: &GenerateArgs) -> Result<GenerationReport> {
    let mut settings = Settings::from_env();
    args.apply_to(&mut settings);
    let records = RecordSet::load(&args.records)?;
    let layout = DocumentLayout::of(args.kind);
    let template = args.template_path(&settings, layout.template_file);
    let today = Local::now().date_naive();
    let file_name = output_file_name(
        args.kind,
        &records.primary.text("order_no"),
        &records.primary.text("customer_name"),
        today,
    );
    let output = reserve_output(&settings.output_dir, &file_name)?;
    let mut request = GenerationRequest::new(
        args.kind,
        template,
        output.clone(),
        settings.output_dir.clone(),
    );
    request.export = args.export;
    request.today = today;
    let history: Box<dyn HistorySink> = if args.no_history {
        Box::new(NoHistory)
    } else {
        Box::new(JsonlHistory::new(settings.history_file.clone()))
    };
    let result = match settings.engine {
        EngineKind::Local => {
            generate_with(&LocalEngine, &settings, history.as_ref(), &request, &records)
        }
        EngineKind::Remote => {
            let Some(program) = args.engine_command.clone() else {
                discard_output(&output);
                return Err(FillError::engine("--engine remote 에는 --engine-command 가 필요합니다."));
            };
            let engine = RemoteEngine::new(program, args.engine_args.clone());
            generate_with(&engine, &settings, history.as_ref(), &request, &records)
        }
    };
    if result.is_err() {
        discard_output(&output);
    }
    result
}
fn generate_with<E: SheetEngine>(
    engine: &E,
    settings: &Settings,
    history: &dyn HistorySink,
    request: &GenerationRequest,
    records: &RecordSet,
) -> Result<GenerationReport> {
    Generator::new(engine, settings, history).generate(request, records)
}

use env_logger::{Builder, Env};
use std::io::Write;
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    if verbose {
        builder.format_timestamp_secs().format_target(true);
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    if let Err(e) = builder.try_init() {
        eprintln!("로그 초기화 실패: {e}");
    }
}

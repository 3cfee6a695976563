use clap::ValueEnum;
use std::{env, path::PathBuf};
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EngineKind {
    #[default]
    Local,
    Remote,
}
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub header_scan_rows: u32,
    pub header_scan_cols: u32,
    pub fallback_data_row: Option<u32>,
    pub statement_po_row: u32,
    pub statement_total_row: u32,
    pub vat_rate: f64,
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub history_file: PathBuf,
    pub engine: EngineKind,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            header_scan_rows: 30,
            header_scan_cols: 9,
            fallback_data_row: None,
            statement_po_row: 23,
            statement_total_row: 25,
            vat_rate: 0.1,
            output_dir: PathBuf::from("generated"),
            template_dir: PathBuf::from("templates"),
            history_file: PathBuf::from("generated").join("history.jsonl"),
            engine: EngineKind::Local,
        }
    }
}
impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(rows) = positive_u32(lookup("TPLFILL_HEADER_SCAN_ROWS")) {
            settings.header_scan_rows = rows.min(1_000);
        }
        if let Some(cols) = positive_u32(lookup("TPLFILL_HEADER_SCAN_COLS")) {
            settings.header_scan_cols = cols.min(200);
        }
        settings.fallback_data_row =
            positive_u32(lookup("TPLFILL_FALLBACK_DATA_ROW")).map(|row| row.min(10_000));
        if let Some(rate) = lookup("TPLFILL_VAT_RATE")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
        {
            settings.vat_rate = rate;
        }
        if let Some(dir) = non_empty(lookup("TPLFILL_OUTPUT_DIR")) {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty(lookup("TPLFILL_TEMPLATE_DIR")) {
            settings.template_dir = PathBuf::from(dir);
        }
        settings.history_file = non_empty(lookup("TPLFILL_HISTORY_FILE"))
            .map_or_else(|| settings.output_dir.join("history.jsonl"), PathBuf::from);
        settings
    }
}
fn positive_u32(raw: Option<String>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}
#[cfg(test)]
mod tests {
    use super::Settings;
    use std::{collections::HashMap, path::PathBuf};
    fn settings_with(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }
    #[test]
    fn scan_window_is_clamped_and_zero_ignored() {
        let s = settings_with(&[
            ("TPLFILL_HEADER_SCAN_ROWS", "999999"),
            ("TPLFILL_HEADER_SCAN_COLS", "0"),
        ]);
        assert_eq!(s.header_scan_rows, 1_000);
        assert_eq!(s.header_scan_cols, 9);
    }
    #[test]
    fn invalid_vat_rate_keeps_default() {
        assert!((settings_with(&[("TPLFILL_VAT_RATE", "abc")]).vat_rate - 0.1).abs() < f64::EPSILON);
        assert!((settings_with(&[("TPLFILL_VAT_RATE", "2.5")]).vat_rate - 0.1).abs() < f64::EPSILON);
        assert!((settings_with(&[("TPLFILL_VAT_RATE", "0.08")]).vat_rate - 0.08).abs() < f64::EPSILON);
    }
    #[test]
    fn history_file_follows_output_dir_unless_set() {
        let s = settings_with(&[("TPLFILL_OUTPUT_DIR", "out")]);
        assert_eq!(s.history_file, PathBuf::from("out").join("history.jsonl"));
        let s = settings_with(&[
            ("TPLFILL_OUTPUT_DIR", "out"),
            ("TPLFILL_HISTORY_FILE", "/var/log/tplfill.jsonl"),
        ]);
        assert_eq!(s.history_file, PathBuf::from("/var/log/tplfill.jsonl"));
    }
}

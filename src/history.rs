use crate::{
    document::DocumentKind,
    error::{FillError, Result},
    record::RecordSet,
};
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};
pub trait HistorySink {
    fn record(&self, entry: &HistoryEntry) -> Result<()>;
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub created_at: String,
    pub kind: DocumentKind,
    pub order_no: String,
    pub customer_po: String,
    pub customer_name: String,
    pub item_name: String,
    pub item_count: usize,
    pub output: PathBuf,
    pub sheet_type: String,
}
impl HistoryEntry {
    pub fn new(kind: DocumentKind, records: &RecordSet, output: &Path, now: NaiveDateTime) -> Self {
        let primary = &records.primary;
        Self {
            created_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            kind,
            order_no: primary.text("order_no"),
            customer_po: primary.text("customer_po"),
            customer_name: primary.text("customer_name"),
            item_name: records
                .items()
                .first()
                .map(|r| r.text("item_name"))
                .unwrap_or_default(),
            item_count: records.len(),
            output: output.to_path_buf(),
            sheet_type: primary.text("sheet_type"),
        }
    }
}
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    path: PathBuf,
}
impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            out.push(serde_json::from_str(&line)?);
        }
        Ok(out)
    }
}
impl HistorySink for JsonlHistory {
    fn record(&self, entry: &HistoryEntry) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                FillError::Io(std::io::Error::new(
                    e.kind(),
                    format!("이력 파일 열기 실패: {} ({e})", self.path.display()),
                ))
            })?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        info!("이력 저장 완료: {}", self.path.display());
        Ok(())
    }
}
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;
impl HistorySink for NoHistory {
    fn record(&self, _entry: &HistoryEntry) -> Result<()> {
        Ok(())
    }
}

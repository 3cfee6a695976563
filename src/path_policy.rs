use crate::{
    document::DocumentKind,
    error::{FillError, Result},
};
use chrono::NaiveDate;
use log::debug;
use std::{
    env, fs,
    io::{self, ErrorKind, Write},
    path::{Component, Path, PathBuf},
    time::Duration,
};
const RESERVATION_MAGIC: &[u8] = b"TPLFILL_RESERVED_v1\n";
const STALE_RESERVATION_AGE: Duration = Duration::from_secs(60 * 60);
const MAX_CONFLICT_ATTEMPTS: u32 = 100_000;
fn io_err(msg: String) -> FillError {
    FillError::Io(io::Error::other(msg))
}
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|ch| {
            if ch.is_control() || matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                ch
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        "_".to_owned()
    } else {
        trimmed.to_owned()
    }
}
pub fn output_file_name(kind: DocumentKind, order: &str, customer: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}_{}.xlsx",
        kind.prefix(),
        sanitize_component(order),
        sanitize_component(customer),
        date.format("%y%m%d")
    )
}
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str());
            }
        }
    }
    out
}
fn resolve(path: &Path) -> Result<PathBuf> {
    let normal = normalize(&absolute(path)?);
    if let Ok(real) = fs::canonicalize(&normal) {
        return Ok(real);
    }
    match (normal.parent(), normal.file_name()) {
        (Some(parent), Some(name)) => Ok(fs::canonicalize(parent)
            .map_or_else(|_| normal.clone(), |real| real.join(name))),
        _ => Ok(normal),
    }
}
pub fn ensure_within(allowed_dir: &Path, candidate: &Path) -> Result<PathBuf> {
    let allowed = resolve(allowed_dir)?;
    let target = resolve(candidate)?;
    if target != allowed && target.starts_with(&allowed) {
        return Ok(target);
    }
    Err(FillError::OutputPathInvalid {
        path: candidate.to_path_buf(),
        allowed: allowed_dir.to_path_buf(),
    })
}
pub fn reserve_output(allowed_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(allowed_dir).map_err(|e| {
        io_err(format!("출력 폴더 생성 실패: {} ({e})", allowed_dir.display()))
    })?;
    let requested = ensure_within(allowed_dir, &allowed_dir.join(file_name))?;
    let reserved = reserve_nonconflicting_path(&requested)?;
    ensure_within(allowed_dir, &reserved)
}
pub fn discard_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("출력 파일 정리: {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => log::warn!("출력 파일 정리 실패: {} ({e})", path.display()),
    }
}
pub fn is_reservation(path: &Path) -> bool {
    fs::read(path).is_ok_and(|content| content == RESERVATION_MAGIC)
}
fn reserve_nonconflicting_path(path: &Path) -> Result<PathBuf> {
    let mut seq = 0u32;
    loop {
        let candidate = candidate_with_suffix(path, seq);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut file) => {
                if let Err(e) = file
                    .write_all(RESERVATION_MAGIC)
                    .and_then(|()| file.flush())
                    .and_then(|()| file.sync_all())
                {
                    drop(file);
                    let _ = fs::remove_file(&candidate);
                    return Err(io_err(format!(
                        "출력 파일 예약 마커 기록 실패: {} ({e})",
                        candidate.display()
                    )));
                }
                debug!("출력 경로 예약: {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if try_remove_stale_reservation(&candidate) {
                    continue;
                }
                seq = seq.checked_add(1).ok_or_else(|| {
                    io_err(format!(
                        "출력 파일 예약 시퀀스 계산 overflow: {}",
                        path.display()
                    ))
                })?;
                if seq > MAX_CONFLICT_ATTEMPTS {
                    return Err(io_err(format!(
                        "출력 파일 예약 충돌이 너무 많아 경로를 확정할 수 없습니다: {}",
                        path.display()
                    )));
                }
            }
            Err(e) => {
                return Err(io_err(format!(
                    "출력 파일 예약 실패: {} ({e})",
                    candidate.display()
                )));
            }
        }
    }
}
fn try_remove_stale_reservation(path: &Path) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    let Ok(elapsed) = meta.modified().map(|m| m.elapsed()) else {
        return false;
    };
    if elapsed.map_or(true, |age| age < STALE_RESERVATION_AGE) {
        return false;
    }
    is_reservation(path) && fs::remove_file(path).is_ok()
}
fn candidate_with_suffix(path: &Path, seq: u32) -> PathBuf {
    if seq == 0 {
        return path.to_path_buf();
    }
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = path.extension().and_then(|s| s.to_str());
    let file_name = ext.map_or_else(
        || format!("{stem}_{seq}"),
        |ext| format!("{stem}_{seq}.{ext}"),
    );
    parent.join(file_name)
}

use super::{
    BorderEdge, BorderStyle, CellValue,
    address::{CellRange, CellRef},
};
use crate::error::{FillError, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    io::{ErrorKind, Read, Write},
    path::PathBuf,
};
pub const PROTOCOL_VERSION: u32 = 1;
const MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Open {
        version: u32,
        template: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sheet: Option<String>,
    },
    GetCell {
        cell: CellRef,
    },
    GetRange {
        range: CellRange,
    },
    SetRange {
        range: CellRange,
        values: Vec<Vec<CellValue>>,
    },
    InsertRows {
        at: u32,
        count: u32,
    },
    DeleteRows {
        at: u32,
        count: u32,
    },
    CopyRowStyle {
        src: u32,
        dst: u32,
    },
    SetBorder {
        range: CellRange,
        edge: BorderEdge,
        style: BorderStyle,
    },
    SetFormula {
        cell: CellRef,
        expr: String,
    },
    GetPrintArea,
    SetPrintArea {
        range: CellRange,
    },
    SaveAs {
        path: PathBuf,
    },
    Close,
}
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Vec<CellValue>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<CellRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shifts_references: Option<bool>,
}
impl Response {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
            rev: Some(PROTOCOL_VERSION),
            ..Self::default()
        }
    }
    pub fn failed(error: &FillError) -> Self {
        Self {
            status: "error".to_owned(),
            rev: Some(PROTOCOL_VERSION),
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    let payload = serde_json::to_vec(message)?;
    let length = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len <= MAX_FRAME_BYTES)
        .ok_or_else(|| FillError::Protocol(format!("프레임이 너무 큽니다: {} bytes", payload.len())))?;
    writer.write_all(&length.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<Option<T>> {
    let mut length_buf = [0u8; 4];
    match reader.read_exact(&mut length_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let length = u32::from_le_bytes(length_buf);
    if length > MAX_FRAME_BYTES {
        return Err(FillError::Protocol(format!("프레임 길이가 비정상입니다: {length}")));
    }
    let mut payload = vec![0u8; usize::try_from(length).unwrap_or(0)];
    reader.read_exact(&mut payload)?;
    Ok(Some(serde_json::from_slice(&payload)?))
}

use super::{
    BorderEdge, BorderStyle, CellValue, SheetAccess, SheetEngine, SheetSelector,
    address::{CellRange, CellRef},
    protocol::{PROTOCOL_VERSION, Request, Response, read_frame, write_frame},
};
use crate::error::{FillError, Result};
use log::{debug, warn};
use std::{
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    program: PathBuf,
    args: Vec<String>,
}
impl RemoteEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}
impl SheetEngine for RemoteEngine {
    type Sheet = RemoteSheet<ChildStdout, ChildStdin>;
    fn open(&self, template: &Path, selector: &SheetSelector) -> Result<Self::Sheet> {
        debug!("엔진 프로세스 시작: {} {:?}", self.program.display(), self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                FillError::engine(format!("엔진 실행 실패: {} ({e})", self.program.display()))
            })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(FillError::engine("엔진 표준 입출력을 연결하지 못했습니다."));
        };
        let mut sheet = RemoteSheet::new(stdout, stdin, Some(child));
        sheet.open(template, selector)?;
        Ok(sheet)
    }
}
pub struct RemoteSheet<R: Read, W: Write> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
    child: Option<Child>,
    shifts_references: bool,
    closed: bool,
}
impl<R: Read, W: Write> RemoteSheet<R, W> {
    pub fn new(reader: R, writer: W, child: Option<Child>) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            child,
            shifts_references: true,
            closed: false,
        }
    }
    pub fn open(&mut self, template: &Path, selector: &SheetSelector) -> Result<()> {
        let resp = self.call(&Request::Open {
            version: PROTOCOL_VERSION,
            template: template.to_path_buf(),
            sheet: selector.name().map(ToOwned::to_owned),
        })?;
        self.shifts_references = resp.shifts_references.unwrap_or(true);
        Ok(())
    }
    fn call(&mut self, request: &Request) -> Result<Response> {
        if self.closed {
            return Err(FillError::engine("이미 닫힌 엔진 세션입니다."));
        }
        write_frame(&mut self.writer, request).map_err(|e| match e {
            FillError::Io(io) => FillError::engine(format!("엔진 요청 전송 실패: {io}")),
            other => other,
        })?;
        let resp: Response = read_frame(&mut self.reader)
            .map_err(|e| match e {
                FillError::Io(io) => FillError::engine(format!("엔진 응답 수신 실패: {io}")),
                other => other,
            })?
            .ok_or_else(|| FillError::engine("엔진 프로세스가 응답 없이 종료되었습니다."))?;
        if let Some(rev) = resp.rev
            && rev != PROTOCOL_VERSION
        {
            warn!("엔진 프로토콜 버전 불일치: 기대 {PROTOCOL_VERSION}, 수신 {rev}");
        }
        if !resp.is_ok() {
            return Err(FillError::engine(
                resp.error.unwrap_or_else(|| format!("알 수 없는 엔진 상태: {}", resp.status)),
            ));
        }
        Ok(resp)
    }
    fn reap_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}
impl<R: Read, W: Write> SheetAccess for RemoteSheet<R, W> {
    fn get_cell(&mut self, cell: CellRef) -> Result<CellValue> {
        let resp = self.call(&Request::GetCell { cell })?;
        Ok(resp
            .values
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.into_iter().next())
            .unwrap_or_default())
    }
    fn get_range(&mut self, range: CellRange) -> Result<Vec<Vec<CellValue>>> {
        let resp = self.call(&Request::GetRange { range })?;
        let values = resp
            .values
            .ok_or_else(|| FillError::Protocol(format!("{range} 읽기 응답에 값이 없습니다.")))?;
        super::check_block(range, &values)
            .map_err(|e| FillError::Protocol(e.to_string()))?;
        Ok(values)
    }
    fn set_range(&mut self, range: CellRange, values: &[Vec<CellValue>]) -> Result<()> {
        super::check_block(range, values)?;
        self.call(&Request::SetRange {
            range,
            values: values.to_vec(),
        })
        .map(drop)
    }
    fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.call(&Request::InsertRows { at, count }).map(drop)
    }
    fn delete_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.call(&Request::DeleteRows { at, count }).map(drop)
    }
    fn copy_row_style(&mut self, src: u32, dst: u32) -> Result<()> {
        self.call(&Request::CopyRowStyle { src, dst }).map(drop)
    }
    fn set_border(&mut self, range: CellRange, edge: BorderEdge, style: BorderStyle) -> Result<()> {
        self.call(&Request::SetBorder { range, edge, style }).map(drop)
    }
    fn set_formula(&mut self, cell: CellRef, expr: &str) -> Result<()> {
        self.call(&Request::SetFormula {
            cell,
            expr: expr.to_owned(),
        })
        .map(drop)
    }
    fn print_area(&mut self) -> Result<Option<CellRange>> {
        Ok(self.call(&Request::GetPrintArea)?.range)
    }
    fn set_print_area(&mut self, range: CellRange) -> Result<()> {
        self.call(&Request::SetPrintArea { range }).map(drop)
    }
    fn shifts_references(&self) -> bool {
        self.shifts_references
    }
    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.call(&Request::SaveAs {
            path: path.to_path_buf(),
        })
        .map(drop)
    }
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.call(&Request::Close).map(drop);
        self.closed = true;
        if let Some(mut child) = self.child.take() {
            child
                .wait()
                .map_err(|e| FillError::engine(format!("엔진 종료 대기 실패: {e}")))?;
        }
        result
    }
}
impl<R: Read, W: Write> Drop for RemoteSheet<R, W> {
    fn drop(&mut self) {
        if self.child.is_some() {
            warn!("닫히지 않은 엔진 프로세스를 종료합니다.");
            self.reap_child();
        }
    }
}
pub fn serve<E: SheetEngine, R: Read, W: Write>(engine: &E, reader: R, writer: W) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(writer);
    let mut sheet: Option<E::Sheet> = None;
    while let Some(request) = read_frame::<_, Request>(&mut reader)? {
        let done = matches!(request, Request::Close);
        let response = handle(engine, &mut sheet, request).unwrap_or_else(|e| {
            debug!("요청 처리 실패: {e}");
            Response::failed(&e)
        });
        write_frame(&mut writer, &response)?;
        if done {
            break;
        }
    }
    if let Some(mut open) = sheet.take() {
        open.close()?;
    }
    Ok(())
}
fn handle<E: SheetEngine>(
    engine: &E,
    slot: &mut Option<E::Sheet>,
    request: Request,
) -> Result<Response> {
    if let Request::Open {
        version,
        template,
        sheet,
    } = request
    {
        if version != PROTOCOL_VERSION {
            return Err(FillError::Protocol(format!(
                "지원하지 않는 프로토콜 버전: {version}"
            )));
        }
        let selector = sheet.map_or(SheetSelector::First, SheetSelector::Named);
        let opened = engine.open(&template, &selector)?;
        let mut resp = Response::ok();
        resp.shifts_references = Some(opened.shifts_references());
        *slot = Some(opened);
        return Ok(resp);
    }
    if matches!(request, Request::Close) {
        if let Some(mut open) = slot.take() {
            open.close()?;
        }
        return Ok(Response::ok());
    }
    let sheet = slot
        .as_mut()
        .ok_or_else(|| FillError::Protocol("열린 문서가 없습니다.".to_owned()))?;
    let mut resp = Response::ok();
    match request {
        Request::GetCell { cell } => resp.values = Some(vec![vec![sheet.get_cell(cell)?]]),
        Request::GetRange { range } => resp.values = Some(sheet.get_range(range)?),
        Request::SetRange { range, values } => sheet.set_range(range, &values)?,
        Request::InsertRows { at, count } => sheet.insert_rows(at, count)?,
        Request::DeleteRows { at, count } => sheet.delete_rows(at, count)?,
        Request::CopyRowStyle { src, dst } => sheet.copy_row_style(src, dst)?,
        Request::SetBorder { range, edge, style } => sheet.set_border(range, edge, style)?,
        Request::SetFormula { cell, expr } => sheet.set_formula(cell, &expr)?,
        Request::GetPrintArea => resp.range = sheet.print_area()?,
        Request::SetPrintArea { range } => sheet.set_print_area(range)?,
        Request::SaveAs { path } => sheet.save_as(&path)?,
        Request::Open { .. } | Request::Close => {}
    }
    Ok(resp)
}

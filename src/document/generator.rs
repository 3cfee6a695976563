use super::{
    DocumentKind,
    layouts::{DocumentLayout, TotalsStyle, currency},
};
use crate::{
    batch::{BatchWriter, DocumentContext, text_cell},
    config::Settings,
    error::{FillError, Result},
    history::{HistoryEntry, HistorySink},
    locate::find_text_in_column,
    numeric::{round_f64_to_i64, value_number},
    path_policy::ensure_within,
    record::{Record, RecordSet},
    repair::{
        TaxPolicy, repair_print_area, rewrite_sum_totals, shift_trailing_formulas,
        write_tax_and_grand_total,
    },
    report::{GenerationReport, Warning},
    resize::{RegionResizer, ResizeOutcome, TemplateRegion},
    sheet::{
        CellValue, SheetAccess, SheetEngine, SheetSelector,
        address::CellRef,
        counting::{CountingSheet, RoundTrips},
    },
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use std::{
    fmt,
    path::{Path, PathBuf},
};
const STATEMENT_LABEL_WINDOW: u32 = 40;
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Open,
    HeaderFilled,
    Resized,
    Populated,
    TotalsRepaired,
    Saved,
}
impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "열기",
            Self::HeaderFilled => "헤더 기록",
            Self::Resized => "영역 조정",
            Self::Populated => "아이템 기록",
            Self::TotalsRepaired => "합계 복원",
            Self::Saved => "저장",
        };
        f.write_str(name)
    }
}
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: DocumentKind,
    pub template: PathBuf,
    pub output: PathBuf,
    pub output_dir: PathBuf,
    pub export: bool,
    pub today: NaiveDate,
}
impl GenerationRequest {
    pub fn new(kind: DocumentKind, template: PathBuf, output: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            kind,
            template,
            output,
            output_dir,
            export: false,
            today: Local::now().date_naive(),
        }
    }
}
struct Session<S: SheetAccess> {
    sheet: CountingSheet<S>,
    stage: Stage,
    closed: bool,
}
impl<S: SheetAccess> Session<S> {
    fn new(sheet: S) -> Self {
        Self {
            sheet: CountingSheet::new(sheet),
            stage: Stage::Open,
            closed: false,
        }
    }
    fn advance(&mut self, next: Stage) {
        debug!("{} -> {next}", self.stage);
        self.stage = next;
    }
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sheet.close()
    }
}
impl<S: SheetAccess> Drop for Session<S> {
    fn drop(&mut self) {
        if !self.closed {
            warn!("{} 단계에서 중단되어 문서를 닫습니다.", self.stage);
            if let Err(e) = self.close() {
                warn!("문서 닫기 실패: {e}");
            }
        }
    }
}
pub struct Generator<'a, E: SheetEngine> {
    engine: &'a E,
    settings: &'a Settings,
    history: &'a dyn HistorySink,
}
impl<'a, E: SheetEngine> Generator<'a, E> {
    pub const fn new(engine: &'a E, settings: &'a Settings, history: &'a dyn HistorySink) -> Self {
        Self {
            engine,
            settings,
            history,
        }
    }
    pub fn generate(&self, request: &GenerationRequest, records: &RecordSet) -> Result<GenerationReport> {
        records.validate()?;
        let output = ensure_within(&request.output_dir, &request.output)?;
        let layout = DocumentLayout::of(request.kind);
        info!(
            "{} 생성 시작: {} ({}건)",
            request.kind,
            request.template.display(),
            records.len()
        );
        let sheet = self.engine.open(&request.template, &SheetSelector::First)?;
        let mut session = Session::new(sheet);
        let mut warnings = Vec::new();
        for (cell, value) in layout.header_cells(&records.primary, request.today) {
            session.sheet.set_cell(cell, value)?;
        }
        session.advance(Stage::HeaderFilled);
        let outcome = self.resize(&mut session.sheet, layout, records.len(), &mut warnings)?;
        session.advance(Stage::Resized);
        let doc = DocumentContext::new(&records.primary, request.today, self.settings.vat_rate);
        let coercions = BatchWriter::new(&layout.columns, doc).write(
            &mut session.sheet,
            records.items(),
            outcome.region.data_start_row,
        )?;
        warnings.extend(coercions);
        session.advance(Stage::Populated);
        self.repair_totals(&mut session.sheet, layout, request, records, &outcome, &mut warnings)?;
        for (cell, value) in layout.footer_cells(&records.primary, outcome.totals_row) {
            session.sheet.set_cell(cell, value)?;
        }
        session.advance(Stage::TotalsRepaired);
        save_via_temp(&mut session.sheet, &request.output_dir, &output)?;
        session.advance(Stage::Saved);
        let round_trips = session.sheet.counts();
        if let Err(e) = session.close() {
            warn!("저장 후 문서 닫기 실패: {e}");
        }
        info!("{} 저장 완료: {}", request.kind, output.display());
        let entry = HistoryEntry::new(request.kind, records, &output, now());
        if let Err(e) = self.history.record(&entry) {
            warn!("이력 기록 실패 (문서는 저장됨): {e}");
            warnings.push(Warning::History {
                reason: e.to_string(),
            });
        }
        Ok(GenerationReport {
            output,
            kind: request.kind,
            region: outcome.region,
            delta: outcome.delta,
            records: records.len(),
            warnings,
            round_trips,
        })
    }
    fn resize(
        &self,
        sheet: &mut dyn SheetAccess,
        layout: &DocumentLayout,
        records: usize,
        warnings: &mut Vec<Warning>,
    ) -> Result<ResizeOutcome> {
        let header = layout
            .locator(
                self.settings.header_scan_rows,
                self.settings.header_scan_cols,
                self.settings.fallback_data_row,
            )
            .locate(sheet)?;
        if header.fallback {
            warnings.push(Warning::HeaderNotFound {
                fallback_row: header.data_start_row,
            });
        }
        let marker = layout.marker.find(sheet, header.data_start_row)?;
        if marker.fallback {
            warnings.push(Warning::TotalsMarkerNotFound {
                assumed_row: marker.row,
            });
        }
        let region = TemplateRegion::from_scan(header, marker);
        let mut outcome = RegionResizer::new(layout.last_col).apply(sheet, region, records)?;
        warnings.append(&mut outcome.warnings);
        shift_trailing_formulas(sheet, &outcome, layout.last_col)?;
        repair_print_area(sheet, &outcome)?;
        Ok(outcome)
    }
    fn repair_totals(
        &self,
        sheet: &mut dyn SheetAccess,
        layout: &DocumentLayout,
        request: &GenerationRequest,
        records: &RecordSet,
        outcome: &ResizeOutcome,
        warnings: &mut Vec<Warning>,
    ) -> Result<()> {
        let n = records.len();
        rewrite_sum_totals(sheet, outcome, layout.sum_columns)?;
        let t = outcome.totals_row;
        let primary = &records.primary;
        match layout.totals {
            TotalsStyle::TaxedAmount { column } => {
                let policy = if request.export || primary.text("sheet_type").trim() == "해외" {
                    TaxPolicy::Export
                } else {
                    TaxPolicy::Domestic {
                        rate: self.settings.vat_rate,
                    }
                };
                write_tax_and_grand_total(sheet, column, t, policy)?;
            }
            TotalsStyle::Currency { column } => {
                let code = primary.text("currency");
                if !code.trim().is_empty() {
                    sheet.set_cell(CellRef::new(column, t), text_cell(code.trim()))?;
                }
            }
            TotalsStyle::Statement => {
                let extra = u32::try_from(n.saturating_sub(1)).unwrap_or(0);
                let po_row = self.labelled_row(
                    sheet,
                    (1, "PO No"),
                    t,
                    self.settings.statement_po_row + extra,
                    warnings,
                )?;
                sheet.set_cell(CellRef::new(2, po_row), text_cell(&primary.text("customer_po")))?;
                let total_row = self.labelled_row(
                    sheet,
                    (5, "합 계"),
                    t,
                    self.settings.statement_total_row + extra,
                    warnings,
                )?;
                let total = statement_grand_total(records.items(), self.settings.vat_rate);
                sheet.set_cell(CellRef::new(7, total_row), CellValue::Number(total))?;
            }
        }
        debug!("합계 영역 복원 완료 ({}행, 통화 {})", t, currency(primary));
        Ok(())
    }
    fn labelled_row(
        &self,
        sheet: &mut dyn SheetAccess,
        (column, label): (u32, &'static str),
        totals_row: u32,
        fallback: u32,
        warnings: &mut Vec<Warning>,
    ) -> Result<u32> {
        let start = totals_row + 1;
        if let Some(row) =
            find_text_in_column(sheet, column, label, start, start + STATEMENT_LABEL_WINDOW)?
        {
            return Ok(row);
        }
        warn!("'{label}' 라벨을 찾지 못해 {fallback}행에 기록합니다.");
        warnings.push(Warning::LabelNotFound {
            label,
            assumed_row: fallback,
        });
        Ok(fallback)
    }
}
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
#[allow(clippy::cast_precision_loss)]
pub fn statement_grand_total(items: &[Record], vat_rate: f64) -> f64 {
    items
        .iter()
        .map(|item| {
            let qty = item_int(item, "item_qty", 1);
            let price = item_int(item, "sales_unit_price", 0);
            let amount = qty.saturating_mul(price) as f64;
            amount + (amount * vat_rate).floor()
        })
        .sum()
}
fn item_int(item: &Record, key: &str, default: i64) -> i64 {
    item.get(key)
        .and_then(value_number)
        .and_then(round_f64_to_i64)
        .unwrap_or(default)
}
fn save_via_temp(sheet: &mut dyn SheetAccess, dir: &Path, output: &Path) -> Result<()> {
    let temp = tempfile::Builder::new()
        .prefix(".tplfill-")
        .suffix(".xlsx")
        .tempfile_in(dir)?
        .into_temp_path();
    sheet.save_as(&temp)?;
    temp.persist(output).map_err(|e| FillError::Io(e.error))?;
    debug!("임시 파일에서 최종 경로로 이동: {}", output.display());
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::{GenerationRequest, Generator, statement_grand_total};
    use crate::{
        config::Settings,
        document::DocumentKind,
        error::{FillError, Result},
        history::{HistoryEntry, HistorySink, NoHistory},
        path_policy::{is_reservation, reserve_output},
        record::{Record, RecordSet},
        report::Warning,
        sheet::{
            BorderEdge, BorderStyle, CellValue,
            address::{CellRange, CellRef, col_to_name},
            memory::{MemoryEngine, MemorySheet},
        },
    };
    use chrono::NaiveDate;
    use std::path::Path;
    fn at(a1: &str) -> CellRef {
        CellRef::parse(a1).unwrap()
    }
    fn po_template(template_rows: u32) -> MemorySheet {
        let t = 13 + template_rows;
        let mut sheet = MemorySheet::new("Purchase Order")
            .with_text(at("A1"), "Purchase Order - ")
            .with_text(at("A12"), "No.")
            .with_border(CellRange::row_span(12, 1, 10), BorderEdge::Bottom, BorderStyle::Thin)
            .with_text(CellRef::new(9, t), "Total net amount")
            .with_formula(CellRef::new(10, t), &format!("=SUM(J13:J{})", t - 1))
            .with_formula(CellRef::new(10, t + 1), &format!("=J{t}*0.1"))
            .with_formula(CellRef::new(10, t + 2), &format!("=SUM(J{t}:J{})", t + 1))
            .with_print_area(CellRange::new(at("A1"), CellRef::new(10, t + 10)));
        for row in 13..t {
            sheet = sheet
                .with_row_style(row, "item")
                .with_formula(CellRef::new(10, row), &format!("=H{row}*F{row}"));
        }
        sheet.with_border(CellRange::row_span(t - 1, 1, 10), BorderEdge::Bottom, BorderStyle::Thin)
    }
    fn po_records(n: usize) -> RecordSet {
        let items: Vec<Record> = (0..n)
            .map(|i| {
                Record::new()
                    .with("RCK Order no.", "ND-0001")
                    .with("Customer name", "Acme")
                    .with("Item name", format!("IQ{i}"))
                    .with("Item qty", 2)
                    .with("ICO Unit", 1000)
            })
            .collect();
        let primary = items.first().cloned().unwrap_or_default();
        RecordSet::new(primary, items).unwrap()
    }
    fn request(dir: &Path, kind: DocumentKind) -> GenerationRequest {
        let output = reserve_output(dir, "PO_test.xlsx").unwrap();
        let mut req = GenerationRequest::new(kind, dir.join("template.xlsx"), output, dir.to_path_buf());
        req.today = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        req
    }
    #[test]
    fn three_row_template_with_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(po_template(3));
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::PurchaseOrder), &po_records(1))
            .unwrap();
        assert!(!report.has_warnings(), "{:?}", report.warnings);
        assert_eq!(report.region.template_row_count, 3);
        assert_eq!(engine.close_count(), 1);
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("A1")), CellValue::text("Purchase Order - ND-0001"));
        assert_eq!(out.value(at("B13")), CellValue::text("IQ0"));
        assert_eq!(out.value(at("J14")), CellValue::Formula("=SUM(J13:J13)".to_owned()));
        assert_eq!(out.value(at("J15")), CellValue::Formula("=J14*0.1".to_owned()));
        assert_eq!(out.value(at("J16")), CellValue::Formula("=SUM(J14:J15)".to_owned()));
        assert_eq!(out.value(at("I14")), CellValue::text("Total net amount"));
        assert_eq!(out.border(at("A13"), BorderEdge::Bottom), Some(BorderStyle::Thin));
        assert_eq!(out.border(at("A12"), BorderEdge::Bottom), Some(BorderStyle::Thin));
        assert_eq!(out.current_print_area().map(|a| a.end.row), Some(24));
    }
    #[test]
    fn one_row_template_with_five_records() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(po_template(1));
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::PurchaseOrder), &po_records(5))
            .unwrap();
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("J18")), CellValue::Formula("=SUM(J13:J17)".to_owned()));
        assert_eq!(out.value(at("J17")), CellValue::Formula("=H17*F17".to_owned()));
        assert_eq!(out.value(at("A17")), CellValue::Number(5.0));
        assert_eq!(out.row_style(17), Some("item"));
        assert_eq!(report.round_trips.structural(), 1);
        assert_eq!(report.round_trips.copy_row_style, 4);
    }
    #[test]
    fn export_orders_carry_a_literal_zero_tax() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(po_template(1));
        let settings = Settings::default();
        let mut req = request(dir.path(), DocumentKind::PurchaseOrder);
        req.export = true;
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&req, &po_records(2))
            .unwrap();
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("J16")), CellValue::Number(0.0));
    }
    #[test]
    fn engine_failure_closes_session_and_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(po_template(1).failing_on("insert_rows"));
        let settings = Settings::default();
        let req = request(dir.path(), DocumentKind::PurchaseOrder);
        let err = Generator::new(&engine, &settings, &NoHistory)
            .generate(&req, &po_records(3))
            .unwrap_err();
        assert!(err.is_engine_failure(), "{err}");
        assert_eq!(engine.close_count(), 1);
        assert!(is_reservation(&req.output));
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tplfill-"))
            .count();
        assert_eq!(leftovers, 0);
    }
    #[test]
    fn output_outside_the_directory_is_rejected_before_opening() {
        let dir = tempfile::tempdir().unwrap();
        let allowed = dir.path().join("out");
        std::fs::create_dir_all(&allowed).unwrap();
        let engine = MemoryEngine::new(po_template(1));
        let settings = Settings::default();
        let req = GenerationRequest::new(
            DocumentKind::PurchaseOrder,
            dir.path().join("template.xlsx"),
            allowed.join("..").join("escape.xlsx"),
            allowed,
        );
        let err = Generator::new(&engine, &settings, &NoHistory)
            .generate(&req, &po_records(1))
            .unwrap_err();
        assert!(matches!(err, FillError::OutputPathInvalid { .. }), "{err}");
        assert_eq!(engine.close_count(), 0);
    }
    struct BrokenHistory;
    impl HistorySink for BrokenHistory {
        fn record(&self, _entry: &HistoryEntry) -> Result<()> {
            Err(FillError::Io(std::io::Error::other("disk full")))
        }
    }
    #[test]
    fn history_failure_is_only_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(po_template(1));
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &BrokenHistory)
            .generate(&request(dir.path(), DocumentKind::PurchaseOrder), &po_records(1))
            .unwrap();
        assert!(report.output.exists());
        assert!(matches!(report.warnings.as_slice(), [Warning::History { .. }]));
    }
    #[test]
    fn missing_header_falls_back_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let template = po_template(1).with_value(at("A12"), CellValue::Empty);
        let engine = MemoryEngine::new(template);
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::PurchaseOrder), &po_records(1))
            .unwrap();
        assert_eq!(report.region.data_start_row, 13);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::HeaderNotFound { fallback_row: 13 })));
    }
    fn statement_template(template_rows: u32) -> MemorySheet {
        let t = 13 + template_rows;
        let mut sheet = MemorySheet::new("거래명세표")
            .with_text(at("A12"), "월/일")
            .with_text(at("B12"), "품명")
            .with_text(CellRef::new(1, t + 9), "PO No.")
            .with_text(CellRef::new(5, t + 11), "합 계");
        for col in [5, 7, 8] {
            let name = col_to_name(col);
            let sum = format!("=SUM({name}13:{name}{})", t - 1);
            sheet = sheet.with_formula(CellRef::new(col, t), &sum);
        }
        for row in 13..t {
            sheet = sheet.with_row_style(row, "line");
        }
        sheet
    }
    fn statement_records(n: usize) -> RecordSet {
        let items: Vec<Record> = (0..n)
            .map(|_| {
                Record::new()
                    .with("Item name", "Valve")
                    .with("Item qty", 2)
                    .with("Sales Unit Price", 1000)
            })
            .collect();
        let primary = Record::new()
            .with("Customer name", "한빛")
            .with("Customer PO", "HB-77")
            .with("출고일", "2025-03-04");
        RecordSet::new(primary, items).unwrap()
    }
    #[test]
    fn statement_labels_move_with_the_region() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(statement_template(1));
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::AdvanceStatement), &statement_records(3))
            .unwrap();
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("B2")), CellValue::text("DATE : 2025. 03. 04"));
        assert_eq!(out.value(at("A15")), CellValue::text("3/4"));
        assert_eq!(out.value(at("C13")), CellValue::text("선수금"));
        assert_eq!(out.value(at("E16")), CellValue::Formula("=SUM(E13:E15)".to_owned()));
        assert_eq!(out.value(at("H16")), CellValue::Formula("=SUM(H13:H15)".to_owned()));
        assert_eq!(out.value(at("B25")), CellValue::text("HB-77"));
        assert_eq!(out.value(at("G27")), CellValue::Number(6600.0));
        assert!(!report.has_warnings(), "{:?}", report.warnings);
    }
    #[test]
    fn one_line_statement_sums_only_its_own_row() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MemoryEngine::new(statement_template(3));
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::DeliveryStatement), &statement_records(1))
            .unwrap();
        assert!(!report.has_warnings(), "{:?}", report.warnings);
        assert_eq!(report.region.template_row_count, 3);
        assert_eq!(report.delta.row_count, 2);
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("E14")), CellValue::Formula("=SUM(E13:E13)".to_owned()));
        assert_eq!(out.value(at("G14")), CellValue::Formula("=SUM(G13:G13)".to_owned()));
        assert_eq!(out.value(at("H14")), CellValue::Formula("=SUM(H13:H13)".to_owned()));
        assert_eq!(out.value(at("B23")), CellValue::text("HB-77"));
        assert_eq!(out.value(at("G25")), CellValue::Number(2200.0));
    }
    fn invoice_item(i: usize, price_key: &str, price: f64, currency: &str) -> Record {
        Record::new()
            .with("Model", "IQ3")
            .with("Item name", format!("Actuator {i}"))
            .with("Item qty", 2)
            .with(price_key, price)
            .with("Currency", currency)
            .with("Customer name", "Acme")
    }
    #[test]
    fn proforma_invoice_grows_below_its_description_header() {
        let dir = tempfile::tempdir().unwrap();
        let template = MemorySheet::new("Proforma Invoice")
            .with_text(at("F4"), "Invoice No.")
            .with_text(at("F15"), "Customer PO No.")
            .with_text(at("A17"), "No.")
            .with_text(at("B17"), "Description")
            .with_row_style(18, "item")
            .with_formula(at("I18"), "=E18*G18")
            .with_text(at("A19"), "Total")
            .with_formula(at("I19"), "=SUM(I18:I18)")
            .with_print_area(CellRange::parse("A1:I30").unwrap());
        let engine = MemoryEngine::new(template);
        let settings = Settings::default();
        let items: Vec<Record> = (0..3)
            .map(|i| invoice_item(i, "Sales Unit Price", 1500.0, " USD "))
            .collect();
        let records = RecordSet::new(items[0].clone(), items).unwrap();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::ProformaInvoice), &records)
            .unwrap();
        assert!(!report.has_warnings(), "{:?}", report.warnings);
        assert_eq!(report.region.header_row, 17);
        assert_eq!(report.region.template_row_count, 1);
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("A18")), CellValue::text("IQ3 Actuator 0"));
        assert_eq!(out.value(at("A20")), CellValue::text("IQ3 Actuator 2"));
        assert_eq!(out.value(at("E20")), CellValue::Number(2.0));
        assert_eq!(out.value(at("G20")), CellValue::Number(1500.0));
        assert_eq!(out.value(at("I20")), CellValue::Formula("=E20*G20".to_owned()));
        assert_eq!(out.value(at("A21")), CellValue::text("Total"));
        assert_eq!(out.value(at("I21")), CellValue::Formula("=SUM(I18:I20)".to_owned()));
        assert_eq!(out.value(at("H21")), CellValue::text("USD"));
        assert_eq!(out.row_style(20), Some("item"));
        assert_eq!(out.current_print_area().map(|a| a.end.row), Some(32));
    }
    #[test]
    fn final_invoice_shrinks_and_leaves_blank_currency_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut template = MemorySheet::new("Final Invoice")
            .with_text(at("F4"), "Invoice No.")
            .with_text(at("B13"), "Description")
            .with_text(at("A17"), "Total")
            .with_formula(at("E17"), "=SUM(E14:E16)")
            .with_formula(at("I17"), "=SUM(I14:I16)");
        for row in 14..17 {
            template = template.with_row_style(row, "item");
        }
        let engine = MemoryEngine::new(template);
        let settings = Settings::default();
        let item = invoice_item(0, "unit_price", 1250.0, "");
        let records = RecordSet::new(item.clone(), vec![item]).unwrap();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::FinalInvoice), &records)
            .unwrap();
        assert_eq!(report.region.data_start_row, 14);
        assert_eq!(report.delta.row_count, 2);
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("G14")), CellValue::Number(1250.0));
        assert_eq!(out.value(at("I14")), CellValue::Formula("=E14*G14".to_owned()));
        assert_eq!(out.value(at("A15")), CellValue::text("Total"));
        assert_eq!(out.value(at("E15")), CellValue::Formula("=SUM(E14:E14)".to_owned()));
        assert_eq!(out.value(at("I15")), CellValue::Formula("=SUM(I14:I14)".to_owned()));
        assert_eq!(out.value(at("H15")), CellValue::Empty);
        assert_eq!(out.row_style(15), None);
    }
    #[test]
    fn formulas_below_the_totals_follow_when_the_engine_does_not_shift() {
        let dir = tempfile::tempdir().unwrap();
        let template = po_template(3)
            .with_formula(at("F22"), "=J18")
            .without_reference_shift();
        let engine = MemoryEngine::new(template);
        let settings = Settings::default();
        let report = Generator::new(&engine, &settings, &NoHistory)
            .generate(&request(dir.path(), DocumentKind::PurchaseOrder), &po_records(1))
            .unwrap();
        let out = MemorySheet::load(&report.output).unwrap();
        assert_eq!(out.value(at("J14")), CellValue::Formula("=SUM(J13:J13)".to_owned()));
        assert_eq!(out.value(at("J15")), CellValue::Formula("=J14*0.1".to_owned()));
        assert_eq!(out.value(at("J16")), CellValue::Formula("=SUM(J14:J15)".to_owned()));
        assert_eq!(out.value(at("F20")), CellValue::Formula("=J16".to_owned()));
        assert_eq!(out.current_print_area().map(|a| a.end.row), Some(24));
    }
    #[test]
    fn statement_total_floors_tax_per_line() {
        let items = [
            Record::new().with("Item qty", 3).with("Sales Unit Price", 333),
            Record::new().with("Item qty", "bad"),
        ];
        assert!((statement_grand_total(&items, 0.1) - 1098.0).abs() < f64::EPSILON);
    }
}

use super::DocumentKind;
use crate::{
    batch::{ColumnSpec, Formatter, model_text, text_cell},
    locate::{DEFAULT_LABELS, HeaderLocator, INVOICE_LABELS, PO_LABELS, TS_LABELS, TotalsMarker},
    record::Record,
    sheet::{CellValue, address::CellRef},
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsStyle {
    TaxedAmount { column: u32 },
    Statement,
    Currency { column: u32 },
}
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub kind: DocumentKind,
    pub template_file: &'static str,
    pub labels: &'static [&'static str],
    pub scan_cols: Option<u32>,
    pub fallback_row: u32,
    pub marker: TotalsMarker,
    pub last_col: u32,
    pub columns: Vec<ColumnSpec>,
    pub sum_columns: &'static [u32],
    pub totals: TotalsStyle,
}
const A: u32 = 1;
const B: u32 = 2;
const C: u32 = 3;
const D: u32 = 4;
const E: u32 = 5;
const F: u32 = 6;
const G: u32 = 7;
const H: u32 = 8;
const I: u32 = 9;
const J: u32 = 10;
fn po_description(rec: &Record) -> String {
    let mut parts = Vec::new();
    let name = rec.text("item_name");
    let model = model_text(rec, "model");
    if !name.is_empty() {
        parts.push(name);
    } else if !model.is_empty() {
        parts.push(model);
    }
    let power = rec.text("power_supply");
    if !power.is_empty() {
        parts.push(power.replace("-1Ph-", ", ").replace("-3Ph-", ", "));
    }
    if rec.is_flagged("als") {
        parts.push("ALS".to_owned());
    }
    parts.retain(|p| !p.is_empty());
    parts.join(", ")
}
fn invoice_name(rec: &Record) -> String {
    let model = model_text(rec, "model");
    let name = rec.text("item_name");
    match (model.is_empty(), name.is_empty()) {
        (false, false) => format!("{model} {name}"),
        (false, true) => model,
        _ => name,
    }
}
static PURCHASE_ORDER: Lazy<DocumentLayout> = Lazy::new(|| DocumentLayout {
    kind: DocumentKind::PurchaseOrder,
    template_file: "purchase_order.xlsx",
    labels: PO_LABELS,
    scan_cols: None,
    fallback_row: 13,
    marker: TotalsMarker::SumFormula {
        column: J,
        window: 20,
        fallback_offset: 1,
    },
    last_col: J,
    columns: vec![
        ColumnSpec::new(A, Formatter::Sequence),
        ColumnSpec::new(
            B,
            Formatter::Custom {
                name: "description",
                build: po_description,
            },
        ),
        ColumnSpec::new(
            F,
            Formatter::Integer {
                key: "item_qty",
                default: 1,
            },
        ),
        ColumnSpec::new(G, Formatter::Constant("EA")),
        ColumnSpec::new(
            H,
            Formatter::Decimal {
                key: "ico_unit",
                default: 0.0,
            },
        ),
        ColumnSpec::new(
            I,
            Formatter::Date {
                key: "delivery_date",
                pattern: "%Y-%m-%d",
            },
        ),
        ColumnSpec::new(J, Formatter::RowFormula("=H{r}*F{r}")),
    ],
    sum_columns: &[J],
    totals: TotalsStyle::TaxedAmount { column: J },
});
fn statement(kind: DocumentKind, remark: &'static str) -> DocumentLayout {
    DocumentLayout {
        kind,
        template_file: "transaction_statement.xlsx",
        labels: TS_LABELS,
            scan_cols: Some(4),
        fallback_row: 13,
        marker: TotalsMarker::SumFormula {
            column: E,
            window: 15,
            fallback_offset: 3,
        },
        last_col: H,
        columns: vec![
            ColumnSpec::new(
                A,
                Formatter::DocumentDate {
                    key: "dispatch_date",
                    pattern: "%-m/%-d",
                },
            ),
            ColumnSpec::new(B, Formatter::Text("item_name")),
            ColumnSpec::new(C, Formatter::Constant(remark)),
            ColumnSpec::new(D, Formatter::Constant("EA")),
            ColumnSpec::new(
                E,
                Formatter::Integer {
                    key: "item_qty",
                    default: 1,
                },
            ),
            ColumnSpec::new(
                F,
                Formatter::Integer {
                    key: "sales_unit_price",
                    default: 0,
                },
            ),
            ColumnSpec::new(G, Formatter::RowFormula("=E{r}*F{r}")),
            ColumnSpec::new(H, Formatter::RowFormula("=ROUNDDOWN(G{r}*{vat},0)")),
        ],
        sum_columns: &[E, G, H],
        totals: TotalsStyle::Statement,
    }
}
static DELIVERY_STATEMENT: Lazy<DocumentLayout> =
    Lazy::new(|| statement(DocumentKind::DeliveryStatement, ""));
static ADVANCE_STATEMENT: Lazy<DocumentLayout> =
    Lazy::new(|| statement(DocumentKind::AdvanceStatement, "선수금"));
fn invoice(kind: DocumentKind, template_file: &'static str, start: u32) -> DocumentLayout {
    let price = if kind == DocumentKind::FinalInvoice {
        "unit_price"
    } else {
        "sales_unit_price"
    };
    DocumentLayout {
        kind,
        template_file,
        labels: INVOICE_LABELS,
        scan_cols: None,
        fallback_row: start,
        marker: TotalsMarker::Label {
            column: A,
            text: "Total",
            window: 20,
            fallback_offset: 10,
        },
        last_col: I,
        columns: vec![
            ColumnSpec::new(
                A,
                Formatter::Custom {
                    name: "item_name",
                    build: invoice_name,
                },
            ),
            ColumnSpec::new(
                E,
                Formatter::Integer {
                    key: "item_qty",
                    default: 1,
                },
            ),
            ColumnSpec::new(
                G,
                Formatter::Decimal {
                    key: price,
                    default: 0.0,
                },
            ),
            ColumnSpec::new(I, Formatter::RowFormula("=E{r}*G{r}")),
        ],
        sum_columns: if kind == DocumentKind::FinalInvoice {
            &[E, I][..]
        } else {
            &[I][..]
        },
        totals: TotalsStyle::Currency { column: H },
    }
}
static PROFORMA_INVOICE: Lazy<DocumentLayout> =
    Lazy::new(|| invoice(DocumentKind::ProformaInvoice, "proforma_invoice.xlsx", 18));
static FINAL_INVOICE: Lazy<DocumentLayout> =
    Lazy::new(|| invoice(DocumentKind::FinalInvoice, "final_invoice.xlsx", 14));
impl DocumentLayout {
    pub fn of(kind: DocumentKind) -> &'static Self {
        match kind {
            DocumentKind::PurchaseOrder => &PURCHASE_ORDER,
            DocumentKind::DeliveryStatement => &DELIVERY_STATEMENT,
            DocumentKind::AdvanceStatement => &ADVANCE_STATEMENT,
            DocumentKind::ProformaInvoice => &PROFORMA_INVOICE,
            DocumentKind::FinalInvoice => &FINAL_INVOICE,
        }
    }
    pub fn locator(&self, scan_rows: u32, scan_cols: u32, fallback: Option<u32>) -> HeaderLocator {
        let labels = if self.labels.is_empty() {
            DEFAULT_LABELS
        } else {
            self.labels
        };
        HeaderLocator::new(labels, fallback.unwrap_or(self.fallback_row))
            .with_window(scan_rows, self.scan_cols.map_or(scan_cols, |c| c.min(scan_cols)))
    }
    pub fn header_cells(&self, primary: &Record, today: NaiveDate) -> Vec<(CellRef, CellValue)> {
        let text = |key: &str| text_cell(&primary.text(key));
        let iso = |key: &str| {
            primary.date(key).map_or_else(
                || text_cell(&primary.text(key)),
                |d| text_cell(&d.format("%Y-%m-%d").to_string()),
            )
        };
        let mut cells = match self.kind {
            DocumentKind::PurchaseOrder => vec![
                (
                    CellRef::new(A, 1),
                    text_cell(&format!("Purchase Order - {}", primary.text("order_no"))),
                ),
                (
                    CellRef::new(A, 5),
                    text_cell(&format!("Date:  {}", today.format("%d/%b/%Y").to_string().to_uppercase())),
                ),
                (CellRef::new(C, 5), text("delivery_address")),
                (CellRef::new(C, 7), text("customer_po")),
                (CellRef::new(A, 10), text("customer_name")),
            ],
            DocumentKind::DeliveryStatement | DocumentKind::AdvanceStatement => {
                let dispatch = primary.date("dispatch_date").unwrap_or(today);
                vec![
                    (
                        CellRef::new(B, 2),
                        text_cell(&format!("DATE : {}", dispatch.format("%Y. %m. %d"))),
                    ),
                    (
                        CellRef::new(B, 7),
                        text_cell(&format!("{} 귀하", primary.text("customer_name"))),
                    ),
                ]
            }
            DocumentKind::ProformaInvoice => {
                let name = primary.text("customer_name");
                let address = primary.text("customer_address");
                let consigned = if address.is_empty() {
                    name
                } else {
                    format!("{name}\n{address}")
                };
                vec![
                    (CellRef::new(G, 4), text("so_id")),
                    (CellRef::new(I, 4), text_cell(&today.format("%Y-%m-%d").to_string())),
                    (CellRef::new(A, 9), text_cell(&consigned)),
                    (CellRef::new(A, 10), text("customer_country")),
                    (CellRef::new(C, 10), text("customer_tel")),
                    (CellRef::new(E, 10), text("customer_fax")),
                    (CellRef::new(B, 13), text_cell("INCHEON, KOREA")),
                    (CellRef::new(B, 14), text("customer_country")),
                    (CellRef::new(G, 15), text("customer_po")),
                    (CellRef::new(I, 15), iso("po_receipt_date")),
                    (CellRef::new(G, 17), text("incoterms")),
                    (CellRef::new(G, 5), text("lc_no")),
                    (CellRef::new(I, 5), iso("lc_date")),
                ]
            }
            DocumentKind::FinalInvoice => {
                let dispatch = primary.date("dispatch_date").unwrap_or(today);
                vec![
                    (CellRef::new(G, 4), text("dn_id")),
                    (CellRef::new(I, 4), text_cell(&dispatch.format("%Y-%m-%d").to_string())),
                    (CellRef::new(A, 9), text("bill_to_1")),
                    (CellRef::new(A, 10), text("bill_to_2")),
                    (CellRef::new(A, 11), text("bill_to_3")),
                    (CellRef::new(G, 8), text("payment_terms")),
                    (CellRef::new(G, 10), text("customer_po")),
                    (CellRef::new(I, 10), iso("po_receipt_date")),
                ]
            }
        };
        if matches!(self.kind, DocumentKind::ProformaInvoice) {
            cells.retain(|(cell, value)| {
                !(value.is_empty() && matches!((cell.col, cell.row), (G, 17) | (G, 5) | (I, 5)))
            });
        }
        if matches!(self.kind, DocumentKind::FinalInvoice) {
            cells.retain(|(cell, value)| !(value.is_empty() && (cell.col, cell.row) == (G, 8)));
        }
        cells
    }
    pub fn footer_cells(&self, primary: &Record, totals_row: u32) -> Vec<(CellRef, CellValue)> {
        if self.kind != DocumentKind::PurchaseOrder {
            return Vec::new();
        }
        let t = totals_row;
        let remark = primary.text("remark");
        let note = if remark.is_empty() {
            "Note.".to_owned()
        } else {
            format!("Note. {remark}")
        };
        vec![
            (CellRef::new(D, t + 3), text_cell(&primary.text("opportunity"))),
            (CellRef::new(D, t + 4), text_cell(&primary.text("sector"))),
            (CellRef::new(D, t + 5), text_cell(&primary.text("industry_code"))),
            (CellRef::new(C, t + 6), text_cell(&note)),
            (CellRef::new(B, t + 7), text_cell(&currency(primary))),
            (CellRef::new(B, t + 8), text_cell(&primary.text("incoterms"))),
        ]
    }
}
pub fn currency(primary: &Record) -> String {
    let code = primary.text("currency");
    if code.trim().is_empty() {
        "KRW".to_owned()
    } else {
        code.trim().to_owned()
    }
}

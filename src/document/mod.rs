pub mod generator;
pub mod layouts;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    #[value(name = "po")]
    PurchaseOrder,
    #[value(name = "ts-dn")]
    DeliveryStatement,
    #[value(name = "ts-adv")]
    AdvanceStatement,
    #[value(name = "pi")]
    ProformaInvoice,
    #[value(name = "fi")]
    FinalInvoice,
}
impl DocumentKind {
    pub const ALL: [Self; 5] = [
        Self::PurchaseOrder,
        Self::DeliveryStatement,
        Self::AdvanceStatement,
        Self::ProformaInvoice,
        Self::FinalInvoice,
    ];
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "PO",
            Self::DeliveryStatement | Self::AdvanceStatement => "TS",
            Self::ProformaInvoice => "PI",
            Self::FinalInvoice => "FI",
        }
    }
    pub const fn label(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "발주서",
            Self::DeliveryStatement => "거래명세표(납품)",
            Self::AdvanceStatement => "거래명세표(선수금)",
            Self::ProformaInvoice => "Proforma Invoice",
            Self::FinalInvoice => "Final Invoice",
        }
    }
}
impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
#[cfg(test)]
mod tests {
    use super::DocumentKind;
    use clap::ValueEnum;
    #[test]
    fn kinds_parse_from_cli_names() {
        assert_eq!(
            DocumentKind::from_str("PO", true),
            Ok(DocumentKind::PurchaseOrder)
        );
        assert_eq!(
            DocumentKind::from_str("ts-adv", true),
            Ok(DocumentKind::AdvanceStatement)
        );
        assert!(DocumentKind::from_str("invoice", true).is_err());
    }
    #[test]
    fn statements_share_one_prefix() {
        let prefixes: Vec<_> = DocumentKind::ALL.iter().map(|k| k.prefix()).collect();
        assert_eq!(prefixes, ["PO", "TS", "TS", "PI", "FI"]);
    }
}

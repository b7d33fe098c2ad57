//! Pricing DTOs

use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /pricing/breakdown` query
#[derive(Debug, Clone, Deserialize)]
pub struct BreakdownQuery {
    /// Display price, IVA included
    pub amount: Decimal,
    /// IVA percentage, the hotel's rate when absent
    pub iva: Option<Decimal>,
    /// Discount percentage applied before the split
    pub discount: Option<Decimal>,
}

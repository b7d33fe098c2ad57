//! Add-on service catalog and reservation line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry (breakfast, parking, transfer, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i32,
    pub name: String,
    /// Price per unit, IVA included
    pub unit_price: Decimal,
    pub active: bool,
}

/// Line item to attach to a reservation row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewServiceLine {
    pub reservation_id: Uuid,
    pub service_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl NewServiceLine {
    #[inline]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Line item joined with its catalog name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceLineDetail {
    pub id: Uuid,
    pub service_id: i32,
    pub service_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl ServiceLineDetail {
    #[inline]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total() {
        let line = NewServiceLine {
            reservation_id: Uuid::new_v4(),
            service_id: 3,
            quantity: 4,
            unit_price: dec!(8500),
        };
        assert_eq!(line.line_total(), dec!(34000));
    }
}

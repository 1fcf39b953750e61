use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Direction of a stock quantity change.
///
/// `Adjustment` never originates from this client but appears in histories
/// recorded through other channels, so it must deserialize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementType {
    StockIn,
    StockOut,
    Adjustment,
}

impl MovementType {
    pub fn label(&self) -> &'static str {
        match self {
            MovementType::StockIn => "STOCK-IN",
            MovementType::StockOut => "STOCK-OUT",
            MovementType::Adjustment => "ADJUSTMENT",
        }
    }
}

/// One recorded stock change with its before/after snapshot. Append-only and
/// owned by the backend; the client only reads and creates these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    #[serde(default)]
    pub movement_id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<i64>,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for `PUT /products/:id/stock`.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct StockUpdate {
    pub movement_type: MovementType,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StockUpdate {
    pub fn new(movement_type: MovementType, quantity: i64) -> Self {
        Self {
            movement_type,
            quantity,
            reference_number: None,
            notes: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_type_uses_kebab_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&MovementType::StockIn).unwrap(),
            "\"stock-in\""
        );
        assert_eq!(
            serde_json::to_string(&MovementType::StockOut).unwrap(),
            "\"stock-out\""
        );
        let parsed: MovementType = serde_json::from_str("\"adjustment\"").unwrap();
        assert_eq!(parsed, MovementType::Adjustment);
    }

    #[test]
    fn stock_update_omits_empty_optionals() {
        let update = StockUpdate::new(MovementType::StockIn, 50);
        let json = serde_json::to_value(&update).unwrap();
        assert!(json.get("reference_number").is_none());
        assert!(json.get("notes").is_none());
        assert_eq!(json["movement_type"], "stock-in");
        assert_eq!(json["quantity"], 50);
    }

    #[test]
    fn zero_quantity_fails_validation() {
        use validator::Validate;
        let update = StockUpdate::new(MovementType::StockOut, 0);
        assert!(update.validate().is_err());
    }
}

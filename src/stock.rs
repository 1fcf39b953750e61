//! Stock movement recorder.
//!
//! Quantity is only ever mutated through a recorded movement. Rejections from
//! the backend (e.g. insufficient stock for a stock-out) surface verbatim, and
//! success never mutates any local copy — callers reload the product
//! collection so server-computed fields cannot drift.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;
use validator::Validate;

use crate::client::{ApiClient, StockUpdateAck};
use crate::errors::{ClientError, Result};
use crate::models::{MovementType, StockUpdate};

/// Accepted quick-update tokens: a sign followed by digits, nothing else.
static QUICK_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+-])(\d+)$").expect("valid regex"));

const QUICK_UPDATE_NOTE: &str = "Quick update from reports";

/// Records a movement for a product. The returned ack carries the before/after
/// snapshot the backend wrote.
pub async fn record_movement(
    client: &ApiClient,
    product_id: i64,
    update: &StockUpdate,
) -> Result<StockUpdateAck> {
    update
        .validate()
        .map_err(|e| ClientError::Validation(e.to_string()))?;
    let ack = client.update_stock(product_id, update).await?;
    info!(
        product_id,
        movement_type = update.movement_type.label(),
        quantity = update.quantity,
        "stock movement recorded"
    );
    Ok(ack)
}

/// A parsed quick-update token (`+N` adds stock, `-N` removes it).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuickAdjustment {
    pub movement_type: MovementType,
    pub quantity: i64,
}

impl QuickAdjustment {
    /// Parses free-text input. Anything that is not exactly `+N`/`-N` with a
    /// positive N is rejected here, before any network call.
    pub fn parse(token: &str) -> Result<Self> {
        let captures = QUICK_TOKEN.captures(token).ok_or_else(|| {
            ClientError::validation("Invalid format! Use +number or -number (e.g., +50 or -20)")
        })?;

        let quantity: i64 = captures[2]
            .parse()
            .map_err(|_| ClientError::validation("Quantity is out of range"))?;
        if quantity == 0 {
            return Err(ClientError::validation("Quantity must be positive"));
        }

        let movement_type = match &captures[1] {
            "+" => MovementType::StockIn,
            _ => MovementType::StockOut,
        };
        Ok(Self {
            movement_type,
            quantity,
        })
    }

    /// The movement payload for this adjustment, tagged with the fixed
    /// quick-update note.
    pub fn into_update(self) -> StockUpdate {
        StockUpdate::new(self.movement_type, self.quantity).with_notes(QUICK_UPDATE_NOTE)
    }
}

/// Parses a quick token and records the movement in one step, as the reports
/// page does.
pub async fn quick_update(
    client: &ApiClient,
    product_id: i64,
    token: &str,
) -> Result<StockUpdateAck> {
    let adjustment = QuickAdjustment::parse(token)?;
    record_movement(client, product_id, &adjustment.into_update()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    #[test]
    fn plus_token_is_stock_in() {
        let adj = QuickAdjustment::parse("+50").unwrap();
        assert_eq!(adj.movement_type, MovementType::StockIn);
        assert_eq!(adj.quantity, 50);
    }

    #[test]
    fn minus_token_is_stock_out() {
        let adj = QuickAdjustment::parse("-20").unwrap();
        assert_eq!(adj.movement_type, MovementType::StockOut);
        assert_eq!(adj.quantity, 20);
    }

    #[test_case("abc")]
    #[test_case("50")]
    #[test_case("+ 50")]
    #[test_case("+50x")]
    #[test_case("++50")]
    #[test_case("")]
    #[test_case("+5.5")]
    fn malformed_tokens_are_rejected(token: &str) {
        assert_matches!(
            QuickAdjustment::parse(token),
            Err(ClientError::Validation(_))
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert_matches!(
            QuickAdjustment::parse("+0"),
            Err(ClientError::Validation(_))
        );
    }

    #[test]
    fn quick_update_carries_the_fixed_note() {
        let update = QuickAdjustment::parse("+5").unwrap().into_update();
        assert_eq!(update.notes.as_deref(), Some("Quick update from reports"));
        assert_eq!(update.reference_number, None);
    }
}

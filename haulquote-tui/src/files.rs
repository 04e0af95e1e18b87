//! Pricing and request files.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use haulquote_core::{PricingContext, PricingLogic, RegionalPricingData, ServiceRequestDraft};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingFile {
    #[serde(default)]
    pricing_logic: Option<PricingLogic>,
    #[serde(default)]
    regional_pricing_data: Option<RegionalPricingData>,
}

/// Load the pricing context, falling back to the built-in Texas sheets.
pub(crate) fn load_pricing(path: &Path) -> Result<PricingContext> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read pricing file {}", path.display()))?;
    parse_pricing(&raw).with_context(|| format!("invalid pricing file {}", path.display()))
}

/// One entry of the requests file.
#[derive(Debug)]
pub(crate) enum RequestRow {
    Draft(Box<ServiceRequestDraft>),
    /// Entry that is not a valid request; it still gets a failed quote in place.
    Rejected { id: String, reason: String },
}

impl RequestRow {
    fn from_value(index: usize, value: Value) -> Self {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .map_or_else(|| format!("row-{}", index + 1), str::to_owned);

        match serde_json::from_value::<ServiceRequestDraft>(value) {
            Ok(draft) => Self::Draft(Box::new(draft)),
            Err(err) => {
                warn!(row = index + 1, id = %id, error = %err, "malformed request row");
                Self::Rejected {
                    id,
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Load the requests file; only a missing file or a non-array body fails.
pub(crate) fn load_requests(path: &Path) -> Result<Vec<RequestRow>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read requests file {}", path.display()))?;
    parse_requests(&raw).with_context(|| format!("invalid requests file {}", path.display()))
}

fn parse_requests(raw: &str) -> Result<Vec<RequestRow>> {
    let rows: Vec<Value> = serde_json::from_str(raw)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| RequestRow::from_value(index, row))
        .collect())
}

fn parse_pricing(raw: &str) -> Result<PricingContext> {
    let file: PricingFile = serde_json::from_str(raw)?;
    let context = PricingContext {
        pricing_logic: file.pricing_logic,
        regional_pricing_data: Some(
            file.regional_pricing_data
                .unwrap_or_else(haulquote_provider_texas::regional_pricing_data),
        ),
    };
    Ok(context)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use haulquote_core::{FailureKind, FeeRegistry, QuoteService, Region};

    use super::*;
    use crate::app::quote_rows;

    const THREE_ROWS: &str = r#"[
        { "id": "loc-1", "city": "Plano", "state": "TX", "equipmentType": "FEL",
          "containerSize": "4YD", "frequency": "1x/week", "materialType": "MSW" },
        { "id": "loc-2", "city": "Plano", "state": "TX", "equipmentType": "Hook Lift",
          "containerSize": "4YD", "frequency": "1x/week", "materialType": "MSW" },
        { "id": "loc-3", "city": "Dallas", "state": "TX", "equipmentType": "Cart",
          "containerSize": "2YD", "frequency": "2x/week", "materialType": "MSW" }
    ]"#;

    #[test]
    fn malformed_row_is_kept_in_place() {
        let rows = parse_requests(THREE_ROWS).expect("array of rows");
        assert_eq!(rows.len(), 3);
        assert!(matches!(&rows[0], RequestRow::Draft(draft) if draft.id == "loc-1"));
        assert!(matches!(
            &rows[1],
            RequestRow::Rejected { id, reason } if id == "loc-2" && reason.contains("Hook Lift")
        ));
        assert!(matches!(&rows[2], RequestRow::Draft(draft) if draft.id == "loc-3"));
    }

    #[test]
    fn row_without_id_is_numbered() {
        let rows = parse_requests(r#"[{ "city": "Plano" }]"#).expect("array of rows");
        assert!(matches!(&rows[0], RequestRow::Rejected { id, .. } if id == "row-1"));
    }

    #[test]
    fn non_array_body_is_rejected() {
        assert!(parse_requests(r#"{ "id": "loc-1" }"#).is_err());
    }

    #[tokio::test]
    async fn batch_with_malformed_row_quotes_every_row() {
        let service = QuoteService::new(Arc::new(FeeRegistry::new(Vec::new())));
        let rows = parse_requests(THREE_ROWS).expect("array of rows");
        let quotes = quote_rows(&service, &PricingContext::default(), rows).await;

        let ids: Vec<&str> = quotes.iter().map(|quote| quote.request_id.as_str()).collect();
        assert_eq!(ids, ["loc-1", "loc-2", "loc-3"]);
        assert!(quotes[0].service_request.is_some());
        assert!(!quotes[1].is_success());
        assert!(quotes[1].service_request.is_none());
        assert_eq!(quotes[1].failure_kind, Some(FailureKind::Unexpected));
        assert!(
            quotes[1]
                .failure_reason
                .as_deref()
                .is_some_and(|reason| reason.contains("Hook Lift"))
        );
        assert!(quotes[2].service_request.is_some());
    }

    #[test]
    fn missing_sheets_use_texas_defaults() {
        let context = parse_pricing(r#"{ "pricingLogic": { "type": "regional-brain" } }"#)
            .expect("valid pricing file");
        assert_eq!(
            context.pricing_logic.as_ref().map(PricingLogic::kind),
            Some("regional-brain")
        );
        assert!(
            context
                .regional_pricing_data
                .as_ref()
                .and_then(|data| data.sheet(Region::SouthTexas))
                .is_some()
        );
    }

    #[test]
    fn explicit_sheets_replace_defaults() {
        let context = parse_pricing(
            r#"{
                "pricingLogic": { "type": "broker", "brokerRates": [] },
                "regionalPricingData": { "sheets": { "NTX": { "entries": [] } } }
            }"#,
        )
        .expect("valid pricing file");
        let data = context.regional_pricing_data.expect("sheets present");
        assert!(data.sheet(Region::CentralTexas).is_none());
        assert_eq!(data.sheet(Region::NorthTexas).map(|sheet| sheet.entries.len()), Some(0));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(parse_pricing(r#"{ "pricingLogic": { "type": "auction" } }"#).is_err());
    }
}

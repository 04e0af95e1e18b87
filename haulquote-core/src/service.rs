//! High-level service facade combining fee providers and the pricing engine.

use std::sync::Arc;

use tracing::{info, warn};

use crate::calculator::{CostInputs, MonthlyBreakdown, calculate};
use crate::model::{ServiceRequest, ServiceRequestDraft};
use crate::plugin::{FeeRegistry, StateId, StateMeta};
use crate::ports::{CityFees, CityQuery};
use crate::pricing::PricingContext;
use crate::quote::Quote;
use crate::resolver::{self, GenerationScope, PricingFailure, Resolution};

/// Public entry point for generating quotes.
pub struct QuoteService {
    registry: Arc<FeeRegistry>,
}

impl QuoteService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<FeeRegistry>) -> Self {
        Self { registry }
    }

    /// States with a registered fee provider.
    #[must_use]
    pub fn states(&self) -> Vec<StateMeta> {
        self.registry.states()
    }

    /// Price a single location.
    ///
    /// Never fails: anything that prevents pricing is reported on a quote with
    /// [`QuoteStatus::Failed`](crate::quote::QuoteStatus::Failed).
    pub async fn generate_quote(
        &self,
        context: &PricingContext,
        draft: &ServiceRequestDraft,
    ) -> Quote {
        self.quote_one(context, draft, GenerationScope::Single).await
    }

    /// Price a batch of locations, one quote per draft in input order.
    pub async fn generate_quotes(
        &self,
        context: &PricingContext,
        drafts: &[ServiceRequestDraft],
    ) -> Vec<Quote> {
        let mut quotes = Vec::with_capacity(drafts.len());
        for draft in drafts {
            quotes.push(self.quote_one(context, draft, GenerationScope::Bulk).await);
        }

        let failed = quotes.iter().filter(|quote| !quote.is_success()).count();
        info!(
            requests = drafts.len(),
            failed,
            mode = context.pricing_logic.as_ref().map_or("none", |logic| logic.kind()),
            "generated quote batch"
        );
        quotes
    }

    /// Fees for a request's city.
    ///
    /// Unsupported states and provider errors degrade to an unmatched city so
    /// that pricing falls back to configured and default fees.
    pub async fn city_fees(&self, request: &ServiceRequest) -> CityFees {
        let query = CityQuery::for_request(request);
        if query.is_empty() {
            return CityFees::unmatched(&query.city);
        }

        let plugin = match self.registry.plugin(&StateId::new(&query.state)) {
            Ok(plugin) => plugin,
            Err(err) => {
                warn!(state = %query.state, error = %err, "no fee provider for state");
                return CityFees::unmatched(&query.city);
            }
        };

        match plugin.fee_port.lookup(&query).await {
            Ok(fees) => fees,
            Err(err) => {
                warn!(
                    city = %query.city,
                    state = %query.state,
                    error = %err,
                    "city fee lookup failed"
                );
                CityFees::unmatched(&query.city)
            }
        }
    }

    async fn quote_one(
        &self,
        context: &PricingContext,
        draft: &ServiceRequestDraft,
        scope: GenerationScope,
    ) -> Quote {
        let request = match draft.resolve() {
            Ok(request) => request,
            Err(err) => return Quote::failed(&draft.id, None, &PricingFailure::from(err)),
        };

        let fees = self.city_fees(&request).await;
        match price(context, &request, &fees, scope) {
            Ok((resolution, breakdown)) => Quote::success(request, resolution, &breakdown),
            Err(failure) => {
                warn!(request = %request.id, reason = %failure, "quote failed");
                Quote::failed(&draft.id, Some(request), &failure)
            }
        }
    }
}

fn price(
    context: &PricingContext,
    request: &ServiceRequest,
    fees: &CityFees,
    scope: GenerationScope,
) -> Result<(Resolution, MonthlyBreakdown), PricingFailure> {
    let resolution = resolver::resolve(context, request, fees, scope)?;
    let breakdown = calculate(&CostInputs {
        bin_quantity: request.bin_quantity,
        weekly_multiplier: resolution.weekly_multiplier,
        yards: request.container_size.yards(),
        base: resolution.base,
        fuel_surcharge: resolution.fees.fuel_surcharge,
        franchise_fee: resolution.fees.franchise_fee,
        local_tax: resolution.fees.local_tax,
        add_ons_cost: resolution.add_ons_cost,
    })?;
    Ok((resolution, breakdown))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::frequency::{ContainerSize, Frequency};
    use crate::model::{EquipmentType, Inheritable, MaterialType, RecordedService};
    use crate::plugin::FeePlugin;
    use crate::ports::{CityFeePort, PortError};
    use crate::pricing::{
        CustomPricing, CustomPricingRule, FranchisedCityRate, PricingConfig, PricingLogic,
    };
    use crate::quote::QuoteStatus;
    use crate::resolver::FailureKind;

    const TOLERANCE: f64 = 1e-6;

    struct StubPort {
        meta: StateMeta,
    }

    #[async_trait]
    impl CityFeePort for StubPort {
        fn state(&self) -> &StateMeta {
            &self.meta
        }

        async fn lookup(&self, query: &CityQuery) -> Result<CityFees, PortError> {
            match query.city.to_lowercase().as_str() {
                "mansfield" => Ok(CityFees {
                    is_match: true,
                    city_name: "Mansfield".to_owned(),
                    franchise_fee: Some(5.0),
                    sales_tax: Some(8.25),
                    pricing_data: Some(vec![FranchisedCityRate {
                        container_size: ContainerSize::parse("6YD"),
                        frequency: Frequency::parse("2x/week"),
                        equipment_type: EquipmentType::FrontLoad,
                        material_type: None,
                        monthly_rate: 259.80,
                        delivery_fee: None,
                        franchise_fee: None,
                        sales_tax: None,
                        extra_pickup_rate: None,
                    }]),
                }),
                "broken" => Err(PortError::Internal("backend down".to_owned())),
                _ => Ok(CityFees::unmatched(&query.city)),
            }
        }
    }

    fn service() -> QuoteService {
        let meta = StateMeta {
            id: StateId::new("TX"),
            name: "Texas".to_owned(),
        };
        let plugin = FeePlugin {
            meta: meta.clone(),
            fee_port: Arc::new(StubPort { meta }),
        };
        QuoteService::new(Arc::new(FeeRegistry::new(vec![plugin])))
    }

    fn draft(id: &str, city: &str, size: &str, frequency: &str) -> ServiceRequestDraft {
        ServiceRequestDraft {
            id: id.to_owned(),
            address: "1 Main St".to_owned(),
            city: city.to_owned(),
            state: "TX".to_owned(),
            zip: "76063".to_owned(),
            equipment_type: Inheritable::Explicit(EquipmentType::FrontLoad),
            container_size: Inheritable::Explicit(ContainerSize::parse(size)),
            frequency: Inheritable::Explicit(Frequency::parse(frequency)),
            material_type: Inheritable::Explicit(MaterialType::new("MSW")),
            bin_quantity: 1,
            add_ons: Vec::new(),
            recorded: RecordedService::default(),
        }
    }

    fn custom_context() -> PricingContext {
        PricingContext::default().with_pricing_logic(PricingLogic::Custom(CustomPricing {
            custom_rules: vec![CustomPricingRule {
                id: "r1".to_owned(),
                name: Some("Plano front load".to_owned()),
                city: Some("Plano".to_owned()),
                state: Some("TX".to_owned()),
                equipment_type: Inheritable::InheritSelf,
                container_size: Inheritable::InheritSelf,
                frequency: Inheritable::InheritSelf,
                material_type: Inheritable::InheritSelf,
                price_per_yard: Some(4.0),
                large_container_price_per_yard: None,
                franchise_fee: None,
                tax_rate: None,
                fuel_surcharge: None,
                delivery_fee: None,
                extra_pickup_rate: None,
            }],
            pricing_config: Some(PricingConfig::default()),
        }))
    }

    #[tokio::test]
    async fn municipal_contract_ignores_pricing_logic() {
        let quote = service()
            .generate_quote(&custom_context(), &draft("m", "Mansfield", "6YD", "2x/week"))
            .await;
        assert_eq!(quote.status, QuoteStatus::Success);
        assert_eq!(quote.pricing_source, "Mansfield Municipal Contract");
        assert!((quote.base_rate - 259.80).abs() < TOLERANCE);
        assert!((quote.franchise_fee_rate - 5.0).abs() < TOLERANCE);
    }

    #[tokio::test]
    async fn custom_rule_quote_is_consistent() {
        let quote = service()
            .generate_quote(&custom_context(), &draft("p", "Plano", "4YD", "1x/week"))
            .await;
        assert!(quote.is_success());
        assert!((quote.total_monthly_volume - 17.32).abs() < TOLERANCE);
        assert!((quote.base_rate - 69.28).abs() < TOLERANCE);
        let parts = quote.base_rate
            + quote.franchise_fee_amount
            + quote.fuel_surcharge_amount
            + quote.add_ons_cost;
        assert!((quote.subtotal - parts).abs() < TOLERANCE);
        assert!((quote.total_monthly_cost - (quote.subtotal + quote.local_tax_amount)).abs() < TOLERANCE);
    }

    #[tokio::test]
    async fn quoting_twice_gives_the_same_money() {
        let service = service();
        let context = custom_context();
        let request = draft("p", "Plano", "4YD", "1x/week");
        let first = service.generate_quote(&context, &request).await;
        let second = service.generate_quote(&context, &request).await;
        let money = |quote: &Quote| {
            [
                quote.price_per_yard,
                quote.base_rate,
                quote.total_monthly_volume,
                quote.pickups_per_week,
                quote.franchise_fee_amount,
                quote.franchise_fee_rate,
                quote.local_tax_amount,
                quote.local_tax_rate,
                quote.fuel_surcharge_amount,
                quote.fuel_surcharge_rate,
                quote.delivery_fee,
                quote.extra_pickup_rate,
                quote.add_ons_cost,
                quote.subtotal,
                quote.total_monthly_cost,
            ]
            .map(f64::to_bits)
        };
        assert!(first.is_success());
        assert_eq!(money(&first), money(&second));
        assert_eq!(first.number_of_units, second.number_of_units);
        assert_eq!(first.pricing_source, second.pricing_source);
    }

    #[tokio::test]
    async fn batch_keeps_order_and_failures_in_place() {
        let drafts = vec![
            draft("a", "Plano", "4YD", "1x/week"),
            draft("b", "Dallas", "8YD", "1x/week"),
            draft("c", "Mansfield", "6YD", "2x/week"),
        ];
        let quotes = service().generate_quotes(&custom_context(), &drafts).await;

        let ids: Vec<&str> = quotes.iter().map(|quote| quote.request_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(quotes[0].is_success());
        assert_eq!(quotes[1].status, QuoteStatus::Failed);
        assert_eq!(quotes[1].failure_kind, Some(FailureKind::NoPriceConfigured));
        assert!(
            quotes[1]
                .failure_reason
                .as_deref()
                .is_some_and(|reason| reason.contains("Container-Specific Pricing Rules"))
        );
        assert!(quotes[2].is_success());
    }

    #[tokio::test]
    async fn single_quote_uses_single_location_hint() {
        let quote = service()
            .generate_quote(&custom_context(), &draft("b", "Dallas", "8YD", "1x/week"))
            .await;
        assert!(
            quote
                .failure_reason
                .as_deref()
                .is_some_and(|reason| reason.contains("Price/YD"))
        );
    }

    #[tokio::test]
    async fn provider_errors_degrade_to_defaults() {
        let context = PricingContext::default().with_pricing_logic(PricingLogic::Custom(
            CustomPricing {
                custom_rules: Vec::new(),
                pricing_config: Some(PricingConfig {
                    large_container_price: 3.0,
                    ..PricingConfig::default()
                }),
            },
        ));
        let quote = service()
            .generate_quote(&context, &draft("x", "Broken", "8YD", "1x/week"))
            .await;
        assert!(quote.is_success());
        assert!((quote.local_tax_rate - 8.25).abs() < TOLERANCE);

        let mut elsewhere = draft("y", "Tulsa", "8YD", "1x/week");
        elsewhere.state = "OK".to_owned();
        let quote = service().generate_quote(&context, &elsewhere).await;
        assert!(quote.is_success());
    }

    #[tokio::test]
    async fn unresolvable_draft_fails_without_request() {
        let mut unresolvable = draft("z", "Plano", "4YD", "1x/week");
        unresolvable.frequency = Inheritable::InheritSelf;
        let quote = service()
            .generate_quote(&custom_context(), &unresolvable)
            .await;
        assert_eq!(quote.failure_kind, Some(FailureKind::Unexpected));
        assert!(quote.service_request.is_none());
    }

    #[tokio::test]
    async fn no_pricing_logic_is_missing_configuration() {
        let quote = service()
            .generate_quote(&PricingContext::default(), &draft("n", "Plano", "4YD", "1x/week"))
            .await;
        assert_eq!(quote.failure_kind, Some(FailureKind::MissingConfiguration));
    }
}

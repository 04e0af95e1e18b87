//! Core types and pricing engine for the haulquote waste-hauling quote generator.

/// Seven-step monthly cost pipeline.
pub mod calculator;
/// Frequency and container-size normalization.
pub mod frequency;
/// Service request models and the `auto-inherit` sentinel.
pub mod model;
/// Registry for plugging state-specific fee providers into the service.
pub mod plugin;
/// Traits describing the city fee provider interface.
pub mod ports;
/// Pricing configuration: modes, rules, rate sheets, and contract rates.
pub mod pricing;
/// Quote records and batch summaries.
pub mod quote;
/// Static Texas city to pricing region table.
pub mod region;
/// Strategy selection and the per-mode rate resolvers.
pub mod resolver;
/// High-level service facade used by clients.
pub mod service;

pub use calculator::*;
pub use frequency::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use pricing::*;
pub use quote::*;
pub use region::*;
pub use resolver::{FailureKind, GenerationScope, PricingFailure, Strategy, select_strategy};
pub use service::*;

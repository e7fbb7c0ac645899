//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated exchange ticker |
//! | [`RegulationInsight`] | Engine input extracted from a regulation |
//! | [`MarketSnapshot`] | Optional price/cap/beta data for one ticker |
//! | [`SecurityRisk`] | Scored security |
//! | [`SectorSummary`] | Sector aggregate with suggestion |
//! | [`Evaluation`] | Full engine output |

mod insight;
mod risk;
mod snapshot;
mod ticker;

pub use insight::RegulationInsight;
pub use risk::{Evaluation, SectorSummary, SecurityRisk};
pub use snapshot::MarketSnapshot;
pub use ticker::Ticker;

//! Response interpretation.
//!
//! ```text
//! bytes ── Document::parse ──┬─ error envelope / not found / malformed ─▶ ResponseError
//!          (document.rs)     │
//!                            ├─ RateV4Response / IntlRateV2Response ─▶ extract_rates  (rates.rs)
//!                            │                                          └─ limits_for_service + is_valid
//!                            └─ TrackResponse ─▶ extract_tracking                      (tracking.rs)
//!                                                 └─ narration rules ─▶ assemble
//! ```

#[path = "response/document.rs"]
mod document;
#[path = "response/rates.rs"]
mod rates;
#[path = "response/tracking.rs"]
mod tracking;

pub use document::{Document, Payload};
pub(crate) use rates::extract_rates;
pub use tracking::assemble;
pub(crate) use tracking::extract_tracking;

//! Local-first product catalog: baseline seed, overlays and the
//! reconciliation engine.

pub mod baseline;
pub mod overlay;
pub mod reconciler;

pub use baseline::{baseline, is_baseline_id, BASELINE_MAX_ID};
pub use overlay::OverlaySet;
pub use reconciler::{insertion_index, reconcile, sorted, Catalog, UpdateOutcome};

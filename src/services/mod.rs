pub mod engine;
pub mod indicators;
pub mod pipeline;
pub mod reconcile;
pub mod risk;
pub mod synthesizer;

pub use engine::{Analysis, LaneReport, SignalEngine};
pub use pipeline::{IndicatorColumns, IndicatorFrame};
pub use reconcile::{needs_secondary, reconcile};
pub use synthesizer::synthesize;

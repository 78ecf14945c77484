//! Report module - efficiency metric, geographic dominance and rendering

mod geo;
mod metric;
mod renderer;

pub use geo::{dominance_by_state, state_abbreviation, StateDominance};
pub use metric::{EfficiencyMetric, MethodEfficiency, MetricError, StateEfficiency};
pub use renderer::{Report, ReportRenderer};

// Personal baselines and the statistics behind them
pub mod baseline;
pub mod processed_stats;
pub mod stats;

pub use baseline::{BaselineTracker, PersonalBaseline};
pub use processed_stats::{ExtendedProcessedStats, ProcessedStats};
pub use stats::Stats;

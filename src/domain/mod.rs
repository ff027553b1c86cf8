// Analysis policy value objects
pub mod config;

// Domain-specific error types
pub mod errors;

// Metric catalogue and the per-match vector
pub mod metrics;
pub mod types;

// Personal baselines
pub mod performance;

// Tier-relative thresholds
pub mod thresholds;

// Tilt / flow detection and state classification
pub mod state;

// Metric-vs-rating correlation
pub mod correlation;

// Map, time-of-day and session patterns
pub mod patterns;

// Forward-looking alerts
pub mod warnings;
// Collaborator ports
pub mod ports;

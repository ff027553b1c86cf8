pub mod json_provider;
pub mod mock;

pub use json_provider::{JsonFileProvider, PlayerHistoryFile};
pub use mock::InMemoryPlayerStore;

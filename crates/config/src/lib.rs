pub mod ai;
pub mod settings;

pub use ai::{get_api_key, KeyLookup, KeySource};
pub use settings::{EnrichSettings, ProviderKind, Settings};

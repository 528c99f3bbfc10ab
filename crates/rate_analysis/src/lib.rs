pub mod chart;
pub mod comparison;
pub mod export;
pub mod filter;
pub mod format;
pub mod state;
pub mod stats;
pub mod table;

pub use filter::FilterCriteria;
pub use state::{Action, AppState};
pub use table::TableSort;

pub mod acquisition;
pub mod api;
pub mod error;
pub mod parser;
pub mod synthetic;

pub use acquisition::{Acquisition, ArchiveSource, DataOrigin, acquire};
pub use api::BnrAPI;
pub use error::BnrError;

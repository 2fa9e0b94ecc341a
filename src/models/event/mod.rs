pub mod types;
pub mod slots;
pub mod queries;

pub use types::*;
pub use queries::*;

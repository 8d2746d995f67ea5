pub mod config;
pub mod error;
pub mod handle_map;

pub use config::PvrConfig;
pub use error::{WinsysError, WinsysResult};
pub use handle_map::HandleMap;

pub mod cache;
pub mod dates;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod sync;

pub use error::{Result, SyncError};

mod error;
mod stores;
mod tables;
pub mod transitions;
mod utils;

pub use error::*;
pub use stores::*;
pub use tables::*;
pub use utils::*;

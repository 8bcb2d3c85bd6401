pub mod serialization;
pub mod storage;

pub use serialization::*;
pub use storage::*;

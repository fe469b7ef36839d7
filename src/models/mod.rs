pub mod bucket;
pub mod product;
pub mod transaction;

pub use bucket::*;
pub use product::*;
pub use transaction::*;

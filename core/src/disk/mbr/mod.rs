// MBR partition table engine

mod alloc;
mod table;
mod types;

pub use self::alloc::*;
pub use table::*;
pub use types::*;

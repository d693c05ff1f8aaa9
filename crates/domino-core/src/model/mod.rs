pub mod hands;
pub mod item;
pub mod party;
pub mod pool;
pub mod tile;

pub use hands::HandTargets;
pub use item::Item;
pub use party::{MAX_PARTIES, Party};
pub use pool::Pool;
pub use tile::{Pip, Tile};

pub mod pool;
pub mod position;
pub mod token;

// Re-export for easier access
pub use pool::{Pool, PoolKey, PoolMeta};
pub use position::Position;
pub use token::PositionToken;

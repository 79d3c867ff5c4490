pub mod firing_pool;

pub use firing_pool::FiringPool;

pub mod arena;
pub mod context;
pub mod math;
pub mod node;
pub mod scene;

pub mod check;
pub mod predict;
pub mod serve;

pub use check::check;
pub use predict::predict;
pub use serve::serve;

pub mod indicators;
pub mod market;
pub mod performance;
pub mod series;
pub mod signals;

pub use indicators::*;
pub use market::*;
pub use performance::*;
pub use series::*;
pub use signals::*;

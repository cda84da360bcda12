pub mod battery;
pub mod horizon;
pub mod series;

pub use battery::*;
pub use horizon::*;
pub use series::*;

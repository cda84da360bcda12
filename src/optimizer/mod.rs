pub mod builder;
pub mod checks;
pub mod constraints;
pub mod milp;
pub mod model;
pub mod types;

pub use builder::*;
pub use checks::*;
pub use constraints::*;
pub use milp::*;
pub use types::*;

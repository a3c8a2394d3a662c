pub mod filter_params;
pub mod health_check;
pub mod interactions;
pub mod matches;
pub mod properties;
pub mod recommendations;

pub use filter_params::*;
pub use health_check::*;
pub use interactions::*;
pub use matches::*;
pub use properties::*;
pub use recommendations::*;

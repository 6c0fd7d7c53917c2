pub mod actions;
pub mod batch;
pub mod combat;
pub mod env;
pub mod match_loop;
pub mod observation;
pub mod opponents;
pub mod physics;
pub mod policy;
pub mod reward;

pub use batch::*;
pub use env::*;
pub use match_loop::*;
pub use physics::*;
pub use policy::*;
pub use reward::*;

pub mod constraint;
pub mod problem;
pub mod variable;

pub use constraint::*;
pub use problem::*;
pub use variable::*;

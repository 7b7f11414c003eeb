pub mod domains;
pub mod engine;
pub mod outputs;

pub use domains::linear_program::parser::{ParseError, normalize_text, parse_model};
pub use engine::executor::{Algorithm, RequestSettings, SolveRequest, execute};
pub use outputs::{ExitStatus, SolveResponse};

pub mod canonical;

pub use canonical::{CanonicalForm, NameMap, VariableColumns, to_canonical_form, to_dual_start_form};

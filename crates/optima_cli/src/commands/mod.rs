pub mod follow_up;
pub mod info;
pub mod solve;

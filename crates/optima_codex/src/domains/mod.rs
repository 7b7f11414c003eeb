pub mod linear_program;

pub mod arithmetic;
pub mod cancel;
pub mod exponents;
pub mod functions;
pub mod logarithms;
pub mod matrix_ops;

pub mod general;
pub mod random;

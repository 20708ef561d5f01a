pub mod basic;
pub mod light;

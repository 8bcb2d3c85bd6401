pub mod spring;

pub use spring::*;

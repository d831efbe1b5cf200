pub mod core;
pub mod interfaces;

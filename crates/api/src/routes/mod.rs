pub mod analysis;
pub mod property;
pub mod share;

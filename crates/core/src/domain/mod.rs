pub mod analysis;
pub mod buyer;
pub mod contract;
pub mod decimal;
pub mod property;
pub mod share;
pub mod validation;

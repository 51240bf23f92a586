pub mod claim;
pub mod kind;
pub mod token;

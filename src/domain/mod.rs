pub mod errors;
pub mod models;
pub mod privacy;
pub mod stores;
pub mod validation;

pub mod providers;
pub mod stores;

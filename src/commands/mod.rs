pub mod contracts;
pub mod db;
pub mod entries;
pub mod lifecycle;
pub mod reports;
pub mod settings;
pub mod transfer;
pub mod validation;

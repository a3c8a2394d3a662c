pub mod configuration;
pub mod domain;
pub mod repositories;
pub mod startup;

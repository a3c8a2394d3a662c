pub mod configuration;
pub mod domain;
pub mod repositories;
pub mod routes;
pub mod startup;
pub mod use_cases;

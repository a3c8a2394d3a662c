pub mod listing_postgres_repository;

pub mod category_repository;
pub mod config;
pub mod database;
pub mod user_repository;

pub use category_repository::CategoryRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use user_repository::UserRepository;

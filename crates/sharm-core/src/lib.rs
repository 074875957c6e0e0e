pub mod category_service;
pub mod dto;
pub mod error;
pub mod models;
pub mod password;
pub mod token;
pub mod traits;
pub mod user_service;

#[cfg(test)]
pub(crate) mod testutil;

pub use category_service::CategoryService;
pub use error::AppError;
pub use models::{Category, Page, Role, User};
pub use token::{Claims, Requester, TokenKeys};
pub use traits::{CategoryStore, UserStore};
pub use user_service::{AuthenticatedUser, UserService};

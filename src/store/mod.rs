//! Persistence, one store per entity.

pub mod categories;
pub mod files;
pub mod products;
pub mod update;
pub mod users;

pub use categories::{CategoryField, CategoryStore};
pub use files::FileStore;
pub use products::{ProductField, ProductStore};
pub use update::{PartialUpdate, UpdateColumn};
pub use users::UserStore;

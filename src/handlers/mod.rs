//! Request handlers.
//!
//! Store-scoped resources share the generic handlers in [`resource`]; each
//! entity module only supplies its body parser and persistence calls.
//! Reads are public, writes pass through the [`gate`].

pub mod billboards;
pub mod categories;
pub mod gate;
pub mod health;
pub mod products;
pub mod resource;
pub mod stores;
pub mod swatches;

pub use billboards::Billboards;
pub use categories::Categories;
pub use products::Products;
pub use resource::StoreResource;
pub use swatches::{Colors, Sizes};

pub mod billboard;
pub mod category;
pub mod product;
pub mod store;
pub mod swatch;

pub use billboard::{Billboard, BillboardInput};
pub use category::{Category, CategoryDetail, CategoryInput};
pub use product::{Image, Product, ProductDetail, ProductFilter, ProductInput};
pub use store::{Store, StoreInput};
pub use swatch::{Color, Size, SwatchInput};

use serde::{Deserialize, Serialize};

/// Result of a delete-many or update-many call: the number of affected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPayload {
    pub count: u64,
}

impl BatchPayload {
    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

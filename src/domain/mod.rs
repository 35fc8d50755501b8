//! Domain types: categories, products, cart lines, purchases and sessions.

pub mod cart;
pub mod category;
pub mod product;
pub mod purchase;
pub mod session;

pub use cart::{Cart, CartLine};
pub use category::Category;
pub use product::{Product, ProductDraft, ProductId, ProductPatch};
pub use purchase::{PurchaseDraft, PurchaseItem, PurchaseRecord};
pub use session::{SessionStatus, SessionSummary};

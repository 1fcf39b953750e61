// Wire models for the inventory API plus the request payloads the pages submit.
pub mod movement;
pub mod product;
pub mod user;

pub use movement::{MovementType, StockMovement, StockUpdate};
pub use product::{NewProduct, Product, ProductUpdate, StockStatus};
pub use user::{Action, PasswordChange, Role, User};

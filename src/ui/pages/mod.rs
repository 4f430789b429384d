// src/ui/pages/mod.rs - Routed pages

mod home;
mod not_found;
mod product;

pub use home::Home;
pub use not_found::NotFound;
pub use product::Product;

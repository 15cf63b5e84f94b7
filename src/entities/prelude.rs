//! `SeaORM` Entity prelude

pub use super::orders::Entity as Orders;

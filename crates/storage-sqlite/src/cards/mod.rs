mod model;
mod repository;

pub use model::{CardDB, PriceAlertDB};
pub use repository::CardRepository;

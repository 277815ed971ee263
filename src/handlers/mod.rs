pub mod ai;
pub mod cards;
pub mod collections;
pub mod health;
pub mod ocr;
pub mod users;

pub use ai::generate_cards;
pub use cards::{
    collection_cards, create_card, create_cards_bulk, delete_card, due_cards, review_card,
    update_card,
};
pub use collections::{
    create_collection, delete_collection, get_collection, list_collections, update_collection,
};
pub use health::{api_index, health};
pub use ocr::extract_text;
pub use users::{current_user, update_current_user, update_limits};

pub mod auth_form;
pub mod cost_calculator;
pub mod dashboard;
pub mod image_uploader;
pub mod item_card;
pub mod items_list;
pub mod listing_wizard;
pub mod owner_tools;
pub mod profile_editor;
pub mod review_form;
pub mod reviews_list;
pub mod toast;
pub mod wishlist_button;

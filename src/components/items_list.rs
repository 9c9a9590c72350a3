/// Grid of listing cards used by the browse and wishlist pages.
use leptos::*;

use crate::components::item_card::ItemCard;
use crate::models::Item;

#[component]
pub fn ItemsList(items: Vec<Item>, #[prop(optional, into)] empty_message: Option<String>) -> impl IntoView {
    if items.is_empty() {
        let message = empty_message.unwrap_or_else(|| "No items match your search.".to_string());
        return view! { <p class="empty">{ message }</p> }.into_view();
    }
    view! {
        <div class="item-grid">
            { items.into_iter().map(|item| view! { <ItemCard item=item /> }).collect_view() }
        </div>
    }
    .into_view()
}

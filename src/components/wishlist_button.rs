use leptos::*;

use crate::app::Session;
use crate::components::toast::use_toasts;
use crate::models::WishlistToggle;

/// Heart button on the item page.
#[component]
pub fn WishlistButton(item_id: String, saved: bool) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let state = create_rw_signal(WishlistToggle::new(saved));
    let item_id = store_value(item_id);

    let on_click = move |_| {
        if !session.is_signed_in() {
            toasts.error("Sign in to save items to your wishlist");
            return;
        }
        let mut started = false;
        state.update(|s| started = s.begin());
        if !started {
            return;
        }
        let client = session.client();
        spawn_local(async move {
            match client.toggle_wishlist(&item_id.get_value()).await {
                Ok(saved) => state.update(|s| s.settle(saved)),
                Err(e) => {
                    state.update(|s| s.fail());
                    toasts.error(e.to_string());
                }
            }
        });
    };

    view! {
        <button
            class="wishlist-button"
            class:saved=move || state.with(|s| s.is_saved())
            disabled=move || state.with(|s| s.is_pending())
            on:click=on_click
        >
            { move || if state.with(|s| s.is_saved()) { "♥ Saved" } else { "♡ Save" } }
        </button>
    }
}

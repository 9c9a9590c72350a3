use leptos::*;
use leptos_router::{use_navigate, NavigateOptions};

use crate::app::Session;
use crate::components::image_uploader::ImageUploader;
use crate::components::toast::use_toasts;
use crate::models::Item;

/// Photo editing and deletion, shown on the item page to its owner.
#[component]
pub fn OwnerTools(item: Item) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let navigate = use_navigate();
    let item_id = store_value(item.id.clone());
    let (deleting, set_deleting) = create_signal(false);

    // Each change to the photo list is saved right away; the server drops
    // objects that are no longer referenced. The uploader keeps the last
    // photo, so an empty list never reaches here from a removal.
    let on_images = Callback::new(move |images: Vec<String>| {
        if images.is_empty() {
            toasts.error("Keep at least one photo on a listing");
            return;
        }
        let client = session.client();
        spawn_local(async move {
            match client.replace_images(&item_id.get_value(), images).await {
                Ok(_) => toasts.success("Photos updated"),
                Err(e) => toasts.error(e.to_string()),
            }
        });
    });

    let delete = move |_| {
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message("Delete this listing?").ok())
            .unwrap_or(false);
        if !confirmed {
            return;
        }
        let client = session.client();
        let navigate = navigate.clone();
        set_deleting.set(true);
        spawn_local(async move {
            match client.delete_listing(&item_id.get_value()).await {
                Ok(()) => {
                    toasts.success("Listing deleted");
                    navigate("/dashboard", NavigateOptions::default());
                }
                Err(e) => {
                    toasts.error(e.to_string());
                    set_deleting.set(false);
                }
            }
        });
    };

    view! {
        <section class="owner-tools">
            <h3>{ "Manage your listing" }</h3>
            <ImageUploader initial=item.images on_change=on_images min_images=1/>
            <button type="button" class="danger" disabled=deleting on:click=delete>
                { "Delete listing" }
            </button>
        </section>
    }
}

use leptos::*;
use leptos_router::A;

use crate::models::{Item, VerificationStatus};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Grid tile linking to the item page.
#[component]
pub fn ItemCard(item: Item) -> impl IntoView {
    let href = format!("/items/{}", item.id);
    let cover = item.cover_image().unwrap_or(PLACEHOLDER_IMAGE).to_string();
    let verified = item.verification == VerificationStatus::Verified;
    view! {
        <A href=href class="item-card">
            <img
                src=cover
                alt=item.title.clone()
                loading="lazy"
                on:error=|ev| {
                    use wasm_bindgen::JsCast;
                    if let Some(img) = ev
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::HtmlImageElement>().ok())
                    {
                        img.set_src(PLACEHOLDER_IMAGE);
                    }
                }
            />
            <div class="item-card-body">
                <h3>{ item.title.clone() }</h3>
                <p class="price">{ format!("₹{} / day", item.price_per_day) }</p>
                <p class="location">{ item.location.clone() }</p>
                <Show when=move || verified>
                    <span class="badge">{ "Verified" }</span>
                </Show>
            </div>
        </A>
    }
}

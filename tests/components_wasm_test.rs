#![cfg(target_arch = "wasm32")]

use chrono::Utc;
use gloo_timers::future::sleep;
use leptos::*;
use leptos_router::Router;
use rentnest::app::Session;
use rentnest::client::{store_token, stored_token};
use rentnest::components::listing_wizard::ListingWizardForm;
use rentnest::components::reviews_list::ReviewsList;
use rentnest::components::toast::{ToastHost, Toasts};
use rentnest::components::wishlist_button::WishlistButton;
use rentnest::models::{AuthSession, Profile, Review};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn container(id: &str) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.create_element("div").unwrap();
    container.set_id(id);
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn cleanup(container: &web_sys::Element) {
    let document = web_sys::window().unwrap().document().unwrap();
    document.body().unwrap().remove_child(container).unwrap();
}

fn review(rating: u8, author: &str) -> Review {
    Review {
        id: format!("r-{}", author),
        item_id: "item-1".into(),
        author_id: author.into(),
        author_name: author.into(),
        rating,
        comment: "Worked great".into(),
        created_at: Utc::now(),
    }
}

#[wasm_bindgen_test]
async fn reviews_list_shows_summary_and_updates() {
    let container = container("reviews-test");
    let reviews = create_rw_signal(vec![review(5, "Asha"), review(4, "Ravi")]);

    mount_to(container.clone().unchecked_into(), move || {
        view! { <ReviewsList reviews=reviews/> }
    });
    sleep(Duration::from_millis(50)).await;

    let text = container.text_content().unwrap_or_default();
    assert!(text.contains("4.5 (2 reviews)"), "unexpected summary: {}", text);
    assert!(text.contains("Asha"));

    reviews.update(|r| r.push(review(3, "Meera")));
    sleep(Duration::from_millis(50)).await;
    let text = container.text_content().unwrap_or_default();
    assert!(text.contains("(3 reviews)"), "summary did not refresh: {}", text);

    cleanup(&container);
}

#[wasm_bindgen_test]
async fn wishlist_button_asks_signed_out_users_to_sign_in() {
    let container = container("wishlist-test");

    mount_to(container.clone().unchecked_into(), move || {
        provide_context(Session::new());
        provide_context(Toasts::new());
        view! {
            <WishlistButton item_id="item-1".to_string() saved=false/>
            <ToastHost/>
        }
    });
    sleep(Duration::from_millis(50)).await;

    let button = container
        .query_selector("button.wishlist-button")
        .unwrap()
        .expect("wishlist button rendered")
        .unchecked_into::<web_sys::HtmlElement>();
    assert_eq!(button.text_content().unwrap_or_default(), "♡ Save");
    button.click();
    sleep(Duration::from_millis(50)).await;

    let text = container.text_content().unwrap_or_default();
    assert!(text.contains("Sign in to save items"), "no toast shown: {}", text);
    assert!(text.contains("♡ Save"), "state changed without a session");

    cleanup(&container);
}

#[wasm_bindgen_test]
fn session_token_round_trips_through_local_storage() {
    assert!(store_token(Some("token-123")));
    assert_eq!(stored_token().as_deref(), Some("token-123"));
    assert!(store_token(None));
    assert_eq!(stored_token(), None);
}

#[wasm_bindgen_test]
async fn listing_wizard_opens_on_first_step_for_signed_in_user() {
    let container = container("wizard-test");

    mount_to(container.clone().unchecked_into(), move || {
        let session = Session::new();
        session.sign_in(AuthSession {
            token: "token-abc".into(),
            profile: Profile {
                id: "user-1".into(),
                email: "asha@example.com".into(),
                display_name: "Asha".into(),
                avatar_url: None,
                phone: "+91 90000 00000".into(),
                whatsapp: None,
                created_at: Utc::now(),
            },
        });
        provide_context(session);
        provide_context(Toasts::new());
        view! {
            <Router>
                <ListingWizardForm/>
            </Router>
        }
    });
    sleep(Duration::from_millis(50)).await;

    let text = container.text_content().unwrap_or_default();
    assert!(text.contains("Step 1 of 5: Item details"), "unexpected wizard: {}", text);
    assert!(!text.contains("Publish listing"));
    let back = container
        .query_selector(".wizard-nav button")
        .unwrap()
        .expect("back button rendered");
    assert!(back.has_attribute("disabled"));

    store_token(None);
    cleanup(&container);
}

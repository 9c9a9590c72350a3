use leptos::*;
use leptos::ev::SubmitEvent;

use crate::app::Session;
use crate::components::toast::use_toasts;
use crate::models::{NewReview, Review};

#[component]
pub fn ReviewForm(item_id: String, on_added: Callback<Review>) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let (comment, set_comment) = create_signal(String::new());
    let (rating, set_rating) = create_signal(5u8); // Default rating to 5
    let (sending, set_sending) = create_signal(false);
    let item_id = store_value(item_id);

    let submit_review = move |ev: SubmitEvent| {
        ev.prevent_default();
        let review = match (NewReview {
            rating: rating.get_untracked(),
            comment: comment.get_untracked(),
        })
        .validate()
        {
            Ok(review) => review,
            Err(e) => {
                toasts.error(e.to_string());
                return;
            }
        };
        let client = session.client();
        set_sending.set(true);
        spawn_local(async move {
            match client.add_review(&item_id.get_value(), &review).await {
                Ok(review) => {
                    set_comment.set(String::new());
                    set_rating.set(5);
                    toasts.success("Thanks for your review!");
                    on_added.call(review);
                }
                Err(e) => toasts.error(e.to_string()),
            }
            set_sending.set(false);
        });
    };

    view! {
        <form class="review-form" on:submit=submit_review>
            <h3>{ "Write a Review" }</h3>
            <label>
                { "Rating (1-5)" }
                <input
                    type="number"
                    min="1"
                    max="5"
                    prop:value=move || rating.get().to_string()
                    on:input=move |e| set_rating.set(event_target_value(&e).parse::<u8>().unwrap_or(5))
                />
            </label>
            <textarea
                placeholder="How was it?"
                prop:value=comment
                on:input=move |e| set_comment.set(event_target_value(&e))
            />
            <button type="submit" disabled=sending>{ "Submit Review" }</button>
        </form>
    }
}

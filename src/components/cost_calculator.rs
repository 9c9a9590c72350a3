use chrono::NaiveDate;
use leptos::*;

use crate::app::Session;
use crate::components::toast::use_toasts;
use crate::models::{Item, NewBooking};
use crate::pricing::{quote, Quote};

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Date pickers with a live price breakdown and a request button.
#[component]
pub fn CostCalculator(item: Item) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let item = store_value(item);
    let (start, set_start) = create_signal(None::<NaiveDate>);
    let (end, set_end) = create_signal(None::<NaiveDate>);
    let (requesting, set_requesting) = create_signal(false);

    let priced = create_memo(move |_| -> Option<Result<Quote, String>> {
        let (start, end) = (start.get()?, end.get()?);
        Some(item.with_value(|item| quote(item, start, end)).map_err(|e| e.to_string()))
    });

    let is_own = move || {
        session
            .user()
            .map(|u| item.with_value(|i| i.owner_id == u.id))
            .unwrap_or(false)
    };

    let request = move |_| {
        let (Some(start_date), Some(end_date)) = (start.get_untracked(), end.get_untracked()) else {
            return;
        };
        if !session.is_signed_in() {
            toasts.error("Sign in to request a booking");
            return;
        }
        let booking = NewBooking {
            item_id: item.with_value(|i| i.id.clone()),
            start_date,
            end_date,
        };
        let client = session.client();
        set_requesting.set(true);
        spawn_local(async move {
            match client.book(&booking).await {
                Ok(_) => toasts.success("Booking requested. The owner will confirm soon."),
                Err(e) => toasts.error(e.to_string()),
            }
            set_requesting.set(false);
        });
    };

    view! {
        <div class="cost-calculator">
            <h3>{ "Rental cost" }</h3>
            <label>{ "From" }
                <input type="date" on:input=move |e| set_start.set(parse_date(&event_target_value(&e)))/>
            </label>
            <label>{ "To" }
                <input type="date" on:input=move |e| set_end.set(parse_date(&event_target_value(&e)))/>
            </label>
            { move || match priced.get() {
                None => view! { <p class="hint">{ "Pick dates to see the total." }</p> }.into_view(),
                Some(Err(message)) => view! { <p class="error">{ message }</p> }.into_view(),
                Some(Ok(q)) => view! {
                    <table class="quote">
                        <tr><td>{ format!("{} day(s) × ₹{}", q.days, item.with_value(|i| i.price_per_day)) }</td><td>{ format!("₹{}", q.rent) }</td></tr>
                        <tr><td>{ "Security deposit" }</td><td>{ format!("₹{}", q.deposit) }</td></tr>
                        <tr class="total"><td>{ "Total" }</td><td>{ format!("₹{}", q.total) }</td></tr>
                    </table>
                }.into_view(),
            } }
            <button
                type="button"
                disabled=move || requesting.get() || is_own() || !matches!(priced.get(), Some(Ok(_)))
                on:click=request
            >
                { "Request booking" }
            </button>
        </div>
    }
}

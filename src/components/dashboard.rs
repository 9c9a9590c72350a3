use leptos::*;

use crate::analytics::OwnerStats;
use crate::app::Session;
use crate::components::profile_editor::ProfileEditor;
use crate::components::toast::use_toasts;
use crate::models::{Booking, BookingStatus};

/// Earnings per month as horizontal bars scaled to the best month.
#[component]
fn EarningsChart(series: Vec<(String, u64)>) -> impl IntoView {
    let peak = series.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1);
    view! {
        <div class="earnings-chart">
            { if series.is_empty() {
                view! { <p class="hint">{ "No earnings yet." }</p> }.into_view()
            } else {
                series.into_iter().map(|(month, amount)| {
                    let width = amount * 100 / peak;
                    view! {
                        <div class="bar-row">
                            <span class="bar-label">{ month }</span>
                            <div class="bar" style:width=format!("{}%", width)></div>
                            <span class="bar-value">{ format!("₹{}", amount) }</span>
                        </div>
                    }
                }).collect_view()
            } }
        </div>
    }
}

#[component]
fn StatsPanel(stats: OwnerStats) -> impl IntoView {
    view! {
        <div class="stats">
            <div class="stat"><strong>{ stats.total_listings }</strong>{ " listings" }</div>
            <div class="stat"><strong>{ stats.verified_listings }</strong>{ " verified" }</div>
            <div class="stat"><strong>{ stats.pending_bookings }</strong>{ " pending requests" }</div>
            <div class="stat"><strong>{ stats.active_bookings }</strong>{ " active rentals" }</div>
            <div class="stat"><strong>{ stats.completed_bookings }</strong>{ " completed" }</div>
            <div class="stat"><strong>{ format!("₹{}", stats.total_earnings) }</strong>{ " earned" }</div>
            <div class="stat">
                <strong>{ format!("{:.1}", stats.rating.average) }</strong>
                { format!(" average from {} review(s)", stats.rating.count) }
            </div>
        </div>
        <h3>{ "Monthly earnings" }</h3>
        <EarningsChart series=stats.monthly_earnings/>
    }
}

/// One booking row with the actions the viewer is allowed to take.
#[component]
fn BookingRow(booking: Booking, as_owner: bool, on_change: Callback<Booking>) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let id = store_value(booking.id.clone());
    let status = booking.status;

    let change = move |next: BookingStatus| {
        let client = session.client();
        spawn_local(async move {
            match client.set_booking_status(&id.get_value(), next).await {
                Ok(updated) => on_change.call(updated),
                Err(e) => toasts.error(e.to_string()),
            }
        });
    };

    let actions: Vec<(BookingStatus, &'static str)> = if as_owner {
        vec![
            (BookingStatus::Confirmed, "Confirm"),
            (BookingStatus::Completed, "Mark returned"),
            (BookingStatus::Cancelled, "Decline"),
        ]
    } else {
        vec![(BookingStatus::Cancelled, "Cancel")]
    };

    view! {
        <tr>
            <td>{ format!("{} → {}", booking.start_date, booking.end_date) }</td>
            <td>{ format!("₹{}", booking.total_price) }</td>
            <td class=format!("status {}", status.as_str())>{ status.as_str() }</td>
            <td>
                { actions.into_iter()
                    .filter(|(next, _)| status.can_transition_to(*next))
                    .map(|(next, label)| view! {
                        <button type="button" on:click=move |_| change(next)>{ label }</button>
                    })
                    .collect_view() }
            </td>
        </tr>
    }
}

#[component]
fn BookingTable(
    title: &'static str,
    bookings: RwSignal<Vec<Booking>>,
    as_owner: bool,
) -> impl IntoView {
    let on_change = Callback::new(move |updated: Booking| {
        bookings.update(|list| {
            if let Some(slot) = list.iter_mut().find(|b| b.id == updated.id) {
                *slot = updated;
            }
        });
    });
    view! {
        <h3>{ title }</h3>
        <table class="bookings">
            <For
                each=move || bookings.get()
                key=|b| (b.id.clone(), b.status)
                children=move |booking| view! { <BookingRow booking=booking as_owner=as_owner on_change=on_change/> }
            />
        </table>
    }
}

/// The signed-in user's dashboard: listing stats plus bookings on both sides.
#[component]
pub fn Dashboard() -> impl IntoView {
    let session = expect_context::<Session>();
    // Rebuilding the editor on every profile save would reset its inputs.
    let signed_in_as = create_memo(move |_| session.user().map(|u| u.id));
    let stats = create_local_resource(
        move || session.is_signed_in(),
        move |signed_in| async move {
            if !signed_in {
                return None;
            }
            session.client().dashboard().await.ok()
        },
    );
    let incoming = create_rw_signal(Vec::<Booking>::new());
    let outgoing = create_rw_signal(Vec::<Booking>::new());
    let bookings = create_local_resource(
        move || session.is_signed_in(),
        move |signed_in| async move {
            if signed_in {
                session.client().my_bookings().await.ok()
            } else {
                None
            }
        },
    );
    create_effect(move |_| {
        if let Some(Some(mine)) = bookings.get() {
            incoming.set(mine.as_owner);
            outgoing.set(mine.as_renter);
        }
    });

    view! {
        <section class="dashboard">
            <h2>{ "Dashboard" }</h2>
            { move || signed_in_as.get().and_then(|_| untrack(|| session.user())).map(|profile| view! {
                <ProfileEditor profile=profile/>
            }) }
            <Transition fallback=|| view! { <p>{ "Loading…" }</p> }>
                { move || stats.get().map(|stats| match stats {
                    Some(stats) => view! { <StatsPanel stats=stats/> }.into_view(),
                    None => view! { <p>{ "Sign in to see your dashboard." }</p> }.into_view(),
                }) }
            </Transition>
            <BookingTable title="Requests for your items" bookings=incoming as_owner=true/>
            <BookingTable title="Your rentals" bookings=outgoing as_owner=false/>
        </section>
    }
}

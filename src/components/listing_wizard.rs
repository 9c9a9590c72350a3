use chrono::NaiveDate;
use leptos::*;
use leptos_router::{use_navigate, NavigateOptions, A};

use crate::app::Session;
use crate::components::image_uploader::ImageUploader;
use crate::components::toast::use_toasts;
use crate::listing::{submit_listing, validate_draft, ListingWizard, WizardStep};
use crate::models::Category;
use crate::utils::leptos_owner::with_owner_safe;

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn date_value(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// The "list an item" form: five steps over one draft, a progress bar and
/// a final submit that redirects to the new listing.
#[component]
pub fn ListingWizardForm() -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let navigate = use_navigate();
    let wizard = create_rw_signal(ListingWizard::new());
    let (submitting, set_submitting) = create_signal(false);

    let step = create_memo(move |_| wizard.with(|w| w.step()));
    let issues = create_memo(move |_| wizard.with(|w| w.step_issues()));

    let on_images = Callback::new(move |images: Vec<String>| {
        wizard.update(|w| w.draft.images = images);
    });

    let submit = Callback::new(move |_: ev::MouseEvent| {
        let Some(user) = session.user() else {
            toasts.error("Sign in to publish a listing");
            return;
        };
        let draft = wizard.with_untracked(|w| w.draft.clone());
        let client = session.client();
        let navigate = navigate.clone();
        let owner = Owner::current();
        set_submitting.set(true);
        spawn_local(async move {
            match submit_listing(&client, &user.id, &draft).await {
                Ok(outcome) => {
                    toasts.success("Your item is listed!");
                    let target = outcome.redirect_to.clone();
                    set_timeout(
                        move || {
                            with_owner_safe(owner, "listing redirect", || {
                                navigate(&target, NavigateOptions::default())
                            });
                        },
                        outcome.redirect_after,
                    );
                }
                Err(e) => {
                    toasts.error(e.to_string());
                    set_submitting.set(false);
                }
            }
        });
    });

    let details = move || {
        view! {
            <label>{ "Title" }
                <input
                    type="text"
                    prop:value=move || wizard.with(|w| w.draft.title.clone())
                    on:input=move |e| wizard.update(|w| w.draft.title = event_target_value(&e))
                />
            </label>
            <label>{ "Category" }
                <select on:change=move |e| {
                    let slug = event_target_value(&e);
                    wizard.update(|w| w.draft.category = Category::from_slug(&slug));
                }>
                    <option value="" selected=move || wizard.with(|w| w.draft.category.is_none())>
                        { "Choose…" }
                    </option>
                    { Category::ALL.into_iter().map(|c| view! {
                        <option
                            value=c.slug()
                            selected=move || wizard.with(|w| w.draft.category == Some(c))
                        >
                            { c.label() }
                        </option>
                    }).collect_view() }
                </select>
            </label>
            <label>{ "Description" }
                <textarea
                    prop:value=move || wizard.with(|w| w.draft.description.clone())
                    on:input=move |e| wizard.update(|w| w.draft.description = event_target_value(&e))
                />
            </label>
            <label>{ "Location" }
                <input
                    type="text"
                    prop:value=move || wizard.with(|w| w.draft.location.clone())
                    on:input=move |e| wizard.update(|w| w.draft.location = event_target_value(&e))
                />
            </label>
        }
        .into_view()
    };

    let pricing = move || {
        view! {
            <label>{ "Price per day (₹)" }
                <input
                    type="number"
                    min="1"
                    prop:value=move || wizard.with(|w| w.draft.price_per_day.map(|p| p.to_string()).unwrap_or_default())
                    on:input=move |e| {
                        let price = event_target_value(&e).parse::<u32>().ok();
                        wizard.update(|w| w.draft.price_per_day = price);
                    }
                />
            </label>
            <label>{ "Security deposit (₹)" }
                <input
                    type="number"
                    min="0"
                    prop:value=move || wizard.with(|w| w.draft.deposit.to_string())
                    on:input=move |e| {
                        let deposit = event_target_value(&e).parse::<u32>().unwrap_or(0);
                        wizard.update(|w| w.draft.deposit = deposit);
                    }
                />
            </label>
        }
        .into_view()
    };

    let photos = move || {
        let initial = wizard.with_untracked(|w| w.draft.images.clone());
        view! { <ImageUploader initial=initial on_change=on_images /> }.into_view()
    };

    let availability = move || {
        view! {
            <label>{ "Available from" }
                <input
                    type="date"
                    prop:value=move || wizard.with(|w| date_value(w.draft.available_from))
                    on:input=move |e| {
                        let date = parse_date(&event_target_value(&e));
                        wizard.update(|w| w.draft.available_from = date);
                    }
                />
            </label>
            <label>{ "Available until (optional)" }
                <input
                    type="date"
                    prop:value=move || wizard.with(|w| date_value(w.draft.available_to))
                    on:input=move |e| {
                        let date = parse_date(&event_target_value(&e));
                        wizard.update(|w| w.draft.available_to = date);
                    }
                />
            </label>
        }
        .into_view()
    };

    let review = move || {
        let draft = wizard.with(|w| w.draft.clone());
        let problems = validate_draft(&draft).err().unwrap_or_default();
        view! {
            <dl class="summary">
                <dt>{ "Title" }</dt><dd>{ draft.title.clone() }</dd>
                <dt>{ "Category" }</dt><dd>{ draft.category.map(|c| c.label()).unwrap_or("-") }</dd>
                <dt>{ "Price" }</dt>
                <dd>{ format!("₹{} / day, ₹{} deposit", draft.price_per_day.unwrap_or(0), draft.deposit) }</dd>
                <dt>{ "Location" }</dt><dd>{ draft.location.clone() }</dd>
                <dt>{ "Photos" }</dt><dd>{ draft.images.len() }</dd>
            </dl>
            <ul class="problems">
                { problems.into_iter().map(|p| view! { <li>{ p }</li> }).collect_view() }
            </ul>
        }
        .into_view()
    };

    view! {
        <Show
            when=move || session.is_signed_in()
            fallback=|| view! { <p>{ "Please " }<A href="/login">{ "sign in" }</A>{ " to list an item." }</p> }
        >
            <div class="wizard">
                <div class="wizard-progress">
                    <div
                        class="wizard-progress-bar"
                        style:width=move || format!("{}%", wizard.with(|w| w.progress_percent()))
                    ></div>
                </div>
                <h2>{ move || format!(
                    "Step {} of {}: {}",
                    wizard.with(|w| w.step_index()) + 1,
                    ListingWizard::TOTAL_STEPS,
                    step.get().title()
                ) }</h2>
                { move || match step.get() {
                    WizardStep::Details => details(),
                    WizardStep::Pricing => pricing(),
                    WizardStep::Photos => photos(),
                    WizardStep::Availability => availability(),
                    WizardStep::Review => review(),
                } }
                <ul class="step-issues">
                    { move || issues.get().into_iter().map(|i| view! { <li>{ i }</li> }).collect_view() }
                </ul>
                <div class="wizard-nav">
                    <button
                        type="button"
                        disabled=move || wizard.with(|w| w.is_first())
                        on:click=move |_| { wizard.update(|w| { w.back(); }); }
                    >
                        { "Back" }
                    </button>
                    <Show
                        when=move || wizard.with(|w| w.is_last())
                        fallback=move || view! {
                            <button type="button" on:click=move |_| { wizard.update(|w| { w.next(); }); }>
                                { "Next" }
                            </button>
                        }
                    >
                        <button type="button" disabled=submitting on:click=move |e| submit.call(e)>
                            { "Publish listing" }
                        </button>
                    </Show>
                </div>
            </div>
        </Show>
    }
}

/// Root component and pages for RentNest.
/// The session lives in context so every component can reach the API client.
use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::client::{store_token, stored_token, ApiClient};
use crate::components::auth_form::AuthForm;
use crate::components::cost_calculator::CostCalculator;
use crate::components::dashboard::Dashboard;
use crate::components::items_list::ItemsList;
use crate::components::listing_wizard::ListingWizardForm;
use crate::components::owner_tools::OwnerTools;
use crate::components::review_form::ReviewForm;
use crate::components::reviews_list::ReviewsList;
use crate::components::toast::{ToastHost, Toasts};
use crate::components::wishlist_button::WishlistButton;
use crate::models::{AuthSession, Category, Profile, Review};
use crate::search::{ItemFilter, SortOrder};

/// Signed-in state shared through context.
#[derive(Clone, Copy)]
pub struct Session {
    auth: RwSignal<Option<AuthSession>>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            auth: create_rw_signal(None),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth.with(|a| a.is_some())
    }

    pub fn user(&self) -> Option<Profile> {
        self.auth.with(|a| a.as_ref().map(|a| a.profile.clone()))
    }

    /// Client carrying the current token, if any.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.auth.with_untracked(|a| a.as_ref().map(|a| a.token.clone())))
    }

    pub fn sign_in(&self, auth: AuthSession) {
        store_token(Some(&auth.token));
        self.auth.set(Some(auth));
    }

    pub fn sign_out(&self) {
        let client = self.client();
        store_token(None);
        self.auth.set(None);
        spawn_local(async move {
            if let Err(e) = client.sign_out().await {
                logging::warn!("[AUTH] Sign-out request failed: {}", e);
            }
        });
    }

    /// Keeps the navbar in sync after a profile edit.
    pub fn set_profile(&self, profile: Profile) {
        self.auth.update(|a| {
            if let Some(a) = a {
                a.profile = profile;
            }
        });
    }

    /// Picks up a token left in local storage by an earlier visit.
    fn restore(&self) {
        let Some(token) = stored_token() else {
            return;
        };
        let this = *self;
        spawn_local(async move {
            match ApiClient::new(Some(token.clone())).me().await {
                Ok(profile) => this.auth.set(Some(AuthSession { token, profile })),
                Err(e) => {
                    logging::log!("[AUTH] Stored session rejected: {}", e);
                    store_token(None);
                }
            }
        });
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let session = Session::new();
    provide_context(session);
    provide_context(Toasts::new());

    // Runs once in the browser after hydration.
    create_effect(move |_| session.restore());

    view! {
        <Stylesheet id="leptos" href="/pkg/rentnest.css"/>
        <Title text="RentNest"/>
        <Router>
            <NavBar/>
            <main>
                <Routes>
                    <Route path="/" view=HomePage/>
                    <Route path="/items/:id" view=ItemPage/>
                    <Route path="/list" view=ListPage/>
                    <Route path="/wishlist" view=WishlistPage/>
                    <Route path="/dashboard" view=Dashboard/>
                    <Route path="/login" view=AuthForm/>
                </Routes>
            </main>
            <ToastHost/>
        </Router>
    }
}

#[component]
fn NavBar() -> impl IntoView {
    let session = expect_context::<Session>();
    view! {
        <nav class="navbar">
            <A href="/" class="brand">{ "RentNest" }</A>
            <A href="/list">{ "List an item" }</A>
            <A href="/wishlist">{ "Wishlist" }</A>
            <A href="/dashboard">{ "Dashboard" }</A>
            { move || match session.user() {
                Some(user) => view! {
                    <span class="user">
                        <img class="avatar" src=user.avatar() alt=user.display_name.clone()/>
                        { user.display_name.clone() }
                    </span>
                    <button type="button" on:click=move |_| session.sign_out()>{ "Sign out" }</button>
                }.into_view(),
                None => view! { <A href="/login">{ "Sign in" }</A> }.into_view(),
            } }
        </nav>
    }
}

#[component]
fn SearchBar(filter: RwSignal<ItemFilter>) -> impl IntoView {
    let sorts = [
        (SortOrder::Newest, "Newest"),
        (SortOrder::PriceLow, "Price: low to high"),
        (SortOrder::PriceHigh, "Price: high to low"),
    ];
    view! {
        <div class="search-bar">
            <input
                type="search"
                placeholder="Search cameras, tents, drills…"
                on:change=move |e| {
                    let query = event_target_value(&e);
                    filter.update(|f| f.query = (!query.trim().is_empty()).then_some(query));
                }
            />
            <select on:change=move |e| {
                let slug = event_target_value(&e);
                filter.update(|f| f.category = Category::from_slug(&slug));
            }>
                <option value="">{ "All categories" }</option>
                { Category::ALL.into_iter().map(|c| view! {
                    <option value=c.slug()>{ c.label() }</option>
                }).collect_view() }
            </select>
            <select on:change=move |e| {
                let chosen = event_target_value(&e);
                let sort = sorts
                    .iter()
                    .map(|(s, _)| *s)
                    .find(|s| s.as_str() == chosen)
                    .unwrap_or_default();
                filter.update(|f| f.sort = sort);
            }>
                { sorts.into_iter().map(|(s, label)| view! {
                    <option value=s.as_str()>{ label }</option>
                }).collect_view() }
            </select>
            <label class="inline">
                <input
                    type="checkbox"
                    on:change=move |e| {
                        let checked = event_target_checked(&e);
                        filter.update(|f| f.verified_only = checked);
                    }
                />
                { "Verified only" }
            </label>
        </div>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let session = expect_context::<Session>();
    let filter = create_rw_signal(ItemFilter::default());
    let items = create_local_resource(
        move || filter.get(),
        move |filter| async move { session.client().items(&filter).await },
    );

    view! {
        <section class="home">
            <h1>{ "Rent what you need, from people nearby" }</h1>
            <SearchBar filter=filter/>
            <Transition fallback=|| view! { <p>{ "Loading items…" }</p> }>
                { move || items.get().map(|result| match result {
                    Ok(items) => view! {
                        <ItemsList items=items empty_message="No items match your search."/>
                    }.into_view(),
                    Err(e) => view! { <p class="error">{ e.to_string() }</p> }.into_view(),
                }) }
            </Transition>
        </section>
    }
}

#[component]
fn ItemPage() -> impl IntoView {
    let session = expect_context::<Session>();
    let params = use_params_map();
    let id = move || params.with(|p| p.get("id").cloned().unwrap_or_default());
    let detail = create_local_resource(
        move || (id(), session.is_signed_in()),
        move |(id, _)| async move { session.client().item(&id).await },
    );
    let reviews = create_rw_signal(Vec::<Review>::new());
    create_effect(move |_| {
        if let Some(Ok(detail)) = detail.get() {
            reviews.set(detail.reviews);
        }
    });
    let on_added = Callback::new(move |review: Review| reviews.update(|r| r.insert(0, review)));

    view! {
        <Transition fallback=|| view! { <p>{ "Loading…" }</p> }>
            { move || detail.get().map(|result| match result {
                Err(e) => view! { <p class="error">{ e.to_string() }</p> }.into_view(),
                Ok(detail) => {
                    let item = detail.item.clone();
                    let is_owner = session
                        .user()
                        .map(|u| u.id == item.owner_id)
                        .unwrap_or(false);
                    view! {
                        <article class="item-page">
                            <div class="gallery">
                                { item.images.iter().map(|src| view! {
                                    <img src=src.clone() alt=item.title.clone()/>
                                }).collect_view() }
                            </div>
                            <h1>{ item.title.clone() }</h1>
                            <p class="meta">
                                { item.category.label() }{ " · " }{ item.location.clone() }
                                { format!(" · {:.1}★ ({})", detail.rating.average, detail.rating.count) }
                            </p>
                            <p class="price">
                                { format!("₹{} / day · ₹{} deposit", item.price_per_day, item.deposit) }
                            </p>
                            <p>{ item.description.clone() }</p>
                            <WishlistButton item_id=item.id.clone() saved=detail.wishlisted/>
                            { detail.owner.clone().map(|owner| view! {
                                <div class="owner">
                                    <img class="avatar" src=owner.avatar() alt=owner.display_name.clone()/>
                                    <span>{ owner.display_name.clone() }</span>
                                    { detail.contact_link.clone().map(|link| view! {
                                        <a class="whatsapp" href=link target="_blank" rel="noopener">
                                            { "Chat on WhatsApp" }
                                        </a>
                                    }) }
                                </div>
                            }) }
                            <CostCalculator item=item.clone()/>
                            <ReviewsList reviews=reviews/>
                            { if is_owner {
                                view! { <OwnerTools item=item.clone()/> }.into_view()
                            } else {
                                let item_id = item.id.clone();
                                view! {
                                    <Show when=move || session.is_signed_in()>
                                        <ReviewForm item_id=item_id.clone() on_added=on_added/>
                                    </Show>
                                }
                                .into_view()
                            } }
                        </article>
                    }
                    .into_view()
                }
            }) }
        </Transition>
    }
}

#[component]
fn ListPage() -> impl IntoView {
    view! {
        <section class="list-item">
            <h1>{ "List an item" }</h1>
            <ListingWizardForm/>
        </section>
    }
}

#[component]
fn WishlistPage() -> impl IntoView {
    let session = expect_context::<Session>();
    let saved = create_local_resource(
        move || session.is_signed_in(),
        move |signed_in| async move {
            if signed_in {
                session.client().wishlist().await.map(Some)
            } else {
                Ok(None)
            }
        },
    );
    view! {
        <section class="wishlist">
            <h1>{ "Your wishlist" }</h1>
            <Transition fallback=|| view! { <p>{ "Loading…" }</p> }>
                { move || saved.get().map(|result| match result {
                    Ok(Some(items)) => view! {
                        <ItemsList items=items empty_message="Nothing saved yet."/>
                    }.into_view(),
                    Ok(None) => view! {
                        <p>{ "Please " }<A href="/login">{ "sign in" }</A>{ " to see your wishlist." }</p>
                    }.into_view(),
                    Err(e) => view! { <p class="error">{ e.to_string() }</p> }.into_view(),
                }) }
            </Transition>
        </section>
    }
}

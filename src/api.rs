//! JSON API shared by the browser client and the Actix server.
//!
//! Request and response bodies are defined here for both sides; the
//! handlers only exist on the server.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingStatus, Item, Profile, RatingSummary, Review, VerificationStatus};

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Everything the item page needs in one request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemDetail {
    pub item: Item,
    pub owner: Option<Profile>,
    pub reviews: Vec<Review>,
    pub rating: RatingSummary,
    pub wishlisted: bool,
    pub contact_link: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedObject {
    pub url: String,
    pub path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuoteQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: BookingStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerificationChange {
    pub status: VerificationStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageList {
    pub images: Vec<String>,
}

/// Bookings a user is involved in, from both sides.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MyBookings {
    pub as_renter: Vec<Booking>,
    pub as_owner: Vec<Booking>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WishlistState {
    pub saved: bool,
}

#[cfg(feature = "ssr")]
pub use handlers::*;

#[cfg(feature = "ssr")]
mod handlers {
    use super::*;
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::{web, HttpRequest, HttpResponse};
    use leptos::logging::log;

    use crate::auth;
    use crate::config::AppConfig;
    use crate::contact;
    use crate::db::Database;
    use crate::error::{MarketError, MarketResult};
    use crate::listing::{validate_file, ListingDraft};
    use crate::models::{Credentials, NewBooking, NewReview, ProfileUpdate, SignUp};
    use crate::search::ItemFilter;
    use crate::services;
    use crate::storage::{
        in_owner_prefix, is_safe_path, LocalObjectStore, ObjectStore, AVATARS_BUCKET, ITEM_IMAGES_BUCKET,
    };

    /// Shared by every Actix worker.
    pub struct AppState {
        pub db: Database,
        pub images: LocalObjectStore,
        pub avatars: LocalObjectStore,
        pub config: AppConfig,
    }

    impl AppState {
        pub async fn open(config: AppConfig) -> MarketResult<Self> {
            let db = Database::new(&config.database_path)?;
            db.create_schema().await?;
            log!("Schema created successfully!");
            Ok(AppState {
                images: LocalObjectStore::new(&config.storage_dir, ITEM_IMAGES_BUCKET, &config.storage_base_url),
                avatars: LocalObjectStore::new(&config.storage_dir, AVATARS_BUCKET, &config.storage_base_url),
                db,
                config,
            })
        }

        fn store(&self, bucket: &str) -> MarketResult<&LocalObjectStore> {
            match bucket {
                ITEM_IMAGES_BUCKET => Ok(&self.images),
                AVATARS_BUCKET => Ok(&self.avatars),
                _ => Err(MarketError::not_found("bucket")),
            }
        }
    }

    type State = web::Data<AppState>;

    /// Registers every `/api` route.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/api")
                .route("/auth/signup", web::post().to(sign_up))
                .route("/auth/signin", web::post().to(sign_in))
                .route("/auth/signout", web::post().to(sign_out))
                .route("/me", web::get().to(get_me))
                .route("/me", web::put().to(update_me))
                .route("/items", web::get().to(list_items))
                .route("/items", web::post().to(create_item))
                .route("/items/{id}", web::get().to(get_item))
                .route("/items/{id}", web::delete().to(delete_item))
                .route("/items/{id}/images", web::put().to(replace_images))
                .route("/items/{id}/verification", web::put().to(set_verification))
                .route("/items/{id}/reviews", web::get().to(list_reviews))
                .route("/items/{id}/reviews", web::post().to(add_review))
                .route("/items/{id}/quote", web::get().to(quote))
                .route("/wishlist", web::get().to(wishlist))
                .route("/wishlist/{item_id}", web::post().to(toggle_wishlist))
                .route("/bookings", web::get().to(my_bookings))
                .route("/bookings", web::post().to(create_booking))
                .route("/bookings/{id}/status", web::put().to(change_booking_status))
                .route("/dashboard", web::get().to(dashboard))
                .route("/storage/{bucket}/{path:.*}", web::post().to(upload_object))
                .route("/storage/{bucket}/{path:.*}", web::delete().to(delete_object)),
        );
    }

    fn header<'a>(req: &'a HttpRequest, name: impl actix_web::http::header::AsHeaderName) -> Option<&'a str> {
        req.headers().get(name).and_then(|v| v.to_str().ok())
    }

    async fn current_user(state: &AppState, req: &HttpRequest) -> MarketResult<crate::models::Profile> {
        auth::current_user(&state.db, header(req, AUTHORIZATION)).await
    }

    fn public_profile(mut profile: crate::models::Profile) -> crate::models::Profile {
        profile.email.clear();
        profile
    }

    async fn sign_up(state: State, body: web::Json<SignUp>) -> Result<HttpResponse, MarketError> {
        let session = auth::sign_up(&state.db, &body).await?;
        Ok(HttpResponse::Created().json(session))
    }

    async fn sign_in(state: State, body: web::Json<Credentials>) -> Result<HttpResponse, MarketError> {
        let session = auth::sign_in(&state.db, &body).await?;
        Ok(HttpResponse::Ok().json(session))
    }

    async fn sign_out(state: State, req: HttpRequest) -> Result<HttpResponse, MarketError> {
        let token = header(&req, AUTHORIZATION)
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(MarketError::Unauthorized)?;
        auth::sign_out(&state.db, token.trim()).await?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn get_me(state: State, req: HttpRequest) -> Result<HttpResponse, MarketError> {
        Ok(HttpResponse::Ok().json(current_user(&state, &req).await?))
    }

    async fn update_me(
        state: State,
        req: HttpRequest,
        body: web::Json<ProfileUpdate>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let profile = services::update_profile(&state.db, &state.avatars, &user, &body).await?;
        Ok(HttpResponse::Ok().json(profile))
    }

    async fn list_items(state: State, filter: web::Query<ItemFilter>) -> Result<HttpResponse, MarketError> {
        let items = services::browse(&state.db, &filter).await?;
        log!("[API] Returning {} items", items.len());
        Ok(HttpResponse::Ok().json(items))
    }

    async fn create_item(
        state: State,
        req: HttpRequest,
        draft: web::Json<ListingDraft>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        log!("[API] Received listing '{}' from {}", draft.title, user.id);
        let outcome = services::create_listing(&state.db, &state.images, &user, &draft).await?;
        Ok(HttpResponse::Created().json(outcome))
    }

    async fn get_item(state: State, req: HttpRequest, id: web::Path<String>) -> Result<HttpResponse, MarketError> {
        let item = services::require_item(&state.db, &id).await?;
        let reviews = state.db.reviews_for_item(&id).await?;
        let owner = state.db.get_profile(&item.owner_id).await?;
        let wishlisted = match current_user(&state, &req).await {
            Ok(user) => state.db.is_wishlisted(&user.id, &id).await?,
            Err(_) => false,
        };
        let contact_link = owner.as_ref().and_then(|o| {
            contact::whatsapp_link(o.whatsapp_number(), &contact::enquiry_message(&item.title))
        });
        Ok(HttpResponse::Ok().json(ItemDetail {
            rating: RatingSummary::from_reviews(&reviews),
            owner: owner.map(public_profile),
            item,
            reviews,
            wishlisted,
            contact_link,
        }))
    }

    async fn delete_item(state: State, req: HttpRequest, id: web::Path<String>) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        services::delete_listing(&state.db, &state.images, &user, &id).await?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn replace_images(
        state: State,
        req: HttpRequest,
        id: web::Path<String>,
        body: web::Json<ImageList>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let item = services::replace_images(&state.db, &state.images, &user, &id, body.into_inner().images).await?;
        Ok(HttpResponse::Ok().json(item))
    }

    async fn set_verification(
        state: State,
        req: HttpRequest,
        id: web::Path<String>,
        body: web::Json<VerificationChange>,
    ) -> Result<HttpResponse, MarketError> {
        let allowed = match (&state.config.admin_token, header(&req, ADMIN_TOKEN_HEADER)) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        };
        if !allowed {
            return Err(MarketError::Forbidden);
        }
        if !state.db.set_verification(&id, body.status).await? {
            return Err(MarketError::not_found("item"));
        }
        log!("[API] Item {} marked {}", id, body.status.as_str());
        Ok(HttpResponse::Ok().json(services::require_item(&state.db, &id).await?))
    }

    async fn list_reviews(state: State, id: web::Path<String>) -> Result<HttpResponse, MarketError> {
        Ok(HttpResponse::Ok().json(state.db.reviews_for_item(&id).await?))
    }

    async fn add_review(
        state: State,
        req: HttpRequest,
        id: web::Path<String>,
        body: web::Json<NewReview>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let review = services::add_review(&state.db, &user, &id, body.into_inner()).await?;
        Ok(HttpResponse::Created().json(review))
    }

    async fn quote(state: State, id: web::Path<String>, range: web::Query<QuoteQuery>) -> Result<HttpResponse, MarketError> {
        let quote = services::quote(&state.db, &id, range.start, range.end).await?;
        Ok(HttpResponse::Ok().json(quote))
    }

    async fn wishlist(state: State, req: HttpRequest) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        Ok(HttpResponse::Ok().json(state.db.wishlist_items(&user.id).await?))
    }

    async fn toggle_wishlist(
        state: State,
        req: HttpRequest,
        item_id: web::Path<String>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        services::require_item(&state.db, &item_id).await?;
        let saved = state.db.toggle_wishlist(&user.id, &item_id).await?;
        Ok(HttpResponse::Ok().json(WishlistState { saved }))
    }

    async fn my_bookings(state: State, req: HttpRequest) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        Ok(HttpResponse::Ok().json(services::my_bookings(&state.db, &user).await?))
    }

    async fn create_booking(
        state: State,
        req: HttpRequest,
        body: web::Json<NewBooking>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let booking = services::create_booking(&state.db, &user, &body).await?;
        Ok(HttpResponse::Created().json(booking))
    }

    async fn change_booking_status(
        state: State,
        req: HttpRequest,
        id: web::Path<String>,
        body: web::Json<StatusChange>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let booking = services::change_booking_status(&state.db, &user, &id, body.status).await?;
        Ok(HttpResponse::Ok().json(booking))
    }

    async fn dashboard(state: State, req: HttpRequest) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        Ok(HttpResponse::Ok().json(services::owner_dashboard(&state.db, &user).await?))
    }

    /// Objects live under `<user id>/`; nobody writes into another
    /// user's prefix.
    fn owned_path(user: &crate::models::Profile, path: &str) -> MarketResult<()> {
        if !is_safe_path(path) {
            return Err(MarketError::validation("invalid object path"));
        }
        if !in_owner_prefix(&user.id, path) {
            return Err(MarketError::Forbidden);
        }
        Ok(())
    }

    async fn upload_object(
        state: State,
        req: HttpRequest,
        path: web::Path<(String, String)>,
        body: web::Bytes,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let (bucket, object) = path.into_inner();
        let store = state.store(&bucket)?;
        owned_path(&user, &object)?;
        let mime = header(&req, CONTENT_TYPE)
            .and_then(|v| v.split(';').next())
            .unwrap_or_default()
            .trim()
            .to_string();
        let name = object.rsplit('/').next().unwrap_or_default();
        let size = body.len() as u64;
        validate_file(name, &mime, size).map_err(|r| MarketError::Validation(r.to_string()))?;
        if size > state.config.max_upload_bytes {
            return Err(MarketError::validation(format!("{} is too large", name)));
        }
        let url = store.put(&object, &mime, body.to_vec()).await?;
        log!("[API] {} uploaded {} to {}", user.id, object, bucket);
        Ok(HttpResponse::Created().json(UploadedObject { url, path: object }))
    }

    async fn delete_object(
        state: State,
        req: HttpRequest,
        path: web::Path<(String, String)>,
    ) -> Result<HttpResponse, MarketError> {
        let user = current_user(&state, &req).await?;
        let (bucket, object) = path.into_inner();
        let store = state.store(&bucket)?;
        owned_path(&user, &object)?;
        store.remove(&object).await?;
        Ok(HttpResponse::NoContent().finish())
    }
}

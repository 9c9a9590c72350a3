//! Browser-side access to the JSON API.
use gloo_net::http::{Request, RequestBuilder, Response};
use leptos::logging::{log, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analytics::OwnerStats;
use crate::api::{ImageList, ItemDetail, MyBookings, StatusChange, UploadedObject, WishlistState};
use crate::error::{MarketError, MarketResult};
use crate::listing::{ListingDraft, ListingSink, SubmitOutcome};
use crate::models::{
    AuthSession, Booking, BookingStatus, Credentials, Item, NewBooking, NewItem, NewReview, Profile,
    ProfileUpdate, Review, SignUp,
};
use crate::search::ItemFilter;
use crate::storage::{object_path, ObjectStore};

const TOKEN_KEY: &str = "rentnest.session";

/// Same-origin API client. Cheap to clone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiClient {
    token: Option<String>,
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// Token saved by a previous sign-in, if any.
pub fn stored_token() -> Option<String> {
    local_storage().and_then(|s| s.get_item(TOKEN_KEY).ok().flatten())
}

/// Saves or clears the token. Returns whether local storage took the write.
pub fn store_token(token: Option<&str>) -> bool {
    let Some(storage) = local_storage() else {
        warn!("[AUTH] Local storage unavailable; the session will not survive a reload");
        return false;
    };
    let written = match token {
        Some(token) => storage.set_item(TOKEN_KEY, token),
        None => storage.remove_item(TOKEN_KEY),
    };
    match written {
        Ok(()) => true,
        Err(e) => {
            warn!("[AUTH] Could not update the stored session token: {:?}", e);
            false
        }
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> MarketResult<T> {
    if response.ok() {
        return Ok(response.json::<T>().await?);
    }
    let status = response.status();
    match response.json::<MarketError>().await {
        Ok(err) => Err(err),
        Err(_) => Err(MarketError::Network(format!("server answered {}", status))),
    }
}

async fn read_empty(response: Response) -> MarketResult<()> {
    if response.ok() {
        return Ok(());
    }
    read::<serde_json::Value>(response).await.map(|_| ())
}

impl ApiClient {
    pub fn new(token: Option<String>) -> Self {
        ApiClient { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> MarketResult<T> {
        let response = self.authorize(Request::get(url)).send().await?;
        read(response).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> MarketResult<T> {
        let response = self.authorize(builder).json(body)?.send().await?;
        read(response).await
    }

    pub async fn sign_up(&self, request: &SignUp) -> MarketResult<AuthSession> {
        self.send(Request::post("/api/auth/signup"), request).await
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> MarketResult<AuthSession> {
        self.send(Request::post("/api/auth/signin"), credentials).await
    }

    pub async fn sign_out(&self) -> MarketResult<()> {
        let response = self.authorize(Request::post("/api/auth/signout")).send().await?;
        read_empty(response).await
    }

    pub async fn me(&self) -> MarketResult<Profile> {
        self.get("/api/me").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> MarketResult<Profile> {
        self.send(Request::put("/api/me"), update).await
    }

    pub async fn items(&self, filter: &ItemFilter) -> MarketResult<Vec<Item>> {
        let query = filter.to_query_string();
        if query.is_empty() {
            self.get("/api/items").await
        } else {
            self.get(&format!("/api/items?{}", query)).await
        }
    }

    pub async fn item(&self, id: &str) -> MarketResult<ItemDetail> {
        self.get(&format!("/api/items/{}", id)).await
    }

    pub async fn create_listing(&self, draft: &ListingDraft) -> MarketResult<SubmitOutcome> {
        self.send(Request::post("/api/items"), draft).await
    }

    pub async fn replace_images(&self, item_id: &str, images: Vec<String>) -> MarketResult<Item> {
        self.send(
            Request::put(&format!("/api/items/{}/images", item_id)),
            &ImageList { images },
        )
        .await
    }

    pub async fn delete_listing(&self, item_id: &str) -> MarketResult<()> {
        let response = self
            .authorize(Request::delete(&format!("/api/items/{}", item_id)))
            .send()
            .await?;
        read_empty(response).await
    }

    pub async fn add_review(&self, item_id: &str, review: &NewReview) -> MarketResult<Review> {
        self.send(Request::post(&format!("/api/items/{}/reviews", item_id)), review)
            .await
    }

    pub async fn toggle_wishlist(&self, item_id: &str) -> MarketResult<bool> {
        let response = self
            .authorize(Request::post(&format!("/api/wishlist/{}", item_id)))
            .send()
            .await?;
        read::<WishlistState>(response).await.map(|s| s.saved)
    }

    pub async fn wishlist(&self) -> MarketResult<Vec<Item>> {
        self.get("/api/wishlist").await
    }

    pub async fn book(&self, request: &NewBooking) -> MarketResult<Booking> {
        self.send(Request::post("/api/bookings"), request).await
    }

    pub async fn my_bookings(&self) -> MarketResult<MyBookings> {
        self.get("/api/bookings").await
    }

    pub async fn set_booking_status(&self, id: &str, status: BookingStatus) -> MarketResult<Booking> {
        self.send(
            Request::put(&format!("/api/bookings/{}/status", id)),
            &StatusChange { status },
        )
        .await
    }

    pub async fn dashboard(&self) -> MarketResult<OwnerStats> {
        self.get("/api/dashboard").await
    }
}

impl ListingSink for ApiClient {
    async fn insert_listing(&self, _owner_id: &str, item: &NewItem) -> MarketResult<String> {
        let draft = ListingDraft::from(item.clone());
        self.create_listing(&draft).await.map(|outcome| outcome.item_id)
    }
}

/// Object storage reached through `/api/storage`. Uploads send the
/// browser `File` as the request body.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: ApiClient,
    bucket: String,
    public_base: String,
}

impl HttpObjectStore {
    pub fn new(client: ApiClient, bucket: &str, public_base: &str) -> Self {
        HttpObjectStore {
            client,
            bucket: bucket.to_string(),
            public_base: public_base.to_string(),
        }
    }
}

impl ObjectStore for HttpObjectStore {
    type Payload = web_sys::File;

    async fn put(&self, path: &str, content_type: &str, payload: web_sys::File) -> MarketResult<String> {
        let request = self
            .client
            .authorize(Request::post(&format!("/api/storage/{}/{}", self.bucket, path)))
            .header("Content-Type", content_type)
            .body(payload)?;
        let uploaded: UploadedObject = read(request.send().await?).await?;
        log!("[UPLOAD] Stored {}", uploaded.path);
        Ok(uploaded.url)
    }

    async fn remove(&self, path: &str) -> MarketResult<()> {
        let response = self
            .client
            .authorize(Request::delete(&format!("/api/storage/{}/{}", self.bucket, path)))
            .send()
            .await?;
        read_empty(response).await
    }

    fn path_for_url(&self, url: &str) -> Option<String> {
        object_path(&self.public_base, &self.bucket, url)
    }
}

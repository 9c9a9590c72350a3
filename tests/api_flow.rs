#![cfg(feature = "ssr")]

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use chrono::NaiveDate;
use rentnest::analytics::OwnerStats;
use rentnest::api::{self, AppState, ItemDetail, MyBookings, UploadedObject, WishlistState, ADMIN_TOKEN_HEADER};
use rentnest::config::AppConfig;
use rentnest::listing::uploader::MAX_IMAGE_BYTES;
use rentnest::listing::{ListingDraft, SubmitOutcome};
use rentnest::models::{AuthSession, Booking, BookingStatus, Category, Item, NewBooking, SignUp};
use serde_json::json;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn state(dir: &tempfile::TempDir) -> web::Data<AppState> {
    let config = AppConfig {
        database_path: ":memory:".to_string(),
        storage_dir: dir.path().to_path_buf(),
        admin_token: Some("moderator".to_string()),
        ..AppConfig::default()
    };
    web::Data::new(AppState::open(config).await.unwrap())
}

fn bearer(session: &AuthSession) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", session.token))
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, m, d).unwrap()
}

macro_rules! sign_up {
    ($app:expr, $email:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(SignUp {
                email: $email.to_string(),
                password: "correct horse battery".to_string(),
                display_name: $name.to_string(),
                phone: "+91 98765 43210".to_string(),
            })
            .to_request();
        let session: AuthSession = test::call_and_read_body_json(&$app, req).await;
        session
    }};
}

#[actix_web::test]
async fn owner_lists_item_and_renter_books_it() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir).await).configure(api::configure)).await;

    let owner = sign_up!(app, "owner@example.com", "Priya");
    let renter = sign_up!(app, "renter@example.com", "Arjun");

    // Photo upload into the owner's own prefix
    let path = format!("{}/tent.png", owner.profile.id);
    let req = test::TestRequest::post()
        .uri(&format!("/api/storage/item-images/{}", path))
        .insert_header(bearer(&owner))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(PNG_BYTES)
        .to_request();
    let uploaded: UploadedObject = test::call_and_read_body_json(&app, req).await;
    assert_eq!(uploaded.path, path);
    assert!(dir.path().join("item-images").join(&path).exists());

    // Someone else's prefix is off limits
    let req = test::TestRequest::post()
        .uri(&format!("/api/storage/item-images/{}", path))
        .insert_header(bearer(&renter))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(PNG_BYTES)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let draft = ListingDraft {
        title: "Four-person tent".into(),
        description: "Waterproof, easy setup".into(),
        category: Some(Category::Outdoor),
        price_per_day: Some(500),
        deposit: 2000,
        location: "Pune".into(),
        available_from: Some(date(1, 1)),
        available_to: None,
        images: vec![uploaded.url.clone()],
    };
    let req = test::TestRequest::post()
        .uri("/api/items")
        .insert_header(bearer(&owner))
        .set_json(&draft)
        .to_request();
    let outcome: SubmitOutcome = test::call_and_read_body_json(&app, req).await;
    assert_eq!(outcome.redirect_to, format!("/items/{}", outcome.item_id));

    let req = test::TestRequest::get()
        .uri("/api/items?query=tent&category=outdoor&sort=price_low")
        .to_request();
    let found: Vec<Item> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Four-person tent");

    let req = test::TestRequest::get().uri("/api/items?category=vehicles").to_request();
    let none: Vec<Item> = test::call_and_read_body_json(&app, req).await;
    assert!(none.is_empty());

    // Wishlist toggles on and off
    for expected in [true, false] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/wishlist/{}", outcome.item_id))
            .insert_header(bearer(&renter))
            .to_request();
        let toggled: WishlistState = test::call_and_read_body_json(&app, req).await;
        assert_eq!(toggled.saved, expected);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/items/{}", outcome.item_id))
        .insert_header(bearer(&renter))
        .to_request();
    let detail: ItemDetail = test::call_and_read_body_json(&app, req).await;
    assert!(!detail.wishlisted);
    assert_eq!(detail.owner.as_ref().map(|o| o.email.as_str()), Some(""));
    assert!(detail.contact_link.unwrap().starts_with("https://wa.me/919876543210?text="));

    let booking_request = NewBooking {
        item_id: outcome.item_id.clone(),
        start_date: date(11, 1),
        end_date: date(11, 4),
    };
    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header(bearer(&renter))
        .set_json(&booking_request)
        .to_request();
    let booking: Booking = test::call_and_read_body_json(&app, req).await;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price, 3 * 500 + 2000);

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header(bearer(&renter))
        .set_json(NewBooking {
            start_date: date(11, 3),
            end_date: date(11, 5),
            ..booking_request.clone()
        })
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    // Renters may not confirm their own request
    let req = test::TestRequest::put()
        .uri(&format!("/api/bookings/{}/status", booking.id))
        .insert_header(bearer(&renter))
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/bookings/{}/status", booking.id))
        .insert_header(bearer(&owner))
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let confirmed: Booking = test::call_and_read_body_json(&app, req).await;
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let req = test::TestRequest::get()
        .uri("/api/bookings")
        .insert_header(bearer(&owner))
        .to_request();
    let mine: MyBookings = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.as_owner.len(), 1);
    assert!(mine.as_renter.is_empty());

    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .insert_header(bearer(&owner))
        .to_request();
    let stats: OwnerStats = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats.total_listings, 1);
    assert_eq!(stats.active_bookings, 1);
    assert_eq!(stats.total_earnings, 3500);
    assert_eq!(stats.monthly_earnings, vec![("2026-11".to_string(), 3500)]);
}

#[actix_web::test]
async fn protected_routes_reject_anonymous_and_wrong_admin() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir).await).configure(api::configure)).await;

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/items")
        .set_json(ListingDraft::default())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let owner = sign_up!(app, "owner@example.com", "Priya");
    let req = test::TestRequest::post()
        .uri("/api/items")
        .insert_header(bearer(&owner))
        .set_json(ListingDraft::default())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "Validation");

    let req = test::TestRequest::put()
        .uri("/api/items/anything/verification")
        .insert_header((ADMIN_TOKEN_HEADER, "guess"))
        .set_json(json!({ "status": "verified" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/items/missing/verification")
        .insert_header((ADMIN_TOKEN_HEADER, "moderator"))
        .set_json(json!({ "status": "verified" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(SignUp {
            email: "OWNER@example.com".into(),
            password: "another password".into(),
            display_name: "Copy".into(),
            phone: String::new(),
        })
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn uploads_reject_oversized_and_foreign_types() {
    let dir = tempfile::tempdir().unwrap();
    let limit = MAX_IMAGE_BYTES as usize + 64 * 1024;
    let app = test::init_service(
        App::new()
            .app_data(state(&dir).await)
            .app_data(web::PayloadConfig::new(limit))
            .configure(api::configure),
    )
    .await;
    let owner = sign_up!(app, "owner@example.com", "Priya");

    let big = format!("{}/big.jpg", owner.profile.id);
    let req = test::TestRequest::post()
        .uri(&format!("/api/storage/item-images/{}", big))
        .insert_header(bearer(&owner))
        .insert_header((header::CONTENT_TYPE, "image/jpeg"))
        .set_payload(vec![0u8; MAX_IMAGE_BYTES as usize + 1])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "Validation");
    assert!(!dir.path().join("item-images").join(&big).exists());

    let pdf = format!("{}/notes.pdf", owner.profile.id);
    let req = test::TestRequest::post()
        .uri(&format!("/api/storage/item-images/{}", pdf))
        .insert_header(bearer(&owner))
        .insert_header((header::CONTENT_TYPE, "application/pdf"))
        .set_payload(b"%PDF-1.7".to_vec())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("item-images").join(&pdf).exists());

    // Exactly at the limit is fine
    let edge = format!("{}/edge.png", owner.profile.id);
    let req = test::TestRequest::post()
        .uri(&format!("/api/storage/item-images/{}", edge))
        .insert_header(bearer(&owner))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(vec![0u8; MAX_IMAGE_BYTES as usize])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn listings_cannot_claim_another_accounts_photo() {
    let dir = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().app_data(state(&dir).await).configure(api::configure)).await;
    let owner = sign_up!(app, "owner@example.com", "Priya");
    let other = sign_up!(app, "other@example.com", "Kabir");

    let path = format!("{}/drill.png", owner.profile.id);
    let req = test::TestRequest::post()
        .uri(&format!("/api/storage/item-images/{}", path))
        .insert_header(bearer(&owner))
        .insert_header((header::CONTENT_TYPE, "image/png"))
        .set_payload(PNG_BYTES)
        .to_request();
    let uploaded: UploadedObject = test::call_and_read_body_json(&app, req).await;

    let draft = ListingDraft {
        title: "Cordless drill".into(),
        description: "Two batteries".into(),
        category: Some(Category::Tools),
        price_per_day: Some(150),
        deposit: 500,
        location: "Delhi".into(),
        available_from: Some(date(1, 1)),
        available_to: None,
        images: vec![uploaded.url],
    };
    let req = test::TestRequest::post()
        .uri("/api/items")
        .insert_header(bearer(&other))
        .set_json(&draft)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    assert!(dir.path().join("item-images").join(&path).exists());
}

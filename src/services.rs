//! Marketplace operations that combine several table reads and writes.
//! The API handlers are thin wrappers around these.
#[cfg(feature = "ssr")]
mod services_impl {
    use futures::future::join_all;
    use leptos::logging::{log, warn};

    use crate::analytics::OwnerStats;
    use crate::api::MyBookings;
    use crate::db::Database;
    use crate::error::{MarketError, MarketResult};
    use crate::listing::{submit_listing, ImageStager, ListingDraft, SubmitOutcome};
    use crate::models::booking::{check_transition, BookingActor};
    use crate::models::{
        Booking, BookingStatus, Item, NewBooking, NewReview, Profile, ProfileUpdate, Review,
    };
    use crate::pricing::{self, Quote};
    use crate::search::ItemFilter;
    use crate::storage::{in_owner_prefix, ObjectStore};

    pub async fn require_item(db: &Database, item_id: &str) -> MarketResult<Item> {
        db.get_item(item_id)
            .await?
            .ok_or_else(|| MarketError::not_found("item"))
    }

    async fn require_owned_item(db: &Database, user: &Profile, item_id: &str) -> MarketResult<Item> {
        let item = require_item(db, item_id).await?;
        if item.owner_id != user.id {
            return Err(MarketError::Forbidden);
        }
        Ok(item)
    }

    /// Stored objects may only be referenced by the account that uploaded
    /// them. URLs outside our storage pass through.
    fn check_owned_urls<S: ObjectStore>(store: &S, owner: &Profile, urls: &[String]) -> MarketResult<()> {
        let foreign = urls.iter().any(|url| {
            store
                .path_for_url(url)
                .is_some_and(|path| !in_owner_prefix(&owner.id, &path))
        });
        if foreign {
            warn!("[IMAGES] {} referenced another account's photo", owner.id);
            return Err(MarketError::Forbidden);
        }
        Ok(())
    }

    /// Best-effort delete of the owner's stored photos; a failure only
    /// leaves an orphan. Objects outside the owner's prefix are left alone.
    async fn remove_objects<S: ObjectStore>(store: &S, owner: &Profile, urls: &[String]) {
        let removals = urls.iter().filter_map(|url| {
            let path = store
                .path_for_url(url)
                .filter(|path| in_owner_prefix(&owner.id, path))?;
            Some(async move {
                if let Err(e) = store.remove(&path).await {
                    warn!("[IMAGES] Could not delete {}: {}", url, e);
                }
            })
        });
        join_all(removals).await;
    }

    /// Saves profile edits. A new avatar must be the caller's own upload;
    /// the one it replaces is deleted from storage.
    pub async fn update_profile<S: ObjectStore>(
        db: &Database,
        avatars: &S,
        user: &Profile,
        update: &ProfileUpdate,
    ) -> MarketResult<Profile> {
        if let Some(url) = &update.avatar_url {
            check_owned_urls(avatars, user, std::slice::from_ref(url))?;
        }
        let profile = db.update_profile(&user.id, update).await?;
        let replaced = user
            .avatar_url
            .as_ref()
            .filter(|old| profile.avatar_url.as_ref() != Some(*old));
        if let Some(old) = replaced {
            remove_objects(avatars, user, std::slice::from_ref(old)).await;
        }
        Ok(profile)
    }

    pub async fn browse(db: &Database, filter: &ItemFilter) -> MarketResult<Vec<Item>> {
        Ok(filter.apply(db.list_items().await?))
    }

    pub async fn create_listing<S: ObjectStore>(
        db: &Database,
        store: &S,
        owner: &Profile,
        draft: &ListingDraft,
    ) -> MarketResult<SubmitOutcome> {
        check_owned_urls(store, owner, &draft.images)?;
        submit_listing(db, &owner.id, draft).await
    }

    /// Replaces the image list of a listing and deletes objects that were
    /// dropped from it.
    pub async fn replace_images<S: ObjectStore>(
        db: &Database,
        store: &S,
        owner: &Profile,
        item_id: &str,
        images: Vec<String>,
    ) -> MarketResult<Item> {
        let item = require_owned_item(db, owner, item_id).await?;
        if images.is_empty() {
            return Err(MarketError::validation("a listing needs at least one photo"));
        }
        check_owned_urls(store, owner, &images)?;
        let removed = ImageStager::<S::Payload>::reconcile(&item.images, &images);
        db.update_item_images(item_id, &images).await?;
        remove_objects(store, owner, &removed).await;
        require_item(db, item_id).await
    }

    pub async fn delete_listing<S: ObjectStore>(
        db: &Database,
        store: &S,
        owner: &Profile,
        item_id: &str,
    ) -> MarketResult<()> {
        let item = require_owned_item(db, owner, item_id).await?;
        db.delete_item(item_id).await?;
        remove_objects(store, owner, &item.images).await;
        log!("[LISTING] {} deleted by {}", item_id, owner.id);
        Ok(())
    }

    pub async fn add_review(
        db: &Database,
        author: &Profile,
        item_id: &str,
        review: NewReview,
    ) -> MarketResult<Review> {
        let review = review.validate()?;
        let item = require_item(db, item_id).await?;
        if item.owner_id == author.id {
            return Err(MarketError::validation("you cannot review your own listing"));
        }
        Ok(db.insert_review(item_id, &author.id, &review).await?)
    }

    pub async fn quote(db: &Database, item_id: &str, start: chrono::NaiveDate, end: chrono::NaiveDate) -> MarketResult<Quote> {
        let item = require_item(db, item_id).await?;
        pricing::quote(&item, start, end)
    }

    pub async fn create_booking(
        db: &Database,
        renter: &Profile,
        request: &NewBooking,
    ) -> MarketResult<Booking> {
        let item = require_item(db, &request.item_id).await?;
        if item.owner_id == renter.id {
            return Err(MarketError::validation("you cannot rent your own listing"));
        }
        let quote = pricing::quote(&item, request.start_date, request.end_date)?;
        db.insert_booking_if_free(
            &item.id,
            &renter.id,
            request.start_date,
            request.end_date,
            quote.total,
        )
        .await?
        .ok_or_else(|| {
            MarketError::Conflict("the item is already booked for some of those dates".into())
        })
    }

    pub async fn change_booking_status(
        db: &Database,
        user: &Profile,
        booking_id: &str,
        next: BookingStatus,
    ) -> MarketResult<Booking> {
        let mut booking = db
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| MarketError::not_found("booking"))?;
        let item = require_item(db, &booking.item_id).await?;
        let actor = if item.owner_id == user.id {
            BookingActor::Owner
        } else if booking.renter_id == user.id {
            BookingActor::Renter
        } else {
            return Err(MarketError::Forbidden);
        };
        check_transition(booking.status, next, actor)?;
        db.update_booking_status(booking_id, next).await?;
        booking.status = next;
        Ok(booking)
    }

    pub async fn my_bookings(db: &Database, user: &Profile) -> MarketResult<MyBookings> {
        Ok(MyBookings {
            as_renter: db.bookings_for_renter(&user.id).await?,
            as_owner: db.bookings_for_owner(&user.id).await?,
        })
    }

    pub async fn owner_dashboard(db: &Database, owner: &Profile) -> MarketResult<OwnerStats> {
        let items = db.items_by_owner(&owner.id).await?;
        let bookings = db.bookings_for_owner(&owner.id).await?;
        let reviews = db.reviews_for_owner(&owner.id).await?;
        Ok(OwnerStats::compute(&items, &bookings, &reviews))
    }

}

#[cfg(feature = "ssr")]
pub use services_impl::*;

use std::time::Duration;

use leptos::logging::log;
use serde::{Deserialize, Serialize};

use super::wizard::ListingDraft;
use crate::error::{MarketError, MarketResult};
use crate::models::NewItem;

/// Pause between the success message and the redirect to the new listing.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

pub const MAX_TITLE_LEN: usize = 120;

/// Where a finished listing ends up. Implemented by the database on the
/// server and by the API client in the browser.
#[allow(async_fn_in_trait)]
pub trait ListingSink {
    /// Inserts one listing owned by `owner_id` and returns its id.
    async fn insert_listing(&self, owner_id: &str, item: &NewItem) -> MarketResult<String>;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub item_id: String,
    pub redirect_to: String,
    #[serde(with = "millis")]
    pub redirect_after: Duration,
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Checks every required field and collects all problems, so the review
/// step can show them together.
pub fn validate_draft(draft: &ListingDraft) -> Result<NewItem, Vec<String>> {
    let mut problems = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        problems.push("Title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LEN {
        problems.push(format!("Title must be at most {} characters", MAX_TITLE_LEN));
    }
    if draft.category.is_none() {
        problems.push("Category is required".to_string());
    }
    let price_per_day = draft.price_per_day.unwrap_or(0);
    if price_per_day == 0 {
        problems.push("Daily price must be greater than zero".to_string());
    }
    let location = draft.location.trim();
    if location.is_empty() {
        problems.push("Location is required".to_string());
    }
    match (draft.available_from, draft.available_to) {
        (None, _) => problems.push("Availability start date is required".to_string()),
        (Some(from), Some(to)) if to < from => {
            problems.push("Availability end date must not be before the start date".to_string())
        }
        _ => {}
    }
    if draft.images.is_empty() {
        problems.push("At least one photo is required".to_string());
    }

    match (draft.category, draft.available_from) {
        (Some(category), Some(available_from)) if problems.is_empty() => Ok(NewItem {
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            category,
            price_per_day,
            deposit: draft.deposit,
            images: draft.images.clone(),
            location: location.to_string(),
            available_from,
            available_to: draft.available_to,
        }),
        _ => Err(problems),
    }
}

/// Validates the draft and inserts it as one new listing. Photos are
/// expected to be uploaded already; if the insert fails they stay in
/// storage.
pub async fn submit_listing<S: ListingSink>(
    sink: &S,
    owner_id: &str,
    draft: &ListingDraft,
) -> MarketResult<SubmitOutcome> {
    let item = validate_draft(draft).map_err(|problems| MarketError::Validation(problems.join("; ")))?;
    let item_id = sink.insert_listing(owner_id, &item).await?;
    log!("[SUBMIT] Listing {} created for {}", item_id, owner_id);
    Ok(SubmitOutcome {
        redirect_to: format!("/items/{}", item_id),
        item_id,
        redirect_after: REDIRECT_DELAY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemorySink {
        inserted: RefCell<Vec<(String, NewItem)>>,
    }

    impl ListingSink for MemorySink {
        async fn insert_listing(&self, owner_id: &str, item: &NewItem) -> MarketResult<String> {
            let mut inserted = self.inserted.borrow_mut();
            inserted.push((owner_id.to_string(), item.clone()));
            Ok(format!("item-{}", inserted.len()))
        }
    }

    fn complete_draft() -> ListingDraft {
        ListingDraft {
            title: "  Camping tent  ".into(),
            description: "Sleeps four".into(),
            category: Some(Category::Outdoor),
            price_per_day: Some(250),
            deposit: 1000,
            location: "Manali".into(),
            available_from: NaiveDate::from_ymd_opt(2026, 4, 1),
            available_to: None,
            images: vec!["/storage/item-images/u1/a-tent.jpg".into()],
        }
    }

    #[test]
    fn complete_draft_becomes_new_item() {
        let item = validate_draft(&complete_draft()).unwrap();
        assert_eq!(item.title, "Camping tent");
        assert_eq!(item.price_per_day, 250);
        assert_eq!(item.images.len(), 1);
    }

    #[test]
    fn reports_every_missing_field() {
        let problems = validate_draft(&ListingDraft::default()).unwrap_err();
        assert_eq!(problems.len(), 6);
        assert!(problems.contains(&"At least one photo is required".to_string()));
    }

    #[test]
    fn photo_is_required() {
        let mut draft = complete_draft();
        draft.images.clear();
        assert_eq!(
            validate_draft(&draft).unwrap_err(),
            vec!["At least one photo is required".to_string()]
        );
    }

    #[tokio::test]
    async fn submit_inserts_once_and_redirects() {
        let sink = MemorySink::default();
        let outcome = submit_listing(&sink, "u1", &complete_draft()).await.unwrap();
        assert_eq!(outcome.item_id, "item-1");
        assert_eq!(outcome.redirect_to, "/items/item-1");
        assert_eq!(outcome.redirect_after, REDIRECT_DELAY);
        assert_eq!(sink.inserted.borrow().len(), 1);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_sink() {
        let sink = MemorySink::default();
        let mut draft = complete_draft();
        draft.price_per_day = Some(0);
        let err = submit_listing(&sink, "u1", &draft).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
        assert!(sink.inserted.borrow().is_empty());
    }
}

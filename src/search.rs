//! Browse filters for the item grid.
use serde::{Deserialize, Serialize};

use crate::models::{Category, Item, VerificationStatus};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
}

/// Query-string friendly filter; every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ItemFilter {
    pub query: Option<String>,
    pub category: Option<Category>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub verified_only: bool,
    pub sort: SortOrder,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::PriceLow => "price_low",
            SortOrder::PriceHigh => "price_high",
        }
    }
}

impl ItemFilter {
    /// Query string understood by `GET /api/items`, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(q) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            parts.push(format!("query={}", urlencoding::encode(q)));
        }
        if let Some(category) = self.category {
            parts.push(format!("category={}", category.slug()));
        }
        if let Some(min) = self.min_price {
            parts.push(format!("min_price={}", min));
        }
        if let Some(max) = self.max_price {
            parts.push(format!("max_price={}", max));
        }
        if self.verified_only {
            parts.push("verified_only=true".to_string());
        }
        if self.sort != SortOrder::Newest {
            parts.push(format!("sort={}", self.sort.as_str()));
        }
        parts.join("&")
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| item.price_per_day < min)
            || self.max_price.is_some_and(|max| item.price_per_day > max)
        {
            return false;
        }
        if self.verified_only && item.verification != VerificationStatus::Verified {
            return false;
        }
        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let q = q.to_lowercase();
                [&item.title, &item.description, &item.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            }
            None => true,
        }
    }

    /// Filters and sorts. Rejected listings never show up in browse.
    pub fn apply(&self, items: Vec<Item>) -> Vec<Item> {
        let mut items: Vec<Item> = items
            .into_iter()
            .filter(|item| item.verification != VerificationStatus::Rejected)
            .filter(|item| self.matches(item))
            .collect();
        match self.sort {
            SortOrder::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::PriceLow => items.sort_by_key(|item| item.price_per_day),
            SortOrder::PriceHigh => items.sort_by(|a, b| b.price_per_day.cmp(&a.price_per_day)),
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn item(id: &str, title: &str, category: Category, price: u32, age_days: i64) -> Item {
        Item {
            id: id.into(),
            owner_id: "owner".into(),
            title: title.into(),
            description: String::new(),
            category,
            price_per_day: price,
            deposit: 0,
            images: vec![],
            location: "Mumbai".into(),
            available_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            available_to: None,
            verification: VerificationStatus::Verified,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn catalog() -> Vec<Item> {
        vec![
            item("drill", "Cordless drill", Category::Tools, 150, 3),
            item("tent", "Four person tent", Category::Outdoor, 300, 1),
            item("ladder", "Aluminium ladder", Category::Tools, 90, 2),
        ]
    }

    #[test]
    fn query_is_case_insensitive_and_searches_location() {
        let filter = ItemFilter {
            query: Some("DRILL".into()),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(catalog()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["drill"]);

        let filter = ItemFilter {
            query: Some("mumbai".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(catalog()).len(), 3);
    }

    #[test]
    fn category_price_and_sort() {
        let filter = ItemFilter {
            category: Some(Category::Tools),
            max_price: Some(200),
            sort: SortOrder::PriceLow,
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(catalog()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["ladder", "drill"]);
    }

    #[test]
    fn query_string_skips_defaults() {
        assert_eq!(ItemFilter::default().to_query_string(), "");
        let filter = ItemFilter {
            query: Some(" party lights ".into()),
            category: Some(Category::Party),
            max_price: Some(500),
            sort: SortOrder::PriceHigh,
            ..Default::default()
        };
        assert_eq!(
            filter.to_query_string(),
            "query=party%20lights&category=party&max_price=500&sort=price_high"
        );
    }

    #[test]
    fn newest_first_and_rejected_hidden() {
        let mut items = catalog();
        items[1].verification = VerificationStatus::Rejected;
        items[2].verification = VerificationStatus::Pending;
        let ids: Vec<_> = ItemFilter::default().apply(items.clone()).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["ladder", "drill"]);

        let verified = ItemFilter {
            verified_only: true,
            ..Default::default()
        };
        assert_eq!(verified.apply(items).len(), 1);
    }
}

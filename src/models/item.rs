use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fixed set of listing categories. The slug is what gets stored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Electronics,
    Tools,
    Vehicles,
    Outdoor,
    Party,
    Sports,
    Home,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Electronics,
        Category::Tools,
        Category::Vehicles,
        Category::Outdoor,
        Category::Party,
        Category::Sports,
        Category::Home,
        Category::Other,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Tools => "tools",
            Category::Vehicles => "vehicles",
            Category::Outdoor => "outdoor",
            Category::Party => "party",
            Category::Sports => "sports",
            Category::Home => "home",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Tools => "Tools & DIY",
            Category::Vehicles => "Vehicles",
            Category::Outdoor => "Camping & Outdoor",
            Category::Party => "Party & Events",
            Category::Sports => "Sports",
            Category::Home => "Home & Garden",
            Category::Other => "Other",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<VerificationStatus> {
        match s {
            "pending" => Some(VerificationStatus::Pending),
            "verified" => Some(VerificationStatus::Verified),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

/// A rentable listing as stored in the `items` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price_per_day: u32,
    pub deposit: u32,
    pub images: Vec<String>,
    pub location: String,
    pub available_from: NaiveDate,
    pub available_to: Option<NaiveDate>,
    pub verification: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// First image, used as the card thumbnail.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn is_available_on(&self, day: NaiveDate) -> bool {
        day >= self.available_from && self.available_to.map_or(true, |to| day <= to)
    }
}

/// Validated listing data ready to be inserted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price_per_day: u32,
    pub deposit: u32,
    pub images: Vec<String>,
    pub location: String,
    pub available_from: NaiveDate,
    pub available_to: Option<NaiveDate>,
}

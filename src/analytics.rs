//! Numbers for the owner dashboard. The chart on the page only needs the
//! monthly series; everything else is shown as plain figures.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingStatus, Item, RatingSummary, Review, VerificationStatus};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct OwnerStats {
    pub total_listings: usize,
    pub verified_listings: usize,
    pub pending_bookings: usize,
    pub active_bookings: usize,
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    pub total_earnings: u64,
    pub rating: RatingSummary,
    /// `(YYYY-MM, earnings)` in calendar order.
    pub monthly_earnings: Vec<(String, u64)>,
}

impl OwnerStats {
    /// `items` are the owner's listings; bookings and reviews for other
    /// items are ignored.
    pub fn compute(items: &[Item], bookings: &[Booking], reviews: &[Review]) -> Self {
        let owns = |item_id: &str| items.iter().any(|item| item.id == item_id);
        let mut stats = OwnerStats {
            total_listings: items.len(),
            verified_listings: items
                .iter()
                .filter(|item| item.verification == VerificationStatus::Verified)
                .count(),
            ..Default::default()
        };

        let mut monthly: BTreeMap<String, u64> = BTreeMap::new();
        for booking in bookings.iter().filter(|b| owns(&b.item_id)) {
            match booking.status {
                BookingStatus::Pending => stats.pending_bookings += 1,
                BookingStatus::Confirmed => stats.active_bookings += 1,
                BookingStatus::Completed => stats.completed_bookings += 1,
                BookingStatus::Cancelled => stats.cancelled_bookings += 1,
            }
            if booking.status.is_earning() {
                stats.total_earnings += booking.total_price;
                *monthly
                    .entry(booking.start_date.format("%Y-%m").to_string())
                    .or_default() += booking.total_price;
            }
        }
        stats.monthly_earnings = monthly.into_iter().collect();
        stats.rating = RatingSummary::from_ratings(
            reviews
                .iter()
                .filter(|r| owns(&r.item_id))
                .map(|r| r.rating),
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{NaiveDate, Utc};

    fn listing(id: &str, verification: VerificationStatus) -> Item {
        Item {
            id: id.into(),
            owner_id: "owner".into(),
            title: id.into(),
            description: String::new(),
            category: Category::Party,
            price_per_day: 100,
            deposit: 0,
            images: vec![],
            location: "Delhi".into(),
            available_from: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            available_to: None,
            verification,
            created_at: Utc::now(),
        }
    }

    fn booking(item: &str, month: u32, total: u64, status: BookingStatus) -> Booking {
        Booking {
            id: format!("{}-{}", item, month),
            item_id: item.into(),
            renter_id: "renter".into(),
            start_date: NaiveDate::from_ymd_opt(2026, month, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, month, 7).unwrap(),
            total_price: total,
            status,
            created_at: Utc::now(),
        }
    }

    fn review(item: &str, rating: u8) -> Review {
        Review {
            id: format!("r-{}-{}", item, rating),
            item_id: item.into(),
            author_id: "renter".into(),
            author_name: "Renter".into(),
            rating,
            comment: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn earnings_only_count_confirmed_and_completed() {
        let items = vec![
            listing("speaker", VerificationStatus::Verified),
            listing("lights", VerificationStatus::Pending),
        ];
        let bookings = vec![
            booking("speaker", 3, 500, BookingStatus::Completed),
            booking("lights", 3, 200, BookingStatus::Confirmed),
            booking("speaker", 1, 300, BookingStatus::Completed),
            booking("speaker", 2, 999, BookingStatus::Cancelled),
            booking("lights", 4, 100, BookingStatus::Pending),
            booking("someone-else", 3, 10_000, BookingStatus::Completed),
        ];
        let reviews = vec![review("speaker", 5), review("lights", 4), review("someone-else", 1)];

        let stats = OwnerStats::compute(&items, &bookings, &reviews);
        assert_eq!(stats.total_listings, 2);
        assert_eq!(stats.verified_listings, 1);
        assert_eq!(stats.total_earnings, 1000);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.active_bookings, 1);
        assert_eq!(stats.completed_bookings, 2);
        assert_eq!(stats.cancelled_bookings, 1);
        assert_eq!(
            stats.monthly_earnings,
            vec![("2026-01".to_string(), 300), ("2026-03".to_string(), 700)]
        );
        assert_eq!(stats.rating.count, 2);
        assert_eq!(stats.rating.average, 4.5);
    }

    #[test]
    fn empty_dashboard() {
        let stats = OwnerStats::compute(&[], &[], &[]);
        assert_eq!(stats, OwnerStats::default());
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, MarketResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Bookings in these states earn the owner money.
    pub fn is_earning(self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub item_id: String,
    pub renter_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: u64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Inclusive date ranges overlap.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.status != BookingStatus::Cancelled && self.start_date <= end && start <= self.end_date
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub item_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingActor {
    Owner,
    Renter,
}

/// Checks a status change against the lifecycle and the actor's role.
pub fn check_transition(
    current: BookingStatus,
    next: BookingStatus,
    actor: BookingActor,
) -> MarketResult<()> {
    if !current.can_transition_to(next) {
        return Err(MarketError::Conflict(format!(
            "cannot move a {} booking to {}",
            current.as_str(),
            next.as_str()
        )));
    }
    match (next, actor) {
        (BookingStatus::Cancelled, _) => Ok(()),
        (_, BookingActor::Owner) => Ok(()),
        (_, BookingActor::Renter) => Err(MarketError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn lifecycle_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn renters_may_only_cancel() {
        use BookingStatus::*;
        assert!(check_transition(Pending, Cancelled, BookingActor::Renter).is_ok());
        assert_eq!(
            check_transition(Pending, Confirmed, BookingActor::Renter),
            Err(MarketError::Forbidden)
        );
        assert!(check_transition(Pending, Confirmed, BookingActor::Owner).is_ok());
        assert!(matches!(
            check_transition(Completed, Cancelled, BookingActor::Owner),
            Err(MarketError::Conflict(_))
        ));
    }

    #[test]
    fn overlap_ignores_cancelled_bookings() {
        let mut booking = Booking {
            id: "b1".into(),
            item_id: "i1".into(),
            renter_id: "u2".into(),
            start_date: day(10),
            end_date: day(12),
            total_price: 100,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        };
        assert!(booking.overlaps(day(12), day(14)));
        assert!(booking.overlaps(day(8), day(10)));
        assert!(!booking.overlaps(day(13), day(15)));
        booking.status = BookingStatus::Cancelled;
        assert!(!booking.overlaps(day(11), day(11)));
    }
}

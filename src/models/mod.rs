pub mod booking;
pub mod item;
pub mod profile;
pub mod review;
pub mod wishlist;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use item::{Category, Item, NewItem, VerificationStatus};
pub use profile::{AuthSession, Credentials, Profile, ProfileUpdate, SignUp};
pub use review::{NewReview, RatingSummary, Review};
pub use wishlist::{WishlistEntry, WishlistToggle};

#[cfg(feature = "ssr")]
mod db_impl {
    use crate::error::{MarketError, MarketResult};
    use crate::listing::ListingSink;
    use crate::models::{
        Booking, BookingStatus, Category, Item, NewItem, NewReview, Profile, ProfileUpdate,
        Review, VerificationStatus, WishlistEntry,
    };
    use chrono::{NaiveDate, Utc};
    use leptos::logging;
    use leptos::logging::log;
    use rusqlite::{params, Connection, Error, OptionalExtension, Row};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use uuid::Uuid;


    const ITEM_COLUMNS: &str = "i.id, i.owner_id, i.title, i.description, i.category, \
        i.price_per_day, i.deposit, i.images, i.location, i.available_from, i.available_to, \
        i.verification, i.created_at";

    const BOOKING_COLUMNS: &str = "b.id, b.item_id, b.renter_id, b.start_date, b.end_date, \
        b.total_price, b.status, b.created_at";

    const REVIEW_COLUMNS: &str = "r.id, r.item_id, r.author_id, COALESCE(p.display_name, ''), \
        r.rating, r.comment, r.created_at";

    const PROFILE_COLUMNS: &str =
        "p.id, p.email, p.display_name, p.avatar_url, p.phone, p.whatsapp, p.created_at";

    fn item_from_row(row: &Row) -> Result<Item, Error> {
        let images_json: String = row.get(7)?;
        let category: String = row.get(4)?;
        let verification: String = row.get(11)?;
        Ok(Item {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category: Category::from_slug(&category).unwrap_or_default(),
            price_per_day: row.get::<_, i64>(5)? as u32,
            deposit: row.get::<_, i64>(6)? as u32,
            images: serde_json::from_str(&images_json).unwrap_or_default(),
            location: row.get(8)?,
            available_from: row.get(9)?,
            available_to: row.get(10)?,
            verification: VerificationStatus::parse(&verification).unwrap_or_default(),
            created_at: row.get(12)?,
        })
    }

    fn booking_from_row(row: &Row) -> Result<Booking, Error> {
        let status: String = row.get(6)?;
        Ok(Booking {
            id: row.get(0)?,
            item_id: row.get(1)?,
            renter_id: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            total_price: row.get::<_, i64>(5)? as u64,
            status: BookingStatus::parse(&status).unwrap_or(BookingStatus::Pending),
            created_at: row.get(7)?,
        })
    }

    fn review_from_row(row: &Row) -> Result<Review, Error> {
        Ok(Review {
            id: row.get(0)?,
            item_id: row.get(1)?,
            author_id: row.get(2)?,
            author_name: row.get(3)?,
            rating: row.get::<_, i64>(4)? as u8,
            comment: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn profile_from_row(row: &Row) -> Result<Profile, Error> {
        Ok(Profile {
            id: row.get(0)?,
            email: row.get(1)?,
            display_name: row.get(2)?,
            avatar_url: row.get(3)?,
            phone: row.get(4)?,
            whatsapp: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    // Mirrors the hosted tables the marketplace reads and writes
    #[derive(Debug)]
    pub struct Database {
        conn: Arc<Mutex<Connection>>,
    }

    impl Database {
        // Create a new database connection
        pub fn new(db_path: &str) -> Result<Self, Error> {
            let conn = Connection::open(db_path)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            logging::log!("Database connection established at: {}", db_path);
            Ok(Database {
                conn: Arc::new(Mutex::new(conn)),
            })
        }

        // Create the database schema
        pub async fn create_schema(&self) -> Result<(), Error> {
            let conn = self.conn.lock().await;

            // 1. Profiles and sessions
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS profiles (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    display_name TEXT NOT NULL,
                    avatar_url TEXT,
                    phone TEXT NOT NULL DEFAULT '',
                    whatsapp TEXT,
                    created_at TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS sessions (
                    token TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                eprintln!("Failed creating profiles tables: {}", e);
                e
            })?;

            // 2. Items table
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS items (
                    id TEXT PRIMARY KEY,
                    owner_id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    category TEXT NOT NULL,
                    price_per_day INTEGER NOT NULL CHECK (price_per_day > 0),
                    deposit INTEGER NOT NULL DEFAULT 0,
                    images TEXT NOT NULL DEFAULT '[]',
                    location TEXT NOT NULL,
                    available_from TEXT NOT NULL,
                    available_to TEXT,
                    verification TEXT NOT NULL DEFAULT 'pending',
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (owner_id) REFERENCES profiles(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_items_owner ON items(owner_id);",
            )
            .map_err(|e| {
                eprintln!("Failed creating items table: {}", e);
                e
            })?;

            // 3. Reviews table
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS reviews (
                    id TEXT PRIMARY KEY,
                    item_id TEXT NOT NULL,
                    author_id TEXT NOT NULL,
                    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    comment TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
                    FOREIGN KEY (author_id) REFERENCES profiles(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                eprintln!("Failed creating reviews table: {}", e);
                e
            })?;

            // 4. Wishlist pairs
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS wishlist (
                    user_id TEXT NOT NULL,
                    item_id TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, item_id),
                    FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE,
                    FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE
                );",
            )
            .map_err(|e| {
                eprintln!("Failed creating wishlist table: {}", e);
                e
            })?;

            // 5. Bookings
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS bookings (
                    id TEXT PRIMARY KEY,
                    item_id TEXT NOT NULL,
                    renter_id TEXT NOT NULL,
                    start_date TEXT NOT NULL,
                    end_date TEXT NOT NULL,
                    total_price INTEGER NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
                    FOREIGN KEY (renter_id) REFERENCES profiles(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_bookings_item ON bookings(item_id);",
            )
            .map_err(|e| {
                eprintln!("Failed creating bookings table: {}", e);
                e
            })?;
            Ok(())
        }

        pub async fn insert_profile(
            &self,
            email: &str,
            password_hash: &str,
            display_name: &str,
            phone: &str,
        ) -> Result<Profile, Error> {
            let conn = self.conn.lock().await;
            let profile = Profile {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                display_name: display_name.to_string(),
                avatar_url: None,
                phone: phone.to_string(),
                whatsapp: None,
                created_at: Utc::now(),
            };
            conn.execute(
                "INSERT INTO profiles (id, email, password_hash, display_name, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.id,
                    profile.email,
                    password_hash,
                    profile.display_name,
                    profile.phone,
                    profile.created_at
                ],
            )?;
            log!("[DB] Profile created: {}", profile.id);
            Ok(profile)
        }

        // Profile plus stored password hash, for sign-in
        pub async fn profile_credentials(&self, email: &str) -> Result<Option<(Profile, String)>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!(
                    "SELECT {}, p.password_hash FROM profiles p WHERE p.email = ?1",
                    PROFILE_COLUMNS
                ),
                [email],
                |row| Ok((profile_from_row(row)?, row.get(7)?)),
            )
            .optional()
        }

        pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {} FROM profiles p WHERE p.id = ?1", PROFILE_COLUMNS),
                [id],
                profile_from_row,
            )
            .optional()
        }

        // Only the fields that are set get written
        pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Profile, Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "UPDATE profiles SET
                    display_name = COALESCE(?2, display_name),
                    avatar_url = COALESCE(?3, avatar_url),
                    phone = COALESCE(?4, phone),
                    whatsapp = COALESCE(?5, whatsapp)
                 WHERE id = ?1",
                params![
                    id,
                    update.display_name,
                    update.avatar_url,
                    update.phone,
                    update.whatsapp
                ],
            )?;
            log!("[DB] Profile updated: {}", id);
            conn.query_row(
                &format!("SELECT {} FROM profiles p WHERE p.id = ?1", PROFILE_COLUMNS),
                [id],
                profile_from_row,
            )
        }

        pub async fn create_session(&self, token: &str, user_id: &str) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![token, user_id, Utc::now()],
            )?;
            Ok(())
        }

        pub async fn profile_for_session(&self, token: &str) -> Result<Option<Profile>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!(
                    "SELECT {} FROM sessions s JOIN profiles p ON p.id = s.user_id WHERE s.token = ?1",
                    PROFILE_COLUMNS
                ),
                [token],
                profile_from_row,
            )
            .optional()
        }

        pub async fn delete_session(&self, token: &str) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
            Ok(())
        }

        pub async fn insert_item(&self, owner_id: &str, item: &NewItem) -> Result<String, Error> {
            log!("[DB] Starting insert of '{}' for owner {}", item.title, owner_id);
            let conn = self.conn.lock().await;
            let id = Uuid::new_v4().to_string();
            let images = serde_json::to_string(&item.images)
                .map_err(|e| Error::ToSqlConversionFailure(Box::new(e)))?;
            conn.execute(
                "INSERT INTO items (id, owner_id, title, description, category, price_per_day,
                    deposit, images, location, available_from, available_to, verification, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    id,
                    owner_id,
                    item.title,
                    item.description,
                    item.category.slug(),
                    item.price_per_day as i64,
                    item.deposit as i64,
                    images,
                    item.location,
                    item.available_from,
                    item.available_to,
                    VerificationStatus::Pending.as_str(),
                    Utc::now()
                ],
            )?;
            log!("[DB] Item inserted: {}", id);
            Ok(id)
        }

        pub async fn get_item(&self, id: &str) -> Result<Option<Item>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {} FROM items i WHERE i.id = ?1", ITEM_COLUMNS),
                [id],
                item_from_row,
            )
            .optional()
        }

        // Retrieve all items, newest first
        pub async fn list_items(&self) -> Result<Vec<Item>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM items i ORDER BY i.created_at DESC",
                ITEM_COLUMNS
            ))?;
            let items = stmt
                .query_map([], item_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            logging::log!("Fetched {} items from the database", items.len());
            Ok(items)
        }

        pub async fn items_by_owner(&self, owner_id: &str) -> Result<Vec<Item>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM items i WHERE i.owner_id = ?1 ORDER BY i.created_at DESC",
                ITEM_COLUMNS
            ))?;
            let items = stmt.query_map([owner_id], item_from_row)?;
            items.collect()
        }

        pub async fn update_item_images(&self, id: &str, images: &[String]) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            let images = serde_json::to_string(images)
                .map_err(|e| Error::ToSqlConversionFailure(Box::new(e)))?;
            conn.execute("UPDATE items SET images = ?2 WHERE id = ?1", params![id, images])?;
            log!("[DB] Images updated for item {}", id);
            Ok(())
        }

        pub async fn set_verification(&self, id: &str, status: VerificationStatus) -> Result<bool, Error> {
            let conn = self.conn.lock().await;
            let changed = conn.execute(
                "UPDATE items SET verification = ?2 WHERE id = ?1",
                params![id, status.as_str()],
            )?;
            Ok(changed > 0)
        }

        pub async fn delete_item(&self, id: &str) -> Result<bool, Error> {
            let conn = self.conn.lock().await;
            let deleted = conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
            logging::log!("Item deleted: {} ({} rows)", id, deleted);
            Ok(deleted > 0)
        }

        pub async fn insert_review(
            &self,
            item_id: &str,
            author_id: &str,
            review: &NewReview,
        ) -> Result<Review, Error> {
            let conn = self.conn.lock().await;
            let id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO reviews (id, item_id, author_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, item_id, author_id, review.rating as i64, review.comment, Utc::now()],
            )?;
            log!("[DB] Review {} added to item {}", id, item_id);
            conn.query_row(
                &format!(
                    "SELECT {} FROM reviews r LEFT JOIN profiles p ON p.id = r.author_id WHERE r.id = ?1",
                    REVIEW_COLUMNS
                ),
                [&id],
                review_from_row,
            )
        }

        pub async fn reviews_for_item(&self, item_id: &str) -> Result<Vec<Review>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM reviews r LEFT JOIN profiles p ON p.id = r.author_id
                 WHERE r.item_id = ?1 ORDER BY r.created_at DESC",
                REVIEW_COLUMNS
            ))?;
            let reviews = stmt.query_map([item_id], review_from_row)?;
            reviews.collect()
        }

        // Reviews on every listing owned by `owner_id`
        pub async fn reviews_for_owner(&self, owner_id: &str) -> Result<Vec<Review>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM reviews r
                 JOIN items i ON i.id = r.item_id
                 LEFT JOIN profiles p ON p.id = r.author_id
                 WHERE i.owner_id = ?1 ORDER BY r.created_at DESC",
                REVIEW_COLUMNS
            ))?;
            let reviews = stmt.query_map([owner_id], review_from_row)?;
            reviews.collect()
        }

        // Flip the (user, item) pair and return whether it is now saved
        pub async fn toggle_wishlist(&self, user_id: &str, item_id: &str) -> Result<bool, Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;
            let removed = tx.execute(
                "DELETE FROM wishlist WHERE user_id = ?1 AND item_id = ?2",
                [user_id, item_id],
            )?;
            let saved = if removed == 0 {
                tx.execute(
                    "INSERT INTO wishlist (user_id, item_id, created_at) VALUES (?1, ?2, ?3)",
                    params![user_id, item_id, Utc::now()],
                )?;
                true
            } else {
                false
            };
            tx.commit()?;
            log!("[DB] Wishlist {} / {} -> saved={}", user_id, item_id, saved);
            Ok(saved)
        }

        pub async fn wishlist_entry(
            &self,
            user_id: &str,
            item_id: &str,
        ) -> Result<Option<WishlistEntry>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                "SELECT user_id, item_id, created_at FROM wishlist WHERE user_id = ?1 AND item_id = ?2",
                [user_id, item_id],
                |row| {
                    Ok(WishlistEntry {
                        user_id: row.get(0)?,
                        item_id: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()
        }

        pub async fn is_wishlisted(&self, user_id: &str, item_id: &str) -> Result<bool, Error> {
            Ok(self.wishlist_entry(user_id, item_id).await?.is_some())
        }

        pub async fn wishlist_items(&self, user_id: &str) -> Result<Vec<Item>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM wishlist w JOIN items i ON i.id = w.item_id
                 WHERE w.user_id = ?1 ORDER BY w.created_at DESC",
                ITEM_COLUMNS
            ))?;
            let items = stmt.query_map([user_id], item_from_row)?;
            items.collect()
        }

        // Insert a pending booking unless a live one already covers any of
        // the dates. Check and insert share one transaction.
        pub async fn insert_booking_if_free(
            &self,
            item_id: &str,
            renter_id: &str,
            start_date: NaiveDate,
            end_date: NaiveDate,
            total_price: u64,
        ) -> Result<Option<Booking>, Error> {
            let mut conn = self.conn.lock().await;
            let tx = conn.transaction()?;
            let taken: bool = tx.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM bookings
                    WHERE item_id = ?1 AND status != ?2 AND start_date <= ?4 AND ?3 <= end_date
                 )",
                params![
                    item_id,
                    BookingStatus::Cancelled.as_str(),
                    start_date,
                    end_date
                ],
                |row| row.get(0),
            )?;
            if taken {
                log!("[DB] Booking refused for item {}: dates taken", item_id);
                return Ok(None);
            }
            let booking = Booking {
                id: Uuid::new_v4().to_string(),
                item_id: item_id.to_string(),
                renter_id: renter_id.to_string(),
                start_date,
                end_date,
                total_price,
                status: BookingStatus::Pending,
                created_at: Utc::now(),
            };
            tx.execute(
                "INSERT INTO bookings (id, item_id, renter_id, start_date, end_date, total_price, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    booking.id,
                    booking.item_id,
                    booking.renter_id,
                    booking.start_date,
                    booking.end_date,
                    booking.total_price as i64,
                    booking.status.as_str(),
                    booking.created_at
                ],
            )?;
            tx.commit()?;
            log!("[DB] Booking {} created for item {}", booking.id, item_id);
            Ok(Some(booking))
        }

        pub async fn get_booking(&self, id: &str) -> Result<Option<Booking>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {} FROM bookings b WHERE b.id = ?1", BOOKING_COLUMNS),
                [id],
                booking_from_row,
            )
            .optional()
        }

        pub async fn bookings_for_item(&self, item_id: &str) -> Result<Vec<Booking>, Error> {
            self.query_bookings("WHERE b.item_id = ?1", item_id).await
        }

        pub async fn bookings_for_renter(&self, renter_id: &str) -> Result<Vec<Booking>, Error> {
            self.query_bookings("WHERE b.renter_id = ?1", renter_id).await
        }

        pub async fn bookings_for_owner(&self, owner_id: &str) -> Result<Vec<Booking>, Error> {
            self.query_bookings(
                "JOIN items i ON i.id = b.item_id WHERE i.owner_id = ?1",
                owner_id,
            )
            .await
        }

        async fn query_bookings(&self, clause: &str, key: &str) -> Result<Vec<Booking>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM bookings b {} ORDER BY b.start_date ASC",
                BOOKING_COLUMNS, clause
            ))?;
            let bookings = stmt.query_map([key], booking_from_row)?;
            bookings.collect()
        }

        pub async fn update_booking_status(&self, id: &str, status: BookingStatus) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute(
                "UPDATE bookings SET status = ?2 WHERE id = ?1",
                params![id, status.as_str()],
            )?;
            log!("[DB] Booking {} -> {}", id, status.as_str());
            Ok(())
        }
    }

    impl ListingSink for Database {
        async fn insert_listing(&self, owner_id: &str, item: &NewItem) -> MarketResult<String> {
            self.insert_item(owner_id, item)
                .await
                .map_err(MarketError::from)
        }
    }
}

#[cfg(feature = "ssr")]
pub use db_impl::Database;

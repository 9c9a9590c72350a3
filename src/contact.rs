//! Links to third-party services: generated avatars and WhatsApp chats.

pub const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

/// Returns the stored avatar or a generated one for `display_name`.
pub fn avatar_url(stored: Option<&str>, display_name: &str) -> String {
    match stored.map(str::trim).filter(|s| !s.is_empty()) {
        Some(url) => url.to_string(),
        None => {
            let name = display_name.trim();
            let name = if name.is_empty() { "User" } else { name };
            format!(
                "{}?name={}&background=random",
                AVATAR_SERVICE,
                urlencoding::encode(name)
            )
        }
    }
}

/// `wa.me` deep link with a prefilled message. Everything but digits is
/// dropped from the number; `None` when nothing is left.
pub fn whatsapp_link(number: &str, message: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if message.is_empty() {
        Some(format!("https://wa.me/{}", digits))
    } else {
        Some(format!(
            "https://wa.me/{}?text={}",
            digits,
            urlencoding::encode(message)
        ))
    }
}

/// Message prefilled when a renter contacts an owner about a listing.
pub fn enquiry_message(item_title: &str) -> String {
    format!("Hi! Is your \"{}\" available to rent?", item_title)
}

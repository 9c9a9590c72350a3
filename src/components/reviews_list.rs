use leptos::*;

use crate::models::{RatingSummary, Review};

fn stars(rating: u8) -> String {
    (1..=5).map(|i| if i <= rating { '★' } else { '☆' }).collect()
}

#[component]
pub fn ReviewsList(#[prop(into)] reviews: Signal<Vec<Review>>) -> impl IntoView {
    let summary = create_memo(move |_| reviews.with(|r| RatingSummary::from_reviews(r)));
    view! {
        <div class="reviews">
            <h3>{ "Reviews" }</h3>
            <p class="rating-summary">
                { move || {
                    let s = summary.get();
                    if s.count == 0 {
                        "No reviews yet".to_string()
                    } else {
                        format!("{} {:.1} ({} reviews)", stars(s.stars()), s.average, s.count)
                    }
                } }
            </p>
            <ul>
                { move || reviews.get().into_iter().map(|review| {
                    view! {
                        <li>
                            <span class="stars">{ stars(review.rating) }</span>
                            <strong>{ review.author_name }</strong>
                            <p>{ review.comment }</p>
                        </li>
                    }
                }).collect_view() }
            </ul>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::stars;

    #[test]
    fn renders_star_string() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(0), "☆☆☆☆☆");
    }
}

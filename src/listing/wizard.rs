use chrono::NaiveDate;
use leptos::logging::log;
use serde::{Deserialize, Serialize};

use crate::models::{Category, Item, NewItem};

/// Everything the user has typed so far. Nothing here is validated until
/// submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub price_per_day: Option<u32>,
    pub deposit: u32,
    pub location: String,
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,
    pub images: Vec<String>,
}

impl From<NewItem> for ListingDraft {
    fn from(item: NewItem) -> Self {
        ListingDraft {
            title: item.title,
            description: item.description,
            category: Some(item.category),
            price_per_day: Some(item.price_per_day),
            deposit: item.deposit,
            location: item.location,
            available_from: Some(item.available_from),
            available_to: item.available_to,
            images: item.images,
        }
    }
}

impl From<&Item> for ListingDraft {
    fn from(item: &Item) -> Self {
        ListingDraft {
            title: item.title.clone(),
            description: item.description.clone(),
            category: Some(item.category),
            price_per_day: Some(item.price_per_day),
            deposit: item.deposit,
            location: item.location.clone(),
            available_from: Some(item.available_from),
            available_to: item.available_to,
            images: item.images.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Details,
    Pricing,
    Photos,
    Availability,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Details,
        WizardStep::Pricing,
        WizardStep::Photos,
        WizardStep::Availability,
        WizardStep::Review,
    ];

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Details => "Item details",
            WizardStep::Pricing => "Pricing",
            WizardStep::Photos => "Photos",
            WizardStep::Availability => "Availability",
            WizardStep::Review => "Review & publish",
        }
    }
}

/// Draft plus a step cursor that always stays in `0..WizardStep::ALL.len()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingWizard {
    pub draft: ListingDraft,
    step: usize,
}

impl ListingWizard {
    pub const TOTAL_STEPS: usize = WizardStep::ALL.len();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(draft: ListingDraft) -> Self {
        ListingWizard { draft, step: 0 }
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::ALL[self.step]
    }

    pub fn is_first(&self) -> bool {
        self.step == 0
    }

    pub fn is_last(&self) -> bool {
        self.step + 1 == Self::TOTAL_STEPS
    }

    /// Moves forward one step. Returns false on the last step.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.step += 1;
        log!("[WIZARD] Step {} ({:?})", self.step, self.step());
        true
    }

    /// Moves back one step. Returns false on the first step.
    pub fn back(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.step -= 1;
        log!("[WIZARD] Back to step {} ({:?})", self.step, self.step());
        true
    }

    /// Jumps to `index`, clamped to the valid range.
    pub fn go_to(&mut self, index: usize) {
        self.step = index.min(Self::TOTAL_STEPS - 1);
    }

    /// Percentage complete, counting the current step as done.
    pub fn progress_percent(&self) -> u8 {
        ((self.step + 1) * 100 / Self::TOTAL_STEPS) as u8
    }

    /// Problems with the fields on the current step. Advancing is not
    /// blocked by these; the form shows them next to the inputs.
    pub fn step_issues(&self) -> Vec<&'static str> {
        let d = &self.draft;
        let mut issues = Vec::new();
        match self.step() {
            WizardStep::Details => {
                if d.title.trim().is_empty() {
                    issues.push("Title is required");
                }
                if d.category.is_none() {
                    issues.push("Pick a category");
                }
                if d.location.trim().is_empty() {
                    issues.push("Location is required");
                }
            }
            WizardStep::Pricing => {
                if d.price_per_day.unwrap_or(0) == 0 {
                    issues.push("Daily price must be greater than zero");
                }
            }
            WizardStep::Photos => {
                if d.images.is_empty() {
                    issues.push("Add at least one photo");
                }
            }
            WizardStep::Availability => match (d.available_from, d.available_to) {
                (None, _) => issues.push("Choose the first day it can be rented"),
                (Some(from), Some(to)) if to < from => {
                    issues.push("The last day must be after the first day")
                }
                _ => {}
            },
            WizardStep::Review => {}
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_never_leaves_bounds() {
        let mut wizard = ListingWizard::new();
        assert!(!wizard.back());
        assert_eq!(wizard.step_index(), 0);
        for _ in 0..20 {
            wizard.next();
            assert!(wizard.step_index() < ListingWizard::TOTAL_STEPS);
        }
        assert!(wizard.is_last());
        assert!(!wizard.next());
        for _ in 0..20 {
            wizard.back();
        }
        assert!(wizard.is_first());
        wizard.go_to(99);
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn progress_counts_current_step() {
        let mut wizard = ListingWizard::new();
        assert_eq!(wizard.progress_percent(), 20);
        wizard.go_to(2);
        assert_eq!(wizard.progress_percent(), 60);
        wizard.go_to(4);
        assert_eq!(wizard.progress_percent(), 100);
    }

    #[test]
    fn issues_follow_the_current_step() {
        let mut wizard = ListingWizard::new();
        assert_eq!(wizard.step_issues().len(), 3);
        wizard.draft.title = "Tent".into();
        wizard.draft.category = Some(Category::Outdoor);
        wizard.draft.location = "Goa".into();
        assert!(wizard.step_issues().is_empty());

        wizard.next();
        assert_eq!(wizard.step_issues(), vec!["Daily price must be greater than zero"]);
        wizard.draft.price_per_day = Some(300);
        assert!(wizard.step_issues().is_empty());

        wizard.go_to(3);
        wizard.draft.available_from = NaiveDate::from_ymd_opt(2026, 7, 10);
        wizard.draft.available_to = NaiveDate::from_ymd_opt(2026, 7, 1);
        assert_eq!(wizard.step_issues(), vec!["The last day must be after the first day"]);
    }
}

//! The "list an item" flow: a multi-step draft, photo staging and upload,
//! and the final submission.
pub mod submission;
pub mod uploader;
pub mod wizard;

pub use submission::{submit_listing, validate_draft, ListingSink, SubmitOutcome};
pub use uploader::{validate_file, ImageStager, Rejection, StagedImage, UploadProgress, UploadReport};
pub use wizard::{ListingDraft, ListingWizard, WizardStep};

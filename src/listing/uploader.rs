//! Photo staging and upload for the listing wizard.
//!
//! Files are checked locally before anything leaves the browser, shown
//! through local preview handles, and uploaded one at a time when the user
//! confirms. URLs of finished uploads are appended to the draft.
use leptos::logging::{log, warn};

use crate::error::{MarketError, MarketResult};
use crate::storage::{object_key, ObjectStore};

pub const MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;
pub const MAX_IMAGES: usize = 8;
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// A file that was refused, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: String,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}

pub fn validate_file(name: &str, mime: &str, size: u64) -> Result<(), Rejection> {
    let reject = |reason: String| Rejection {
        file_name: name.to_string(),
        reason,
    };
    if !ACCEPTED_MIME_TYPES.contains(&mime) {
        return Err(reject(format!(
            "unsupported file type {}; use JPEG, PNG, WebP or GIF",
            if mime.is_empty() { "(unknown)" } else { mime }
        )));
    }
    if size == 0 {
        return Err(reject("file is empty".to_string()));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(reject(format!(
            "file is {:.1} MB, the limit is 2 MB",
            size as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(())
}

/// A file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage<P> {
    pub name: String,
    pub mime: String,
    pub size: u64,
    /// Local object URL used for the thumbnail until the upload finishes.
    pub preview: String,
    pub payload: P,
}

/// Reported before, halfway through and after each file. The halfway
/// mark is not measured; the store gives no byte-level feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub file_name: String,
    pub index: usize,
    pub total: usize,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<String>,
    /// Preview handles of every processed file, to be revoked by the caller.
    pub released_previews: Vec<String>,
}

impl UploadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Images already attached to the draft plus files staged for upload.
#[derive(Debug, Clone)]
pub struct ImageStager<P> {
    existing: Vec<String>,
    staged: Vec<StagedImage<P>>,
    min_images: usize,
}

impl<P> Default for ImageStager<P> {
    fn default() -> Self {
        ImageStager {
            existing: Vec::new(),
            staged: Vec::new(),
            min_images: 0,
        }
    }
}

impl<P> ImageStager<P> {
    pub fn new(existing: Vec<String>) -> Self {
        ImageStager {
            existing,
            staged: Vec::new(),
            min_images: 0,
        }
    }

    /// Uploaded photos that must stay attached, e.g. one for a live listing.
    pub fn with_min_images(mut self, min_images: usize) -> Self {
        self.min_images = min_images;
        self
    }

    pub fn can_remove(&self) -> bool {
        self.existing.len() > self.min_images
    }

    pub fn images(&self) -> &[String] {
        &self.existing
    }

    pub fn staged(&self) -> &[StagedImage<P>] {
        &self.staged
    }

    pub fn total(&self) -> usize {
        self.existing.len() + self.staged.len()
    }

    /// Validates and stages `files`. Returns the ones that were refused;
    /// the rest are staged in order.
    pub fn stage(&mut self, files: Vec<StagedImage<P>>) -> Vec<Rejection> {
        let mut rejected = Vec::new();
        for file in files {
            if self.total() >= MAX_IMAGES {
                rejected.push(Rejection {
                    file_name: file.name,
                    reason: format!("a listing can have at most {} photos", MAX_IMAGES),
                });
                continue;
            }
            match validate_file(&file.name, &file.mime, file.size) {
                Ok(()) => self.staged.push(file),
                Err(rejection) => {
                    warn!("[UPLOAD] Rejected {}", rejection);
                    rejected.push(rejection);
                }
            }
        }
        rejected
    }

    /// Drops a staged file and hands back its preview handle for revoking.
    pub fn unstage(&mut self, index: usize) -> Option<String> {
        if index < self.staged.len() {
            Some(self.staged.remove(index).preview)
        } else {
            None
        }
    }

    /// Uploads every staged file in order, one at a time. A failed file is
    /// recorded and skipped; there is no retry.
    pub async fn upload_all<S>(
        &mut self,
        store: &S,
        owner_id: &str,
        mut on_progress: impl FnMut(UploadProgress),
    ) -> UploadReport
    where
        S: ObjectStore<Payload = P>,
    {
        let staged = std::mem::take(&mut self.staged);
        let total = staged.len();
        let mut report = UploadReport::default();

        for (index, file) in staged.into_iter().enumerate() {
            let progress = |percent| UploadProgress {
                file_name: file.name.clone(),
                index,
                total,
                percent,
            };
            on_progress(progress(0));
            let path = object_key(owner_id, &file.name);
            on_progress(progress(50));
            match store.put(&path, &file.mime, file.payload).await {
                Ok(url) => {
                    log!("[UPLOAD] {} -> {}", file.name, url);
                    self.existing.push(url.clone());
                    report.uploaded.push(url);
                    on_progress(progress(100));
                }
                Err(e) => {
                    warn!("[UPLOAD] Failed to upload {}: {}", file.name, e);
                    report.failed.push(file.name.clone());
                }
            }
            report.released_previews.push(file.preview);
        }
        report
    }

    /// Deletes the remote object behind `url`, then forgets the URL. URLs
    /// that do not belong to the store are only forgotten. If the remote
    /// delete fails the URL stays attached.
    pub async fn remove_existing<S>(&mut self, store: &S, url: &str) -> MarketResult<()>
    where
        S: ObjectStore,
    {
        if !self.existing.iter().any(|u| u == url) {
            return Err(MarketError::not_found("image"));
        }
        if !self.can_remove() {
            return Err(MarketError::validation(format!(
                "keep at least {} photo(s)",
                self.min_images
            )));
        }
        if let Some(path) = store.path_for_url(url) {
            match store.remove(&path).await {
                Ok(()) | Err(MarketError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        } else {
            log!("[UPLOAD] {} is not in our storage, dropping reference only", url);
        }
        self.existing.retain(|u| u != url);
        Ok(())
    }

    /// URLs in `original` that are no longer in `kept`.
    pub fn reconcile(original: &[String], kept: &[String]) -> Vec<String> {
        original
            .iter()
            .filter(|url| !kept.contains(url))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{object_path, public_url};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingStore {
        calls: RefCell<Vec<String>>,
        fail_remove: bool,
    }

    impl ObjectStore for RecordingStore {
        type Payload = &'static str;

        async fn put(&self, path: &str, _content_type: &str, payload: &'static str) -> MarketResult<String> {
            self.calls.borrow_mut().push(format!("put {}", path));
            if payload == "broken" {
                return Err(MarketError::Storage("connection reset".into()));
            }
            Ok(public_url("https://cdn.test", "item-images", path))
        }

        async fn remove(&self, path: &str) -> MarketResult<()> {
            self.calls.borrow_mut().push(format!("remove {}", path));
            if self.fail_remove {
                return Err(MarketError::Storage("denied".into()));
            }
            Ok(())
        }

        fn path_for_url(&self, url: &str) -> Option<String> {
            object_path("https://cdn.test", "item-images", url)
        }
    }

    fn file(name: &str, mime: &str, size: u64, payload: &'static str) -> StagedImage<&'static str> {
        StagedImage {
            name: name.into(),
            mime: mime.into(),
            size,
            preview: format!("blob:{}", name),
            payload,
        }
    }

    #[test]
    fn rejects_large_and_foreign_files() {
        assert!(validate_file("a.jpg", "image/jpeg", MAX_IMAGE_BYTES).is_ok());
        let too_big = validate_file("b.jpg", "image/jpeg", MAX_IMAGE_BYTES + 1).unwrap_err();
        assert_eq!(too_big.file_name, "b.jpg");
        assert!(too_big.reason.contains("2 MB"));
        assert!(validate_file("c.pdf", "application/pdf", 10).is_err());
        assert!(validate_file("d.svg", "image/svg+xml", 10).is_err());
        assert!(validate_file("e.png", "image/png", 0).is_err());
    }

    #[test]
    fn stage_returns_rejections_and_keeps_the_rest() {
        let mut stager = ImageStager::new(vec![]);
        let rejected = stager.stage(vec![
            file("ok.png", "image/png", 1000, "x"),
            file("huge.png", "image/png", 3 * 1024 * 1024, "x"),
            file("doc.pdf", "application/pdf", 100, "x"),
        ]);
        assert_eq!(rejected.len(), 2);
        assert_eq!(stager.staged().len(), 1);
        assert_eq!(stager.unstage(0).as_deref(), Some("blob:ok.png"));
        assert_eq!(stager.unstage(0), None);
    }

    #[test]
    fn stage_enforces_photo_limit() {
        let existing = (0..MAX_IMAGES - 1).map(|i| format!("https://cdn.test/item-images/{}", i)).collect();
        let mut stager = ImageStager::new(existing);
        let rejected = stager.stage(vec![
            file("one.png", "image/png", 10, "x"),
            file("two.png", "image/png", 10, "x"),
        ]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].file_name, "two.png");
        assert_eq!(stager.total(), MAX_IMAGES);
    }

    #[tokio::test]
    async fn upload_continues_after_a_failure() {
        let store = RecordingStore::default();
        let mut stager = ImageStager::new(vec!["https://cdn.test/item-images/u1/old.png".to_string()]);
        stager.stage(vec![
            file("a.png", "image/png", 10, "a"),
            file("b.png", "image/png", 10, "broken"),
            file("c.png", "image/png", 10, "c"),
        ]);

        let mut progress = Vec::new();
        let report = stager
            .upload_all(&store, "u1", |p| progress.push((p.index, p.percent)))
            .await;

        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(report.failed, vec!["b.png".to_string()]);
        assert_eq!(report.released_previews.len(), 3);
        assert!(!report.is_clean());
        assert_eq!(stager.images().len(), 3);
        assert!(stager.staged().is_empty());
        assert_eq!(
            progress,
            vec![(0, 0), (0, 50), (0, 100), (1, 0), (1, 50), (2, 0), (2, 50), (2, 100)]
        );
        let calls = store.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("put u1/") && calls[0].ends_with("-a.png"));
        assert!(calls[2].ends_with("-c.png"));
    }

    #[tokio::test]
    async fn remove_deletes_remote_before_reference() {
        let store = RecordingStore::default();
        let url = "https://cdn.test/item-images/u1/old.png".to_string();
        let mut stager: ImageStager<&'static str> =
            ImageStager::new(vec![url.clone(), "https://elsewhere/pic.jpg".to_string()]);

        stager.remove_existing(&store, &url).await.unwrap();
        assert_eq!(store.calls.borrow().as_slice(), ["remove u1/old.png"]);
        assert_eq!(stager.images(), ["https://elsewhere/pic.jpg".to_string()]);

        stager.remove_existing(&store, "https://elsewhere/pic.jpg").await.unwrap();
        assert_eq!(store.calls.borrow().len(), 1);
        assert!(stager.images().is_empty());
        assert!(stager.remove_existing(&store, &url).await.is_err());
    }

    #[tokio::test]
    async fn failed_remote_delete_keeps_reference() {
        let store = RecordingStore {
            fail_remove: true,
            ..Default::default()
        };
        let url = "https://cdn.test/item-images/u1/old.png".to_string();
        let mut stager: ImageStager<&'static str> = ImageStager::new(vec![url.clone()]);
        assert!(stager.remove_existing(&store, &url).await.is_err());
        assert_eq!(stager.images(), [url]);
    }

    #[tokio::test]
    async fn floor_blocks_removal_before_any_remote_call() {
        let store = RecordingStore::default();
        let url = "https://cdn.test/item-images/u1/only.png".to_string();
        let mut stager: ImageStager<&'static str> =
            ImageStager::new(vec![url.clone()]).with_min_images(1);
        assert!(!stager.can_remove());
        assert!(matches!(
            stager.remove_existing(&store, &url).await,
            Err(MarketError::Validation(_))
        ));
        assert!(store.calls.borrow().is_empty());
        assert_eq!(stager.images(), [url.clone()]);

        stager.stage(vec![file("new.png", "image/png", 10, "n")]);
        stager.upload_all(&store, "u1", |_| {}).await;
        assert!(stager.can_remove());
        stager.remove_existing(&store, &url).await.unwrap();
        assert_eq!(stager.images().len(), 1);
    }

    #[test]
    fn reconcile_lists_removed_urls() {
        let original = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let kept = vec!["c".to_string(), "a".to_string(), "d".to_string()];
        assert_eq!(ImageStager::<()>::reconcile(&original, &kept), vec!["b".to_string()]);
    }
}

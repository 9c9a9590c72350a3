//! Object storage for listing photos and avatars.
//!
//! All public URLs are built and parsed by [`public_url`] and
//! [`object_path`]; nothing else in the crate guesses at the URL layout.
use crate::error::MarketResult;

pub const ITEM_IMAGES_BUCKET: &str = "item-images";
pub const AVATARS_BUCKET: &str = "avatars";

/// Public URL of `path` inside `bucket`.
pub fn public_url(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket,
        path.trim_start_matches('/')
    )
}

/// Inverse of [`public_url`]. Returns `None` for URLs that do not point
/// into `bucket` under `base`.
pub fn object_path(base: &str, bucket: &str, url: &str) -> Option<String> {
    let prefix = format!("{}/{}/", base.trim_end_matches('/'), bucket);
    let rest = url.strip_prefix(&prefix)?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    if rest.is_empty() || !is_safe_path(rest) {
        return None;
    }
    Some(rest.to_string())
}

/// Unique object path for an upload: `<owner>/<uuid>-<name>`.
pub fn object_key(owner_id: &str, file_name: &str) -> String {
    format!(
        "{}/{}-{}",
        sanitize_segment(owner_id),
        uuid::Uuid::new_v4().simple(),
        sanitize_segment(file_name)
    )
}

fn sanitize_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches(|c| c == '-' || c == '.').to_string();
    if out.is_empty() {
        "file".to_string()
    } else {
        out
    }
}

/// Relative, no parent references, no empty segments.
pub fn is_safe_path(path: &str) -> bool {
    !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Whether `path` lies under `<owner_id>/`, the only prefix that owner
/// may write to or delete from.
pub fn in_owner_prefix(owner_id: &str, path: &str) -> bool {
    is_safe_path(path)
        && path
            .strip_prefix(owner_id)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Remote storage for one bucket. Uploads return the public URL.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// What an upload carries: raw bytes on the server, a browser `File`
    /// on the client.
    type Payload;

    async fn put(&self, path: &str, content_type: &str, payload: Self::Payload)
        -> MarketResult<String>;

    async fn remove(&self, path: &str) -> MarketResult<()>;

    /// Object path for one of this store's public URLs.
    fn path_for_url(&self, url: &str) -> Option<String>;
}

#[cfg(feature = "ssr")]
mod local {
    use super::*;
    use crate::error::MarketError;
    use leptos::logging::log;
    use std::path::{Path, PathBuf};

    /// Keeps objects on the local filesystem under `<root>/<bucket>/`,
    /// served by the web server under `public_base`.
    #[derive(Debug, Clone)]
    pub struct LocalObjectStore {
        root: PathBuf,
        bucket: String,
        public_base: String,
    }

    impl LocalObjectStore {
        pub fn new(root: impl AsRef<Path>, bucket: &str, public_base: &str) -> Self {
            LocalObjectStore {
                root: root.as_ref().to_path_buf(),
                bucket: bucket.to_string(),
                public_base: public_base.to_string(),
            }
        }

        pub fn bucket(&self) -> &str {
            &self.bucket
        }

        fn file_path(&self, path: &str) -> MarketResult<PathBuf> {
            if !is_safe_path(path) {
                return Err(MarketError::validation("invalid object path"));
            }
            Ok(self.root.join(&self.bucket).join(path))
        }
    }

    impl ObjectStore for LocalObjectStore {
        type Payload = Vec<u8>;

        async fn put(&self, path: &str, content_type: &str, payload: Vec<u8>) -> MarketResult<String> {
            let file = self.file_path(path)?;
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&file, &payload)?;
            log!(
                "[STORAGE] Stored {} ({} bytes, {}) in {}",
                path,
                payload.len(),
                content_type,
                self.bucket
            );
            Ok(public_url(&self.public_base, &self.bucket, path))
        }

        async fn remove(&self, path: &str) -> MarketResult<()> {
            let file = self.file_path(path)?;
            match std::fs::remove_file(&file) {
                Ok(()) => {
                    log!("[STORAGE] Removed {} from {}", path, self.bucket);
                    Ok(())
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(MarketError::not_found("image"))
                }
                Err(e) => Err(e.into()),
            }
        }

        fn path_for_url(&self, url: &str) -> Option<String> {
            object_path(&self.public_base, &self.bucket, url)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn put_then_remove() {
            let dir = tempfile::tempdir().unwrap();
            let store = LocalObjectStore::new(dir.path(), ITEM_IMAGES_BUCKET, "/storage");
            let url = store
                .put("u1/abc-tent.png", "image/png", vec![1, 2, 3])
                .await
                .unwrap();
            assert_eq!(url, "/storage/item-images/u1/abc-tent.png");
            assert_eq!(
                std::fs::read(dir.path().join("item-images/u1/abc-tent.png")).unwrap(),
                vec![1, 2, 3]
            );
            assert_eq!(store.path_for_url(&url).as_deref(), Some("u1/abc-tent.png"));

            store.remove("u1/abc-tent.png").await.unwrap();
            assert_eq!(
                store.remove("u1/abc-tent.png").await,
                Err(MarketError::not_found("image"))
            );
        }

        #[tokio::test]
        async fn refuses_path_traversal() {
            let dir = tempfile::tempdir().unwrap();
            let store = LocalObjectStore::new(dir.path(), AVATARS_BUCKET, "/storage");
            assert!(store.put("../escape.png", "image/png", vec![0]).await.is_err());
            assert!(store.remove("/etc/passwd").await.is_err());
        }
    }
}

#[cfg(feature = "ssr")]
pub use local::LocalObjectStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_and_path_are_inverse() {
        let url = public_url("https://cdn.example.com/storage/", ITEM_IMAGES_BUCKET, "/u1/x.jpg");
        assert_eq!(url, "https://cdn.example.com/storage/item-images/u1/x.jpg");
        assert_eq!(
            object_path("https://cdn.example.com/storage", ITEM_IMAGES_BUCKET, &url).as_deref(),
            Some("u1/x.jpg")
        );
    }

    #[test]
    fn foreign_urls_have_no_path() {
        let base = "/storage";
        assert_eq!(object_path(base, ITEM_IMAGES_BUCKET, "https://elsewhere/x.jpg"), None);
        assert_eq!(object_path(base, ITEM_IMAGES_BUCKET, "/storage/avatars/u1/x.jpg"), None);
        assert_eq!(object_path(base, ITEM_IMAGES_BUCKET, "/storage/item-images/../db"), None);
        assert_eq!(
            object_path(base, ITEM_IMAGES_BUCKET, "/storage/item-images/u1/x.jpg?v=2").as_deref(),
            Some("u1/x.jpg")
        );
    }

    #[test]
    fn owner_prefix_is_exact() {
        assert!(in_owner_prefix("u1", "u1/x.jpg"));
        assert!(!in_owner_prefix("u1", "u10/x.jpg"));
        assert!(!in_owner_prefix("u1", "u1"));
        assert!(!in_owner_prefix("u1", "u1/../u2/x.jpg"));
        assert!(!in_owner_prefix("", "/x.jpg"));
    }

    #[test]
    fn keys_are_unique_and_sanitized() {
        let a = object_key("user-1", "My Tent (2).JPG");
        let b = object_key("user-1", "My Tent (2).JPG");
        assert_ne!(a, b);
        assert!(a.starts_with("user-1/"));
        assert!(a.ends_with("-my-tent-2-.jpg"));
        assert!(is_safe_path(&a));
        assert!(object_key("u", "../../").ends_with("-file"));
    }
}

use leptos::html::Input;
use leptos::logging::log;
use leptos::*;

use crate::app::Session;
use crate::client::HttpObjectStore;
use crate::components::toast::use_toasts;
use crate::listing::{validate_file, ImageStager, StagedImage, UploadProgress};
use crate::storage::ITEM_IMAGES_BUCKET;
use crate::utils::leptos_owner::with_owner_safe;

type BrowserStager = ImageStager<web_sys::File>;

/// Public prefix of stored objects, matching the server's default.
pub const STORAGE_BASE: &str = "/storage";

fn revoke(preview: &str) {
    let _ = web_sys::Url::revoke_object_url(preview);
}

/// Turns the input's file list into staged images. Files that fail the
/// local checks get no preview handle.
fn read_files(input: &web_sys::HtmlInputElement) -> (Vec<StagedImage<web_sys::File>>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    let Some(list) = input.files() else {
        return (accepted, rejected);
    };
    for index in 0..list.length() {
        let Some(file) = list.get(index) else { continue };
        let (name, mime, size) = (file.name(), file.type_(), file.size() as u64);
        if let Err(rejection) = validate_file(&name, &mime, size) {
            rejected.push(rejection.to_string());
            continue;
        }
        match web_sys::Url::create_object_url_with_blob(&file) {
            Ok(preview) => accepted.push(StagedImage {
                name,
                mime,
                size,
                preview,
                payload: file,
            }),
            Err(_) => rejected.push(format!("{}: could not be read", name)),
        }
    }
    (accepted, rejected)
}

/// Photo picker for the listing wizard and owner tools. Reports the list
/// of uploaded photo URLs through `on_change` whenever it changes.
/// `min_images` uploaded photos can never be removed.
#[component]
pub fn ImageUploader(
    initial: Vec<String>,
    on_change: Callback<Vec<String>>,
    #[prop(optional)] min_images: usize,
) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let stager = create_rw_signal(BrowserStager::new(initial).with_min_images(min_images));
    let (busy, set_busy) = create_signal(false);
    let (progress, set_progress) = create_signal(None::<UploadProgress>);
    let input_ref = create_node_ref::<Input>();

    let store = move || HttpObjectStore::new(session.client(), ITEM_IMAGES_BUCKET, STORAGE_BASE);

    let on_pick = move |_| {
        let Some(input) = input_ref.get() else { return };
        let (files, mut rejected) = read_files(&input);
        input.set_value("");
        let previews: Vec<(String, String)> =
            files.iter().map(|f| (f.name.clone(), f.preview.clone())).collect();
        let mut refused = Vec::new();
        stager.update(|s| refused = s.stage(files));
        for rejection in refused {
            if let Some((_, preview)) = previews.iter().find(|(name, _)| *name == rejection.file_name) {
                revoke(preview);
            }
            rejected.push(rejection.to_string());
        }
        if !rejected.is_empty() {
            toasts.error(format!("Some files were skipped: {}", rejected.join("; ")));
        }
    };

    let unstage = move |index: usize| {
        let mut preview = None;
        stager.update(|s| preview = s.unstage(index));
        if let Some(preview) = preview {
            revoke(&preview);
        }
    };

    let upload = move |_| {
        let owner_id = match session.user() {
            Some(user) => user.id,
            None => {
                toasts.error("Sign in to upload photos");
                return;
            }
        };
        let mut working = stager.get_untracked();
        let store = store();
        let owner = Owner::current();
        set_busy.set(true);
        spawn_local(async move {
            let report = working
                .upload_all(&store, &owner_id, |p| set_progress.set(Some(p)))
                .await;
            for preview in &report.released_previews {
                revoke(preview);
            }
            log!("[UPLOAD] {} uploaded, {} failed", report.uploaded.len(), report.failed.len());
            with_owner_safe(owner, "photo upload", move || {
                if report.is_clean() {
                    toasts.success(format!("{} photo(s) uploaded", report.uploaded.len()));
                } else {
                    toasts.error(format!("Upload failed for: {}", report.failed.join(", ")));
                }
                on_change.call(working.images().to_vec());
                stager.set(working);
                set_progress.set(None);
                set_busy.set(false);
            });
        });
    };

    let remove = move |url: String| {
        let mut working = stager.get_untracked();
        let store = store();
        let owner = Owner::current();
        set_busy.set(true);
        spawn_local(async move {
            let removed = working.remove_existing(&store, &url).await;
            with_owner_safe(owner, "photo removal", move || {
                match removed {
                    Ok(()) => {
                        on_change.call(working.images().to_vec());
                        stager.set(working);
                    }
                    Err(e) => toasts.error(e.to_string()),
                }
                set_busy.set(false);
            });
        });
    };

    view! {
        <div class="image-uploader">
            <input
                type="file"
                accept="image/jpeg,image/png,image/webp,image/gif"
                multiple=true
                node_ref=input_ref
                disabled=busy
                on:change=on_pick
            />
            <p class="hint">{ "JPEG, PNG, WebP or GIF, up to 2 MB each." }</p>
            <div class="thumbs">
                { move || stager.with(|s| s.images().to_vec()).into_iter().map(|url| {
                    let target = url.clone();
                    view! {
                        <figure class="thumb">
                            <img src=url alt="Listing photo" />
                            <button
                                type="button"
                                disabled=move || busy.get() || !stager.with(|s| s.can_remove())
                                on:click=move |_| remove(target.clone())
                            >
                                { "Remove" }
                            </button>
                        </figure>
                    }
                }).collect_view() }
                { move || stager.with(|s| {
                    s.staged().iter().enumerate().map(|(index, file)| {
                        let preview = file.preview.clone();
                        let name = file.name.clone();
                        view! {
                            <figure class="thumb staged">
                                <img src=preview alt=name.clone() />
                                <figcaption>{ name }</figcaption>
                                <button type="button" disabled=busy on:click=move |_| unstage(index)>
                                    { "Discard" }
                                </button>
                            </figure>
                        }
                    }).collect_view()
                }) }
            </div>
            { move || progress.get().map(|p| view! {
                <div class="upload-progress">
                    { format!("Uploading {} ({}/{})", p.file_name, p.index + 1, p.total) }
                    <progress max="100" value=p.percent.to_string()></progress>
                </div>
            }) }
            <button
                type="button"
                disabled=move || busy.get() || stager.with(|s| s.staged().is_empty())
                on:click=upload
            >
                { "Upload photos" }
            </button>
        </div>
    }
}

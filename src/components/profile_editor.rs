use leptos::ev::SubmitEvent;
use leptos::html::Input;
use leptos::*;

use crate::app::Session;
use crate::client::HttpObjectStore;
use crate::components::image_uploader::STORAGE_BASE;
use crate::components::toast::use_toasts;
use crate::listing::validate_file;
use crate::models::{Profile, ProfileUpdate};
use crate::storage::{object_key, ObjectStore, AVATARS_BUCKET};

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Display name, contact numbers and avatar of the signed-in user.
#[component]
pub fn ProfileEditor(profile: Profile) -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let (name, set_name) = create_signal(profile.display_name.clone());
    let (phone, set_phone) = create_signal(profile.phone.clone());
    let (whatsapp, set_whatsapp) = create_signal(profile.whatsapp.clone().unwrap_or_default());
    let (avatar, set_avatar) = create_signal(profile.avatar());
    let (saving, set_saving) = create_signal(false);
    let user_id = store_value(profile.id.clone());
    let avatar_ref = create_node_ref::<Input>();

    let save = move |update: ProfileUpdate| {
        let client = session.client();
        set_saving.set(true);
        spawn_local(async move {
            match client.update_profile(&update).await {
                Ok(profile) => {
                    set_avatar.set(profile.avatar());
                    session.set_profile(profile);
                    toasts.success("Profile saved");
                }
                Err(e) => toasts.error(e.to_string()),
            }
            set_saving.set(false);
        });
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        save(ProfileUpdate {
            display_name: non_empty(name.get_untracked()),
            phone: Some(phone.get_untracked().trim().to_string()),
            whatsapp: Some(whatsapp.get_untracked().trim().to_string()),
            avatar_url: None,
        });
    };

    let on_avatar = move |_| {
        let Some(file) = avatar_ref
            .get()
            .and_then(|input| input.files())
            .and_then(|list| list.get(0))
        else {
            return;
        };
        let (name, mime) = (file.name(), file.type_());
        if let Err(rejection) = validate_file(&name, &mime, file.size() as u64) {
            toasts.error(rejection.to_string());
            return;
        }
        let store = HttpObjectStore::new(session.client(), AVATARS_BUCKET, STORAGE_BASE);
        let path = object_key(&user_id.get_value(), &name);
        spawn_local(async move {
            match store.put(&path, &mime, file).await {
                Ok(url) => save(ProfileUpdate {
                    avatar_url: Some(url),
                    ..ProfileUpdate::default()
                }),
                Err(e) => toasts.error(e.to_string()),
            }
        });
    };

    view! {
        <form class="profile-editor" on:submit=on_submit>
            <h3>{ "Your profile" }</h3>
            <img class="avatar large" src=avatar alt="Avatar"/>
            <label>{ "Avatar" }
                <input
                    type="file"
                    accept="image/jpeg,image/png,image/webp,image/gif"
                    node_ref=avatar_ref
                    on:change=on_avatar
                />
            </label>
            <label>{ "Name" }
                <input type="text" prop:value=name on:input=move |e| set_name.set(event_target_value(&e))/>
            </label>
            <label>{ "Phone" }
                <input type="tel" prop:value=phone on:input=move |e| set_phone.set(event_target_value(&e))/>
            </label>
            <label>{ "WhatsApp (if different)" }
                <input type="tel" prop:value=whatsapp on:input=move |e| set_whatsapp.set(event_target_value(&e))/>
            </label>
            <button type="submit" disabled=saving>{ "Save profile" }</button>
        </form>
    }
}

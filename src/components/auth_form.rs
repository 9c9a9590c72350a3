use leptos::ev::SubmitEvent;
use leptos::*;
use leptos_router::{use_navigate, NavigateOptions};

use crate::app::Session;
use crate::components::toast::use_toasts;
use crate::models::{Credentials, SignUp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    SignIn,
    SignUp,
}

/// Email and password sign-in, switchable to registration.
#[component]
pub fn AuthForm() -> impl IntoView {
    let session = expect_context::<Session>();
    let toasts = use_toasts();
    let navigate = use_navigate();
    let (mode, set_mode) = create_signal(Mode::SignIn);
    let (email, set_email) = create_signal(String::new());
    let (password, set_password) = create_signal(String::new());
    let (name, set_name) = create_signal(String::new());
    let (phone, set_phone) = create_signal(String::new());
    let (busy, set_busy) = create_signal(false);

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let client = session.client();
        let navigate = navigate.clone();
        let current = mode.get_untracked();
        set_busy.set(true);
        spawn_local(async move {
            let result = match current {
                Mode::SignIn => {
                    client
                        .sign_in(&Credentials {
                            email: email.get_untracked(),
                            password: password.get_untracked(),
                        })
                        .await
                }
                Mode::SignUp => {
                    client
                        .sign_up(&SignUp {
                            email: email.get_untracked(),
                            password: password.get_untracked(),
                            display_name: name.get_untracked(),
                            phone: phone.get_untracked(),
                        })
                        .await
                }
            };
            set_busy.set(false);
            match result {
                Ok(auth) => {
                    toasts.success(format!("Welcome, {}!", auth.profile.display_name));
                    session.sign_in(auth);
                    navigate("/", NavigateOptions::default());
                }
                Err(e) => toasts.error(e.to_string()),
            }
        });
    };

    view! {
        <form class="auth-form" on:submit=on_submit>
            <h2>{ move || if mode.get() == Mode::SignIn { "Sign in" } else { "Create an account" } }</h2>
            <Show when=move || mode.get() == Mode::SignUp>
                <label>{ "Name" }
                    <input type="text" prop:value=name on:input=move |e| set_name.set(event_target_value(&e))/>
                </label>
                <label>{ "Phone (for WhatsApp enquiries)" }
                    <input type="tel" prop:value=phone on:input=move |e| set_phone.set(event_target_value(&e))/>
                </label>
            </Show>
            <label>{ "Email" }
                <input type="email" prop:value=email on:input=move |e| set_email.set(event_target_value(&e))/>
            </label>
            <label>{ "Password" }
                <input type="password" prop:value=password on:input=move |e| set_password.set(event_target_value(&e))/>
            </label>
            <button type="submit" disabled=busy>
                { move || if mode.get() == Mode::SignIn { "Sign in" } else { "Sign up" } }
            </button>
            <button
                type="button"
                class="link"
                on:click=move |_| set_mode.update(|m| *m = if *m == Mode::SignIn { Mode::SignUp } else { Mode::SignIn })
            >
                { move || if mode.get() == Mode::SignIn { "New here? Create an account" } else { "Have an account? Sign in" } }
            </button>
        </form>
    }
}

use std::panic;
use leptos::logging::log;

/// Adds context to panics caused by async work outliving its component,
/// e.g. an upload finishing after the wizard was closed.
pub fn set_custom_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        original_hook(panic_info);

        let message = if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };

        if message.contains("OwnerDisposed") || message.contains("disposed") {
            log!("[PANIC] A signal was used after its component unmounted.");
            log!("[PANIC] Check spawn_local and set_timeout callbacks in the uploader, wizard and toasts.");
        }
        if let Some(location) = panic_info.location() {
            log!("[PANIC] at {}:{}", location.file(), location.line());
        }
    }));
}

/// Call once from `hydrate`.
pub fn init() {
    log!("[PANIC_HOOK] Setting up custom panic hook");
    set_custom_panic_hook();
}

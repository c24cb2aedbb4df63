mod app;
mod bridge;
mod hooks;

pub mod components {
    pub mod button;
    pub mod layout;
    pub mod neynar_panel;
    pub mod tabs;
    pub mod wallet;
}

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    leptos::mount_to_body(app::App);
}

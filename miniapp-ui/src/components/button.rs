use leptos::*;
use web_sys::MouseEvent;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Default,
    Destructive,
    Outline,
    Secondary,
    Ghost,
    Link,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonSize {
    #[default]
    Default,
    Sm,
    Lg,
    Icon,
}

pub fn button_class(variant: ButtonVariant, size: ButtonSize, extra: Option<&str>) -> String {
    let variant = match variant {
        ButtonVariant::Default => "btn-default",
        ButtonVariant::Destructive => "btn-destructive",
        ButtonVariant::Outline => "btn-outline",
        ButtonVariant::Secondary => "btn-secondary",
        ButtonVariant::Ghost => "btn-ghost",
        ButtonVariant::Link => "btn-link",
    };
    let size = match size {
        ButtonSize::Default => "btn-md",
        ButtonSize::Sm => "btn-sm",
        ButtonSize::Lg => "btn-lg",
        ButtonSize::Icon => "btn-icon",
    };
    match extra.map(str::trim).filter(|s| !s.is_empty()) {
        Some(extra) => format!("btn {variant} {size} {extra}"),
        None => format!("btn {variant} {size}"),
    }
}

#[component]
pub fn Button(
    #[prop(optional)] variant: ButtonVariant,
    #[prop(optional)] size: ButtonSize,
    #[prop(optional, into)] class: Option<String>,
    #[prop(optional, into)] title: Option<String>,
    #[prop(into)] on_click: Callback<MouseEvent>,
    children: Children,
) -> impl IntoView {
    view! {
      <button
        class=button_class(variant, size, class.as_deref())
        title=title
        on:click=move |ev| on_click.call(ev)
      >
        {children()}
      </button>
    }
}

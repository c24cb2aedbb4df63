use leptos::*;

#[derive(Clone)]
pub struct TabItem {
    pub id: &'static str,
    pub title: &'static str,
    pub content: ViewFn,
}

/// Tab selected on first render: `default_tab` when it names a tab, else the
/// first one.
pub fn initial_tab(ids: &[&'static str], default_tab: Option<&str>) -> Option<&'static str> {
    default_tab
        .and_then(|wanted| ids.iter().copied().find(|id| *id == wanted))
        .or_else(|| ids.first().copied())
}

#[component]
pub fn Tabs(tabs: Vec<TabItem>, #[prop(optional, into)] default_tab: Option<String>) -> impl IntoView {
    let ids: Vec<&'static str> = tabs.iter().map(|t| t.id).collect();
    let active = create_rw_signal(initial_tab(&ids, default_tab.as_deref()));
    let tabs = store_value(tabs);

    view! {
      <div class="tabs">
        <div class="tab-list">
          {ids
              .into_iter()
              .map(|id| {
                  let title = tabs.with_value(|ts| {
                      ts.iter().find(|t| t.id == id).map(|t| t.title).unwrap_or(id)
                  });
                  view! {
                    <button
                      class=move || if active.get() == Some(id) { "tab active" } else { "tab" }
                      on:click=move |_| active.set(Some(id))
                    >
                      {title}
                    </button>
                  }
              })
              .collect_view()}
        </div>
        <div class="tab-panel">
          {move || {
              let id = active.get()?;
              tabs.with_value(|ts| ts.iter().find(|t| t.id == id).map(|t| t.content.run()))
          }}
        </div>
      </div>
    }
}

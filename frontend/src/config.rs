use models::config::{ConfigPatch, ConfigSnapshot};
use sycamore::{futures::spawn_local_scoped, prelude::*};
use web_sys::Event;

use crate::helpers::{self, log};

#[component]
pub fn ConfigView<G: Html>(cx: Scope) -> View<G> {
    let config = use_context::<RcSignal<Option<ConfigSnapshot>>>(cx);

    view! { cx,
        (match &*config.get() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                view! { cx, ModesForm(snapshot = snapshot) }
            }
            None => view! { cx, div(class="loading") { "Loading..." } },
        })
    }
}

#[derive(Prop)]
struct ModesFormParams {
    snapshot: ConfigSnapshot,
}

/// One checkbox per backend mode; saving posts only `modes_available`.
#[component]
fn ModesForm<G: Html>(cx: Scope, params: ModesFormParams) -> View<G> {
    let config = use_context::<RcSignal<Option<ConfigSnapshot>>>(cx);
    let ModesFormParams { snapshot } = params;

    let location = snapshot.location_label.unwrap_or_default();
    let modes: &Vec<(String, &Signal<bool>)> = create_ref(
        cx,
        snapshot
            .modes_available
            .into_iter()
            .map(|(name, enabled)| (name, create_signal(cx, enabled)))
            .collect(),
    );
    let saving = create_signal(cx, false);

    let save = move |_e: Event| {
        let patch = ConfigPatch::modes_available(
            modes
                .iter()
                .map(|(name, enabled)| (name.clone(), *enabled.get()))
                .collect(),
        );
        saving.set(true);
        spawn_local_scoped(cx, async move {
            let reply = helpers::post_config(&patch).await;
            saving.set(false);
            // Replacing the snapshot re-renders this form
            match reply {
                Ok(snapshot) => config.set(Some(snapshot)),
                Err(err) => log(&format!("saving modes failed: {err}")),
            }
        });
    };

    let checkboxes = View::new_fragment(
        modes
            .iter()
            .map(|(name, enabled)| {
                let name = name.clone();
                view! { cx,
                    label(class="mode-option") {
                        input(type="checkbox", bind:checked=enabled)
                        (name)
                    }
                }
            })
            .collect(),
    );

    view! { cx,
        div(class="config") {
            div(class="location") { (location) }
            div(class="modes") { (checkboxes) }
            input(type="button", value="Save", disabled=*saving.get(), on:click=save)
        }
    }
}

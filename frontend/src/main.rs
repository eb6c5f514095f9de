#![allow(non_snake_case)]

use models::{
    conditions::{SensorState, Weather},
    config::ConfigSnapshot,
    view::SessionView,
};
use sycamore::{futures::spawn_local_scoped, prelude::*};
use web_sys::Event;

use crate::helpers::log;

mod auth;
mod config;
mod dashboard;
mod helpers;

fn main() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    sycamore::render(|cx| {
        // Global context signals
        let session_view = create_signal(cx, SessionView::Loading);
        provide_context_ref(cx, session_view);

        provide_context(cx, create_rc_signal(None::<ConfigSnapshot>));
        provide_context(cx, create_rc_signal(None::<SensorState>));
        provide_context(cx, create_rc_signal(None::<Weather>));

        // Ask the backend whether we already have a session
        spawn_local_scoped(cx, async move {
            match helpers::check_session().await {
                Ok(status) => session_view.set(SessionView::after_mount(status)),
                Err(err) => log(&format!("session check failed: {err}")),
            }
        });

        view! { cx,
            App()
        }
    })
}

/// Starts independent fetches of config, state and weather.
pub fn refresh(cx: Scope<'_>) {
    let config = use_context::<RcSignal<Option<ConfigSnapshot>>>(cx);
    let state = use_context::<RcSignal<Option<SensorState>>>(cx);
    let weather = use_context::<RcSignal<Option<Weather>>>(cx);

    spawn_local_scoped(cx, async move {
        match helpers::get_config().await {
            Ok(value) => config.set(Some(value)),
            Err(err) => log(&format!("refresh failed: {err}")),
        }
    });
    spawn_local_scoped(cx, async move {
        match helpers::get_state().await {
            Ok(value) => state.set(Some(value)),
            Err(err) => log(&format!("refresh failed: {err}")),
        }
    });
    spawn_local_scoped(cx, async move {
        match helpers::get_weather().await {
            Ok(value) => weather.set(Some(value)),
            Err(err) => log(&format!("refresh failed: {err}")),
        }
    });
}

#[component]
fn App<G: Html>(cx: Scope) -> View<G> {
    let session_view = use_context::<Signal<SessionView>>(cx);

    view! { cx,
        div(class="main-body") {
            (match *session_view.get() {
                SessionView::Loading => view! { cx, "Please Wait 💕" },
                SessionView::Login => view! { cx, auth::LoginForm() },
                SessionView::Dashboard => view! { cx,
                    Toolbar()
                    dashboard::Dashboard()
                },
                SessionView::Config => view! { cx,
                    Toolbar()
                    config::ConfigView()
                },
            })
        }
    }
}

#[component]
fn Toolbar<G: Html>(cx: Scope) -> View<G> {
    let session_view = use_context::<Signal<SessionView>>(cx);

    let navigate = move |to: SessionView| {
        if let Some(next) = session_view.get().navigate(to) {
            session_view.set(next);
        }
    };
    let dashboard_class = create_selector(cx, || match *session_view.get() {
        SessionView::Dashboard => "tab-button highlighted",
        _ => "tab-button",
    });
    let config_class = create_selector(cx, || match *session_view.get() {
        SessionView::Config => "tab-button highlighted",
        _ => "tab-button",
    });

    let logout = move |_e: Event| {
        spawn_local_scoped(cx, async move {
            auth::logout(cx).await;
        })
    };

    view! { cx,
        div(class="tab-bar") {
            div(class=dashboard_class, on:click=move |_e: Event| navigate(SessionView::Dashboard)) {
                "🏠"
            }
            div(class=config_class, on:click=move |_e: Event| navigate(SessionView::Config)) {
                "⚙"
            }
            a(href="#/", on:click=logout, class="logout") {
                "Logout"
            }
        }
    }
}

use models::{
    conditions::{SensorState, Weather},
    config::ConfigSnapshot,
    view::SessionView,
};
use sycamore::{futures::spawn_local_scoped, prelude::*};
use web_sys::Event;

use crate::helpers::{self, log};

#[component]
pub fn LoginForm<G: Html>(cx: Scope) -> View<G> {
    let session_view = use_context::<Signal<SessionView>>(cx);
    let username = create_signal(cx, String::new());
    let password = create_signal(cx, String::new());
    let problem = create_signal(cx, String::new());

    let do_login = move |_: Event| {
        problem.set("".into());

        let username = username.get();
        let password = password.get();

        spawn_local_scoped(cx, async move {
            match helpers::login(&username, &password).await {
                Ok(reply) if reply.logged_in => session_view.set(SessionView::Dashboard),
                Ok(reply) => {
                    log(&format!("login rejected: {reply:?}"));
                    problem.set(reply.feedback().unwrap_or_default().to_string());
                }
                Err(err) => log(&format!("login failed: {err}")),
            }
        });
    };

    view! { cx,
        div(class="login-form") {
            div {
                input(
                    bind:value=username,
                    type="text",
                    placeholder="Username..."
                )
            }
            div {
                input(
                    bind:value=password,
                    type="password",
                    placeholder="Password..."
                )
            }
            div {
                input(
                    value="Login",
                    type="button",
                    on:click=do_login
                )
            }
            div(class="login-problem") {
                (problem.get())
            }
        }
    }
}

/// Ends the session and drops everything fetched under it.
pub async fn logout(cx: Scope<'_>) {
    let session_view = use_context::<Signal<SessionView>>(cx);

    if let Err(err) = helpers::logout().await {
        log(&format!("logout failed: {err}"));
        return;
    }

    use_context::<RcSignal<Option<ConfigSnapshot>>>(cx).set(None);
    use_context::<RcSignal<Option<SensorState>>>(cx).set(None);
    use_context::<RcSignal<Option<Weather>>>(cx).set(None);
    session_view.set(SessionView::Login);
}

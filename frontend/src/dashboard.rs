use chrono::Local;
use gloo_timers::future::sleep;
use models::{
    conditions::{SensorState, SolarEvent, Weather},
    config::ConfigSnapshot,
    editor::{ConfigEditor, Ticket, Write},
    units::{display_temperature, format_hhmm},
    DEBOUNCE_WINDOW, REFRESH_INTERVAL,
};
use sycamore::{futures::spawn_local_scoped, prelude::*};
use web_sys::Event;

use crate::helpers::{self, log};

/// Writes `write` back and applies the acknowledged config. Not tied to any
/// scope, so it completes even if the dashboard goes away.
fn send(config: RcSignal<Option<ConfigSnapshot>>, write: Write) {
    wasm_bindgen_futures::spawn_local(async move {
        match helpers::post_config(&write.config.into()).await {
            Ok(snapshot) => config.set(Some(snapshot)),
            Err(err) => log(&format!("config write failed: {err}")),
        }
    });
}

#[component]
pub fn Dashboard<G: Html>(cx: Scope) -> View<G> {
    let config = use_context::<RcSignal<Option<ConfigSnapshot>>>(cx);
    let state = use_context::<RcSignal<Option<SensorState>>>(cx);
    let weather = use_context::<RcSignal<Option<Weather>>>(cx);

    crate::refresh(cx);
    spawn_local_scoped(cx, async move {
        loop {
            sleep(REFRESH_INTERVAL).await;
            crate::refresh(cx);
        }
    });

    let editor_handle = create_rc_signal(ConfigEditor::new());
    let editor = create_ref(cx, editor_handle.clone());

    // Every snapshot from the server replaces the pending edits
    create_effect(cx, move || {
        if let Some(snapshot) = &*config.get() {
            editor.modify().seed(snapshot);
        }
    });

    let schedule = move |ticket: Option<Ticket>| {
        let Some(ticket) = ticket else { return };
        spawn_local_scoped(cx, async move {
            sleep(DEBOUNCE_WINDOW).await;
            let write = editor.modify().fire(ticket);
            if let Some(write) = write {
                send(config.clone(), write);
            }
        });
    };

    {
        let config = config.clone();
        on_cleanup(cx, move || {
            let write = editor_handle.modify().flush();
            if let Some(write) = write {
                send(config, write);
            }
        });
    }

    let toggle_unit = move |_e: Event| {
        let ticket = editor.modify().toggle_unit();
        schedule(ticket);
    };
    let increment = move |_e: Event| {
        let ticket = editor.modify().change_setpoint(true);
        schedule(ticket);
    };
    let decrement = move |_e: Event| {
        let ticket = editor.modify().change_setpoint(false);
        schedule(ticket);
    };
    let cycle_mode = move |_e: Event| {
        let ticket = editor.modify().cycle_mode();
        schedule(ticket);
    };

    let ready = create_selector(cx, move || {
        config.get().is_some() && state.get().is_some() && weather.get().is_some()
    });

    let scale = create_memo(cx, move || editor.get().pending().map(|pending| pending.scale()));

    let setpoint = create_memo(cx, move || {
        let editor = editor.get();
        match (editor.pending(), *scale.get()) {
            (Some(pending), Some(scale)) => {
                format!("{}{scale}", display_temperature(pending.set_temperature, scale))
            }
            _ => String::new(),
        }
    });
    let mode = create_memo(cx, move || {
        editor
            .get()
            .pending()
            .map(|pending| pending.mode_set.clone())
            .unwrap_or_default()
    });
    let unit_label = create_memo(cx, move || {
        match *scale.get() {
            Some(scale) => scale.to_string(),
            None => String::new(),
        }
    });

    let indoor = create_memo(cx, move || match (&*state.get(), *scale.get()) {
        (Some(state), Some(scale)) => format!(
            "{}{scale}",
            display_temperature(state.conditions.temp_c, scale)
        ),
        _ => String::new(),
    });
    let humidity = create_memo(cx, move || match &*state.get() {
        Some(state) => format!("{:.0}%", state.conditions.relative_humidity),
        None => String::new(),
    });
    let status = create_memo(cx, move || match &*state.get() {
        Some(SensorState {
            status: Some(status),
            ..
        }) => status.clone(),
        _ => String::new(),
    });
    let status_class = create_selector(cx, move || match status.get().as_str() {
        "Heating" => "thermostat-heat",
        "Cooling" => "thermostat-cool",
        _ => "thermostat-off",
    });

    let outdoor = create_memo(cx, move || match (&*weather.get(), *scale.get()) {
        (Some(weather), Some(scale)) => format!(
            "{}{scale} · {:.0}% · {}",
            display_temperature(weather.temp_c, scale),
            weather.relative_humidity,
            weather.condition.description
        ),
        _ => String::new(),
    });
    let forecast = create_memo(cx, move || match (&*weather.get(), *scale.get()) {
        (Some(weather), Some(scale)) => format!(
            "High {}{scale} / Low {}{scale}",
            display_temperature(weather.forecast.high, scale),
            display_temperature(weather.forecast.low, scale)
        ),
        _ => String::new(),
    });
    let icon = create_memo(cx, move || match &*weather.get() {
        Some(weather) => weather.condition.icon_url.clone(),
        None => String::new(),
    });
    let solar = create_memo(cx, move || match &*weather.get() {
        Some(weather) => match weather.solar.next_transition(Local::now().time()) {
            SolarEvent::Sunrise(hhmm) => format!("Sunrise {}", format_hhmm(hhmm)),
            SolarEvent::Sunset(hhmm) => format!("Sunset {}", format_hhmm(hhmm)),
        },
        None => String::new(),
    });

    view! { cx,
        (if *ready.get() {
            view! { cx,
                div(class="dashboard") {
                    div(id="thermostat-current-temp-wrapper", class=status_class) {
                        span(class="indoor") { (indoor.get()) }
                        span(class="humidity") { (humidity.get()) }
                        span(class="status") { (status.get()) }
                    }
                    div(class="setpoint") {
                        input(type="button", value="−", on:click=decrement)
                        span { (setpoint.get()) }
                        input(type="button", value="+", on:click=increment)
                    }
                    div(class="controls") {
                        input(type="button", value=mode.get(), on:click=cycle_mode)
                        input(type="button", value=unit_label.get(), on:click=toggle_unit)
                    }
                    div(class="weather") {
                        img(src=icon.get())
                        span { (outdoor.get()) }
                        span { (forecast.get()) }
                        span { (solar.get()) }
                    }
                }
            }
        } else {
            view! { cx, div(class="loading") { "Loading..." } }
        })
    }
}

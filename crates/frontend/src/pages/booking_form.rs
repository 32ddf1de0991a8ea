use campsite_shared::cache::DraftCache;
use campsite_shared::codec::{self, with_query, KEY_BACK};
use campsite_shared::config::BookingConfig;
use campsite_shared::form::{BookingForm, FormPhase, SubmitRejected};
use campsite_shared::host::{HostBridge, SubmitOutcome};
use campsite_shared::validation::FormField;
use chrono::{NaiveDate, Utc};
use dioxus::prelude::*;
use wasm_bindgen::JsCast;

use crate::components::children_editor::ChildrenEditor;
use crate::location;
use crate::storage::LocalStore;
use crate::AppHost;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn draft_cache(host: &dyn HostBridge, config: &BookingConfig) -> DraftCache<LocalStore> {
    DraftCache::new(LocalStore::open(), host.identity().as_ref(), config.cache_ttl())
}

/// Cached draft first, then whatever arrived in the URL on top.
fn restore_form(host: &dyn HostBridge, config: &BookingConfig) -> BookingForm {
    let draft = draft_cache(host, config)
        .load(Utc::now())
        .unwrap_or_default();
    let mut form = BookingForm::new(draft);
    let params = location::current_params();
    if codec::has_draft_params(&params) {
        form.absorb(&params);
        location::clear_params();
    }
    form
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn date_value(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn focus_field(field: FormField) {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(field.dom_id()))
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok());
    if let Some(element) = element {
        element.focus().ok();
    }
}

fn nights_label(nights: i64) -> String {
    if nights == 1 {
        "1 night".to_string()
    } else {
        format!("{} nights", nights)
    }
}

#[component]
pub fn BookingPage() -> Element {
    let AppHost(host) = use_context::<AppHost>();
    let config = use_context::<BookingConfig>();

    let mut form = use_signal({
        let host = host.clone();
        let config = config.clone();
        move || restore_form(host.as_ref(), &config)
    });

    // Keep the cached draft in step with every edit.
    {
        let host = host.clone();
        let config = config.clone();
        use_effect(move || {
            let form = form.read();
            if form.phase() == FormPhase::Submitted {
                return;
            }
            draft_cache(host.as_ref(), &config).save(form.draft(), Utc::now());
        });
    }

    let on_pick_pitch = {
        let config = config.clone();
        move |_| {
            let result = form.write().navigate_to_map();
            match result {
                Ok(mut params) => {
                    params.insert(KEY_BACK, config.form_path.clone());
                    location::navigate(&with_query(&config.map_path, &params));
                }
                Err(e) => focus_field(e.field()),
            }
        }
    };

    let on_submit = {
        let host = host.clone();
        let config = config.clone();
        move |_| {
            let result = form.write().submit(host.as_ref(), config.close_after_submit);
            match result {
                Ok(SubmitOutcome::Delivered) => draft_cache(host.as_ref(), &config).discard(),
                Ok(_) => {}
                Err(SubmitRejected::Invalid(e)) => focus_field(e.field()),
                Err(e) => tracing::debug!(error = %e, "Submit ignored"),
            }
        }
    };

    let state = form.read();
    let draft = state.draft();
    let from_value = date_value(draft.stay_from);
    let to_value = date_value(draft.stay_to);
    let guests = draft.guest_count;
    let phone = draft.contact.phone.clone();
    let email = draft.contact.email.clone();
    let nights = draft.nights().map(nights_label);
    let pitch_name = draft.pitch.as_ref().map(|p| p.display_name.clone());
    let error = state.error().map(|e| e.to_string());
    let notice = state.notice().map(str::to_string);
    let pick_enabled = state.pick_pitch_enabled();
    let confirm_enabled = state.confirm_enabled();
    let submitted = state.phase() == FormPhase::Submitted;
    let field_class = |field: FormField| {
        if state.is_flagged(field) {
            "invalid"
        } else {
            ""
        }
    };
    let from_class = field_class(FormField::StayFrom);
    let to_class = field_class(FormField::StayTo);
    let phone_class = field_class(FormField::Phone);
    let email_class = field_class(FormField::Email);
    drop(state);

    rsx! {
        div { class: "app booking",
            div { class: "header",
                h1 { "Book a pitch" }
            }

            if submitted {
                div { class: "panel done", "Thank you! Your booking request has been sent." }
            }

            form {
                class: "panel booking-form",
                onsubmit: move |evt: Event<FormData>| evt.prevent_default(),

                div { class: "field-row",
                    div { class: "field",
                        label { r#for: "from", "Check-in" }
                        input {
                            id: "from",
                            class: "{from_class}",
                            r#type: "date",
                            value: "{from_value}",
                            onchange: move |evt: Event<FormData>| {
                                form.write().set_stay_from(parse_date(&evt.value()));
                            },
                        }
                    }
                    div { class: "field",
                        label { r#for: "to", "Check-out" }
                        input {
                            id: "to",
                            class: "{to_class}",
                            r#type: "date",
                            min: "{from_value}",
                            value: "{to_value}",
                            onchange: move |evt: Event<FormData>| {
                                form.write().set_stay_to(parse_date(&evt.value()));
                            },
                        }
                    }
                }
                if let Some(nights) = nights {
                    div { class: "hint", "{nights}" }
                }

                div { class: "field",
                    label { r#for: "guests", "Guests" }
                    input {
                        id: "guests",
                        r#type: "number",
                        min: "1",
                        value: "{guests}",
                        oninput: move |evt: Event<FormData>| {
                            if let Ok(v) = evt.value().trim().parse::<u32>() {
                                form.write().set_guest_count(v);
                            }
                        },
                    }
                }

                ChildrenEditor { form }

                div { class: "field",
                    label { r#for: "phone", "Phone" }
                    input {
                        id: "phone",
                        class: "{phone_class}",
                        r#type: "tel",
                        placeholder: "+1 202 555 0123",
                        value: "{phone}",
                        oninput: move |evt: Event<FormData>| form.write().set_phone(evt.value()),
                    }
                }
                div { class: "field",
                    label { r#for: "email", "Email" }
                    input {
                        id: "email",
                        class: "{email_class}",
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: "{email}",
                        oninput: move |evt: Event<FormData>| form.write().set_email(evt.value()),
                    }
                }

                div { class: "field pitch",
                    span { class: "label", "Pitch" }
                    match pitch_name {
                        Some(name) => rsx! { strong { "{name}" } },
                        None => rsx! { span { class: "muted", "not chosen" } },
                    }
                    button {
                        class: "secondary",
                        r#type: "button",
                        disabled: !pick_enabled,
                        onclick: on_pick_pitch,
                        "Choose on map"
                    }
                }

                if let Some(error) = error {
                    div { class: "form-error", "{error}" }
                }
                if let Some(notice) = notice {
                    div { class: "form-error", "{notice}" }
                }

                button {
                    r#type: "button",
                    disabled: !confirm_enabled,
                    onclick: on_submit,
                    "Confirm booking"
                }
            }
        }
    }
}

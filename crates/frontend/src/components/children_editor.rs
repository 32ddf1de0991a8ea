use campsite_shared::form::BookingForm;
use campsite_shared::models::MAX_CHILD_AGE;
use dioxus::prelude::*;
use wasm_bindgen::JsValue;

const PICKER_ID: &str = "child-age";

/// Put the picker back on its placeholder option.
fn reset_picker() {
    let Some(picker) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(PICKER_ID))
    else {
        return;
    };
    js_sys::Reflect::set(&picker, &JsValue::from_str("value"), &JsValue::from_str("")).ok();
}

/// Age picker plus the list of children added so far. Picking an age adds a
/// child; the picker then returns to its placeholder.
#[component]
pub fn ChildrenEditor(form: Signal<BookingForm>) -> Element {
    let children: Vec<u8> = form.read().draft().children.clone();

    rsx! {
        div { class: "field children",
            label { r#for: PICKER_ID, "Children (age)" }
            select {
                id: PICKER_ID,
                onchange: move |evt: Event<FormData>| {
                    form.write().choose_child_age(&evt.value());
                    reset_picker();
                },
                option { value: "", "Add a child…" }
                for age in 0..=MAX_CHILD_AGE {
                    option { value: "{age}", "{age}" }
                }
            }
            if !children.is_empty() {
                ul { class: "child-list",
                    for (index, age) in children.into_iter().enumerate() {
                        li { key: "{index}-{age}",
                            span { "Child, {age} y." }
                            button {
                                class: "remove",
                                r#type: "button",
                                title: "Remove",
                                onclick: move |_| {
                                    form.write().remove_child(index);
                                },
                                "×"
                            }
                        }
                    }
                }
            }
        }
    }
}

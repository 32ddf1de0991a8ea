use dioxus::prelude::*;

/// Shown while a pitch is selected.
#[component]
pub fn ConfirmPanel(
    name: String,
    bookable: bool,
    on_cancel: EventHandler<()>,
    on_confirm: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "confirm-panel",
            div { class: "confirm-name",
                "Selected: "
                strong { "{name}" }
            }
            if !bookable {
                div { class: "confirm-note", "This pitch is already taken." }
            }
            div { class: "confirm-actions",
                button {
                    class: "secondary",
                    onclick: move |_| on_cancel.call(()),
                    "Cancel"
                }
                button {
                    disabled: !bookable,
                    onclick: move |_| on_confirm.call(()),
                    "OK"
                }
            }
        }
    }
}

//! One-line summary of what the guest chose before opening the map.

use std::cmp::Ordering;

use crate::codec::{ParamSet, KEY_BACK};

const PREFIX: &str = "Your choice: ";
const EMPTY: &str = "—";
const SEPARATOR: &str = " · ";

/// Well-known keys, shown first and in this order.
const IMPORTANT: [&str; 19] = [
    "from", "checkin", "date_from", "to", "checkout", "date_to", "guests", "adults",
    "children_ages", "kids", "children", "nights", "type", "size", "power", "water", "car",
    "rv", "tent",
];

pub fn humanize_key(key: &str) -> &str {
    match key {
        "from" | "checkin" | "date_from" => "Check-in",
        "to" | "checkout" | "date_to" => "Check-out",
        "guests" => "Guests",
        "adults" => "Adults",
        "children_ages" => "Children's ages",
        "kids" | "children" => "Children",
        "nights" => "Nights",
        "type" => "Pitch type",
        "size" => "Size",
        "power" => "Electricity",
        "water" => "Water",
        "car" => "Car",
        "rv" => "Camper",
        "tent" => "Tent",
        "phone" => "Phone",
        "email" => "Email",
        "pitch_id" | "pitch_name" => "Pitch",
        "layer" => "Area",
        other => other,
    }
}

fn rank(key: &str) -> Option<usize> {
    IMPORTANT.iter().position(|k| *k == key)
}

fn order(a: &str, b: &str) -> Ordering {
    match (rank(a), rank(b)) {
        (Some(ia), Some(ib)) => ia.cmp(&ib),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

pub fn params_summary(params: &ParamSet) -> String {
    let mut entries: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, v)| *k != KEY_BACK && !v.trim().is_empty())
        .collect();
    entries.sort_by(|(a, _), (b, _)| order(a, b));

    if entries.is_empty() {
        return format!("{}{}", PREFIX, EMPTY);
    }
    let parts: Vec<String> = entries
        .iter()
        .map(|(k, v)| format!("{}: {}", humanize_key(k), v))
        .collect();
    format!("{}{}", PREFIX, parts.join(SEPARATOR))
}

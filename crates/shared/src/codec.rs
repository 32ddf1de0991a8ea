//! Booking draft <-> flat query parameters.
//!
//! Both screens speak this format: the form encodes its draft into the map
//! URL, the map passes everything through and adds the pitch keys, and the
//! form decodes the result on top of whatever it already had.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{is_valid_child_age, BookingDraft, PitchSelection};

pub const KEY_FROM: &str = "from";
pub const KEY_TO: &str = "to";
pub const KEY_GUESTS: &str = "guests";
pub const KEY_CHILDREN_AGES: &str = "children_ages";
pub const KEY_PHONE: &str = "phone";
pub const KEY_EMAIL: &str = "email";
pub const KEY_PITCH_ID: &str = "pitch_id";
pub const KEY_PITCH_NAME: &str = "pitch_name";
pub const KEY_LAYER: &str = "layer";
/// Return address for the map screen. Never part of the draft.
pub const KEY_BACK: &str = "back";

pub const DRAFT_KEYS: [&str; 9] = [
    KEY_FROM,
    KEY_TO,
    KEY_GUESTS,
    KEY_CHILDREN_AGES,
    KEY_PHONE,
    KEY_EMAIL,
    KEY_PITCH_ID,
    KEY_PITCH_NAME,
    KEY_LAYER,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// String-keyed parameters, one value per key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSet(BTreeMap<String, String>);

impl ParamSet {
    pub fn new() -> Self {
        ParamSet(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of the set without the given keys.
    pub fn without(&self, keys: &[&str]) -> ParamSet {
        self.iter()
            .filter(|(k, _)| !keys.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Overwrite entries with those from `other`.
    pub fn extend_from(&mut self, other: &ParamSet) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    pub fn to_btree(&self) -> BTreeMap<String, String> {
        self.0.clone()
    }

    /// Parse `a=1&b=2` (with or without a leading `?`). `+` means space and
    /// the first occurrence of a key wins, as in `URLSearchParams::get`.
    pub fn from_query(query: &str) -> ParamSet {
        let mut map = BTreeMap::new();
        let query = query.trim_start_matches('?');
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let mut kv = pair.splitn(2, '=');
            let key = kv.next().unwrap_or("");
            let value = kv.next().unwrap_or("");
            let (Some(key), Some(value)) = (decode_component(key), decode_component(value)) else {
                tracing::warn!(pair, "Skipping undecodable query parameter");
                continue;
            };
            if key.is_empty() {
                continue;
            }
            map.entry(key).or_insert(value);
        }
        ParamSet(map)
    }

    pub fn to_query(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl FromIterator<(String, String)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ParamSet(iter.into_iter().collect())
    }
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}

/// Append `params` to `base`, which may already carry a query string.
pub fn with_query(base: &str, params: &ParamSet) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, sep, params.to_query())
}

pub fn encode(draft: &BookingDraft) -> ParamSet {
    let mut params = ParamSet::new();
    if let Some(from) = draft.stay_from {
        params.insert(KEY_FROM, from.format(DATE_FORMAT).to_string());
    }
    if let Some(to) = draft.stay_to {
        params.insert(KEY_TO, to.format(DATE_FORMAT).to_string());
    }
    params.insert(KEY_GUESTS, draft.guest_count.to_string());
    if !draft.children.is_empty() {
        let ages: Vec<String> = draft.children.iter().map(u8::to_string).collect();
        params.insert(KEY_CHILDREN_AGES, ages.join(","));
    }
    if !draft.contact.phone.is_empty() {
        params.insert(KEY_PHONE, draft.contact.phone.clone());
    }
    if !draft.contact.email.is_empty() {
        params.insert(KEY_EMAIL, draft.contact.email.clone());
    }
    if let Some(pitch) = &draft.pitch {
        params.extend_from(&encode_pitch(pitch));
    }
    params
}

pub fn encode_pitch(pitch: &PitchSelection) -> ParamSet {
    let mut params = ParamSet::new();
    params.insert(KEY_PITCH_ID, pitch.id.clone());
    params.insert(KEY_PITCH_NAME, pitch.display_name.clone());
    params.insert(KEY_LAYER, pitch.layer_name.clone());
    params
}

/// Fields decoded from a parameter set. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub stay_from: Option<NaiveDate>,
    pub stay_to: Option<NaiveDate>,
    pub guest_count: Option<u32>,
    pub children: Option<Vec<u8>>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pitch: Option<PitchSelection>,
}

impl DraftPatch {
    pub fn is_empty(&self) -> bool {
        *self == DraftPatch::default()
    }

    pub fn apply_to(self, draft: &mut BookingDraft) {
        if let Some(from) = self.stay_from {
            draft.stay_from = Some(from);
        }
        if let Some(to) = self.stay_to {
            draft.stay_to = Some(to);
        }
        if let Some(guests) = self.guest_count {
            draft.guest_count = guests;
        }
        if let Some(children) = self.children {
            draft.children = children;
        }
        if let Some(phone) = self.phone {
            draft.contact.phone = phone;
        }
        if let Some(email) = self.email {
            draft.contact.email = email;
        }
        if let Some(pitch) = self.pitch {
            draft.pitch = Some(pitch);
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn parse_ages(raw: &str) -> Vec<u8> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .filter(|age| is_valid_child_age(*age))
        .collect()
}

pub fn decode(params: &ParamSet) -> DraftPatch {
    let pitch = params
        .get(KEY_PITCH_ID)
        .filter(|id| !id.is_empty())
        .map(|id| PitchSelection {
            id: id.to_string(),
            display_name: params
                .get(KEY_PITCH_NAME)
                .filter(|n| !n.is_empty())
                .unwrap_or(id)
                .to_string(),
            layer_name: params.get(KEY_LAYER).unwrap_or_default().to_string(),
        });

    DraftPatch {
        stay_from: params.get(KEY_FROM).and_then(parse_date),
        stay_to: params.get(KEY_TO).and_then(parse_date),
        guest_count: params
            .get(KEY_GUESTS)
            .and_then(|g| g.trim().parse::<u32>().ok())
            .filter(|g| *g > 0),
        children: params.get(KEY_CHILDREN_AGES).map(parse_ages),
        phone: params.get(KEY_PHONE).map(str::to_string),
        email: params.get(KEY_EMAIL).map(str::to_string),
        pitch,
    }
}

/// Decode `params` on top of `base`.
pub fn decode_onto(mut base: BookingDraft, params: &ParamSet) -> BookingDraft {
    decode(params).apply_to(&mut base);
    base
}

/// True when the set carries anything the draft would consume.
pub fn has_draft_params(params: &ParamSet) -> bool {
    DRAFT_KEYS.iter().any(|k| params.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contact;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn full_draft() -> BookingDraft {
        BookingDraft {
            stay_from: Some(date("2025-06-01")),
            stay_to: Some(date("2025-06-05")),
            guest_count: 3,
            children: vec![5, 5, 0],
            contact: Contact {
                phone: "+1 (202) 555-0123".to_string(),
                email: "guest@camp.example".to_string(),
            },
            pitch: Some(PitchSelection {
                id: "P12".to_string(),
                display_name: "Pitch #12".to_string(),
                layer_name: "pitches_60".to_string(),
            }),
        }
    }

    #[test]
    fn test_decode_encode_restores_full_draft() {
        let d = full_draft();
        assert_eq!(decode_onto(BookingDraft::default(), &encode(&d)), d);
    }

    #[test]
    fn test_decode_encode_restores_through_query_string() {
        let d = full_draft();
        let query = encode(&d).to_query();
        let parsed = ParamSet::from_query(&format!("?{}", query));
        assert_eq!(decode_onto(BookingDraft::default(), &parsed), d);
    }

    #[test]
    fn test_encode_children_as_comma_list() {
        let params = encode(&full_draft());
        assert_eq!(params.get(KEY_CHILDREN_AGES), Some("5,5,0"));
    }

    #[test]
    fn test_encode_omits_absent_pitch_keys() {
        let mut d = full_draft();
        d.pitch = None;
        let params = encode(&d);
        assert!(!params.contains(KEY_PITCH_ID));
        assert!(!params.contains(KEY_PITCH_NAME));
        assert!(!params.contains(KEY_LAYER));
    }

    #[test]
    fn test_encode_empty_draft() {
        let params = encode(&BookingDraft::default());
        assert_eq!(params.len(), 1);
        assert_eq!(params.get(KEY_GUESTS), Some("1"));
    }

    #[test]
    fn test_decode_is_a_partial_patch() {
        let base = full_draft();
        let mut params = ParamSet::new();
        params.insert(KEY_PITCH_ID, "P7");
        params.insert(KEY_PITCH_NAME, "Pitch #7");
        params.insert(KEY_LAYER, "pitches_80");
        let merged = decode_onto(base.clone(), &params);
        assert_eq!(merged.guest_count, 3);
        assert_eq!(merged.children, vec![5, 5, 0]);
        assert_eq!(merged.contact, base.contact);
        assert_eq!(merged.pitch.unwrap().id, "P7");
    }

    #[test]
    fn test_decode_drops_unparseable_numbers() {
        let mut params = ParamSet::new();
        params.insert(KEY_GUESTS, "two");
        params.insert(KEY_FROM, "yesterday");
        let patch = decode(&params);
        assert_eq!(patch.guest_count, None);
        assert_eq!(patch.stay_from, None);
        let d = decode_onto(BookingDraft::default(), &params);
        assert_eq!(d.guest_count, 1);
    }

    #[test]
    fn test_decode_rejects_zero_guests() {
        let mut params = ParamSet::new();
        params.insert(KEY_GUESTS, "0");
        assert_eq!(decode(&params).guest_count, None);
    }

    #[test]
    fn test_decode_filters_out_of_range_ages() {
        let mut params = ParamSet::new();
        params.insert(KEY_CHILDREN_AGES, "3,14,x,-1,13, 7");
        assert_eq!(decode(&params).children, Some(vec![3, 13, 7]));
    }

    #[test]
    fn test_decode_empty_ages_clears_children() {
        let mut params = ParamSet::new();
        params.insert(KEY_CHILDREN_AGES, "");
        let d = decode_onto(full_draft(), &params);
        assert!(d.children.is_empty());
    }

    #[test]
    fn test_decode_pitch_name_falls_back_to_id() {
        let mut params = ParamSet::new();
        params.insert(KEY_PITCH_ID, "A3");
        let pitch = decode(&params).pitch.unwrap();
        assert_eq!(pitch.display_name, "A3");
        assert_eq!(pitch.layer_name, "");
    }

    #[test]
    fn test_decode_ignores_empty_pitch_id() {
        let mut params = ParamSet::new();
        params.insert(KEY_PITCH_ID, "");
        assert!(decode(&params).pitch.is_none());
    }

    #[test]
    fn test_from_query_plus_and_percent() {
        let params = ParamSet::from_query("?phone=%2B12025550123&pitch_name=Pitch+%2312");
        assert_eq!(params.get(KEY_PHONE), Some("+12025550123"));
        assert_eq!(params.get(KEY_PITCH_NAME), Some("Pitch #12"));
    }

    #[test]
    fn test_from_query_first_value_wins() {
        let params = ParamSet::from_query("guests=2&guests=5");
        assert_eq!(params.get(KEY_GUESTS), Some("2"));
    }

    #[test]
    fn test_from_query_empty() {
        assert!(ParamSet::from_query("").is_empty());
        assert!(ParamSet::from_query("?").is_empty());
    }

    #[test]
    fn test_with_query() {
        let mut params = ParamSet::new();
        params.insert(KEY_GUESTS, "2");
        assert_eq!(with_query("/map", &params), "/map?guests=2");
        assert_eq!(with_query("/map?x=1", &params), "/map?x=1&guests=2");
        assert_eq!(with_query("/map", &ParamSet::new()), "/map");
    }

    #[test]
    fn test_without_drops_keys() {
        let mut params = ParamSet::new();
        params.insert(KEY_BACK, "https://camp.example/");
        params.insert(KEY_GUESTS, "2");
        let rest = params.without(&[KEY_BACK]);
        assert!(!rest.contains(KEY_BACK));
        assert_eq!(rest.get(KEY_GUESTS), Some("2"));
    }

    #[test]
    fn test_has_draft_params() {
        let mut params = ParamSet::new();
        params.insert("utm_source", "chat");
        assert!(!has_draft_params(&params));
        params.insert(KEY_TO, "2025-06-05");
        assert!(has_draft_params(&params));
    }
}

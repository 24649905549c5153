//! Typed record shapes, decoded once at the JSON boundary.
//!
//! Optional fields fall back to empty values; a missing or `null` field is
//! never a decode error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The `core` resource: one structured object, cached whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreData {
    #[serde(deserialize_with = "lenient")]
    pub general_rules: Vec<String>,
    /// Source is an object keyed by violation id; kept in document order.
    #[serde(deserialize_with = "keyed_or_list")]
    pub fines: Vec<Fine>,
    #[serde(deserialize_with = "lenient")]
    pub licenses: Licenses,
    #[serde(deserialize_with = "labeled_pairs")]
    pub transport_rules: Vec<LabeledText>,
    #[serde(deserialize_with = "seasonal")]
    pub seasonal_rules: Vec<SeasonalGuidance>,
    #[serde(deserialize_with = "lenient")]
    pub faq: Vec<FaqEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fine {
    #[serde(deserialize_with = "lenient")]
    pub violation: String,
    #[serde(deserialize_with = "lenient")]
    pub penalty: String,
    #[serde(deserialize_with = "lenient")]
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Licenses {
    #[serde(deserialize_with = "lenient")]
    pub requirement: String,
    #[serde(deserialize_with = "lenient")]
    pub fees: LicenseFees,
    #[serde(deserialize_with = "lenient")]
    pub application: LicenseApplication,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseFees {
    #[serde(deserialize_with = "lenient")]
    pub spayed_neutered: Fee,
    #[serde(deserialize_with = "lenient")]
    pub non_spayed_neutered: Fee,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fee {
    #[serde(deserialize_with = "lenient")]
    pub cost: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseApplication {
    #[serde(deserialize_with = "text_list")]
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledText {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalGuidance {
    pub season: String,
    pub notes: Vec<LabeledText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqEntry {
    #[serde(rename = "q", deserialize_with = "lenient")]
    pub question: String,
    #[serde(rename = "a", deserialize_with = "lenient")]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Park {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub borough: String,
    #[serde(deserialize_with = "lenient")]
    pub summary: String,
    #[serde(deserialize_with = "lenient")]
    pub notes: String,
    #[serde(deserialize_with = "text_list")]
    pub off_leash_hours: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub designated_areas: Vec<String>,
}

/// One park partition file: `{ "entries": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParkPartition {
    #[serde(deserialize_with = "lenient")]
    pub entries: Vec<Park>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DogRun {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub borough: String,
    #[serde(deserialize_with = "lenient")]
    pub surface: String,
    #[serde(deserialize_with = "lenient")]
    pub hours: String,
    #[serde(deserialize_with = "text_list")]
    pub facilities: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clinic {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: String,
    #[serde(deserialize_with = "lenient")]
    pub address: String,
    #[serde(deserialize_with = "lenient")]
    pub phone: String,
    #[serde(deserialize_with = "lenient")]
    pub borough: String,
    #[serde(deserialize_with = "text_list")]
    pub boroughs: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub services: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    pub notes: String,
}

/// The `resources` resource: `{ official, contacts, events }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    #[serde(deserialize_with = "lenient")]
    pub official: Vec<OfficialLink>,
    #[serde(deserialize_with = "lenient")]
    pub contacts: Vec<Contact>,
    #[serde(deserialize_with = "lenient")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficialLink {
    #[serde(deserialize_with = "lenient")]
    pub title: String,
    #[serde(deserialize_with = "lenient")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(deserialize_with = "lenient")]
    pub service: String,
    #[serde(deserialize_with = "lenient")]
    pub phone: String,
    #[serde(deserialize_with = "lenient")]
    pub url: String,
    #[serde(deserialize_with = "lenient")]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub location: String,
    #[serde(deserialize_with = "lenient")]
    pub borough: String,
    #[serde(deserialize_with = "lenient")]
    pub month: String,
    #[serde(deserialize_with = "lenient")]
    pub date: String,
    #[serde(deserialize_with = "lenient")]
    pub desc: String,
}

/// Borrowed view of one searchable record, one variant per category.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    CoreRule(&'a str),
    Fine(&'a Fine),
    Park(&'a Park),
    DogRun(&'a DogRun),
    Clinic(&'a Clinic),
    Event(&'a Event),
    Contact(&'a Contact),
}

/// `null` decodes as the default value.
fn lenient<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// A list of display strings. A bare string is a one-item list; other
/// scalars become text; nested values and `null` are dropped.
fn text_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => (!s.trim().is_empty()).then_some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    Ok(match Value::deserialize(de)? {
        Value::Array(items) => items.into_iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    })
}

fn keyed_or_list<'de, D>(de: D) -> Result<Vec<Fine>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let items: Vec<Value> = match Value::deserialize(de)? {
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Array(list) => list,
        Value::Null => Vec::new(),
        other => return Err(D::Error::custom(format!("expected fines object, got {other}"))),
    };

    items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(D::Error::custom))
        .collect()
}

fn labeled_pairs<'de, D>(de: D) -> Result<Vec<LabeledText>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<serde_json::Map<String, Value>> = Option::deserialize(de)?;
    Ok(map.map(to_labeled).unwrap_or_default())
}

fn seasonal<'de, D>(de: D) -> Result<Vec<SeasonalGuidance>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<serde_json::Map<String, Value>> = Option::deserialize(de)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(season, notes)| SeasonalGuidance {
            season,
            notes: match notes {
                Value::Object(inner) => to_labeled(inner),
                other => vec![LabeledText {
                    label: String::new(),
                    text: plain_text(other),
                }],
            },
        })
        .collect())
}

fn to_labeled(map: serde_json::Map<String, Value>) -> Vec<LabeledText> {
    map.into_iter()
        .map(|(label, v)| LabeledText {
            label,
            text: plain_text(v),
        })
        .collect()
}

fn plain_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn core_fines_keep_document_order() {
        let core: CoreData = serde_json::from_value(json!({
            "general_rules": ["Leash required"],
            "fines": {
                "leash": { "violation": "Unleashed dog", "penalty": "$200" },
                "waste": { "violation": "Not cleaning up", "penalty": "$250", "note": "Per incident" }
            },
            "transport_rules": { "subway": "Dogs must be in a carrier" },
            "seasonal_rules": { "summer": { "heat": "Avoid hot pavement" } },
            "faq": [{ "q": "Do I need a license?", "a": "Yes." }]
        }))
        .unwrap();

        let violations: Vec<_> = core.fines.iter().map(|f| f.violation.as_str()).collect();
        assert_eq!(violations, ["Unleashed dog", "Not cleaning up"]);
        assert_eq!(core.fines[0].note, "");
        assert_eq!(core.transport_rules[0].label, "subway");
        assert_eq!(core.seasonal_rules[0].notes[0].text, "Avoid hot pavement");
        assert_eq!(core.faq[0].question, "Do I need a license?");
    }

    #[test]
    fn missing_and_null_fields_default() {
        let park: Park = serde_json::from_value(json!({
            "name": "Riverside Park",
            "notes": null
        }))
        .unwrap();
        assert_eq!(park.notes, "");
        assert!(park.designated_areas.is_empty());

        let clinic: Clinic = serde_json::from_value(json!({
            "name": "Mobile Vaccination Van",
            "type": "mobile",
            "boroughs": ["Bronx", "Queens"]
        }))
        .unwrap();
        assert_eq!(clinic.kind, "mobile");
        assert_eq!(clinic.borough, "");
    }

    #[test]
    fn list_fields_tolerate_scalars() {
        let clinics: Vec<Clinic> = serde_json::from_value(json!([
            { "name": "Bronx Animal Care", "boroughs": "Bronx", "services": 7 },
            { "name": "Harlem Vet", "boroughs": ["Manhattan", null, 3], "services": { "x": 1 } }
        ]))
        .unwrap();
        assert_eq!(clinics[0].boroughs, ["Bronx"]);
        assert_eq!(clinics[0].services, ["7"]);
        assert_eq!(clinics[1].boroughs, ["Manhattan", "3"]);
        assert!(clinics[1].services.is_empty());

        let park: Park = serde_json::from_value(json!({
            "name": "Carl Schurz Park",
            "off_leash_hours": "before 9am",
            "designated_areas": ""
        }))
        .unwrap();
        assert_eq!(park.off_leash_hours, ["before 9am"]);
        assert!(park.designated_areas.is_empty());
    }

    #[test]
    fn fines_may_be_a_list() {
        let core: CoreData = serde_json::from_value(json!({
            "fines": [{ "violation": "No license", "penalty": "$120" }]
        }))
        .unwrap();
        assert_eq!(core.fines.len(), 1);
        assert!(core.general_rules.is_empty());
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let err = serde_json::from_value::<CoreData>(json!({ "fines": 12 }));
        assert!(err.is_err());

        let err = serde_json::from_value::<Vec<DogRun>>(json!({ "name": "not a list" }));
        assert!(err.is_err());
    }
}

use super::{IntegrationItem, ItemParameter};
use serde_json::{Map, Value};

/// Contact properties requested from HubSpot, in parameter order
pub const CONTACT_PROPERTIES: [&str; 6] =
    ["email", "firstname", "lastname", "jobtitle", "company", "phone"];

pub const CONTACT_ITEM_TYPE: &str = "contact";

/// Convert one raw contact into an [`IntegrationItem`]
///
/// Never fails. A missing id maps to an empty string and missing or non-object
/// `properties` behave like an empty mapping.
pub fn map_contact(raw: &Value) -> IntegrationItem {
    let id = raw.get("id").map(render).unwrap_or_default();

    let empty = Map::new();
    let properties = raw
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let parameters = CONTACT_PROPERTIES
        .iter()
        .filter_map(|field| match properties.get(*field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(ItemParameter {
                name: field.to_string(),
                value: render(value),
            }),
        })
        .collect();

    IntegrationItem {
        name: display_name(properties, &id),
        id,
        item_type: CONTACT_ITEM_TYPE.to_string(),
        parameters,
        raw: raw.clone(),
    }
}

fn display_name(properties: &Map<String, Value>, id: &str) -> String {
    let text = |field: &str| {
        properties
            .get(field)
            .filter(|v| !v.is_null())
            .map(render)
            .unwrap_or_default()
    };

    let full_name = [text("firstname"), text("lastname")]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !full_name.is_empty() {
        return full_name;
    }

    let email = text("email");
    if !email.is_empty() {
        return email;
    }

    format!("hubspot-{id}")
}

/// Strings verbatim, anything else as its JSON text
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_name() {
        let raw = json!({
            "id": "1",
            "properties": {"firstname": "Ada", "lastname": "Lovelace", "email": "a@b.c"}
        });

        let item = map_contact(&raw);
        assert_eq!(item.id, "1");
        assert_eq!(item.item_type, "contact");
        assert_eq!(item.name, "Ada Lovelace");
        assert_eq!(
            item.parameters,
            vec![
                ItemParameter { name: "email".into(), value: "a@b.c".into() },
                ItemParameter { name: "firstname".into(), value: "Ada".into() },
                ItemParameter { name: "lastname".into(), value: "Lovelace".into() },
            ]
        );
        assert_eq!(item.raw, raw);
    }

    #[test]
    fn test_email_fallback() {
        let item = map_contact(&json!({"id": "2", "properties": {"email": "x@y.com"}}));
        assert_eq!(item.name, "x@y.com");
        assert_eq!(item.parameters.len(), 1);
    }

    #[test]
    fn test_id_fallback() {
        let item = map_contact(&json!({"id": "3", "properties": {}}));
        assert_eq!(item.name, "hubspot-3");
        assert!(item.parameters.is_empty());
    }

    #[test]
    fn test_single_name_part_and_whitespace() {
        let item = map_contact(&json!({
            "id": "4",
            "properties": {"firstname": "  Grace ", "lastname": ""}
        }));
        assert_eq!(item.name, "Grace");

        let item = map_contact(&json!({
            "id": "5",
            "properties": {"lastname": "Hopper", "email": ""}
        }));
        assert_eq!(item.name, "Hopper");
    }

    #[test]
    fn test_nulls_skipped_and_non_strings_rendered() {
        let item = map_contact(&json!({
            "id": 6,
            "properties": {"phone": 5551234, "company": null, "email": "e@f.g", "hs_object_id": "6"}
        }));

        assert_eq!(item.id, "6");
        let names: Vec<_> = item.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["email", "phone"]);
        assert_eq!(item.parameters[1].value, "5551234");
    }

    #[test]
    fn test_malformed_record() {
        let item = map_contact(&json!({"properties": "nope"}));
        assert_eq!(item.id, "");
        assert_eq!(item.name, "hubspot-");
        assert!(item.parameters.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let item = map_contact(&json!({"id": "3", "properties": {}}));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "contact");
        assert_eq!(value["parameters"], json!([]));
    }
}

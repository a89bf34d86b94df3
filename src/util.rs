use serde_json::Value;

pub fn format_volume(volume: f32) -> String {
    if volume >= 1000.0 {
        format!("{:.1}k", volume / 1000.0)
    } else if volume.fract().abs() < f32::EPSILON {
        format!("{volume:.0}")
    } else {
        format!("{volume:.1}")
    }
}

/// One-line rendering of an opaque maintenance or material-need record, leaving out the
/// `company` field that placed it.
pub fn describe_entry(entry: &Value) -> String {
    match entry {
        Value::Object(fields) => fields
            .iter()
            .filter(|(key, _)| key.as_str() != "company")
            .map(|(key, value)| match value {
                Value::String(text) => format!("{key}: {text}"),
                other => format!("{key}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn volumes_are_compact() {
        assert_eq!(format_volume(40.0), "40");
        assert_eq!(format_volume(12.5), "12.5");
        assert_eq!(format_volume(2700.0), "2.7k");
    }

    #[test]
    fn entries_skip_the_company_field() {
        let entry = json!({"company": "argos", "item": "kiln liners", "due": "2026-Q3"});
        assert_eq!(describe_entry(&entry), "due: 2026-Q3, item: kiln liners");
        assert_eq!(describe_entry(&json!("spare pumps")), "spare pumps");
        assert_eq!(describe_entry(&json!(3)), "3");
    }
}

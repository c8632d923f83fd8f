use serde::{Deserialize, Deserializer, Serialize};

/// One row of a sign tabulation sheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub size: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub quantity: String,
}

/// Accept strings, numbers and null for a text field.
///
/// Corrected lists come back from an LLM, which readily emits `"quantity": 5`
/// or `"quantity": null`. The field itself must still be present.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Text(s)) => s,
        Some(Lenient::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

//! Subject taxonomy: classification of questions and outline seeding.
//!
//! - `repository`: the `TaxonomyRepository` port
//! - `prompts`: prompt templates for classification, titles and outlines
//! - `classifier`: question -> subjects / topics / subtopics, title generation
//! - `seeder`: idempotent batch that fills subjects without topics
//! - `service`: repository-backed lookups and classification for the API

pub mod classifier;
pub mod prompts;
pub mod repository;
pub mod seeder;
pub mod service;

/// Pull a JSON value out of a model reply that may be fenced or quoted.
pub(crate) fn parse_json_reply<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    let unfenced = raw.trim().replace("```json", "").replace("```", "");
    let text = unfenced.trim();
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    let unquoted = text.strip_prefix(['"', '\'']).unwrap_or(text);
    let unquoted = unquoted.strip_suffix(['"', '\'']).unwrap_or(unquoted);
    serde_json::from_str(unquoted).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_reply_plain() {
        let subjects: Vec<String> = parse_json_reply(r#"["Physics"]"#).unwrap();
        assert_eq!(subjects, vec!["Physics"]);
    }

    #[test]
    fn test_parse_json_reply_fenced() {
        let subjects: Vec<String> =
            parse_json_reply("```json\n[\"Physics\", \"Mathematics\"]\n```").unwrap();
        assert_eq!(subjects.len(), 2);
    }

    #[test]
    fn test_parse_json_reply_quoted() {
        let value: serde_json::Value = parse_json_reply(r#"'{"title": "Dot Products"}'"#).unwrap();
        assert_eq!(value["title"], "Dot Products");
    }

    #[test]
    fn test_parse_json_reply_garbage() {
        assert!(parse_json_reply::<Vec<String>>("I think Physics").is_none());
    }
}

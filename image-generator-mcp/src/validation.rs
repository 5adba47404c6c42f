//! Argument validation for the `generate_image` tool.
//!
//! Tool arguments arrive as untyped JSON. [`is_valid_image_generation_args`]
//! is a pure predicate; callers branch on it and raise the protocol error
//! themselves. [`GenerationRequest::from_arguments`] narrows a value that
//! passed the predicate into the concrete request type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters accepted by the `generate_image` tool.
///
/// Also the source of the tool's advertised input schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// A prompt detailing what image to generate.
    pub prompt: String,

    /// The filename for the image excluding any extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "String")]
    pub image_name: Option<String>,

    /// Should the image be saved on the user's computer. The 'imageName'
    /// argument is expected when this is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "bool")]
    pub should_save_to_file: Option<bool>,
}

/// Returns true only for a JSON object with a string `prompt` property.
///
/// Extra properties are ignored. Null, non-objects, a missing `prompt` or a
/// non-string `prompt` all yield false.
pub fn is_valid_image_generation_args(args: &Value) -> bool {
    args.as_object()
        .and_then(|map| map.get("prompt"))
        .is_some_and(Value::is_string)
}

impl GenerationRequest {
    /// Narrow untyped arguments into a request.
    ///
    /// Returns `None` when [`is_valid_image_generation_args`] rejects the
    /// value. Optional fields of the wrong type are treated as absent rather
    /// than failing the whole request.
    pub fn from_arguments(args: &Value) -> Option<Self> {
        if !is_valid_image_generation_args(args) {
            return None;
        }

        Some(Self {
            prompt: args.get("prompt")?.as_str()?.to_string(),
            image_name: args.get("imageName").and_then(Value::as_str).map(str::to_string),
            should_save_to_file: args.get("shouldSaveToFile").and_then(Value::as_bool),
        })
    }

    /// Whether the caller asked for the image to be written to disk.
    pub fn wants_file(&self) -> bool {
        self.should_save_to_file == Some(true)
    }

    /// File name to save under, or `None` if saving should be skipped.
    ///
    /// Saving happens whenever the flag is set and `imageName` is non-empty.
    /// Only the final path component of the name is used and everything from
    /// its first `.` onwards is replaced by `.png`, so `.hidden` saves as
    /// `.png`. Whitespace is kept as given.
    pub fn target_file_name(&self) -> Option<String> {
        if !self.wants_file() {
            return None;
        }

        let name = self.image_name.as_deref().filter(|name| !name.is_empty())?;
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let stem = base.split('.').next().unwrap_or_default();

        Some(format!("{}.png", stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(image_name: Option<&str>, save: Option<bool>) -> GenerationRequest {
        GenerationRequest {
            prompt: "a cat".to_string(),
            image_name: image_name.map(str::to_string),
            should_save_to_file: save,
        }
    }

    #[test]
    fn test_accepts_prompt_only() {
        assert!(is_valid_image_generation_args(&json!({"prompt": "a cat"})));
    }

    #[test]
    fn test_accepts_empty_prompt() {
        assert!(is_valid_image_generation_args(&json!({"prompt": ""})));
    }

    #[test]
    fn test_rejects_non_objects() {
        for value in [json!(null), json!("a cat"), json!(42), json!(true), json!(["prompt"])] {
            assert!(!is_valid_image_generation_args(&value), "{} should be rejected", value);
        }
    }

    #[test]
    fn test_rejects_missing_or_mistyped_prompt() {
        for value in [
            json!({}),
            json!({"imageName": "cat"}),
            json!({"prompt": null}),
            json!({"prompt": 7}),
            json!({"prompt": ["a cat"]}),
            json!({"prompt": {"text": "a cat"}}),
        ] {
            assert!(!is_valid_image_generation_args(&value), "{} should be rejected", value);
        }
    }

    #[test]
    fn test_from_arguments_reads_all_fields() {
        let req = GenerationRequest::from_arguments(&json!({
            "prompt": "a cat",
            "imageName": "cat.jpg",
            "shouldSaveToFile": true
        }))
        .unwrap();

        assert_eq!(req, request(Some("cat.jpg"), Some(true)));
    }

    #[test]
    fn test_from_arguments_treats_mistyped_optionals_as_absent() {
        let req = GenerationRequest::from_arguments(&json!({
            "prompt": "a cat",
            "imageName": 12,
            "shouldSaveToFile": "yes"
        }))
        .unwrap();

        assert_eq!(req.image_name, None);
        assert_eq!(req.should_save_to_file, None);
    }

    #[test]
    fn test_from_arguments_rejects_invalid() {
        assert!(GenerationRequest::from_arguments(&json!({"imageName": "cat"})).is_none());
    }

    #[test]
    fn test_target_file_name_replaces_extension() {
        assert_eq!(request(Some("cat.jpg"), Some(true)).target_file_name().as_deref(), Some("cat.png"));
        assert_eq!(request(Some("cat"), Some(true)).target_file_name().as_deref(), Some("cat.png"));
        assert_eq!(request(Some("cat.png"), Some(true)).target_file_name().as_deref(), Some("cat.png"));
    }

    #[test]
    fn test_target_file_name_strips_from_first_dot() {
        assert_eq!(
            request(Some("my.cat.jpeg"), Some(true)).target_file_name().as_deref(),
            Some("my.png")
        );
    }

    #[test]
    fn test_target_file_name_drops_directories() {
        assert_eq!(
            request(Some("../../etc/cat.jpg"), Some(true)).target_file_name().as_deref(),
            Some("cat.png")
        );
        assert_eq!(
            request(Some("C:\\Users\\me\\cat"), Some(true)).target_file_name().as_deref(),
            Some("cat.png")
        );
    }

    #[test]
    fn test_target_file_name_none_without_save_flag() {
        assert_eq!(request(Some("cat.jpg"), None).target_file_name(), None);
        assert_eq!(request(Some("cat.jpg"), Some(false)).target_file_name(), None);
    }

    #[test]
    fn test_target_file_name_none_without_name() {
        assert_eq!(request(None, Some(true)).target_file_name(), None);
        assert_eq!(request(Some(""), Some(true)).target_file_name(), None);
    }

    #[test]
    fn test_target_file_name_saves_any_non_empty_name() {
        assert_eq!(request(Some(".hidden"), Some(true)).target_file_name().as_deref(), Some(".png"));
        assert_eq!(request(Some("dir/"), Some(true)).target_file_name().as_deref(), Some(".png"));
        assert_eq!(request(Some("   "), Some(true)).target_file_name().as_deref(), Some("   .png"));
        assert_eq!(request(Some(" cat .jpg"), Some(true)).target_file_name().as_deref(), Some(" cat .png"));
    }

    #[test]
    fn test_schema_requires_only_prompt() {
        let schema = serde_json::to_value(schemars::schema_for!(GenerationRequest)).unwrap();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["prompt"]));
        assert_eq!(schema["properties"]["prompt"]["type"], "string");
    }

    #[test]
    fn test_schema_optional_fields_are_not_nullable() {
        let schema = serde_json::to_value(schemars::schema_for!(GenerationRequest)).unwrap();

        assert_eq!(schema["properties"]["imageName"]["type"], "string");
        assert_eq!(schema["properties"]["shouldSaveToFile"]["type"], "boolean");
        assert!(
            schema["properties"]["imageName"]["description"]
                .as_str()
                .is_some_and(|d| d.contains("filename"))
        );
    }
}

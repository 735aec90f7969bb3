// Enrichment orchestration: validate the request, walk the ranked provider
// list, validate the output shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tabula_config::settings::EnrichSettings;
use tabula_engine::column::Column;
use tabula_engine::row::Row;

use crate::context::compose_prompts;
use crate::extract::extract_json_array;
use crate::provider::{AnthropicProvider, OpenAiProvider, Provider};

/// One enrichment request. `rows` is the pre-filtered set (data in at least
/// one selected context column) and `columns` the selected context columns;
/// values come back one per row, in row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichRequest {
    pub prompt: String,
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
    #[serde(rename = "targetColId")]
    pub target_column_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichError {
    /// Required request fields absent or blank. Reported before any
    /// network call.
    MissingFields,
    /// The filtered row set is empty. Reported before any network call.
    NoRows,
    /// No provider produced a JSON array of the right length.
    InvalidOutput,
}

impl std::fmt::Display for EnrichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichError::MissingFields => write!(f, "Missing required fields."),
            EnrichError::NoRows => {
                write!(f, "No rows with data to enrich. Please add data to the selected columns.")
            }
            EnrichError::InvalidOutput => write!(f, "LLM did not return valid data."),
        }
    }
}

impl std::error::Error for EnrichError {}

impl EnrichRequest {
    pub fn validate(&self) -> Result<(), EnrichError> {
        if self.prompt.trim().is_empty()
            || self.columns.is_empty()
            || self.target_column_id.trim().is_empty()
        {
            return Err(EnrichError::MissingFields);
        }
        if self.rows.is_empty() {
            return Err(EnrichError::NoRows);
        }
        Ok(())
    }
}

/// Ranked providers behind the single `enrich` contract.
pub struct EnrichClient {
    providers: Vec<Box<dyn Provider>>,
}

impl EnrichClient {
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Build the provider chain from settings, skipping providers without
    /// an API key. Fails when no ranked provider is usable.
    pub fn from_settings(settings: &EnrichSettings) -> Result<Self, String> {
        let mut providers: Vec<Box<dyn Provider>> = Vec::new();
        for &kind in &settings.providers {
            let lookup = tabula_config::get_api_key(kind.name());
            let Some(key) = lookup.key else {
                continue;
            };
            let model = settings.model_for(kind).to_string();
            match kind {
                tabula_config::ProviderKind::OpenAi => {
                    providers.push(Box::new(OpenAiProvider::new(key, model)));
                }
                tabula_config::ProviderKind::Anthropic => {
                    providers.push(Box::new(AnthropicProvider::new(key, model)));
                }
            }
        }
        if providers.is_empty() {
            return Err(
                "No enrichment provider has an API key configured. Run `tabula doctor` for details."
                    .to_string(),
            );
        }
        Ok(Self { providers })
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run the enrichment: one value per input row, in input order.
    ///
    /// Each provider gets one attempt. A network failure, an unparseable
    /// response, or an array of the wrong length all mean the same thing:
    /// fall through to the next provider. Only when the ranking is
    /// exhausted does the failure surface.
    pub fn enrich(&self, request: &EnrichRequest) -> Result<Vec<Value>, EnrichError> {
        request.validate()?;

        let (system_prompt, user_prompt) = compose_prompts(
            &request.prompt,
            &request.rows,
            &request.columns,
            &request.target_column_id,
        );

        for provider in &self.providers {
            let Ok(text) = provider.complete(&system_prompt, &user_prompt) else {
                continue;
            };
            let Some(values) = extract_json_array(&text) else {
                continue;
            };
            if values.len() == request.rows.len() {
                return Ok(values);
            }
        }

        Err(EnrichError::InvalidOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_engine::column::ColumnType;

    struct CannedProvider {
        response: Result<String, crate::provider::ProviderError>,
    }

    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        fn complete(&self, _: &str, _: &str) -> Result<String, crate::provider::ProviderError> {
            self.response.clone()
        }
    }

    fn request(row_count: usize) -> EnrichRequest {
        let columns = vec![Column::new("name", "Name", ColumnType::Text)];
        let rows = (0..row_count)
            .map(|i| {
                let mut r = Row::empty(i as i64 + 1, &columns);
                r.set("name", format!("row {i}"));
                r
            })
            .collect();
        EnrichRequest {
            prompt: "fill it".to_string(),
            rows,
            columns,
            target_column_id: "motto".to_string(),
        }
    }

    fn canned(text: &str) -> Box<dyn Provider> {
        Box::new(CannedProvider {
            response: Ok(text.to_string()),
        })
    }

    fn failing() -> Box<dyn Provider> {
        Box::new(CannedProvider {
            response: Err(crate::provider::ProviderError::Network("down".into())),
        })
    }

    #[test]
    fn test_valid_array_returned_as_is() {
        let client = EnrichClient::new(vec![canned(r#"["a", "b"]"#)]);
        let values = client.enrich(&request(2)).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], serde_json::json!("a"));
    }

    #[test]
    fn test_wrong_length_is_invalid_output() {
        let client = EnrichClient::new(vec![canned(r#"["only one"]"#)]);
        assert_eq!(client.enrich(&request(2)), Err(EnrichError::InvalidOutput));
    }

    #[test]
    fn test_failure_falls_back_to_next_provider() {
        let client = EnrichClient::new(vec![failing(), canned(r#"["a", "b"]"#)]);
        assert_eq!(client.enrich(&request(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_garbage_then_valid_falls_back() {
        let client = EnrichClient::new(vec![
            canned("I cannot help with that."),
            canned("Sure: [\"a\", \"b\"]"),
        ]);
        assert_eq!(client.enrich(&request(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_all_providers_exhausted() {
        let client = EnrichClient::new(vec![failing(), canned("no array here")]);
        assert_eq!(client.enrich(&request(1)), Err(EnrichError::InvalidOutput));
    }

    #[test]
    fn test_validation_before_any_provider_runs() {
        struct PanickingProvider;
        impl Provider for PanickingProvider {
            fn name(&self) -> &str {
                "panic"
            }
            fn complete(
                &self,
                _: &str,
                _: &str,
            ) -> Result<String, crate::provider::ProviderError> {
                panic!("provider must not be called");
            }
        }

        let client = EnrichClient::new(vec![Box::new(PanickingProvider)]);

        let mut missing_prompt = request(1);
        missing_prompt.prompt = "  ".to_string();
        assert_eq!(
            client.enrich(&missing_prompt),
            Err(EnrichError::MissingFields)
        );

        let mut no_rows = request(1);
        no_rows.rows.clear();
        assert_eq!(client.enrich(&no_rows), Err(EnrichError::NoRows));
    }

    #[test]
    fn test_request_wire_shape() {
        let req = request(1);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["targetColId"], "motto");
        assert!(json["rows"].is_array());
        assert!(json["columns"].is_array());
    }
}

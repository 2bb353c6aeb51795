use allcards_core::{Language, TranslateError, Translator};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

/// Translates English card text through the public MyMemory endpoint.
pub struct MyMemoryTranslator {
    client: Client,
    endpoint: String,
}

impl MyMemoryTranslator {
    pub fn new() -> Result<Self, TranslateError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| TranslateError::Request(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Translator for MyMemoryTranslator {
    fn translate(&self, text: &str, target: Language) -> Result<String, TranslateError> {
        if target == Language::En {
            return Ok(text.to_string());
        }
        let langpair = format!("en|{}", target.code());
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .map_err(|err| TranslateError::Request(err.to_string()))?;
        if !response.status().is_success() {
            return Err(TranslateError::Request(format!(
                "translation service returned {}",
                response.status()
            )));
        }
        let payload: MyMemoryResponse = response
            .json()
            .map_err(|err| TranslateError::Request(format!("unreadable translation: {err}")))?;
        extract_translation(payload)
    }
}

fn extract_translation(payload: MyMemoryResponse) -> Result<String, TranslateError> {
    payload
        .response_data
        .and_then(|data| data.translated_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(TranslateError::EmptyResponse)
}

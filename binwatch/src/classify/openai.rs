//! Vision classifier over an OpenAI-compatible chat-completions endpoint.

use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::parse::{parse_components, parse_part_name};
use super::{Classifier, ClassifyError, Component};
use crate::frame::Frame;
use crate::http::HttpClient;

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default vision-capable model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default municipality whose sorting rules apply.
pub const DEFAULT_MUNICIPALITY: &str = "Montreal";

/// Request parameters for [`OpenAiClassifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    /// City whose waste rules the model should apply.
    pub municipality: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            municipality: DEFAULT_MUNICIPALITY.to_string(),
            temperature: 1.0,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// [`Classifier`] backed by a vision chat model.
pub struct OpenAiClassifier<H: HttpClient> {
    client: H,
    config: ClassifierConfig,
    api_key: String,
}

impl<H: HttpClient> OpenAiClassifier<H> {
    pub fn new(client: H, config: ClassifierConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            config,
            api_key: api_key.into(),
        }
    }

    /// Create a classifier reading its key from the environment variable `var`.
    pub fn from_env(client: H, config: ClassifierConfig, var: &str) -> Result<Self, ClassifyError> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(client, config, key.trim())),
            _ => Err(ClassifyError::MissingApiKey(var.to_string())),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn components_prompt(&self) -> String {
        format!(
            "You are helping people sort waste in {city}. Identify the item in the image and \
             break it into its separable components. For each component give its material and, \
             for plastics, the resin identification number if you are confident of it. Assign \
             each component the disposal category used in {city}: Recycling, Compost or Garbage. \
             Ignore hands, the background and the bins themselves. Answer only with a JSON list \
             of objects with the keys \"component_name\", \"material\", \"recycling_number\" and \
             \"disposable_category\". If no item is visible, answer with an empty list [].",
            city = self.config.municipality
        )
    }

    fn part_prompt(&self, candidates: &[String]) -> String {
        format!(
            "The image shows the opening of a waste bin just after something was dropped in. \
             Which of these components is visible: {}? Answer with the component name only. \
             If none of them is visible, answer \"Unidentified\".",
            candidates.join(", ")
        )
    }

    fn request_body(&self, prompt: &str, frame: &Frame) -> Result<Value, ClassifyError> {
        let jpeg = frame
            .to_jpeg()
            .map_err(|e| ClassifyError::Encode(e.to_string()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);

        Ok(json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{}", encoded) }
                    }
                ]
            }]
        }))
    }

    /// Send one prompt with the frame attached and return the reply text.
    fn complete(&self, prompt: &str, frame: &Frame) -> Result<String, ClassifyError> {
        let body = self.request_body(prompt, frame)?;
        let bytes = self
            .client
            .post_json(&self.config.endpoint, Some(self.api_key.as_str()), &body)?;

        let response: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClassifyError::MalformedResponse("response has no content".to_string()))
    }
}

impl<H: HttpClient> Classifier for OpenAiClassifier<H> {
    fn classify(&self, frame: &Frame) -> Result<Vec<Component>, ClassifyError> {
        let reply = self.complete(&self.components_prompt(), frame)?;
        debug!(reply = %reply, "Classification reply");

        let components = parse_components(&reply)?;
        info!(count = components.len(), "Item classified");
        Ok(components)
    }

    fn identify_part(&self, frame: &Frame, candidates: &[String]) -> Result<String, ClassifyError> {
        let reply = self.complete(&self.part_prompt(candidates), frame)?;
        let name = parse_part_name(&reply, candidates);
        debug!(reply = %reply, item = %name, "Part identification reply");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::UNIDENTIFIED;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpError;
    use crate::testing::solid_frame;

    fn chat_reply(content: &str) -> Vec<u8> {
        json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
        .into_bytes()
    }

    fn classifier(client: MockHttpClient) -> OpenAiClassifier<MockHttpClient> {
        OpenAiClassifier::new(client, ClassifierConfig::default(), "sk-test")
    }

    #[test]
    fn test_classify_parses_fenced_component_list() {
        let content = "```json\n[{\"component_name\": \"Bottle\", \"material\": \"Plastic\", \
                       \"recycling_number\": \"1\", \"disposable_category\": \"Recycling\"}]\n```";
        let classifier = classifier(MockHttpClient::ok(chat_reply(content)));

        let components = classifier.classify(&solid_frame(8, 8, 100)).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].component_name, "Bottle");
        assert_eq!(components[0].disposable_category, "Recycling");
    }

    #[test]
    fn test_request_carries_model_prompt_and_image() {
        let classifier = classifier(MockHttpClient::ok(chat_reply("[]")));
        classifier.classify(&solid_frame(8, 8, 100)).unwrap();

        let requests = classifier.client.requests.lock();
        let (url, body) = &requests[0];
        let body = body.as_ref().unwrap();
        assert_eq!(url, DEFAULT_ENDPOINT);
        assert_eq!(body["model"], DEFAULT_MODEL);

        let content = &body["messages"][0]["content"];
        assert!(content[0]["text"].as_str().unwrap().contains("Montreal"));
        assert!(content[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_identify_part_lists_candidates() {
        let classifier = classifier(MockHttpClient::ok(chat_reply("Cap.")));
        let candidates = vec!["Bottle".to_string(), "Cap".to_string()];

        let name = classifier
            .identify_part(&solid_frame(8, 8, 0), &candidates)
            .unwrap();
        assert_eq!(name, "cap");

        let requests = classifier.client.requests.lock();
        let prompt = requests[0].1.as_ref().unwrap()["messages"][0]["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(prompt.contains("Bottle, Cap"));
    }

    #[test]
    fn test_identify_part_unidentified() {
        let classifier = classifier(MockHttpClient::ok(chat_reply("Unidentified")));
        let name = classifier
            .identify_part(&solid_frame(8, 8, 0), &["Bottle".to_string()])
            .unwrap();
        assert_eq!(name, UNIDENTIFIED);
    }

    #[test]
    fn test_identify_part_never_answers_outside_candidates() {
        let classifier = classifier(MockHttpClient::ok(chat_reply("Lid")));
        let name = classifier
            .identify_part(&solid_frame(8, 8, 0), &["Cup".to_string()])
            .unwrap();
        assert_eq!(name, UNIDENTIFIED);
    }

    #[test]
    fn test_http_error_propagates() {
        let classifier = classifier(MockHttpClient::err(HttpError::Status {
            url: DEFAULT_ENDPOINT.to_string(),
            status: 429,
        }));

        assert!(matches!(
            classifier.classify(&solid_frame(8, 8, 0)),
            Err(ClassifyError::Http(HttpError::Status { status: 429, .. }))
        ));
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let classifier = classifier(MockHttpClient::ok(b"{\"choices\": []}".to_vec()));
        assert!(matches!(
            classifier.classify(&solid_frame(8, 8, 0)),
            Err(ClassifyError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_from_env_requires_key() {
        let result = OpenAiClassifier::from_env(
            MockHttpClient::ok(Vec::new()),
            ClassifierConfig::default(),
            "BINWATCH_TEST_KEY_THAT_IS_NEVER_SET",
        );
        assert!(matches!(result, Err(ClassifyError::MissingApiKey(_))));
    }
}

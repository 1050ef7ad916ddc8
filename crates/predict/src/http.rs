#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tiny_http::Method;

use catbot_tokenize::Tokenizer;

use crate::generator::ResponseGenerator;
use crate::model::SequenceModel;

/// Reply to a `/chat` request whose message is blank.
pub const EMPTY_MESSAGE_RESPONSE: &str = "Please enter a message.";

/// `POST /chat` body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// user utterance; missing means empty
    #[serde(default)]
    pub message: String,
}

/// `POST /chat` reply, also used for error bodies.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// generated reply or error text
    pub response: String,
}

/// `GET /status` reply.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// `ready` or `error`
    pub status: &'static str,
    /// human-readable detail
    pub message: &'static str,
}

/// Status code and JSON body for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code
    pub status: u16,
    /// serialized JSON body
    pub body: String,
}

impl HttpReply {
    fn json<B: Serialize>(status: u16, body: &B) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
        Self { status, body }
    }

    fn text(status: u16, response: impl Into<String>) -> Self {
        Self::json(status, &ChatResponse { response: response.into() })
    }
}

/// Route one request to its JSON reply.
///
/// The query string is ignored. `/chat` trims the message, answers
/// [`EMPTY_MESSAGE_RESPONSE`] when nothing is left and 400 when the body is
/// not a JSON object. Anything else is 404.
pub fn route<M: SequenceModel, T: Tokenizer>(
    bot: &ResponseGenerator<M, T>,
    method: &Method,
    url: &str,
    body: &str,
) -> HttpReply {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Get, "/status") => {
            let r = bot.readiness();
            HttpReply::json(200, &StatusResponse { status: r.label(), message: r.message() })
        }
        (Method::Post, "/chat") => match serde_json::from_str::<ChatRequest>(body) {
            Ok(chat) => {
                let message = chat.message.trim();
                if message.is_empty() {
                    HttpReply::text(200, EMPTY_MESSAGE_RESPONSE)
                } else {
                    HttpReply::text(200, bot.generate_response(message))
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "malformed chat body");
                HttpReply::text(400, "Bad Request")
            }
        },
        _ => HttpReply::text(404, "Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::NOT_LOADED_RESPONSE;
    use crate::testing::{not_loaded, serving, FixedModel};
    use serde_json::Value;

    fn parsed(reply: &HttpReply) -> Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn status_reports_ready_and_error() {
        let ready = route(&serving(FixedModel::uniform(20, 5)), &Method::Get, "/status", "");
        assert_eq!(ready.status, 200);
        let v = parsed(&ready);
        assert_eq!(v["status"], "ready");
        assert_eq!(v["message"], "Model loaded successfully");

        let missing = route(&not_loaded(), &Method::Get, "/status", "");
        assert_eq!(missing.status, 200);
        let v = parsed(&missing);
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "Model not loaded");
    }

    #[test]
    fn blank_or_missing_message_asks_for_input() {
        let bot = serving(FixedModel::uniform(20, 5));
        for body in [r#"{"message": "   "}"#, r#"{"message": ""}"#, "{}"] {
            let reply = route(&bot, &Method::Post, "/chat", body);
            assert_eq!(reply.status, 200, "{body}");
            assert_eq!(parsed(&reply)["response"], EMPTY_MESSAGE_RESPONSE);
        }
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let bot = serving(FixedModel::uniform(20, 5));
        for body in ["", "not json", r#"{"message": 5}"#] {
            let reply = route(&bot, &Method::Post, "/chat", body);
            assert_eq!(reply.status, 400, "{body}");
            assert_eq!(parsed(&reply)["response"], "Bad Request");
        }
    }

    #[test]
    fn unknown_routes_are_not_found() {
        let bot = serving(FixedModel::uniform(20, 5));
        for (method, url) in [(Method::Get, "/chat"), (Method::Post, "/status"), (Method::Get, "/")] {
            let reply = route(&bot, &method, url, "");
            assert_eq!(reply.status, 404, "{method} {url}");
            assert_eq!(parsed(&reply)["response"], "Not Found");
        }
    }

    #[test]
    fn chat_replies_with_generated_text() {
        let bot = serving(FixedModel::uniform(20, 5));
        let reply = route(&bot, &Method::Post, "/chat?lang=en", r#"{"message": " hello "}"#);
        assert_eq!(reply.status, 200);
        let text = parsed(&reply)["response"].as_str().unwrap().to_string();
        assert!(!text.is_empty());

        let offline = route(&not_loaded(), &Method::Post, "/chat", r#"{"message": "hello"}"#);
        assert_eq!(parsed(&offline)["response"], NOT_LOADED_RESPONSE);
    }
}

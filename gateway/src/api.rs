use serde::{Deserialize, Serialize};

// Input: what the merchant client sends us. The question is optional on
// the wire so an absent field gets the same "cannot be empty" envelope as
// a blank one, instead of the extractor's bare rejection text.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: Option<String>, // The natural-language question
}

// Output: the uniform error envelope. Success responses pass the backend
// payload through untouched, so there is no success type to declare here.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

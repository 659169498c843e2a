/// Hosted language and vision model integration
///
/// `client` talks to the chat-completions API; `extraction` reads the loose
/// JSON the models reply with into typed filter and garment descriptions.

mod client;
pub use client::{AiClient, AiError};

mod extraction;
pub use extraction::{parse_model_json, FilterExtraction, VisionExtraction};

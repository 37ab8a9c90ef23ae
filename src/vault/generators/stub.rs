use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::vault::generators::{GenerationError, ResponseGenerator};

pub const STUB_MODEL: &str = "stubbed";

const PROMPT_SLOT: &str = "{prompt}";

const CODE_TEMPLATES: &[&str] = &[
    "Here's a code example for '{prompt}':\n\n```python\nprint('Hello, World!')\n```\n\nThis demonstrates basic programming concepts.",
    "For coding questions like '{prompt}', I'd recommend starting with fundamentals and building complexity gradually.",
];

const EXPLAIN_TEMPLATES: &[&str] = &[
    "Let me explain '{prompt}' in simple terms:\n\nThis concept involves several key components working together.",
    "'{prompt}' can be understood by breaking it down into smaller, manageable parts.",
];

const HELP_TEMPLATES: &[&str] = &[
    "I'd be happy to help with '{prompt}'. Here are some steps you can follow:",
    "For '{prompt}', I recommend taking a systematic approach.",
];

const GENERAL_TEMPLATES: &[&str] = &[
    "Thank you for your prompt: '{prompt}'. This is a simulated response from MiniVault API.",
    "Based on your input '{prompt}', here's a thoughtful response from our local model.",
    "Your prompt '{prompt}' is interesting. Let me share some insights on this topic.",
    "Processing your request about '{prompt}'. Here's what I can tell you...",
];

pub const ELABORATION: &str = "

This response demonstrates MiniVault API capabilities:
• Local prompt processing
• Contextual response generation
• Interaction logging to logs/log.jsonl
• RESTful API design with axum

In production, this could be powered by:
• Hugging Face Transformers
• Ollama with Llama models
• Custom fine-tuned models

The system maintains full offline capability.";

/// Keyword bucket a prompt falls into / 提示词所属的关键词类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCategory {
    Code,
    Explain,
    Help,
    General,
}

impl PromptCategory {
    /// Case-insensitive keyword match; earlier buckets win.
    pub fn classify(prompt: &str) -> Self {
        let lower = prompt.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has_any(&["code", "programming"]) {
            Self::Code
        } else if has_any(&["explain", "what is"]) {
            Self::Explain
        } else if has_any(&["help", "how to"]) {
            Self::Help
        } else {
            Self::General
        }
    }

    pub fn templates(self) -> &'static [&'static str] {
        match self {
            Self::Code => CODE_TEMPLATES,
            Self::Explain => EXPLAIN_TEMPLATES,
            Self::Help => HELP_TEMPLATES,
            Self::General => GENERAL_TEMPLATES,
        }
    }
}

/// Build the stub reply: one bucket template chosen with `rng`, followed by
/// the fixed elaboration block.
pub fn compose_response<R: Rng + ?Sized>(prompt: &str, rng: &mut R) -> String {
    let templates = PromptCategory::classify(prompt).templates();
    // every bucket is non-empty
    let template = templates.choose(rng).copied().unwrap_or(GENERAL_TEMPLATES[0]);
    let mut out = template.replace(PROMPT_SLOT, prompt);
    out.push_str(ELABORATION);
    out
}

/// Template-based generator that never leaves the process.
/// 基于模板的本地生成器
pub struct StubGenerator {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic template selection, mostly for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseGenerator for StubGenerator {
    fn model(&self) -> &str {
        STUB_MODEL
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut rng = self.rng.lock();
        Ok(compose_response(prompt, &mut **rng))
    }
}

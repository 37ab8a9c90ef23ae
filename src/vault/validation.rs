//! Prompt validation / 提示词校验

/// Longest accepted prompt, in characters, after trimming.
pub const MAX_PROMPT_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("Prompt cannot be empty")]
    Empty,

    #[error("Prompt too long (max {max} characters)")]
    TooLong { max: usize },
}

/// Trim the raw prompt and check it is non-empty and within the length cap.
/// 去除首尾空白并检查长度
pub fn validate_prompt(raw: &str) -> Result<&str, PromptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PromptError::Empty);
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return Err(PromptError::TooLong {
            max: MAX_PROMPT_CHARS,
        });
    }
    Ok(trimmed)
}

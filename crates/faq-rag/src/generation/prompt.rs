//! Prompt template for grounded FAQ answers

/// Marker the model continues after; the answer is whatever follows the last one
pub const ASSISTANT_MARKER: &str = "<|assistant|>";

const SYSTEM_INSTRUCTION: &str = "You are a helpful banking assistant. You are provided with bank FAQ entries relevant to the query of the user. Your job is to give direct answers according to the provided context. NOT from your own knowledge. Give the answer in a user friendly manner. Keep answers short. No explanation";

/// Prompt builder for grounded queries
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    separator: String,
}

impl PromptBuilder {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Join retrieved documents, nearest first
    pub fn build_context<S: AsRef<str>>(&self, documents: &[S]) -> String {
        documents
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&self.separator)
    }

    /// Full chat-formatted prompt: instruction, context, then the user's query
    pub fn build_prompt<S: AsRef<str>>(&self, query: &str, documents: &[S]) -> String {
        format!(
            "<|system|>\n{instruction}\nContext:\n\n{context}\n---\n</s><|user|>\n {query}\n</s>{marker}",
            instruction = SYSTEM_INSTRUCTION,
            context = self.build_context(documents),
            query = query,
            marker = ASSISTANT_MARKER,
        )
    }

    /// Text after the last assistant marker, trimmed
    pub fn extract_answer(generated: &str) -> String {
        generated
            .rsplit(ASSISTANT_MARKER)
            .next()
            .unwrap_or(generated)
            .trim()
            .to_string()
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("\n---\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_order_and_separator() {
        let builder = PromptBuilder::default();
        let context = builder.build_context(&["Q: a\nA: 1", "Q: b\nA: 2"]);
        assert_eq!(context, "Q: a\nA: 1\n---\nQ: b\nA: 2");
    }

    #[test]
    fn test_prompt_contains_context_before_query() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_prompt(
            "What is the minimum balance?",
            &["Q: What is the minimum balance?\nA: PKR 1,000 required"],
        );

        let context_at = prompt.find("PKR 1,000").unwrap();
        let query_at = prompt.rfind("What is the minimum balance?").unwrap();
        assert!(context_at < query_at);
        assert!(prompt.ends_with(ASSISTANT_MARKER));
        assert!(prompt.contains("NOT from your own knowledge"));
    }

    #[test]
    fn test_empty_context() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_prompt::<&str>("hello", &[]);
        assert!(prompt.contains("Context:\n\n\n---\n"));
    }

    #[test]
    fn test_extract_answer() {
        assert_eq!(
            PromptBuilder::extract_answer("<|user|>\nq\n</s><|assistant|>  The fee is 0.  "),
            "The fee is 0."
        );
        assert_eq!(
            PromptBuilder::extract_answer("a<|assistant|>b<|assistant|> c"),
            "c"
        );
        assert_eq!(PromptBuilder::extract_answer("  plain answer\n"), "plain answer");
    }
}

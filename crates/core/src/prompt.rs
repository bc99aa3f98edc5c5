pub const COMPARISON_PROMPT_TEMPLATE: &str = "
Answer the following question by comparing the content from the two different sources provided.

Source 1 context:
{source1_context}

Source 2 context:
{source2_context}

---

Question: {question}

Provide a detailed comparative answer based on the contexts above.
";

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, question: &str, context1: &str, context2: &str) -> String {
        render(COMPARISON_PROMPT_TEMPLATE, question, context1, context2)
    }
}

// Slots are filled in a single left-to-right pass so placeholder-looking text
// inside a context or the question is copied verbatim, never expanded.
fn render(template: &str, question: &str, context1: &str, context2: &str) -> String {
    let mut rendered =
        String::with_capacity(template.len() + question.len() + context1.len() + context2.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            rendered.push_str(tail);
            return rendered;
        };

        match &tail[1..close] {
            "source1_context" => rendered.push_str(context1),
            "source2_context" => rendered.push_str(context2),
            "question" => rendered.push_str(question),
            _ => rendered.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::PromptAssembler;

    #[test]
    fn build_is_deterministic_and_contains_inputs() {
        let assembler = PromptAssembler::new();
        let first = assembler.build("Q", "A", "B");
        let second = assembler.build("Q", "A", "B");

        assert_eq!(first, second);
        assert!(first.contains("Source 1 context:\nA\n"));
        assert!(first.contains("Source 2 context:\nB\n"));
        assert!(first.contains("Question: Q\n"));
    }

    #[test]
    fn empty_contexts_render_as_empty_slots() {
        let prompt = PromptAssembler::new().build("what differs?", "", "");
        assert!(prompt.contains("Source 1 context:\n\n"));
        assert!(prompt.contains("Question: what differs?"));
        assert!(!prompt.contains("{source1_context}"));
    }

    #[test]
    fn placeholder_text_inside_context_is_not_expanded() {
        let prompt = PromptAssembler::new().build("q", "see {question} and {", "{source1_context}");
        assert!(prompt.contains("see {question} and {"));
        assert!(prompt.contains("Source 2 context:\n{source1_context}\n"));
    }
}

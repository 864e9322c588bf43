//! Prompt builders for the traffic-light judge. Text only, no I/O.

pub(crate) fn build_signal_prompt(question: &str, answer: &str, snippets: &[String]) -> String {
    let gt_text = snippets.join("\n");
    format!(
        "You are a Senior Legal Auditor (Green Agent).\n\n\
         [Query]: {question}\n\
         [Agent Response]: {answer}\n\
         [Ground Truth Laws/Facts]: {gt_text}\n\n\
         Task:\n\
         1. Compare the Agent Response against Ground Truth.\n\
         2. Assign a Traffic Light Signal:\n\
            - GREEN: Answer is correct AND fully supported by Ground Truth.\n\
            - YELLOW: Answer is correct but reasoning/citations are missing or vague.\n\
            - RED: Answer contradicts Ground Truth OR hallucinates non-existent laws.\n\n\
         Output strictly one JSON object: {{ \"signal\": \"GREEN/YELLOW/RED\", \"reason\": \"...\", \"score\": 0-1 }}"
    )
}

pub(crate) fn build_triples_prompt(text: &str) -> String {
    format!(
        "Extract key legal claims from the text below as structured triples \
         (Entity, Relationship, Value).\n\
         Text: {text}\n\
         Output format: JSON list of triples."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_prompt_contains_all_sections() {
        let p = build_signal_prompt(
            "what is article 5?",
            "it forbids X",
            &["article 5 text".to_string(), "related ruling".to_string()],
        );
        assert!(p.contains("[Query]: what is article 5?"));
        assert!(p.contains("[Agent Response]: it forbids X"));
        assert!(p.contains("article 5 text\nrelated ruling"));
        assert!(p.contains("GREEN/YELLOW/RED"));
    }
}

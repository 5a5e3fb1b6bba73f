/// Wrap the assembled context and the user's literal question in the
/// answering instructions.
///
/// The model is told to examine every excerpt and to use only what the
/// context states, which also covers the empty-context case: it answers that
/// the document does not contain the information.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following context, answer the question accurately and completely.\n\
         Make sure to examine ALL the data provided in the context.\n\
         Do not make assumptions - only use information explicitly present in the context.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer (be thorough and accurate):"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_context_and_question() {
        let prompt = build_prompt("Row 1: apples\n\nRow 2: pears", "How many rows?");

        assert!(prompt.contains("Context:\nRow 1: apples\n\nRow 2: pears\n"));
        assert!(prompt.contains("Question: How many rows?\n"));
        assert!(prompt.contains("only use information explicitly present in the context"));
        assert!(prompt.ends_with("Answer (be thorough and accurate):"));
    }

    #[test]
    fn test_prompt_with_empty_context() {
        let prompt = build_prompt("", "Who wrote it?");
        assert!(prompt.contains("Context:\n\n\nQuestion: Who wrote it?"));
    }
}

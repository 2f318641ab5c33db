#[cfg(test)]
mod tests {
    use timeai::orchestrator::extract::extract_tool_calls;

    fn fenced(body: &str) -> String {
        format!("```tool_call\n{}\n```", body)
    }

    #[test]
    fn test_no_blocks_yields_empty() {
        assert!(extract_tool_calls("Just a plain answer, no tools needed.").is_empty());
        assert!(extract_tool_calls("").is_empty());
    }

    #[test]
    fn test_single_block() {
        let text = format!(
            "Let me look that up.\n\n{}",
            fenced(r#"{"name": "search_github_repos", "parameters": {"query": "rust"}}"#)
        );

        let calls = extract_tool_calls(&text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["name"], "search_github_repos");
        assert_eq!(calls[0]["parameters"]["query"], "rust");
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let text = format!(
            "First:\n{}\nThen:\n{}\n",
            fenced(r#"{"name": "get_figma_file", "parameters": {"file_key": "abc"}}"#),
            fenced(r#"{"name": "search_jira_issues", "parameters": {"jql": "project = TIME"}}"#)
        );

        let calls = extract_tool_calls(&text);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0]["name"], "get_figma_file");
        assert_eq!(calls[1]["name"], "search_jira_issues");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = format!(
            "{}\nsome prose\n{}",
            fenced(r#"{"name": "a", "parameters": {}}"#),
            fenced(r#"{"name": "b", "parameters": {"x": 1}}"#)
        );

        let first = extract_tool_calls(&text);
        let second = extract_tool_calls(&text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let text = format!(
            "{}\n{}",
            fenced(r#"{"name": "broken", "parameters":"#),
            fenced(r#"{"name": "valid", "parameters": {}}"#)
        );

        let calls = extract_tool_calls(&text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["name"], "valid");
    }

    #[test]
    fn test_payload_without_name_is_still_returned() {
        // Shape checking happens at dispatch, not extraction
        let calls = extract_tool_calls(&fenced(r#"{"parameters": {"query": "rust"}}"#));
        assert_eq!(calls.len(), 1);
        assert!(calls[0].get("name").is_none());

        let calls = extract_tool_calls(&fenced(r#"["not", "a", "call"]"#));
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_array());
    }

    #[test]
    fn test_other_fences_are_ignored() {
        let text = "```json\n{\"name\": \"x\"}\n```\n```rust\nfn main() {}\n```";
        assert!(extract_tool_calls(text).is_empty());
    }

    #[test]
    fn test_surrounding_prose_does_not_leak_into_payload() {
        let text = format!(
            "I will check GitHub now.\n{}\nGive me a moment.",
            fenced(r#"{"name": "search_github_repos", "parameters": {"query": "duckdb"}}"#)
        );

        let calls = extract_tool_calls(&text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["parameters"]["query"], "duckdb");
    }
}

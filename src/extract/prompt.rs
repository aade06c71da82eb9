/// Instruction template; `{query}` is the only placeholder.
const TEMPLATE: &str = r#"You are an expert business analyst. Your task is to extract key entities from a user's request for finding companies.
Analyze the user's query and return a structured JSON object with the following keys:
- "industry": A list of relevant industries.
- "location": A list of relevant cities, states, or countries.
- "stage": The funding stage of the company (e.g., "Seed", "Series A", "Public").
- "technologies": A list of specific technologies mentioned.
- "search_keywords": A list of 3-5 optimized search engine query strings based on the user's request.

If a key is not mentioned in the query, return an empty list [] for it.
Respond with the JSON object only.

User Query: "{query}"

JSON Output:"#;

pub(super) fn build_prompt(query: &str) -> String {
    TEMPLATE.replace("{query}", &sanitize_query(query))
}

/// Flatten the query onto one line and keep it from closing the quoted slot.
fn sanitize_query(query: &str) -> String {
    query
        .trim()
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_query_once_in_quotes() {
        let prompt = build_prompt("Seed-stage AI healthcare companies in Boston");
        assert!(prompt.contains(r#"User Query: "Seed-stage AI healthcare companies in Boston""#));
        assert!(!prompt.contains("{query}"));
        assert!(prompt.trim_end().ends_with("JSON Output:"));
    }

    #[test]
    fn names_every_schema_key_and_empty_rule() {
        let prompt = build_prompt("x");
        for key in ["industry", "location", "stage", "technologies", "search_keywords"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing {key}");
        }
        assert!(prompt.contains("return an empty list [] for it"));
        assert!(prompt.contains("3-5"));
    }

    #[test]
    fn sanitizes_quotes_and_newlines() {
        assert_eq!(sanitize_query("  say \"hi\"\nthere\t "), "say 'hi' there");
    }

    #[test]
    fn placeholder_in_query_is_not_expanded_twice() {
        let prompt = build_prompt("{query}");
        assert!(prompt.contains(r#"User Query: "{query}""#));
    }
}

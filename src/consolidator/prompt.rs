//! Prompt construction for consolidation and merge calls

use crate::crawler::PageRecord;

/// Prompt asking the model to consolidate extracted pages into one document
pub fn consolidation_prompt(records: &[PageRecord]) -> String {
    let context = records
        .iter()
        .map(|page| {
            format!(
                "Title: {}\nURL: {}\nContent:\n{}",
                page.title, page.url, page.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are tasked with consolidating documentation from multiple web pages into \
a single, well-organized markdown document. Below are extracts from various \
pages, including their titles and URLs. Create a cohesive document that:

1. Maintains the key information from each source
2. Organizes content logically
3. Includes relevant section headers
4. Preserves important technical details
5. Cites source URLs where appropriate

Here are the source pages:

{context}

Please provide the consolidated documentation in markdown format."
    )
}

/// Prompt asking the model to merge intermediate markdown fragments
pub fn merge_prompt(fragments: &[PageRecord]) -> String {
    let body = fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "The following markdown fragments were each consolidated from a different \
section of the same documentation site. Merge them into one coherent markdown \
document: unify the section structure, remove duplicated material, and keep all \
technical details and source URL citations intact.

{body}

Please provide the merged documentation in markdown format."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, url: &str, text: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            links: Vec::new(),
            depth: 0,
            used_fallback: false,
            truncated: false,
        }
    }

    #[test]
    fn test_consolidation_prompt_tags_sources() {
        let records = vec![
            record("Intro", "https://x.test/docs", "Welcome."),
            record("Install", "https://x.test/docs/install", "Run make."),
        ];
        let prompt = consolidation_prompt(&records);

        assert!(prompt.contains("Title: Intro"));
        assert!(prompt.contains("URL: https://x.test/docs/install"));
        assert!(prompt.contains("Run make."));
        assert!(prompt.contains("Cites source URLs"));
    }

    #[test]
    fn test_merge_prompt_separates_fragments() {
        let fragments = vec![
            record("", "", "# Part one"),
            record("", "", "# Part two"),
        ];
        let prompt = merge_prompt(&fragments);

        assert!(prompt.contains("# Part one\n\n---\n\n# Part two"));
    }
}

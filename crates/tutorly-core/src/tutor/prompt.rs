//! Tutoring prompt template.

use super::context::KnowledgeContext;

/// Prompt sent as the final user message of every tutoring request.
pub const TUTOR_PROMPT: &str = "\
You are a tutor who adapts every answer to what the user already knows.

Rules:
- Write every mathematical expression, symbol and variable in LaTeX.
- Wrap inline math in $...$ and block math in $$...$$.
- Do not put math, symbols or variables in parentheses or brackets outside LaTeX.
- Use Markdown: Heading 1 for topics, Heading 2 for subtopics, **bold** for key terms.

Knowledge context:
{knowledge_context}

Keep explanations {detail_level} and use {terminology_level} terminology.

User question: {question}
";

/// Fill the tutoring template for `question`.
pub fn render_tutor_prompt(context: &KnowledgeContext, question: &str) -> String {
    let tier = context.tier();
    let knowledge_context = context.describe();
    fill_template(
        TUTOR_PROMPT,
        &[
            ("knowledge_context", knowledge_context.as_str()),
            ("detail_level", tier.detail),
            ("terminology_level", tier.terminology),
            ("question", question),
        ],
    )
}

/// Substitute `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned. Braces that do not name a known
/// placeholder are copied verbatim.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

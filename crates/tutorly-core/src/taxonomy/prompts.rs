//! Prompt templates for taxonomy work.

use crate::tutor::prompt::fill_template;

pub const SUBJECT_CLASSIFICATION_PROMPT: &str = "\
Given the question and the list of subjects below, decide which subjects are most relevant to answering the question.
Reply with a JSON array of subject names chosen only from the list.

Example reply: [\"Mathematics\", \"Physics\"]

Question: {question}
Available subjects: {options}";

pub const TOPIC_CLASSIFICATION_PROMPT: &str = "\
Given the question and the list of {subject} topics below, decide which topics are most relevant to answering the question.
Reply with a JSON array of topic names chosen only from the list.

Example reply: [\"Vectors\", \"Vector Operations\"]

Question: {question}
Available topics: {options}";

pub const SUBTOPIC_CLASSIFICATION_PROMPT: &str = "\
Given the question and the list of {subject} subtopics below, decide which subtopics are most relevant to answering the question.
Reply with a JSON array of subtopic names chosen only from the list.

Example reply: [\"Vector Addition\", \"Vector Subtraction\"]

Question: {question}
Available subtopics: {options}";

pub const TITLE_GENERATION_PROMPT: &str = "\
Write a short title of at most 4 words for the question or conversation below.
Name the main concept; skip filler words.

Reply with a JSON object holding a single \"title\" key.
Example reply: {\"title\": \"Matrix Vector Multiplication\"}

Question or content: {text}";

pub const OUTLINE_GENERATION_PROMPT: &str = "\
Write a detailed and accurate table of contents for a {subject} textbook.
Stay strictly within {subject}; leave out loosely related subjects and applications.
Start with a short introduction chapter on motivation, formalism and history. Do not number chapters.
Avoid vague chapters such as \"Advanced Topics in {subject}\", \"Examples of ...\", \"Applications of ...\" or \"Conclusion\".
Order chapters so that each one builds on the previous ones. Do not use LaTeX.

Give every chapter and subtopic a difficulty between 0 and 1 on a scale shared by all subjects,
so that introductory algebra sits low and quantum field theory sits high.

Reply with JSON in exactly this shape:

{
  \"{subject}\": {
    \"Introduction to {subject}\": {
      \"subtopics\": [{\"subtopic\": \"topic1\", \"difficulty\": 0.1}, {\"subtopic\": \"topic2\", \"difficulty\": 0.2}],
      \"difficulty\": 0.1
    },
    \"Chapter Name\": {
      \"subtopics\": [{\"subtopic\": \"topic1\", \"difficulty\": 0.3}, {\"subtopic\": \"topic2\", \"difficulty\": 0.4}],
      \"difficulty\": 0.2
    }
  }
}
";

/// Fill a classification template.
pub fn render_classification(
    template: &str,
    question: &str,
    subject: &str,
    options: &[String],
) -> String {
    let options = options.join(", ");
    fill_template(
        template,
        &[("subject", subject), ("options", options.as_str()), ("question", question)],
    )
}

pub fn render_title(text: &str) -> String {
    fill_template(TITLE_GENERATION_PROMPT, &[("text", text)])
}

pub fn render_outline(subject: &str) -> String {
    fill_template(OUTLINE_GENERATION_PROMPT, &[("subject", subject)])
}

// Prompt constants for resume feedback.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// Shape the model must return. Kept in sync with the frontend feedback view.
pub const FEEDBACK_RESPONSE_FORMAT: &str = r#"{
  "overallScore": number,        // 0-100
  "ATS": {
    "score": number,             // 0-100, how well the resume passes applicant tracking systems
    "tips": [{ "type": "good" | "improve", "tip": "string" }]
  },
  "toneAndStyle": {
    "score": number,
    "tips": [{ "type": "good" | "improve", "tip": "string", "explanation": "string" }]
  },
  "content": {
    "score": number,
    "tips": [{ "type": "good" | "improve", "tip": "string", "explanation": "string" }]
  },
  "structure": {
    "score": number,
    "tips": [{ "type": "good" | "improve", "tip": "string", "explanation": "string" }]
  },
  "skills": {
    "score": number,
    "tips": [{ "type": "good" | "improve", "tip": "string", "explanation": "string" }]
  }
}"#;

pub const FEEDBACK_INSTRUCTIONS_TEMPLATE: &str = "\
You are an expert in ATS (Applicant Tracking System) and resume analysis.
Please analyze and rate this resume and suggest how to improve it.
The rating can be low if the resume is bad.
Be thorough and detailed. Don't be afraid to point out any mistakes or areas for improvement.
If there is a lot to improve, don't hesitate to give low scores. This is to help the user improve their resume.
If available, use the job description for the job the user is applying to to give more detailed feedback.
If provided, take the job description into consideration.
The job title is: {job_title}
The job description is: {job_description}
Provide the feedback using the following format:
{response_format}
Return the analysis as a JSON object, without any other text and without the backticks.
Do not include any other text or comments.";

/// System prompt for the feedback call.
pub fn feedback_system() -> String {
    format!("You are a meticulous resume reviewer. {JSON_ONLY_SYSTEM}")
}

/// Builds the analysis instructions for one job application.
///
/// Placeholders are filled in a single left-to-right pass, so braces inside
/// the user's text are copied verbatim.
pub fn prepare_instructions(job_title: &str, job_description: &str) -> String {
    let mut out = String::with_capacity(
        FEEDBACK_INSTRUCTIONS_TEMPLATE.len() + FEEDBACK_RESPONSE_FORMAT.len() + job_description.len(),
    );
    let mut rest = FEEDBACK_INSTRUCTIONS_TEMPLATE;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let (value, len) = [
            ("{job_title}", job_title),
            ("{job_description}", job_description),
            ("{response_format}", FEEDBACK_RESPONSE_FORMAT),
        ]
        .into_iter()
        .find(|(placeholder, _)| tail.starts_with(placeholder))
        .map(|(placeholder, value)| (value, placeholder.len()))
        .unwrap_or(("{", 1));
        out.push_str(value);
        rest = &tail[len..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_embed_job_fields() {
        let instructions = prepare_instructions("Engineer", "Build things");
        assert!(instructions.contains("The job title is: Engineer"));
        assert!(instructions.contains("The job description is: Build things"));
        assert!(instructions.contains("\"overallScore\""));
        assert!(!instructions.contains("{job_title}"));
        assert!(!instructions.contains("{response_format}"));
    }

    #[test]
    fn test_placeholders_in_user_text_are_left_alone() {
        let instructions = prepare_instructions("{job_description}", "Use {response_format} {x}");
        assert!(instructions.contains("The job title is: {job_description}\n"));
        assert!(instructions.contains("The job description is: Use {response_format} {x}\n"));
        assert_eq!(instructions.matches("\"overallScore\"").count(), 1);
    }

    #[test]
    fn test_system_prompt_demands_json() {
        assert!(feedback_system().contains("valid JSON only"));
    }
}

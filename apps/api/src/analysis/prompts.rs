// Resume analysis LLM prompt template.

pub const RESUME_ANALYSIS_PROMPT: &str = r#"Analyze the following resume text and return a JSON object containing:
- skills (array of strings)
- summary (string, a concise overview of the candidate's profile)
- experienceHighlights (array of strings, key achievements and responsibilities from work experience)
- education (array of strings, educational qualifications, institutions, and dates)
- overallImpression (string, a brief overall assessment of the resume)

The JSON output should be structured as follows:
{
  "skills": ["skill1", "skill2", ...],
  "summary": "...",
  "experienceHighlights": ["highlight1", "highlight2", ...],
  "education": ["education_detail1", "education_detail2", ...],
  "overallImpression": "..."
}

Return ONLY the JSON object. No code fences, no commentary.

Resume Text:
---
{resume_text}
---
"#;

pub fn build_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_PROMPT.replace("{resume_text}", resume_text)
}

use crate::error::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedJobDescription {
    pub title: String,
    pub required_skills: Vec<String>,
    pub experience_level: String,
    pub tools_technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub skill: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFreeText {
    pub question: String,
    pub skill: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "Medium".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    #[serde(default)]
    pub mcqs: Vec<GeneratedMcq>,
    #[serde(default)]
    pub subjective: Vec<GeneratedFreeText>,
    #[serde(default)]
    pub coding: Vec<GeneratedFreeText>,
}

#[derive(Debug, Clone, Copy)]
pub struct QuestionCounts {
    pub mcq: usize,
    pub subjective: usize,
    pub coding: usize,
}

impl Default for QuestionCounts {
    fn default() -> Self {
        Self {
            mcq: 5,
            subjective: 2,
            coding: 1,
        }
    }
}

impl QuestionCounts {
    pub fn clamped(self) -> Self {
        Self {
            mcq: self.mcq.min(10),
            subjective: self.subjective.min(5),
            coding: self.coding.min(3),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: JsonValue,
    #[serde(default)]
    pub projects: JsonValue,
    #[serde(default)]
    pub education: JsonValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileScores {
    pub skills_score: i32,
    pub experience_score: i32,
    pub projects_score: i32,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Clone)]
pub struct AiService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AiService {
    pub fn new(api_key: String, base_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    /// Extracts structured job metadata from a free-text description,
    /// substituting defaults for anything the model omits.
    pub async fn parse_job_description(&self, description: &str) -> Result<ParsedJobDescription> {
        let system = r#"You are an expert recruiter. Extract structured information from job descriptions.
Return ONLY valid JSON with this exact structure (no markdown, no code block):
{"title":"Job Title","required_skills":["Skill1","Skill2"],"experience_level":"Junior|Mid-level|Senior","tools_technologies":["Tool1","Tool2"]}
- title: Short job title (max 80 chars)
- required_skills: 4-6 key skills/technologies (e.g. React, Python, SQL)
- experience_level: Junior, Mid-level, or Senior
- tools_technologies: 3-5 tools/technologies (e.g. Git, Docker, AWS)"#;
        let user = format!("Extract from this job description:\n\n{}", description);

        let value = self.chat_json(system, &user, 0.3).await?;
        let mut parsed: ParsedJobDescription =
            serde_json::from_value(value).unwrap_or(ParsedJobDescription {
                title: String::new(),
                required_skills: vec![],
                experience_level: String::new(),
                tools_technologies: vec![],
            });

        if parsed.title.is_empty() {
            parsed.title = "Software Engineering Position".to_string();
        }
        if parsed.required_skills.is_empty() {
            parsed.required_skills =
                vec!["Problem Solving".to_string(), "Technical Skills".to_string()];
        }
        if parsed.experience_level.is_empty() {
            parsed.experience_level = "Mid-level".to_string();
        }
        if parsed.tools_technologies.is_empty() {
            parsed.tools_technologies = vec!["Git".to_string(), "VS Code".to_string()];
        }
        Ok(parsed)
    }

    /// Generates the assessment question set for a parsed job. Short-fall
    /// from the model is padded with deterministic fallback questions so the
    /// requested counts always hold.
    pub async fn generate_questions(
        &self,
        parsed: &ParsedJobDescription,
        counts: QuestionCounts,
    ) -> Result<GeneratedQuestions> {
        let counts = counts.clamped();
        let skills = parsed.required_skills.join(", ");
        let level = &parsed.experience_level;

        let system = format!(
            r#"You are an expert technical assessor. Generate UNIQUE, CREATIVE assessment questions for a {level} role.

Return ONLY valid JSON with this exact structure (no markdown, no code block):
{{
  "mcqs": [
    {{"question":"...","options":["A","B","C","D"],"correct_answer":"exact option text","skill":"SkillName","difficulty":"Easy|Medium|Hard"}}
  ],
  "subjective": [
    {{"question":"...","skill":"SkillName","difficulty":"Medium|Hard"}}
  ],
  "coding": [
    {{"question":"Full problem description with example and requirements","skill":"SkillName","difficulty":"Medium|Hard"}}
  ]
}}

Requirements:
- Generate exactly {mcq} MCQs, {subjective} subjective, {coding} coding question(s)
- MCQs: 4 options each, correct_answer must exactly match one option. Cover different skills.
- Subjective: Open-ended questions requiring 2-3 paragraph answers
- Coding: One programming problem with clear example input/output. Specify language if relevant.
- Use varied difficulties based on {level} level
- Be creative - generate NEW questions each time, not generic ones
- Skills should come from: {skills}"#,
            level = level,
            mcq = counts.mcq,
            subjective = counts.subjective,
            coding = counts.coding,
            skills = skills,
        );
        let user = format!(
            "Generate assessment questions for a {} position requiring: {}",
            level, skills
        );

        let value = self.chat_json(&system, &user, 0.9).await?;
        let mut result: GeneratedQuestions = serde_json::from_value(value).unwrap_or_default();

        result.mcqs.truncate(counts.mcq);
        result.subjective.truncate(counts.subjective);
        result.coding.truncate(counts.coding);
        sanitize_mcqs(&mut result.mcqs);
        pad_questions(&mut result, parsed, counts);
        Ok(result)
    }

    /// Parses raw resume text into the structured profile the re-scorer
    /// compares against job requirements.
    pub async fn parse_resume(&self, resume_text: &str) -> Result<ParsedResume> {
        let system = r#"You are an expert resume parser. Extract structured information from the resume text.
Return ONLY valid JSON with this exact structure (no markdown, no code block):
{
  "name": "Full Name",
  "email": "email@example.com",
  "phone": "+1234567890",
  "skills": ["Skill1", "Skill2"],
  "experience": [
    {"role": "Job Title", "company": "Company Name", "years": 2, "description": "Brief description of responsibilities"}
  ],
  "projects": [
    {"name": "Project Name", "tech_stack": ["Tech1", "Tech2"], "description": "What the project does", "impact": "Results/metrics achieved"}
  ],
  "education": [
    {"degree": "Degree Name", "institution": "University Name", "year": "2024"}
  ]
}

Rules:
- Extract ALL skills mentioned (programming languages, frameworks, tools, soft skills)
- For experience, estimate years if not explicitly stated
- For projects, extract tech stack from description if not listed separately
- If a field is not found, use empty string or empty array
- Be thorough - extract every relevant detail"#;
        let truncated: String = resume_text.chars().take(8000).collect();
        let user = format!("Parse this resume:\n\n{}", truncated);

        let value = self.chat_json(system, &user, 0.2).await?;
        let parsed: ParsedResume = serde_json::from_value(value).unwrap_or(ParsedResume {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            skills: vec![],
            experience: JsonValue::Array(vec![]),
            projects: JsonValue::Array(vec![]),
            education: JsonValue::Array(vec![]),
        });
        Ok(parsed)
    }

    /// Scores a candidate's parsed resume against a job's requirements.
    /// Components are clamped to 0..=100 by the caller.
    pub async fn score_profile(
        &self,
        job_title: &str,
        job_skills: &[String],
        job_tools: &[String],
        experience_level: &str,
        candidate_skills: &[String],
        experience: &JsonValue,
        projects: &JsonValue,
    ) -> Result<ProfileScores> {
        let system = r#"You are an expert technical recruiter evaluating a candidate against a job posting.
Score each category 0-100 based on the criteria below.
Return ONLY valid JSON (no markdown):
{
  "skills_score": 0,
  "experience_score": 0,
  "projects_score": 0,
  "reasoning": "Brief explanation of scores"
}

Scoring Criteria:
- skills_score: How well do the candidate's skills match the required skills and tools?
- experience_score: Years of relevant experience, role relevance, career progression, company quality.
- projects_score: Project complexity, tech stack alignment, real-world impact, innovation.
Be fair but rigorous. A perfect score (90+) should be rare."#;
        let user = format!(
            "Job: {}\nRequired Skills: {}\nTools: {}\nLevel: {}\n\nCandidate Skills: {}\nExperience: {}\nProjects: {}",
            job_title,
            job_skills.join(", "),
            job_tools.join(", "),
            experience_level,
            candidate_skills.join(", "),
            experience,
            projects,
        );

        let value = self.chat_json(system, &user, 0.3).await?;
        let scores: ProfileScores = serde_json::from_value(value).unwrap_or(ProfileScores {
            skills_score: 0,
            experience_score: 0,
            projects_score: 0,
            reasoning: String::new(),
        });
        Ok(scores)
    }

    /// One-to-two sentence dashboard summary of a candidate.
    pub async fn generate_summary(
        &self,
        name: &str,
        skills: &[String],
        experience: &JsonValue,
        projects: &JsonValue,
        education: &JsonValue,
    ) -> Result<String> {
        let system = "Write a 1-2 sentence professional summary of this candidate for a recruiter dashboard. Be concise and factual. Return ONLY the summary text, no JSON, no quotes.";
        let user = format!(
            "Name: {}\nSkills: {}\nExperience: {}\nProjects: {}\nEducation: {}",
            name,
            skills.join(", "),
            experience,
            projects,
            education,
        );

        let text = self.chat_text(system, &user, 0.4).await?;
        if text.is_empty() {
            Ok("No summary available.".to_string())
        } else {
            Ok(text)
        }
    }

    async fn chat_json(&self, system: &str, user: &str, temperature: f32) -> Result<JsonValue> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "response_format": { "type": "json_object" },
            "temperature": temperature
        });
        let content = self.send(payload).await?;
        let cleaned = strip_code_fences(&content);
        Ok(serde_json::from_str(cleaned).unwrap_or(JsonValue::Null))
    }

    async fn chat_text(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": temperature
        });
        let content = self.send(payload).await?;
        Ok(content.trim().to_string())
    }

    async fn send(&self, payload: JsonValue) -> Result<String> {
        #[derive(Deserialize)]
        struct RespChoiceMsg {
            content: String,
        }
        #[derive(Deserialize)]
        struct RespChoice {
            message: RespChoiceMsg,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<RespChoice>,
        }

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;
        let body = resp.json::<Resp>().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// The correct answer of a stored MCQ must equal one of its options.
fn sanitize_mcqs(mcqs: &mut [GeneratedMcq]) {
    for mcq in mcqs {
        if mcq.options.is_empty() {
            mcq.options = vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ];
        }
        if !mcq.options.contains(&mcq.correct_answer) {
            mcq.correct_answer = mcq.options[0].clone();
        }
    }
}

fn pad_questions(result: &mut GeneratedQuestions, parsed: &ParsedJobDescription, counts: QuestionCounts) {
    let lead_skill = parsed
        .required_skills
        .first()
        .cloned()
        .unwrap_or_else(|| "General".to_string());

    while result.mcqs.len() < counts.mcq {
        result.mcqs.push(GeneratedMcq {
            question: format!(
                "Explain a key concept in {}.",
                parsed
                    .required_skills
                    .first()
                    .map(String::as_str)
                    .unwrap_or("software development")
            ),
            options: vec![
                "Option A".to_string(),
                "Option B".to_string(),
                "Option C".to_string(),
                "Option D".to_string(),
            ],
            correct_answer: "Option A".to_string(),
            skill: lead_skill.clone(),
            difficulty: "Medium".to_string(),
        });
    }

    while result.subjective.len() < counts.subjective {
        result.subjective.push(GeneratedFreeText {
            question: "Describe your approach to problem-solving in technical projects."
                .to_string(),
            skill: "Problem Solving".to_string(),
            difficulty: "Medium".to_string(),
        });
    }

    while result.coding.len() < counts.coding {
        result.coding.push(GeneratedFreeText {
            question:
                "Write a function that takes an array of numbers and returns the sum of all positive numbers."
                    .to_string(),
            skill: lead_skill.clone(),
            difficulty: "Medium".to_string(),
        });
    }
}

fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn sanitized_mcq_correct_answer_is_always_an_option() {
        let mut mcqs = vec![GeneratedMcq {
            question: "q".into(),
            options: vec!["x".into(), "y".into()],
            correct_answer: "not-an-option".into(),
            skill: "SQL".into(),
            difficulty: "Easy".into(),
        }];
        sanitize_mcqs(&mut mcqs);
        assert_eq!(mcqs[0].correct_answer, "x");
    }

    #[test]
    fn padding_fills_requested_counts() {
        let parsed = ParsedJobDescription {
            title: "t".into(),
            required_skills: vec!["React".into()],
            experience_level: "Senior".into(),
            tools_technologies: vec![],
        };
        let mut result = GeneratedQuestions::default();
        pad_questions(&mut result, &parsed, QuestionCounts::default());
        assert_eq!(result.mcqs.len(), 5);
        assert_eq!(result.subjective.len(), 2);
        assert_eq!(result.coding.len(), 1);
        assert!(result.mcqs[0].options.contains(&result.mcqs[0].correct_answer));
    }
}

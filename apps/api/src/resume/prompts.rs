// All LLM prompt constants for the resume module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for profile extraction — enforces JSON-only output.
pub const PROFILE_EXTRACT_SYSTEM: &str = "You are a precise resume analyst preparing a \
    candidate for interviews. Extract structured information from resume text. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Profile extraction prompt template.
/// Replace: {resume_text}, {jd_section}, {role_section}.
pub const PROFILE_EXTRACT_PROMPT_TEMPLATE: &str = r#"Analyze this resume and extract key information for interview preparation.

Resume:
{resume_text}
{jd_section}{role_section}
Extract and return ONLY a JSON object with this structure:
{
  "skills": ["skill1", "skill2"],
  "yearsOfExperience": 5,
  "domains": ["domain1", "domain2"],
  "strengths": ["strength1", "strength2"],
  "gaps": ["gap1", "gap2"],
  "targetRole": "inferred or provided role"
}

Guidelines:
- skills: Technical and soft skills mentioned (max 15)
- yearsOfExperience: Total years of professional experience
- domains: Industries or areas of expertise (e.g., "E-commerce", "Healthcare", "FinTech")
- strengths: Key achievements and strong areas based on the resume
- gaps: Skills or experiences mentioned in the job description but missing/weak in the resume
- targetRole: The role they're applying for or best suited for"#;

/// Bullet enhancement prompt template.
/// Replace: {position}, {company}, {bullet}.
pub const ENHANCE_BULLET_PROMPT_TEMPLATE: &str = r#"You are a professional resume writer. Enhance this bullet point to be more impactful and ATS-friendly.

Position: {position}
Company: {company}
Original bullet point: {bullet}

Requirements:
1. Start with a strong action verb
2. Include quantifiable metrics if possible (or suggest where to add them)
3. Highlight impact and results
4. Keep it concise (1-2 lines)
5. Use industry keywords
6. Make it ATS-scannable

Respond in JSON format:
{
  "enhanced": "the enhanced bullet point",
  "reason": "brief explanation of changes made"
}

Only return the JSON, no other text."#;

/// Project description enhancement prompt template.
/// Replace: {project_name}, {tech_stack}, {description}.
pub const ENHANCE_PROJECT_PROMPT_TEMPLATE: &str = r#"You are a professional resume writer. Enhance this project description to be more compelling.

Project: {project_name}
Tech Stack: {tech_stack}
Original description: {description}

Requirements:
1. Highlight technical complexity
2. Emphasize problem-solving
3. Show impact or results
4. Keep it concise (2-3 lines max)
5. Use technical keywords

Respond in JSON format:
{
  "enhanced": "the enhanced description",
  "reason": "brief explanation of changes made"
}

Only return the JSON, no other text."#;

/// Skill suggestion prompt template.
/// Replace: {position}, {current_skills}, {experience_summary}.
pub const SUGGEST_SKILLS_PROMPT_TEMPLATE: &str = r#"You are a career advisor. Suggest relevant skills to add based on the candidate's profile.

Target Position: {position}
Current Skills: {current_skills}
Experience Summary: {experience_summary}

Suggest 5-10 relevant skills that:
1. Are commonly required for this position
2. Complement existing skills
3. Are in-demand in the industry
4. Are ATS-friendly keywords

Respond in JSON format:
{
  "skills": ["skill1", "skill2", "skill3"]
}

Only return the JSON, no other text."#;

/// ATS analysis prompt template.
/// Replace: {target_role}, {resume_text}.
pub const ATS_SCORE_PROMPT_TEMPLATE: &str = r#"You are an ATS (Applicant Tracking System) expert. Analyze this resume for ATS optimization.

Target Role: {target_role}
Resume Content: {resume_text}

Provide:
1. ATS compatibility score (0-100)
2. Top 5 improvement suggestions
3. Missing keywords for this role

Respond in JSON format:
{
  "score": 85,
  "suggestions": ["suggestion1", "suggestion2"],
  "keywords": ["keyword1", "keyword2"]
}

Only return the JSON, no other text."#;

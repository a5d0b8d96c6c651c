/// System instruction for the knowledge transfer analysis
pub const SYSTEM_PROMPT: &str = "You are an expert knowledge management analyst evaluating exit interview transcripts for organizational knowledge transfer. Always respond with valid JSON only, no additional text.";

/// Build the user prompt for one interview
pub fn build_summary_prompt(transcript: &str, candidate_name: &str, position: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Analyze the following exit interview transcript for knowledge transfer documentation. \
         The employee {} held the position of {} and is leaving the company.\n\n",
        candidate_name, position
    ));

    prompt.push_str("Transcript:\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");

    prompt.push_str(
        "Please provide a detailed analysis in the following JSON format focused on knowledge \
         transfer and documentation. Make sure the JSON is valid and properly formatted:\n\n",
    );
    prompt.push_str(
        r#"{
  "keyPoints": "A comprehensive summary of the employee's work history, projects, technical knowledge, processes, and undocumented insights that should be preserved for the organization. Use bullet points or numbered list format.",
  "knowledgeTransfer": "Identify critical knowledge, processes, and insights that need to be documented or transferred to successors. Include any unique skills, workarounds, or institutional knowledge mentioned.",
  "documentationGaps": "Highlight areas where additional documentation or clarification would be valuable for knowledge preservation. Note any incomplete explanations or areas needing further detail.",
  "successorRecommendations": "Provide recommendations for successors taking over this role, including training needs, key contacts, and important processes to learn.",
  "organizationalValue": "Assess the value of the knowledge shared and its importance for organizational continuity and future projects."
}"#,
    );
    prompt.push_str("\n\nRespond ONLY with valid JSON. Do not include any text before or after the JSON.");

    prompt
}

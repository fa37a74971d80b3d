use crate::state::UserProfile;

/// Build the prompt sent to the generation service.
///
/// Every free-text field is passed through untouched, so the model sees
/// exactly what the user typed or pasted.
pub fn compose_prompt(profile: &UserProfile, job_description: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Generate a professional cover letter for ");
    prompt.push_str(&profile.name);
    prompt.push_str(" applying for the following job:\n\n");

    prompt.push_str("Job Description:\n");
    prompt.push_str(job_description);
    prompt.push_str("\n\n");

    prompt.push_str("Candidate's Skills:\n");
    prompt.push_str(&profile.skills);
    prompt.push_str("\n\n");

    prompt.push_str("Relevant Experience:\n");
    prompt.push_str(&profile.experience);
    prompt.push_str("\n\n");

    prompt.push_str("Please write a compelling cover letter that highlights the candidate's ");
    prompt.push_str("skills and experience in relation to the job requirements.");

    prompt
}

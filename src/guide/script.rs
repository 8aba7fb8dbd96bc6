//! Avatar scripts and advisor prompts.
//!
//! Everything the collaborators are asked to say or answer is rendered
//! here, from Handlebars templates with the step text (and friends)
//! substituted. Keeping the wording in one place keeps cache artifacts
//! stable across callers.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::json;

/// Spoken by the avatar when the application starts.
const WELCOME_SCRIPT: &str = "Welcome to FoldGuide! I'm your origami instructor, and I'll guide \
you through creating beautiful paper art step by step. You can ask me for help anytime you get \
stuck, or use the controls to navigate. Let's get started!";

const STEP_SCRIPT: &str = "Let me explain this step. {{step}} Make sure to align the folds \
carefully. Take your time with this step.";

const HELP_SCRIPT: &str = "I see you're having trouble with this step: {{step}}. Don't worry, \
this is a common place to get stuck. Try checking that your previous folds are precise, and \
make sure the paper is properly aligned. Take it slowly and be gentle with the paper. If you're \
still having issues, we can go back to the previous step and try again.";

const EXPLAIN_PROMPT: &str = "You are an expert origami instructor. Explain this step in detail:

Step: {{step}}

Provide a clear, detailed explanation that would help a beginner understand exactly what to do.";

const TROUBLESHOOT_PROMPT: &str = "A user is stuck on this origami step:

Step: {{step}}

Provide troubleshooting advice including:
1. Common mistakes at this step
2. How to identify if the fold is correct
3. Remedial actions (e.g., \"try refolding the top corner\")
4. A simple check to confirm they're back on track";

const IMAGE_PROMPT: &str = "I'm working on an origami project and I'm stuck at this step:

Current step: {{step}}

Explanation of this step: {{explanation}}

User description of the problem: {{description}}

Please analyze the image of my current progress and:
1. Identify what might be going wrong
2. Explain exactly how to fix it
3. Provide clear, specific guidance on the correct folding technique
4. Describe what the result should look like when done correctly

Respond with specific, actionable advice that directly addresses what's visible in the image.";

fn render(template: &str, data: &serde_json::Value) -> Result<String> {
    let mut hbs = Handlebars::new();
    hbs.set_strict_mode(false);
    hbs.render_template(template, data)
        .context("Failed to render script template")
}

/// The fixed welcome script.
pub fn welcome_script() -> &'static str {
    WELCOME_SCRIPT
}

/// Script spoken by the avatar for a single step.
pub fn step_script(step: &str) -> Result<String> {
    render(STEP_SCRIPT, &json!({ "step": step }))
}

/// Script spoken by the avatar when the user asks for help.
pub fn help_script(step: &str) -> Result<String> {
    render(HELP_SCRIPT, &json!({ "step": step }))
}

/// Advisor prompt for a detailed step explanation.
pub fn explain_prompt(step: &str) -> Result<String> {
    render(EXPLAIN_PROMPT, &json!({ "step": step }))
}

/// Advisor prompt for troubleshooting a step.
pub fn troubleshoot_prompt(step: &str) -> Result<String> {
    render(TROUBLESHOOT_PROMPT, &json!({ "step": step }))
}

/// Advisor prompt for image-grounded troubleshooting.
pub fn image_prompt(step: &str, explanation: &str, description: &str) -> Result<String> {
    render(
        IMAGE_PROMPT,
        &json!({
            "step": step,
            "explanation": explanation,
            "description": description,
        }),
    )
}

//! Seed prompts.
//!
//! The few-shot preamble shows the model the line protocol once, with the
//! same `Tho`/`Act`/`Obs` tags the controller writes.

/// Worked example prepended to every question when few-shot seeding is on.
pub const FEW_SHOT_PREAMBLE: &str = "\
What is the elevation range for the area that the eastern sector of the Colorado orogeny extends into?
Tho 1: I need to search Colorado orogeny, find the area that the eastern sector of the Colorado ...
Act 2: Search 'Colorado orogeny'
Obs 2: The Colorado orogeny was an episode of mountain building (an orogeny) ...
Tho 3: It does not mention the eastern sector. So I need to look up eastern sector.
...
Tho 4: High Plains rise in elevation from around 1,800 to 7,000 ft, so the answer is 1,800 to 7,000 ft.
Act 5: Finish '1,800 to 7,000 ft'";

/// Build the initial transcript text for `question`.
pub fn seed_prompt(question: &str, few_shot: bool) -> String {
    if few_shot {
        format!("{FEW_SHOT_PREAMBLE}\n{question}")
    } else {
        question.to_string()
    }
}

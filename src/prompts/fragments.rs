//! Fixed text fragments wrapped around context and instructions

pub const STORE_CONTEXT_LABEL: &str = "Store Context:\n";
pub const DATA_SOURCE_CONTEXT_LABEL: &str = "Data Source Context:\n";
pub const REFERENCE_IMAGE_LABEL: &str = "Reference Image:";

/// Appended when the page must load dynamic data through the storefront API
pub const CAPABILITY_NOTE: &str = "IMPORTANT IMPLEMENTATION NOTE: When generating the HTML and \
JavaScript, DO NOT hardcode dynamic data (like product names, prices, descriptions, category \
lists, etc.) or actions (like add to cart). Instead, implement the necessary logic using the \
store's GraphQL API. Assume the GraphQL endpoint is available at '/graphql'. Use appropriate \
queries and mutations for data fetching and actions.";

pub fn store_context(context: &str) -> String {
    format!("{STORE_CONTEXT_LABEL}{context}")
}

pub fn data_source_context(context: &str) -> String {
    format!("{DATA_SOURCE_CONTEXT_LABEL}{context}")
}

pub fn styling_reference(config: &str) -> String {
    format!("Styling Reference (for reference only):\n```javascript\n{config}\n```")
}

pub fn design_plan(plan: &str) -> String {
    format!("Technical Design Plan:\n{plan}")
}

/// Current HTML for the improve stage; blank content is shown as `(empty)`
pub fn current_html(html: Option<&str>) -> String {
    let html = html.filter(|h| !h.trim().is_empty()).unwrap_or("(empty)");
    format!("Current HTML Block:\n{html}")
}

/// Design-stage instruction: the content goal plus the user's own wording
pub fn design_instruction(goal: &str, custom_prompt: &str) -> String {
    let mut instruction = format!("Content Goal: {goal}\n");
    if !custom_prompt.trim().is_empty() {
        instruction.push_str(&format!("User's Custom Instructions: {custom_prompt}\n"));
    }
    instruction.trim().to_string()
}

pub fn render_instruction(goal: &str) -> String {
    format!("Content Goal: {goal}")
}

/// Render instruction for a retry, with the extra instructions for this attempt
pub fn retry_instruction(goal: &str, extra: &str) -> String {
    let mut instruction = render_instruction(goal);
    if !extra.trim().is_empty() {
        instruction.push_str(&format!(
            "\n\nAdditional User Instructions for this attempt:\n{extra}"
        ));
    }
    instruction
}

pub fn improve_instruction(goal: &str, request: &str) -> String {
    format!("Content Goal: {goal}\n\nUser's Improvement Request:\n{request}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_instruction() {
        assert_eq!(
            design_instruction("Sell it.", "Use a dark theme"),
            "Content Goal: Sell it.\nUser's Custom Instructions: Use a dark theme"
        );
        assert_eq!(design_instruction("Sell it.", "  "), "Content Goal: Sell it.");
    }

    #[test]
    fn test_retry_instruction() {
        assert_eq!(retry_instruction("Goal", ""), "Content Goal: Goal");
        assert_eq!(
            retry_instruction("Goal", "Bigger hero"),
            "Content Goal: Goal\n\nAdditional User Instructions for this attempt:\nBigger hero"
        );
    }

    #[test]
    fn test_current_html_placeholder() {
        assert_eq!(current_html(None), "Current HTML Block:\n(empty)");
        assert_eq!(current_html(Some(" ")), "Current HTML Block:\n(empty)");
        assert_eq!(current_html(Some("<p>x</p>")), "Current HTML Block:\n<p>x</p>");
    }

    #[test]
    fn test_styling_reference() {
        assert_eq!(
            styling_reference("module.exports = {}"),
            "Styling Reference (for reference only):\n```javascript\nmodule.exports = {}\n```"
        );
    }
}

//! Embedded prompt templates.
//!
//! Templates use `{{name}}` placeholders and are filled by [`render`].

pub const PLANNER_SYSTEM: &str = include_str!("../prompts/planner_system.md");
pub const PLANNER_USER: &str = include_str!("../prompts/planner_user.md");
pub const WRITER_SYSTEM: &str = include_str!("../prompts/writer_system.md");
pub const WRITER_USER: &str = include_str!("../prompts/writer_user.md");

/// Fill `{{name}}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so a task that happens to contain
/// `{{content}}` is passed through literally. Unknown placeholders are left
/// as they are. Trailing whitespace of the template is trimmed.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let template = template.trim_end();
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match vars.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// Terminal output helpers

use colored::Colorize;

use crate::domain::object::ConfigObject;

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

/// Dump an object about to be created: class, DN, then one line per attribute
pub fn print_object(object: &ConfigObject) {
    println!("{} {}", object.class_name.bright_magenta(), object.dn.as_str().bold());
    for line in object_lines(object) {
        println!("{}", line.dimmed());
    }
}

/// Labelled bullet list, nothing when empty
pub fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", format!("{}:", label).bright_cyan());
    for item in items {
        println!("  • {}", item);
    }
}

fn object_lines(object: &ConfigObject) -> Vec<String> {
    object
        .attrs
        .iter()
        .map(|(name, values)| format!("    {} = {}", name, values.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::object::EntityClass;

    #[test]
    fn test_object_lines() {
        let object = ConfigObject::new(
            EntityClass::NodeGroup,
            "safAmfNodeGroup=G,safAmfCluster=c",
            "safAmfNodeGroup",
        )
        .with_values("saAmfNGNodeList", ["a", "b"]);
        assert_eq!(
            object_lines(&object),
            vec![
                "    saAmfNGNodeList = a, b".to_string(),
                "    safAmfNodeGroup = safAmfNodeGroup=G".to_string(),
            ]
        );
    }
}

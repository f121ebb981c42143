// src/cli/help.rs

/// Replaces the semantic tags of a help template (`<title>`, `<cmd>`, ...)
/// with ANSI styles, or strips them when colours are disabled.
pub fn stylize(template: &str) -> String {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset)
}

/// The clap help template. Leaked once, clap needs it for the whole run.
pub fn cli_help_template() -> &'static str {
    Box::leak(stylize(t!("cli.help.template")).into_boxed_str())
}

/// Usage and the list of scripts the toolkit offers.
pub fn scripts_help(bin: &str, script_names: &[String]) -> String {
    let scripts = if script_names.is_empty() {
        format!("  {}", t!("cli.help.no_scripts"))
    } else {
        script_names
            .iter()
            .map(|name| format!("  <cmd>{}</cmd>", name))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let message = format!(t!("cli.help.scripts"), bin = bin, scripts = scripts);
    format!("\n{}\n", stylize(message.trim()))
}

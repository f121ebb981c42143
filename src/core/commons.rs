// Helper function to wrap a string in quotes and escape internal quotes.
pub fn wrap_value(value: &str) -> String {
    // Escape any existing double quotes and then wrap the whole string in double quotes.
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Returns a copy of `args` where the first occurrence of the first matching
/// name in `names` is replaced by `new_name`. The input is never mutated.
///
/// ```
/// use scriptkit::core::commons::replace_argument_name;
/// let args = vec!["--a".to_string(), "--b".to_string()];
/// assert_eq!(replace_argument_name(&args, &["--a"], "--c"), vec!["--c", "--b"]);
/// ```
pub fn replace_argument_name(args: &[String], names: &[&str], new_name: &str) -> Vec<String> {
    let mut new_args = args.to_vec();
    for name in names {
        if let Some(slot) = new_args.iter_mut().find(|arg| arg.as_str() == *name) {
            *slot = new_name.to_string();
            return new_args;
        }
    }
    new_args
}

/// Whether `args` contains the flag `name` exactly.
pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

/// Arguments that are neither flags nor flag values. A `--flag` without `=`
/// takes the next argument as its value unless that one is a flag too.
pub fn positional_args(args: &[String]) -> Vec<&str> {
    let mut positional = Vec::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            positional.extend(iter.map(String::as_str));
            break;
        }
        if arg.starts_with('-') {
            let takes_value = !arg.contains('=') && !arg.starts_with("--no-");
            if takes_value && iter.peek().is_some_and(|next| !next.starts_with('-')) {
                iter.next();
            }
            continue;
        }
        positional.push(arg.as_str());
    }
    positional
}

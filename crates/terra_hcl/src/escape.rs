//! String literal escaping for HCL double-quoted strings.

/// Escape a string value for safe embedding in an HCL double-quoted string.
///
/// Replacements run in a fixed order. The backslash goes first so the
/// backslashes introduced by later steps are not escaped twice.
///
/// | input        | output  |
/// |--------------|---------|
/// | `\`          | `\\`    |
/// | `"`          | `\"`    |
/// | newline      | `\n`    |
/// | carriage ret | `\r`    |
/// | tab          | `\t`    |
/// | `${`         | `$${`   |
///
/// The last step doubles the dollar sign so Terraform never interpolates a
/// user-supplied value. A lone `$` or `{` is left alone.
pub fn escape_hcl_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace("${", "$${")
}

/// Wrap an escaped value in double quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape_hcl_string(value))
}

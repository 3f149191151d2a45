//! Section scoping for author-supplied stylesheet text.
//!
//! Custom rules from every section end up in the same document, so each
//! selector is prefixed with an attribute selector naming its section. The
//! rewrite is a single-level split on `}`: at-rules are passed through whole
//! and their inner selectors stay unscoped.

/// Attribute selector matching the rendered subtree of `section_id`.
pub fn scope_token(section_id: &str) -> String {
    format!("[data-section-id=\"{}\"]", section_id)
}

/// Prefix every selector in `css` with the scope token for `section_id`.
///
/// Applying this twice yields the same text as applying it once.
pub fn scope_css(css: &str, section_id: &str) -> String {
    let token = scope_token(section_id);
    let chunks: Vec<&str> = css.split('}').collect();
    let last = chunks.len().saturating_sub(1);
    let mut rules = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let terminated = i < last;
        if chunk.trim().is_empty() {
            // A bare `}` closing an at-rule block
            if terminated {
                rules.push("}".to_string());
            }
            continue;
        }
        rules.push(scope_rule(chunk, &token, terminated));
    }

    rules.join("\n")
}

fn scope_rule(chunk: &str, token: &str, terminated: bool) -> String {
    let close = if terminated { "}" } else { "" };
    let Some(open) = chunk.find('{') else {
        // Not a rule; keep the author's text rather than dropping it
        return format!("{}{}", chunk.trim(), close);
    };

    let (selectors, block) = chunk.split_at(open);
    let selectors = selectors.trim();
    if selectors.starts_with('@') {
        return format!("{}{}{}", selectors, block, close);
    }

    let scoped = selectors
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.contains(token) {
                s.to_string()
            } else {
                format!("{} {}", token, s)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("{} {}{}", scoped, block, close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_each_selector() {
        let out = scope_css("h1, p { color: red }", "s1");
        assert_eq!(
            out,
            "[data-section-id=\"s1\"] h1, [data-section-id=\"s1\"] p { color: red }"
        );
    }

    #[test]
    fn declaration_block_is_untouched() {
        let css = ".a>b{ background: url(x.png) ; color : blue }";
        let out = scope_css(css, "s9");
        assert!(out.ends_with("{ background: url(x.png) ; color : blue }"));
        assert!(out.starts_with("[data-section-id=\"s9\"] .a>b "));
    }

    #[test]
    fn scoping_is_idempotent() {
        let css = "h1, p { color: red }\n.x { margin: 0 } @media (min-width:1px){p{color:red}} tail";
        let once = scope_css(css, "s1");
        assert_eq!(scope_css(&once, "s1"), once);
    }

    #[test]
    fn at_rules_pass_through() {
        let out = scope_css("@media (min-width:1px){p{color:red}}", "s1");
        assert!(out.starts_with("@media (min-width:1px){p{color:red}"));
        assert!(!out.contains("data-section-id"));
        assert_eq!(out.matches('{').count(), out.matches('}').count());
    }

    #[test]
    fn multiple_rules_are_line_separated() {
        let out = scope_css("a{x:1} b{y:2}", "id");
        assert_eq!(
            out,
            "[data-section-id=\"id\"] a {x:1}\n[data-section-id=\"id\"] b {y:2}"
        );
    }

    #[test]
    fn malformed_chunks_are_kept() {
        let out = scope_css("color: red} p{x:1}", "s1");
        assert_eq!(out, "color: red}\n[data-section-id=\"s1\"] p {x:1}");
    }

    #[test]
    fn other_sections_are_scoped_again() {
        let once = scope_css("p { x: 1 }", "a");
        let out = scope_css(&once, "b");
        assert!(out.starts_with("[data-section-id=\"b\"] [data-section-id=\"a\"] p"));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(scope_css("", "s1"), "");
        assert_eq!(scope_css("  \n ", "s1"), "");
    }
}

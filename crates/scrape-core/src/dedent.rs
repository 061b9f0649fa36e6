//! Common-indentation removal for captured program text

fn is_indent(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_blank(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']).chars().all(is_indent)
}

/// Strip the whitespace prefix shared by every non-blank line.
///
/// Lines holding only spaces and tabs are emptied and ignored when working
/// out the margin. Line terminators are kept as they are.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.split_inclusive('\n').filter(|l| !is_blank(l)) {
        let indent_len = line.len() - line.trim_start_matches(is_indent).len();
        let indent = &line[..indent_len];

        margin = Some(match margin {
            None => indent,
            Some(current) => {
                let common = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..common]
            }
        });
    }

    let margin = margin.unwrap_or("");
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        if is_blank(line) {
            let body_len = line.trim_end_matches(['\n', '\r']).len();
            out.push_str(&line[body_len..]);
        } else {
            out.push_str(&line[margin.len()..]);
        }
    }

    out
}

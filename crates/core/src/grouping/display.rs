//! Human-readable names for release names.

/// Display name of a release: title-cased, underscores read as spaces when
/// they outnumber spaces, cut before the first `(`.
pub fn display_name(name: &str) -> String {
    let mut display = title_case(name);

    let underscores = display.matches('_').count();
    let spaces = display.matches(' ').count();
    if underscores > spaces {
        display = display.replace('_', " ");
    }

    if let Some(ix) = display.find('(') {
        display = display[..ix].trim().to_string();
    }

    display
}

/// Uppercase every cased letter that follows an uncased character and
/// lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        let cased = c.is_uppercase() || c.is_lowercase();
        if cased && previous_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}

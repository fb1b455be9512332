use crate::models::GuestMatch;

/// Escape text for insertion into HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}

/// Plain-text detail line for a match
pub fn match_meta(guest: &GuestMatch) -> String {
    let mut meta = format!(
        "DOB: {} • ZIP: {} • Phone: {}",
        guest.dob,
        or_dash(&guest.zip),
        or_dash(&guest.phone)
    );
    if let Some(email) = guest.known_email() {
        meta.push_str(" • Email: ");
        meta.push_str(email);
    }
    meta
}

/// Result list items for the lookup screen
///
/// Every registry-supplied value is escaped. Rows carry their position in
/// `data-index` so the select action can find the match again.
pub fn render_results(matches: &[GuestMatch]) -> String {
    if matches.is_empty() {
        return concat!(
            r#"<li class="result-item"><div><strong>No matches found.</strong>"#,
            r#"<div class="meta">You can continue as a new guest.</div></div></li>"#
        )
        .to_string();
    }

    matches
        .iter()
        .enumerate()
        .map(|(index, guest)| {
            format!(
                concat!(
                    r#"<li class="result-item" data-index="{}"><div>"#,
                    r#"<div><strong>{} {}</strong></div>"#,
                    r#"<div class="meta">{}</div>"#,
                    r#"</div><button type="button">Select</button></li>"#
                ),
                index,
                escape_html(&guest.first_name),
                escape_html(&guest.last_name),
                escape_html(&match_meta(guest)),
            )
        })
        .collect()
}

//! Welcome email composition

use super::OutgoingEmail;
use humn_common::config::{IntegrationsConfig, SITE_URL};

/// Welcome email for a newly registered person
pub fn welcome_email(config: &IntegrationsConfig, name: &str, email: &str) -> OutgoingEmail {
    OutgoingEmail {
        from: config.email_from.clone(),
        to: email.to_string(),
        cc: config.email_cc.clone(),
        reply_to: config.email_cc.clone(),
        subject: format!("Welcome to HUM人N, {}!", name),
        html: welcome_html(name),
    }
}

fn welcome_html(name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><title>Welcome to HUM人N</title></head>
  <body>
    <h1>Welcome, {name}!</h1>
    <p>I'm thrilled to have you join us on this journey. As AI reshapes our world, we're here to help you rediscover what makes you uniquely human.</p>
    <p>In the coming days I'll personally review your registration and activate your account. You'll hear from me again when everything is ready.</p>
    <p>With excitement,<br><strong>Johnny</strong></p>
    <p><a href="{site}">HUM人N - A Movement for the Age of AI</a></p>
  </body>
</html>
"#,
        name = escape_html(name),
        site = SITE_URL,
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

//! Email templates.
//!
//! Plain string templates for the two messages the service sends: the
//! account activation code and the event reminder. User-supplied text is
//! HTML-escaped before it lands in the HTML body.

use crate::types::{EmailMessage, PlannerEvent};

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Builds the activation email carrying the activation code.
pub fn activation_email(
    app_name: &str,
    name: &str,
    email: &str,
    activation_code: &str,
    ttl_minutes: i64,
) -> EmailMessage {
    let subject = format!("Activate your {app_name} account");

    let text_body = format!(
        "Hello {name},\n\n\
         Thank you for registering with {app_name}.\n\
         Your activation code is: {activation_code}\n\n\
         The code expires in {ttl_minutes} minutes.\n"
    );

    let html_body = format!(
        "<html><body>\
         <p>Hello {name},</p>\
         <p>Thank you for registering with {app}.</p>\
         <p>Your activation code is: <strong>{code}</strong></p>\
         <p>The code expires in {ttl_minutes} minutes.</p>\
         </body></html>",
        name = escape_html(name),
        app = escape_html(app_name),
        code = escape_html(activation_code),
    );

    EmailMessage {
        to: email.to_string(),
        subject,
        html_body,
        text_body,
    }
}

/// Builds the reminder email for an upcoming event.
pub fn reminder_email(app_name: &str, event: &PlannerEvent) -> EmailMessage {
    let greeting = event.user_name.as_deref().unwrap_or("there");
    let when = event.starts_at.format("%A, %B %-d %Y at %H:%M UTC").to_string();
    let subject = format!("Reminder: {} ({when})", event.title);

    let mut text_body = format!(
        "Hello {greeting},\n\n\
         This is a reminder from {app_name} about your upcoming event.\n\n\
         {title}\nWhen: {when}\n",
        title = event.title,
    );
    if let Some(location) = &event.location {
        text_body.push_str(&format!("Where: {location}\n"));
    }
    if let Some(description) = &event.description {
        text_body.push_str(&format!("\n{description}\n"));
    }

    let mut html_body = format!(
        "<html><body>\
         <p>Hello {greeting},</p>\
         <p>This is a reminder from {app} about your upcoming event.</p>\
         <h2>{title}</h2>\
         <p><strong>When:</strong> {when}</p>",
        greeting = escape_html(greeting),
        app = escape_html(app_name),
        title = escape_html(&event.title),
    );
    if let Some(location) = &event.location {
        html_body.push_str(&format!(
            "<p><strong>Where:</strong> {}</p>",
            escape_html(location)
        ));
    }
    if let Some(description) = &event.description {
        html_body.push_str(&format!("<p>{}</p>", escape_html(description)));
    }
    html_body.push_str("</body></html>");

    EmailMessage {
        to: event.user_email.clone(),
        subject,
        html_body,
        text_body,
    }
}

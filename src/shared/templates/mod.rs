//! Email and prompt templates.
//!
//! Templates live in `templates/` and use Jinja2 syntax. Emails come in pairs:
//! `emails/<name>.html.jinja` and `emails/<name>.txt.jinja`.
//!
//! # Usage
//!
//! ```ignore
//! use minijinja::context;
//! use crate::shared::templates::render_email;
//!
//! let email = render_email("contact", context! { name => "Alice", ... })?;
//! ```

pub mod engine;

pub use engine::{render_template, TemplateError};

use minijinja::context;
use serde::Serialize;

use crate::shared::constants::ASSISTANT_NAME;

/// HTML and plain-text bodies of one email
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// Render both bodies of the email template pair `emails/<name>.*.jinja`
pub fn render_email<S: Serialize>(name: &str, ctx: S) -> Result<RenderedEmail, TemplateError> {
    let ctx = minijinja::Value::from_serialize(&ctx);
    let html = render_template(&format!("emails/{}.html.jinja", name), &ctx)?;
    let text = render_template(&format!("emails/{}.txt.jinja", name), &ctx)?;
    Ok(RenderedEmail { html, text })
}

/// Render the support-chat system prompt
pub fn render_chat_system_prompt(
    site_title: &str,
    visitor_name: Option<&str>,
) -> Result<String, TemplateError> {
    render_template(
        "prompts/chat/system.jinja",
        context! {
            assistant_name => ASSISTANT_NAME,
            site_title => site_title,
            visitor_name => visitor_name,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_prompt_names_assistant_and_site() {
        let prompt = render_chat_system_prompt("Mad2Moi Blog", None).unwrap();
        assert!(prompt.starts_with("You are Sarah, a helpful customer support assistant for Mad2Moi Blog."));
        assert!(!prompt.contains("visitor's name"));
    }

    #[test]
    fn test_chat_prompt_includes_visitor_name() {
        let prompt = render_chat_system_prompt("Blog", Some("Alice")).unwrap();
        assert!(prompt.contains("The visitor's name is Alice."));
    }

    #[test]
    fn test_render_email_pair() {
        let email = render_email(
            "newsletter_welcome",
            context! {
                name => None::<String>,
                email => "reader@example.com",
                site_title => "Mad2Moi Blog",
                site_url => "https://mad2moi.com",
            },
        )
        .unwrap();
        assert!(email.html.contains("Cher lecteur"));
        assert!(email.text.contains("reader@example.com"));
        assert!(email.text.contains("https://mad2moi.com"));
    }

    #[test]
    fn test_render_email_unknown_pair() {
        assert!(matches!(
            render_email("nope", context! {}),
            Err(TemplateError::NotFound(_))
        ));
    }
}

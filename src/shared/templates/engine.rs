//! Template engine for emails and prompts using Jinja2 syntax.
//!
//! Templates are compiled into the binary from the `templates/` directory, so
//! rendering never depends on the working directory of the process.

use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Embedded templates, keyed by their path relative to `templates/`
const TEMPLATES: &[(&str, &str)] = &[
    (
        "prompts/chat/system.jinja",
        include_str!("../../../templates/prompts/chat/system.jinja"),
    ),
    (
        "emails/newsletter_welcome.html.jinja",
        include_str!("../../../templates/emails/newsletter_welcome.html.jinja"),
    ),
    (
        "emails/newsletter_welcome.txt.jinja",
        include_str!("../../../templates/emails/newsletter_welcome.txt.jinja"),
    ),
    (
        "emails/newsletter_admin.html.jinja",
        include_str!("../../../templates/emails/newsletter_admin.html.jinja"),
    ),
    (
        "emails/newsletter_admin.txt.jinja",
        include_str!("../../../templates/emails/newsletter_admin.txt.jinja"),
    ),
    (
        "emails/contact.html.jinja",
        include_str!("../../../templates/emails/contact.html.jinja"),
    ),
    (
        "emails/contact.txt.jinja",
        include_str!("../../../templates/emails/contact.txt.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    // HTML templates escape interpolated values; text and prompt templates do not
    env.set_auto_escape_callback(|name| {
        if name.contains(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

/// Get the global template environment
fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with any serializable context.
///
/// # Example
/// ```ignore
/// use minijinja::context;
/// use crate::shared::templates::render_template;
///
/// let body = render_template("emails/contact.txt.jinja", context! { name => "Alice" })?;
/// ```
pub fn render_template<S: Serialize>(template_name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Check if a template exists
#[cfg(test)]
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}

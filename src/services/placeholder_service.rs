//! services/placeholder_service.rs
//! Reemplazo de placeholders `[Key]` y, como segunda capa, expresiones
//! `{{ ... }}` / `{% ... %}` con minijinja.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use minijinja::Environment;
use regex::{Captures, Regex};

use crate::models::contact_model::ContactRecord;

pub type PlaceholderContext = BTreeMap<String, String>;

static BRACKET_REGEX: OnceLock<Regex> = OnceLock::new();

fn bracket_regex() -> &'static Regex {
    BRACKET_REGEX.get_or_init(|| Regex::new(r"\[([^\[\]]*)\]").expect("Invalid placeholder regex"))
}

/// Contexto de un contacto: alias canónicos primero, luego las columnas del
/// CSV, que pisan a los alias con el mismo nombre (un `Name` del CSV trae
/// el nombre completo).
pub fn build_context(contact: &ContactRecord) -> PlaceholderContext {
    let column = |key: &str| contact.extra.get(key).cloned().unwrap_or_default();

    let mut ctx = PlaceholderContext::new();
    ctx.insert("Name".into(), contact.first_name.clone());
    ctx.insert("First Name".into(), contact.first_name.clone());
    ctx.insert("Last Name".into(), contact.last_name.clone());
    ctx.insert("Company".into(), contact.company.clone());
    ctx.insert("Job Role".into(), column("Job Role"));
    ctx.insert("Location".into(), column("Location"));
    ctx.insert("Email".into(), contact.email.clone());

    ctx.insert("first_name".into(), contact.first_name.clone());
    ctx.insert("last_name".into(), contact.last_name.clone());
    ctx.insert("company".into(), contact.company.clone());
    ctx.insert("email".into(), contact.email.clone());

    for (key, value) in &contact.extra {
        if !key.is_empty() {
            ctx.insert(key.clone(), value.clone());
        }
    }
    ctx
}

/// Primera pasada: `[Key]` conocido se reemplaza, el resto queda igual.
/// Así `[Texto](url)` de markdown pasa intacto.
pub fn replace_brackets(text: &str, ctx: &PlaceholderContext) -> String {
    bracket_regex()
        .replace_all(text, |caps: &Captures| match ctx.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn has_template_syntax(text: &str) -> bool {
    text.contains("{{") || text.contains("{%") || text.contains("{#")
}

#[derive(Debug, Clone)]
pub struct PlaceholderResolver {
    env: Environment<'static>,
}

impl Default for PlaceholderResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderResolver {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Compila la plantilla sin renderizarla; un error acá es fatal para la campaña.
    pub fn validate(&self, text: &str) -> Result<()> {
        if has_template_syntax(text) {
            // Environment local: template_from_str pide que el texto viva tanto como el env
            let env = Environment::new();
            env.template_from_str(text)
                .context("Invalid template syntax")?;
        }
        Ok(())
    }

    pub fn resolve(&self, text: &str, ctx: &PlaceholderContext) -> Result<String> {
        let replaced = replace_brackets(text, ctx);
        if !has_template_syntax(&replaced) {
            return Ok(replaced);
        }

        self.env
            .render_str(&replaced, ctx)
            .context("Failed to render template expressions")
    }
}

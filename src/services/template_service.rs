//! services/template_service.rs
//! Separa el asunto (`Subject:`) del cuerpo markdown de una plantilla.
//!
//! La detección de líneas de metadata (`Email:` etc.) antes del saludo es
//! heurística: sirve para plantillas copiadas de un borrador, no es exacta.

use serde::{Deserialize, Serialize};

const SUBJECT_PREFIX: &str = "subject:";

/// Encabezados que se descartan antes de que empiece el cuerpo.
const METADATA_PREFIXES: &[&str] = &["email:", "portfolio:"];

/// Palabras con las que arranca el cuerpo del correo.
const GREETINGS: &[&str] = &["hi", "hello", "dear", "hey"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOptions {
    pub strip_metadata_headers: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        TemplateOptions {
            strip_metadata_headers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// `None` si la plantilla no declara asunto
    pub subject: Option<String>,
    pub body: String,
}

impl ParsedTemplate {
    pub fn subject_or<'a>(&'a self, default_subject: &'a str) -> &'a str {
        self.subject.as_deref().unwrap_or(default_subject)
    }
}

pub fn parse_template(raw: &str, options: TemplateOptions) -> ParsedTemplate {
    let lines: Vec<&str> = raw.lines().collect();
    let (subject, body_start) = extract_subject(&lines);
    let body_lines = &lines[body_start..];

    let kept: Vec<&str> = if options.strip_metadata_headers {
        strip_metadata(body_lines)
    } else {
        body_lines.to_vec()
    };

    ParsedTemplate {
        subject,
        body: kept.join("\n").trim().to_string(),
    }
}

/// Devuelve el asunto (si hay) y el índice de la primera línea del cuerpo.
fn extract_subject(lines: &[&str]) -> (Option<String>, usize) {
    let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return (None, 0);
    };

    let Some(rest) = strip_prefix_ignore_case(lines[first].trim(), SUBJECT_PREFIX) else {
        return (None, 0);
    };

    let inline = rest.trim();
    if !inline.is_empty() {
        return (Some(inline.to_string()), first + 1);
    }

    // "Subject:" solo; el asunto va en la línea siguiente
    match lines.get(first + 1).map(|l| l.trim()) {
        Some(next) if !next.is_empty() => (Some(next.to_string()), first + 2),
        _ => (None, first + 1),
    }
}

fn strip_metadata<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    // Sin saludo, el filtro aplica a todo el texto
    let body_start = lines
        .iter()
        .position(|l| starts_body(l))
        .unwrap_or(lines.len());

    lines
        .iter()
        .enumerate()
        .filter(|(idx, line)| *idx >= body_start || !is_metadata_header(line))
        .map(|(_, line)| *line)
        .collect()
}

pub fn is_metadata_header(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    METADATA_PREFIXES.iter().any(|p| lower.starts_with(p))
}

pub fn starts_body(line: &str) -> bool {
    let lower = line.trim().to_lowercase();
    GREETINGS.iter().any(|greeting| {
        lower
            .strip_prefix(greeting)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c == ' ' || c == ',')
    })
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

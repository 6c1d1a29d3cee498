//! services/render_service.rs
//! Markdown -> HTML, links con redirect de tracking, pixel de apertura y
//! versión en texto plano.

use anyhow::{Context, Result};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use pulldown_cmark::{html, Options, Parser};
use uuid::Uuid;

use crate::models::message_model::RenderedMessage;

/// Ancho de línea del texto plano; alto para no partir párrafos.
const TEXT_WIDTH: usize = 1_000;

#[derive(Debug, Clone)]
pub struct ContentRenderer {
    base_url: String,
}

impl ContentRenderer {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `subject` y `body` ya vienen con los placeholders resueltos.
    pub fn render(&self, subject: &str, body: &str, tracking_id: Uuid) -> Result<RenderedMessage> {
        let html_content = markdown_to_html(body);

        let mut html_body = self.rewrite_links(&html_content, tracking_id)?;
        html_body.push_str(&self.pixel_tag(tracking_id));

        Ok(RenderedMessage {
            subject: subject.to_string(),
            html_body,
            // Del HTML original: redirects y pixel no tienen sentido en texto
            text_body: html_to_text(&html_content)?,
            tracking_id,
        })
    }

    pub fn click_url(&self, tracking_id: Uuid, target: &str) -> String {
        format!(
            "{}/track/click/{}/?url={}",
            self.base_url,
            tracking_id,
            urlencoding::encode(target)
        )
    }

    pub fn pixel_url(&self, tracking_id: Uuid) -> String {
        format!("{}/track/open/{}/pixel.png", self.base_url, tracking_id)
    }

    /// Solo `<a href>` absolutos http(s); relativos, mailto:, anclas y
    /// otros atributos (`data-href`, ...) quedan igual.
    pub fn rewrite_links(&self, html: &str, tracking_id: Uuid) -> Result<String> {
        let element_content_handlers = vec![element!("a[href]", |el| {
            let Some(raw) = el.get_attribute("href") else {
                return Ok(());
            };
            let target = html_escape::decode_html_entities(raw.trim());
            if is_absolute_http(&target) {
                el.set_attribute("href", &self.click_url(tracking_id, &target))?;
            }
            Ok(())
        })];

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers,
                ..RewriteStrSettings::new()
            },
        )
        .context("Failed to rewrite links")
    }

    fn pixel_tag(&self, tracking_id: Uuid) -> String {
        format!(
            r#"<img src="{}" width="1" height="1" alt="" style="display:none;" />"#,
            html_escape::encode_double_quoted_attribute(&self.pixel_url(tracking_id))
        )
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Texto plano sin decoraciones: links como su texto, entidades decodificadas,
/// párrafos separados por una línea en blanco.
pub fn html_to_text(html: &str) -> Result<String> {
    let text = html2text::config::plain_no_decorate()
        .string_from_read(html.as_bytes(), TEXT_WIDTH)
        .context("Failed to convert HTML to text")?;
    Ok(text.trim().to_string())
}

fn is_absolute_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

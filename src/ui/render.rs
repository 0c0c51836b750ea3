//! Page rendering.
//!
//! Templates are compiled into the binary by askama, so there is no
//! template cache to manage at runtime.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use tower_sessions::Session;

use super::error::PageError;
use super::session::{take_notice, Notice};

/// Data every page layout needs
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub site_name: String,
    pub flash: String,
    pub warning: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    site_name: String,
}

impl Renderer {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
        }
    }

    /// Builds the layout context, consuming any pending notices
    pub async fn context(&self, session: &Session) -> Result<PageContext, PageError> {
        Ok(PageContext {
            site_name: self.site_name.clone(),
            flash: take_notice(session, Notice::Flash).await?,
            warning: take_notice(session, Notice::Warning).await?,
            error: take_notice(session, Notice::Error).await?,
        })
    }

    pub fn render<T: Template>(&self, template: &T) -> Result<Response, PageError> {
        let html = template.render()?;
        Ok(Html(html).into_response())
    }
}

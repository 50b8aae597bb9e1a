use actix_web::{http::header::ContentType, HttpResponse, ResponseError};
use askama::Template;

use crate::{
    entities::{
        blog::{Blog, BlogWithTags},
        pagination::Page,
        project::{Project, ProjectDetail},
        site::SiteContext,
    },
    errors::AppError,
    use_cases::{
        comment::ThreadEntry,
        site::{AboutSections, Showcase},
    },
};

/// Values every page layout needs.
pub struct PageChrome {
    pub site: SiteContext,
    pub csrf_token: String,
    pub static_url: String,
    pub signed_in: bool,
}

impl PageChrome {
    pub fn asset(&self, path: &str) -> String {
        format!("{}/{}", self.static_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn title(&self, page: &str) -> String {
        if page.is_empty() {
            self.site.settings.site_title.clone()
        } else {
            format!("{} | {}", page, self.site.settings.site_title)
        }
    }
}

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub page: PageChrome,
    pub showcase: Showcase,
    pub featured_projects: Vec<ProjectDetail>,
    pub recent_posts: Vec<Blog>,
}

#[derive(Template)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub page: PageChrome,
    pub about: AboutSections,
}

#[derive(Template)]
#[template(path = "pages/projects.html")]
pub struct ProjectsTemplate {
    pub page: PageChrome,
    pub projects: Page<ProjectDetail>,
}

#[derive(Template)]
#[template(path = "pages/project_detail.html")]
pub struct ProjectDetailTemplate {
    pub page: PageChrome,
    pub detail: ProjectDetail,
    pub key_features: Vec<String>,
    pub related: Vec<Project>,
}

#[derive(Template)]
#[template(path = "pages/blog.html")]
pub struct BlogTemplate {
    pub page: PageChrome,
    pub posts: Page<BlogWithTags>,
    pub tag: Option<String>,
    pub q: Option<String>,
}

impl BlogTemplate {
    /// Query suffix that keeps the active filters across pages.
    pub fn filter_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(tag) = &self.tag {
            query.append_pair("tag", tag);
        }
        if let Some(q) = &self.q {
            query.append_pair("q", q);
        }
        let query = query.finish();
        if query.is_empty() { query } else { format!("&{}", query) }
    }
}

#[derive(Template)]
#[template(path = "pages/blog_detail.html")]
pub struct BlogDetailTemplate<'a> {
    pub page: PageChrome,
    pub post: BlogWithTags,
    pub content_html: String,
    pub reading_time: usize,
    pub comments: Vec<ThreadEntry<'a>>,
    pub comment_count: usize,
    pub related: Vec<Blog>,
    pub liked: bool,
}

#[derive(Template)]
#[template(path = "pages/error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

/// Renders a page, logging and degrading to a bare 500 on template errors.
pub fn render<T: Template>(template: &T) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::Ok().content_type(ContentType::html()).body(body),
        Err(e) => {
            tracing::error!("Template render error: {}", e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("Template error")
        }
    }
}

/// HTML counterpart of [`AppError::error_response`] for page routes.
pub fn error_page(err: &AppError) -> HttpResponse {
    let status = err.status_code();
    let message = match err {
        AppError::NotFound(_) => "The page you are looking for does not exist.".to_string(),
        AppError::InternalError(msg) => {
            tracing::error!("Internal error while rendering page: {}", msg);
            "Something went wrong on our side.".to_string()
        }
        other => other.to_string(),
    };

    let template = ErrorTemplate { status: status.as_u16(), message };
    match template.render() {
        Ok(body) => HttpResponse::build(status).content_type(ContentType::html()).body(body),
        Err(e) => {
            tracing::error!("Error page render failed: {}", e);
            HttpResponse::build(status).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    fn chrome() -> PageChrome {
        PageChrome {
            site: SiteContext::default(),
            csrf_token: "token".into(),
            static_url: "/static/".into(),
            signed_in: false,
        }
    }

    #[test]
    fn assets_are_joined_to_static_prefix() {
        assert_eq!(chrome().asset("/css/site.css"), "/static/css/site.css");
        assert_eq!(chrome().title("Blog"), "Blog | My Portfolio");
    }

    #[test]
    fn filter_query_keeps_tag_and_search() {
        let template = BlogTemplate {
            page: chrome(),
            posts: Page { items: vec![], number: 1, num_pages: 1, total: 0 },
            tag: Some("rust lang".into()),
            q: None,
        };
        assert_eq!(template.filter_query(), "&tag=rust+lang");
    }

    #[test]
    fn missing_pages_render_404_html() {
        let response = error_page(&AppError::NotFound("Blog post not found".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn empty_blog_index_renders() {
        let template = BlogTemplate {
            page: chrome(),
            posts: Page { items: vec![], number: 1, num_pages: 1, total: 0 },
            tag: None,
            q: Some("nothing".into()),
        };
        let html = template.render().unwrap();
        assert!(html.contains("No posts found"));
        assert!(html.contains("name=\"csrf-token\" content=\"token\""));
    }
}

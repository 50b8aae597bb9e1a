use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    constants::{BLOG_PAGE_SIZE, RELATED_ITEMS},
    entities::{
        blog::{Blog, BlogInsert, BlogListQuery, BlogWithTags, LikeOutcome, NewBlogRequest, Tag, UpdateBlogRequest},
        pagination::{clamp_page, page_count, page_offset, Page},
    },
    errors::AppError,
    repositories::blog::BlogRepository,
    utils::valid_uuid::valid_uuid,
};

/// Everything the post page needs besides the comment thread.
#[derive(Debug)]
pub struct BlogDetail {
    pub post: BlogWithTags,
    pub related: Vec<Blog>,
    pub liked: bool,
}

pub struct BlogHandler<R>
where
    R: BlogRepository,
{
    pub blog_repo: R,
}

impl<R> BlogHandler<R>
where
    R: BlogRepository,
{
    pub fn new(blog_repo: R) -> Self {
        BlogHandler { blog_repo }
    }

    /// Published posts, newest first, filtered by tag and search term.
    pub async fn list(&self, query: &BlogListQuery) -> Result<Page<BlogWithTags>, AppError> {
        let filter = query.filter();
        let total = self.blog_repo.count_published(&filter).await?;
        let number = clamp_page(query.page.as_deref(), total, BLOG_PAGE_SIZE);

        let posts = self
            .blog_repo
            .list_published(&filter, BLOG_PAGE_SIZE, page_offset(number, BLOG_PAGE_SIZE))
            .await?;

        Ok(Page {
            items: self.with_tags(posts).await?,
            number,
            num_pages: page_count(total, BLOG_PAGE_SIZE),
            total,
        })
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Blog>, AppError> {
        self.blog_repo.recent_published(limit).await
    }

    /// Loads a published post and counts the visit.
    pub async fn detail(&self, slug: &str, visitor: Option<Uuid>) -> Result<BlogDetail, AppError> {
        let post = self
            .blog_repo
            .record_view(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;

        let related = self.blog_repo.related(&post.id, RELATED_ITEMS).await?;
        let liked = match visitor {
            Some(visitor_id) => self.blog_repo.is_liked(&post.id, &visitor_id).await?,
            None => false,
        };

        let post = self
            .with_tags(vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Post vanished while loading tags".to_string()))?;

        Ok(BlogDetail { post, related, liked })
    }

    /// Flips the visitor's like on a published post.
    pub async fn toggle_like(&self, slug: &str, visitor_id: &Uuid) -> Result<LikeOutcome, AppError> {
        let post = self
            .blog_repo
            .get_by_slug(slug)
            .await?
            .filter(Blog::is_published)
            .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;

        let outcome = self.blog_repo.toggle_like(&post.id, visitor_id).await?;
        tracing::debug!(post = %post.slug, liked = outcome.liked, likes = outcome.likes_count, "Like toggled");

        Ok(outcome)
    }

    async fn with_tags(&self, posts: Vec<Blog>) -> Result<Vec<BlogWithTags>, AppError> {
        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut tags = group_tags(self.blog_repo.tags_for(&ids).await?);

        Ok(posts
            .into_iter()
            .map(|blog| BlogWithTags {
                tags: tags.remove(&blog.id).unwrap_or_default(),
                blog,
            })
            .collect())
    }

    // ───── Admin ─────────────────────────────────────────────────────

    pub async fn list_all(&self) -> Result<Vec<BlogWithTags>, AppError> {
        let posts = self.blog_repo.list_all().await?;
        self.with_tags(posts).await
    }

    pub async fn get(&self, id: &str) -> Result<BlogWithTags, AppError> {
        let id = valid_uuid(id)?;
        let post = self.find(&id).await?;
        let mut posts = self.with_tags(vec![post]).await?;
        posts
            .pop()
            .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
    }

    pub async fn create(&self, request: NewBlogRequest) -> Result<Blog, AppError> {
        let insert = BlogInsert::try_from(request)?;
        let post = self.blog_repo.create(&insert).await?;
        tracing::info!(slug = %post.slug, status = ?post.status, "Blog post created");
        Ok(post)
    }

    pub async fn update(&self, id: &str, request: UpdateBlogRequest) -> Result<Blog, AppError> {
        let id = valid_uuid(id)?;
        let current = self.find(&id).await?;
        let changes = request.resolve(&current)?;
        self.blog_repo.update(&id, &changes).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.blog_repo.delete(&id).await
    }

    async fn find(&self, id: &Uuid) -> Result<Blog, AppError> {
        self.blog_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
    }
}

fn group_tags(rows: Vec<(Uuid, Tag)>) -> HashMap<Uuid, Vec<Tag>> {
    let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (blog_id, tag) in rows {
        grouped.entry(blog_id).or_default().push(tag);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::blog::{fixtures, BlogFilter, BlogStatus};
    use crate::repositories::blog::MockBlogRepository;
    use mockall::predicate::*;

    fn tag(name: &str) -> Tag {
        Tag { id: Uuid::new_v4(), name: name.into(), slug: name.to_lowercase() }
    }

    #[tokio::test]
    async fn list_clamps_page_and_attaches_tags() {
        let first = fixtures::published("first");
        let second = fixtures::published("second");
        let first_id = first.id;
        let posts = vec![first, second];

        let mut repo = MockBlogRepository::new();
        repo.expect_count_published()
            .with(eq(BlogFilter { tag: Some("rust".into()), search: None }))
            .returning(|_| Ok(12));
        repo.expect_list_published()
            .with(always(), eq(BLOG_PAGE_SIZE), eq(10))
            .returning(move |_, _, _| Ok(posts.clone()));
        repo.expect_tags_for()
            .returning(move |_| Ok(vec![(first_id, tag("Rust"))]));

        let query = BlogListQuery { page: Some("99".into()), tag: Some(" rust ".into()), q: Some("  ".into()) };
        let page = BlogHandler::new(repo).list(&query).await.unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.items[0].tags[0].name, "Rust");
        assert!(page.items[1].tags.is_empty());
    }

    #[tokio::test]
    async fn garbage_page_falls_back_to_first() {
        let mut repo = MockBlogRepository::new();
        repo.expect_count_published().returning(|_| Ok(3));
        repo.expect_list_published()
            .with(always(), always(), eq(0))
            .returning(|_, _, _| Ok(vec![]));
        repo.expect_tags_for().returning(|_| Ok(vec![]));

        let query = BlogListQuery { page: Some("abc".into()), ..Default::default() };
        let page = BlogHandler::new(repo).list(&query).await.unwrap();

        assert_eq!(page.number, 1);
        assert!(!page.has_previous());
    }

    #[tokio::test]
    async fn detail_counts_view_and_reports_like_state() {
        let mut post = fixtures::published("hello");
        post.views = 5;
        let visitor = Uuid::new_v4();

        let mut repo = MockBlogRepository::new();
        repo.expect_record_view()
            .withf(|slug| slug == "hello")
            .times(1)
            .returning(move |_| Ok(Some(post.clone())));
        repo.expect_related().returning(|_, _| Ok(vec![fixtures::published("other")]));
        repo.expect_is_liked().with(always(), eq(visitor)).returning(|_, _| Ok(true));
        repo.expect_tags_for().returning(|_| Ok(vec![]));

        let detail = BlogHandler::new(repo).detail("hello", Some(visitor)).await.unwrap();

        assert_eq!(detail.post.blog.views, 5);
        assert!(detail.liked);
        assert_eq!(detail.related.len(), 1);
    }

    #[tokio::test]
    async fn unknown_or_draft_post_detail_is_not_found() {
        let mut repo = MockBlogRepository::new();
        repo.expect_record_view().returning(|_| Ok(None));
        repo.expect_related().never();

        let result = BlogHandler::new(repo).detail("draft", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn liking_a_draft_is_not_found() {
        let mut repo = MockBlogRepository::new();
        repo.expect_get_by_slug().returning(|slug| Ok(Some(fixtures::draft(slug))));
        repo.expect_toggle_like().never();

        let result = BlogHandler::new(repo).toggle_like("draft", &Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn like_toggle_returns_repository_outcome() {
        let mut repo = MockBlogRepository::new();
        repo.expect_get_by_slug().returning(|slug| Ok(Some(fixtures::published(slug))));
        repo.expect_toggle_like()
            .times(1)
            .returning(|_, _| Ok(LikeOutcome { likes_count: 1, liked: true }));

        let outcome = BlogHandler::new(repo).toggle_like("hello", &Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome, LikeOutcome { likes_count: 1, liked: true });
    }

    #[tokio::test]
    async fn create_derives_slug_from_title() {
        let mut repo = MockBlogRepository::new();
        repo.expect_create()
            .withf(|insert| insert.slug == "my-first-post" && insert.tags == vec!["rust".to_string()])
            .returning(|insert| {
                Ok(Blog { slug: insert.slug.clone(), ..fixtures::published("my-first-post") })
            });

        let request = NewBlogRequest {
            title: "My First Post".into(),
            slug: None,
            content: "Hello".into(),
            excerpt: None,
            featured_image_url: None,
            status: BlogStatus::Published,
            tags: vec!["rust".into()],
        };

        let post = BlogHandler::new(repo).create(request).await.unwrap();
        assert_eq!(post.slug, "my-first-post");
    }

    #[tokio::test]
    async fn update_of_unknown_post_is_not_found() {
        let mut repo = MockBlogRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let result = BlogHandler::new(repo)
            .update(&Uuid::new_v4().to_string(), UpdateBlogRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

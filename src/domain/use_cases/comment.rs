use std::collections::HashMap;

use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    entities::{
        blog::Blog,
        comment::{Comment, CommentAdminView, CommentForm, CommentInsert, CommentNode, Commenter},
    },
    errors::{AppError, FieldErrors},
    repositories::{blog::BlogRepository, comment::CommentRepository},
    utils::valid_uuid::valid_uuid,
};

/// One row of a thread rendered as a flat, indented list.
#[derive(Debug)]
pub struct ThreadEntry<'a> {
    pub depth: usize,
    pub node: &'a CommentNode,
}

/// Builds the visible comment tree of a post.
///
/// Roots are active comments without a parent. Every node's children are its
/// active replies in ascending creation order, at any depth. Replies of an
/// inactive comment are never reached and so stay hidden.
pub fn build_thread(comments: Vec<Comment>, static_url: &str) -> Vec<CommentNode> {
    let mut children: HashMap<Option<Uuid>, Vec<Comment>> = HashMap::new();
    for comment in comments.into_iter().filter(|c| c.active) {
        children.entry(comment.parent_id).or_default().push(comment);
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|c| c.created_at);
    }

    attach_replies(None, &mut children, static_url)
}

fn attach_replies(
    parent: Option<Uuid>,
    children: &mut HashMap<Option<Uuid>, Vec<Comment>>,
    static_url: &str,
) -> Vec<CommentNode> {
    // Removing the bucket guarantees every comment is visited once.
    let Some(siblings) = children.remove(&parent) else {
        return Vec::new();
    };

    siblings
        .into_iter()
        .map(|comment| CommentNode {
            id: comment.id,
            author_name: comment.author_name(),
            avatar_url: comment.avatar_url(static_url),
            content: comment.content.clone(),
            created_at: comment.created_at,
            is_reply: comment.is_reply(),
            parent_id: comment.parent_id,
            replies: attach_replies(Some(comment.id), children, static_url),
        })
        .collect()
}

/// Depth-first flattening for templates.
pub fn flatten_thread(nodes: &[CommentNode]) -> Vec<ThreadEntry<'_>> {
    fn walk<'a>(nodes: &'a [CommentNode], depth: usize, out: &mut Vec<ThreadEntry<'a>>) {
        for node in nodes {
            out.push(ThreadEntry { depth, node });
            walk(&node.replies, depth + 1, out);
        }
    }

    let mut entries = Vec::new();
    walk(nodes, 0, &mut entries);
    entries
}

pub struct CommentHandler<B, C>
where
    B: BlogRepository,
    C: CommentRepository,
{
    pub blog_repo: B,
    pub comment_repo: C,
    static_url: String,
}

impl<B, C> CommentHandler<B, C>
where
    B: BlogRepository,
    C: CommentRepository,
{
    pub fn new(blog_repo: B, comment_repo: C, static_url: impl Into<String>) -> Self {
        CommentHandler {
            blog_repo,
            comment_repo,
            static_url: static_url.into(),
        }
    }

    async fn published_post(&self, slug: &str) -> Result<Blog, AppError> {
        self.blog_repo
            .get_by_slug(slug)
            .await?
            .filter(Blog::is_published)
            .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))
    }

    /// Comment tree of a published post.
    pub async fn thread_for_post(&self, slug: &str) -> Result<Vec<CommentNode>, AppError> {
        let post = self.published_post(slug).await?;
        self.thread_for_blog(&post.id).await
    }

    pub async fn thread_for_blog(&self, blog_id: &Uuid) -> Result<Vec<CommentNode>, AppError> {
        let comments = self.comment_repo.active_for_post(blog_id).await?;
        Ok(build_thread(comments, &self.static_url))
    }

    /// Validates and stores a comment on a published post. A registered
    /// commenter is recorded as the author; client supplied name and email
    /// are then discarded.
    pub async fn submit(
        &self,
        slug: &str,
        form: CommentForm,
        commenter: Option<Commenter>,
    ) -> Result<Comment, AppError> {
        let post = self.published_post(slug).await?;
        let mut errors = FieldErrors::new();

        let content = form.content.as_deref().map(str::trim).unwrap_or_default();
        if content.is_empty() {
            add_error(&mut errors, "content", "Comment content cannot be empty.");
        }

        let (name, email) = match commenter {
            Some(_) => (None, None),
            None => {
                let name = form.name.as_deref().map(str::trim).unwrap_or_default();
                if name.is_empty() {
                    add_error(&mut errors, "name", "Name is required for anonymous comments.");
                }

                let email = form.email.as_deref().map(str::trim).unwrap_or_default();
                if !email.is_empty() && !email.validate_email() {
                    add_error(&mut errors, "email", "Enter a valid email address.");
                }

                (non_empty(name), non_empty(email))
            }
        };

        let parent_id = match form.parent.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            None => None,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) if self.comment_repo.belongs_to_post(&id, &post.id).await? => Some(id),
                _ => {
                    add_error(&mut errors, "parent", "Invalid parent comment.");
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        let insert = CommentInsert {
            blog_id: post.id,
            author_id: commenter.map(|c| c.user_id),
            name,
            email,
            content: content.to_string(),
            parent_id,
        };

        let comment = self.comment_repo.insert(&insert).await?;
        tracing::info!(post = %post.slug, comment_id = %comment.id, reply = comment.is_reply(), "Comment posted");

        Ok(comment)
    }

    pub fn static_url(&self) -> &str {
        &self.static_url
    }

    /// Every comment of a post for moderation, newest first.
    pub async fn list_for_moderation(&self, blog_id: &str) -> Result<Vec<CommentAdminView>, AppError> {
        let blog_id = valid_uuid(blog_id)?;
        if self.blog_repo.get_by_id(&blog_id).await?.is_none() {
            return Err(AppError::NotFound("Blog post not found".to_string()));
        }

        let comments = self.comment_repo.list_for_post(&blog_id).await?;
        Ok(comments.iter().map(Comment::to_admin_view).collect())
    }

    pub async fn moderate(&self, comment_id: &str, active: bool) -> Result<CommentAdminView, AppError> {
        let comment_id = valid_uuid(comment_id)?;
        let comment = self.comment_repo.set_active(&comment_id, active).await?;
        Ok(comment.to_admin_view())
    }

    /// Deletes a comment and, through the schema, all of its replies.
    pub async fn delete(&self, comment_id: &str) -> Result<(), AppError> {
        let comment_id = valid_uuid(comment_id)?;
        self.comment_repo.delete(&comment_id).await
    }
}

fn add_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{blog::fixtures as blogs, comment::fixtures};
    use crate::repositories::{blog::MockBlogRepository, comment::MockCommentRepository};
    use mockall::predicate::*;

    const STATIC: &str = "/static/";

    fn handler(blog: Option<Blog>, comments: MockCommentRepository) -> CommentHandler<MockBlogRepository, MockCommentRepository> {
        let mut blog_repo = MockBlogRepository::new();
        blog_repo.expect_get_by_slug().returning(move |_| Ok(blog.clone()));
        CommentHandler::new(blog_repo, comments, STATIC)
    }

    fn reply_to(parent: &Comment, minutes: i64) -> Comment {
        Comment {
            parent_id: Some(parent.id),
            ..fixtures::anonymous(parent.blog_id, Some("Replier"), minutes)
        }
    }

    fn echo_insert(comments: &mut MockCommentRepository) {
        comments.expect_insert().times(1).returning(|insert| {
            Ok(Comment {
                author_id: insert.author_id,
                name: insert.name.clone(),
                email: insert.email.clone(),
                content: insert.content.clone(),
                parent_id: insert.parent_id,
                ..fixtures::anonymous(insert.blog_id, None, 0)
            })
        });
    }

    fn errors_of(result: Result<Comment, AppError>) -> FieldErrors {
        match result {
            Err(AppError::ValidationError(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn thread_nests_replies_in_creation_order() {
        let blog_id = Uuid::new_v4();
        let root = fixtures::anonymous(blog_id, Some("Ada"), 0);
        let late_reply = reply_to(&root, 10);
        let early_reply = reply_to(&root, 5);
        let nested = reply_to(&early_reply, 7);
        let second_root = fixtures::anonymous(blog_id, None, 3);

        let thread = build_thread(
            vec![late_reply.clone(), nested.clone(), root.clone(), second_root.clone(), early_reply.clone()],
            STATIC,
        );

        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, root.id);
        assert_eq!(thread[1].id, second_root.id);
        assert_eq!(thread[1].author_name, "Anonymous");

        let replies: Vec<Uuid> = thread[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(replies, vec![early_reply.id, late_reply.id]);
        assert!(thread[0].replies[0].is_reply);
        assert_eq!(thread[0].replies[0].replies[0].id, nested.id);
    }

    #[test]
    fn replies_of_inactive_comments_are_hidden() {
        let blog_id = Uuid::new_v4();
        let hidden = Comment { active: false, ..fixtures::anonymous(blog_id, Some("Troll"), 0) };
        let orphan = reply_to(&hidden, 1);
        let visible = fixtures::anonymous(blog_id, Some("Ada"), 2);

        let thread = build_thread(vec![hidden, orphan, visible.clone()], STATIC);

        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].id, visible.id);
        assert!(thread[0].replies.is_empty());
    }

    #[test]
    fn thread_uses_display_names_and_avatars() {
        let blog_id = Uuid::new_v4();
        let member = fixtures::registered(blog_id, "ada", "Ada", "Lovelace");
        let guest = fixtures::anonymous(blog_id, Some("Bob"), 1);

        let thread = build_thread(vec![member, guest], STATIC);

        assert_eq!(thread[0].author_name, "Ada Lovelace");
        assert_eq!(thread[0].avatar_url, "/static/images/default_user_avatar.jpg");
        assert_eq!(thread[1].author_name, "Bob");
        assert_eq!(thread[1].avatar_url, "/static/images/default_comment_avatar.jpg");
    }

    #[test]
    fn flattening_reports_depth() {
        let blog_id = Uuid::new_v4();
        let root = fixtures::anonymous(blog_id, Some("Ada"), 0);
        let reply = reply_to(&root, 1);
        let nested = reply_to(&reply, 2);

        let thread = build_thread(vec![root, reply, nested], STATIC);
        let depths: Vec<usize> = flatten_thread(&thread).iter().map(|e| e.depth).collect();

        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn empty_content_is_rejected_without_a_write() {
        let mut comments = MockCommentRepository::new();
        comments.expect_insert().never();
        let handler = handler(Some(blogs::published("hello")), comments);

        let form = CommentForm { content: Some("   ".into()), name: Some("Ada".into()), ..Default::default() };
        let errors = errors_of(handler.submit("hello", form, None).await);

        assert_eq!(errors["content"], vec!["Comment content cannot be empty.".to_string()]);
        assert!(!errors.contains_key("name"));
    }

    #[tokio::test]
    async fn anonymous_comment_requires_a_name_and_a_valid_email() {
        let mut comments = MockCommentRepository::new();
        comments.expect_insert().never();
        let handler = handler(Some(blogs::published("hello")), comments);

        let form = CommentForm {
            content: Some("Nice post".into()),
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        let errors = errors_of(handler.submit("hello", form, None).await);

        assert_eq!(errors["name"], vec!["Name is required for anonymous comments.".to_string()]);
        assert_eq!(errors["email"], vec!["Enter a valid email address.".to_string()]);
    }

    #[tokio::test]
    async fn anonymous_comment_with_name_is_stored() {
        let mut comments = MockCommentRepository::new();
        echo_insert(&mut comments);
        let handler = handler(Some(blogs::published("hello")), comments);

        let form = CommentForm {
            content: Some("  Nice post  ".into()),
            name: Some(" Ada ".into()),
            email: Some("".into()),
            parent: Some("".into()),
        };
        let comment = handler.submit("hello", form, None).await.unwrap();

        assert_eq!(comment.content, "Nice post");
        assert_eq!(comment.author_name(), "Ada");
        assert_eq!(comment.email, None);
        assert!(!comment.is_reply());
    }

    #[tokio::test]
    async fn registered_commenter_overrides_client_identity() {
        let user_id = Uuid::new_v4();
        let mut comments = MockCommentRepository::new();
        echo_insert(&mut comments);
        let handler = handler(Some(blogs::published("hello")), comments);

        let form = CommentForm {
            content: Some("Hi".into()),
            name: Some("Impostor".into()),
            email: Some("impostor@example.com".into()),
            parent: None,
        };
        let comment = handler.submit("hello", form, Some(Commenter { user_id })).await.unwrap();

        assert_eq!(comment.author_id, Some(user_id));
        assert_eq!(comment.name, None);
        assert_eq!(comment.email, None);
    }

    #[tokio::test]
    async fn parent_from_another_post_is_rejected() {
        let post = blogs::published("hello");
        let foreign_parent = Uuid::new_v4();

        let mut comments = MockCommentRepository::new();
        comments
            .expect_belongs_to_post()
            .with(eq(foreign_parent), eq(post.id))
            .returning(|_, _| Ok(false));
        comments.expect_insert().never();
        let handler = handler(Some(post), comments);

        let form = CommentForm {
            content: Some("Reply".into()),
            name: Some("Ada".into()),
            parent: Some(foreign_parent.to_string()),
            ..Default::default()
        };
        let errors = errors_of(handler.submit("hello", form, None).await);

        assert_eq!(errors["parent"], vec!["Invalid parent comment.".to_string()]);
    }

    #[tokio::test]
    async fn unparsable_parent_is_rejected() {
        let mut comments = MockCommentRepository::new();
        comments.expect_belongs_to_post().never();
        let handler = handler(Some(blogs::published("hello")), comments);

        let form = CommentForm {
            content: Some("Reply".into()),
            name: Some("Ada".into()),
            parent: Some("42".into()),
            ..Default::default()
        };
        let errors = errors_of(handler.submit("hello", form, None).await);

        assert!(errors.contains_key("parent"));
    }

    #[tokio::test]
    async fn draft_posts_do_not_accept_comments() {
        let mut comments = MockCommentRepository::new();
        comments.expect_insert().never();
        let handler = handler(Some(blogs::draft("secret")), comments);

        let form = CommentForm { content: Some("Hi".into()), name: Some("Ada".into()), ..Default::default() };
        let result = handler.submit("secret", form, None).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

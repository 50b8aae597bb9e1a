use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{PROJECTS_PAGE_SIZE, RELATED_ITEMS},
    entities::{
        pagination::{clamp_page, page_count, page_offset, Page},
        project::{
            NewProjectImageRequest, NewProjectRequest, Project, ProjectApiItem, ProjectDetail, ProjectImage,
            ProjectInsert, UpdateProjectRequest,
        },
        skill::Skill,
    },
    errors::AppError,
    repositories::project::ProjectRepository,
    utils::valid_uuid::valid_uuid,
};

#[derive(Debug)]
pub struct ProjectPage {
    pub detail: ProjectDetail,
    pub related: Vec<Project>,
}

pub struct ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R) -> Self {
        ProjectHandler { project_repo }
    }

    /// Every project, featured first, nine per page.
    pub async fn list(&self, page: Option<&str>) -> Result<Page<ProjectDetail>, AppError> {
        let total = self.project_repo.count().await?;
        let number = clamp_page(page, total, PROJECTS_PAGE_SIZE);

        let projects = self
            .project_repo
            .list(PROJECTS_PAGE_SIZE, page_offset(number, PROJECTS_PAGE_SIZE))
            .await?;

        Ok(Page {
            items: self.with_details(projects).await?,
            number,
            num_pages: page_count(total, PROJECTS_PAGE_SIZE),
            total,
        })
    }

    pub async fn featured(&self, limit: i64) -> Result<Vec<ProjectDetail>, AppError> {
        let projects = self.project_repo.featured(limit).await?;
        self.with_details(projects).await
    }

    /// Detail page of a completed project. Other statuses are not public.
    pub async fn detail(&self, slug: &str) -> Result<ProjectPage, AppError> {
        let project = self
            .project_repo
            .get_by_slug(slug)
            .await?
            .filter(Project::is_completed)
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        let related = self.project_repo.related(&project.id, RELATED_ITEMS).await?;
        let detail = self
            .with_details(vec![project])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("Project vanished while loading details".to_string()))?;

        Ok(ProjectPage { detail, related })
    }

    /// Completed projects in the shape served to the JavaScript gallery.
    pub async fn api_items(&self) -> Result<Vec<ProjectApiItem>, AppError> {
        let projects = self.project_repo.list_completed().await?;
        let details = self.with_details(projects).await?;
        Ok(details.iter().map(ProjectDetail::to_api_item).collect())
    }

    async fn with_details(&self, projects: Vec<Project>) -> Result<Vec<ProjectDetail>, AppError> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();

        let mut technologies: HashMap<Uuid, Vec<Skill>> = HashMap::new();
        for (project_id, skill) in self.project_repo.technologies_for(&ids).await? {
            technologies.entry(project_id).or_default().push(skill);
        }

        let mut images: HashMap<Uuid, Vec<ProjectImage>> = HashMap::new();
        for image in self.project_repo.images_for(&ids).await? {
            images.entry(image.project_id).or_default().push(image);
        }

        Ok(projects
            .into_iter()
            .map(|project| ProjectDetail {
                technologies: technologies.remove(&project.id).unwrap_or_default(),
                images: images.remove(&project.id).unwrap_or_default(),
                project,
            })
            .collect())
    }

    // ───── Admin ─────────────────────────────────────────────────────

    pub async fn get(&self, id: &str) -> Result<ProjectDetail, AppError> {
        let id = valid_uuid(id)?;
        let project = self.find(&id).await?;
        self.with_details(vec![project])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    pub async fn create(&self, request: NewProjectRequest) -> Result<Project, AppError> {
        let insert = ProjectInsert::try_from(request)?;
        let project = self.project_repo.create(&insert).await?;
        tracing::info!(slug = %project.slug, "Project created");
        Ok(project)
    }

    pub async fn update(&self, id: &str, request: UpdateProjectRequest) -> Result<Project, AppError> {
        let id = valid_uuid(id)?;
        let current = self.find(&id).await?;
        let (merged, technologies) = request.resolve(&current)?;
        self.project_repo.update(&id, &merged, technologies.is_some()).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = valid_uuid(id)?;
        self.project_repo.delete(&id).await
    }

    pub async fn add_image(&self, id: &str, request: NewProjectImageRequest) -> Result<ProjectImage, AppError> {
        request.validate()?;
        let id = valid_uuid(id)?;
        self.project_repo.add_image(&id, &request).await
    }

    async fn find(&self, id: &Uuid) -> Result<Project, AppError> {
        self.project_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "skill_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Frontend,
    Backend,
    Database,
    Devops,
    Design,
    Mobile,
    #[default]
    Other,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: SkillCategory,
    pub proficiency: i32,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub featured: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewSkillRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub category: SkillCategory,

    #[serde(default = "default_proficiency")]
    #[validate(range(min = 0, max = 100, message = "Proficiency must be between 0 and 100"))]
    pub proficiency: i32,

    #[validate(length(max = 50))]
    pub icon: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Order cannot be negative"))]
    pub sort_order: i32,

    #[serde(default)]
    pub featured: bool,
}

fn default_proficiency() -> i32 {
    50
}

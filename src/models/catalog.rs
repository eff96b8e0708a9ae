use crate::entities::{program_entity as programs, trainer_entity as trainers};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgramResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub price: Option<f64>,
}

impl From<programs::Model> for ProgramResponse {
    fn from(p: programs::Model) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            duration: p.duration,
            price: p.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrainerResponse {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub bio: String,
    pub experience: String,
}

impl From<trainers::Model> for TrainerResponse {
    fn from(t: trainers::Model) -> Self {
        Self {
            id: t.id,
            name: t.name,
            specialization: t.specialization,
            bio: t.bio,
            experience: t.experience,
        }
    }
}

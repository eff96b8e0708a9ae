use crate::entities::{program_entity as programs, trainer_entity as trainers};
use crate::error::{AppError, AppResult};
use crate::models::{ProgramResponse, TrainerResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

/// Read-only access to programs and trainers.
#[derive(Clone)]
pub struct CatalogService {
    pool: DatabaseConnection,
}

impl CatalogService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_programs(&self) -> AppResult<Vec<ProgramResponse>> {
        let models = programs::Entity::find()
            .order_by_asc(programs::Column::Title)
            .order_by_asc(programs::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(ProgramResponse::from).collect())
    }

    pub async fn list_trainers(&self) -> AppResult<Vec<TrainerResponse>> {
        let models = trainers::Entity::find()
            .order_by_asc(trainers::Column::Name)
            .order_by_asc(trainers::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(models.into_iter().map(TrainerResponse::from).collect())
    }

    pub async fn get_program(&self, id: i64) -> AppResult<programs::Model> {
        programs::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Program {id} not found")))
    }

    pub async fn get_trainer(&self, id: i64) -> AppResult<trainers::Model> {
        trainers::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trainer {id} not found")))
    }

    pub async fn programs_by_ids(&self, ids: &[i64]) -> AppResult<HashMap<i64, ProgramResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = programs::Entity::find()
            .filter(programs::Column::Id.is_in(ids.to_vec()))
            .all(&self.pool)
            .await?;
        Ok(models
            .into_iter()
            .map(|p| (p.id, ProgramResponse::from(p)))
            .collect())
    }

    pub async fn trainers_by_ids(&self, ids: &[i64]) -> AppResult<HashMap<i64, TrainerResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = trainers::Entity::find()
            .filter(trainers::Column::Id.is_in(ids.to_vec()))
            .all(&self.pool)
            .await?;
        Ok(models
            .into_iter()
            .map(|t| (t.id, TrainerResponse::from(t)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[actix_web::test]
    async fn test_list_and_lookup() {
        let db = setup_db().await;
        let yoga = seed_program(&db, "Yoga").await;
        seed_program(&db, "Boxing").await;
        let coach = seed_trainer(&db, "Ana").await;
        let catalog = CatalogService::new(db.clone());

        let titles: Vec<String> = catalog
            .list_programs()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Boxing", "Yoga"]);

        assert_eq!(catalog.get_program(yoga.id).await.unwrap().title, "Yoga");
        assert_eq!(catalog.get_trainer(coach.id).await.unwrap().name, "Ana");
        assert!(matches!(
            catalog.get_program(9999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            catalog.get_trainer(9999).await,
            Err(AppError::NotFound(_))
        ));

        let by_id = catalog.programs_by_ids(&[yoga.id, 9999]).await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert!(catalog.trainers_by_ids(&[]).await.unwrap().is_empty());
    }
}

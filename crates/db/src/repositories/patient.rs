//! Patient repository for patients and their visits.

use chrono::{DateTime, FixedOffset, Utc};
use medstore_shared::types::{PageRequest, PageResponse, PatientId, VisitId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{patients, visits};

/// Error types for patient and visit operations.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    /// Patient not found or soft-deleted.
    #[error("Patient not found: {0}")]
    NotFound(PatientId),

    /// Visit not found.
    #[error("Visit not found: {0}")]
    VisitNotFound(VisitId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating or replacing a patient record.
#[derive(Debug, Clone, Default)]
pub struct PatientInput {
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: Option<i32>,
    /// Gender.
    pub gender: Option<String>,
    /// Phone or other contact.
    pub contact: Option<String>,
    /// Free-form notes.
    pub description: Option<String>,
}

/// Input for creating a visit.
#[derive(Debug, Clone)]
pub struct CreateVisitInput {
    /// Visiting patient.
    pub patient_id: PatientId,
    /// Visit time, defaults to now.
    pub date: Option<DateTime<FixedOffset>>,
    /// Notes.
    pub notes: Option<String>,
}

/// Input for updating a visit.
#[derive(Debug, Clone, Default)]
pub struct UpdateVisitInput {
    /// Visit time.
    pub date: Option<DateTime<FixedOffset>>,
    /// Notes.
    pub notes: Option<Option<String>>,
}

/// Patient repository.
#[derive(Debug, Clone)]
pub struct PatientRepository {
    db: DatabaseConnection,
}

impl PatientRepository {
    /// Creates a new patient repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Patients
    // ========================================================================

    /// Creates a patient.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_patient(
        &self,
        input: PatientInput,
    ) -> Result<patients::Model, PatientError> {
        let patient = patients::ActiveModel {
            name: Set(input.name),
            age: Set(input.age),
            gender: Set(input.gender),
            contact: Set(input.contact),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
            deleted_at: Set(None),
            ..Default::default()
        };
        Ok(patient.insert(&self.db).await?)
    }

    /// Lists live patients, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_patients(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<patients::Model>, PatientError> {
        let query = patients::Entity::find().filter(patients::Column::DeletedAt.is_null());
        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(patients::Column::CreatedAt)
            .order_by_desc(patients::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets a live patient by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist or was deleted.
    pub async fn get_patient(&self, id: PatientId) -> Result<patients::Model, PatientError> {
        patients::Entity::find_by_id(id.0)
            .filter(patients::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(PatientError::NotFound(id))
    }

    /// Replaces a patient's details.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist or was deleted.
    pub async fn update_patient(
        &self,
        id: PatientId,
        input: PatientInput,
    ) -> Result<patients::Model, PatientError> {
        let patient = self.get_patient(id).await?;
        let mut active: patients::ActiveModel = patient.into();
        active.name = Set(input.name);
        active.age = Set(input.age);
        active.gender = Set(input.gender);
        active.contact = Set(input.contact);
        active.description = Set(input.description);
        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes a patient.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist or was already deleted.
    pub async fn delete_patient(&self, id: PatientId) -> Result<(), PatientError> {
        let patient = self.get_patient(id).await?;
        let mut active: patients::ActiveModel = patient.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;
        Ok(())
    }

    // ========================================================================
    // Visits
    // ========================================================================

    /// Records a visit for a live patient.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist or was deleted.
    pub async fn create_visit(
        &self,
        input: CreateVisitInput,
    ) -> Result<visits::Model, PatientError> {
        self.get_patient(input.patient_id).await?;

        let visit = visits::ActiveModel {
            patient_id: Set(input.patient_id.0),
            date: Set(input.date.unwrap_or_else(|| Utc::now().into())),
            notes: Set(input.notes),
            ..Default::default()
        };
        Ok(visit.insert(&self.db).await?)
    }

    /// Lists visits, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_visits(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<visits::Model>, PatientError> {
        let total = visits::Entity::find().count(&self.db).await?;
        let items = visits::Entity::find()
            .order_by_desc(visits::Column::Date)
            .order_by_desc(visits::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets a visit by ID.
    ///
    /// # Errors
    ///
    /// Returns `VisitNotFound` if the visit does not exist.
    pub async fn get_visit(&self, id: VisitId) -> Result<visits::Model, PatientError> {
        visits::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(PatientError::VisitNotFound(id))
    }

    /// Updates a visit's date or notes.
    ///
    /// # Errors
    ///
    /// Returns `VisitNotFound` if the visit does not exist.
    pub async fn update_visit(
        &self,
        id: VisitId,
        input: UpdateVisitInput,
    ) -> Result<visits::Model, PatientError> {
        let visit = self.get_visit(id).await?;
        let mut active: visits::ActiveModel = visit.into();
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a visit.
    ///
    /// # Errors
    ///
    /// Returns `VisitNotFound` if the visit does not exist.
    pub async fn delete_visit(&self, id: VisitId) -> Result<(), PatientError> {
        let result = visits::Entity::delete_by_id(id.0).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(PatientError::VisitNotFound(id));
        }
        Ok(())
    }

    /// Lists a live patient's visits, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the patient does not exist or was deleted.
    pub async fn list_visits_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<visits::Model>, PatientError> {
        self.get_patient(patient_id).await?;
        let items = visits::Entity::find()
            .filter(visits::Column::PatientId.eq(patient_id.0))
            .order_by_desc(visits::Column::Date)
            .order_by_desc(visits::Column::Id)
            .all(&self.db)
            .await?;
        Ok(items)
    }
}

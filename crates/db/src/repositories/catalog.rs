//! Catalog repository for medicines and medicine types.

use medstore_shared::types::{MedTypeId, MedicineId, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{med_types, medicines, stock_updation_particulars};
use crate::error::{is_foreign_key_violation, is_unique_violation};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Medicine not found.
    #[error("Medicine not found: {0}")]
    MedicineNotFound(MedicineId),

    /// Medicine type not found.
    #[error("Medicine type not found: {0}")]
    MedTypeNotFound(MedTypeId),

    /// Medicine name already exists.
    #[error("Medicine name '{0}' already exists")]
    DuplicateMedicineName(String),

    /// Medicine type name already exists.
    #[error("Medicine type '{0}' already exists")]
    DuplicateMedTypeName(String),

    /// Medicine has ledger history and cannot be deleted.
    #[error("Medicine {0} has stock history and cannot be deleted")]
    MedicineInUse(MedicineId),

    /// Medicine type is still referenced by medicines.
    #[error("Medicine type {0} is used by medicines and cannot be deleted")]
    MedTypeInUse(MedTypeId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a medicine.
///
/// There is no `current_stock` field: new medicines start at zero and only the
/// stock ledger changes the balance.
#[derive(Debug, Clone)]
pub struct CreateMedicineInput {
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Medicine type.
    pub type_id: MedTypeId,
    /// Unit price.
    pub price: Decimal,
    /// Minimum stock threshold.
    pub min_stock: i32,
    /// Optimal stock level.
    pub optimal_stock: i32,
}

/// Input for updating a medicine.
#[derive(Debug, Clone, Default)]
pub struct UpdateMedicineInput {
    /// Name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Medicine type.
    pub type_id: Option<MedTypeId>,
    /// Unit price.
    pub price: Option<Decimal>,
    /// Minimum stock threshold.
    pub min_stock: Option<i32>,
    /// Optimal stock level.
    pub optimal_stock: Option<i32>,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Medicines
    // ========================================================================

    /// Creates a medicine with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The medicine type does not exist
    /// - The name already exists
    pub async fn create_medicine(
        &self,
        input: CreateMedicineInput,
    ) -> Result<medicines::Model, CatalogError> {
        self.ensure_med_type(input.type_id).await?;

        let existing = medicines::Entity::find()
            .filter(medicines::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::DuplicateMedicineName(input.name));
        }

        let now = chrono::Utc::now().into();
        let name = input.name.clone();
        let medicine = medicines::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            type_id: Set(input.type_id.0),
            price: Set(input.price),
            min_stock: Set(input.min_stock),
            optimal_stock: Set(input.optimal_stock),
            current_stock: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        medicine.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateMedicineName(name)
            } else {
                e.into()
            }
        })
    }

    /// Lists medicines ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_medicines(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<medicines::Model>, CatalogError> {
        let total = medicines::Entity::find().count(&self.db).await?;
        let items = medicines::Entity::find()
            .order_by_asc(medicines::Column::Name)
            .order_by_asc(medicines::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets a medicine by ID.
    ///
    /// # Errors
    ///
    /// Returns `MedicineNotFound` if the medicine does not exist.
    pub async fn get_medicine(&self, id: MedicineId) -> Result<medicines::Model, CatalogError> {
        medicines::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::MedicineNotFound(id))
    }

    /// Updates a medicine's catalog fields. The balance is never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The medicine or new medicine type does not exist
    /// - The new name already exists
    pub async fn update_medicine(
        &self,
        id: MedicineId,
        input: UpdateMedicineInput,
    ) -> Result<medicines::Model, CatalogError> {
        let medicine = self.get_medicine(id).await?;

        if let Some(type_id) = input.type_id {
            self.ensure_med_type(type_id).await?;
        }

        if let Some(new_name) = input.name.as_ref().filter(|n| **n != medicine.name) {
            let existing = medicines::Entity::find()
                .filter(medicines::Column::Name.eq(new_name))
                .filter(medicines::Column::Id.ne(id.0))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                return Err(CatalogError::DuplicateMedicineName(new_name.clone()));
            }
        }

        let name_for_error = input.name.clone().unwrap_or_else(|| medicine.name.clone());
        let mut active: medicines::ActiveModel = medicine.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(type_id) = input.type_id {
            active.type_id = Set(type_id.0);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(min_stock) = input.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(optimal_stock) = input.optimal_stock {
            active.optimal_stock = Set(optimal_stock);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateMedicineName(name_for_error)
            } else {
                e.into()
            }
        })
    }

    /// Deletes a medicine that has no ledger history.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The medicine does not exist
    /// - The medicine appears in any stock updation
    pub async fn delete_medicine(&self, id: MedicineId) -> Result<(), CatalogError> {
        self.get_medicine(id).await?;

        let references = stock_updation_particulars::Entity::find()
            .filter(stock_updation_particulars::Column::MedicineId.eq(id.0))
            .count(&self.db)
            .await?;
        if references > 0 {
            return Err(CatalogError::MedicineInUse(id));
        }

        medicines::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    CatalogError::MedicineInUse(id)
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    // ========================================================================
    // Medicine Types
    // ========================================================================

    /// Creates a medicine type.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMedTypeName` if the name already exists.
    pub async fn create_med_type(
        &self,
        type_name: String,
    ) -> Result<med_types::Model, CatalogError> {
        let existing = med_types::Entity::find()
            .filter(med_types::Column::TypeName.eq(&type_name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::DuplicateMedTypeName(type_name));
        }

        let model = med_types::ActiveModel {
            type_name: Set(type_name.clone()),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateMedTypeName(type_name)
            } else {
                e.into()
            }
        })
    }

    /// Lists all medicine types ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_med_types(&self) -> Result<Vec<med_types::Model>, CatalogError> {
        let types = med_types::Entity::find()
            .order_by_asc(med_types::Column::TypeName)
            .all(&self.db)
            .await?;
        Ok(types)
    }

    /// Gets a medicine type by ID.
    ///
    /// # Errors
    ///
    /// Returns `MedTypeNotFound` if the type does not exist.
    pub async fn get_med_type(&self, id: MedTypeId) -> Result<med_types::Model, CatalogError> {
        med_types::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .ok_or(CatalogError::MedTypeNotFound(id))
    }

    /// Renames a medicine type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist or the name is taken.
    pub async fn rename_med_type(
        &self,
        id: MedTypeId,
        type_name: String,
    ) -> Result<med_types::Model, CatalogError> {
        let current = self.get_med_type(id).await?;
        if current.type_name == type_name {
            return Ok(current);
        }

        let existing = med_types::Entity::find()
            .filter(med_types::Column::TypeName.eq(&type_name))
            .filter(med_types::Column::Id.ne(id.0))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::DuplicateMedTypeName(type_name));
        }

        let mut active: med_types::ActiveModel = current.into();
        active.type_name = Set(type_name.clone());
        active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateMedTypeName(type_name)
            } else {
                e.into()
            }
        })
    }

    /// Deletes a medicine type no medicine refers to.
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not exist or is still in use.
    pub async fn delete_med_type(&self, id: MedTypeId) -> Result<(), CatalogError> {
        self.get_med_type(id).await?;

        let references = medicines::Entity::find()
            .filter(medicines::Column::TypeId.eq(id.0))
            .count(&self.db)
            .await?;
        if references > 0 {
            return Err(CatalogError::MedTypeInUse(id));
        }

        med_types::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    CatalogError::MedTypeInUse(id)
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    async fn ensure_med_type(&self, id: MedTypeId) -> Result<(), CatalogError> {
        let count = med_types::Entity::find_by_id(id.0).count(&self.db).await?;
        if count == 0 {
            return Err(CatalogError::MedTypeNotFound(id));
        }
        Ok(())
    }
}

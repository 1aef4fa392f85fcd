use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::error::ShapeError;
use super::field_table::{FieldTable, Shape};

type AnyTable = Arc<dyn Any + Send + Sync>;

/// Lazily built, shared field tables keyed by response type.
///
/// Tables are built outside the lock and published with insert-if-absent, so
/// concurrent first requests for a type all end up with the same snapshot.
#[derive(Default)]
pub struct FieldTableRegistry {
    tables: RwLock<HashMap<TypeId, AnyTable>>,
}

impl FieldTableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_for<T: Shape>(&self) -> Result<Arc<FieldTable<T>>, ShapeError> {
        let key = TypeId::of::<T>();

        // Fast path: already published
        let cached = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(table) = cached {
            return Self::downcast(table);
        }

        let built: AnyTable = Arc::new(FieldTable::<T>::of()?);

        let published = {
            let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
            tables.entry(key).or_insert(built).clone()
        };

        tracing::debug!("Published field table for {}", type_name::<T>());
        Self::downcast(published)
    }

    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn downcast<T: Shape>(table: AnyTable) -> Result<Arc<FieldTable<T>>, ShapeError> {
        table
            .downcast::<FieldTable<T>>()
            .map_err(|_| ShapeError::TableTypeMismatch(type_name::<T>()))
    }
}

impl fmt::Debug for FieldTableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTableRegistry")
            .field("tables", &self.len())
            .finish()
    }
}

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

use super::error::SortError;
use super::types::SortMapping;

/// Sortable fields of `TResponse` and where they live in `TSource`.
///
/// The type parameters only tag the definition so that the registry can key
/// it by the (response-shape, source-shape) pair; no values of either type
/// are held.
pub struct SortMappingDefinition<TResponse, TSource> {
    mappings: Vec<SortMapping>,
    _shapes: PhantomData<fn() -> (TResponse, TSource)>,
}

impl<TResponse, TSource> SortMappingDefinition<TResponse, TSource> {
    pub fn new(mappings: impl Into<Vec<SortMapping>>) -> Self {
        Self {
            mappings: mappings.into(),
            _shapes: PhantomData,
        }
    }

    pub fn mappings(&self) -> &[SortMapping] {
        &self.mappings
    }
}

/// Process-wide table of sort mapping definitions.
///
/// Populated once during startup and then shared read-only (behind an `Arc`)
/// with every handler that accepts a `sort` parameter.
#[derive(Debug, Default)]
pub struct SortMappingRegistry {
    definitions: HashMap<(TypeId, TypeId), Vec<SortMapping>>,
}

impl SortMappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<TResponse: 'static, TSource: 'static>(
        &mut self,
        definition: SortMappingDefinition<TResponse, TSource>,
    ) -> Result<&mut Self, SortError> {
        let response_shape = type_name::<TResponse>();
        let source_shape = type_name::<TSource>();

        let mappings = definition.mappings;
        for (index, mapping) in mappings.iter().enumerate() {
            if mappings[..index].iter().any(|seen| seen.matches(mapping.logical_field)) {
                return Err(SortError::DuplicateField {
                    field: mapping.logical_field.to_string(),
                    response_shape,
                });
            }
        }

        let key = (TypeId::of::<TResponse>(), TypeId::of::<TSource>());
        if self.definitions.contains_key(&key) {
            return Err(SortError::DuplicateDefinition { response_shape, source_shape });
        }

        tracing::debug!(
            "Registered {} sort mappings for {} -> {}",
            mappings.len(),
            response_shape,
            source_shape
        );
        self.definitions.insert(key, mappings);
        Ok(self)
    }

    /// Registered mappings for the pair.
    ///
    /// # Panics
    ///
    /// Panics if no definition was registered for the pair. That is a startup
    /// wiring mistake, not something a request can cause.
    pub fn mappings_for<TResponse: 'static, TSource: 'static>(&self) -> &[SortMapping] {
        let key = (TypeId::of::<TResponse>(), TypeId::of::<TSource>());
        match self.definitions.get(&key) {
            Some(mappings) => mappings,
            None => panic!(
                "no sort mapping registered for {} -> {}",
                type_name::<TResponse>(),
                type_name::<TSource>()
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

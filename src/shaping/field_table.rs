use std::any::type_name;
use std::fmt;

use serde_json::Value;

use super::error::ShapeError;
use super::shaped::ShapedObject;
use crate::links::LinkDto;

/// Name of the field every shaped object starts with.
pub const ID_FIELD: &str = "id";

/// A declared output field: the name exposed to clients and how to read it.
pub struct Field<T> {
    pub name: &'static str,
    accessor: fn(&T) -> Value,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str, accessor: fn(&T) -> Value) -> Self {
        Self { name, accessor }
    }

    pub fn value(&self, instance: &T) -> Value {
        (self.accessor)(instance)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A response type whose top-level fields can be selected by clients.
pub trait Shape: Sized + 'static {
    /// Output fields in declaration order. Must include `id`.
    fn fields() -> Vec<Field<Self>>;
}

/// Immutable, validated field list of one response shape.
pub struct FieldTable<T> {
    shape: &'static str,
    fields: Vec<Field<T>>,
    id: usize,
}

impl<T: 'static> FieldTable<T> {
    pub fn build(fields: Vec<Field<T>>) -> Result<Self, ShapeError> {
        let shape = type_name::<T>();

        for (index, field) in fields.iter().enumerate() {
            if fields[..index]
                .iter()
                .any(|seen| seen.name.eq_ignore_ascii_case(field.name))
            {
                return Err(ShapeError::DuplicateField {
                    field: field.name.to_string(),
                    shape,
                });
            }
        }

        let id = fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(ID_FIELD))
            .ok_or(ShapeError::MissingId(shape))?;

        Ok(Self { shape, fields, id })
    }

    pub fn of() -> Result<Self, ShapeError>
    where
        T: Shape,
    {
        Self::build(T::fields())
    }
}

impl<T> FieldTable<T> {
    pub fn shape_name(&self) -> &'static str {
        self.shape
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared name matching `name` case-insensitively.
    pub fn declared_name(&self, name: &str) -> Option<&'static str> {
        self.position(name).map(|index| self.fields[index].name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Resolve a `fields` parameter against this table.
    ///
    /// Blank means every field in declared order. Otherwise `id` comes first,
    /// then each requested field once, in request order. The first token that
    /// matches nothing rejects the whole selection.
    pub fn select(&self, fields: Option<&str>) -> Result<FieldSelection<'_, T>, ShapeError> {
        let tokens: Vec<&str> = fields
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(FieldSelection {
                table: self,
                indices: (0..self.fields.len()).collect(),
            });
        }

        let mut indices = Vec::with_capacity(tokens.len() + 1);
        indices.push(self.id);
        for token in tokens {
            let index = self
                .position(token)
                .ok_or_else(|| ShapeError::InvalidFields(token.to_string()))?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }

        Ok(FieldSelection { table: self, indices })
    }

    pub fn validate(&self, fields: Option<&str>) -> Result<(), ShapeError> {
        self.select(fields).map(|_| ())
    }

    pub fn is_valid(&self, fields: Option<&str>) -> bool {
        self.validate(fields).is_ok()
    }

    pub fn shape(&self, instance: &T, fields: Option<&str>) -> Result<ShapedObject, ShapeError> {
        Ok(self.select(fields)?.shape(instance))
    }

    /// Shape every instance with one selection. When `link_injector` is given
    /// its links are attached to each item under `links`.
    pub fn shape_many<'i, I>(
        &self,
        instances: I,
        fields: Option<&str>,
        link_injector: Option<&dyn Fn(&T) -> Vec<LinkDto>>,
    ) -> Result<Vec<ShapedObject>, ShapeError>
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        let selection = self.select(fields)?;
        Ok(instances
            .into_iter()
            .map(|instance| {
                let shaped = selection.shape(instance);
                match link_injector {
                    Some(inject) => shaped.with_links(inject(instance)),
                    None => shaped,
                }
            })
            .collect())
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("shape", &self.shape)
            .field("fields", &self.fields)
            .finish()
    }
}

/// A validated subset of a [`FieldTable`], reusable across instances.
pub struct FieldSelection<'t, T> {
    table: &'t FieldTable<T>,
    indices: Vec<usize>,
}

impl<'t, T> FieldSelection<'t, T> {
    pub fn shape(&self, instance: &T) -> ShapedObject {
        let mut shaped = ShapedObject::with_capacity(self.indices.len());
        for &index in &self.indices {
            let field = &self.table.fields[index];
            shaped.insert(field.name, field.value(instance));
        }
        shaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Goal {
        id: String,
        name: String,
        description: Option<String>,
        status: &'static str,
        steps: Vec<u32>,
    }

    impl Shape for Goal {
        fn fields() -> Vec<Field<Self>> {
            type F = Field<Goal>;
            vec![
                F::new("Id", |g| json!(g.id)),
                F::new("Name", |g| json!(g.name)),
                F::new("Description", |g| json!(g.description)),
                F::new("Status", |g| json!(g.status)),
                F::new("Steps", |g| json!(g.steps)),
            ]
        }
    }

    fn goal() -> Goal {
        Goal {
            id: "g_1".into(),
            name: "Read".into(),
            description: None,
            status: "ongoing",
            steps: vec![1, 2, 3],
        }
    }

    #[test]
    fn requested_fields_follow_id_in_request_order() {
        let table = FieldTable::<Goal>::of().unwrap();
        let shaped = table.shape(&goal(), Some("name,description")).unwrap();
        assert_eq!(shaped.keys().collect::<Vec<_>>(), vec!["Id", "Name", "Description"]);
        assert_eq!(shaped.get("Description"), Some(&json!(null)));

        let shaped = table.shape(&goal(), Some("status , name")).unwrap();
        assert_eq!(shaped.keys().collect::<Vec<_>>(), vec!["Id", "Status", "Name"]);
    }

    #[test]
    fn no_fields_means_all_in_declared_order() {
        let table = FieldTable::<Goal>::of().unwrap();
        for fields in [None, Some(""), Some("  "), Some(" , ")] {
            let shaped = table.shape(&goal(), fields).unwrap();
            assert_eq!(
                shaped.keys().collect::<Vec<_>>(),
                vec!["Id", "Name", "Description", "Status", "Steps"]
            );
        }
    }

    #[test]
    fn output_keys_use_declared_casing_once() {
        let table = FieldTable::<Goal>::of().unwrap();
        let shaped = table.shape(&goal(), Some("NAME,id,name")).unwrap();
        assert_eq!(shaped.keys().collect::<Vec<_>>(), vec!["Id", "Name"]);
    }

    #[test]
    fn nested_values_are_copied_whole() {
        let table = FieldTable::<Goal>::of().unwrap();
        let shaped = table.shape(&goal(), Some("steps")).unwrap();
        assert_eq!(shaped.get("Steps"), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn unknown_field_names_the_token() {
        let table = FieldTable::<Goal>::of().unwrap();
        assert!(table.is_valid(Some("name, STATUS")));
        assert_eq!(
            table.validate(Some("name, colour, status")),
            Err(ShapeError::InvalidFields("colour".to_string()))
        );
        assert!(table.shape(&goal(), Some("steps.0")).is_err());
    }

    #[test]
    fn build_rejects_duplicates_and_missing_id() {
        let duplicate = FieldTable::<Goal>::build(vec![
            Field::new("id", |g: &Goal| json!(g.id)),
            Field::new("name", |g: &Goal| json!(g.name)),
            Field::new("Name", |g: &Goal| json!(g.name)),
        ]);
        assert!(matches!(duplicate, Err(ShapeError::DuplicateField { .. })));

        let missing = FieldTable::<Goal>::build(vec![Field::new("name", |g: &Goal| json!(g.name))]);
        assert!(matches!(missing, Err(ShapeError::MissingId(_))));
    }

    #[test]
    fn shape_many_attaches_links_only_with_injector() {
        let table = FieldTable::<Goal>::of().unwrap();
        let goals = vec![goal(), goal()];

        let plain = table.shape_many(&goals, Some("name"), None).unwrap();
        assert!(plain.iter().all(|item| item.links().is_none()));

        let inject = |g: &Goal| vec![LinkDto::new(format!("/goals/{}", g.id), "self", "GET")];
        let linked = table.shape_many(&goals, Some("name"), Some(&inject)).unwrap();
        assert_eq!(linked.len(), 2);
        assert_eq!(linked[0].keys().collect::<Vec<_>>(), vec!["Id", "Name", "links"]);
        assert_eq!(linked[1].links().unwrap()[0].href, "/goals/g_1");
    }
}

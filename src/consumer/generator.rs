//! Consumer schema generation
//!
//! Synthesizes, from a proto schema:
//! - `OperatorWith<T>Input` and `AggregationWith<T>Input` per scalar and enum
//! - `<T>FilterInput`, `<T>GroupByInput` and `<T>Input` per object type
//! - `<T>Connection` and `<T>Edge` per document type
//! - `Query` and `Mutation` fields per document type

use std::collections::BTreeSet;

use crate::schema::scalars::{self, GEO_POINT};
use crate::schema::{
    EnumTypeDefinition, FieldDefinition, InputObjectTypeDefinition, ObjectTypeDefinition,
    ProtoSchema, TypeRef,
};

use super::shapes::*;

/// Object types never turned into input shapes
pub const DENIED_OBJECT_TYPES: &[&str] =
    &["Aggregation", "Bucket", "Mutation", "PageInfo", "Query", "Subscription"];

const STRING_SCALAR: &str = "String";

fn named(name: impl Into<String>) -> TypeRef {
    TypeRef::named(name)
}

fn required(name: impl Into<String>) -> TypeRef {
    TypeRef::non_null(TypeRef::named(name))
}

/// `[T!]`
fn list_of_required(name: impl Into<String>) -> TypeRef {
    TypeRef::list(required(name))
}

/// `[T!]!`
fn required_list_of_required(name: impl Into<String>) -> TypeRef {
    TypeRef::non_null(list_of_required(name))
}

pub fn operator_input_name(type_name: &str) -> String {
    format!("OperatorWith{}Input", type_name)
}

pub fn aggregation_input_name(type_name: &str) -> String {
    format!("AggregationWith{}Input", type_name)
}

pub fn filter_input_name(type_name: &str) -> String {
    format!("{}FilterInput", type_name)
}

pub fn group_by_input_name(type_name: &str) -> String {
    format!("{}GroupByInput", type_name)
}

pub fn put_input_name(type_name: &str) -> String {
    format!("{}Input", type_name)
}

/// Type name with its first character lowercased
pub fn lower_camel(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generates the consumer schema of a proto schema
pub struct ConsumerSchemaGenerator<'a> {
    schema: &'a ProtoSchema,
}

impl<'a> ConsumerSchemaGenerator<'a> {
    pub fn new(schema: &'a ProtoSchema) -> Self {
        Self { schema }
    }

    pub fn generate(&self) -> ConsumerSchema {
        let registry = self.schema.registry();

        let scalars = registry
            .scalars()
            .filter(|s| scalars::lookup(&s.name).map_or(true, |spec| !spec.builtin))
            .map(|s| s.name.clone())
            .collect();

        let enums = registry.enums().map(enum_shape).collect();

        let mut output_types: Vec<OutputTypeShape> = registry
            .objects()
            .filter(|o| o.name != "Query" && o.name != "Mutation")
            .map(object_shape)
            .collect();
        for document_type in self.schema.document_types() {
            output_types.extend(connection_shapes(document_type));
        }
        output_types.push(self.query_type());
        output_types.push(self.mutation_type());

        let mut input_types: Vec<InputTypeShape> = registry.inputs().map(input_shape).collect();
        input_types.extend(self.input_types());

        ConsumerSchema {
            scalars,
            enums,
            output_types,
            input_types,
        }
    }

    /// Every generated input shape
    pub fn input_types(&self) -> Vec<InputTypeShape> {
        let registry = self.schema.registry();
        let mut shapes = Vec::new();

        for scalar in registry.scalars() {
            shapes.push(aggregation_shape(&scalar.name));
            shapes.push(operator_shape(&scalar.name));
        }
        for enumeration in registry.enums() {
            shapes.push(aggregation_shape(&enumeration.name));
            shapes.push(operator_shape(&enumeration.name));
        }
        shapes.push(geo_point_operator_shape());

        let filterable = self.filterable_types();
        for object in registry.objects() {
            if is_denied(&object.name) {
                continue;
            }

            if filterable.contains(&object.name) {
                shapes.push(self.filter_shape(object, &filterable));
            }
            if object.name != GEO_POINT {
                shapes.push(self.group_by_shape(object));
            }
            shapes.push(self.put_shape(object));
        }
        shapes
    }

    /// Object types whose filter shape is non-empty.
    ///
    /// Least fixed point: a type is filterable if it is a document type, has a
    /// searchable scalar, enum or geo-point field, or has an object field of a
    /// filterable type.
    fn filterable_types(&self) -> BTreeSet<String> {
        let registry = self.schema.registry();
        let mut filterable = BTreeSet::new();

        loop {
            let mut changed = false;
            for object in registry.objects() {
                if is_denied(&object.name) || filterable.contains(&object.name) {
                    continue;
                }
                let include = self.schema.is_document_type(&object.name)
                    || object
                        .fields
                        .iter()
                        .any(|field| self.filter_field(&object.name, field, &filterable).is_some());
                if include {
                    filterable.insert(object.name.clone());
                    changed = true;
                }
            }
            if !changed {
                return filterable;
            }
        }
    }

    /// Filter shape field type for one object field, if the field is filterable
    fn filter_field(
        &self,
        owner: &str,
        field: &FieldDefinition,
        filterable: &BTreeSet<String>,
    ) -> Option<TypeRef> {
        let registry = self.schema.registry();
        let field_type = field.ty.base_name();

        if field_type == GEO_POINT || registry.is_scalar(field_type) || registry.is_enum(field_type) {
            return self
                .schema
                .is_searchable(owner, &field.name)
                .then(|| named(operator_input_name(field_type)));
        }

        if registry.is_object_type(field_type) && filterable.contains(field_type) {
            return Some(named(filter_input_name(field_type)));
        }
        None
    }

    fn filter_shape(&self, object: &ObjectTypeDefinition, filterable: &BTreeSet<String>) -> InputTypeShape {
        let name = filter_input_name(&object.name);
        let mut shape = InputTypeShape::new(&name);

        if self.schema.is_document_type(&object.name) {
            for operator in ["and", "not", "or"] {
                shape = shape.with_field(operator, list_of_required(&name));
            }
        }
        for field in &object.fields {
            if let Some(ty) = self.filter_field(&object.name, field, filterable) {
                shape = shape.with_field(&field.name, ty);
            }
        }
        shape
    }

    fn group_by_shape(&self, object: &ObjectTypeDefinition) -> InputTypeShape {
        let registry = self.schema.registry();
        let mut shape = InputTypeShape::new(group_by_input_name(&object.name));

        for field in &object.fields {
            let field_type = field.ty.base_name();
            if field_type == GEO_POINT {
                continue;
            }

            if registry.is_object_type(field_type) {
                if !is_denied(field_type) {
                    shape = shape.with_field(&field.name, named(group_by_input_name(field_type)));
                }
            } else if registry.is_scalar(field_type) || registry.is_enum(field_type) {
                shape = shape.with_field(&field.name, named(aggregation_input_name(field_type)));
            }
        }
        shape
    }

    fn put_shape(&self, object: &ObjectTypeDefinition) -> InputTypeShape {
        let registry = self.schema.registry();
        let mut shape = InputTypeShape::new(put_input_name(&object.name));

        for field in &object.fields {
            let field_type = field.ty.base_name();
            if registry.is_object_type(field_type) {
                if !is_denied(field_type) {
                    let ty = field.ty.rename_base(&put_input_name(field_type));
                    shape = shape.with_field(&field.name, ty);
                }
            } else {
                shape = shape.with_field(&field.name, field.ty.clone());
            }
        }
        shape
    }

    fn query_type(&self) -> OutputTypeShape {
        let mut query = OutputTypeShape::new("Query");
        if let Some(existing) = self.schema.registry().object("Query") {
            query = object_shape(existing);
        }

        for type_name in self.schema.document_types() {
            let prefix = lower_camel(type_name);

            query.fields.push(
                OutputField::new(&prefix, required_list_of_required(type_name.as_str()))
                    .with_argument("index", required("String"))
                    .with_argument("ids", required_list_of_required("ID")),
            );

            query.fields.push(
                OutputField::new(
                    format!("{}Aggregation", prefix),
                    required_list_of_required("Aggregation"),
                )
                .with_argument("index", required("String"))
                .with_argument("filter", named(filter_input_name(type_name)))
                .with_argument("groupBy", required(group_by_input_name(type_name))),
            );

            query.fields.push(
                OutputField::new(
                    format!("{}Connection", prefix),
                    required(format!("{}Connection", type_name)),
                )
                .with_argument("index", required("String"))
                .with_argument("filter", named(filter_input_name(type_name)))
                .with_argument("sort", list_of_required("SortFieldInput"))
                .with_argument("after", named("String"))
                .with_argument("first", named("Int"))
                .with_argument("groupBy", named(group_by_input_name(type_name))),
            );
        }
        query
    }

    fn mutation_type(&self) -> OutputTypeShape {
        let mut mutation = OutputTypeShape::new("Mutation");
        if let Some(existing) = self.schema.registry().object("Mutation") {
            mutation = object_shape(existing);
        }

        for type_name in self.schema.document_types() {
            mutation.fields.push(
                OutputField::new(format!("delete{}", type_name), required("Boolean"))
                    .with_argument("index", required("String"))
                    .with_argument("id", required("ID")),
            );
            mutation.fields.push(
                OutputField::new(format!("put{}", type_name), required("Boolean"))
                    .with_argument("index", required("String"))
                    .with_argument(
                        "documents",
                        required_list_of_required(put_input_name(type_name)),
                    ),
            );
        }
        mutation
    }
}

fn is_denied(type_name: &str) -> bool {
    DENIED_OBJECT_TYPES.contains(&type_name)
}

fn aggregation_shape(type_name: &str) -> InputTypeShape {
    InputTypeShape::new(aggregation_input_name(type_name))
        .with_field("terms", named("TermsAggregationInput"))
}

fn operator_shape(type_name: &str) -> InputTypeShape {
    let mut shape = InputTypeShape::new(operator_input_name(type_name));
    if type_name == STRING_SCALAR {
        shape = shape.with_field("contains", list_of_required(type_name));
    }
    shape
        .with_field("eq", named(type_name))
        .with_field("exists", named("Boolean"))
        .with_field("gt", named(type_name))
        .with_field("gte", named(type_name))
        .with_field("in", list_of_required(type_name))
        .with_field("lt", named(type_name))
        .with_field("lte", named(type_name))
}

fn geo_point_operator_shape() -> InputTypeShape {
    InputTypeShape::new(operator_input_name(GEO_POINT))
        .with_field("eq", named(put_input_name(GEO_POINT)))
        .with_field("exists", named("Boolean"))
        .with_field("geoDistance", named("GeoDistanceRangeInput"))
}

fn connection_shapes(type_name: &str) -> [OutputTypeShape; 2] {
    let edge = format!("{}Edge", type_name);

    let mut connection = OutputTypeShape::new(format!("{}Connection", type_name));
    connection.fields = vec![
        OutputField::new("edges", required_list_of_required(edge.as_str())),
        OutputField::new("pageInfo", required("PageInfo")),
        OutputField::new("groupBy", required_list_of_required("Aggregation")),
    ];

    let mut edge_shape = OutputTypeShape::new(edge);
    edge_shape.fields = vec![
        OutputField::new("node", required(type_name)),
        OutputField::new("cursor", required("String")),
    ];

    [connection, edge_shape]
}

fn object_shape(object: &ObjectTypeDefinition) -> OutputTypeShape {
    let mut shape = OutputTypeShape::new(&object.name);
    shape.fields = object
        .fields
        .iter()
        .map(|field| OutputField {
            name: field.name.clone(),
            arguments: field
                .arguments
                .iter()
                .map(|a| InputField::new(&a.name, a.ty.clone()))
                .collect(),
            ty: field.ty.clone(),
        })
        .collect();
    shape
}

fn input_shape(input: &InputObjectTypeDefinition) -> InputTypeShape {
    InputTypeShape {
        name: input.name.clone(),
        fields: input
            .fields
            .iter()
            .map(|f| InputField::new(&f.name, f.ty.clone()))
            .collect(),
    }
}

fn enum_shape(enumeration: &EnumTypeDefinition) -> EnumShape {
    EnumShape {
        name: enumeration.name.clone(),
        values: enumeration.values.iter().map(|v| v.name.clone()).collect(),
    }
}

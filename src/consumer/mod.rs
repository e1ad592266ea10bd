//! Consumer schema subsystem
//!
//! Generates the schema a client queries against: operator, aggregation,
//! filter, group-by and put inputs, connection types and the root `Query`
//! and `Mutation` types.

mod generator;
mod shapes;

pub use generator::{
    aggregation_input_name, filter_input_name, group_by_input_name, lower_camel,
    operator_input_name, put_input_name, ConsumerSchemaGenerator, DENIED_OBJECT_TYPES,
};
pub use shapes::{ConsumerSchema, EnumShape, InputField, InputTypeShape, OutputField, OutputTypeShape};

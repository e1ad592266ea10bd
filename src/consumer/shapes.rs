//! Consumer schema shapes and their SDL rendering

use std::fmt;

use crate::schema::TypeRef;

/// Field of an input type, or argument of an output field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub name: String,
    pub ty: TypeRef,
}

impl InputField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// `input Name { fields }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTypeShape {
    pub name: String,
    pub fields: Vec<InputField>,
}

impl InputTypeShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(InputField::new(name, ty));
        self
    }

    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for InputTypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "input {} {{", self.name)?;
        for field in &self.fields {
            writeln!(f, "  {}", field)?;
        }
        write!(f, "}}")
    }
}

/// Field of an output type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    pub name: String,
    pub arguments: Vec<InputField>,
    pub ty: TypeRef,
}

impl OutputField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            ty,
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.arguments.push(InputField::new(name, ty));
        self
    }
}

impl fmt::Display for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "(")?;
            for (i, argument) in self.arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", argument)?;
            }
            write!(f, ")")?;
        }
        write!(f, ": {}", self.ty)
    }
}

/// `type Name { fields }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTypeShape {
    pub name: String,
    pub fields: Vec<OutputField>,
}

impl OutputTypeShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&OutputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for OutputTypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type {} {{", self.name)?;
        for field in &self.fields {
            writeln!(f, "  {}", field)?;
        }
        write!(f, "}}")
    }
}

/// `enum Name { VALUES }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumShape {
    pub name: String,
    pub values: Vec<String>,
}

impl fmt::Display for EnumShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "enum {} {{", self.name)?;
        for value in &self.values {
            writeln!(f, "  {}", value)?;
        }
        write!(f, "}}")
    }
}

/// Complete consumer-facing schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerSchema {
    /// Scalars that must be declared (not built into the language)
    pub scalars: Vec<String>,
    pub enums: Vec<EnumShape>,
    pub output_types: Vec<OutputTypeShape>,
    pub input_types: Vec<InputTypeShape>,
}

impl ConsumerSchema {
    pub fn input_type(&self, name: &str) -> Option<&InputTypeShape> {
        self.input_types.iter().find(|t| t.name == name)
    }

    pub fn output_type(&self, name: &str) -> Option<&OutputTypeShape> {
        self.output_types.iter().find(|t| t.name == name)
    }

    /// The `Query` root type
    pub fn query(&self) -> Option<&OutputTypeShape> {
        self.output_type("Query")
    }

    /// The `Mutation` root type
    pub fn mutation(&self) -> Option<&OutputTypeShape> {
        self.output_type("Mutation")
    }

    /// Render as SDL text
    pub fn to_sdl(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConsumerSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for scalar in &self.scalars {
            writeln!(f, "scalar {}\n", scalar)?;
        }
        for shape in &self.enums {
            writeln!(f, "{}\n", shape)?;
        }
        for shape in &self.output_types {
            writeln!(f, "{}\n", shape)?;
        }
        for shape in &self.input_types {
            writeln!(f, "{}\n", shape)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_shape_rendering() {
        let shape = InputTypeShape::new("OperatorWithIntInput")
            .with_field("eq", TypeRef::named("Int"))
            .with_field("in", TypeRef::list(TypeRef::non_null(TypeRef::named("Int"))));
        assert_eq!(
            shape.to_string(),
            "input OperatorWithIntInput {\n  eq: Int\n  in: [Int!]\n}"
        );
        assert_eq!(shape.field_names(), vec!["eq", "in"]);
    }

    #[test]
    fn test_output_field_rendering() {
        let field = OutputField::new(
            "listing",
            TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("Listing")))),
        )
        .with_argument("index", TypeRef::non_null(TypeRef::named("String")))
        .with_argument("ids", TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("ID")))));
        assert_eq!(
            field.to_string(),
            "listing(index: String!, ids: [ID!]!): [Listing!]!"
        );
    }
}

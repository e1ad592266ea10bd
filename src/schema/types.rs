//! Schema definition language syntax tree
//!
//! Supported definitions:
//! - type (with implements) and extend type
//! - input
//! - enum
//! - scalar
//! - directive

use std::fmt;

/// Type reference with list and non-null wrappers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Named type, e.g. `Int`
    Named(String),
    /// List type, e.g. `[Int]`
    List(Box<TypeRef>),
    /// Non-null wrapper, e.g. `Int!`
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Create a named type reference
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Wrap in a list
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// Wrap in a non-null marker
    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    /// Innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    /// Returns true if the outermost wrapper is non-null
    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Returns true if a list wrapper appears anywhere
    pub fn is_list(&self) -> bool {
        match self {
            TypeRef::Named(_) => false,
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => inner.is_list(),
        }
    }

    /// Same wrappers around a different base name
    pub fn rename_base(&self, base: &str) -> TypeRef {
        match self {
            TypeRef::Named(_) => TypeRef::Named(base.to_string()),
            TypeRef::List(inner) => TypeRef::list(inner.rename_base(base)),
            TypeRef::NonNull(inner) => TypeRef::non_null(inner.rename_base(base)),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// Constant value in a directive argument or default value
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<ConstValue>),
    Object(Vec<(String, ConstValue)>),
}

impl ConstValue {
    /// String content, if this is a string literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer literal
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => write!(f, "null"),
            ConstValue::Boolean(b) => write!(f, "{}", b),
            ConstValue::Int(n) => write!(f, "{}", n),
            ConstValue::Float(x) => write!(f, "{:?}", x),
            ConstValue::String(s) => write!(f, "{:?}", s),
            ConstValue::Enum(e) => write!(f, "{}", e),
            ConstValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ConstValue::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Applied directive, e.g. `@searchable(type: "keyword")`
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<(String, ConstValue)>,
}

impl Directive {
    /// Look up an argument by name
    pub fn argument(&self, name: &str) -> Option<&ConstValue> {
        self.arguments
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }
}

/// Find a directive by name in a directive list
pub fn find_directive<'a>(directives: &'a [Directive], name: &str) -> Option<&'a Directive> {
    directives.iter().find(|d| d.name == name)
}

/// Argument or input field definition
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub description: Option<String>,
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<ConstValue>,
    pub directives: Vec<Directive>,
}

/// Output field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub description: Option<String>,
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: TypeRef,
    pub directives: Vec<Directive>,
}

/// `type Name implements A & B @directives { fields }`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeDefinition {
    pub description: Option<String>,
    pub name: String,
    pub implements: Vec<String>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
}

impl ObjectTypeDefinition {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `input Name @directives { fields }`
#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectTypeDefinition {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub fields: Vec<InputValueDefinition>,
}

/// Single enum value
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
}

/// `enum Name { VALUES }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumTypeDefinition {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub values: Vec<EnumValueDefinition>,
}

/// `scalar Name`
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTypeDefinition {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
}

/// `directive @name(args) repeatable on LOCATIONS`
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub description: Option<String>,
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub repeatable: bool,
    pub locations: Vec<String>,
}

/// Top-level definition in a schema document
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Object(ObjectTypeDefinition),
    ObjectExtension(ObjectTypeDefinition),
    InputObject(InputObjectTypeDefinition),
    Enum(EnumTypeDefinition),
    Scalar(ScalarTypeDefinition),
    Directive(DirectiveDefinition),
}

impl Definition {
    /// Name of the defined type or directive
    pub fn name(&self) -> &str {
        match self {
            Definition::Object(def) | Definition::ObjectExtension(def) => &def.name,
            Definition::InputObject(def) => &def.name,
            Definition::Enum(def) => &def.name,
            Definition::Scalar(def) => &def.name,
            Definition::Directive(def) => &def.name,
        }
    }
}

/// Parsed schema document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_rendering() {
        let ty = TypeRef::non_null(TypeRef::list(TypeRef::non_null(TypeRef::named("ID"))));
        assert_eq!(ty.to_string(), "[ID!]!");
        assert_eq!(ty.base_name(), "ID");
        assert!(ty.is_list());
        assert!(ty.is_non_null());
    }

    #[test]
    fn test_rename_base_keeps_wrappers() {
        let ty = TypeRef::list(TypeRef::non_null(TypeRef::named("Property")));
        assert_eq!(ty.rename_base("PropertyInput").to_string(), "[PropertyInput!]");
    }

    #[test]
    fn test_const_value_display() {
        let value = ConstValue::Object(vec![
            ("type".into(), ConstValue::String("keyword".into())),
            ("size".into(), ConstValue::List(vec![ConstValue::Int(1), ConstValue::Null])),
        ]);
        assert_eq!(value.to_string(), "{type: \"keyword\", size: [1, null]}");
    }
}

//! See-through wrappers that only change how a schema is named.
use crate::runtype::{Node, Runtype};

pub(crate) struct BrandShape {
    pub(crate) brand: String,
    pub(crate) entity: Runtype,
}

pub(crate) struct NamedShape {
    pub(crate) name: String,
    pub(crate) underlying: Runtype,
}

/// Tags `entity` with a nominal brand. Validation and display are the entity's.
pub fn brand(brand: impl Into<String>, entity: Runtype) -> Runtype {
    Runtype::from_node(Node::Brand(BrandShape { brand: brand.into(), entity }))
}

/// Displays as `name` everywhere, including inside other schemas.
pub fn named(name: impl Into<String>, underlying: Runtype) -> Runtype {
    Runtype::from_node(Node::Named(NamedShape { name: name.into(), underlying }))
}

impl BrandShape {
    pub fn brand(&self) -> &str {
        &self.brand
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtype::Tag;
    use crate::types::*;
    use crate::value::Value;

    #[test]
    fn wrappers_validate_as_their_target() {
        let id = brand("UserId", string());
        assert_eq!(id.tag(), Tag::Brand);
        assert_eq!(id.show(), "string");
        assert!(id.test(&Value::from("u1")));

        let point = named("Point", object([("x", number())]));
        assert_eq!(point.show(), "Point");
        assert_eq!(array(point.clone()).show(), "Point[]");
        let failure = point.safe_parse(&Value::Null).unwrap_err();
        assert_eq!(failure.message, "Expected { x: number }, but was null");
    }

    #[test]
    fn brand_name_is_kept() {
        let email = brand("Email", string());
        let Node::Brand(shape) = email.node() else { panic!("expected a brand") };
        assert_eq!(shape.brand(), "Email");
    }
}

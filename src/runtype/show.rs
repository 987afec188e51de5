//! TypeScript-flavored rendering of schemas, used in messages and `Display`.
use crate::runtype::{Mode, Node, Runtype};
use crate::seal;
use crate::types::object::ObjectShape;

/// Renders `node`; `needs_parens` asks composite renderings (unions,
/// intersections) to parenthesize themselves.
pub fn show_type(node: &Runtype, needs_parens: bool) -> String {
    Renderer { stack: Vec::new() }.show(node, needs_parens)
}

struct Renderer {
    /// Nodes currently being rendered; meeting one again means a cycle.
    stack: Vec<usize>,
}

fn parenthesize(text: String, needs_parens: bool) -> String {
    if needs_parens { format!("({text})") } else { text }
}

impl Renderer {
    fn show(&mut self, node: &Runtype, needs_parens: bool) -> String {
        let id = node.id();
        if self.stack.contains(&id) && !matches!(node.node(), Node::Lazy(_)) {
            return parenthesize(format!("CIRCULAR {}", node.tag()), needs_parens);
        }
        self.stack.push(id);
        let rendered = self.render(node, needs_parens);
        self.stack.pop();
        rendered
    }

    fn render(&mut self, node: &Runtype, needs_parens: bool) -> String {
        match node.node() {
            Node::Primitive(kind) => kind.name().to_string(),
            Node::Literal(literal) => literal.preview(),
            Node::Array(shape) => {
                let readonly = if shape.readonly { "readonly " } else { "" };
                format!("{readonly}{}[]", self.show(&shape.element, true))
            }
            Node::Tuple(shape) => {
                let readonly = if shape.readonly { "readonly " } else { "" };
                let components: Vec<String> =
                    shape.components.iter().map(|component| self.show(component, false)).collect();
                format!("{readonly}[{}]", components.join(", "))
            }
            Node::Object(shape) => {
                let fields = self.fields(shape);
                if fields.is_empty() { "{}".to_string() } else { format!("{{ {} }}", fields.join("; ")) }
            }
            Node::Record(shape) => {
                let prefix = if shape.readonly { "Readonly" } else { "" };
                format!("{prefix}Record<{}, {}>", self.show(&shape.key, false), self.show(&shape.value, false))
            }
            Node::Union(shape) => {
                let alternatives: Vec<String> =
                    shape.alternatives.iter().map(|alternative| self.show(alternative, true)).collect();
                parenthesize(alternatives.join(" | "), needs_parens)
            }
            Node::Intersect(shape) => {
                let objects: Option<Vec<&ObjectShape>> = shape
                    .parts
                    .iter()
                    .map(|part| match part.node() {
                        Node::Object(object) => Some(object),
                        _ => None,
                    })
                    .collect();
                match objects {
                    Some(objects) => {
                        let fields: Vec<String> =
                            objects.into_iter().flat_map(|object| self.fields(object)).collect();
                        if fields.is_empty() { "{}".to_string() } else { format!("{{ {} }}", fields.join("; ")) }
                    }
                    None => {
                        let parts: Vec<String> = shape.parts.iter().map(|part| self.show(part, true)).collect();
                        parenthesize(parts.join(" & "), needs_parens)
                    }
                }
            }
            Node::Constraint(shape) => match &shape.name {
                Some(name) => name.clone(),
                None => format!("WithConstraint<{}>", self.show(&shape.underlying, needs_parens)),
            },
            Node::Brand(shape) => self.show(&shape.entity, needs_parens),
            Node::Named(shape) => shape.name.clone(),
            Node::Lazy(shape) => self.show(shape.resolve(), needs_parens),
            // A seal with no definite key set checks nothing and renders as its target.
            Node::Sealed(shape) => match seal::fields(&shape.underlying, Mode::Parse) {
                Some(_) => format!("Sealed<{}>", self.show(&shape.underlying, false)),
                None => self.show(&shape.underlying, needs_parens),
            },
            Node::Parsed(shape) => shape.label(),
            Node::InstanceOf(class) => format!("InstanceOf<{class}>"),
            Node::KeyOf(shape) => parenthesize(shape.label.clone(), needs_parens),
            Node::Enum(shape) => shape.name.clone(),
            Node::Never => "never".to_string(),
            Node::Unknown => "unknown".to_string(),
        }
    }

    fn fields(&mut self, shape: &ObjectShape) -> Vec<String> {
        let readonly = if shape.readonly { "readonly " } else { "" };
        let optional = if shape.partial { "?" } else { "" };
        shape
            .fields
            .iter()
            .map(|(name, field)| format!("{readonly}{name}{optional}: {}", self.show(field, false)))
            .collect()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use crate::runtype::Runtype;
    use crate::types::*;

    fn cases() -> Vec<(Runtype, &'static str)> {
        vec![
            (unknown(), "unknown"),
            (never(), "never"),
            (undefined(), "undefined"),
            (null(), "null"),
            (boolean(), "boolean"),
            (symbol(), "symbol"),
            (function(), "function"),
            (literal(true), "true"),
            (literal(3.0), "3"),
            (literal("foo"), "\"foo\""),
            (array(string()), "string[]"),
            (readonly(&array(string())), "readonly string[]"),
            (record(string(), array(boolean())), "Record<string, boolean[]>"),
            (record(number(), array(boolean())), "Record<number, boolean[]>"),
            (object(Vec::<(String, Runtype)>::new()), "{}"),
            (readonly(&object(Vec::<(String, Runtype)>::new())), "{}"),
            (instance_of("TestClass"), "InstanceOf<TestClass>"),
            (array(instance_of("TestClass")), "InstanceOf<TestClass>[]"),
            (object([("x", string()), ("y", array(boolean()))]), "{ x: string; y: boolean[] }"),
            (
                intersect([object([("x", number())]), partial_object([("y", number())])]),
                "{ x: number; y?: number }",
            ),
            (
                readonly(&object([("x", string()), ("y", readonly(&array(boolean())))])),
                "{ readonly x: string; readonly y: readonly boolean[] }",
            ),
            (partial_object([("x", string()), ("y", array(boolean()))]), "{ x?: string; y?: boolean[] }"),
            (tuple([boolean(), number()]), "[boolean, number]"),
            (union([boolean(), number()]), "boolean | number"),
            (intersect([boolean(), number()]), "boolean & number"),
            (lazy(boolean), "boolean"),
            (number().with_constraint(|_| true), "WithConstraint<number>"),
            (brand("someNumber", number()), "number"),
            (brand("someNumber", number()).with_constraint(|_| true), "WithConstraint<number>"),
            (intersect([boolean(), union([number(), string()])]), "boolean & (number | string)"),
            (union([boolean(), intersect([number(), string()])]), "boolean | (number & string)"),
            (union([boolean(), object([("x", string()), ("y", number())])]), "boolean | { x: string; y: number }"),
            (array(union([string(), number()])), "(string | number)[]"),
            (sealed(object([("a", string())])), "Sealed<{ a: string }>"),
            (sealed(array(object([("a", string())]))), "{ a: string }[]"),
            (sealed_deep(record(string(), number())), "Record<string, number>"),
            (union([null(), sealed(intersect([object([("a", string())]), unknown()]))]), "null | ({ a: string } & unknown)"),
        ]
    }

    #[test]
    fn renders_like_type_annotations() {
        for (schema, expected) in cases() {
            assert_eq!(schema.show(), expected);
            assert_eq!(schema.to_string(), format!("Runtype<{expected}>"));
        }
    }

    #[test]
    fn cycles_render_once() {
        let schema = recursive(|list| object([("next", union([null(), list]))]));
        assert_eq!(schema.show(), "{ next: null | (CIRCULAR object) }");
    }
}

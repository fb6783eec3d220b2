//! Java-like rendering of nodes and type references.
//!
//! The output is what the source would have looked like modulo whitespace. Type resolution relies
//! on it for the textual form of qualified names (`java.util.List`, `Outer.Inner`).

use std::fmt;

use crate::hir::{Node, NodeId, SyntaxTree, TypeRef, WildcardRef};

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{p}"),
            TypeRef::Class { scope, name, args } => {
                if let Some(scope) = scope {
                    write!(f, "{scope}.")?;
                }
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array(component) => write!(f, "{component}[]"),
            TypeRef::Wildcard(WildcardRef::Unbounded) => f.write_str("?"),
            TypeRef::Wildcard(WildcardRef::Extends(bound)) => write!(f, "? extends {bound}"),
            TypeRef::Wildcard(WildcardRef::Super(bound)) => write!(f, "? super {bound}"),
            TypeRef::Void => f.write_str("void"),
            TypeRef::Var => f.write_str("var"),
            TypeRef::Unknown => Ok(()),
        }
    }
}

impl SyntaxTree {
    /// Source-like text of `id`.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_list(&self, ids: &[NodeId], sep: &str, out: &mut String) {
        for (idx, id) in ids.iter().enumerate() {
            if idx > 0 {
                out.push_str(sep);
            }
            self.write_node(*id, out);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self[id] {
            Node::TypeDecl { name, kind, members } => {
                out.push_str(&format!("{} {name} {{ ", class_keyword(*kind)));
                self.write_list(members, " ", out);
                out.push_str(" }");
            }
            Node::MethodDecl { name, params, body } => {
                out.push_str(name);
                out.push('(');
                self.write_list(params, ", ", out);
                out.push(')');
                if let Some(body) = body {
                    out.push(' ');
                    self.write_node(*body, out);
                }
            }
            Node::FieldDecl { variables } | Node::VarDeclExpr { variables } => {
                if let Some(Node::VariableDeclarator { ty, .. }) =
                    variables.first().map(|v| &self[*v])
                {
                    out.push_str(&format!("{ty} "));
                }
                self.write_list(variables, ", ", out);
                if matches!(self[id], Node::FieldDecl { .. }) {
                    out.push(';');
                }
            }
            Node::VariableDeclarator {
                name,
                extra_dims,
                init,
                ..
            } => {
                out.push_str(name);
                for _ in 0..*extra_dims {
                    out.push_str("[]");
                }
                if let Some(init) = init {
                    out.push_str(" = ");
                    self.write_node(*init, out);
                }
            }
            Node::Parameter {
                name,
                ty,
                is_varargs,
            } => match ty {
                TypeRef::Unknown => out.push_str(name),
                _ if *is_varargs => out.push_str(&format!("{ty}... {name}")),
                _ => out.push_str(&format!("{ty} {name}")),
            },
            Node::Block { stmts } => {
                out.push_str("{ ");
                self.write_list(stmts, " ", out);
                out.push_str(" }");
            }
            Node::ExprStmt { expr } => {
                self.write_node(*expr, out);
                out.push(';');
            }
            Node::Return { expr } => {
                out.push_str("return");
                if let Some(expr) = expr {
                    out.push(' ');
                    self.write_node(*expr, out);
                }
                out.push(';');
            }
            Node::LocalVarStmt { decl } => {
                self.write_node(*decl, out);
                out.push(';');
            }
            Node::ArrayAccess { array, index } => {
                self.write_node(*array, out);
                out.push('[');
                self.write_node(*index, out);
                out.push(']');
            }
            Node::ArrayCreation {
                element,
                dims,
                init,
            } => {
                out.push_str(&format!("new {element}"));
                for dim in dims {
                    out.push('[');
                    if let Some(dim) = dim {
                        self.write_node(*dim, out);
                    }
                    out.push(']');
                }
                if let Some(init) = init {
                    out.push(' ');
                    self.write_node(*init, out);
                }
            }
            Node::ArrayInit { values } => {
                out.push('{');
                self.write_list(values, ", ", out);
                out.push('}');
            }
            Node::Assign { op, target, value } => {
                self.write_node(*target, out);
                out.push_str(&format!(" {} ", op.symbol()));
                self.write_node(*value, out);
            }
            Node::Binary { op, lhs, rhs } => {
                self.write_node(*lhs, out);
                out.push_str(&format!(" {} ", op.symbol()));
                self.write_node(*rhs, out);
            }
            Node::Cast { ty, expr } => {
                out.push_str(&format!("({ty}) "));
                self.write_node(*expr, out);
            }
            Node::ClassLit { ty } => out.push_str(&format!("{ty}.class")),
            Node::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.write_node(*condition, out);
                out.push_str(" ? ");
                self.write_node(*then_expr, out);
                out.push_str(" : ");
                self.write_node(*else_expr, out);
            }
            Node::Enclosed { inner } => {
                out.push('(');
                self.write_node(*inner, out);
                out.push(')');
            }
            Node::FieldAccess { scope, name } => {
                self.write_node(*scope, out);
                out.push('.');
                out.push_str(name);
            }
            Node::InstanceOf { expr, ty } => {
                self.write_node(*expr, out);
                out.push_str(&format!(" instanceof {ty}"));
            }
            Node::Literal { text, .. } => out.push_str(text),
            Node::MethodCall { scope, name, args } => {
                if let Some(scope) = scope {
                    self.write_node(*scope, out);
                    out.push('.');
                }
                out.push_str(name);
                out.push('(');
                self.write_list(args, ", ", out);
                out.push(')');
            }
            Node::Name { name } => out.push_str(name),
            Node::TypeExpr { ty } => out.push_str(&ty.to_string()),
            Node::ObjectCreation { ty, args, body } => {
                out.push_str(&format!("new {ty}("));
                self.write_list(args, ", ", out);
                out.push(')');
                if let Some(members) = body {
                    out.push_str(" { ");
                    self.write_list(members, " ", out);
                    out.push_str(" }");
                }
            }
            Node::This { qualifier } => match qualifier {
                Some(q) => out.push_str(&format!("{q}.this")),
                None => out.push_str("this"),
            },
            Node::Super { qualifier } => match qualifier {
                Some(q) => out.push_str(&format!("{q}.super")),
                None => out.push_str("super"),
            },
            Node::Unary { op, expr } => {
                if op.is_postfix() {
                    self.write_node(*expr, out);
                    out.push_str(op.symbol());
                } else {
                    out.push_str(op.symbol());
                    self.write_node(*expr, out);
                }
            }
            Node::Lambda { params, body } => {
                out.push('(');
                self.write_list(params, ", ", out);
                out.push_str(") -> ");
                self.write_node(*body, out);
            }
            Node::MethodRef { scope, name } => {
                self.write_node(*scope, out);
                out.push_str("::");
                out.push_str(name);
            }
        }
    }
}

fn class_keyword(kind: nova_types::ClassKind) -> &'static str {
    match kind {
        nova_types::ClassKind::Class => "class",
        nova_types::ClassKind::Interface => "interface",
        nova_types::ClassKind::Enum => "enum",
        nova_types::ClassKind::Record => "record",
        nova_types::ClassKind::Annotation => "@interface",
    }
}

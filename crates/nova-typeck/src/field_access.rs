//! `a.b` is syntactically a package, type or field access. Interpretations are tried in a fixed
//! order and the first one that resolves wins.

use nova_hir::{Node, NodeId};
use nova_types::{declared_type, find_field, ClassId, SymbolReference, Type};

use crate::error::{Result, TypeckError};
use crate::resolver::{unknown_class, TypeResolver};

type Strategy<'a> = fn(&TypeResolver<'a>, NodeId, NodeId, &str) -> Result<Option<Type>>;

impl<'a> TypeResolver<'a> {
    pub(crate) fn field_access_type(&self, node: NodeId) -> Result<Type> {
        let Node::FieldAccess { scope, name } = self.node(node)? else {
            return Err(TypeckError::InvariantViolation(format!(
                "{node:?} is not a field access"
            )));
        };

        let strategies: [(&str, Strategy<'a>); 5] = [
            ("static type scope", Self::access_on_type_scope),
            ("this scope", Self::access_on_this),
            ("qualified type scope", Self::access_on_qualified_scope),
            ("value", Self::access_as_value),
            ("qualified type", Self::access_as_type),
        ];
        for (label, strategy) in strategies {
            match strategy(self, node, *scope, name) {
                Ok(Some(ty)) => {
                    tracing::trace!(target: "nova.typeck", ?node, strategy = label, "field access resolved");
                    return Ok(ty);
                }
                Ok(None) => {}
                Err(err) if err.is_unresolved() => {
                    tracing::trace!(target: "nova.typeck", ?node, strategy = label, %err, "strategy failed");
                }
                Err(err) => return Err(err),
            }
        }
        Err(TypeckError::unresolved_in(name.clone(), self.tree().text(node)))
    }

    fn access_on_type_scope(&self, node: NodeId, scope: NodeId, name: &str) -> Result<Option<Type>> {
        if !matches!(self.node(scope)?, Node::Name { .. } | Node::FieldAccess { .. }) {
            return Ok(None);
        }
        match self.context().scopes.solve_type(&self.tree().text(scope), node) {
            SymbolReference::Solved(id) => self.member_type(id, name),
            SymbolReference::Unsolved => Ok(None),
        }
    }

    fn access_on_this(&self, _node: NodeId, scope: NodeId, name: &str) -> Result<Option<Type>> {
        let Node::This { qualifier } = self.node(scope)? else {
            return Ok(None);
        };
        match self.this_type(scope, qualifier.as_deref())? {
            Type::Class(ct) => self.member_type(ct.def, name),
            _ => Ok(None),
        }
    }

    fn access_on_qualified_scope(
        &self,
        _node: NodeId,
        scope: NodeId,
        name: &str,
    ) -> Result<Option<Type>> {
        let text = self.tree().text(scope);
        if !text.contains('.') {
            return Ok(None);
        }
        match self.context().types.try_to_solve_type(&text) {
            SymbolReference::Solved(id) => self.member_type(id, name),
            SymbolReference::Unsolved => Ok(None),
        }
    }

    fn access_as_value(&self, node: NodeId, _scope: NodeId, name: &str) -> Result<Option<Type>> {
        let value = self.context().symbols.solve_symbol_as_value(self, name, node)?;
        Ok(value.map(|v| v.ty))
    }

    fn access_as_type(&self, node: NodeId, _scope: NodeId, _name: &str) -> Result<Option<Type>> {
        let text = self.tree().text(node);
        Ok(self
            .context()
            .types
            .try_to_solve_type(&text)
            .solved()
            .map(|id| declared_type(self.env(), id)))
    }

    /// `name` as a member of `class`: enum constant, then field, then nested type.
    fn member_type(&self, class: ClassId, name: &str) -> Result<Option<Type>> {
        let env = self.env();
        let def = env.class(class).ok_or_else(|| unknown_class(class))?;
        if def.is_enum() && def.has_enum_constant(name) {
            return Ok(Some(declared_type(env, class)));
        }
        if let Some(field) = find_field(env, class, name) {
            return Ok(Some(field.ty.clone()));
        }
        let nested = def
            .nested_types
            .iter()
            .copied()
            .find(|id| env.class(*id).is_some_and(|n| n.simple_name() == name));
        Ok(nested.map(|id| declared_type(env, id)))
    }
}

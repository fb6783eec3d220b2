use std::collections::HashMap;

use nova_hir::{NodeId, SyntaxTree};
use nova_typeck::{ResolverOptions, Result, TypeCache, TypeResolver, TypeckContext};
use nova_types::{format_type, ClassDef, ClassId, ClassKind, Type, TypeEnv, TypeStore, TypeVarId};

#[derive(Debug, Clone)]
pub(crate) struct Local {
    pub(crate) name: String,
    pub(crate) ty: Type,
    /// Visible only at or below this node. `None` means everywhere.
    pub(crate) scope: Option<NodeId>,
}

/// A declaration store, a syntax tree and the name tables the resolution services read.
///
/// The minimal JDK from [`TypeStore::with_minimal_jdk`] is always present. Binding a `TypeDecl`
/// (or anonymous class) node to a [`ClassId`] makes its fields, methods and member types visible
/// to nodes inside it.
#[derive(Debug, Default)]
pub struct TypeckFixture {
    pub store: TypeStore,
    pub tree: SyntaxTree,
    pub(crate) locals: Vec<Local>,
    pub(crate) imports: HashMap<String, ClassId>,
    pub(crate) declarations: HashMap<NodeId, ClassId>,
    pub(crate) generics: HashMap<String, Type>,
}

impl TypeckFixture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of a class known to the store. Panics if there is none.
    #[track_caller]
    pub fn class(&self, name: &str) -> ClassId {
        self.store
            .lookup_class(name)
            .unwrap_or_else(|| panic!("no class named `{name}` in the fixture store"))
    }

    #[track_caller]
    pub fn class_type(&self, name: &str, args: Vec<Type>) -> Type {
        Type::class(self.class(name), args)
    }

    pub fn string(&self) -> Type {
        Type::class(self.store.well_known().string, vec![])
    }

    /// Declare a class with no members beyond what `configure` adds, extending `Object`.
    pub fn declare_class(
        &mut self,
        name: &str,
        kind: ClassKind,
        configure: impl FnOnce(&mut TypeStore, &mut ClassDef),
    ) -> ClassId {
        let object = Type::class(self.store.well_known().object, vec![]);
        let mut def = ClassDef {
            name: name.to_string(),
            kind,
            type_params: Vec::new(),
            super_class: (kind != ClassKind::Interface).then_some(object),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            nested_types: Vec::new(),
        };
        let id = self.store.intern_class_id(name);
        configure(&mut self.store, &mut def);
        self.store.define_class(id, def);
        id
    }

    /// A type variable with an `Object` bound.
    pub fn type_param(&mut self, name: &str) -> TypeVarId {
        let object = Type::class(self.store.well_known().object, vec![]);
        self.store.add_type_param(name, vec![object])
    }

    /// A local visible from every node.
    pub fn add_local(&mut self, name: &str, ty: Type) {
        self.locals.push(Local {
            name: name.to_string(),
            ty,
            scope: None,
        });
    }

    /// A local visible from `scope` and its descendants.
    pub fn add_local_in(&mut self, scope: NodeId, name: &str, ty: Type) {
        self.locals.push(Local {
            name: name.to_string(),
            ty,
            scope: Some(scope),
        });
    }

    /// Make a class visible by its simple name.
    #[track_caller]
    pub fn import(&mut self, canonical: &str) {
        let id = self.class(canonical);
        let simple = canonical.rsplit('.').next().unwrap_or(canonical);
        self.imports.insert(simple.to_string(), id);
    }

    /// Associate a `TypeDecl` or anonymous class node with its class.
    pub fn bind_declaration(&mut self, node: NodeId, class: ClassId) {
        self.declarations.insert(node, class);
    }

    /// Type an enclosing generic context assigns to the type variable `name`.
    pub fn bind_generic(&mut self, name: &str, ty: Type) {
        self.generics.insert(name.to_string(), ty);
    }

    pub fn context(&self) -> TypeckContext<'_> {
        TypeckContext {
            env: &self.store,
            tree: &self.tree,
            facade: self,
            symbols: self,
            scopes: self,
            types: self,
        }
    }

    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(self.context())
    }

    pub fn resolver_with(&self, options: ResolverOptions) -> TypeResolver<'_> {
        TypeResolver::with_options(self.context(), options)
    }

    pub fn cached_resolver<'a>(&'a self, cache: &'a TypeCache) -> TypeResolver<'a> {
        self.resolver().with_cache(cache)
    }

    pub fn type_of(&self, node: NodeId) -> Result<Type> {
        self.resolver().resolve(node, true)
    }

    pub fn shallow_type_of(&self, node: NodeId) -> Result<Type> {
        self.resolver().resolve(node, false)
    }

    /// Rendered type of `node`. Panics when resolution fails.
    #[track_caller]
    pub fn describe(&self, node: NodeId) -> String {
        match self.type_of(node) {
            Ok(ty) => self.render(&ty),
            Err(err) => panic!("`{}` failed to resolve: {err}", self.tree.text(node)),
        }
    }

    #[track_caller]
    pub fn describe_shallow(&self, node: NodeId) -> String {
        match self.shallow_type_of(node) {
            Ok(ty) => self.render(&ty),
            Err(err) => panic!("`{}` failed to resolve: {err}", self.tree.text(node)),
        }
    }

    pub fn render(&self, ty: &Type) -> String {
        format_type(&self.store, ty)
    }

    /// Classes bound to `node` or to one of its ancestors, innermost first.
    pub(crate) fn enclosing_classes(&self, node: NodeId) -> Vec<ClassId> {
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .filter_map(|id| self.declarations.get(&id).copied())
            .collect()
    }
}

//! Semantic type model for Nova's Java expression typing.
//!
//! This crate holds the resolved-type representation ([`Type`]), the declaration store used to
//! answer questions about classes and type parameters ([`TypeStore`] / [`TypeEnv`]), method
//! usages bound to a call site ([`MethodUsage`]) and the Java-specific algorithms built on top of
//! them (promotion, assignability, inference and functional interface lookup, see [`java`]).
//!
//! Nothing in here refers back to syntax: a [`Type`] is a plain immutable value and two
//! structurally equal types compare equal.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod java;
mod store;

pub use java::format::{format_method_usage, format_type};
pub use java::helpers::{
    declared_type, find_field, functional_method, instantiate_as_supertype, param_for_argument,
    sam_signature,
    type_parameters_map, use_type_parameters_on, SamSignature,
};
pub use java::inference::InferenceContext;
pub use java::promotion::{
    binary_operation_type, box_type, is_boolean_like, is_compatible, is_numeric_type,
    unary_numeric_promotion, unbox_type, BinaryOperator,
};
pub use java::subtyping::{is_assignable, is_subclass};
pub use store::TypeStore;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        TypeVarId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeVarId({})", self.0)
    }
}

/// A method declaration, addressed by its owning class and its position in
/// [`ClassDef::methods`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub owner: ClassId,
    pub index: u32,
}

impl MethodId {
    #[must_use]
    pub fn new(owner: ClassId, index: usize) -> Self {
        Self {
            owner,
            index: index as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// Java keyword for this primitive.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PrimitiveType::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Every primitive except `boolean` is numeric (`char` included, JLS 4.2).
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean)
    }

    #[must_use]
    pub fn in_set(self, set: &[PrimitiveType]) -> bool {
        set.contains(&self)
    }

    /// Binary name of the wrapper class produced by boxing conversion (JLS 5.1.7).
    #[must_use]
    pub fn box_class_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    #[must_use]
    pub fn from_box_class_name(name: &str) -> Option<Self> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| p.box_class_name() == name)
    }

    /// Unary numeric promotion (JLS 5.6.1) restricted to primitives.
    #[must_use]
    pub fn unary_promotion(self) -> PrimitiveType {
        match self {
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => PrimitiveType::Int,
            other => other,
        }
    }

    /// Binary numeric promotion (JLS 5.6.2) of two numeric primitives.
    #[must_use]
    pub fn binary_promotion(self, other: PrimitiveType) -> PrimitiveType {
        use PrimitiveType::*;
        if self == Double || other == Double {
            Double
        } else if self == Float || other == Float {
            Float
        } else if self == Long || other == Long {
            Long
        } else {
            Int
        }
    }

    /// Widening primitive conversion (JLS 5.1.2), including identity.
    #[must_use]
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

impl WildcardBound {
    #[must_use]
    pub fn bound(&self) -> Option<&Type> {
        match self {
            WildcardBound::Unbounded => None,
            WildcardBound::Extends(ty) | WildcardBound::Super(ty) => Some(ty),
        }
    }

    #[must_use]
    pub fn is_super(&self) -> bool {
        matches!(self, WildcardBound::Super(_))
    }
}

/// A statically resolved Java type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    /// Only produced as a type argument or a method parameter type.
    Wildcard(WildcardBound),
    /// Only valid as a method return type.
    Void,
    Null,
}

impl Type {
    #[must_use]
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    #[must_use]
    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    #[must_use]
    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    #[must_use]
    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Reference types in the sense of this model: class types, arrays and type variables.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_) | Type::TypeVar(_))
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self, Type::Class(_))
    }

    #[must_use]
    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(ct) => Some(ct),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    #[must_use]
    pub fn component_type(&self) -> Option<&Type> {
        match self {
            Type::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Number of `[]` levels.
    #[must_use]
    pub fn array_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Type::Array(component) = current {
            depth += 1;
            current = component;
        }
        depth
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Type::Wildcard(_))
    }

    /// Visit every type variable mentioned by this type, in left-to-right order.
    pub fn for_each_type_var(&self, f: &mut impl FnMut(TypeVarId)) {
        match self {
            Type::TypeVar(id) => f(*id),
            Type::Class(ClassType { args, .. }) => {
                for arg in args {
                    arg.for_each_type_var(f);
                }
            }
            Type::Array(component) => component.for_each_type_var(f),
            Type::Wildcard(bound) => {
                if let Some(bound) = bound.bound() {
                    bound.for_each_type_var(f);
                }
            }
            Type::Primitive(_) | Type::Void | Type::Null => {}
        }
    }

    #[must_use]
    pub fn mentions_type_vars(&self) -> bool {
        let mut found = false;
        self.for_each_type_var(&mut |_| found = true);
        found
    }
}

/// Substitute type variables according to `subst`. Variables missing from the map are kept.
#[must_use]
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    if subst.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => {
            Type::class(*def, args.iter().map(|a| substitute(a, subst)).collect())
        }
        Type::Array(component) => Type::array(substitute(component, subst)),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(upper, subst))))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(lower, subst))))
        }
        Type::Wildcard(WildcardBound::Unbounded)
        | Type::Primitive(_)
        | Type::Void
        | Type::Null => ty.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Canonical dotted name (`java.util.Map.Entry`).
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    /// `None` only for `java.lang.Object` and for interfaces.
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub enum_constants: Vec<String>,
    pub nested_types: Vec<ClassId>,
}

impl ClassDef {
    /// Last segment of the canonical name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::Annotation)
    }

    /// Class-like declarations proper. Enums and records are reported separately.
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.kind == ClassKind::Class
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    #[must_use]
    pub fn has_enum_constant(&self, name: &str) -> bool {
        self.enum_constants.iter().any(|c| c == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub class: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub void: ClassId,
}

impl WellKnownTypes {
    /// Wrapper class of `prim` (JLS 5.1.7).
    #[must_use]
    pub fn boxed(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// Inverse of [`WellKnownTypes::boxed`].
    #[must_use]
    pub fn unboxed(&self, class: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|prim| self.boxed(*prim) == class)
    }
}

/// Read-only view over the declaration model.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    /// Look up a class by canonical name, or by simple name for `java.lang` types.
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;

    fn method(&self, id: MethodId) -> Option<&MethodDef> {
        self.class(id.owner)?.methods.get(id.index as usize)
    }
}

/// Result of a name or type lookup performed by a resolution service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolReference<D> {
    Solved(D),
    Unsolved,
}

impl<D> SymbolReference<D> {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        matches!(self, SymbolReference::Solved(_))
    }

    #[must_use]
    pub fn solved(self) -> Option<D> {
        match self {
            SymbolReference::Solved(decl) => Some(decl),
            SymbolReference::Unsolved => None,
        }
    }

    #[must_use]
    pub fn as_ref(&self) -> SymbolReference<&D> {
        match self {
            SymbolReference::Solved(decl) => SymbolReference::Solved(decl),
            SymbolReference::Unsolved => SymbolReference::Unsolved,
        }
    }

    pub fn map<E>(self, f: impl FnOnce(D) -> E) -> SymbolReference<E> {
        match self {
            SymbolReference::Solved(decl) => SymbolReference::Solved(f(decl)),
            SymbolReference::Unsolved => SymbolReference::Unsolved,
        }
    }
}

impl<D> From<Option<D>> for SymbolReference<D> {
    fn from(value: Option<D>) -> Self {
        match value {
            Some(decl) => SymbolReference::Solved(decl),
            None => SymbolReference::Unsolved,
        }
    }
}

/// A method declaration viewed from one call site: parameter and return types have had the
/// call-site generic substitution applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodUsage {
    pub method: MethodId,
    pub name: String,
    params: Vec<Type>,
    return_type: Type,
}

impl MethodUsage {
    #[must_use]
    pub fn new(method: MethodId, name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            method,
            name: name.into(),
            params,
            return_type,
        }
    }

    /// Usage with the declared (unsubstituted) signature.
    #[must_use]
    pub fn from_declaration(env: &dyn TypeEnv, method: MethodId) -> Option<Self> {
        let def = env.method(method)?;
        Some(Self::new(
            method,
            def.name.clone(),
            def.params.clone(),
            def.return_type.clone(),
        ))
    }

    #[must_use]
    pub fn declaring_class(&self) -> ClassId {
        self.method.owner
    }

    #[must_use]
    pub fn params(&self) -> &[Type] {
        &self.params
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn param_type(&self, idx: usize) -> Option<&Type> {
        self.params.get(idx)
    }

    #[must_use]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Replace every occurrence of `tv` in the signature.
    #[must_use]
    pub fn replace_type_parameter(self, tv: TypeVarId, ty: &Type) -> Self {
        let subst = HashMap::from([(tv, ty.clone())]);
        self.substituted(&subst)
    }

    #[must_use]
    pub fn substituted(self, subst: &HashMap<TypeVarId, Type>) -> Self {
        Self {
            params: self.params.iter().map(|p| substitute(p, subst)).collect(),
            return_type: substitute(&self.return_type, subst),
            ..self
        }
    }

    #[must_use]
    pub fn replace_param_type(mut self, idx: usize, ty: Type) -> Self {
        if let Some(slot) = self.params.get_mut(idx) {
            *slot = ty;
        }
        self
    }

    #[must_use]
    pub fn with_return_type(self, return_type: Type) -> Self {
        Self {
            return_type,
            ..self
        }
    }
}

use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, ClassKind, MethodDef, PrimitiveType, Type, TypeEnv, TypeParamDef,
    TypeVarId, WellKnownTypes, WildcardBound,
};

/// Owned, in-memory declaration model.
///
/// Classes are addressed by [`ClassId`] and looked up by canonical dotted name. Simple names are
/// accepted for `java.lang` types, mirroring the implicit `java.lang.*` import.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    type_params: Vec<TypeParamDef>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store seeded with the handful of JDK types that expression typing depends on.
    #[must_use]
    pub fn with_minimal_jdk() -> Self {
        let placeholder = ClassId::from_raw(0);
        let mut store = TypeStore {
            classes: Vec::new(),
            type_params: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes {
                object: placeholder,
                string: placeholder,
                class: placeholder,
                cloneable: placeholder,
                serializable: placeholder,
                boolean: placeholder,
                byte: placeholder,
                short: placeholder,
                character: placeholder,
                integer: placeholder,
                long: placeholder,
                float: placeholder,
                double: placeholder,
                void: placeholder,
            },
        };
        store.seed_minimal_jdk();
        store
    }

    /// Return the id registered for `name`, allocating an empty placeholder class if needed.
    ///
    /// Placeholders let callers build mutually recursive declarations before defining them.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId::from_raw(self.classes.len() as u32);
        self.classes.push(ClassDef {
            name: name.to_string(),
            kind: ClassKind::Class,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            nested_types: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Replace the definition stored under `id`.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        if self.classes[id.idx()].name != def.name {
            let old = std::mem::take(&mut self.classes[id.idx()].name);
            self.by_name.remove(&old);
            self.by_name.insert(def.name.clone(), id);
        }
        self.classes[id.idx()] = def;
    }

    /// Insert `def`, reusing the id of an existing class with the same name.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    /// Register `nested` as a member type of `outer`.
    pub fn add_nested_type(&mut self, outer: ClassId, nested: ClassId) {
        let def = &mut self.classes[outer.idx()];
        if !def.nested_types.contains(&nested) {
            def.nested_types.push(nested);
        }
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx())
    }

    /// Exact lookup by canonical name.
    #[must_use]
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn iter_classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, def)| (ClassId::from_raw(idx as u32), def))
    }

    fn object_type(&self) -> Type {
        Type::class(self.well_known.object, vec![])
    }

    fn simple_class(&mut self, name: &str, kind: ClassKind, interfaces: Vec<Type>) -> ClassId {
        let super_class = match kind {
            ClassKind::Interface | ClassKind::Annotation => None,
            _ => Some(self.object_type()),
        };
        self.add_class(ClassDef {
            name: name.to_string(),
            kind,
            type_params: vec![],
            super_class,
            interfaces,
            fields: vec![],
            methods: vec![],
            enum_constants: vec![],
            nested_types: vec![],
        })
    }

    fn boxed_class(&mut self, prim: PrimitiveType, numeric: bool, comparable: ClassId) -> ClassId {
        let name = prim.box_class_name();
        let id = self.intern_class_id(name);
        let super_class = if numeric {
            let number = self.class_id("java.lang.Number");
            number.map(|n| Type::class(n, vec![]))
        } else {
            Some(self.object_type())
        };
        let serializable = Type::class(self.well_known.serializable, vec![]);
        self.define_class(
            id,
            ClassDef {
                name: name.to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class,
                interfaces: vec![
                    serializable,
                    Type::class(comparable, vec![Type::class(id, vec![])]),
                ],
                fields: vec![],
                methods: vec![
                    instance_method(&format!("{}Value", prim.name()), vec![], Type::Primitive(prim)),
                    MethodDef {
                        name: "valueOf".to_string(),
                        type_params: vec![],
                        params: vec![Type::Primitive(prim)],
                        return_type: Type::class(id, vec![]),
                        is_static: true,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );
        id
    }

    fn generic_interface(
        &mut self,
        name: &str,
        params: &[&str],
        build: impl FnOnce(&mut Self, &[TypeVarId]) -> (Vec<Type>, Vec<MethodDef>),
    ) -> ClassId {
        let id = self.intern_class_id(name);
        let object = self.object_type();
        let vars: Vec<TypeVarId> = params
            .iter()
            .map(|p| self.add_type_param(*p, vec![object.clone()]))
            .collect();
        let (interfaces, methods) = build(&mut *self, vars.as_slice());
        self.define_class(
            id,
            ClassDef {
                name: name.to_string(),
                kind: ClassKind::Interface,
                type_params: vars,
                super_class: None,
                interfaces,
                fields: vec![],
                methods,
                enum_constants: vec![],
                nested_types: vec![],
            },
        );
        id
    }

    fn seed_minimal_jdk(&mut self) {
        let object = self.intern_class_id("java.lang.Object");
        self.well_known.object = object;
        let string_id = self.intern_class_id("java.lang.String");
        let string = Type::class(string_id, vec![]);
        let object_ty = self.object_type();
        self.define_class(
            object,
            ClassDef {
                name: "java.lang.Object".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                methods: vec![
                    instance_method("equals", vec![object_ty.clone()], Type::boolean()),
                    instance_method("hashCode", vec![], Type::int()),
                    instance_method("toString", vec![], string.clone()),
                ],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );

        self.well_known.cloneable = self.simple_class("java.lang.Cloneable", ClassKind::Interface, vec![]);
        self.well_known.serializable =
            self.simple_class("java.io.Serializable", ClassKind::Interface, vec![]);

        let comparable = self.generic_interface("java.lang.Comparable", &["T"], |_, vars| {
            let t = Type::TypeVar(vars[0]);
            (vec![], vec![abstract_method("compareTo", vec![t], Type::int())])
        });
        self.generic_interface("java.lang.CharSequence", &[], |_, _| {
            (vec![], vec![abstract_method("length", vec![], Type::int())])
        });
        let char_sequence = self.class_id("java.lang.CharSequence").map(|c| Type::class(c, vec![]));

        let serializable = Type::class(self.well_known.serializable, vec![]);
        let mut string_ifaces = vec![
            serializable.clone(),
            Type::class(comparable, vec![string.clone()]),
        ];
        string_ifaces.extend(char_sequence);
        self.define_class(
            string_id,
            ClassDef {
                name: "java.lang.String".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object_ty.clone()),
                interfaces: string_ifaces,
                fields: vec![],
                methods: vec![
                    instance_method("length", vec![], Type::int()),
                    instance_method("isEmpty", vec![], Type::boolean()),
                    instance_method(
                        "charAt",
                        vec![Type::int()],
                        Type::Primitive(PrimitiveType::Char),
                    ),
                    instance_method("trim", vec![], string.clone()),
                    instance_method("toUpperCase", vec![], string.clone()),
                    MethodDef {
                        name: "valueOf".to_string(),
                        type_params: vec![],
                        params: vec![object_ty.clone()],
                        return_type: string.clone(),
                        is_static: true,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );
        self.well_known.string = string_id;

        self.simple_class("java.lang.Number", ClassKind::Class, vec![serializable]);
        self.well_known.boolean = self.boxed_class(PrimitiveType::Boolean, false, comparable);
        self.well_known.byte = self.boxed_class(PrimitiveType::Byte, true, comparable);
        self.well_known.short = self.boxed_class(PrimitiveType::Short, true, comparable);
        self.well_known.character = self.boxed_class(PrimitiveType::Char, false, comparable);
        self.well_known.integer = self.boxed_class(PrimitiveType::Int, true, comparable);
        self.well_known.long = self.boxed_class(PrimitiveType::Long, true, comparable);
        self.well_known.float = self.boxed_class(PrimitiveType::Float, true, comparable);
        self.well_known.double = self.boxed_class(PrimitiveType::Double, true, comparable);
        self.well_known.void = self.simple_class("java.lang.Void", ClassKind::Class, vec![]);

        let class_id = self.intern_class_id("java.lang.Class");
        let class_t = self.add_type_param("T", vec![object_ty.clone()]);
        self.define_class(
            class_id,
            ClassDef {
                name: "java.lang.Class".to_string(),
                kind: ClassKind::Class,
                type_params: vec![class_t],
                super_class: Some(object_ty.clone()),
                interfaces: vec![],
                fields: vec![],
                methods: vec![instance_method("getName", vec![], string.clone())],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );
        self.well_known.class = class_id;

        self.generic_interface("java.lang.Runnable", &[], |_, _| {
            (vec![], vec![abstract_method("run", vec![], Type::Void)])
        });

        // java.util.function
        let function = self.generic_interface("java.util.function.Function", &["T", "R"], |_, v| {
            let (t, r) = (Type::TypeVar(v[0]), Type::TypeVar(v[1]));
            (vec![], vec![abstract_method("apply", vec![t], r)])
        });
        self.generic_interface("java.util.function.BiFunction", &["T", "U", "R"], |_, v| {
            let (t, u, r) = (Type::TypeVar(v[0]), Type::TypeVar(v[1]), Type::TypeVar(v[2]));
            (vec![], vec![abstract_method("apply", vec![t, u], r)])
        });
        self.generic_interface("java.util.function.UnaryOperator", &["T"], |_, v| {
            let t = Type::TypeVar(v[0]);
            (vec![Type::class(function, vec![t.clone(), t])], vec![])
        });
        let supplier = self.generic_interface("java.util.function.Supplier", &["T"], |_, v| {
            (vec![], vec![abstract_method("get", vec![], Type::TypeVar(v[0]))])
        });
        let consumer = self.generic_interface("java.util.function.Consumer", &["T"], |_, v| {
            (vec![], vec![abstract_method("accept", vec![Type::TypeVar(v[0])], Type::Void)])
        });
        let predicate = self.intern_class_id("java.util.function.Predicate");
        self.generic_interface("java.util.function.Predicate", &["T"], |_, v| {
            let t = Type::TypeVar(v[0]);
            (
                vec![],
                vec![
                    abstract_method("test", vec![t.clone()], Type::boolean()),
                    // default method: not part of the functional signature
                    instance_method("negate", vec![], Type::class(predicate, vec![t])),
                ],
            )
        });

        // java.util
        let iterable = self.generic_interface("java.lang.Iterable", &["T"], |_, v| {
            let t = Type::TypeVar(v[0]);
            (
                vec![],
                vec![instance_method(
                    "forEach",
                    vec![Type::class(consumer, vec![super_of(t)])],
                    Type::Void,
                )],
            )
        });
        let stream_id = self.intern_class_id("java.util.stream.Stream");
        let collection = self.generic_interface("java.util.Collection", &["E"], |_, v| {
            let e = Type::TypeVar(v[0]);
            (
                vec![Type::class(iterable, vec![e.clone()])],
                vec![
                    abstract_method("size", vec![], Type::int()),
                    abstract_method("add", vec![e.clone()], Type::boolean()),
                    instance_method("stream", vec![], Type::class(stream_id, vec![e])),
                ],
            )
        });
        let list = self.generic_interface("java.util.List", &["E"], |_, v| {
            let e = Type::TypeVar(v[0]);
            (
                vec![Type::class(collection, vec![e.clone()])],
                vec![abstract_method("get", vec![Type::int()], e)],
            )
        });
        let array_list = self.intern_class_id("java.util.ArrayList");
        let array_list_e = self.add_type_param("E", vec![object_ty.clone()]);
        self.define_class(
            array_list,
            ClassDef {
                name: "java.util.ArrayList".to_string(),
                kind: ClassKind::Class,
                type_params: vec![array_list_e],
                super_class: Some(object_ty.clone()),
                interfaces: vec![Type::class(list, vec![Type::TypeVar(array_list_e)])],
                fields: vec![],
                methods: vec![],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );

        let optional = self.intern_class_id("java.util.Optional");
        let optional_t = self.add_type_param("T", vec![object_ty.clone()]);
        let optional_u = self.add_type_param("U", vec![object_ty.clone()]);
        let t = Type::TypeVar(optional_t);
        let u = Type::TypeVar(optional_u);
        self.define_class(
            optional,
            ClassDef {
                name: "java.util.Optional".to_string(),
                kind: ClassKind::Class,
                type_params: vec![optional_t],
                super_class: Some(object_ty.clone()),
                interfaces: vec![],
                fields: vec![],
                methods: vec![
                    instance_method("get", vec![], t.clone()),
                    instance_method("orElseGet", vec![Type::class(supplier, vec![extends(t.clone())])], t.clone()),
                    MethodDef {
                        name: "map".to_string(),
                        type_params: vec![optional_u],
                        params: vec![Type::class(
                            function,
                            vec![super_of(t.clone()), extends(u.clone())],
                        )],
                        return_type: Type::class(optional, vec![u]),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: false,
                    },
                ],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );

        // java.util.stream.Stream<T>
        let stream_t = self.add_type_param("T", vec![object_ty.clone()]);
        let stream_r = self.add_type_param("R", vec![object_ty.clone()]);
        let t = Type::TypeVar(stream_t);
        let r = Type::TypeVar(stream_r);
        self.define_class(
            stream_id,
            ClassDef {
                name: "java.util.stream.Stream".to_string(),
                kind: ClassKind::Interface,
                type_params: vec![stream_t],
                super_class: None,
                interfaces: vec![],
                fields: vec![],
                methods: vec![
                    MethodDef {
                        name: "map".to_string(),
                        type_params: vec![stream_r],
                        params: vec![Type::class(
                            function,
                            vec![super_of(t.clone()), extends(r.clone())],
                        )],
                        return_type: Type::class(stream_id, vec![r]),
                        is_static: false,
                        is_varargs: false,
                        is_abstract: true,
                    },
                    abstract_method(
                        "filter",
                        vec![Type::class(predicate, vec![super_of(t.clone())])],
                        Type::class(stream_id, vec![t.clone()]),
                    ),
                    abstract_method(
                        "forEach",
                        vec![Type::class(consumer, vec![super_of(t.clone())])],
                        Type::Void,
                    ),
                    abstract_method("count", vec![], Type::Primitive(PrimitiveType::Long)),
                ],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );
    }
}

fn super_of(ty: Type) -> Type {
    Type::Wildcard(WildcardBound::Super(Box::new(ty)))
}

fn extends(ty: Type) -> Type {
    Type::Wildcard(WildcardBound::Extends(Box::new(ty)))
}

fn instance_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        type_params: vec![],
        params,
        return_type,
        is_static: false,
        is_varargs: false,
        is_abstract: false,
    }
}

fn abstract_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        is_abstract: true,
        ..instance_method(name, params, return_type)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        if name.contains('.') {
            return None;
        }
        self.by_name.get(&format!("java.lang.{name}")).copied()
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldDef;

    #[test]
    fn minimal_jdk_registers_boxes() {
        let store = TypeStore::with_minimal_jdk();
        let wk = *store.well_known();
        assert_eq!(store.lookup_class("Integer"), Some(wk.integer));
        assert_eq!(store.class_id("java.lang.Character"), Some(wk.character));
        assert_eq!(wk.unboxed(wk.short), Some(PrimitiveType::Short));
        assert_eq!(wk.boxed(PrimitiveType::Double), wk.double);
    }

    #[test]
    fn lookup_by_simple_name_is_limited_to_java_lang() {
        let store = TypeStore::with_minimal_jdk();
        assert!(store.lookup_class("String").is_some());
        assert!(store.lookup_class("List").is_none());
        assert!(store.lookup_class("java.util.List").is_some());
    }

    #[test]
    fn predicate_negate_refers_back_to_predicate() {
        let store = TypeStore::with_minimal_jdk();
        let predicate = store.class_id("java.util.function.Predicate").unwrap();
        let def = store.class(predicate).unwrap();
        let negate = def.methods.iter().find(|m| m.name == "negate").unwrap();
        let Type::Class(ct) = &negate.return_type else {
            panic!("expected class type");
        };
        assert_eq!(ct.def, predicate);
    }

    #[test]
    fn intern_then_define_keeps_id() {
        let mut store = TypeStore::with_minimal_jdk();
        let id = store.intern_class_id("com.example.Foo");
        let object = Type::class(store.well_known().object, vec![]);
        store.define_class(
            id,
            ClassDef {
                name: "com.example.Foo".to_string(),
                kind: ClassKind::Class,
                type_params: vec![],
                super_class: Some(object),
                interfaces: vec![],
                fields: vec![FieldDef {
                    name: "x".to_string(),
                    ty: Type::int(),
                    is_static: false,
                }],
                methods: vec![],
                enum_constants: vec![],
                nested_types: vec![],
            },
        );
        assert_eq!(store.class_id("com.example.Foo"), Some(id));
        assert_eq!(store.class(id).unwrap().fields.len(), 1);
    }
}

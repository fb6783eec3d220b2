use std::fmt::Write as _;

use crate::{ClassType, MethodUsage, Type, TypeEnv, WildcardBound};

/// Render `ty` the way Java source would spell it, with canonical class names.
///
/// `java.util.List<java.lang.String>`, `int[][]`, `? super T`, `void`, `null`.
#[must_use]
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, &mut out);
    out
}

/// `name(param, ...) -> return`
#[must_use]
pub fn format_method_usage(env: &dyn TypeEnv, usage: &MethodUsage) -> String {
    let mut out = String::new();
    out.push_str(&usage.name);
    out.push('(');
    for (idx, param) in usage.params().iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_type(env, param, &mut out);
    }
    out.push_str(") -> ");
    write_type(env, usage.return_type(), &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, out: &mut String) {
    match ty {
        Type::Primitive(p) => out.push_str(p.name()),
        Type::Class(ClassType { def, args }) => {
            match env.class(*def) {
                Some(class_def) => out.push_str(&class_def.name),
                None => {
                    let _ = write!(out, "<class#{}>", def.idx());
                }
            }
            if !args.is_empty() {
                out.push('<');
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    write_type(env, arg, out);
                }
                out.push('>');
            }
        }
        Type::Array(component) => {
            write_type(env, component, out);
            out.push_str("[]");
        }
        Type::TypeVar(id) => match env.type_param(*id) {
            Some(param) => out.push_str(&param.name),
            None => {
                let _ = write!(out, "<tv#{}>", id.idx());
            }
        },
        Type::Wildcard(WildcardBound::Unbounded) => out.push('?'),
        Type::Wildcard(WildcardBound::Extends(bound)) => {
            out.push_str("? extends ");
            write_type(env, bound, out);
        }
        Type::Wildcard(WildcardBound::Super(bound)) => {
            out.push_str("? super ");
            write_type(env, bound, out);
        }
        Type::Void => out.push_str("void"),
        Type::Null => out.push_str("null"),
    }
}

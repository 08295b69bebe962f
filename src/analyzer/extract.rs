//! [`PropParser`] backed by the SWC TypeScript parser.
//!
//! Works on a single file: props are read from interfaces and type
//! literals declared in the same file, so types imported from elsewhere
//! contribute nothing.

use crate::parser::{
    ComponentRecord, Declaration, DefaultValue, ParseError, ParserConfig, PropParser, PropType, RawProp,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use swc_common::comments::{CommentKind, Comments, SingleThreadedComments};
use swc_common::{sync::Lrc, FileName, SourceMap, Span, Spanned};
use swc_common::errors::SourceMapper;
use swc_ecma_ast::*;
use swc_ecma_parser::{EsConfig, Parser, StringInput, Syntax, TsConfig};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::warn;

const MAX_TYPE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
pub struct SwcPropParser;

impl PropParser for SwcPropParser {
    fn parse(&self, path: &Path, config: &ParserConfig) -> Result<Vec<ComponentRecord>, ParseError> {
        let supported = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ts" | "tsx" | "js" | "jsx")
        );
        if !supported {
            return Err(ParseError::Unsupported { path: path.to_path_buf() });
        }
        let source = fs::read_to_string(path)
            .map_err(|source| ParseError::Io { path: path.to_path_buf(), source })?;
        extract_components(&source, path, config)
    }
}

enum TypeDecl {
    Interface { extends: Vec<String>, members: Vec<TsTypeElement> },
    Alias(Box<TsType>),
}

#[derive(Clone, Default)]
struct ComponentShape {
    props_type: Option<TsType>,
    /// Defaults from destructured parameters, as source text
    defaults: HashMap<String, String>,
    /// Wraps another local component, e.g. `memo(Button)`
    alias: Option<String>,
}

struct Exported {
    symbol: String,
    local: Option<String>,
    shape: Option<ComponentShape>,
}

struct PropCollector<'a> {
    cm: &'a SourceMap,
    comments: &'a SingleThreadedComments,
    config: &'a ParserConfig,
    type_decls: HashMap<String, TypeDecl>,
    components: HashMap<String, ComponentShape>,
    exports: Vec<Exported>,
}

fn is_component_name(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn is_component_wrapper(expr: &Expr) -> bool {
    // React.memo / memo / React.forwardRef / forwardRef
    let is_wrapper = |name: &str| name == "memo" || name == "forwardRef";
    match expr {
        Expr::Member(MemberExpr { obj, prop, .. }) => {
            if let Expr::Ident(obj_ident) = &**obj {
                if obj_ident.sym.as_ref() == "React" {
                    if let MemberProp::Ident(p) = prop {
                        return is_wrapper(p.sym.as_ref());
                    }
                }
            }
            false
        }
        Expr::Ident(id) => is_wrapper(id.sym.as_ref()),
        _ => false,
    }
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(i) => i.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string(),
    }
}

/// First type argument of `React.FC<Props>` style annotations.
fn first_type_arg(ty: &TsType) -> Option<&TsType> {
    match ty {
        TsType::TsTypeRef(r) => r.type_params.as_ref().and_then(|p| p.params.first()).map(|t| &**t),
        _ => None,
    }
}

fn is_undefined(ty: &TsType) -> bool {
    matches!(ty, TsType::TsKeywordType(k) if k.kind == TsKeywordTypeKind::TsUndefinedKeyword)
}

/// Description and `@default` tag from a JSDoc block body.
fn parse_jsdoc(text: &str) -> (String, Option<String>) {
    let mut lines = Vec::new();
    let mut default = None;
    for line in text.trim_start_matches('*').lines() {
        let line = line.trim();
        let line = line.strip_prefix('*').map(str::trim_start).unwrap_or(line);
        let tag_value = line.strip_prefix("@defaultValue").or_else(|| line.strip_prefix("@default"));
        if let Some(value) = tag_value {
            if value.is_empty() || value.starts_with(char::is_whitespace) {
                let value = value.trim();
                if !value.is_empty() {
                    default = Some(value.to_string());
                }
                continue;
            }
        }
        lines.push(line);
    }
    (lines.join("\n").trim().to_string(), default)
}

impl<'a> PropCollector<'a> {
    fn snippet(&self, span: Span) -> String {
        self.cm.span_to_snippet(span).unwrap_or_default()
    }

    fn shape_from_pat(&self, pat: &Pat, declared: Option<&TsType>) -> ComponentShape {
        let declared = declared.cloned();
        match pat {
            Pat::Ident(binding) => ComponentShape {
                props_type: binding.type_ann.as_ref().map(|a| (*a.type_ann).clone()).or(declared),
                ..Default::default()
            },
            Pat::Object(obj) => {
                let mut defaults = HashMap::new();
                for prop in &obj.props {
                    match prop {
                        ObjectPatProp::Assign(AssignPatProp { key, value: Some(value), .. }) => {
                            defaults.insert(key.sym.to_string(), self.snippet(value.span()));
                        }
                        ObjectPatProp::KeyValue(KeyValuePatProp { key, value, .. }) => {
                            if let (PropName::Ident(k), Pat::Assign(assign)) = (key, &**value) {
                                defaults.insert(k.sym.to_string(), self.snippet(assign.right.span()));
                            }
                        }
                        _ => {}
                    }
                }
                ComponentShape {
                    props_type: obj.type_ann.as_ref().map(|a| (*a.type_ann).clone()).or(declared),
                    defaults,
                    alias: None,
                }
            }
            _ => ComponentShape { props_type: declared, ..Default::default() },
        }
    }

    fn shape_from_function(&self, function: &Function, declared: Option<&TsType>) -> ComponentShape {
        match function.params.first() {
            Some(param) => self.shape_from_pat(&param.pat, declared),
            None => ComponentShape::default(),
        }
    }

    fn shape_from_class(&self, class: &Class) -> ComponentShape {
        ComponentShape {
            props_type: class
                .super_type_params
                .as_ref()
                .and_then(|p| p.params.first())
                .map(|t| (**t).clone()),
            ..Default::default()
        }
    }

    /// Component shape of an initializer expression, if it defines one.
    fn shape_from_expr(&self, expr: &Expr, declared: Option<&TsType>) -> Option<ComponentShape> {
        match expr {
            Expr::Arrow(arrow) => Some(match arrow.params.first() {
                Some(pat) => self.shape_from_pat(pat, declared),
                None => ComponentShape::default(),
            }),
            Expr::Fn(f) => Some(self.shape_from_function(&f.function, declared)),
            Expr::Class(c) => Some(self.shape_from_class(&c.class)),
            Expr::Paren(p) => self.shape_from_expr(&p.expr, declared),
            Expr::Ident(i) => Some(ComponentShape { alias: Some(i.sym.to_string()), ..Default::default() }),
            Expr::Call(CallExpr { callee: Callee::Expr(callee), args, type_args, .. })
                if is_component_wrapper(callee) =>
            {
                // forwardRef<Ref, Props> carries props last
                let wrapper_type = type_args.as_ref().and_then(|p| p.params.last()).map(|t| &**t);
                let declared = wrapper_type.or(declared);
                let inner = args.first()?;
                let mut shape = self.shape_from_expr(&inner.expr, declared)?;
                if shape.props_type.is_none() {
                    shape.props_type = declared.cloned();
                }
                Some(shape)
            }
            _ => None,
        }
    }

    fn resolve_shape(&self, exported: &Exported) -> Option<ComponentShape> {
        let mut shape = match &exported.shape {
            Some(shape) => shape.clone(),
            None => self.components.get(exported.local.as_deref()?)?.clone(),
        };
        for _ in 0..MAX_TYPE_DEPTH {
            let Some(target) = shape.alias.take() else { break };
            let inner = self.components.get(&target)?;
            shape.alias = inner.alias.clone();
            if shape.props_type.is_none() {
                shape.props_type = inner.props_type.clone();
            }
            for (k, v) in &inner.defaults {
                shape.defaults.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        Some(shape)
    }

    fn collect_members<'t>(&'t self, ty: &'t TsType, depth: usize, out: &mut Vec<&'t TsTypeElement>) {
        if depth > MAX_TYPE_DEPTH {
            return;
        }
        match ty {
            TsType::TsTypeLit(lit) => out.extend(lit.members.iter()),
            TsType::TsParenthesizedType(p) => self.collect_members(&p.type_ann, depth + 1, out),
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(it)) => {
                for part in &it.types {
                    self.collect_members(part, depth + 1, out);
                }
            }
            TsType::TsTypeRef(r) => {
                if let TsEntityName::Ident(name) = &r.type_name {
                    self.collect_named(name.sym.as_ref(), depth + 1, out);
                }
            }
            _ => {}
        }
    }

    fn collect_named<'t>(&'t self, name: &str, depth: usize, out: &mut Vec<&'t TsTypeElement>) {
        if depth > MAX_TYPE_DEPTH {
            return;
        }
        match self.type_decls.get(name) {
            Some(TypeDecl::Interface { extends, members }) => {
                for parent in extends {
                    self.collect_named(parent, depth + 1, out);
                }
                out.extend(members.iter());
            }
            Some(TypeDecl::Alias(ty)) => self.collect_members(ty, depth + 1, out),
            None => {}
        }
    }

    fn describe_type(&self, ty: &TsType, optional: bool) -> PropType {
        let options = &self.config.parser;
        if let TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) = ty {
            let members: Vec<&TsType> = union
                .types
                .iter()
                .map(|t| &**t)
                .filter(|t| !(optional && options.should_remove_undefined_from_optional && is_undefined(t)))
                .collect();
            if let [single] = members.as_slice() {
                return self.describe_type(single, false);
            }
            let raw = members.iter().map(|t| self.snippet(t.span())).collect::<Vec<_>>().join(" | ");
            let literal_only = members.iter().all(|t| matches!(t, TsType::TsLitType(_)));
            let name = if literal_only && options.should_extract_literal_values_from_enum {
                "enum".to_string()
            } else {
                raw.clone()
            };
            return PropType { name, raw: Some(raw) };
        }
        PropType { name: self.snippet(ty.span()), raw: None }
    }

    fn jsdoc_at(&self, span: Span) -> (String, Option<String>) {
        let doc = self.comments.get_leading(span.lo).and_then(|comments| {
            comments
                .into_iter()
                .rev()
                .find(|c| c.kind == CommentKind::Block && c.text.starts_with('*'))
        });
        match doc {
            Some(comment) => parse_jsdoc(&comment.text),
            None => (String::new(), None),
        }
    }

    fn prop_from_signature(
        &self,
        sig: &TsPropertySignature,
        defaults: &HashMap<String, String>,
        file_name: &str,
    ) -> Option<RawProp> {
        let name = match &*sig.key {
            Expr::Ident(i) => i.sym.to_string(),
            Expr::Lit(Lit::Str(s)) => s.value.to_string(),
            _ => return None,
        };
        let type_info = match &sig.type_ann {
            Some(ann) => self.describe_type(&ann.type_ann, sig.optional),
            None => PropType { name: "any".into(), raw: None },
        };
        let (description, tagged_default) = self.jsdoc_at(sig.span);
        let default_value = defaults
            .get(&name)
            .cloned()
            .or(tagged_default)
            .map(|value| DefaultValue { value: Some(value) });
        Some(RawProp {
            name,
            type_info,
            description,
            default_value,
            required: Some(!sig.optional),
            declarations: vec![Declaration { file_name: file_name.to_string() }],
        })
    }

    fn props_of(&self, shape: &ComponentShape, file_name: &str) -> Vec<RawProp> {
        let Some(ty) = &shape.props_type else { return Vec::new() };
        let mut members = Vec::new();
        self.collect_members(ty, 0, &mut members);

        let mut props: Vec<RawProp> = Vec::new();
        for member in members {
            let TsTypeElement::TsPropertySignature(sig) = member else { continue };
            let Some(prop) = self.prop_from_signature(sig, &shape.defaults, file_name) else { continue };
            match props.iter_mut().find(|p| p.name == prop.name) {
                Some(existing) => *existing = prop,
                None => props.push(prop),
            }
        }
        props
    }
}

impl Visit for PropCollector<'_> {
    fn visit_ts_interface_decl(&mut self, decl: &TsInterfaceDecl) {
        let extends = decl
            .extends
            .iter()
            .filter_map(|e| match &*e.expr {
                Expr::Ident(i) => Some(i.sym.to_string()),
                _ => None,
            })
            .collect();
        self.type_decls.insert(
            decl.id.sym.to_string(),
            TypeDecl::Interface { extends, members: decl.body.body.clone() },
        );
    }

    fn visit_ts_type_alias_decl(&mut self, decl: &TsTypeAliasDecl) {
        self.type_decls.insert(decl.id.sym.to_string(), TypeDecl::Alias(decl.type_ann.clone()));
    }

    fn visit_fn_decl(&mut self, func: &FnDecl) {
        let name = func.ident.sym.to_string();
        if is_component_name(&name) {
            let shape = self.shape_from_function(&func.function, None);
            self.components.insert(name, shape);
        }
        func.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, class: &ClassDecl) {
        let name = class.ident.sym.to_string();
        if is_component_name(&name) {
            let shape = self.shape_from_class(&class.class);
            self.components.insert(name, shape);
        }
        class.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let (Pat::Ident(binding), Some(init)) = (&d.name, &d.init) {
            let name = binding.id.sym.to_string();
            if is_component_name(&name) {
                let declared = binding.type_ann.as_deref().and_then(|a| first_type_arg(&a.type_ann));
                if let Some(shape) = self.shape_from_expr(init, declared) {
                    self.components.insert(name, shape);
                }
            }
        }
        d.visit_children_with(self);
    }

    fn visit_export_decl(&mut self, export: &ExportDecl) {
        match &export.decl {
            Decl::Fn(func) => {
                let name = func.ident.sym.to_string();
                self.exports.push(Exported { symbol: name.clone(), local: Some(name), shape: None });
            }
            Decl::Class(class) => {
                let name = class.ident.sym.to_string();
                self.exports.push(Exported { symbol: name.clone(), local: Some(name), shape: None });
            }
            Decl::Var(v) => {
                for d in &v.decls {
                    if let Pat::Ident(binding) = &d.name {
                        let name = binding.id.sym.to_string();
                        self.exports.push(Exported { symbol: name.clone(), local: Some(name), shape: None });
                    }
                }
            }
            _ => {}
        }
        export.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, export: &ExportDefaultDecl) {
        let (local, shape) = match &export.decl {
            DefaultDecl::Fn(f) => (
                f.ident.as_ref().map(|i| i.sym.to_string()),
                self.shape_from_function(&f.function, None),
            ),
            DefaultDecl::Class(c) => (
                c.ident.as_ref().map(|i| i.sym.to_string()),
                self.shape_from_class(&c.class),
            ),
            DefaultDecl::TsInterfaceDecl(_) => {
                export.visit_children_with(self);
                return;
            }
        };
        self.exports.push(Exported { symbol: "default".into(), local, shape: Some(shape) });
        export.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, export: &ExportDefaultExpr) {
        // `export default Button` is still the `default` symbol; `local` names the binding
        let exported = match &*export.expr {
            Expr::Ident(i) => {
                Some(Exported { symbol: "default".into(), local: Some(i.sym.to_string()), shape: None })
            }
            expr => self
                .shape_from_expr(expr, None)
                .map(|shape| Exported { symbol: "default".into(), local: None, shape: Some(shape) }),
        };
        self.exports.extend(exported);
        export.visit_children_with(self);
    }

    fn visit_named_export(&mut self, export: &NamedExport) {
        if export.src.is_some() {
            return;
        }
        for spec in &export.specifiers {
            if let ExportSpecifier::Named(named) = spec {
                let local = export_name(&named.orig);
                let symbol = named.exported.as_ref().map(export_name).unwrap_or_else(|| local.clone());
                self.exports.push(Exported { symbol, local: Some(local), shape: None });
            }
        }
    }
}

/// Display name for anonymous default exports: the file stem, or the
/// directory name for `index` files.
fn fallback_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if stem == "index" {
        if let Some(dir) = path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()) {
            return dir.to_string();
        }
    }
    stem.to_string()
}

fn parse_module(
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    source: &str,
    path: &Path,
) -> Result<Module, ParseError> {
    let filename = path.to_string_lossy().to_string();
    let fm = cm.new_source_file(FileName::Custom(filename.clone()).into(), source.to_string());
    let input = StringInput::from(&*fm);
    let is_ts = filename.ends_with(".ts") || filename.ends_with(".tsx");
    let syntax = if is_ts {
        Syntax::Typescript(TsConfig {
            tsx: filename.ends_with(".tsx"),
            decorators: true,
            dts: filename.ends_with(".d.ts"),
            no_early_errors: true,
            ..Default::default()
        })
    } else {
        Syntax::Es(EsConfig { jsx: true, decorators: true, ..Default::default() })
    };
    let mut parser = Parser::new(syntax, input, Some(comments));
    let module = parser.parse_module().map_err(|e| {
        let loc = cm.lookup_char_pos(e.span().lo);
        ParseError::Syntax {
            path: path.to_path_buf(),
            message: format!("line {}: {:?}", loc.line, e.kind()),
        }
    })?;
    for e in parser.take_errors() {
        warn!(file = %filename, error = ?e.kind(), "recovered from syntax error");
    }
    Ok(module)
}

/// Parse `source` as the contents of `path` and report its exported components.
pub fn extract_components(
    source: &str,
    path: &Path,
    config: &ParserConfig,
) -> Result<Vec<ComponentRecord>, ParseError> {
    let cm: Lrc<SourceMap> = Default::default();
    let comments = SingleThreadedComments::default();
    let module = parse_module(&cm, &comments, source, path)?;

    let mut collector = PropCollector {
        cm: &cm,
        comments: &comments,
        config,
        type_decls: HashMap::new(),
        components: HashMap::new(),
        exports: Vec::new(),
    };
    module.visit_with(&mut collector);

    let file_name = path.to_string_lossy();
    let records = collector
        .exports
        .iter()
        .filter_map(|exported| {
            let shape = collector.resolve_shape(exported)?;
            let display_name = match config.resolver.resolve(&exported.symbol) {
                Some(name) => name.to_string(),
                None if exported.symbol == "default" => {
                    exported.local.clone().unwrap_or_else(|| fallback_name(path))
                }
                None => exported.symbol.clone(),
            };
            Some(ComponentRecord { display_name, props: collector.props_of(&shape, &file_name) })
        })
        .collect();
    Ok(records)
}

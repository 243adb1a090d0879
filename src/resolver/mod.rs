//! Runtime Resolver - Pattern Evaluation
//!
//! Evaluates message patterns against caller arguments, degrading
//! gracefully: anything that cannot be resolved is replaced by a
//! documented fallback string and recorded as a [`FormattingError`], so
//! callers always receive `(text, errors)`.
//!
//! Scoping follows the Fluent contract: message references share the
//! caller's argument scope, while a term is evaluated in an isolated
//! scope that sees only the named arguments of its own call. Recursion is
//! bounded by the thread-local ambient budget in [`depth`], which also
//! covers custom functions that re-enter the resolver, and id-keyed
//! cycle detection catches reference loops before the budget does.

pub mod depth;
pub mod value;

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::diagnostics::runtime::{FormattingError, FormattingErrorKind};
use crate::functions::{FunctionContext, FunctionRegistry};
use crate::locale::LocaleOracle;
use crate::syntax::ast::{
    Expression, Message, NamedArgument, Pattern, PatternElement, SelectExpression, Term, Variant,
    VariantKey,
};
use value::{FluentArgs, FluentValue};

/// FIRST STRONG ISOLATE, opening an interpolation boundary
pub const FSI: char = '\u{2068}';
/// POP DIRECTIONAL ISOLATE, closing it
pub const PDI: char = '\u{2069}';

/// Fallback for expressions with no better rendering
pub const FALLBACK_INVALID: &str = "{???}";

pub fn message_fallback(id: &str, attribute: Option<&str>) -> String {
    match attribute {
        Some(attr) => format!("{{{id}.{attr}}}"),
        None => format!("{{{id}}}"),
    }
}

pub fn variable_fallback(name: &str) -> String {
    format!("{{${name}}}")
}

pub fn term_fallback(id: &str) -> String {
    format!("{{-{id}}}")
}

pub fn function_fallback(name: &str) -> String {
    format!("{{!{name}}}")
}

/// Borrowed view of the bundle state a resolution runs against
pub(crate) struct ResolverEnv<'a> {
    pub messages: &'a HashMap<String, Message>,
    pub terms: &'a HashMap<String, Term>,
    pub functions: &'a FunctionRegistry,
    pub oracle: &'a dyn LocaleOracle,
    pub locale: &'a str,
    pub use_isolating: bool,
    pub max_depth: usize,
}

/// Per-call mutable state: accumulated errors, the active reference set
/// for cycle detection, and the path for error messages
struct ResolutionContext {
    errors: Vec<FormattingError>,
    seen: HashSet<String>,
    resolution_path: Vec<String>,
}

impl ResolutionContext {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            seen: HashSet::new(),
            resolution_path: Vec::new(),
        }
    }

    fn record(&mut self, error: FormattingError) {
        self.errors.push(error);
    }
}

/// Resolve a message (or one of its attributes) to a string.
///
/// This is the bundle's entry point; `message_id` is only used to build
/// fallback strings.
pub(crate) fn resolve_message(
    env: &ResolverEnv<'_>,
    message_id: &str,
    message: &Message,
    attribute: Option<&str>,
    args: Option<&FluentArgs>,
) -> (String, Vec<FormattingError>) {
    let mut ctx = ResolutionContext::new();

    let pattern = match attribute {
        Some(attr) => match message.attribute(attr) {
            Some(attribute) => &attribute.value,
            None => {
                let fallback = message_fallback(message_id, Some(attr));
                ctx.record(
                    FormattingError::new(
                        FormattingErrorKind::ReferenceNotFound,
                        format!("message \"{message_id}\" has no attribute \"{attr}\""),
                    )
                    .with_fallback(fallback.clone()),
                );
                return (fallback, ctx.errors);
            }
        },
        None => match &message.value {
            Some(value) => value,
            None => {
                let fallback = message_fallback(message_id, None);
                ctx.record(
                    FormattingError::new(
                        FormattingErrorKind::ReferenceNotFound,
                        format!("message \"{message_id}\" has no value"),
                    )
                    .with_fallback(fallback.clone()),
                );
                return (fallback, ctx.errors);
            }
        },
    };

    let node = match attribute {
        Some(attr) => format!("msg:{message_id}.{attr}"),
        None => format!("msg:{message_id}"),
    };
    ctx.seen.insert(node.clone());
    ctx.resolution_path.push(node);

    let text = resolve_pattern(env, &mut ctx, pattern, args);
    (text, ctx.errors)
}

/// Resolve a term's value or attribute; terms are addressed directly by
/// the bundle API for attribute inspection (`-brand.legal` style calls).
pub(crate) fn resolve_term(
    env: &ResolverEnv<'_>,
    term_id: &str,
    term: &Term,
    attribute: Option<&str>,
    args: Option<&FluentArgs>,
) -> (String, Vec<FormattingError>) {
    let mut ctx = ResolutionContext::new();

    let pattern = match attribute {
        Some(attr) => match term.attribute(attr) {
            Some(attribute) => &attribute.value,
            None => {
                let fallback = term_fallback(term_id);
                ctx.record(
                    FormattingError::new(
                        FormattingErrorKind::ReferenceNotFound,
                        format!("term \"-{term_id}\" has no attribute \"{attr}\""),
                    )
                    .with_fallback(fallback.clone()),
                );
                return (fallback, ctx.errors);
            }
        },
        None => &term.value,
    };

    let node = format!("term:{term_id}");
    ctx.seen.insert(node.clone());
    ctx.resolution_path.push(node);

    let text = resolve_pattern(env, &mut ctx, pattern, args);
    (text, ctx.errors)
}

fn resolve_pattern(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    pattern: &Pattern,
    args: Option<&FluentArgs>,
) -> String {
    let mut out = String::new();
    for element in &pattern.elements {
        match element {
            PatternElement::Text(text) => out.push_str(&text.value),
            PatternElement::Placeable(placeable) => {
                let rendered = resolve_placeable_expression(env, ctx, &placeable.expression, args);
                if env.use_isolating {
                    out.push(FSI);
                    out.push_str(&rendered);
                    out.push(PDI);
                } else {
                    out.push_str(&rendered);
                }
            }
        }
    }
    out
}

/// Evaluate a placeable's expression, substituting the documented
/// fallback and recording the error on any failure
fn resolve_placeable_expression(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    expression: &Expression,
    args: Option<&FluentArgs>,
) -> String {
    let _frame = match depth::enter(env.max_depth) {
        Ok(frame) => frame,
        Err(exceeded) => {
            ctx.record(
                FormattingError::new(
                    FormattingErrorKind::MaxDepthExceeded,
                    format!(
                        "nesting depth limit of {} exceeded at {}",
                        exceeded.max_depth,
                        ctx.resolution_path.join(" -> ")
                    ),
                )
                .with_fallback(FALLBACK_INVALID),
            );
            return FALLBACK_INVALID.to_string();
        }
    };

    match resolve_expression(env, ctx, expression, args) {
        Ok(value) => value_to_string(env, ctx, &value),
        Err(error) => {
            let fallback = error
                .fallback_value
                .clone()
                .unwrap_or_else(|| FALLBACK_INVALID.to_string());
            ctx.record(error);
            fallback
        }
    }
}

fn resolve_expression(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    expression: &Expression,
    args: Option<&FluentArgs>,
) -> Result<FluentValue, FormattingError> {
    match expression {
        Expression::StringLiteral(lit) => Ok(FluentValue::String(lit.value.clone())),
        Expression::NumberLiteral(num) => Ok(FluentValue::Decimal(num.value)),
        Expression::VariableReference(var) => match args.and_then(|map| map.get(&var.id.name)) {
            Some(value) => Ok(value.clone()),
            None => Err(FormattingError::new(
                FormattingErrorKind::VariableNotFound,
                format!("unknown variable \"${}\"", var.id.name),
            )
            .with_fallback(variable_fallback(&var.id.name))),
        },
        Expression::MessageReference(msg) => {
            resolve_message_reference(env, ctx, &msg.id.name, msg.attribute.as_ref(), args)
        }
        Expression::TermReference(term) => resolve_term_reference(
            env,
            ctx,
            &term.id.name,
            term.attribute.as_ref(),
            term.arguments.as_ref(),
            args,
        ),
        Expression::FunctionReference(func) => {
            resolve_function_reference(env, ctx, &func.id.name, &func.arguments, args)
        }
        Expression::Select(select) => resolve_select(env, ctx, select, args),
        Expression::Placeable(inner) => {
            let _frame = depth::enter(env.max_depth).map_err(|exceeded| {
                FormattingError::new(
                    FormattingErrorKind::MaxDepthExceeded,
                    format!("nesting depth limit of {} exceeded", exceeded.max_depth),
                )
                .with_fallback(FALLBACK_INVALID)
            })?;
            resolve_expression(env, ctx, &inner.expression, args)
        }
    }
}

fn resolve_message_reference(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    id: &str,
    attribute: Option<&crate::syntax::ast::Identifier>,
    args: Option<&FluentArgs>,
) -> Result<FluentValue, FormattingError> {
    let attr_name = attribute.map(|a| a.name.as_str());
    let fallback = message_fallback(id, attr_name);

    let message = env.messages.get(id).ok_or_else(|| {
        FormattingError::new(
            FormattingErrorKind::ReferenceNotFound,
            format!("unknown message \"{id}\""),
        )
        .with_fallback(fallback.clone())
    })?;

    let pattern = match attr_name {
        Some(attr) => {
            &message
                .attribute(attr)
                .ok_or_else(|| {
                    FormattingError::new(
                        FormattingErrorKind::ReferenceNotFound,
                        format!("message \"{id}\" has no attribute \"{attr}\""),
                    )
                    .with_fallback(fallback.clone())
                })?
                .value
        }
        None => message.value.as_ref().ok_or_else(|| {
            FormattingError::new(
                FormattingErrorKind::ReferenceNotFound,
                format!("message \"{id}\" has no value"),
            )
            .with_fallback(fallback.clone())
        })?,
    };

    let node = match attr_name {
        Some(attr) => format!("msg:{id}.{attr}"),
        None => format!("msg:{id}"),
    };
    if !ctx.seen.insert(node.clone()) {
        return Err(FormattingError::new(
            FormattingErrorKind::CyclicReference,
            format!(
                "cyclic reference: {} -> {node}",
                ctx.resolution_path.join(" -> ")
            ),
        )
        .with_fallback(fallback));
    }
    ctx.resolution_path.push(node.clone());

    // Message references share the caller's argument scope.
    let text = resolve_pattern(env, ctx, pattern, args);

    ctx.resolution_path.pop();
    ctx.seen.remove(&node);
    Ok(FluentValue::String(text))
}

fn resolve_term_reference(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    id: &str,
    attribute: Option<&crate::syntax::ast::Identifier>,
    arguments: Option<&crate::syntax::ast::CallArguments>,
    args: Option<&FluentArgs>,
) -> Result<FluentValue, FormattingError> {
    let fallback = term_fallback(id);

    let term = env.terms.get(id).ok_or_else(|| {
        FormattingError::new(
            FormattingErrorKind::TermNotFound,
            format!("unknown term \"-{id}\""),
        )
        .with_fallback(fallback.clone())
    })?;

    let pattern = match attribute {
        Some(attr) => {
            &term
                .attribute(&attr.name)
                .ok_or_else(|| {
                    FormattingError::new(
                        FormattingErrorKind::ReferenceNotFound,
                        format!("term \"-{id}\" has no attribute \"{}\"", attr.name),
                    )
                    .with_fallback(fallback.clone())
                })?
                .value
        }
        None => &term.value,
    };

    // A term sees only the named arguments of its own call, evaluated in
    // the caller's scope; positional arguments are ignored with an
    // advisory diagnostic.
    let mut local: FluentArgs = FluentArgs::new();
    if let Some(call) = arguments {
        if !call.positional.is_empty() {
            ctx.record(FormattingError::new(
                FormattingErrorKind::FormattingError,
                format!("positional arguments on term \"-{id}\" are ignored"),
            ));
        }
        for named in &call.named {
            let value = evaluate_argument(env, ctx, named, args)?;
            local.insert(named.name.name.clone(), value);
        }
    }

    let node = format!("term:{id}");
    if !ctx.seen.insert(node.clone()) {
        return Err(FormattingError::new(
            FormattingErrorKind::CyclicReference,
            format!(
                "cyclic reference: {} -> {node}",
                ctx.resolution_path.join(" -> ")
            ),
        )
        .with_fallback(fallback));
    }
    ctx.resolution_path.push(node.clone());

    let text = resolve_pattern(env, ctx, pattern, Some(&local));

    ctx.resolution_path.pop();
    ctx.seen.remove(&node);
    Ok(FluentValue::String(text))
}

/// Evaluate one named argument in the caller's scope, with its own depth
/// frame
fn evaluate_argument(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    named: &NamedArgument,
    args: Option<&FluentArgs>,
) -> Result<FluentValue, FormattingError> {
    let _frame = depth::enter(env.max_depth).map_err(|exceeded| {
        FormattingError::new(
            FormattingErrorKind::MaxDepthExceeded,
            format!("nesting depth limit of {} exceeded", exceeded.max_depth),
        )
        .with_fallback(FALLBACK_INVALID)
    })?;
    resolve_expression(env, ctx, &named.value, args)
}

fn resolve_function_reference(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    name: &str,
    arguments: &crate::syntax::ast::CallArguments,
    args: Option<&FluentArgs>,
) -> Result<FluentValue, FormattingError> {
    let fallback = function_fallback(name);

    let function = env.functions.get(name).ok_or_else(|| {
        FormattingError::new(
            FormattingErrorKind::FunctionNotFound,
            format!("unknown function \"{name}\""),
        )
        .with_fallback(fallback.clone())
    })?;

    if arguments.positional.len() != function.signature.positional_arity {
        return Err(FormattingError::new(
            FormattingErrorKind::FunctionArity,
            format!(
                "\"{name}\" takes {} positional argument(s), got {}",
                function.signature.positional_arity,
                arguments.positional.len()
            ),
        )
        .with_fallback(fallback));
    }

    let mut positional = Vec::with_capacity(arguments.positional.len());
    for expression in &arguments.positional {
        let _frame = depth::enter(env.max_depth).map_err(|exceeded| {
            FormattingError::new(
                FormattingErrorKind::MaxDepthExceeded,
                format!("nesting depth limit of {} exceeded", exceeded.max_depth),
            )
            .with_fallback(FALLBACK_INVALID)
        })?;
        positional.push(resolve_expression(env, ctx, expression, args)?);
    }

    let mut named = std::collections::BTreeMap::new();
    for argument in &arguments.named {
        let value = evaluate_argument(env, ctx, argument, args)?;
        match function.signature.native_param(&argument.name.name) {
            Some(native) => {
                named.insert(native.to_string(), value);
            }
            None => {
                // Unknown options are dropped, not fatal.
                ctx.record(FormattingError::new(
                    FormattingErrorKind::FormattingError,
                    format!(
                        "\"{name}\" does not accept an argument named \"{}\"",
                        argument.name.name
                    ),
                ));
            }
        }
    }

    let call_ctx = FunctionContext {
        locale: env.locale,
        oracle: env.oracle,
    };
    (function.callable)(&positional, &named, &call_ctx).map_err(|mut error| {
        if error.fallback_value.is_none() {
            error.fallback_value = Some(fallback);
        }
        error
    })
}

fn resolve_select(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    select: &SelectExpression,
    args: Option<&FluentArgs>,
) -> Result<FluentValue, FormattingError> {
    let selector = {
        let _frame = depth::enter(env.max_depth).map_err(|exceeded| {
            FormattingError::new(
                FormattingErrorKind::MaxDepthExceeded,
                format!("nesting depth limit of {} exceeded", exceeded.max_depth),
            )
            .with_fallback(FALLBACK_INVALID)
        })?;
        resolve_expression(env, ctx, &select.selector, args)
    };

    let variant = match selector {
        Ok(value) => select_variant(env, ctx, &value, select),
        Err(error) => {
            // Selector failures degrade to the default variant.
            ctx.record(error);
            select.default_variant()
        }
    };

    let Some(variant) = variant else {
        return Err(FormattingError::new(
            FormattingErrorKind::FormattingError,
            "select expression has no default variant",
        )
        .with_fallback(FALLBACK_INVALID));
    };

    let _frame = depth::enter(env.max_depth).map_err(|exceeded| {
        FormattingError::new(
            FormattingErrorKind::MaxDepthExceeded,
            format!("nesting depth limit of {} exceeded", exceeded.max_depth),
        )
        .with_fallback(FALLBACK_INVALID)
    })?;
    let text = resolve_pattern(env, ctx, &variant.value, args);
    Ok(FluentValue::String(text))
}

/// Variant selection order: booleans match `true`/`false` keys and never
/// consult plural rules; numbers try exact decimal equality, then the
/// plural category; strings match identifier keys by equality. Anything
/// unmatched takes the default.
fn select_variant<'a>(
    env: &ResolverEnv<'_>,
    ctx: &mut ResolutionContext,
    selector: &FluentValue,
    select: &'a SelectExpression,
) -> Option<&'a Variant> {
    match selector {
        FluentValue::Bool(b) => {
            let key = if *b { "true" } else { "false" };
            find_identifier_variant(select, key).or_else(|| select.default_variant())
        }
        FluentValue::String(s) => {
            find_identifier_variant(select, s).or_else(|| select.default_variant())
        }
        FluentValue::Integer(_) | FluentValue::Decimal(_) | FluentValue::Number(_) => {
            let decimal = selector.as_decimal().expect("numeric selector");
            if let Some(exact) = find_numeric_variant(select, &decimal) {
                return Some(exact);
            }
            match env
                .oracle
                .plural_category(env.locale, &decimal, selector.precision())
            {
                Ok(category) => find_identifier_variant(select, category.as_str())
                    .or_else(|| select.default_variant()),
                Err(error) => {
                    ctx.record(FormattingError::new(
                        FormattingErrorKind::PluralSupportUnavailable,
                        format!("plural category unavailable: {error}"),
                    ));
                    select.default_variant()
                }
            }
        }
        FluentValue::DateTime(_) => select.default_variant(),
    }
}

fn find_identifier_variant<'a>(select: &'a SelectExpression, key: &str) -> Option<&'a Variant> {
    select.variants.iter().find(|variant| {
        matches!(&variant.key, VariantKey::Identifier(id) if id.name == key)
    })
}

fn find_numeric_variant<'a>(select: &'a SelectExpression, value: &Decimal) -> Option<&'a Variant> {
    select.variants.iter().find(|variant| {
        matches!(&variant.key, VariantKey::Number(num) if num.value == *value)
    })
}

/// Render a resolved value for output
fn value_to_string(env: &ResolverEnv<'_>, ctx: &mut ResolutionContext, value: &FluentValue) -> String {
    match value {
        FluentValue::String(s) => s.clone(),
        FluentValue::Number(n) => n.formatted.clone(),
        FluentValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        FluentValue::Integer(_) | FluentValue::Decimal(_) => {
            let decimal = value.as_decimal().expect("numeric value");
            match env.oracle.format_number(
                env.locale,
                &decimal,
                &crate::locale::NumberOptions::default(),
            ) {
                Ok(formatted) => formatted,
                Err(error) => {
                    ctx.record(FormattingError::new(
                        FormattingErrorKind::FormattingError,
                        format!("number formatting failed: {error}"),
                    ));
                    decimal.to_string()
                }
            }
        }
        FluentValue::DateTime(dt) => {
            match env.oracle.format_datetime(
                env.locale,
                dt,
                &crate::locale::DateTimeOptions::default(),
            ) {
                Ok(formatted) => formatted,
                Err(error) => {
                    ctx.record(FormattingError::new(
                        FormattingErrorKind::FormattingError,
                        format!("datetime formatting failed: {error}"),
                    ));
                    dt.to_string()
                }
            }
        }
    }
}

//! Introspection compatibility shim.
//!
//! Engine internals validate their analysis entry points through a
//! process-wide argument-inspection call that predates [`FullArgSpec`] and
//! returns the legacy four-field [`ArgSpec`]. Newer runtimes only publish
//! the rich shape, so [`ensure_getargspec`] installs an adapter that
//! projects it down. It must run once at startup, before any engine is
//! constructed, and is idempotent.

use std::sync::OnceLock;

use anyhow::{Result, bail};

/// Legacy argument spec: positional names, variadic-positional name,
/// variadic-keyword name, defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub args: Vec<String>,
    pub varargs: Option<String>,
    pub keywords: Option<String>,
    pub defaults: Vec<String>,
}

/// Modern argument spec. Extends the legacy shape with keyword-only
/// parameters, which the legacy consumers never see.
#[derive(Debug, Clone, Default)]
pub struct FullArgSpec {
    pub args: Vec<String>,
    pub varargs: Option<String>,
    pub varkw: Option<String>,
    pub defaults: Vec<String>,
    pub kwonlyargs: Vec<String>,
    pub kwonlydefaults: Vec<String>,
}

impl FullArgSpec {
    /// Descriptor for an engine method taking the given positional
    /// parameters after the receiver.
    pub fn for_method(params: &[&str]) -> Self {
        let mut args = vec!["self".to_string()];
        args.extend(params.iter().map(|p| (*p).to_string()));
        Self {
            args,
            ..Self::default()
        }
    }
}

type GetArgSpec = fn(&FullArgSpec) -> ArgSpec;

static GETARGSPEC: OnceLock<GetArgSpec> = OnceLock::new();

fn adapt(spec: &FullArgSpec) -> ArgSpec {
    ArgSpec {
        args: spec.args.clone(),
        varargs: spec.varargs.clone(),
        keywords: spec.varkw.clone(),
        defaults: spec.defaults.clone(),
    }
}

/// Install the legacy inspection call if the process does not have one yet.
/// Safe to call more than once; later calls are no-ops.
pub fn ensure_getargspec() {
    let _ = GETARGSPEC.set(adapt);
}

/// Inspect an entry point through the legacy call.
pub fn getargspec(spec: &FullArgSpec) -> Result<ArgSpec> {
    match GETARGSPEC.get() {
        Some(inspect) => Ok(inspect(spec)),
        None => bail!("legacy argument inspection missing; run ensure_getargspec() at startup"),
    }
}

/// Verify that an engine entry point carries the expected positional
/// signature. Engines call this from their constructors.
pub fn check_entry_point(name: &str, spec: &FullArgSpec, expected: &[&str]) -> Result<()> {
    let legacy = getargspec(spec)?;
    if legacy.args != expected {
        bail!(
            "entry point `{}` has signature {:?}, expected {:?}",
            name,
            legacy.args,
            expected
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_idempotent() {
        ensure_getargspec();
        ensure_getargspec();
        let spec = FullArgSpec::for_method(&["token"]);
        assert!(getargspec(&spec).is_ok());
    }

    #[test]
    fn adapter_drops_keyword_only_fields() {
        ensure_getargspec();
        let spec = FullArgSpec {
            args: vec!["self".into(), "text".into()],
            varargs: Some("rest".into()),
            varkw: Some("options".into()),
            defaults: vec!["\"\"".into()],
            kwonlyargs: vec!["strict".into()],
            kwonlydefaults: vec!["false".into()],
        };
        let legacy = getargspec(&spec).unwrap();
        assert_eq!(legacy.args, vec!["self", "text"]);
        assert_eq!(legacy.varargs.as_deref(), Some("rest"));
        assert_eq!(legacy.keywords.as_deref(), Some("options"));
        assert_eq!(legacy.defaults, vec!["\"\""]);
    }

    #[test]
    fn check_entry_point_accepts_matching_signature() {
        ensure_getargspec();
        let spec = FullArgSpec::for_method(&["token"]);
        assert!(check_entry_point("analyse", &spec, &["self", "token"]).is_ok());
    }

    #[test]
    fn check_entry_point_rejects_mismatch() {
        ensure_getargspec();
        let spec = FullArgSpec::for_method(&["token"]);
        let err = check_entry_point("analyse", &spec, &["self", "word"]).unwrap_err();
        assert!(err.to_string().contains("analyse"));
    }
}

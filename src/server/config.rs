//! Adapter configuration.
//!
//! `InertiaConfig` is plain data: it derives `Deserialize` so hosts can load it
//! from whatever configuration file they already use, and every field has a
//! default matching a conventional setup.
//!
//! ```
//! use inertia_axum_http::{InertiaConfig, SharedScope};
//!
//! let config = InertiaConfig::default()
//!     .with_assets_dirs(["@webroot/build", "$ASSET_ROOT/vendor"])
//!     .with_alias("@webroot", "public")
//!     .with_shared_scope(SharedScope::Request);
//! assert!(config.use_versioning);
//! ```

use crate::error::{InertiaError, Result};
use crate::protocol::constants::{headers, DEFAULT_CSRF_PARAM, DEFAULT_SHARE_KEY};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Lifetime of the shared-props store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedScope {
    /// A fresh store per request. Safe under concurrency.
    #[default]
    Request,
    /// One store per `share_key` for the whole process.
    ///
    /// Values shared while serving one request become visible to every
    /// concurrent and later request. Only use this for data that is genuinely
    /// global.
    Process,
}

/// CSRF bridge configuration. Absent means CSRF handling is off.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Key used to sign the token cookie.
    pub secret: String,
    /// Parameter name bound inside the signed payload.
    pub param: String,
    /// Request header carrying the signed payload.
    pub header: String,
    /// Cookie the fresh token is issued in; readable by scripts.
    pub cookie: String,
}

impl CsrfConfig {
    /// Defaults with the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            param: DEFAULT_CSRF_PARAM.to_string(),
            header: headers::X_XSRF_TOKEN.as_str().to_string(),
            cookie: DEFAULT_CSRF_PARAM.to_string(),
        }
    }
}

/// Inertia adapter configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InertiaConfig {
    /// Root view rendered on initial loads. `None` uses the built-in template.
    ///
    /// The template must contain `@inertia` (replaced by the app mount point)
    /// or `{{ page }}` (replaced by the attribute-escaped page JSON).
    pub view: Option<PathBuf>,

    /// Client bundle referenced by the built-in template.
    pub entry_script: String,

    /// Namespace of the process-scoped shared-props store.
    pub share_key: String,

    /// Lifetime of shared props.
    pub shared_scope: SharedScope,

    /// Whether asset versioning is used. Disable when the build already busts caches.
    pub use_versioning: bool,

    /// Directories hashed into the version token, in order.
    ///
    /// Entries may start with an alias (`@webroot/assets`) and may reference
    /// environment variables (`$ASSETS` or `${ASSETS}`).
    pub assets_dirs: Vec<String>,

    /// Path aliases available to `assets_dirs`.
    pub aliases: BTreeMap<String, PathBuf>,

    /// CSRF bridge; `None` disables it.
    pub csrf: Option<CsrfConfig>,

    /// Path prefixes the adapter leaves alone entirely.
    pub except: Vec<String>,

    /// Scheme used for absolute URLs when the request does not reveal one.
    pub scheme: String,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert("@webroot".to_string(), PathBuf::from("public"));
        Self {
            view: None,
            entry_script: "/assets/app.js".to_string(),
            share_key: DEFAULT_SHARE_KEY.to_string(),
            shared_scope: SharedScope::Request,
            use_versioning: true,
            assets_dirs: vec!["@webroot/assets".to_string()],
            aliases,
            csrf: None,
            except: Vec::new(),
            scheme: "http".to_string(),
        }
    }
}

impl InertiaConfig {
    /// Set the root view template file.
    #[must_use]
    pub fn with_view(mut self, view: impl Into<PathBuf>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Set the bundle path used by the built-in template.
    #[must_use]
    pub fn with_entry_script(mut self, entry_script: impl Into<String>) -> Self {
        self.entry_script = entry_script.into();
        self
    }

    /// Set the process-scope namespace.
    #[must_use]
    pub fn with_share_key(mut self, share_key: impl Into<String>) -> Self {
        self.share_key = share_key.into();
        self
    }

    /// Set the shared-props lifetime.
    #[must_use]
    pub fn with_shared_scope(mut self, scope: SharedScope) -> Self {
        self.shared_scope = scope;
        self
    }

    /// Turn asset versioning on or off.
    #[must_use]
    pub fn with_versioning(mut self, enabled: bool) -> Self {
        self.use_versioning = enabled;
        self
    }

    /// Replace the asset directory list.
    #[must_use]
    pub fn with_assets_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Register or replace a path alias. The leading `@` is optional.
    ///
    /// # Arguments
    ///
    /// * `alias` - Alias name, with or without the leading `@`
    /// * `path` - Directory the alias expands to
    ///
    /// # Examples
    ///
    /// ```
    /// use inertia_axum_http::InertiaConfig;
    /// use std::path::PathBuf;
    ///
    /// let config = InertiaConfig::default().with_alias("dist", "/srv/dist");
    /// assert_eq!(
    ///     config.resolve_path("@dist/js").unwrap(),
    ///     PathBuf::from("/srv/dist/js")
    /// );
    /// ```
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let alias = alias.into();
        let alias = if alias.starts_with('@') {
            alias
        } else {
            format!("@{alias}")
        };
        self.aliases.insert(alias, path.into());
        self
    }

    /// Enable the CSRF bridge.
    #[must_use]
    pub fn with_csrf(mut self, csrf: CsrfConfig) -> Self {
        self.csrf = Some(csrf);
        self
    }

    /// Exclude a path prefix from every adapter hook.
    #[must_use]
    pub fn with_except(mut self, prefix: impl Into<String>) -> Self {
        self.except.push(prefix.into());
        self
    }

    /// Set the fallback scheme for absolute URLs.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Whether requests to `path` bypass the adapter.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.except
            .iter()
            .any(|prefix| !prefix.is_empty() && path.starts_with(prefix.as_str()))
    }

    /// Expand aliases and environment variables in `assets_dirs`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown alias or an unset environment variable; both are
    /// configuration mistakes that would otherwise hash the wrong tree.
    pub fn resolved_assets_dirs(&self) -> Result<Vec<PathBuf>> {
        self.assets_dirs
            .iter()
            .map(|dir| self.resolve_path(dir))
            .collect()
    }

    /// Expand a single path.
    pub fn resolve_path(&self, raw: &str) -> Result<PathBuf> {
        let expanded = expand_env(raw)?;

        if !expanded.starts_with('@') {
            return Ok(PathBuf::from(expanded));
        }

        let (alias, rest) = match expanded.find(|c| c == '/' || c == '\\') {
            Some(idx) => (&expanded[..idx], &expanded[idx + 1..]),
            None => (expanded.as_str(), ""),
        };
        let base = self
            .aliases
            .get(alias)
            .ok_or_else(|| InertiaError::Config(format!("unknown path alias '{alias}'")))?;

        Ok(if rest.is_empty() {
            base.clone()
        } else {
            base.join(rest)
        })
    }
}

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .unwrap_or_else(|_| unreachable!("static pattern is valid"))
    })
}

fn expand_env(raw: &str) -> Result<String> {
    let mut missing = None;
    let expanded = env_pattern().replace_all(raw, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match std::env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(InertiaError::Config(format!(
            "environment variable '{name}' referenced by '{raw}' is not set"
        ))),
        None => Ok(expanded.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InertiaConfig::default();
        assert_eq!(config.share_key, "__inertia__");
        assert_eq!(config.shared_scope, SharedScope::Request);
        assert!(config.use_versioning);
        assert_eq!(config.assets_dirs, vec!["@webroot/assets".to_string()]);
        assert!(config.csrf.is_none());
    }

    #[test]
    fn test_alias_expansion() {
        let config = InertiaConfig::default().with_alias("webroot", "/srv/www");
        let dirs = config.resolved_assets_dirs().unwrap();
        assert_eq!(dirs, vec![PathBuf::from("/srv/www/assets")]);
    }

    #[test]
    fn test_bare_alias() {
        let config = InertiaConfig::default().with_alias("@dist", "/srv/dist");
        assert_eq!(config.resolve_path("@dist").unwrap(), PathBuf::from("/srv/dist"));
    }

    #[test]
    fn test_unknown_alias() {
        let config = InertiaConfig::default();
        assert!(matches!(
            config.resolve_path("@nowhere/assets"),
            Err(InertiaError::Config(_))
        ));
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("INERTIA_TEST_ASSET_ROOT", "/opt/app");
        let config = InertiaConfig::default();
        assert_eq!(
            config.resolve_path("$INERTIA_TEST_ASSET_ROOT/js").unwrap(),
            PathBuf::from("/opt/app/js")
        );
        assert_eq!(
            config.resolve_path("${INERTIA_TEST_ASSET_ROOT}/css").unwrap(),
            PathBuf::from("/opt/app/css")
        );
    }

    #[test]
    fn test_env_expansion_into_alias() {
        std::env::set_var("INERTIA_TEST_ALIAS_NAME", "web");
        let config = InertiaConfig::default().with_alias("@web", "/var/web");
        assert_eq!(
            config.resolve_path("@$INERTIA_TEST_ALIAS_NAME/assets").unwrap(),
            PathBuf::from("/var/web/assets")
        );
    }

    #[test]
    fn test_missing_env_var() {
        let config = InertiaConfig::default();
        assert!(config
            .resolve_path("$INERTIA_TEST_DEFINITELY_UNSET_VAR/js")
            .is_err());
    }

    #[test]
    fn test_excluded_paths() {
        let config = InertiaConfig::default().with_except("/admin");
        assert!(config.is_excluded("/admin/users"));
        assert!(!config.is_excluded("/users"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: InertiaConfig = serde_json::from_str(
            r#"{"use_versioning": false, "shared_scope": "process", "csrf": {"secret": "s3cr3t"}}"#,
        )
        .unwrap();
        assert!(!config.use_versioning);
        assert_eq!(config.shared_scope, SharedScope::Process);
        let csrf = config.csrf.unwrap();
        assert_eq!(csrf.secret, "s3cr3t");
        assert_eq!(csrf.param, "XSRF-TOKEN");
        assert_eq!(csrf.header, "x-xsrf-token");
        assert_eq!(config.share_key, "__inertia__");
    }
}

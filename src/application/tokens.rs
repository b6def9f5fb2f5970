//! Token Replacement Use Case
//!
//! Substitutes `<prefix>name<suffix>` placeholders in a parameter file in
//! place. Token values come from three layers, later ones winning:
//! built-in run context, local tokens from settings, custom tokens from the
//! caller.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::ports::{FileSystem, ProviderContext};
use crate::domain::services::{replace_tokens, TokenReplacement};
use crate::domain::value_objects::{ScopeSelector, TokenDelimiters, TokenMap, TokenSource};
use crate::error::{DeployError, DeployResult};

/// Names of the built-in tokens, always present in a token map
pub const BUILT_IN_TOKENS: [&str; 5] = [
    "subscriptionId",
    "managementGroupId",
    "resourceGroupName",
    "tenantId",
    "deploymentSpId",
];

/// Values describing the current run, exposed as built-in tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    pub subscription_id: String,
    pub management_group_id: String,
    pub resource_group_name: String,
    pub tenant_id: String,
    /// Object id of the deploying service principal
    pub principal_id: String,
}

impl RunContext {
    pub fn from_selector(selector: &ScopeSelector) -> Self {
        Self {
            subscription_id: selector.subscription_token(),
            management_group_id: selector.management_group_token(),
            resource_group_name: selector.resource_group_token(),
            ..Self::default()
        }
    }

    pub fn with_tenant(mut self, tenant_id: Option<&str>) -> Self {
        if let Some(id) = tenant_id {
            self.tenant_id = id.trim().to_string();
        }
        self
    }

    pub fn with_principal(mut self, principal_id: Option<&str>) -> Self {
        if let Some(id) = principal_id {
            self.principal_id = id.trim().to_string();
        }
        self
    }

    /// Fill tenant and subscription from the provider identity when the
    /// caller left them empty
    pub fn fill_from(mut self, provider: &ProviderContext) -> Self {
        if self.tenant_id.is_empty() {
            if let Some(tenant) = &provider.tenant_id {
                self.tenant_id = tenant.clone();
            }
        }
        if self.subscription_id.is_empty() {
            if let Some(sub) = &provider.subscription_id {
                self.subscription_id = sub.clone();
            }
        }
        self
    }

    fn built_in_tokens(&self) -> [(&'static str, String); 5] {
        [
            (BUILT_IN_TOKENS[0], self.subscription_id.clone()),
            (BUILT_IN_TOKENS[1], self.management_group_id.clone()),
            (BUILT_IN_TOKENS[2], self.resource_group_name.clone()),
            (BUILT_IN_TOKENS[3], self.tenant_id.clone()),
            (BUILT_IN_TOKENS[4], self.principal_id.clone()),
        ]
    }
}

/// Compose the token map: built-in < local (settings) < custom
pub fn build_token_map(
    context: &RunContext,
    settings: &Settings,
    custom: &[(String, String)],
) -> TokenMap {
    TokenMap::builder()
        .extend(TokenSource::BuiltIn, context.built_in_tokens())
        .extend(TokenSource::Local, settings.local_tokens())
        .extend(
            TokenSource::Custom,
            custom.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
        .build()
}

/// How a replacement run behaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Fail on placeholders without a value instead of leaving them
    pub strict: bool,
    /// Compute the result without writing the file
    pub dry_run: bool,
}

/// Result of replacing tokens in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReplaceOutcome {
    pub path: PathBuf,
    pub original: String,
    pub replacement: TokenReplacement,
    /// Whether the file was rewritten
    pub written: bool,
}

impl TokenReplaceOutcome {
    pub fn changed(&self) -> bool {
        self.original != self.replacement.content
    }
}

/// Replaces tokens in parameter files
pub struct TokenReplacer<FS: FileSystem> {
    fs: FS,
}

impl<FS: FileSystem> TokenReplacer<FS> {
    pub fn new(fs: FS) -> Self {
        Self { fs }
    }

    pub fn replace(
        &self,
        path: &Path,
        tokens: &TokenMap,
        delimiters: &TokenDelimiters,
        options: ReplaceOptions,
    ) -> DeployResult<TokenReplaceOutcome> {
        if !self.fs.exists(path) {
            return Err(DeployError::MissingTemplateFile {
                path: path.to_path_buf(),
            });
        }

        let original = self.fs.read(path)?;
        let replacement = replace_tokens(&original, tokens, delimiters);

        debug!(
            path = %path.display(),
            replaced = replacement.total_replaced(),
            unresolved = ?replacement.unresolved,
            "tokens substituted"
        );

        if options.strict && !replacement.unresolved.is_empty() {
            return Err(DeployError::MissingTokenValue {
                file: path.to_path_buf(),
                tokens: replacement.unresolved,
            });
        }

        let changed = original != replacement.content;
        let written = changed && !options.dry_run;
        if written {
            self.fs.write(path, &replacement.content)?;
            info!(path = %path.display(), "parameter file updated");
        }

        Ok(TokenReplaceOutcome {
            path: path.to_path_buf(),
            original,
            replacement,
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalToken;
    use crate::domain::ports::{FsError, FsResult};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockFileSystem {
        files: RefCell<HashMap<PathBuf, String>>,
        writes: RefCell<usize>,
    }

    impl MockFileSystem {
        fn with_file(path: &str, content: &str) -> Self {
            let fs = Self::default();
            fs.files
                .borrow_mut()
                .insert(PathBuf::from(path), content.to_string());
            fs
        }
    }

    impl FileSystem for MockFileSystem {
        fn read(&self, path: &Path) -> FsResult<String> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
        }

        fn write(&self, path: &Path, content: &str) -> FsResult<()> {
            *self.writes.borrow_mut() += 1;
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.borrow().contains_key(path)
        }
    }

    fn settings_with_local(tokens: &[(&str, &str)]) -> Settings {
        let mut settings = Settings::default();
        settings.parameter_file_tokens.local_tokens = tokens
            .iter()
            .map(|(n, v)| LocalToken {
                name: n.to_string(),
                value: v.to_string(),
            })
            .collect();
        settings
    }

    #[test]
    fn built_in_tokens_always_present() {
        let map = build_token_map(&RunContext::default(), &Settings::default(), &[]);
        for name in BUILT_IN_TOKENS {
            assert_eq!(map.get(name), Some(""), "{name} should be present");
        }
    }

    #[test]
    fn custom_beats_local_beats_built_in() {
        let context = RunContext::from_selector(&ScopeSelector::new().with_subscription("sub-1"));
        let settings = settings_with_local(&[("subscriptionId", "local-sub"), ("env", "dev")]);
        let custom = vec![("env".to_string(), "prod".to_string())];

        let map = build_token_map(&context, &settings, &custom);

        assert_eq!(map.get("subscriptionId"), Some("local-sub"));
        assert_eq!(map.get("env"), Some("prod"));
        assert_eq!(map.source_of("env"), Some(TokenSource::Custom));
    }

    #[test]
    fn run_context_fill_keeps_explicit_values() {
        let provider = ProviderContext {
            tenant_id: Some("t-provider".to_string()),
            subscription_id: Some("s-provider".to_string()),
        };
        let context = RunContext::default()
            .with_tenant(Some("t-explicit"))
            .fill_from(&provider);
        assert_eq!(context.tenant_id, "t-explicit");
        assert_eq!(context.subscription_id, "s-provider");
    }

    #[test]
    fn replace_writes_substituted_content() {
        let fs = MockFileSystem::with_file("p.json", r#"{"name": "<<namePrefix>>-kv"}"#);
        let map = build_token_map(
            &RunContext::default(),
            &settings_with_local(&[("namePrefix", "carml")]),
            &[],
        );

        let outcome = TokenReplacer::new(&fs)
            .replace(
                Path::new("p.json"),
                &map,
                &TokenDelimiters::default(),
                ReplaceOptions::default(),
            )
            .unwrap();

        assert!(outcome.written);
        assert_eq!(
            fs.files.borrow()[Path::new("p.json")],
            r#"{"name": "carml-kv"}"#
        );
    }

    #[test]
    fn unknown_tokens_left_in_place_by_default() {
        let fs = MockFileSystem::with_file("p.json", "<<unknown>> and <<tenantId>>");
        let context = RunContext::default().with_tenant(Some("t-1"));
        let map = build_token_map(&context, &Settings::default(), &[]);

        let outcome = TokenReplacer::new(&fs)
            .replace(
                Path::new("p.json"),
                &map,
                &TokenDelimiters::default(),
                ReplaceOptions::default(),
            )
            .unwrap();

        assert_eq!(outcome.replacement.content, "<<unknown>> and t-1");
        assert_eq!(outcome.replacement.unresolved, vec!["unknown".to_string()]);
    }

    #[test]
    fn strict_mode_fails_before_writing() {
        let fs = MockFileSystem::with_file("p.json", "<<missing>>");
        let map = build_token_map(&RunContext::default(), &Settings::default(), &[]);

        let err = TokenReplacer::new(&fs)
            .replace(
                Path::new("p.json"),
                &map,
                &TokenDelimiters::default(),
                ReplaceOptions {
                    strict: true,
                    dry_run: false,
                },
            )
            .unwrap_err();

        assert!(matches!(err, DeployError::MissingTokenValue { ref tokens, .. } if tokens == &["missing"]));
        assert_eq!(*fs.writes.borrow(), 0);
    }

    #[test]
    fn dry_run_and_unchanged_files_are_not_written() {
        let fs = MockFileSystem::with_file("p.json", "<<tenantId>>");
        let map = build_token_map(&RunContext::default(), &Settings::default(), &[]);
        let replacer = TokenReplacer::new(&fs);

        let dry = replacer
            .replace(
                Path::new("p.json"),
                &map,
                &TokenDelimiters::default(),
                ReplaceOptions {
                    strict: false,
                    dry_run: true,
                },
            )
            .unwrap();
        assert!(dry.changed());
        assert!(!dry.written);

        let plain = MockFileSystem::with_file("q.json", "{}");
        let outcome = TokenReplacer::new(&plain)
            .replace(
                Path::new("q.json"),
                &map,
                &TokenDelimiters::default(),
                ReplaceOptions::default(),
            )
            .unwrap();
        assert!(!outcome.written);
        assert_eq!(*fs.writes.borrow() + *plain.writes.borrow(), 0);
    }

    #[test]
    fn missing_file_is_reported() {
        let fs = MockFileSystem::default();
        let map = build_token_map(&RunContext::default(), &Settings::default(), &[]);

        let err = TokenReplacer::new(&fs)
            .replace(
                Path::new("nope.json"),
                &map,
                &TokenDelimiters::default(),
                ReplaceOptions::default(),
            )
            .unwrap_err();

        assert!(matches!(err, DeployError::MissingTemplateFile { .. }));
    }
}

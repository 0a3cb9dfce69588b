//! Repo definitions document
//!
//! A definitions document is a YAML list of named backing-store records:
//!
//! ```yaml
//! repos:
//!   - name: default
//!     uri: classpath:env
//!   - name: appx
//!     source-name: http
//!     uri: https://config.example.com/appx
//!     username: reader
//!     password: s3cret
//!     auth-method: basic
//!     trust-certs: true
//!     file-name: app.properties
//! ```
//!
//! Parsing is strict: a record whose uri cannot be classified, whose
//! source name contradicts the uri scheme, or whose auth method is
//! unknown fails the whole document. Registry loading builds on this and
//! is the fail-fast edge of the system.

use serde::Deserialize;

use crate::location::{has_file_extension, strip_leading_separator, Location, Scheme};
use crate::{Error, Result};

/// Name under which the fallback repo is looked up.
pub const DEFAULT_REPO_NAME: &str = "default";
/// File name appended when a path does not name a file.
pub const DEFAULT_FILE_NAME: &str = "default.properties";

/// Backing-store family of a repo definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// Plain file tree under the root location.
    File,
    /// File lookup across the configured resource roots.
    Classpath,
    /// Remote http/s fetch rooted at the root location.
    Http,
    /// Server mode: the remote endpoint performs resolution itself and
    /// receives repo name and named paths as query parameters. Never
    /// read from a definitions document.
    Server,
}

impl SourceType {
    fn from_scheme(scheme: Scheme, uri: &str) -> Result<SourceType> {
        match scheme {
            Scheme::File => Ok(SourceType::File),
            Scheme::Classpath => Ok(SourceType::Classpath),
            Scheme::Http => Ok(SourceType::Http),
            Scheme::Repo => Err(Error::Definitions {
                location: uri.to_string(),
                message: "repo root cannot itself be repo-relative".to_string(),
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceType::File => "file",
            SourceType::Classpath => "classpath",
            SourceType::Http => "http",
            SourceType::Server => "server",
        }
    }
}

/// How credentials are presented to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Basic,
}

/// Credentials attached to a repo definition, passed through to the
/// source adapter unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub method: AuthMethod,
}

/// One resolved backing-store definition.
#[derive(Debug, Clone)]
pub struct RepoDefinition {
    name: String,
    source_type: SourceType,
    root: Location,
    credentials: Option<Credentials>,
    trust_certs: bool,
    file_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefinitionsDoc {
    repos: Vec<RepoRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RepoRecord {
    name: String,
    source_name: Option<String>,
    uri: String,
    username: Option<String>,
    password: Option<String>,
    auth_method: Option<String>,
    #[serde(default)]
    trust_certs: bool,
    file_name: Option<String>,
}

/// Parse a definitions document.
///
/// `location` labels errors; any malformed record fails the whole
/// document so a registry never loads half a configuration.
pub fn parse(bytes: &[u8], location: &str) -> Result<Vec<RepoDefinition>> {
    let doc: DefinitionsDoc = serde_yaml::from_slice(bytes).map_err(|e| Error::Definitions {
        location: location.to_string(),
        message: e.to_string(),
    })?;

    doc.repos
        .into_iter()
        .map(|record| RepoDefinition::from_record(record, location))
        .collect()
}

impl RepoDefinition {
    fn from_record(record: RepoRecord, doc_location: &str) -> Result<RepoDefinition> {
        let fail = |message: String| Error::Definitions {
            location: doc_location.to_string(),
            message,
        };

        let root = Location::parse(&record.uri)?;
        let scheme = root.scheme_or_err()?;
        let source_type = SourceType::from_scheme(scheme, &record.uri)?;

        // A declared source-name must agree with what the uri implies.
        if let Some(name) = record.source_name.as_deref() {
            let name = name.to_ascii_lowercase();
            if name != "file" && name != "http" {
                return Err(fail(format!(
                    "repo '{}': unknown source-name '{}'",
                    record.name, name
                )));
            }
            if scheme.source_name() != Some(name.as_str()) {
                return Err(fail(format!(
                    "repo '{}': source-name '{}' does not match uri '{}'",
                    record.name, name, record.uri
                )));
            }
        }

        // Both the short and the long spelling of basic auth are accepted.
        let method = match record.auth_method.as_deref() {
            None => AuthMethod::Basic,
            Some(m) if m.eq_ignore_ascii_case("basic") => AuthMethod::Basic,
            Some(m) if m.eq_ignore_ascii_case("httpbasicauth") => AuthMethod::Basic,
            Some(m) => {
                return Err(fail(format!(
                    "repo '{}': unknown auth-method '{}'",
                    record.name, m
                )));
            }
        };

        let credentials = match (record.username, record.password) {
            (Some(username), password) => Some(Credentials {
                username,
                password: password.unwrap_or_default(),
                method,
            }),
            (None, Some(_)) => {
                tracing::warn!(repo = record.name, "password without username, ignoring");
                None
            }
            (None, None) => None,
        };

        Ok(RepoDefinition {
            name: record.name,
            source_type,
            root,
            credentials,
            trust_certs: record.trust_certs,
            file_name: record
                .file_name
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
        })
    }

    /// Assemble an ad-hoc definition for a location used without a
    /// definitions document.
    pub fn ad_hoc(name: impl Into<String>, root: Location, source_type: SourceType) -> RepoDefinition {
        RepoDefinition {
            name: name.into(),
            source_type,
            root,
            credentials: None,
            trust_certs: false,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    /// Override the default file name on an ad-hoc definition.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Attach basic-auth credentials to an ad-hoc definition.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
            method: AuthMethod::Basic,
        });
        self
    }

    /// Relax certificate validation on an ad-hoc definition.
    pub fn with_trust_certs(mut self, trust: bool) -> Self {
        self.trust_certs = trust;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Root location all relative references resolve against.
    pub fn root(&self) -> &Location {
        &self.root
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Whether certificate validation is relaxed for this repo.
    pub fn trust_certs(&self) -> bool {
        self.trust_certs
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Complete `path` into a file reference relative to the root.
    ///
    /// A path naming a file (extension present) is used as-is; a
    /// directory path gets the default file name appended; an empty path
    /// means the root itself, which resolves to the default file name
    /// unless the root already names a file.
    pub fn file_reference(&self, path: &str) -> String {
        let path = strip_leading_separator(path);
        if path.is_empty() {
            if has_file_extension(self.root.raw()) {
                return String::new();
            }
            return self.file_name.clone();
        }
        if has_file_extension(path) {
            return path.to_string();
        }
        format!("{path}/{}", self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOC: &[u8] = br#"
repos:
  - name: default
    uri: classpath:env
  - name: appx
    source-name: http
    uri: https://config.example.com/appx
    username: reader
    password: s3cret
    auth-method: basic
    trust-certs: true
    file-name: app.properties
"#;

    #[test]
    fn parses_records_with_defaults() {
        let defs = parse(DOC, "repos.yaml").unwrap();
        assert_eq!(defs.len(), 2);

        let default = &defs[0];
        assert_eq!(default.name(), "default");
        assert_eq!(default.source_type(), SourceType::Classpath);
        assert_eq!(default.file_name(), DEFAULT_FILE_NAME);
        assert!(default.credentials().is_none());
        assert!(!default.trust_certs());

        let appx = &defs[1];
        assert_eq!(appx.source_type(), SourceType::Http);
        assert_eq!(appx.file_name(), "app.properties");
        assert!(appx.trust_certs());
        let creds = appx.credentials().unwrap();
        assert_eq!(creds.username, "reader");
        assert_eq!(creds.password, "s3cret");
        assert_eq!(creds.method, AuthMethod::Basic);
    }

    #[test]
    fn source_name_file_with_plain_uri_is_a_file_repo() {
        let doc = b"repos:\n  - name: share\n    source-name: file\n    uri: file:/opt/configs\n";
        let defs = parse(doc, "repos.yaml").unwrap();
        assert_eq!(defs[0].source_type(), SourceType::File);
    }

    #[test]
    fn source_name_contradicting_uri_fails() {
        let doc = b"repos:\n  - name: broken\n    source-name: http\n    uri: file:/opt/configs\n";
        assert!(matches!(
            parse(doc, "repos.yaml"),
            Err(Error::Definitions { .. })
        ));
    }

    #[test]
    fn unknown_source_name_fails() {
        let doc = b"repos:\n  - name: broken\n    source-name: s3\n    uri: file:/opt\n";
        assert!(parse(doc, "repos.yaml").is_err());
    }

    #[test]
    fn long_auth_method_spelling_is_accepted() {
        let doc =
            b"repos:\n  - name: ok\n    uri: http://h/c\n    username: u\n    auth-method: HttpBasicAuth\n";
        let defs = parse(doc, "repos.yaml").unwrap();
        assert_eq!(defs[0].credentials().unwrap().method, AuthMethod::Basic);
    }

    #[test]
    fn unknown_auth_method_fails() {
        let doc =
            b"repos:\n  - name: broken\n    uri: http://h/c\n    username: u\n    auth-method: aws\n";
        assert!(parse(doc, "repos.yaml").is_err());
    }

    #[test]
    fn unclassifiable_uri_fails_fast() {
        let doc = b"repos:\n  - name: broken\n    uri: relative/path\n";
        assert!(matches!(
            parse(doc, "repos.yaml"),
            Err(Error::UnresolvedScheme { .. })
        ));
    }

    #[test]
    fn malformed_yaml_reports_the_document_location() {
        let err = parse(b"repos: [unterminated", "cfgrd://meta").unwrap_err();
        assert!(matches!(
            err,
            Error::Definitions { ref location, .. } if location == "cfgrd://meta"
        ));
    }

    fn classpath_def() -> RepoDefinition {
        let root = Location::parse("classpath:env").unwrap();
        RepoDefinition::ad_hoc("default", root, SourceType::Classpath)
    }

    #[rstest]
    #[case("", "default.properties")]
    #[case("env/dev/custom", "env/dev/custom/default.properties")]
    #[case("/env/dev/custom", "env/dev/custom/default.properties")]
    #[case("env/dev/app.json", "env/dev/app.json")]
    #[case("app.yaml", "app.yaml")]
    fn completes_paths_into_file_references(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(classpath_def().file_reference(path), expected);
    }

    #[test]
    fn root_naming_a_file_needs_no_completion() {
        let root = Location::parse("file:/opt/configs/app.properties").unwrap();
        let def = RepoDefinition::ad_hoc("one-file", root, SourceType::File);
        assert_eq!(def.file_reference(""), "");
    }
}

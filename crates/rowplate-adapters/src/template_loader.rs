//! TOML template repository.
//!
//! Reads templates from one `*.toml` document or from every `*.toml` file
//! below a directory.
//!
//! # Document format
//!
//! ```toml
//! [[line_templates]]
//! name     = "fruit-insert"
//! header   = "BEGIN;"
//! pattern  = "INSERT INTO fruit VALUES ('${_csv0}', ${_csv1}, '${color}');"
//! footer   = "COMMIT;"
//! encoding = "UTF-8"            # UTF-8 | UTF-16LE | UTF-16BE
//!
//! [[line_templates.params]]
//! name   = "color"
//! type   = "DATAFAKER"
//! option = "#{color.name}"
//!
//! [[request_templates]]
//! name    = "fruit-post"
//! uri     = "http://localhost:8080/fruit"
//! method  = "POST"
//! headers = "Content-Type: application/json"
//! body    = '{"name": "${_csv0}"}'
//!
//! [request_templates.batch]
//! size      = 10
//! start     = "["
//! end       = "]"
//! separator = ","
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use rowplate_core::{
    application::{ApplicationError, ports::TemplateRepository},
    domain::{LineTemplate, RequestTemplate},
    error::{Context, RowplateResult},
};

/// One template document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDocument {
    pub line_templates: Vec<LineTemplate>,
    pub request_templates: Vec<RequestTemplate>,
}

impl TemplateDocument {
    pub fn parse(source_name: &str, text: &str) -> RowplateResult<Self> {
        toml::from_str(text).map_err(|e| {
            ApplicationError::TemplateParse {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn to_toml(&self) -> RowplateResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ApplicationError::TemplateParse {
                source_name: "<document>".into(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Write the document to `path`, replacing its content.
    pub fn save(&self, path: &Path) -> RowplateResult<()> {
        let text = self.to_toml()?;
        fs::write(path, text).context(format!("writing '{}'", path.display()))
    }

    fn merge(&mut self, other: TemplateDocument) {
        self.line_templates.extend(other.line_templates);
        self.request_templates.extend(other.request_templates);
    }
}

/// Templates stored in TOML files.
///
/// Pointed at a file, a parse error fails the load. Pointed at a directory,
/// files that fail to parse are skipped with a `WARN` log so one broken
/// file does not hide the others.
#[derive(Debug, Clone)]
pub struct TomlTemplateRepository {
    source: PathBuf,
}

impl TomlTemplateRepository {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Load and merge every document.
    #[instrument(skip(self), fields(source = %self.source.display()))]
    pub fn load(&self) -> RowplateResult<TemplateDocument> {
        if !self.source.exists() {
            return Err(ApplicationError::Io {
                context: format!("reading '{}'", self.source.display()),
                reason: "no such file or directory".into(),
            }
            .into());
        }

        if self.source.is_file() {
            return read_document(&self.source);
        }

        let mut merged = TemplateDocument::default();
        for entry in WalkDir::new(&self.source).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::Io {
                context: format!("walking '{}'", self.source.display()),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "toml") {
                continue;
            }

            match read_document(path) {
                Ok(document) => merged.merge(document),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping template file");
                }
            }
        }

        debug!(
            line = merged.line_templates.len(),
            request = merged.request_templates.len(),
            "templates loaded"
        );
        Ok(merged)
    }
}

fn read_document(path: &Path) -> RowplateResult<TemplateDocument> {
    let text = fs::read_to_string(path).context(format!("reading '{}'", path.display()))?;
    TemplateDocument::parse(&path.display().to_string(), &text)
}

impl TemplateRepository for TomlTemplateRepository {
    fn line_templates(&self) -> RowplateResult<Vec<LineTemplate>> {
        Ok(self.load()?.line_templates)
    }

    fn request_templates(&self) -> RowplateResult<Vec<RequestTemplate>> {
        Ok(self.load()?.request_templates)
    }
}

#[cfg(test)]
mod tests {
    use rowplate_core::domain::{Batch, Encoding, HttpMethod, Param, ParamType};
    use rowplate_core::error::RowplateError;

    use super::*;

    const DOC: &str = r##"
[[line_templates]]
name = "insert"
header = "BEGIN;"
pattern = "INSERT INTO fruit VALUES ('${_csv0}', '${color}');"
encoding = "UTF-16LE"

[[line_templates.params]]
name = "color"
type = "DATAFAKER"
option = "#{color.name}"

[[request_templates]]
name = "post"
uri = "http://localhost/fruit"
body = '{"name": "${_csv0}"}'

[request_templates.batch]
size = 2
start = "["
end = "]"
separator = ","
"##;

    #[test]
    fn parses_both_template_kinds() {
        let doc = TemplateDocument::parse("doc", DOC).unwrap();
        let line = &doc.line_templates[0];
        assert_eq!(line.name, "insert");
        assert_eq!(line.encoding, Encoding::Utf16Le);
        assert_eq!(line.params.get("color").map(|p| p.kind), Some(ParamType::Datafaker));

        let request = &doc.request_templates[0];
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.batch.size, 2);
        assert_eq!(request.wait_timeout_secs, 5);
    }

    #[test]
    fn save_then_load_keeps_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.toml");
        let doc = TemplateDocument {
            line_templates: vec![
                LineTemplate::builder()
                    .name("csv")
                    .pattern("${_csv0};${secret}")
                    .delimiter(",")
                    .bom(true)
                    .param(
                        Param::new("secret", ParamType::Password)
                            .unwrap()
                            .with_option("12"),
                    )
                    .build()
                    .unwrap(),
            ],
            request_templates: vec![
                RequestTemplate::builder()
                    .name("bulk")
                    .uri("http://localhost/${path}")
                    .method(HttpMethod::Put)
                    .headers("Accept: */*")
                    .batch(Batch::of(3).with_separator("\n"))
                    .param(Param::constant("path", "items").unwrap())
                    .build()
                    .unwrap(),
            ],
        };

        doc.save(&path).unwrap();
        let loaded = TomlTemplateRepository::new(&path).load().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.toml"), DOC).unwrap();
        fs::create_dir(dir.path().join("more")).unwrap();
        fs::write(
            dir.path().join("more/b.toml"),
            "[[line_templates]]\nname = \"second\"\npattern = \"${_csv0}\"\n",
        )
        .unwrap();
        fs::write(dir.path().join("broken.toml"), "[[line_templates]\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let repo = TomlTemplateRepository::new(dir.path());
        let names: Vec<String> = repo
            .line_templates()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["insert", "second"]);
        assert_eq!(repo.find_request("post").unwrap().batch.size, 2);
    }

    #[test]
    fn broken_single_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "line_templates = 3").unwrap();

        let err = TomlTemplateRepository::new(&path).load().unwrap_err();
        assert!(matches!(
            err,
            RowplateError::Application(ApplicationError::TemplateParse { .. })
        ));
    }

    #[test]
    fn missing_template_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.toml");
        fs::write(&path, DOC).unwrap();

        let err = TomlTemplateRepository::new(&path).find_line("nope").unwrap_err();
        assert!(matches!(
            err,
            RowplateError::Application(ApplicationError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let err = TomlTemplateRepository::new("/definitely/not/here.toml")
            .load()
            .unwrap_err();
        assert!(matches!(
            err,
            RowplateError::Application(ApplicationError::Io { .. })
        ));
    }
}

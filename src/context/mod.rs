//! Initial variables for a document
//!
//! [`ContextBuilder`] collects the variables every expression of a document
//! can reference: the processing time, the input file, its folder levels
//! below the watched root, recognized text and zones, and values of fields
//! stored with the document earlier.

use crate::evaluator::{ExpressionEngine, VariableContext};
use crate::fields::FieldDocument;
use chrono::{Datelike, Local, NaiveDateTime, TimeZone};
use log::debug;
use std::fs;
use std::path::{Component, Path};

/// Prefix under which recognized-text variables are also published
pub const OCR_PREFIX: &str = "OCR_";

/// Builds the [`VariableContext`] for one document
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    now: NaiveDateTime,
    hierarchy_depth: usize,
    variables: VariableContext,
}

impl ContextBuilder {
    /// Start with the time variables for `now` and empty folder levels
    pub fn new(now: NaiveDateTime) -> Self {
        Self::with_depth(now, 5)
    }

    /// Use the engine's clock and configured hierarchy depth
    pub fn from_engine(engine: &ExpressionEngine) -> Self {
        Self::with_depth(engine.now(), engine.config().hierarchy_depth)
    }

    fn with_depth(now: NaiveDateTime, hierarchy_depth: usize) -> Self {
        let mut builder = Self {
            now,
            hierarchy_depth,
            variables: VariableContext::new(),
        };
        builder.add_time();
        for level in 0..=hierarchy_depth {
            builder.variables.set(format!("level{level}"), "");
        }
        builder
    }

    fn add_time(&mut self) {
        let now = self.now;
        let timestamp = Local
            .from_local_datetime(&now)
            .earliest()
            .map(|local| local.timestamp())
            .unwrap_or_else(|| now.and_utc().timestamp());

        let vars = &mut self.variables;
        vars.set("Date", now.format("%Y-%m-%d").to_string());
        vars.set("DateDE", now.format("%d.%m.%Y").to_string());
        vars.set("Time", now.format("%H-%M-%S").to_string());
        vars.set("TimeColon", now.format("%H:%M:%S").to_string());
        vars.set("DateTime", now.format("%Y-%m-%d_%H-%M-%S").to_string());
        vars.set("DateTimeDE", now.format("%d.%m.%Y %H:%M:%S").to_string());
        vars.set("Year", now.format("%Y").to_string());
        vars.set("Month", now.format("%m").to_string());
        vars.set("MonthName", now.format("%B").to_string());
        vars.set("Day", now.format("%d").to_string());
        vars.set("Hour", now.format("%H").to_string());
        vars.set("Minute", now.format("%M").to_string());
        vars.set("Second", now.format("%S").to_string());
        vars.set("Weekday", now.format("%A").to_string());
        vars.set("WeekdayShort", now.format("%a").to_string());
        vars.set("WeekNumber", format!("{:02}", now.iso_week().week()));
        vars.set("Timestamp", timestamp.to_string());
    }

    /// Add the file variables for `path`.
    ///
    /// Size variables are `0` when the file cannot be inspected.
    pub fn with_file(mut self, path: &Path) -> Self {
        let name_of = |s: Option<&std::ffi::OsStr>| {
            s.map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let size = fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len());

        let vars = &mut self.variables;
        vars.set("FileName", name_of(path.file_stem()));
        vars.set(
            "FileExtension",
            path.extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default(),
        );
        vars.set("FullFileName", name_of(path.file_name()));
        vars.set(
            "FilePath",
            path.parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        vars.set("FullPath", path.to_string_lossy().into_owned());
        match size {
            Some(bytes) => {
                vars.set("FileSize", bytes.to_string());
                vars.set(
                    "FileSizeMB",
                    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0)),
                );
            }
            None => {
                vars.set("FileSize", "0");
                vars.set("FileSizeMB", "0");
            }
        }
        self
    }

    /// Add `level0..levelN` for `file` below `root`, plus `InputPath`.
    ///
    /// `level0` is the root folder's name; `levelN` is the N-th folder between
    /// root and file. Levels that do not exist, or all of them when the file
    /// is not below the root, are empty.
    pub fn with_hierarchy(mut self, file: &Path, root: &Path) -> Self {
        let input_path = root.to_string_lossy().into_owned();
        let (file, root) = match (fs::canonicalize(file), fs::canonicalize(root)) {
            (Ok(file), Ok(root)) => (file, root),
            _ => (file.to_path_buf(), root.to_path_buf()),
        };

        let root_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.variables.set("level0", root_name);

        let folders: Vec<String> = match file.strip_prefix(&root) {
            Ok(relative) => {
                let mut parts: Vec<String> = relative
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect();
                // The last component is the file itself
                parts.pop();
                parts
            }
            Err(_) => {
                debug!(
                    "{} is not below {}, folder levels left empty",
                    file.display(),
                    root.display()
                );
                Vec::new()
            }
        };

        for level in 1..=self.hierarchy_depth {
            let value = folders.get(level - 1).cloned().unwrap_or_default();
            self.variables.set(format!("level{level}"), value);
        }
        self.variables.set("InputPath", input_path);
        self
    }

    /// Add the full recognized text as `OCR_FullText`
    pub fn with_recognized_text(mut self, text: impl Into<String>) -> Self {
        self.variables.set(format!("{OCR_PREFIX}FullText"), text);
        self
    }

    /// Add recognized zones under their name and with the `OCR_` prefix
    pub fn with_zones<I, K, V>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, text) in zones {
            let name = name.as_ref();
            let text: String = text.into();
            if !name.starts_with(OCR_PREFIX) {
                self.variables
                    .set(format!("{OCR_PREFIX}{name}"), text.clone());
            }
            self.variables.set(name, text);
        }
        self
    }

    /// Add the values of a previously stored field document
    pub fn with_document(mut self, document: &FieldDocument) -> Self {
        self.variables.extend(document.iter());
        self
    }

    /// Add arbitrary variables, overriding earlier ones
    pub fn with_variables<I, K, V>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables.extend(variables);
        self
    }

    /// Finish the context
    pub fn build(self) -> VariableContext {
        debug!("Built context with {} variables", self.variables.len());
        self.variables
    }
}

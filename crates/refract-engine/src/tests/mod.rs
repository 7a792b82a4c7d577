//! Crate-level integration and BDD tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::edit::{EditSet, TextEdit};
use crate::error::EngineError;
use crate::filesystem::{FileSystem, MemoryFileSystem};
use crate::log::LogEntry;
use crate::manifest::PluginManifest;
use crate::plugin::{PluginExecutor, PluginTransformation};
use crate::protocol::PluginRequest;
use crate::registry::TransformationRegistry;
use crate::selection::TextSelection;
use crate::transformation::{RunConfig, TransformationResult};


/// Executor that renames `foo` to `bar` in whichever file was selected.
struct RenameExecutor;

impl PluginExecutor for RenameExecutor {
    fn execute(
        &self,
        _manifest: &PluginManifest,
        request: &PluginRequest,
    ) -> Result<TransformationResult, EngineError> {
        let mut result = TransformationResult::default();
        for file in request.files() {
            let Some(offset) = file.content().find("foo") else {
                continue;
            };
            result.edits.insert(
                file.path().clone(),
                EditSet::from_edits(vec![TextEdit::new(offset, 3, "bar")]),
            );
        }
        result.log.push(LogEntry::info("renamed foo to bar"));
        Ok(result)
    }
}

/// Executor whose process always exits with an error.
struct FailingExecutor;

impl PluginExecutor for FailingExecutor {
    fn execute(
        &self,
        manifest: &PluginManifest,
        _request: &PluginRequest,
    ) -> Result<TransformationResult, EngineError> {
        Err(EngineError::NonZeroExit {
            name: manifest.short_name().to_owned(),
            status: 1,
        })
    }
}

fn rename_manifest() -> PluginManifest {
    PluginManifest::new("rename", "Rename", PathBuf::from("/usr/bin/go-rename"))
}

#[test]
fn registered_plugin_produces_applicable_edits() {
    let filesystem = Arc::new(MemoryFileSystem::new("/ws").with_file("foo.go", "package foo\n"));
    let mut registry = TransformationRegistry::new();
    registry
        .register(
            "rename",
            Box::new(PluginTransformation::new(rename_manifest(), RenameExecutor)),
        )
        .expect("register");

    let config = RunConfig {
        filesystem: filesystem.clone(),
        scope: None,
        selection: TextSelection {
            filename: PathBuf::from("/ws/foo.go"),
            ..TextSelection::default()
        },
        args: Vec::new(),
    };
    let result = registry.get("rename").expect("rename").run(&config);

    let edits = result.edits.get(Path::new("/ws/foo.go")).expect("edits");
    let rewritten = edits
        .apply_to(filesystem.as_ref(), Path::new("/ws/foo.go"))
        .expect("apply");
    assert_eq!(rewritten, "package bar\n");
    assert!(filesystem.exists(Path::new("foo.go")));
}

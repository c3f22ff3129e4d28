//! File system tool — file operations sandboxed to the workflow output
//! directory.
//!
//! Providers are inconsistent about argument names, so this tool normalizes
//! its raw arguments before dispatch: `operation`/`action`/`command` all name
//! the action, `filePath`/`filename`/`destination` all name the path, and a
//! `create` action becomes `write` when content is supplied and `create_dir`
//! when it is not.

use async_trait::async_trait;
use ironloom_core::error::ToolError;
use ironloom_core::tool::Tool;
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct FileSystemTool {
    root: PathBuf,
}

impl FileSystemTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a relative path inside the sandbox root.
    fn resolve(&self, raw: &str) -> Result<PathBuf, ToolError> {
        let path = Path::new(raw);

        if path.is_absolute() {
            return Err(ToolError::SandboxViolation(format!(
                "Absolute paths are not allowed: {raw}"
            )));
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(ToolError::SandboxViolation(format!(
                "Path escapes the output directory: {raw}"
            )));
        }

        Ok(self.root.join(path))
    }
}

/// The action and arguments after alias normalization.
struct NormalizedArgs {
    action: Option<String>,
    path: Option<String>,
    content: Option<String>,
}

fn normalize_arguments(raw: &serde_json::Value) -> NormalizedArgs {
    let action = ["operation", "action", "command"]
        .iter()
        .find_map(|key| raw.get(*key).and_then(|v| v.as_str()));

    // Some providers nest the real arguments under "params".
    let params = raw.get("params").filter(|p| p.is_object()).unwrap_or(raw);

    let path = ["path", "filePath", "filename", "destination"]
        .iter()
        .find_map(|key| params.get(*key).and_then(|v| v.as_str()))
        .map(String::from);

    let content = params
        .get("content")
        .and_then(|v| v.as_str())
        .map(String::from);

    let action = action.map(|a| {
        if a == "create" {
            if content.is_some() { "write" } else { "create_dir" }
        } else {
            a
        }
        .to_string()
    });

    NormalizedArgs {
        action,
        path,
        content,
    }
}

fn io_error(e: impl std::fmt::Display) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: "file_system".into(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl Tool for FileSystemTool {
    fn name(&self) -> &str {
        "file_system"
    }

    fn description(&self) -> &str {
        "Perform file operations inside the workflow output directory: \
         create, read, append, delete, and list."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["create", "read", "append", "delete", "list"],
                    "description": "The file operation to perform"
                },
                "filePath": {
                    "type": "string",
                    "description": "Path relative to the output directory"
                },
                "content": {
                    "type": "string",
                    "description": "Content for create and append actions"
                }
            },
            "required": ["action", "filePath"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let args = normalize_arguments(&arguments);

        let action = args
            .action
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'action' argument".into()))?;

        debug!(action = %action, path = args.path.as_deref().unwrap_or(""), "File system operation");

        let require_path = || {
            args.path
                .as_deref()
                .ok_or_else(|| ToolError::InvalidArguments("Missing 'filePath' argument".into()))
        };

        match action.as_str() {
            "write" => {
                let rel = require_path()?;
                let path = self.resolve(rel)?;
                let content = args.content.unwrap_or_default();

                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
                }
                tokio::fs::write(&path, &content).await.map_err(io_error)?;

                Ok(json!({
                    "success": true,
                    "action": "write",
                    "path": rel,
                    "bytes": content.len(),
                }))
            }
            "create_dir" => {
                let rel = require_path()?;
                let path = self.resolve(rel)?;
                tokio::fs::create_dir_all(&path).await.map_err(io_error)?;

                Ok(json!({ "success": true, "action": "create_dir", "path": rel }))
            }
            "read" => {
                let rel = require_path()?;
                let path = self.resolve(rel)?;
                let content = tokio::fs::read_to_string(&path).await.map_err(io_error)?;

                Ok(json!({
                    "success": true,
                    "action": "read",
                    "path": rel,
                    "content": content,
                }))
            }
            "append" => {
                let rel = require_path()?;
                let path = self.resolve(rel)?;
                let content = args.content.unwrap_or_default();

                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
                }
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .await
                    .map_err(io_error)?;
                file.write_all(content.as_bytes())
                    .await
                    .map_err(io_error)?;

                Ok(json!({
                    "success": true,
                    "action": "append",
                    "path": rel,
                    "bytes": content.len(),
                }))
            }
            "delete" => {
                let rel = require_path()?;
                let path = self.resolve(rel)?;
                tokio::fs::remove_file(&path).await.map_err(io_error)?;

                Ok(json!({ "success": true, "action": "delete", "path": rel }))
            }
            "list" => {
                let rel = args.path.as_deref().unwrap_or(".");
                let path = self.resolve(rel)?;

                let mut entries = Vec::new();
                let mut dir = tokio::fs::read_dir(&path).await.map_err(io_error)?;
                while let Some(entry) = dir.next_entry().await.map_err(io_error)? {
                    entries.push(entry.file_name().to_string_lossy().into_owned());
                }
                entries.sort();

                Ok(json!({
                    "success": true,
                    "action": "list",
                    "path": rel,
                    "entries": entries,
                }))
            }
            other => Err(ToolError::InvalidArguments(format!(
                "Unknown action '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(dir: &tempfile::TempDir) -> FileSystemTool {
        FileSystemTool::new(dir.path())
    }

    #[test]
    fn tool_definition() {
        let tool = FileSystemTool::new("./out");
        assert_eq!(tool.name(), "file_system");
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], json!(["action", "filePath"]));
        assert_eq!(schema["properties"]["action"]["enum"][0], "create");
    }

    #[tokio::test]
    async fn create_with_content_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(&dir)
            .execute(json!({
                "action": "create",
                "filePath": "report.md",
                "content": "# Findings"
            }))
            .await
            .unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["action"], "write");
        let written = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert_eq!(written, "# Findings");
    }

    #[tokio::test]
    async fn create_without_content_makes_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(&dir)
            .execute(json!({ "action": "create", "filePath": "drafts" }))
            .await
            .unwrap();

        assert_eq!(result["action"], "create_dir");
        assert!(dir.path().join("drafts").is_dir());
    }

    #[tokio::test]
    async fn alias_names_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool(&dir)
            .execute(json!({
                "command": "write",
                "params": { "filename": "notes.txt", "content": "hello" }
            }))
            .await
            .unwrap();

        assert_eq!(result["success"], true);
        let written = std::fs::read_to_string(dir.path().join("notes.txt")).unwrap();
        assert_eq!(written, "hello");
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        tool(&dir)
            .execute(json!({
                "action": "create",
                "filePath": "nested/deep/file.txt",
                "content": "x"
            }))
            .await
            .unwrap();

        assert!(dir.path().join("nested/deep/file.txt").exists());
    }

    #[tokio::test]
    async fn read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("in.txt"), "stored text").unwrap();

        let result = tool(&dir)
            .execute(json!({ "action": "read", "filePath": "in.txt" }))
            .await
            .unwrap();

        assert_eq!(result["content"], "stored text");
    }

    #[tokio::test]
    async fn append_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let t = tool(&dir);
        t.execute(json!({ "action": "append", "filePath": "log.txt", "content": "one" }))
            .await
            .unwrap();
        t.execute(json!({ "action": "append", "filePath": "log.txt", "content": "two" }))
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(written, "onetwo");
    }

    #[tokio::test]
    async fn delete_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gone.txt"), "x").unwrap();

        tool(&dir)
            .execute(json!({ "action": "delete", "filePath": "gone.txt" }))
            .await
            .unwrap();
        assert!(!dir.path().join("gone.txt").exists());
    }

    #[tokio::test]
    async fn list_returns_sorted_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();

        let result = tool(&dir)
            .execute(json!({ "action": "list", "filePath": "." }))
            .await
            .unwrap();

        assert_eq!(result["entries"], json!(["a.txt", "b.txt"]));
    }

    #[tokio::test]
    async fn path_traversal_is_a_sandbox_violation() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(&dir)
            .execute(json!({
                "action": "create",
                "filePath": "../escape.txt",
                "content": "nope"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::SandboxViolation(_)));
    }

    #[tokio::test]
    async fn absolute_path_is_a_sandbox_violation() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(&dir)
            .execute(json!({
                "action": "read",
                "filePath": "/etc/passwd"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::SandboxViolation(_)));
    }

    #[tokio::test]
    async fn unknown_action_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(&dir)
            .execute(json!({ "action": "rename", "filePath": "a.txt" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn missing_action_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool(&dir)
            .execute(json!({ "filePath": "a.txt" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}

use super::assertions::Assertion;
use super::runner::ScenarioRunner;
use super::steps::{FileEdit, FolderEdit, ScenarioStep};
use std::collections::BTreeMap;

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    // ===== Initial setup =====

    /// Import a fixture directory as an account's user directory
    pub fn seed_account(mut self, id: &str, fixture: &str) -> Self {
        self.steps.push(ScenarioStep::SeedAccount {
            id: id.to_string(),
            fixture: fixture.to_string(),
        });
        self
    }

    // ===== Path operations =====

    /// Write a file and refresh the root
    pub fn write(mut self, path: &str, content: &[u8]) -> Self {
        self.steps.push(ScenarioStep::Write {
            path: path.to_string(),
            content: content.to_vec(),
            update_root: true,
        });
        self
    }

    /// Write a file without refreshing the root
    pub fn write_deferred(mut self, path: &str, content: &[u8]) -> Self {
        self.steps.push(ScenarioStep::Write {
            path: path.to_string(),
            content: content.to_vec(),
            update_root: false,
        });
        self
    }

    pub fn make_dirs(mut self, path: &str) -> Self {
        self.steps.push(ScenarioStep::MakeDirs {
            path: path.to_string(),
        });
        self
    }

    pub fn remove(mut self, path: &str) -> Self {
        self.steps.push(ScenarioStep::Remove {
            path: path.to_string(),
            recursive: false,
        });
        self
    }

    pub fn remove_recursive(mut self, path: &str) -> Self {
        self.steps.push(ScenarioStep::Remove {
            path: path.to_string(),
            recursive: true,
        });
        self
    }

    pub fn refresh_root(mut self) -> Self {
        self.steps.push(ScenarioStep::RefreshRoot);
        self
    }

    // ===== File staging =====

    /// Stage `target`, replace its content, commit
    pub fn edit_file(mut self, target: &str, content: &[u8]) -> Self {
        self.steps.push(ScenarioStep::StageFile {
            target: Some(target.to_string()),
            ext: None,
            edit: FileEdit::Replace(content.to_vec()),
        });
        self
    }

    /// Stage `target` with a file extension, replace its content, commit
    pub fn edit_file_with_ext(mut self, target: &str, ext: &str, content: &[u8]) -> Self {
        self.steps.push(ScenarioStep::StageFile {
            target: Some(target.to_string()),
            ext: Some(ext.to_string()),
            edit: FileEdit::Replace(content.to_vec()),
        });
        self
    }

    /// Stage `target` and commit without touching it
    pub fn touch_file(mut self, target: &str) -> Self {
        self.steps.push(ScenarioStep::StageFile {
            target: Some(target.to_string()),
            ext: None,
            edit: FileEdit::Keep,
        });
        self
    }

    /// Stage `target`, scribble on it, then fail inside the scope
    pub fn edit_file_fails(mut self, target: &str, garbage: &[u8]) -> Self {
        self.steps.push(ScenarioStep::StageFile {
            target: Some(target.to_string()),
            ext: None,
            edit: FileEdit::Fail(garbage.to_vec()),
        });
        self
    }

    /// Stage `target`, scribble on it, then drop the handle unreleased
    pub fn edit_file_dropped(mut self, target: &str, garbage: &[u8]) -> Self {
        self.steps.push(ScenarioStep::StageFile {
            target: Some(target.to_string()),
            ext: None,
            edit: FileEdit::Drop(garbage.to_vec()),
        });
        self
    }

    // ===== Folder staging =====

    /// Stage `target` and make it hold exactly `files`, then commit
    pub fn replace_folder(mut self, target: &str, files: &[(&str, &[u8])]) -> Self {
        self.steps.push(ScenarioStep::StageFolder {
            target: Some(target.to_string()),
            edit: FolderEdit::Replace(to_map(files)),
        });
        self
    }

    /// Stage `target`, add `files`, commit
    pub fn add_to_folder(mut self, target: &str, files: &[(&str, &[u8])]) -> Self {
        self.steps.push(ScenarioStep::StageFolder {
            target: Some(target.to_string()),
            edit: FolderEdit::Put(to_map(files)),
        });
        self
    }

    /// Stage `target`, add `files`, then fail inside the scope
    pub fn add_to_folder_fails(mut self, target: &str, files: &[(&str, &[u8])]) -> Self {
        self.steps.push(ScenarioStep::StageFolder {
            target: Some(target.to_string()),
            edit: FolderEdit::Fail(to_map(files)),
        });
        self
    }

    // ===== Hash bookkeeping =====

    /// Remember what `path` currently hashes to
    pub fn remember(mut self, path: &str, label: &str) -> Self {
        self.steps.push(ScenarioStep::RememberHash {
            path: path.to_string(),
            label: label.to_string(),
        });
        self
    }

    /// Link a remembered directory hash at `path`
    pub fn link_folder(mut self, label: &str, path: &str) -> Self {
        self.steps.push(ScenarioStep::LinkRemembered {
            label: label.to_string(),
            path: path.to_string(),
            recursive: true,
        });
        self
    }

    /// Link a remembered file hash at `path`
    pub fn link_file(mut self, label: &str, path: &str) -> Self {
        self.steps.push(ScenarioStep::LinkRemembered {
            label: label.to_string(),
            path: path.to_string(),
            recursive: false,
        });
        self
    }

    // ===== Process lifecycle =====

    /// Drop the namespace and connect a new one over the same node
    pub fn reconnect(mut self) -> Self {
        self.steps.push(ScenarioStep::Reconnect);
        self
    }

    // ===== Assertions =====

    /// Add a general assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    pub fn assert_content(self, path: &str, content: &[u8]) -> Self {
        self.assert(Assertion::Content {
            path: path.to_string(),
            content: content.to_vec(),
        })
    }

    pub fn assert_exists(self, path: &str) -> Self {
        self.assert(Assertion::Exists {
            path: path.to_string(),
        })
    }

    pub fn assert_absent(self, path: &str) -> Self {
        self.assert(Assertion::Absent {
            path: path.to_string(),
        })
    }

    pub fn assert_hash_unchanged(self, path: &str, label: &str) -> Self {
        self.assert(Assertion::HashEquals {
            path: path.to_string(),
            label: label.to_string(),
        })
    }

    pub fn assert_hash_changed(self, path: &str, label: &str) -> Self {
        self.assert(Assertion::HashDiffers {
            path: path.to_string(),
            label: label.to_string(),
        })
    }

    /// Assert the cached root equals an independent stat of the data root
    pub fn assert_root_current(self) -> Self {
        self.assert(Assertion::RootMatchesStat)
    }

    pub fn assert_root_stale(self) -> Self {
        self.assert(Assertion::RootStale)
    }

    /// Assert no staging artifact is left on disk
    pub fn assert_scratch_empty(self) -> Self {
        self.assert(Assertion::ScratchEmpty)
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => return self.failed_at(0, format!("Failed to build runtime: {}", e)),
        };

        runtime.block_on(async move {
            let mut runner = match ScenarioRunner::new().await {
                Ok(r) => r,
                Err(e) => return self.failed_at(0, format!("Failed to create runner: {:?}", e)),
            };

            match runner.execute(&self.steps).await {
                Ok(()) => ScenarioResult {
                    steps_executed: self.steps.len(),
                    name: self.name,
                    success: true,
                    failure_step: None,
                    error: None,
                },
                Err(e) => {
                    let failure_step = runner.current_step();
                    self.failed_at(failure_step, format!("{:?}", e))
                }
            }
        })
    }

    fn failed_at(self, step: usize, error: String) -> ScenarioResult {
        ScenarioResult {
            name: self.name,
            success: false,
            steps_executed: step,
            failure_step: Some(step),
            error: Some(error),
        }
    }
}

fn to_map(files: &[(&str, &[u8])]) -> BTreeMap<String, Vec<u8>> {
    files
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_vec()))
        .collect()
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}

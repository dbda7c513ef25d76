use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use vouch_schema::{JsonPointer, Validator};

use crate::test_case::{CaseGroup, TestCase, UnionExpectation};
use crate::TestResults;

pub struct TestRunner {
    cases_dir: PathBuf,
}

impl TestRunner {
    pub fn new(cases_dir: impl Into<PathBuf>) -> Self {
        Self {
            cases_dir: cases_dir.into(),
        }
    }

    /// Discover and run all test cases
    pub fn run_all(&self) -> Result<TestResults> {
        let mut results = TestResults::default();

        let case_files = self.discover_case_files()?;
        if case_files.is_empty() {
            bail!("no case files found under {}", self.cases_dir.display());
        }

        for case_file in case_files {
            let content = fs::read_to_string(&case_file)
                .with_context(|| format!("Failed to read case file: {:?}", case_file))?;

            match serde_json::from_str::<Vec<CaseGroup>>(&content) {
                Ok(groups) => {
                    let file_name = case_file
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("cases");
                    for group in &groups {
                        self.run_group(file_name, group, &mut results);
                    }
                }
                Err(e) => results.record(
                    case_file.display().to_string(),
                    Err(anyhow!("Failed to parse case file: {e}")),
                ),
            }
        }

        Ok(results)
    }

    /// Discover all .json case files
    fn discover_case_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.walk_directory(&self.cases_dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn walk_directory(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.walk_directory(&path, files)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path);
            }
        }

        Ok(())
    }

    fn run_group(&self, file_name: &str, group: &CaseGroup, results: &mut TestResults) {
        let group_name = format!("{file_name}: {}", group.description);

        let compiled = Validator::with_options(group.schema.clone(), group.options.clone());
        let validator = match (compiled, &group.schema_error) {
            (Ok(validator), None) => validator,
            (Err(e), Some(expected)) => {
                let outcome = if e.to_string().contains(expected.as_str()) {
                    Ok(())
                } else {
                    Err(anyhow!("Schema failed to compile: {e}"))
                };
                return results.record(group_name, outcome);
            }
            (Err(e), None) => {
                let outcome = Err(anyhow!("Schema failed to compile: {e}"));
                return results.record(group_name, outcome);
            }
            (Ok(_), Some(expected)) => {
                return results.record(
                    group_name,
                    Err(anyhow!("Schema compiled, expected error containing {expected:?}")),
                );
            }
        };

        for test in &group.tests {
            results.record(
                format!("{group_name} / {}", test.description),
                self.run_test(&validator, test),
            );
        }
    }

    /// Run a single test case
    fn run_test(&self, validator: &Validator, test: &TestCase) -> Result<()> {
        let output = match (validator.validate(&test.instance), &test.processing_error) {
            (Ok(output), None) => output,
            (Err(e), Some(expected)) if e.to_string().contains(expected.as_str()) => {
                return Ok(());
            }
            (Err(e), _) => bail!("Validation aborted: {}", e),
            (Ok(output), Some(expected)) => bail!(
                "Validation completed (valid: {}), expected abort containing {:?}",
                output.is_valid,
                expected
            ),
        };

        if let Some(valid) = test.valid
            && output.is_valid != valid
        {
            bail!(
                "Expected valid = {}, got {}.\nReport: {}",
                valid,
                output.is_valid,
                serde_json::to_string_pretty(&output.to_json())?
            );
        }

        if let Some(expected) = &test.messages {
            let actual: Vec<String> = output
                .errors
                .iter()
                .map(|error| error.kind.to_string())
                .collect();
            if &actual != expected {
                bail!("Message mismatch.\nExpected: {:?}\nActual: {:?}", expected, actual);
            }
        }

        if let Some(union) = &test.union {
            self.check_union(validator, test, union)?;
        }

        Ok(())
    }

    fn check_union(
        &self,
        validator: &Validator,
        test: &TestCase,
        expected: &UnionExpectation,
    ) -> Result<()> {
        let pointer = JsonPointer::parse(&expected.pointer)
            .map_err(|e| anyhow!("Invalid union pointer {:?}: {}", expected.pointer, e))?;
        let outcome = validator
            .evaluate_one_of(&pointer, &test.instance)
            .context("Failed to evaluate oneOf")?;

        if outcome.matched != expected.matched {
            bail!(
                "Expected {} matching candidates, got {}",
                expected.matched,
                outcome.matched
            );
        }
        let matching = outcome.matching.as_ref().map(ToString::to_string);
        if matching != expected.matching {
            bail!(
                "Attribution mismatch.\nExpected: {:?}\nActual: {:?}",
                expected.matching,
                matching
            );
        }
        Ok(())
    }
}

//! End-to-end tests for complete generation runs

use dts_bundle::{
    CollectingReporter, DeclarationEmitter, EmitError, Generator, GeneratorOptions, NullReporter,
    Reporter,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stands in for `tsc`: writes the given fragments into the declaration dir.
struct FakeTsc {
    files: Vec<(String, String)>,
    exit_code: Option<i32>,
}

impl FakeTsc {
    fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
            exit_code: None,
        }
    }

    fn failing(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

impl DeclarationEmitter for FakeTsc {
    fn emit(
        &self,
        _project_root: &Path,
        out_dir: &Path,
        _reporter: &mut dyn Reporter,
    ) -> Result<(), EmitError> {
        for (name, text) in &self.files {
            let path = out_dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, text).unwrap();
        }
        match self.exit_code {
            Some(code) => Err(EmitError::Failed {
                program: "tsc".to_string(),
                code: Some(code),
                stderr: String::new(),
            }),
            None => Ok(()),
        }
    }
}

fn create_project(name: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("package.json"),
        format!(r#"{{ "name": "{}", "version": "1.0.0" }}"#, name),
    )
    .unwrap();
    temp
}

fn run(
    root: &Path,
    options: GeneratorOptions,
    tsc: FakeTsc,
    reporter: &mut dyn Reporter,
) -> (PathBuf, String) {
    let outcome = Generator::with_emitter(options, tsc)
        .with_cwd(root)
        .generate(reporter)
        .unwrap();
    let text = fs::read_to_string(&outcome.output_path).unwrap();
    (outcome.output_path, text)
}

fn three_fragments() -> FakeTsc {
    FakeTsc::new(&[
        ("index.d.ts", "import { Util } from './util';\nexport declare function main(u: Util): void;\n"),
        ("util.d.ts", "export interface Util {\n    name: string;\n}\n"),
        ("unused.d.ts", "export declare const unused: number;\n"),
    ])
}

#[test]
fn test_referenced_only_omits_unused_module() {
    let temp = create_project("pkg");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.shake = "referencedOnly".to_string();

    let (_, text) = run(temp.path(), options, three_fragments(), &mut NullReporter);

    assert!(text.contains("declare module 'pkg/index' {"));
    assert!(text.contains("declare module 'pkg/util' {"));
    assert!(!text.contains("pkg/unused"));
    assert!(text.contains("  import { Util } from 'pkg/util';"));
    assert!(text.contains("  export function main(u: Util): void;"));
}

#[test]
fn test_off_keeps_every_module_in_discovery_order() {
    let temp = create_project("pkg");
    let options = GeneratorOptions::for_root(temp.path());

    let (_, text) = run(temp.path(), options, three_fragments(), &mut NullReporter);

    let index = text.find("declare module 'pkg/index'").unwrap();
    let unused = text.find("declare module 'pkg/unused'").unwrap();
    let util = text.find("declare module 'pkg/util'").unwrap();
    assert!(index < unused && unused < util);
}

#[test]
fn test_full_output_shape() {
    let temp = create_project("demo");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.template = Some("export {default} from '{main-module}'".to_string());

    let tsc = FakeTsc::new(&[
        ("index.d.ts", "export { default } from './lib';"),
        ("lib/index.d.ts", "declare const _default: 42;\nexport default _default;"),
    ]);
    let (_, text) = run(temp.path(), options, tsc, &mut NullReporter);

    assert_eq!(
        text,
        "declare module 'demo/index' {\n  export { default } from 'demo/lib/index';\n}\n\
         declare module 'demo/lib/index' {\n  const _default: 42;\n  export default _default;\n}\n\
         export {default} from 'demo/index'\n"
    );
}

#[test]
fn test_two_runs_are_byte_identical() {
    let temp = create_project("pkg");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.shake = "referencedOnly".to_string();

    let (_, first) = run(temp.path(), options.clone(), three_fragments(), &mut NullReporter);
    let (_, second) = run(temp.path(), options, three_fragments(), &mut NullReporter);
    assert_eq!(first, second);
}

#[test]
fn test_unknown_strategy_behaves_like_off() {
    let temp = create_project("pkg");
    let off = GeneratorOptions::for_root(temp.path());
    let mut bogus = off.clone();
    bogus.shake = "bogus".to_string();

    let (_, expected) = run(temp.path(), off, three_fragments(), &mut NullReporter);
    let mut reporter = CollectingReporter::new();
    let (_, actual) = run(temp.path(), bogus, three_fragments(), &mut reporter);

    assert_eq!(expected, actual);
    assert!(reporter.warnings().iter().any(|w| w.contains("bogus")));
}

#[test]
fn test_force_writes_output_despite_tool_failure() {
    let temp = create_project("pkg");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.force = true;
    let tsc = FakeTsc::new(&[("index.d.ts", "export type Partial = 1;")]).failing(2);

    let mut reporter = CollectingReporter::new();
    let (path, text) = run(temp.path(), options, tsc, &mut reporter);

    assert_eq!(path, temp.path().join("index.d.ts"));
    assert!(text.contains("declare module 'pkg/index'"));
    assert_eq!(reporter.warnings().len(), 1);
}

#[test]
fn test_force_with_no_fragments_writes_alias_only() {
    let temp = create_project("pkg");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.force = true;
    options.template = Some("export * from '{main-module}';".to_string());

    let (_, text) = run(temp.path(), options, FakeTsc::new(&[]).failing(1), &mut NullReporter);
    assert_eq!(text, "export * from 'pkg/index';\n");
}

#[test]
fn test_alias_can_be_disabled() {
    let temp = create_project("pkg");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.add_alias = false;
    options.entry = None;

    let (_, text) = run(temp.path(), options, three_fragments(), &mut NullReporter);
    assert!(!text.contains("require("));
}

#[test]
fn test_output_in_nested_directory() {
    let temp = create_project("pkg");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.output = PathBuf::from("dist/types/bundle.d.ts");

    let (path, _) = run(temp.path(), options, three_fragments(), &mut NullReporter);
    assert_eq!(path, temp.path().join("dist/types/bundle.d.ts"));
}

#[test]
fn test_scoped_package_names() {
    let temp = create_project("@org/lib");
    let options = GeneratorOptions::for_root(temp.path());
    let tsc = FakeTsc::new(&[("index.d.ts", "export * from './a';"), ("a.d.ts", "")]);

    let (_, text) = run(temp.path(), options, tsc, &mut NullReporter);
    assert!(text.contains("export * from '@org/lib/a';"));
    assert!(text.contains("declare module '@org/lib' {"));
    assert!(text.contains("require('@org/lib/index')"));
}

#[test]
fn test_entry_in_subdirectory() {
    let temp = create_project("app");
    let mut options = GeneratorOptions::for_root(temp.path());
    options.entry = Some(PathBuf::from("src/main.ts"));
    options.shake = "referencedOnly".to_string();
    let tsc = FakeTsc::new(&[
        ("src/main.d.ts", "export * from '../shared/types';"),
        ("shared/types.d.ts", "export type Id = string;"),
        ("src/other.d.ts", ""),
    ]);

    let (_, text) = run(temp.path(), options, tsc, &mut NullReporter);
    assert!(text.contains("declare module 'app/src/main'"));
    assert!(text.contains("declare module 'app/shared/types'"));
    assert!(!text.contains("app/src/other"));
}
